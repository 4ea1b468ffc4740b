use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::handshake;
use crate::identity::PeerId;
use crate::message::{receive_message, send_message};
use rsa::rsa::{PrivateKey, PublicKey, RsaKeyPair, decrypt, encrypt};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// A message relayed from another client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub from: String,
    pub text: String,
}

/// Sending half of a client: owns the control stream.
pub struct RelayClient<S> {
    id: PeerId,
    keys: RsaKeyPair,
    server_key: PublicKey,
    control: S,
    ack_timeout: Duration,
}

impl<S> RelayClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Runs the client side of the handshake on `control`.
    pub async fn connect(mut control: S, keys: RsaKeyPair, id: PeerId, config: &RelayConfig) -> Result<Self> {
        let server_key = timeout(config.handshake_timeout, handshake::initiate(&mut control, &keys, &id))
            .await
            .map_err(|_| RelayError::Timeout("handshake"))??;
        log::info!("Connected as client {}", id);
        Ok(Self {
            id,
            keys,
            server_key,
            control,
            ack_timeout: config.ack_timeout,
        })
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn server_key(&self) -> &PublicKey {
        &self.server_key
    }

    /// Encodes, encrypts under the server's key and sends `text`.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let ciphertext = encrypt(&rsa::encode(text), &self.server_key);
        send_message(&mut self.control, &ciphertext, self.ack_timeout).await
    }

    /// Identifies on the relay stream, which the server pairs with this
    /// client by id, and returns the receiving half.
    pub async fn attach_relay<R>(&self, mut relay: R) -> Result<Inbox<R>>
    where
        R: AsyncRead + AsyncWrite + Unpin,
    {
        handshake::send_identity(&mut relay, &self.id, &self.server_key).await?;
        Ok(Inbox {
            relay,
            key: self.keys.private_key(),
        })
    }

    /// Gives up the client and returns the raw control stream.
    pub fn into_control(self) -> S {
        self.control
    }

    pub async fn close(mut self) -> Result<()> {
        self.control.shutdown().await?;
        Ok(())
    }
}

pub struct Inbox<R> {
    relay: R,
    key: PrivateKey,
}

impl<R> Inbox<R>
where
    R: AsyncRead + AsyncWrite + Unpin,
{
    /// Waits for the next relayed message. `Ok(None)` once the server
    /// closes the relay stream.
    pub async fn next(&mut self) -> Result<Option<Delivery>> {
        let Some(ciphertext) = receive_message(&mut self.relay).await? else {
            return Ok(None);
        };
        let text = rsa::decode(&decrypt(&ciphertext, &self.key))?;
        if text.len() < PeerId::LEN {
            return Err(RelayError::InvalidIdentity(text));
        }
        let (from, body) = text.split_at(PeerId::LEN);
        Ok(Some(Delivery {
            from: from.to_string(),
            text: body.to_string(),
        }))
    }
}
