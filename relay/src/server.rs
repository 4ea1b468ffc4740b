use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::handshake;
use crate::identity::PeerId;
use crate::message::receive_message;
use crate::registry::{Peer, PeerRegistry};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use num_bigint::BigUint;
use rsa::rsa::{PrivateKey, PublicKey, RsaKeyPair, decrypt, encrypt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{Notify, oneshot};
use tokio::time::{Instant, timeout, timeout_at};

/// A handshaken client waiting for its relay connection.
struct PendingRelay<S> {
    ticket: u64,
    relay_tx: oneshot::Sender<S>,
}

/// Relays every message a client sends to all other connected clients,
/// re-encrypted under each recipient's key.
///
/// A client opens two connections. The control connection carries the
/// handshake and the client's messages; the relay connection identifies
/// itself with the same encrypted id and then carries deliveries. The two
/// are paired by id, never by arrival order.
pub struct RelayServer<S> {
    keys: RsaKeyPair,
    registry: PeerRegistry<S>,
    pending: DashMap<PeerId, PendingRelay<S>>,
    parked: Notify,
    tickets: AtomicU64,
    config: RelayConfig,
}

impl<S> RelayServer<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(keys: RsaKeyPair, config: RelayConfig) -> Self {
        Self {
            keys,
            registry: PeerRegistry::new(),
            pending: DashMap::new(),
            parked: Notify::new(),
            tickets: AtomicU64::new(0),
            config,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    pub fn registry(&self) -> &PeerRegistry<S> {
        &self.registry
    }

    /// Key exchange and identification on a fresh control stream.
    pub async fn handshake(&self, control: &mut S) -> Result<(PeerId, PublicKey)> {
        timeout(self.config.handshake_timeout, handshake::accept(control, &self.keys))
            .await
            .map_err(|_| RelayError::Timeout("handshake"))?
    }

    /// Drives one control connection: handshake, wait for the matching
    /// relay connection, register, then serve until the client leaves.
    pub async fn handle_control(self: Arc<Self>, mut control: S) -> Result<()> {
        let (id, public_key) = self.handshake(&mut control).await?;
        let (ticket, relay_rx) = self.park(&id)?;

        let relay = match timeout(self.config.handshake_timeout, relay_rx).await {
            Ok(Ok(relay)) => relay,
            _ => {
                self.pending.remove_if(&id, |_, pending| pending.ticket == ticket);
                return Err(RelayError::Timeout("relay connection"));
            }
        };

        let peer = self.register(id, public_key, relay)?;
        self.serve_peer(peer, control).await;
        Ok(())
    }

    /// Reads the identity a relay connection opens with and hands the
    /// stream to the control connection waiting under that id. A stream
    /// nobody claims is dropped.
    pub async fn handle_relay(&self, mut relay: S) -> Result<()> {
        let private_key = self.keys.private_key();
        let id = timeout(self.config.handshake_timeout, handshake::receive_identity(&mut relay, &private_key))
            .await
            .map_err(|_| RelayError::Timeout("relay identity"))??;

        let pending = self.claim(&id).await?;
        pending.relay_tx.send(relay).map_err(|_| RelayError::UnknownRelay(id.clone()))?;
        log::debug!("relay connection attached to {}", id);
        Ok(())
    }

    fn park(&self, id: &PeerId) -> Result<(u64, oneshot::Receiver<S>)> {
        if self.registry.contains(id) {
            return Err(RelayError::DuplicatePeer(id.clone()));
        }
        let (relay_tx, relay_rx) = oneshot::channel();
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        match self.pending.entry(id.clone()) {
            Entry::Occupied(_) => return Err(RelayError::DuplicatePeer(id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(PendingRelay { ticket, relay_tx });
            }
        }
        self.parked.notify_waiters();
        Ok((ticket, relay_rx))
    }

    /// The relay side may identify before its control side has parked, so
    /// wait for a matching entry until the handshake deadline.
    async fn claim(&self, id: &PeerId) -> Result<PendingRelay<S>> {
        let deadline = Instant::now() + self.config.handshake_timeout;
        loop {
            let parked = self.parked.notified();
            tokio::pin!(parked);
            parked.as_mut().enable();

            if let Some((_, pending)) = self.pending.remove(id) {
                return Ok(pending);
            }
            if timeout_at(deadline, parked).await.is_err() {
                return Err(RelayError::UnknownRelay(id.clone()));
            }
        }
    }

    pub fn register(&self, id: PeerId, public_key: PublicKey, relay: S) -> Result<Arc<Peer<S>>> {
        self.registry.insert(Peer::new(id, public_key, relay))
    }

    /// Reads messages from `peer`'s control stream until it closes or
    /// misbehaves, then drops the peer.
    pub async fn serve_peer(self: Arc<Self>, peer: Arc<Peer<S>>, mut control: S) {
        let private_key = self.keys.private_key();
        loop {
            match receive_message(&mut control).await {
                Ok(Some(ciphertext)) => self.handle_message(&peer, &ciphertext, &private_key).await,
                Ok(None) => {
                    log::info!("Client {} has closed the connection.", peer.id);
                    break;
                }
                Err(e) => {
                    log::warn!("Dropping client {}: {}", peer.id, e);
                    break;
                }
            }
        }
        self.registry.remove(&peer);
    }

    async fn handle_message(&self, sender: &Peer<S>, ciphertext: &[BigUint], private_key: &PrivateKey) {
        let plaintext = decrypt(ciphertext, private_key);
        match rsa::decode(&plaintext) {
            Ok(text) => log::info!("Client {}: {}", sender.id, text),
            Err(e) => log::warn!("Client {} sent undecodable text: {}", sender.id, e),
        }

        let mut outgoing = Vec::with_capacity(plaintext.len() + 1);
        outgoing.push(sender.id.block());
        outgoing.extend(plaintext);
        self.broadcast(&sender.id, &outgoing).await;
    }

    /// Sends `plaintext` to every peer but `sender`. A peer that fails to
    /// take delivery is evicted.
    pub async fn broadcast(&self, sender: &PeerId, plaintext: &[BigUint]) {
        for peer in self.registry.others(sender) {
            let ciphertext = encrypt(plaintext, &peer.public_key);
            if let Err(e) = peer.deliver(&ciphertext, self.config.ack_timeout).await {
                log::warn!("Delivery to client {} failed, evicting: {}", peer.id, e);
                self.registry.remove(&peer);
            }
        }
    }
}

impl RelayServer<UnixStream> {
    /// Accepts on both listeners until the task is dropped. Every
    /// connection is handled on its own task.
    pub async fn run(self: Arc<Self>, control: UnixListener, relay: UnixListener) {
        log::info!("Waiting for clients on {}", self.config.control_socket.display());
        loop {
            tokio::select! {
                accepted = control.accept() => match accepted {
                    Ok((stream, _)) => {
                        let server = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_control(stream).await {
                                log::warn!("Rejected client: {}", e);
                            }
                        });
                    }
                    Err(e) => log::warn!("Accept on control socket failed: {}", e),
                },
                accepted = relay.accept() => match accepted {
                    Ok((stream, _)) => {
                        let server = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = server.handle_relay(stream).await {
                                log::warn!("Dropped relay connection: {}", e);
                            }
                        });
                    }
                    Err(e) => log::warn!("Accept on relay socket failed: {}", e),
                },
            }
        }
    }
}
