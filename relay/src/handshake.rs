//! Public key exchange and peer identification on the control socket.
//!
//! Each key half travels as a value frame that the receiver echoes back
//! verbatim; the sender aborts unless the echo matches. The server speaks
//! first, so the two sides run mirrored sequences:
//!
//! | server                   | client                   |
//! |--------------------------|--------------------------|
//! | send own `e`, `n`        | receive server `e`, `n`  |
//! | receive client `e`, `n`  | send own `e`, `n`        |
//! | receive identity         | send identity            |
//!
//! The relay connection opens with the same encrypted identity so the
//! server can pair it with its control connection.

use crate::error::{RelayError, Result};
use crate::identity::PeerId;
use crate::wire::{Frame, parse_number, read_frame, write_frame};
use num_bigint::BigUint;
use rsa::codec::block_capacity;
use rsa::rsa::{PrivateKey, PublicKey, RsaKeyPair};
use tokio::io::{AsyncRead, AsyncWrite};

async fn expect_value<S>(stream: &mut S) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    match read_frame(stream).await? {
        Some(Frame::Value(digits)) => Ok(digits),
        Some(other) => Err(RelayError::UnexpectedFrame { expected: "value", found: other.kind() }),
        None => Err(RelayError::ConnectionClosed),
    }
}

/// Sends one key half and verifies the echo.
pub async fn send_key<S>(stream: &mut S, value: &BigUint) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    write_frame(stream, &Frame::value(value)).await?;
    let echoed = parse_number(&expect_value(stream).await?)?;
    if &echoed != value {
        return Err(RelayError::EchoMismatch { sent: value.clone(), received: echoed });
    }
    Ok(())
}

/// Receives one key half and echoes the exact bytes back.
pub async fn receive_key<S>(stream: &mut S) -> Result<BigUint>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let digits = expect_value(stream).await?;
    write_frame(stream, &Frame::Value(digits.clone())).await?;
    parse_number(&digits)
}

pub async fn send_public_key<S>(stream: &mut S, key: &PublicKey) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    send_key(stream, &key.e).await?;
    send_key(stream, &key.n).await
}

pub async fn receive_public_key<S>(stream: &mut S) -> Result<PublicKey>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let e = receive_key(stream).await?;
    let n = receive_key(stream).await?;
    if n <= block_capacity() {
        log::warn!("peer modulus {} does not exceed the block capacity; text will not survive encryption", n);
    }
    Ok(PublicKey { e, n })
}

/// Sends the identity as one block encrypted under the server's key.
/// Not acknowledged.
pub async fn send_identity<S>(stream: &mut S, id: &PeerId, server_key: &PublicKey) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let ciphertext = rsa::rsa::encrypt(&[id.block()], server_key);
    for block in &ciphertext {
        write_frame(stream, &Frame::value(block)).await?;
    }
    Ok(())
}

pub async fn receive_identity<S>(stream: &mut S, key: &PrivateKey) -> Result<PeerId>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let ciphertext = parse_number(&expect_value(stream).await?)?;
    let plaintext = rsa::rsa::decrypt(&[ciphertext], key);
    PeerId::parse(&rsa::decode(&plaintext)?)
}

/// Server side of the handshake. Returns the client's identity and key.
pub async fn accept<S>(stream: &mut S, own: &RsaKeyPair) -> Result<(PeerId, PublicKey)>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    send_public_key(stream, &own.public_key()).await?;
    let peer_key = receive_public_key(stream).await?;
    let id = receive_identity(stream, &own.private_key()).await?;
    log::debug!("handshake with {} complete", id);
    Ok((id, peer_key))
}

/// Client side of the handshake. Returns the server's key.
pub async fn initiate<S>(stream: &mut S, own: &RsaKeyPair, id: &PeerId) -> Result<PublicKey>
where
    S: AsyncRead + AsyncWrite + Unpin + ?Sized,
{
    let server_key = receive_public_key(stream).await?;
    send_public_key(stream, &own.public_key()).await?;
    send_identity(stream, id, &server_key).await?;
    Ok(server_key)
}
