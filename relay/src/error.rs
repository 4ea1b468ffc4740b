use crate::identity::PeerId;
use num_bigint::BigUint;
use rsa::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by the other side")]
    ConnectionClosed,

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("expected {expected} frame, got {found}")]
    UnexpectedFrame { expected: &'static str, found: &'static str },

    #[error("malformed decimal payload {0:?}")]
    MalformedNumber(String),

    #[error("key echo mismatch: sent {sent}, got back {received}")]
    EchoMismatch { sent: BigUint, received: BigUint },

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("invalid peer identity {0:?}")]
    InvalidIdentity(String),

    #[error("peer {0} is already connected")]
    DuplicatePeer(PeerId),

    #[error("relay connection for {0} matches no waiting client")]
    UnknownRelay(PeerId),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Result<T> = std::result::Result<T, RelayError>;
