pub mod client;
pub mod config;
pub mod error;
pub mod handshake;
pub mod identity;
pub mod message;
pub mod registry;
pub mod server;
pub mod wire;

pub use client::{Delivery, Inbox, RelayClient};
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use identity::PeerId;
pub use registry::{Peer, PeerRegistry};
pub use server::RelayServer;
