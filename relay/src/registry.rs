use crate::error::{RelayError, Result};
use crate::identity::PeerId;
use crate::message::send_message;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use num_bigint::BigUint;
use rsa::rsa::PublicKey;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;

/// A connected client as the server sees it.
pub struct Peer<S> {
    pub id: PeerId,
    pub public_key: PublicKey,
    // held for a whole message so deliveries never interleave
    relay: Mutex<S>,
}

impl<S> Peer<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(id: PeerId, public_key: PublicKey, relay: S) -> Self {
        Self {
            id,
            public_key,
            relay: Mutex::new(relay),
        }
    }

    /// Writes one already-encrypted message to the peer's relay stream.
    pub async fn deliver(&self, ciphertext: &[BigUint], ack_timeout: Duration) -> Result<()> {
        let mut relay = self.relay.lock().await;
        send_message(&mut *relay, ciphertext, ack_timeout).await
    }
}

pub struct PeerRegistry<S> {
    peers: Arc<DashMap<PeerId, Arc<Peer<S>>>>,
}

impl<S> Clone for PeerRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            peers: Arc::clone(&self.peers),
        }
    }
}

impl<S> Default for PeerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> PeerRegistry<S> {
    pub fn new() -> Self {
        Self {
            peers: Arc::new(DashMap::new()),
        }
    }

    /// Registers `peer`, refusing an identity that is already connected.
    pub fn insert(&self, peer: Peer<S>) -> Result<Arc<Peer<S>>> {
        match self.peers.entry(peer.id.clone()) {
            Entry::Occupied(_) => Err(RelayError::DuplicatePeer(peer.id)),
            Entry::Vacant(slot) => {
                let peer = Arc::new(peer);
                slot.insert(Arc::clone(&peer));
                log::info!("Client {} registered ({} connected)", peer.id, self.peers.len());
                Ok(peer)
            }
        }
    }

    /// Removes `peer` only if the registered entry is that same instance.
    pub fn remove(&self, peer: &Arc<Peer<S>>) -> bool {
        let removed = self.peers.remove_if(&peer.id, |_, current| Arc::ptr_eq(current, peer)).is_some();
        if removed {
            log::info!("Client {} removed", peer.id);
        }
        removed
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Snapshot of every peer except `sender`. No map guard outlives the call.
    pub fn others(&self, sender: &PeerId) -> Vec<Arc<Peer<S>>> {
        self.peers
            .iter()
            .filter(|entry| entry.key() != sender)
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}
