use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONTROL_SOCKET: &str = "/tmp/irc.sock";
pub const DEFAULT_RELAY_SOCKET: &str = "/tmp/inter-client.sock";
pub const DEFAULT_KEY_BITS: usize = 2048;
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by the relay server and its clients.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket carrying handshakes and client-to-server messages.
    pub control_socket: PathBuf,
    /// Socket carrying server-to-client deliveries.
    pub relay_socket: PathBuf,
    pub key_bits: usize,
    /// How long a sender waits for each chunk acknowledgement.
    pub ack_timeout: Duration,
    /// Bound on the key exchange plus the relay connection that follows it.
    pub handshake_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            control_socket: PathBuf::from(DEFAULT_CONTROL_SOCKET),
            relay_socket: PathBuf::from(DEFAULT_RELAY_SOCKET),
            key_bits: DEFAULT_KEY_BITS,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}
