use clap::Parser;
use relay::config::{DEFAULT_CONTROL_SOCKET, DEFAULT_KEY_BITS, DEFAULT_RELAY_SOCKET, RelayConfig};
use relay::RelayServer;
use rsa::rsa::RsaKeyGenerator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{UnixListener, UnixStream};

/// RSA chat relay server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONTROL_SOCKET)]
    control_socket: PathBuf,

    #[arg(long, default_value = DEFAULT_RELAY_SOCKET)]
    relay_socket: PathBuf,

    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    key_bits: usize,

    /// Seconds to wait for each chunk acknowledgement.
    #[arg(long, default_value_t = 30)]
    ack_timeout: u64,
}

impl Args {
    fn into_config(self) -> RelayConfig {
        RelayConfig {
            control_socket: self.control_socket,
            relay_socket: self.relay_socket,
            key_bits: self.key_bits,
            ack_timeout: Duration::from_secs(self.ack_timeout),
            ..RelayConfig::default()
        }
    }
}

fn remove_socket(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = Args::parse().into_config();

    log::info!("Generating {}-bit server key pair...", config.key_bits);
    let bits = config.key_bits;
    let keys = tokio::task::spawn_blocking(move || RsaKeyGenerator::new(bits).generate_keypair()).await??;
    log::debug!("Server public key: e = {}, n = {}", keys.e, keys.n);

    remove_socket(&config.control_socket)?;
    remove_socket(&config.relay_socket)?;
    let control = UnixListener::bind(&config.control_socket)?;
    let relay = UnixListener::bind(&config.relay_socket)?;

    let server: Arc<RelayServer<UnixStream>> = Arc::new(RelayServer::new(keys, config.clone()));
    tokio::select! {
        () = Arc::clone(&server).run(control, relay) => {}
        _ = tokio::signal::ctrl_c() => log::info!("Shutting down..."),
    }

    remove_socket(&config.control_socket)?;
    remove_socket(&config.relay_socket)?;
    Ok(())
}
