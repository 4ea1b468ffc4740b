use clap::Parser;
use relay::config::{DEFAULT_CONTROL_SOCKET, DEFAULT_KEY_BITS, DEFAULT_RELAY_SOCKET, RelayConfig};
use relay::{Delivery, Inbox, PeerId, RelayClient};
use rsa::rsa::RsaKeyGenerator;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;

/// Interactive client for the RSA chat relay.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONTROL_SOCKET)]
    control_socket: PathBuf,

    #[arg(long, default_value = DEFAULT_RELAY_SOCKET)]
    relay_socket: PathBuf,

    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    key_bits: usize,
}

fn prompt() {
    print!("You: ");
    let _ = std::io::stdout().flush();
}

fn show(delivery: &Delivery) {
    let now = chrono::Local::now().format("%H:%M:%S");
    println!("\r[{}] (client {}) {}", now, delivery.from, delivery.text);
    prompt();
}

async fn print_deliveries(mut inbox: Inbox<UnixStream>) {
    loop {
        match inbox.next().await {
            Ok(Some(delivery)) => show(&delivery),
            Ok(None) => {
                log::info!("Server closed the relay connection");
                break;
            }
            Err(e) => {
                log::error!("Relay connection failed: {}", e);
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = RelayConfig {
        control_socket: args.control_socket,
        relay_socket: args.relay_socket,
        key_bits: args.key_bits,
        ..RelayConfig::default()
    };

    let id = PeerId::for_current_process();
    log::info!("Generating {}-bit key pair for client {}...", config.key_bits, id);
    let bits = config.key_bits;
    let keys = tokio::task::spawn_blocking(move || RsaKeyGenerator::new(bits).generate_keypair()).await??;

    let control = UnixStream::connect(&config.control_socket).await?;
    let mut client = RelayClient::connect(control, keys, id, &config).await?;
    let relay = UnixStream::connect(&config.relay_socket).await?;
    let inbox = client.attach_relay(relay).await?;
    tokio::spawn(print_deliveries(inbox));

    println!("Connected as client {}. An empty line quits.", client.id());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            break;
        }
        client.send(&line).await?;
        prompt();
    }

    client.close().await?;
    Ok(())
}
