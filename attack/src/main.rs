use attack::{AttackConfig, AttackHarness, DEFAULT_PRIVATE_KEY_SIZE, DEFAULT_SAMPLE_LEN};
use clap::Parser;

/// Recover a small RSA private key by factoring or exhaustive search.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Search the private exponent space instead of factoring n.
    #[arg(long)]
    bruteforce: bool,

    /// Key size in bits.
    #[arg(long, default_value_t = DEFAULT_PRIVATE_KEY_SIZE)]
    private_key_size: usize,

    /// Length of the random known plaintext.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_LEN)]
    sample_len: usize,

    /// Search workers (defaults to one per CPU).
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.private_key_size == DEFAULT_PRIVATE_KEY_SIZE {
        log::info!("Note: the key size can be set with --private-key-size=20");
    }

    let harness = AttackHarness::new(AttackConfig {
        bruteforce: args.bruteforce,
        private_key_size: args.private_key_size,
        sample_len: args.sample_len,
        workers: args.workers,
    });

    let (keypair, outcome) = harness.run()?;
    if outcome.private_exponent() == &keypair.d {
        log::info!("Recovered the generated private exponent");
    } else {
        log::info!("Recovered an exponent equivalent to the generated one");
    }
    Ok(())
}
