//! Chaumian Coin Simulator - Demo
//!
//! This binary walks one coin through the protocol:
//! 1. The bank generates its key pair
//! 2. A buyer creates a coin and has it blindly signed
//! 3. The coin is spent with one or two merchants
//! 4. The merchants' evidence is checked for double-spending and replay

use std::error::Error;
use std::path::PathBuf;

use chaum_coin_sim::simulation::{self, ChallengeMode, SimulationConfig, SimulationReport};
use chaum_coin_sim::DetectionOutcome;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecash-sim")]
#[command(about = "Simulate Chaum-style e-cash with double-spend tracing")]
#[command(version)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Buyer identity embedded in the coin
    #[arg(long)]
    buyer: Option<String>,

    /// Coin denomination
    #[arg(long)]
    value: Option<u64>,

    /// Bank RSA key size in bits
    #[arg(long)]
    key_bits: Option<usize>,

    /// Number of merchants the coin is spent with (1 or 2)
    #[arg(long)]
    spends: Option<u8>,

    /// How merchants pick which share halves to ask for
    #[arg(long, value_enum)]
    challenge: Option<ChallengeMode>,

    /// Skip the merchant replay check
    #[arg(long)]
    no_replay_check: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<SimulationConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(buyer) = self.buyer {
            config.buyer = buyer;
        }
        if let Some(value) = self.value {
            config.value = value;
        }
        if let Some(key_bits) = self.key_bits {
            config.key_bits = key_bits;
        }
        if let Some(spends) = self.spends {
            config.spends = spends;
        }
        if let Some(challenge) = self.challenge {
            config.challenge = challenge;
        }
        if self.no_replay_check {
            config.check_merchant_replay = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.into_config()?;

    let report = simulation::run(&config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║              Digital Cash Simulation - Summary                ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    println!("  Owner:        {}", report.buyer);
    println!("  Value:        {}", report.value);
    println!("  Coin GUID:    {}", report.coin_id);
    println!("  Bank key:     {}", report.bank_key_fingerprint);
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("MERCHANT USE");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    for spend in &report.spends {
        println!("  ✓ {} accepted the coin (challenge {})", spend.merchant, spend.challenge);
    }
    println!();

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("DOUBLE-SPENDING CHECK");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    match &report.double_spend {
        Some(outcome) => println!("  {}", describe(outcome)),
        None => println!("  Coin spent once: no double-spend check possible"),
    }

    if let Some(outcome) = &report.merchant_replay {
        println!("\n  Simulated merchant fraud:");
        println!("  {}", describe(outcome));
    }
    println!();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                    End of Simulation                          ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
}

fn describe(outcome: &DetectionOutcome) -> String {
    match outcome {
        DetectionOutcome::DoubleSpendDetected { identity } => {
            format!("✗ Double spending identified. User: {}", identity)
        }
        DetectionOutcome::MerchantReplay => "✗ Merchant cheating detected (RIS match)".to_string(),
        DetectionOutcome::MalformedEvidence { index } => {
            format!("✗ Merchant cheating detected (malformed RIS at index {})", index)
        }
        DetectionOutcome::Inconclusive => "? Could not identify double spender".to_string(),
    }
}
