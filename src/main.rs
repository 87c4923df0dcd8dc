//! bb84 - BB84 key distribution playground
//!
//! Runs the protocol with or without an eavesdropper, checks the agreement
//! rate, and sends a short message over the sifted key.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, fmt};

use bb84_qkd::config::QkdConfig;
use bb84_qkd::protocols::qkd::{
    Bb84, DetectionReport, Reconciliation, RoundSetup, Verdict, format_bases, format_bits,
    generate_with_eve, parse_bases, parse_bits,
};
use bb84_qkd::Sampler;
use bb84_qkd::report::{MessageStage, Reporter};

/// Bench data of the 18-round run without an eavesdropper.
const DEMO_SENDER_BASIS: &str = "xx+x+++xx+xxx++x+x";
const DEMO_SENDER_BITS: &str = "100110011101000101";
const DEMO_RECEIVER_BASIS: &str = "+xxx+++x+xx++x+++x";
const DEMO_RECEIVER_BITS: &str = "101110011001010101";
/// Encrypted `EM` as read by the receiver on the bench.
const DEMO_RECEIVED_MESSAGE: &str = "0100111100";
const DEMO_MESSAGE: &str = "EM";
/// Bench readings of the 18-round run with an eavesdropper.
const DEMO_EVE_RECEIVER_BITS: &str = "101111010111101011";
const DEMO_EVE_BITS: &str = "111111110101101011";

#[derive(Parser)]
#[command(name = "bb84")]
#[command(about = "Simulate BB84 key distribution and encrypt a message with the key")]
#[command(version)]
struct Cli {
    /// TOML config file (band, codec prefix, noise, default rounds)
    #[arg(short, long, global = true, env = "BB84_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the 18-round bench example and decrypt its message
    Demo,

    /// Run one protocol round and send a message over the key
    Run {
        /// Number of photons (defaults to the config value)
        #[arg(short, long)]
        rounds: Option<usize>,

        /// Put an intercept-resend eavesdropper on the link
        #[arg(long)]
        eve: bool,

        /// Message to send if the key is safe
        #[arg(short, long, default_value = DEMO_MESSAGE)]
        message: String,
    },

    /// Repeat many runs and summarize the agreement rates
    Sample {
        /// Number of photons per run
        #[arg(short, long, default_value_t = 2000)]
        rounds: usize,

        /// Number of runs
        #[arg(short, long, default_value_t = 100)]
        trials: usize,

        /// Put an intercept-resend eavesdropper on every run
        #[arg(long)]
        eve: bool,
    },
}

/// Prints every stage for a human reader.
struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn generated(&mut self, setup: &RoundSetup) {
        println!("Sender bases:    {}", format_bases(&setup.sender_basis));
        println!("Sender bits:     {}", format_bits(&setup.sender_bits));
        println!("Receiver bases:  {}", format_bases(&setup.receiver_basis));
        if let Some(eve) = &setup.eve {
            println!("Eve incident:    {}", format_bases(&eve.incident));
            println!("Eve transmitted: {}", format_bases(&eve.transmitted));
        }
    }

    fn transmitted(&mut self, receiver_bits: &[bool], eve_bits: Option<&[bool]>) {
        if let Some(eve) = eve_bits {
            println!("Eve bits:        {}", format_bits(eve));
        }
        println!("Receiver bits:   {}", format_bits(receiver_bits));
    }

    fn reconciled(&mut self, reconciliation: &Reconciliation, key: &[bool]) {
        println!();
        println!("Key:                    {}", format_bits(key));
        println!("Matching bases:         {}", reconciliation.total_compared());
        println!("Matching bits:          {}", reconciliation.agree_count);
        println!("Agreement rate:         {:.3}", reconciliation.agreement_rate());
    }

    fn detected(&mut self, report: &DetectionReport) {
        println!("Bits sent:              {}", report.rounds);
        println!("Bits not matching:      {}", report.disagree_count);
        match report.verdict {
            Verdict::Safe => println!("Key is safe, continue to encryption"),
            Verdict::LikelyEavesdropped => println!("Eve is eavesdropping, create a new key!"),
        }
    }

    fn message_stage(&mut self, stage: MessageStage, bits: &[bool]) {
        let label = match stage {
            MessageStage::Plain => "Message bits",
            MessageStage::Encrypted => "Encrypted message",
            MessageStage::Decrypted => "Decrypted message",
        };
        println!("{label:<22}  {}", format_bits(bits));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let config = match &cli.config {
        Some(path) => QkdConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => QkdConfig::default(),
    };
    let protocol = Bb84::from_config(&config).context("Invalid protocol configuration")?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cli.command {
        Commands::Demo => cmd_demo(&protocol, &mut rng),
        Commands::Run {
            rounds,
            eve,
            message,
        } => cmd_run(
            &protocol,
            rounds.unwrap_or(config.rounds),
            eve,
            &message,
            &mut rng,
        ),
        Commands::Sample {
            rounds,
            trials,
            eve,
        } => cmd_sample(protocol, rounds, trials, eve, &mut rng),
    }
}

fn cmd_demo(protocol: &Bb84, rng: &mut StdRng) -> Result<()> {
    let setup = RoundSetup {
        sender_bits: parse_bits(DEMO_SENDER_BITS)?,
        sender_basis: parse_bases(DEMO_SENDER_BASIS)?,
        receiver_basis: parse_bases(DEMO_RECEIVER_BASIS)?,
        eve: None,
    };

    ConsoleReporter.generated(&setup);

    println!();
    println!("== Simulation ==");
    let theory_bits = protocol.link.transmit(
        &setup.sender_basis,
        &setup.sender_bits,
        &setup.receiver_basis,
        rng,
    )?;
    let theory = protocol.evaluate(setup.clone(), theory_bits, None, &mut ConsoleReporter)?;

    println!();
    println!("== Experiment ==");
    let experiment = protocol.evaluate(
        setup,
        parse_bits(DEMO_RECEIVER_BITS)?,
        None,
        &mut ConsoleReporter,
    )?;

    println!();
    println!(
        "Keys are the same: {}",
        theory.receiver_key == experiment.receiver_key
    );

    println!();
    println!("== Message {DEMO_MESSAGE:?} ==");
    protocol.send(DEMO_MESSAGE, &experiment.sender_key, &mut ConsoleReporter)?;
    let received = parse_bits(DEMO_RECEIVED_MESSAGE)?;
    println!("Receiver got            {}", format_bits(&received));
    let (_, text) = protocol.receive(&received, &experiment.receiver_key, &mut ConsoleReporter)?;
    println!("Recovered text:         {text}");

    println!();
    println!("== 18 rounds with Eve ==");
    let setup = generate_with_eve(DEMO_EVE_BITS.len(), rng)?;
    ConsoleReporter.generated(&setup);

    println!();
    println!("== Simulation ==");
    let eve = setup
        .eve
        .as_ref()
        .context("Eavesdropper bases missing from the setup")?;
    let (theory_bits, theory_eve) = protocol.link.transmit_intercepted(
        &setup.sender_basis,
        &setup.sender_bits,
        &setup.receiver_basis,
        &eve.incident,
        &eve.transmitted,
        rng,
    )?;
    protocol.evaluate(
        setup.clone(),
        theory_bits,
        Some(theory_eve),
        &mut ConsoleReporter,
    )?;

    println!();
    println!("== Experiment ==");
    protocol.evaluate(
        setup,
        parse_bits(DEMO_EVE_RECEIVER_BITS)?,
        Some(parse_bits(DEMO_EVE_BITS)?),
        &mut ConsoleReporter,
    )?;
    Ok(())
}

fn cmd_run(
    protocol: &Bb84,
    rounds: usize,
    eve: bool,
    message: &str,
    rng: &mut StdRng,
) -> Result<()> {
    let outcome = protocol.run(rounds, eve, rng, &mut ConsoleReporter)?;
    println!("Sender and receiver keys match: {}", outcome.keys_match());
    println!("QBER: {:.2}%", outcome.qber());

    if !outcome.detection.is_safe() {
        bail!(
            "Key rejected: agreement rate {:.3} is inside the eavesdropping band",
            outcome.detection.agreement_rate
        );
    }

    println!();
    let exchange = protocol
        .exchange(
            message,
            &outcome.sender_key,
            &outcome.receiver_key,
            &mut ConsoleReporter,
        )
        .context("Message exchange failed")?;
    println!("Recovered text:         {}", exchange.text);
    Ok(())
}

fn cmd_sample(
    protocol: Bb84,
    rounds: usize,
    trials: usize,
    eve: bool,
    rng: &mut StdRng,
) -> Result<()> {
    let summary = Sampler::new(protocol).run(rounds, trials, eve, rng)?;

    println!("Trials:        {}", summary.trials);
    println!("Rounds each:   {rounds}");
    println!("Mean rate:     {:.4}", summary.mean_rate);
    println!("Min / max:     {:.4} / {:.4}", summary.min_rate, summary.max_rate);
    println!(
        "Flagged:       {} ({:.1}%)",
        summary.flagged,
        summary.flagged_ratio() * 100.0
    );
    Ok(())
}
