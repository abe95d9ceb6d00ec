use std::any::Any;

use addchain_core::alg::ensemble::ensemble;
use addchain_core::exec::{best, Parallel};
use clap::{Args, Parser, Subcommand, ValueEnum};
use num::BigUint;
use num_traits::One;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::{self, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Profile the default ensemble on well-known exponents.
#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Profile(ProfileArgs),
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    /// Output formats
    #[clap(short, long, value_enum)]
    format: Option<Vec<Format>>,

    /// Exponent to search for. Runs all of them if not supplied.
    #[clap(long, value_enum)]
    name: Option<Exponent>,

    /// Maximum number of algorithms to run concurrently
    #[clap(short, long)]
    limit: Option<usize>,
}

#[derive(Debug, Clone, ValueEnum, PartialEq)]
enum Format {
    Default,
    Chrome,
}

#[derive(Debug, Clone, Copy, ValueEnum, EnumIter, strum_macros::Display)]
enum Exponent {
    /// p - 2 for p = 2^255 - 19
    #[value(name = "curve25519-inv")]
    #[strum(serialize = "curve25519-inv")]
    Curve25519Inverse,
    /// (p - 5) / 8 for p = 2^255 - 19
    #[value(name = "curve25519-sqrt")]
    #[strum(serialize = "curve25519-sqrt")]
    Curve25519Sqrt,
    /// p - 2 for the NIST P-256 prime
    #[value(name = "p256-inv")]
    #[strum(serialize = "p256-inv")]
    P256Inverse,
    /// p - 2 for the secp256k1 prime
    #[value(name = "secp256k1-inv")]
    #[strum(serialize = "secp256k1-inv")]
    Secp256k1Inverse,
}

impl Exponent {
    fn value(self) -> BigUint {
        let pow2 = |e: u32| BigUint::one() << e;
        match self {
            Exponent::Curve25519Inverse => pow2(255) - 21u32,
            Exponent::Curve25519Sqrt => pow2(252) - 3u32,
            Exponent::P256Inverse => pow2(256) - pow2(224) + pow2(192) + pow2(96) - 3u32,
            Exponent::Secp256k1Inverse => pow2(256) - pow2(32) - 979u32,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => profile(args),
    }
}

fn profile(args: ProfileArgs) {
    let mut layers = Vec::new();

    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_filter(log_filter)
        .boxed();
    layers.push(log_layer);

    let mut guards: Vec<Box<dyn Any>> = vec![];

    if let Some(format) = &args.format {
        if format.contains(&Format::Default) {
            let collector_layer = tracing_subscriber::fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .compact()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .boxed();
            layers.push(collector_layer);
        }
        if format.contains(&Format::Chrome) {
            let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
            layers.push(chrome_layer.boxed());
            guards.push(Box::new(guard));
            tracing::info!("Running tracing-chrome. Files will be saved as trace-<some timestamp>.json and can be viewed in https://ui.perfetto.dev/");
        }
    }

    tracing_subscriber::registry().with(layers).init();

    let executor = args.limit.map_or_else(Parallel::new, Parallel::with_limit);
    let exponents: Vec<Exponent> = match args.name {
        Some(name) => vec![name],
        None => Exponent::iter().collect(),
    };
    let algorithms = ensemble();
    for exponent in exponents {
        let span = tracing::info_span!("profile", %exponent);
        span.in_scope(|| {
            let n = exponent.value();
            let results = executor.execute(&n, &algorithms);
            for r in results.iter() {
                match (&r.result, r.program()) {
                    (Ok((c, _)), Some(p)) => tracing::info!(
                        length = c.len(),
                        doubles = p.doubles(),
                        adds = p.adds(),
                        elapsed = ?r.elapsed,
                        "{}",
                        r.algorithm
                    ),
                    _ => tracing::info!(elapsed = ?r.elapsed, "{} failed", r.algorithm),
                }
            }
            if let Some(r) = best(&results) {
                tracing::info!(
                    length = r.chain().map_or(0, |c| c.len()),
                    "best for {exponent}: {}",
                    r.algorithm
                );
            }
        });
    }
    drop(guards);
}
