//! Synthetic matching benchmark.
//!
//! Installs 10,000 random rules over the factor pool, generates 100 random
//! records and reports the average matching latency per record.
//!
//! ```text
//! cargo run --release --example benchmark
//! RUST_LOG=debug cargo run --release --example benchmark
//! ```

use rand::SeedableRng;
use rand::rngs::StdRng;
use rulematch::{
    Consistency, RuleRepository, RulematchError, Schema, SynthConfig, Synthesizer, benchmark,
    benchmark_parallel, generate, inject_random_rules,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const RULES: usize = 10_000;
const INPUTS: usize = 100;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .ok();
}

fn main() -> Result<(), RulematchError> {
    init_tracing();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);

    let schema = Schema::factor_pool();
    let synthesizer = Synthesizer::new(&schema, SynthConfig::default())?;
    let repo = RuleRepository::with_consistency(Consistency::Phased);
    inject_random_rules(&repo, &synthesizer, RULES, &mut rng)?;

    let inputs = generate(&schema, INPUTS, &mut rng);

    let average = benchmark(&repo, &inputs)?;
    println!(
        "average match time per record: {average:?} ({} ns)",
        average.as_nanos()
    );

    let threads = std::thread::available_parallelism().map_or(1, usize::from);
    let report = benchmark_parallel(&repo, &inputs, threads)?;
    println!("{report}");
    Ok(())
}
