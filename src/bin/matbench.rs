//! Benchmark CLI: runs the square sweep, then the rectangular sweep.

use std::error::Error;

use clap::Parser;
use log::{error, info};
use matbench::backend::ReferenceBackend;
use matbench::benchmarks::{
    BenchmarkRunner, ConfigLoader, DEFAULT_SEED, MatrixGenerator, StdoutSink, SweepDriver,
};
use matbench::errors::BenchmarkResult;

#[derive(Parser, Debug)]
#[command(
    name = "matbench",
    version,
    about = "bf16 inner-product and GEMM throughput across problem-size sweeps"
)]
struct Cli {
    /// Enable verbose backend diagnostics during kernel execution
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run_benchmarks(&cli) {
        error!("Benchmark execution failed: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            error!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run_benchmarks(cli: &Cli) -> BenchmarkResult<()> {
    let config = ConfigLoader::load_sweep_config()?;

    let mut generator = MatrixGenerator::new(DEFAULT_SEED);
    if let Some(threads) = config.generator_threads {
        generator = generator.with_workers(threads);
    }
    let mut backend = ReferenceBackend::new();
    if let Some(threads) = config.backend_threads {
        backend = backend.with_threads(threads);
    }

    let runner = BenchmarkRunner::new(backend, generator).with_debug(cli.debug);
    let driver = SweepDriver::new(runner);
    let mut sink = StdoutSink;

    driver.run_all(&config, &mut sink)?;
    info!("All sweeps completed successfully");
    Ok(())
}
