//! Dutch Blitz simulator CLI.
//!
//! Plays a number of rounds and prints the four cumulative scores on one
//! line. `OUTPUT=stdout` traces every move to stdout.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dutch_blitz::{LockKind, SimConfig, Simulation};

#[derive(Parser)]
#[command(name = "dutch-blitz")]
#[command(about = "Simulate Dutch Blitz rounds between four player threads")]
struct Args {
    /// Number of rounds to simulate
    #[arg(default_value_t = 1000)]
    rounds: u32,

    /// Master seed (for reproducible deals); drawn from the OS if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Lock guarding the table
    #[arg(long, value_enum, default_value_t = LockKind::Fair)]
    lock: LockKind,

    /// Play rounds round-robin on one thread
    #[arg(long)]
    sequential: bool,

    /// Pause in microseconds while stuck, waiting for the other players
    #[arg(long, default_value_t = 500)]
    idle_pause_us: u64,

    /// Also print wins and stalemates
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn config(&self) -> SimConfig {
        let config = SimConfig::new()
            .with_rounds(self.rounds)
            .with_lock(self.lock)
            .with_sequential(self.sequential)
            .with_idle_pause(Duration::from_micros(self.idle_pause_us));
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn init_logging() {
    let to_stdout = std::env::var("OUTPUT").is_ok_and(|v| v == "stdout");
    let default = if to_stdout { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if to_stdout {
        builder.with_writer(std::io::stdout).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    let mut simulation = Simulation::new(args.config());
    match simulation.run() {
        Ok(board) => {
            info!(seed = simulation.seed(), "simulation finished");
            println!("{}", board.totals_line());
            if args.summary {
                println!("{}", board.summary());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(seed = simulation.seed(), error = %err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
