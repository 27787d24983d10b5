//! Repeated rounds with cumulative scoring.

use tracing::{debug, info};

use crate::config::SimConfig;
use crate::core::{GameRng, PlayerMap};
use crate::error::SimError;

use super::round::{play_round, play_round_sequential, RoundOutcome};
use super::score::{score, Scoreboard};
use super::table::Table;

/// Everything one finished round produced.
#[derive(Clone, Debug)]
pub struct RoundReport {
    /// Seed the round was dealt from.
    pub seed: u64,
    pub outcome: RoundOutcome,
    pub scores: PlayerMap<i32>,
    pub table: Table,
}

/// Drives a batch of rounds from one master seed.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    rng: GameRng,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Master seed, useful to replay a run picked from entropy.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Deal and play the next round.
    pub fn play_round(&mut self) -> Result<RoundReport, SimError> {
        let round_rng = self.rng.fork();
        let seed = round_rng.seed();
        let table = Table::deal(&round_rng);

        let (outcome, table) = if self.config.sequential {
            let mut table = table;
            let outcome = play_round_sequential(&mut table, &self.config.search)?;
            (outcome, table)
        } else {
            play_round(table, &self.config)?
        };
        debug!("{table}");

        let scores = score(&table);
        Ok(RoundReport {
            seed,
            outcome,
            scores,
            table,
        })
    }

    /// Play every configured round and return the totals.
    pub fn run(&mut self) -> Result<Scoreboard, SimError> {
        info!(
            rounds = self.config.rounds,
            seed = self.seed(),
            lock = ?self.config.lock,
            sequential = self.config.sequential,
            "starting simulation"
        );
        let mut board = Scoreboard::new();
        for _ in 0..self.config.rounds {
            let report = self.play_round()?;
            debug!(seed = report.seed, scores = ?report.scores.values(), "round scored");
            board.record(report.outcome, &report.scores);
        }
        Ok(board)
    }
}
