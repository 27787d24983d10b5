//! Simulation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which lock guards the table during a threaded round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum LockKind {
    /// [`crate::sync::FairLock`]: FIFO hand-off between players.
    #[default]
    Fair,
    /// `std::sync::Mutex`, kept for comparison.
    Plain,
}

/// Bounds on one move search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Passes through the wood pile before giving up until the dutch piles
    /// change.
    pub max_rounds: usize,

    /// How often one search may move the wood discard top under the draw
    /// pile to break a cycle.
    pub max_rotations: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_rounds: 500,
            max_rotations: 3,
        }
    }
}

/// Configuration for a batch of simulated rounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Rounds to simulate.
    pub rounds: u32,

    /// Master seed; `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Lock used for threaded rounds.
    pub lock: LockKind,

    /// Play every round round-robin in the calling thread instead of with
    /// four player threads. Deterministic for a given seed.
    pub sequential: bool,

    pub search: SearchLimits,

    /// Pause after every turn (zero yields the thread instead).
    pub turn_pause: Duration,

    /// Pause while marked as stuck, giving the other players a window to
    /// report stuck too.
    pub idle_pause: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rounds: 1000,
            seed: None,
            lock: LockKind::Fair,
            sequential: false,
            search: SearchLimits::default(),
            turn_pause: Duration::ZERO,
            idle_pause: Duration::from_micros(500),
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_lock(mut self, lock: LockKind) -> Self {
        self.lock = lock;
        self
    }

    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn with_search(mut self, search: SearchLimits) -> Self {
        self.search = search;
        self
    }

    pub fn with_turn_pause(mut self, pause: Duration) -> Self {
        self.turn_pause = pause;
        self
    }

    pub fn with_idle_pause(mut self, pause: Duration) -> Self {
        self.idle_pause = pause;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.rounds, 1000);
        assert_eq!(config.seed, None);
        assert_eq!(config.lock, LockKind::Fair);
        assert_eq!(config.search.max_rounds, 500);
        assert_eq!(config.search.max_rotations, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SimConfig::new()
            .with_rounds(10)
            .with_seed(7)
            .with_lock(LockKind::Plain)
            .with_sequential(true)
            .with_idle_pause(Duration::from_millis(1));

        assert_eq!(config.rounds, 10);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.lock, LockKind::Plain);
        assert!(config.sequential);
        assert_eq!(config.idle_pause, Duration::from_millis(1));
    }

    #[test]
    fn test_serialization() {
        let config = SimConfig::default().with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
