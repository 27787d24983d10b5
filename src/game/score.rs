//! Scoring.
//!
//! A player scores +1 for every card with their back color on the dutch
//! piles and -2 for every card left on their blitz pile.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PlayerMap};

use super::round::RoundOutcome;
use super::table::Table;

/// Points lost per card left on the blitz pile.
pub const BLITZ_PENALTY: i32 = 2;

/// Score of one player for a finished round.
#[must_use]
pub fn score_player(table: &Table, player: PlayerId) -> i32 {
    let left = table.players[player].blitz.len() as i32;
    let played = table
        .dutch
        .cards()
        .filter(|card| card.back() == player.color())
        .count() as i32;
    played - BLITZ_PENALTY * left
}

/// Scores of every player for a finished round.
#[must_use]
pub fn score(table: &Table) -> PlayerMap<i32> {
    PlayerMap::new(|player| score_player(table, player))
}

/// Running totals over many rounds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub totals: PlayerMap<i64>,
    pub wins: PlayerMap<u32>,
    pub stalemates: u32,
    pub rounds: u32,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: RoundOutcome, scores: &PlayerMap<i32>) {
        self.rounds += 1;
        match outcome {
            RoundOutcome::Blitzed(winner) => self.wins[winner] += 1,
            RoundOutcome::Stalemate => self.stalemates += 1,
        }
        for (player, total) in self.totals.iter_mut() {
            *total += i64::from(scores[player]);
        }
    }

    /// The four totals separated by spaces, in seat order.
    #[must_use]
    pub fn totals_line(&self) -> String {
        let totals: Vec<String> = self.totals.values().iter().map(ToString::to_string).collect();
        totals.join(" ")
    }

    /// Wins per player plus stalemates, for `--summary`.
    #[must_use]
    pub fn summary(&self) -> String {
        let wins: Vec<String> = self
            .wins
            .iter()
            .map(|(player, wins)| format!("{player}={wins}"))
            .collect();
        format!(
            "rounds={} wins: {} stalemates={}",
            self.rounds,
            wins.join(" "),
            self.stalemates
        )
    }
}
