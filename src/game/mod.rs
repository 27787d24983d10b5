//! The game: table state, move search, apply step, round orchestration and
//! scoring.

pub mod apply;
pub mod round;
pub mod score;
pub mod search;
pub mod simulation;
pub mod table;

pub use apply::{apply, take_turn, Turn};
pub use round::{play_round, play_round_sequential, play_round_with, RoundOutcome};
pub use score::{score, score_player, Scoreboard};
pub use search::{find_move, Decision, Source, StuckReason};
pub use simulation::{RoundReport, Simulation};
pub use table::{DutchPileSet, Placement, PlayerPiles, Table};
