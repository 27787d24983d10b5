//! # dutch-blitz
//!
//! A Dutch Blitz simulation in which four player threads race to play cards
//! onto shared dutch piles.
//!
//! ## Design Principles
//!
//! 1. **Fair Turn Taking**: The table sits behind a [`FairLock`], which hands
//!    ownership to waiting players strictly in arrival order. A plain
//!    `std::sync::Mutex` can be swapped in through [`LockKind::Plain`].
//!
//! 2. **Search Reads, Apply Writes**: The move search only rearranges the
//!    searching player's own piles. The dutch piles change in exactly one
//!    place, the apply step, in the same critical section as the search.
//!
//! 3. **Invariants Are Values**: A broken table invariant comes back as an
//!    [`InvariantViolation`]; "no legal move" is an ordinary decision.
//!
//! ## Modules
//!
//! - `core`: cards, piles, player ids, the dealing RNG
//! - `sync`: fair lock, fair condition, start barrier
//! - `game`: table, move search, apply step, rounds, scoring
//! - `config`: simulation configuration
//! - `error`: error types

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod sync;

pub use crate::config::{LockKind, SearchLimits, SimConfig};

pub use crate::core::{Card, Color, GameRng, Pile, PlayerId, PlayerMap, PLAYER_COUNT};

pub use crate::error::{InvariantViolation, SimError};

pub use crate::game::{
    Decision, DutchPileSet, PlayerPiles, RoundOutcome, RoundReport, Scoreboard, Simulation,
    Source, StuckReason, Table, Turn,
};

pub use crate::sync::{FairCondition, FairLock, FairLockGuard, StartBarrier, TableLock};
