//! Error types.
//!
//! Invariant violations mean the rules engine or the locking is broken; the
//! binary reports them and exits. "No legal move" is not an error and never
//! shows up here.

use thiserror::Error;

use crate::core::{Card, PlayerId};

/// A broken table invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("post pile {pile} of player {player}: {upper:?} cannot sit on {lower:?}")]
    PostPileOrder {
        player: PlayerId,
        pile: usize,
        lower: Card,
        upper: Card,
    },

    #[error("dutch pile {pile}: {card:?} at position {position}")]
    DutchPileOrder {
        pile: usize,
        position: usize,
        card: Card,
    },

    #[error("all {slots} dutch pile slots in use, cannot start a pile with {card:?}")]
    DutchSlotsExhausted { slots: usize, card: Card },

    #[error("player {player} recorded as winner with {remaining} blitz cards left")]
    WinnerNotBlitzed { player: PlayerId, remaining: usize },
}

/// Errors ending a simulated round.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("failed to spawn task for player {player}: {source}")]
    Spawn {
        player: PlayerId,
        #[source]
        source: std::io::Error,
    },

    #[error("task for player {0} panicked")]
    PlayerPanicked(PlayerId),
}

/// Serialized data that does not describe a valid card or pile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("card byte {0:#04x} has a rank above 9")]
    CardRank(u8),

    #[error("pile holds {len} cards but its capacity is {capacity}")]
    PileOverflow { len: usize, capacity: usize },
}
