//! Core value types: cards, piles, players and the dealing RNG.
//!
//! Everything here is single-threaded plain data; the concurrency lives in
//! `sync` and `game::round`.

pub mod card;
pub mod pile;
pub mod player;
pub mod rng;

pub use card::{Card, Color, DECK_SIZE, MAX_RANK};
pub use pile::Pile;
pub use player::{PlayerId, PlayerMap, PLAYER_COUNT};
pub use rng::GameRng;
