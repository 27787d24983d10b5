//! Bounded card stacks.
//!
//! Every pile in the game (blitz, post, wood, dutch) is a `Pile`: a stack
//! whose capacity is fixed when it is created. Pushing past the capacity
//! means the rules engine moved a card it never should have, so it panics
//! instead of growing.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::Card;
use crate::error::DecodeError;

/// A bounded stack of cards. Index 0 is the bottom, the last card the top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPile")]
pub struct Pile {
    /// Ten inline slots cover every pile except the wood piles.
    cards: SmallVec<[Card; 10]>,
    capacity: usize,
}

impl Pile {
    /// Create an empty pile holding at most `capacity` cards.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cards: SmallVec::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a card on top.
    ///
    /// Panics if the pile is full.
    pub fn push(&mut self, card: Card) {
        assert!(
            self.cards.len() < self.capacity,
            "pile capacity {} exceeded pushing {}",
            self.capacity,
            card
        );
        self.cards.push(card);
    }

    /// Remove and return the top card.
    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// The top card, if any.
    #[must_use]
    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move the top card to the bottom. No-op on an empty pile.
    pub fn rotate_top_to_bottom(&mut self) {
        if let Some(top) = self.cards.pop() {
            self.cards.insert(0, top);
        }
    }

    /// Move the top card of this pile onto `dest`.
    ///
    /// Returns the moved card, or `None` if this pile was empty.
    pub fn move_top_to(&mut self, dest: &mut Pile) -> Option<Card> {
        let card = self.pop()?;
        dest.push(card);
        Some(card)
    }

    /// Cards from bottom to top.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

/// Deserialized form, checked against the capacity before it becomes a pile.
#[derive(Deserialize)]
struct RawPile {
    cards: SmallVec<[Card; 10]>,
    capacity: usize,
}

impl TryFrom<RawPile> for Pile {
    type Error = DecodeError;

    fn try_from(raw: RawPile) -> Result<Self, Self::Error> {
        if raw.cards.len() > raw.capacity {
            return Err(DecodeError::PileOverflow {
                len: raw.cards.len(),
                capacity: raw.capacity,
            });
        }
        Ok(Self {
            cards: raw.cards,
            capacity: raw.capacity,
        })
    }
}

/// Pushes in order; panics like [`Pile::push`] when full.
impl Extend<Card> for Pile {
    fn extend<I: IntoIterator<Item = Card>>(&mut self, iter: I) {
        for card in iter {
            self.push(card);
        }
    }
}

/// Dumps the pile top first: `R3 <= G2 <= `.
impl std::fmt::Display for Pile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for card in self.cards.iter().rev() {
            write!(f, "{card} <= ")?;
        }
        Ok(())
    }
}
