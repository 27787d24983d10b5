//! Card values.
//!
//! A Dutch Blitz deck holds 40 cards per player: every combination of four
//! front colors and ranks 0-9, all sharing the owner's back color. A card is
//! packed into a single byte:
//!
//! ```text
//! back1 back0 front1 front0 r3 r2 r1 r0
//! ```
//!
//! ## Example
//!
//! ```
//! use dutch_blitz::core::{Card, Color};
//!
//! let card = Card::new(Color::Blue, Color::Red, 3);
//! assert_eq!(card.back(), Color::Blue);
//! assert_eq!(card.front(), Color::Red);
//! assert_eq!(card.rank(), 3);
//! assert_eq!(card.to_string(), "R3");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Highest card rank.
pub const MAX_RANK: u8 = 9;

/// Cards in one player's deck.
pub const DECK_SIZE: usize = 40;

/// One of the four card colors, used both for fronts and backs.
///
/// Red and Green are "girl" cards, Blue and Yellow "boy" cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    Red = 0,
    Green = 1,
    Blue = 2,
    Yellow = 3,
}

impl Color {
    /// All colors in encoding order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

    /// Decode a 2-bit color value. Higher bits are ignored.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Color::Red,
            1 => Color::Green,
            2 => Color::Blue,
            _ => Color::Yellow,
        }
    }

    /// The 2-bit encoding of this color.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Whether two colors belong to opposite families (girl vs boy).
    ///
    /// Post piles must alternate between opposite colors.
    #[must_use]
    pub const fn is_opposite(self, other: Color) -> bool {
        (self.bits() & 2) != (other.bits() & 2)
    }

    /// Single-letter name.
    #[must_use]
    pub const fn letter(self) -> &'static str {
        match self {
            Color::Red => "R",
            Color::Green => "G",
            Color::Blue => "B",
            Color::Yellow => "Y",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

/// An immutable card: back color, front color and rank.
///
/// Serializes as its packed byte; deserializing rejects bad ranks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    /// Create a card.
    ///
    /// Panics if `rank` exceeds [`MAX_RANK`].
    #[must_use]
    pub const fn new(back: Color, front: Color, rank: u8) -> Self {
        assert!(rank <= MAX_RANK, "card rank out of range");
        Self(back.bits() << 6 | front.bits() << 4 | rank)
    }

    /// Decode a packed card, rejecting ranks above [`MAX_RANK`].
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & 0xf > MAX_RANK {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// The packed encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn back(self) -> Color {
        Color::from_bits(self.0 >> 6)
    }

    #[must_use]
    pub const fn front(self) -> Color {
        Color::from_bits(self.0 >> 4)
    }

    #[must_use]
    pub const fn rank(self) -> u8 {
        self.0 & 0xf
    }

    /// Can this card sit directly on `below` in a post pile?
    ///
    /// Post piles descend by one with alternating color families.
    #[must_use]
    pub const fn stacks_on(self, below: Card) -> bool {
        below.rank() == self.rank() + 1 && self.front().is_opposite(below.front())
    }

    /// Format including the back color, e.g. `R3|B`.
    #[must_use]
    pub fn with_back(self) -> String {
        format!("{}{}|{}", self.front(), self.rank(), self.back())
    }

    /// A full unshuffled deck with the given back color.
    ///
    /// Cards are grouped by front color, ranks ascending.
    #[must_use]
    pub fn deck(back: Color) -> Vec<Card> {
        Color::ALL
            .iter()
            .flat_map(|&front| (0..=MAX_RANK).map(move |rank| Card::new(back, front, rank)))
            .collect()
    }
}

impl TryFrom<u8> for Card {
    type Error = DecodeError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Card::from_bits(bits).ok_or(DecodeError::CardRank(bits))
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.bits()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.front(), self.rank())
    }
}

impl std::fmt::Debug for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.with_back())
    }
}
