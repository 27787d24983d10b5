//! Game state for one round: every player's private piles, the shared
//! dutch piles and the winner.
//!
//! A `Table` is only ever touched while holding the round's lock. Each
//! player task mutates its own `PlayerPiles` and the shared `DutchPileSet`;
//! nobody writes another player's piles.

use std::fmt;

use crate::core::{Card, GameRng, Pile, PlayerId, PlayerMap, DECK_SIZE};
use crate::error::InvariantViolation;

/// Post piles per player.
pub const POST_PILES: usize = 3;

/// Cards dealt to the blitz pile.
pub const BLITZ_SIZE: usize = 10;

/// Capacity of post, blitz and dutch piles (one card per rank).
pub const PILE_CAPACITY: usize = 10;

/// Capacity of each wood pile.
pub const WOOD_CAPACITY: usize = 30;

/// Dutch pile slots: four players times four front colors.
pub const DUTCH_SLOTS: usize = 16;

/// The piles one player owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerPiles {
    pub player: PlayerId,
    /// The shuffled deck the piles were dealt from.
    pub deck: Vec<Card>,
    pub post: [Pile; POST_PILES],
    pub blitz: Pile,
    /// Wood pile in hand, drawn from.
    pub wood_draw: Pile,
    /// Wood pile face up on the table.
    pub wood_discard: Pile,
}

impl PlayerPiles {
    /// Deal a shuffled 40-card deck: one card to each post pile, ten to the
    /// blitz pile, the rest to the wood draw pile.
    ///
    /// Panics if `deck` does not hold exactly 40 cards.
    pub fn deal(player: PlayerId, deck: Vec<Card>) -> Self {
        assert_eq!(deck.len(), DECK_SIZE, "deck must hold {DECK_SIZE} cards");

        let mut cards = deck.iter().copied();
        let post = std::array::from_fn(|_| {
            let mut pile = Pile::with_capacity(PILE_CAPACITY);
            pile.extend(cards.by_ref().take(1));
            pile
        });
        let mut blitz = Pile::with_capacity(PILE_CAPACITY);
        blitz.extend(cards.by_ref().take(BLITZ_SIZE));
        let mut wood_draw = Pile::with_capacity(WOOD_CAPACITY);
        wood_draw.extend(cards);

        Self {
            player,
            deck,
            post,
            blitz,
            wood_draw,
            wood_discard: Pile::with_capacity(WOOD_CAPACITY),
        }
    }

    /// Cards left in both wood piles together.
    #[must_use]
    pub fn wood_len(&self) -> usize {
        self.wood_draw.len() + self.wood_discard.len()
    }

    /// Check every post pile descends by one with alternating color
    /// families and a single back color.
    pub fn validate_posts(&self) -> Result<(), InvariantViolation> {
        for (pile, post) in self.post.iter().enumerate() {
            for pair in post.cards().windows(2) {
                let (lower, upper) = (pair[0], pair[1]);
                if !upper.stacks_on(lower) || upper.back() != lower.back() {
                    return Err(InvariantViolation::PostPileOrder {
                        player: self.player,
                        pile,
                        lower,
                        upper,
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlayerPiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Piles for player {}", self.player)?;
        writeln!(f, "Blitzpile: {}", self.blitz)?;
        for (i, post) in self.post.iter().enumerate() {
            writeln!(f, "Postpile#{i}: {post}")?;
        }
        writeln!(f, "Total cards in wood piles {}", self.wood_len())?;
        writeln!(f, "Woodpile (discard): {}", self.wood_discard)?;
        writeln!(f, "Woodpile (draw): {}", self.wood_draw)
    }
}

/// Where a card lands on the dutch piles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A zero starts a new pile in the next free slot.
    Start,
    /// Onto the existing pile at this slot.
    Onto(usize),
}

/// The shared ascending piles every player builds on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DutchPileSet {
    piles: Vec<Pile>,
}

impl DutchPileSet {
    pub fn new() -> Self {
        Self {
            piles: Vec::with_capacity(DUTCH_SLOTS),
        }
    }

    /// Where `card` could be played, if anywhere.
    #[must_use]
    pub fn find(&self, card: Card) -> Option<Placement> {
        if card.rank() == 0 {
            return Some(Placement::Start);
        }
        self.piles
            .iter()
            .position(|pile| {
                pile.top().is_some_and(|top| {
                    top.rank() + 1 == card.rank() && top.front() == card.front()
                })
            })
            .map(Placement::Onto)
    }

    #[must_use]
    pub fn fits(&self, card: Card) -> bool {
        self.find(card).is_some()
    }

    /// Play `card` if it fits. Returns `Ok(None)` without touching any pile
    /// when it does not.
    pub fn place(&mut self, card: Card) -> Result<Option<Placement>, InvariantViolation> {
        let Some(placement) = self.find(card) else {
            return Ok(None);
        };
        match placement {
            Placement::Start => {
                if self.piles.len() >= DUTCH_SLOTS {
                    return Err(InvariantViolation::DutchSlotsExhausted {
                        slots: DUTCH_SLOTS,
                        card,
                    });
                }
                let mut pile = Pile::with_capacity(PILE_CAPACITY);
                pile.push(card);
                self.piles.push(pile);
            }
            Placement::Onto(slot) => self.piles[slot].push(card),
        }
        Ok(Some(placement))
    }

    /// Piles in the order they were started.
    #[must_use]
    pub fn piles(&self) -> &[Pile] {
        &self.piles
    }

    /// Number of piles started.
    #[must_use]
    pub fn len(&self) -> usize {
        self.piles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.piles.is_empty()
    }

    /// Every card on every dutch pile.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.piles.iter().flat_map(|pile| pile.cards().iter().copied())
    }

    /// Check every pile is the run 0, 1, 2, ... in one front color.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (pile, cards) in self.piles.iter().map(Pile::cards).enumerate() {
            let Some(first) = cards.first() else {
                continue;
            };
            for (position, &card) in cards.iter().enumerate() {
                if usize::from(card.rank()) != position || card.front() != first.front() {
                    return Err(InvariantViolation::DutchPileOrder {
                        pile,
                        position,
                        card,
                    });
                }
            }
        }
        Ok(())
    }

    /// One-line summary of pile sizes.
    pub fn sizes(&self) -> String {
        let sizes: Vec<_> = self.piles.iter().map(|p| format!("{:2}", p.len())).collect();
        format!("Dutch pile sizes: {}", sizes.join(" "))
    }
}

impl fmt::Display for DutchPileSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.sizes())?;
        for pile in &self.piles {
            writeln!(f, "{pile}")?;
        }
        Ok(())
    }
}

/// All state of one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub players: PlayerMap<PlayerPiles>,
    pub dutch: DutchPileSet,
    winner: Option<PlayerId>,
}

impl Table {
    /// A table with the given piles and no dutch piles yet.
    pub fn new(players: PlayerMap<PlayerPiles>) -> Self {
        Self {
            players,
            dutch: DutchPileSet::new(),
            winner: None,
        }
    }

    /// Shuffle and deal a fresh deck for every player, each from its own
    /// stream of `rng`.
    pub fn deal(rng: &GameRng) -> Self {
        Self::new(PlayerMap::new(|player| {
            let deck = rng.for_context(player.name()).shuffled_deck(player.color());
            PlayerPiles::deal(player, deck)
        }))
    }

    /// The player who blitzed first, if anyone has.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// Has anyone emptied their blitz pile?
    #[must_use]
    pub fn is_blitzed(&self) -> bool {
        self.winner.is_some()
    }

    /// Record `player` as the winner unless someone already is.
    ///
    /// Returns whether this call set the winner. A new winner triggers a
    /// full validation of the table.
    pub fn claim_win(&mut self, player: PlayerId) -> Result<bool, InvariantViolation> {
        if self.winner.is_some() {
            return Ok(false);
        }
        self.winner = Some(player);
        self.validate()?;
        Ok(true)
    }

    /// Check the post pile and dutch pile invariants, and that a recorded
    /// winner really has an empty blitz pile.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for (_, piles) in self.players.iter() {
            piles.validate_posts()?;
        }
        self.dutch.validate()?;
        if let Some(player) = self.winner {
            let remaining = self.players[player].blitz.len();
            if remaining > 0 {
                return Err(InvariantViolation::WinnerNotBlitzed { player, remaining });
            }
        }
        Ok(())
    }
}

/// Dumps the end-of-round state: winner first, then everyone else, then
/// the dutch piles (in full only when nobody won).
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(winner) => {
                writeln!(f, "Winner is:  {winner}")?;
                write!(f, "{}", self.players[winner])?;
                writeln!(f, "\nOther players:")?;
            }
            None => writeln!(f, "There was no winner:")?,
        }
        for (player, piles) in self.players.iter() {
            if Some(player) != self.winner {
                writeln!(f, "{piles}")?;
            }
        }
        if self.is_blitzed() {
            writeln!(f, "{}", self.dutch.sizes())
        } else {
            write!(f, "{}", self.dutch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Color;

    fn card(back: Color, front: Color, rank: u8) -> Card {
        Card::new(back, front, rank)
    }

    fn dealt(seed: u64) -> Table {
        Table::deal(&GameRng::new(seed))
    }

    #[test]
    fn test_deal_layout() {
        let table = dealt(1);
        for (player, piles) in table.players.iter() {
            assert_eq!(piles.player, player);
            assert!(piles.post.iter().all(|p| p.len() == 1));
            assert_eq!(piles.blitz.len(), BLITZ_SIZE);
            assert_eq!(piles.wood_draw.len(), 27);
            assert!(piles.wood_discard.is_empty());
            assert_eq!(piles.post[0].top(), Some(piles.deck[0]));
            assert_eq!(piles.blitz.top(), Some(piles.deck[12]));
            assert_eq!(piles.wood_draw.top(), Some(piles.deck[39]));
            assert!(piles.deck.iter().all(|c| c.back() == player.color()));
        }
        assert!(table.dutch.is_empty());
        assert_eq!(table.winner(), None);
        table.validate().unwrap();
    }

    #[test]
    fn test_dutch_find_and_place() {
        let mut dutch = DutchPileSet::new();
        let red0 = card(Color::Blue, Color::Red, 0);
        let red1 = card(Color::Green, Color::Red, 1);
        let blue1 = card(Color::Green, Color::Blue, 1);

        assert_eq!(dutch.find(red1), None);
        assert_eq!(dutch.place(red1).unwrap(), None);
        assert!(dutch.is_empty());

        assert_eq!(dutch.place(red0).unwrap(), Some(Placement::Start));
        assert!(!dutch.fits(blue1));
        assert_eq!(dutch.place(red1).unwrap(), Some(Placement::Onto(0)));
        assert_eq!(dutch.piles()[0].len(), 2);
        dutch.validate().unwrap();
    }

    #[test]
    fn test_dutch_slots_exhausted() {
        let mut dutch = DutchPileSet::new();
        for i in 0..DUTCH_SLOTS {
            let c = card(Color::from_bits(i as u8 / 4), Color::from_bits(i as u8), 0);
            dutch.place(c).unwrap();
        }
        let extra = card(Color::Red, Color::Red, 0);
        assert_eq!(
            dutch.place(extra),
            Err(InvariantViolation::DutchSlotsExhausted {
                slots: DUTCH_SLOTS,
                card: extra
            })
        );
    }

    #[test]
    fn test_dutch_validate_catches_gap() {
        let mut pile = Pile::with_capacity(PILE_CAPACITY);
        pile.push(card(Color::Red, Color::Green, 0));
        pile.push(card(Color::Red, Color::Green, 2));
        let dutch = DutchPileSet { piles: vec![pile] };
        assert!(matches!(
            dutch.validate(),
            Err(InvariantViolation::DutchPileOrder { pile: 0, position: 1, .. })
        ));
    }

    #[test]
    fn test_post_validation() {
        let mut table = dealt(2);
        let player = PlayerId::new(0);
        let piles = &mut table.players[player];
        piles.post[0] = Pile::with_capacity(PILE_CAPACITY);
        piles.post[0].push(card(Color::Red, Color::Blue, 5));
        piles.post[0].push(card(Color::Red, Color::Red, 4));
        table.validate().unwrap();

        // Same color family breaks alternation.
        table.players[player].post[0].push(card(Color::Red, Color::Green, 3));
        assert!(matches!(
            table.validate(),
            Err(InvariantViolation::PostPileOrder { pile: 0, .. })
        ));
    }

    #[test]
    fn test_claim_win_is_idempotent() {
        let mut table = dealt(3);
        let first = PlayerId::new(2);
        while table.players[first].blitz.pop().is_some() {}

        assert_eq!(table.claim_win(first), Ok(true));
        assert_eq!(table.claim_win(PlayerId::new(1)), Ok(false));
        assert_eq!(table.winner(), Some(first));
        assert!(table.is_blitzed());
    }

    #[test]
    fn test_winner_must_have_empty_blitz() {
        let mut table = dealt(4);
        let player = PlayerId::new(1);
        assert_eq!(
            table.claim_win(player),
            Err(InvariantViolation::WinnerNotBlitzed {
                player,
                remaining: BLITZ_SIZE
            })
        );
    }

    #[test]
    fn test_display_dump() {
        let table = dealt(5);
        let text = table.to_string();
        assert!(text.starts_with("There was no winner:"));
        assert!(text.contains("Piles for player Y"));
        assert!(text.contains("Dutch pile sizes:"));
    }
}
