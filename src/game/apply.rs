//! The apply step: the only code that writes the dutch piles.
//!
//! Must run inside the round's exclusive section, in the same critical
//! section as the search that produced the decision, so the fit check and
//! the push cannot be separated by another player's move.

use tracing::debug;

use crate::config::SearchLimits;
use crate::core::PlayerId;
use crate::error::InvariantViolation;

use super::search::{find_move, Decision, Source, StuckReason};
use super::table::Table;

/// What one turn achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// A card moved. `won` is set when this turn made the player the winner.
    Moved { won: bool },
    /// The chosen card no longer fits; nothing changed.
    Rejected(Source),
    Stuck(StuckReason),
}

impl Turn {
    #[must_use]
    pub fn made_move(self) -> bool {
        matches!(self, Turn::Moved { .. })
    }

    #[must_use]
    pub fn won(self) -> bool {
        matches!(self, Turn::Moved { won: true })
    }
}

/// Carry out `decision` for `player`.
///
/// A card played from a source leaves that pile and lands on exactly one
/// dutch pile. Emptying the blitz pile claims the win, which validates the
/// whole table.
pub fn apply(table: &mut Table, player: PlayerId, decision: Decision) -> Result<Turn, InvariantViolation> {
    let source = match decision {
        Decision::Stuck(reason) => {
            debug!(player = %player, ?reason, "player stuck");
            return Ok(Turn::Stuck(reason));
        }
        Decision::Blitzed => {
            let won = table.claim_win(player)?;
            debug!(player = %player, won, "blitzed from post piles");
            return Ok(Turn::Moved { won });
        }
        Decision::Play(source) => source,
    };

    let piles = &mut table.players[player];
    let Some(card) = source.pile(piles).top() else {
        return Ok(Turn::Rejected(source));
    };
    let Some(placement) = table.dutch.place(card)? else {
        return Ok(Turn::Rejected(source));
    };
    source.pile_mut(piles).pop();
    debug!(player = %player, %card, ?source, ?placement, "puts card on dutch pile");

    let emptied_blitz = source == Source::Blitz && piles.blitz.is_empty();
    let won = emptied_blitz && table.claim_win(player)?;
    Ok(Turn::Moved { won })
}

/// Search for and apply one move. Runs entirely inside the critical section.
pub fn take_turn(table: &mut Table, player: PlayerId, limits: &SearchLimits) -> Result<Turn, InvariantViolation> {
    let decision = find_move(&mut table.players[player], &table.dutch, limits);
    apply(table, player, decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, Color, GameRng, Pile};
    use crate::game::table::{Placement, PILE_CAPACITY};

    fn table() -> Table {
        Table::deal(&GameRng::new(17))
    }

    fn set_blitz(table: &mut Table, player: PlayerId, cards: &[Card]) {
        let mut blitz = Pile::with_capacity(PILE_CAPACITY);
        blitz.extend(cards.iter().copied());
        table.players[player].blitz = blitz;
    }

    #[test]
    fn test_play_moves_exactly_one_card() {
        let mut table = table();
        let player = PlayerId::new(1);
        let zero = Card::new(Color::Green, Color::Yellow, 0);
        set_blitz(&mut table, player, &[Card::new(Color::Green, Color::Red, 5), zero]);

        let turn = apply(&mut table, player, Decision::Play(Source::Blitz)).unwrap();
        assert_eq!(turn, Turn::Moved { won: false });
        assert_eq!(table.players[player].blitz.len(), 1);
        assert_eq!(table.dutch.piles()[0].cards(), &[zero]);
        assert_eq!(table.winner(), None);
    }

    #[test]
    fn test_last_blitz_card_wins() {
        let mut table = table();
        let player = PlayerId::new(2);
        set_blitz(&mut table, player, &[Card::new(Color::Blue, Color::Blue, 0)]);

        let turn = apply(&mut table, player, Decision::Play(Source::Blitz)).unwrap();
        assert!(turn.won());
        assert_eq!(table.winner(), Some(player));
    }

    #[test]
    fn test_second_blitz_does_not_steal_win() {
        let mut table = table();
        let first = PlayerId::new(0);
        let second = PlayerId::new(3);
        set_blitz(&mut table, first, &[Card::new(Color::Red, Color::Red, 0)]);
        set_blitz(&mut table, second, &[Card::new(Color::Yellow, Color::Red, 0)]);

        assert!(apply(&mut table, first, Decision::Play(Source::Blitz)).unwrap().won());
        let late = apply(&mut table, second, Decision::Play(Source::Blitz)).unwrap();
        assert_eq!(late, Turn::Moved { won: false });
        assert_eq!(table.winner(), Some(first));
    }

    #[test]
    fn test_stale_decision_is_rejected() {
        let mut table = table();
        let player = PlayerId::new(0);
        set_blitz(&mut table, player, &[Card::new(Color::Red, Color::Green, 4)]);
        let before = table.clone();

        let turn = apply(&mut table, player, Decision::Play(Source::Blitz)).unwrap();
        assert_eq!(turn, Turn::Rejected(Source::Blitz));
        assert_eq!(table, before);
    }

    #[test]
    fn test_stuck_changes_nothing() {
        let mut table = table();
        let before = table.clone();
        let turn = apply(&mut table, PlayerId::new(1), Decision::Stuck(StuckReason::WoodExhausted)).unwrap();
        assert!(!turn.made_move());
        assert_eq!(table, before);
    }

    #[test]
    fn test_take_turn_plays_onto_existing_pile() {
        let mut table = table();
        let player = PlayerId::new(1);
        table.dutch.place(Card::new(Color::Red, Color::Blue, 0)).unwrap();
        set_blitz(&mut table, player, &[Card::new(Color::Green, Color::Red, 7), Card::new(Color::Green, Color::Blue, 1)]);

        let turn = take_turn(&mut table, player, &SearchLimits::default()).unwrap();
        assert_eq!(turn, Turn::Moved { won: false });
        assert_eq!(table.dutch.find(Card::new(Color::Red, Color::Blue, 2)), Some(Placement::Onto(0)));
        table.validate().unwrap();
    }
}
