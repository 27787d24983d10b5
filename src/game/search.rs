//! Move search: what should a player do next?
//!
//! The search reads the shared dutch piles but never writes them. It does
//! rearrange the player's own piles (blitz to post, post consolidation,
//! turning wood cards) since nobody else can see or touch those.
//!
//! Each round of the search tries, in order:
//!
//! 1. the blitz top on a dutch pile
//! 2. a post top on a dutch pile (post 0, 1, 2)
//! 3. cascading blitz cards onto the post piles; an empty blitz pile wins
//! 4. consolidating single-card post piles, highest rank first
//! 5. three more wood cards, then the new wood top on a dutch pile
//! 6. once the wood pile has been cycled, the wood top onto a post pile
//! 7. once cycled twice, moving the wood top under the draw pile
//!
//! and gives up after [`SearchLimits::max_rounds`] rounds.

use tracing::trace;

use crate::config::SearchLimits;
use crate::core::{Card, Pile};

use super::table::{DutchPileSet, PlayerPiles, POST_PILES};

/// Wood cards turned per draw.
pub const WOOD_DRAW: usize = 3;

/// A pile a card can be played from onto the dutch piles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Blitz,
    Post(usize),
    Wood,
}

impl Source {
    /// The pile this source names.
    pub fn pile(self, piles: &PlayerPiles) -> &Pile {
        match self {
            Source::Blitz => &piles.blitz,
            Source::Post(i) => &piles.post[i],
            Source::Wood => &piles.wood_discard,
        }
    }

    pub fn pile_mut(self, piles: &mut PlayerPiles) -> &mut Pile {
        match self {
            Source::Blitz => &mut piles.blitz,
            Source::Post(i) => &mut piles.post[i],
            Source::Wood => &mut piles.wood_discard,
        }
    }
}

/// Why a search found nothing to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StuckReason {
    /// Every wood card has been played.
    WoodExhausted,
    /// The round cap ran out; only a change on the dutch piles can help.
    RoundsExhausted,
}

/// Result of one search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Play the top card of this source onto a dutch pile.
    Play(Source),
    /// The blitz pile was emptied onto the post piles.
    Blitzed,
    Stuck(StuckReason),
}

/// Find the next move for `piles` against the current dutch piles.
pub fn find_move(piles: &mut PlayerPiles, dutch: &DutchPileSet, limits: &SearchLimits) -> Decision {
    let mut rotations_left = limits.max_rotations;
    let mut round = 0;

    while round < limits.max_rounds {
        if let Some(source) = playable_source(piles, dutch) {
            return Decision::Play(source);
        }

        cascade_blitz(piles);
        if piles.blitz.is_empty() {
            return Decision::Blitzed;
        }

        consolidate_posts(&mut piles.post);

        let Some(wood_top) = advance_wood(piles) else {
            trace!(player = %piles.player, "ran out of wood piles");
            return Decision::Stuck(StuckReason::WoodExhausted);
        };
        if dutch.fits(wood_top) {
            return Decision::Play(Source::Wood);
        }

        // Padding the post piles with wood cards makes room for blitz cards
        // scarcer, so only do it once the whole wood pile has been seen.
        let wood = piles.wood_len();
        if round > wood {
            wood_to_post(piles);
        }

        if round > 2 * wood && rotations_left > 0 && rotate_wood(piles) {
            trace!(player = %piles.player, rotations_left, "rotated wood pile");
            rotations_left -= 1;
            // The rotating pass counts as the first of the new cycle.
            round = 1;
            continue;
        }

        round += 1;
    }

    Decision::Stuck(StuckReason::RoundsExhausted)
}

/// Blitz top first, then post tops in index order.
fn playable_source(piles: &PlayerPiles, dutch: &DutchPileSet) -> Option<Source> {
    std::iter::once(Source::Blitz)
        .chain((0..POST_PILES).map(Source::Post))
        .find(|source| source.pile(piles).top().is_some_and(|card| dutch.fits(card)))
}

/// Move blitz cards onto empty post piles or onto a post top one rank
/// higher of the opposite color family, until nothing moves.
fn cascade_blitz(piles: &mut PlayerPiles) {
    let mut moved = true;
    while moved {
        moved = false;
        for post in piles.post.iter_mut() {
            let Some(card) = piles.blitz.top() else {
                return;
            };
            if post.top().map_or(true, |below| card.stacks_on(below)) {
                piles.blitz.move_top_to(post);
                moved = true;
            }
        }
    }
}

/// Merge single-card post piles pairwise, highest rank first, freeing post
/// piles for the blitz cascade.
fn consolidate_posts(posts: &mut [Pile; POST_PILES]) {
    for rank in (1..=8).rev() {
        for from in 0..POST_PILES {
            let Some(card) = single_card(&posts[from]).filter(|c| c.rank() == rank) else {
                continue;
            };
            let target = (0..POST_PILES).find(|&to| {
                to != from && single_card(&posts[to]).is_some_and(|below| card.stacks_on(below))
            });
            if let Some(to) = target {
                if let Some(card) = posts[from].pop() {
                    posts[to].push(card);
                }
            }
        }
    }
}

fn single_card(pile: &Pile) -> Option<Card> {
    if pile.len() == 1 {
        pile.top()
    } else {
        None
    }
}

/// Turn [`WOOD_DRAW`] cards from the draw pile to the discard pile, turning
/// the discard pile back over whenever the draw pile runs out.
///
/// Returns the new discard top, or `None` when there is no wood left.
fn advance_wood(piles: &mut PlayerPiles) -> Option<Card> {
    if piles.wood_len() == 0 {
        return None;
    }
    for _ in 0..WOOD_DRAW {
        if piles.wood_draw.is_empty() {
            while piles.wood_discard.move_top_to(&mut piles.wood_draw).is_some() {}
        }
        piles.wood_draw.move_top_to(&mut piles.wood_discard);
    }
    piles.wood_discard.top()
}

/// Put the wood top on the first post pile it stacks on.
fn wood_to_post(piles: &mut PlayerPiles) {
    let Some(card) = piles.wood_discard.top() else {
        return;
    };
    if let Some(post) = piles
        .post
        .iter_mut()
        .find(|post| post.top().is_some_and(|below| card.stacks_on(below)))
    {
        piles.wood_discard.move_top_to(post);
    }
}

/// Move the wood discard top to the bottom of the draw pile, shifting which
/// cards come up in the next draws of three.
fn rotate_wood(piles: &mut PlayerPiles) -> bool {
    if piles.wood_discard.move_top_to(&mut piles.wood_draw).is_none() {
        return false;
    }
    piles.wood_draw.rotate_top_to_bottom();
    true
}
