//! Round orchestration: four player tasks race on one locked table.
//!
//! Each task loops: take the lock, search and apply one move, release,
//! pause. A task that finds nothing reports itself stuck and idles. Every
//! move clears the reports, so the count only ever holds players who found
//! nothing against the current dutch piles; when it reaches four the round
//! is a stalemate. The round also ends as soon as somebody blitzes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, trace};

use crate::config::{LockKind, SearchLimits, SimConfig};
use crate::core::{PlayerId, PLAYER_COUNT};
use crate::error::{InvariantViolation, SimError};
use crate::sync::{FairLock, StartBarrier, TableLock};

use super::apply::{take_turn, Turn};
use super::table::Table;

/// How a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// This player emptied their blitz pile first.
    Blitzed(PlayerId),
    /// Every player was stuck at once.
    Stalemate,
}

impl RoundOutcome {
    #[must_use]
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            RoundOutcome::Blitzed(player) => Some(player),
            RoundOutcome::Stalemate => None,
        }
    }
}

/// Tracks which players are stuck since the last move by anyone.
///
/// Only updated inside the table's critical section.
#[derive(Debug, Default)]
struct StallDetector {
    /// Moves applied this round; a report is stale once this moves on.
    moves: AtomicUsize,
    /// Players reporting no move since the last move.
    deadlocked: AtomicUsize,
}

impl StallDetector {
    /// Record one turn's result for the player whose last stuck report was
    /// made at `last_report`. Returns whether every player is now stuck.
    fn record(&self, moved: bool, last_report: &mut Option<usize>) -> bool {
        let epoch = self.moves.load(Ordering::SeqCst);
        if moved {
            self.moves.store(epoch + 1, Ordering::SeqCst);
            self.deadlocked.store(0, Ordering::SeqCst);
            return false;
        }
        if *last_report == Some(epoch) {
            return false;
        }
        *last_report = Some(epoch);
        self.deadlocked.fetch_add(1, Ordering::SeqCst) + 1 >= PLAYER_COUNT
    }

    fn deadlocked(&self) -> usize {
        self.deadlocked.load(Ordering::SeqCst)
    }
}

/// State shared by reference with every player task of one round.
struct RoundShared<L> {
    table: L,
    stalls: StallDetector,
    stalemate: AtomicBool,
    /// Set when a task failed or could not be started.
    halted: AtomicBool,
    start: StartBarrier,
}

impl<L> RoundShared<L> {
    fn new(table: L) -> Self {
        Self {
            table,
            stalls: StallDetector::default(),
            stalemate: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            start: StartBarrier::new(PLAYER_COUNT),
        }
    }

    fn should_stop(&self) -> bool {
        self.stalemate.load(Ordering::SeqCst) || self.halted.load(Ordering::SeqCst)
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }
}

/// Halts the round if the owning task unwinds.
struct HaltOnPanic<'a>(&'a AtomicBool);

impl Drop for HaltOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

/// Play one threaded round on `table` with the lock chosen in `config`.
///
/// Returns the outcome together with the final table, validated.
pub fn play_round(table: Table, config: &SimConfig) -> Result<(RoundOutcome, Table), SimError> {
    match config.lock {
        LockKind::Fair => play_round_with::<FairLock<Table>>(table, config),
        LockKind::Plain => play_round_with::<Mutex<Table>>(table, config),
    }
}

/// [`play_round`] with an explicit lock type.
pub fn play_round_with<L: TableLock<Table>>(
    table: Table,
    config: &SimConfig,
) -> Result<(RoundOutcome, Table), SimError> {
    let shared = RoundShared::new(L::from_value(table));

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(PLAYER_COUNT);
        for player in PlayerId::all() {
            let shared = &shared;
            let spawned = thread::Builder::new()
                .name(format!("player-{}", player.name()))
                .spawn_scoped(scope, move || run_player(shared, player, config));
            match spawned {
                Ok(handle) => handles.push((player, handle)),
                Err(source) => {
                    error!(player = %player, error = %source, "failed to start player task");
                    shared.halt();
                    shared.start.cancel();
                    for (started, handle) in handles {
                        if let Err(err) = collect_player(started, handle.join()) {
                            error!(player = %started, error = %err, "player task failed");
                        }
                    }
                    return Err(SimError::Spawn { player, source });
                }
            }
        }

        let mut result = Ok(());
        for (player, handle) in handles {
            let joined = collect_player(player, handle.join());
            if result.is_ok() {
                result = joined;
            }
        }
        result
    })?;

    let table = shared.table.into_value();
    let outcome = finish(&table)?;
    Ok((outcome, table))
}

/// One player's task body.
fn run_player<L: TableLock<Table>>(
    shared: &RoundShared<L>,
    player: PlayerId,
    config: &SimConfig,
) -> Result<(), InvariantViolation> {
    let _halt = HaltOnPanic(&shared.halted);
    if !shared.start.wait() {
        return Ok(());
    }

    let mut last_report = None;
    loop {
        let turn = shared
            .table
            .with_exclusive(|table| -> Result<Option<Turn>, InvariantViolation> {
                if table.is_blitzed() || shared.should_stop() {
                    return Ok(None);
                }
                let turn = take_turn(table, player, &config.search)?;
                if shared.stalls.record(turn.made_move(), &mut last_report) {
                    debug!(player = %player, "every player stuck");
                    shared.stalemate.store(true, Ordering::SeqCst);
                }
                Ok(Some(turn))
            });
        let turn = match turn {
            Ok(Some(turn)) => turn,
            Ok(None) => return Ok(()),
            Err(violation) => {
                shared.halt();
                return Err(violation);
            }
        };

        pause(config.turn_pause);
        if !turn.made_move() {
            if shared.should_stop() {
                return Ok(());
            }
            trace!(player = %player, stuck = shared.stalls.deadlocked(), "no move, idling");
            pause(config.idle_pause);
        }
    }
}

fn pause(duration: Duration) {
    if duration.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(duration);
    }
}

/// Play one round round-robin in the calling thread.
///
/// Players take turns in seat order; four turns in a row without a move is
/// a stalemate. The same seed always produces the same round.
pub fn play_round_sequential(
    table: &mut Table,
    limits: &SearchLimits,
) -> Result<RoundOutcome, InvariantViolation> {
    let mut stuck_in_a_row = 0;
    let mut seat = 0;
    while !table.is_blitzed() && stuck_in_a_row < PLAYER_COUNT {
        let player = PlayerId::new(seat as u8);
        if take_turn(table, player, limits)?.made_move() {
            stuck_in_a_row = 0;
        } else {
            stuck_in_a_row += 1;
        }
        seat = (seat + 1) % PLAYER_COUNT;
    }
    finish(table)
}

/// Validate the final table and read off the outcome.
fn finish(table: &Table) -> Result<RoundOutcome, InvariantViolation> {
    table.validate()?;
    let outcome = match table.winner() {
        Some(player) => RoundOutcome::Blitzed(player),
        None => RoundOutcome::Stalemate,
    };
    info!(?outcome, dutch_piles = table.dutch.len(), "round finished");
    Ok(outcome)
}

/// Turn a joined player task into its share of the round result.
fn collect_player(
    player: PlayerId,
    joined: thread::Result<Result<(), InvariantViolation>>,
) -> Result<(), SimError> {
    match joined {
        Ok(played) => played.map_err(SimError::from),
        Err(_) => {
            error!(player = %player, "player task panicked");
            Err(SimError::PlayerPanicked(player))
        }
    }
}
