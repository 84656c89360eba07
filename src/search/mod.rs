//! # Search algorithm
//! Implements the computer opponent: a depth-limited minimax search with
//! alpha-beta pruning over a material evaluation.
//!
//! [`best_move`] is the synchronous entry point. Game rooms use
//! [`SearchConfig::spawn`] instead, which searches a snapshot of the position on
//! a dedicated thread and delivers a single [`SearchResult`] over a channel.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::game::{
    action::Move,
    colour::Colour,
    fen::FenError,
    position::Position,
};
use eval::CentiPawns;
use minimax::{Minimax, RootOutcome};

pub mod eval;
pub mod minimax;

/// Depth used when none is configured.
pub const DEFAULT_DEPTH: u8 = 3;

/// Returns the best move for `colour` in the given position, searching `depth`
/// plies ahead.
///
/// The result only depends on the inputs. Returns `None` if there is no legal
/// move, or if `colour` is not the side to move.
pub fn best_move(position: &Position, depth: u8, colour: Colour) -> Option<Move> {
    if colour != position.side_to_move() {
        log::warn!(
            "Asked for a {colour} move while {} is to move",
            position.side_to_move()
        );
        return None;
    }
    Minimax::new().search(&mut position.clone(), depth).best
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    depth: u8,
    colour: Option<Colour>,
}
impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            colour: None,
        }
    }
}
impl SearchConfig {
    /// Creates a new search configuration searching [`DEFAULT_DEPTH`] plies for
    /// whichever side is to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of plies the search looks ahead.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the side the search plays for. A search started on a position
    /// where that side is not to move reports no move.
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Runs a search on its own thread. The position is moved into the
    /// thread; `ticket` is handed back untouched in the [`SearchResult`] so the
    /// caller can recognize results that arrive too late.
    pub fn spawn(self, position: Position, ticket: u64) -> SearchHandle {
        let should_stop = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::channel();

        let thread = {
            let should_stop = should_stop.clone();
            std::thread::spawn(move || {
                let mut position = position;
                let start = Instant::now();
                log::debug!(
                    "Search #{ticket} started at depth {} on {}",
                    self.depth,
                    position.fen()
                );

                let outcome = match self.colour {
                    Some(colour) if colour != position.side_to_move() => {
                        log::warn!(
                            "Search #{ticket} asked for a {colour} move while {} is to move",
                            position.side_to_move()
                        );
                        RootOutcome {
                            best: None,
                            score: 0,
                            nodes: 0,
                            cancelled: false,
                        }
                    }
                    _ => Minimax::new()
                        .with_stop_flag(&should_stop)
                        .search(&mut position, self.depth),
                };

                let result = SearchResult {
                    ticket,
                    best: outcome.best,
                    score: outcome.score,
                    nodes: outcome.nodes,
                    elapsed: start.elapsed(),
                    cancelled: outcome.cancelled,
                };
                log::info!(
                    "Search #{ticket} finished: best {}, score {}, {} nodes in {:?}{}",
                    result
                        .best
                        .map_or_else(|| String::from("(none)"), |mv| mv.to_string()),
                    result.score,
                    result.nodes,
                    result.elapsed,
                    if result.cancelled { " (stopped)" } else { "" }
                );

                // The handle may already be gone if the caller lost interest.
                let _ = sender.send(result);
            })
        };

        SearchHandle {
            ticket,
            should_stop,
            receiver,
            thread: Some(thread),
        }
    }

    /// Same as [`SearchConfig::spawn`], from a FEN snapshot.
    /// # Errors
    /// This function returns an error if the FEN string is not a valid position.
    pub fn spawn_fen(self, fen: &str, ticket: u64) -> Result<SearchHandle, FenError> {
        Ok(self.spawn(Position::from_fen(fen)?, ticket))
    }
}

/// Outcome of a search run on its own thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// Ticket given when the search was spawned.
    pub ticket: u64,
    pub best: Option<Move>,
    /// Score of the best move, from white's point of view.
    pub score: CentiPawns,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Whether the search was stopped before every root move was searched.
    pub cancelled: bool,
}

/// Handle to an ongoing search. Dropping it stops the search.
pub struct SearchHandle {
    ticket: u64,
    should_stop: Arc<AtomicBool>,
    receiver: Receiver<SearchResult>,
    thread: Option<JoinHandle<()>>,
}
impl SearchHandle {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// Asks the search to stop. It answers with the best move found so far as
    /// soon as the current root move is searched.
    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
    }

    /// Returns the result if the search is over, without blocking.
    pub fn try_result(&mut self) -> Option<SearchResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                None
            }
        }
    }

    /// Blocks until the search is over and returns its result.
    ///
    /// Returns `None` if the search thread died without answering.
    pub fn wait(mut self) -> Option<SearchResult> {
        let result = self.receiver.recv().ok();
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Search #{} panicked", self.ticket);
            }
        }
    }
}
impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
