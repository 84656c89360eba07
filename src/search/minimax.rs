//! Depth-limited minimax with alpha-beta pruning.
//!
//! White maximizes and black minimizes the same white-relative score, so both
//! layers share [`eval::material`] directly.

use std::sync::atomic::{AtomicBool, Ordering};

use super::eval::{self, CentiPawns, MATE};
use crate::game::{
    action::Move,
    movegen::MoveList,
    position::Position,
};

/// What a search over the root moves produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootOutcome {
    pub best: Option<Move>,
    pub score: CentiPawns,
    pub nodes: u64,
    pub cancelled: bool,
}

pub struct Minimax<'a> {
    nodes: u64,
    should_stop: Option<&'a AtomicBool>,
}
impl<'a> Minimax<'a> {
    pub fn new() -> Self {
        Self {
            nodes: 0,
            should_stop: None,
        }
    }

    /// Lets another thread interrupt the search between two root moves.
    pub fn with_stop_flag(mut self, should_stop: &'a AtomicBool) -> Self {
        self.should_stop = Some(should_stop);
        self
    }

    fn should_stop(&self) -> bool {
        self.should_stop
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Searches every legal move of the root to `depth` plies in total and
    /// returns the best one for the side to move. Ties keep the first move in
    /// search order. A depth of 0 is searched as 1.
    ///
    /// The position is left as it was found.
    pub fn search(mut self, position: &mut Position, depth: u8) -> RootOutcome {
        let depth = depth.max(1);
        let maximizing = position.side_to_move().is_white();
        let mut moves = position.legal_moves();
        order_moves(&mut moves);
        self.nodes += 1;

        let mut best = None;
        let mut best_score = if maximizing { -CentiPawns::MAX } else { CentiPawns::MAX };
        let mut alpha = -CentiPawns::MAX;
        let mut beta = CentiPawns::MAX;
        let mut cancelled = false;

        for &mv in moves.iter() {
            if self.should_stop() {
                cancelled = true;
                break;
            }

            position.make(mv);
            let score = self.alpha_beta(position, depth - 1, alpha, beta, 1);
            position.unmake();

            if maximizing && score > best_score {
                best_score = score;
                best = Some(mv);
                alpha = alpha.max(score);
            } else if !maximizing && score < best_score {
                best_score = score;
                best = Some(mv);
                beta = beta.min(score);
            }
        }

        if best.is_none() {
            // Interrupted before the first move completed, or no legal move.
            best = moves.first().copied();
            best_score = self.terminal_score(position, 0).unwrap_or_else(|| eval::material(position));
        }

        RootOutcome {
            best,
            score: best_score,
            nodes: self.nodes,
            cancelled,
        }
    }

    /// Score of a node that ends the game, or `None` if play goes on.
    fn terminal_score(&self, position: &Position, ply: u8) -> Option<CentiPawns> {
        if !position.has_legal_moves() {
            Some(if position.in_check() {
                eval::mated(position.side_to_move(), ply)
            } else {
                0
            })
        } else if position.fifty_move_draw()
            || position.threefold_repetition()
            || position.insufficient_material()
        {
            Some(0)
        } else {
            None
        }
    }

    fn alpha_beta(
        &mut self,
        position: &mut Position,
        depth: u8,
        mut alpha: CentiPawns,
        mut beta: CentiPawns,
        ply: u8,
    ) -> CentiPawns {
        self.nodes += 1;

        let mut moves = position.legal_moves();
        if moves.is_empty() {
            return if position.in_check() {
                eval::mated(position.side_to_move(), ply)
            } else {
                0
            };
        }
        if position.fifty_move_draw()
            || position.threefold_repetition()
            || position.insufficient_material()
        {
            return 0;
        }
        if depth == 0 {
            return eval::material(position);
        }

        order_moves(&mut moves);
        if position.side_to_move().is_white() {
            let mut value = -MATE;
            for &mv in moves.iter() {
                position.make(mv);
                value = value.max(self.alpha_beta(position, depth - 1, alpha, beta, ply + 1));
                position.unmake();
                alpha = alpha.max(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        } else {
            let mut value = MATE;
            for &mv in moves.iter() {
                position.make(mv);
                value = value.min(self.alpha_beta(position, depth - 1, alpha, beta, ply + 1));
                position.unmake();
                beta = beta.min(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
    }
}
impl Default for Minimax<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Puts captures first, most valuable victim then least valuable attacker.
/// The sort is stable: quiet moves and equal captures keep generation order.
pub fn order_moves(moves: &mut MoveList) {
    moves.sort_by_key(|mv| match mv.captured {
        Some(victim) => -(10 * eval::piece_value(victim) - eval::piece_value(mv.piece)),
        None => 0,
    })
}
