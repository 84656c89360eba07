//! Move generation.
//!
//! Pseudo-legal moves are generated per piece, in square order from a1 to h8,
//! then filtered by making each candidate and checking that the mover's king is
//! not left attacked. Pins, discovered checks and en passant oddities are all
//! handled by that filter.

use super::{
    action::{Move, MoveKind},
    castling_rights::CastleKind,
    piece::{Piece, PieceKind},
    position::Position,
    square::{Delta, File, Square},
};

/// Bounded list of moves; no legal chess position has more than 218.
pub type MoveList = heapless::Vec<Move, 256>;

#[inline]
fn push(moves: &mut MoveList, mv: Move) {
    let pushed = moves.push(mv);
    debug_assert!(pushed.is_ok(), "move list overflow");
}

impl Position {
    /// Generates all legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        let us = self.side_to_move();
        let mut scratch = self.clone();
        let mut legal = MoveList::new();
        for mv in self.pseudo_legal_moves() {
            scratch.make(mv);
            if !scratch.is_king_in_check(us) {
                push(&mut legal, mv)
            }
            scratch.unmake();
        }
        legal
    }

    /// Generates moves following each piece's movement pattern, without
    /// checking whether they leave the mover's king in check.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        for (origin, kind) in self.pieces(self.side_to_move()) {
            match kind {
                PieceKind::Pawn => self.pawn_moves(origin, &mut moves),
                PieceKind::Knight => self.step_moves(origin, kind, &Delta::KNIGHT_DELTAS, &mut moves),
                PieceKind::Bishop => {
                    self.slider_moves(origin, kind, &Delta::DIAGONAL_DELTAS, &mut moves)
                }
                PieceKind::Rook => {
                    self.slider_moves(origin, kind, &Delta::ORTHOGONAL_DELTAS, &mut moves)
                }
                PieceKind::Queen => self.slider_moves(origin, kind, &Delta::QUEEN_DELTAS, &mut moves),
                PieceKind::King => {
                    self.step_moves(origin, kind, &Delta::QUEEN_DELTAS, &mut moves);
                    self.castling_moves(origin, &mut moves)
                }
            }
        }
        moves
    }

    /// Checks if the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        let us = self.side_to_move();
        let mut scratch = self.clone();
        self.pseudo_legal_moves().into_iter().any(|mv| {
            scratch.make(mv);
            let legal = !scratch.is_king_in_check(us);
            scratch.unmake();
            legal
        })
    }

    /// Target square if it is empty or holds an enemy piece, along with the
    /// captured piece kind.
    #[inline]
    fn reachable(&self, target: Square) -> Option<Option<PieceKind>> {
        match self.piece_on(target) {
            None => Some(None),
            Some(piece) if piece.colour != self.side_to_move() => Some(Some(piece.kind)),
            Some(_) => None,
        }
    }

    fn step_moves(&self, origin: Square, piece: PieceKind, deltas: &[Delta], moves: &mut MoveList) {
        for &delta in deltas {
            let Some(target) = origin.translate(delta) else {
                continue;
            };
            if let Some(captured) = self.reachable(target) {
                push(
                    moves,
                    Move {
                        origin,
                        target,
                        piece,
                        captured,
                        kind: MoveKind::Quiet,
                    },
                )
            }
        }
    }

    fn slider_moves(&self, origin: Square, piece: PieceKind, deltas: &[Delta], moves: &mut MoveList) {
        for &delta in deltas {
            for target in origin.ray(delta) {
                let Some(captured) = self.reachable(target) else {
                    break;
                };
                push(
                    moves,
                    Move {
                        origin,
                        target,
                        piece,
                        captured,
                        kind: MoveKind::Quiet,
                    },
                );
                if captured.is_some() {
                    break;
                }
            }
        }
    }

    fn pawn_moves(&self, origin: Square, moves: &mut MoveList) {
        let us = self.side_to_move();
        let (push_delta, east, west) = Delta::pawn_deltas(us.is_black());

        if let Some(single) = origin.translate(push_delta) {
            if self.piece_on(single).is_none() {
                self.pawn_move(origin, single, None, moves);

                if origin.rank() == us.pawn_rank() {
                    if let Some(double) = single.translate(push_delta) {
                        if self.piece_on(double).is_none() {
                            push(
                                moves,
                                Move {
                                    origin,
                                    target: double,
                                    piece: PieceKind::Pawn,
                                    captured: None,
                                    kind: MoveKind::DoublePush,
                                },
                            )
                        }
                    }
                }
            }
        }

        for delta in [east, west] {
            let Some(target) = origin.translate(delta) else {
                continue;
            };
            match self.piece_on(target) {
                Some(piece) if piece.colour != us => {
                    self.pawn_move(origin, target, Some(piece.kind), moves)
                }
                None if self.en_passant() == Some(target) => {
                    // Only when the double-pushed pawn is actually there.
                    let captured = Square::new(target.file(), origin.rank());
                    if self.piece_on(captured) == Some(Piece::new(PieceKind::Pawn, us.inverse())) {
                        push(
                            moves,
                            Move {
                                origin,
                                target,
                                piece: PieceKind::Pawn,
                                captured: Some(PieceKind::Pawn),
                                kind: MoveKind::EnPassant,
                            },
                        )
                    }
                }
                _ => {}
            }
        }
    }

    /// Pushes a pawn push or capture, expanded to the four promotions on the
    /// last rank.
    fn pawn_move(
        &self,
        origin: Square,
        target: Square,
        captured: Option<PieceKind>,
        moves: &mut MoveList,
    ) {
        let mv = Move {
            origin,
            target,
            piece: PieceKind::Pawn,
            captured,
            kind: MoveKind::Quiet,
        };
        if target.rank() == self.side_to_move().promotion_rank() {
            for kind in PieceKind::PROMOTION_TARGETS {
                push(
                    moves,
                    Move {
                        kind: MoveKind::Promotion(kind),
                        ..mv
                    },
                )
            }
        } else {
            push(moves, mv)
        }
    }

    fn castling_moves(&self, origin: Square, moves: &mut MoveList) {
        let us = self.side_to_move();
        let them = us.inverse();
        let rights = self.castling_rights();
        if !rights.any(us) || origin != Square::new(File::E, us.back_rank()) || self.in_check() {
            return;
        }

        for side in [CastleKind::KingSide, CastleKind::QueenSide] {
            if !rights.allowed(us, side) {
                continue;
            }
            let (rook_origin, _) = side.rook_move(us);
            if self.piece_on(rook_origin) != Some(Piece::new(PieceKind::Rook, us)) {
                continue;
            }

            let towards = match side {
                CastleKind::KingSide => Delta::East,
                CastleKind::QueenSide => Delta::West,
            };
            let blocked = origin
                .ray(towards)
                .take_while(|&sq| sq != rook_origin)
                .any(|sq| self.piece_on(sq).is_some());
            // The king crosses one square and lands on the next.
            let crosses_attack = origin
                .ray(towards)
                .take(2)
                .any(|sq| self.is_square_attacked(sq, them));
            if blocked || crosses_attack {
                continue;
            }

            push(
                moves,
                Move {
                    origin,
                    target: Square::new(side.king_target_file(), us.back_rank()),
                    piece: PieceKind::King,
                    captured: None,
                    kind: MoveKind::Castle(side),
                },
            )
        }
    }
}
