//! Attack detection, seen from the attacked square.
//!
//! Every attacker pattern is tested in reverse: a square is attacked by a pawn
//! if a pawn of the attacking colour sits where it would capture from, by a
//! slider if the first piece met along a ray is a matching slider, and so on.
//! This is the same threat model the move generator uses for captures.

use super::{
    colour::Colour,
    piece::{Piece, PieceKind},
    position::Position,
    square::{Delta, Square},
};

impl Position {
    /// Checks if `square` is attacked by any piece of colour `by`.
    pub fn is_square_attacked(&self, square: Square, by: Colour) -> bool {
        let is = |sq: Option<Square>, kind: PieceKind| {
            sq.and_then(|sq| self.piece_on(sq)) == Some(Piece::new(kind, by))
        };

        // Pawns of colour `by` capture towards the opposite side, so look back
        // along their capture directions.
        let (_, east, west) = Delta::pawn_deltas(by.is_white());
        if is(square.translate(east), PieceKind::Pawn) || is(square.translate(west), PieceKind::Pawn)
        {
            return true;
        }

        if Delta::KNIGHT_DELTAS
            .iter()
            .any(|&delta| is(square.translate(delta), PieceKind::Knight))
        {
            return true;
        }

        if Delta::QUEEN_DELTAS
            .iter()
            .any(|&delta| is(square.translate(delta), PieceKind::King))
        {
            return true;
        }

        let slider_on_ray = |delta: Delta, diagonal: bool| {
            square
                .ray(delta)
                .find_map(|sq| self.piece_on(sq))
                .is_some_and(|piece| {
                    piece.colour == by
                        && if diagonal {
                            piece.kind.is_diagonal_slider()
                        } else {
                            piece.kind.is_orthogonal_slider()
                        }
                })
        };
        Delta::ORTHOGONAL_DELTAS
            .iter()
            .any(|&delta| slider_on_ray(delta, false))
            || Delta::DIAGONAL_DELTAS
                .iter()
                .any(|&delta| slider_on_ray(delta, true))
    }

    /// Checks if the king of the given colour is attacked.
    pub fn is_king_in_check(&self, colour: Colour) -> bool {
        self.is_square_attacked(self.king_square(colour), colour.inverse())
    }

    /// Checks if the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.is_king_in_check(self.side_to_move())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pawn_attacks_are_directional() {
        let pos = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        // White pawn on e4 attacks d5 and f5, not d3.
        assert!(pos.is_square_attacked(Square::D5, Colour::White));
        assert!(pos.is_square_attacked(Square::F5, Colour::White));
        assert!(!pos.is_square_attacked(Square::D3, Colour::White));
        // Black pawn on d5 attacks c4 and e4.
        assert!(pos.is_square_attacked(Square::E4, Colour::Black));
        assert!(pos.is_square_attacked(Square::C4, Colour::Black));
        assert!(!pos.is_square_attacked(Square::D6, Colour::Black));
    }

    #[test]
    fn sliders_stop_at_first_occupant() {
        let pos = Position::from_fen("4k3/8/8/8/R2p4/8/8/4K2B w - - 0 1").unwrap();
        assert!(pos.is_square_attacked(Square::C4, Colour::White));
        assert!(pos.is_square_attacked(Square::D4, Colour::White));
        assert!(!pos.is_square_attacked(Square::F4, Colour::White));
        // The h1 bishop sweeps the whole long diagonal.
        assert!(pos.is_square_attacked(Square::E4, Colour::White));
        assert!(pos.is_square_attacked(Square::A8, Colour::White));
    }

    #[test]
    fn knights_and_kings() {
        let pos = Position::from_fen("4k3/8/8/8/8/5n2/8/4K3 w - - 0 1").unwrap();
        assert!(pos.in_check());
        assert!(pos.is_square_attacked(Square::D2, Colour::Black));
        assert!(pos.is_square_attacked(Square::D1, Colour::White));
        assert!(!pos.is_king_in_check(Colour::Black));
    }
}
