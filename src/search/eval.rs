//! # Static evaluation
//! Scores are expressed in centipawns from white's point of view: positive
//! values favour white, negative values favour black.

use crate::game::{colour::Colour, piece::PieceKind, position::Position};

pub type CentiPawns = i32;

/// Score of a side that delivers checkmate on the current ply. Mates found
/// deeper in the tree score `MATE - ply`, so that faster mates are preferred.
pub const MATE: CentiPawns = 1_000_000;

/// Any score beyond this bound announces a forced mate.
const MATE_BOUND: CentiPawns = MATE - 1_000;

/// Material value of a piece kind. The king has no material value: losing it
/// is expressed through [`MATE`].
pub const fn piece_value(kind: PieceKind) -> CentiPawns {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0,
    }
}

/// Material balance of a position.
pub fn material(position: &Position) -> CentiPawns {
    let side = |colour| -> CentiPawns {
        position
            .pieces(colour)
            .map(|(_, kind)| piece_value(kind))
            .sum()
    };
    side(Colour::White) - side(Colour::Black)
}

/// Score of a position where `loser` is checkmated, `ply` half moves from the
/// root of the search.
#[inline]
pub const fn mated(loser: Colour, ply: u8) -> CentiPawns {
    let score = MATE - ply as CentiPawns;
    if loser.is_white() {
        -score
    } else {
        score
    }
}

/// Number of plies until mate if the score announces one.
pub fn mate_distance(score: CentiPawns) -> Option<CentiPawns> {
    (score.abs() > MATE_BOUND).then(|| MATE - score.abs())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn initial_material_is_balanced() {
        assert_eq!(material(&Position::initial()), 0);
    }

    #[test]
    fn material_counts_from_white() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert_eq!(material(&pos), 900);
        let pos = Position::from_fen("3rk3/1n6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(material(&pos), -820);
    }

    #[test]
    fn mate_scores_dominate_material() {
        assert!(mated(Colour::Black, 5) > 39 * 100);
        assert!(mated(Colour::White, 5) < -39 * 100);
        assert!(mated(Colour::Black, 1) > mated(Colour::Black, 3));
        assert_eq!(mate_distance(mated(Colour::White, 3)), Some(3));
        assert_eq!(mate_distance(800), None);
    }
}
