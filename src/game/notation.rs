//! Standard Algebraic Notation, as shown in move history panels.

use std::fmt::Write;

use super::{
    action::Move,
    castling_rights::CastleKind,
    piece::PieceKind,
    position::Position,
};

impl Position {
    /// Renders a legal move of this position in SAN (`Nbd2`, `exd6`, `O-O`,
    /// `e8=Q+`).
    pub fn san(&self, mv: Move) -> String {
        let mut san = String::with_capacity(8);

        match mv.castle() {
            Some(CastleKind::KingSide) => san.push_str("O-O"),
            Some(CastleKind::QueenSide) => san.push_str("O-O-O"),
            None => {
                if mv.piece == PieceKind::Pawn {
                    if mv.is_capture() {
                        san.push(mv.origin.file().to_char())
                    }
                } else {
                    san.push(mv.piece.to_char().to_ascii_uppercase());
                    self.disambiguate(mv, &mut san);
                }
                if mv.is_capture() {
                    san.push('x')
                }
                let _ = write!(san, "{}", mv.target);
                if let Some(kind) = mv.promotion() {
                    san.push('=');
                    san.push(kind.to_char().to_ascii_uppercase());
                }
            }
        }

        let mut after = self.clone();
        after.make(mv);
        if after.in_check() {
            san.push(if after.has_legal_moves() { '+' } else { '#' })
        }
        san
    }

    /// Adds the origin file, rank or both when another piece of the same kind
    /// could reach the same target.
    fn disambiguate(&self, mv: Move, san: &mut String) {
        let rivals: Vec<_> = self
            .legal_moves()
            .into_iter()
            .filter(|other| {
                other.piece == mv.piece && other.target == mv.target && other.origin != mv.origin
            })
            .map(|other| other.origin)
            .collect();
        if rivals.is_empty() {
            return;
        }

        if rivals.iter().all(|sq| sq.file() != mv.origin.file()) {
            san.push(mv.origin.file().to_char())
        } else if rivals.iter().all(|sq| sq.rank() != mv.origin.rank()) {
            let _ = write!(san, "{}", mv.origin.rank());
        } else {
            let _ = write!(san, "{}", mv.origin);
        }
    }
}
