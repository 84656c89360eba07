//! # Representation of castling rights

use std::str::FromStr;

use thiserror::Error;

use super::{
    colour::Colour,
    square::{File, Square},
    zobrist,
};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
#[error("Invalid castling rights character: {0:?}")]
pub struct CastlingRightsError(pub char);

/// Side of the board a king castles towards.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastleKind {
    KingSide,
    QueenSide,
}
impl CastleKind {
    /// File the king lands on.
    pub const fn king_target_file(self) -> File {
        match self {
            Self::KingSide => File::G,
            Self::QueenSide => File::C,
        }
    }

    /// Home file of the castling rook.
    pub const fn rook_origin_file(self) -> File {
        match self {
            Self::KingSide => File::H,
            Self::QueenSide => File::A,
        }
    }

    /// File the rook lands on.
    pub const fn rook_target_file(self) -> File {
        match self {
            Self::KingSide => File::F,
            Self::QueenSide => File::D,
        }
    }

    /// Origin and target of the rook when `colour` castles this way.
    pub const fn rook_move(self, colour: Colour) -> (Square, Square) {
        let rank = colour.back_rank();
        (
            Square::new(self.rook_origin_file(), rank),
            Square::new(self.rook_target_file(), rank),
        )
    }
}

/// Four independent castling flags, one per colour and side.
///
/// Rights are only ever removed while playing; once cleared they stay cleared.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CastlingRights(u8);
impl CastlingRights {
    const KINGSIDE_BLACK: u8 = 0b0001;
    const QUEENSIDE_BLACK: u8 = 0b0010;
    const KINGSIDE_WHITE: u8 = 0b0100;
    const QUEENSIDE_WHITE: u8 = 0b1000;
    const FULL: u8 =
        Self::KINGSIDE_BLACK | Self::KINGSIDE_WHITE | Self::QUEENSIDE_BLACK | Self::QUEENSIDE_WHITE;
    const EMPTY: u8 = 0;

    /// Full castling rights for both sides.
    pub const fn full() -> Self {
        Self(Self::FULL)
    }

    /// No castling rights for any sides.
    pub const fn none() -> Self {
        Self(Self::EMPTY)
    }

    /// Checks if no one can castle.
    pub const fn is_none(self) -> bool {
        self.0 == Self::EMPTY
    }

    const fn flag(colour: Colour, side: CastleKind) -> u8 {
        match (colour, side) {
            (Colour::White, CastleKind::KingSide) => Self::KINGSIDE_WHITE,
            (Colour::White, CastleKind::QueenSide) => Self::QUEENSIDE_WHITE,
            (Colour::Black, CastleKind::KingSide) => Self::KINGSIDE_BLACK,
            (Colour::Black, CastleKind::QueenSide) => Self::QUEENSIDE_BLACK,
        }
    }

    /// Checks if castling towards `side` is still allowed for `colour`.
    #[inline(always)]
    pub const fn allowed(self, colour: Colour, side: CastleKind) -> bool {
        self.0 & Self::flag(colour, side) != 0
    }

    /// Checks if `colour` holds any castling right.
    #[inline(always)]
    pub const fn any(self, colour: Colour) -> bool {
        self.allowed(colour, CastleKind::KingSide) || self.allowed(colour, CastleKind::QueenSide)
    }

    /// Grants a castling right. Only used when building a position.
    pub fn allow(&mut self, colour: Colour, side: CastleKind) {
        self.0 |= Self::flag(colour, side)
    }

    /// Removes castling towards `side` for `colour`.
    #[inline(always)]
    pub fn disallow_side(&mut self, colour: Colour, side: CastleKind) {
        self.0 &= !Self::flag(colour, side)
    }

    /// Removes both castling rights of `colour`.
    pub fn disallow(&mut self, colour: Colour) {
        self.disallow_side(colour, CastleKind::KingSide);
        self.disallow_side(colour, CastleKind::QueenSide);
    }

    /// Removes the right tied to a rook home square, if `square` is one.
    ///
    /// Called for both the origin and the target of every move, which covers
    /// rooks moving away as well as rooks being captured at home.
    pub fn disallow_rook_square(&mut self, square: Square) {
        for colour in [Colour::White, Colour::Black] {
            for side in [CastleKind::KingSide, CastleKind::QueenSide] {
                if square == Square::new(side.rook_origin_file(), colour.back_rank()) {
                    self.disallow_side(colour, side)
                }
            }
        }
    }

    /// Returns the Zobrist hash of these castling rights.
    #[inline(always)]
    pub fn zobrist_hash(self) -> u64 {
        (0..4)
            .filter(|i| self.0 & (1 << i) != 0)
            .fold(0, |hash, i| hash ^ zobrist::castling_right_hash(i))
    }
}
impl FromStr for CastlingRights {
    type Err = CastlingRightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Self::none());
        }
        let mut rights = Self::none();
        for c in s.chars() {
            match c {
                'K' => rights.allow(Colour::White, CastleKind::KingSide),
                'Q' => rights.allow(Colour::White, CastleKind::QueenSide),
                'k' => rights.allow(Colour::Black, CastleKind::KingSide),
                'q' => rights.allow(Colour::Black, CastleKind::QueenSide),
                _ => return Err(CastlingRightsError(c)),
            }
        }
        if rights.is_none() {
            return Err(CastlingRightsError(' '));
        }
        Ok(rights)
    }
}
impl std::fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            return write!(f, "-");
        }

        for (colour, side, c) in [
            (Colour::White, CastleKind::KingSide, 'K'),
            (Colour::White, CastleKind::QueenSide, 'Q'),
            (Colour::Black, CastleKind::KingSide, 'k'),
            (Colour::Black, CastleKind::QueenSide, 'q'),
        ] {
            if self.allowed(colour, side) {
                write!(f, "{c}")?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_is_canonical() {
        for s in ["KQkq", "Kq", "Qk", "k", "-"] {
            assert_eq!(s.parse::<CastlingRights>().unwrap().to_string(), s);
        }
        assert_eq!(CastlingRights::full().to_string(), "KQkq");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("KX".parse::<CastlingRights>(), Err(CastlingRightsError('X')));
        assert!("".parse::<CastlingRights>().is_err());
    }

    #[test]
    fn rook_squares_clear_their_side_only() {
        let mut rights = CastlingRights::full();
        rights.disallow_rook_square(Square::H8);
        assert!(!rights.allowed(Colour::Black, CastleKind::KingSide));
        assert!(rights.allowed(Colour::Black, CastleKind::QueenSide));
        rights.disallow_rook_square(Square::E4);
        assert_eq!(rights.to_string(), "KQq");
    }
}
