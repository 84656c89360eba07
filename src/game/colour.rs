//! Colours for each players and their pieces.

use super::square::Rank;

/// Number of different colours (2).
pub const NUM_COLOURS: usize = 2;

/// Colour enumeration.
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colour {
    White = 0,
    Black = 1,
}
impl Colour {
    /// Inverts the colour in place.
    #[inline]
    pub fn invert(&mut self) {
        *self = self.inverse()
    }

    /// Returns the inverse of this colour.
    #[inline]
    pub const fn inverse(&self) -> Self {
        if self.is_black() {
            Colour::White
        } else {
            Colour::Black
        }
    }

    /// Checks if the colour variant is white.
    #[inline]
    pub const fn is_white(&self) -> bool {
        matches!(self, Colour::White)
    }

    /// Checks if the colour variant is black.
    #[inline]
    pub const fn is_black(&self) -> bool {
        matches!(self, Colour::Black)
    }

    /// Rank on which this colour's king and rooks start.
    #[inline]
    pub const fn back_rank(self) -> Rank {
        if self.is_black() {
            Rank::Eight
        } else {
            Rank::One
        }
    }

    /// Rank on which this colour's pawns start and may double push from.
    #[inline]
    pub const fn pawn_rank(self) -> Rank {
        if self.is_black() {
            Rank::Seven
        } else {
            Rank::Two
        }
    }

    /// Rank on which this colour's pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> Rank {
        self.inverse().back_rank()
    }
}
impl From<bool> for Colour {
    fn from(value: bool) -> Self {
        if value {
            Self::Black
        } else {
            Self::White
        }
    }
}
impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self.is_black() { "black" } else { "white" })
    }
}
