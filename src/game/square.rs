//! Enumerations of chessboard accessing constants, such as files, ranks and squares.
//!
//! Squares are indexed from 0 (a1) to 63 (h8), file first then rank by rank.
//! Conversions to and from algebraic names (`"e4"`) and `(file, rank)`
//! coordinates are lossless.
use thiserror::Error;

use crate::parsing::PartialFromStr;

/// Errors that may arise when parsing files, ranks or squares.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
pub enum ParseSquareError {
    #[error("Expected a file between 'a' and 'h'")]
    InvalidFile,
    #[error("Expected a rank between '1' and '8'")]
    InvalidRank,
    #[error("Squares are exactly 2 characters, got {0}")]
    WrongLength(usize),
}

/// Files of a chessboard (A-H).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}
impl File {
    /// A file from a given index.
    ///
    /// Fails if the index is more than 7.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(unsafe { Self::from_index_unchecked(index) })
        } else {
            None
        }
    }

    /// A file from a given index.
    /// # Safety
    /// If the index is more than 7, results in undefined behavior.
    #[inline]
    pub const unsafe fn from_index_unchecked(index: u8) -> Self {
        std::mem::transmute(index)
    }

    /// Character used for this file in algebraic notation.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}
impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
impl PartialFromStr for File {
    type Err = ParseSquareError;

    fn partial_from_str(s: &str) -> Result<(Self, &str), Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(c @ 'a'..='h') => Ok((
                unsafe { Self::from_index_unchecked(c as u8 - b'a') },
                chars.as_str(),
            )),
            _ => Err(ParseSquareError::InvalidFile),
        }
    }
}
impl std::str::FromStr for File {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::partial_from_str(s)? {
            (file, "") => Ok(file),
            _ => Err(ParseSquareError::InvalidFile),
        }
    }
}

/// Ranks of a chessboard (1-8).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
}
impl Rank {
    /// A rank from a given index.
    ///
    /// Fails if the index is more than 7.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(unsafe { Self::from_index_unchecked(index) })
        } else {
            None
        }
    }

    /// A rank from a given index.
    /// # Safety
    /// If the index is more than 7, results in undefined behavior.
    #[inline]
    pub const unsafe fn from_index_unchecked(index: u8) -> Self {
        std::mem::transmute(index)
    }
}
impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", 1 + *self as u8)
    }
}
impl PartialFromStr for Rank {
    type Err = ParseSquareError;

    fn partial_from_str(s: &str) -> Result<(Self, &str), Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(c @ '1'..='8') => Ok((
                unsafe { Self::from_index_unchecked(c as u8 - b'1') },
                chars.as_str(),
            )),
            _ => Err(ParseSquareError::InvalidRank),
        }
    }
}
impl std::str::FromStr for Rank {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::partial_from_str(s)? {
            (rank, "") => Ok(rank),
            _ => Err(ParseSquareError::InvalidRank),
        }
    }
}

/// General square indexing for an 8x8 board.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}
impl Square {
    /// Instantiates a new square based on file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        unsafe { std::mem::transmute(((rank as u8) << 3) | (file as u8)) }
    }

    /// Instantitates a new square from its index.
    ///
    /// Returns `None` if the index is more than 63.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(unsafe { Self::from_index_unchecked(index) })
        } else {
            None
        }
    }

    /// Instantitates a new square from its index.
    /// # Safety
    /// If the index is more than 63, causes undefined behavior.
    #[inline]
    pub const unsafe fn from_index_unchecked(index: u8) -> Self {
        std::mem::transmute(index)
    }

    /// Instantiates a square from zero-based `(file, rank)` coordinates, as used
    /// by two-dimensional board representations.
    ///
    /// Returns `None` if either coordinate is off the board.
    #[inline]
    pub const fn from_coordinates(file: u8, rank: u8) -> Option<Self> {
        match (File::from_index(file), Rank::from_index(rank)) {
            (Some(file), Some(rank)) => Some(Self::new(file, rank)),
            _ => None,
        }
    }

    /// Zero-based `(file, rank)` coordinates of this square.
    #[inline]
    pub const fn coordinates(self) -> (u8, u8) {
        (self.file() as u8, self.rank() as u8)
    }

    /// Parses a square from its algebraic name, such as `"e4"`.
    pub fn from_algebraic(name: &str) -> Result<Self, ParseSquareError> {
        name.parse()
    }

    /// Algebraic name of the square, such as `"e4"`.
    pub fn to_algebraic(self) -> String {
        self.to_string()
    }

    /// Returns the rank of the square.
    #[inline]
    pub const fn rank(self) -> Rank {
        unsafe { std::mem::transmute((self as u8) >> 3) }
    }
    /// Returns the file of the square.
    #[inline]
    pub const fn file(self) -> File {
        unsafe { std::mem::transmute((self as u8) & 7) }
    }

    /// Checks if the square is a light square (h1 is light).
    #[inline]
    pub const fn is_light(self) -> bool {
        (self.file() as u8 + self.rank() as u8) % 2 == 1
    }

    /// Translates this square by a given delta.
    ///
    /// Returns `None` if the translation would go out of the board.
    #[inline]
    pub const fn translate(self, delta: Delta) -> Option<Self> {
        let (file_offset, rank_offset) = delta.offsets();
        let file = self.file() as i8 + file_offset;
        let rank = self.rank() as i8 + rank_offset;
        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(unsafe { self.translate_unchecked(delta) })
        }
    }

    /// Translates this square by a given delta.
    /// # Safety
    /// Doing a translation that would result in an out of board square is
    /// undefined behavior.
    #[inline]
    pub const unsafe fn translate_unchecked(self, delta: Delta) -> Self {
        std::mem::transmute((self as u8).wrapping_add_signed(delta as i8))
    }

    /// Squares visited when sliding from this square in the given direction,
    /// closest first.
    pub fn ray(self, delta: Delta) -> impl Iterator<Item = Self> {
        std::iter::successors(self.translate(delta), move |sq| sq.translate(delta))
    }

    /// An iterator over all squares, ordered from A1 to H8.
    pub fn squares_iter() -> impl Iterator<Item = Self> {
        (0..64).map(|i| unsafe { Square::from_index_unchecked(i) })
    }

    /// An iterator over all square, ordered in big-endian rank/little-endian file.
    pub fn squares_fen_iter() -> impl Iterator<Item = Self> {
        (0..8).rev().flat_map(|rank| {
            (0..8).map(move |file| unsafe {
                let rank = Rank::from_index_unchecked(rank);
                let file = File::from_index_unchecked(file);
                Square::new(file, rank)
            })
        })
    }
}
impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}
impl PartialFromStr for Square {
    type Err = ParseSquareError;

    fn partial_from_str(s: &str) -> Result<(Self, &str), Self::Err> {
        let (file, rest) = File::partial_from_str(s)?;
        let (rank, rest) = Rank::partial_from_str(rest)?;
        Ok((Self::new(file, rank), rest))
    }
}
impl std::str::FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != 2 {
            return Err(ParseSquareError::WrongLength(s.chars().count()));
        }
        Ok(Self::partial_from_str(s)?.0)
    }
}

/// Deltas represent directions in which pieces can move.
///
/// The discriminant is the index offset on the board; [`Square::translate`]
/// takes care of wrapping around edges.
#[repr(i8)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Delta {
    North = 8,
    South = -8,
    East = 1,
    West = -1,

    NorthEast = 9,
    NorthWest = 7,
    SouthEast = -7,
    SouthWest = -9,

    KnightNorthEast = 17,
    KnightNorthWest = 15,
    KnightSouthEast = -15,
    KnightSouthWest = -17,
    KnightEastNorth = 10,
    KnightWestNorth = 6,
    KnightEastSouth = -6,
    KnightWestSouth = -10,
}
impl Delta {
    pub const KNIGHT_DELTAS: [Self; 8] = [
        Self::KnightNorthEast,
        Self::KnightNorthWest,
        Self::KnightSouthEast,
        Self::KnightSouthWest,
        Self::KnightEastNorth,
        Self::KnightWestNorth,
        Self::KnightEastSouth,
        Self::KnightWestSouth,
    ];
    pub const ORTHOGONAL_DELTAS: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];
    pub const DIAGONAL_DELTAS: [Self; 4] = [
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];
    pub const QUEEN_DELTAS: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    /// `(file, rank)` offsets of this delta.
    pub const fn offsets(self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::NorthEast => (1, 1),
            Self::NorthWest => (-1, 1),
            Self::SouthEast => (1, -1),
            Self::SouthWest => (-1, -1),
            Self::KnightNorthEast => (1, 2),
            Self::KnightNorthWest => (-1, 2),
            Self::KnightSouthEast => (1, -2),
            Self::KnightSouthWest => (-1, -2),
            Self::KnightEastNorth => (2, 1),
            Self::KnightWestNorth => (-2, 1),
            Self::KnightEastSouth => (2, -1),
            Self::KnightWestSouth => (-2, -1),
        }
    }

    /// Push direction and capture directions of a pawn.
    pub const fn pawn_deltas(black: bool) -> (Self, Self, Self) {
        if black {
            (Self::South, Self::SouthEast, Self::SouthWest)
        } else {
            (Self::North, Self::NorthEast, Self::NorthWest)
        }
    }
}
