//! # Moves
//! [`Move`] describes a move generated by a [`Position`](super::position::Position):
//! it carries everything needed to make and unmake it. [`MoveRequest`] is what
//! callers submit from the outside (origin, target and optional promotion), to be
//! matched against the legal moves of a position.
use thiserror::Error;

use crate::parsing::PartialFromStr;

use super::{
    castling_rights::CastleKind,
    piece::PieceKind,
    square::{ParseSquareError, Square},
};

/// Existing kinds of moves.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveKind {
    Quiet,
    DoublePush,
    Castle(CastleKind),
    EnPassant,
    Promotion(PieceKind),
}

/// Describes moves that can be played on a chessboard.
///
/// Captures record the captured piece kind; for en passant this is always a pawn
/// that does not sit on the target square.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub origin: Square,
    pub target: Square,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub kind: MoveKind,
}
impl Move {
    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    #[inline]
    pub const fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    #[inline]
    pub const fn castle(&self) -> Option<CastleKind> {
        match self.kind {
            MoveKind::Castle(side) => Some(side),
            _ => None,
        }
    }

    /// Square of the captured piece, which differs from the target for en passant.
    #[inline]
    pub fn capture_square(&self) -> Option<Square> {
        match self.kind {
            MoveKind::EnPassant => Some(Square::new(self.target.file(), self.origin.rank())),
            _ if self.is_capture() => Some(self.target),
            _ => None,
        }
    }

    /// Checks if this move answers the given request.
    #[inline]
    pub fn matches(&self, request: &MoveRequest) -> bool {
        self.origin == request.origin
            && self.target == request.target
            && self.promotion() == request.promotion
    }

    /// The request that designates this move.
    pub const fn request(&self) -> MoveRequest {
        MoveRequest {
            origin: self.origin,
            target: self.target,
            promotion: self.promotion(),
        }
    }
}
impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.request())
    }
}

/// A move as submitted by a player: origin, target and, for promotions, the piece
/// to promote to. Written in long algebraic notation (`e2e4`, `e7e8q`).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveRequest {
    pub origin: Square,
    pub target: Square,
    pub promotion: Option<PieceKind>,
}
impl MoveRequest {
    pub const fn new(origin: Square, target: Square) -> Self {
        Self {
            origin,
            target,
            promotion: None,
        }
    }

    pub const fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }

    /// Builds a request from algebraic square names, as received from clients.
    pub fn from_algebraic(
        origin: &str,
        target: &str,
        promotion: Option<char>,
    ) -> Result<Self, MoveRequestError> {
        let origin = origin.parse().map_err(MoveRequestError::Origin)?;
        let target = target.parse().map_err(MoveRequestError::Target)?;
        let promotion = promotion.map(parse_promotion).transpose()?;
        Ok(Self {
            origin,
            target,
            promotion,
        })
    }
}
impl std::fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.origin, self.target)?;
        if let Some(kind) = self.promotion {
            write!(f, "{kind}")?
        }
        Ok(())
    }
}

/// Errors that may arise when parsing move requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum MoveRequestError {
    #[error("Invalid origin square: {0}")]
    Origin(ParseSquareError),
    #[error("Invalid target square: {0}")]
    Target(ParseSquareError),
    #[error("Cannot promote to {0:?}")]
    InvalidPromotion(char),
    #[error("{0} characters left unconsumed after the move")]
    TrailingCharacters(usize),
}

fn parse_promotion(c: char) -> Result<PieceKind, MoveRequestError> {
    match PieceKind::from_char(c) {
        Ok(kind) if kind.is_valid_promotion_target() => Ok(kind),
        _ => Err(MoveRequestError::InvalidPromotion(c)),
    }
}

impl std::str::FromStr for MoveRequest {
    type Err = MoveRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (origin, rest) = Square::partial_from_str(s).map_err(MoveRequestError::Origin)?;
        let (target, rest) = Square::partial_from_str(rest).map_err(MoveRequestError::Target)?;
        let mut chars = rest.chars();
        let promotion = chars.next().map(parse_promotion).transpose()?;
        match chars.as_str().len() {
            0 => Ok(Self {
                origin,
                target,
                promotion,
            }),
            n => Err(MoveRequestError::TrailingCharacters(n)),
        }
    }
}
