//! # FEN string utilities
//!
//! [`Fen`] is the syntactic side of Forsyth-Edwards Notation: it checks that
//! every field is well formed and renders the canonical text. Semantic checks
//! (one king per side, reachable material, side not to move not in check) are
//! done when building a [`Position`](super::position::Position) from it.

use thiserror::Error;

use super::{
    castling_rights::{CastlingRights, CastlingRightsError},
    colour::Colour,
    piece::Piece,
    square::{ParseSquareError, Rank, Square},
};

/// FEN parsing errors.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
pub enum FenError {
    #[error("Unexpected character at index {index}: {val}")]
    UnexpectedToken { index: usize, val: char },
    #[error("FEN string missing the {0} section")]
    Incomplete(&'static str),
    #[error("FEN string has more than six sections")]
    TooManySections,
    #[error("Found a non-ASCII character")]
    NonAscii,
    #[error("Piece section defines {0} ranks instead of 8")]
    WrongRankCount(usize),
    #[error("Rank {rank} defines {width} squares instead of 8")]
    WrongRankWidth { rank: Rank, width: usize },
    #[error("Invalid side to move, expected 'w' or 'b'")]
    InvalidSideToMove,
    #[error("Invalid castling rights: {0}")]
    InvalidCastlingRights(#[from] CastlingRightsError),
    #[error("Invalid en passant square: {0}")]
    InvalidEnPassant(#[from] ParseSquareError),
    #[error("En passant square {0} is not on the expected rank")]
    MisplacedEnPassant(Square),
    #[error("Invalid {0} counter")]
    InvalidCounter(&'static str),
    #[error("Expected exactly one {colour} king, found {count}")]
    KingCount { colour: Colour, count: usize },
    #[error("Pawn on the back rank square {0}")]
    PawnOnBackRank(Square),
    #[error("{colour} has {count} pieces, at most 16 are allowed")]
    TooManyPieces { colour: Colour, count: usize },
    #[error("{colour} has {count} pawns, at most 8 are allowed")]
    TooManyPawns { colour: Colour, count: usize },
    #[error("{colour} has {promoted} promoted pieces but only {missing_pawns} pawns missing")]
    TooManyPromotions {
        colour: Colour,
        promoted: usize,
        missing_pawns: usize,
    },
    #[error("The side not to move is in check")]
    OpponentInCheck,
}

/// A syntactically valid FEN record.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Fen {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Colour,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}
impl Fen {
    /// FEN of the initial position of chess.
    pub const INITIAL: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        fen.parse()
    }

    /// Returns the piece sitting on a given square if any.
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.board[square as usize]
    }
}

fn parse_board(section: &str) -> Result<[Option<Piece>; 64], FenError> {
    let mut board = [None; 64];

    let ranks = section.split('/').collect::<Vec<_>>();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount(ranks.len()));
    }

    let mut index = 0;
    for (rank_str, rank_index) in ranks.into_iter().zip((0..8u8).rev()) {
        let rank = unsafe { Rank::from_index_unchecked(rank_index) };
        let mut width = 0usize;
        for c in rank_str.chars() {
            match c {
                '1'..='8' => width += c as usize - '0' as usize,
                _ => {
                    let piece =
                        Piece::from_char(c).map_err(|_| FenError::UnexpectedToken { index, val: c })?;
                    if width < 8 {
                        board[rank_index as usize * 8 + width] = Some(piece);
                    }
                    width += 1;
                }
            }
            index += 1;
        }
        // Separator
        index += 1;

        if width != 8 {
            return Err(FenError::WrongRankWidth { rank, width });
        }
    }

    Ok(board)
}

impl std::str::FromStr for Fen {
    type Err = FenError;

    fn from_str(fen_str: &str) -> Result<Self, Self::Err> {
        if !fen_str.is_ascii() {
            return Err(FenError::NonAscii);
        }

        let sections = fen_str.split_ascii_whitespace().collect::<Vec<_>>();
        if sections.len() > 6 {
            return Err(FenError::TooManySections);
        }

        let board = parse_board(sections.first().ok_or(FenError::Incomplete("pieces"))?)?;

        let side_to_move = match *sections.get(1).ok_or(FenError::Incomplete("side to move"))? {
            "w" => Colour::White,
            "b" => Colour::Black,
            _ => return Err(FenError::InvalidSideToMove),
        };

        let castling_rights = sections
            .get(2)
            .ok_or(FenError::Incomplete("castling rights"))?
            .parse::<CastlingRights>()?;

        let en_passant = match *sections.get(3).ok_or(FenError::Incomplete("en passant"))? {
            "-" => None,
            s => {
                let square = s.parse::<Square>()?;
                let expected = if side_to_move.is_white() {
                    Rank::Six
                } else {
                    Rank::Three
                };
                if square.rank() != expected {
                    return Err(FenError::MisplacedEnPassant(square));
                }
                Some(square)
            }
        };

        let halfmove_clock = sections
            .get(4)
            .map_or(Ok(0), |s| s.parse())
            .map_err(|_| FenError::InvalidCounter("halfmove"))?;
        let fullmove_number = sections
            .get(5)
            .map_or(Ok(1), |s| s.parse())
            .map_err(|_| FenError::InvalidCounter("fullmove"))?;

        Ok(Self {
            board,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}
impl std::fmt::Display for Fen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut skip = 0;
        for sq in Square::squares_fen_iter() {
            if let Some(piece) = self.piece_on(sq) {
                if skip != 0 {
                    write!(f, "{skip}")?;
                    skip = 0
                }
                write!(f, "{piece}")?;
            } else {
                skip += 1
            }

            if sq.file() as u8 == 7 {
                if skip != 0 {
                    write!(f, "{skip}")?;
                    skip = 0;
                }
                if sq.rank() != Rank::One {
                    write!(f, "/")?
                }
            }
        }

        write!(
            f,
            " {} {} {} {} {}",
            if self.side_to_move.is_black() {
                'b'
            } else {
                'w'
            },
            self.castling_rights,
            if let Some(ep) = self.en_passant {
                ep.to_string()
            } else {
                String::from("-")
            },
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}
