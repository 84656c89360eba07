//! Main API to represent and interact with a chess position.
//!
//! This includes making, unmaking and generating moves, defining positions from
//! FEN strings, etc. The board is a flat array of 64 squares; move generation
//! and attack detection live in [`movegen`](super::movegen) and
//! [`attacks`](super::attacks).
use thiserror::Error;

use super::{
    action::{Move, MoveKind, MoveRequest},
    castling_rights::CastlingRights,
    colour::Colour,
    fen::{Fen, FenError},
    history::HistoryEntry,
    piece::{Piece, PieceKind, NUM_PIECES},
    square::{Delta, Rank, Square},
    zobrist,
};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Error)]
#[error("Illegal move: {0}")]
pub struct IllegalMoveError(pub MoveRequest);

/// Represents a valid chess position and defines an API to interact with said
/// position (making, unmaking, generating moves, etc).
#[derive(PartialEq, Eq, Clone)]
pub struct Position {
    board: [Option<Piece>; 64],

    // Metadata
    side_to_move: Colour,
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
    history: Vec<HistoryEntry>,
    hash: u64,
    // King squares, indexed by colour.
    kings: [Square; 2],
}
impl Position {
    /// The initial position of chess.
    pub fn initial() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = [None; 64];
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            board[file] = Some(Piece::new(kind, Colour::White));
            board[8 + file] = Some(Piece::new(Pawn, Colour::White));
            board[48 + file] = Some(Piece::new(Pawn, Colour::Black));
            board[56 + file] = Some(Piece::new(kind, Colour::Black));
        }

        let mut position = Self {
            board,
            side_to_move: Colour::White,
            castling_rights: CastlingRights::full(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
            hash: 0,
            kings: [Square::E1, Square::E8],
        };
        position.rehash();
        position
    }

    /// Creates a position from a FEN string.
    /// # Errors
    /// This function returns an error if the FEN string passed is invalid or badly
    /// formatted, or if it describes an illegal position (missing kings, material
    /// no game can reach, pawns on a back rank, side not to move in check).
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::try_from(fen.parse::<Fen>()?)
    }

    /// Returns a FEN string describing the position.
    pub fn fen(&self) -> String {
        self.to_fen_record().to_string()
    }

    /// Returns the FEN record describing the position.
    pub fn to_fen_record(&self) -> Fen {
        Fen {
            board: self.board,
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Returns the piece sitting on a given square if any.
    #[inline]
    pub fn piece_on(&self, square: Square) -> Option<Piece> {
        self.board[square as usize]
    }

    /// Iterator over the pieces of a given colour and the squares they sit on,
    /// from a1 to h8.
    pub fn pieces(&self, colour: Colour) -> impl Iterator<Item = (Square, PieceKind)> + '_ {
        Square::squares_iter().filter_map(move |sq| match self.piece_on(sq) {
            Some(piece) if piece.colour == colour => Some((sq, piece.kind)),
            _ => None,
        })
    }

    /// Returns the current side to move.
    #[inline]
    pub fn side_to_move(&self) -> Colour {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// Square skipped by a pawn double push on the previous ply, if any.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Plies since the last pawn move or capture.
    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Moves played since this position was created, oldest first.
    pub fn moves_played(&self) -> impl DoubleEndedIterator<Item = Move> + '_ {
        self.history.iter().map(|entry| entry.played)
    }

    /// Number of plies that can be unmade.
    #[inline]
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// Returns the Zobrist hash of the position.
    ///
    /// The hash covers the board, side to move, castling rights and en passant
    /// square, but not the move counters.
    #[inline(always)]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// Returns the position of the king of the given colour.
    #[inline]
    pub fn king_square(&self, colour: Colour) -> Square {
        self.kings[colour as usize]
    }

    /// Finds the legal move matching a request, if any.
    pub fn find_legal(&self, request: &MoveRequest) -> Option<Move> {
        self.legal_moves()
            .into_iter()
            .find(|mv| mv.matches(request))
    }

    /// Makes a move on the board after checking that it is legal.
    /// # Errors
    /// This function returns an error if the move is illegal, in which case the
    /// position is left untouched.
    pub fn play(&mut self, request: MoveRequest) -> Result<Move, IllegalMoveError> {
        let mv = self
            .find_legal(&request)
            .ok_or(IllegalMoveError(request))?;
        self.make(mv);
        Ok(mv)
    }

    /// Makes a move on the board, modifying the position and recording what is
    /// needed to unmake it.
    ///
    /// The move must come from this position's move generator; anything else
    /// breaks the invariants of the position.
    pub fn make(&mut self, mv: Move) {
        let us = self.side_to_move;
        let entry = HistoryEntry {
            played: mv,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };

        // Captured piece first, so that the target square is free.
        if let Some(captured) = mv.capture_square() {
            self.take(captured);
        }
        self.take(mv.origin);
        self.put(
            mv.target,
            Piece::new(mv.promotion().unwrap_or(mv.piece), us),
        );

        if let Some(side) = mv.castle() {
            let (rook_origin, rook_target) = side.rook_move(us);
            if let Some(rook) = self.take(rook_origin) {
                self.put(rook_target, rook)
            }
        }
        if mv.piece == PieceKind::King {
            self.kings[us as usize] = mv.target;
        }

        // Modify castling rights if needed
        self.hash ^= self.castling_rights.zobrist_hash();
        if mv.piece == PieceKind::King {
            self.castling_rights.disallow(us)
        }
        self.castling_rights.disallow_rook_square(mv.origin);
        self.castling_rights.disallow_rook_square(mv.target);
        self.hash ^= self.castling_rights.zobrist_hash();

        // Reset en passant square if any, then set it after double pushes
        if let Some(square) = self.en_passant.take() {
            self.hash ^= zobrist::en_passant_file_hash(square.file())
        }
        if mv.kind == MoveKind::DoublePush {
            let (push, _, _) = Delta::pawn_deltas(us.is_black());
            self.en_passant = mv.origin.translate(push);
            self.hash ^= zobrist::en_passant_file_hash(mv.origin.file());
        }

        if mv.piece == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1)
        }
        if us.is_black() {
            self.fullmove_number = self.fullmove_number.saturating_add(1)
        }

        self.side_to_move.invert();
        self.hash ^= zobrist::side_to_move_hash();

        self.history.push(entry);
    }

    /// Undoes the effects of the last move played, restoring the position as it
    /// was prior to the move, and returns that move.
    ///
    /// If no moves were played prior to calling this function, nothing happens.
    pub fn unmake(&mut self) -> Option<Move> {
        let HistoryEntry {
            played,
            castling_rights,
            en_passant,
            halfmove_clock,
            hash,
        } = self.history.pop()?;

        self.side_to_move.invert();
        let us = self.side_to_move;
        if us.is_black() {
            self.fullmove_number = self.fullmove_number.saturating_sub(1)
        }

        // The hash is restored wholesale, so the board is edited directly.
        self.board[played.target as usize] = None;
        self.board[played.origin as usize] = Some(Piece::new(played.piece, us));
        if let Some(side) = played.castle() {
            let (rook_origin, rook_target) = side.rook_move(us);
            self.board[rook_origin as usize] = self.board[rook_target as usize].take();
        }
        if played.piece == PieceKind::King {
            self.kings[us as usize] = played.origin;
        }
        if let (Some(square), Some(kind)) = (played.capture_square(), played.captured) {
            self.board[square as usize] = Some(Piece::new(kind, us.inverse()));
        }

        self.castling_rights = castling_rights;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.hash = hash;

        Some(played)
    }

    /// Number of times the current position occurred in the game, this one
    /// included.
    ///
    /// Only positions since the last capture or pawn move are considered, since
    /// earlier ones cannot be repeated.
    pub fn repetitions(&self) -> usize {
        1 + self
            .history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .filter(|entry| entry.hash == self.hash)
            .count()
    }

    /// Checks if a threefold repetition occured in this game.
    pub fn threefold_repetition(&self) -> bool {
        self.repetitions() >= 3
    }

    /// Checks if this position is drawn by the fifty-move rule.
    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Checks if neither side has enough material left to deliver mate: bare
    /// kings, a single minor piece, or bishops that all live on the same
    /// square colour.
    pub fn insufficient_material(&self) -> bool {
        let mut minors = 0;
        let mut light_bishops = 0;
        let mut dark_bishops = 0;
        for sq in Square::squares_iter() {
            match self.piece_on(sq).map(|piece| piece.kind) {
                None | Some(PieceKind::King) => {}
                Some(PieceKind::Knight) => minors += 1,
                Some(PieceKind::Bishop) => {
                    minors += 1;
                    if sq.is_light() {
                        light_bishops += 1
                    } else {
                        dark_bishops += 1
                    }
                }
                Some(_) => return false,
            }
        }

        minors <= 1 || (minors == light_bishops + dark_bishops && (light_bishops == 0 || dark_bishops == 0))
    }

    /// Removes the piece on a square, keeping the hash up to date.
    #[inline]
    fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.board[square as usize].take()?;
        self.hash ^= zobrist::piece_hash(piece, square);
        Some(piece)
    }

    /// Places a piece on an empty square, keeping the hash up to date.
    #[inline]
    fn put(&mut self, square: Square, piece: Piece) {
        debug_assert!(self.board[square as usize].is_none());
        self.board[square as usize] = Some(piece);
        self.hash ^= zobrist::piece_hash(piece, square);
    }

    /// Hashes the position from 0.
    fn rehash(&mut self) {
        self.hash = 0;
        for sq in Square::squares_iter() {
            if let Some(piece) = self.piece_on(sq) {
                self.hash ^= zobrist::piece_hash(piece, sq);
            }
        }

        self.hash ^= self.castling_rights.zobrist_hash();
        if self.side_to_move.is_black() {
            self.hash ^= zobrist::side_to_move_hash();
        }

        if let Some(ep) = self.en_passant {
            self.hash ^= zobrist::en_passant_file_hash(ep.file())
        }
    }
}
impl TryFrom<Fen> for Position {
    type Error = FenError;

    fn try_from(fen: Fen) -> Result<Self, Self::Error> {
        let mut kings = [Square::A1; 2];
        for colour in [Colour::White, Colour::Black] {
            let king = Piece::new(PieceKind::King, colour);
            let mut squares = Square::squares_iter().filter(|&sq| fen.piece_on(sq) == Some(king));
            match (squares.next(), squares.count()) {
                (Some(square), 0) => kings[colour as usize] = square,
                (first, others) => {
                    return Err(FenError::KingCount {
                        colour,
                        count: usize::from(first.is_some()) + others,
                    })
                }
            }
        }
        check_material(&fen)?;

        let mut position = Self {
            board: fen.board,
            side_to_move: fen.side_to_move,
            castling_rights: fen.castling_rights,
            en_passant: fen.en_passant,
            halfmove_clock: fen.halfmove_clock,
            fullmove_number: fen.fullmove_number,
            history: Vec::new(),
            hash: 0,
            kings,
        };
        if position.is_king_in_check(position.side_to_move.inverse()) {
            return Err(FenError::OpponentInCheck);
        }

        position.rehash();
        Ok(position)
    }
}

/// Rejects material that no game can reach: pawns on a back rank, more than
/// 16 pieces or 8 pawns a side, or more promoted pieces than missing pawns.
fn check_material(fen: &Fen) -> Result<(), FenError> {
    if let Some(square) = Square::squares_iter().find(|sq| {
        fen.piece_on(*sq).is_some_and(|piece| piece.kind == PieceKind::Pawn)
            && matches!(sq.rank(), Rank::One | Rank::Eight)
    }) {
        return Err(FenError::PawnOnBackRank(square));
    }

    for colour in [Colour::White, Colour::Black] {
        let mut counts = [0usize; NUM_PIECES];
        for piece in fen.board.iter().flatten().filter(|piece| piece.colour == colour) {
            counts[piece.kind as usize] += 1;
        }
        let count = |kind: PieceKind| counts[kind as usize];

        let pieces: usize = counts.iter().sum();
        if pieces > 16 {
            return Err(FenError::TooManyPieces { colour, count: pieces });
        }
        let pawns = count(PieceKind::Pawn);
        if pawns > 8 {
            return Err(FenError::TooManyPawns { colour, count: pawns });
        }
        let promoted = count(PieceKind::Queen).saturating_sub(1)
            + count(PieceKind::Rook).saturating_sub(2)
            + count(PieceKind::Bishop).saturating_sub(2)
            + count(PieceKind::Knight).saturating_sub(2);
        let missing_pawns = 8 - pawns;
        if promoted > missing_pawns {
            return Err(FenError::TooManyPromotions {
                colour,
                promoted,
                missing_pawns,
            });
        }
    }
    Ok(())
}
impl std::str::FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}
impl std::hash::Hash for Position {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state)
    }
}
impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, square) in Square::squares_fen_iter().enumerate() {
            if i % 8 == 0 && i != 0 {
                match i / 8 {
                    3 => writeln!(f, "side to move: {}", self.side_to_move),
                    4 => writeln!(f, "halfmove clock: {}", self.halfmove_clock),
                    5 => writeln!(
                        f,
                        "en passant: {}",
                        if let Some(square) = self.en_passant {
                            square.to_string()
                        } else {
                            "-".to_string()
                        }
                    ),
                    6 => writeln!(f, "castling rights: {}", self.castling_rights),
                    7 => writeln!(f, "hash: {:#0x}", self.hash),
                    _ => writeln!(f),
                }?
            }
            write!(
                f,
                "{} ",
                match self.piece_on(square) {
                    None => '.',
                    Some(piece) => piece.to_char(),
                }
            )?
        }

        writeln!(f, "\nfen: {}", self.fen())
    }
}
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_survives_make_unmake() {
        let mut pos = Position::initial();
        let og_hash = pos.zobrist_hash();
        pos.play(MoveRequest::new(Square::E2, Square::E4)).unwrap();
        assert_ne!(og_hash, pos.zobrist_hash());
        pos.unmake();
        assert_eq!(og_hash, pos.zobrist_hash())
    }

    #[test]
    fn incremental_hash_matches_rehash() {
        let mut pos = Position::initial();
        for request in ["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6", "g1f3", "c6b5", "e1g1"] {
            pos.play(request.parse().unwrap()).unwrap();
            let mut fresh = Position::from_fen(&pos.fen()).unwrap();
            fresh.rehash();
            assert_eq!(fresh.zobrist_hash(), pos.zobrist_hash(), "after {request}");
        }
    }

    #[test]
    fn clocks_and_en_passant_bookkeeping() {
        let mut pos = Position::initial();
        pos.play("e2e4".parse().unwrap()).unwrap();
        assert_eq!(pos.en_passant(), Some(Square::E3));
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);

        pos.play("g8f6".parse().unwrap()).unwrap();
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.fullmove_number(), 2);
        assert_eq!(
            pos.fen(),
            "rnbqkb1r/pppppppp/5n2/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2"
        );
    }

    #[test]
    fn illegal_play_leaves_position_untouched() {
        let mut pos = Position::initial();
        let before = pos.clone();
        let request = MoveRequest::new(Square::E2, Square::E5);
        assert_eq!(pos.play(request), Err(IllegalMoveError(request)));
        assert_eq!(pos, before);
    }

    #[test]
    fn rejects_illegal_setups() {
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/7K w - - 0 1"),
            Err(FenError::KingCount {
                colour: Colour::Black,
                count: 0
            })
        );
        assert_eq!(
            Position::from_fen("kK6/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::KingCount {
                colour: Colour::White,
                count: 2
            })
        );
        // Black king attacked by the rook while white is to move.
        assert_eq!(
            Position::from_fen("k6R/8/8/8/8/8/8/7K w - - 0 1"),
            Err(FenError::OpponentInCheck)
        );
    }

    #[test]
    fn rejects_unreachable_material() {
        // Twenty-five queens would overflow any move list.
        assert_eq!(
            Position::from_fen("QQQQQQpk/Q4Qpp/Q6Q/Q6Q/3Q3Q/Q6Q/Q6Q/KQQQQQQQ w - - 0 1"),
            Err(FenError::PawnOnBackRank(Square::G8))
        );
        assert_eq!(
            Position::from_fen("QQQQQQ1k/Q4Qpp/Q6Q/Q6Q/3Q3Q/Q6Q/Q6Q/KQQQQQQQ w - - 0 1"),
            Err(FenError::TooManyPieces {
                colour: Colour::White,
                count: 26
            })
        );
        assert_eq!(
            Position::from_fen("4k3/pppppppp/p7/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::TooManyPawns {
                colour: Colour::Black,
                count: 9
            })
        );
        // Two extra queens with all eight pawns still on the board.
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/QQ6/PPPPPPPP/Q3K3 w - - 0 1"),
            Err(FenError::TooManyPromotions {
                colour: Colour::White,
                promoted: 2,
                missing_pawns: 0
            })
        );
        assert_eq!(
            Position::from_fen("4k2P/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::PawnOnBackRank(Square::H8))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/p3K3 w - - 0 1"),
            Err(FenError::PawnOnBackRank(Square::A1))
        );

        // Promoted pieces are fine as long as pawns went missing for them.
        let pos = Position::from_fen("4k3/8/8/8/8/QQQ5/PPPPP3/Q3K3 w - - 0 1").unwrap();
        assert_eq!(pos.pieces(Colour::White).count(), 10);
    }

    #[test]
    fn initial_matches_its_fen() {
        let pos = Position::initial();
        assert_eq!(pos, Position::from_fen(Fen::INITIAL).unwrap());
        assert_eq!(pos.zobrist_hash(), Position::from_fen(Fen::INITIAL).unwrap().zobrist_hash());
        assert_eq!(pos.king_square(Colour::White), Square::E1);
        assert_eq!(pos.king_square(Colour::Black), Square::E8);
    }

    #[test]
    fn king_squares_follow_the_kings() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        pos.play("e1g1".parse().unwrap()).unwrap();
        assert_eq!(pos.king_square(Colour::White), Square::G1);
        pos.play("e8d7".parse().unwrap()).unwrap();
        assert_eq!(pos.king_square(Colour::Black), Square::D7);
        pos.unmake();
        pos.unmake();
        assert_eq!(pos.king_square(Colour::White), Square::E1);
        assert_eq!(pos.king_square(Colour::Black), Square::E8);
    }

    #[test]
    fn rook_capture_removes_castling_right() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        pos.play("a1a8".parse().unwrap()).unwrap();
        assert_eq!(pos.castling_rights().to_string(), "Kk");
        pos.unmake();
        assert_eq!(pos.castling_rights().to_string(), "KQkq");
    }

    #[test]
    fn insufficient_material_cases() {
        for (fen, expected) in [
            ("8/8/8/4k3/8/8/8/4K3 w - - 0 1", true),
            ("8/8/8/4k3/8/8/8/4KN2 w - - 0 1", true),
            ("8/8/8/4kb2/8/8/8/4K3 w - - 0 1", true),
            // Bishops on f1 (light) and c8 (light).
            ("2b5/8/8/4k3/8/8/8/4KB2 w - - 0 1", true),
            // Bishops on f1 (light) and f8 (dark).
            ("5b2/8/8/4k3/8/8/8/4KB2 w - - 0 1", false),
            ("8/8/8/4k3/8/8/8/3NKN2 w - - 0 1", false),
            ("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1", false),
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.insufficient_material(), expected, "{fen}");
        }
    }
}
