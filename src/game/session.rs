//! # Game sessions
//! [`Game`] is the turn-based state machine behind a chess room: it seats two
//! players, validates their moves against the rules, classifies the outcome
//! after every ply and hands positions over to the search for computer turns.
//!
//! Rejected requests never change the game, so a client can safely retry them.

use thiserror::Error;

use super::{
    action::{Move, MoveRequest},
    colour::Colour,
    fen::FenError,
    position::Position,
    square::Square,
};
use crate::search::{SearchConfig, SearchHandle, SearchResult};

/// Why a game ended in a draw.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrawReason {
    InsufficientMaterial,
    FiftyMoves,
    Repetition,
}
impl std::fmt::Display for DrawReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::FiftyMoves => "fifty-move rule",
            DrawReason::Repetition => "threefold repetition",
        })
    }
}

/// Status of a game. Every status but [`GameStatus::InProgress`] is final.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    InProgress,
    Checkmate { winner: Colour },
    Stalemate,
    Draw(DrawReason),
    Resigned { winner: Colour },
}
impl GameStatus {
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    /// Draws, stalemate included.
    #[inline]
    pub fn is_draw(self) -> bool {
        matches!(self, GameStatus::Stalemate | GameStatus::Draw(_))
    }

    #[inline]
    pub fn winner(self) -> Option<Colour> {
        match self {
            GameStatus::Checkmate { winner } | GameStatus::Resigned { winner } => Some(winner),
            _ => None,
        }
    }
}
impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw(reason) => write!(f, "draw by {reason}"),
            GameStatus::Resigned { winner } => write!(f, "{} resigned, {winner} wins", winner.inverse()),
        }
    }
}

/// Errors returned when acting on a game. The game is left untouched.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(MoveRequest),
    #[error("It is not {0}'s turn")]
    NotYourTurn(Colour),
    #[error("The game is over ({0})")]
    GameAlreadyOver(GameStatus),
    #[error("{0} is not playing in this game")]
    NotAPlayer(String),
    #[error("No move to take back")]
    NothingToUndo,
    #[error("Search result #{ticket} is outdated, the game is at revision {revision}")]
    StaleSearchResult { ticket: u64, revision: u64 },
    #[error("The search did not find any move")]
    NoEngineMove,
}

/// Everything a client needs to display after a move.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveOutcome {
    pub played: Move,
    /// The move in Standard Algebraic Notation.
    pub san: String,
    /// FEN of the position after the move.
    pub fen: String,
    pub status: GameStatus,
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub draw: bool,
    pub game_over: bool,
    pub winner: Option<Colour>,
}

/// A chess game between two seated players.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    status: GameStatus,
    players: [String; 2],
    san_history: Vec<String>,
    revision: u64,
}
impl Game {
    /// Starts a game from the initial position.
    pub fn new(white: impl Into<String>, black: impl Into<String>) -> Self {
        Self::from_position(Position::initial(), white, black)
    }

    /// Starts a game from a FEN string.
    /// # Errors
    /// This function returns an error if the FEN string is not a valid position.
    pub fn from_fen(
        fen: &str,
        white: impl Into<String>,
        black: impl Into<String>,
    ) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?, white, black))
    }

    /// Starts a game from a given position. The position may already be over.
    ///
    /// Moves already played on the position are kept: they show up in
    /// [`Game::san_history`] and can be taken back.
    pub fn from_position(position: Position, white: impl Into<String>, black: impl Into<String>) -> Self {
        let mut game = Self {
            san_history: replay_san(&position),
            position,
            status: GameStatus::InProgress,
            players: [white.into(), black.into()],
            revision: 0,
        };
        game.status = game.classify();
        game
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[inline]
    pub fn side_to_move(&self) -> Colour {
        self.position.side_to_move()
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    /// Moves played so far in Standard Algebraic Notation, oldest first.
    pub fn san_history(&self) -> &[String] {
        &self.san_history
    }

    /// Counter bumped by every change made to the game.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Player seated on a given side.
    pub fn player(&self, colour: Colour) -> &str {
        &self.players[colour as usize]
    }

    /// Side played by a given player. White wins if both seats hold the same
    /// player.
    pub fn side_of(&self, player: &str) -> Result<Colour, GameError> {
        [Colour::White, Colour::Black]
            .into_iter()
            .find(|&colour| self.player(colour) == player)
            .ok_or_else(|| GameError::NotAPlayer(player.to_string()))
    }

    /// Legal target squares of the piece on `origin`, for move hints.
    pub fn legal_targets(&self, origin: Square) -> Vec<Square> {
        if self.status.is_over() {
            return Vec::new();
        }
        self.position
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.origin == origin)
            .map(|mv| mv.target)
            .collect()
    }

    /// Plays a move for `side`.
    /// # Errors
    /// This function returns an error if the game is over, if `side` is not to
    /// move or if the request does not designate a legal move. Promotions must
    /// name the promotion piece.
    pub fn submit_move(&mut self, side: Colour, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        self.check_turn(side)?;
        let mv = self.position.find_legal(&request).ok_or_else(|| {
            log::debug!("Rejected {request} from {side} in {}", self.position.fen());
            GameError::IllegalMove(request)
        })?;
        Ok(self.apply(mv))
    }

    /// Plays a move for the side `player` is seated on.
    pub fn submit_move_as(&mut self, player: &str, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        let side = self.side_of(player)?;
        self.submit_move(side, request)
    }

    /// Ends the game, `side` losing.
    /// # Errors
    /// This function returns an error if the game is already over.
    pub fn resign(&mut self, side: Colour) -> Result<GameStatus, GameError> {
        if self.status.is_over() {
            return Err(GameError::GameAlreadyOver(self.status));
        }
        self.set_status(GameStatus::Resigned {
            winner: side.inverse(),
        });
        self.revision += 1;
        Ok(self.status)
    }

    /// Resigns for the side `player` is seated on.
    pub fn resign_as(&mut self, player: &str) -> Result<GameStatus, GameError> {
        let side = self.side_of(player)?;
        self.resign(side)
    }

    /// Takes back the last move, reopening the game if that move ended it.
    /// # Errors
    /// This function returns an error if no move was played, or if the game
    /// ended by resignation.
    pub fn undo(&mut self) -> Result<Move, GameError> {
        if let GameStatus::Resigned { .. } = self.status {
            return Err(GameError::GameAlreadyOver(self.status));
        }
        let mv = self.position.unmake().ok_or(GameError::NothingToUndo)?;
        self.san_history.pop();
        debug_assert_eq!(self.san_history.len(), self.position.ply_count());
        self.revision += 1;
        let status = self.classify();
        self.set_status(status);
        log::debug!("Took back {mv}");
        Ok(mv)
    }

    /// Starts a search for the side to move on a snapshot of the game. The
    /// search is tagged with the current revision, see
    /// [`Game::apply_engine_move`].
    /// # Errors
    /// This function returns an error if the game is over.
    pub fn request_engine_move(&self, config: SearchConfig) -> Result<SearchHandle, GameError> {
        if self.status.is_over() {
            return Err(GameError::GameAlreadyOver(self.status));
        }
        Ok(config
            .with_colour(self.side_to_move())
            .spawn(self.position.clone(), self.revision))
    }

    /// Plays the move found by a search started with
    /// [`Game::request_engine_move`].
    /// # Errors
    /// This function returns an error if the game changed since the search
    /// started, if the search found no move, or if the game is over.
    pub fn apply_engine_move(&mut self, result: &SearchResult) -> Result<MoveOutcome, GameError> {
        if self.status.is_over() {
            return Err(GameError::GameAlreadyOver(self.status));
        }
        if result.ticket != self.revision {
            log::info!(
                "Dropping search result #{} at revision {}",
                result.ticket,
                self.revision
            );
            return Err(GameError::StaleSearchResult {
                ticket: result.ticket,
                revision: self.revision,
            });
        }
        let best = result.best.ok_or(GameError::NoEngineMove)?;
        let mv = self
            .position
            .find_legal(&best.request())
            .ok_or(GameError::IllegalMove(best.request()))?;
        Ok(self.apply(mv))
    }

    fn check_turn(&self, side: Colour) -> Result<(), GameError> {
        if self.status.is_over() {
            Err(GameError::GameAlreadyOver(self.status))
        } else if side != self.side_to_move() {
            Err(GameError::NotYourTurn(side))
        } else {
            Ok(())
        }
    }

    /// Makes a legal move and reports the new state of the game.
    fn apply(&mut self, mv: Move) -> MoveOutcome {
        let san = self.position.san(mv);
        self.position.make(mv);
        self.san_history.push(san.clone());
        self.revision += 1;
        let status = self.classify();
        self.set_status(status);

        MoveOutcome {
            played: mv,
            san,
            fen: self.position.fen(),
            status,
            check: self.position.in_check(),
            checkmate: matches!(status, GameStatus::Checkmate { .. }),
            stalemate: status == GameStatus::Stalemate,
            draw: status.is_draw(),
            game_over: status.is_over(),
            winner: status.winner(),
        }
    }

    fn classify(&self) -> GameStatus {
        let position = &self.position;
        if !position.has_legal_moves() {
            if position.in_check() {
                GameStatus::Checkmate {
                    winner: position.side_to_move().inverse(),
                }
            } else {
                GameStatus::Stalemate
            }
        } else if position.insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if position.fifty_move_draw() {
            GameStatus::Draw(DrawReason::FiftyMoves)
        } else if position.threefold_repetition() {
            GameStatus::Draw(DrawReason::Repetition)
        } else {
            GameStatus::InProgress
        }
    }

    fn set_status(&mut self, status: GameStatus) {
        if status != self.status {
            log::info!("Game status: {} -> {status}", self.status);
        }
        self.status = status;
    }
}

/// SAN of the moves played on a position, oldest first.
fn replay_san(position: &Position) -> Vec<String> {
    let mut replay = position.clone();
    while replay.unmake().is_some() {}
    position
        .moves_played()
        .map(|mv| {
            let san = replay.san(mv);
            replay.make(mv);
            san
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn request(s: &str) -> MoveRequest {
        s.parse().unwrap()
    }

    #[test]
    fn seats_and_turns() {
        let mut game = Game::new("alice", "bob");
        assert_eq!(game.side_of("alice"), Ok(Colour::White));
        assert_eq!(game.side_of("bob"), Ok(Colour::Black));
        assert_eq!(
            game.side_of("mallory"),
            Err(GameError::NotAPlayer("mallory".to_string()))
        );

        assert_eq!(
            game.submit_move_as("bob", request("e7e5")),
            Err(GameError::NotYourTurn(Colour::Black))
        );
        let outcome = game.submit_move_as("alice", request("e2e4")).unwrap();
        assert_eq!(outcome.san, "e4");
        assert!(!outcome.game_over);
        assert_eq!(game.revision(), 1);
        assert!(game.submit_move_as("bob", request("e7e5")).is_ok());
        assert_eq!(game.san_history(), ["e4", "e5"]);
    }

    #[test]
    fn rejected_requests_change_nothing() {
        let mut game = Game::new("alice", "bob");
        let before = game.fen();
        for _ in 0..2 {
            assert_eq!(
                game.submit_move(Colour::White, request("e2e5")),
                Err(GameError::IllegalMove(request("e2e5")))
            );
        }
        assert_eq!(game.fen(), before);
        assert_eq!(game.revision(), 0);
    }

    #[test]
    fn promotion_piece_is_mandatory() {
        let mut game = Game::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1", "a", "b").unwrap();
        assert_eq!(
            game.submit_move(Colour::White, request("a7a8")),
            Err(GameError::IllegalMove(request("a7a8")))
        );
        let outcome = game.submit_move(Colour::White, request("a7a8q")).unwrap();
        assert_eq!(outcome.san, "a8=Q+");
        assert!(outcome.check);
    }

    #[test]
    fn resignation_is_final() {
        let mut game = Game::new("alice", "bob");
        game.submit_move(Colour::White, request("e2e4")).unwrap();
        let status = game.resign_as("bob").unwrap();
        assert_eq!(status, GameStatus::Resigned { winner: Colour::White });
        assert_eq!(status.winner(), Some(Colour::White));
        assert_eq!(game.resign(Colour::White), Err(GameError::GameAlreadyOver(status)));
        assert_eq!(game.undo(), Err(GameError::GameAlreadyOver(status)));
        assert_eq!(
            game.submit_move(Colour::Black, request("e7e5")),
            Err(GameError::GameAlreadyOver(status))
        );
        assert!(game.legal_targets(Square::E7).is_empty());
    }

    #[test]
    fn undo_reopens_finished_games() {
        let mut game = Game::new("alice", "bob");
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));
        for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.submit_move(game.side_to_move(), request(mv)).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Colour::Black });

        let taken_back = game.undo().unwrap();
        assert_eq!(taken_back.to_string(), "d8h4");
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.side_to_move(), Colour::Black);
        assert_eq!(game.san_history().len(), 3);
    }

    #[test]
    fn starting_from_a_finished_position() {
        let game = Game::from_fen("k7/2Q5/8/8/8/8/8/7K b - - 0 1", "a", "b").unwrap();
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert!(game.status().is_draw());
        assert!(game.request_engine_move(SearchConfig::new()).is_err());
    }

    #[test]
    fn moves_already_played_are_kept() {
        let mut position = Position::initial();
        for mv in ["e2e4", "e7e5", "g1f3"] {
            position.play(request(mv)).unwrap();
        }
        let mut game = Game::from_position(position, "alice", "bob");
        assert_eq!(game.san_history(), ["e4", "e5", "Nf3"]);
        assert_eq!(game.position().ply_count(), 3);

        for _ in 0..3 {
            game.undo().unwrap();
            assert_eq!(game.san_history().len(), game.position().ply_count());
        }
        assert_eq!(game.undo(), Err(GameError::NothingToUndo));
        assert_eq!(game.fen(), Position::initial().fen());
    }

    #[test]
    fn legal_targets_for_hints() {
        let game = Game::new("alice", "bob");
        let mut targets = game.legal_targets(Square::G1);
        targets.sort();
        assert_eq!(targets, vec![Square::F3, Square::H3]);
        assert!(game.legal_targets(Square::E4).is_empty());
    }
}
