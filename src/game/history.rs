use super::{action::Move, castling_rights::CastlingRights, square::Square};

/// Records non-reversible informations that are lost when making a move.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct HistoryEntry {
    pub played: Move,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    /// Hash of the position before `played`.
    pub hash: u64,
}
