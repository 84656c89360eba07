//! # Parlor
//! The chess core of a real-time game room: a complete rules engine (legal
//! moves, check, checkmate, stalemate and draws, FEN), game sessions with
//! seated players, and an alpha-beta computer opponent.
//!
//! It is usable as both a library embedded in a room server and a standalone
//! binary for perft runs and quick analysis.

pub mod game;
pub mod parsing;
pub mod search;

#[cfg(test)]
mod tests;
