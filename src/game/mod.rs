//! # Chess API
//! This module contains everything Chess related: the board state, moves and
//! their generation, FEN and SAN notations, and game sessions.

pub mod action;
mod attacks;
pub mod castling_rights;
pub mod colour;
pub mod fen;
pub mod history;
pub mod movegen;
mod notation;
#[cfg(feature = "perft")]
pub mod perft;
pub mod piece;
pub mod position;
pub mod session;
pub mod square;
mod zobrist;
