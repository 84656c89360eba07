//! # Zobrist hashing keys and utilities
//!
//! Keys are drawn once from a generator seeded with a fixed constant, so hashes
//! are stable across runs and threads.

use std::sync::LazyLock;

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::{
    colour::NUM_COLOURS,
    piece::{Piece, NUM_PIECES},
    square::{File, Square},
};

const PIECE_KEYS: usize = 64 * NUM_PIECES * NUM_COLOURS;
const SIDE_TO_MOVE_OFFSET: usize = PIECE_KEYS;
const CASTLING_RIGHTS_OFFSET: usize = SIDE_TO_MOVE_OFFSET + 1;
const EN_PASSANT_OFFSET: usize = CASTLING_RIGHTS_OFFSET + 4;
const NUM_KEYS: usize = EN_PASSANT_OFFSET + 8;

const SEED: u64 = 0x5eed_c0ff_ee15_900d;

static ZOBRIST_KEYS: LazyLock<[u64; NUM_KEYS]> = LazyLock::new(|| {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut keys = [0; NUM_KEYS];
    for key in &mut keys {
        *key = rng.gen()
    }
    keys
});

// We need:
// - one number for each piece on each square (64 * 12)
// - one number for side to move
// - four numbers for castling rights
// - eight numbers for en passant file
#[inline(always)]
pub fn piece_hash(piece: Piece, square: Square) -> u64 {
    let piece_index = piece.colour as usize * NUM_PIECES + piece.kind as usize;
    ZOBRIST_KEYS[piece_index * 64 + square as usize]
}
#[inline(always)]
pub fn side_to_move_hash() -> u64 {
    ZOBRIST_KEYS[SIDE_TO_MOVE_OFFSET]
}
#[inline(always)]
pub fn castling_right_hash(flag_index: usize) -> u64 {
    ZOBRIST_KEYS[CASTLING_RIGHTS_OFFSET + flag_index]
}
#[inline(always)]
pub fn en_passant_file_hash(file: File) -> u64 {
    ZOBRIST_KEYS[EN_PASSANT_OFFSET + file as usize]
}
