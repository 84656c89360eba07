//! # Parsing
//! Squares, moves and positions travel across the network as plain text. All of
//! them are parsable from raw strings using the standard Rust
//! [`FromStr`](std::str::FromStr) trait.
//!
//! Small building blocks (files, ranks, squares) additionally implement
//! [`PartialFromStr`], a parser combinator trait: the `Ok` variant contains the
//! parsed value along with the suffix of the input that was not consumed.
//! A string like "e2e4" returns `Ok((Square::E2, "e4"))`, so a long algebraic
//! move is parsed by successive calls to `partial_from_str`.

use std::convert::Infallible;

pub trait PartialFromStr: Sized {
    type Err;

    fn partial_from_str(s: &str) -> Result<(Self, &str), Self::Err>;
}
impl<T: PartialFromStr> PartialFromStr for Option<T> {
    type Err = Infallible;

    fn partial_from_str(s: &str) -> Result<(Self, &str), Self::Err> {
        match T::partial_from_str(s) {
            Ok((value, rest)) => Ok((Some(value), rest)),
            Err(_) => Ok((None, s)),
        }
    }
}
