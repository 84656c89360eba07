//! # Perft testing/benchmarking
//!
//! Counts the leaves of the legal move tree up to a fixed depth. Comparing the
//! counts against published values is the standard way to validate a move
//! generator.

use std::time::Instant;

use super::position::Position;

/// Builder pattern to configure a Perft run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerftConfig {
    depth: u8,
    divide: bool,
    bulk_counting: bool,
    bench: bool,
}
impl PerftConfig {
    pub fn new(depth: u8) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    /// Sets the maximum depth of the perft run.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// Shows perft results per legal move at the starting position.
    pub fn divide_moves(mut self, value: bool) -> Self {
        self.divide = value;
        self
    }

    /// If set to true, simply returns the number of legal moves at horizon nodes.
    pub fn bulk_counting(mut self, value: bool) -> Self {
        self.bulk_counting = value;
        self
    }

    /// Measures the time it takes to complete the run.
    pub fn benchmark(mut self, value: bool) -> Self {
        self.bench = value;
        self
    }

    /// Counts the nodes at the configured depth without printing anything.
    pub fn count(&self, position: &mut Position) -> u64 {
        perft_rec(position, self.depth, self.bulk_counting)
    }

    /// Runs a Perft test on the given position, printing the results, and
    /// returns the number of nodes found.
    pub fn go(&self, position: &mut Position) -> u64 {
        let start = Instant::now();
        let nodes: u64 = if self.depth == 0 {
            1
        } else {
            position
                .legal_moves()
                .into_iter()
                .map(|mv| {
                    position.make(mv);
                    let mv_nodes = perft_rec(position, self.depth - 1, self.bulk_counting);
                    position.unmake();
                    if self.divide {
                        println!("{mv}: {mv_nodes}");
                    }
                    mv_nodes
                })
                .sum()
        };
        let elapsed = start.elapsed().as_secs_f64();

        println!("depth {}: {nodes} nodes", self.depth);
        if self.bench {
            println!(
                "\ttook {} ({})",
                human_readable_time(elapsed),
                human_readable_nps(nodes as f64 / elapsed)
            );
        }
        nodes
    }
}

/// Traverses all nodes accessible from a given position, returning the number of
/// leaves reached.
pub fn perft(position: &mut Position, depth: u8) -> u64 {
    perft_rec(position, depth, true)
}

fn perft_rec(position: &mut Position, depth_left: u8, bulk_counting: bool) -> u64 {
    if depth_left == 0 {
        1
    } else if depth_left == 1 && bulk_counting {
        position.legal_moves().len() as u64
    } else {
        position
            .legal_moves()
            .into_iter()
            .map(|mv| {
                position.make(mv);
                let mv_nodes = perft_rec(position, depth_left - 1, bulk_counting);
                position.unmake();
                mv_nodes
            })
            .sum()
    }
}

fn human_readable_time(secs: f64) -> String {
    if secs < 0.001 {
        format!("{:.3}µs", secs * 1_000_000.)
    } else if secs < 1. {
        format!("{:.3}ms", secs * 1_000.)
    } else {
        format!("{secs:.3}s")
    }
}

fn human_readable_nps(nps: f64) -> String {
    if nps > 1_000_000. {
        format!("{:.3}Mnps", nps / 1_000_000.)
    } else if nps > 1_000. {
        format!("{:.3}Knps", nps / 1_000.)
    } else {
        format!("{nps:.3}nps")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn check_matching(position: &mut Position, expected: &[u64]) {
        let before = position.clone();
        for (depth, expected) in expected.iter().enumerate() {
            let actual = perft(position, depth as u8 + 1);
            assert_eq!(
                actual,
                *expected,
                "Expected {expected} at depth {} for {}, but got {actual}",
                depth + 1,
                position.fen(),
            );
        }
        assert_eq!(*position, before);
    }

    #[test]
    fn initial_position_perft() {
        check_matching(&mut Position::initial(), &[20, 400, 8902])
    }

    #[test]
    fn kiwipete_perft() {
        check_matching(
            &mut Position::from_fen(
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - ",
            )
            .unwrap(),
            &[48, 2039],
        )
    }

    #[test]
    fn endgame_perft() {
        check_matching(
            &mut Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - ").unwrap(),
            &[14, 191, 2812],
        )
    }

    #[test]
    fn promotion_heavy_perft() {
        check_matching(
            &mut Position::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8")
                .unwrap(),
            &[44, 1486],
        )
    }

    #[test]
    #[ignore]
    fn deep_initial_position_perft() {
        check_matching(&mut Position::initial(), &[20, 400, 8902, 197281, 4865609])
    }

    #[test]
    fn divide_sums_to_total() {
        let mut position = Position::initial();
        let config = PerftConfig::new(2).divide_moves(true);
        assert_eq!(config.go(&mut position), 400);
        assert_eq!(config.bulk_counting(true).count(&mut position), 400);
    }
}
