use std::process::ExitCode;

use clap::{Parser, Subcommand};
#[cfg(feature = "perft")]
use parlor::game::perft::PerftConfig;
use parlor::{
    game::{fen::Fen, position::Position, session::Game},
    search::{best_move, eval, SearchConfig, DEFAULT_DEPTH},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs perft (counting all legal move sequences up to a certain depth)
    Perft {
        /// Maximum depth to reach
        depth: u8,
        /// Starting position as a FEN string
        #[arg(short, long, default_value = Fen::INITIAL)]
        fen: String,
        /// Shows move count for each move from the starting position
        #[arg(short)]
        divide: bool,
        /// Show timing information
        #[arg(long)]
        bench: bool,
    },
    /// Searches the best move for the side to move
    Bestmove {
        /// Position as a FEN string
        #[arg(short, long, default_value = Fen::INITIAL)]
        fen: String,
        /// Number of plies to look ahead
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
    },
    /// Lets the engine play against itself
    Selfplay {
        /// Starting position as a FEN string
        #[arg(short, long, default_value = Fen::INITIAL)]
        fen: String,
        /// Number of plies to look ahead
        #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
        depth: u8,
        /// Maximum number of plies to play
        #[arg(short, long, default_value_t = 200)]
        plies: usize,
    },
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        #[cfg(feature = "perft")]
        Command::Perft {
            depth,
            fen,
            divide,
            bench,
        } => {
            let mut position = Position::from_fen(&fen)?;
            println!("{position}");
            PerftConfig::new(depth)
                .divide_moves(divide)
                .bulk_counting(true)
                .benchmark(bench)
                .go(&mut position);
        }
        #[cfg(not(feature = "perft"))]
        Command::Perft { .. } => {
            eprintln!("parlor has not been compiled with feature `perft`");
        }
        Command::Bestmove { fen, depth } => {
            let position = Position::from_fen(&fen)?;
            match best_move(&position, depth, position.side_to_move()) {
                Some(mv) => println!("bestmove {mv} ({})", position.san(mv)),
                None => println!("bestmove (none)"),
            }
        }
        Command::Selfplay { fen, depth, plies } => {
            let mut game = Game::from_fen(&fen, "engine", "engine")?;
            let config = SearchConfig::new().with_depth(depth);
            for _ in 0..plies {
                if game.status().is_over() {
                    break;
                }
                let Some(result) = game.request_engine_move(config)?.wait() else {
                    return Err("search thread died".into());
                };
                let outcome = game.apply_engine_move(&result)?;
                let score = match eval::mate_distance(result.score) {
                    Some(plies) => format!("mate in {plies} plies"),
                    None => format!("{}cp", result.score),
                };
                println!(
                    "{:>3}. {:<8} {score:<18} {} nodes",
                    game.san_history().len(),
                    outcome.san,
                    result.nodes
                );
            }
            println!("\n{}", game.san_history().join(" "));
            println!("{}", game.status());
            println!("{}", game.fen());
        }
    }
    Ok(())
}

pub fn main() -> ExitCode {
    env_logger::init();
    let args = Arguments::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
