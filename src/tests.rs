use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    game::{
        action::{MoveKind, MoveRequest},
        castling_rights::CastleKind,
        colour::Colour,
        fen::Fen,
        piece::{Piece, PieceKind},
        position::Position,
        session::{DrawReason, Game, GameError, GameStatus},
        square::{File, Rank, Square},
    },
    search::{best_move, SearchConfig},
};

fn request(s: &str) -> MoveRequest {
    s.parse().unwrap()
}

/// A square holding a piece of the side not to move is attacked by the side
/// to move exactly when some pseudo-legal move captures on it. En passant
/// captures land on an empty square and are left out.
fn assert_attack_symmetry(position: &Position) {
    let us = position.side_to_move();
    let captures: Vec<_> = position
        .pseudo_legal_moves()
        .into_iter()
        .filter(|mv| mv.is_capture() && !mv.is_en_passant())
        .map(|mv| mv.target)
        .collect();
    for sq in Square::squares_iter() {
        if position.piece_on(sq).is_some_and(|piece| piece.colour != us) {
            assert_eq!(
                position.is_square_attacked(sq, us),
                captures.contains(&sq),
                "{sq} in {}",
                position.fen()
            );
        }
    }
}

#[test]
fn npo_for_enums() {
    use std::mem::size_of;
    assert_eq!(size_of::<PieceKind>(), size_of::<Option<PieceKind>>());
    assert_eq!(size_of::<File>(), size_of::<Option<File>>());
    assert_eq!(size_of::<Rank>(), size_of::<Option<Rank>>());
    assert_eq!(size_of::<Square>(), size_of::<Option<Square>>());
    assert_eq!(size_of::<Piece>(), size_of::<Option<Piece>>());
}

#[test]
fn fen_round_trip_through_random_games() {
    for seed in 0..4 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut position = Position::initial();
        for _ in 0..80 {
            let fen = position.fen();
            let reloaded = Position::from_fen(&fen).unwrap();
            assert_eq!(reloaded.fen(), fen);
            assert_eq!(reloaded.zobrist_hash(), position.zobrist_hash(), "{fen}");
            assert_attack_symmetry(&position);

            let moves = position.legal_moves();
            if moves.is_empty() {
                break;
            }
            position.make(moves[rng.gen_range(0..moves.len())]);
        }

        while position.unmake().is_some() {}
        assert_eq!(position.fen(), Fen::INITIAL);
        assert_eq!(position.zobrist_hash(), Position::initial().zobrist_hash());
    }
}

#[test]
fn attack_symmetry_in_tactical_positions() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ] {
        assert_attack_symmetry(&Position::from_fen(fen).unwrap());
    }
}

#[test]
fn en_passant_make_unmake() {
    let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
    let mut position = Position::from_fen(fen).unwrap();
    let mv = position.play(request("e5d6")).unwrap();
    assert_eq!(mv.kind, MoveKind::EnPassant);
    assert_eq!(mv.captured, Some(PieceKind::Pawn));
    assert_eq!(position.piece_on(Square::D5), None);
    assert_eq!(
        position.piece_on(Square::D6),
        Some(Piece::new(PieceKind::Pawn, Colour::White))
    );
    assert_eq!(
        position.fen(),
        "rnbqkbnr/ppp1pppp/3P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3"
    );

    position.unmake();
    assert_eq!(position.fen(), fen);
}

#[test]
fn kingside_castling_make_unmake() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQK2R w KQkq - 0 1";
    let mut position = Position::from_fen(fen).unwrap();
    let mv = position.play(request("e1g1")).unwrap();
    assert_eq!(mv.kind, MoveKind::Castle(CastleKind::KingSide));
    assert_eq!(
        position.fen(),
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1RK1 b kq - 1 1"
    );

    position.unmake();
    assert_eq!(position.fen(), fen);
}

#[test]
fn four_promotions_and_undo() {
    let fen = "8/P7/8/8/8/8/8/k6K w - - 0 1";
    let mut position = Position::from_fen(fen).unwrap();
    let promotions: Vec<_> = position
        .legal_moves()
        .into_iter()
        .filter(|mv| mv.origin == Square::A7)
        .collect();
    assert_eq!(promotions.len(), 4);

    for mv in promotions {
        let kind = mv.promotion().unwrap();
        position.make(mv);
        assert_eq!(
            position.piece_on(Square::A8),
            Some(Piece::new(kind, Colour::White))
        );
        assert_eq!(position.piece_on(Square::A7), None);
        position.unmake();
        assert_eq!(position.fen(), fen);
    }
}

#[test]
fn fools_mate() {
    let mut game = Game::new("alice", "bob");
    let mut last = None;
    for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        last = Some(game.submit_move(game.side_to_move(), request(mv)).unwrap());
    }
    let outcome = last.unwrap();
    assert_eq!(outcome.san, "Qh4#");
    assert!(outcome.check);
    assert!(outcome.checkmate);
    assert!(outcome.game_over);
    assert!(!outcome.draw);
    assert_eq!(outcome.winner, Some(Colour::Black));
    assert!(game.position().legal_moves().is_empty());
    assert_eq!(
        game.submit_move(Colour::White, request("e1f2")),
        Err(GameError::GameAlreadyOver(GameStatus::Checkmate {
            winner: Colour::Black
        }))
    );
}

#[test]
fn stalemate() {
    let position = Position::from_fen("k7/2Q5/8/8/8/8/8/7K b - - 0 1").unwrap();
    assert!(position.legal_moves().is_empty());
    assert!(!position.in_check());

    let mut game = Game::from_fen("k7/8/8/2Q5/8/8/8/7K w - - 0 1", "alice", "bob").unwrap();
    let outcome = game.submit_move(Colour::White, request("c5c7")).unwrap();
    assert!(outcome.stalemate);
    assert!(outcome.draw);
    assert!(outcome.game_over);
    assert!(!outcome.check);
    assert_eq!(outcome.winner, None);
}

#[test]
fn repetition_draw_after_knight_shuffles() {
    let mut game = Game::new("alice", "bob");
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    for mv in shuffle.iter().chain(&shuffle[..3]) {
        let outcome = game.submit_move(game.side_to_move(), request(mv)).unwrap();
        assert!(!outcome.game_over, "after {mv}");
    }
    let outcome = game.submit_move(Colour::Black, request("f6g8")).unwrap();
    assert_eq!(outcome.status, GameStatus::Draw(DrawReason::Repetition));
    assert!(outcome.draw);
    assert_eq!(game.position().repetitions(), 3);
}

#[test]
fn fifty_move_draw() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 60", "alice", "bob").unwrap();
    assert_eq!(game.status(), GameStatus::InProgress);
    let outcome = game.submit_move(Colour::White, request("a1a2")).unwrap();
    assert_eq!(outcome.status, GameStatus::Draw(DrawReason::FiftyMoves));

    // A pawn move resets the clock.
    let mut game = Game::from_fen("4k3/8/8/8/8/8/P7/4K3 w - - 99 60", "alice", "bob").unwrap();
    let outcome = game.submit_move(Colour::White, request("a2a3")).unwrap();
    assert_eq!(outcome.status, GameStatus::InProgress);
}

#[test]
fn insufficient_material_after_capture() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/4r3/4K1N1 w - - 0 1", "alice", "bob").unwrap();
    let outcome = game.submit_move(Colour::White, request("e1e2")).unwrap();
    assert_eq!(
        outcome.status,
        GameStatus::Draw(DrawReason::InsufficientMaterial)
    );
}

#[test]
fn rejection_is_idempotent() {
    let mut game = Game::new("alice", "bob");
    let before = game.fen();
    for _ in 0..3 {
        assert_eq!(
            game.submit_move(Colour::Black, request("e7e5")),
            Err(GameError::NotYourTurn(Colour::Black))
        );
        assert_eq!(
            game.submit_move(Colour::White, request("e1e2")),
            Err(GameError::IllegalMove(request("e1e2")))
        );
    }
    assert_eq!(game.fen(), before);
    assert_eq!(game.revision(), 0);
}

#[test]
fn search_is_deterministic() {
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
    let first = best_move(&Position::from_fen(fen).unwrap(), 3, Colour::White);
    let second = best_move(&Position::from_fen(fen).unwrap(), 3, Colour::White);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn search_finds_mate_in_one() {
    let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/3R2K1 w - - 0 1", "alice", "computer").unwrap();
    let result = game
        .request_engine_move(SearchConfig::new().with_depth(2))
        .unwrap()
        .wait()
        .unwrap();
    let outcome = game.apply_engine_move(&result).unwrap();
    assert_eq!(outcome.san, "Rd8#");
    assert!(outcome.checkmate);
    assert_eq!(outcome.winner, Some(Colour::White));
}

#[test]
fn stale_search_results_are_dropped() {
    let mut game = Game::new("alice", "computer");
    game.submit_move(Colour::White, request("e2e4")).unwrap();

    let handle = game.request_engine_move(SearchConfig::new().with_depth(2)).unwrap();
    assert_eq!(handle.ticket(), game.revision());
    let stale = handle.wait().unwrap();

    game.undo().unwrap();
    game.submit_move(Colour::White, request("d2d4")).unwrap();
    assert_eq!(
        game.apply_engine_move(&stale),
        Err(GameError::StaleSearchResult {
            ticket: 1,
            revision: 3
        })
    );
    assert_eq!(game.side_to_move(), Colour::Black);

    let fresh = game
        .request_engine_move(SearchConfig::new().with_depth(2))
        .unwrap()
        .wait()
        .unwrap();
    let outcome = game.apply_engine_move(&fresh).unwrap();
    assert!(!outcome.game_over);
    assert_eq!(game.san_history().len(), 2);
    assert_eq!(game.side_to_move(), Colour::White);
}
