//! Property checks over random legal playouts.

use arcade_engine::{Board, BoardGame, Cell, ConnectFour, Coord, Mark, TicTacToe};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const GAMES: u64 = 60;

/// Plays random legal moves, checking invariants at every step.
/// Returns the number of moves played.
fn random_playout<G>(game: &G, board: Board<Cell>, rng: &mut StdRng) -> usize
where
    G: BoardGame<Cell = Cell>,
{
    let mut board = board;
    let mut to_move = Mark::X;
    let mut moves = 0;

    loop {
        let win = game.detect_win(&board).expect("Alternating play never makes two winners");
        assert_eq!(game.detect_win(&board).expect("Consistent"), win, "detect_win is idempotent");

        let draw = game.detect_draw(&board).expect("Consistent");
        let outcome = game.outcome(&board).expect("Consistent");
        // Exactly one of win / draw / in progress.
        let states = [win.is_terminal(), draw, !outcome.is_terminal()];
        assert_eq!(states.iter().filter(|s| **s).count(), 1, "board {}", board);

        if outcome.is_terminal() {
            return moves;
        }

        let legal = game.legal_moves(&board, to_move);
        assert!(!legal.is_empty());
        for mv in &legal {
            assert!(game.is_legal(&board, mv));
        }

        let mv = *legal.choose(rng).expect("Non-empty");
        board = game.apply(&board, &mv).expect("Generated moves are legal");
        to_move = to_move.opponent();
        moves += 1;
    }
}

#[test]
fn test_tic_tac_toe_playouts_terminate_consistently() {
    let game = TicTacToe::new();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..GAMES {
        let moves = random_playout(&game, game.empty_board(), &mut rng);
        assert!(moves <= game.dimensions().cell_count());
    }
}

#[test]
fn test_connect_four_playouts_terminate_consistently() {
    let game = ConnectFour::new();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..GAMES {
        let moves = random_playout(&game, game.empty_board(), &mut rng);
        assert!(moves <= game.dimensions().cell_count());
    }
}

#[test]
fn test_legal_moves_never_target_occupied_cells() {
    let game = TicTacToe::new();
    let mut rng = StdRng::seed_from_u64(3);
    let mut board = game.empty_board();
    let mut to_move = Mark::X;

    while !game.outcome(&board).expect("Consistent").is_terminal() {
        let legal = game.legal_moves(&board, to_move);
        for mv in &legal {
            assert_eq!(board.get(mv.position).expect("In bounds"), Cell::Empty);
        }
        let mv = *legal.choose(&mut rng).expect("Non-empty");
        board = game.apply(&board, &mv).expect("Legal");
        to_move = to_move.opponent();
    }
}

#[test]
fn test_applied_position_is_no_longer_legal() {
    let game = TicTacToe::new();
    let board = game.empty_board();
    for (coord, _) in board.iter() {
        let mv = arcade_engine::Move::new(Mark::X, coord);
        let next = game.apply(&board, &mv).expect("Empty board accepts any cell");
        assert!(!game.is_legal(&next, &arcade_engine::Move::new(Mark::O, coord)));
        assert!(!game.legal_moves(&next, Mark::O).iter().any(|m| m.position == coord));
    }
}

#[test]
fn test_connect_four_diagonal_detected_before_full() {
    let game = ConnectFour::new();
    let mut board = game.empty_board();
    // Rising diagonal from the bottom-left corner, with O filler underneath.
    let drops: [(usize, Mark); 10] = [
        (0, Mark::X),
        (1, Mark::O),
        (1, Mark::X),
        (2, Mark::O),
        (2, Mark::O),
        (2, Mark::X),
        (3, Mark::O),
        (3, Mark::O),
        (3, Mark::O),
        (3, Mark::X),
    ];
    for (column, mark) in drops {
        board = game
            .apply(&board, &arcade_engine::Move::new(mark, column))
            .expect("Column has room");
    }

    let outcome = game.detect_win(&board).expect("Consistent");
    assert_eq!(outcome.winner(), Some(Mark::X));
    assert_eq!(
        outcome.winning_line(),
        Some(
            &[
                Coord::new(2, 3),
                Coord::new(3, 2),
                Coord::new(4, 1),
                Coord::new(5, 0),
            ][..]
        )
    );
    assert!(!game.legal_moves(&board, Mark::O).is_empty());
}
