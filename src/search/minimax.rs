//! Exhaustive minimax.
//!
//! Only practical for small boards (tic-tac-toe has at most 9! lines of
//! play). Larger boards go through [`super::alpha_beta`].

use super::{SearchError, terminal_score};
use crate::games::{Board, BoardGame, Mark, Move};
use tracing::{debug, instrument};

/// Returns the move that maximizes `maximizing`'s result under optimal
/// replies, assuming it is `maximizing`'s turn.
///
/// # Errors
///
/// [`SearchError::TerminalBoard`] or [`SearchError::NoLegalMoves`] if
/// there is nothing to search.
#[instrument(skip(game, board), fields(kind = %game.kind()))]
pub fn best_move<G: BoardGame>(
    game: &G,
    board: &Board<G::Cell>,
    maximizing: Mark,
) -> Result<Move<G::Position>, SearchError> {
    let outcome = game.outcome(board)?;
    if outcome.is_terminal() {
        return Err(SearchError::TerminalBoard(outcome));
    }

    let mut best: Option<(i32, Move<G::Position>)> = None;
    for mv in game.legal_moves(board, maximizing) {
        let child = game.apply(board, &mv)?;
        let score = minimax(game, &child, maximizing.opponent(), maximizing)?;
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, mv));
        }
    }

    let (score, mv) = best.ok_or(SearchError::NoLegalMoves)?;
    debug!(score, position = %mv.position, "Minimax chose move");
    Ok(mv)
}

/// Value of `board` for `maximizing` with `to_move` about to play.
pub fn minimax<G: BoardGame>(
    game: &G,
    board: &Board<G::Cell>,
    to_move: Mark,
    maximizing: Mark,
) -> Result<i32, SearchError> {
    if let Some(score) = terminal_score(&game.outcome(board)?, maximizing) {
        return Ok(score);
    }

    let moves = game.legal_moves(board, to_move);
    let mut scores = Vec::with_capacity(moves.len());
    for mv in &moves {
        let child = game.apply(board, mv)?;
        scores.push(minimax(game, &child, to_move.opponent(), maximizing)?);
    }

    let value = if to_move == maximizing {
        scores.into_iter().max()
    } else {
        scores.into_iter().min()
    };
    value.ok_or(SearchError::NoLegalMoves)
}
