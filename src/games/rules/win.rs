//! Win detection for line-forming games.

use crate::games::action::InvariantViolation;
use crate::games::board::{Board, Coord};
use crate::games::types::{Cell, Line, Mark, Win};
use tracing::error;

/// Finds the first line (in scan order) fully held by one mark.
///
/// Two complete lines for the same mark still make a single win. Complete
/// lines for both marks cannot arise from alternating play and are
/// reported as an [`InvariantViolation`].
pub fn check_winner(
    board: &Board<Cell>,
    lines: &[Line],
) -> Result<Option<Win>, InvariantViolation> {
    let mut found: Option<Win> = None;

    for line in lines {
        let Some(owner) = line_owner(board, line) else {
            continue;
        };
        match &found {
            None => found = Some(Win::new(owner, Some(line.clone()))),
            Some(win) if win.winner() != owner => {
                error!(first = %win.winner(), second = %owner, "Both marks hold a complete line");
                return Err(InvariantViolation::new(format!(
                    "both {} and {} have a complete line",
                    win.winner(),
                    owner
                )));
            }
            Some(_) => {}
        }
    }

    Ok(found)
}

fn line_owner(board: &Board<Cell>, line: &[Coord]) -> Option<Mark> {
    let (first, rest) = line.split_first()?;
    let owner = board.get(*first).ok()?.mark()?;
    rest.iter()
        .all(|coord| board.get(*coord) == Ok(Cell::Occupied(owner)))
        .then_some(owner)
}
