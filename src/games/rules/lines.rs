//! Winning-line enumeration.

use crate::games::board::{Coord, Dimensions};
use crate::games::types::Line;
use tracing::instrument;

/// Scan directions: horizontal, vertical, diagonal, anti-diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Lists every straight run of `run` cells on a board.
///
/// Order is fixed: all horizontal runs (start cells row-major), then
/// vertical, then diagonal, then anti-diagonal. Win detection reports the
/// first complete line in this order, which keeps results reproducible.
#[instrument]
pub fn winning_lines(dimensions: Dimensions, run: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    if run == 0 {
        return lines;
    }

    for (d_row, d_col) in DIRECTIONS {
        for row in 0..dimensions.rows() {
            for col in 0..dimensions.cols() {
                let start = Coord::new(row, col);
                let line: Option<Line> = (0..run as isize)
                    .map(|step| {
                        start
                            .offset(d_row * step, d_col * step)
                            .filter(|coord| dimensions.contains(*coord))
                    })
                    .collect();
                if let Some(line) = line {
                    lines.push(line);
                }
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_by_three_has_eight_lines_in_scan_order() {
        let lines = winning_lines(Dimensions::square(3), 3);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], vec![Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)]);
        assert_eq!(lines[3], vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]);
        assert_eq!(lines[6], vec![Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 2)]);
        assert_eq!(lines[7], vec![Coord::new(0, 2), Coord::new(1, 1), Coord::new(2, 0)]);
    }

    #[test]
    fn test_connect_four_line_count() {
        // 24 horizontal + 21 vertical + 12 + 12 diagonal
        let lines = winning_lines(Dimensions::new(6, 7), 4);
        assert_eq!(lines.len(), 69);
    }

    #[test]
    fn test_run_longer_than_board_has_no_lines() {
        assert!(winning_lines(Dimensions::square(3), 4).is_empty());
    }
}
