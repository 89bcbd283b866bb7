//! Plain-text rendering of a grid and its fill.

use crate::fill::Choice;
use crate::grid::{Cell, PuzzleStructure};

/// Character drawn for blocked cells.
pub const BLOCK: char = '█';

/// Turn the given puzzle and fill choices into a rendered string, one line per row. Open cells
/// that no choice covers show their given letter, or a space. Choices for slots the puzzle doesn't
/// have are skipped.
pub fn render_grid(puzzle: &PuzzleStructure, choices: &[Choice]) -> String {
    let mut grid: Vec<Vec<char>> = (0..puzzle.height())
        .map(|row| {
            (0..puzzle.width())
                .map(|col| match puzzle.cell(row, col) {
                    Some(Cell::Given(letter)) => letter,
                    Some(Cell::Open) => ' ',
                    _ => BLOCK,
                })
                .collect()
        })
        .collect();

    for choice in choices {
        let variable = match puzzle.variables().get(choice.slot_id) {
            Some(variable) => variable,
            None => continue,
        };
        for ((row, col), letter) in variable.cell_coords().zip(choice.word.chars()) {
            grid[row][col] = letter;
        }
    }

    grid.into_iter()
        .map(|line| line.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::render_grid;
    use crate::fill::Choice;
    use crate::grid::PuzzleStructure;

    #[test]
    fn test_render_grid() {
        let puzzle = PuzzleStructure::from_template_str("___\n##_\n___").unwrap();
        let choices = vec![
            Choice { slot_id: 0, word: "ABC".to_string() },
            Choice { slot_id: 2, word: "CDE".to_string() },
        ];

        assert_eq!(render_grid(&puzzle, &choices), "ABC\n██D\n  E");
    }

    #[test]
    fn test_render_partial_grid_shows_given_letters() {
        let puzzle = PuzzleStructure::from_template_str("q__\n_#_").unwrap();
        assert_eq!(render_grid(&puzzle, &[]), "Q  \n █ ");
    }

    #[test]
    fn test_render_skips_unknown_slots() {
        let puzzle = PuzzleStructure::from_template_str("__").unwrap();
        let choices = vec![
            Choice { slot_id: 0, word: "OK".to_string() },
            Choice { slot_id: 7, word: "NO".to_string() },
        ];

        assert_eq!(render_grid(&puzzle, &choices), "OK");
    }
}
