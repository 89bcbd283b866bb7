//! The fixed geometry of a puzzle: which cells can hold letters, the word slots derived from runs
//! of those cells, and the crossings between slots.
//!
//! Everything here is computed once and never mutated afterwards.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use thiserror::Error;

use crate::{GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A word slot in the grid. Two variables are the same slot iff all four fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable { row, col, direction, length }
    }

    /// Generate the coords for each cell of this slot, in word order.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        })
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {} : {}", self.row, self.col, self.direction, self.length)
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blocked,
    Open,
    /// An open cell whose letter is already fixed by the template.
    Given(char),
}

impl Cell {
    pub fn is_fillable(&self) -> bool {
        !matches!(self, Cell::Blocked)
    }
}

/// Does `glyph` satisfy a cell whose letter is given as `given`? Template letters are stored
/// upper-case while word lists may keep their own case, so the comparison ignores case.
pub fn matches_given(given: char, glyph: char) -> bool {
    glyph == given || glyph.to_uppercase().eq(given.to_uppercase())
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// Problems with a grid description. These come from the loader; a `PuzzleStructure` that was
/// successfully built is always internally consistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("grid template has no rows")]
    EmptyTemplate,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("unrecognized cell {found:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, found: char },
}

/// The immutable geometry of a puzzle.
pub struct PuzzleStructure {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    variables: Vec<Variable>,

    /// Indexed by slot id, then by cell index within the slot.
    crossings: Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>>,

    /// Indexed by slot id; ascending and free of duplicates.
    neighbors: Vec<SmallVec<[SlotId; MAX_SLOT_LENGTH]>>,

    /// Indexed by slot id, then by cell index within the slot.
    givens: Vec<SmallVec<[Option<char>; MAX_SLOT_LENGTH]>>,
}

impl Debug for PuzzleStructure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleStructure")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("variables", &self.variables)
            .field("crossings", &self.crossings)
            .finish()
    }
}

impl PuzzleStructure {
    /// Build a structure from rows of cells. Every row must have the same length.
    pub fn from_cells(rows: Vec<Vec<Cell>>) -> Result<PuzzleStructure, PuzzleError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).ok_or(PuzzleError::EmptyTemplate)?;

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PuzzleError::RaggedRow { row: row_idx, expected: width, found: row.len() });
            }
        }

        let cells: Vec<Cell> = rows.into_iter().flatten().collect();
        let variables = find_variables(&cells, width, height);

        // Build a map from cell location to the slots passing through it, which we can then use
        // to calculate crossings.
        let mut slots_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
        for (slot_id, variable) in variables.iter().enumerate() {
            for (cell_idx, loc) in variable.cell_coords().enumerate() {
                slots_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let crossings: Vec<SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>> = variables
            .iter()
            .enumerate()
            .map(|(slot_id, variable)| {
                variable
                    .cell_coords()
                    .map(|loc| {
                        slots_by_loc[&loc]
                            .iter()
                            .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                            .map(|&(other_slot_id, other_slot_cell)| Crossing {
                                other_slot_id,
                                other_slot_cell,
                            })
                    })
                    .collect()
            })
            .collect();

        let neighbors = crossings
            .iter()
            .map(|slot_crossings| {
                let mut slot_neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> =
                    slot_crossings.iter().flatten().map(|crossing| crossing.other_slot_id).collect();
                slot_neighbors.sort_unstable();
                slot_neighbors.dedup();
                slot_neighbors
            })
            .collect();

        let givens = variables
            .iter()
            .map(|variable| {
                variable
                    .cell_coords()
                    .map(|(row, col)| match cells[row * width + col] {
                        Cell::Given(letter) => Some(letter),
                        _ => None,
                    })
                    .collect()
            })
            .collect();

        Ok(PuzzleStructure { width, height, cells, variables, crossings, neighbors, givens })
    }

    /// Parse a grid template, with `#` representing blocks, `_` or `.` representing empty cells,
    /// and letters representing themselves. Surrounding whitespace and blank lines are ignored.
    pub fn from_template_str(template: &str) -> Result<PuzzleStructure, PuzzleError> {
        let rows = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, c)| match c {
                        '#' => Ok(Cell::Blocked),
                        '_' | '.' => Ok(Cell::Open),
                        c if c.is_alphabetic() => {
                            Ok(Cell::Given(c.to_uppercase().next().unwrap_or(c)))
                        }
                        found => Err(PuzzleError::InvalidCell { row, col, found }),
                    })
                    .collect::<Result<Vec<Cell>, PuzzleError>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        PuzzleStructure::from_cells(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the cell at the given location, or `None` if it's outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.height && col < self.width {
            Some(self.cells[row * self.width + col])
        } else {
            None
        }
    }

    pub fn is_fillable(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).map(|cell| cell.is_fillable()).unwrap_or(false)
    }

    /// All word slots, in a fixed order: across slots row by row, then down slots row by row.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, slot_id: SlotId) -> &Variable {
        &self.variables[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.variables.len()
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Option<Crossing>] {
        &self.crossings[slot_id]
    }

    /// The letter fixed by the template at the given cell of a slot, if any.
    pub fn given_letter(&self, slot_id: SlotId, cell_idx: usize) -> Option<char> {
        self.givens[slot_id].get(cell_idx).copied().flatten()
    }

    /// The letters fixed by the template for each cell of a slot.
    pub fn givens(&self, slot_id: SlotId) -> &[Option<char>] {
        &self.givens[slot_id]
    }

    /// Does the word `glyphs` agree with every letter the template fixes in this slot?
    pub fn fits_givens(&self, slot_id: SlotId, glyphs: &[char]) -> bool {
        self.givens[slot_id]
            .iter()
            .zip(glyphs)
            .all(|(given, &glyph)| given.map(|given| matches_given(given, glyph)).unwrap_or(true))
    }

    /// If `x` and `y` share a cell, return `(i, j)` where cell `i` of `x` is cell `j` of `y`.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        if x == y {
            return None;
        }
        self.crossings[x].iter().enumerate().find_map(|(cell_idx, crossing)| match crossing {
            Some(crossing) if crossing.other_slot_id == y => Some((cell_idx, crossing.other_slot_cell)),
            _ => None,
        })
    }

    /// Every other slot that shares a cell with `slot_id`, ascending.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    /// Find the slot id of the given variable, if it belongs to this puzzle.
    pub fn slot_id(&self, variable: &Variable) -> Option<SlotId> {
        self.variables.iter().position(|candidate| candidate == variable)
    }
}

/// Collect every maximal run of two or more fillable cells, across runs first.
fn find_variables(cells: &[Cell], width: usize, height: usize) -> Vec<Variable> {
    let fillable = |row: usize, col: usize| cells[row * width + col].is_fillable();
    let mut variables = vec![];

    for row in 0..height {
        for col in 0..width {
            if fillable(row, col) && (col == 0 || !fillable(row, col - 1)) {
                let length = (col..width).take_while(|&c| fillable(row, c)).count();
                if length > 1 {
                    variables.push(Variable::new(row, col, Direction::Across, length));
                }
            }
        }
    }

    for row in 0..height {
        for col in 0..width {
            if fillable(row, col) && (row == 0 || !fillable(row - 1, col)) {
                let length = (row..height).take_while(|&r| fillable(r, col)).count();
                if length > 1 {
                    variables.push(Variable::new(row, col, Direction::Down, length));
                }
            }
        }
    }

    variables
}

#[cfg(test)]
mod tests {
    use super::{matches_given, Cell, Direction, PuzzleError, PuzzleStructure, Variable};

    #[test]
    fn test_variables_from_template() {
        let puzzle = PuzzleStructure::from_template_str(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        )
        .unwrap();

        assert_eq!(puzzle.width(), 5);
        assert_eq!(puzzle.height(), 5);
        assert_eq!(
            puzzle.variables(),
            &[
                Variable::new(0, 1, Direction::Across, 3),
                Variable::new(4, 1, Direction::Across, 4),
                Variable::new(0, 1, Direction::Down, 5),
                Variable::new(1, 4, Direction::Down, 4),
            ]
        );
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let puzzle = PuzzleStructure::from_template_str(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        )
        .unwrap();

        // 0: (0,1) across 3, 1: (4,1) across 4, 2: (0,1) down 5, 3: (1,4) down 4
        assert_eq!(puzzle.overlap(0, 2), Some((0, 0)));
        assert_eq!(puzzle.overlap(2, 0), Some((0, 0)));
        assert_eq!(puzzle.overlap(1, 2), Some((0, 4)));
        assert_eq!(puzzle.overlap(2, 1), Some((4, 0)));
        assert_eq!(puzzle.overlap(1, 3), Some((3, 3)));
        assert_eq!(puzzle.overlap(0, 3), None);
        assert_eq!(puzzle.overlap(0, 1), None);
        assert_eq!(puzzle.overlap(2, 2), None);

        for x in 0..puzzle.slot_count() {
            for y in 0..puzzle.slot_count() {
                assert_eq!(puzzle.overlap(x, y), puzzle.overlap(y, x).map(|(i, j)| (j, i)));
            }
        }
    }

    #[test]
    fn test_neighbors() {
        let puzzle = PuzzleStructure::from_template_str(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        )
        .unwrap();

        assert_eq!(puzzle.neighbors(0), &[2]);
        assert_eq!(puzzle.neighbors(1), &[2, 3]);
        assert_eq!(puzzle.neighbors(2), &[0, 1]);
        assert_eq!(puzzle.neighbors(3), &[1]);
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let puzzle = PuzzleStructure::from_template_str("_#_\n#_#\n_#_").unwrap();
        assert_eq!(puzzle.slot_count(), 0);
    }

    #[test]
    fn test_given_letters() {
        let puzzle = PuzzleStructure::from_template_str("c__\n_##\nz##").unwrap();

        assert_eq!(puzzle.cell(0, 0), Some(Cell::Given('C')));
        assert_eq!(puzzle.given_letter(0, 0), Some('C'));
        assert_eq!(puzzle.given_letter(0, 1), None);
        assert_eq!(puzzle.given_letter(1, 2), Some('Z'));
        assert!(puzzle.is_fillable(2, 0));
        assert!(!puzzle.is_fillable(2, 1));
        assert!(!puzzle.is_fillable(5, 5));

        assert_eq!(puzzle.givens(1), &[Some('C'), None, Some('Z')]);
        assert_eq!(puzzle.given_letter(1, 3), None);
    }

    #[test]
    fn test_fits_givens_ignores_case() {
        let puzzle = PuzzleStructure::from_template_str("c__\n_##\nz##").unwrap();

        assert!(puzzle.fits_givens(0, &['C', 'A', 'T']));
        assert!(puzzle.fits_givens(0, &['c', 'a', 't']));
        assert!(!puzzle.fits_givens(0, &['d', 'o', 'g']));
        assert!(puzzle.fits_givens(1, &['c', 'o', 'z']));
        assert!(!puzzle.fits_givens(1, &['c', 'o', 'w']));
        assert!(matches_given('Z', 'z'));
        assert!(!matches_given('Z', 's'));
    }

    #[test]
    fn test_slot_id_lookup() {
        let puzzle = PuzzleStructure::from_template_str("___\n_##\n_##").unwrap();

        assert_eq!(puzzle.slot_id(&Variable::new(0, 0, Direction::Down, 3)), Some(1));
        assert_eq!(puzzle.slot_id(&Variable::new(0, 0, Direction::Down, 2)), None);
        assert_eq!(puzzle.variable(0).to_string(), "(0, 0) across : 3");
    }

    #[test]
    fn test_malformed_templates() {
        assert_eq!(
            PuzzleStructure::from_template_str("\n  \n").unwrap_err(),
            PuzzleError::EmptyTemplate
        );
        assert_eq!(
            PuzzleStructure::from_template_str("___\n__").unwrap_err(),
            PuzzleError::RaggedRow { row: 1, expected: 3, found: 2 }
        );
        assert_eq!(
            PuzzleStructure::from_template_str("_?_").unwrap_err(),
            PuzzleError::InvalidCell { row: 0, col: 1, found: '?' }
        );
    }
}
