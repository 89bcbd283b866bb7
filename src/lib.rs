//! Fill a crossword grid from a word list by treating it as a constraint-satisfaction problem.
//!
//! Each word slot is a variable whose domain starts out as the whole word list. We prune the
//! domains with node consistency (slot length and any letters given in the grid) and the AC-3
//! arc-consistency algorithm, then run a depth-first backtracking search that picks slots by
//! minimum remaining values and degree and tries their options in least-constraining order.
//!
//! Grid parsing, word-list loading and rendering live in their own modules; the solver itself
//! (`consistency`, `search` and `fill`) never touches files or output.

pub mod consistency;
pub mod domain;
pub mod fill;
pub mod grid;
pub mod log;
pub mod render;
pub mod search;
pub mod word_list;

pub use fill::{
    find_fill, Choice, FillError, FillOptions, FillOutcome, FillSuccess, NoSolution, Statistics,
};
pub use grid::{Cell, Direction, PuzzleError, PuzzleStructure, Variable};
pub use render::render_grid;
pub use word_list::{WordList, WordListError};

/// The expected maximum length for a single slot; longer slots still work but spill to the heap.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in `PuzzleStructure::variables`.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `DomainStore`'s word table.
pub type WordId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);
