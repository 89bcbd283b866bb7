//! Backtracking search over partial assignments, guided by the minimum-remaining-values and
//! degree heuristics for choosing a slot and the least-constraining-value heuristic for ordering
//! its options.

use instant::{Duration, Instant};
use log::trace;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::domain::DomainStore;
use crate::fill::{FillError, Statistics};
use crate::grid::PuzzleStructure;
use crate::{SlotId, WordId, MAX_SLOT_LENGTH};

/// A mapping from some subset of the slots to a chosen word. Stored as a fixed-size buffer indexed
/// by slot id so that trying and undoing choices never reallocates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    word_ids: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a puzzle with `slot_count` slots.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { word_ids: vec![None; slot_count], assigned_count: 0 }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids[slot_id]
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.word_ids[slot_id].is_some()
    }

    /// Assign a word to a slot, returning the word it replaced, if any.
    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.word_ids[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.word_ids[slot_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    /// Number of slots with a word.
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// The assigned `(slot, word)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.word_ids
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }
}

/// A wall-clock limit on the search. Running out is reported as `FillError::DeadlineExceeded`,
/// never as "no solution".
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(limit: Duration) -> Deadline {
        Deadline::starting_at(Instant::now(), limit)
    }

    pub fn starting_at(start: Instant, limit: Duration) -> Deadline {
        Deadline { start, limit }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn expired(&self) -> bool {
        self.elapsed() >= self.limit
    }

    pub(crate) fn check(&self) -> Result<(), FillError> {
        if self.expired() {
            Err(FillError::DeadlineExceeded { elapsed: self.elapsed() })
        } else {
            Ok(())
        }
    }
}

/// Does the assignment give a word to every slot in the puzzle?
pub fn is_complete(puzzle: &PuzzleStructure, assignment: &Assignment) -> bool {
    (0..puzzle.slot_count()).all(|slot_id| assignment.is_assigned(slot_id))
}

/// Check whether putting `word_id` in `slot_id` fits the slot and agrees with every crossing slot
/// that already has a word. Unassigned crossings don't constrain anything.
fn is_consistent_with(
    puzzle: &PuzzleStructure,
    domains: &DomainStore,
    assignment: &Assignment,
    slot_id: SlotId,
    word_id: WordId,
) -> bool {
    let variable = puzzle.variable(slot_id);
    let word = domains.word(word_id);

    if word.len() != variable.length {
        return false;
    }

    if !puzzle.fits_givens(slot_id, &word.glyphs) {
        return false;
    }

    puzzle.neighbors(slot_id).iter().all(|&neighbor| {
        let neighbor_word_id = match assignment.get(neighbor) {
            Some(neighbor_word_id) => neighbor_word_id,
            None => return true,
        };
        let (i, j) = match puzzle.overlap(slot_id, neighbor) {
            Some(overlap) => overlap,
            None => return true,
        };

        match (word.glyphs.get(i), domains.word(neighbor_word_id).glyphs.get(j)) {
            (Some(glyph), Some(neighbor_glyph)) => glyph == neighbor_glyph,
            _ => false,
        }
    })
}

/// Is every assigned word the right length (and consistent with any given letters), and does
/// every pair of assigned crossing slots agree on their shared cell?
pub fn is_consistent(
    puzzle: &PuzzleStructure,
    domains: &DomainStore,
    assignment: &Assignment,
) -> bool {
    assignment
        .iter()
        .all(|(slot_id, word_id)| is_consistent_with(puzzle, domains, assignment, slot_id, word_id))
}

/// Choose the unassigned slot with the fewest remaining options, breaking ties in favor of the slot
/// with the most crossings. Returns `None` once every slot is assigned.
pub fn select_unassigned_variable(
    puzzle: &PuzzleStructure,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| {
            (domains.option_count(slot_id), Reverse(puzzle.neighbors(slot_id).len()))
        })
}

/// Return the options for `slot_id` ordered by how many options they would rule out in unassigned
/// crossing slots, fewest first. Equal options keep their domain order.
pub fn order_domain_values(
    puzzle: &PuzzleStructure,
    domains: &DomainStore,
    slot_id: SlotId,
    assignment: &Assignment,
) -> Vec<WordId> {
    // For each unassigned crossing, count how many of its options place each glyph in the shared
    // cell. An option for this slot conflicts with every crossing option that doesn't share its
    // glyph.
    struct CrossingCounts {
        cell_idx: usize,
        total: usize,
        glyph_counts: HashMap<char, usize>,
    }

    let crossing_counts: SmallVec<[CrossingCounts; MAX_SLOT_LENGTH]> = puzzle
        .neighbors(slot_id)
        .iter()
        .filter(|&&neighbor| !assignment.is_assigned(neighbor))
        .filter_map(|&neighbor| {
            let (cell_idx, neighbor_cell_idx) = puzzle.overlap(slot_id, neighbor)?;
            let mut glyph_counts: HashMap<char, usize> = HashMap::new();
            for word_id in domains.options(neighbor) {
                if let Some(&glyph) = domains.word(word_id).glyphs.get(neighbor_cell_idx) {
                    *glyph_counts.entry(glyph).or_insert(0) += 1;
                }
            }
            Some(CrossingCounts { cell_idx, total: domains.option_count(neighbor), glyph_counts })
        })
        .collect();

    let mut values: Vec<WordId> = domains.options(slot_id).collect();

    values.sort_by_cached_key(|&word_id| {
        let word = domains.word(word_id);

        crossing_counts
            .iter()
            .map(|counts| {
                let compatible = word
                    .glyphs
                    .get(counts.cell_idx)
                    .and_then(|glyph| counts.glyph_counts.get(glyph))
                    .copied()
                    .unwrap_or(0);
                counts.total - compatible
            })
            .sum::<usize>()
    });

    values
}

/// One level of the search: a slot and the ordered options still to try for it.
struct Frame {
    slot_id: SlotId,
    values: Vec<WordId>,
    next_value_idx: usize,
}

/// Depth-first search with chronological backtracking, extending `assignment` until it is complete.
///
/// Returns `Ok(true)` with the complete assignment left in `assignment`, or `Ok(false)` once every
/// branch has been exhausted, in which case `assignment` is back to how it started. The search
/// keeps an explicit stack of frames rather than recursing, so its depth is only limited by the
/// number of slots.
pub fn backtrack(
    puzzle: &PuzzleStructure,
    domains: &DomainStore,
    assignment: &mut Assignment,
    deadline: Option<&Deadline>,
    statistics: &mut Statistics,
) -> Result<bool, FillError> {
    let mut frames: Vec<Frame> = Vec::with_capacity(puzzle.slot_count());

    'descend: loop {
        let slot_id = match select_unassigned_variable(puzzle, domains, assignment) {
            Some(slot_id) => slot_id,
            None => {
                debug_assert!(is_complete(puzzle, assignment));
                return Ok(true);
            }
        };

        if let Some(deadline) = deadline {
            deadline.check()?;
        }

        statistics.states += 1;
        frames.push(Frame {
            slot_id,
            values: order_domain_values(puzzle, domains, slot_id, assignment),
            next_value_idx: 0,
        });

        // Find the next option that fits for the innermost slot, backing out of slots whose
        // options have run out.
        while let Some(frame) = frames.last_mut() {
            if assignment.remove(frame.slot_id).is_some() {
                statistics.backtracks += 1;
            }

            while let Some(&word_id) = frame.values.get(frame.next_value_idx) {
                frame.next_value_idx += 1;

                if is_consistent_with(puzzle, domains, assignment, frame.slot_id, word_id) {
                    assignment.insert(frame.slot_id, word_id);
                    trace!(
                        "Trying {} in slot {} at depth {}",
                        domains.word(word_id).string,
                        frame.slot_id,
                        assignment.len()
                    );
                    continue 'descend;
                }
            }

            frames.pop();
        }

        return Ok(false);
    }
}
