//! Constraint propagation: node consistency (each slot's own length and given letters) and an
//! implementation of the AC-3 algorithm over the crossings between slots.
//!
//! For our purposes, a grid is arc-consistent when, for every pair of crossing slots, each option
//! for one slot has at least one option in the other that places the same letter in the shared
//! cell. For example, if 1D doesn't have any options starting with the letter A, we want to remove
//! any options for 1A that start with the letter A.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};
use std::convert::Infallible;

use crate::domain::DomainStore;
use crate::fill::FillError;
use crate::grid::PuzzleStructure;
use crate::search::Deadline;
use crate::{SlotId, WordId};

/// Remove every option whose length differs from its slot's length or that disagrees with a letter
/// given in the template. Returns the number of options eliminated; running it again is a no-op.
pub fn enforce_node_consistency(puzzle: &PuzzleStructure, domains: &mut DomainStore) -> usize {
    let mut eliminated = 0;

    for (slot_id, variable) in puzzle.variables().iter().enumerate() {
        eliminated += domains.retain(slot_id, |word| {
            word.len() == variable.length && puzzle.fits_givens(slot_id, &word.glyphs)
        });
    }

    debug!("Node consistency eliminated {} options", eliminated);
    eliminated
}

/// Make slot `x` arc-consistent with slot `y`, removing each option for `x` that has no partner
/// in `y`'s domain at their shared cell. Returns true if anything was removed. Slots that don't
/// cross are left alone.
pub fn revise(puzzle: &PuzzleStructure, domains: &mut DomainStore, x: SlotId, y: SlotId) -> bool {
    let (x_cell, y_cell) = match puzzle.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };

    // Which letters can `y` still place in the shared cell? Any option for `x` that puts a
    // different letter there is unsupported.
    let supported_glyphs: HashSet<char> = domains
        .options(y)
        .filter_map(|word_id| domains.word(word_id).glyphs.get(y_cell).copied())
        .collect();

    let unsupported: Vec<WordId> = domains
        .options(x)
        .filter(|&word_id| {
            domains
                .word(word_id)
                .glyphs
                .get(x_cell)
                .map(|glyph| !supported_glyphs.contains(glyph))
                .unwrap_or(true)
        })
        .collect();

    for &word_id in &unsupported {
        domains.eliminate(x, word_id);
    }

    !unsupported.is_empty()
}

/// Work queue of arcs `(x, y)` still to be revised. An arc is only ever waiting in the queue once.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<(SlotId, SlotId)>,
    queued: HashSet<(SlotId, SlotId)>,
}

impl ArcQueue {
    fn with_initial_queue<Arcs>(arcs: Arcs) -> ArcQueue
    where
        Arcs: IntoIterator<Item = (SlotId, SlotId)>,
    {
        let mut queue = ArcQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for (x, y) in arcs {
            queue.enqueue(x, y);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<(SlotId, SlotId)> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, x: SlotId, y: SlotId) {
        if self.queued.insert((x, y)) {
            self.queue.push_back((x, y));
        }
    }
}

/// Results from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// Number of `revise` calls that removed something.
    pub revisions: usize,
    pub eliminations: usize,
}

/// Returned when propagation leaves some slot without any options, meaning the puzzle has no
/// solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make every slot arc-consistent with its crossings. If `arcs` is `None`, start from every
/// ordered pair of crossing slots; otherwise start from the given arcs only.
///
/// Whenever revising `(x, y)` shrinks `x`, each other crossing `z` of `x` has to be checked
/// against `x` again, so `(z, x)` goes back on the queue.
pub fn enforce_arc_consistency(
    puzzle: &PuzzleStructure,
    domains: &mut DomainStore,
    arcs: Option<&[(SlotId, SlotId)]>,
) -> ArcConsistencyResult {
    match propagate(puzzle, domains, arcs, || Ok::<(), Infallible>(())) {
        Ok(result) => result,
        Err(never) => match never {},
    }
}

/// Like `enforce_arc_consistency`, but give up with `FillError::DeadlineExceeded` if the deadline
/// passes before the queue drains. The domains are left partly pruned in that case.
pub fn enforce_arc_consistency_with_deadline(
    puzzle: &PuzzleStructure,
    domains: &mut DomainStore,
    arcs: Option<&[(SlotId, SlotId)]>,
    deadline: Option<&Deadline>,
) -> Result<ArcConsistencyResult, FillError> {
    propagate(puzzle, domains, arcs, || match deadline {
        Some(deadline) => deadline.check(),
        None => Ok(()),
    })
}

/// The AC-3 loop. `checkpoint` runs before each arc is revised and can abort the whole pass.
fn propagate<E, F>(
    puzzle: &PuzzleStructure,
    domains: &mut DomainStore,
    arcs: Option<&[(SlotId, SlotId)]>,
    mut checkpoint: F,
) -> Result<ArcConsistencyResult, E>
where
    F: FnMut() -> Result<(), E>,
{
    if let Some(slot_id) = (0..puzzle.slot_count()).find(|&slot_id| domains.is_empty(slot_id)) {
        debug!("Slot {} has no options before arc consistency", slot_id);
        return Ok(Err(ArcConsistencyFailure { slot_id }));
    }

    let mut queue = match arcs {
        Some(arcs) => ArcQueue::with_initial_queue(arcs.iter().copied()),
        None => ArcQueue::with_initial_queue((0..puzzle.slot_count()).flat_map(|x| {
            puzzle.neighbors(x).iter().map(move |&y| (x, y))
        })),
    };

    let mut success = ArcConsistencySuccess { revisions: 0, eliminations: 0 };

    while let Some((x, y)) = queue.pop_front() {
        checkpoint()?;

        let option_count = domains.option_count(x);
        if !revise(puzzle, domains, x, y) {
            continue;
        }

        success.revisions += 1;
        success.eliminations += option_count - domains.option_count(x);
        trace!(
            "Revised slot {} against slot {}: {} -> {} options",
            x,
            y,
            option_count,
            domains.option_count(x)
        );

        if domains.is_empty(x) {
            debug!("Arc consistency emptied slot {} ({})", x, puzzle.variable(x));
            return Ok(Err(ArcConsistencyFailure { slot_id: x }));
        }

        for &z in puzzle.neighbors(x) {
            if z != y {
                queue.enqueue(z, x);
            }
        }
    }

    debug!(
        "Arc consistency made {} revisions eliminating {} options",
        success.revisions, success.eliminations
    );
    Ok(Ok(success))
}
