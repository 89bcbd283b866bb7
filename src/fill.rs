//! Top-level fill: establish node and arc consistency, then search.

use instant::{Duration, Instant};
use log::debug;
use thiserror::Error;

use crate::consistency::{
    enforce_arc_consistency_with_deadline, enforce_node_consistency, ArcConsistencyFailure,
};
use crate::domain::DomainStore;
use crate::grid::PuzzleStructure;
use crate::search::{backtrack, Assignment, Deadline};
use crate::word_list::WordList;
use crate::SlotId;

/// Settings for a fill.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Give up with `FillError::DeadlineExceeded` once this much time has passed. With no
    /// deadline, the search runs until it finds a fill or proves there isn't one.
    pub deadline: Option<Duration>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub node_eliminations: u64,
    pub arc_revisions: u64,
    pub arc_eliminations: u64,
    pub states: u64,
    pub backtracks: u64,
    pub duration: Duration,
}

/// The word chosen for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word: String,
}

/// A struct representing the results of a successful fill: one choice per slot, in slot order.
#[derive(Debug, Clone)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

impl FillSuccess {
    pub fn word_for(&self, slot_id: SlotId) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.slot_id == slot_id)
            .map(|choice| choice.word.as_str())
    }
}

/// Why a puzzle can't be filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoSolution {
    /// Constraint propagation left this slot without any options, so we never searched.
    ArcConsistency { slot_id: SlotId },

    /// The search tried every option without completing the grid.
    Exhausted,
}

/// The result of a fill that ran to completion. Not finding a fill is an ordinary outcome.
#[derive(Debug, Clone)]
pub enum FillOutcome {
    Filled(FillSuccess),
    NoSolution { reason: NoSolution, statistics: Statistics },
}

impl FillOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, FillOutcome::Filled(_))
    }

    pub fn statistics(&self) -> &Statistics {
        match self {
            FillOutcome::Filled(success) => &success.statistics,
            FillOutcome::NoSolution { statistics, .. } => statistics,
        }
    }

    /// The fill, if one was found.
    pub fn success(self) -> Option<FillSuccess> {
        match self {
            FillOutcome::Filled(success) => Some(success),
            FillOutcome::NoSolution { .. } => None,
        }
    }
}

/// A fill that was cut short. This is distinct from a puzzle having no fill.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillError {
    #[error("deadline exceeded after {elapsed:?}")]
    DeadlineExceeded { elapsed: Duration },
}

/// Search for a valid fill of the puzzle using the given words. Every slot starts with the whole
/// word list as its domain; node consistency and arc consistency prune those domains once, and the
/// search works from the pruned domains without ever restoring or re-propagating them.
pub fn find_fill(
    puzzle: &PuzzleStructure,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillOutcome, FillError> {
    let start = Instant::now();
    let deadline = options.deadline.map(|limit| Deadline::starting_at(start, limit));

    let mut statistics = Statistics::default();
    let mut domains = DomainStore::new(puzzle, word_list);
    debug!(
        "Filling {} slots from {} words",
        puzzle.slot_count(),
        word_list.len()
    );

    statistics.node_eliminations = enforce_node_consistency(puzzle, &mut domains) as u64;

    match enforce_arc_consistency_with_deadline(puzzle, &mut domains, None, deadline.as_ref())? {
        Ok(success) => {
            statistics.arc_revisions = success.revisions as u64;
            statistics.arc_eliminations = success.eliminations as u64;
        }
        Err(ArcConsistencyFailure { slot_id }) => {
            statistics.duration = start.elapsed();
            return Ok(FillOutcome::NoSolution {
                reason: NoSolution::ArcConsistency { slot_id },
                statistics,
            });
        }
    }

    let mut assignment = Assignment::new(puzzle.slot_count());
    let filled = backtrack(puzzle, &domains, &mut assignment, deadline.as_ref(), &mut statistics)?;
    statistics.duration = start.elapsed();

    debug!("{:?}", statistics);

    if !filled {
        return Ok(FillOutcome::NoSolution { reason: NoSolution::Exhausted, statistics });
    }

    let choices = assignment
        .iter()
        .map(|(slot_id, word_id)| Choice { slot_id, word: domains.word(word_id).string.clone() })
        .collect();

    Ok(FillOutcome::Filled(FillSuccess { statistics, choices }))
}

#[cfg(test)]
mod tests {
    use super::{find_fill, FillError, FillOptions, FillOutcome, NoSolution};
    use crate::grid::PuzzleStructure;
    use crate::word_list::WordList;
    use instant::Duration;

    #[test]
    fn test_find_fill_single_slot() {
        let puzzle = PuzzleStructure::from_template_str("___").unwrap();
        let word_list = WordList::from_words(["cat", "dog", "ab"]);

        let result = find_fill(&puzzle, &word_list, &FillOptions::default())
            .unwrap()
            .success()
            .expect("Failed to find a fill");

        assert_eq!(result.choices.len(), 1);
        let word = result.word_for(0).unwrap();
        assert!(word == "cat" || word == "dog", "unexpected word {}", word);
        assert_eq!(result.statistics.node_eliminations, 1);
    }

    #[test]
    fn test_find_fill_reports_arc_consistency_failure() {
        let puzzle = PuzzleStructure::from_template_str("___#\n_###\n_###\n_###").unwrap();
        let word_list = WordList::from_words(["CAT", "ZERO"]);

        match find_fill(&puzzle, &word_list, &FillOptions::default()).unwrap() {
            FillOutcome::NoSolution { reason, statistics } => {
                assert_eq!(reason, NoSolution::ArcConsistency { slot_id: 0 });
                assert_eq!(statistics.states, 0);
            }
            FillOutcome::Filled(success) => panic!("Found an impossible fill: {:?}", success),
        }
    }

    #[test]
    fn test_find_fill_reports_exhaustion() {
        let puzzle = PuzzleStructure::from_template_str("____\n_##_\n____").unwrap();
        let word_list = WordList::from_words(["AXXB", "BXXC", "CXXA", "AXB", "BXA", "CXC"]);

        let outcome = find_fill(&puzzle, &word_list, &FillOptions::default()).unwrap();
        assert!(!outcome.is_filled());
        assert!(matches!(outcome, FillOutcome::NoSolution { reason: NoSolution::Exhausted, .. }));
    }

    #[test]
    fn test_find_fill_deadline_is_not_no_solution() {
        let puzzle = PuzzleStructure::from_template_str("___").unwrap();
        let word_list = WordList::from_words(["cat"]);
        let options = FillOptions { deadline: Some(Duration::from_secs(0)) };

        let result = find_fill(&puzzle, &word_list, &options);
        assert!(matches!(result, Err(FillError::DeadlineExceeded { .. })));
    }

    #[test]
    fn test_find_fill_with_given_letters() {
        let puzzle = PuzzleStructure::from_template_str("Z__\n_##\n_##").unwrap();
        let word_list = WordList::parse_from_str("cat\nzoo\nzap\nzen\nape\nnap\nodd");

        let result = find_fill(&puzzle, &word_list, &FillOptions::default())
            .unwrap()
            .success()
            .expect("Failed to find a fill");

        let across = result.word_for(0).unwrap();
        let down = result.word_for(1).unwrap();
        assert!(across.starts_with('Z'));
        assert!(down.starts_with('Z'));
    }

    #[test]
    fn test_empty_grid_is_trivially_filled() {
        let puzzle = PuzzleStructure::from_template_str("#_#").unwrap();
        let outcome = find_fill(&puzzle, &WordList::default(), &FillOptions::default()).unwrap();

        assert!(outcome.is_filled());
        assert_eq!(outcome.statistics().states, 0);
    }

    #[test]
    fn test_find_fill_lowercase_given_letter_with_in_memory_words() {
        let puzzle = PuzzleStructure::from_template_str("c__").unwrap();
        let word_list = WordList::from_words(["cat", "dog"]);

        let result = find_fill(&puzzle, &word_list, &FillOptions::default())
            .unwrap()
            .success()
            .expect("Failed to find a fill");
        assert_eq!(result.word_for(0), Some("cat"));
    }

    #[test]
    fn test_find_fill_zero_deadline_on_empty_grid() {
        let puzzle = PuzzleStructure::from_template_str("#_#").unwrap();
        let options = FillOptions { deadline: Some(Duration::from_secs(0)) };

        let outcome = find_fill(&puzzle, &WordList::default(), &options).unwrap();
        assert!(outcome.is_filled());
    }

    #[test]
    fn test_find_fill_deadline_covers_arc_consistency() {
        let puzzle = PuzzleStructure::from_template_str("___\n##_\n___").unwrap();
        let word_list = WordList::from_words(["ABC", "CDE", "EFG"]);
        let options = FillOptions { deadline: Some(Duration::from_secs(0)) };

        let result = find_fill(&puzzle, &word_list, &options);
        assert!(matches!(result, Err(FillError::DeadlineExceeded { .. })));
    }
}
