//! Per-slot candidate word sets.

use bit_set::BitSet;
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};

use crate::grid::PuzzleStructure;
use crate::word_list::WordList;
use crate::{SlotId, WordId, MAX_SLOT_LENGTH};

/// A word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn new(string: &str) -> Word {
        Word { string: string.to_string(), glyphs: string.chars().collect() }
    }

    /// Length in chars, which is what gets compared against slot lengths.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The remaining candidates for every slot. Words are stored once and each slot's domain is a set
/// of `WordId`s into that table, so iteration order is always ascending `WordId`.
///
/// Domains only ever shrink.
#[derive(Clone)]
pub struct DomainStore {
    words: Vec<Word>,
    domains: Vec<BitSet>,
}

impl Debug for DomainStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let option_counts: Vec<usize> = self.domains.iter().map(|domain| domain.len()).collect();
        f.debug_struct("DomainStore")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .field("option_counts", &option_counts)
            .finish()
    }
}

impl DomainStore {
    /// Seed every slot of the puzzle with the whole word list.
    pub fn new(puzzle: &PuzzleStructure, word_list: &WordList) -> DomainStore {
        let words: Vec<Word> = word_list.words.iter().map(|word| Word::new(word)).collect();
        let all_words: BitSet = (0..words.len()).collect();

        DomainStore { domains: vec![all_words; puzzle.slot_count()], words }
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Find the id of a word by its text.
    pub fn word_id(&self, string: &str) -> Option<WordId> {
        self.words.iter().position(|word| word.string == string)
    }

    pub fn slot_count(&self) -> usize {
        self.domains.len()
    }

    /// Remaining candidates for a slot, in ascending `WordId` order.
    pub fn options(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.domains[slot_id].iter()
    }

    pub fn option_count(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.domains[slot_id].is_empty()
    }

    /// The text of each remaining candidate for a slot.
    pub fn option_strings(&self, slot_id: SlotId) -> Vec<&str> {
        self.options(slot_id).map(|word_id| self.words[word_id].string.as_str()).collect()
    }

    /// Remove a word from a slot's domain, returning whether it was present.
    pub fn eliminate(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    /// Keep only the candidates for which `keep` returns true. Returns the number removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(&Word) -> bool,
    {
        let eliminated: Vec<WordId> =
            self.domains[slot_id].iter().filter(|&word_id| !keep(&self.words[word_id])).collect();

        for &word_id in &eliminated {
            self.domains[slot_id].remove(word_id);
        }

        eliminated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{DomainStore, Word};
    use crate::grid::PuzzleStructure;
    use crate::word_list::WordList;

    #[test]
    fn test_every_slot_starts_with_every_word() {
        let puzzle = PuzzleStructure::from_template_str("___\n_##\n_##").unwrap();
        let domains = DomainStore::new(&puzzle, &WordList::from_words(["cat", "ab", "dog"]));

        assert_eq!(domains.slot_count(), 2);
        assert_eq!(domains.option_strings(0), vec!["ab", "cat", "dog"]);
        assert_eq!(domains.option_strings(1), vec!["ab", "cat", "dog"]);
    }

    #[test]
    fn test_eliminate_and_retain() {
        let puzzle = PuzzleStructure::from_template_str("___\n_##\n_##").unwrap();
        let mut domains = DomainStore::new(&puzzle, &WordList::from_words(["cat", "ab", "dog"]));

        let cat = domains.word_id("cat").unwrap();
        assert!(domains.eliminate(0, cat));
        assert!(!domains.eliminate(0, cat));
        assert!(!domains.contains(0, cat));
        assert!(domains.contains(1, cat));

        assert_eq!(domains.retain(1, |word| word.len() == 2), 2);
        assert_eq!(domains.option_strings(1), vec!["ab"]);
        assert_eq!(domains.option_count(0), 2);

        domains.retain(1, |_| false);
        assert!(domains.is_empty(1));
    }

    #[test]
    fn test_word_length_counts_chars() {
        assert_eq!(Word::new("café").len(), 4);
    }
}
