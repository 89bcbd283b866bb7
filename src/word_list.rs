//! Loading the word list that seeds every slot's domain.
//!
//! The list is sorted and de-duplicated on construction, so the order of each domain (and with it
//! the whole search) is the same from run to run.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WordListError {
    #[error("failed to read word list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A processed word list, sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    pub words: Vec<String>,
}

impl WordList {
    /// Build a word list from in-memory words. Words are trimmed but otherwise kept verbatim.
    pub fn from_words<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_string())
            .filter(|word| !word.is_empty())
            .collect();

        words.sort();
        words.dedup();

        WordList { words }
    }

    /// Parse a word file: one word per line, blank lines skipped. Words are upper-cased to match
    /// the given letters of a parsed template.
    pub fn parse_from_str(contents: &str) -> WordList {
        WordList::from_words(contents.lines().map(|line| line.trim().to_uppercase()))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|source| WordListError::Io { path: path.to_path_buf(), source })?;

        Ok(WordList::parse_from_str(&contents))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
