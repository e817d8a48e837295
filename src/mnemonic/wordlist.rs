//! Word list loading.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Size of the standard English word list.
pub const CANONICAL_WORDLIST_LEN: usize = 2048;

/// Errors from loading a word list.
#[derive(Debug, thiserror::Error)]
pub enum WordlistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Word list contains no words")]
    Empty,
}

/// An ordered, non-empty list of words.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    /// Loads a newline-delimited word list from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordlistError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses one word per line, trimming whitespace and skipping blank lines.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, WordlistError> {
        let mut words = Vec::with_capacity(CANONICAL_WORDLIST_LEN);
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if !word.is_empty() {
                words.push(word.to_string());
            }
        }

        Self::from_words(words)
    }

    /// Builds a word list from owned words.
    pub fn from_words(words: Vec<String>) -> Result<Self, WordlistError> {
        if words.is_empty() {
            return Err(WordlistError::Empty);
        }
        if words.len() != CANONICAL_WORDLIST_LEN {
            warn!(
                words = words.len(),
                expected = CANONICAL_WORDLIST_LEN,
                "word list size differs from the standard list"
            );
        }

        Ok(Self { words })
    }

    /// Returns the words in file order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Returns the number of words (never zero).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; an empty list cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
