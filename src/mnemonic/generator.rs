//! Endless random mnemonic stream.

use std::fmt;
use std::sync::Arc;

use rand::rngs::ThreadRng;
use rand::Rng;

use super::Wordlist;

/// Number of words in each generated phrase.
pub const MNEMONIC_WORDS: usize = 12;

/// A space-separated phrase of words. No checksum is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Returns the phrase.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the words of the phrase.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Samples words uniformly, with replacement, from a shared word list.
///
/// The iterator never ends. Each phrase is independent of the previous ones;
/// the thread-local RNG is seeded by the operating system.
pub struct MnemonicGenerator {
    wordlist: Arc<Wordlist>,
    rng: ThreadRng,
}

impl MnemonicGenerator {
    /// Creates a generator over `wordlist`.
    pub fn new(wordlist: Arc<Wordlist>) -> Self {
        Self {
            wordlist,
            rng: rand::thread_rng(),
        }
    }

    /// Generates a fresh phrase.
    pub fn next_mnemonic(&mut self) -> Mnemonic {
        let words = self.wordlist.words();
        let mut phrase = String::with_capacity(MNEMONIC_WORDS * 9);

        for i in 0..MNEMONIC_WORDS {
            if i > 0 {
                phrase.push(' ');
            }
            phrase.push_str(&words[self.rng.gen_range(0..words.len())]);
        }

        Mnemonic(phrase)
    }
}

impl Iterator for MnemonicGenerator {
    type Item = Mnemonic;

    fn next(&mut self) -> Option<Mnemonic> {
        Some(self.next_mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wordlist(words: &[&str]) -> Arc<Wordlist> {
        Arc::new(Wordlist::from_words(words.iter().map(|w| w.to_string()).collect()).unwrap())
    }

    #[test]
    fn test_twelve_words_from_list() {
        let list = ["alpha", "bravo", "charlie", "delta"];
        let mut generator = MnemonicGenerator::new(wordlist(&list));

        for mnemonic in generator.by_ref().take(50) {
            let words: Vec<&str> = mnemonic.words().collect();
            assert_eq!(words.len(), MNEMONIC_WORDS);
            assert!(words.iter().all(|w| list.contains(w)));
        }
    }

    #[test]
    fn test_single_word_list() {
        let mut generator = MnemonicGenerator::new(wordlist(&["only"]));
        let expected = vec!["only"; MNEMONIC_WORDS].join(" ");
        assert_eq!(generator.next_mnemonic().as_str(), expected);
    }

    #[test]
    fn test_sampling_varies() {
        let list: Vec<String> = (0..2048).map(|i| format!("w{}", i)).collect();
        let generator = MnemonicGenerator::new(Arc::new(Wordlist::from_words(list).unwrap()));

        let phrases: std::collections::HashSet<Mnemonic> = generator.take(20).collect();
        assert!(phrases.len() > 1);
    }
}
