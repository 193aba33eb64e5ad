//! Embedding vocabularies

use fnv::FnvHashMap;

/// Embedding vocabularies.
#[allow(clippy::len_without_is_empty)]
pub trait Vocab {
    /// Get the index of a token.
    fn idx(&self, word: &str) -> Option<usize>;

    /// Get the number of words in the vocabulary.
    fn words_len(&self) -> usize;

    /// Get the words in the vocabulary.
    fn words(&self) -> &[String];

    /// Check whether the vocabulary contains a token.
    fn contains(&self, word: &str) -> bool {
        self.idx(word).is_some()
    }
}

/// Vocabulary of tokens in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleVocab {
    indices: FnvHashMap<String, usize>,
    words: Vec<String>,
}

impl SimpleVocab {
    /// Construct a new simple vocabulary.
    ///
    /// Words are assigned indices in the given order.
    ///
    /// Panics when there are duplicate words.
    pub fn new(words: impl Into<Vec<String>>) -> Self {
        let words = words.into();
        let indices = create_indices(&words);
        assert_eq!(
            words.len(),
            indices.len(),
            "words contained duplicate entries."
        );
        SimpleVocab { words, indices }
    }

    /// Construct an empty vocabulary with room for `capacity` words.
    pub fn with_capacity(capacity: usize) -> Self {
        SimpleVocab {
            indices: FnvHashMap::with_capacity_and_hasher(capacity, Default::default()),
            words: Vec::with_capacity(capacity),
        }
    }

    /// Add a word to the vocabulary.
    ///
    /// Returns the index of the word and whether the word was newly
    /// added. A word that is already present keeps its index.
    pub fn insert(&mut self, word: impl Into<String>) -> (usize, bool) {
        let word = word.into();
        if let Some(&idx) = self.indices.get(&word) {
            return (idx, false);
        }

        let idx = self.words.len();
        self.indices.insert(word.clone(), idx);
        self.words.push(word);
        (idx, true)
    }
}

impl Vocab for SimpleVocab {
    fn idx(&self, word: &str) -> Option<usize> {
        self.indices.get(word).cloned()
    }

    fn words_len(&self) -> usize {
        self.words.len()
    }

    fn words(&self) -> &[String] {
        &self.words
    }
}

fn create_indices(words: &[String]) -> FnvHashMap<String, usize> {
    let mut indices = FnvHashMap::with_capacity_and_hasher(words.len(), Default::default());
    for (idx, word) in words.iter().enumerate() {
        indices.insert(word.clone(), idx);
    }
    indices
}
