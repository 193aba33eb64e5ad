//! Character n-grams of tokens.

use std::cmp;

/// Iterator over n-grams in a sequence.
///
/// N-grams provides an iterator over the n-grams in a sentence between a
/// minimum and maximum length.
///
/// **Warning:** no guarantee is provided with regard to the iteration
/// order. The iterator only guarantees that all n-grams are produced.
pub struct NGrams<'a, T>
where
    T: 'a,
{
    max_n: usize,
    min_n: usize,
    seq: &'a [T],
    ngram: &'a [T],
}

impl<'a, T> NGrams<'a, T> {
    /// Create a new n-ngram iterator.
    ///
    /// The iterator will create n-ngrams of length *[min_n, max_n]*
    pub fn new(seq: &'a [T], min_n: usize, max_n: usize) -> Self {
        assert!(min_n != 0, "The minimum n-gram length cannot be zero.");
        assert!(
            min_n <= max_n,
            "The maximum length should be equal to or greater than the minimum length."
        );

        let upper = cmp::min(max_n, seq.len());

        NGrams {
            min_n,
            max_n,
            seq,
            ngram: &seq[..upper],
        }
    }
}

impl<'a, T> Iterator for NGrams<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.ngram.len() < self.min_n {
            if self.seq.len() <= self.min_n {
                return None;
            }

            self.seq = &self.seq[1..];

            let upper = cmp::min(self.max_n, self.seq.len());
            self.ngram = &self.seq[..upper];
        }

        let ngram = self.ngram;

        self.ngram = &self.ngram[..self.ngram.len() - 1];

        Some(ngram)
    }
}

/// Range of character n-gram lengths used to build vectors of
/// unknown tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NGramConfig {
    pub min_n: usize,
    pub max_n: usize,
}

impl NGramConfig {
    pub fn new(min_n: usize, max_n: usize) -> Self {
        NGramConfig { min_n, max_n }
    }

    /// N-grams of length 2 to 8, used for GloVe embeddings.
    pub fn glove() -> Self {
        NGramConfig::new(2, 8)
    }

    /// N-grams of length 3 to 6, the fastText defaults.
    pub fn fasttext() -> Self {
        NGramConfig::new(3, 6)
    }

    /// Get the character n-grams of a token.
    ///
    /// Each occurrence of an n-gram is returned, so repeated n-grams
    /// are returned more than once.
    pub fn ngrams(&self, token: &str) -> Vec<String> {
        let chars: Vec<_> = token.chars().collect();
        NGrams::new(&chars, self.min_n, self.max_n)
            .map(|ngram| ngram.iter().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{NGramConfig, NGrams};

    #[test]
    fn ngrams_test() {
        let hello_chars: Vec<_> = "hellö world".chars().collect();
        let mut hello_check: Vec<&[char]> = vec![
            &['h'],
            &['h', 'e'],
            &['h', 'e', 'l'],
            &['e'],
            &['e', 'l'],
            &['e', 'l', 'l'],
            &['l'],
            &['l', 'l'],
            &['l', 'l', 'ö'],
            &['l'],
            &['l', 'ö'],
            &['l', 'ö', ' '],
            &['ö'],
            &['ö', ' '],
            &['ö', ' ', 'w'],
            &[' '],
            &[' ', 'w'],
            &[' ', 'w', 'o'],
            &['w'],
            &['w', 'o'],
            &['w', 'o', 'r'],
            &['o'],
            &['o', 'r'],
            &['o', 'r', 'l'],
            &['r'],
            &['r', 'l'],
            &['r', 'l', 'd'],
            &['l'],
            &['l', 'd'],
            &['d'],
        ];

        hello_check.sort();

        let mut hello_ngrams: Vec<_> = NGrams::new(&hello_chars, 1, 3).collect();
        hello_ngrams.sort();

        assert_eq!(hello_check, hello_ngrams);
    }

    #[test]
    fn empty_ngram_test() {
        let check: &[&[char]] = &[];
        assert_eq!(NGrams::<char>::new(&[], 1, 3).collect::<Vec<_>>(), check);
    }

    #[test]
    #[should_panic]
    fn incorrect_min_n_test() {
        NGrams::<char>::new(&[], 0, 3);
    }

    #[test]
    #[should_panic]
    fn incorrect_max_n_test() {
        NGrams::<char>::new(&[], 2, 1);
    }

    #[test]
    fn glove_ngrams_of_short_token() {
        let mut ngrams = NGramConfig::glove().ngrams("cat");
        ngrams.sort();
        assert_eq!(ngrams, vec!["at", "ca", "cat"]);
    }

    #[test]
    fn fasttext_ngrams_skip_short_lengths() {
        let mut ngrams = NGramConfig::fasttext().ngrams("kaas");
        ngrams.sort();
        assert_eq!(ngrams, vec!["aas", "kaa", "kaas"]);

        assert!(NGramConfig::fasttext().ngrams("ab").is_empty());
    }

    #[test]
    fn repeated_ngrams_are_kept() {
        let ngrams = NGramConfig::new(2, 2).ngrams("aaa");
        assert_eq!(ngrams, vec!["aa", "aa"]);
    }

    #[test]
    fn ngrams_respect_multibyte_chars() {
        let mut ngrams = NGramConfig::new(2, 2).ngrams("zeeën");
        ngrams.sort();
        assert_eq!(ngrams, vec!["ee", "eë", "ze", "ën"]);
    }
}
