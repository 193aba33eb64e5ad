//! Word embeddings.

use std::collections::HashSet;
use std::iter::Enumerate;
use std::slice;

use ndarray::{Array1, ArrayView1};

use crate::error::Result;
use crate::storage::{NdArray, Storage, StorageMut};
use crate::subword::NGramConfig;
use crate::util::l2_norm;
use crate::vocab::{SimpleVocab, Vocab};

/// Word embeddings.
///
/// This data structure stores word embeddings (also known as *word vectors*)
/// together with their vocabulary, and provides lookups, out-of-vocabulary
/// queries and n-gram based vectors for unknown words.
#[derive(Clone, Debug)]
pub struct Embeddings<V, S> {
    storage: S,
    vocab: V,
}

impl<V, S> Embeddings<V, S>
where
    V: Vocab,
    S: Storage,
{
    /// Construct embeddings from a vocabulary and storage.
    ///
    /// Panics when the vocabulary and storage lengths differ.
    pub fn new(vocab: V, storage: S) -> Self {
        assert_eq!(
            vocab.words_len(),
            storage.shape().0,
            "Vocab and storage have different lengths."
        );

        Embeddings { vocab, storage }
    }

    /// Decompose embeddings in their vocabulary and storage.
    pub fn into_parts(self) -> (V, S) {
        (self.vocab, self.storage)
    }

    /// Return the length (in vector components) of the word embeddings.
    pub fn dims(&self) -> usize {
        self.storage.dims()
    }

    /// Get the number of words in the embeddings.
    pub fn len(&self) -> usize {
        self.vocab.words_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn vocab(&self) -> &V {
        &self.vocab
    }

    /// Check whether there is an embedding for a word.
    pub fn contains(&self, word: &str) -> bool {
        self.vocab.contains(word)
    }

    /// Get the embedding of a word.
    pub fn embedding(&self, word: &str) -> Option<ArrayView1<f32>> {
        self.vocab.idx(word).map(|idx| self.storage.embedding(idx))
    }

    /// Get the embedding of a word, computing it from character n-grams
    /// if the word is unknown.
    ///
    /// See `ngram_embedding` for how unknown words are handled.
    pub fn embedding_or_ngrams(
        &self,
        word: &str,
        ngrams: NGramConfig,
        normalize: bool,
    ) -> Array1<f32> {
        match self.embedding(word) {
            Some(embedding) => embedding.to_owned(),
            None => self.ngram_embedding(word, ngrams, normalize),
        }
    }

    /// Compute an embedding as the average of the embeddings of the
    /// character n-grams of `word` that are in the vocabulary.
    ///
    /// If `normalize` is `true`, each n-gram embedding is divided by its
    /// l2 norm before it is added. A word without known n-grams gets the
    /// zero vector.
    pub fn ngram_embedding(&self, word: &str, ngrams: NGramConfig, normalize: bool) -> Array1<f32> {
        let mut embed = Array1::zeros(self.dims());
        let mut n_found = 0usize;

        for ngram in ngrams.ngrams(word) {
            if let Some(ngram_embed) = self.embedding(&ngram) {
                n_found += 1;

                let norm = if normalize { l2_norm(ngram_embed) } else { 1. };
                if norm != 0. {
                    embed.scaled_add(1. / norm, &ngram_embed);
                }
            }
        }

        embed /= n_found.max(1) as f32;

        embed
    }

    /// Get the tokens that are not in the vocabulary.
    ///
    /// Tokens are returned in input order, duplicates
    /// included.
    pub fn oov_tokens<I, T>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        tokens
            .into_iter()
            .filter(|token| !self.contains(token.as_ref()))
            .map(|token| token.as_ref().to_owned())
            .collect()
    }

    /// Get the set of tokens that are not in the vocabulary.
    pub fn oov_token_set<I, T>(&self, tokens: I) -> HashSet<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.oov_tokens(tokens).into_iter().collect()
    }

    /// Get an iterator over pairs of words and the corresponding embeddings.
    pub fn iter(&self) -> Iter<S> {
        Iter {
            storage: &self.storage,
            inner: self.vocab.words().iter().enumerate(),
        }
    }
}

impl Embeddings<SimpleVocab, NdArray> {
    /// Construct empty embeddings with the given dimensionality.
    pub fn empty(dims: usize) -> Self {
        Embeddings::new(SimpleVocab::default(), NdArray::empty(dims))
    }

    /// Construct embeddings from word/embedding pairs.
    ///
    /// When a word occurs more than once, its last embedding is used.
    pub fn from_pairs<I, W, A>(dims: usize, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (W, A)>,
        W: Into<String>,
        A: Into<Array1<f32>>,
    {
        let mut embeddings = Self::empty(dims);
        embeddings.merge(pairs)?;
        Ok(embeddings)
    }

    /// Add an embedding, replacing the embedding of the word if it is
    /// already present.
    pub fn insert(&mut self, word: impl Into<String>, embedding: ArrayView1<f32>) -> Result<()> {
        let word = word.into();
        match self.vocab.idx(&word) {
            Some(idx) => self.storage.assign(idx, embedding),
            None => {
                self.storage.push(embedding)?;
                self.vocab.insert(word);
                Ok(())
            }
        }
    }

    /// Add or replace embeddings.
    ///
    /// Entries are applied in order, so the last embedding of a word
    /// wins. Merging stops at the first embedding with a mismatching
    /// dimensionality.
    pub fn merge<I, W, A>(&mut self, embeddings: I) -> Result<()>
    where
        I: IntoIterator<Item = (W, A)>,
        W: Into<String>,
        A: Into<Array1<f32>>,
    {
        for (word, embedding) in embeddings {
            let embedding = embedding.into();
            self.insert(word, embedding.view())?;
        }

        Ok(())
    }
}

impl<'a, V, S> IntoIterator for &'a Embeddings<V, S>
where
    V: Vocab,
    S: Storage,
{
    type Item = (&'a str, ArrayView1<'a, f32>);
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over embeddings.
pub struct Iter<'a, S> {
    storage: &'a S,
    inner: Enumerate<slice::Iter<'a, String>>,
}

impl<'a, S> Iterator for Iter<'a, S>
where
    S: Storage,
{
    type Item = (&'a str, ArrayView1<'a, f32>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(idx, word)| (word.as_str(), self.storage.embedding(idx)))
    }
}
