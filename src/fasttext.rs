//! fastText embeddings in the `.vec` text format.
//!
//! The first line of a `.vec` file holds the vocabulary size and the
//! dimensionality, every following line a word and its components.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array1;
use tracing::info;

use crate::compat::text::{read_text_dims_with, WriteTextDims};
use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::progress::ProgressBar;
use crate::storage::NdArray;
use crate::subword::NGramConfig;
use crate::util::create_parent_dir;
use crate::vocab::SimpleVocab;

/// fastText word embeddings.
#[derive(Clone, Debug)]
pub struct FastText {
    embeddings: Embeddings<SimpleVocab, NdArray>,
    vocab_size: usize,
    ngrams: NGramConfig,
}

impl FastText {
    /// Load embeddings from a `.vec` file.
    ///
    /// Loading progress is shown on standard error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "vec") {
            return Err(Error::Format(format!(
                "Expected a fastText .vec file, got: '{}'",
                path.display()
            )));
        }

        info!("Loading fastText vectors from {}", path.display());
        let f = File::open(path).map_err(|e| {
            Error::io_error(format!("Cannot open embeddings '{}'", path.display()), e)
        })?;
        let mut reader = BufReader::new(f);

        let (embeddings, vocab_size) = read_text_dims_with(&mut reader, true, |n_words| {
            let mut bar = ProgressBar::stderr(n_words, "Loading fastText vectors");
            move |done| bar.update(done)
        })?;

        Ok(FastText {
            embeddings,
            vocab_size,
            ngrams: NGramConfig::fasttext(),
        })
    }

    /// Wrap existing embeddings.
    pub fn from_embeddings(embeddings: Embeddings<SimpleVocab, NdArray>) -> Self {
        FastText {
            vocab_size: embeddings.len(),
            embeddings,
            ngrams: NGramConfig::fasttext(),
        }
    }

    /// Use other n-gram lengths for unknown words.
    pub fn with_ngrams(mut self, ngrams: NGramConfig) -> Self {
        self.ngrams = ngrams;
        self
    }

    /// Embedding dimensionality.
    pub fn dims(&self) -> usize {
        self.embeddings.dims()
    }

    /// Vocabulary size, as stated in the file header.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn ngrams(&self) -> NGramConfig {
        self.ngrams
    }

    pub fn embeddings(&self) -> &Embeddings<SimpleVocab, NdArray> {
        &self.embeddings
    }

    pub fn into_embeddings(self) -> Embeddings<SimpleVocab, NdArray> {
        self.embeddings
    }

    /// Get the vector of a token.
    ///
    /// The vector of an unknown token is the average of the vectors of
    /// its character 3- to 6-grams, l2-normalized first with `norm`.
    pub fn get_vector(&self, token: &str, norm: bool) -> Array1<f32> {
        self.embeddings.embedding_or_ngrams(token, self.ngrams, norm)
    }

    /// Get the tokens without a vector, in input order.
    pub fn oov_tokens<I, T>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.embeddings.oov_tokens(tokens)
    }

    /// Write the vectors in `.vec` format.
    pub fn save_vectors(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Saving fastText vectors to {}", path.display());

        create_parent_dir(path)?;
        let f = File::create(path).map_err(|e| {
            Error::io_error(format!("Cannot create embeddings '{}'", path.display()), e)
        })?;
        let mut writer = BufWriter::new(f);
        self.embeddings.write_text_dims(&mut writer)?;
        writer
            .flush()
            .map_err(|e| Error::io_error("Cannot write embeddings", e))
    }
}
