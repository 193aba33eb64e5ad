//! Prelude exports the most commonly-used types and traits.

pub use crate::compat::text::{ReadText, ReadTextDims, WriteText, WriteTextDims};

pub use crate::embeddings::Embeddings;

pub use crate::error::{Error, Result};

pub use crate::fasttext::FastText;

pub use crate::glove::{GloVe, GloVeConfig};

pub use crate::progress::{ProgressBar, ProgressIterator};

pub use crate::storage::{NdArray, Storage, StorageView};

pub use crate::subword::NGramConfig;

pub use crate::vocab::{SimpleVocab, Vocab};
