//! A library for reading, writing, and using word embeddings.
//!
//! embedding-utils reads and writes GloVe and fastText embeddings,
//! computes vectors for unknown words from character n-grams, and
//! bundles the helpers that are needed around embeddings: JSON, CSV,
//! TSV, and binary files, a console progress bar, configuration
//! lookup, and text preprocessing.

pub mod compat;

pub mod config;

pub mod embeddings;

pub mod error;

pub mod fasttext;

pub mod files;

pub mod glove;

pub mod prelude;

pub mod preprocess;

pub mod progress;

pub mod storage;

pub mod subword;

pub(crate) mod util;

pub mod vocab;
