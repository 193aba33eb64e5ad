//! GloVe embeddings.
//!
//! GloVe embeddings are stored as text without a header, so the
//! dimensionality has to be known up front. `GloVeConfig` holds the
//! dimensionality and the vocabulary size of the corpus. Fields that
//! are not set are inferred from the naming convention of the
//! pretrained GloVe files, e.g. `glove.6B.300d.txt`.
//!
//! ```
//! use embedding_utils::glove::{GloVe, GloVeConfig};
//!
//! let glove = GloVe::open("testdata/tiny.txt", GloVeConfig::with_dims(3)).unwrap();
//!
//! // Unknown words get a vector from their character n-grams.
//! let vector = glove.get_vector("Berlijn", true, false);
//! assert_eq!(vector.len(), 3);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array1;
use tracing::{debug, info, warn};

use crate::compat::text::{ReadText, WriteText};
use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::files::{load_binary, save_binary};
use crate::storage::NdArray;
use crate::subword::NGramConfig;
use crate::util::create_parent_dir;
use crate::vocab::SimpleVocab;

/// Dimensionalities of the pretrained GloVe embeddings.
pub const GLOVE_DIMS: [usize; 5] = [25, 50, 100, 200, 300];

/// Dimensionality used when it is not configured and cannot be inferred.
pub const DEFAULT_DIMS: usize = 300;

/// Vocabulary sizes of the pretrained GloVe embeddings, by corpus size
/// in billions of tokens.
pub const CORPUS_VOCAB_SIZES: [(usize, usize); 4] = [
    (6, 400_000),
    (42, 1_900_000),
    (840, 2_200_000),
    (27, 1_200_000),
];

/// Infer the dimensionality from a file name such as `glove.6B.300d.txt`.
pub fn infer_dims(filename: &str) -> Option<usize> {
    GLOVE_DIMS
        .iter()
        .cloned()
        .find(|dims| filename.contains(&format!("{}d", dims)))
}

/// Infer the vocabulary size from a file name such as `glove.6B.300d.txt`.
pub fn infer_vocab_size(filename: &str) -> Option<usize> {
    CORPUS_VOCAB_SIZES
        .iter()
        .find(|(tokens, _)| filename.contains(&format!("{}B", tokens)))
        .map(|&(_, vocab_size)| vocab_size)
}

/// Shape of GloVe embeddings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GloVeConfig {
    /// Embedding dimensionality.
    pub dims: Option<usize>,

    /// Vocabulary size of the corpus.
    pub vocab_size: Option<usize>,
}

impl GloVeConfig {
    /// Configuration with a known dimensionality.
    pub fn with_dims(dims: usize) -> Self {
        GloVeConfig {
            dims: Some(dims),
            vocab_size: None,
        }
    }

    /// Configuration inferred from a file name.
    pub fn from_filename(filename: &str) -> Self {
        GloVeConfig {
            dims: infer_dims(filename),
            vocab_size: infer_vocab_size(filename),
        }
    }

    /// Fill unset fields from the file name of `path`.
    ///
    /// The dimensionality defaults to `DEFAULT_DIMS`.
    pub fn resolve(self, path: &Path) -> (usize, Option<usize>) {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let inferred = GloVeConfig::from_filename(&filename);

        (
            self.dims.or(inferred.dims).unwrap_or(DEFAULT_DIMS),
            self.vocab_size.or(inferred.vocab_size),
        )
    }
}

/// GloVe embeddings.
#[derive(Clone, Debug)]
pub struct GloVe {
    embeddings: Embeddings<SimpleVocab, NdArray>,
    vocab_size: Option<usize>,
}

impl GloVe {
    /// Load GloVe embeddings.
    ///
    /// Files with the `txt` extension are read as text, other files as
    /// binary word/vector pairs written by `save_binary`. If `path`
    /// does not exist, a warning is logged and the embeddings are
    /// empty.
    pub fn open(path: impl AsRef<Path>, config: GloVeConfig) -> Result<Self> {
        let path = path.as_ref();
        let (dims, vocab_size) = config.resolve(path);
        debug!(dims, ?vocab_size, "GloVe shape");

        if !path.is_file() {
            warn!("Vector path {} not found.", path.display());
            return Ok(GloVe {
                embeddings: Embeddings::empty(dims),
                vocab_size,
            });
        }

        let embeddings = if path.extension().map_or(false, |ext| ext == "txt") {
            info!("Loading GloVe vectors from {}", path.display());
            let f = File::open(path).map_err(|e| {
                Error::io_error(format!("Cannot open embeddings '{}'", path.display()), e)
            })?;
            Embeddings::read_text(&mut BufReader::new(f), dims)?
        } else {
            return GloVe::open_binary(path, config);
        };
        info!(words = embeddings.len(), "Loading GloVe vectors complete");

        Ok(GloVe {
            embeddings,
            vocab_size,
        })
    }

    /// Load binary word/vector pairs written by `save_binary`.
    ///
    /// Without a configured dimensionality, the length of the first
    /// vector is used.
    pub fn open_binary(path: impl AsRef<Path>, config: GloVeConfig) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading binary GloVe vectors from {}", path.display());

        let pairs: Vec<(String, Vec<f32>)> = load_binary(path)?;
        let (resolved_dims, vocab_size) = config.resolve(path);
        let dims = config
            .dims
            .or_else(|| pairs.first().map(|(_, vector)| vector.len()))
            .unwrap_or(resolved_dims);

        let embeddings = Embeddings::from_pairs(dims, pairs)?;
        info!(words = embeddings.len(), "Loading GloVe vectors complete");

        Ok(GloVe {
            embeddings,
            vocab_size,
        })
    }

    /// Wrap existing embeddings.
    pub fn from_embeddings(
        embeddings: Embeddings<SimpleVocab, NdArray>,
        vocab_size: Option<usize>,
    ) -> Self {
        GloVe {
            embeddings,
            vocab_size,
        }
    }

    /// Embedding dimensionality.
    pub fn dims(&self) -> usize {
        self.embeddings.dims()
    }

    /// Vocabulary size of the corpus, when known.
    pub fn vocab_size(&self) -> Option<usize> {
        self.vocab_size
    }

    pub fn embeddings(&self) -> &Embeddings<SimpleVocab, NdArray> {
        &self.embeddings
    }

    pub fn into_embeddings(self) -> Embeddings<SimpleVocab, NdArray> {
        self.embeddings
    }

    /// Get the vector of a token.
    ///
    /// Unknown tokens get the zero vector, unless `compute_unknown` is
    /// `true`. In that case, the vector is the average of the vectors of
    /// the token's character 2- to 8-grams. With `norm`, the n-gram
    /// vectors are l2-normalized before averaging.
    pub fn get_vector(&self, token: &str, compute_unknown: bool, norm: bool) -> Array1<f32> {
        match self.embeddings.embedding(token) {
            Some(embedding) => embedding.to_owned(),
            None if compute_unknown => {
                self.embeddings
                    .ngram_embedding(token, NGramConfig::glove(), norm)
            }
            None => Array1::zeros(self.dims()),
        }
    }

    /// Get the tokens without a vector, in input order.
    pub fn oov_tokens<I, T>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.embeddings.oov_tokens(tokens)
    }

    /// Add vectors, replacing the vectors of tokens that are present.
    pub fn add_replace_vectors<I, W, A>(&mut self, vectors: I) -> Result<()>
    where
        I: IntoIterator<Item = (W, A)>,
        W: Into<String>,
        A: Into<Array1<f32>>,
    {
        self.embeddings.merge(vectors)
    }

    /// Write the vectors in GloVe text format.
    pub fn save_vectors(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!("Saving GloVe vectors to {}", path.display());

        create_parent_dir(path)?;
        let f = File::create(path).map_err(|e| {
            Error::io_error(format!("Cannot create embeddings '{}'", path.display()), e)
        })?;
        let mut writer = BufWriter::new(f);
        self.embeddings.write_text(&mut writer)?;
        writer
            .flush()
            .map_err(|e| Error::io_error("Cannot write embeddings", e))?;

        info!(words = self.embeddings.len(), "Saving GloVe vectors complete");

        Ok(())
    }

    /// Write the vectors as binary word/vector pairs.
    pub fn save_binary(&self, path: impl AsRef<Path>) -> Result<()> {
        let pairs: Vec<(&str, Vec<f32>)> = self
            .embeddings
            .iter()
            .map(|(word, embedding)| (word, embedding.to_vec()))
            .collect();
        save_binary(path, &pairs)
    }
}

/// Path of a GloVe file in a directory, following the naming
/// convention of the pretrained embeddings.
pub fn pretrained_path(dir: impl AsRef<Path>, corpus: &str, dims: usize) -> PathBuf {
    dir.as_ref().join(format!("glove.{}.{}d.txt", corpus, dims))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use approx::assert_abs_diff_eq;
    use ndarray::{arr1, Array1};
    use tempfile::tempdir;

    use super::{infer_dims, infer_vocab_size, pretrained_path, GloVe, GloVeConfig};
    use crate::embeddings::Embeddings;
    use crate::storage::StorageView;
    use crate::vocab::Vocab;

    fn cat_glove() -> GloVe {
        let embeddings = Embeddings::from_pairs(3, vec![("cat", vec![1f32, 2., 3.])]).unwrap();
        GloVe::from_embeddings(embeddings, None)
    }

    #[test]
    fn infers_shape_from_filename() {
        assert_eq!(infer_dims("glove.6B.50d.txt"), Some(50));
        assert_eq!(infer_dims("glove.twitter.27B.200d.txt"), Some(200));
        assert_eq!(infer_dims("vectors.txt"), None);

        assert_eq!(infer_vocab_size("glove.6B.50d.txt"), Some(400_000));
        assert_eq!(infer_vocab_size("glove.840B.300d.txt"), Some(2_200_000));
        assert_eq!(infer_vocab_size("glove.twitter.27B.25d.txt"), Some(1_200_000));
        assert_eq!(infer_vocab_size("vectors.txt"), None);
    }

    #[test]
    fn explicit_config_wins() {
        let path = Path::new("data/glove.42B.100d.txt");
        assert_eq!(GloVeConfig::default().resolve(path), (100, Some(1_900_000)));
        assert_eq!(
            GloVeConfig {
                dims: Some(3),
                vocab_size: Some(10),
            }
            .resolve(path),
            (3, Some(10))
        );
        assert_eq!(
            GloVeConfig::default().resolve(Path::new("vectors.txt")),
            (300, None)
        );
    }

    #[test]
    fn known_token() {
        let glove = cat_glove();
        assert_eq!(glove.get_vector("cat", false, false), arr1(&[1f32, 2., 3.]));
        assert_eq!(glove.get_vector("cat", true, true), arr1(&[1f32, 2., 3.]));
    }

    #[test]
    fn unknown_token_is_zero_without_synthesis() {
        let glove = cat_glove();
        assert_eq!(glove.get_vector("dog", false, false), Array1::<f32>::zeros(3));
    }

    #[test]
    fn unknown_token_from_ngrams() {
        let embeddings = Embeddings::from_pairs(2, vec![("ca", vec![2f32, 0.])]).unwrap();
        let glove = GloVe::from_embeddings(embeddings, None);
        assert_eq!(glove.get_vector("cat", true, false), arr1(&[2f32, 0.]));
        assert_eq!(glove.get_vector("cat", true, true), arr1(&[1f32, 0.]));
        assert_eq!(glove.get_vector("dog", true, false), arr1(&[0f32, 0.]));
    }

    #[test]
    fn oov_tokens() {
        let embeddings = Embeddings::from_pairs(1, vec![("a", vec![1f32])]).unwrap();
        let glove = GloVe::from_embeddings(embeddings, None);
        assert_eq!(glove.oov_tokens(vec!["a", "b", "c"]), vec!["b", "c"]);
    }

    #[test]
    fn add_replace_vectors() {
        let mut glove = cat_glove();
        glove
            .add_replace_vectors(vec![
                ("cat".to_owned(), arr1(&[3f32, 2., 1.])),
                ("dog".to_owned(), arr1(&[0f32, 1., 0.])),
            ])
            .unwrap();
        assert_eq!(glove.get_vector("cat", false, false), arr1(&[3f32, 2., 1.]));
        assert_eq!(glove.get_vector("dog", false, false), arr1(&[0f32, 1., 0.]));
    }

    #[test]
    fn missing_file_gives_empty_embeddings() {
        let dir = tempdir().unwrap();
        let glove = GloVe::open(
            pretrained_path(dir.path(), "6B", 50),
            GloVeConfig::default(),
        )
        .unwrap();
        assert!(glove.embeddings().is_empty());
        assert_eq!(glove.dims(), 50);
        assert_eq!(glove.vocab_size(), Some(400_000));
    }

    #[test]
    fn open_text() {
        let glove = GloVe::open("testdata/tiny.txt", GloVeConfig::with_dims(3)).unwrap();
        assert_eq!(glove.embeddings().len(), 4);
        assert_eq!(
            glove.get_vector("New York", false, false),
            arr1(&[0.5f32, -0.25, 1.])
        );
    }

    #[test]
    fn save_and_reload_text() {
        let glove = GloVe::open("testdata/tiny.txt", GloVeConfig::with_dims(3)).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("export/vectors.txt");
        glove.save_vectors(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            fs::read_to_string("testdata/tiny.txt").unwrap()
        );

        let reloaded = GloVe::open(&path, GloVeConfig::with_dims(3)).unwrap();
        assert_eq!(
            reloaded.embeddings().vocab().words(),
            glove.embeddings().vocab().words()
        );
        assert_abs_diff_eq!(
            reloaded.embeddings().storage().view(),
            glove.embeddings().storage().view(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn save_and_reload_binary() {
        let glove = GloVe::open("testdata/tiny.txt", GloVeConfig::with_dims(3)).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("cache/glove.6B.3d.bin");
        glove.save_binary(&path).unwrap();

        let reloaded = GloVe::open(&path, GloVeConfig::with_dims(3)).unwrap();
        assert_eq!(
            reloaded.embeddings().vocab().words(),
            glove.embeddings().vocab().words()
        );
        assert_eq!(
            reloaded.embeddings().storage().view(),
            glove.embeddings().storage().view()
        );
        assert_eq!(reloaded.vocab_size(), Some(400_000));
    }

    #[test]
    fn binary_dims_from_vectors() {
        let embeddings = Embeddings::from_pairs(
            2,
            vec![("kaas", vec![1f32, 2.]), ("brood", vec![3f32, 4.])],
        )
        .unwrap();
        let glove = GloVe::from_embeddings(embeddings, None);

        let dir = tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        glove.save_binary(&path).unwrap();

        let reloaded = GloVe::open(&path, GloVeConfig::default()).unwrap();
        assert_eq!(reloaded.dims(), 2);
        assert_eq!(reloaded.get_vector("brood", false, false), arr1(&[3f32, 4.]));

        let empty = GloVe::from_embeddings(Embeddings::empty(2), None);
        let path = dir.path().join("glove.6B.50d.bin");
        empty.save_binary(&path).unwrap();
        let reloaded = GloVe::open_binary(&path, GloVeConfig::default()).unwrap();
        assert!(reloaded.embeddings().is_empty());
        assert_eq!(reloaded.dims(), 50);
    }

    #[test]
    fn binary_with_wrong_dims_fails() {
        let glove = GloVe::open("testdata/tiny.txt", GloVeConfig::with_dims(3)).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("vectors.bin");
        glove.save_binary(&path).unwrap();

        assert!(GloVe::open(&path, GloVeConfig::with_dims(4)).is_err());
    }
}
