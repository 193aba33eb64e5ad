//! Embedding matrix representations.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Embedding matrix storage.
///
/// This trait abstracts over the storage of the embedding matrix,
/// with one row per vocabulary entry.
pub trait Storage {
    /// Get the embedding `idx`.
    fn embedding(&self, idx: usize) -> ArrayView1<f32>;

    /// Get the shape of the embedding matrix.
    fn shape(&self) -> (usize, usize);

    /// Get the embedding dimensionality.
    fn dims(&self) -> usize {
        self.shape().1
    }
}

/// Storage that provide a view of the embedding matrix.
pub trait StorageView: Storage {
    /// Get a view of the embedding matrix.
    fn view(&self) -> ArrayView2<f32>;
}

/// Storage that can grow and overwrite embeddings.
pub trait StorageMut: Storage {
    /// Append an embedding as the last row.
    fn push(&mut self, embedding: ArrayView1<f32>) -> Result<()>;

    /// Replace the embedding `idx`.
    fn assign(&mut self, idx: usize, embedding: ArrayView1<f32>) -> Result<()>;
}

/// In-memory `ndarray` matrix storage.
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray(Array2<f32>);

impl NdArray {
    pub fn new(arr: Array2<f32>) -> Self {
        NdArray(arr)
    }

    /// Construct an empty matrix for embeddings of length `dims`.
    pub fn empty(dims: usize) -> Self {
        NdArray(Array2::zeros((0, dims)))
    }

    fn check_dims(&self, embedding: ArrayView1<f32>) -> Result<()> {
        if embedding.len() != self.dims() {
            return Err(Error::Format(format!(
                "Incorrect embedding dimensionality, expected: {}, got: {}",
                self.dims(),
                embedding.len()
            )));
        }

        Ok(())
    }
}

impl From<Array2<f32>> for NdArray {
    fn from(arr: Array2<f32>) -> Self {
        NdArray::new(arr)
    }
}

impl From<NdArray> for Array2<f32> {
    fn from(arr: NdArray) -> Self {
        arr.0
    }
}

impl Storage for NdArray {
    fn embedding(&self, idx: usize) -> ArrayView1<f32> {
        self.0.index_axis(Axis(0), idx)
    }

    fn shape(&self) -> (usize, usize) {
        self.0.dim()
    }
}

impl StorageView for NdArray {
    fn view(&self) -> ArrayView2<f32> {
        self.0.view()
    }
}

impl StorageMut for NdArray {
    fn push(&mut self, embedding: ArrayView1<f32>) -> Result<()> {
        self.check_dims(embedding)?;
        self.0
            .push_row(embedding)
            .map_err(|e| Error::Format(format!("Cannot append embedding: {}", e)))
    }

    fn assign(&mut self, idx: usize, embedding: ArrayView1<f32>) -> Result<()> {
        self.check_dims(embedding)?;
        self.0.row_mut(idx).assign(&embedding);
        Ok(())
    }
}
