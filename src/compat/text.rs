//! Readers and writers for text formats.
//!
//! This module provides two readers/writers:
//!
//! 1. `ReadText`/`WriteText`: word embeddings in text format. In this
//!    format, each line contains a word followed by its
//!    embedding. The word and the embedding vector components are
//!    separated by a space. This format is used by GloVe.
//! 2. `ReadTextDims`/`WriteTextDims`: this format is the same as (1),
//!    but the data is preceded by a line with the shape of the
//!    embedding matrix. This format is used by fastText's `.vec`
//!    files.
//!
//! For example:
//!
//! ```
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use embedding_utils::prelude::*;
//!
//! let mut reader = BufReader::new(File::open("testdata/tiny.vec").unwrap());
//!
//! // Read the embeddings, together with the vocabulary size from the header.
//! let (embeddings, vocab_size) = Embeddings::read_text_dims(&mut reader)
//!     .unwrap();
//!
//! // Look up an embedding.
//! let embedding = embeddings.embedding("Berlin");
//! ```

use std::io::{BufRead, Write};

use itertools::Itertools;
use ndarray::Array2;
use tracing::warn;

use crate::embeddings::Embeddings;
use crate::error::{Error, Result};
use crate::storage::{NdArray, Storage};
use crate::util::{parse_number, read_line};
use crate::vocab::{SimpleVocab, Vocab};

/// Method to construct `Embeddings` from a text file.
///
/// This trait defines an extension to `Embeddings` to read the word embeddings
/// from a text stream. The text should contain one word embedding per line in
/// the following format:
///
/// *word0 component_1 component_2 ... component_n*
///
/// Since the dimensionality is given, words may contain spaces: the last
/// `dims` fields of a line form the embedding and the preceding fields form
/// the word.
pub trait ReadText<R>
where
    Self: Sized,
    R: BufRead,
{
    /// Read the embeddings from the given buffered reader.
    ///
    /// Invalid UTF-8 byte sequences are dropped.
    fn read_text(reader: &mut R, dims: usize) -> Result<Self>;

    /// Read the embeddings from the given buffered reader.
    ///
    /// In contrast to `read_text`, this constructor fails if a line
    /// contains invalid UTF-8.
    fn read_text_strict(reader: &mut R, dims: usize) -> Result<Self>;
}

impl<R> ReadText<R> for Embeddings<SimpleVocab, NdArray>
where
    R: BufRead,
{
    fn read_text(reader: &mut R, dims: usize) -> Result<Self> {
        read_embeds(reader, Layout::TrailingDims(dims), true, None, |_| ())
    }

    fn read_text_strict(reader: &mut R, dims: usize) -> Result<Self> {
        read_embeds(reader, Layout::TrailingDims(dims), false, None, |_| ())
    }
}

/// Method to construct `Embeddings` from a text file with dimensions.
///
/// This trait defines an extension to `Embeddings` to read the word embeddings
/// from a text stream. The text must contain as the first line the shape of
/// the embedding matrix:
///
/// *vocab_size n_components*
///
/// The remainder of the stream should contain one word embedding per line in
/// the following format:
///
/// *word0 component_1 component_2 ... component_n*
///
/// Both methods return the embeddings together with the vocabulary size
/// declared in the header.
pub trait ReadTextDims<R>
where
    Self: Sized,
    R: BufRead,
{
    /// Read the embeddings from the given buffered reader.
    ///
    /// Invalid UTF-8 byte sequences are dropped.
    fn read_text_dims(reader: &mut R) -> Result<(Self, usize)>;

    /// Read the embeddings from the given buffered reader.
    ///
    /// In contrast to `read_text_dims`, this constructor fails if a line
    /// contains invalid UTF-8.
    fn read_text_dims_strict(reader: &mut R) -> Result<(Self, usize)>;
}

impl<R> ReadTextDims<R> for Embeddings<SimpleVocab, NdArray>
where
    R: BufRead,
{
    fn read_text_dims(reader: &mut R) -> Result<(Self, usize)> {
        read_text_dims_with(reader, true, |_| |_: usize| ())
    }

    fn read_text_dims_strict(reader: &mut R) -> Result<(Self, usize)> {
        read_text_dims_with(reader, false, |_| |_: usize| ())
    }
}

/// Read the shape of the embedding matrix from a header line.
fn read_shape(reader: &mut dyn BufRead) -> Result<(usize, usize)> {
    let header = read_line(reader, false)?
        .ok_or_else(|| Error::Format("Missing embedding matrix shape".to_owned()))?;

    let mut fields = header.split_whitespace();
    let (n_words, dims) = match (fields.next(), fields.next(), fields.next()) {
        (Some(n_words), Some(dims), None) => (n_words, dims),
        _ => {
            return Err(Error::Format(format!(
                "Expected embedding matrix shape, got: '{}'",
                header
            )))
        }
    };

    Ok((
        parse_number(n_words, "vocabulary size")?,
        parse_number(dims, "embedding dimensionality")?,
    ))
}

/// Read embeddings with a shape header.
///
/// `progress` is called with the vocabulary size from the header and
/// returns a callback that receives the number of embeddings read after
/// every line.
pub(crate) fn read_text_dims_with<R, P, F>(
    reader: &mut R,
    lossy: bool,
    progress: P,
) -> Result<(Embeddings<SimpleVocab, NdArray>, usize)>
where
    R: BufRead,
    P: FnOnce(usize) -> F,
    F: FnMut(usize),
{
    let (n_words, dims) = read_shape(reader)?;
    let embeds = read_embeds(
        reader,
        Layout::LeadingWord(dims),
        lossy,
        Some(n_words),
        progress(n_words),
    )?;

    if embeds.len() != n_words {
        warn!(
            expected = n_words,
            got = embeds.len(),
            "Vocabulary size differs from the size in the header"
        );
    }

    Ok((embeds, n_words))
}

const MAX_PREALLOC_WORDS: usize = 1 << 20;
const MAX_PREALLOC_COMPONENTS: usize = 1 << 26;

/// Layout of an embedding line.
#[derive(Clone, Copy, Debug)]
enum Layout {
    /// The first field is the word, followed by exactly the given
    /// number of components.
    LeadingWord(usize),

    /// The last fields are the given number of components, the fields
    /// before them form the word.
    TrailingDims(usize),
}

impl Layout {
    fn dims(self) -> usize {
        match self {
            Layout::LeadingWord(dims) | Layout::TrailingDims(dims) => dims,
        }
    }

    fn split<'a>(self, fields: &[&'a str]) -> Result<(String, Vec<&'a str>)> {
        match self {
            Layout::LeadingWord(dims) => {
                if fields.len() - 1 != dims {
                    return Err(Error::Format(format!(
                        "Incorrect embedding dimensionality for '{}', expected: {}, got: {}",
                        fields[0],
                        dims,
                        fields.len() - 1
                    )));
                }
                Ok((fields[0].to_owned(), fields[1..].to_vec()))
            }
            Layout::TrailingDims(dims) => {
                if fields.len() <= dims {
                    return Err(Error::Format(format!(
                        "Line has {} fields, expected a word and {} components",
                        fields.len(),
                        dims
                    )));
                }
                let split = fields.len() - dims;
                Ok((fields[..split].join(" "), fields[split..].to_vec()))
            }
        }
    }
}

fn read_embeds<R>(
    reader: &mut R,
    layout: Layout,
    lossy: bool,
    capacity: Option<usize>,
    mut on_embedding: impl FnMut(usize),
) -> Result<Embeddings<SimpleVocab, NdArray>>
where
    R: BufRead,
{
    let dims = layout.dims();

    // The header size is a hint, the matrix grows with the lines read.
    let capacity = capacity.unwrap_or(0).min(MAX_PREALLOC_WORDS);
    let mut vocab = SimpleVocab::with_capacity(capacity);
    let components = capacity
        .checked_mul(dims)
        .unwrap_or(MAX_PREALLOC_COMPONENTS)
        .min(MAX_PREALLOC_COMPONENTS);
    let mut data = Vec::with_capacity(components);

    while let Some(line) = read_line(reader, lossy)? {
        let fields: Vec<_> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }

        let (word, components) = layout.split(&fields)?;

        // Duplicate words replace earlier embeddings.
        let (idx, added) = vocab.insert(word);
        if added {
            data.resize(data.len() + dims, 0f32);
        }

        for (target, component) in data[idx * dims..(idx + 1) * dims]
            .iter_mut()
            .zip(components)
        {
            *target = component.parse().map_err(|e| {
                Error::Format(format!(
                    "Cannot parse vector component '{}': {}",
                    component, e
                ))
            })?;
        }

        on_embedding(vocab.words_len());
    }

    let matrix = Array2::from_shape_vec((vocab.words_len(), dims), data)
        .map_err(|e| Error::Format(format!("Cannot construct embedding matrix: {}", e)))?;

    Ok(Embeddings::new(vocab, NdArray::new(matrix)))
}

/// Method to write `Embeddings` to a text file.
///
/// This trait defines an extension to `Embeddings` to write the word embeddings
/// as text. The text will contain one word embedding per line in the following
/// format:
///
/// *word0 component_1 component_2 ... component_n*
pub trait WriteText<W>
where
    W: Write,
{
    /// Write the embeddings to the given writer.
    fn write_text(&self, writer: &mut W) -> Result<()>;
}

impl<W, V, S> WriteText<W> for Embeddings<V, S>
where
    W: Write,
    V: Vocab,
    S: Storage,
{
    fn write_text(&self, write: &mut W) -> Result<()> {
        for (word, embed) in self.iter() {
            let embed_str = embed.iter().map(ToString::to_string).join(" ");
            writeln!(write, "{} {}", word, embed_str)
                .map_err(|e| Error::io_error("Cannot write word embedding", e))?;
        }

        Ok(())
    }
}

/// Method to write `Embeddings` to a text file.
///
/// This trait defines an extension to `Embeddings` to write the word embeddings
/// as text, preceded by a line with the shape of the embedding matrix.
pub trait WriteTextDims<W>
where
    W: Write,
{
    /// Write the embeddings to the given writer.
    fn write_text_dims(&self, writer: &mut W) -> Result<()>;
}

impl<W, V, S> WriteTextDims<W> for Embeddings<V, S>
where
    W: Write,
    V: Vocab,
    S: Storage,
{
    fn write_text_dims(&self, write: &mut W) -> Result<()> {
        writeln!(write, "{} {}", self.len(), self.dims())
            .map_err(|e| Error::io_error("Cannot write word embedding matrix shape", e))?;
        self.write_text(write)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::{BufReader, Cursor, Read};

    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    use super::{ReadText, ReadTextDims, WriteText, WriteTextDims};
    use crate::embeddings::Embeddings;
    use crate::error::Error;
    use crate::storage::{NdArray, StorageView};
    use crate::vocab::{SimpleVocab, Vocab};

    fn read_tiny_glove() -> Embeddings<SimpleVocab, NdArray> {
        let f = File::open("testdata/tiny.txt").unwrap();
        let mut reader = BufReader::new(f);
        Embeddings::read_text(&mut reader, 3).unwrap()
    }

    #[test]
    fn read_text() {
        let embeds = read_tiny_glove();
        assert_eq!(embeds.vocab().words(), &["Berlin", "Potsdam", "New York", "Amsterdam"]);
        assert_eq!(embeds.dims(), 3);
        assert_eq!(embeds.embedding("New York").unwrap(), arr1(&[0.5f32, -0.25, 1.]));
    }

    #[test]
    fn read_text_dims() {
        let f = File::open("testdata/tiny.vec").unwrap();
        let mut reader = BufReader::new(f);
        let (embeds, n_words) = Embeddings::read_text_dims(&mut reader).unwrap();
        assert_eq!(n_words, 3);
        assert_eq!(embeds.dims(), 3);
        assert_eq!(embeds.vocab().words(), &["Berlin", "Potsdam", "Amsterdam"]);
        assert_abs_diff_eq!(
            embeds.embedding("Amsterdam").unwrap(),
            arr1(&[0.25f32, 0.5, -0.125]),
            epsilon = 1e-6
        );
    }

    #[test]
    fn duplicate_words_overwrite() {
        let mut cursor = Cursor::new("a 1 2\nb 3 4\na 5 6\n");
        let embeds = Embeddings::read_text(&mut cursor, 2).unwrap();
        assert_eq!(embeds.vocab().words(), &["a", "b"]);
        assert_eq!(embeds.embedding("a").unwrap(), arr1(&[5f32, 6.]));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut cursor = Cursor::new("a 1 2\n\n   \nb 3 4\n\n");
        let embeds = Embeddings::read_text(&mut cursor, 2).unwrap();
        assert_eq!(embeds.len(), 2);
    }

    #[test]
    fn fails_on_missing_components() {
        let mut cursor = Cursor::new("a 1 2\nb 3\n");
        assert!(Embeddings::read_text(&mut cursor, 2).is_err());
    }

    #[test]
    fn fails_on_invalid_component() {
        let mut cursor = Cursor::new("a 1 x\n");
        assert!(Embeddings::read_text(&mut cursor, 2).is_err());
    }

    #[test]
    fn fails_on_incorrect_dims() {
        let mut cursor = Cursor::new("2 2\na 1 2\nb 3 4 5\n");
        assert!(Embeddings::read_text_dims(&mut cursor).is_err());
    }

    #[test]
    fn fails_on_invalid_header() {
        let mut cursor = Cursor::new("2\na 1 2\n");
        assert!(Embeddings::read_text_dims(&mut cursor).is_err());

        let mut cursor = Cursor::new("");
        assert!(Embeddings::read_text_dims(&mut cursor).is_err());
    }

    #[test]
    fn header_only_gives_empty_embeddings() {
        let mut cursor = Cursor::new("0 4\n");
        let (embeds, n_words) = Embeddings::read_text_dims(&mut cursor).unwrap();
        assert_eq!(n_words, 0);
        assert!(embeds.is_empty());
        assert_eq!(embeds.dims(), 4);
    }

    #[test]
    fn oversized_header_is_a_hint() {
        let mut cursor = Cursor::new("4000000000000 2\na 1 2\n");
        let (embeds, n_words) = Embeddings::read_text_dims(&mut cursor).unwrap();
        assert_eq!(n_words, 4_000_000_000_000);
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds.embedding("a").unwrap(), arr1(&[1f32, 2.]));

        let mut cursor = Cursor::new(format!("{} 300\na 1\n", usize::MAX));
        match Embeddings::read_text_dims(&mut cursor) {
            Err(Error::Format(_)) => (),
            other => panic!("Expected format error, got: {:?}", other),
        }
    }

    #[test]
    fn strict_fails_on_invalid_utf8() {
        let mut cursor = Cursor::new(b"zee\xc3n 1 2\n".to_vec());
        assert!(Embeddings::read_text_strict(&mut cursor, 2).is_err());

        let mut cursor = Cursor::new(b"1 2\nzee\xc3n 1 2\n".to_vec());
        assert!(Embeddings::read_text_dims_strict(&mut cursor).is_err());
    }

    #[test]
    fn read_lossy() {
        let mut cursor = Cursor::new(b"meren 1 2\nzee\xc3n 1 2\nrivieren 1 2\n".to_vec());
        let embeds = Embeddings::read_text(&mut cursor, 2).unwrap();
        assert_eq!(embeds.vocab().words(), &["meren", "zeen", "rivieren"]);
    }

    #[test]
    fn text_roundtrip() {
        let mut reader = BufReader::new(File::open("testdata/tiny.txt").unwrap());
        let mut check = String::new();
        reader.read_to_string(&mut check).unwrap();

        let embeddings = Embeddings::read_text(&mut Cursor::new(&check), 3).unwrap();

        // Write embeddings to a byte vector.
        let mut output = Vec::new();
        embeddings.write_text(&mut output).unwrap();

        assert_eq!(check, String::from_utf8_lossy(&output));
    }

    #[test]
    fn text_dims_roundtrip() {
        let mut reader = BufReader::new(File::open("testdata/tiny.vec").unwrap());
        let (embeddings, _) = Embeddings::read_text_dims(&mut reader).unwrap();

        let mut output = Vec::new();
        embeddings.write_text_dims(&mut output).unwrap();

        let (reread, n_words) = Embeddings::read_text_dims(&mut Cursor::new(&output)).unwrap();
        assert_eq!(n_words, 3);
        assert_eq!(reread.vocab().words(), embeddings.vocab().words());
        assert_abs_diff_eq!(
            reread.storage().view(),
            embeddings.storage().view(),
            epsilon = 1e-6
        );
    }
}
