//! Reading and writing of helper files.
//!
//! Every writer creates the parent directories of the output path
//! when they do not exist yet. Files are opened, fully read or
//! written, and closed within each call.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::util::{create_parent_dir, read_line};

fn open(path: &Path) -> Result<BufReader<File>> {
    let f = File::open(path)
        .map_err(|e| Error::io_error(format!("Cannot open '{}'", path.display()), e))?;
    Ok(BufReader::new(f))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    create_parent_dir(path)?;
    let f = File::create(path)
        .map_err(|e| Error::io_error(format!("Cannot create '{}'", path.display()), e))?;
    Ok(BufWriter::new(f))
}

fn finish(mut writer: impl Write, path: &Path) -> Result<()> {
    writer
        .flush()
        .map_err(|e| Error::io_error(format!("Cannot write '{}'", path.display()), e))
}

/// Write a value as compact JSON.
pub fn save_json<T>(path: impl AsRef<Path>, data: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let mut writer = create(path)?;
    serde_json::to_writer(&mut writer, data)?;
    finish(writer, path)
}

/// Write a value as JSON, indented by four spaces.
///
/// Non-ASCII characters are written as-is.
pub fn save_json_pretty<T>(path: impl AsRef<Path>, data: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let mut writer = create(path)?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    data.serialize(&mut serializer)?;
    finish(writer, path)
}

/// Read a JSON value.
pub fn load_json<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let reader = open(path.as_ref())?;
    Ok(serde_json::from_reader(reader)?)
}

fn save_delimited<R, F>(path: &Path, rows: &[R], delimiter: u8) -> Result<()>
where
    R: AsRef<[F]>,
    F: AsRef<[u8]>,
{
    create_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row.as_ref())?;
    }
    writer
        .flush()
        .map_err(|e| Error::io_error(format!("Cannot write '{}'", path.display()), e))
}

fn load_delimited(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(ToOwned::to_owned).collect());
    }

    Ok(rows)
}

/// Write rows of fields, separated by tabs.
///
/// Fields are only quoted when necessary. Rows can differ in length.
pub fn save_tsv<R, F>(path: impl AsRef<Path>, rows: &[R]) -> Result<()>
where
    R: AsRef<[F]>,
    F: AsRef<[u8]>,
{
    save_delimited(path.as_ref(), rows, b'\t')
}

/// Read rows of tab-separated fields.
pub fn load_tsv(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>> {
    load_delimited(path.as_ref(), b'\t')
}

/// Write rows of fields, separated by commas.
///
/// Fields are only quoted when necessary. Rows can differ in length.
pub fn save_csv<R, F>(path: impl AsRef<Path>, rows: &[R]) -> Result<()>
where
    R: AsRef<[F]>,
    F: AsRef<[u8]>,
{
    save_delimited(path.as_ref(), rows, b',')
}

/// Read rows of comma-separated fields.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>> {
    load_delimited(path.as_ref(), b',')
}

/// Serialize a value in a compact binary format.
pub fn save_binary<T>(path: impl AsRef<Path>, data: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let mut writer = create(path)?;
    bincode::serialize_into(&mut writer, data)?;
    finish(writer, path)
}

/// Deserialize a value written by `save_binary`.
pub fn load_binary<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let reader = open(path.as_ref())?;
    Ok(bincode::deserialize_from(reader)?)
}

/// Read the lines of a text file, with surrounding whitespace removed.
///
/// Invalid UTF-8 byte sequences are dropped.
pub fn read_txt(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut reader = open(path.as_ref())?;
    read_lines(&mut reader)
}

fn read_lines(reader: &mut dyn BufRead) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    while let Some(line) = read_line(reader, true)? {
        lines.push(line.trim().to_owned());
    }
    Ok(lines)
}

/// Write one entry per line.
pub fn write_txt<I, T>(path: impl AsRef<Path>, entries: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let path = path.as_ref();
    let mut writer = create(path)?;
    for entry in entries {
        writeln!(writer, "{}", entry.as_ref())
            .map_err(|e| Error::io_error(format!("Cannot write '{}'", path.display()), e))?;
    }
    finish(writer, path)
}
