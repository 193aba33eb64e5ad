use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::str;

use ndarray::ArrayView1;

use crate::error::{Error, Result};

pub fn l2_norm(v: ArrayView1<f32>) -> f32 {
    v.dot(&v).sqrt()
}

/// Create the parent directories of `path` if it has any.
pub fn create_parent_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir).map_err(|e| {
            Error::io_error(format!("Cannot create directory '{}'", dir.display()), e)
        }),
        _ => Ok(()),
    }
}

/// Read a line without its line terminator.
///
/// Returns `None` at the end of the input. If `lossy` is `true`,
/// invalid UTF-8 sequences are dropped.
pub fn read_line(reader: &mut dyn BufRead, lossy: bool) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let n = reader
        .read_until(b'\n', &mut buf)
        .map_err(|e| Error::io_error("Cannot read line", e))?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    let s = if lossy {
        decode_ignoring_invalid(&buf)
    } else {
        String::from_utf8(buf)
            .map_err(|e| Error::Format(format!("Line contains invalid UTF-8: {}", e)))?
    };

    Ok(Some(s))
}

/// Decode UTF-8, skipping invalid byte sequences.
fn decode_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut decoded = String::with_capacity(bytes.len());
    loop {
        match str::from_utf8(bytes) {
            Ok(valid) => {
                decoded.push_str(valid);
                return decoded;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                decoded.push_str(str::from_utf8(valid).unwrap_or_default());
                let skip = e.error_len().unwrap_or(rest.len());
                bytes = &rest[skip..];
            }
        }
    }
}

pub fn parse_number(field: &str, what: &str) -> Result<usize> {
    field
        .parse()
        .map_err(|e| Error::Format(format!("Cannot parse {} '{}': {}", what, field, e)))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ndarray::array;

    use super::{l2_norm, parse_number, read_line};

    #[test]
    fn l2_norm_test() {
        assert_eq!(l2_norm(array![3., 4.].view()), 5.);
        assert_eq!(l2_norm(array![0., 0.].view()), 0.);
    }

    #[test]
    fn read_line_strips_terminators() {
        let mut cursor = Cursor::new(b"hello\r\nworld".to_vec());
        assert_eq!(read_line(&mut cursor, false).unwrap().unwrap(), "hello");
        assert_eq!(read_line(&mut cursor, false).unwrap().unwrap(), "world");
        assert!(read_line(&mut cursor, false).unwrap().is_none());
    }

    #[test]
    fn read_line_lossy() {
        let mut cursor = Cursor::new(b"zee\xc3n\n".to_vec());
        assert!(read_line(&mut cursor, false).is_err());

        let mut cursor = Cursor::new(b"zee\xc3n\n".to_vec());
        assert_eq!(read_line(&mut cursor, true).unwrap().unwrap(), "zeen");

        let mut cursor = Cursor::new(b"\xffmeer\xe2\x82".to_vec());
        assert_eq!(read_line(&mut cursor, true).unwrap().unwrap(), "meer");
    }

    #[test]
    fn parse_number_fails_on_garbage() {
        assert_eq!(parse_number("300", "dimensionality").unwrap(), 300);
        assert!(parse_number("3x0", "dimensionality").is_err());
    }
}
