//! Readers/writers for other embedding formats.

pub mod text;
