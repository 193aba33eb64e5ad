//! Lookup of values in INI-style configuration files.
//!
//! ```ini
//! [paths]
//! vectors = glove.6B.300d.txt
//! ```

use std::path::Path;

use ini::Ini;

use crate::error::{Error, Result};

const DEFAULT_SECTION: &str = "DEFAULT";

/// Get the value of `key` in `section` of an INI file.
///
/// Keys are matched case-insensitively. A key that is not in the
/// section is looked up in the `DEFAULT` section.
pub fn get_config(path: impl AsRef<Path>, section: &str, key: &str) -> Result<String> {
    let path = path.as_ref();
    let ini = Ini::load_from_file(path)
        .map_err(|e| Error::Config(format!("Cannot read '{}': {}", path.display(), e)))?;

    let properties = ini
        .section(Some(section))
        .ok_or_else(|| Error::Config(format!("No section: '{}'", section)))?;

    let lookup = |properties: &ini::Properties| {
        properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.to_owned())
    };

    lookup(properties)
        .or_else(|| ini.section(Some(DEFAULT_SECTION)).and_then(lookup))
        .ok_or_else(|| {
            Error::Config(format!(
                "No option '{}' in section: '{}'",
                key, section
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::get_config;
    use crate::error::Error;

    #[test]
    fn reads_value() {
        assert_eq!(
            get_config("testdata/settings.ini", "paths", "vectors").unwrap(),
            "glove.6B.300d.txt"
        );
        assert_eq!(
            get_config("testdata/settings.ini", "training", "epochs").unwrap(),
            "10"
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(
            get_config("testdata/settings.ini", "paths", "DATA_DIR").unwrap(),
            "/srv/data"
        );
    }

    #[test]
    fn falls_back_to_default_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fallback.ini");
        fs::write(&path, "[DEFAULT]\nlang = en\n\n[model]\ndims = 300\n").unwrap();

        assert_eq!(get_config(&path, "model", "lang").unwrap(), "en");
        assert_eq!(get_config(&path, "model", "dims").unwrap(), "300");
    }

    #[test]
    fn missing_section_or_key() {
        match get_config("testdata/settings.ini", "model", "dims") {
            Err(Error::Config(_)) => (),
            other => panic!("Expected configuration error, got: {:?}", other),
        }

        match get_config("testdata/settings.ini", "paths", "output") {
            Err(Error::Config(_)) => (),
            other => panic!("Expected configuration error, got: {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        assert!(get_config("testdata/missing.ini", "paths", "vectors").is_err());
    }
}
