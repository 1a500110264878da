//! deepiep-test-data
//!
//! Test files embedded in the crate. A `TestFile` packages the raw bytes and writes them to a
//! temporary file for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use deepiep_test_data::TestFile;
/// let (csv_file, _temp) = TestFile::sequences_01().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Four proteins under a `Sequences` column, with a `Name` column alongside.
    pub fn sequences_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/sequences_01.csv"),
            suffix: "csv",
        }
    }
    /// A valid row followed by a lowercase sequence the standard alphabet does not cover.
    pub fn sequences_bad_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/sequences_bad_01.csv"),
            suffix: "csv",
        }
    }
    /// Model metadata with the index map stored as a mapping literal string.
    /// Standard alphabet, `max_length` 80, two LSTM layers and one hidden dense layer.
    pub fn sidecar_legacy_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/sidecar_legacy_01.json"),
            suffix: "json",
        }
    }

    pub fn bytes(&self) -> &'static [u8] {
        self.filebinary
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}
