//! Model metadata stored next to the network weights as `<base>.json`.
//!
//! ```json
//! {
//!   "char2idx": {"A": 0, "C": 1, "X": 2},
//!   "input_shape": [1001, 4],
//!   "architecture": {"cell": "lstm", "units": [64], "dense": [], "activation": "relu"}
//! }
//! ```
//!
//! `char2idx` may also be a string holding a serialized mapping literal, as found in artifacts
//! exported from older tooling.
use crate::alphabet::CharIndex;
use crate::error::{DeepIepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CellKind {
    #[default]
    Lstm,
    Gru,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenseActivation {
    #[default]
    Relu,
    Tanh,
    Sigmoid,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnnArchitecture {
    #[serde(default)]
    pub cell: CellKind,
    /// Hidden size of each stacked recurrent layer.
    pub units: Vec<usize>,
    /// Hidden dense layers between the last recurrent state and the scalar output.
    #[serde(default)]
    pub dense: Vec<usize>,
    #[serde(default)]
    pub activation: DenseActivation,
}

impl Default for RnnArchitecture {
    fn default() -> Self {
        Self {
            cell: CellKind::Lstm,
            units: vec![64],
            dense: vec![],
            activation: DenseActivation::Relu,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum CharIndexRecord {
    Map(BTreeMap<String, usize>),
    Literal(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct SidecarRecord {
    char2idx: CharIndexRecord,
    input_shape: [usize; 2],
    #[serde(default)]
    architecture: RnnArchitecture,
}

/// Validated model metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub char_index: CharIndex,
    pub max_length: usize,
    pub architecture: RnnArchitecture,
}

impl ModelConfig {
    pub fn new(char_index: CharIndex, max_length: usize, architecture: RnnArchitecture) -> Self {
        Self {
            char_index,
            max_length,
            architecture,
        }
    }

    /// Build from the first layer's declared `[timesteps, features]`.
    ///
    /// The maximum sequence length is `timesteps - 1`: the trained networks reserve one position
    /// that is always padding for admissible sequences.
    pub fn from_input_shape(
        char_index: CharIndex,
        input_shape: [usize; 2],
        architecture: RnnArchitecture,
    ) -> Result<Self> {
        let [timesteps, features] = input_shape;
        if timesteps == 0 {
            return Err(DeepIepError::MetadataParse(
                "input_shape declares zero timesteps".to_string(),
            ));
        }
        if features != char_index.len() + 1 {
            return Err(DeepIepError::MetadataParse(format!(
                "input_shape declares {features} features but the index map needs {}",
                char_index.len() + 1
            )));
        }
        if architecture.units.is_empty() {
            return Err(DeepIepError::MetadataParse(
                "architecture declares no recurrent layers".to_string(),
            ));
        }
        Ok(Self::new(char_index, timesteps - 1, architecture))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: SidecarRecord = serde_json::from_str(json)
            .map_err(|e| DeepIepError::MetadataParse(e.to_string()))?;
        let char_index = match record.char2idx {
            CharIndexRecord::Map(map) => CharIndex::try_from(map)?,
            CharIndexRecord::Literal(literal) => CharIndex::from_literal(&literal)?,
        };
        Self::from_input_shape(char_index, record.input_shape, record.architecture)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json =
            std::fs::read_to_string(path).map_err(|e| DeepIepError::artifact_load(path, e))?;
        // a truncated or non-JSON sidecar is a broken artifact, not bad metadata
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| DeepIepError::artifact_load(path, e))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        let record = SidecarRecord {
            char2idx: CharIndexRecord::Map(self.char_index.clone().into()),
            input_shape: self.input_shape(),
            architecture: self.architecture.clone(),
        };
        serde_json::to_string_pretty(&record)
            .map_err(|e| DeepIepError::MetadataParse(e.to_string()))
    }

    /// `[max_length + 1, alphabet + 1]`, the shape of one encoded sequence.
    pub fn input_shape(&self) -> [usize; 2] {
        [self.max_length + 1, self.char_index.len() + 1]
    }

    pub fn feature_width(&self) -> usize {
        self.char_index.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_length_is_timesteps_minus_one() -> Result<()> {
        let json = r#"{"char2idx": {"A": 0, "B": 1, "X": 2}, "input_shape": [4, 4]}"#;
        let config = ModelConfig::from_json(json)?;
        assert_eq!(config.max_length, 3);
        assert_eq!(config.input_shape(), [4, 4]);
        assert_eq!(config.architecture, RnnArchitecture::default());
        Ok(())
    }

    #[test]
    fn test_legacy_literal_sidecar() -> Result<()> {
        let json = r#"{
            "char2idx": "{'A': 0, 'C': 1, 'X': 2, 'Z': 3}",
            "input_shape": [11, 5],
            "architecture": {"cell": "gru", "units": [8, 4], "dense": [4], "activation": "tanh"}
        }"#;
        let config = ModelConfig::from_json(json)?;
        assert_eq!(config.max_length, 10);
        assert_eq!(config.char_index.get('Z'), Some(3));
        assert_eq!(config.architecture.cell, CellKind::Gru);
        assert_eq!(config.architecture.units, vec![8, 4]);
        assert_eq!(config.architecture.activation, DenseActivation::Tanh);
        Ok(())
    }

    #[test]
    fn test_bad_metadata() {
        let cases = [
            r#"{"char2idx": "{'A': 0", "input_shape": [4, 2]}"#,
            r#"{"char2idx": {"A": 0}, "input_shape": [4, 3]}"#,
            r#"{"char2idx": {"A": 0}, "input_shape": [0, 2]}"#,
            r#"{"char2idx": {"A": 0}, "input_shape": [4, 2], "architecture": {"units": []}}"#,
            r#"{"char2idx": {"A": 0}}"#,
            "not json",
        ];
        for json in cases {
            let err = ModelConfig::from_json(json).unwrap_err();
            assert!(matches!(err, DeepIepError::MetadataParse(_)), "{json}: {err}");
        }
    }

    #[test]
    fn test_bad_map_keeps_reason() {
        let cases = [
            (r#"{"char2idx": {"A": 5}, "input_shape": [4, 2]}"#, "padding column"),
            (r#"{"char2idx": {"AB": 0}, "input_shape": [4, 2]}"#, "AB"),
        ];
        for (json, reason) in cases {
            let err = ModelConfig::from_json(json).unwrap_err();
            assert!(matches!(err, DeepIepError::MetadataParse(_)), "{json}: {err}");
            assert!(err.to_string().contains(reason), "{json}: {err}");
            assert!(!err.to_string().contains("untagged"), "{json}: {err}");
        }
    }

    #[test]
    fn test_json_roundtrip() -> Result<()> {
        let config = ModelConfig::new(CharIndex::standard(), 1000, RnnArchitecture::default());
        let back = ModelConfig::from_json(&config.to_json()?)?;
        assert_eq!(back, config);
        assert_eq!(back.input_shape(), [1001, 23]);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_artifact_error() {
        let err = ModelConfig::from_file("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, DeepIepError::ArtifactLoad { .. }));
    }

    #[test]
    fn test_cell_kind_names() {
        assert_eq!(CellKind::Gru.to_string(), "gru");
        assert_eq!("lstm".parse::<CellKind>().unwrap(), CellKind::Lstm);
    }
}
