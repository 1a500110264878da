use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeepIepError>;

#[derive(Debug, Error)]
pub enum DeepIepError {
    /// The model artifact is missing, unreadable, or does not match its declared architecture.
    #[error("failed to load model artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    /// The character index map (or the input shape derived from it) is malformed.
    #[error("invalid model metadata: {0}")]
    MetadataParse(String),

    #[error("unknown residue '{character}' at position {position}")]
    UnknownCharacter { character: char, position: usize },

    #[error("sequence length {length} exceeds the model maximum of {max_length}")]
    LengthExceeded { length: usize, max_length: usize },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl DeepIepError {
    pub fn artifact_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
