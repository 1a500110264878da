//! deepiep-core
//!
//! Sequence-side building blocks for isoelectric point prediction: the residue alphabet and its
//! column map, the model metadata sidecar, and the one-hot encoder that turns amino-acid strings
//! into model inputs.
//!
//! ```
//! use deepiep_core::{CharIndex, SequenceEncoder};
//!
//! let index = CharIndex::standard();
//! let encoder = SequenceEncoder::new(&index, 100, true);
//! let encoded = encoder.encode("MKTAYIAKQRC").unwrap();
//! assert_eq!(encoded.dim(), (101, 23));
//! ```
pub mod alphabet;
pub mod config;
pub mod encoding;
pub mod error;

pub use alphabet::{CharIndex, SpecialResidue, STANDARD_ALPHABET};
pub use config::{CellKind, DenseActivation, ModelConfig, RnnArchitecture};
pub use encoding::SequenceEncoder;
pub use error::{DeepIepError, Result};
