//! deepiep-io
//!
//! Reading sequence tables and writing them back with a prediction column.
pub mod csv;

pub use csv::{
    read_table, sequence_column, set_prediction_column, write_table, Precision,
    DEFAULT_PREDICTION_COLUMN, DEFAULT_SEQUENCE_COLUMN,
};
