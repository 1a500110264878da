//! One-hot sequence encoding.
//!
//! Each residue becomes one row of width `alphabet + 1`, the trailing column marking padding
//! rows past the end of the sequence. Rows are reversed before they reach a model: the networks
//! were trained on sequences fed right to left.
use crate::alphabet::CharIndex;
use crate::config::ModelConfig;
use crate::error::{DeepIepError, Result};
use ndarray::{s, stack, Array2, Array3, ArrayView2, Axis};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy)]
pub struct SequenceEncoder<'a> {
    char_index: &'a CharIndex,
    max_length: usize,
    cyscam: bool,
}

impl<'a> SequenceEncoder<'a> {
    pub fn new(char_index: &'a CharIndex, max_length: usize, cyscam: bool) -> Self {
        Self {
            char_index,
            max_length,
            cyscam,
        }
    }

    pub fn from_config(config: &'a ModelConfig, cyscam: bool) -> Self {
        Self::new(&config.char_index, config.max_length, cyscam)
    }

    /// `(max_length + 1, alphabet + 1)`
    pub fn shape(&self) -> (usize, usize) {
        (self.max_length + 1, self.char_index.len() + 1)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn cyscam(&self) -> bool {
        self.cyscam
    }

    /// Apply the cysteine-alkylation substitution (`C` -> `Z`) when enabled.
    pub fn prepare<'s>(&self, sequence: &'s str) -> Cow<'s, str> {
        if self.cyscam && sequence.contains('C') {
            Cow::Owned(sequence.replace('C', "Z"))
        } else {
            Cow::Borrowed(sequence)
        }
    }

    /// One-hot rows in sequence order, without substitution or reversal.
    pub fn vectorize(&self, sequence: &str) -> Result<Array2<f32>> {
        let length = sequence.chars().count();
        if length > self.max_length {
            return Err(DeepIepError::LengthExceeded {
                length,
                max_length: self.max_length,
            });
        }
        let mut vec = Array2::<f32>::zeros(self.shape());
        for (position, character) in sequence.chars().enumerate() {
            let column = self
                .char_index
                .get(character)
                .ok_or(DeepIepError::UnknownCharacter {
                    character,
                    position,
                })?;
            vec[[position, column]] = 1.0;
        }
        let padding = self.char_index.padding_column();
        vec.slice_mut(s![length.., padding]).fill(1.0);
        Ok(vec)
    }

    /// The model input for one sequence.
    pub fn encode(&self, sequence: &str) -> Result<Array2<f32>> {
        let vec = self.vectorize(&self.prepare(sequence))?;
        Ok(vec.slice(s![..;-1, ..]).as_standard_layout().into_owned())
    }

    /// Stack encoded sequences along a new leading batch axis, preserving input order.
    pub fn encode_batch<S: AsRef<str>>(&self, sequences: &[S]) -> Result<Array3<f32>> {
        let encoded = sequences
            .iter()
            .map(|seq| self.encode(seq.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if encoded.is_empty() {
            let (rows, cols) = self.shape();
            return Ok(Array3::zeros((0, rows, cols)));
        }
        let views: Vec<ArrayView2<f32>> = encoded.iter().map(|a| a.view()).collect();
        Ok(stack(Axis(0), &views)?)
    }
}
