use super::commands;
use anyhow::Context;
use clap::Parser;
use deepiep_io::{Precision, DEFAULT_PREDICTION_COLUMN, DEFAULT_SEQUENCE_COLUMN};
use deepiep_models::{Backend, DeepIep, LoadOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "DeepIEP: Prediction of isoelectric point (pI/IEP) using recurrent neural networks (RNNs)",
    long_about = None
)]
pub struct Cli {
    /// Uppercase amino acid sequences to predict (Z = cyscam modified C, X = unknown)
    #[arg(short, long, num_args = 0..)]
    sequence: Vec<String>,

    /// CSV file with sequences to predict; predictions are written back into it
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Write full float precision instead of one decimal when rewriting the CSV file
    #[arg(long, alias = "full_precision")]
    full_precision: bool,

    /// Treat every C as the alkylated cysteine Z
    #[arg(long)]
    cyscam: bool,

    /// Model base path; `.json` and `.safetensors` (or `.onnx`) are appended
    #[arg(short, long, env = "DEEPIEP_MODEL", default_value = "Models/default")]
    model: PathBuf,

    /// CSV column holding the sequences
    #[arg(long, default_value = DEFAULT_SEQUENCE_COLUMN)]
    column: String,

    /// CSV column the predictions are written to
    #[arg(long, default_value = DEFAULT_PREDICTION_COLUMN)]
    output_column: String,

    #[arg(long, value_enum, default_value_t = Backend::Candle)]
    backend: Backend,

    /// Run on CPU even when an accelerator is available
    #[arg(long)]
    cpu: bool,
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        if self.sequence.is_empty() && self.file.is_none() {
            println!("-h for usage");
            return Ok(());
        }

        let options = LoadOptions {
            cyscam: self.cyscam,
            backend: self.backend,
            cpu: self.cpu,
        };
        let model = DeepIep::load(&self.model, &options)
            .with_context(|| format!("failed to load model {}", self.model.display()))?;

        if !self.sequence.is_empty() {
            commands::predict::sequences(&model, &self.sequence, &mut std::io::stdout().lock())?;
        }
        if let Some(file) = &self.file {
            commands::predict::csv_file(
                &model,
                file,
                &self.column,
                &self.output_column,
                Precision::from_full_precision(self.full_precision),
            )?;
        }
        Ok(())
    }
}
