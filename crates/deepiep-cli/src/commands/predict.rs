use anyhow::{Context, Result};
use deepiep_io::{read_table, sequence_column, set_prediction_column, write_table, Precision};
use deepiep_models::DeepIep;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Print each sequence with its prediction to one decimal, after a blank line.
pub fn sequences<W: Write>(model: &DeepIep, sequences: &[String], out: &mut W) -> Result<()> {
    writeln!(out)?;
    for sequence in sequences {
        let value = model
            .predict_one(sequence)
            .with_context(|| format!("failed to predict {sequence}"))?;
        writeln!(out, "{sequence} {value:.1}")?;
    }
    Ok(())
}

/// Predict every row of `path` in one batch and rewrite the file with the prediction column.
pub fn csv_file(
    model: &DeepIep,
    path: &Path,
    column: &str,
    output_column: &str,
    precision: Precision,
) -> Result<()> {
    let mut df = read_table(path)?;
    let sequences = sequence_column(&df, column)?;
    let values = model
        .predict_batch(&sequences)
        .with_context(|| format!("failed to predict sequences in {}", path.display()))?;
    set_prediction_column(&mut df, output_column, values)?;
    write_table(&mut df, path, precision)?;
    info!(path = %path.display(), rows = sequences.len(), "wrote predictions");
    Ok(())
}
