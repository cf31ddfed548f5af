use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use log::info;

use crate::error::{Result, SpeciesError};
use crate::species::QueryResult;

/// File format for a query export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess the format from the file extension, CSV unless it says `.json`.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

pub fn write(result: &QueryResult, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(result, path),
        ExportFormat::Json => write_json(result, path),
    }
}

/// Write the export view as CSV: a header of column names, then one row per
/// position.  Columns shorter than the longest one end in empty cells.
pub fn write_csv(result: &QueryResult, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| SpeciesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    writer.write_record(result.export.iter().map(|c| c.name.as_str()))?;
    let rows = result.export_rows();
    for i in 0..rows {
        writer.write_record(result.export.iter().map(|c| c.values.cell(i)))?;
    }
    writer.flush().map_err(|source| SpeciesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Exported {rows} rows of '{}' to {}", result.title, path.display());
    Ok(())
}

/// Write the whole result (labels, x axis, series and export view) as JSON.
pub fn write_json(result: &QueryResult, path: &Path) -> Result<()> {
    let io_err = |source| SpeciesError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush().map_err(io_err)?;
    info!("Exported '{}' to {}", result.title, path.display());
    Ok(())
}
