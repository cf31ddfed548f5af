use std::path::Path;

use log::{info, warn};

use super::model::{Record, SpeciesTable, TIMESTEP};
use crate::error::{Result, SpeciesError};

/// Source timesteps are divided by this factor on load.
pub const TIMESTEP_SCALE: f64 = 1000.0;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a ReaxFF `species.out` file into a [`SpeciesTable`].
///
/// The file is a sequence of line pairs:
///
/// ```text
/// # Timestep  No_Moles  No_Specs  H2O  CH4
///   1000      12        2         10   2
/// ```
///
/// The first token of each header line is ignored, the remaining tokens name
/// the values of the following data line by position.
pub fn load_file(path: &Path) -> Result<SpeciesTable> {
    let text = std::fs::read_to_string(path).map_err(|source| SpeciesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_species(&text)?;
    info!(
        "Loaded {} records with {} columns from {}",
        table.len(),
        table.column_names().len(),
        path.display()
    );
    Ok(table)
}

/// Parse the text of a species file.  See [`load_file`].
pub fn parse_species(text: &str) -> Result<SpeciesTable> {
    let records = parse_records(text)?;
    let mut table = SpeciesTable::from_records(&records);
    if let Some(timesteps) = table.column_mut(TIMESTEP) {
        for t in timesteps.iter_mut() {
            *t /= TIMESTEP_SCALE;
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Line pairing
// ---------------------------------------------------------------------------

fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.len() % 2 != 0 {
        if let Some(last) = lines.last().filter(|l| !l.trim().is_empty()) {
            warn!(
                "Line {} has no data line after it and is ignored: {}",
                lines.len(),
                last.trim()
            );
        }
        lines.push("");
    }

    let mut records = Vec::with_capacity(lines.len() / 2);
    for (pair_no, pair) in lines.chunks(2).enumerate() {
        let data_line_no = pair_no * 2 + 2;
        if let Some(record) = parse_pair(pair[0], pair[1], data_line_no)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parse one header/data pair.  Returns `None` for a blank data line.
fn parse_pair(header: &str, data: &str, line_no: usize) -> Result<Option<Record>> {
    let names: Vec<&str> = header.split_whitespace().skip(1).collect();
    let tokens: Vec<&str> = data.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() != names.len() {
        warn!(
            "Line {line_no}: {} values for {} column names, pairing by position",
            tokens.len(),
            names.len()
        );
    }

    let values = names
        .iter()
        .zip(&tokens)
        .map(|(name, tok)| {
            tok.parse::<f64>()
                .map(|v| (name.to_string(), v))
                .map_err(|_| SpeciesError::Parse {
                    line: line_no,
                    token: tok.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(Record { values }))
}
