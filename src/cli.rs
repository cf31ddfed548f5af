use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use reaxff_species::export::{self, ExportFormat};
use reaxff_species::species::series::ColumnValues;
use reaxff_species::{load_file, Aggregator, Group, Measure, QueryResult};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "reaxff-species")]
#[command(about = "Organic / inorganic species analysis of ReaxFF species.out files")]
pub struct Args {
    /// species.out file to analyse
    pub file: PathBuf,

    /// Species grouping to report
    #[arg(short, long, value_enum, default_value = "organic")]
    pub group: Group,

    /// Report percentages (content) or raw counts (amount)
    #[arg(short, long, value_enum, default_value = "content")]
    pub measure: Measure,

    /// Initial temperature (°C); switches the x axis to temperature
    #[arg(long, requires = "heating_rate", allow_hyphen_values = true)]
    pub initial_temp: Option<String>,

    /// Heating rate (°C/ps)
    #[arg(long, requires = "initial_temp", allow_hyphen_values = true)]
    pub heating_rate: Option<String>,

    /// Write the result table to this file
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Export format (default: from the file extension)
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,
}

/// Paths pasted from a file manager often arrive wrapped in double quotes.
fn unquote(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    match s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => PathBuf::from(inner),
        None => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

pub fn run(args: Args) -> Result<()> {
    let path = unquote(&args.file);
    let table = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    if table.is_empty() {
        bail!("{} contains no records", path.display());
    }
    let mut aggregator = Aggregator::build(table).context("classifying species")?;

    if let (Some(initial), Some(rate)) = (&args.initial_temp, &args.heating_rate) {
        aggregator
            .set_temperature_axis(initial, rate)
            .context("setting temperature axis")?;
    }

    let result = aggregator.query(args.group, args.measure);
    print_result(&result);

    if let Some(out) = &args.export {
        let format = args.format.unwrap_or_else(|| ExportFormat::from_path(out));
        export::write(&result, out, format)
            .with_context(|| format!("exporting to {}", out.display()))?;
    }
    Ok(())
}

/// Print the export view as an aligned text table.
fn print_result(result: &QueryResult) {
    println!("{}", result.title);
    println!("x: {}   y: {}", result.x_label, result.y_label);
    if result.x.is_empty() {
        println!("(no data)");
        return;
    }

    let widths: Vec<usize> = result
        .export
        .iter()
        .map(|c| {
            (0..c.values.len())
                .map(|i| format_cell(&c.values, i).len())
                .chain(std::iter::once(c.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = result
        .export
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:>w$}", c.name, w = *w))
        .collect();
    println!("{}", header.join("  "));

    for i in 0..result.export_rows() {
        let row: Vec<String> = result
            .export
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", format_cell(&c.values, i), w = *w))
            .collect();
        println!("{}", row.join("  "));
    }
}

fn format_cell(values: &ColumnValues, i: usize) -> String {
    match values {
        ColumnValues::Numeric(v) => v.get(i).map(|x| format!("{x:.3}")).unwrap_or_default(),
        ColumnValues::Text(v) => v.get(i).cloned().unwrap_or_default(),
    }
}
