use clap::ValueEnum;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Query selection
// ---------------------------------------------------------------------------

/// Which species grouping a query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Group {
    /// Each organic species over time.
    Organic,
    /// Each non-organic species over time.
    Inorganic,
    /// The four carbon buckets over time.
    Classification,
    /// Organic species present at the end state.
    Products,
    /// Carbon bucket totals at the end state.
    ClassificationProducts,
}

/// How values are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    /// Percentage of the group total.
    Content,
    /// Raw molecule counts.
    Amount,
}

impl Measure {
    pub fn y_label(self) -> &'static str {
        match self {
            Measure::Content => "Content (%)",
            Measure::Amount => "Count",
        }
    }
}

// ---------------------------------------------------------------------------
// Query result
// ---------------------------------------------------------------------------

/// X values shared by every series of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum XAxis {
    /// Index column values (time series).
    Numeric(Vec<f64>),
    /// Bar categories (end-state snapshots).
    Categories(Vec<String>),
}

impl XAxis {
    pub fn len(&self) -> usize {
        match self {
            XAxis::Numeric(v) => v.len(),
            XAxis::Categories(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One labelled line or bar set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell `i` rendered for a text export, empty past the end.
    pub fn cell(&self, i: usize) -> String {
        match self {
            ColumnValues::Numeric(v) => v.get(i).map(f64::to_string).unwrap_or_default(),
            ColumnValues::Text(v) => v.get(i).cloned().unwrap_or_default(),
        }
    }
}

/// A named column of the export view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportColumn {
    pub name: String,
    pub values: ColumnValues,
}

/// Everything a presentation layer needs to draw or export one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: XAxis,
    pub series: Vec<Series>,
    pub export: Vec<ExportColumn>,
}

impl QueryResult {
    /// Series with the given label.
    pub fn series(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Export column with the given name.
    pub fn export_column(&self, name: &str) -> Option<&ExportColumn> {
        self.export.iter().find(|c| c.name == name)
    }

    /// Number of rows in the export view (its longest column).
    pub fn export_rows(&self) -> usize {
        self.export.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }
}
