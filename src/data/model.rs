use std::collections::{BTreeMap, HashMap};

/// Name of the column every species.out record starts with.
pub const TIMESTEP: &str = "Timestep";

/// Columns that carry bookkeeping rather than a species population.
pub const RESERVED_COLUMNS: [&str; 3] = [TIMESTEP, "No_Moles", "No_Specs"];

// ---------------------------------------------------------------------------
// Record – one header/data line pair
// ---------------------------------------------------------------------------

/// A single simulation snapshot as read from the file.
///
/// Values are kept in header order so the table can preserve the order in
/// which column names were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub values: Vec<(String, f64)>,
}

impl Record {
    /// Value for `column`, if this record carries it.  A name repeated in one
    /// header keeps the last value, like a dictionary insert would.
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, v)| *v)
    }
}

// ---------------------------------------------------------------------------
// SpeciesTable – column-oriented view of all records
// ---------------------------------------------------------------------------

/// Column-oriented table of species populations.
///
/// Every column has exactly `len()` values.  Cells a record did not mention
/// are filled with `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesTable {
    column_names: Vec<String>,
    columns: BTreeMap<String, Vec<f64>>,
    n_records: usize,
}

impl SpeciesTable {
    /// Build the table from parsed records, taking the union of their columns.
    ///
    /// One pass over the records: a column first seen at record `r` is
    /// back-filled with `r` zeros, and columns a record does not mention get
    /// a zero for it.
    pub fn from_records(records: &[Record]) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut column_names: Vec<String> = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();

        for (row, rec) in records.iter().enumerate() {
            for (name, v) in &rec.values {
                let pos = *positions.entry(name.as_str()).or_insert_with(|| {
                    column_names.push(name.clone());
                    values.push(vec![0.0; row]);
                    values.len() - 1
                });
                let col = &mut values[pos];
                if col.len() > row {
                    // Repeated name within one header: last value wins.
                    col[row] = *v;
                } else {
                    col.push(*v);
                }
            }
            for col in values.iter_mut().filter(|c| c.len() == row) {
                col.push(0.0);
            }
        }

        let columns = column_names.iter().cloned().zip(values).collect();

        SpeciesTable {
            column_names,
            columns,
            n_records: records.len(),
        }
    }

    /// Column names in first-seen order.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of records (rows).
    pub fn len(&self) -> usize {
        self.n_records
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.n_records == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// All values of a column, aligned by record index.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.columns.get_mut(name)
    }

    /// Insert or replace a column.  Shorter inputs are padded with zeros and
    /// longer ones truncated so the length invariant holds.
    pub fn set_column(&mut self, name: &str, mut values: Vec<f64>) {
        values.resize(self.n_records, 0.0);
        if !self.columns.contains_key(name) {
            self.column_names.push(name.to_string());
        }
        self.columns.insert(name.to_string(), values);
    }

    /// Row-wise sum of the given columns.  Unknown names contribute nothing.
    pub fn row_sums(&self, names: &[String]) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_records];
        for col in names.iter().filter_map(|n| self.column(n)) {
            for (acc, v) in sums.iter_mut().zip(col) {
                *acc += v;
            }
        }
        sums
    }
}
