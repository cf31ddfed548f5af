use log::{debug, info};

use super::classify::{CarbonClass, Classification};
use super::series::{ColumnValues, ExportColumn, Group, Measure, QueryResult, Series, XAxis};
use crate::data::model::{SpeciesTable, TIMESTEP};
use crate::error::{Result, SpeciesError};

pub const ORGANIC_COUNT: &str = "Organic_Count";
pub const NON_ORGANIC_COUNT: &str = "Non_Organic_Count";
pub const TEMPERATURE: &str = "Temperature";

/// `value / total` as a percentage, with `0 / 0` reported as `0`.
pub fn percentage(value: f64, total: f64) -> f64 {
    let p = value / total * 100.0;
    if p.is_nan() {
        0.0
    } else {
        p
    }
}

/// A column headed for both the plot and the export view.
struct Column {
    label: String,
    export_name: String,
    values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Owns a loaded table, its species classification and the derived count
/// columns, and answers plot queries against them.
///
/// Queries take `&self` and return a fresh [`QueryResult`]; the only mutation
/// after construction is switching the index column with
/// [`Aggregator::set_temperature_axis`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    table: SpeciesTable,
    classification: Classification,
    index: String,
}

impl Aggregator {
    /// Classify the table's columns and add the six derived count columns.
    pub fn build(mut table: SpeciesTable) -> Result<Self> {
        if !table.has_column(TIMESTEP) {
            return Err(SpeciesError::MissingIndex {
                column: TIMESTEP.to_string(),
            });
        }

        let classification = Classification::from_columns(table.column_names());
        debug!("organic columns: {:?}", classification.organic);
        for class in CarbonClass::ALL {
            debug!("{class} columns: {:?}", classification.bucket(class));
        }
        debug!("non-organic columns: {:?}", classification.non_organic);

        let organic = table.row_sums(&classification.organic);
        table.set_column(ORGANIC_COUNT, organic);
        let non_organic = table.row_sums(&classification.non_organic);
        table.set_column(NON_ORGANIC_COUNT, non_organic);
        for class in CarbonClass::ALL {
            let sums = table.row_sums(classification.bucket(class));
            table.set_column(class.count_column(), sums);
        }

        info!(
            "Classified {} organic and {} non-organic species",
            classification.organic.len(),
            classification.non_organic.len()
        );

        Ok(Aggregator {
            table,
            classification,
            index: TIMESTEP.to_string(),
        })
    }

    pub fn table(&self) -> &SpeciesTable {
        &self.table
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// Name of the column used as x axis.
    pub fn index_column(&self) -> &str {
        &self.index
    }

    /// Replace the x axis by `Temperature = initial + rate * Timestep`.
    ///
    /// The temperature is always computed from `Timestep`, so applying the
    /// same parameters twice gives the same column.
    pub fn set_temperature_axis(&mut self, initial_temp: &str, heating_rate: &str) -> Result<()> {
        let initial = parse_parameter("initial temperature", initial_temp)?;
        let rate = parse_parameter("heating rate", heating_rate)?;

        let temperature: Vec<f64> = self
            .column(TIMESTEP)
            .iter()
            .map(|t| initial + rate * t)
            .collect();
        self.table.set_column(TEMPERATURE, temperature);
        self.index = TEMPERATURE.to_string();
        info!("Index switched to {TEMPERATURE} (initial {initial}, rate {rate})");
        Ok(())
    }

    /// Position of the record with the largest index value.  Ties resolve to
    /// the first such record; `None` for an empty table.
    pub fn end_state_index(&self) -> Option<usize> {
        self.column(&self.index)
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    /// Dispatch a query by group and measure.
    pub fn query(&self, group: Group, measure: Measure) -> QueryResult {
        match (group, measure) {
            (Group::Organic, Measure::Content) => self.organic_content(),
            (Group::Organic, Measure::Amount) => self.organic_amount(),
            (Group::Inorganic, Measure::Content) => self.inorganic_content(),
            (Group::Inorganic, Measure::Amount) => self.inorganic_amount(),
            (Group::Classification, Measure::Content) => self.organic_classification_content(),
            (Group::Classification, Measure::Amount) => self.organic_classification_amount(),
            (Group::Products, Measure::Content) => self.organic_products(),
            (Group::Products, Measure::Amount) => self.organic_products_amount(),
            (Group::ClassificationProducts, Measure::Content) => {
                self.organic_classification_products()
            }
            (Group::ClassificationProducts, Measure::Amount) => {
                self.organic_classification_products_amount()
            }
        }
    }

    // -- Time series --

    /// Each organic species as a percentage of `Organic_Count`.
    pub fn organic_content(&self) -> QueryResult {
        let columns = self.percentages_of(&self.classification.organic, ORGANIC_COUNT);
        self.time_series("Organic species content", Measure::Content, columns)
    }

    /// Each non-organic species as a percentage of `Non_Organic_Count`.
    pub fn inorganic_content(&self) -> QueryResult {
        let columns = self.percentages_of(&self.classification.non_organic, NON_ORGANIC_COUNT);
        self.time_series("Inorganic species content", Measure::Content, columns)
    }

    /// Each carbon bucket as a percentage of `Organic_Count`.
    pub fn organic_classification_content(&self) -> QueryResult {
        let total = self.column(ORGANIC_COUNT);
        let columns = CarbonClass::ALL
            .into_iter()
            .map(|class| Column {
                label: class.label().to_string(),
                export_name: class.percentage_column().to_string(),
                values: self
                    .column(class.count_column())
                    .iter()
                    .zip(total)
                    .map(|(v, t)| percentage(*v, *t))
                    .collect(),
            })
            .collect();
        self.time_series("Organic classification content", Measure::Content, columns)
    }

    pub fn organic_amount(&self) -> QueryResult {
        let columns = self.amounts_of(&self.classification.organic);
        self.time_series("Organic species count", Measure::Amount, columns)
    }

    pub fn inorganic_amount(&self) -> QueryResult {
        let columns = self.amounts_of(&self.classification.non_organic);
        self.time_series("Inorganic species count", Measure::Amount, columns)
    }

    pub fn organic_classification_amount(&self) -> QueryResult {
        let columns = CarbonClass::ALL
            .into_iter()
            .map(|class| Column {
                label: class.label().to_string(),
                export_name: class.count_column().to_string(),
                values: self.column(class.count_column()).to_vec(),
            })
            .collect();
        self.time_series("Organic classification count", Measure::Amount, columns)
    }

    /// Total organic and non-organic counts over time.
    pub fn group_totals(&self) -> QueryResult {
        let columns = [("Organic", ORGANIC_COUNT), ("Non-Organic", NON_ORGANIC_COUNT)]
            .into_iter()
            .map(|(label, name)| Column {
                label: label.to_string(),
                export_name: name.to_string(),
                values: self.column(name).to_vec(),
            })
            .collect();
        self.time_series("Organic and inorganic totals", Measure::Amount, columns)
    }

    // -- End-state snapshots --

    /// Organic species present at the end state, as a percentage of the
    /// end-state organic total.  Species at zero are left out.
    pub fn organic_products(&self) -> QueryResult {
        let (names, values) = self.end_state_products();
        let total: f64 = values.iter().sum();
        let values = values.iter().map(|v| percentage(*v, total)).collect();
        self.snapshot("Final organic products content", "Species", Measure::Content, names, values)
    }

    /// Organic species present at the end state, as raw counts.
    pub fn organic_products_amount(&self) -> QueryResult {
        let (names, values) = self.end_state_products();
        self.snapshot("Final organic products count", "Species", Measure::Amount, names, values)
    }

    /// Carbon bucket totals at the end state, as a percentage of the
    /// end-state organic total.  All four buckets are always present.
    pub fn organic_classification_products(&self) -> QueryResult {
        let (names, values) = self.end_state_buckets();
        let total = self.end_state_organic_total();
        let values = values.iter().map(|v| percentage(*v, total)).collect();
        self.snapshot(
            "Final organic product classification content",
            "Class",
            Measure::Content,
            names,
            values,
        )
    }

    pub fn organic_classification_products_amount(&self) -> QueryResult {
        let (names, values) = self.end_state_buckets();
        self.snapshot(
            "Final organic product classification count",
            "Class",
            Measure::Amount,
            names,
            values,
        )
    }

    // -- Helpers --

    /// Column values, empty when the column is absent.
    fn column(&self, name: &str) -> &[f64] {
        self.table.column(name).unwrap_or(&[])
    }

    fn value_at(&self, name: &str, row: usize) -> f64 {
        self.column(name).get(row).copied().unwrap_or(0.0)
    }

    fn percentages_of(&self, species: &[String], total_column: &str) -> Vec<Column> {
        let total = self.column(total_column);
        species
            .iter()
            .map(|name| Column {
                label: name.clone(),
                export_name: format!("{name}_percentages"),
                values: self
                    .column(name)
                    .iter()
                    .zip(total)
                    .map(|(v, t)| percentage(*v, *t))
                    .collect(),
            })
            .collect()
    }

    fn amounts_of(&self, species: &[String]) -> Vec<Column> {
        species
            .iter()
            .map(|name| Column {
                label: name.clone(),
                export_name: name.clone(),
                values: self.column(name).to_vec(),
            })
            .collect()
    }

    fn x_label(&self) -> &'static str {
        if self.index == TEMPERATURE {
            "Temperature (°C)"
        } else {
            "Time (ps)"
        }
    }

    fn time_series(&self, title: &str, measure: Measure, columns: Vec<Column>) -> QueryResult {
        let x = self.column(&self.index).to_vec();

        let mut export = Vec::with_capacity(columns.len() + 1);
        export.push(ExportColumn {
            name: self.index.clone(),
            values: ColumnValues::Numeric(x.clone()),
        });
        let mut series = Vec::with_capacity(columns.len());
        for col in columns {
            export.push(ExportColumn {
                name: col.export_name,
                values: ColumnValues::Numeric(col.values.clone()),
            });
            series.push(Series {
                label: col.label,
                values: col.values,
            });
        }

        QueryResult {
            title: title.to_string(),
            x_label: self.x_label().to_string(),
            y_label: measure.y_label().to_string(),
            x: XAxis::Numeric(x),
            series,
            export,
        }
    }

    fn snapshot(
        &self,
        title: &str,
        category: &str,
        measure: Measure,
        names: Vec<String>,
        values: Vec<f64>,
    ) -> QueryResult {
        let value_name = match measure {
            Measure::Content => "Percentage",
            Measure::Amount => "Count",
        };
        QueryResult {
            title: title.to_string(),
            x_label: category.to_string(),
            y_label: measure.y_label().to_string(),
            x: XAxis::Categories(names.clone()),
            series: vec![Series {
                label: value_name.to_string(),
                values: values.clone(),
            }],
            export: vec![
                ExportColumn {
                    name: category.to_string(),
                    values: ColumnValues::Text(names),
                },
                ExportColumn {
                    name: value_name.to_string(),
                    values: ColumnValues::Numeric(values),
                },
            ],
        }
    }

    fn end_state_products(&self) -> (Vec<String>, Vec<f64>) {
        let Some(row) = self.end_state_index() else {
            return (Vec::new(), Vec::new());
        };
        self.classification
            .organic
            .iter()
            .map(|name| (name.clone(), self.value_at(name, row)))
            .filter(|(_, v)| *v > 0.0)
            .unzip()
    }

    fn end_state_buckets(&self) -> (Vec<String>, Vec<f64>) {
        let row = self.end_state_index();
        CarbonClass::ALL
            .into_iter()
            .map(|class| {
                let v = row.map_or(0.0, |r| self.value_at(class.count_column(), r));
                (class.label().to_string(), v)
            })
            .unzip()
    }

    fn end_state_organic_total(&self) -> f64 {
        self.end_state_index()
            .map_or(0.0, |row| self.value_at(ORGANIC_COUNT, row))
    }
}

fn parse_parameter(name: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SpeciesError::InvalidParameter {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_species;
    use approx::assert_relative_eq;

    const EXAMPLE: &str = "\
# Timestep No_Moles No_Specs H2O CO2 C3H8
1000 5 3 10 2 1
";

    const RUN: &str = "\
# Timestep No_Moles No_Specs C16H34 H2
0 2 2 2 0
# Timestep No_Moles No_Specs C16H34 H2 C8H16 CH4
1000 6 4 1 1 2 2
# Timestep No_Moles No_Specs H2 C8H16 CH4 C45H92
2000 7 4 2 1 3 1
";

    fn aggregator(text: &str) -> Aggregator {
        Aggregator::build(parse_species(text).unwrap()).unwrap()
    }

    #[test]
    fn example_record() {
        let agg = aggregator(EXAMPLE);
        assert_relative_eq!(agg.table().column(TIMESTEP).unwrap()[0], 1.0);
        assert_eq!(agg.classification().organic, vec!["C3H8"]);
        assert_eq!(agg.classification().non_organic, vec!["H2O", "CO2"]);
        assert_eq!(agg.table().column(ORGANIC_COUNT), Some(&[1.0][..]));

        let result = agg.organic_content();
        let col = result.export_column("C3H8_percentages").unwrap();
        assert_eq!(col.values, ColumnValues::Numeric(vec![100.0]));
    }

    #[test]
    fn missing_timestep_is_rejected() {
        let table = parse_species("# x H2O\n4\n").unwrap();
        let err = Aggregator::build(table).unwrap_err();
        assert!(matches!(err, SpeciesError::MissingIndex { .. }));
    }

    #[test]
    fn derived_counts_are_row_sums() {
        let agg = aggregator(RUN);
        let t = agg.table();
        assert_eq!(t.column(ORGANIC_COUNT), Some(&[2.0, 5.0, 5.0][..]));
        assert_eq!(t.column(NON_ORGANIC_COUNT), Some(&[0.0, 1.0, 2.0][..]));
        assert_eq!(t.column("C1_C4_Count"), Some(&[0.0, 2.0, 3.0][..]));
        assert_eq!(t.column("C5_C13_Count"), Some(&[0.0, 2.0, 1.0][..]));
        assert_eq!(t.column("C14_C40_Count"), Some(&[2.0, 1.0, 0.0][..]));
        assert_eq!(t.column("C40p_Count"), Some(&[0.0, 0.0, 1.0][..]));
    }

    #[test]
    fn zero_total_gives_zero_percentages() {
        let agg = aggregator(RUN);
        let result = agg.inorganic_content();
        let h2 = result.series("H2").unwrap();
        assert_eq!(h2.values, vec![0.0, 100.0, 100.0]);
    }

    #[test]
    fn organic_percentages_sum_to_hundred() {
        let agg = aggregator(RUN);
        let result = agg.organic_content();
        for row in 0..3 {
            let sum: f64 = result.series.iter().map(|s| s.values[row]).sum();
            assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn classification_content_buckets_in_order() {
        let agg = aggregator(RUN);
        let result = agg.organic_classification_content();
        let labels: Vec<&str> = result.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["C1-C4", "C5-C13", "C14-C40", "C40+"]);
        assert_eq!(result.series[0].values, vec![0.0, 40.0, 60.0]);
        for row in 0..3 {
            let sum: f64 = result.series.iter().map(|s| s.values[row]).sum();
            assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn amount_queries_export_raw_columns() {
        let agg = aggregator(RUN);
        let result = agg.organic_classification_amount();
        assert_eq!(result.export[0].name, TIMESTEP);
        assert!(result.export_column("C40p_Count").is_some());
        assert_eq!(result.y_label, "Count");

        let result = agg.inorganic_amount();
        assert_eq!(result.series("H2").unwrap().values, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn products_skip_species_absent_at_end() {
        let agg = aggregator(RUN);
        let result = agg.organic_products_amount();
        assert_eq!(
            result.x,
            XAxis::Categories(vec!["C8H16".into(), "CH4".into(), "C45H92".into()])
        );
        assert_eq!(result.series[0].values, vec![1.0, 3.0, 1.0]);

        let result = agg.organic_products();
        assert_eq!(result.series[0].values, vec![20.0, 60.0, 20.0]);
    }

    #[test]
    fn classification_products_keep_empty_buckets() {
        let agg = aggregator(RUN);
        let result = agg.organic_classification_products_amount();
        assert_eq!(result.series[0].values, vec![3.0, 1.0, 0.0, 1.0]);
        let result = agg.organic_classification_products();
        assert_eq!(result.series[0].values, vec![60.0, 20.0, 0.0, 20.0]);
    }

    #[test]
    fn temperature_axis_replaces_index() {
        let mut agg = aggregator("# T Timestep\n1000\n# T Timestep\n2000\n");
        agg.set_temperature_axis("300", "10").unwrap();
        assert_eq!(agg.index_column(), TEMPERATURE);
        assert_eq!(agg.table().column(TEMPERATURE), Some(&[310.0, 320.0][..]));

        agg.set_temperature_axis("300", "10").unwrap();
        assert_eq!(agg.table().column(TEMPERATURE), Some(&[310.0, 320.0][..]));

        let result = agg.organic_amount();
        assert_eq!(result.x, XAxis::Numeric(vec![310.0, 320.0]));
        assert_eq!(result.export[0].name, TEMPERATURE);
        assert_eq!(result.x_label, "Temperature (°C)");
    }

    #[test]
    fn invalid_temperature_parameters() {
        let mut agg = aggregator(RUN);
        let err = agg.set_temperature_axis("warm", "10").unwrap_err();
        assert!(matches!(err, SpeciesError::InvalidParameter { name: "initial temperature", .. }));
        let err = agg.set_temperature_axis("300", "").unwrap_err();
        assert!(matches!(err, SpeciesError::InvalidParameter { name: "heating rate", .. }));
        assert_eq!(agg.index_column(), TIMESTEP);
    }

    #[test]
    fn end_state_follows_active_index() {
        let mut agg = aggregator(RUN);
        assert_eq!(agg.end_state_index(), Some(2));

        // Cooling run: the highest temperature is the first record.
        agg.set_temperature_axis("500", "-10").unwrap();
        assert_eq!(agg.end_state_index(), Some(0));
        let result = agg.organic_products_amount();
        assert_eq!(result.x, XAxis::Categories(vec!["C16H34".into()]));
    }

    #[test]
    fn organic_content_is_zero_where_no_organics() {
        let agg = aggregator(
            "# T Timestep CH4 C2H6 H2O\n0 0 0 5\n# T Timestep CH4 C2H6 H2O\n1000 1 3 2\n",
        );
        let result = agg.organic_content();
        assert_eq!(result.series("CH4").unwrap().values, vec![0.0, 25.0]);
        assert_eq!(result.series("C2H6").unwrap().values, vec![0.0, 75.0]);

        let buckets = agg.organic_classification_content();
        assert!(buckets.series.iter().all(|s| s.values[0] == 0.0));
    }

    #[test]
    fn end_state_without_organics() {
        let agg = aggregator("# T Timestep CH4 H2O\n0 4 1\n# T Timestep CH4 H2O\n1000 0 5\n");

        for result in [agg.organic_products(), agg.organic_products_amount()] {
            assert!(result.x.is_empty());
            assert!(result.series[0].values.is_empty());
        }

        let result = agg.organic_classification_products();
        assert_eq!(
            result.x,
            XAxis::Categories(vec![
                "C1-C4".into(),
                "C5-C13".into(),
                "C14-C40".into(),
                "C40+".into()
            ])
        );
        assert_eq!(result.series[0].values, vec![0.0; 4]);
        let result = agg.organic_classification_products_amount();
        assert_eq!(result.series[0].values, vec![0.0; 4]);
    }

    #[test]
    fn end_state_skips_nan_index_values() {
        let agg = aggregator("# T Timestep CH4\n1000 1\n# T Timestep CH4\nNaN 5\n");
        assert_eq!(agg.end_state_index(), Some(0));
        assert_eq!(agg.organic_products_amount().series[0].values, vec![1.0]);

        let agg = aggregator("# T Timestep CH4\nNaN 1\n");
        assert_eq!(agg.end_state_index(), None);
    }

    #[test]
    fn end_state_ties_pick_first_record() {
        let agg = aggregator("# T Timestep CH4\n1000 1\n# T Timestep CH4\n1000 5\n");
        assert_eq!(agg.end_state_index(), Some(0));
    }

    #[test]
    fn group_totals_series() {
        let agg = aggregator(RUN);
        let result = agg.group_totals();
        assert_eq!(result.series("Organic").unwrap().values, vec![2.0, 5.0, 5.0]);
        assert_eq!(result.series("Non-Organic").unwrap().values, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn query_dispatch_matches_named_operations() {
        let agg = aggregator(RUN);
        assert_eq!(agg.query(Group::Organic, Measure::Content), agg.organic_content());
        assert_eq!(
            agg.query(Group::ClassificationProducts, Measure::Amount),
            agg.organic_classification_products_amount()
        );
    }
}
