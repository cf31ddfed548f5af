//! Species classification and aggregation over a loaded [`SpeciesTable`].
//!
//! [`SpeciesTable`]: crate::data::model::SpeciesTable

pub mod aggregator;
pub mod classify;
pub mod series;

pub use aggregator::Aggregator;
pub use classify::{CarbonClass, Classification};
pub use series::{Group, Measure, QueryResult};
