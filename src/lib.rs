//! Analysis of ReaxFF `species.out` population files.
//!
//! ```text
//!  load_file ─▶ SpeciesTable ─▶ Aggregator::build ─▶ query ─▶ QueryResult ─▶ export
//! ```

pub mod data;
pub mod error;
pub mod export;
pub mod species;

pub use data::loader::load_file;
pub use error::{Result, SpeciesError};
pub use species::{Aggregator, Group, Measure, QueryResult};
