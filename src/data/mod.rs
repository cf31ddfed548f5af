/// Data layer: species.out parsing and the column-oriented table.
///
/// Architecture:
/// ```text
///    species.out
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  pair header/data lines → Vec<Record>
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SpeciesTable │  column name → values, zero-filled, Timestep / 1000
///   └──────────────┘
///        │
///        ▼
///   species::Aggregator
/// ```

pub mod loader;
pub mod model;
