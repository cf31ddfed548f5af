use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::data::model::RESERVED_COLUMNS;

/// First "C followed by digits" run in a species name.
static CARBON_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"C(\d+)").expect("carbon count pattern is valid"));

// ---------------------------------------------------------------------------
// Carbon-chain buckets
// ---------------------------------------------------------------------------

/// Carbon-chain length bucket of an organic species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CarbonClass {
    C1C4,
    C5C13,
    C14C40,
    C40Plus,
}

impl CarbonClass {
    /// All buckets in display order.
    pub const ALL: [CarbonClass; 4] = [
        CarbonClass::C1C4,
        CarbonClass::C5C13,
        CarbonClass::C14C40,
        CarbonClass::C40Plus,
    ];

    /// Bucket for a carbon count; a missing count falls into `C1-C4`.
    pub fn from_carbon_count(n: Option<u64>) -> Self {
        match n {
            None => CarbonClass::C1C4,
            Some(n) if n < 5 => CarbonClass::C1C4,
            Some(n) if n < 14 => CarbonClass::C5C13,
            Some(n) if n < 41 => CarbonClass::C14C40,
            Some(_) => CarbonClass::C40Plus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CarbonClass::C1C4 => "C1-C4",
            CarbonClass::C5C13 => "C5-C13",
            CarbonClass::C14C40 => "C14-C40",
            CarbonClass::C40Plus => "C40+",
        }
    }

    /// Name of the derived per-record count column.
    pub fn count_column(self) -> &'static str {
        match self {
            CarbonClass::C1C4 => "C1_C4_Count",
            CarbonClass::C5C13 => "C5_C13_Count",
            CarbonClass::C14C40 => "C14_C40_Count",
            CarbonClass::C40Plus => "C40p_Count",
        }
    }

    /// Name of the bucket's percentage column in exports.
    pub fn percentage_column(self) -> &'static str {
        match self {
            CarbonClass::C1C4 => "C1_C4_percentages",
            CarbonClass::C5C13 => "C5_C13_percentages",
            CarbonClass::C14C40 => "C14_C40_percentages",
            CarbonClass::C40Plus => "C40p_percentages",
        }
    }

    fn position(self) -> usize {
        match self {
            CarbonClass::C1C4 => 0,
            CarbonClass::C5C13 => 1,
            CarbonClass::C14C40 => 2,
            CarbonClass::C40Plus => 3,
        }
    }
}

impl fmt::Display for CarbonClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Single species
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesKind {
    Organic(CarbonClass),
    NonOrganic,
}

/// Carbon count `n` from the first `C<n>` in the name.  Runs too long for a
/// `u64` saturate.
pub fn carbon_count(name: &str) -> Option<u64> {
    CARBON_RUN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
}

/// Classify a species by name alone.  No chemistry is checked: a name with
/// both `C` and `H` is organic, otherwise a `C<n>` run with `n >= 2` is.
pub fn classify_species(name: &str) -> SpeciesKind {
    let n = carbon_count(name);
    let organic = (name.contains('C') && name.contains('H')) || n.is_some_and(|n| n >= 2);
    if organic {
        SpeciesKind::Organic(CarbonClass::from_carbon_count(n))
    } else {
        SpeciesKind::NonOrganic
    }
}

// ---------------------------------------------------------------------------
// Column partition
// ---------------------------------------------------------------------------

/// Partition of a table's species columns.  Every list keeps table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub organic: Vec<String>,
    pub non_organic: Vec<String>,
    buckets: [Vec<String>; 4],
}

impl Classification {
    /// Classify every non-reserved column name.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        let mut out = Classification::default();
        for name in columns.iter().map(AsRef::as_ref) {
            if RESERVED_COLUMNS.contains(&name) {
                continue;
            }
            match classify_species(name) {
                SpeciesKind::Organic(class) => {
                    out.organic.push(name.to_string());
                    out.buckets[class.position()].push(name.to_string());
                }
                SpeciesKind::NonOrganic => out.non_organic.push(name.to_string()),
            }
        }
        out
    }

    /// Organic columns in the given carbon bucket.
    pub fn bucket(&self, class: CarbonClass) -> &[String] {
        &self.buckets[class.position()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carbon_and_hydrogen_make_organic() {
        assert_eq!(
            classify_species("C3H8"),
            SpeciesKind::Organic(CarbonClass::C1C4)
        );
        assert_eq!(
            classify_species("CH4"),
            SpeciesKind::Organic(CarbonClass::C1C4)
        );
        assert_eq!(
            classify_species("C10H22"),
            SpeciesKind::Organic(CarbonClass::C5C13)
        );
    }

    #[test]
    fn carbon_run_of_two_or_more_is_organic_without_hydrogen() {
        assert_eq!(classify_species("C3"), SpeciesKind::Organic(CarbonClass::C1C4));
        assert_eq!(classify_species("C2O"), SpeciesKind::Organic(CarbonClass::C1C4));
        assert_eq!(classify_species("C20O4"), SpeciesKind::Organic(CarbonClass::C14C40));
    }

    #[test]
    fn single_carbon_or_no_carbon_run_is_non_organic() {
        assert_eq!(classify_species("O2"), SpeciesKind::NonOrganic);
        assert_eq!(classify_species("H2O"), SpeciesKind::NonOrganic);
        assert_eq!(classify_species("CO2"), SpeciesKind::NonOrganic);
        assert_eq!(classify_species("C1O"), SpeciesKind::NonOrganic);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(CarbonClass::from_carbon_count(Some(4)), CarbonClass::C1C4);
        assert_eq!(CarbonClass::from_carbon_count(Some(5)), CarbonClass::C5C13);
        assert_eq!(CarbonClass::from_carbon_count(Some(13)), CarbonClass::C5C13);
        assert_eq!(CarbonClass::from_carbon_count(Some(14)), CarbonClass::C14C40);
        assert_eq!(CarbonClass::from_carbon_count(Some(40)), CarbonClass::C14C40);
        assert_eq!(CarbonClass::from_carbon_count(Some(41)), CarbonClass::C40Plus);
        assert_eq!(
            classify_species("C45H92"),
            SpeciesKind::Organic(CarbonClass::C40Plus)
        );
    }

    #[test]
    fn huge_carbon_run_saturates() {
        assert_eq!(carbon_count("C99999999999999999999999H"), Some(u64::MAX));
    }

    #[test]
    fn partition_skips_reserved_and_keeps_order() {
        let cols = [
            "Timestep", "No_Moles", "No_Specs", "H2O", "C16H34", "CO2", "C3H8", "C50H102",
        ];
        let c = Classification::from_columns(&cols);
        assert_eq!(c.organic, vec!["C16H34", "C3H8", "C50H102"]);
        assert_eq!(c.non_organic, vec!["H2O", "CO2"]);
        assert_eq!(c.bucket(CarbonClass::C1C4), ["C3H8".to_string()]);
        assert!(c.bucket(CarbonClass::C5C13).is_empty());
        assert_eq!(c.bucket(CarbonClass::C14C40), ["C16H34".to_string()]);
        assert_eq!(c.bucket(CarbonClass::C40Plus), ["C50H102".to_string()]);
    }
}
