use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// RawTable – the loaded spreadsheet grid, before any interpretation
// ---------------------------------------------------------------------------

/// One row of the raw table: a label cell followed by numeric day cells.
/// Blank or unparsable cells are `f64::NAN`.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// Organism section header, measurement name, or blank/"nan".
    pub label: String,
    /// Day measurement cells, left to right.
    pub values: Vec<f64>,
}

impl RawRow {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        RawRow {
            label: label.into(),
            values,
        }
    }

    /// Day cell at `col`, NAN when the row is shorter than the table width.
    pub fn day_cell(&self, col: usize) -> f64 {
        self.values.get(col).copied().unwrap_or(f64::NAN)
    }
}

/// Ordered sequence of raw rows in original top-to-bottom order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GrowthMatrix – replicate-by-day measurements of one condition
// ---------------------------------------------------------------------------

/// A replicate-by-day numeric matrix: `num_reps` rows, one column per day.
///
/// Invariant established at extraction time: the first day column holds the
/// same value on every replicate row (the source format only records it on
/// the header row of a replicate block).
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthMatrix {
    rows: Vec<Vec<f64>>,
}

impl GrowthMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        GrowthMatrix { rows }
    }

    /// Number of replicate rows.
    pub fn num_reps(&self) -> usize {
        self.rows.len()
    }

    /// Number of day columns.
    pub fn num_days(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// One replicate's measurements across all days.
    pub fn replicate(&self, rep: usize) -> Option<&[f64]> {
        self.rows.get(rep).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// All replicate values for one day column.
    pub fn day_column(&self, day: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |r| r[day])
    }
}

// ---------------------------------------------------------------------------
// MeasurementDict – organism section → measurement label → matrix
// ---------------------------------------------------------------------------

/// Two-level mapping produced by extraction: organism name → measurement
/// label → growth matrix. `BTreeMap` keeps iteration deterministic, which
/// reconciliation and the idempotence guarantee rely on.
pub type MeasurementDict = BTreeMap<String, BTreeMap<String, GrowthMatrix>>;

// ---------------------------------------------------------------------------
// PairKey – typed identity of a pairwise measurement label
// ---------------------------------------------------------------------------

/// The two organism tokens of a "OrgA-OrgB" measurement label, kept in label
/// order but compared as an unordered pair, so "A-B" and "B-A" entries under
/// the two partner sections identify the same experiment.
#[derive(Debug, Clone)]
pub struct PairKey {
    a: String,
    b: String,
}

impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        PairKey {
            a: a.into(),
            b: b.into(),
        }
    }

    fn normalized(&self) -> (&str, &str) {
        if self.a <= self.b {
            (&self.a, &self.b)
        } else {
            (&self.b, &self.a)
        }
    }

    /// The token that is not `current`. When the first token equals the
    /// current section the second is the partner, otherwise the first is —
    /// including the case where neither token matches.
    pub fn partner_of(&self, current: &str) -> &str {
        if self.a == current {
            &self.b
        } else {
            &self.a
        }
    }

    pub fn tokens(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }
}

impl PartialEq for PairKey {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for PairKey {}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

// ---------------------------------------------------------------------------
// Organism / Experiment – the reconciled model
// ---------------------------------------------------------------------------

/// One organism's growth data within an experiment. Organisms are only ever
/// built during reconciliation, never standalone through the public API.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    /// A recognized organism name from the catalog.
    pub org_type: String,
    /// Replicate-by-day growth measurements.
    pub growth_array: GrowthMatrix,
    /// Day labels shared with the owning experiment.
    pub day_list: Vec<String>,
}

impl Organism {
    pub(crate) fn new(
        org_type: impl Into<String>,
        growth_array: GrowthMatrix,
        day_list: Vec<String>,
    ) -> Self {
        Organism {
            org_type: org_type.into(),
            growth_array,
            day_list,
        }
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.org_type)
    }
}

/// One reconciled experiment: a single organism grown alone, or two organisms
/// grown together. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub organisms: Vec<Organism>,
    pub day_list: Vec<String>,
    /// Growth environment tag. Unused by the reference data set.
    pub environment: Option<String>,
}

impl Experiment {
    pub(crate) fn new(organisms: Vec<Organism>, day_list: Vec<String>) -> Self {
        Experiment {
            organisms,
            day_list,
            environment: None,
        }
    }

    /// True for a single-organism (alone-growth) experiment.
    pub fn is_alone(&self) -> bool {
        self.organisms.len() == 1
    }

    /// True for a two-organism (combined-growth) experiment.
    pub fn is_pairwise(&self) -> bool {
        self.organisms.len() == 2
    }

    /// Organism type names in experiment order.
    pub fn organism_types(&self) -> impl Iterator<Item = &str> {
        self.organisms.iter().map(|o| o.org_type.as_str())
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.organism_types().collect();
        write!(f, "{} exp", names.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_unordered() {
        let ab = PairKey::new("Candida", "S. equorum");
        let ba = PairKey::new("S. equorum", "Candida");
        assert_eq!(ab, ba);
        assert_ne!(ab, PairKey::new("Candida", "S. succinus"));
    }

    #[test]
    fn pair_key_partner_prefers_first_token_on_no_match() {
        let key = PairKey::new("Candida", "S. equorum");
        assert_eq!(key.partner_of("Candida"), "S. equorum");
        assert_eq!(key.partner_of("S. equorum"), "Candida");
        // Neither token matches: report the first token, mirroring the
        // section-mismatch convention of the source data.
        assert_eq!(key.partner_of("Penicillium"), "Candida");
    }

    #[test]
    fn growth_matrix_dimensions() {
        let m = GrowthMatrix::new(vec![vec![0.1, 0.2, 0.3], vec![0.1, 0.25, 0.35]]);
        assert_eq!(m.num_reps(), 2);
        assert_eq!(m.num_days(), 3);
        assert_eq!(m.day_column(0).collect::<Vec<_>>(), vec![0.1, 0.1]);
    }
}
