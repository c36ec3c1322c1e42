use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::catalog::OrganismCatalog;
use crate::data::extract::extract_measurements;
use crate::data::loader::load_file;
use crate::data::model::{Experiment, MeasurementDict, RawTable};
use crate::data::reconcile::reconcile_experiments;
use crate::error::TableError;

/// Replicate rows per measurement block in the reference sheets.
pub const DEFAULT_NUM_REPS: usize = 3;
/// Columns kept from the raw table: the name column plus four day columns.
pub const DEFAULT_MAX_COL: usize = 5;

// ---------------------------------------------------------------------------
// GrowthTable – the queryable model of one pairwise growth spreadsheet
// ---------------------------------------------------------------------------

/// One loaded growth table: the extracted measurement dict and the reconciled
/// experiment list, both computed at construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct GrowthTable {
    catalog: OrganismCatalog,
    day_list: Vec<String>,
    num_reps: usize,
    max_col: usize,
    measurements: MeasurementDict,
    experiments: Vec<Experiment>,
}

impl GrowthTable {
    /// Load a table file with the default replicate count and column window.
    pub fn from_path(
        path: &Path,
        catalog: OrganismCatalog,
        day_list: Vec<String>,
    ) -> Result<Self> {
        Self::from_path_with(path, catalog, day_list, DEFAULT_NUM_REPS, DEFAULT_MAX_COL)
    }

    /// Load a table file with explicit replicate count and column window.
    pub fn from_path_with(
        path: &Path,
        catalog: OrganismCatalog,
        day_list: Vec<String>,
        num_reps: usize,
        max_col: usize,
    ) -> Result<Self> {
        let raw = load_file(path)?;
        let table = Self::from_raw(&raw, catalog, day_list, num_reps, max_col)
            .with_context(|| format!("building model from {}", path.display()))?;
        Ok(table)
    }

    /// Build the model from an already loaded raw table.
    pub fn from_raw(
        raw: &RawTable,
        catalog: OrganismCatalog,
        day_list: Vec<String>,
        num_reps: usize,
        max_col: usize,
    ) -> std::result::Result<Self, TableError> {
        let measurements =
            extract_measurements(raw, &catalog, day_list.len(), num_reps, max_col)?;
        let experiments = reconcile_experiments(&measurements, &day_list)?;
        info!(
            "built growth table: {} organism sections, {} experiments",
            measurements.len(),
            experiments.len()
        );
        Ok(GrowthTable {
            catalog,
            day_list,
            num_reps,
            max_col,
            measurements,
            experiments,
        })
    }

    // -- Accessors --

    pub fn catalog(&self) -> &OrganismCatalog {
        &self.catalog
    }

    pub fn day_list(&self) -> &[String] {
        &self.day_list
    }

    pub fn num_reps(&self) -> usize {
        self.num_reps
    }

    pub fn max_col(&self) -> usize {
        self.max_col
    }

    /// The extracted organism → label → matrix mapping.
    pub fn measurements(&self) -> &MeasurementDict {
        &self.measurements
    }

    /// The reconciled experiments, one per alone measurement and one per
    /// complementary pair of combined measurements.
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    // -- Lookups --
    //
    // All three return the first match, or None for a miss.

    /// The experiment whose organisms are exactly the queried set: same
    /// organism count, and every queried name present among the experiment's
    /// organism types.
    pub fn experiment_for_set(&self, desired: &[&str]) -> Option<&Experiment> {
        self.experiments.iter().find(|exp| {
            exp.organisms.len() == desired.len()
                && desired
                    .iter()
                    .all(|want| exp.organism_types().any(|t| t == *want))
        })
    }

    /// The alone-growth experiment for one organism (exact type match).
    pub fn alone_experiment(&self, org_name: &str) -> Option<&Experiment> {
        self.experiments
            .iter()
            .find(|exp| exp.is_alone() && exp.organisms[0].org_type == org_name)
    }

    /// The pairwise experiment whose two organism types are matched by the
    /// given substrings. A deliberately looser contract than
    /// [`experiment_for_set`](Self::experiment_for_set): `"equorum"` finds
    /// "S. equorum".
    pub fn pairwise_experiment(&self, org1: &str, org2: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|exp| {
            exp.is_pairwise()
                && exp.organism_types().any(|t| t.contains(org1))
                && exp.organism_types().any(|t| t.contains(org2))
        })
    }
}
