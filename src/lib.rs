//! In-memory model of pairwise microbial growth tables.
//!
//! The input is a loosely structured spreadsheet: organism section headers,
//! followed by replicate blocks of growth measurements, for organisms grown
//! alone ("Candida alone") or in co-culture ("Candida-S. equorum", recorded
//! once under each partner's section). This crate loads such a table,
//! extracts every replicate block into a measurement dict, and reconciles
//! complementary co-culture entries into a flat list of experiments that can
//! be queried by organism set.
//!
//! ```no_run
//! use std::path::Path;
//! use pairgrowth::{GrowthTable, OrganismCatalog};
//!
//! # fn main() -> anyhow::Result<()> {
//! let days = ["Day 1", "Day 3", "Day 5", "Day 7"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let table = GrowthTable::from_path(
//!     Path::new("growth.csv"),
//!     OrganismCatalog::reference(),
//!     days,
//! )?;
//!
//! if let Some(exp) = table.experiment_for_set(&["Candida", "S. equorum"]) {
//!     println!("{exp}: {} replicates", exp.organisms[0].growth_array.num_reps());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod data;
pub mod error;
pub mod table;

pub use catalog::OrganismCatalog;
pub use data::model::{Experiment, GrowthMatrix, MeasurementDict, Organism, PairKey, RawRow, RawTable};
pub use error::TableError;
pub use table::{DEFAULT_MAX_COL, DEFAULT_NUM_REPS, GrowthTable};
