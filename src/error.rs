use thiserror::Error;

/// Errors raised while building the measurement dict and experiment list.
///
/// Lookup misses are not errors; the query methods on
/// [`GrowthTable`](crate::table::GrowthTable) return `Option` instead.
#[derive(Debug, Error)]
pub enum TableError {
    /// `day_list` must label every kept column after the name column.
    #[error("day list has {days} labels but a table keeping {max_col} columns needs one per day column")]
    DayListMismatch { days: usize, max_col: usize },

    /// A replicate block ran past the bottom of the table.
    #[error(
        "replicate block '{label}' under '{section}' needs {needed} rows, only {available} remain"
    )]
    TruncatedBlock {
        section: String,
        label: String,
        needed: usize,
        available: usize,
    },

    /// A pairwise measurement with no matching entry under the partner's
    /// section. Indicates an unpaired or malformed label in the source table.
    #[error("no counterpart for pairwise measurement '{label}' in section '{section}' (partner section '{partner}')")]
    UnresolvedPair {
        section: String,
        partner: String,
        label: String,
    },
}
