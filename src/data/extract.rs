use std::collections::BTreeMap;

use log::{debug, warn};

use crate::catalog::OrganismCatalog;
use crate::error::TableError;

use super::model::{GrowthMatrix, MeasurementDict, RawTable};

// ---------------------------------------------------------------------------
// Measurement extraction
// ---------------------------------------------------------------------------

/// Walk the raw table top to bottom and collect every replicate block into a
/// [`MeasurementDict`], keyed by the organism section it appears under.
///
/// Row classification, in order:
/// 1. label exactly matches a catalog name → opens that organism's section
///    (a repeated section header starts a fresh, empty sub-map);
/// 2. label is non-blank, not "nan", and merely *mentions* a catalog name →
///    measurement header; the header plus the following `num_reps - 1` rows
///    form one replicate block;
/// 3. anything else is a spacer or metadata row and is skipped.
///
/// The exact branch must run before the substring branch: an organism name
/// that is a substring of another organism's name still opens its own
/// section.
///
/// Only the first `max_col` columns count; `day_list` (here its length,
/// `num_days`) labels the columns after the name column. Within each block
/// the first day cell is copied from the header row onto every replicate row,
/// since the source sheets record it on the header row only.
pub fn extract_measurements(
    table: &RawTable,
    catalog: &OrganismCatalog,
    num_days: usize,
    num_reps: usize,
    max_col: usize,
) -> Result<MeasurementDict, TableError> {
    if num_days + 1 != max_col {
        return Err(TableError::DayListMismatch {
            days: num_days,
            max_col,
        });
    }

    let mut dict = MeasurementDict::new();
    let mut cur_section: Option<String> = None;

    for (i, row) in table.rows.iter().enumerate() {
        let label = row.label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case("nan") {
            continue;
        }

        if catalog.contains_exact(label) {
            cur_section = Some(label.to_string());
            dict.insert(label.to_string(), BTreeMap::new());
            continue;
        }

        if !catalog.mentions(label) {
            // Unrelated annotation row between sections.
            continue;
        }

        // Measurement header: this row plus the next num_reps - 1 replicates.
        let Some(section) = cur_section.as_deref() else {
            warn!("measurement row '{label}' (row {i}) precedes any organism section, skipping");
            continue;
        };

        let available = table.rows.len() - i;
        if available < num_reps {
            return Err(TableError::TruncatedBlock {
                section: section.to_string(),
                label: label.to_string(),
                needed: num_reps,
                available,
            });
        }

        let block = &table.rows[i..i + num_reps];
        let first_day = block[0].day_cell(0);
        let reps: Vec<Vec<f64>> = block
            .iter()
            .map(|r| {
                let mut vals: Vec<f64> = (0..num_days).map(|c| r.day_cell(c)).collect();
                if let Some(first) = vals.first_mut() {
                    *first = first_day;
                }
                vals
            })
            .collect();

        debug!("section '{section}': measurement '{label}' ({num_reps}x{num_days})");
        if let Some(measurements) = dict.get_mut(section) {
            measurements.insert(label.to_string(), GrowthMatrix::new(reps));
        }
    }

    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawRow;

    fn row(label: &str, values: &[f64]) -> RawRow {
        RawRow::new(label, values.to_vec())
    }

    fn table(rows: Vec<RawRow>) -> RawTable {
        RawTable { rows }
    }

    const NAN: f64 = f64::NAN;

    #[test]
    fn sections_and_blocks_are_collected() {
        let cat = OrganismCatalog::reference();
        let raw = table(vec![
            row("Candida", &[]),
            row("Candida alone", &[0.1, 0.5, 0.9, 1.2]),
            row("", &[NAN, 0.6, 1.0, 1.3]),
            row("nan", &[NAN, 0.4, 0.8, 1.1]),
            row("", &[]),
            row("S. equorum", &[]),
            row("S. equorum alone", &[0.2, 0.3, 0.4, 0.5]),
            row("", &[NAN, 0.35, 0.45, 0.55]),
            row("", &[NAN, 0.32, 0.42, 0.52]),
        ]);
        let dict = extract_measurements(&raw, &cat, 4, 3, 5).unwrap();

        assert_eq!(dict.len(), 2);
        assert!(dict["Candida"].contains_key("Candida alone"));
        assert!(dict["S. equorum"].contains_key("S. equorum alone"));

        let m = &dict["Candida"]["Candida alone"];
        assert_eq!(m.num_reps(), 3);
        assert_eq!(m.num_days(), 4);
    }

    #[test]
    fn first_day_cell_is_forced_across_replicates() {
        let cat = OrganismCatalog::reference();
        let raw = table(vec![
            row("Penicillium", &[]),
            row("Penicillium alone", &[0.07, 0.5, 0.9, 1.2]),
            row("", &[NAN, 0.6, 1.0, 1.3]),
            row("", &[NAN, 0.4, 0.8, 1.1]),
        ]);
        let dict = extract_measurements(&raw, &cat, 4, 3, 5).unwrap();
        let m = &dict["Penicillium"]["Penicillium alone"];
        for v in m.day_column(0) {
            assert_eq!(v, 0.07);
        }
        // Other columns untouched.
        assert_eq!(m.day_column(1).collect::<Vec<_>>(), vec![0.5, 0.6, 0.4]);
    }

    #[test]
    fn columns_past_max_col_are_dropped() {
        let cat = OrganismCatalog::reference();
        let raw = table(vec![
            row("Candida", &[]),
            row("Candida alone", &[0.1, 0.2, 0.3, 0.4, 99.0, 98.0]),
            row("", &[0.1, 0.2, 0.3, 0.4, 99.0]),
            row("", &[0.1, 0.2, 0.3, 0.4]),
        ]);
        let dict = extract_measurements(&raw, &cat, 4, 3, 5).unwrap();
        assert_eq!(dict["Candida"]["Candida alone"].num_days(), 4);
    }

    #[test]
    fn exact_match_wins_over_substring_match() {
        // "Staph" is a substring of "Staph aureus"; a bare "Staph" row must
        // open a section, not start a replicate block.
        let cat = OrganismCatalog::new(&["Staph", "Staph aureus"]);
        let raw = table(vec![
            row("Staph", &[]),
            row("Staph alone", &[0.1, 0.2]),
            row("", &[NAN, 0.25]),
            row("Staph aureus", &[]),
            row("Staph aureus alone", &[0.3, 0.4]),
            row("", &[NAN, 0.45]),
        ]);
        let dict = extract_measurements(&raw, &cat, 2, 2, 3).unwrap();
        assert_eq!(dict["Staph"].len(), 1);
        assert!(dict["Staph"].contains_key("Staph alone"));
        assert!(dict["Staph aureus"].contains_key("Staph aureus alone"));
    }

    #[test]
    fn orphan_measurement_rows_are_skipped() {
        let cat = OrganismCatalog::reference();
        let raw = table(vec![
            row("Candida alone", &[0.1, 0.2, 0.3, 0.4]),
            row("", &[0.1, 0.2, 0.3, 0.4]),
            row("", &[0.1, 0.2, 0.3, 0.4]),
        ]);
        let dict = extract_measurements(&raw, &cat, 4, 3, 5).unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn day_list_must_match_kept_columns() {
        let cat = OrganismCatalog::reference();
        let err = extract_measurements(&table(vec![]), &cat, 3, 3, 5).unwrap_err();
        assert!(matches!(
            err,
            TableError::DayListMismatch { days: 3, max_col: 5 }
        ));
    }

    #[test]
    fn truncated_block_is_an_error() {
        let cat = OrganismCatalog::reference();
        let raw = table(vec![
            row("Candida", &[]),
            row("Candida alone", &[0.1, 0.2, 0.3, 0.4]),
            row("", &[0.1, 0.2, 0.3, 0.4]),
        ]);
        let err = extract_measurements(&raw, &cat, 4, 3, 5).unwrap_err();
        assert!(matches!(err, TableError::TruncatedBlock { needed: 3, available: 2, .. }));
    }

    #[test]
    fn repeated_section_header_resets_the_section() {
        let cat = OrganismCatalog::reference();
        let raw = table(vec![
            row("Candida", &[]),
            row("Candida alone", &[0.1, 0.2, 0.3, 0.4]),
            row("", &[0.1, 0.2, 0.3, 0.4]),
            row("", &[0.1, 0.2, 0.3, 0.4]),
            row("Candida", &[]),
        ]);
        let dict = extract_measurements(&raw, &cat, 4, 3, 5).unwrap();
        assert!(dict["Candida"].is_empty());
    }
}
