use std::collections::BTreeSet;

use log::debug;

use crate::error::TableError;

use super::model::{Experiment, MeasurementDict, Organism, PairKey};

// ---------------------------------------------------------------------------
// Label classification
// ---------------------------------------------------------------------------

/// What a measurement label means. "alone" marks single-organism growth; a
/// "-" marks combined growth named by its two organism tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementKind {
    Alone,
    Pair(PairKey),
}

/// Classify a measurement label. Labels that are neither alone nor pairwise
/// (extra annotations the extractor happened to keep) classify as `None` and
/// are left out of the experiment list.
pub fn classify_label(label: &str) -> Option<MeasurementKind> {
    if label.contains("alone") {
        return Some(MeasurementKind::Alone);
    }
    if label.contains('-') {
        let mut tokens = label.splitn(3, '-');
        let a = tokens.next().unwrap_or("").trim();
        let b = tokens.next().unwrap_or("").trim();
        return Some(MeasurementKind::Pair(PairKey::new(a, b)));
    }
    None
}

// ---------------------------------------------------------------------------
// Experiment reconciliation
// ---------------------------------------------------------------------------

/// Turn a [`MeasurementDict`] into the flat experiment list.
///
/// Two passes over the dict, so no entry is ever deleted out from under an
/// iterator: the first collects and classifies every (section, label) entry
/// in mapping order; the second builds experiments while marking consumed
/// entries, so the counterpart of a pairwise entry is merged into one
/// experiment rather than re-processed on its own.
///
/// The caller's dict is only read; all growth data is cloned into the
/// resulting experiments.
pub fn reconcile_experiments(
    measurements: &MeasurementDict,
    day_list: &[String],
) -> Result<Vec<Experiment>, TableError> {
    struct Entry<'a> {
        section: &'a str,
        label: &'a str,
        kind: MeasurementKind,
    }

    let mut entries = Vec::new();
    for (section, by_label) in measurements {
        for label in by_label.keys() {
            if let Some(kind) = classify_label(label) {
                entries.push(Entry {
                    section: section.as_str(),
                    label: label.as_str(),
                    kind,
                });
            }
        }
    }

    let mut consumed: BTreeSet<(&str, &str)> = BTreeSet::new();
    let mut experiments = Vec::new();

    for entry in &entries {
        if consumed.contains(&(entry.section, entry.label)) {
            continue;
        }

        match &entry.kind {
            MeasurementKind::Alone => {
                let growth = measurements[entry.section][entry.label].clone();
                let org = Organism::new(entry.section, growth, day_list.to_vec());
                experiments.push(Experiment::new(vec![org], day_list.to_vec()));
                consumed.insert((entry.section, entry.label));
            }
            MeasurementKind::Pair(key) => {
                let partner = key.partner_of(entry.section).to_string();
                let counterpart = find_counterpart(
                    measurements,
                    &consumed,
                    &partner,
                    key,
                    (entry.section, entry.label),
                );
                let Some((partner_section, partner_label)) = counterpart else {
                    return Err(TableError::UnresolvedPair {
                        section: entry.section.to_string(),
                        partner,
                        label: entry.label.to_string(),
                    });
                };

                debug!(
                    "pairing '{}' ({}) with '{partner_label}' ({partner_section})",
                    entry.label, entry.section
                );

                let growth = measurements[entry.section][entry.label].clone();
                let current = Organism::new(entry.section, growth, day_list.to_vec());
                let partner_growth = measurements[partner_section][partner_label].clone();
                let other = Organism::new(partner_section, partner_growth, day_list.to_vec());

                experiments.push(Experiment::new(vec![current, other], day_list.to_vec()));
                consumed.insert((entry.section, entry.label));
                consumed.insert((partner_section, partner_label));
            }
        }
    }

    Ok(experiments)
}

/// Scan the partner section for the complementary entry: the first label
/// whose pair key equals `key`, skipping entries already merged and the entry
/// currently being resolved. Returns the partner's (section, label) keys.
fn find_counterpart<'a>(
    measurements: &'a MeasurementDict,
    consumed: &BTreeSet<(&'a str, &'a str)>,
    partner: &str,
    key: &PairKey,
    current: (&str, &str),
) -> Option<(&'a str, &'a str)> {
    let (partner_section, by_label) = measurements.get_key_value(partner)?;
    let partner_section = partner_section.as_str();
    by_label
        .keys()
        .map(String::as_str)
        .find(|label| {
            if (partner_section, *label) == current
                || consumed.contains(&(partner_section, *label))
            {
                return false;
            }
            matches!(classify_label(label), Some(MeasurementKind::Pair(k)) if k == *key)
        })
        .map(|label| (partner_section, label))
}
