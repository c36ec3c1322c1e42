//! End-to-end: write a growth-table CSV the way the lab sheets are laid out,
//! load it, and query the reconciled experiments.

use std::io::Write;
use std::path::PathBuf;

use pairgrowth::{GrowthTable, OrganismCatalog};

fn days() -> Vec<String> {
    ["Day 1", "Day 3", "Day 5", "Day 7"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn write_sample_csv(name: &str, body: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("pairgrowth-pipeline-{}-{name}", std::process::id()));
    let mut f = std::fs::File::create(&path).unwrap();
    // Header row plus a trailing metadata column the model must ignore.
    writeln!(f, "Name,Day 1,Day 3,Day 5,Day 7,Notes").unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

const SAMPLE: &str = "\
Candida,,,,,
Candida alone,0.10,0.50,0.90,1.20,fast grower
,,0.60,1.00,1.30,
,,0.40,0.80,1.10,
Candida-S. equorum,0.10,0.30,0.60,0.80,
,,0.35,0.65,0.85,
,,0.25,0.55,0.75,
,,,,,
measured by J.D.,,,,,
S. equorum,,,,,
S. equorum alone,0.20,0.40,0.60,0.80,
,,0.45,0.65,0.85,
,,0.35,0.55,0.75,
S. equorum-Candida,0.20,0.30,0.40,0.50,
,,0.32,0.42,0.52,
,,0.28,0.38,0.48,
";

#[test]
fn csv_to_experiments() {
    let path = write_sample_csv("good.csv", SAMPLE);
    let table = GrowthTable::from_path(&path, OrganismCatalog::reference(), days()).unwrap();
    std::fs::remove_file(&path).ok();

    // Two alone rows and one complementary pair → three experiments.
    let alone = table.experiments().iter().filter(|e| e.is_alone()).count();
    let pairwise = table.experiments().iter().filter(|e| e.is_pairwise()).count();
    assert_eq!(alone, 2);
    assert_eq!(pairwise, 1);

    // Round-trip: alone + 2 * pairwise equals the number of classified
    // measurement entries across the whole dict.
    let classified: usize = table
        .measurements()
        .values()
        .flat_map(|m| m.keys())
        .filter(|label| label.contains("alone") || label.contains('-'))
        .count();
    assert_eq!(alone + 2 * pairwise, classified);

    // First-day value propagated from each header row across replicates.
    let candida_alone = table.alone_experiment("Candida").unwrap();
    let matrix = &candida_alone.organisms[0].growth_array;
    assert_eq!(matrix.day_column(0).collect::<Vec<_>>(), vec![0.1, 0.1, 0.1]);

    // The pairwise experiment holds both sides' own matrices.
    let pair = table.experiment_for_set(&["Candida", "S. equorum"]).unwrap();
    for org in &pair.organisms {
        assert_eq!(org.growth_array.num_reps(), 3);
        assert_eq!(org.growth_array.num_days(), 4);
    }
    let candida_side = pair
        .organisms
        .iter()
        .find(|o| o.org_type == "Candida")
        .unwrap();
    assert_eq!(candida_side.growth_array.replicate(0).unwrap()[1], 0.30);

    // Substring lookup reaches the same experiment; misses are None.
    assert_eq!(table.pairwise_experiment("equorum", "Candida"), Some(pair));
    assert!(table.pairwise_experiment("Candida", "Penicillium").is_none());
    assert!(table.experiment_for_set(&["Scopulariopsis"]).is_none());
}

const UNPAIRED: &str = "\
Candida,,,,,
Candida-S. equorum,0.10,0.30,0.60,0.80,
,,0.35,0.65,0.85,
,,0.25,0.55,0.75,
S. equorum,,,,,
S. equorum alone,0.20,0.40,0.60,0.80,
,,0.45,0.65,0.85,
,,0.35,0.55,0.75,
";

#[test]
fn unpaired_combined_measurement_fails_loudly() {
    let path = write_sample_csv("unpaired.csv", UNPAIRED);
    let err = GrowthTable::from_path(&path, OrganismCatalog::reference(), days()).unwrap_err();
    std::fs::remove_file(&path).ok();

    let msg = format!("{err:#}");
    assert!(msg.contains("no counterpart"), "unexpected error: {msg}");
    assert!(msg.contains("Candida-S. equorum"));
}
