use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Logistic growth curve sampled at day `t`.
fn logistic(t: f64, carrying_capacity: f64, rate: f64, midpoint: f64) -> f64 {
    carrying_capacity / (1.0 + (-rate * (t - midpoint)).exp())
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One raw output row: label cell + four day cells (None = blank).
struct Row {
    label: String,
    days: [Option<f64>; NUM_DAYS],
}

impl Row {
    fn blank() -> Self {
        Row {
            label: String::new(),
            days: [None; NUM_DAYS],
        }
    }

    fn header(label: &str) -> Self {
        Row {
            label: label.to_string(),
            days: [None; NUM_DAYS],
        }
    }
}

const NUM_DAYS: usize = 4;
const NUM_REPS: usize = 3;
const DAY_LABELS: [&str; NUM_DAYS] = ["Day 1", "Day 3", "Day 5", "Day 7"];
const MEASUREMENT_DAYS: [f64; NUM_DAYS] = [1.0, 3.0, 5.0, 7.0];

/// Growth parameters (carrying capacity, rate, midpoint) per organism, with
/// a dampening factor applied in co-culture.
const ORGANISMS: [(&str, f64, f64, f64); 3] = [
    ("Candida", 1.4, 0.9, 3.0),
    ("S. equorum", 1.0, 0.7, 3.5),
    ("Brevibacterium", 0.8, 0.6, 4.0),
];

/// Emit one replicate block: the header row carries the first-day value,
/// replicate rows leave it blank, the way the lab sheets do.
fn replicate_block(label: &str, capacity: f64, rate: f64, midpoint: f64, rng: &mut SimpleRng) -> Vec<Row> {
    (0..NUM_REPS)
        .map(|rep| {
            let days = std::array::from_fn(|d| {
                if d == 0 && rep > 0 {
                    return None;
                }
                let base = logistic(MEASUREMENT_DAYS[d], capacity, rate, midpoint);
                Some((base + rng.gauss(0.0, 0.02)).max(0.0))
            });
            Row {
                label: if rep == 0 { label.to_string() } else { String::new() },
                days,
            }
        })
        .collect()
}

fn build_rows(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();

    for (i, &(name, capacity, rate, midpoint)) in ORGANISMS.iter().enumerate() {
        rows.push(Row::header(name));

        rows.extend(replicate_block(
            &format!("{name} alone"),
            capacity,
            rate,
            midpoint,
            rng,
        ));

        // Co-culture with every other organism; growth dampened by the
        // partner. Each section names its own organism first, so the label
        // order flips between the two sides of a pair, as in the lab sheets.
        for (j, &(partner, ..)) in ORGANISMS.iter().enumerate() {
            if i == j {
                continue;
            }
            let label = format!("{name}-{partner}");
            rows.extend(replicate_block(&label, capacity * 0.7, rate, midpoint + 0.5, rng));
        }

        rows.push(Row::blank());
    }

    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;

    let mut header = vec!["Name".to_string()];
    header.extend(DAY_LABELS.iter().map(|d| d.to_string()));
    writer.write_record(&header).context("writing CSV header")?;

    for row in rows {
        let mut record = vec![row.label.clone()];
        record.extend(
            row.days
                .iter()
                .map(|d| d.map_or(String::new(), |v| format!("{v:.4}"))),
        );
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let mut name_builder = StringBuilder::new();
    let mut day_builders: Vec<Float64Builder> =
        (0..NUM_DAYS).map(|_| Float64Builder::new()).collect();

    for row in rows {
        if row.label.is_empty() {
            name_builder.append_null();
        } else {
            name_builder.append_value(&row.label);
        }
        for (d, builder) in day_builders.iter_mut().enumerate() {
            match row.days[d] {
                Some(v) => builder.append_value(v),
                None => builder.append_null(),
            }
        }
    }

    let mut fields = vec![Field::new("Name", DataType::Utf8, true)];
    fields.extend(
        DAY_LABELS
            .iter()
            .map(|d| Field::new(*d, DataType::Float64, true)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<Arc<dyn arrow::array::Array>> = vec![Arc::new(name_builder.finish())];
    for mut builder in day_builders {
        columns.push(Arc::new(builder.finish()));
    }

    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("creating record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let rows = build_rows(&mut rng);

    write_csv(&rows, "sample_growth.csv")?;
    write_parquet(&rows, "sample_growth.parquet")?;

    println!(
        "Wrote {} rows ({} organisms, {} days) to sample_growth.csv / sample_growth.parquet",
        rows.len(),
        ORGANISMS.len(),
        NUM_DAYS
    );
    Ok(())
}
