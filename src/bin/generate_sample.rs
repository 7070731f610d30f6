use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One output row, using the source column names.
#[derive(Debug, Serialize)]
struct Row {
    #[serde(rename = "LOJA")]
    store: String,
    #[serde(rename = "ESTADO")]
    state: String,
    #[serde(rename = "STATUS")]
    status: String,
    #[serde(rename = "ANO")]
    year: i64,
    #[serde(rename = "TAMANHO_DESCRICAO")]
    description_len: i64,
    #[serde(rename = "TEMPO")]
    time: String,
}

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Row> {
    // (store, mean description length)
    let stores = [
        ("Magazine Luiza", 420.0),
        ("Casas Bahia", 510.0),
        ("Americanas", 380.0),
        ("Mercado Livre", 300.0),
        ("Amazon", 260.0),
    ];
    let states = ["SP", "RJ", "MG", "BA", "PR", "RS", "PE", "CE"];
    let statuses = ["Respondida", "Não respondida", "Resolvido", "Não resolvido", "Em réplica"];

    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default();
    let span_days = 4 * 365;

    (0..n)
        .map(|_| {
            let &(store, mean_len) = rng.pick(&stores);
            let day = (rng.next_u64() % span_days) as i64;
            let date = start + Duration::days(day);
            let description_len = rng.gauss(mean_len, mean_len * 0.35).round().max(20.0) as i64;
            Row {
                store: store.to_string(),
                state: rng.pick(&states).to_string(),
                status: rng.pick(&statuses).to_string(),
                year: date.year() as i64,
                description_len,
                time: format!("{} 12:00:00", date.format("%Y-%m-%d")),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let strings = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("LOJA", DataType::Utf8, false),
        Field::new("ESTADO", DataType::Utf8, false),
        Field::new("STATUS", DataType::Utf8, false),
        Field::new("ANO", DataType::Int64, false),
        Field::new("TAMANHO_DESCRICAO", DataType::Int64, false),
        Field::new("TEMPO", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(strings(|r| r.store.as_str())),
            Arc::new(strings(|r| r.state.as_str())),
            Arc::new(strings(|r| r.status.as_str())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.description_len).collect::<Vec<_>>(),
            )),
            Arc::new(strings(|r| r.time.as_str())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_complaints.csv".to_string());
    let output_path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(5_000, &mut rng);

    match output_path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => write_parquet(output_path, &rows)?,
        _ => write_csv(output_path, &rows)?,
    }

    println!("Wrote {} complaints to {output}", rows.len());
    Ok(())
}
