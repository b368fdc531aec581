use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Spectrum, TimeSeries};

/// Column names accepted for each spectrum column in headed formats.
const FREQUENCY_NAMES: &[&str] = &["frequency", "freq", "f"];
const AMPLITUDE_NAMES: &[&str] = &["amplitude", "amp", "a"];
const PHASE_NAMES: &[&str] = &["phase", "phi"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a spectrum from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.dat` / `.txt` – one header row, then whitespace-separated
///   `frequency amplitude phase [extra…]` rows
/// * `.csv`          – header with `frequency`, `amplitude`, `phase` columns
/// * `.json`         – `{ "frequency": [...], "amplitude": [...], "phase": [...] }`
///   or `[{ "frequency": f, "amplitude": a, "phase": p }, ...]`
/// * `.parquet`      – `frequency`, `amplitude`, `phase` float columns
pub fn load_spectrum(path: &Path) -> Result<Spectrum> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let spectrum = match ext.as_str() {
        "dat" | "txt" => load_dat_spectrum(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading spectrum {}", path.display()))?;

    log::info!(
        "Loaded spectrum with {} harmonics from {}",
        spectrum.len(),
        path.display()
    );
    Ok(spectrum)
}

/// Load a measured `(time, value)` record from a whitespace table with one
/// header row.
pub fn load_time_series(path: &Path) -> Result<TimeSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut columns = parse_table(&text, 2)
        .with_context(|| format!("parsing {}", path.display()))?;
    let values = columns.pop().unwrap_or_default();
    let time = columns.pop().unwrap_or_default();

    log::info!("Loaded {} samples from {}", time.len(), path.display());
    Ok(TimeSeries { time, values })
}

// ---------------------------------------------------------------------------
// Whitespace table loader
// ---------------------------------------------------------------------------

fn load_dat_spectrum(path: &Path) -> Result<Spectrum> {
    let text = std::fs::read_to_string(path).context("reading table file")?;
    let mut columns = parse_table(&text, 3)?;
    let phases = columns.pop().unwrap_or_default();
    let amplitudes = columns.pop().unwrap_or_default();
    let frequencies = columns.pop().unwrap_or_default();
    Ok(Spectrum::new(frequencies, amplitudes, phases)?)
}

/// Parse a headed whitespace table and return its first `n_columns` columns.
///
/// The first line is the header and is skipped.  Blank lines and `#` comments
/// are ignored; columns past `n_columns` are ignored.
fn parse_table(text: &str, n_columns: usize) -> Result<Vec<Vec<f64>>> {
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); n_columns];

    for (line_no, line) in text.lines().enumerate().skip(1) {
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.len() < n_columns {
            bail!(
                "line {}: expected at least {n_columns} columns, found {}",
                line_no + 1,
                tokens.len()
            );
        }

        for (col, tok) in tokens.iter().take(n_columns).enumerate() {
            let value = tok.parse::<f64>().with_context(|| {
                format!("line {}, column {}: '{tok}' is not a number", line_no + 1, col + 1)
            })?;
            columns[col].push(value);
        }
    }

    Ok(columns)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming the columns, one harmonic per row.
/// Column order is free; unknown columns are ignored.
fn load_csv(path: &Path) -> Result<Spectrum> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let f_idx = find_column(&headers, FREQUENCY_NAMES).context("CSV missing 'frequency' column")?;
    let a_idx = find_column(&headers, AMPLITUDE_NAMES).context("CSV missing 'amplitude' column")?;
    let p_idx = find_column(&headers, PHASE_NAMES).context("CSV missing 'phase' column")?;

    let mut frequencies = Vec::new();
    let mut amplitudes = Vec::new();
    let mut phases = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize, name: &str| -> Result<f64> {
            let tok = record.get(idx).unwrap_or("");
            tok.parse::<f64>()
                .with_context(|| format!("Row {row_no}, {name}: '{tok}' is not a number"))
        };
        frequencies.push(cell(f_idx, "frequency")?);
        amplitudes.push(cell(a_idx, "amplitude")?);
        phases.push(cell(p_idx, "phase")?);
    }

    Ok(Spectrum::new(frequencies, amplitudes, phases)?)
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonHarmonic {
    #[serde(alias = "freq", alias = "f")]
    frequency: f64,
    #[serde(alias = "amp", alias = "a")]
    amplitude: f64,
    #[serde(alias = "phi", default)]
    phase: f64,
}

/// Column-oriented (`df.to_json(orient='list')`) or records-oriented layout.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSpectrum {
    Columns {
        #[serde(alias = "freq", alias = "f")]
        frequency: Vec<f64>,
        #[serde(alias = "amp", alias = "a")]
        amplitude: Vec<f64>,
        #[serde(alias = "phi")]
        phase: Vec<f64>,
    },
    Records(Vec<JsonHarmonic>),
}

fn load_json(path: &Path) -> Result<Spectrum> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let parsed: JsonSpectrum = serde_json::from_str(&text).context("parsing JSON")?;

    let spectrum = match parsed {
        JsonSpectrum::Columns {
            frequency,
            amplitude,
            phase,
        } => Spectrum::new(frequency, amplitude, phase)?,
        JsonSpectrum::Records(rows) => Spectrum::new(
            rows.iter().map(|h| h.frequency).collect(),
            rows.iter().map(|h| h.amplitude).collect(),
            rows.iter().map(|h| h.phase).collect(),
        )?,
    };
    Ok(spectrum)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one harmonic per row.
///
/// Expected schema: `frequency`, `amplitude`, `phase` as Float64 or Float32.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Spectrum> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut frequencies = Vec::new();
    let mut amplitudes = Vec::new();
    let mut phases = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        frequencies.extend(float_column(&batch, FREQUENCY_NAMES)?);
        amplitudes.extend(float_column(&batch, AMPLITUDE_NAMES)?);
        phases.extend(float_column(&batch, PHASE_NAMES)?);
    }

    Ok(Spectrum::new(frequencies, amplitudes, phases)?)
}

// -- Parquet / Arrow helpers --

/// Locate a float column by any of its accepted names and widen it to `f64`.
fn float_column(batch: &RecordBatch, names: &[&str]) -> Result<Vec<f64>> {
    let schema = batch.schema();
    let idx = schema
        .fields()
        .iter()
        .position(|field| names.contains(&field.name().to_ascii_lowercase().as_str()))
        .with_context(|| format!("Parquet file missing '{}' column", names[0]))?;

    let col: &Arc<dyn Array> = batch.column(idx);
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "Column '{}' is {:?}, expected Float64 or Float32",
            names[0],
            col.data_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn dat_skips_header_and_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectre.dat");
        fs::write(
            &path,
            "f A phi n\n0 0.5 0 0\n50 1.27 -1.5708 1\n\n150 0.42 -1.5708 3 # third\n",
        )
        .unwrap();

        let sp = load_spectrum(&path).unwrap();
        assert_eq!(sp.frequencies(), &[0.0, 50.0, 150.0]);
        assert_eq!(sp.amplitudes(), &[0.5, 1.27, 0.42]);
        assert_eq!(sp.phases()[1], -1.5708);
    }

    #[test]
    fn dat_reports_bad_token_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.dat");
        fs::write(&path, "f A phi\n1 2 3\n4 five 6\n").unwrap();

        let err = format!("{:#}", load_spectrum(&path).unwrap_err());
        assert!(err.contains("line 3, column 2"), "{err}");
        assert!(err.contains("five"), "{err}");
    }

    #[test]
    fn dat_rejects_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.txt");
        fs::write(&path, "f A phi\n1 2\n").unwrap();
        assert!(load_spectrum(&path).is_err());
    }

    #[test]
    fn time_series_uses_two_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temperatures.dat");
        fs::write(&path, "t T\n0 12.5\n1 13.0\n2 12.0\n").unwrap();

        let ts = load_time_series(&path).unwrap();
        assert_eq!(ts.time, vec![0.0, 1.0, 2.0]);
        assert_eq!(ts.values, vec![12.5, 13.0, 12.0]);
    }

    #[test]
    fn csv_columns_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrum.csv");
        fs::write(&path, "phase, Frequency, amplitude, note\n0, 1, 2, a\n0.5, 3, 0.7, b\n").unwrap();

        let sp = load_spectrum(&path).unwrap();
        assert_eq!(sp.frequencies(), &[1.0, 3.0]);
        assert_eq!(sp.amplitudes(), &[2.0, 0.7]);
        assert_eq!(sp.phases(), &[0.0, 0.5]);
    }

    #[test]
    fn csv_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrum.csv");
        fs::write(&path, "frequency,amplitude\n1,2\n").unwrap();

        let err = format!("{:#}", load_spectrum(&path).unwrap_err());
        assert!(err.contains("phase"), "{err}");
    }

    #[test]
    fn json_both_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let columns = dir.path().join("columns.json");
        fs::write(&columns, r#"{"frequency":[1,2],"amplitude":[3,4],"phase":[0,0.1]}"#).unwrap();
        let records = dir.path().join("records.json");
        fs::write(
            &records,
            r#"[{"f":1,"a":3},{"frequency":2,"amplitude":4,"phase":0.1}]"#,
        )
        .unwrap();

        assert_eq!(load_spectrum(&columns).unwrap(), load_spectrum(&records).unwrap());
    }

    #[test]
    fn json_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"frequency":[1,2],"amplitude":[3],"phase":[0,0]}"#).unwrap();
        let err = format!("{:#}", load_spectrum(&path).unwrap_err());
        assert!(err.contains("column lengths differ"), "{err}");
    }

    #[test]
    fn parquet_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectrum.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("frequency", DataType::Float64, false),
            Field::new("amplitude", DataType::Float32, false),
            Field::new("phase", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![0.0, 50.0])),
                Arc::new(Float32Array::from(vec![0.5f32, 1.25])),
                Arc::new(Float64Array::from(vec![0.0, -1.0])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let sp = load_spectrum(&path).unwrap();
        assert_eq!(sp.frequencies(), &[0.0, 50.0]);
        assert_eq!(sp.amplitudes(), &[0.5, 1.25]);
        assert_eq!(sp.phases(), &[0.0, -1.0]);
    }

    #[test]
    fn unknown_extension() {
        let err = load_spectrum(Path::new("spectrum.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
