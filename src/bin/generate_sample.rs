use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write the sample data files read by fourier-lab.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", about = "Write sample spectra and a temperature record")]
struct Args {
    /// Output directory
    #[arg(value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Fundamental of the square wave (Hz)
    #[arg(long, default_value_t = 50.0)]
    square_hz: f64,

    /// Odd harmonics written to the square-wave spectrum
    #[arg(long, default_value_t = 60)]
    square_harmonics: usize,
}

/// One `(frequency, amplitude, phase)` row.
type Harmonic = (f64, f64, f64);

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
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        mean + std_dev * z
    }
}

/// DC row followed by the odd harmonics of a unit square wave.
fn square_spectrum(fundamental: f64, n_odd: usize) -> Vec<Harmonic> {
    let mut rows = vec![(0.0, 0.0, 0.0)];
    rows.extend((0..n_odd).map(|k| {
        let order = (2 * k + 1) as f64;
        (fundamental * order, 4.0 / (PI * order), -FRAC_PI_2)
    }));
    rows
}

/// Yearly and half-yearly cycles around a mean, frequencies in 1/day.
fn temperature_spectrum() -> Vec<Harmonic> {
    let year = 1.0 / 365.0;
    vec![(0.0, 15.2, 0.0), (year, 7.9, PI - 0.35), (2.0 * year, 1.1, 0.6)]
}

fn write_spectrum(path: &Path, rows: &[Harmonic]) -> Result<()> {
    let mut text = String::from("f\tA\tphi\n");
    for (f, a, phi) in rows {
        writeln!(text, "{f:.8}\t{a:.8}\t{phi:.8}")?;
    }
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_temperatures(path: &Path, spectrum: &[Harmonic], rng: &mut SimpleRng) -> Result<()> {
    let mut text = String::from("t\tT\n");
    for day in 0..730 {
        let t = day as f64;
        let clean: f64 = spectrum
            .iter()
            .map(|&(f, a, phi)| a * (TAU * f * t + phi).cos())
            .sum();
        writeln!(text, "{t}\t{:.2}", clean + rng.gauss(0.0, 2.0))?;
    }
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_parquet(path: &Path, rows: &[Harmonic]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("frequency", DataType::Float64, false),
        Field::new("amplitude", DataType::Float64, false),
        Field::new("phase", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.0))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.1))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.2))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let out = |name: &str| args.out_dir.join(name);
    let mut rng = SimpleRng::new(42);

    let square = square_spectrum(args.square_hz, args.square_harmonics);
    write_spectrum(&out("spectre_carre.dat"), &square)?;
    write_parquet(&out("spectre_carre.parquet"), &square)?;

    let temperatures = temperature_spectrum();
    write_spectrum(&out("spectre_temperatures.dat"), &temperatures)?;
    write_temperatures(&out("temperatures_marseille.dat"), &temperatures, &mut rng)?;

    // 2:3 Lissajous figure: both spectra share their sampling window.
    write_spectrum(
        &out("spectre_x.dat"),
        &[(0.0, 0.0, 0.0), (2.0, 1.0, 0.0), (3.0, 0.0, 0.0)],
    )?;
    write_spectrum(
        &out("spectre_y.dat"),
        &[(0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (3.0, 1.0, -FRAC_PI_2)],
    )?;

    println!(
        "Wrote square wave ({} harmonics), temperature record and mystery spectra to {}",
        square.len(),
        args.out_dir.display()
    );
    Ok(())
}
