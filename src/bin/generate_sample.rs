use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Write synthetic eclipsing-binary observations as .csv and .tbl files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to write the nights into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Orbital period in days
    #[arg(short, long, default_value_t = 0.3517)]
    period: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Light curve with a primary eclipse at phase 0 and a secondary at phase 0.5.
fn model_magnitude(phase: f64) -> f64 {
    let eclipse = |center: f64, depth: f64, width: f64| {
        let mut d = (phase - center).abs();
        d = d.min(1.0 - d);
        depth * (-(d * d) / (2.0 * width * width)).exp()
    };
    12.40 + 0.08 * (4.0 * PI * phase).cos().mul_add(-0.5, 0.5)
        + eclipse(0.0, 0.62, 0.045)
        + eclipse(0.5, 0.31, 0.045)
}

/// Airmass of a target that transits mid-night, from hours since transit.
fn airmass(hours_from_transit: f64) -> f64 {
    let altitude = (70.0 - 9.0 * hours_from_transit.abs()).max(15.0).to_radians();
    1.0 / altitude.sin()
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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

struct Night {
    file: &'static str,
    delimiter: u8,
    start_bjd: f64,
    hours: f64,
    /// Leave a few cells blank so `--clean` has something to do.
    gaps: bool,
}

const NIGHTS: [Night; 3] = [
    Night {
        file: "night1.csv",
        delimiter: b',',
        start_bjd: 2459000.58,
        hours: 5.5,
        gaps: false,
    },
    Night {
        file: "night2.tbl",
        delimiter: b'\t',
        start_bjd: 2459003.61,
        hours: 4.0,
        gaps: true,
    },
    Night {
        file: "night3.csv",
        delimiter: b',',
        start_bjd: 2459007.55,
        hours: 6.0,
        gaps: true,
    },
];

const CADENCE_DAYS: f64 = 120.0 / 86_400.0;

fn write_night(dir: &Path, night: &Night, period: f64, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join(night.file);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(night.delimiter)
        .from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "",
        "J.D.-2400000",
        "BJD_TDB",
        "AIRMASS",
        "Source_AMag_T1",
        "Source_AMag_Err_T1",
    ])?;

    let n = (night.hours / 24.0 / CADENCE_DAYS) as usize;
    for i in 0..n {
        let bjd = night.start_bjd + i as f64 * CADENCE_DAYS;
        let hours_from_transit = (i as f64 / n as f64 - 0.5) * night.hours;
        let am = airmass(hours_from_transit);
        let err = 0.004 + 0.003 * (am - 1.0);
        let mag = model_magnitude((bjd % period) / period) + rng.gauss(0.0, err);

        let blank = night.gaps && rng.next_f64() < 0.02;
        let mag_text = if blank { String::new() } else { format!("{mag:.5}") };

        writer.write_record([
            (i + 1).to_string(),
            format!("{:.6}", bjd - 2_400_000.0),
            format!("{bjd:.6}"),
            format!("{am:.4}"),
            mag_text,
            format!("{err:.5}"),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {n} observations to {}", path.display());
    Ok(n)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let mut rng = SimpleRng::new(cli.seed);
    let mut total = 0;
    for night in &NIGHTS {
        total += write_night(&cli.out_dir, night, cli.period, &mut rng)?;
    }

    println!(
        "{total} observations over {} nights; try: lyra-cli {} -l {} -p {}",
        NIGHTS.len(),
        NIGHTS
            .iter()
            .map(|n| cli.out_dir.join(n.file).display().to_string())
            .collect::<Vec<_>>()
            .join(" "),
        NIGHTS.iter().map(|n| n.file.split('.').next().unwrap_or(n.file)).collect::<Vec<_>>().join(" "),
        cli.period
    );
    Ok(())
}
