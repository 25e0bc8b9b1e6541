use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use lyra::convert::{convert_file, DEFAULT_BAND};

/// Convert AstroImageJ photometry tables for the AAVSO VStar program.
///
/// The result is written next to each input as `<name>_aavso_converted.txt`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Photometry files (.csv, .tbl, .xlsx, .xls)
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Target star name for the 'Star Name' column
    #[arg(short, long)]
    star: String,

    /// Photometric band of the observation
    #[arg(short, long, default_value = DEFAULT_BAND)]
    band: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut failed = 0usize;

    for file in &cli.files {
        match convert_file(file, &cli.star, &cli.band) {
            Ok(output) => println!("Success: data saved to {}", output.display()),
            Err(e) => {
                log::error!("Converting {}: {e}", file.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files could not be converted", cli.files.len());
    }
    Ok(())
}
