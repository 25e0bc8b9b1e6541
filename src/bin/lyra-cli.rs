use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::Parser;
use env_logger::Env;

use lyra::app::run_viewer;
use lyra::batch::{pair_inputs, process_batch, validate_period, BatchOptions};
use lyra::config::{load_plot_config, parse_pair, parse_size, PlotConfig};
use lyra::figure::build_figure;
use lyra::phase::PhaseMode;

const EXIT_FAILED: u8 = 1;
const EXIT_INVALID: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Phase-fold observation files and plot their light curves", long_about = None)]
struct Cli {
    /// Data files to process (.csv, .tbl, .xlsx, .xls)
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Labels for each data file, in the same order
    #[arg(short, long, num_args = 1..)]
    labels: Vec<String>,

    /// Plot title [default: Partial Lightcurve]
    #[arg(short, long)]
    title: Option<String>,

    /// Period of the orbit or rotation, in days
    #[arg(short, long, default_value_t = 1.0)]
    period: f64,

    /// Drop rows with missing values before folding
    #[arg(short, long)]
    clean: bool,

    /// Keep the phase in period units instead of dividing by the period
    #[arg(long)]
    raw_phase: bool,

    /// Draw error bars from Source_AMag_Err_T1
    #[arg(long)]
    error_bars: bool,

    /// Plot magnitudes upright (bright points at the bottom)
    #[arg(long)]
    no_invert: bool,

    /// Hide grid lines
    #[arg(long)]
    no_grid: bool,

    /// Figure size in inches, e.g. "10,6"
    #[arg(long)]
    figsize: Option<String>,

    /// X-axis limits, e.g. "0,1"
    #[arg(long)]
    xlim: Option<String>,

    #[arg(long)]
    xlabel: Option<String>,

    #[arg(long)]
    ylabel: Option<String>,

    /// Decimal places of x-axis tick labels
    #[arg(long)]
    x_decimals: Option<usize>,

    /// JSON file with plot settings; other options override it
    #[arg(long)]
    plot_config: Option<PathBuf>,

    /// Fold and report, but do not open the plot window
    #[arg(long)]
    no_plot: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(EXIT_FAILED)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let inputs = match pair_inputs(&cli.files, &cli.labels) {
        Ok(inputs) => inputs,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::from(EXIT_INVALID));
        }
    };
    let period = match validate_period(cli.period) {
        Ok(period) => period,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::from(EXIT_INVALID));
        }
    };
    let config = match plot_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return Ok(ExitCode::from(EXIT_INVALID));
        }
    };

    let options = BatchOptions {
        period,
        clean: cli.clean,
        mode: PhaseMode::from_div(!cli.raw_phase),
    };
    let report = process_batch(&inputs, &options);

    for record in &report.records {
        println!(
            "{}: {} rows, phase {} .. {}",
            record.label,
            record.table.len(),
            format_phase(record.first_phase),
            format_phase(record.last_phase)
        );
    }
    if report.records.is_empty() {
        eprintln!("Error: none of the {} files could be processed", inputs.len());
        return Ok(ExitCode::from(EXIT_FAILED));
    }

    let figure = build_figure(&report.records, &config);
    let mut diagnostics = report.failure_messages();
    diagnostics.extend(
        figure
            .failures
            .iter()
            .map(|f| format!("Cannot plot '{}': {}", f.label, f.error)),
    );
    if figure.series.is_empty() {
        eprintln!("Error: no series could be plotted");
        return Ok(ExitCode::from(EXIT_FAILED));
    }

    if cli.no_plot {
        return Ok(ExitCode::SUCCESS);
    }
    run_viewer(figure, diagnostics).map_err(|e| anyhow!("opening plot window: {e}"))?;
    Ok(ExitCode::SUCCESS)
}

/// JSON file (if any) first, then individual command-line overrides.
fn plot_config(cli: &Cli) -> Result<PlotConfig> {
    let mut config = match &cli.plot_config {
        Some(path) => load_plot_config(path)?,
        None => PlotConfig::default(),
    };

    if let Some(title) = &cli.title {
        config.title = title.clone();
    }
    if let Some(text) = &cli.figsize {
        config.figsize = parse_size(text).map_err(|e| anyhow!("--figsize: {e}"))?;
    }
    if let Some(text) = &cli.xlim {
        config.xlim = parse_pair(text).map_err(|e| anyhow!("--xlim: {e}"))?;
    }
    if let Some(xlabel) = &cli.xlabel {
        config.xlabel = xlabel.clone();
    }
    if let Some(ylabel) = &cli.ylabel {
        config.ylabel = ylabel.clone();
    }
    if let Some(decimals) = cli.x_decimals {
        config.x_tick_decimals = decimals;
    }
    if cli.raw_phase && cli.xlim.is_none() && cli.plot_config.is_none() {
        config.xlim = (0.0, cli.period);
    }
    config.error_bars |= cli.error_bars;
    config.invert_yaxis &= !cli.no_invert;
    config.grid &= !cli.no_grid;
    Ok(config)
}

fn format_phase(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}
