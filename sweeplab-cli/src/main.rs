//! SweepLab CLI: RSI window sweeps over daily CSV data.
//!
//! Commands:
//! - `sweep`: load a CSV series, sweep RSI window lengths, print the ranking
//!   and write report artifacts
//! - `synth`: write a seeded synthetic series as CSV

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sweeplab_core::synthetic::RandomWalk;
use sweeplab_runner::{
    load_csv, sweep, write_artifacts, write_csv, SweepConfig, SweepReport, TracingSink,
};

#[derive(Parser)]
#[command(
    name = "sweeplab",
    about = "SweepLab CLI: RSI window sweep optimizer"
)]
struct Cli {
    /// Debug-level logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep RSI window lengths over a CSV series and rank the results.
    Sweep(SweepArgs),
    /// Write a synthetic random-walk series as CSV.
    Synth {
        /// Number of trading days to generate.
        #[arg(long, default_value_t = 504)]
        days: usize,

        /// RNG seed; the same seed always yields the same series.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First calendar date (YYYY-MM-DD).
        #[arg(long, default_value = "2020-01-01")]
        start: String,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,
    },
}

/// Flags override values loaded from `--config`.
#[derive(Args)]
struct SweepArgs {
    /// CSV with header date,open,high,low,close,volume.
    #[arg(long)]
    data: PathBuf,

    /// TOML sweep configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbol label. Defaults to the data file stem.
    #[arg(long)]
    symbol: Option<String>,

    /// First window length.
    #[arg(long)]
    start: Option<usize>,

    /// Last window length (inclusive).
    #[arg(long)]
    end: Option<usize>,

    /// Window step.
    #[arg(long)]
    step: Option<usize>,

    /// Enter when RSI is strictly below this.
    #[arg(long)]
    enter: Option<f64>,

    /// Exit when RSI is strictly above this.
    #[arg(long)]
    exit: Option<f64>,

    /// Commission rate per leg.
    #[arg(long)]
    commission: Option<f64>,

    /// Levy rate on the sell leg.
    #[arg(long)]
    levy: Option<f64>,

    /// Annual risk-free rate.
    #[arg(long)]
    risk_free: Option<f64>,

    /// Initial cash.
    #[arg(long)]
    cash: Option<f64>,

    /// Worker threads (0 = one per core).
    #[arg(long)]
    workers: Option<usize>,

    /// Rows in the printed ranking.
    #[arg(long)]
    top: Option<usize>,

    /// Artifact directory.
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,
}

impl SweepArgs {
    fn resolve_config(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::from_file(path)?,
            None => SweepConfig::default(),
        };

        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        set(&mut config.window_start, self.start);
        set(&mut config.window_end, self.end);
        set(&mut config.window_step, self.step);
        set(&mut config.enter_below, self.enter);
        set(&mut config.exit_above, self.exit);
        set(&mut config.commission_rate, self.commission);
        set(&mut config.levy_rate, self.levy);
        set(&mut config.risk_free_rate, self.risk_free);
        set(&mut config.initial_cash, self.cash);
        set(&mut config.workers, self.workers);
        set(&mut config.top_n, self.top);
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sweep(args) => run_sweep_cmd(&args),
        Commands::Synth {
            days,
            seed,
            start,
            output,
        } => run_synth(days, seed, &start, &output),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,sweeplab_runner=debug,sweeplab=debug")
    } else {
        EnvFilter::new("info,sweeplab_runner=info,sweeplab=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .init();
}

fn run_sweep_cmd(args: &SweepArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let symbol = match &args.symbol {
        Some(s) => s.clone(),
        None => symbol_from_path(&args.data),
    };

    let series = load_csv(&args.data, &symbol)
        .with_context(|| format!("failed to load {}", args.data.display()))?;
    tracing::info!(
        symbol = %symbol,
        bars = series.len(),
        first = %series.first().date,
        last = %series.last().date,
        "series loaded"
    );

    let report = sweep(&series, &config, &TracingSink)?;
    print_summary(&report);

    let written = write_artifacts(&report, &args.output_dir)?;
    for path in &written {
        tracing::debug!(path = %path.display(), "artifact written");
    }
    println!("Artifacts saved to: {}", args.output_dir.display());

    Ok(())
}

fn run_synth(days: usize, seed: u64, start: &str, output: &Path) -> Result<()> {
    let start_date = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid --start date '{start}'"))?;
    let bars = RandomWalk::new(seed).bars(start_date, days);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_csv(file, &bars).with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(days = bars.len(), seed, path = %output.display(), "synthetic series written");
    Ok(())
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "SERIES".to_string())
}

fn print_summary(report: &SweepReport) {
    let identity = report.identity();
    let params = &identity.parameters;

    println!();
    println!("=== RSI Window Sweep ===");
    println!("Symbol:         {}", identity.symbol);
    println!("Bars:           {}", identity.bar_count);
    println!(
        "Windows:        {}..={} step {} ({} evaluated, {} failed)",
        params.window_start,
        params.window_end,
        params.window_step,
        report.ranked().len(),
        report.failures().len()
    );
    println!(
        "Thresholds:     enter < {}, exit > {}",
        params.enter_below, params.exit_above
    );
    println!("Fingerprint:    {}", identity.fingerprint);
    println!();

    match report.optimal() {
        Some(best) => {
            println!("--- Optimal ---");
            println!("Window:         {}", best.window);
            println!("Ratio:          {:.3}", best.ratio().unwrap_or_default());
            println!("Total Return:   {:.2}%", best.metrics.total_return * 100.0);
            println!("CAGR:           {:.2}%", best.metrics.cagr * 100.0);
            println!("Max Drawdown:   {:.2}%", best.metrics.max_drawdown * 100.0);
            println!("Win Rate:       {:.1}%", best.metrics.win_rate * 100.0);
            println!("Trades:         {}", best.metrics.trade_count);
        }
        None => println!("No window produced a defined ratio."),
    }
    if let Some(bh) = report.buy_and_hold().last() {
        let initial = params.initial_cash;
        println!(
            "Buy & Hold:     {:.2}%",
            (bh.equity - initial) / initial * 100.0
        );
    }
    println!();

    println!("--- Top {} ---", report.top().len());
    println!(
        "{:>4}  {:>6}  {:>8}  {:>9}  {:>8}  {:>6}",
        "Rank", "Window", "Ratio", "Return", "MaxDD", "Trades"
    );
    for (i, r) in report.top().iter().enumerate() {
        let ratio = r
            .ratio()
            .map(|v| format!("{v:.3}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{:>4}  {:>6}  {:>8}  {:>8.2}%  {:>7.2}%  {:>6}",
            i + 1,
            r.window,
            ratio,
            r.metrics.total_return * 100.0,
            r.metrics.max_drawdown * 100.0,
            r.metrics.trade_count
        );
    }

    for failure in report.failures() {
        println!("FAILED window {}: {}", failure.window, failure.reason);
    }
    println!();
}
