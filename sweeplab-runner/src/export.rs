//! Reporting and export: JSON, CSV and Markdown artifacts for a sweep.
//!
//! Every artifact is a pure function of the `SweepReport`, so re-exporting
//! the same report yields byte-identical files. The JSON document carries a
//! `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sweeplab_core::domain::Trade;

use crate::report::{FailedWindow, SweepReport, SCHEMA_VERSION};
use crate::runner::ConfigurationResult;

pub const REPORT_FILE: &str = "report.json";
pub const RANKING_FILE: &str = "ranking.csv";
pub const EQUITY_FILE: &str = "equity.csv";
pub const TRADES_FILE: &str = "trades.csv";
pub const FAILURES_FILE: &str = "failures.csv";
pub const SUMMARY_FILE: &str = "summary.md";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SweepReport` to pretty JSON.
pub fn export_json(report: &SweepReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SweepReport to JSON")
}

/// Deserialize a `SweepReport` from JSON, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<SweepReport> {
    let report: SweepReport =
        serde_json::from_str(json).context("failed to deserialize SweepReport from JSON")?;
    if report.schema_version() > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version(),
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per ranked result, best first. An undefined ratio is left blank.
pub fn ranking_csv(ranked: &[ConfigurationResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "window",
        "ratio",
        "total_return",
        "annualized_return",
        "annualized_volatility",
        "cagr",
        "max_drawdown",
        "win_rate",
        "profit_factor",
        "trade_count",
        "total_costs",
        "avg_bars_held",
        "exposure",
    ])?;

    for (i, r) in ranked.iter().enumerate() {
        let m = &r.metrics;
        wtr.write_record([
            &(i + 1).to_string(),
            &r.window.to_string(),
            &opt(m.ratio),
            &format!("{:.6}", m.total_return),
            &format!("{:.6}", m.annualized_return),
            &format!("{:.6}", m.annualized_volatility),
            &format!("{:.6}", m.cagr),
            &format!("{:.6}", m.max_drawdown),
            &format!("{:.4}", m.win_rate),
            &format!("{:.4}", m.profit_factor),
            &m.trade_count.to_string(),
            &format!("{:.2}", m.total_costs),
            &format!("{:.2}", m.avg_bars_held),
            &format!("{:.4}", m.exposure),
        ])?;
    }
    finish(wtr)
}

/// Dated equity of the optimal window next to buy-and-hold.
///
/// The `optimal` column is blank throughout when the sweep found no optimum.
pub fn equity_csv(report: &SweepReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "optimal", "buy_hold"])?;

    let optimal = report.optimal_curve();
    for (i, point) in report.buy_and_hold().iter().enumerate() {
        wtr.write_record([
            &point.date.to_string(),
            &opt(optimal.get(i).map(|p| p.equity)),
            &format!("{:.6}", point.equity),
        ])?;
    }
    finish(wtr)
}

/// Export a trade ledger.
pub fn trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_bar",
        "entry_date",
        "entry_price",
        "exit_bar",
        "exit_date",
        "exit_price",
        "exit_reason",
        "shares",
        "entry_commission",
        "exit_commission",
        "levy",
        "net_proceeds",
        "net_pnl",
        "holding_days",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_bar.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &format!("{:?}", t.exit_reason),
            &t.shares.to_string(),
            &format!("{:.2}", t.entry_commission),
            &format!("{:.2}", t.exit_commission),
            &format!("{:.2}", t.levy),
            &format!("{:.2}", t.net_proceeds),
            &format!("{:.2}", t.net_pnl),
            &t.holding_days.to_string(),
            &t.bars_held.to_string(),
        ])?;
    }
    finish(wtr)
}

pub fn failures_csv(failures: &[FailedWindow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["window", "reason"])?;
    for f in failures {
        wtr.write_record([f.window.to_string().as_str(), f.reason.as_str()])?;
    }
    finish(wtr)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the artifact set for a sweep into `output_dir`:
/// - `report.json`: the full `SweepReport`
/// - `ranking.csv`: every ranked window
/// - `equity.csv`: optimal vs buy-and-hold equity by date
/// - `trades.csv`: the optimal window's ledger (header only without an optimum)
/// - `summary.md`: Markdown overview from [`generate_summary`]
/// - `failures.csv`: only when at least one window failed
///
/// Returns the paths written, in that order.
pub fn write_artifacts(report: &SweepReport, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    let optimal_trades = report.optimal().map(|r| r.trades.as_slice()).unwrap_or(&[]);
    let mut files = vec![
        (REPORT_FILE, export_json(report)?),
        (RANKING_FILE, ranking_csv(report.ranked())?),
        (EQUITY_FILE, equity_csv(report)?),
        (TRADES_FILE, trades_csv(optimal_trades)?),
        (SUMMARY_FILE, generate_summary(report)),
    ];
    if !report.failures().is_empty() {
        files.push((FAILURES_FILE, failures_csv(report.failures())?));
    }

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        let path = output_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Load a `SweepReport` from an artifact directory's report.json.
pub fn load_report(dir: &Path) -> Result<SweepReport> {
    let path = dir.join(REPORT_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown summary ───────────────────────────────────────────────

/// Markdown summary of a sweep: identity, optimum and the top-N table.
pub fn generate_summary(report: &SweepReport) -> String {
    let mut md = String::with_capacity(2048);
    let identity = report.identity();
    let params = &identity.parameters;

    md.push_str("# RSI Window Sweep\n\n");

    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Symbol | {} |\n", identity.symbol));
    md.push_str(&format!("| Bars | {} |\n", identity.bar_count));
    md.push_str(&format!(
        "| Windows | {}..={} step {} |\n",
        params.window_start, params.window_end, params.window_step
    ));
    md.push_str(&format!(
        "| Thresholds | enter < {}, exit > {} |\n",
        params.enter_below, params.exit_above
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", identity.dataset_hash));
    md.push_str(&format!("| Fingerprint | {} |\n", identity.fingerprint));
    md.push('\n');

    match report.optimal() {
        Some(best) => md.push_str(&format!(
            "**Optimal window: {}** (ratio {}, total return {:.2}%)\n\n",
            best.window,
            f3(best.ratio()),
            best.total_return() * 100.0
        )),
        None => md.push_str("**No window produced a defined ratio.**\n\n"),
    }

    md.push_str("| Rank | Window | Ratio | Return | Max DD | Win Rate | Trades |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for (i, r) in report.top().iter().enumerate() {
        let m = &r.metrics;
        md.push_str(&format!(
            "| {} | {} | {} | {:.2}% | {:.2}% | {:.1}% | {} |\n",
            i + 1,
            r.window,
            f3(m.ratio),
            m.total_return * 100.0,
            m.max_drawdown * 100.0,
            m.win_rate * 100.0,
            m.trade_count
        ));
    }

    if !report.failures().is_empty() {
        md.push_str("\n## Failed Windows\n\n");
        for f in report.failures() {
            md.push_str(&format!("- {}: {}\n", f.window, f.reason));
        }
    }

    md
}

fn f3(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "n/a".into())
}
