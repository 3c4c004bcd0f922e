//! Window sweep: fans the per-window pipeline out over a rayon pool.
//!
//! Every window is an independent, pure unit of work. The series is shared
//! read-only; each worker owns its indicator, signals, position and ledger.
//! Results are collected in window order, so ranking never sees completion
//! order, and the report is built by the calling thread after the join.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use sweeplab_core::domain::PriceSeries;

use crate::benchmark::{buy_and_hold, dated_curve};
use crate::config::{ConfigError, SweepConfig, SweepPlan};
use crate::data_loader::dataset_hash;
use crate::events::{ProgressSink, SweepEvent};
use crate::report::{FailedWindow, ReportIdentity, SweepReport};
use crate::runner::{run_window, ConfigurationResult, WindowError};

/// Errors that abort a whole sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

enum WindowOutcome {
    Evaluated(ConfigurationResult),
    Failed(FailedWindow),
}

/// Validate `config`, then sweep.
pub fn sweep(
    series: &PriceSeries,
    config: &SweepConfig,
    sink: &dyn ProgressSink,
) -> Result<SweepReport, SweepError> {
    let plan = config.plan()?;
    run_sweep(series, &plan, sink)
}

/// Evaluate every window in `plan` against `series` and build the report.
///
/// Per-window errors and panics are captured as `FailedWindow`s; the sweep
/// continues. Only pool construction can fail the sweep itself.
pub fn run_sweep(
    series: &PriceSeries,
    plan: &SweepPlan,
    sink: &dyn ProgressSink,
) -> Result<SweepReport, SweepError> {
    run_sweep_with(series, plan, sink, run_window)
}

/// `run_sweep` with a caller-supplied per-window pipeline.
pub fn run_sweep_with<F>(
    series: &PriceSeries,
    plan: &SweepPlan,
    sink: &dyn ProgressSink,
    pipeline: F,
) -> Result<SweepReport, SweepError>
where
    F: Fn(&PriceSeries, usize, &SweepPlan) -> Result<ConfigurationResult, WindowError> + Sync,
{
    for warning in series.warnings() {
        sink.emit(&SweepEvent::ValidationWarning {
            message: warning.to_string(),
        });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.workers())
        .thread_name(|i| format!("sweep-worker-{i}"))
        .build()?;

    let total = plan.windows().len();
    let completed = AtomicUsize::new(0);
    let progress = Progress {
        total,
        completed: &completed,
        sink,
    };

    tracing::debug!(
        symbol = series.symbol(),
        windows = total,
        workers = pool.current_num_threads(),
        "sweep started"
    );

    let outcomes: Vec<WindowOutcome> = pool.install(|| {
        plan.windows()
            .par_iter()
            .map(|&window| evaluate_window(&progress, window, || pipeline(series, window, plan)))
            .collect()
    });

    let mut results = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            WindowOutcome::Evaluated(result) => results.push(result),
            WindowOutcome::Failed(failure) => failures.push(failure),
        }
    }

    let identity = ReportIdentity {
        symbol: series.symbol().to_string(),
        bar_count: series.len(),
        dataset_hash: dataset_hash(series.bars()),
        fingerprint: plan.fingerprint().to_string(),
        parameters: plan.parameters().clone(),
    };
    let report = SweepReport::build(
        identity,
        results,
        failures,
        plan.top_n(),
        buy_and_hold(series, plan.simulation()),
        |values| dated_curve(series, values),
    );

    if let Some((window, ratio)) = report
        .optimal()
        .and_then(|best| best.ratio().map(|ratio| (best.window, ratio)))
    {
        sink.emit(&SweepEvent::OptimumFound { window, ratio });
    }
    sink.emit(&SweepEvent::SweepFinished {
        evaluated: report.ranked().len(),
        failed: report.failures().len(),
        total,
    });

    Ok(report)
}

struct Progress<'a> {
    total: usize,
    completed: &'a AtomicUsize,
    sink: &'a dyn ProgressSink,
}

fn evaluate_window<P>(progress: &Progress<'_>, window: usize, pipeline: P) -> WindowOutcome
where
    P: FnOnce() -> Result<ConfigurationResult, WindowError>,
{
    let Progress {
        total,
        completed,
        sink,
    } = *progress;
    sink.emit(&SweepEvent::ConfigurationStarted { window });

    let outcome = catch_unwind(AssertUnwindSafe(pipeline));
    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;

    let reason = match outcome {
        Ok(Ok(result)) => {
            sink.emit(&SweepEvent::ConfigurationCompleted {
                window,
                completed: done,
                total,
                ratio: result.ratio(),
            });
            return WindowOutcome::Evaluated(result);
        }
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };

    sink.emit(&SweepEvent::ConfigurationFailed {
        window,
        completed: done,
        total,
        reason: reason.clone(),
    });
    WindowOutcome::Failed(FailedWindow { window, reason })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CollectingSink, NullSink};
    use chrono::NaiveDate;
    use sweeplab_core::synthetic::RandomWalk;

    fn walk(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        RandomWalk::new(11).series("SYN", start, n).unwrap()
    }

    #[test]
    fn sweeps_every_window() {
        let series = walk(300);
        let config = SweepConfig {
            window_start: 2,
            window_end: 20,
            window_step: 3,
            workers: 2,
            ..SweepConfig::default()
        };
        let report = sweep(&series, &config, &NullSink).unwrap();
        assert_eq!(report.total_windows(), 7);
        assert!(report.failures().is_empty());
        assert_eq!(report.buy_and_hold().len(), 300);
    }

    #[test]
    fn invalid_config_fails_before_work() {
        let series = walk(50);
        let sink = CollectingSink::new();
        let config = SweepConfig {
            window_step: 0,
            ..SweepConfig::default()
        };
        let err = sweep(&series, &config, &sink).unwrap_err();
        assert!(matches!(err, SweepError::Config(ConfigError::ZeroStep)));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn emits_progress_for_each_window() {
        let series = walk(120);
        let sink = CollectingSink::new();
        let config = SweepConfig {
            window_start: 3,
            window_end: 8,
            workers: 3,
            ..SweepConfig::default()
        };
        sweep(&series, &config, &sink).unwrap();

        let events = sink.events();
        let started = events
            .iter()
            .filter(|e| matches!(e, SweepEvent::ConfigurationStarted { .. }))
            .count();
        let mut counts: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                SweepEvent::ConfigurationCompleted { completed, .. } => Some(*completed),
                _ => None,
            })
            .collect();
        counts.sort_unstable();
        assert_eq!(started, 6);
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            events.last(),
            Some(SweepEvent::SweepFinished {
                evaluated: 6,
                failed: 0,
                total: 6
            })
        ));
    }

    #[test]
    fn panic_message_extracts_text() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "panicked: boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "panicked: bang");
    }
}
