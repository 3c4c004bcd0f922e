//! SweepLab Runner: window sweep orchestration, metrics, ranking, export.
//!
//! This crate builds on `sweeplab-core` to provide:
//! - Sweep configuration with TOML loading, validation and fingerprinting
//! - Performance metrics over an equity curve and trade ledger
//! - The per-window pipeline and the parallel sweep over a rayon pool
//! - Ranked, immutable sweep reports with a buy-and-hold benchmark
//! - Progress events routed through caller-supplied sinks
//! - CSV data loading and artifact export

pub mod benchmark;
pub mod config;
pub mod data_loader;
pub mod events;
pub mod export;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;

pub use benchmark::{buy_and_hold, EquityPoint};
pub use config::{ConfigError, SweepConfig, SweepParameters, SweepPlan};
pub use data_loader::{dataset_hash, load_csv, read_bars, write_csv, LoadError};
pub use events::{CollectingSink, NullSink, ProgressSink, SweepEvent, TracingSink};
pub use export::{export_json, generate_summary, import_json, load_report, write_artifacts};
pub use metrics::PerformanceMetrics;
pub use report::{rank_results, FailedWindow, ReportIdentity, SweepReport, SCHEMA_VERSION};
pub use runner::{run_window, ConfigurationResult, WindowError};
pub use sweep::{run_sweep, run_sweep_with, sweep, SweepError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn plan_is_shared_across_workers() {
        assert_send::<SweepPlan>();
        assert_sync::<SweepPlan>();
    }

    #[test]
    fn configuration_result_crosses_threads() {
        assert_send::<ConfigurationResult>();
        assert_send::<PerformanceMetrics>();
        assert_send::<FailedWindow>();
    }

    #[test]
    fn sinks_are_send_sync() {
        assert_send::<NullSink>();
        assert_sync::<NullSink>();
        assert_send::<CollectingSink>();
        assert_sync::<CollectingSink>();
        assert_send::<TracingSink>();
        assert_sync::<TracingSink>();
    }

    #[test]
    fn report_is_send_sync() {
        assert_send::<SweepReport>();
        assert_sync::<SweepReport>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<SweepError>();
        assert_sync::<SweepError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
