//! Sweep report: ranking, top-N, optimum, and reproducibility identity.
//!
//! A `SweepReport` is assembled exactly once, after every worker has joined,
//! and is immutable afterwards. Nothing in it depends on wall-clock time,
//! completion order or worker count.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::benchmark::EquityPoint;
use crate::config::SweepParameters;
use crate::runner::ConfigurationResult;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// A window whose pipeline faulted. Reported, never ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedWindow {
    pub window: usize,
    pub reason: String,
}

/// Total order over results.
///
/// Defined ratio descending, then total return descending, then window
/// ascending. Every undefined ratio ranks after every defined one.
pub fn rank_order(a: &ConfigurationResult, b: &ConfigurationResult) -> Ordering {
    let by_ratio = match (a.ratio(), b.ratio()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_ratio
        .then_with(|| b.total_return().total_cmp(&a.total_return()))
        .then_with(|| a.window.cmp(&b.window))
}

/// Sort results into rank order.
pub fn rank_results(results: &mut [ConfigurationResult]) {
    results.sort_by(rank_order);
}

/// Identity of the inputs a report was produced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportIdentity {
    pub symbol: String,
    pub bar_count: usize,
    /// BLAKE3 over every bar.
    pub dataset_hash: String,
    /// BLAKE3 over the result-affecting parameters.
    pub fingerprint: String,
    pub parameters: SweepParameters,
}

/// Final, immutable output of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    identity: ReportIdentity,
    ranked: Vec<ConfigurationResult>,
    failures: Vec<FailedWindow>,
    top_n: usize,
    optimal_curve: Vec<EquityPoint>,
    buy_and_hold: Vec<EquityPoint>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SweepReport {
    /// Rank `results` and freeze the report.
    ///
    /// `optimal_curve` is derived from the top-ranked result when its ratio is
    /// defined; `dated` attaches dates to a bare equity curve.
    pub(crate) fn build(
        identity: ReportIdentity,
        mut results: Vec<ConfigurationResult>,
        mut failures: Vec<FailedWindow>,
        top_n: usize,
        buy_and_hold: Vec<EquityPoint>,
        dated: impl Fn(&[f64]) -> Vec<EquityPoint>,
    ) -> Self {
        rank_results(&mut results);
        failures.sort_by_key(|f| f.window);

        let optimal_curve = results
            .first()
            .filter(|r| r.ratio().is_some())
            .map(|r| dated(&r.equity_curve))
            .unwrap_or_default();

        Self {
            schema_version: SCHEMA_VERSION,
            identity,
            ranked: results,
            failures,
            top_n,
            optimal_curve,
            buy_and_hold,
        }
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn identity(&self) -> &ReportIdentity {
        &self.identity
    }

    pub fn symbol(&self) -> &str {
        &self.identity.symbol
    }

    pub fn fingerprint(&self) -> &str {
        &self.identity.fingerprint
    }

    pub fn dataset_hash(&self) -> &str {
        &self.identity.dataset_hash
    }

    /// Every evaluated window, best first.
    pub fn ranked(&self) -> &[ConfigurationResult] {
        &self.ranked
    }

    /// The first `top_n` ranked results.
    pub fn top(&self) -> &[ConfigurationResult] {
        let n = self.top_n.min(self.ranked.len());
        &self.ranked[..n]
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Highest-ranked result with a defined ratio.
    pub fn optimal(&self) -> Option<&ConfigurationResult> {
        self.ranked.first().filter(|r| r.ratio().is_some())
    }

    pub fn failures(&self) -> &[FailedWindow] {
        &self.failures
    }

    /// Daily equity of the optimal window; empty when there is no optimum.
    pub fn optimal_curve(&self) -> &[EquityPoint] {
        &self.optimal_curve
    }

    pub fn buy_and_hold(&self) -> &[EquityPoint] {
        &self.buy_and_hold
    }

    /// Number of windows attempted, successful or not.
    pub fn total_windows(&self) -> usize {
        self.ranked.len() + self.failures.len()
    }
}
