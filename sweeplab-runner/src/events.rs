//! Progress events and sinks.
//!
//! The sweep never writes to stdout or stderr. It emits `SweepEvent`s into a
//! caller-supplied `ProgressSink`, from worker threads as well as the
//! aggregating thread, so sinks must be `Send + Sync`.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Structured progress message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SweepEvent {
    /// Non-fatal finding from series validation, e.g. a calendar gap.
    ValidationWarning { message: String },
    ConfigurationStarted { window: usize },
    ConfigurationCompleted {
        window: usize,
        completed: usize,
        total: usize,
        ratio: Option<f64>,
    },
    ConfigurationFailed {
        window: usize,
        completed: usize,
        total: usize,
        reason: String,
    },
    OptimumFound { window: usize, ratio: f64 },
    SweepFinished {
        evaluated: usize,
        failed: usize,
        total: usize,
    },
}

/// Receiver for sweep progress.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &SweepEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&SweepEvent) + Send + Sync,
{
    fn emit(&self, event: &SweepEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: &SweepEvent) {}
}

/// Buffers events in arrival order. Used by tests and embedders that want to
/// inspect progress after the fact.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<SweepEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<SweepEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: &SweepEvent) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(event.clone());
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: &SweepEvent) {
        match event {
            SweepEvent::ValidationWarning { message } => {
                tracing::warn!(%message, "series validation warning");
            }
            SweepEvent::ConfigurationStarted { window } => {
                tracing::trace!(window, "window started");
            }
            SweepEvent::ConfigurationCompleted {
                window,
                completed,
                total,
                ratio,
            } => {
                tracing::debug!(window, completed, total, ratio = ?ratio, "window completed");
            }
            SweepEvent::ConfigurationFailed {
                window,
                completed,
                total,
                reason,
            } => {
                tracing::warn!(window, completed, total, %reason, "window failed");
            }
            SweepEvent::OptimumFound { window, ratio } => {
                tracing::info!(window, ratio, "optimum found");
            }
            SweepEvent::SweepFinished {
                evaluated,
                failed,
                total,
            } => {
                tracing::info!(evaluated, failed, total, "sweep finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closures_are_sinks() {
        let count = AtomicUsize::new(0);
        let sink = |_: &SweepEvent| {
            count.fetch_add(1, Ordering::Relaxed);
        };
        sink.emit(&SweepEvent::ConfigurationStarted { window: 3 });
        sink.emit(&SweepEvent::ConfigurationStarted { window: 4 });
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.emit(&SweepEvent::ConfigurationStarted { window: 3 });
        sink.emit(&SweepEvent::OptimumFound {
            window: 3,
            ratio: 1.5,
        });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SweepEvent::ConfigurationStarted { window: 3 });
    }

    #[test]
    fn null_and_tracing_sinks_accept_everything() {
        let event = SweepEvent::SweepFinished {
            evaluated: 1,
            failed: 0,
            total: 1,
        };
        NullSink.emit(&event);
        TracingSink.emit(&event);
    }
}
