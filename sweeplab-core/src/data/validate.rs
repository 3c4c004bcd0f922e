//! Series validation: business-rule checks on an ordered bar sequence.
//!
//! Checks per bar, in order:
//! (a) every price is a finite number
//! (b) dates strictly increasing, no duplicates
//! (c) OHLC envelope consistency
//! (d) no non-positive price
//! (e) volume >= 0
//!
//! The first violation aborts validation. Nothing is repaired. Missing weekdays
//! between consecutive bars are reported as non-fatal warnings.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// A business-rule violation, naming the offending date.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("series is empty")]
    EmptySeries,

    #[error("{date}: {field} is not a finite number")]
    NonFinitePrice { date: NaiveDate, field: &'static str },

    #[error("{date}: duplicate date")]
    DuplicateDate { date: NaiveDate },

    #[error("{date}: date is not after previous bar ({previous})")]
    OutOfOrder { date: NaiveDate, previous: NaiveDate },

    #[error("{date}: inconsistent OHLC (open={open}, high={high}, low={low}, close={close})")]
    InconsistentOhlc {
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("{date}: {field} must be positive, got {value}")]
    NonPositivePrice {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },

    #[error("{date}: negative volume {volume}")]
    NegativeVolume { date: NaiveDate, volume: i64 },
}

impl ValidationError {
    /// Date of the offending bar (None for an empty series).
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::EmptySeries => None,
            Self::NonFinitePrice { date, .. }
            | Self::DuplicateDate { date }
            | Self::OutOfOrder { date, .. }
            | Self::InconsistentOhlc { date, .. }
            | Self::NonPositivePrice { date, .. }
            | Self::NegativeVolume { date, .. } => Some(*date),
        }
    }
}

/// Non-fatal findings. Callers may log them; they never block processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationWarning {
    /// Weekdays missing between two consecutive bars.
    CalendarGap {
        after: NaiveDate,
        before: NaiveDate,
        missing_weekdays: u32,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CalendarGap {
                after,
                before,
                missing_weekdays,
            } => write!(
                f,
                "calendar gap: {missing_weekdays} weekday(s) missing between {after} and {before}"
            ),
        }
    }
}

/// Validate a bar sequence. Returns calendar-gap warnings on success.
pub fn validate_bars(bars: &[Bar]) -> Result<Vec<ValidationWarning>, ValidationError> {
    if bars.is_empty() {
        return Err(ValidationError::EmptySeries);
    }

    let mut warnings = Vec::new();
    let mut previous: Option<NaiveDate> = None;

    for bar in bars {
        check_finite(bar)?;

        if let Some(prev) = previous {
            if bar.date == prev {
                return Err(ValidationError::DuplicateDate { date: bar.date });
            }
            if bar.date < prev {
                return Err(ValidationError::OutOfOrder {
                    date: bar.date,
                    previous: prev,
                });
            }
        }

        if !bar.is_ohlc_consistent() {
            return Err(ValidationError::InconsistentOhlc {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
            });
        }

        check_positive(bar)?;

        if bar.volume < 0 {
            return Err(ValidationError::NegativeVolume {
                date: bar.date,
                volume: bar.volume,
            });
        }

        if let Some(prev) = previous {
            let missing = missing_weekdays(prev, bar.date);
            if missing > 0 {
                warnings.push(ValidationWarning::CalendarGap {
                    after: prev,
                    before: bar.date,
                    missing_weekdays: missing,
                });
            }
        }
        previous = Some(bar.date);
    }

    Ok(warnings)
}

fn check_finite(bar: &Bar) -> Result<(), ValidationError> {
    for (field, value) in price_fields(bar) {
        if !value.is_finite() {
            return Err(ValidationError::NonFinitePrice {
                date: bar.date,
                field,
            });
        }
    }
    Ok(())
}

fn check_positive(bar: &Bar) -> Result<(), ValidationError> {
    for (field, value) in price_fields(bar) {
        if value <= 0.0 {
            return Err(ValidationError::NonPositivePrice {
                date: bar.date,
                field,
                value,
            });
        }
    }
    Ok(())
}

fn price_fields(bar: &Bar) -> [(&'static str, f64); 4] {
    [
        ("open", bar.open),
        ("close", bar.close),
        ("high", bar.high),
        ("low", bar.low),
    ]
}

/// Count weekdays strictly between `after` and `before`.
fn missing_weekdays(after: NaiveDate, before: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = after + Duration::days(1);
    while day < before {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}
