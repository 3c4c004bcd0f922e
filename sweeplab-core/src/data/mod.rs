//! Business-rule validation of parsed bar series.

pub mod validate;

pub use validate::{validate_bars, ValidationError, ValidationWarning};
