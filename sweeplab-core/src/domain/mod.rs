//! Domain types for SweepLab

pub mod bar;
pub mod series;
pub mod trade;

pub use bar::Bar;
pub use series::PriceSeries;
pub use trade::{ExitReason, Trade};
