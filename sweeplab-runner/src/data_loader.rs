//! Bar loading from CSV files.
//!
//! The expected layout is one header row `date,open,high,low,close,volume`
//! followed by one row per trading day, dates as `YYYY-MM-DD`. Parsed bars go
//! straight through the series validator; nothing is repaired or reordered.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use sweeplab_core::data::ValidationError;
use sweeplab_core::domain::{Bar, PriceSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `row` is the 1-based line in the file, counting the header.
    #[error("row {row}: {source}")]
    Csv {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("invalid series: {0}")]
    Validation(#[from] ValidationError),
}

/// Parse bars from any CSV source, in file order.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, row) in rdr.deserialize::<Bar>().enumerate() {
        let bar = row.map_err(|source| LoadError::Csv {
            row: source
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(i + 2),
            source,
        })?;
        bars.push(bar);
    }
    Ok(bars)
}

/// Load and validate a CSV file as the series for `symbol`.
pub fn load_csv(path: &Path, symbol: &str) -> Result<PriceSeries, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bars = read_bars(file)?;
    let series = PriceSeries::new(symbol, bars)?;

    tracing::debug!(
        path = %path.display(),
        symbol,
        bars = series.len(),
        warnings = series.warnings().len(),
        "series loaded"
    );
    Ok(series)
}

/// Write bars in the same layout `read_bars` accepts.
pub fn write_csv<W: Write>(writer: W, bars: &[Bar]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in bars {
        wtr.serialize(bar)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Dataset hash for report identity (BLAKE3 over every bar).
///
/// Covers each date and every OHLCV value bit for bit, so any edit to the
/// input data changes the hash.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
