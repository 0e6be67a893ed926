pub mod loader;
pub mod synthetic;

pub use loader::{load_csv, load_json};
pub use synthetic::{generate_breakout_series, generate_synthetic_bars};

use std::path::Path;

use common::{Bar, Instrument, Result, StrategyError};

/// Load bars from file, detecting format from extension
pub fn load_file(path: &Path) -> Result<Vec<Bar>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(StrategyError::DataLoadError(format!(
            "Unsupported file format: {}",
            ext
        ))),
    }
}

/// Load one instrument from a file, naming it after the file stem.
///
/// A file that yields no bars is an error for that instrument.
pub fn load_instrument(path: &Path) -> Result<Instrument> {
    let symbol = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let bars = load_file(path)?;
    if bars.is_empty() {
        return Err(StrategyError::NoData { symbol });
    }

    Ok(Instrument { symbol, bars })
}
