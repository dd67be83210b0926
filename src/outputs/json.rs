//! JSON dataset files for the visualization layer.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── year_in_llms_2024.json   # one YearDataset per year
//! ├── year_in_llms_2025.json
//! └── year_in_llms_all.json    # { "2024": YearDataset, "2025": YearDataset }
//! ```
//!
//! The combined file is rebuilt from every per-year file on disk, so years
//! emitted by earlier runs stay in it.

use crate::models::YearDataset;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

const YEAR_PREFIX: &str = "year_in_llms_";
const COMBINED_FILE: &str = "year_in_llms_all.json";

pub fn year_file(output_dir: &str, year: i32) -> PathBuf {
    Path::new(output_dir).join(format!("{YEAR_PREFIX}{year}.json"))
}

/// Write one year's dataset as pretty JSON.
#[instrument(level = "info", skip_all, fields(%output_dir, year = dataset.year))]
pub async fn write_year(dataset: &YearDataset, output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(dataset)?;
    let path = year_file(output_dir, dataset.year);
    fs::write(&path, json).await?;
    info!(path = %path.display(), events = dataset.events.len(), "Wrote year dataset");
    Ok(path)
}

/// Load every per-year dataset file in `output_dir`, keyed by year.
///
/// Files that fail to parse are logged and skipped.
#[instrument(level = "info", skip_all, fields(%output_dir))]
pub async fn load_years(output_dir: &str) -> Result<BTreeMap<i32, YearDataset>, Box<dyn Error>> {
    let mut datasets = BTreeMap::new();
    let mut entries = fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(year) = parse_year_file_name(&name) else {
            continue;
        };
        let raw = fs::read_to_string(entry.path()).await?;
        match serde_json::from_str::<YearDataset>(&raw) {
            Ok(dataset) if dataset.year == year => {
                datasets.insert(year, dataset);
            }
            Ok(dataset) => {
                warn!(file = %name, inner_year = dataset.year, "Year in file name and content disagree; skipping")
            }
            Err(e) => warn!(file = %name, error = %e, "Unreadable dataset file; skipping"),
        }
    }
    info!(years = datasets.len(), "Loaded emitted datasets");
    Ok(datasets)
}

fn parse_year_file_name(name: &str) -> Option<i32> {
    name.strip_prefix(YEAR_PREFIX)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Write the combined `year -> dataset` map.
#[instrument(level = "info", skip_all, fields(%output_dir, years = datasets.len()))]
pub async fn write_combined(
    datasets: &BTreeMap<i32, YearDataset>,
    output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(datasets)?;
    let path = Path::new(output_dir).join(COMBINED_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote combined datasets");
    Ok(path)
}
