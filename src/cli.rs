//! Command-line interface definitions.
//!
//! This module defines the CLI arguments using the `clap` crate. The config
//! path can also come from the environment.

use crate::config::PipelineConfig;
use clap::Parser;
use itertools::Itertools;

/// Command-line arguments for the timeline builder.
///
/// # Examples
///
/// ```sh
/// # Current year into ./data
/// llm_timeline
///
/// # Specific years with link checks
/// llm_timeline 2024 2025 --verify-links -o ./public/data
///
/// # Every year with a known URL
/// llm_timeline --all
///
/// # A post at an unusual URL
/// llm_timeline 2026 --url https://simonwillison.net/2026/Dec/30/some-slug/
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Years to process (defaults to the current year)
    pub years: Vec<i32>,

    /// Process every year with a known source URL
    #[arg(long, conflicts_with = "years")]
    pub all: bool,

    /// Explicit source URL, overriding the known slug patterns (single year only)
    #[arg(long)]
    pub url: Option<String>,

    /// Output directory for the JSON files
    #[arg(short, long, default_value = "data")]
    pub output: String,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "TIMELINE_CONFIG")]
    pub config: Option<String>,

    /// HEAD-check extracted links and record the results
    #[arg(long)]
    pub verify_links: bool,
}

impl Cli {
    /// Years to run, in order and without repeats.
    pub fn resolve_years(&self, config: &PipelineConfig, current_year: i32) -> Result<Vec<i32>, String> {
        let years: Vec<i32> = if self.all {
            config.source.known_urls.keys().copied().collect()
        } else if self.years.is_empty() {
            vec![current_year]
        } else {
            self.years.iter().copied().unique().collect()
        };
        if self.url.is_some() && years.len() != 1 {
            return Err(format!(
                "--url applies to exactly one year, got {}",
                years.len()
            ));
        }
        Ok(years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["llm_timeline", "2024", "2025", "--output", "./out"]);
        assert_eq!(cli.years, vec![2024, 2025]);
        assert_eq!(cli.output, "./out");
        assert!(!cli.verify_links);
    }

    #[test]
    fn test_cli_short_flags_and_defaults() {
        let cli = Cli::parse_from(["llm_timeline", "-o", "/tmp/json", "-c", "cfg.yaml"]);
        assert_eq!(cli.output, "/tmp/json");
        assert_eq!(cli.config.as_deref(), Some("cfg.yaml"));
        let cli = Cli::parse_from(["llm_timeline"]);
        assert_eq!(cli.output, "data");
    }

    #[test]
    fn test_all_conflicts_with_years() {
        assert!(Cli::try_parse_from(["llm_timeline", "2024", "--all"]).is_err());
    }

    #[test]
    fn test_resolve_years() {
        let config = PipelineConfig::default();
        let cli = Cli::parse_from(["llm_timeline"]);
        assert_eq!(cli.resolve_years(&config, 2026).unwrap(), vec![2026]);

        let cli = Cli::parse_from(["llm_timeline", "--all"]);
        assert_eq!(cli.resolve_years(&config, 2026).unwrap(), vec![2023, 2024, 2025]);

        let cli = Cli::parse_from(["llm_timeline", "2025", "2024", "2025"]);
        assert_eq!(cli.resolve_years(&config, 2026).unwrap(), vec![2025, 2024]);
    }

    #[test]
    fn test_url_requires_single_year() {
        let config = PipelineConfig::default();
        let cli = Cli::parse_from(["llm_timeline", "2024", "2025", "--url", "https://x/"]);
        assert!(cli.resolve_years(&config, 2026).is_err());
        let cli = Cli::parse_from(["llm_timeline", "2024", "--url", "https://x/"]);
        assert_eq!(cli.resolve_years(&config, 2026).unwrap(), vec![2024]);
    }
}
