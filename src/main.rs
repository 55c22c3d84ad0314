use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wrf_extractor::{extract_to_gtiffs, ExtractConfig};

/// Naming fragment for inputs that don't follow the `<var>_<...>_<year>.nc`
/// convention.
const DEFAULT_FRAGMENT: &str = "wrf_alaska";

/// Extract all layers along the time dimension of a SNAP-prepped WRF NetCDF
/// file to individual GeoTIFFs.
#[derive(Parser)]
#[command(name = "extract-wrf-to-gtiffs")]
struct Cli {
    /// Path of the SNAP-cleaned WRF NetCDF file
    #[arg(short, long = "fn")]
    file: PathBuf,

    /// Existing directory to write the GeoTIFFs into
    #[arg(short, long = "out_path")]
    out_path: PathBuf,

    /// Variable to extract, e.g. t2 or pcpt [default: first `_` segment of the filename]
    #[arg(short, long)]
    variable: Option<String>,

    /// Middle part of the output names [default: derived from the filename]
    #[arg(long)]
    fragment: Option<String>,

    /// No-data value to record in the output rasters
    #[arg(long, allow_negative_numbers = true)]
    nodata: Option<f64>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> ExtractConfig {
        let mut config = ExtractConfig::new(&self.file, &self.out_path);
        config.variable = self.variable.clone();
        config.nodata = self.nodata;
        config.fragment = self.fragment.clone();
        with_default_fragment(config)
    }
}

/// Fall back to [`DEFAULT_FRAGMENT`] when neither the flag nor the input
/// filename provide one.
fn with_default_fragment(config: ExtractConfig) -> ExtractConfig {
    if config.fragment.is_none() && config.resolve_fragment().is_empty() {
        config.with_fragment(DEFAULT_FRAGMENT)
    } else {
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let written = extract_to_gtiffs(&cli.config())
        .with_context(|| format!("extracting {}", cli.file.display()))?;
    tracing::info!(files = written.len(), "done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: [&str; 5] = ["extract-wrf-to-gtiffs", "--fn", "t2.nc", "--out_path", "out"];

    #[test]
    fn test_required_flags() {
        let cli = Cli::try_parse_from(MINIMAL).unwrap();
        assert_eq!(cli.file, PathBuf::from("t2.nc"));
        assert_eq!(cli.out_path, PathBuf::from("out"));
        assert_eq!(cli.variable, None);
        assert_eq!(cli.log_level, "info");

        assert!(Cli::try_parse_from(["extract-wrf-to-gtiffs", "--fn", "t2.nc"]).is_err());
        assert!(Cli::try_parse_from(["extract-wrf-to-gtiffs", "--out_path", "out"]).is_err());
    }

    #[test]
    fn test_optional_flags() {
        let cli = Cli::try_parse_from([
            "extract-wrf-to-gtiffs",
            "-f",
            "snap.nc",
            "-o",
            "out",
            "--variable",
            "pcpt",
            "--nodata",
            "-9999",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.resolve_variable().unwrap(), "pcpt");
        assert_eq!(config.nodata, Some(-9999.0));
    }

    #[test]
    fn test_default_fragment_for_short_name() {
        let cli = Cli::try_parse_from(MINIMAL).unwrap();
        assert_eq!(cli.config().resolve_fragment(), DEFAULT_FRAGMENT);
    }

    #[test]
    fn test_derived_fragment_kept() {
        let config = with_default_fragment(ExtractConfig::new(
            "t2_hourly_wrf_ERA-Interim_historical_1980.nc",
            "out",
        ));
        assert_eq!(config.fragment, None);
        assert_eq!(config.resolve_fragment(), "hourly_wrf_ERA-Interim_historical");

        let explicit = ExtractConfig::new("t2.nc", "out").with_fragment("custom");
        let config = with_default_fragment(explicit);
        assert_eq!(config.resolve_fragment(), "custom");
    }
}
