//! Run configuration and the WRF file naming convention.
//!
//! Prepped WRF files are named `<variable>_<fragment...>_<year>.nc`, e.g.
//! `t2_hourly_wrf_ERA-Interim_historical_1980.nc`. The variable and the
//! middle fragment are reused to name the extracted GeoTIFFs.

use std::path::{Path, PathBuf};

use crate::error::{ExtractError, Result};

/// Everything needed for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// SNAP-prepped WRF NetCDF file
    pub input: PathBuf,
    /// Existing directory that receives one GeoTIFF per timestep
    pub out_dir: PathBuf,
    /// Variable to extract; derived from the input filename when `None`
    pub variable: Option<String>,
    /// Middle part of output names; derived from the input filename when `None`
    pub fragment: Option<String>,
    /// Value written as the band's no-data marker, if any
    pub nodata: Option<f64>,
}

impl ExtractConfig {
    pub fn new(input: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            out_dir: out_dir.into(),
            variable: None,
            fragment: None,
            nodata: None,
        }
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// Variable name to extract: explicit, or the first `_` segment of the
    /// input filename.
    pub fn resolve_variable(&self) -> Result<String> {
        match &self.variable {
            Some(v) => Ok(v.clone()),
            None => variable_from_filename(&self.input),
        }
    }

    /// Naming fragment: explicit, or the middle segments of the input
    /// filename. Empty when the filename has fewer than three segments.
    pub fn resolve_fragment(&self) -> String {
        match &self.fragment {
            Some(f) => f.clone(),
            None => fragment_from_filename(&self.input),
        }
    }
}

/// First `_`-delimited segment of the file name.
pub fn variable_from_filename(path: &Path) -> Result<String> {
    let name = file_name(path);
    match name.split('_').next() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ExtractError::InvalidInputName(path.to_path_buf())),
    }
}

/// `t2_hourly_wrf_ERA-Interim_historical_1980.nc` -> `hourly_wrf_ERA-Interim_historical`
pub fn fragment_from_filename(path: &Path) -> String {
    let name = file_name(path);
    let stem = name.split('.').next().unwrap_or_default();
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 3 {
        return String::new();
    }
    parts[1..parts.len() - 1].join("_")
}

/// `<variable>_<fragment>_<timestamp>.tif`, skipping an empty fragment.
pub fn output_filename(variable: &str, fragment: &str, timestamp: &str) -> String {
    if fragment.is_empty() {
        format!("{}_{}.tif", variable, timestamp)
    } else {
        format!("{}_{}_{}.tif", variable, fragment, timestamp)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRF_FILE: &str =
        "/workspace/wrf_data/hourly_fix/t2/t2_hourly_wrf_ERA-Interim_historical_1980.nc";

    #[test]
    fn test_derive_from_wrf_name() {
        let path = Path::new(WRF_FILE);
        assert_eq!(variable_from_filename(path).unwrap(), "t2");
        assert_eq!(fragment_from_filename(path), "hourly_wrf_ERA-Interim_historical");
    }

    #[test]
    fn test_explicit_values_win() {
        let config = ExtractConfig::new(WRF_FILE, "/tmp")
            .with_variable("pcpt")
            .with_fragment("wrf_alaska");
        assert_eq!(config.resolve_variable().unwrap(), "pcpt");
        assert_eq!(config.resolve_fragment(), "wrf_alaska");
    }

    #[test]
    fn test_short_names() {
        let path = Path::new("/data/t2.nc");
        assert_eq!(variable_from_filename(path).unwrap(), "t2");
        assert_eq!(fragment_from_filename(path), "");
        assert_eq!(fragment_from_filename(Path::new("t2_1980.nc")), "");
        assert!(matches!(
            variable_from_filename(Path::new("/data/_x.nc")),
            Err(ExtractError::InvalidInputName(_))
        ));
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename("t2", "wrf_alaska", "01-01-2020-00"),
            "t2_wrf_alaska_01-01-2020-00.tif"
        );
        assert_eq!(output_filename("t2", "", "01-01-2020-00"), "t2_01-01-2020-00.tif");
    }
}
