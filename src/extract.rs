//! Per-timestep extraction of a WRF variable to GeoTIFFs.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::{output_filename, ExtractConfig};
use crate::dataset::{WrfDataset, X_COORD, Y_COORD};
use crate::error::{ExtractError, Result};
use crate::raster::RasterMeta;
use crate::time::format_timestamp;
use crate::transform::affine_from_coords;

/// Write every time slice of the configured variable to its own GeoTIFF.
///
/// All inputs are validated before the first file is created. Returns the
/// written paths in timestep order. A failure part-way through leaves the
/// files already written in place.
pub fn extract_to_gtiffs(config: &ExtractConfig) -> Result<Vec<PathBuf>> {
    if !config.out_dir.is_dir() {
        return Err(ExtractError::OutputDirectory(config.out_dir.clone()));
    }
    let variable = config.resolve_variable()?;
    let fragment = config.resolve_fragment();

    let dataset = WrfDataset::open(&config.input)?;
    let written = write_slices(&dataset, &variable, &fragment, config)?;
    dataset.close();

    Ok(written)
}

fn write_slices(
    dataset: &WrfDataset,
    variable: &str,
    fragment: &str,
    config: &ExtractConfig,
) -> Result<Vec<PathBuf>> {
    let var = dataset.grid_variable(variable)?;

    let xc = dataset.coordinate(X_COORD)?;
    let yc = dataset.coordinate(Y_COORD)?;
    if xc.len() != var.width || yc.len() != var.height {
        return Err(ExtractError::InvalidShape {
            name: variable.to_string(),
            shape: vec![var.count, var.height, var.width],
            expected: format!("(time, {}, {}) to match yc/xc", yc.len(), xc.len()),
        });
    }
    let transform = affine_from_coords(&xc, &yc)?;
    debug!(?transform, "derived affine transform");

    let times = dataset.times(&var)?;
    if times.len() != var.count {
        return Err(ExtractError::InvalidShape {
            name: variable.to_string(),
            shape: vec![var.count, var.height, var.width],
            expected: format!("{} timesteps to match the time coordinate", times.len()),
        });
    }

    let meta = RasterMeta::new(
        var.width,
        var.height,
        transform,
        &dataset.projection()?,
        config.nodata,
    )?;

    let out_paths: Vec<PathBuf> = times
        .iter()
        .map(|t| config.out_dir.join(output_filename(variable, fragment, &format_timestamp(t))))
        .collect();
    check_unique(&out_paths)?;

    info!(
        variable,
        count = var.count,
        height = var.height,
        width = var.width,
        input = %dataset.path().display(),
        "extracting"
    );

    for (index, out_path) in out_paths.iter().enumerate() {
        let slice = var.read_slice(index)?;
        meta.write(out_path, &slice)?;
        info!(path = %out_path.display(), "wrote");
    }

    Ok(out_paths)
}

/// Timestamps only resolve to the hour, so sub-hourly steps would overwrite
/// each other's files.
fn check_unique(paths: &[PathBuf]) -> Result<()> {
    let mut seen = HashMap::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        if let Some(first) = seen.insert(path, index) {
            return Err(ExtractError::DuplicateOutput {
                path: path.clone(),
                first,
                second: index,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_unique() {
        let paths: Vec<PathBuf> = ["a.tif", "b.tif", "a.tif"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert!(check_unique(&paths[..2]).is_ok());
        assert!(matches!(
            check_unique(&paths),
            Err(ExtractError::DuplicateOutput { first: 0, second: 2, .. })
        ));
    }
}
