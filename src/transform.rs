//! Affine transform derivation from cell-centre coordinate arrays.
//!
//! The prepped WRF files carry one-dimensional `xc` / `yc` arrays giving the
//! projected position of every cell centre. A raster header wants the outer
//! corner of the upper-left cell plus a pixel size, so the origin is pushed
//! out by half a cell on each axis.

use crate::error::{ExtractError, Result};

/// Relative tolerance used when checking that an axis is uniformly spaced.
pub const SPACING_TOLERANCE: f64 = 1e-6;

/// Six-parameter affine transform in GDAL ordering:
/// `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
///
/// North-up rasters have zero rotations and a negative `pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform anchored at the upper-left corner `(west, north)`.
    ///
    /// `xsize` and `ysize` are positive cell sizes; the y step is stored
    /// negated so that row indices increase southwards.
    pub fn from_origin(west: f64, north: f64, xsize: f64, ysize: f64) -> Self {
        Self {
            origin_x: west,
            pixel_width: xsize,
            row_rotation: 0.0,
            origin_y: north,
            col_rotation: 0.0,
            pixel_height: -ysize,
        }
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            origin_x: gt[0],
            pixel_width: gt[1],
            row_rotation: gt[2],
            origin_y: gt[3],
            col_rotation: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Map a (fractional) pixel position to projected coordinates.
    ///
    /// `(row + 0.5, col + 0.5)` gives the centre of a cell.
    pub fn apply(&self, row: f64, col: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }
}

/// Derive the raster transform from cell-centre coordinate arrays.
///
/// Resolution is taken from the first difference of each axis. Both axes must
/// have at least two values and be uniformly spaced; a non-uniform axis would
/// silently produce a wrong transform, so it is rejected instead.
pub fn affine_from_coords(xc: &[f64], yc: &[f64]) -> Result<GeoTransform> {
    let lonres = axis_resolution("xc", xc)?;
    let latres = axis_resolution("yc", yc)?;

    let x0 = xc.iter().copied().fold(f64::INFINITY, f64::min) - lonres.abs() / 2.0;
    let y0 = yc.iter().copied().fold(f64::NEG_INFINITY, f64::max) + latres.abs() / 2.0;

    Ok(GeoTransform::from_origin(x0, y0, lonres.abs(), latres.abs()))
}

/// Signed first difference of a coordinate axis, after checking that every
/// value is finite, the difference is non-zero and every later difference
/// agrees with it.
fn axis_resolution(axis: &str, values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(ExtractError::InsufficientCoordinates {
            axis: axis.to_string(),
            len: values.len(),
        });
    }

    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ExtractError::NonFiniteCoordinate {
            axis: axis.to_string(),
            index,
            value,
        });
    }

    let res = values[1] - values[0];
    if res == 0.0 {
        return Err(ExtractError::ZeroSpacing {
            axis: axis.to_string(),
        });
    }
    let tolerance = SPACING_TOLERANCE * res.abs();
    for (index, pair) in values.windows(2).enumerate().skip(1) {
        let step = pair[1] - pair[0];
        if (step - res).abs() > tolerance {
            return Err(ExtractError::NonUniformSpacing {
                axis: axis.to_string(),
                index,
                step,
                expected: res,
            });
        }
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_descending_y_scenario() {
        let gt = affine_from_coords(&[-150.0, -149.0, -148.0], &[65.0, 64.0, 63.0]).unwrap();
        assert_close(gt.origin_x, -150.5);
        assert_close(gt.origin_y, 65.5);
        assert_close(gt.pixel_width, 1.0);
        assert_close(gt.pixel_height, -1.0);
        assert_eq!(gt.row_rotation, 0.0);
        assert_eq!(gt.col_rotation, 0.0);
    }

    #[test]
    fn test_ascending_axes_match_centre_formula() {
        // polar stereographic metres, 20km cells
        let xc: Vec<f64> = (0..5).map(|i| -2_500_000.0 + 20_000.0 * i as f64).collect();
        let yc: Vec<f64> = (0..4).map(|i| -4_000_000.0 + 20_000.0 * i as f64).collect();
        let gt = affine_from_coords(&xc, &yc).unwrap();

        let lonres = xc[1] - xc[0];
        let latres = yc[1] - yc[0];
        assert_close(gt.origin_x, -2_500_000.0 - lonres / 2.0);
        assert_close(gt.origin_y, yc[3] + latres / 2.0);
        assert_close(gt.pixel_width, 20_000.0);
        assert_close(gt.pixel_height, -20_000.0);
    }

    #[test]
    fn test_cell_centres_recovered() {
        let xc = [10.0, 12.0, 14.0, 16.0];
        let yc = [5.0, 4.0, 3.0];
        let gt = affine_from_coords(&xc, &yc).unwrap();

        let (x, y) = gt.apply(0.5, 0.5);
        assert_close(x, 10.0);
        assert_close(y, 5.0);
        let (x, y) = gt.apply(2.5, 3.5);
        assert_close(x, 16.0);
        assert_close(y, 3.0);
    }

    #[test]
    fn test_single_coordinate_rejected() {
        let err = affine_from_coords(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InsufficientCoordinates { ref axis, len: 1 } if axis == "xc"
        ));

        let err = affine_from_coords(&[1.0, 2.0], &[]).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::InsufficientCoordinates { ref axis, len: 0 } if axis == "yc"
        ));
    }

    #[test]
    fn test_non_uniform_rejected() {
        let err = affine_from_coords(&[0.0, 1.0, 2.0, 3.5], &[0.0, 1.0]).unwrap_err();
        match err {
            ExtractError::NonUniformSpacing { axis, index, .. } => {
                assert_eq!(axis, "xc");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let err = affine_from_coords(&[5.0, 5.0, 5.0], &[65.0, 64.0, 63.0]).unwrap_err();
        assert!(matches!(err, ExtractError::ZeroSpacing { ref axis } if axis == "xc"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = affine_from_coords(&[0.0, 1.0, f64::NAN], &[65.0, 64.0]).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::NonFiniteCoordinate { ref axis, index: 2, .. } if axis == "xc"
        ));

        let err = affine_from_coords(&[0.0, 1.0], &[f64::INFINITY, 64.0]).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::NonFiniteCoordinate { ref axis, index: 0, .. } if axis == "yc"
        ));
    }

    #[test]
    fn test_float_noise_tolerated() {
        let xc = [0.1, 0.2, 0.30000000000000004, 0.4];
        assert!(affine_from_coords(&xc, &[1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_gdal_ordering() {
        let gt = GeoTransform::from_origin(-150.5, 65.5, 1.0, 2.0);
        assert_eq!(gt.to_gdal(), [-150.5, 1.0, 0.0, 65.5, 0.0, -2.0]);
        assert_eq!(GeoTransform::from_gdal(gt.to_gdal()), gt);
    }
}
