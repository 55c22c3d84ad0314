//! Single-band GeoTIFF output.

use std::path::Path;

use gdal::cpl::CslStringList;
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use ndarray::Array2;

use crate::error::{ExtractError, Result};
use crate::transform::GeoTransform;

pub const DRIVER: &str = "GTiff";
pub const COMPRESSION: &str = "LZW";

/// Header shared by every raster written in a run: float32, one band,
/// LZW-compressed, georeferenced with a fixed transform and CRS.
#[derive(Debug, Clone)]
pub struct RasterMeta {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    /// CRS as WKT, normalised from the dataset's projection string
    pub crs_wkt: String,
    pub nodata: Option<f64>,
}

impl RasterMeta {
    /// Build the header, parsing `projection` (PROJ string, `EPSG:` code or
    /// WKT) into a CRS.
    pub fn new(
        width: usize,
        height: usize,
        transform: GeoTransform,
        projection: &str,
        nodata: Option<f64>,
    ) -> Result<Self> {
        let invalid = |source| ExtractError::InvalidCrs {
            definition: projection.to_string(),
            source,
        };
        let srs = SpatialRef::from_definition(projection).map_err(invalid)?;
        let crs_wkt = srs.to_wkt().map_err(invalid)?;

        Ok(Self {
            width,
            height,
            transform,
            crs_wkt,
            nodata,
        })
    }

    fn creation_options() -> Result<CslStringList> {
        let mut options = CslStringList::new();
        options.set_name_value("COMPRESS", COMPRESSION)?;
        Ok(options)
    }

    /// Write `data` as band 1 of a new GeoTIFF at `path`.
    ///
    /// The file is created, written and closed before this returns.
    pub fn write(&self, path: &Path, data: &Array2<f32>) -> Result<()> {
        let (rows, cols) = data.dim();
        if rows != self.height || cols != self.width {
            return Err(ExtractError::InvalidShape {
                name: path.display().to_string(),
                shape: vec![rows, cols],
                expected: format!("({}, {})", self.height, self.width),
            });
        }

        let driver = DriverManager::get_driver_by_name(DRIVER)?;
        let options = Self::creation_options()?;
        let mut dataset = driver.create_with_band_type_with_options::<f32, _>(
            path,
            self.width,
            self.height,
            1,
            &options,
        )?;
        dataset.set_geo_transform(&self.transform.to_gdal())?;
        dataset.set_spatial_ref(&SpatialRef::from_wkt(&self.crs_wkt)?)?;

        let mut band = dataset.rasterband(1)?;
        if let Some(nodata) = self.nodata {
            band.set_no_data_value(Some(nodata))?;
        }
        // iter() walks in logical row-major order regardless of memory layout
        let mut buffer = Buffer::new((self.width, self.height), data.iter().copied().collect());
        band.write((0, 0), (self.width, self.height), &mut buffer)?;

        Ok(())
    }
}
