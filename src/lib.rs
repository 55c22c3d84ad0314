//! Extract time slices from SNAP-prepped WRF NetCDF files to GeoTIFFs.
//!
//! A prepped file holds `(time, yc, xc)` variables on a polar stereographic
//! grid. Each time slice of one variable is written to its own single-band,
//! LZW-compressed float32 GeoTIFF named `<variable>_<fragment>_<MM-DD-YYYY-HH>.tif`.
//!
//! ```no_run
//! use wrf_extractor::{extract_to_gtiffs, ExtractConfig};
//!
//! let config = ExtractConfig::new("t2_hourly_wrf_ERA-Interim_historical_1980.nc", "out");
//! for path in extract_to_gtiffs(&config)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), wrf_extractor::ExtractError>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod raster;
pub mod time;
pub mod transform;

pub use config::ExtractConfig;
pub use error::{ExtractError, Result};
pub use extract::extract_to_gtiffs;
pub use transform::{affine_from_coords, GeoTransform};
