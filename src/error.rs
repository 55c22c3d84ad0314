//! Error types for the extraction pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while reading the dataset or writing rasters.
///
/// Every variant is fatal for the run; nothing is retried.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Error from the NetCDF library
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::error::Error),

    /// Error from GDAL while creating or writing a raster
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    /// Slice did not have the expected array shape
    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested variable is not in the dataset
    #[error("variable '{0}' not found in dataset")]
    MissingVariable(String),

    /// Missing required coordinate, attribute or dimension
    #[error("missing required data: {0}")]
    MissingData(String),

    #[error("variable '{name}' has shape {shape:?}, expected {expected}")]
    InvalidShape {
        name: String,
        shape: Vec<usize>,
        expected: String,
    },

    /// A coordinate axis needs at least two points to define a resolution
    #[error("coordinate '{axis}' has {len} value(s), need at least 2")]
    InsufficientCoordinates { axis: String, len: usize },

    #[error("coordinate '{axis}' value {index} is {value}, expected a finite number")]
    NonFiniteCoordinate {
        axis: String,
        index: usize,
        value: f64,
    },

    /// First two coordinates coincide, so the axis has no resolution
    #[error("coordinate '{axis}' has zero spacing")]
    ZeroSpacing { axis: String },

    #[error(
        "coordinate '{axis}' is not uniformly spaced: step {index} is {step}, expected {expected}"
    )]
    NonUniformSpacing {
        axis: String,
        index: usize,
        step: f64,
        expected: f64,
    },

    #[error("cannot decode time units '{0}'")]
    InvalidTimeUnits(String),

    /// A stored time offset cannot be turned into a timestamp
    #[error("time value {value} {reason}")]
    InvalidTimeValue { value: f64, reason: &'static str },

    #[error("unsupported calendar '{0}'")]
    UnsupportedCalendar(String),

    /// Projection string could not be parsed into a CRS
    #[error("invalid CRS definition '{definition}': {source}")]
    InvalidCrs {
        definition: String,
        #[source]
        source: gdal::errors::GdalError,
    },

    /// Input filename does not yield a variable name
    #[error("cannot derive a variable name from '{0}'")]
    InvalidInputName(PathBuf),

    /// Two timesteps format to the same output filename
    #[error("timesteps {first} and {second} both map to {path}")]
    DuplicateOutput {
        path: PathBuf,
        first: usize,
        second: usize,
    },

    #[error("output directory {0} does not exist or is not a directory")]
    OutputDirectory(PathBuf),
}
