//! Read-only access to a SNAP-prepped WRF NetCDF file.
//!
//! The prepped files hold `(time, yc, xc)` variables, one-dimensional `xc` /
//! `yc` cell-centre coordinates, a CF time axis and a global
//! `proj_parameters` attribute with the PROJ definition of the grid.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use ndarray::{Array2, Axis, Ix2};
use netcdf::AttrValue;
use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::time;

/// Global attribute holding the projection definition.
pub const PROJ_ATTRIBUTE: &str = "proj_parameters";
pub const X_COORD: &str = "xc";
pub const Y_COORD: &str = "yc";
pub const TIME_COORD: &str = "time";

/// An open WRF dataset. Held for the whole run and released with
/// [`WrfDataset::close`].
pub struct WrfDataset {
    file: netcdf::File,
    path: PathBuf,
}

impl WrfDataset {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path)?;
        debug!(path = %path.display(), "opened dataset");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a one-dimensional coordinate variable as `f64`.
    pub fn coordinate(&self, name: &str) -> Result<Vec<f64>> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| {
                ExtractError::MissingData(format!("coordinate variable '{}'", name))
            })?;
        if var.dimensions().len() != 1 {
            return Err(ExtractError::InvalidShape {
                name: name.to_string(),
                shape: var.dimensions().iter().map(|d| d.len()).collect(),
                expected: "a 1-D coordinate".to_string(),
            });
        }
        Ok(var.values::<f64>(None, None)?.into_iter().collect())
    }

    /// The projection definition string stored in the global attributes.
    pub fn projection(&self) -> Result<String> {
        let attr = self.file.attribute(PROJ_ATTRIBUTE).ok_or_else(|| {
            ExtractError::MissingData(format!("global attribute '{}'", PROJ_ATTRIBUTE))
        })?;
        match attr.value()? {
            AttrValue::Str(s) => Ok(s),
            _ => Err(ExtractError::MissingData(format!(
                "global attribute '{}' is not a string",
                PROJ_ATTRIBUTE
            ))),
        }
    }

    /// Look up a `(time, height, width)` variable.
    pub fn grid_variable(&self, name: &str) -> Result<GridVariable<'_>> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| ExtractError::MissingVariable(name.to_string()))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let (count, height, width) = match *shape.as_slice() {
            [count, height, width] => (count, height, width),
            _ => {
                return Err(ExtractError::InvalidShape {
                    name: name.to_string(),
                    shape: shape.clone(),
                    expected: "(time, height, width)".to_string(),
                })
            }
        };

        let mut masked = numeric_attr(&var, "_FillValue")?;
        masked.extend(numeric_attr(&var, "missing_value")?);
        let scale_factor = numeric_attr(&var, "scale_factor")?.first().copied();
        let add_offset = numeric_attr(&var, "add_offset")?.first().copied();

        Ok(GridVariable {
            name: name.to_string(),
            time_dim: var.dimensions()[0].name(),
            var,
            count,
            height,
            width,
            masked,
            scale_factor,
            add_offset,
        })
    }

    /// Decode the time axis of `var` to timestamps.
    ///
    /// The coordinate variable named after the variable's leading dimension
    /// is used, falling back to `time`.
    pub fn times(&self, var: &GridVariable<'_>) -> Result<Vec<NaiveDateTime>> {
        let time_var = self
            .file
            .variable(&var.time_dim)
            .or_else(|| self.file.variable(TIME_COORD))
            .ok_or_else(|| {
                ExtractError::MissingData(format!("time coordinate '{}'", var.time_dim))
            })?;

        let units = string_attr(&time_var, "units")?.ok_or_else(|| {
            ExtractError::MissingData("units attribute on time coordinate".to_string())
        })?;
        let calendar = string_attr(&time_var, "calendar")?;
        let values: Vec<f64> = time_var.values::<f64>(None, None)?.into_iter().collect();

        time::decode_times(&units, calendar.as_deref(), &values)
    }

    pub fn close(self) {
        debug!(path = %self.path.display(), "closing dataset");
        drop(self.file);
    }
}

/// A 3-D `(time, height, width)` variable with its CF packing attributes.
pub struct GridVariable<'f> {
    pub name: String,
    pub count: usize,
    pub height: usize,
    pub width: usize,
    time_dim: String,
    var: netcdf::Variable<'f>,
    masked: Vec<f64>,
    scale_factor: Option<f64>,
    add_offset: Option<f64>,
}

impl<'f> GridVariable<'f> {
    /// Read the 2-D slice at `index` along the time axis, unpacked and cast
    /// to `f32`. Fill and missing values come back as NaN.
    pub fn read_slice(&self, index: usize) -> Result<Array2<f32>> {
        let raw = self
            .var
            .values::<f64>(Some(&[index, 0, 0]), Some(&[1, self.height, self.width]))?;
        let raw = raw.index_axis_move(Axis(0), 0).into_dimensionality::<Ix2>()?;

        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);
        Ok(raw.mapv(|v| {
            if self.masked.contains(&v) {
                f32::NAN
            } else {
                (v * scale + offset) as f32
            }
        }))
    }
}

/// All values of a numeric attribute as `f64`; empty when absent.
///
/// CF allows `missing_value` to be a vector, so array attributes are kept
/// whole.
fn numeric_attr(var: &netcdf::Variable, name: &str) -> Result<Vec<f64>> {
    let attr = match var.attribute(name) {
        Some(attr) => attr,
        None => return Ok(Vec::new()),
    };
    Ok(attr_values(attr.value()?))
}

fn attr_values(value: AttrValue) -> Vec<f64> {
    fn widen<T: Copy + Into<f64>>(v: Vec<T>) -> Vec<f64> {
        v.into_iter().map(Into::into).collect()
    }

    match value {
        AttrValue::Double(v) => vec![v],
        AttrValue::Float(v) => vec![v as f64],
        AttrValue::Longlong(v) => vec![v as f64],
        AttrValue::Ulonglong(v) => vec![v as f64],
        AttrValue::Int(v) => vec![v as f64],
        AttrValue::Uint(v) => vec![v as f64],
        AttrValue::Short(v) => vec![v as f64],
        AttrValue::Ushort(v) => vec![v as f64],
        AttrValue::Schar(v) => vec![v as f64],
        AttrValue::Uchar(v) => vec![v as f64],
        AttrValue::Doubles(v) => v,
        AttrValue::Floats(v) => widen(v),
        AttrValue::Ints(v) => widen(v),
        AttrValue::Uints(v) => widen(v),
        AttrValue::Shorts(v) => widen(v),
        AttrValue::Ushorts(v) => widen(v),
        AttrValue::Schars(v) => widen(v),
        AttrValue::Uchars(v) => widen(v),
        AttrValue::Longlongs(v) => v.into_iter().map(|x| x as f64).collect(),
        AttrValue::Ulonglongs(v) => v.into_iter().map(|x| x as f64).collect(),
        _ => Vec::new(),
    }
}

fn string_attr(var: &netcdf::Variable, name: &str) -> Result<Option<String>> {
    match var.attribute(name) {
        Some(attr) => match attr.value()? {
            AttrValue::Str(s) => Ok(Some(s)),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}
