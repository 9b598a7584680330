use ndarray::{ArrayD, Axis, IxDyn};
use std::path::Path;

use crate::error::LutError;

/// Opens a NetCDF file, reporting a missing file as [`LutError::DataNotFound`].
pub fn open(path: &Path) -> Result<netcdf::File, LutError> {
    if !path.is_file() {
        return Err(LutError::DataNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(netcdf::open(path)?)
}

fn variable<'f>(file: &'f netcdf::File, name: &str) -> Result<netcdf::Variable<'f>, LutError> {
    file.variable(name).ok_or_else(|| LutError::KeyLookup {
        kind: "variable",
        key: name.to_string(),
    })
}

/// Reads a one-dimensional numeric coordinate.
pub fn read_coordinate(file: &netcdf::File, name: &str) -> Result<Vec<f64>, LutError> {
    let array = NamedArray::read(file, name)?;
    if array.dims.len() != 1 {
        return Err(LutError::Layout {
            variable: name.to_string(),
            reason: format!("expected 1 dimension, found {:?}", array.dims),
        });
    }

    Ok(array.data.iter().copied().collect())
}

/// Reads a one-dimensional string coordinate (e.g. species or dataset version labels).
pub fn read_labels(file: &netcdf::File, name: &str) -> Result<Vec<String>, LutError> {
    let var = variable(file, name)?;
    let dims = var.dimensions();
    if dims.len() != 1 {
        return Err(LutError::Layout {
            variable: name.to_string(),
            reason: format!("expected 1 dimension, found {}", dims.len()),
        });
    }

    (0..dims[0].len())
        .map(|i| var.get_string([i]).map_err(LutError::from))
        .collect()
}

/// A numeric variable whose axes are addressed by dimension name.
#[derive(Debug, Clone)]
pub struct NamedArray {
    name: String,
    dims: Vec<String>,
    data: ArrayD<f64>,
}

impl NamedArray {
    pub fn new(
        name: impl Into<String>,
        dims: Vec<String>,
        data: ArrayD<f64>,
    ) -> Result<Self, LutError> {
        let name = name.into();
        if dims.len() != data.ndim() {
            return Err(LutError::Layout {
                variable: name,
                reason: format!("{} dimension names for {} axes", dims.len(), data.ndim()),
            });
        }

        Ok(Self { name, dims, data })
    }

    pub fn read(file: &netcdf::File, name: &str) -> Result<Self, LutError> {
        let var = variable(file, name)?;
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let values = var.get_values::<f64, _>(..)?;

        let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| LutError::Layout {
            variable: name.to_string(),
            reason: e.to_string(),
        })?;

        Self::new(name, dims, data)
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    fn position(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    fn layout_error(&self, reason: String) -> LutError {
        LutError::Layout {
            variable: self.name.clone(),
            reason,
        }
    }

    /// Drops dimension `dim` by taking the slice at `index`.
    pub fn select(&self, dim: &str, index: usize) -> Result<Self, LutError> {
        let pos = self
            .position(dim)
            .ok_or_else(|| {
                self.layout_error(format!("no dimension '{}' in {:?}", dim, self.dims))
            })?;

        let len = self.data.len_of(Axis(pos));
        if index >= len {
            return Err(self.layout_error(format!(
                "index {} out of bounds for dimension '{}' of length {}",
                index, dim, len
            )));
        }

        let mut dims = self.dims.clone();
        dims.remove(pos);

        Ok(Self {
            name: self.name.clone(),
            dims,
            data: self.data.index_axis(Axis(pos), index).to_owned(),
        })
    }

    /// Like [`NamedArray::select`], but a missing dimension leaves the array unchanged.
    pub fn select_if_present(&self, dim: &str, index: usize) -> Result<Self, LutError> {
        if self.position(dim).is_some() {
            self.select(dim, index)
        } else {
            Ok(self.clone())
        }
    }

    /// Returns the data with its axes permuted to `order`, which must name every dimension.
    pub fn into_ordered(self, order: &[&str]) -> Result<ArrayD<f64>, LutError> {
        if order.len() != self.dims.len() {
            return Err(self.layout_error(format!(
                "expected dimensions {:?}, found {:?}",
                order, self.dims
            )));
        }

        let mut permutation = Vec::with_capacity(order.len());
        for dim in order {
            let pos = self.position(dim).ok_or_else(|| {
                self.layout_error(format!("expected dimensions {:?}, found {:?}", order, self.dims))
            })?;
            permutation.push(pos);
        }

        Ok(self.data.permuted_axes(permutation).as_standard_layout().into_owned())
    }
}
