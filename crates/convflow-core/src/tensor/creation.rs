//! Tensor construction.
//!
//! All constructors enforce the buffer invariant: the element count equals
//! the product of the four extents.

use super::core::{FilterTensor, Tensor4D};
use crate::{ConvError, Result};
use ndarray::Array4;
use num_traits::Zero;

fn array_from_vec<T>(operation: &str, data: Vec<T>, shape: [usize; 4]) -> Result<Array4<T>> {
    let total_elements: usize = shape.iter().product();
    if data.len() != total_elements {
        return Err(ConvError::shape_mismatch(
            operation,
            &format!("{total_elements} elements for shape {shape:?}"),
            &format!("{} elements", data.len()),
        ));
    }

    Array4::from_shape_vec(shape, data)
        .map_err(|e| ConvError::shape_mismatch(operation, &format!("shape {shape:?}"), &e.to_string()))
}

fn standard_layout<T: Clone>(array: Array4<T>) -> Array4<T> {
    if array.is_standard_layout() {
        array
    } else {
        array.as_standard_layout().into_owned()
    }
}

impl<T> Tensor4D<T> {
    /// Create a tensor from a row-major buffer with shape
    /// `[batch, height, width, channels]`
    pub fn from_vec(data: Vec<T>, shape: [usize; 4]) -> Result<Self> {
        Ok(Self {
            data: array_from_vec("Tensor4D::from_vec", data, shape)?,
        })
    }

    pub fn from_shape_fn<F>(shape: [usize; 4], f: F) -> Self
    where
        F: FnMut((usize, usize, usize, usize)) -> T,
    {
        Self {
            data: Array4::from_shape_fn(shape, f),
        }
    }

    /// Create a tensor filled with zeros
    pub fn zeros(shape: [usize; 4]) -> Self
    where
        T: Clone + Zero,
    {
        Self {
            data: Array4::zeros(shape),
        }
    }

    /// Wrap an existing array, copying it into standard layout if needed
    pub fn from_array(array: Array4<T>) -> Self
    where
        T: Clone,
    {
        Self {
            data: standard_layout(array),
        }
    }
}

impl<T> FilterTensor<T> {
    /// Create a filter from a row-major buffer with shape
    /// `[kernel_height, kernel_width, in_channels, out_channels]`
    pub fn from_vec(data: Vec<T>, shape: [usize; 4]) -> Result<Self> {
        Ok(Self {
            data: array_from_vec("FilterTensor::from_vec", data, shape)?,
        })
    }

    pub fn from_shape_fn<F>(shape: [usize; 4], f: F) -> Self
    where
        F: FnMut((usize, usize, usize, usize)) -> T,
    {
        Self {
            data: Array4::from_shape_fn(shape, f),
        }
    }

    pub fn zeros(shape: [usize; 4]) -> Self
    where
        T: Clone + Zero,
    {
        Self {
            data: Array4::zeros(shape),
        }
    }

    pub fn from_array(array: Array4<T>) -> Self
    where
        T: Clone,
    {
        Self {
            data: standard_layout(array),
        }
    }
}
