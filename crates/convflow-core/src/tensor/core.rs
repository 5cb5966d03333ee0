//! Core 4-D tensor structures and property accessors.
//!
//! Both tensor types own a standard-layout (row-major, contiguous)
//! `ndarray::Array4`. Constructors normalise any other layout, so kernels can
//! rely on `[[a, b, c, d]]` indexing and `as_slice` alike.

use ndarray::{Array4, ArrayView4};

/// Activation volume in `[batch, height, width, channels]` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor4D<T> {
    pub(crate) data: Array4<T>,
}

/// Filter volume in `[kernel_height, kernel_width, in_channels, out_channels]`
/// order. Depthwise filters reuse the last axis as the channel multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTensor<T> {
    pub(crate) data: Array4<T>,
}

impl<T> Tensor4D<T> {
    /// Shape as `[batch, height, width, channels]`
    pub fn shape(&self) -> [usize; 4] {
        let (a, b, c, d) = self.data.dim();
        [a, b, c, d]
    }

    pub fn batch(&self) -> usize {
        self.data.dim().0
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn channels(&self) -> usize {
        self.data.dim().3
    }

    /// Get the total number of elements
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the value at `[b, y, x, c]`, or `None` when out of range
    pub fn get(&self, index: [usize; 4]) -> Option<&T> {
        self.data.get(index)
    }

    /// Get the underlying data as a row-major slice
    pub fn as_slice(&self) -> Option<&[T]> {
        self.data.as_slice()
    }

    pub fn view(&self) -> ArrayView4<'_, T> {
        self.data.view()
    }

    pub fn into_array(self) -> Array4<T> {
        self.data
    }

    /// Copy the elements out in row-major order
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.iter().cloned().collect()
    }
}

impl<T> FilterTensor<T> {
    /// Shape as `[kernel_height, kernel_width, in_channels, out_channels]`
    pub fn shape(&self) -> [usize; 4] {
        let (a, b, c, d) = self.data.dim();
        [a, b, c, d]
    }

    pub fn kernel_height(&self) -> usize {
        self.data.dim().0
    }

    pub fn kernel_width(&self) -> usize {
        self.data.dim().1
    }

    pub fn in_channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn out_channels(&self) -> usize {
        self.data.dim().3
    }

    /// Depthwise view of the last axis
    pub fn channel_multiplier(&self) -> usize {
        self.data.dim().3
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the value at `[ky, kx, ic, oc]`, or `None` when out of range
    pub fn get(&self, index: [usize; 4]) -> Option<&T> {
        self.data.get(index)
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        self.data.as_slice()
    }

    pub fn view(&self) -> ArrayView4<'_, T> {
        self.data.view()
    }

    pub fn into_array(self) -> Array4<T> {
        self.data
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.iter().cloned().collect()
    }
}
