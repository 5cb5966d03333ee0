//! Standard 2-D convolution and its two gradients.
//!
//! Input is NHWC, the filter is HWIO. These free functions run on the default
//! [`ConvEngine`]; construct one explicitly to pin a backend.

use super::engine::ConvEngine;
use super::padding::Padding;
use crate::tensor::{FilterTensor, Tensor4D};
use crate::{Element, Result};

/// Performs 2D convolution
/// Input shape: [batch, height, width, in_channels] (NHWC format)
/// Filter shape: [kernel_height, kernel_width, in_channels, out_channels]
/// Output shape: [batch, out_height, out_width, out_channels]
pub fn conv2d<T: Element>(
    input: &Tensor4D<T>,
    filter: &FilterTensor<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<Tensor4D<T>> {
    ConvEngine::default().conv2d(input, filter, row_stride, col_stride, padding)
}

/// Gradient of [`conv2d`] with respect to its input
pub fn conv2d_backprop_input<T: Element>(
    input_shape: [usize; 4],
    filter: &FilterTensor<T>,
    output_grad: &Tensor4D<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<Tensor4D<T>> {
    ConvEngine::default().conv2d_backprop_input(
        input_shape,
        filter,
        output_grad,
        row_stride,
        col_stride,
        padding,
    )
}

/// Gradient of [`conv2d`] with respect to its filter
pub fn conv2d_backprop_filter<T: Element>(
    input: &Tensor4D<T>,
    filter_shape: [usize; 4],
    output_grad: &Tensor4D<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<FilterTensor<T>> {
    ConvEngine::default().conv2d_backprop_filter(
        input,
        filter_shape,
        output_grad,
        row_stride,
        col_stride,
        padding,
    )
}
