//! Depthwise 2-D convolution.
//!
//! Each input channel `ic` is convolved with its own `multiplier` filters and
//! never mixed with another channel. Output channel `ic * multiplier + m`
//! holds filter `m` of channel `ic`.

use super::engine::ConvEngine;
use super::padding::Padding;
use crate::tensor::{FilterTensor, Tensor4D};
use crate::{Element, Result};

/// Filter shape: [kernel_height, kernel_width, in_channels, channel_multiplier]
pub fn depthwise_conv2d<T: Element>(
    input: &Tensor4D<T>,
    filter: &FilterTensor<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<Tensor4D<T>> {
    ConvEngine::default().depthwise_conv2d(input, filter, row_stride, col_stride, padding)
}

/// Gradient of [`depthwise_conv2d`] with respect to its input
pub fn depthwise_conv2d_backprop_input<T: Element>(
    input_shape: [usize; 4],
    filter: &FilterTensor<T>,
    output_grad: &Tensor4D<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<Tensor4D<T>> {
    ConvEngine::default().depthwise_conv2d_backprop_input(
        input_shape,
        filter,
        output_grad,
        row_stride,
        col_stride,
        padding,
    )
}

/// Gradient of [`depthwise_conv2d`] with respect to its filter
pub fn depthwise_conv2d_backprop_filter<T: Element>(
    input: &Tensor4D<T>,
    filter_shape: [usize; 4],
    output_grad: &Tensor4D<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<FilterTensor<T>> {
    ConvEngine::default().depthwise_conv2d_backprop_filter(
        input,
        filter_shape,
        output_grad,
        row_stride,
        col_stride,
        padding,
    )
}
