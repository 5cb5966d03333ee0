//! Depthwise-separable convolution: a depthwise stage followed by a 1x1
//! pointwise convolution (stride 1, VALID) that mixes the channels.

use super::engine::ConvEngine;
use super::padding::Padding;
use crate::tensor::{FilterTensor, Tensor4D};
use crate::{Element, Result};

/// Depthwise filter: [kh, kw, in_channels, multiplier]
/// Pointwise filter: [1, 1, in_channels * multiplier, out_channels]
pub fn separable_conv2d<T: Element>(
    input: &Tensor4D<T>,
    depthwise_filter: &FilterTensor<T>,
    pointwise_filter: &FilterTensor<T>,
    row_stride: usize,
    col_stride: usize,
    padding: Padding,
) -> Result<Tensor4D<T>> {
    ConvEngine::default().separable_conv2d(
        input,
        depthwise_filter,
        pointwise_filter,
        row_stride,
        col_stride,
        padding,
    )
}
