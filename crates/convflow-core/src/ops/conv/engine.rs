//! Convolution entry points bound to an [`ExecutionConfig`].
//!
//! Every method validates first, builds a [`ConvDescriptor`], then hands the
//! borrowed operands to the selected backend and wraps the fresh buffer in a
//! tensor. No state survives a call.

use super::backend::{select_backend, ConvBackend};
use super::descriptor::{strides_of, ConvDescriptor};
use super::padding::Padding;
use super::validate::{check_pointwise, ConvKind};
use crate::config::ExecutionConfig;
use crate::shape::PartialShape;
use crate::tensor::{FilterTensor, Tensor4D};
use crate::{Element, Result};

/// Convolution engine carrying the backend configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvEngine {
    config: ExecutionConfig,
}

impl ConvEngine {
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Engine configured from `CONVFLOW_BACKEND` / `CONVFLOW_PARALLEL_THRESHOLD`
    pub fn from_env() -> Result<Self> {
        ExecutionConfig::from_env().map(Self::new)
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    fn forward<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: &Tensor4D<T>,
        filter: &FilterTensor<T>,
    ) -> Result<Tensor4D<T>> {
        let backend = select_backend(&self.config, desc);
        let data = backend.forward(desc, input.view(), filter.view());
        Tensor4D::from_vec(data, desc.output_shape())
    }

    fn backprop_input<T: Element>(
        &self,
        desc: &ConvDescriptor,
        filter: &FilterTensor<T>,
        output_grad: &Tensor4D<T>,
    ) -> Result<Tensor4D<T>> {
        desc.check_output_grad(output_grad.shape())?;
        let backend = select_backend(&self.config, desc);
        let data = backend.backprop_input(desc, filter.view(), output_grad.view());
        Tensor4D::from_vec(data, desc.input_shape())
    }

    fn backprop_filter<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: &Tensor4D<T>,
        output_grad: &Tensor4D<T>,
    ) -> Result<FilterTensor<T>> {
        desc.check_output_grad(output_grad.shape())?;
        let backend = select_backend(&self.config, desc);
        let data = backend.backprop_filter(desc, input.view(), output_grad.view());
        FilterTensor::from_vec(data, desc.filter_shape())
    }

    /// 2-D convolution of an NHWC input with an HWIO filter
    pub fn conv2d<T: Element>(
        &self,
        input: &Tensor4D<T>,
        filter: &FilterTensor<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<Tensor4D<T>> {
        let desc = ConvDescriptor::build(
            "conv2d",
            ConvKind::Standard,
            input.shape(),
            filter.shape(),
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        self.forward(&desc, input, filter)
    }

    /// Gradient of [`ConvEngine::conv2d`] with respect to an input of shape
    /// `input_shape`
    pub fn conv2d_backprop_input<T: Element>(
        &self,
        input_shape: [usize; 4],
        filter: &FilterTensor<T>,
        output_grad: &Tensor4D<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<Tensor4D<T>> {
        let desc = ConvDescriptor::build(
            "conv2d_backprop_input",
            ConvKind::Standard,
            input_shape,
            filter.shape(),
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        self.backprop_input(&desc, filter, output_grad)
    }

    /// Gradient of [`ConvEngine::conv2d`] with respect to a filter of shape
    /// `filter_shape`
    pub fn conv2d_backprop_filter<T: Element>(
        &self,
        input: &Tensor4D<T>,
        filter_shape: [usize; 4],
        output_grad: &Tensor4D<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<FilterTensor<T>> {
        let desc = ConvDescriptor::build(
            "conv2d_backprop_filter",
            ConvKind::Standard,
            input.shape(),
            filter_shape,
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        self.backprop_filter(&desc, input, output_grad)
    }

    /// Per-channel convolution with a `[kh, kw, in_channels, multiplier]`
    /// filter; output channel `ic * multiplier + m`
    pub fn depthwise_conv2d<T: Element>(
        &self,
        input: &Tensor4D<T>,
        filter: &FilterTensor<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<Tensor4D<T>> {
        let desc = ConvDescriptor::build(
            "depthwise_conv2d",
            ConvKind::Depthwise,
            input.shape(),
            filter.shape(),
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        self.forward(&desc, input, filter)
    }

    pub fn depthwise_conv2d_backprop_input<T: Element>(
        &self,
        input_shape: [usize; 4],
        filter: &FilterTensor<T>,
        output_grad: &Tensor4D<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<Tensor4D<T>> {
        let desc = ConvDescriptor::build(
            "depthwise_conv2d_backprop_input",
            ConvKind::Depthwise,
            input_shape,
            filter.shape(),
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        self.backprop_input(&desc, filter, output_grad)
    }

    pub fn depthwise_conv2d_backprop_filter<T: Element>(
        &self,
        input: &Tensor4D<T>,
        filter_shape: [usize; 4],
        output_grad: &Tensor4D<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<FilterTensor<T>> {
        let desc = ConvDescriptor::build(
            "depthwise_conv2d_backprop_filter",
            ConvKind::Depthwise,
            input.shape(),
            filter_shape,
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        self.backprop_filter(&desc, input, output_grad)
    }

    /// Depthwise stage followed by a 1x1 pointwise convolution.
    ///
    /// Both stages are validated before either computes.
    pub fn separable_conv2d<T: Element>(
        &self,
        input: &Tensor4D<T>,
        depthwise_filter: &FilterTensor<T>,
        pointwise_filter: &FilterTensor<T>,
        row_stride: usize,
        col_stride: usize,
        padding: Padding,
    ) -> Result<Tensor4D<T>> {
        let operation = "separable_conv2d";
        let depthwise = ConvDescriptor::build(
            operation,
            ConvKind::Depthwise,
            input.shape(),
            depthwise_filter.shape(),
            &strides_of(row_stride, col_stride),
            padding,
        )?;
        check_pointwise(operation, &PartialShape::from(pointwise_filter.shape()))?;
        let pointwise = ConvDescriptor::build(
            operation,
            ConvKind::Standard,
            depthwise.output_shape(),
            pointwise_filter.shape(),
            &strides_of(1, 1),
            Padding::Valid,
        )?;

        let intermediate = self.forward(&depthwise, input, depthwise_filter)?;
        self.forward(&pointwise, &intermediate, pointwise_filter)
    }
}
