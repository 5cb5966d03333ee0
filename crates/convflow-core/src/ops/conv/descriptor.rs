//! Fully-resolved convolution geometry.
//!
//! A [`ConvDescriptor`] is built once per call, after validation, and carries
//! everything the kernels need: the common stride, per-axis padding and the
//! output shape. Kernels never re-derive any of it.

use super::padding::{compute_padding, AxisPadding, Padding};
use super::validate::{validate, ConvKind};
use crate::shape::PartialShape;
use crate::{ConvError, Result};

/// Channel grouping shared by the standard and depthwise kernels.
///
/// Output channel `g * out_per_group + o` reads input channels
/// `g * in_per_group + i` through filter entry `[ky, kx, g * in_per_group + i, o]`.
/// A standard convolution is one group spanning every channel; a depthwise
/// convolution is one group per input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChannelGroups {
    pub groups: usize,
    pub in_per_group: usize,
    pub out_per_group: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvDescriptor {
    operation: &'static str,
    kind: ConvKind,
    input_shape: [usize; 4],
    filter_shape: [usize; 4],
    output_shape: [usize; 4],
    stride: usize,
    padding: Padding,
    rows: AxisPadding,
    cols: AxisPadding,
}

/// `[1, row_stride, col_stride, 1]`
pub fn strides_of(row_stride: usize, col_stride: usize) -> [usize; 4] {
    [1, row_stride, col_stride, 1]
}

impl ConvDescriptor {
    /// Descriptor for a standard convolution with an HWIO filter
    pub fn new(
        input_shape: [usize; 4],
        filter_shape: [usize; 4],
        strides: &[usize],
        padding: Padding,
    ) -> Result<Self> {
        Self::build("conv2d", ConvKind::Standard, input_shape, filter_shape, strides, padding)
    }

    /// Descriptor for a depthwise convolution with a `[kh, kw, in, mult]` filter
    pub fn depthwise(
        input_shape: [usize; 4],
        filter_shape: [usize; 4],
        strides: &[usize],
        padding: Padding,
    ) -> Result<Self> {
        Self::build(
            "depthwise_conv2d",
            ConvKind::Depthwise,
            input_shape,
            filter_shape,
            strides,
            padding,
        )
    }

    pub(crate) fn build(
        operation: &'static str,
        kind: ConvKind,
        input_shape: [usize; 4],
        filter_shape: [usize; 4],
        strides: &[usize],
        padding: Padding,
    ) -> Result<Self> {
        let validated = validate(
            operation,
            &PartialShape::from(input_shape),
            &PartialShape::from(filter_shape),
            strides,
            padding,
            kind,
        )?;
        let stride = validated.stride;

        let rows = compute_padding(input_shape[1], filter_shape[0], stride, padding);
        let cols = compute_padding(input_shape[2], filter_shape[1], stride, padding);
        let out_channels = match kind {
            ConvKind::Standard => filter_shape[3],
            ConvKind::Depthwise => filter_shape[2] * filter_shape[3],
        };
        let output_shape = [input_shape[0], rows.out_extent, cols.out_extent, out_channels];

        tracing::debug!(
            operation,
            input = ?input_shape,
            filter = ?filter_shape,
            stride,
            padding = %padding,
            output = ?output_shape,
            pad_rows = ?(rows.pad_before, rows.pad_after),
            pad_cols = ?(cols.pad_before, cols.pad_after),
            "built convolution descriptor"
        );

        Ok(Self {
            operation,
            kind,
            input_shape,
            filter_shape,
            output_shape,
            stride,
            padding,
            rows,
            cols,
        })
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn kind(&self) -> ConvKind {
        self.kind
    }

    pub fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    pub fn filter_shape(&self) -> [usize; 4] {
        self.filter_shape
    }

    pub fn output_shape(&self) -> [usize; 4] {
        self.output_shape
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn rows(&self) -> AxisPadding {
        self.rows
    }

    pub fn cols(&self) -> AxisPadding {
        self.cols
    }

    pub fn pad_top(&self) -> usize {
        self.rows.pad_before
    }

    pub fn pad_bottom(&self) -> usize {
        self.rows.pad_after
    }

    pub fn pad_left(&self) -> usize {
        self.cols.pad_before
    }

    pub fn pad_right(&self) -> usize {
        self.cols.pad_after
    }

    pub(crate) fn groups(&self) -> ChannelGroups {
        let [_, _, in_channels, last] = self.filter_shape;
        match self.kind {
            ConvKind::Standard => ChannelGroups {
                groups: 1,
                in_per_group: in_channels,
                out_per_group: last,
            },
            ConvKind::Depthwise => ChannelGroups {
                groups: in_channels,
                in_per_group: 1,
                out_per_group: last,
            },
        }
    }

    /// Multiply-accumulate count of the forward pass; the backward passes do
    /// the same amount of work
    pub fn macs(&self) -> usize {
        let [kh, kw, in_channels, _] = self.filter_shape;
        let per_output = match self.kind {
            ConvKind::Standard => kh * kw * in_channels,
            ConvKind::Depthwise => kh * kw,
        };
        self.output_shape.iter().product::<usize>() * per_output
    }

    /// Input coordinate read by output position `out` at filter tap `tap`
    /// along an axis, or `None` when it falls in the zero padding
    #[inline]
    pub(crate) fn source_index(
        out: usize,
        tap: usize,
        stride: usize,
        pad_before: usize,
        in_extent: usize,
    ) -> Option<usize> {
        (out * stride + tap)
            .checked_sub(pad_before)
            .filter(|&i| i < in_extent)
    }

    /// Output coordinate whose tap `tap` reads input coordinate `input`, if
    /// one exists on the stride grid
    #[inline]
    pub(crate) fn target_index(
        input: usize,
        tap: usize,
        stride: usize,
        pad_before: usize,
        out_extent: usize,
    ) -> Option<usize> {
        let pos = (input + pad_before).checked_sub(tap)?;
        (pos % stride == 0 && pos / stride < out_extent).then_some(pos / stride)
    }

    /// Reject an output gradient whose shape differs from the forward output
    pub(crate) fn check_output_grad(&self, got: [usize; 4]) -> Result<()> {
        if got != self.output_shape {
            return Err(ConvError::shape_mismatch(
                self.operation,
                &format!("output gradient of shape {:?}", self.output_shape),
                &format!("{got:?}"),
            ));
        }
        Ok(())
    }
}
