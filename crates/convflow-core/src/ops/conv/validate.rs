//! Shape validation and standalone shape inference.
//!
//! Rules run in a fixed order and the first violated rule is reported:
//!
//! 1. input and filter rank 4
//! 2. strides `[1, r, c, 1]`
//! 3. `r == c` (and non-zero)
//! 4. filter in_channels == input depth
//! 5. filter no larger than the input
//! 6. stride no larger than the filter
//!
//! Unknown dimensions never fail a rule; they only make the dependent output
//! dimensions unknown.

use super::padding::{output_extent, Padding};
use crate::shape::{Dim, PartialShape};
use crate::{ConvError, Result};

/// Which channel mapping the filter's last axis follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvKind {
    /// `[kh, kw, in_channels, out_channels]`, channels fully mixed
    Standard,
    /// `[kh, kw, in_channels, multiplier]`, one filter bank per input channel
    Depthwise,
}

impl ConvKind {
    pub fn operation(&self) -> &'static str {
        match self {
            ConvKind::Standard => "conv2d",
            ConvKind::Depthwise => "depthwise_conv2d",
        }
    }
}

/// Result of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConv {
    /// Common row/column stride
    pub stride: usize,
    /// `[batch, out_rows, out_cols, out_channels]`, possibly partially unknown
    pub output_shape: PartialShape,
}

fn check_rank(operation: &str, operand: &'static str, shape: &PartialShape) -> Result<()> {
    match shape.rank() {
        Some(rank) if rank != 4 => Err(ConvError::rank(operation, operand, rank)),
        _ => Ok(()),
    }
}

fn check_strides(operation: &str, strides: &[usize]) -> Result<usize> {
    if strides.len() != 4 {
        return Err(ConvError::stride(
            operation,
            &format!("strides must have 4 elements, got {}", strides.len()),
            strides,
        ));
    }
    if strides[0] != 1 || strides[3] != 1 {
        return Err(ConvError::stride(
            operation,
            "Current implementation does not yet support strides in the batch and depth dimensions",
            strides,
        ));
    }
    if strides[1] != strides[2] {
        return Err(ConvError::stride(
            operation,
            "Current implementation only supports equal length strides in the row and column dimensions",
            strides,
        ));
    }
    if strides[1] == 0 {
        return Err(ConvError::stride(operation, "strides must be positive", strides));
    }
    Ok(strides[1])
}

/// Validate a convolution configuration and infer its output shape.
pub fn validate(
    operation: &str,
    input: &PartialShape,
    filter: &PartialShape,
    strides: &[usize],
    padding: Padding,
    kind: ConvKind,
) -> Result<ValidatedConv> {
    check_rank(operation, "input", input)?;
    check_rank(operation, "filter", filter)?;

    let stride = check_strides(operation, strides)?;

    let [batch, in_rows, in_cols, in_depth] = [0, 1, 2, 3].map(|axis| input.dim(axis));
    let [filter_rows, filter_cols, filter_depth, filter_out] =
        [0, 1, 2, 3].map(|axis| filter.dim(axis));

    if let (Dim::Known(input_depth), Dim::Known(filter_depth)) = (in_depth, filter_depth) {
        if input_depth != filter_depth {
            return Err(ConvError::depth_mismatch(operation, input_depth, filter_depth));
        }
    }

    for (axis, f, i) in [("rows", filter_rows, in_rows), ("cols", filter_cols, in_cols)] {
        if let (Dim::Known(f), Dim::Known(i)) = (f, i) {
            if f > i {
                return Err(ConvError::filter_too_large(operation, axis, f, i));
            }
        }
    }

    for (axis, f) in [("rows", filter_rows), ("cols", filter_cols)] {
        if let Dim::Known(f) = f {
            if stride > f {
                return Err(ConvError::stride_too_large(operation, axis, stride, f));
            }
        }
    }

    let out_channels = match kind {
        ConvKind::Standard => filter_out,
        ConvKind::Depthwise => {
            // either operand may carry the depth
            let depth = if filter_depth.is_known() { filter_depth } else { in_depth };
            depth * filter_out
        }
    };

    let output_shape = PartialShape::new(vec![
        batch,
        output_extent(in_rows, filter_rows, stride, padding),
        output_extent(in_cols, filter_cols, stride, padding),
        out_channels,
    ]);

    tracing::trace!(
        operation,
        input = %input,
        filter = %filter,
        stride,
        padding = %padding,
        output = %output_shape,
        "validated convolution shapes"
    );

    Ok(ValidatedConv {
        stride,
        output_shape,
    })
}

/// Output shape of `conv2d` without materializing any data
pub fn infer_conv2d_shape(
    input: &PartialShape,
    filter: &PartialShape,
    strides: &[usize],
    padding: Padding,
) -> Result<PartialShape> {
    validate("conv2d", input, filter, strides, padding, ConvKind::Standard).map(|v| v.output_shape)
}

/// Output shape of `depthwise_conv2d` without materializing any data
pub fn infer_depthwise_conv2d_shape(
    input: &PartialShape,
    filter: &PartialShape,
    strides: &[usize],
    padding: Padding,
) -> Result<PartialShape> {
    validate(
        "depthwise_conv2d",
        input,
        filter,
        strides,
        padding,
        ConvKind::Depthwise,
    )
    .map(|v| v.output_shape)
}

/// Check that `pointwise` is a `[1, 1, ?, ?]` filter
pub(crate) fn check_pointwise(operation: &str, pointwise: &PartialShape) -> Result<()> {
    check_rank(operation, "pointwise filter", pointwise)?;
    for (axis, dim) in [("rows", pointwise.dim(0)), ("cols", pointwise.dim(1))] {
        if let Dim::Known(extent) = dim {
            if extent != 1 {
                return Err(ConvError::invalid_argument(
                    operation,
                    &format!("pointwise filter must be 1x1, got {extent} {axis} (shape {pointwise})"),
                ));
            }
        }
    }
    Ok(())
}

/// Output shape of `separable_conv2d`: depthwise stage, then a 1x1 VALID
/// convolution with unit stride
pub fn infer_separable_conv2d_shape(
    input: &PartialShape,
    depthwise_filter: &PartialShape,
    pointwise_filter: &PartialShape,
    strides: &[usize],
    padding: Padding,
) -> Result<PartialShape> {
    let operation = "separable_conv2d";
    let intermediate = validate(
        operation,
        input,
        depthwise_filter,
        strides,
        padding,
        ConvKind::Depthwise,
    )?
    .output_shape;

    check_pointwise(operation, pointwise_filter)?;

    validate(
        operation,
        &intermediate,
        pointwise_filter,
        &[1, 1, 1, 1],
        Padding::Valid,
        ConvKind::Standard,
    )
    .map(|v| v.output_shape)
}
