//! NHWC 2-D convolution kernels with explicit gradients.
//!
//! ```
//! use convflow_core::{conv2d, FilterTensor, Padding, Tensor4D};
//!
//! let input = Tensor4D::from_vec((1..=18).map(|v| v as f32).collect(), [1, 2, 3, 3])?;
//! let filter = FilterTensor::from_vec((1..=9).map(|v| v as f32).collect(), [1, 1, 3, 3])?;
//! let output = conv2d(&input, &filter, 1, 1, Padding::Valid)?;
//! assert_eq!(output.shape(), [1, 2, 3, 3]);
//! # Ok::<(), convflow_core::ConvError>(())
//! ```
#![allow(clippy::result_large_err)]

pub mod config;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod shape;
pub mod tensor;

pub use config::{BackendPreference, ExecutionConfig};
pub use dtype::{dtype_of, DType, Element};
pub use error::{ConvError, ConvErrorKind, Result};
pub use ops::conv::{
    compute_padding, conv2d, conv2d_backprop_filter, conv2d_backprop_input, depthwise_conv2d,
    depthwise_conv2d_backprop_filter, depthwise_conv2d_backprop_input, infer_conv2d_shape,
    infer_depthwise_conv2d_shape, infer_separable_conv2d_shape, separable_conv2d, AxisPadding,
    ConvDescriptor, ConvEngine, ConvKind, Padding,
};
pub use shape::{Dim, PartialShape};
pub use tensor::{FilterTensor, Tensor4D};
