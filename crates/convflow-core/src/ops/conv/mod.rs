//! Convolution operations for NHWC tensors
//!
//! This module provides:
//! - Standard 2D convolution and its input/filter gradients
//! - Depthwise convolution and its gradients
//! - Depthwise separable convolution
//! - Shape inference over partially-known shapes
//! - Reference and parallel backends behind a common strategy trait

pub mod backend;
mod backprop_filter;
mod backprop_input;
pub mod conv2d;
pub mod depthwise;
pub mod descriptor;
pub mod engine;
mod forward;
pub mod padding;
pub mod separable;
pub mod validate;

pub use backend::{select_backend, BackendKind, ConvBackend, ParallelBackend, ReferenceBackend};
pub use conv2d::{conv2d, conv2d_backprop_filter, conv2d_backprop_input};
pub use depthwise::{
    depthwise_conv2d, depthwise_conv2d_backprop_filter, depthwise_conv2d_backprop_input,
};
pub use descriptor::{strides_of, ConvDescriptor};
pub use engine::ConvEngine;
pub use padding::{compute_padding, output_extent, AxisPadding, Padding};
pub use separable::separable_conv2d;
pub use validate::{
    infer_conv2d_shape, infer_depthwise_conv2d_shape, infer_separable_conv2d_shape, ConvKind,
};
