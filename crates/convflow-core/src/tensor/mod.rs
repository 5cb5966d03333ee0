//! Tensor Module
//!
//! - **core**: the [`Tensor4D`] and [`FilterTensor`] structures and their accessors
//! - **creation**: constructors that enforce the buffer-length invariant

pub mod core;
pub mod creation;

pub use core::{FilterTensor, Tensor4D};
