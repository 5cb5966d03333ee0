//! Backend strategy for the convolution kernels.
//!
//! The reference backend is the sequential definition of every pass; the
//! parallel backend partitions the output into disjoint rows on the rayon
//! pool and must agree with it up to accumulation order.

use super::backprop_filter::{backprop_filter_parallel, backprop_filter_reference};
use super::backprop_input::{backprop_input_parallel, backprop_input_reference};
use super::descriptor::ConvDescriptor;
use super::forward::{forward_parallel, forward_reference};
use crate::config::{BackendPreference, ExecutionConfig};
use crate::Element;
use ndarray::ArrayView4;

/// The three passes every backend provides.
///
/// Operands are already validated against `desc`; implementations return a
/// row-major buffer of the descriptor's output, input or filter shape
/// respectively.
pub trait ConvBackend {
    fn name(&self) -> &'static str;

    fn forward<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        filter: ArrayView4<'_, T>,
    ) -> Vec<T>;

    fn backprop_input<T: Element>(
        &self,
        desc: &ConvDescriptor,
        filter: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T>;

    fn backprop_filter<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T>;
}

/// Sequential kernels
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBackend;

/// Rayon kernels over disjoint output rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

impl ConvBackend for ReferenceBackend {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn forward<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        filter: ArrayView4<'_, T>,
    ) -> Vec<T> {
        forward_reference(desc, input, filter)
    }

    fn backprop_input<T: Element>(
        &self,
        desc: &ConvDescriptor,
        filter: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T> {
        backprop_input_reference(desc, filter, output_grad)
    }

    fn backprop_filter<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T> {
        backprop_filter_reference(desc, input, output_grad)
    }
}

impl ConvBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn forward<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        filter: ArrayView4<'_, T>,
    ) -> Vec<T> {
        forward_parallel(desc, input, filter)
    }

    fn backprop_input<T: Element>(
        &self,
        desc: &ConvDescriptor,
        filter: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T> {
        backprop_input_parallel(desc, filter, output_grad)
    }

    fn backprop_filter<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T> {
        backprop_filter_parallel(desc, input, output_grad)
    }
}

/// Backend chosen for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Reference,
    Parallel,
}

impl ConvBackend for BackendKind {
    fn name(&self) -> &'static str {
        match self {
            BackendKind::Reference => ReferenceBackend.name(),
            BackendKind::Parallel => ParallelBackend.name(),
        }
    }

    fn forward<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        filter: ArrayView4<'_, T>,
    ) -> Vec<T> {
        match self {
            BackendKind::Reference => ReferenceBackend.forward(desc, input, filter),
            BackendKind::Parallel => ParallelBackend.forward(desc, input, filter),
        }
    }

    fn backprop_input<T: Element>(
        &self,
        desc: &ConvDescriptor,
        filter: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T> {
        match self {
            BackendKind::Reference => ReferenceBackend.backprop_input(desc, filter, output_grad),
            BackendKind::Parallel => ParallelBackend.backprop_input(desc, filter, output_grad),
        }
    }

    fn backprop_filter<T: Element>(
        &self,
        desc: &ConvDescriptor,
        input: ArrayView4<'_, T>,
        output_grad: ArrayView4<'_, T>,
    ) -> Vec<T> {
        match self {
            BackendKind::Reference => ReferenceBackend.backprop_filter(desc, input, output_grad),
            BackendKind::Parallel => ParallelBackend.backprop_filter(desc, input, output_grad),
        }
    }
}

/// Select a backend from the configured preference and the problem size
pub fn select_backend(config: &ExecutionConfig, desc: &ConvDescriptor) -> BackendKind {
    let macs = desc.macs();
    tracing::trace!(
        operation = desc.operation(),
        macs,
        preference = %config.backend,
        threshold = config.parallel_threshold,
        "selecting backend"
    );

    let kind = match config.backend {
        BackendPreference::Reference => BackendKind::Reference,
        BackendPreference::Parallel => BackendKind::Parallel,
        BackendPreference::Auto if macs >= config.parallel_threshold => BackendKind::Parallel,
        BackendPreference::Auto => BackendKind::Reference,
    };

    tracing::debug!(operation = desc.operation(), backend = kind.name(), macs, "selected backend");
    kind
}
