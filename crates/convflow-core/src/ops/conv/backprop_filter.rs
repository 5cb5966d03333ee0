//! Gradient of the forward pass with respect to its filter.
//!
//! `filter_grad[ky, kx, ic, o] = Σ_{b, oy, ox} input[b, oy*s + ky - pt, ox*s + kx - pl, ic] * output_grad[b, oy, ox, g*M + o]`

use super::descriptor::{ChannelGroups, ConvDescriptor};
use crate::Element;
use ndarray::ArrayView4;
use num_traits::Zero;
use rayon::prelude::*;

pub(crate) fn backprop_filter_reference<T: Element>(
    desc: &ConvDescriptor,
    input: ArrayView4<'_, T>,
    output_grad: ArrayView4<'_, T>,
) -> Vec<T> {
    let [batch, in_h, in_w, _] = desc.input_shape();
    let [kh, kw, filter_in, filter_out] = desc.filter_shape();
    let [_, out_h, out_w, _] = desc.output_shape();
    let ChannelGroups {
        groups,
        in_per_group,
        out_per_group,
    } = desc.groups();
    let (rows, cols, stride) = (desc.rows(), desc.cols(), desc.stride());

    let mut grad = vec![T::Acc::zero(); kh * kw * filter_in * filter_out];
    for b in 0..batch {
        for oy in 0..out_h {
            for ox in 0..out_w {
                for ky in 0..kh {
                    let Some(iy) = ConvDescriptor::source_index(oy, ky, stride, rows.pad_before, in_h)
                    else {
                        continue;
                    };
                    for kx in 0..kw {
                        let Some(ix) =
                            ConvDescriptor::source_index(ox, kx, stride, cols.pad_before, in_w)
                        else {
                            continue;
                        };
                        for g in 0..groups {
                            for i in 0..in_per_group {
                                let ic = g * in_per_group + i;
                                let x = input[[b, iy, ix, ic]].widen();
                                let base = ((ky * kw + kx) * filter_in + ic) * filter_out;
                                for o in 0..out_per_group {
                                    grad[base + o] = grad[base + o]
                                        + x * output_grad[[b, oy, ox, g * out_per_group + o]].widen();
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    grad.into_iter().map(T::narrow).collect()
}

/// Each rayon task owns the filter-gradient slab of one kernel row `ky`.
pub(crate) fn backprop_filter_parallel<T: Element>(
    desc: &ConvDescriptor,
    input: ArrayView4<'_, T>,
    output_grad: ArrayView4<'_, T>,
) -> Vec<T> {
    let [batch, in_h, in_w, _] = desc.input_shape();
    let [kh, kw, filter_in, filter_out] = desc.filter_shape();
    let [_, out_h, out_w, _] = desc.output_shape();
    let ChannelGroups {
        groups,
        in_per_group,
        out_per_group,
    } = desc.groups();
    let (rows, cols, stride) = (desc.rows(), desc.cols(), desc.stride());

    let slab_len = kw * filter_in * filter_out;
    let mut grad = vec![T::zero(); kh * slab_len];
    if slab_len == 0 {
        return grad;
    }

    grad.par_chunks_mut(slab_len)
        .enumerate()
        .for_each(|(ky, slab)| {
            let mut acc = vec![T::Acc::zero(); slab_len];
            for b in 0..batch {
                for oy in 0..out_h {
                    let Some(iy) = ConvDescriptor::source_index(oy, ky, stride, rows.pad_before, in_h)
                    else {
                        continue;
                    };
                    for ox in 0..out_w {
                        for kx in 0..kw {
                            let Some(ix) =
                                ConvDescriptor::source_index(ox, kx, stride, cols.pad_before, in_w)
                            else {
                                continue;
                            };
                            for g in 0..groups {
                                for i in 0..in_per_group {
                                    let ic = g * in_per_group + i;
                                    let x = input[[b, iy, ix, ic]].widen();
                                    let base = (kx * filter_in + ic) * filter_out;
                                    for o in 0..out_per_group {
                                        acc[base + o] = acc[base + o]
                                            + x * output_grad[[b, oy, ox, g * out_per_group + o]].widen();
                                    }
                                }
                            }
                        }
                    }
                }
            }
            for (dst, a) in slab.iter_mut().zip(&acc) {
                *dst = T::narrow(*a);
            }
        });

    grad
}
