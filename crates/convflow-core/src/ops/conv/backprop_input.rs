//! Gradient of the forward pass with respect to its input.
//!
//! The reference kernel scatters every output-gradient element back through
//! the filter. The parallel kernel gathers instead, so each task writes only
//! its own input row. Input positions no window touches stay exactly zero.

use super::descriptor::{ChannelGroups, ConvDescriptor};
use crate::Element;
use ndarray::ArrayView4;
use num_traits::Zero;
use rayon::prelude::*;

pub(crate) fn backprop_input_reference<T: Element>(
    desc: &ConvDescriptor,
    filter: ArrayView4<'_, T>,
    output_grad: ArrayView4<'_, T>,
) -> Vec<T> {
    let [batch, in_h, in_w, in_c] = desc.input_shape();
    let [kh, kw, _, _] = desc.filter_shape();
    let [_, out_h, out_w, _] = desc.output_shape();
    let ChannelGroups {
        groups,
        in_per_group,
        out_per_group,
    } = desc.groups();
    let (rows, cols, stride) = (desc.rows(), desc.cols(), desc.stride());

    let mut grad = vec![T::Acc::zero(); batch * in_h * in_w * in_c];
    for b in 0..batch {
        for oy in 0..out_h {
            for ox in 0..out_w {
                for g in 0..groups {
                    for o in 0..out_per_group {
                        let dy = output_grad[[b, oy, ox, g * out_per_group + o]].widen();
                        for ky in 0..kh {
                            let Some(iy) =
                                ConvDescriptor::source_index(oy, ky, stride, rows.pad_before, in_h)
                            else {
                                continue;
                            };
                            for kx in 0..kw {
                                let Some(ix) = ConvDescriptor::source_index(
                                    ox,
                                    kx,
                                    stride,
                                    cols.pad_before,
                                    in_w,
                                ) else {
                                    continue;
                                };
                                let base = ((b * in_h + iy) * in_w + ix) * in_c;
                                for i in 0..in_per_group {
                                    let ic = g * in_per_group + i;
                                    grad[base + ic] = grad[base + ic] + dy * filter[[ky, kx, ic, o]].widen();
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

/// Gather formulation: each rayon task owns one `(batch, in_row)` slice of
/// the input gradient.
pub(crate) fn backprop_input_parallel<T: Element>(
    desc: &ConvDescriptor,
    filter: ArrayView4<'_, T>,
    output_grad: ArrayView4<'_, T>,
) -> Vec<T> {
    let [batch, in_h, in_w, in_c] = desc.input_shape();
    let [kh, kw, _, _] = desc.filter_shape();
    let [_, out_h, out_w, _] = desc.output_shape();
    let ChannelGroups {
        groups,
        in_per_group,
        out_per_group,
    } = desc.groups();
    let (rows, cols, stride) = (desc.rows(), desc.cols(), desc.stride());

    let row_len = in_w * in_c;
    let mut grad = vec![T::zero(); batch * in_h * row_len];
    if row_len == 0 {
        return grad;
    }

    grad.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, grad_row)| {
            let (b, iy) = (row / in_h, row % in_h);
            let mut acc = vec![T::Acc::zero(); in_c];
            for ix in 0..in_w {
                acc.iter_mut().for_each(|a| *a = T::Acc::zero());
                for ky in 0..kh {
                    let Some(oy) = ConvDescriptor::target_index(iy, ky, stride, rows.pad_before, out_h)
                    else {
                        continue;
                    };
                    for kx in 0..kw {
                        let Some(ox) =
                            ConvDescriptor::target_index(ix, kx, stride, cols.pad_before, out_w)
                        else {
                            continue;
                        };
                        for g in 0..groups {
                            for i in 0..in_per_group {
                                let ic = g * in_per_group + i;
                                let mut sum = T::Acc::zero();
                                for o in 0..out_per_group {
                                    sum = sum
                                        + output_grad[[b, oy, ox, g * out_per_group + o]].widen()
                                            * filter[[ky, kx, ic, o]].widen();
                                }
                                acc[ic] = acc[ic] + sum;
                            }
                        }
                    }
                }
                for (dst, a) in grad_row[ix * in_c..(ix + 1) * in_c].iter_mut().zip(&acc) {
                    *dst = T::narrow(*a);
                }
            }
        });

    grad
}
