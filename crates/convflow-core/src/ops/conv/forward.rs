//! Forward convolution kernels.
//!
//! `output[b, oy, ox, oc] = Σ input[b, oy*s + ky - pt, ox*s + kx - pl, ic] * filter[ky, kx, ic, o]`
//! with the channel mapping of [`ChannelGroups`]. Taps landing in the zero
//! padding are skipped.

use super::descriptor::{ChannelGroups, ConvDescriptor};
use crate::Element;
use ndarray::ArrayView4;
use num_traits::Zero;
use rayon::prelude::*;

pub(crate) fn forward_reference<T: Element>(
    desc: &ConvDescriptor,
    input: ArrayView4<'_, T>,
    filter: ArrayView4<'_, T>,
) -> Vec<T> {
    let [batch, in_h, in_w, _] = desc.input_shape();
    let [kh, kw, _, _] = desc.filter_shape();
    let [_, out_h, out_w, out_c] = desc.output_shape();
    let ChannelGroups {
        groups,
        in_per_group,
        out_per_group,
    } = desc.groups();
    let (rows, cols, stride) = (desc.rows(), desc.cols(), desc.stride());

    let mut output = Vec::with_capacity(batch * out_h * out_w * out_c);
    for b in 0..batch {
        for oy in 0..out_h {
            for ox in 0..out_w {
                for g in 0..groups {
                    for o in 0..out_per_group {
                        let mut acc = T::Acc::zero();
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
                                for i in 0..in_per_group {
                                    let ic = g * in_per_group + i;
                                    acc = acc + input[[b, iy, ix, ic]].widen() * filter[[ky, kx, ic, o]].widen();
                                }
                            }
                        }
                        output.push(T::narrow(acc));
                    }
                }
            }
        }
    }
    output
}

/// Row-partitioned forward pass: each rayon task owns one `(batch, out_row)`
/// slice of the output.
pub(crate) fn forward_parallel<T: Element>(
    desc: &ConvDescriptor,
    input: ArrayView4<'_, T>,
    filter: ArrayView4<'_, T>,
) -> Vec<T> {
    let [_, in_h, in_w, _] = desc.input_shape();
    let [kh, kw, _, _] = desc.filter_shape();
    let [batch, out_h, out_w, out_c] = desc.output_shape();
    let ChannelGroups {
        groups,
        in_per_group,
        out_per_group,
    } = desc.groups();
    let (rows, cols, stride) = (desc.rows(), desc.cols(), desc.stride());

    let row_len = out_w * out_c;
    let mut output = vec![T::zero(); batch * out_h * row_len];
    if row_len == 0 {
        return output;
    }

    output
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, out_row)| {
            let (b, oy) = (row / out_h, row % out_h);
            let mut acc = vec![T::Acc::zero(); out_c];
            for ox in 0..out_w {
                acc.iter_mut().for_each(|a| *a = T::Acc::zero());
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
                                let group_acc = &mut acc[g * out_per_group..(g + 1) * out_per_group];
                                for (o, a) in group_acc.iter_mut().enumerate() {
                                    *a = *a + x * filter[[ky, kx, ic, o]].widen();
                                }
                            }
                        }
                    }
                }
                for (dst, a) in out_row[ox * out_c..(ox + 1) * out_c].iter_mut().zip(&acc) {
                    *dst = T::narrow(*a);
                }
            }
        });

    output
}
