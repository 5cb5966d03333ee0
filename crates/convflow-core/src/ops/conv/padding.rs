//! Output extent and border padding for one spatial axis.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::shape::Dim;
use crate::{ConvError, Result};
use std::str::FromStr;

/// Border padding discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Padding {
    /// No implicit padding; the output shrinks by `filter - 1` before striding
    Valid,
    /// Zero padding so that the output extent is `ceil(input / stride)`
    Same,
}

impl Padding {
    pub fn name(&self) -> &'static str {
        match self {
            Padding::Valid => "VALID",
            Padding::Same => "SAME",
        }
    }
}

impl FromStr for Padding {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("valid") {
            Ok(Padding::Valid)
        } else if s.eq_ignore_ascii_case("same") {
            Ok(Padding::Same)
        } else {
            Err(ConvError::invalid_argument(
                "Padding::from_str",
                &format!("Unknown padding mode: {s}"),
            ))
        }
    }
}

impl std::fmt::Display for Padding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Output extent and padding for a single spatial axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisPadding {
    pub out_extent: usize,
    pub pad_before: usize,
    pub pad_after: usize,
}

/// Derive the output extent and the before/after padding of one axis.
///
/// SAME splits an odd total with the extra element after the input
/// (`pad_before = total / 2`). An input shorter than the filter yields an
/// empty VALID output.
///
/// # Panics
///
/// Panics if `stride` is zero.
pub fn compute_padding(
    in_extent: usize,
    filter_extent: usize,
    stride: usize,
    padding: Padding,
) -> AxisPadding {
    assert!(stride > 0, "stride must be positive");
    match padding {
        Padding::Valid => AxisPadding {
            out_extent: (in_extent + 1).saturating_sub(filter_extent).div_ceil(stride),
            pad_before: 0,
            pad_after: 0,
        },
        Padding::Same => {
            let out_extent = in_extent.div_ceil(stride);
            let needed = out_extent.saturating_sub(1) * stride + filter_extent;
            let total = needed.saturating_sub(in_extent);
            let pad_before = total / 2;
            AxisPadding {
                out_extent,
                pad_before,
                pad_after: total - pad_before,
            }
        }
    }
}

/// Output extent over possibly-unknown extents.
///
/// SAME depends only on the input extent, so a known input with an unknown
/// filter still yields a known output.
///
/// # Panics
///
/// Panics if `stride` is zero.
pub fn output_extent(in_extent: Dim, filter_extent: Dim, stride: usize, padding: Padding) -> Dim {
    assert!(stride > 0, "stride must be positive");
    match (padding, in_extent, filter_extent) {
        (Padding::Same, Dim::Known(i), _) => Dim::Known(i.div_ceil(stride)),
        (Padding::Valid, Dim::Known(i), Dim::Known(f)) => {
            Dim::Known(compute_padding(i, f, stride, padding).out_extent)
        }
        _ => Dim::Unknown,
    }
}
