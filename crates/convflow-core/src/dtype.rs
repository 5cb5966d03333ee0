#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use num_traits::Float;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DType {
    Float32,
    Float64,
}

impl DType {
    pub fn size(&self) -> usize {
        match self {
            DType::Float32 => 4,
            DType::Float64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Element types the convolution kernels operate on.
///
/// Every product is widened into [`Element::Acc`] before it is summed, so the
/// accumulator is never narrower than the element itself.
pub trait Element: Float + Default + Debug + Send + Sync + 'static {
    /// Accumulator used for the inner sums of every kernel.
    type Acc: Float + Send + Sync;

    const DTYPE: DType;

    fn widen(self) -> Self::Acc;

    fn narrow(acc: Self::Acc) -> Self;
}

impl Element for f32 {
    type Acc = f64;

    const DTYPE: DType = DType::Float32;

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn narrow(acc: f64) -> f32 {
        acc as f32
    }
}

impl Element for f64 {
    type Acc = f64;

    const DTYPE: DType = DType::Float64;

    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn narrow(acc: f64) -> f64 {
        acc
    }
}

/// Get DType from an element type
pub fn dtype_of<T: Element>() -> DType {
    T::DTYPE
}
