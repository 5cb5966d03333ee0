//! Partially-known shapes for shape inference ahead of buffer allocation.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::ops::{Index, Mul};

/// A single dimension that may not be bound yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Dim {
    Known(usize),
    Unknown,
}

impl Dim {
    pub fn value(&self) -> Option<usize> {
        match self {
            Dim::Known(v) => Some(*v),
            Dim::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Dim::Known(_))
    }
}

/// Product of two dimensions; unknown if either side is unknown or the
/// product overflows `usize`
impl Mul for Dim {
    type Output = Dim;

    fn mul(self, other: Dim) -> Dim {
        match (self, other) {
            (Dim::Known(a), Dim::Known(b)) => {
                a.checked_mul(b).map_or(Dim::Unknown, Dim::Known)
            }
            _ => Dim::Unknown,
        }
    }
}

impl From<usize> for Dim {
    fn from(value: usize) -> Self {
        Dim::Known(value)
    }
}

impl From<Option<usize>> for Dim {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Dim::Unknown, Dim::Known)
    }
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Known(v) => write!(f, "{v}"),
            Dim::Unknown => write!(f, "?"),
        }
    }
}

/// Shape whose rank, or any of its dimensions, may be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PartialShape {
    dims: Option<Vec<Dim>>,
}

impl PartialShape {
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims: Some(dims) }
    }

    /// Shape of unknown rank
    pub fn unknown() -> Self {
        Self { dims: None }
    }

    /// Shape of known rank with every dimension unknown
    pub fn unknown_dims(rank: usize) -> Self {
        Self::new(vec![Dim::Unknown; rank])
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Self::new(dims.iter().copied().map(Dim::Known).collect())
    }

    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(Vec::len)
    }

    pub fn dims(&self) -> Option<&[Dim]> {
        self.dims.as_deref()
    }

    /// Dimension `axis`, or `Dim::Unknown` when the rank is unknown or too small
    pub fn dim(&self, axis: usize) -> Dim {
        self.dims
            .as_ref()
            .and_then(|d| d.get(axis).copied())
            .unwrap_or(Dim::Unknown)
    }

    pub fn is_fully_known(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|d| d.iter().all(Dim::is_known))
    }

    /// Concrete dimensions if every dimension is known
    pub fn to_known(&self) -> Option<Vec<usize>> {
        self.dims
            .as_ref()?
            .iter()
            .map(Dim::value)
            .collect::<Option<Vec<_>>>()
    }

    /// `[Option<usize>]` view, `None` for unknown dimensions
    pub fn as_options(&self) -> Option<Vec<Option<usize>>> {
        self.dims
            .as_ref()
            .map(|d| d.iter().map(Dim::value).collect())
    }
}

impl From<[usize; 4]> for PartialShape {
    fn from(dims: [usize; 4]) -> Self {
        Self::from_slice(&dims)
    }
}

impl From<&[usize]> for PartialShape {
    fn from(dims: &[usize]) -> Self {
        Self::from_slice(dims)
    }
}

impl From<Vec<Option<usize>>> for PartialShape {
    fn from(dims: Vec<Option<usize>>) -> Self {
        Self::new(dims.into_iter().map(Dim::from).collect())
    }
}

impl Index<usize> for PartialShape {
    type Output = Dim;

    fn index(&self, index: usize) -> &Self::Output {
        static UNKNOWN: Dim = Dim::Unknown;
        self.dims
            .as_ref()
            .and_then(|d| d.get(index))
            .unwrap_or(&UNKNOWN)
    }
}

impl std::fmt::Display for PartialShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(dims) = &self.dims else {
            return write!(f, "<unknown>");
        };
        write!(f, "[")?;
        for (i, dim) in dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        write!(f, "]")
    }
}
