use thiserror::Error;

/// Errors raised by shape validation and the convolution entry points.
///
/// Every variant is a deterministic function of operand shapes, strides and
/// padding; none depends on tensor values and none is retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvError {
    #[error("Invalid rank in operation '{operation}': {operand} must be 4-dimensional, got rank {rank}")]
    Rank {
        operation: String,
        operand: &'static str,
        rank: usize,
    },

    #[error("Invalid strides in operation '{operation}': {reason} (strides: {strides:?})")]
    Stride {
        operation: String,
        reason: String,
        strides: Vec<usize>,
    },

    #[error("Depth mismatch in operation '{operation}': input depth {input_depth} does not match filter in_channels {filter_depth}")]
    DepthMismatch {
        operation: String,
        input_depth: usize,
        filter_depth: usize,
    },

    #[error("Invalid filter in operation '{operation}': filter must not be larger than the input in the {axis} dimension (filter {filter_extent}, input {input_extent})")]
    FilterTooLarge {
        operation: String,
        axis: &'static str,
        filter_extent: usize,
        input_extent: usize,
    },

    #[error("Invalid strides in operation '{operation}': stride must be less than or equal to filter size in the {axis} dimension (stride {stride}, filter {filter_extent})")]
    StrideTooLarge {
        operation: String,
        axis: &'static str,
        stride: usize,
        filter_extent: usize,
    },

    #[error("Shape mismatch in operation '{operation}': expected {expected}, got {got}")]
    ShapeMismatch {
        operation: String,
        expected: String,
        got: String,
    },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },
}

/// Coarse classification of a [`ConvError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvErrorKind {
    Rank,
    Stride,
    DepthMismatch,
    FilterTooLarge,
    StrideTooLarge,
    ShapeMismatch,
    InvalidArgument,
}

impl ConvErrorKind {
    /// Get a user-friendly name for this error category
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rank => "Rank Error",
            Self::Stride => "Stride Error",
            Self::DepthMismatch => "Depth Mismatch",
            Self::FilterTooLarge => "Filter Too Large",
            Self::StrideTooLarge => "Stride Too Large",
            Self::ShapeMismatch => "Shape Mismatch",
            Self::InvalidArgument => "Invalid Argument",
        }
    }

    /// Get a description of how to fix this category of error
    pub fn fix_suggestion(&self) -> &'static str {
        match self {
            Self::Rank => "Pass NHWC input and HWIO filter tensors (rank 4)",
            Self::Stride => "Use strides of the form [1, s, s, 1] with s > 0",
            Self::DepthMismatch => "Filter in_channels must equal the input channel count",
            Self::FilterTooLarge => "Filter height/width must not exceed input height/width",
            Self::StrideTooLarge => "Stride must not exceed the filter height or width",
            Self::ShapeMismatch => "Check buffer lengths and gradient shapes against the operation",
            Self::InvalidArgument => "Review the operation documentation for accepted values",
        }
    }
}

impl std::fmt::Display for ConvErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ConvError {
    /// Category of this error
    pub fn kind(&self) -> ConvErrorKind {
        match self {
            Self::Rank { .. } => ConvErrorKind::Rank,
            Self::Stride { .. } => ConvErrorKind::Stride,
            Self::DepthMismatch { .. } => ConvErrorKind::DepthMismatch,
            Self::FilterTooLarge { .. } => ConvErrorKind::FilterTooLarge,
            Self::StrideTooLarge { .. } => ConvErrorKind::StrideTooLarge,
            Self::ShapeMismatch { .. } => ConvErrorKind::ShapeMismatch,
            Self::InvalidArgument { .. } => ConvErrorKind::InvalidArgument,
        }
    }

    /// Name of the operation that raised the error
    pub fn operation(&self) -> &str {
        match self {
            Self::Rank { operation, .. }
            | Self::Stride { operation, .. }
            | Self::DepthMismatch { operation, .. }
            | Self::FilterTooLarge { operation, .. }
            | Self::StrideTooLarge { operation, .. }
            | Self::ShapeMismatch { operation, .. }
            | Self::InvalidArgument { operation, .. } => operation,
        }
    }

    pub fn rank(operation: &str, operand: &'static str, rank: usize) -> Self {
        Self::Rank {
            operation: operation.to_string(),
            operand,
            rank,
        }
    }

    pub fn stride(operation: &str, reason: &str, strides: &[usize]) -> Self {
        Self::Stride {
            operation: operation.to_string(),
            reason: reason.to_string(),
            strides: strides.to_vec(),
        }
    }

    pub fn depth_mismatch(operation: &str, input_depth: usize, filter_depth: usize) -> Self {
        Self::DepthMismatch {
            operation: operation.to_string(),
            input_depth,
            filter_depth,
        }
    }

    pub fn filter_too_large(
        operation: &str,
        axis: &'static str,
        filter_extent: usize,
        input_extent: usize,
    ) -> Self {
        Self::FilterTooLarge {
            operation: operation.to_string(),
            axis,
            filter_extent,
            input_extent,
        }
    }

    pub fn stride_too_large(
        operation: &str,
        axis: &'static str,
        stride: usize,
        filter_extent: usize,
    ) -> Self {
        Self::StrideTooLarge {
            operation: operation.to_string(),
            axis,
            stride,
            filter_extent,
        }
    }

    /// Create a shape mismatch error with context
    pub fn shape_mismatch(operation: &str, expected: &str, got: &str) -> Self {
        Self::ShapeMismatch {
            operation: operation.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Create an invalid argument error with operation context
    pub fn invalid_argument(operation: &str, reason: &str) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvError>;
