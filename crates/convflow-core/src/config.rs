//! Execution configuration for the convolution engine.
//!
//! Configuration is a plain value handed to [`crate::ConvEngine`]; nothing is
//! stored globally. [`ExecutionConfig::from_env`] reads overrides from the
//! process environment once, at the caller's request.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::{ConvError, Result};
use std::str::FromStr;

/// Environment variable selecting the backend (`auto`, `reference`, `parallel`)
pub const BACKEND_ENV: &str = "CONVFLOW_BACKEND";
/// Environment variable overriding [`ExecutionConfig::parallel_threshold`]
pub const PARALLEL_THRESHOLD_ENV: &str = "CONVFLOW_PARALLEL_THRESHOLD";

/// Multiply-accumulate count from which `Auto` switches to the parallel backend
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 16;

/// Which backend the engine should dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BackendPreference {
    /// Pick by problem size
    #[default]
    Auto,
    /// Always use the sequential reference kernels
    Reference,
    /// Always use the row-partitioned rayon kernels
    Parallel,
}

impl BackendPreference {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Reference => "reference",
            Self::Parallel => "parallel",
        }
    }
}

impl FromStr for BackendPreference {
    type Err = ConvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "reference" | "ref" | "sequential" => Ok(Self::Reference),
            "parallel" => Ok(Self::Parallel),
            other => Err(ConvError::invalid_argument(
                "BackendPreference::from_str",
                &format!("unknown backend '{other}' (expected auto, reference or parallel)"),
            )),
        }
    }
}

impl std::fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for backend selection
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ExecutionConfig {
    /// Backend preference
    pub backend: BackendPreference,
    /// Minimum multiply-accumulate count for `Auto` to choose the parallel backend
    pub parallel_threshold: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ExecutionConfig {
    /// Always run the sequential reference kernels
    pub fn reference() -> Self {
        Self {
            backend: BackendPreference::Reference,
            ..Self::default()
        }
    }

    /// Always run the parallel kernels, whatever the problem size
    pub fn parallel() -> Self {
        Self {
            backend: BackendPreference::Parallel,
            parallel_threshold: 0,
        }
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Defaults overridden by `CONVFLOW_BACKEND` and `CONVFLOW_PARALLEL_THRESHOLD`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ExecutionConfig::from_env`] with an explicit variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(BACKEND_ENV) {
            config.backend = value.parse()?;
        }

        if let Some(value) = lookup(PARALLEL_THRESHOLD_ENV) {
            config.parallel_threshold = value.trim().parse().map_err(|_| {
                ConvError::invalid_argument(
                    "ExecutionConfig::from_env",
                    &format!("{PARALLEL_THRESHOLD_ENV} must be a non-negative integer, got '{value}'"),
                )
            })?;
        }

        tracing::debug!(
            backend = %config.backend,
            parallel_threshold = config.parallel_threshold,
            "loaded execution config"
        );

        Ok(config)
    }
}
