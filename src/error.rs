//! Error types for configuration and scenario loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading or validating a config or scenario file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("label opacity must be within [0, 1], got {value}")]
    InvalidOpacity { value: f64 },

    #[error("view size must be positive, got {width}x{height}")]
    InvalidViewSize { width: f64, height: f64 },
}

/// Errors while replaying a scenario against a scene
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("label `{name}` is declared twice")]
    DuplicateLabel { name: String },

    #[error("step {step} refers to unknown label `{name}`")]
    UnknownLabel { step: usize, name: String },
}
