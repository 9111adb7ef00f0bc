//! Package and manifest error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageError {
    #[error("package not found: {package}")]
    NotFound { package: String },

    #[error("missing manifest for {package}")]
    MissingManifest { package: String },

    #[error("invalid manifest for {package}: {message}")]
    InvalidManifest { package: String, message: String },

    #[error("circular dependency detected involving {package}")]
    DependencyCycle { package: String },

    #[error("source not available for {package}")]
    SourceUnavailable { package: String },
}
