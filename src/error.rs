//! Pet-toy error types.
//!
//! Nothing in the interaction path treats these as fatal: callers log them and
//! fall back to "no saved data" or "save skipped".  They exist so the
//! persistence and config layers can say *why* an attempt failed.

use std::fmt;

/// Top-level error enum for the pet toy.
#[derive(Debug)]
pub enum PetError {
    /// The cloud-save backend is not initialised or refused the request.
    StoreUnavailable {
        /// Human-readable name of the backend (for logging).
        backend: String,
    },

    /// Filesystem failure inside a store backend.
    StoreIo {
        /// What the backend was doing when it failed.
        context: String,
        source: std::io::Error,
    },

    /// Fewer bytes came back than the store reported for the blob.
    ReadMismatch { expected: usize, got: usize },

    /// The stored blob could not be decoded into a save record.
    MalformedSave { reason: String },

    /// The save record could not be encoded.
    Encode { reason: String },

    /// The config file is not valid TOML for [`crate::config::PetConfig`].
    ConfigParse { reason: String },

    /// A configuration value is outside its usable range.
    InvalidConfig {
        /// Name of the config key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for PetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetError::StoreUnavailable { backend } => {
                write!(f, "cloud store '{}' is not available", backend)
            }
            PetError::StoreIo { context, source } => write!(f, "{}: {}", context, source),
            PetError::ReadMismatch { expected, got } => write!(
                f,
                "incomplete read from cloud store: expected {} bytes, got {}",
                expected, got
            ),
            PetError::MalformedSave { reason } => write!(f, "malformed save record: {}", reason),
            PetError::Encode { reason } => write!(f, "failed to encode save record: {}", reason),
            PetError::ConfigParse { reason } => write!(f, "failed to parse config: {}", reason),
            PetError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config '{}' = {} is outside accepted range {}",
                name, value, expected
            ),
        }
    }
}

impl std::error::Error for PetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PetError::StoreIo { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias: a `Result` using `PetError` as the error type.
pub type PetResult<T> = Result<T, PetError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> PetResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PetError::InvalidConfig {
            name,
            value,
            expected: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is negative or not finite.
pub fn validate_non_negative(name: &'static str, value: f32) -> PetResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PetError::InvalidConfig {
            name,
            value,
            expected: "[0.0, ∞)",
        })
    }
}
