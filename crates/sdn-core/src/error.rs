//! Shared error type.
//!
//! Sub-crates define their own error enums (`SpatialError`, `ControlError`,
//! …) and wrap `SdnError` where a core failure can surface through them.

use thiserror::Error;

/// Errors produced by `sdn-core`.
#[derive(Debug, Error)]
pub enum SdnError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `sdn-core`.
pub type SdnResult<T> = Result<T, SdnError>;
