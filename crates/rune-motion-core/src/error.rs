//! Error types for building an animator.

use thiserror::Error;

/// Result type for rune-motion operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors surfaced while constructing an animator.
///
/// Geometry lookups and playback interruption never produce these; they are
/// recovered where they happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    /// The requested target did not resolve to an SVG element.
    #[error("animation target not found: {0}")]
    TargetNotFound(String),

    /// Markup could not be turned into an SVG tree.
    #[error("invalid SVG markup: {0}")]
    InvalidMarkup(String),

    /// A selector string could not be parsed.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}
