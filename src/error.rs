//! Error types.
//!
//! Only value construction and JSON conversion can fail; the merge engine
//! and the predicates are total and never return an error.

/// Errors raised when building or converting values.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// Regex pattern failed to compile.
    #[error("invalid regex pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Regex flag string contained a letter outside the supported set.
    #[error("unknown regex flag `{0}` (supported: g, i, m)")]
    UnknownFlag(char),

    /// Value kind has no JSON representation.
    #[error("`{0}` values have no JSON representation")]
    NotRepresentable(&'static str),
}
