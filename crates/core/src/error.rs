//! Error types for the strata domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Fatal conditions abort
//! a composition run and propagate to the caller; non-fatal findings go
//! through the [`crate::DiagnosticAcceptor`] instead and never appear here.

use thiserror::Error;

/// The top-level error type for composition operations.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A reference used a scheme with no registered handler.
    #[error("unknown reference scheme '{scheme}' in '{reference}'")]
    UnknownScheme { scheme: String, reference: String },

    /// A reference could not be interpreted by its scheme handler.
    #[error("malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    /// A required reference resolved to no loadable fragment.
    #[error("no loadable bindings found for required reference '{reference}'")]
    BindingsNotFound { reference: String },

    /// A category expression evaluated to something other than a string.
    #[error("category '{category}' evaluated to {actual}, expected a string")]
    CategoryTypeMismatch { category: String, actual: String },

    /// A categorization expression failed to parse.
    #[error("invalid expression for category '{category}': {detail}")]
    ExpressionParse { category: String, detail: String },

    /// A hierarchical data source could not be read or understood.
    #[error("hierarchical source '{source_id}' error: {reason}")]
    HieraSource { source_id: String, reason: String },

    /// A fragment file exists but could not be parsed.
    #[error("invalid fragment at {path}: {reason}")]
    InvalidFragment { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scheme_displays_scheme_and_reference() {
        let err = ComposeError::UnknownScheme {
            scheme: "ftp".into(),
            reference: "ftp:/mod/default".into(),
        };
        assert!(err.to_string().contains("ftp"));
        assert!(err.to_string().contains("ftp:/mod/default"));
    }

    #[test]
    fn hiera_source_display_names_the_source() {
        let err = ComposeError::HieraSource {
            source_id: "confdir-hiera:/hiera.toml".into(),
            reason: "cannot read marker".into(),
        };
        assert!(err.to_string().contains("confdir-hiera:/hiera.toml"));
        // Plain diagnostic payload, not an error chain.
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn type_mismatch_names_the_category() {
        let err = ComposeError::CategoryTypeMismatch {
            category: "osfamily".into(),
            actual: "number".into(),
        };
        assert!(err.to_string().contains("osfamily"));
        assert!(err.to_string().contains("number"));
    }
}
