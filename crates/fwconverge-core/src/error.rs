// ── Core error types ──
//
// Everything the engine can fail with. Transport problems are wrapped,
// not exposed raw, and every variant projects into a flat list of
// discrete `ErrorEntry` values: one mutation can be rejected for several
// reasons at once and all of them must reach the operator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One discrete, user-visible error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub code: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation (before any remote call) ──────────────────────────
    #[error("Invalid reference at {field}: {reason}")]
    InvalidReference { field: String, reason: String },

    #[error("Rule failed validation: {}", join(.entries))]
    Validation { entries: Vec<ErrorEntry> },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Remote call failed: {0}")]
    RemoteTransport(#[from] fwconverge_api::Error),

    #[error("{operation} was rejected: {}", join(.errors))]
    RemoteSemantic {
        operation: String,
        errors: Vec<ErrorEntry>,
    },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Convergence cancelled before {operation}")]
    Cancelled { operation: String },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },
}

fn join(entries: &[ErrorEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    /// Project into discrete error entries.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        match self {
            Self::InvalidReference { field, reason } => {
                vec![ErrorEntry::new("INVALID_REFERENCE", format!("{field}: {reason}"))]
            }
            Self::Validation { entries } => entries.clone(),
            Self::RemoteTransport(err) => {
                let code = if err.is_auth() {
                    "AUTHENTICATION"
                } else {
                    "TRANSPORT"
                };
                err.messages()
                    .into_iter()
                    .map(|message| ErrorEntry::new(code, message))
                    .collect()
            }
            Self::RemoteSemantic { errors, .. } => errors.clone(),
            Self::Cancelled { .. } => vec![ErrorEntry::new("CANCELLED", self.to_string())],
            Self::NotFound { .. } => vec![ErrorEntry::new("NOT_FOUND", self.to_string())],
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidReference { .. } | Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_errors_keep_every_entry() {
        let err = CoreError::RemoteSemantic {
            operation: "addRule".into(),
            errors: vec![
                ErrorEntry::new("E1", "unknown site"),
                ErrorEntry::new("E2", "bad port"),
            ],
        };
        assert_eq!(err.entries().len(), 2);
        assert_eq!(
            err.to_string(),
            "addRule was rejected: [E1] unknown site; [E2] bad port"
        );
    }

    #[test]
    fn graphql_messages_become_separate_entries() {
        let err = CoreError::from(fwconverge_api::Error::GraphQl {
            messages: vec!["a".into(), "b".into()],
        });
        let entries = err.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.code == "TRANSPORT"));
    }
}
