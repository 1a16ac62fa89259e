//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use fwconverge_config::ConfigError;
use fwconverge_core::{ConvergenceFailure, CoreError, ErrorEntry};
use miette::Diagnostic;
use thiserror::Error;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the policy API")]
    #[diagnostic(
        code(fwconverge::connection_failed),
        help("Check the endpoint URL and network access, or raise --timeout.")
    )]
    ConnectionFailed {
        #[source]
        source: fwconverge_api::Error,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed for profile '{profile}'")]
    #[diagnostic(
        code(fwconverge::auth_failed),
        help("Verify the API key. Set FWCONVERGE_API_KEY or store one in the keyring.")
    )]
    AuthFailed { profile: String },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(fwconverge::no_credentials),
        help(
            "Pass --api-key, set FWCONVERGE_API_KEY, name a variable with api_key_env\n\
             in the profile, or store a key in the OS keyring."
        )
    )]
    NoCredentials { profile: String },

    // ── Rules ────────────────────────────────────────────────────────
    #[error("{family} rule '{name}' is not tracked in the state file")]
    #[diagnostic(
        code(fwconverge::not_tracked),
        help("Run: fwconverge apply --rules <FILE> to create and track it")
    )]
    NotTracked { family: String, name: String },

    #[error("{entity} '{identifier}' not found")]
    #[diagnostic(code(fwconverge::not_found))]
    NotFound { entity: String, identifier: String },

    #[error("Rule is invalid:\n{}", bullets(.entries))]
    #[diagnostic(code(fwconverge::invalid_rule))]
    InvalidRule { entries: Vec<ErrorEntry> },

    #[error("{operation} was rejected:\n{}", bullets(.entries))]
    #[diagnostic(code(fwconverge::rejected))]
    Rejected {
        operation: String,
        entries: Vec<ErrorEntry>,
    },

    #[error("{failed} of {total} rules failed to converge")]
    #[diagnostic(
        code(fwconverge::apply_incomplete),
        help("Rules that reached the remote are tracked; re-run apply to retry the rest.")
    )]
    Incomplete { failed: usize, total: usize },

    #[error("Interrupted before {operation}")]
    #[diagnostic(code(fwconverge::cancelled))]
    Cancelled { operation: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fwconverge::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(fwconverge::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Remote request failed")]
    #[diagnostic(code(fwconverge::api))]
    Api {
        #[source]
        source: fwconverge_api::Error,
    },
}

fn bullets(entries: &[ErrorEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("  - {entry}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotTracked { .. } | Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Cancelled { .. } => exit_code::CANCELLED,
            Self::InvalidRule { .. } | Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Incomplete { .. } | Self::Io(_) | Self::Api { .. } => exit_code::GENERAL,
        }
    }

    pub fn from_core(err: CoreError, profile: &str) -> Self {
        match err {
            CoreError::InvalidReference { .. } | CoreError::Validation { .. } => {
                Self::InvalidRule {
                    entries: err.entries(),
                }
            }
            CoreError::RemoteTransport(source) if source.is_auth() => Self::AuthFailed {
                profile: profile.into(),
            },
            CoreError::RemoteTransport(source) if source.is_transient() => {
                Self::ConnectionFailed { source }
            }
            CoreError::RemoteTransport(source) => Self::Api { source },
            CoreError::RemoteSemantic { operation, errors } => Self::Rejected {
                operation,
                entries: errors,
            },
            CoreError::Cancelled { operation } => Self::Cancelled { operation },
            CoreError::NotFound { entity, identifier } => Self::NotFound { entity, identifier },
        }
    }

    pub fn from_failure(failure: ConvergenceFailure, profile: &str) -> Self {
        Self::from_core(failure.error, profile)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
