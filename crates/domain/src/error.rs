//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`StructuraError`] via `#[from]`. Adapters box their storage errors into
//! [`StructuraError::Storage`] so the domain never names a driver type.

/// Top-level error returned by ports and services.
#[derive(Debug, thiserror::Error)]
pub enum StructuraError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("platform error")]
    Platform(#[from] PlatformError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A structure was submitted for persistence without an identifier.
    #[error("location identifier is missing")]
    MissingIdentifier,

    /// A version code could not be read as an unsigned integer.
    #[error("invalid version code `{0}`")]
    InvalidVersion(String),

    /// A structured setting value is not a valid setting configuration.
    #[error("setting `{identifier}` has a malformed value")]
    MalformedSetting { identifier: String },
}

/// A lookup that was expected to match exactly one record matched none.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures of the host platform the client runs on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The installed version code of the application could not be determined.
    #[error("version code unavailable for package `{package}`")]
    VersionUnavailable { package: String },
}
