//! Error types for the etcd storage provisioner
//!
//! Provides structured error types for storage-class creation, claim
//! provisioning, the resource store adapters and configuration loading.

use crate::domain::ports::ClaimPhase;
use std::time::Duration;
use thiserror::Error;

/// Unified error type for the provisioner
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Kubernetes Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Resource not found: {kind}/{name}")]
    ResourceNotFound { kind: String, name: String },

    #[error("Resource already exists: {kind}/{name}")]
    ResourceExists { kind: String, name: String },

    // =========================================================================
    // Provisioning Errors
    // =========================================================================
    #[error("Invalid provisioner '{0}': expected a non-empty provisioner with a non-empty base name")]
    InvalidProvisioner(String),

    #[error("Invalid claim request: {0}")]
    InvalidRequest(String),

    #[error("PVC {name} still exists after deleting the stale claim; refusing to recreate it again")]
    UnresolvableConflict { name: String },

    #[error("Fail to wait PVC ({name}) '({last_phase})/Bound': gave up after {attempts} checks")]
    BindTimeout {
        name: String,
        last_phase: ClaimPhase,
        attempts: u32,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Action the surrounding operator should take after a provisioning failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Requeue with exponential backoff
    RequeueWithBackoff,
    /// Requeue after specific duration
    RequeueAfter(Duration),
    /// Don't requeue, wait for changes
    NoRequeue,
}

impl Error {
    /// Determine what action to take for this error
    pub fn action(&self) -> ErrorAction {
        match self {
            // Transient errors - retry with backoff
            Error::Kube(_) | Error::Io(_) => ErrorAction::RequeueWithBackoff,

            // Another writer owns the name right now
            Error::UnresolvableConflict { .. } | Error::ResourceExists { .. } => {
                ErrorAction::RequeueAfter(Duration::from_secs(10))
            }

            // Slow backend - give the binder more time before starting over
            Error::BindTimeout { .. } => ErrorAction::RequeueAfter(Duration::from_secs(60)),

            // Configuration/validation errors - don't retry automatically
            Error::Configuration(_)
            | Error::InvalidProvisioner(_)
            | Error::InvalidRequest(_)
            | Error::YamlParse(_)
            | Error::JsonParse(_) => ErrorAction::NoRequeue,

            // All other errors - retry with backoff
            _ => ErrorAction::RequeueWithBackoff,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        !matches!(self.action(), ErrorAction::NoRequeue)
    }

    /// Check if the store reported that the object already exists
    pub fn is_already_exists(&self) -> bool {
        match self {
            Error::ResourceExists { .. } => true,
            Error::Kube(kube::Error::Api(e)) => e.code == 409,
            _ => false,
        }
    }

    /// Check if the store reported that the object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::ResourceNotFound { .. } => true,
            Error::Kube(kube::Error::Api(e)) => e.code == 404,
            _ => false,
        }
    }
}

/// Result type alias for the provisioner
pub type Result<T> = std::result::Result<T, Error>;
