//! Error type definitions for the stream console
//!
//! The playlist core never retries: storage failures surface to callers as
//! `DataUnavailable` and provider fetch failures as `Source` variants, so the
//! web layer can map each to an appropriate status code.

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Storage/access-layer failure; propagated without retry
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] sqlx::Error),

    /// Provider fetch/parse errors
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Resource not found
    #[error("not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Request validation errors
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Provider source handling errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP transport failures against the provider
    #[error("request failed: {url} - {message}")]
    RequestFailed { url: String, message: String },

    /// Provider answered with a non-success status
    #[error("HTTP error: {status} from {url}")]
    Http { status: u16, url: String },

    /// Payload could not be parsed as the expected format
    #[error("parse error: {source_kind} - {message}")]
    ParseError {
        source_kind: String,
        message: String,
    },

    /// Provider row is not usable as configured
    #[error("invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },
}

impl AppError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    pub fn request_failed<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::RequestFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn parse_error<S: Into<String>, M: Into<String>>(source_kind: S, message: M) -> Self {
        Self::ParseError {
            source_kind: source_kind.into(),
            message: message.into(),
        }
    }

    pub fn invalid_config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
