//! Error types for request building and dispatch.
//!
//! # Design
//! `ValidationError` covers everything that stops a request before it
//! reaches the network. Its `Display` is the prompt the user sees, and
//! `field()` says which part of the form the prompt belongs to.
//! `DispatchError` adds the failures that can only happen once the request
//! has been sent.

use thiserror::Error;

/// Boxed error returned by `Transport` implementations.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// The part of the form a validation prompt is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Endpoint,
    Data,
    Response,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Endpoint => "endpoint",
            FormField::Data => "data",
            FormField::Response => "response",
        }
    }
}

/// Input rejected before any network activity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter an API endpoint.")]
    EmptyPath,

    #[error("Please enter data here.")]
    EmptyData,

    /// `detail` is the JSON parser's message; it is logged, not shown.
    #[error("There is an error with your data.")]
    MalformedData { detail: String },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::EmptyPath => FormField::Endpoint,
            ValidationError::EmptyData => FormField::Data,
            ValidationError::MalformedData { .. } => FormField::Response,
        }
    }
}

/// Errors returned by `Dispatcher::dispatch`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request could not be sent or its response could not be read.
    #[error("could not reach the backend: {0}")]
    Transport(#[source] TransportError),

    /// The backend answered with something that is not JSON.
    #[error("response with status {status} is not valid JSON: {source}")]
    InvalidResponse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_target_their_fields() {
        assert_eq!(ValidationError::EmptyPath.field(), FormField::Endpoint);
        assert_eq!(ValidationError::EmptyData.field(), FormField::Data);
        let malformed = ValidationError::MalformedData {
            detail: "EOF".to_string(),
        };
        assert_eq!(malformed.field(), FormField::Response);
        assert_eq!(malformed.to_string(), "There is an error with your data.");
    }

    #[test]
    fn validation_converts_into_dispatch_error() {
        let err: DispatchError = ValidationError::EmptyPath.into();
        assert!(matches!(err, DispatchError::Validation(ValidationError::EmptyPath)));
        assert_eq!(err.to_string(), "Please enter an API endpoint.");
    }
}
