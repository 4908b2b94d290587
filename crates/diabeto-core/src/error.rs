//! Error types for diabeto.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, input validation and form errors.

use std::fmt;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The unified error type for diabeto operations.
///
/// This error type covers all possible failure modes in the library,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, local I/O).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors, already mapped from provider codes.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (unexpected status codes or response bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid URL, path or identifier).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Form validation failed before any request was made.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl Error {
    /// Message suitable for showing to the user in an alert.
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(err) => err.user_message().to_string(),
            Error::Validation(errors) => errors.to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true if the error means the requested document or object
    /// does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Protocol(p) if p.status == 404)
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Local filesystem error.
    #[error("IO error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Authentication errors.
///
/// Identity providers report failures as string codes; they are mapped into
/// this closed set once, at the provider boundary, via [`AuthError::from_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No account exists for the identifier.
    #[error("user not found")]
    UserNotFound,

    /// The password does not match the account.
    #[error("wrong password")]
    WrongPassword,

    /// The provider rejected the email/password pair without saying which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email address is malformed.
    #[error("invalid email")]
    InvalidEmail,

    /// An account with this email already exists.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// The provider considers the password too weak.
    #[error("weak password")]
    WeakPassword,

    /// The provider is throttling attempts.
    #[error("too many requests")]
    TooManyRequests,

    /// The provider could not be reached.
    #[error("network request failed")]
    NetworkRequestFailed,

    /// An operation needs a signed-in principal and there is none.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The session token was rejected or has expired.
    #[error("session expired")]
    SessionExpired,

    /// Any other provider failure, with its raw message.
    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Map a provider error code to an [`AuthError`].
    ///
    /// Accepts both the SDK-style codes (`auth/user-not-found`) and the REST
    /// API codes (`EMAIL_NOT_FOUND`). REST codes may carry a trailing detail
    /// after `" : "`, which is ignored for classification.
    pub fn from_code(code: &str) -> Self {
        let key = code.split(" : ").next().unwrap_or(code).trim();
        match key {
            "auth/user-not-found" | "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthError::UserNotFound,
            "auth/wrong-password" | "INVALID_PASSWORD" => AuthError::WrongPassword,
            "auth/invalid-credential" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "auth/invalid-email" | "INVALID_EMAIL" => AuthError::InvalidEmail,
            "auth/email-already-in-use" | "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
            "auth/weak-password" | "WEAK_PASSWORD" => AuthError::WeakPassword,
            "auth/too-many-requests" | "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyRequests,
            "auth/network-request-failed" => AuthError::NetworkRequestFailed,
            "auth/user-token-expired" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN"
            | "INVALID_REFRESH_TOKEN" => AuthError::SessionExpired,
            _ => AuthError::Other(code.to_string()),
        }
    }

    /// A short, user-readable explanation of the failure.
    pub fn user_message(&self) -> &str {
        match self {
            AuthError::UserNotFound => "No account found with this email address.",
            AuthError::WrongPassword => "Incorrect password. Please try again.",
            AuthError::InvalidCredentials => "Incorrect email or password. Please try again.",
            AuthError::InvalidEmail => "Invalid email address.",
            AuthError::EmailAlreadyInUse => "An account with this email already exists.",
            AuthError::WeakPassword => {
                "Password is too weak. Please choose a stronger password."
            }
            AuthError::TooManyRequests => "Too many failed attempts. Please try again later.",
            AuthError::NetworkRequestFailed => "Network error. Please check your connection.",
            AuthError::NotAuthenticated => "User not authenticated",
            AuthError::SessionExpired => "Your session has expired. Please sign in again.",
            AuthError::Other(message) => message,
        }
    }
}

/// Protocol-level errors from service responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Service error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// A 404 with the given message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, Some("NOT_FOUND".to_string()), Some(message.into()))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
            || self.error.as_deref() == Some("UNAUTHENTICATED")
            || self.error.as_deref() == Some("PERMISSION_DENIED")
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid service URL.
    #[error("invalid service URL '{value}': {reason}")]
    ServiceUrl { value: String, reason: String },

    /// Invalid user id.
    #[error("invalid user id '{value}': {reason}")]
    UserId { value: String, reason: String },

    /// Invalid document or collection path.
    #[error("invalid document path '{value}': {reason}")]
    DocumentPath { value: String, reason: String },

    /// Invalid object path.
    #[error("invalid object path '{value}': {reason}")]
    ObjectPath { value: String, reason: String },

    /// A stored document is missing a field or has the wrong type.
    #[error("field '{field}': {reason}")]
    Field { field: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_sdk_codes() {
        assert_eq!(AuthError::from_code("auth/user-not-found"), AuthError::UserNotFound);
        assert_eq!(AuthError::from_code("auth/wrong-password"), AuthError::WrongPassword);
        assert_eq!(
            AuthError::from_code("auth/email-already-in-use"),
            AuthError::EmailAlreadyInUse
        );
        assert_eq!(
            AuthError::from_code("auth/network-request-failed"),
            AuthError::NetworkRequestFailed
        );
    }

    #[test]
    fn maps_rest_codes_with_detail() {
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailAlreadyInUse);
        assert_eq!(
            AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            AuthError::TooManyRequests
        );
    }

    #[test]
    fn unknown_code_keeps_raw_message() {
        let err = AuthError::from_code("OPERATION_NOT_ALLOWED");
        assert_eq!(err, AuthError::Other("OPERATION_NOT_ALLOWED".to_string()));
        assert_eq!(err.user_message(), "OPERATION_NOT_ALLOWED");
    }

    #[test]
    fn user_message_for_auth_error() {
        let err = Error::from(AuthError::UserNotFound);
        assert_eq!(err.user_message(), "No account found with this email address.");
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::new(403, Some("PERMISSION_DENIED".into()), Some("nope".into()));
        assert_eq!(err.to_string(), "HTTP 403 [PERMISSION_DENIED]: nope");
        assert!(err.is_auth_error());
    }

    #[test]
    fn not_found_detection() {
        let err = Error::Protocol(ProtocolError::not_found("gone"));
        assert!(err.is_not_found());
        assert!(!Error::from(AuthError::WeakPassword).is_not_found());
    }
}
