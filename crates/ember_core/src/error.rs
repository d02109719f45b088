//! Error types for the core library

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// The core error type
#[derive(Debug, Clone)]
pub enum Error {
    /// Service registry error
    Service(ServiceError),
    /// Generic error with message
    Message(Box<str>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Service(e) => write!(f, "Service error: {}", e),
            Error::Message(msg) => write!(f, "{}", msg),
        }
    }
}

/// Result type alias
pub type Result<T> = core::result::Result<T, Error>;

/// Service registry errors
#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Service not registered
    NotRegistered(Box<str>),
    /// Service already registered
    AlreadyRegistered(Box<str>),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::NotRegistered(name) => write!(f, "Service not registered: {}", name),
            ServiceError::AlreadyRegistered(name) => {
                write!(f, "Service already registered: {}", name)
            }
        }
    }
}

impl From<ServiceError> for Error {
    fn from(e: ServiceError) -> Self {
        Error::Service(e)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Message(s.into())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Message(s.into_boxed_str())
    }
}
