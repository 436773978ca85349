//! Error types for command set construction
//!
//! `QueryError` covers request-supplied input; `ConfigurationError` covers
//! the statically configured prefix and output format selection.

use crate::logging::codes::{self, Code, Severity};
use crate::pipeline::ErrorClass;
use thiserror::Error;

/// Errors raised while turning a query string into commands and options
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Neither an element nor a whitelisted option
    #[error("Query was not recognised: {element}")]
    UnrecognizedElement { element: String },

    /// Bad `%` escape, invalid UTF-8 or an embedded NUL
    #[error("The following element could not be unescaped: {element}")]
    MalformedEncoding { element: String },

    #[error("Query length {length} exceeds limit of {limit} bytes")]
    QueryTooLarge { length: usize, limit: usize },

    #[error("Query holds {count} elements, limit is {limit}")]
    TooManyElements { count: usize, limit: usize },
}

impl QueryError {
    pub fn unrecognized_element(element: &str) -> Self {
        Self::UnrecognizedElement {
            element: element.to_string(),
        }
    }

    pub fn malformed_encoding(element: &str) -> Self {
        Self::MalformedEncoding {
            element: element.to_string(),
        }
    }

    pub fn query_too_large(length: usize, limit: usize) -> Self {
        Self::QueryTooLarge { length, limit }
    }

    pub fn too_many_elements(count: usize, limit: usize) -> Self {
        Self::TooManyElements { count, limit }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnrecognizedElement { .. } => codes::query::UNRECOGNIZED_ELEMENT,
            Self::MalformedEncoding { .. } => codes::query::MALFORMED_ENCODING,
            Self::QueryTooLarge { .. } => codes::query::QUERY_TOO_LARGE,
            Self::TooManyElements { .. } => codes::query::TOO_MANY_ELEMENTS,
        }
    }

    /// Every query error is the client's fault
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Client
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }

    /// Offending element, when there is one
    pub fn element(&self) -> Option<&str> {
        match self {
            Self::UnrecognizedElement { element } | Self::MalformedEncoding { element } => {
                Some(element)
            }
            _ => None,
        }
    }
}

/// Errors in the configured graph description
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Graph element was not recognised: {element}")]
    InvalidElement { element: String },

    #[error("Could not recognise option: {key}")]
    InvalidOption { key: String },

    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    /// No configured format and the target has no known suffix
    #[error("No output format configured and none could be inferred from '{target}'")]
    MissingFormat { target: String },
}

impl ConfigurationError {
    pub fn invalid_element(element: &str) -> Self {
        Self::InvalidElement {
            element: element.to_string(),
        }
    }

    pub fn invalid_option(key: &str) -> Self {
        Self::InvalidOption {
            key: key.to_string(),
        }
    }

    pub fn unknown_format(format: &str) -> Self {
        Self::UnknownFormat {
            format: format.to_string(),
        }
    }

    pub fn missing_format(target: &str) -> Self {
        Self::MissingFormat {
            target: target.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidElement { .. } => codes::configuration::INVALID_ELEMENT,
            Self::InvalidOption { .. } => codes::configuration::INVALID_OPTION,
            Self::UnknownFormat { .. } => codes::configuration::UNKNOWN_FORMAT,
            Self::MissingFormat { .. } => codes::configuration::MISSING_FORMAT,
        }
    }

    /// A missing format is down to the request target; the rest are
    /// site misconfiguration
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingFormat { .. } => ErrorClass::Client,
            _ => ErrorClass::Server,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }
}
