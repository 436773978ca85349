//! Error types for argument generation

use crate::elements::CommandKind;
use crate::logging::codes::{self, Code, Severity};
use crate::pipeline::ErrorClass;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// `DEF` trying to point the renderer at a caching daemon
    #[error("DEF elements must not contain a 'daemon' parameter: {vname}")]
    ForbiddenDaemon { vname: String },

    /// Reference resolved to a `CDEF` that draws from no source
    #[error("{kind} element referred to '{name}', which does not exist")]
    EmptyReference { kind: CommandKind, name: String },

    #[error("While evaluating expressions for '{subject}': {message}")]
    ExpressionFailed { subject: String, message: String },
}

impl GenerationError {
    pub fn forbidden_daemon(vname: &str) -> Self {
        Self::ForbiddenDaemon {
            vname: vname.to_string(),
        }
    }

    pub fn empty_reference(kind: CommandKind, name: &str) -> Self {
        Self::EmptyReference {
            kind,
            name: name.to_string(),
        }
    }

    pub fn expression_failed(subject: &str, message: &str) -> Self {
        Self::ExpressionFailed {
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ForbiddenDaemon { .. } => codes::generation::FORBIDDEN_DAEMON,
            Self::EmptyReference { .. } => codes::generation::EMPTY_REFERENCE,
            Self::ExpressionFailed { .. } => codes::generation::EXPRESSION_FAILED,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ExpressionFailed { .. } => ErrorClass::Server,
            _ => ErrorClass::Client,
        }
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }
}
