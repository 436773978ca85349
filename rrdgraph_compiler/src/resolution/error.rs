//! Error types for source and reference resolution

use crate::elements::CommandKind;
use crate::logging::codes::{self, Code, Severity};
use crate::pipeline::ErrorClass;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Name not declared before the referring command
    #[error("While parsing {kind}: '{name}' was not found")]
    UnresolvedReference { kind: CommandKind, name: String },

    #[error("While parsing DEF path '{pattern}': {message}")]
    PatternError { pattern: String, message: String },

    #[error("While evaluating an element expression '{expression}': {message}")]
    ExpressionFailed { expression: String, message: String },

    #[error("DEF '{name}' matched {count} files, limit is {limit}")]
    TooManyMatches {
        name: String,
        count: usize,
        limit: usize,
    },

    #[error("Variable '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("CDEF '{name}' has {count} operands, limit is {limit}")]
    TooManyOperands {
        name: String,
        count: usize,
        limit: usize,
    },
}

impl ResolutionError {
    pub fn unresolved_reference(kind: CommandKind, name: &str) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.to_string(),
        }
    }

    pub fn pattern_error(pattern: &str, message: &str) -> Self {
        Self::PatternError {
            pattern: pattern.to_string(),
            message: message.to_string(),
        }
    }

    pub fn expression_failed(expression: &str, message: &str) -> Self {
        Self::ExpressionFailed {
            expression: expression.to_string(),
            message: message.to_string(),
        }
    }

    pub fn too_many_matches(name: &str, count: usize, limit: usize) -> Self {
        Self::TooManyMatches {
            name: name.to_string(),
            count,
            limit,
        }
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::DuplicateName {
            name: name.to_string(),
        }
    }

    pub fn too_many_operands(name: &str, count: usize, limit: usize) -> Self {
        Self::TooManyOperands {
            name: name.to_string(),
            count,
            limit,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnresolvedReference { .. } => codes::resolution::UNRESOLVED_REFERENCE,
            Self::PatternError { .. } => codes::resolution::PATTERN_ERROR,
            Self::ExpressionFailed { .. } => codes::resolution::EXPRESSION_FAILED,
            Self::TooManyMatches { .. } => codes::resolution::TOO_MANY_MATCHES,
            Self::DuplicateName { .. } => codes::resolution::DUPLICATE_NAME,
            Self::TooManyOperands { .. } => codes::resolution::TOO_MANY_OPERANDS,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_reference_names_the_reference() {
        let err = ResolutionError::unresolved_reference(CommandKind::Line, "ghost");
        assert_eq!(err.to_string(), "While parsing LINE: 'ghost' was not found");
        assert_eq!(err.class(), ErrorClass::Client);
    }

    #[test]
    fn test_expression_failures_are_server_errors() {
        let err = ResolutionError::expression_failed("%{x}", "unknown variable");
        assert_eq!(err.class(), ErrorClass::Server);
        assert_eq!(err.error_code(), codes::resolution::EXPRESSION_FAILED);
    }
}
