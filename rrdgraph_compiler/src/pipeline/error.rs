use crate::codegen::GenerationError;
use crate::command_set::{ConfigurationError, QueryError};
use crate::logging::codes::{Code, Severity};
use crate::render::RenderError;
use crate::resolution::ResolutionError;
use serde::Serialize;

/// Who is at fault for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// The request is malformed or names things that do not exist
    Client,
    /// The configuration, an evaluator or the renderer failed
    Server,
}

impl ErrorClass {
    /// HTTP-style status for hosts that answer over HTTP
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorClass::Client => 400,
            ErrorClass::Server => 500,
        }
    }
}

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Query rejected: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Argument generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Query(e) => e.class(),
            Self::Configuration(e) => e.class(),
            Self::Resolution(e) => e.class(),
            Self::Generation(e) => e.class(),
            Self::Render(e) => e.class(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.class().status_code()
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Query(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
            Self::Resolution(e) => e.error_code(),
            Self::Generation(e) => e.error_code(),
            Self::Render(e) => e.error_code(),
        }
    }

    pub fn severity(&self) -> Severity {
        crate::logging::codes::get_severity(self.error_code().as_str())
    }
}
