// Compiler stages
pub mod codegen;
pub mod command_set;
pub mod config;
pub mod elements;
pub mod escape;
pub mod formats;
pub mod host;
#[macro_use]
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod resolution;
pub mod scanner;

// Re-export key types for library consumers
pub use command_set::{Configuration, ConfigurationError, QueryError};
pub use config::runtime::CompilerPreferences;
pub use formats::ImageFormat;
pub use host::{
    AccessDecision, AccessPolicy, Collaborators, Environment, EvaluationError, Expression,
    ExpressionEvaluator, OptionValue, PathMatcher, PatternError, Renderer, RequestContext,
};
pub use pipeline::{
    compile, compile_with_preferences, render_graph, CompiledGraph, ErrorClass, PipelineError,
    RenderedGraph,
};
pub use render::{RenderError, RenderGate};
