//! # rrdgraph host
//!
//! Filesystem-backed collaborators for `rrdgraph_compiler`: glob matching,
//! access checks, `%{NAME}` expressions, graph profiles and an `rrdtool`
//! renderer.

pub mod access;
pub mod evaluator;
pub mod matcher;
pub mod profile;
pub mod renderer;

#[cfg(feature = "cli")]
pub mod cli;

// Convenience re-exports
pub use access::{FileScope, ReadableAccess};
pub use evaluator::TemplateEvaluator;
pub use matcher::FsPathMatcher;
pub use profile::{GraphProfile, ProfileError};
pub use renderer::{RendererError, RrdtoolRenderer};

pub mod prelude {
    pub use crate::{
        FileScope, FsPathMatcher, GraphProfile, ReadableAccess, RrdtoolRenderer, TemplateEvaluator,
    };

    pub use rrdgraph_compiler::{
        compile, compile_with_preferences, render_graph, Collaborators, CompiledGraph,
        Configuration, ErrorClass, PipelineError, RenderGate, RenderedGraph, RequestContext,
    };
}
