mod error;
mod info;
mod result;
mod stats;
mod validation;

// Re-export public types
pub use error::{ErrorClass, PipelineError};
pub use info::{get_pipeline_info, PipelineInfo};
pub use result::{CompiledGraph, RenderedGraph};
pub use stats::CompileStats;
pub use validation::validate_pipeline;

use crate::codegen::generate;
use crate::command_set::{build_command_set, Configuration, ConfigurationError};
use crate::config::runtime::CompilerPreferences;
use crate::formats::{format_from_path, ImageFormat};
use crate::host::{Collaborators, Renderer, RequestContext};
use crate::logging::{self, codes};
use crate::render::RenderGate;
use crate::resolution::resolve;
use std::time::Instant;

/// Compile one request (configuration + query string -> renderer arguments)
/// with preferences taken from the environment
pub fn compile<S>(
    configuration: &Configuration,
    query: &str,
    request: &RequestContext<S>,
    collaborators: &Collaborators<'_, S>,
) -> Result<CompiledGraph, PipelineError> {
    compile_with_preferences(
        configuration,
        query,
        request,
        collaborators,
        &CompilerPreferences::default(),
    )
}

/// Compile one request with explicit preferences
pub fn compile_with_preferences<S>(
    configuration: &Configuration,
    query: &str,
    request: &RequestContext<S>,
    collaborators: &Collaborators<'_, S>,
    preferences: &CompilerPreferences,
) -> Result<CompiledGraph, PipelineError> {
    let start_time = Instant::now();

    logging::with_request_context(&request.id, || -> Result<CompiledGraph, PipelineError> {
        crate::log_info!("Compiling graph request",
            "target" => request.target.display(),
            "query_length" => query.len()
        );

        // Stage 1: output format and command set
        let format = select_format(configuration, request)?;
        let command_set = build_command_set(configuration, query)?;

        // Stage 2: sources and references
        let resolved = resolve(command_set, request, collaborators, preferences)?;

        // Stage 3: arguments
        let generated = generate(&resolved, format, request, collaborators, preferences);

        let commands = resolved.commands().len();
        let options = resolved.options().len();
        let environment = resolved.environment().clone();

        // Stage 4: cleanup, whatever generation returned
        let released = resolved.release();
        crate::log_success!(codes::success::MATCHES_RELEASED, "Source matches released",
            "count" => released
        );

        let arguments = generated?;

        let compiled = CompiledGraph {
            stats: CompileStats {
                commands,
                options,
                matches: released,
                arguments: arguments.len(),
                duration: start_time.elapsed(),
            },
            arguments,
            format,
            content_type: format.content_type(),
            environment,
        };

        compiled.log_success(&request.id);

        Ok(compiled)
    })
}

/// Hand compiled arguments to the renderer through its gate
pub fn render_graph<R: Renderer>(
    gate: &RenderGate<R>,
    compiled: &CompiledGraph,
) -> Result<RenderedGraph, PipelineError> {
    let bytes = gate.render(&compiled.arguments)?;
    Ok(RenderedGraph {
        bytes,
        content_type: compiled.content_type,
    })
}

/// The configured format, else the one implied by the target's suffix
fn select_format<S>(
    configuration: &Configuration,
    request: &RequestContext<S>,
) -> Result<ImageFormat, ConfigurationError> {
    if let Some(format) = configuration.format() {
        return Ok(format);
    }

    format_from_path(&request.target).ok_or_else(|| {
        let target = request.target.display().to_string();
        let err = ConfigurationError::missing_format(&target);
        crate::log_error!(err.error_code(), "No output format configured or implied by the target",
            element = target.as_str()
        );
        err
    })
}
