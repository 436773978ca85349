use super::stats::CompileStats;
use crate::formats::ImageFormat;
use crate::host::Environment;
use serde::Serialize;

/// Renderer arguments for one request, ready to hand to a [`RenderGate`]
///
/// [`RenderGate`]: crate::render::RenderGate
#[derive(Debug, Clone, Serialize)]
pub struct CompiledGraph {
    pub arguments: Vec<String>,
    pub format: ImageFormat,
    pub content_type: &'static str,
    pub environment: Environment,
    pub stats: CompileStats,
}

impl CompiledGraph {
    pub fn log_success(&self, request_id: &str) {
        crate::log_success!(
            crate::logging::codes::success::COMPILE_COMPLETE,
            "Graph description compiled",
            "request" => request_id,
            "format" => self.format,
            "commands" => self.stats.commands,
            "matches" => self.stats.matches,
            "arguments" => self.stats.arguments,
            "duration_ms" => format!("{:.2}", self.stats.duration_ms())
        );
    }
}

/// Renderer output with the content type to serve it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGraph {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}
