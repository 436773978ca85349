use crate::config::compile_time::limits::{
    MAX_ELEMENTS_PER_REQUEST, MAX_MATCHES_PER_SOURCE, MAX_OPERANDS_PER_CDEF, MAX_QUERY_LENGTH,
};
use crate::formats::ImageFormat;
use crate::options::known_options;

/// Information about compiler capabilities
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub pipeline_stages: usize,
    pub supported_formats: Vec<&'static str>,
    pub known_options: usize,
    pub max_query_length: usize,
    pub max_elements_per_request: usize,
    pub max_matches_per_source: usize,
    pub max_operands_per_cdef: usize,
    pub global_logging_enabled: bool,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "rrdgraph compiler:\n\
             - Pipeline Stages: {}\n\
             - Output Formats: {}\n\
             - Known Options: {}\n\
             - Max Query Length: {} bytes\n\
             - Max Elements Per Request: {}\n\
             - Max Matches Per Source: {}\n\
             - Max Operands Per CDEF: {}\n\
             - Global Logging: {}",
            self.pipeline_stages,
            self.supported_formats.join(", "),
            self.known_options,
            self.max_query_length,
            self.max_elements_per_request,
            self.max_matches_per_source,
            self.max_operands_per_cdef,
            self.global_logging_enabled
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage graph compiler emitting {} formats",
            self.pipeline_stages,
            self.supported_formats.len()
        )
    }
}

/// Get compiler capabilities information
pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        // command set, resolution, generation, cleanup
        pipeline_stages: 4,
        supported_formats: ImageFormat::ALL.iter().map(ImageFormat::as_str).collect(),
        known_options: known_options().count(),
        max_query_length: MAX_QUERY_LENGTH,
        max_elements_per_request: MAX_ELEMENTS_PER_REQUEST,
        max_matches_per_source: MAX_MATCHES_PER_SOURCE,
        max_operands_per_cdef: MAX_OPERANDS_PER_CDEF,
        global_logging_enabled: crate::logging::is_initialized(),
    }
}
