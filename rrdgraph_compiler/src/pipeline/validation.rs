use crate::config::compile_time::limits::{
    MAX_ELEMENTS_PER_REQUEST, MAX_MATCHES_PER_SOURCE, MAX_OPERANDS_PER_CDEF, MAX_QUERY_LENGTH,
};
use crate::logging::codes;
use crate::options::known_options;

/// Validate that the compiler is properly configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating compiler configuration");

    for (name, value) in [
        ("MAX_QUERY_LENGTH", MAX_QUERY_LENGTH),
        ("MAX_ELEMENTS_PER_REQUEST", MAX_ELEMENTS_PER_REQUEST),
        ("MAX_MATCHES_PER_SOURCE", MAX_MATCHES_PER_SOURCE),
        ("MAX_OPERANDS_PER_CDEF", MAX_OPERANDS_PER_CDEF),
    ] {
        if value == 0 {
            return Err(format!("Compile-time limit {} must be non-zero", name));
        }
    }

    // Option lookup is a binary search
    let names: Vec<&str> = known_options().collect();
    if let Some(pair) = names.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(format!(
            "Option table is not strictly sorted at '{}'",
            pair[1]
        ));
    }

    for code in [
        codes::query::UNRECOGNIZED_ELEMENT,
        codes::query::MALFORMED_ENCODING,
        codes::configuration::MISSING_FORMAT,
        codes::resolution::UNRESOLVED_REFERENCE,
        codes::generation::FORBIDDEN_DAEMON,
        codes::generation::EMPTY_REFERENCE,
        codes::render::RENDERER_FAILED,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("No metadata registered for code {}", code));
        }
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Compiler configuration validated",
        "options" => names.len(),
        "max_query_length" => MAX_QUERY_LENGTH,
        "max_matches_per_source" => MAX_MATCHES_PER_SOURCE
    );

    Ok(())
}
