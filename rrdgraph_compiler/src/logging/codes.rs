//! Error, warning and success codes with their classification metadata
//!
//! Every code used by the compiler stages is declared here together with the
//! metadata the log formatters and the error types read back.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Request query error codes
pub mod query {
    use super::Code;

    pub const UNRECOGNIZED_ELEMENT: Code = Code::new("E010");
    pub const MALFORMED_ENCODING: Code = Code::new("E011");
    pub const QUERY_TOO_LARGE: Code = Code::new("E012");
    pub const TOO_MANY_ELEMENTS: Code = Code::new("E013");
}

/// Static configuration error codes
pub mod configuration {
    use super::Code;

    pub const INVALID_ELEMENT: Code = Code::new("E020");
    pub const INVALID_OPTION: Code = Code::new("E021");
    pub const MISSING_FORMAT: Code = Code::new("E022");
    pub const UNKNOWN_FORMAT: Code = Code::new("E023");
}

/// Resolution error codes
pub mod resolution {
    use super::Code;

    pub const UNRESOLVED_REFERENCE: Code = Code::new("E030");
    pub const PATTERN_ERROR: Code = Code::new("E031");
    pub const EXPRESSION_FAILED: Code = Code::new("E032");
    pub const TOO_MANY_MATCHES: Code = Code::new("E033");
    pub const DUPLICATE_NAME: Code = Code::new("E034");
    pub const TOO_MANY_OPERANDS: Code = Code::new("E035");
}

/// Argument generation error codes
pub mod generation {
    use super::Code;

    pub const FORBIDDEN_DAEMON: Code = Code::new("E040");
    pub const EMPTY_REFERENCE: Code = Code::new("E041");
    pub const EXPRESSION_FAILED: Code = Code::new("E042");
}

/// Renderer error codes
pub mod render {
    use super::Code;

    pub const RENDERER_FAILED: Code = Code::new("E050");
}

/// Warning codes
pub mod warnings {
    use super::Code;

    pub const DUPLICATE_DECLARATION: Code = Code::new("W030");
    pub const ACCESS_DENIED: Code = Code::new("W031");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I001");
    pub const COMMAND_SET_BUILT: Code = Code::new("I010");
    pub const RESOLUTION_COMPLETE: Code = Code::new("I030");
    pub const MATCHES_RELEASED: Code = Code::new("I031");
    pub const GENERATION_COMPLETE: Code = Code::new("I040");
    pub const COMPILE_COMPLETE: Code = Code::new("I050");
    pub const RENDER_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        // System errors
        registry.insert(
            "ERR001",
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the failing request",
            ),
        );
        registry.insert(
            "ERR002",
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check logging configuration and environment variables",
            ),
        );

        // Query errors
        registry.insert(
            "E010",
            ErrorMetadata::new(
                "E010",
                "Query",
                Severity::Medium,
                false,
                true,
                "Query element is neither a graph element nor a known option",
                "Check the element keyword and the option whitelist",
            ),
        );
        registry.insert(
            "E011",
            ErrorMetadata::new(
                "E011",
                "Query",
                Severity::Medium,
                false,
                true,
                "Query element could not be URL-decoded",
                "Encode reserved characters as %XX with two hex digits",
            ),
        );
        registry.insert(
            "E012",
            ErrorMetadata::new(
                "E012",
                "Query",
                Severity::High,
                false,
                true,
                "Query string exceeds the configured length limit",
                "Move static elements into the graph configuration",
            ),
        );
        registry.insert(
            "E013",
            ErrorMetadata::new(
                "E013",
                "Query",
                Severity::High,
                false,
                true,
                "Query string carries too many elements",
                "Move static elements into the graph configuration",
            ),
        );

        // Configuration errors
        registry.insert(
            "E020",
            ErrorMetadata::new(
                "E020",
                "Configuration",
                Severity::High,
                false,
                true,
                "Configured graph element was not recognised",
                "Fix the element in the graph configuration",
            ),
        );
        registry.insert(
            "E021",
            ErrorMetadata::new(
                "E021",
                "Configuration",
                Severity::High,
                false,
                true,
                "Configured graph option was not recognised",
                "Fix the option in the graph configuration",
            ),
        );
        registry.insert(
            "E022",
            ErrorMetadata::new(
                "E022",
                "Configuration",
                Severity::Medium,
                false,
                true,
                "No output format configured and none implied by the request",
                "Set a format or request a name ending in a known suffix",
            ),
        );
        registry.insert(
            "E023",
            ErrorMetadata::new(
                "E023",
                "Configuration",
                Severity::Medium,
                false,
                true,
                "Output format is not one the renderer supports",
                "Use PNG, SVG, EPS, PDF, XML, XMLENUM, JSON, JSONTIME, CSV, TSV or SSV",
            ),
        );

        // Resolution errors
        registry.insert(
            "E030",
            ErrorMetadata::new(
                "E030",
                "Resolution",
                Severity::Medium,
                false,
                true,
                "Element refers to a variable that was never declared",
                "Declare the variable with DEF, VDEF or CDEF before using it",
            ),
        );
        registry.insert(
            "E031",
            ErrorMetadata::new(
                "E031",
                "Resolution",
                Severity::Medium,
                false,
                true,
                "DEF path is not a valid wildcard pattern",
                "Check bracket expressions and escapes in the path",
            ),
        );
        registry.insert(
            "E032",
            ErrorMetadata::new(
                "E032",
                "Resolution",
                Severity::High,
                false,
                true,
                "Expression evaluation failed while resolving sources",
                "Check the configured path, directory and environment expressions",
            ),
        );
        registry.insert(
            "E033",
            ErrorMetadata::new(
                "E033",
                "Resolution",
                Severity::High,
                false,
                true,
                "DEF pattern matched more files than allowed",
                "Narrow the pattern",
            ),
        );
        registry.insert(
            "E034",
            ErrorMetadata::new(
                "E034",
                "Resolution",
                Severity::Medium,
                false,
                true,
                "Variable declared more than once",
                "Rename one of the declarations",
            ),
        );
        registry.insert(
            "E035",
            ErrorMetadata::new(
                "E035",
                "Resolution",
                Severity::High,
                false,
                true,
                "CDEF expression has too many operands",
                "Split the expression into several CDEF elements",
            ),
        );

        // Generation errors
        registry.insert(
            "E040",
            ErrorMetadata::new(
                "E040",
                "Generation",
                Severity::High,
                false,
                true,
                "DEF element carries a daemon override",
                "Remove the daemon parameter from the element",
            ),
        );
        registry.insert(
            "E041",
            ErrorMetadata::new(
                "E041",
                "Generation",
                Severity::Medium,
                false,
                true,
                "Element refers to a variable backed by no data source",
                "Make sure the referenced CDEF uses at least one declared variable",
            ),
        );
        registry.insert(
            "E042",
            ErrorMetadata::new(
                "E042",
                "Generation",
                Severity::High,
                false,
                true,
                "Expression evaluation failed while generating arguments",
                "Check the configured legend and option expressions",
            ),
        );

        // Render errors
        registry.insert(
            "E050",
            ErrorMetadata::new(
                "E050",
                "Render",
                Severity::High,
                true,
                true,
                "Graph renderer failed",
                "Check the renderer output and the generated arguments",
            ),
        );

        // Warnings
        registry.insert(
            "W030",
            ErrorMetadata::new(
                "W030",
                "Resolution",
                Severity::Low,
                true,
                false,
                "Variable declared more than once; the later declaration wins",
                "Rename one of the declarations",
            ),
        );
        registry.insert(
            "W031",
            ErrorMetadata::new(
                "W031",
                "Resolution",
                Severity::Low,
                true,
                false,
                "Matched file was refused by the access policy",
                "Grant access to the file or narrow the pattern",
            ),
        );

        registry
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
