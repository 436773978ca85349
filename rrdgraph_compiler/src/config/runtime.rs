// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerPreferences {
    /// Reject a variable name declared twice instead of letting the later one win
    pub strict_duplicate_names: bool,

    /// Sort aggregated environment values before joining them
    pub sort_environment_values: bool,

    /// Log every generated renderer argument at debug level
    pub log_generated_arguments: bool,
}

impl Default for CompilerPreferences {
    fn default() -> Self {
        Self {
            strict_duplicate_names: env::var(env_vars::STRICT_DUPLICATE_NAMES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            sort_environment_values: env::var(env_vars::SORT_ENVIRONMENT_VALUES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_generated_arguments: env::var(env_vars::LOG_GENERATED_ARGUMENTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Preferred minimum log level (within security constraints)
    pub min_log_level: LogLevel,

    /// Whether to tag events with the current request id
    pub include_request_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_request_context: env::var(env_vars::LOGGING_INCLUDE_REQUEST_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub compiler: CompilerPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Compiler
    pub const STRICT_DUPLICATE_NAMES: &str = "RRDGRAPH_STRICT_DUPLICATE_NAMES";
    pub const SORT_ENVIRONMENT_VALUES: &str = "RRDGRAPH_SORT_ENVIRONMENT_VALUES";
    pub const LOG_GENERATED_ARGUMENTS: &str = "RRDGRAPH_LOG_GENERATED_ARGUMENTS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "RRDGRAPH_LOGGING_USE_STRUCTURED";
    pub const LOGGING_MIN_LEVEL: &str = "RRDGRAPH_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_REQUEST_CONTEXT: &str = "RRDGRAPH_LOGGING_INCLUDE_REQUEST_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_preferences_round_trip_through_json() {
        let prefs = CompilerPreferences {
            strict_duplicate_names: true,
            sort_environment_values: true,
            log_generated_arguments: false,
        };

        let json = serde_json::to_string(&prefs).unwrap();
        let back: CompilerPreferences = serde_json::from_str(&json).unwrap();
        assert!(back.strict_duplicate_names);
        assert!(back.sort_environment_values);
        assert!(!back.log_generated_arguments);
    }

    #[test]
    fn test_env_var_names_are_prefixed() {
        for name in [
            env_vars::STRICT_DUPLICATE_NAMES,
            env_vars::SORT_ENVIRONMENT_VALUES,
            env_vars::LOG_GENERATED_ARGUMENTS,
            env_vars::LOGGING_USE_STRUCTURED,
            env_vars::LOGGING_MIN_LEVEL,
        ] {
            assert!(name.starts_with("RRDGRAPH_"));
        }
    }
}
