//! Configuration module for the graph compiler
//! Compile-time limits are generated from TOML by build.rs

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("RRDGRAPH_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("RRDGRAPH_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::{limits, logging};

    #[test]
    fn test_generated_limits_are_usable() {
        assert!(limits::MAX_QUERY_LENGTH > 0);
        assert!(limits::MAX_ELEMENTS_PER_REQUEST > 0);
        assert!(limits::MAX_MATCHES_PER_SOURCE > 0);
        assert!(limits::MAX_OPERANDS_PER_CDEF > 0);
        assert!(logging::SECURITY_MIN_LOG_LEVEL <= 2);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = super::build_info::source_info();
        assert!(info.contains(super::build_info::profile()));
    }
}
