// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    limits: RequestLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct RequestLimits {
    max_query_length: usize,
    max_elements_per_request: usize,
    max_matches_per_source: usize,
    max_operands_per_cdef: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=RRDGRAPH_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=RRDGRAPH_CONFIG_DIR");

    let profile = env::var("RRDGRAPH_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("RRDGRAPH_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of rrdgraph_compiler directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_QUERY_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_MATCHES: usize = 100_000;

    if config.limits.max_query_length > ABSOLUTE_MAX_QUERY_LENGTH {
        panic!("SECURITY: max_query_length exceeds absolute maximum");
    }

    if config.limits.max_matches_per_source > ABSOLUTE_MAX_MATCHES {
        panic!("SECURITY: max_matches_per_source exceeds absolute maximum");
    }

    if config.limits.max_elements_per_request == 0 || config.limits.max_operands_per_cdef == 0 {
        panic!("max_elements_per_request and max_operands_per_cdef must be positive");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if config.logging.log_buffer_size < 100 {
        panic!("log_buffer_size too small (min: 100)");
    }

    if profile == "production" && config.limits.max_matches_per_source > 10_000 {
        panic!("PRODUCTION: max_matches_per_source too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod limits {{
        pub const MAX_QUERY_LENGTH: usize = {};
        pub const MAX_ELEMENTS_PER_REQUEST: usize = {};
        pub const MAX_MATCHES_PER_SOURCE: usize = {};
        pub const MAX_OPERANDS_PER_CDEF: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.limits.max_query_length,
        config.limits.max_elements_per_request,
        config.limits.max_matches_per_source,
        config.limits.max_operands_per_cdef,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
