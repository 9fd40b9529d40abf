// build.rs - compile-time limits generated from config/<profile>.toml
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_token_length: usize,
    max_lookahead_tokens: usize,
    max_builder_depth: usize,
    max_candidate_tokens: usize,
    max_import_entries: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
    security_min_log_level: u8,
}

/// (constant name, rust type, value)
type Constant = (&'static str, &'static str, String);

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SRCVIEW_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SRCVIEW_CONFIG_DIR");

    let profile = env::var("SRCVIEW_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SRCVIEW_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let config_path = locate_config(&config_dir, &profile);
    println!("cargo:rerun-if-changed={}", config_path.display());

    let content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));
    let config: CompileTimeConfig = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    fs::write(
        Path::new(&out_dir).join("constants.rs"),
        render_constants(&config, &profile),
    )
    .expect("Failed to write generated constants");
}

/// Config directory lives at the workspace root, one level above this crate
fn locate_config(config_dir: &str, profile: &str) -> PathBuf {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");
    let path = workspace_root
        .join(config_dir)
        .join(format!("{}.toml", profile));

    if !path.exists() {
        panic!(
            "Configuration file not found: {} (profile '{}', set SRCVIEW_BUILD_PROFILE or SRCVIEW_CONFIG_DIR)",
            path.display(),
            profile
        );
    }
    path
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_LOOKAHEAD: usize = 4096;

    let files = &config.file_processing;
    let lexical = &config.lexical;

    if files.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("SECURITY: max_file_size exceeds absolute maximum");
    }
    if files.large_file_threshold > files.max_file_size {
        panic!("LIMITS: large_file_threshold must not exceed max_file_size");
    }
    if lexical.max_lookahead_tokens == 0 || lexical.max_lookahead_tokens > ABSOLUTE_MAX_LOOKAHEAD {
        panic!("LIMITS: max_lookahead_tokens must be within 1..={}", ABSOLUTE_MAX_LOOKAHEAD);
    }
    if lexical.max_builder_depth == 0 {
        panic!("LIMITS: max_builder_depth must be at least 1");
    }
    // A candidate needs the opener plus at least one deciding token
    if lexical.max_candidate_tokens < 2 {
        panic!("LIMITS: max_candidate_tokens must be at least 2");
    }
    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }
    if profile == "production" && files.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn render_constants(config: &CompileTimeConfig, profile: &str) -> String {
    let files = &config.file_processing;
    let lexical = &config.lexical;
    let logging = &config.logging;

    let sections: [(&str, Vec<Constant>); 3] = [
        (
            "file_processing",
            vec![
                ("MAX_FILE_SIZE", "u64", files.max_file_size.to_string()),
                ("LARGE_FILE_THRESHOLD", "u64", files.large_file_threshold.to_string()),
                ("MAX_TOKEN_COUNT", "usize", files.max_token_count.to_string()),
            ],
        ),
        (
            "lexical",
            vec![
                ("MAX_TOKEN_LENGTH", "usize", lexical.max_token_length.to_string()),
                ("MAX_LOOKAHEAD_TOKENS", "usize", lexical.max_lookahead_tokens.to_string()),
                ("MAX_BUILDER_DEPTH", "usize", lexical.max_builder_depth.to_string()),
                ("MAX_CANDIDATE_TOKENS", "usize", lexical.max_candidate_tokens.to_string()),
                ("MAX_IMPORT_ENTRIES", "usize", lexical.max_import_entries.to_string()),
            ],
        ),
        (
            "logging",
            vec![
                ("LOG_BUFFER_SIZE", "usize", logging.log_buffer_size.to_string()),
                ("MAX_LOG_MESSAGE_LENGTH", "usize", logging.max_log_message_length.to_string()),
                ("MAX_LOG_EVENTS_PER_FILE", "usize", logging.max_log_events_per_file.to_string()),
                ("SECURITY_MIN_LOG_LEVEL", "u8", logging.security_min_log_level.to_string()),
            ],
        ),
    ];

    let mut code = format!(
        "// Generated by build.rs from profile '{}'. DO NOT EDIT.\n\npub mod compile_time {{\n",
        profile
    );
    for (module, constants) in sections {
        let _ = writeln!(code, "    pub mod {} {{", module);
        for (name, ty, value) in constants {
            let _ = writeln!(code, "        pub const {}: {} = {};", name, ty, value);
        }
        code.push_str("    }\n");
    }
    code.push_str("}\n");
    code
}
