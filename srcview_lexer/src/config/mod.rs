//! Configuration module for the srcview lexer
//! Automatically uses generated constants from TOML configuration

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("SRCVIEW_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("SRCVIEW_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::lexical::MAX_LOOKAHEAD_TOKENS > 0);
        assert!(compile_time::lexical::MAX_BUILDER_DEPTH > 0);
        assert!(compile_time::lexical::MAX_CANDIDATE_TOKENS >= 2);
        assert!(
            compile_time::file_processing::LARGE_FILE_THRESHOLD
                <= compile_time::file_processing::MAX_FILE_SIZE
        );
    }

    #[test]
    fn test_source_info_names_profile() {
        assert!(build_info::source_info().ends_with(".toml"));
        assert!(build_info::source_info().contains(build_info::profile()));
    }
}
