use srcview_lexer::config::runtime::{
    parse_output_mode, FileProcessorPreferences, RuntimeConfig, TokenizerPreferences,
};
use srcview_lexer::{file_processor, lexical, logging, pipeline};
use std::env;

/// Command line options layered over the environment-derived preferences
#[derive(Debug)]
struct CliOptions {
    tokenizer: TokenizerPreferences,
    files: FileProcessorPreferences,
    pretty: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = RuntimeConfig::from_env();

    // Logging preferences must be pinned before the global service is built
    logging::config::init_runtime_preferences(runtime.logging.clone())?;
    logging::init_global_logging()?;

    // Validate code registry and compile-time limits
    lexical::init_lexical_logging()?;
    file_processor::init_file_processor_logging()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <tokens.json> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = match parse_options(&args[2..], runtime) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };

    process_single_file(&args[1], &options)
}

fn print_help(program_name: &str) {
    println!("srcview v{}", env!("CARGO_PKG_VERSION"));
    println!("Re-tokenizes a raw token dump and classifies every token");
    println!();
    println!("USAGE:");
    println!("    {} <tokens.json> [options]", program_name);
    println!();
    println!("ARGUMENTS:");
    println!("    <tokens.json>    JSON array of raw tokens ({{kind, text, line, offset?}})");
    println!();
    println!("OPTIONS:");
    println!("    --help                      Show this help message");
    println!("    --by-line                   Key output by line number instead of index");
    println!("    --mode M                    Output shape: enhanced, raw, fragments");
    println!("    --trim                      Drop whitespace at the end of each line");
    println!("    --raw-granularity           Do not split composite tokens into atoms");
    println!("    --keep-comment-whitespace   Keep comment line indentation inside the text atom");
    println!("    --compact                   Print JSON on a single line");
    println!();
    println!("ENVIRONMENT:");
    println!("    SRCVIEW_TOKENIZER_*         Defaults for the options above");
    println!("    SRCVIEW_LOGGING_*           Log format, console output and level");
}

fn parse_options(args: &[String], runtime: RuntimeConfig) -> Result<CliOptions, String> {
    let mut options = CliOptions {
        tokenizer: runtime.tokenizer,
        files: runtime.file_processor,
        pretty: true,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--by-line" => options.tokenizer.key_by_line = true,
            "--trim" => options.tokenizer.trim_trailing_whitespace = true,
            "--raw-granularity" => options.tokenizer.atomize = false,
            "--keep-comment-whitespace" => options.tokenizer.preserve_comment_whitespace = false,
            "--compact" => options.pretty = false,
            "--mode" => {
                i += 1;
                let value = args.get(i).ok_or("--mode requires a value")?;
                options.tokenizer.output_mode = parse_output_mode(value)
                    .ok_or_else(|| format!("unknown output mode '{}'", value))?;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn process_single_file(
    file_path: &str,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Processing file: {}", file_path);

    match pipeline::process_file_with_preferences(file_path, &options.tokenizer, &options.files) {
        Ok(result) => {
            let output = pipeline::render(&result, &options.tokenizer, Some(file_path.to_string()));
            println!("{}", output.to_json(options.pretty)?);
            eprintln!(
                "SUCCESS: {} tokens, {} features",
                result.token_count(),
                result.products.len()
            );
        }
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            print_detailed_error(&error);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_detailed_error(error: &pipeline::PipelineError) {
    let code = error.error_code();
    match error {
        pipeline::PipelineError::FileProcessing(ref file_err) => {
            eprintln!("Reading the token dump failed [{}]:", code.as_str());
            eprintln!("  {}", file_err);
        }
        pipeline::PipelineError::Scan(ref scan_err) => {
            eprintln!("Scan halted [{}]:", code.as_str());
            eprintln!("  {}", scan_err);
        }
        pipeline::PipelineError::Serialization(ref json_err) => {
            eprintln!("Output serialization failed [{}]:", code.as_str());
            eprintln!("  {}", json_err);
        }
        pipeline::PipelineError::Pipeline { message } => {
            eprintln!("Pipeline error: {}", message);
        }
    }
    eprintln!(
        "  Action: {}",
        logging::codes::get_action(code.as_str())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcview_lexer::config::runtime::OutputMode;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(
            &args(&[
                "--by-line",
                "--mode",
                "fragments",
                "--trim",
                "--raw-granularity",
                "--compact",
            ]),
            RuntimeConfig::default(),
        )
        .unwrap();

        assert!(options.tokenizer.key_by_line);
        assert_eq!(options.tokenizer.output_mode, OutputMode::Fragments);
        assert!(options.tokenizer.trim_trailing_whitespace);
        assert!(!options.tokenizer.atomize);
        assert!(!options.pretty);
    }

    #[test]
    fn test_parse_options_invalid() {
        let cases: [&[&str]; 3] = [&["--mode"], &["--mode", "html"], &["--unknown-option"]];
        for bad in cases {
            assert!(parse_options(&args(bad), RuntimeConfig::default()).is_err());
        }
    }
}
