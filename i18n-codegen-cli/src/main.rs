use std::path::PathBuf;

use clap::Parser;
use i18n_codegen::GeneratorConfig;
use i18n_codegen_cli::validation::{ValidationContext, validate_context};
use i18n_codegen_cli::{Outcome, run};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Generate typed Rust accessors from per-language JSON message files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the message files
    #[arg(short, long)]
    messages: Option<PathBuf>,

    /// Language every message must exist in, e.g. `en` or `en-US`
    #[arg(short = 'l', long)]
    default_language: Option<String>,

    /// File the generated module is written to [default: messages.rs]
    #[arg(short, long)]
    out_file: Option<PathBuf>,

    /// Package name recorded in the generated header [default: messages]
    #[arg(long, env = "I18N_CODEGEN_PACKAGE")]
    out_package: Option<String>,

    /// Name of the top-level trait [default: messages]
    #[arg(long)]
    top_interface_name: Option<String>,

    /// Export the traits of bags that have no display name
    #[arg(long)]
    public_non_named_interfaces: bool,

    /// Write the output even when warnings were reported
    #[arg(long)]
    allow_warnings: bool,

    /// JSON file with default values for the options above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(messages) = self.messages {
            config = config.with_messages_directory(messages);
        }
        if let Some(language) = self.default_language {
            config = config.with_default_language(language);
        }
        if let Some(out_file) = self.out_file {
            config = config.with_output_file(out_file);
        }
        if let Some(package) = self.out_package {
            config = config.with_output_package(package);
        }
        if let Some(name) = self.top_interface_name {
            config = config.with_top_level_name(name);
        }
        if self.public_non_named_interfaces {
            config = config.with_public_non_named_interfaces(true);
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let base = match &args.config {
        Some(path) => match GeneratorConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GeneratorConfig::default(),
    };
    let allow_warnings = args.allow_warnings;
    let config = args.into_config(base);

    let mut context = ValidationContext::new()
        .with_messages_directory(config.messages_directory.to_string_lossy().to_string())
        .with_output_file(config.output_file.to_string_lossy().to_string())
        .with_top_level_name(config.top_level_name.clone());
    if !config.default_language.is_empty() {
        context = context.with_language_code(config.default_language.clone());
    }
    if let Err(e) = validate_context(&context) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    match run(&config, allow_warnings) {
        Ok(Outcome::Written { .. }) => {}
        Ok(Outcome::BlockedByWarnings { warnings }) => {
            eprintln!(
                "Error: {} warning(s) reported, {} was not written (use --allow-warnings to write it anyway)",
                warnings,
                config.output_file.display()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
