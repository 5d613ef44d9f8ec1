#![forbid(unsafe_code)]
//! Typed Rust accessors for localized messages.
//!
//! Reads a directory of per-language JSON message files, merges them into one
//! message tree, checks that every language provides every message and writes
//! a Rust module with one trait per nesting level and one implementation per
//! language.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use i18n_codegen::{GeneratorConfig, generate, write_output};
//!
//! let config = GeneratorConfig::new()
//!     .with_messages_directory("i18n")
//!     .with_default_language("en")
//!     .with_output_file("src/messages.rs");
//!
//! let generation = generate(&config)?;
//! for warning in &generation.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! write_output(&config.output_file, &generation.source)?;
//! # Ok::<(), i18n_codegen::Error>(())
//! ```
//!
//! # Message files
//!
//! - `"key": "text with {arg:type:format}"`: a message, an array of strings
//!   makes a multiline message
//! - `"key": { ... }`: a nested bag, `"key:Name"` also names its trait
//! - `"?key": { "condition": "text", "": "else" }`: a conditional message
//! - `"key": { "_args": ["n:int"], "_message": "..." }`: a message with
//!   declared arguments

pub mod arguments;
pub mod config;
pub mod consistency;
pub mod emitter;
pub mod error;
pub mod json;
pub mod naming;
pub mod parser;
pub mod placeholder;
pub mod tree;
pub mod values;
pub mod walker;
pub mod warnings;

use std::path::Path;

// Re-export most used types for easy consumption
pub use crate::{
    arguments::{ArgumentList, ArgumentType, ArgumentTypeRegistry, MessageArgument},
    config::GeneratorConfig,
    consistency::ensure_consistency,
    emitter::RustCodeWriter,
    error::Error,
    naming::{Namer, RustNamer},
    parser::{FileEntry, JsonParser},
    tree::{EntryId, EntryKind, MessageTree},
    values::{Line, MessageValue, Parametrized, UsedArgument},
    walker::collect_message_files,
    warnings::{Warning, Warnings},
};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The generated Rust module.
    pub source: String,
    /// Sorted language tags.
    pub languages: Vec<String>,
    /// Everything reported along the way. Callers usually refuse to write
    /// `source` when this is not empty.
    pub warnings: Warnings,
    pub tree: MessageTree,
}

/// Runs the whole pipeline on the messages directory of `config`.
pub fn generate(config: &GeneratorConfig) -> Result<Generation, Error> {
    config.validate()?;
    let files = collect_message_files(&config.messages_directory, &config.default_language)?;
    generate_from_files(files, config)
}

/// Runs the pipeline on files that were already read.
///
/// `config.messages_directory` is not used.
pub fn generate_from_files(
    files: Vec<FileEntry>,
    config: &GeneratorConfig,
) -> Result<Generation, Error> {
    config.validate()?;
    let default_language = config.normalized_default_language();
    let registry = ArgumentTypeRegistry::builtin();
    let mut warnings = Warnings::new();
    let mut tree = MessageTree::new();

    tracing::info!(files = files.len(), %default_language, "parsing message files");
    JsonParser::new(&registry, &mut warnings, &default_language).parse_files(files, &mut tree)?;

    let languages = ensure_consistency(&mut tree, &default_language, &mut warnings)?;
    tracing::info!(
        languages = languages.len(),
        messages = tree.instance_ids().len(),
        warnings = warnings.len(),
        "message tree is ready"
    );

    let namer = RustNamer::new(config.top_level_name.clone(), config.public_non_named_interfaces);
    let source = RustCodeWriter::new(&namer, &config.output_package, &default_language)
        .write(&tree, &languages)?;

    Ok(Generation {
        source,
        languages,
        warnings,
        tree,
    })
}

/// Writes `source` to `path`, creating missing parent directories.
pub fn write_output<P: AsRef<Path>>(path: P, source: &str) -> Result<(), Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, source)?;
    tracing::info!(file = %path.display(), bytes = source.len(), "wrote generated module");
    Ok(())
}
