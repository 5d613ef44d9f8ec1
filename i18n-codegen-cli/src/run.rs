//! One generation run, from configuration to the written module.

use i18n_codegen::{Error, GeneratorConfig, generate, write_output};

/// How a run ended when no fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The module was written.
    Written { warnings: usize },
    /// Warnings were reported and the module was not written.
    BlockedByWarnings { warnings: usize },
}

/// Generates the module described by `config` and writes it.
///
/// Every warning is printed to stderr. Unless `allow_warnings` is set, a
/// single warning keeps the output file untouched.
pub fn run(config: &GeneratorConfig, allow_warnings: bool) -> Result<Outcome, Error> {
    let generation = generate(config)?;

    for warning in &generation.warnings {
        eprintln!("warning: {}", warning);
    }
    let warnings = generation.warnings.len();
    if warnings > 0 && !allow_warnings {
        tracing::warn!(warnings, "not writing the generated module");
        return Ok(Outcome::BlockedByWarnings { warnings });
    }

    write_output(&config.output_file, &generation.source)?;
    tracing::info!(
        languages = ?generation.languages,
        output = %config.output_file.display(),
        "generated messages"
    );
    Ok(Outcome::Written { warnings })
}
