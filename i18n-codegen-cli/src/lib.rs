//! CLI library for testing purposes

pub mod run;
pub mod validation;

pub use i18n_codegen::GeneratorConfig;
pub use run::{Outcome, run};
