//! Reportable diagnostics.
//!
//! A [`Warning`] describes a problem with one entry. Parsing and validation keep
//! going after a warning so that every problem is surfaced in a single run; the
//! caller decides whether a non-empty [`Warnings`] list blocks code emission.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("invalid key `{key}` in `{path}` ({language}): it does not follow ^[a-zA-Z][a-zA-Z0-9_-]*$")]
    InvalidKey {
        path: String,
        key: String,
        language: String,
    },

    #[error("invalid bag name `{name}` for `{path}` ({language}): it does not follow ^[a-zA-Z][a-zA-Z0-9_-]*$")]
    InvalidBagName {
        path: String,
        name: String,
        language: String,
    },

    #[error("bag `{path}` is already named `{existing}` but `{language}` names it `{added}`")]
    BagNameConflict {
        path: String,
        existing: String,
        added: String,
        language: String,
    },

    #[error("unknown type `{kind}` for argument `{argument}` in `{path}` ({language}), using `any`")]
    UnknownArgumentType {
        path: String,
        argument: String,
        kind: String,
        language: String,
    },

    #[error("invalid format `{format}` for argument `{argument}` of type `{kind}` in `{path}` ({language})")]
    InvalidArgumentFormat {
        path: String,
        argument: String,
        kind: String,
        format: String,
        language: String,
    },

    #[error("argument `{argument}` in `{path}` ({language}) has a type collision: `{existing}` != `{added}`")]
    ArgumentTypeCollision {
        path: String,
        argument: String,
        existing: String,
        added: String,
        language: String,
    },

    #[error("invalid argument declaration `{declaration}` in `{path}` ({language}): expected `name[:type]`")]
    InvalidArgumentDeclaration {
        path: String,
        declaration: String,
        language: String,
    },

    #[error("could not identify the type of entry `{path}` ({language}): {found}")]
    UnknownEntryShape {
        path: String,
        found: String,
        language: String,
    },

    #[error("invalid explicit message `{path}` ({language}): {reason}")]
    InvalidExplicitMessage {
        path: String,
        reason: String,
        language: String,
    },

    #[error("invalid language tag `{language}` derived from `{file}`, the file is ignored")]
    InvalidLanguageTag { file: String, language: String },

    #[error("entry `{path}` is missing in the default language `{default_language}`, it is ignored")]
    PrunedEntry {
        path: String,
        default_language: String,
    },

    #[error("bag `{path}` has no messages left, it is ignored")]
    PrunedBag { path: String },

    #[error("language `{language}` is missing `{path}`, using the value from `{default_language}`")]
    BackFilled {
        path: String,
        language: String,
        default_language: String,
    },
}

impl Warning {
    /// Dotted path of the entry the warning refers to, when it refers to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Warning::InvalidKey { path, .. }
            | Warning::InvalidBagName { path, .. }
            | Warning::BagNameConflict { path, .. }
            | Warning::UnknownArgumentType { path, .. }
            | Warning::InvalidArgumentFormat { path, .. }
            | Warning::ArgumentTypeCollision { path, .. }
            | Warning::InvalidArgumentDeclaration { path, .. }
            | Warning::UnknownEntryShape { path, .. }
            | Warning::InvalidExplicitMessage { path, .. }
            | Warning::PrunedEntry { path, .. }
            | Warning::PrunedBag { path }
            | Warning::BackFilled { path, .. } => Some(path),
            Warning::InvalidLanguageTag { .. } => None,
        }
    }
}

/// Accumulates warnings in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings {
    warnings: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::debug!(%warning, "reported warning");
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.warnings.iter()
    }

    pub fn as_slice(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.iter()
    }
}

impl IntoIterator for Warnings {
    type Item = Warning;
    type IntoIter = std::vec::IntoIter<Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.warnings.into_iter()
    }
}
