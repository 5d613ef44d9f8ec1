//! Fatal error types for the i18n-codegen crate.
//!
//! An [`Error`] aborts a generation run and no output is produced. Problems that
//! only affect a single entry are not errors; they are collected as
//! [`crate::warnings::Warning`]s instead.

use thiserror::Error;

use crate::tree::EntryKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not walk the messages directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("could not decode `{file}`: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("the file `{0}` does not contain a JSON object at its top level")]
    NotAnObject(String),

    #[error("no message was found for the default language `{0}`")]
    MissingDefaultLanguage(String),

    #[error("entry `{path}` is a {existing} but it got redefined as a {added}")]
    EntryKindMismatch {
        path: String,
        existing: EntryKind,
        added: EntryKind,
    },

    #[error("message `{path}` is already defined for language `{language}` but it got redefined")]
    MessageRedefinition { path: String, language: String },

    #[error("malformed conditional `{path}`: {reason}")]
    MalformedConditional { path: String, reason: String },

    #[error("could not create bag `{path}` because `{at}` is not a bag")]
    ParentIsNotBag { path: String, at: String },

    #[error("invalid directory `{segment}` in `{file}`: it does not follow ^[a-zA-Z][a-zA-Z0-9_-]*$")]
    InvalidPathSegment { file: String, segment: String },

    #[error("invalid message value: {0}")]
    InvalidMessageValue(String),

    #[error("name collision: {0}")]
    NameCollision(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates a new configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Creates a new malformed-conditional error for the entry at `path`
    pub fn malformed_conditional(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedConditional {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
