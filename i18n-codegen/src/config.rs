//! Options of a generation run.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::parser::{is_valid_key, normalize_language_tag};

/// Everything a generation run needs to know.
///
/// Can be built in code with the `with_*` methods, or read from a JSON file
/// whose keys are the field names; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Directory holding the message files.
    pub messages_directory: PathBuf,
    /// Language every message must exist in.
    pub default_language: String,
    /// File the generated module is written to.
    pub output_file: PathBuf,
    /// Package name recorded in the generated header.
    pub output_package: String,
    /// Name of the top-level trait, before case folding.
    pub top_level_name: String,
    /// Export the traits of bags that have no display name.
    pub public_non_named_interfaces: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            messages_directory: PathBuf::from("."),
            default_language: String::new(),
            output_file: PathBuf::from("messages.rs"),
            output_package: "messages".to_string(),
            top_level_name: "messages".to_string(),
            public_non_named_interfaces: false,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        serde_json::from_slice(&content).map_err(|source| Error::Json {
            file: path.display().to_string(),
            source,
        })
    }

    pub fn with_messages_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.messages_directory = directory.into();
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn with_output_file<P: Into<PathBuf>>(mut self, file: P) -> Self {
        self.output_file = file.into();
        self
    }

    pub fn with_output_package(mut self, package: impl Into<String>) -> Self {
        self.output_package = package.into();
        self
    }

    pub fn with_top_level_name(mut self, name: impl Into<String>) -> Self {
        self.top_level_name = name.into();
        self
    }

    pub fn with_public_non_named_interfaces(mut self, public: bool) -> Self {
        self.public_non_named_interfaces = public;
        self
    }

    /// The default language with `-` as its separator.
    pub fn normalized_default_language(&self) -> String {
        normalize_language_tag(&self.default_language)
    }

    /// Checks the values that the generator cannot work without.
    pub fn validate(&self) -> Result<(), Error> {
        if self.default_language.trim().is_empty() {
            return Err(Error::config_error("the default language cannot be empty"));
        }
        if !is_valid_key(&self.normalized_default_language()) {
            return Err(Error::config_error(format!(
                "`{}` cannot be used as a language tag",
                self.default_language
            )));
        }
        if !is_valid_key(&self.top_level_name) {
            return Err(Error::config_error(format!(
                "`{}` cannot be used as the top-level interface name",
                self.top_level_name
            )));
        }
        if self.output_package.trim().is_empty() {
            return Err(Error::config_error("the output package cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.output_file, PathBuf::from("messages.rs"));
        assert_eq!(config.top_level_name, "messages");
        assert!(!config.public_non_named_interfaces);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = GeneratorConfig::new()
            .with_messages_directory("i18n")
            .with_default_language("en_US")
            .with_top_level_name("strings")
            .with_public_non_named_interfaces(true);
        assert_eq!(config.messages_directory, PathBuf::from("i18n"));
        assert_eq!(config.normalized_default_language(), "en-US");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let bad_language = GeneratorConfig::new().with_default_language("1x");
        assert!(matches!(bad_language.validate(), Err(Error::Config(_))));

        let bad_top = GeneratorConfig::new()
            .with_default_language("en")
            .with_top_level_name("my messages");
        assert!(matches!(bad_top.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_language": "es", "messages_directory": "locales"}}"#
        )
        .unwrap();

        let config = GeneratorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.default_language, "es");
        assert_eq!(config.messages_directory, PathBuf::from("locales"));
        assert_eq!(config.output_package, "messages");
    }

    #[test]
    fn test_from_json_file_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_lang": "es"}}"#).unwrap();
        assert!(matches!(
            GeneratorConfig::from_json_file(file.path()),
            Err(Error::Json { .. })
        ));
    }
}
