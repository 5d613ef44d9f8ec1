use std::path::Path;
use unic_langid::LanguageIdentifier;

/// Values checked before a generation run
pub struct ValidationContext {
    pub messages_directory: Option<String>,
    pub output_file: Option<String>,
    pub language_code: Option<String>,
    pub top_level_name: Option<String>,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self {
            messages_directory: None,
            output_file: None,
            language_code: None,
            top_level_name: None,
        }
    }

    pub fn with_messages_directory(mut self, directory: String) -> Self {
        self.messages_directory = Some(directory);
        self
    }

    pub fn with_output_file(mut self, file: String) -> Self {
        self.output_file = Some(file);
        self
    }

    pub fn with_language_code(mut self, lang: String) -> Self {
        self.language_code = Some(lang);
        self
    }

    pub fn with_top_level_name(mut self, name: String) -> Self {
        self.top_level_name = Some(name);
        self
    }
}

/// Validate the messages directory exists
pub fn validate_messages_directory(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("Messages directory does not exist: {}", path));
    }

    if !path_obj.is_dir() {
        return Err(format!("Messages path is not a directory: {}", path));
    }

    Ok(())
}

/// Validate the output file can be written
pub fn validate_output_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if path.is_empty() {
        return Err("Output file cannot be empty".to_string());
    }

    if path_obj.is_dir() {
        return Err(format!("Output path is a directory: {}", path));
    }

    if path_obj.extension().and_then(|e| e.to_str()) != Some("rs") {
        return Err(format!("Output file must have the .rs extension: {}", path));
    }

    Ok(())
}

/// Validate language code format using unic-langid
pub fn validate_language_code(lang: &str) -> Result<(), String> {
    if lang.is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    match lang.parse::<LanguageIdentifier>() {
        Ok(_) => Ok(()),
        Err(_) => Err(format!(
            "Invalid language code format: {}. Expected valid BCP 47 language identifier",
            lang
        )),
    }
}

/// Validate the top-level interface name can become a Rust type name
pub fn validate_top_level_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(format!(
            "Invalid top-level interface name: {}. Expected a letter followed by letters, digits, '_' or '-'",
            name
        ));
    }
    Ok(())
}

/// Validate all values of a context
pub fn validate_context(context: &ValidationContext) -> Result<(), String> {
    if let Some(directory) = &context.messages_directory {
        validate_messages_directory(directory)?;
    }

    if let Some(output) = &context.output_file {
        validate_output_path(output)?;
    }

    match &context.language_code {
        Some(lang) => validate_language_code(lang)?,
        None => return Err("A default language is required (--default-language)".to_string()),
    }

    if let Some(name) = &context.top_level_name {
        validate_top_level_name(name)?;
    }

    Ok(())
}
