//! The value of a message in one language.

use crate::error::Error;

/// An interpolation point inside a parametrized message.
///
/// The argument type is not stored here: it is looked up by name in the
/// owning instance's argument list when the message is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedArgument {
    pub name: String,
    /// Explicit printf-style format, `None` when the type default applies.
    pub format: Option<String>,
}

impl UsedArgument {
    pub fn new(name: impl Into<String>, format: Option<String>) -> Self {
        UsedArgument {
            name: name.into(),
            format,
        }
    }
}

/// Text segments interleaved with argument references.
///
/// There is always exactly one more text segment than used arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parametrized {
    text_segments: Vec<String>,
    used_args: Vec<UsedArgument>,
}

impl Parametrized {
    pub fn new(text_segments: Vec<String>, used_args: Vec<UsedArgument>) -> Result<Self, Error> {
        if text_segments.len() != used_args.len() + 1 {
            return Err(Error::InvalidMessageValue(format!(
                "{} text segments for {} arguments",
                text_segments.len(),
                used_args.len()
            )));
        }
        Ok(Parametrized {
            text_segments,
            used_args,
        })
    }

    pub fn text_segments(&self) -> &[String] {
        &self.text_segments
    }

    pub fn used_args(&self) -> &[UsedArgument] {
        &self.used_args
    }

    /// Pairs every used argument with the text segment preceding it.
    pub fn parts(&self) -> impl Iterator<Item = (&str, &UsedArgument)> {
        self.text_segments
            .iter()
            .map(String::as_str)
            .zip(self.used_args.iter())
    }

    /// The text after the last argument.
    pub fn tail(&self) -> &str {
        self.text_segments
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// One line of a multiline message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Literal(String),
    Parametrized(Parametrized),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageValue {
    Literal(String),
    Parametrized(Parametrized),
    /// Never empty.
    Multiline(Vec<Line>),
    /// Branches keep their declaration order. At least one branch or an
    /// `otherwise` value is present.
    Conditional {
        branches: Vec<(String, MessageValue)>,
        otherwise: Option<Box<MessageValue>>,
    },
}

impl MessageValue {
    /// Builds a multiline value. A single line collapses into a plain value.
    pub fn multiline(mut lines: Vec<Line>) -> Result<Self, Error> {
        match lines.len() {
            0 => Err(Error::InvalidMessageValue(
                "a multiline message needs at least one line".to_string(),
            )),
            1 => Ok(match lines.remove(0) {
                Line::Literal(text) => MessageValue::Literal(text),
                Line::Parametrized(p) => MessageValue::Parametrized(p),
            }),
            _ => Ok(MessageValue::Multiline(lines)),
        }
    }
}
