//! Argument types and argument lists.
//!
//! The set of recognized argument types lives in an [`ArgumentTypeRegistry`]
//! that is built once per run and handed to the parser by reference.

use std::fmt::{self, Debug, Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FLOAT_FORMAT_REGEX: Regex = Regex::new(r"^(\.\d+)?[feEgG]$").unwrap();
}

/// The generic format accepted by every type.
pub const VERBOSE_FORMAT: &str = "v";

/// A scalar type an interpolated argument can have.
#[derive(Clone)]
pub struct ArgumentType {
    /// Canonical name, used in diagnostics.
    pub name: String,
    /// Every name (canonical included) that resolves to this type.
    pub aliases: Vec<String>,
    /// Format used when a placeholder does not specify one.
    pub default_format: String,
    /// Whether this is the any/unknown type.
    pub is_unknown: bool,
    /// Parameter type used in generated Rust signatures.
    pub rust_type: String,
    format_validator: fn(&str) -> bool,
}

impl ArgumentType {
    pub fn new(
        name: impl Into<String>,
        aliases: &[&str],
        default_format: impl Into<String>,
        rust_type: impl Into<String>,
        format_validator: fn(&str) -> bool,
    ) -> Self {
        ArgumentType {
            name: name.into(),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            default_format: default_format.into(),
            is_unknown: false,
            rust_type: rust_type.into(),
            format_validator,
        }
    }

    fn unknown() -> Self {
        ArgumentType {
            is_unknown: true,
            ..ArgumentType::new(
                "any",
                &["any", "unknown"],
                VERBOSE_FORMAT,
                "&dyn std::fmt::Display",
                |format| format == VERBOSE_FORMAT,
            )
        }
    }

    /// Whether `format` is acceptable for this type.
    pub fn is_valid_format(&self, format: &str) -> bool {
        (self.format_validator)(format)
    }

    /// Whether `name` is the canonical name or one of the aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }
}

impl PartialEq for ArgumentType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ArgumentType {}

impl Debug for ArgumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentType")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("default_format", &self.default_format)
            .field("is_unknown", &self.is_unknown)
            .field("rust_type", &self.rust_type)
            .finish()
    }
}

impl Display for ArgumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The closed set of argument types known to a run.
///
/// The first entry is always the unknown type.
#[derive(Debug, Clone)]
pub struct ArgumentTypeRegistry {
    types: Vec<ArgumentType>,
}

impl ArgumentTypeRegistry {
    fn empty() -> Self {
        ArgumentTypeRegistry {
            types: vec![ArgumentType::unknown()],
        }
    }

    /// The registry with the built-in `any`, `bool`, `string`, `int` and `float` types.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        let builtins = [
            ArgumentType::new("bool", &["bool", "boolean"], "t", "bool", |format| {
                matches!(format, "t" | VERBOSE_FORMAT)
            }),
            ArgumentType::new("string", &["string", "str"], "s", "&str", |format| {
                matches!(format, "s" | "q" | VERBOSE_FORMAT)
            }),
            ArgumentType::new("int", &["int", "i", "integer", "i64"], "d", "i64", |format| {
                matches!(format, "d" | "x" | "X" | "o" | "b" | VERBOSE_FORMAT)
            }),
            ArgumentType::new(
                "float",
                &["float", "f64", "float64", "double"],
                "f",
                "f64",
                |format| {
                    format.is_empty()
                        || format == VERBOSE_FORMAT
                        || FLOAT_FORMAT_REGEX.is_match(format)
                },
            ),
        ];
        for kind in builtins {
            registry.register(kind);
        }
        registry
    }

    /// Adds a type. Returns `false` and leaves the registry untouched when the
    /// name or any alias is already taken.
    pub fn register(&mut self, kind: ArgumentType) -> bool {
        let collides = std::iter::once(&kind.name)
            .chain(kind.aliases.iter())
            .any(|name| self.find(name).is_some());
        if collides {
            return false;
        }
        self.types.push(kind);
        true
    }

    /// Looks a type up by canonical name or alias.
    pub fn find(&self, name: &str) -> Option<&ArgumentType> {
        self.types.iter().find(|kind| kind.answers_to(name))
    }

    /// The any/unknown type.
    pub fn unknown(&self) -> &ArgumentType {
        &self.types[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgumentType> {
        self.types.iter()
    }
}

impl Default for ArgumentTypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A named argument of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageArgument {
    pub name: String,
    pub kind: ArgumentType,
}

impl MessageArgument {
    pub fn new(name: impl Into<String>, kind: ArgumentType) -> Self {
        MessageArgument {
            name: name.into(),
            kind,
        }
    }
}

/// Two occurrences of the same argument declared different concrete types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentCollision {
    pub argument: String,
    pub existing: String,
    pub added: String,
}

/// Ordered set of arguments, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    args: Vec<MessageArgument>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `arg`, unifying it with an existing argument of the same name.
    ///
    /// An unknown type is widened by a concrete one; two different concrete
    /// types collide and the existing type is kept.
    pub fn add(&mut self, arg: MessageArgument) -> Result<(), ArgumentCollision> {
        let Some(existing) = self.args.iter_mut().find(|a| a.name == arg.name) else {
            self.args.push(arg);
            return Ok(());
        };
        if arg.kind.is_unknown || existing.kind == arg.kind {
            return Ok(());
        }
        if existing.kind.is_unknown {
            existing.kind = arg.kind;
            return Ok(());
        }
        Err(ArgumentCollision {
            argument: arg.name,
            existing: existing.kind.name.clone(),
            added: arg.kind.name,
        })
    }

    /// Adds every argument of `other`, returning the collisions found.
    pub fn merge(&mut self, other: &ArgumentList) -> Vec<ArgumentCollision> {
        other
            .args
            .iter()
            .filter_map(|arg| self.add(arg.clone()).err())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&MessageArgument> {
        self.args.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageArgument> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}
