//! Identifiers for the generated code.

use crate::tree::{EntryId, MessageTree};

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

fn is_separator(ch: char) -> bool {
    ch == '_' || ch == '-'
}

/// Drops every `_`/`-` and capitalizes the letter that follows it.
///
/// The first letter is capitalized only when `capitalize` is set; a trailing
/// separator is dropped.
pub fn fold_case(key: &str, capitalize: bool) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = capitalize;
    for ch in key.chars() {
        if is_separator(ch) {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = false;
    }
    out
}

/// Converts a key to `snake_case`, splitting camel humps.
pub fn snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if is_separator(ch) {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if ch.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let starts_word = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if starts_word && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Escapes `name` so that it can be used as a Rust identifier.
pub fn rust_identifier(name: &str) -> String {
    if RESERVED_PATH_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Maps tree entries to the identifiers used by the emitter.
pub trait Namer {
    /// Method name of a child entry. The root has none.
    fn function_name(&self, tree: &MessageTree, entry: EntryId) -> String;

    /// Trait name of a bag.
    fn interface_name(&self, tree: &MessageTree, bag: EntryId) -> String;

    /// Unit struct implementing the trait of `bag` for `language`.
    fn interface_name_for_language(
        &self,
        tree: &MessageTree,
        language: &str,
        bag: EntryId,
    ) -> String;

    fn function_name_for_language(
        &self,
        tree: &MessageTree,
        language: &str,
        entry: EntryId,
    ) -> String;

    /// Whether the trait of `bag` is exported from the generated module.
    fn is_public(&self, tree: &MessageTree, bag: EntryId) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RustNamer {
    pub top_level_name: String,
    pub public_non_named_interfaces: bool,
}

impl RustNamer {
    pub fn new(top_level_name: impl Into<String>, public_non_named_interfaces: bool) -> Self {
        RustNamer {
            top_level_name: top_level_name.into(),
            public_non_named_interfaces,
        }
    }

    fn type_name(name: &str) -> String {
        let folded = fold_case(name, true);
        if RESERVED_PATH_KEYWORDS.contains(&folded.as_str()) {
            format!("{folded}_")
        } else {
            folded
        }
    }
}

impl Default for RustNamer {
    fn default() -> Self {
        RustNamer::new("messages", false)
    }
}

impl Namer for RustNamer {
    fn function_name(&self, tree: &MessageTree, entry: EntryId) -> String {
        assert!(
            !tree.is_root(entry),
            "internal error: the root bag has no function name"
        );
        rust_identifier(&snake_case(tree.key(entry)))
    }

    fn interface_name(&self, tree: &MessageTree, bag: EntryId) -> String {
        if let Some(name) = tree.bag(bag).and_then(|b| b.name.as_deref()) {
            return Self::type_name(name);
        }
        if tree.is_root(bag) {
            return Self::type_name(&self.top_level_name);
        }
        Self::type_name(
            &tree
                .path(bag)
                .iter()
                .map(|segment| fold_case(segment, true))
                .collect::<String>(),
        )
    }

    fn interface_name_for_language(
        &self,
        tree: &MessageTree,
        language: &str,
        bag: EntryId,
    ) -> String {
        format!(
            "{}{}",
            fold_case(language, true),
            self.interface_name(tree, bag)
        )
    }

    fn function_name_for_language(
        &self,
        tree: &MessageTree,
        language: &str,
        entry: EntryId,
    ) -> String {
        assert!(
            !tree.is_root(entry),
            "internal error: the root bag has no function name"
        );
        format!("{}_{}", snake_case(language), snake_case(tree.key(entry)))
    }

    fn is_public(&self, tree: &MessageTree, bag: EntryId) -> bool {
        tree.is_root(bag)
            || tree.bag(bag).is_some_and(|b| b.name.is_some())
            || self.public_non_named_interfaces
    }
}
