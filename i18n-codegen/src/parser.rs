//! Folding message files into a [`MessageTree`].
//!
//! Each file is first parsed into a tree of its own, rooted at the file's
//! directory path, and then merged into the shared tree. Problems that only
//! concern one entry become [`Warning`]s and the entry is skipped; structural
//! problems stop the run.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::arguments::{
    ArgumentCollision, ArgumentList, ArgumentType, ArgumentTypeRegistry, MessageArgument,
};
use crate::error::Error;
use crate::json::{self, JsonValue};
use crate::placeholder::split_placeholders;
use crate::tree::{EntryId, MergeConflict, MessageInstance, MessageTree};
use crate::values::{Line, MessageValue, Parametrized, UsedArgument};
use crate::warnings::{Warning, Warnings};

lazy_static! {
    static ref KEY_REGEX: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").unwrap();
    static ref ARGUMENT_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

const MESSAGE_KEY: &str = "_message";
const ARGS_KEY: &str = "_args";
const CONDITIONAL_PREFIX: char = '?';

/// Whether `key` can name an entry.
pub fn is_valid_key(key: &str) -> bool {
    KEY_REGEX.is_match(key)
}

/// Language tags use `-` as their only separator.
pub fn normalize_language_tag(tag: &str) -> String {
    tag.replace('_', "-")
}

/// One message file handed over by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Directory components relative to the messages directory.
    pub path: Vec<String>,
    pub language: String,
    /// Display path used in diagnostics.
    pub source: String,
    pub content: Vec<u8>,
}

impl FileEntry {
    pub fn new(
        path: Vec<String>,
        language: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let language = language.into();
        let source = path
            .iter()
            .cloned()
            .chain(std::iter::once(format!("{language}.json")))
            .collect::<Vec<_>>()
            .join("/");
        FileEntry {
            path,
            language,
            source,
            content: content.into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Parses message files into a tree, reporting problems to `warnings`.
pub struct JsonParser<'a> {
    registry: &'a ArgumentTypeRegistry,
    warnings: &'a mut Warnings,
    default_language: String,
}

impl<'a> JsonParser<'a> {
    pub fn new(
        registry: &'a ArgumentTypeRegistry,
        warnings: &'a mut Warnings,
        default_language: &str,
    ) -> Self {
        JsonParser {
            registry,
            warnings,
            default_language: normalize_language_tag(default_language),
        }
    }

    /// Parses every file into `tree`, default language first.
    pub fn parse_files(
        &mut self,
        mut files: Vec<FileEntry>,
        tree: &mut MessageTree,
    ) -> Result<(), Error> {
        let default_language = self.default_language.clone();
        files.sort_by_key(|file| normalize_language_tag(&file.language) != default_language);
        for file in &files {
            self.parse_file(file, tree)?;
        }
        Ok(())
    }

    pub fn parse_file(&mut self, file: &FileEntry, tree: &mut MessageTree) -> Result<(), Error> {
        let language = normalize_language_tag(&file.language);
        if !is_valid_key(&language) {
            self.warnings.push(Warning::InvalidLanguageTag {
                file: file.source.clone(),
                language,
            });
            return Ok(());
        }
        if let Some(segment) = file.path.iter().find(|segment| !is_valid_key(segment)) {
            return Err(Error::InvalidPathSegment {
                file: file.source.clone(),
                segment: segment.clone(),
            });
        }

        tracing::debug!(file = %file.source, %language, "parsing message file");
        let pairs = json::from_slice(&file.source, &file.content)?;
        tree.find_or_create_bag(&file.path)?;

        let mut local = MessageTree::new();
        let dest = local.find_or_create_bag(&file.path)?;
        let mut file_parser = FileParser {
            registry: self.registry,
            warnings: &mut *self.warnings,
            language: &language,
        };
        file_parser.parse_bag(&mut local, dest, &pairs)?;

        let root = tree.root();
        for conflict in tree.merge_into(root, &local)? {
            let warning = match conflict {
                MergeConflict::Argument { path, collision } => {
                    collision_warning(path, collision, &language)
                }
                MergeConflict::BagName { path, existing, added } => Warning::BagNameConflict {
                    path,
                    existing,
                    added,
                    language: language.clone(),
                },
            };
            self.warnings.push(warning);
        }
        Ok(())
    }
}

fn collision_warning(path: String, collision: ArgumentCollision, language: &str) -> Warning {
    Warning::ArgumentTypeCollision {
        path,
        argument: collision.argument,
        existing: collision.existing,
        added: collision.added,
        language: language.to_string(),
    }
}

struct FileParser<'p> {
    registry: &'p ArgumentTypeRegistry,
    warnings: &'p mut Warnings,
    language: &'p str,
}

impl FileParser<'_> {
    fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    fn parse_bag(
        &mut self,
        tree: &mut MessageTree,
        bag: EntryId,
        pairs: &[(String, JsonValue)],
    ) -> Result<(), Error> {
        for (raw_key, value) in pairs {
            if let Some(key) = raw_key.strip_prefix(CONDITIONAL_PREFIX) {
                let path = tree.child_path_string(bag, key);
                if !self.check_key(&path, key) {
                    continue;
                }
                let mut args = ArgumentList::new();
                if let Some(value) = self.parse_conditional(&path, value, &mut args)? {
                    self.insert(tree, bag, key, args, value)?;
                }
                continue;
            }

            match value {
                JsonValue::Object(fields) if value.get(MESSAGE_KEY).is_some() => {
                    let path = tree.child_path_string(bag, raw_key);
                    if !self.check_key(&path, raw_key) {
                        continue;
                    }
                    let mut args = ArgumentList::new();
                    if let Some(value) = self.parse_explicit(&path, fields, &mut args)? {
                        self.insert(tree, bag, raw_key, args, value)?;
                    }
                }
                JsonValue::Object(fields) => {
                    let (key, name) = match raw_key.split_once(':') {
                        Some((key, name)) => (key, Some(name)),
                        None => (raw_key.as_str(), None),
                    };
                    let path = tree.child_path_string(bag, key);
                    if !self.check_key(&path, key) {
                        continue;
                    }
                    let child = tree.add_bag(bag, key)?;
                    if let Some(name) = name {
                        self.assign_bag_name(tree, child, &path, name);
                    }
                    self.parse_bag(tree, child, fields)?;
                }
                JsonValue::String(_) | JsonValue::Array(_) => {
                    let path = tree.child_path_string(bag, raw_key);
                    if !self.check_key(&path, raw_key) {
                        continue;
                    }
                    let mut args = ArgumentList::new();
                    if let Some(value) = self.parse_text(&path, value, &mut args)? {
                        self.insert(tree, bag, raw_key, args, value)?;
                    }
                }
                _ => {
                    let path = tree.child_path_string(bag, raw_key);
                    if !self.check_key(&path, raw_key) {
                        continue;
                    }
                    self.warn(Warning::UnknownEntryShape {
                        path,
                        found: describe(value),
                        language: self.language.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_key(&mut self, path: &str, key: &str) -> bool {
        if is_valid_key(key) {
            return true;
        }
        self.warn(Warning::InvalidKey {
            path: path.to_string(),
            key: key.to_string(),
            language: self.language.to_string(),
        });
        false
    }

    fn assign_bag_name(&mut self, tree: &mut MessageTree, bag: EntryId, path: &str, name: &str) {
        if !is_valid_key(name) {
            self.warn(Warning::InvalidBagName {
                path: path.to_string(),
                name: name.to_string(),
                language: self.language.to_string(),
            });
            return;
        }
        if let Err(existing) = tree.set_bag_name(bag, name) {
            self.warn(Warning::BagNameConflict {
                path: path.to_string(),
                existing,
                added: name.to_string(),
                language: self.language.to_string(),
            });
        }
    }

    fn insert(
        &mut self,
        tree: &mut MessageTree,
        bag: EntryId,
        key: &str,
        args: ArgumentList,
        value: MessageValue,
    ) -> Result<(), Error> {
        let instance = MessageInstance::new(args).with_message(self.language, value);
        let (id, collisions) = tree.add_instance(bag, key, instance)?;
        for collision in collisions {
            let warning = collision_warning(tree.path_string(id), collision, self.language);
            self.warn(warning);
        }
        Ok(())
    }

    /// Parses a string or an array of strings.
    fn parse_text(
        &mut self,
        path: &str,
        value: &JsonValue,
        args: &mut ArgumentList,
    ) -> Result<Option<MessageValue>, Error> {
        match value {
            JsonValue::String(text) => {
                let line = self.parse_line(path, text, args)?;
                MessageValue::multiline(vec![line]).map(Some)
            }
            JsonValue::Array(items) if items.is_empty() => {
                self.warn(Warning::UnknownEntryShape {
                    path: path.to_string(),
                    found: "an empty array".to_string(),
                    language: self.language.to_string(),
                });
                Ok(None)
            }
            JsonValue::Array(items) => {
                if let Some(item) = items.iter().find(|item| item.as_str().is_none()) {
                    self.warn(Warning::UnknownEntryShape {
                        path: path.to_string(),
                        found: format!("an array containing {}", describe(item)),
                        language: self.language.to_string(),
                    });
                    return Ok(None);
                }
                let mut lines = Vec::with_capacity(items.len());
                for text in items.iter().filter_map(JsonValue::as_str) {
                    lines.push(self.parse_line(path, text, args)?);
                }
                MessageValue::multiline(lines).map(Some)
            }
            other => {
                self.warn(Warning::UnknownEntryShape {
                    path: path.to_string(),
                    found: describe(other),
                    language: self.language.to_string(),
                });
                Ok(None)
            }
        }
    }

    fn parse_line(
        &mut self,
        path: &str,
        text: &str,
        args: &mut ArgumentList,
    ) -> Result<Line, Error> {
        let (segments, placeholders) = split_placeholders(text);
        if placeholders.is_empty() {
            return Ok(Line::Literal(text.to_string()));
        }

        let mut used = Vec::with_capacity(placeholders.len());
        for placeholder in placeholders {
            let (kind, resolved) = match placeholder.kind.as_deref() {
                None => (self.registry.unknown().clone(), true),
                Some(name) => self.resolve_type(path, &placeholder.name, name),
            };

            let format = match placeholder.format {
                Some(format) if resolved && !kind.is_valid_format(&format) => {
                    self.warn(Warning::InvalidArgumentFormat {
                        path: path.to_string(),
                        argument: placeholder.name.clone(),
                        kind: kind.name.clone(),
                        format,
                        language: self.language.to_string(),
                    });
                    None
                }
                Some(_) if !resolved => None,
                format => format,
            };

            self.add_argument(path, args, MessageArgument::new(placeholder.name.clone(), kind));
            used.push(UsedArgument::new(placeholder.name, format));
        }

        Parametrized::new(segments, used).map(Line::Parametrized)
    }

    /// Resolves a type name. The flag is `false` when the name was unknown and
    /// the any type was used instead.
    fn resolve_type(&mut self, path: &str, argument: &str, name: &str) -> (ArgumentType, bool) {
        match self.registry.find(name) {
            Some(kind) => (kind.clone(), true),
            None => {
                self.warn(Warning::UnknownArgumentType {
                    path: path.to_string(),
                    argument: argument.to_string(),
                    kind: name.to_string(),
                    language: self.language.to_string(),
                });
                (self.registry.unknown().clone(), false)
            }
        }
    }

    fn add_argument(&mut self, path: &str, args: &mut ArgumentList, arg: MessageArgument) {
        if let Err(collision) = args.add(arg) {
            let warning = collision_warning(path.to_string(), collision, self.language);
            self.warn(warning);
        }
    }

    /// Seeds `args` from an `_args` array of `name[:type]` declarations.
    fn parse_declarations(&mut self, path: &str, value: &JsonValue, args: &mut ArgumentList) {
        let JsonValue::Array(items) = value else {
            self.warn(Warning::InvalidExplicitMessage {
                path: path.to_string(),
                reason: format!(
                    "`{ARGS_KEY}` must be an array of strings, found {}",
                    describe(value)
                ),
                language: self.language.to_string(),
            });
            return;
        };

        for item in items {
            let Some(declaration) = item.as_str() else {
                self.warn(Warning::InvalidArgumentDeclaration {
                    path: path.to_string(),
                    declaration: item.to_string(),
                    language: self.language.to_string(),
                });
                continue;
            };

            let (name, kind) = match declaration.split_once(':') {
                Some((name, kind)) => (name, Some(kind)),
                None => (declaration, None),
            };
            let well_formed = ARGUMENT_NAME_REGEX.is_match(name)
                && kind.is_none_or(|kind| !kind.is_empty() && !kind.contains(':'));
            if !well_formed {
                self.warn(Warning::InvalidArgumentDeclaration {
                    path: path.to_string(),
                    declaration: declaration.to_string(),
                    language: self.language.to_string(),
                });
                continue;
            }

            let kind = match kind {
                Some(kind) => self.resolve_type(path, name, kind).0,
                None => self.registry.unknown().clone(),
            };
            self.add_argument(path, args, MessageArgument::new(name, kind));
        }
    }

    /// Parses an object holding `_message` and optionally `_args`.
    fn parse_explicit(
        &mut self,
        path: &str,
        fields: &[(String, JsonValue)],
        args: &mut ArgumentList,
    ) -> Result<Option<MessageValue>, Error> {
        let mut message = None;
        let mut declarations = None;
        for (key, value) in fields {
            match key.as_str() {
                MESSAGE_KEY if message.is_none() => message = Some(value),
                ARGS_KEY if declarations.is_none() => declarations = Some(value),
                _ => self.warn(Warning::InvalidExplicitMessage {
                    path: path.to_string(),
                    reason: format!("unexpected key `{key}`"),
                    language: self.language.to_string(),
                }),
            }
        }

        if let Some(declarations) = declarations {
            self.parse_declarations(path, declarations, args);
        }

        match message {
            Some(value) if matches!(value, JsonValue::String(_) | JsonValue::Array(_)) => {
                self.parse_text(path, value, args)
            }
            Some(other) => {
                self.warn(Warning::InvalidExplicitMessage {
                    path: path.to_string(),
                    reason: format!(
                        "`{MESSAGE_KEY}` must be a string or an array of strings, found {}",
                        describe(other)
                    ),
                    language: self.language.to_string(),
                });
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Parses the object of a `?key` entry, or a nested conditional branch.
    fn parse_conditional(
        &mut self,
        path: &str,
        value: &JsonValue,
        args: &mut ArgumentList,
    ) -> Result<Option<MessageValue>, Error> {
        let Some(fields) = value.as_object() else {
            return Err(Error::malformed_conditional(
                path,
                format!("expected an object, found {}", value.kind_name()),
            ));
        };

        if let Some(declarations) = value.get(ARGS_KEY) {
            self.parse_declarations(path, declarations, args);
        }

        let mut conditions = HashSet::new();
        let mut declared_else = false;
        let mut branches = Vec::new();
        let mut otherwise = None;

        for (condition, branch) in fields {
            if condition == ARGS_KEY {
                continue;
            }
            if condition.is_empty() {
                if declared_else {
                    return Err(Error::malformed_conditional(path, "more than one else branch"));
                }
                declared_else = true;
                otherwise = self.parse_branch(path, condition, branch, args)?;
                continue;
            }
            if condition.trim().is_empty() {
                return Err(Error::malformed_conditional(path, "a condition cannot be blank"));
            }
            if !conditions.insert(condition.as_str()) {
                return Err(Error::malformed_conditional(
                    path,
                    format!("the condition `{condition}` is repeated"),
                ));
            }
            if let Some(value) = self.parse_branch(path, condition, branch, args)? {
                branches.push((condition.clone(), value));
            }
        }

        if conditions.is_empty() && !declared_else {
            return Err(Error::malformed_conditional(
                path,
                "there is no condition and no else branch",
            ));
        }
        if branches.is_empty() && otherwise.is_none() {
            return Ok(None);
        }
        Ok(Some(MessageValue::Conditional {
            branches,
            otherwise: otherwise.map(Box::new),
        }))
    }

    fn parse_branch(
        &mut self,
        path: &str,
        condition: &str,
        value: &JsonValue,
        args: &mut ArgumentList,
    ) -> Result<Option<MessageValue>, Error> {
        match value {
            JsonValue::String(_) | JsonValue::Array(_) => self.parse_text(path, value, args),
            JsonValue::Object(fields) if value.get(MESSAGE_KEY).is_some() => {
                self.parse_explicit(path, fields, args)
            }
            JsonValue::Object(_) => self.parse_conditional(path, value, args),
            other => {
                let branch = if condition.is_empty() {
                    "the else branch".to_string()
                } else {
                    format!("branch `{condition}`")
                };
                self.warn(Warning::UnknownEntryShape {
                    path: path.to_string(),
                    found: format!("{branch} holds {}", describe(other)),
                    language: self.language.to_string(),
                });
                Ok(None)
            }
        }
    }
}

fn describe(value: &JsonValue) -> String {
    match value {
        JsonValue::Null | JsonValue::Object(_) | JsonValue::Array(_) => {
            value.kind_name().to_string()
        }
        _ => format!("{} `{}`", value.kind_name(), value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(files: Vec<FileEntry>) -> (Result<MessageTree, Error>, Warnings) {
        let registry = ArgumentTypeRegistry::builtin();
        let mut warnings = Warnings::new();
        let mut tree = MessageTree::new();
        let result = JsonParser::new(&registry, &mut warnings, "en")
            .parse_files(files, &mut tree)
            .map(|_| tree);
        (result, warnings)
    }

    fn file(language: &str, content: &str) -> FileEntry {
        FileEntry::new(Vec::new(), language, content.as_bytes())
    }

    fn value<'t>(tree: &'t MessageTree, path: &[&str], language: &str) -> &'t MessageValue {
        let id = tree.find(path).unwrap();
        &tree.instance(id).unwrap().messages[language]
    }

    #[test]
    fn test_literal_and_nested() {
        let (tree, warnings) = parse(vec![file("en", r#"{"greeting":"hello","nested":{"inner":"world"}}"#)]);
        let tree = tree.unwrap();
        assert!(warnings.is_empty());
        assert_eq!(
            value(&tree, &["greeting"], "en"),
            &MessageValue::Literal("hello".to_string())
        );
        assert_eq!(
            value(&tree, &["nested", "inner"], "en"),
            &MessageValue::Literal("world".to_string())
        );
    }

    #[test]
    fn test_parametrized_with_format() {
        let (tree, warnings) = parse(vec![file("en", r#"{"msg":"value is {n:int:x}"}"#)]);
        let tree = tree.unwrap();
        assert!(warnings.is_empty());

        let id = tree.find(&["msg"]).unwrap();
        let instance = tree.instance(id).unwrap();
        assert_eq!(instance.args.get("n").unwrap().kind.name, "int");
        let MessageValue::Parametrized(p) = &instance.messages["en"] else {
            panic!("expected a parametrized value");
        };
        assert_eq!(p.text_segments(), &["value is ".to_string(), String::new()]);
        assert_eq!(p.used_args()[0].format.as_deref(), Some("x"));
    }

    #[test]
    fn test_multiline() {
        let (tree, _) = parse(vec![file("en", r#"{"help":["line one","hello {who}"]}"#)]);
        let tree = tree.unwrap();
        let MessageValue::Multiline(lines) = value(&tree, &["help"], "en") else {
            panic!("expected a multiline value");
        };
        assert_eq!(lines.len(), 2);
        assert!(matches!(lines[1], Line::Parametrized(_)));
    }

    #[test]
    fn test_duplicate_key_in_one_file_is_fatal() {
        let (tree, _) = parse(vec![file("en", r#"{"key1":"a","key1":"b"}"#)]);
        assert!(matches!(tree, Err(Error::MessageRedefinition { .. })));
    }

    #[test]
    fn test_redefinition_across_files_is_fatal() {
        let (tree, _) = parse(vec![file("en", r#"{"key1":"a"}"#), file("en", r#"{"key1":"b"}"#)]);
        assert!(matches!(
            tree,
            Err(Error::MessageRedefinition { ref path, ref language }) if path == "key1" && language == "en"
        ));
    }

    #[test]
    fn test_kind_mismatch_across_languages() {
        let (tree, _) = parse(vec![file("en", r#"{"cmds":{"a":"x"}}"#), file("es", r#"{"cmds":"x"}"#)]);
        assert!(matches!(tree, Err(Error::EntryKindMismatch { .. })));
    }

    #[test]
    fn test_invalid_key_is_skipped() {
        let (tree, warnings) = parse(vec![file("en", r#"{"1bad":"x","good":"y"}"#)]);
        let tree = tree.unwrap();
        assert_eq!(tree.children(tree.root()).len(), 1);
        assert!(matches!(warnings.as_slice(), [Warning::InvalidKey { key, .. }] if key == "1bad"));
    }

    #[test]
    fn test_unknown_shapes_are_skipped() {
        let (tree, warnings) = parse(vec![file(
            "en",
            r#"{"n":1,"b":true,"z":null,"mixed":["a",2],"empty":[],"ok":"x"}"#,
        )]);
        let tree = tree.unwrap();
        assert_eq!(tree.children(tree.root()).len(), 1);
        assert_eq!(warnings.len(), 5);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, Warning::UnknownEntryShape { .. })));
        assert!(warnings.iter().any(|w| w.to_string().contains("a number `1`")));
    }

    #[test]
    fn test_bag_display_name() {
        let (tree, warnings) = parse(vec![
            file("en", r#"{"cmds:Commands":{"a":"x"}}"#),
            file("es", r#"{"cmds:Ordenes":{"a":"y"}}"#),
        ]);
        let tree = tree.unwrap();
        let bag = tree.find(&["cmds"]).unwrap();
        assert_eq!(tree.bag(bag).unwrap().name.as_deref(), Some("Commands"));
        assert!(matches!(
            warnings.as_slice(),
            [Warning::BagNameConflict { existing, added, language, .. }]
                if existing == "Commands" && added == "Ordenes" && language == "es"
        ));
    }

    #[test]
    fn test_invalid_bag_name_still_parses_bag() {
        let (tree, warnings) = parse(vec![file("en", r#"{"cmds:9x":{"a":"x"}}"#)]);
        let tree = tree.unwrap();
        assert!(tree.find(&["cmds", "a"]).is_some());
        assert!(matches!(warnings.as_slice(), [Warning::InvalidBagName { .. }]));
    }

    #[test]
    fn test_unknown_type_falls_back_to_any() {
        let (tree, warnings) = parse(vec![file("en", r#"{"msg":"{id:uuid:x}"}"#)]);
        let tree = tree.unwrap();
        let id = tree.find(&["msg"]).unwrap();
        let instance = tree.instance(id).unwrap();
        assert!(instance.args.get("id").unwrap().kind.is_unknown);
        let MessageValue::Parametrized(p) = &instance.messages["en"] else {
            panic!("expected a parametrized value");
        };
        assert_eq!(p.used_args()[0].format, None);
        assert!(matches!(warnings.as_slice(), [Warning::UnknownArgumentType { kind, .. }] if kind == "uuid"));
    }

    #[test]
    fn test_invalid_format_is_reported() {
        let (tree, warnings) = parse(vec![file("en", r#"{"msg":"{flag:bool:d}"}"#)]);
        assert!(tree.is_ok());
        assert!(matches!(
            warnings.as_slice(),
            [Warning::InvalidArgumentFormat { format, kind, .. }] if format == "d" && kind == "bool"
        ));
    }

    #[test]
    fn test_type_collision_across_languages() {
        let (tree, warnings) = parse(vec![
            file("en", r#"{"msg":"{n:int}"}"#),
            file("es", r#"{"msg":"{n:string}"}"#),
        ]);
        let tree = tree.unwrap();
        let id = tree.find(&["msg"]).unwrap();
        assert_eq!(tree.instance(id).unwrap().args.get("n").unwrap().kind.name, "int");
        assert!(matches!(
            warnings.as_slice(),
            [Warning::ArgumentTypeCollision { path, language, .. }] if path == "msg" && language == "es"
        ));
    }

    #[test]
    fn test_type_widening_across_languages() {
        let (tree, warnings) = parse(vec![
            file("en", r#"{"msg":"{n} items"}"#),
            file("es", r#"{"msg":"{n:int} cosas"}"#),
        ]);
        let tree = tree.unwrap();
        assert!(warnings.is_empty());
        let id = tree.find(&["msg"]).unwrap();
        assert_eq!(tree.instance(id).unwrap().args.get("n").unwrap().kind.name, "int");
    }

    #[test]
    fn test_default_language_is_parsed_first() {
        let (tree, warnings) = parse(vec![
            file("es", r#"{"msg":"{n:string}"}"#),
            file("en", r#"{"msg":"{n:int}"}"#),
        ]);
        let tree = tree.unwrap();
        let id = tree.find(&["msg"]).unwrap();
        assert_eq!(tree.instance(id).unwrap().args.get("n").unwrap().kind.name, "int");
        assert!(matches!(warnings.as_slice(), [Warning::ArgumentTypeCollision { language, .. }] if language == "es"));
    }

    #[test]
    fn test_explicit_message_with_args() {
        let content = indoc! {r#"
            {
                "count": {
                    "_args": ["n:int", "who"],
                    "_message": "{who} has {n} items"
                }
            }
        "#};
        let (tree, warnings) = parse(vec![file("en", content)]);
        let tree = tree.unwrap();
        assert!(warnings.is_empty());

        let id = tree.find(&["count"]).unwrap();
        let instance = tree.instance(id).unwrap();
        let names: Vec<_> = instance.args.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["n", "who"]);
        assert_eq!(instance.args.get("n").unwrap().kind.name, "int");
        assert!(matches!(instance.messages["en"], MessageValue::Parametrized(_)));
    }

    #[test]
    fn test_explicit_message_rejects_unknown_keys() {
        let (tree, warnings) = parse(vec![file("en", r#"{"m":{"_message":"x","extra":1}}"#)]);
        let tree = tree.unwrap();
        assert!(tree.find(&["m"]).is_some());
        assert!(matches!(
            warnings.as_slice(),
            [Warning::InvalidExplicitMessage { reason, .. }] if reason.contains("extra")
        ));
    }

    #[test]
    fn test_invalid_declarations() {
        let (_, warnings) = parse(vec![file("en", r#"{"m":{"_args":["1n","a:","b:int:x",3],"_message":"x"}}"#)]);
        assert_eq!(warnings.len(), 4);
        assert!(warnings
            .iter()
            .all(|w| matches!(w, Warning::InvalidArgumentDeclaration { .. })));
    }

    #[test]
    fn test_conditional_with_else() {
        let content = indoc! {r#"
            {
                "?items": {
                    "_args": ["count:int"],
                    "count == 0": "no items",
                    "count == 1": "one item",
                    "": "{count} items"
                }
            }
        "#};
        let (tree, warnings) = parse(vec![file("en", content)]);
        let tree = tree.unwrap();
        assert!(warnings.is_empty());

        let id = tree.find(&["items"]).unwrap();
        let instance = tree.instance(id).unwrap();
        assert_eq!(instance.args.get("count").unwrap().kind.name, "int");
        let MessageValue::Conditional { branches, otherwise } = &instance.messages["en"] else {
            panic!("expected a conditional value");
        };
        let conditions: Vec<_> = branches.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(conditions, vec!["count == 0", "count == 1"]);
        assert!(matches!(otherwise.as_deref(), Some(MessageValue::Parametrized(_))));
    }

    #[test]
    fn test_conditional_without_else() {
        let (tree, _) = parse(vec![file("en", r#"{"?sign":{"a > 0":"positive","a < 0":"negative"}}"#)]);
        let tree = tree.unwrap();
        let MessageValue::Conditional { branches, otherwise } = value(&tree, &["sign"], "en") else {
            panic!("expected a conditional value");
        };
        assert_eq!(branches.len(), 2);
        assert!(otherwise.is_none());
    }

    #[test]
    fn test_nested_conditional_branch() {
        let content = r#"{"?m":{"a > 0":{"b > 0":"both","":"only a"},"":{"_message":"none"}}}"#;
        let (tree, warnings) = parse(vec![file("en", content)]);
        let tree = tree.unwrap();
        assert!(warnings.is_empty());
        let MessageValue::Conditional { branches, otherwise } = value(&tree, &["m"], "en") else {
            panic!("expected a conditional value");
        };
        assert!(matches!(branches[0].1, MessageValue::Conditional { .. }));
        assert_eq!(otherwise.as_deref(), Some(&MessageValue::Literal("none".to_string())));
    }

    #[test]
    fn test_malformed_conditionals_are_fatal() {
        for content in [
            r#"{"?m":"text"}"#,
            r#"{"?m":{}}"#,
            r#"{"?m":{"_args":["a"]}}"#,
            r#"{"?m":{"":"a","":"b"}}"#,
            r#"{"?m":{"a":"x","a":"y"}}"#,
            r#"{"?m":{"  ":"x"}}"#,
        ] {
            let (tree, _) = parse(vec![file("en", content)]);
            assert!(
                matches!(tree, Err(Error::MalformedConditional { .. })),
                "{content} should be rejected"
            );
        }
    }

    #[test]
    fn test_conditional_branch_with_bad_shape_is_dropped() {
        let (tree, warnings) = parse(vec![file("en", r#"{"?m":{"a > 0":1,"":"fallback"}}"#)]);
        let tree = tree.unwrap();
        let MessageValue::Conditional { branches, otherwise } = value(&tree, &["m"], "en") else {
            panic!("expected a conditional value");
        };
        assert!(branches.is_empty());
        assert!(otherwise.is_some());
        assert!(matches!(warnings.as_slice(), [Warning::UnknownEntryShape { found, .. }] if found.contains("a > 0")));
    }

    #[test]
    fn test_conditional_and_plain_key_collide() {
        let (tree, _) = parse(vec![file("en", r#"{"m":"x","?m":{"":"y"}}"#)]);
        assert!(matches!(tree, Err(Error::MessageRedefinition { .. })));
    }

    #[test]
    fn test_file_path_prefixes_entries() {
        let entry = FileEntry::new(vec!["cmds".to_string(), "help".to_string()], "en", &b"{\"usage\":\"x\",\"1\":\"y\"}"[..]);
        assert_eq!(entry.source, "cmds/help/en.json");
        let (tree, warnings) = parse(vec![entry]);
        let tree = tree.unwrap();
        assert!(tree.find(&["cmds", "help", "usage"]).is_some());
        assert_eq!(warnings.iter().next().and_then(Warning::path), Some("cmds.help.1"));
    }

    #[test]
    fn test_invalid_path_segment_is_fatal() {
        let entry = FileEntry::new(vec!["2fa".to_string()], "en", &b"{}"[..]);
        let (tree, _) = parse(vec![entry]);
        assert!(matches!(tree, Err(Error::InvalidPathSegment { ref segment, .. }) if segment == "2fa"));
    }

    #[test]
    fn test_file_under_message_is_fatal() {
        let (tree, _) = parse(vec![
            file("en", r#"{"cmds":"x"}"#),
            FileEntry::new(vec!["cmds".to_string()], "en", &b"{\"a\":\"b\"}"[..]),
        ]);
        assert!(matches!(tree, Err(Error::ParentIsNotBag { .. })));
    }

    #[test]
    fn test_language_tags_are_normalized() {
        let (tree, warnings) = parse(vec![file("en_US", r#"{"a":"x"}"#), file("1x", r#"{"a":"y"}"#)]);
        let tree = tree.unwrap();
        let id = tree.find(&["a"]).unwrap();
        let languages: Vec<_> = tree.instance(id).unwrap().messages.keys().cloned().collect();
        assert_eq!(languages, vec!["en-US".to_string()]);
        assert!(matches!(warnings.as_slice(), [Warning::InvalidLanguageTag { .. }]));
    }

    #[test]
    fn test_invalid_json_is_fatal() {
        let (tree, _) = parse(vec![file("en", "{ nope")]);
        assert!(matches!(tree, Err(Error::Json { .. })));
    }
}
