//! Rust source generation.
//!
//! The generated module holds three lookup functions, one trait per bag and
//! one unit struct per language and bag implementing that trait.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::arguments::ArgumentList;
use crate::error::Error;
use crate::naming::{Namer, rust_identifier};
use crate::tree::{EntryId, EntryKind, MessageTree};
use crate::values::{Line, MessageValue, Parametrized};

lazy_static! {
    static ref PRECISION_FORMAT_REGEX: Regex = Regex::new(r"^\.(\d+)([feEgG])$").unwrap();
}

const INDENT: &str = "    ";

/// Escapes `text` for a Rust string literal.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Escapes `text` for the format string of `format!`.
pub fn escape_format(text: &str) -> String {
    escape_string(text).replace('{', "{{").replace('}', "}}")
}

/// Translates a printf-style format letter into a Rust format spec.
pub fn format_spec(format: &str) -> String {
    let spec = match format {
        "" | "v" | "s" | "t" | "d" | "g" | "G" => "{}",
        "q" => "{:?}",
        "x" => "{:x}",
        "X" => "{:X}",
        "o" => "{:o}",
        "b" => "{:b}",
        "f" => "{:.6}",
        "e" => "{:e}",
        "E" => "{:E}",
        _ => {
            return match PRECISION_FORMAT_REGEX.captures(format) {
                Some(caps) => {
                    let precision = &caps[1];
                    match &caps[2] {
                        "e" => format!("{{:.{precision}e}}"),
                        "E" => format!("{{:.{precision}E}}"),
                        _ => format!("{{:.{precision}}}"),
                    }
                }
                None => "{}".to_string(),
            };
        }
    };
    spec.to_string()
}

/// Writes the generated module for a consistent tree.
pub struct RustCodeWriter<'a> {
    namer: &'a dyn Namer,
    package: &'a str,
    default_language: &'a str,
    out: String,
    indent: usize,
}

impl<'a> RustCodeWriter<'a> {
    pub fn new(namer: &'a dyn Namer, package: &'a str, default_language: &'a str) -> Self {
        RustCodeWriter {
            namer,
            package,
            default_language,
            out: String::new(),
            indent: 0,
        }
    }

    /// Renders the module. Every instance must have a value for every language.
    pub fn write(mut self, tree: &MessageTree, languages: &[String]) -> Result<String, Error> {
        let mut languages = languages.to_vec();
        languages.sort();
        languages.dedup();
        if !languages.iter().any(|language| language == self.default_language) {
            return Err(Error::MissingDefaultLanguage(self.default_language.to_string()));
        }

        let bags = tree.bag_ids();
        self.check_names(tree, &bags, &languages)?;

        self.write_header(&languages);
        self.write_lookups(tree, &languages);
        for &bag in &bags {
            self.write_trait(tree, bag);
        }
        for language in &languages {
            for &bag in &bags {
                self.write_impl(tree, bag, language);
            }
        }

        tracing::debug!(bytes = self.out.len(), "rendered module");
        Ok(self.out)
    }

    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn check_names(
        &self,
        tree: &MessageTree,
        bags: &[EntryId],
        languages: &[String],
    ) -> Result<(), Error> {
        let mut types: HashMap<String, String> = HashMap::new();
        let mut claim = |name: String, owner: String| match types.get(&name) {
            Some(existing) => Err(Error::NameCollision(format!(
                "{existing} and {owner} are both emitted as `{name}`"
            ))),
            None => {
                types.insert(name, owner);
                Ok(())
            }
        };

        for &bag in bags {
            let owner = bag_description(tree, bag);
            claim(self.namer.interface_name(tree, bag), owner.clone())?;
            for language in languages {
                claim(
                    self.namer.interface_name_for_language(tree, language, bag),
                    format!("{owner} in `{language}`"),
                )?;
            }

            let mut methods: HashMap<String, &str> = HashMap::new();
            for &child in tree.children(bag) {
                let name = self.namer.function_name(tree, child);
                if let Some(existing) = methods.insert(name.clone(), tree.key(child)) {
                    return Err(Error::NameCollision(format!(
                        "`{existing}` and `{}` in {owner} are both emitted as the method `{name}`",
                        tree.key(child)
                    )));
                }
                if let Some(instance) = tree.instance(child) {
                    check_parameters(tree, child, &instance.args)?;
                }
            }
        }
        Ok(())
    }

    fn write_header(&mut self, languages: &[String]) {
        self.line("// Code generated by i18n-codegen. DO NOT EDIT.");
        self.line("//");
        self.line(&format!("// Package: {}", self.package));
        self.line(&format!("// Default language: {}", self.default_language));
        self.line(&format!("// Languages: {}", languages.join(", ")));
        self.blank();
        self.line("#![allow(dead_code, unused_variables, private_interfaces, clippy::all)]");
        self.blank();
    }

    fn write_lookups(&mut self, tree: &MessageTree, languages: &[String]) {
        let root = tree.root();
        let top = self.namer.interface_name(tree, root);
        let default_type = self
            .namer
            .interface_name_for_language(tree, self.default_language, root);

        self.line("/// Messages for `tag`, or `None` when the language is unknown.");
        self.open(&format!(
            "pub fn messages_for(tag: &str) -> Option<&'static dyn {top}> {{"
        ));
        self.open("match tag.replace('_', \"-\").as_str() {");
        for language in languages {
            let type_name = self.namer.interface_name_for_language(tree, language, root);
            self.line(&format!(
                "\"{}\" => Some(&{type_name}),",
                escape_string(language)
            ));
        }
        self.line("_ => None,");
        self.close("}");
        self.close("}");
        self.blank();

        self.line("/// Messages for `tag`. Panics when the language is unknown.");
        self.open(&format!(
            "pub fn messages_for_must(tag: &str) -> &'static dyn {top} {{"
        ));
        self.open("match messages_for(tag) {");
        self.line("Some(messages) => messages,");
        self.line("None => panic!(\"unknown language tag `{}`\", tag),");
        self.close("}");
        self.close("}");
        self.blank();

        self.line(&format!(
            "/// Messages for `tag`, falling back to `{}`.",
            self.default_language
        ));
        self.open(&format!(
            "pub fn messages_for_or_default(tag: &str) -> &'static dyn {top} {{"
        ));
        self.line(&format!("messages_for(tag).unwrap_or(&{default_type})"));
        self.close("}");
        self.blank();
    }

    fn visibility(&self, tree: &MessageTree, bag: EntryId) -> &'static str {
        if self.namer.is_public(tree, bag) {
            "pub"
        } else {
            "pub(crate)"
        }
    }

    fn signature(&self, tree: &MessageTree, child: EntryId) -> String {
        let name = self.namer.function_name(tree, child);
        match tree.kind(child) {
            EntryKind::Bag => format!(
                "fn {name}(&self) -> &'static dyn {}",
                self.namer.interface_name(tree, child)
            ),
            EntryKind::Instance => {
                let params: String = tree
                    .instance(child)
                    .map(|instance| {
                        instance
                            .args
                            .iter()
                            .map(|arg| {
                                format!(", {}: {}", rust_identifier(&arg.name), arg.kind.rust_type)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                format!("fn {name}(&self{params}) -> String")
            }
        }
    }

    fn write_trait(&mut self, tree: &MessageTree, bag: EntryId) {
        let visibility = self.visibility(tree, bag);
        let name = self.namer.interface_name(tree, bag);
        if tree.is_root(bag) {
            self.line("/// Every message, for one language.");
        } else {
            self.line(&format!("/// Messages under `{}`.", tree.path_string(bag)));
        }
        self.open(&format!("{visibility} trait {name} {{"));
        for &child in tree.children(bag) {
            let signature = self.signature(tree, child);
            self.line(&format!("{signature};"));
        }
        self.close("}");
        self.blank();
    }

    fn write_impl(&mut self, tree: &MessageTree, bag: EntryId, language: &str) {
        let visibility = self.visibility(tree, bag);
        let trait_name = self.namer.interface_name(tree, bag);
        let type_name = self.namer.interface_name_for_language(tree, language, bag);

        self.line(&format!("{visibility} struct {type_name};"));
        self.blank();
        self.open(&format!("impl {trait_name} for {type_name} {{"));
        let children = tree.children(bag);
        for (i, &child) in children.iter().enumerate() {
            let signature = self.signature(tree, child);
            self.open(&format!("{signature} {{"));
            match tree.kind(child) {
                EntryKind::Bag => {
                    let child_type = self.namer.interface_name_for_language(tree, language, child);
                    self.line(&format!("&{child_type}"));
                }
                EntryKind::Instance => self.write_instance_body(tree, child, language),
            }
            self.close("}");
            if i + 1 < children.len() {
                self.blank();
            }
        }
        self.close("}");
        self.blank();
    }

    fn write_instance_body(&mut self, tree: &MessageTree, id: EntryId, language: &str) {
        let path = tree.path_string(id);
        let Some(instance) = tree.instance(id) else {
            panic!("internal error: `{path}` is not a message");
        };
        let Some(value) = instance.messages.get(language) else {
            panic!("internal error: `{path}` has no value for `{language}`");
        };
        self.write_value(value, &instance.args, &format!("`{path}` ({language})"));
    }

    fn write_value(&mut self, value: &MessageValue, args: &ArgumentList, context: &str) {
        match value {
            MessageValue::Literal(text) => {
                let expr = literal_expression(text);
                self.line(&expr);
            }
            MessageValue::Parametrized(p) => {
                let expr = parametrized_expression(p, args);
                self.line(&expr);
            }
            MessageValue::Multiline(lines) => {
                let exprs: Vec<String> = lines
                    .iter()
                    .map(|line| match line {
                        Line::Literal(text) => literal_expression(text),
                        Line::Parametrized(p) => parametrized_expression(p, args),
                    })
                    .collect();
                match exprs.as_slice() {
                    [single] => self.line(single),
                    _ => {
                        self.open("[");
                        for expr in &exprs {
                            self.line(&format!("{expr},"));
                        }
                        self.close("]");
                        self.line(".join(\"\\n\")");
                    }
                }
            }
            MessageValue::Conditional {
                branches,
                otherwise,
            } => {
                if branches.is_empty() {
                    if let Some(value) = otherwise {
                        self.write_value(value, args, context);
                    } else {
                        let message = escape_format(&format!("no condition matched for {context}"));
                        self.line(&format!("unreachable!(\"{message}\")"));
                    }
                    return;
                }

                for (i, (condition, value)) in branches.iter().enumerate() {
                    if i == 0 {
                        self.open(&format!("if {condition} {{"));
                    } else {
                        self.close(&format!("}} else if {condition} {{"));
                        self.indent += 1;
                    }
                    self.write_value(value, args, context);
                }
                self.close("} else {");
                self.indent += 1;
                match otherwise {
                    Some(value) => self.write_value(value, args, context),
                    None => {
                        let message = escape_format(&format!("no condition matched for {context}"));
                        self.line(&format!("unreachable!(\"{message}\")"));
                    }
                }
                self.close("}");
            }
        }
    }
}

fn bag_description(tree: &MessageTree, bag: EntryId) -> String {
    if tree.is_root(bag) {
        "the root bag".to_string()
    } else {
        format!("bag `{}`", tree.path_string(bag))
    }
}

/// Parameters of one method must be distinct identifiers usable as values.
fn check_parameters(tree: &MessageTree, id: EntryId, args: &ArgumentList) -> Result<(), Error> {
    let mut params: HashMap<String, &str> = HashMap::new();
    for arg in args.iter() {
        let param = rust_identifier(&arg.name);
        if param == "_" {
            return Err(Error::NameCollision(format!(
                "argument `_` of `{}` cannot be emitted as a parameter",
                tree.path_string(id)
            )));
        }
        if let Some(existing) = params.insert(param.clone(), arg.name.as_str()) {
            return Err(Error::NameCollision(format!(
                "arguments `{existing}` and `{}` of `{}` are both emitted as the parameter `{param}`",
                arg.name,
                tree.path_string(id)
            )));
        }
    }
    Ok(())
}

fn literal_expression(text: &str) -> String {
    format!("String::from(\"{}\")", escape_string(text))
}

fn parametrized_expression(p: &Parametrized, args: &ArgumentList) -> String {
    let mut template = String::new();
    let mut values = Vec::with_capacity(p.used_args().len());
    for (text, used) in p.parts() {
        template.push_str(&escape_format(text));
        let format = match &used.format {
            Some(format) => format.as_str(),
            None => args
                .get(&used.name)
                .map(|arg| arg.kind.default_format.as_str())
                .unwrap_or_default(),
        };
        template.push_str(&format_spec(format));
        values.push(rust_identifier(&used.name));
    }
    template.push_str(&escape_format(p.tail()));
    format!("format!(\"{template}\", {})", values.join(", "))
}
