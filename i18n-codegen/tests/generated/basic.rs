// Code generated by i18n-codegen. DO NOT EDIT.
//
// Package: messages
// Default language: en
// Languages: en, es

#![allow(dead_code, unused_variables, private_interfaces, clippy::all)]

/// Messages for `tag`, or `None` when the language is unknown.
pub fn messages_for(tag: &str) -> Option<&'static dyn Messages> {
    match tag.replace('_', "-").as_str() {
        "en" => Some(&EnMessages),
        "es" => Some(&EsMessages),
        _ => None,
    }
}

/// Messages for `tag`. Panics when the language is unknown.
pub fn messages_for_must(tag: &str) -> &'static dyn Messages {
    match messages_for(tag) {
        Some(messages) => messages,
        None => panic!("unknown language tag `{}`", tag),
    }
}

/// Messages for `tag`, falling back to `en`.
pub fn messages_for_or_default(tag: &str) -> &'static dyn Messages {
    messages_for(tag).unwrap_or(&EnMessages)
}

/// Every message, for one language.
pub trait Messages {
    fn cmds(&self) -> &'static dyn Cmds;
    fn greeting(&self, name: &dyn std::fmt::Display) -> String;
    fn help(&self, task: &str) -> String;
    fn items(&self, count: i64) -> String;
    fn price(&self, amount: f64) -> String;
}

/// Messages under `cmds`.
pub(crate) trait Cmds {
    fn run(&self, count: i64) -> String;
}

pub struct EnMessages;

impl Messages for EnMessages {
    fn cmds(&self) -> &'static dyn Cmds {
        &EnCmds
    }

    fn greeting(&self, name: &dyn std::fmt::Display) -> String {
        format!("Hello {}", name)
    }

    fn help(&self, task: &str) -> String {
        [
            String::from("Usage:"),
            format!("  run {}", task),
        ]
        .join("\n")
    }

    fn items(&self, count: i64) -> String {
        if count == 0 {
            String::from("No items")
        } else {
            format!("{} items", count)
        }
    }

    fn price(&self, amount: f64) -> String {
        format!("Total: {:.2}", amount)
    }
}

pub(crate) struct EnCmds;

impl Cmds for EnCmds {
    fn run(&self, count: i64) -> String {
        format!("Run {} tasks", count)
    }
}

pub struct EsMessages;

impl Messages for EsMessages {
    fn cmds(&self) -> &'static dyn Cmds {
        &EsCmds
    }

    fn greeting(&self, name: &dyn std::fmt::Display) -> String {
        format!("Hola {}", name)
    }

    fn help(&self, task: &str) -> String {
        [
            String::from("Uso:"),
            format!("  run {}", task),
        ]
        .join("\n")
    }

    fn items(&self, count: i64) -> String {
        if count == 0 {
            String::from("Ningún elemento")
        } else {
            format!("{} elementos", count)
        }
    }

    fn price(&self, amount: f64) -> String {
        format!("Total: {:.2}", amount)
    }
}

pub(crate) struct EsCmds;

impl Cmds for EsCmds {
    fn run(&self, count: i64) -> String {
        format!("Ejecutar {} tareas", count)
    }
}

