//! Cross-language consistency of a parsed tree.

use crate::error::Error;
use crate::tree::{EntryId, EntryKind, MessageTree};
use crate::warnings::{Warning, Warnings};

/// Makes every message available in every language.
///
/// Messages missing from the default language are removed, along with the
/// bags they leave empty. Any other missing translation is filled with a copy
/// of the default-language value. Returns the sorted list of languages.
pub fn ensure_consistency(
    tree: &mut MessageTree,
    default_language: &str,
    warnings: &mut Warnings,
) -> Result<Vec<String>, Error> {
    let languages: Vec<String> = tree.languages().into_iter().collect();
    if !languages.iter().any(|language| language == default_language) {
        return Err(Error::MissingDefaultLanguage(default_language.to_string()));
    }

    let root = tree.root();
    prune(tree, root, default_language, warnings);
    back_fill(tree, &languages, default_language, warnings);

    tracing::debug!(?languages, default_language, "messages are consistent");
    Ok(languages)
}

fn prune(tree: &mut MessageTree, bag: EntryId, default_language: &str, warnings: &mut Warnings) {
    let children = tree.children(bag).to_vec();
    for child in children {
        match tree.kind(child) {
            EntryKind::Instance => {
                let has_default = tree
                    .instance(child)
                    .is_some_and(|instance| instance.messages.contains_key(default_language));
                if !has_default {
                    warnings.push(Warning::PrunedEntry {
                        path: tree.path_string(child),
                        default_language: default_language.to_string(),
                    });
                    tree.remove(child);
                }
            }
            EntryKind::Bag => {
                prune(tree, child, default_language, warnings);
                if tree.children(child).is_empty() {
                    warnings.push(Warning::PrunedBag {
                        path: tree.path_string(child),
                    });
                    tree.remove(child);
                }
            }
        }
    }
}

fn back_fill(
    tree: &mut MessageTree,
    languages: &[String],
    default_language: &str,
    warnings: &mut Warnings,
) {
    for id in tree.instance_ids() {
        let path = tree.path_string(id);
        let Some(instance) = tree.instance_mut(id) else {
            continue;
        };
        let Some(default_value) = instance.messages.get(default_language).cloned() else {
            continue;
        };
        for language in languages {
            if instance.messages.contains_key(language) {
                continue;
            }
            instance
                .messages
                .insert(language.clone(), default_value.clone());
            warnings.push(Warning::BackFilled {
                path: path.clone(),
                language: language.clone(),
                default_language: default_language.to_string(),
            });
        }
    }
}
