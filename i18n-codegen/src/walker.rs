//! Collecting message files from disk.

use std::path::{Component, Path};

use ignore::WalkBuilder;

use crate::error::Error;
use crate::parser::{FileEntry, normalize_language_tag};

/// Reads every `.json` file below `directory`.
///
/// The file stem is the language and the directories between `directory` and
/// the file are the path of the bag the file fills. Files of the default
/// language come first, then files are ordered by path and language.
/// `.gitignore` rules are honoured.
pub fn collect_message_files<P: AsRef<Path>>(
    directory: P,
    default_language: &str,
) -> Result<Vec<FileEntry>, Error> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(Error::config_error(format!(
            "the messages directory `{}` does not exist or is not a directory",
            directory.display()
        )));
    }

    let walker = WalkBuilder::new(directory)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .hidden(false)
        .ignore(true)
        .parents(true)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for dent in walker {
        let dent = dent?;
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = dent.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(language) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let Ok(relative) = path.strip_prefix(directory) else {
            continue;
        };
        let segments: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|component| match component {
                        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let content = std::fs::read(path)?;
        tracing::debug!(file = %path.display(), %language, "found message file");
        files.push(
            FileEntry::new(segments, language, content).with_source(path.display().to_string()),
        );
    }

    let default_language = normalize_language_tag(default_language);
    files.sort_by(|a, b| {
        let a_key = (normalize_language_tag(&a.language) != default_language, &a.path, &a.language);
        let b_key = (normalize_language_tag(&b.language) != default_language, &b.path, &b.language);
        a_key.cmp(&b_key)
    });
    Ok(files)
}
