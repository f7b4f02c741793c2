#![allow(clippy::must_use_candidate)]

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::Config;

/// Lookup tables derived from a validated [`Config`].
pub struct LanguageTable {
    allowed: HashSet<String>,
    by_ext: HashMap<String, String>,
    colors: HashMap<String, String>,
}

impl LanguageTable {
    pub fn from_config(config: &Config) -> Self {
        let allowed = config.allowed_extensions.iter().cloned().collect();
        let by_ext = config
            .extension_languages
            .iter()
            .map(|(ext, lang)| (ext.clone(), lang.clone()))
            .collect();
        let colors = config
            .language_colors
            .iter()
            .map(|(lang, color)| (lang.clone(), color.clone()))
            .collect();
        Self {
            allowed,
            by_ext,
            colors,
        }
    }

    pub fn is_counted(&self, ext: &str) -> bool {
        self.allowed.contains(ext)
    }

    pub fn language_for(&self, ext: &str) -> Option<&str> {
        self.by_ext.get(ext).map(String::as_str)
    }

    pub fn color_for(&self, language: &str) -> Option<&str> {
        self.colors.get(language).map(String::as_str)
    }
}

/// Lowercased file-name suffix starting at the last `.`, or `""` without one.
///
/// Only the final path component is considered, so `repo.v2/Makefile` has
/// no extension.
pub fn extension_of(path: &Path) -> String {
    let Some(name) = path.file_name() else {
        return String::new();
    };
    let name = name.to_string_lossy();
    name.rfind('.')
        .map(|i| name[i..].to_lowercase())
        .unwrap_or_default()
}
