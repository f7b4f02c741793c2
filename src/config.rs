use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static EMBEDDED_CONFIG_JSON: &str = include_str!("../assets/default-config.json");

static DEFAULT_CONFIG: Lazy<Config> = Lazy::new(|| {
    serde_json::from_str(EMBEDDED_CONFIG_JSON).expect("invalid embedded default-config.json")
});

/// Everything the pipeline needs to know up front. Built once at startup
/// and passed down by reference; nothing mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Users and organisations whose repositories are scanned, in order.
    pub owners: Vec<String>,

    /// Repository names that are never cloned.
    pub excluded_repos: Vec<String>,

    /// Extensions (lowercase, leading dot) that are counted.
    pub allowed_extensions: Vec<String>,

    /// Extension to display language. Several extensions may share a language.
    pub extension_languages: IndexMap<String, String>,

    /// Display language to chart color.
    pub language_colors: IndexMap<String, String>,

    /// Upper bound handed to `gh repo list --limit`.
    pub repo_limit: u32,

    /// Charting service receiving the POST.
    pub chart_endpoint: String,

    #[serde(default)]
    pub chart: ChartStyle,
}

/// Fixed styling of the rendered doughnut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    #[serde(rename = "type")]
    pub kind: String,
    pub border_width: u32,
    pub cutout_percentage: u32,
    pub show_datalabels: bool,
    pub legend_display: bool,
    pub legend_position: String,
    pub legend_align: String,
    pub legend_font_size: u32,
    pub legend_font_style: String,
    pub legend_padding: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            kind: "pie".to_string(),
            border_width: 0,
            cutout_percentage: 64,
            show_datalabels: false,
            legend_display: true,
            legend_position: "left".to_string(),
            legend_align: "start".to_string(),
            legend_font_size: 24,
            legend_font_style: "bold".to_string(),
            legend_padding: 18,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl Config {
    /// Loads the embedded defaults, optionally overlaid with a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not a JSON object,
    /// or the resulting tables are inconsistent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let text = fs::read_to_string(p)
                    .with_context(|| format!("read config: {}", p.display()))?;
                Self::from_json_str(&text)
                    .with_context(|| format!("parse config: {}", p.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses `text` as a top-level overlay on the defaults: every key present
    /// replaces the default value wholesale, absent keys keep it.
    ///
    /// # Errors
    /// Returns an error for invalid JSON, a non-object document, or unknown keys.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let overlay: Value = serde_json::from_str(text)?;
        let Value::Object(overlay) = overlay else {
            bail!("configuration must be a JSON object");
        };
        let mut base = serde_json::to_value(&*DEFAULT_CONFIG)?;
        if let Value::Object(ref mut fields) = base {
            for (key, value) in overlay {
                fields.insert(key, value);
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    /// Normalizes extensions and checks that every counted extension reaches
    /// a language and every language has a color.
    ///
    /// # Errors
    /// Returns an error describing the first inconsistency found.
    pub fn validate(&mut self) -> Result<()> {
        if self.repo_limit == 0 {
            bail!("repo_limit must be at least 1");
        }
        if self.chart_endpoint.trim().is_empty() {
            bail!("chart_endpoint must not be empty");
        }

        let mut seen = HashSet::new();
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| seen.insert(e.clone()))
            .collect();
        let mut extension_languages = IndexMap::with_capacity(self.extension_languages.len());
        for (ext, lang) in &self.extension_languages {
            let norm = normalize_extension(ext);
            if extension_languages.insert(norm.clone(), lang.clone()).is_some() {
                bail!("extension_languages lists {norm} more than once");
            }
        }
        self.extension_languages = extension_languages;

        for ext in &self.allowed_extensions {
            if ext == "." {
                bail!("allowed_extensions contains an empty extension");
            }
            if !self.extension_languages.contains_key(ext) {
                bail!("extension {ext} is counted but maps to no language");
            }
        }
        for lang in self.extension_languages.values() {
            if !self.language_colors.contains_key(lang) {
                bail!("language {lang} has no entry in language_colors");
            }
        }
        Ok(())
    }
}

/// `"JAVA"`, `".Java"` and `" java "` all become `".java"`.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
