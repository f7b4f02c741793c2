use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::LanguageTally;

/// Compact `{"Language":count,...}` in tally order.
pub fn format(languages: &LanguageTally) -> Result<String> {
    Ok(serde_json::to_string(languages)?)
}

/// Writes the report to `path`, replacing any previous one.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_report(path: &Path, languages: &LanguageTally) -> Result<()> {
    let body = format(languages)?;
    fs::write(path, body).with_context(|| format!("write report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_without_whitespace() {
        let mut langs = LanguageTally::new();
        langs.insert("Java".to_string(), 1);
        langs.insert("C".to_string(), 2);
        assert_eq!(format(&langs).unwrap(), r#"{"Java":1,"C":2}"#);
    }

    #[test]
    fn empty_tally_is_empty_object() {
        assert_eq!(format(&LanguageTally::new()).unwrap(), "{}");
    }

    #[test]
    fn names_are_escaped() {
        let mut langs = LanguageTally::new();
        langs.insert("Objective \"C\"".to_string(), 3);
        assert_eq!(format(&langs).unwrap(), r#"{"Objective \"C\"":3}"#);
    }

    #[test]
    fn report_is_written_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("languageStats.json");
        fs::write(&path, "stale").unwrap();
        let mut langs = LanguageTally::new();
        langs.insert("Dart".to_string(), 5);
        write_report(&path, &langs).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"Dart":5}"#);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_report(&path, &LanguageTally::new()).unwrap_err();
        assert!(format!("{err:#}").contains("out.json"));
    }
}
