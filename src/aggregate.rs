use crate::languages::LanguageTable;
use crate::types::{ExtensionTally, LanguageTally};

/// Folds extension counts into display languages.
///
/// Languages appear in the order their first extension appears in
/// `extensions`; extensions without a language are dropped.
pub fn aggregate(extensions: &ExtensionTally, table: &LanguageTable) -> LanguageTally {
    let mut languages = LanguageTally::new();
    for (ext, &count) in extensions {
        let Some(lang) = table.language_for(ext) else {
            log::debug!("no language for {ext}; dropping {count} files");
            continue;
        };
        *languages.entry(lang.to_string()).or_insert(0) += count;
    }
    languages
}
