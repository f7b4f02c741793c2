use std::path::Path;

use anyhow::{Context, Result};
use ignore::WalkBuilder;

use crate::languages::{LanguageTable, extension_of};
use crate::types::ExtensionTally;

/// Walks every file below `root` and bumps `tally` for counted extensions.
///
/// Hidden files, ignore files and `.git` are all visited; the walk is a
/// plain recursive listing. Siblings are visited in file-name order, so a
/// new extension enters `tally` at the same position on every run.
/// Returns how many files were counted.
///
/// # Errors
/// Returns the first traversal error, with the offending root in context.
pub fn count_extensions(
    root: &Path,
    table: &LanguageTable,
    tally: &mut ExtensionTally,
) -> Result<usize> {
    let mut builder = WalkBuilder::new(root);
    builder.standard_filters(false);
    builder.follow_links(false);
    builder.sort_by_file_name(|a, b| a.cmp(b));

    let mut counted = 0;
    for dent in builder.build() {
        let dent = dent.with_context(|| format!("walk {}", root.display()))?;
        let path = dent.path();
        if !path.is_file() {
            continue;
        }
        let ext = extension_of(path);
        if !table.is_counted(&ext) {
            continue;
        }
        *tally.entry(ext).or_insert(0) += 1;
        counted += 1;
    }
    Ok(counted)
}
