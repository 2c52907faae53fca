//! Batch Processing Module
//!
//! Collects the direct children of a folder whose extension matches a
//! whitelist, ordered by base name (case-insensitive) so every run processes
//! and reports files in the same order.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const HEIF_EXTENSIONS: &[&str] = &["heic", "heif"];

#[derive(Debug, thiserror::Error)]
#[error("Cannot read directory {}: {source}", path.display())]
pub struct CollectError {
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// 检查文件扩展名是否在给定列表中（不区分大小写）
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lower-cased file stem used as the processing order key.
pub fn base_name_key(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Dot-files, including macOS `._name` resource forks.
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn compare_by_base_name(a: &Path, b: &Path) -> Ordering {
    base_name_key(a)
        .cmp(&base_name_key(b))
        .then_with(|| a.file_name().cmp(&b.file_name()))
}

/// Non-recursive: only direct children of `dir` are considered. Symlinks
/// are followed, so a link to a file counts as a file; the returned path is
/// the link's own path.
///
/// An unreadable `dir` is an error; an unreadable child entry is skipped
/// with a warning.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, CollectError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(0).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(CollectError {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if entry.depth() == 0 || !entry.file_type().is_file() || is_hidden(entry.path()) {
            continue;
        }
        if has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| compare_by_base_name(a, b));
    Ok(files)
}
