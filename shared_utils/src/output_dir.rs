//! Output folder lifecycle: create-if-missing, then optionally clear.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The single entry that survives a clear. Matched literally.
pub const KEEP_FILE_NAME: &str = "README.md";

#[derive(Debug, thiserror::Error)]
pub enum OutputDirError {
    #[error("Cannot create output folder {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot clear output folder {}: {source}", path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ensures `dir` exists (parents included). When `clear` is set, removes
/// every entry except a file named exactly [`KEEP_FILE_NAME`] and returns
/// how many entries were removed.
pub fn prepare_output_dir(dir: &Path, clear: bool) -> Result<usize, OutputDirError> {
    fs::create_dir_all(dir).map_err(|source| OutputDirError::Create {
        path: dir.to_path_buf(),
        source,
    })?;

    if !clear {
        return Ok(0);
    }

    clear_dir_except_readme(dir).map_err(|source| OutputDirError::Clear {
        path: dir.to_path_buf(),
        source,
    })
}

fn clear_dir_except_readme(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_file() && entry.file_name() == KEEP_FILE_NAME {
            continue;
        }

        if file_type.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        tracing::debug!(path = ?path, "Removed");
        removed += 1;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_creates_missing_nested_folder() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("a").join("b").join("out");

        assert_eq!(prepare_output_dir(&out, true).unwrap(), 0);
        assert!(out.is_dir());
    }

    #[test]
    fn test_clear_keeps_only_readme() {
        let dir = TempDir::new().unwrap();
        let out = dir.path();
        fs::write(out.join("README.md"), "keep me").unwrap();
        fs::write(out.join("old.png"), b"png").unwrap();
        fs::write(out.join("notes.txt"), b"txt").unwrap();
        fs::create_dir(out.join("stale")).unwrap();
        fs::write(out.join("stale").join("x.pdf"), b"pdf").unwrap();

        let removed = prepare_output_dir(out, true).unwrap();

        assert_eq!(removed, 3);
        assert_eq!(entries(out), vec!["README.md"]);
        assert_eq!(fs::read_to_string(out.join("README.md")).unwrap(), "keep me");
    }

    #[test]
    fn test_readme_match_is_literal() {
        let dir = TempDir::new().unwrap();
        let out = dir.path();
        fs::write(out.join("readme.md"), "lower").unwrap();
        fs::write(out.join("README.md.bak"), "bak").unwrap();

        prepare_output_dir(out, true).unwrap();
        assert!(entries(out).is_empty());
    }

    #[test]
    fn test_no_clear_leaves_contents() {
        let dir = TempDir::new().unwrap();
        let out = dir.path();
        fs::write(out.join("old.png"), b"png").unwrap();

        assert_eq!(prepare_output_dir(out, false).unwrap(), 0);
        assert_eq!(entries(out), vec!["old.png"]);
    }

    #[test]
    fn test_output_path_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"x").unwrap();

        let err = prepare_output_dir(&file, true).unwrap_err();
        assert!(matches!(err, OutputDirError::Create { .. }));
    }
}
