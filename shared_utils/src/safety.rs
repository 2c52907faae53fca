//! Safety Module
//!
//! Guards the destructive "clear output folder" step against obviously wrong
//! targets: protected system directories and the folder holding the inputs.

use std::path::{Path, PathBuf};

const DANGEROUS_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/tmp",
    "/opt",
];

fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

pub fn check_dangerous_directory(path: &Path) -> Result<(), String> {
    let canonical = canonical_or_self(path);

    for dangerous in DANGEROUS_DIRS {
        if path == Path::new(dangerous) || canonical == Path::new(dangerous) {
            return Err(format!(
                "'{}' is a protected system directory",
                path.display()
            ));
        }
    }

    let components = canonical.components().count();
    let path_str = canonical.to_string_lossy();
    if components <= 3 && (path_str.starts_with("/Users/") || path_str.starts_with("/home/")) {
        return Err(format!(
            "'{}' is too close to a home directory root",
            path.display()
        ));
    }

    Ok(())
}

/// Refuses a clear target that is, or contains, the source folder.
pub fn check_safe_to_clear(output: &Path, source: &Path) -> Result<(), String> {
    check_dangerous_directory(output)?;

    let output = canonical_or_self(output);
    let source = canonical_or_self(source);
    if source.starts_with(&output) {
        return Err(format!(
            "clearing '{}' would delete the source folder '{}'",
            output.display(),
            source.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dangerous_directories() {
        assert!(check_dangerous_directory(Path::new("/")).is_err());
        assert!(check_dangerous_directory(Path::new("/System")).is_err());
        assert!(check_dangerous_directory(Path::new("/usr")).is_err());
        assert!(check_dangerous_directory(Path::new("/home/alice")).is_err());
    }

    #[test]
    fn test_safe_directories() {
        assert!(check_dangerous_directory(Path::new("/Users/test/Documents/photos")).is_ok());
    }

    #[test]
    fn test_clear_refuses_source_folder() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("images");
        std::fs::create_dir(&source).unwrap();

        assert!(check_safe_to_clear(&source, &source).is_err());
        assert!(check_safe_to_clear(dir.path(), &source).is_err());
    }

    #[test]
    fn test_clear_allows_sibling_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        let output = dir.path().join("output");
        std::fs::create_dir(&source).unwrap();
        std::fs::create_dir(&output).unwrap();

        assert!(check_safe_to_clear(&output, &source).is_ok());
    }
}
