//! Text artifact access relative to the project root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read a whole artifact as UTF-8 text
pub fn read_artifact(root: &Path, relative: &str) -> io::Result<String> {
    fs::read_to_string(root.join(relative))
}

/// Expand a glob pattern under `root` into sorted paths relative to `root`.
///
/// Only `pattern` is interpreted as a glob; `root` is matched literally.
/// Unreadable directory entries are ignored.
pub fn expand_glob(root: &Path, pattern: &str) -> Result<Vec<String>, glob::PatternError> {
    let full = Path::new(&glob::Pattern::escape(&root.to_string_lossy())).join(pattern);
    let mut matches: Vec<String> = glob::glob(&full.to_string_lossy())?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .map(|path| relative_to(root, &path))
        .collect();
    matches.sort();
    Ok(matches)
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(PathBuf::from)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .replace('\\', "/")
}
