#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use crate::pod::error::{PodError, PodResult};
use crate::pod::format::ARCHIVE_EXT;

/// Archive separator.
pub const POD_SEPARATOR: char = '\\';

/// Turn a backslash-separated archive path into a relative host path.
/// Names that would land outside the output directory are rejected.
pub fn to_host_path(name: &str) -> PodResult<PathBuf> {
    let unsafe_path = || PodError::UnsafePath {
        name: name.to_string(),
    };

    let mut out = PathBuf::new();
    for seg in name.split([POD_SEPARATOR, '/']) {
        match seg {
            "" | "." => continue,
            ".." => return Err(unsafe_path()),
            s if s.contains(':') => return Err(unsafe_path()),
            s => out.push(s),
        }
    }

    if out.as_os_str().is_empty() {
        return Err(unsafe_path());
    }
    Ok(out)
}

pub fn is_pod_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ARCHIVE_EXT))
}

/// Subdirectory name for an archive's output: its file stem.
pub fn archive_dir_name(path: &Path) -> PodResult<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PodError::Invalid(format!("no file name: {}", path.display())))
}

/// Output directory for `pod`: its stem under `output`, below the same
/// subdirectories `pod` sits in relative to `input_root`.
pub fn archive_output_dir(input_root: Option<&Path>, pod: &Path, output: &Path) -> PodResult<PathBuf> {
    let mut dest = output.to_path_buf();
    if let (Some(root), Some(parent)) = (input_root, pod.parent()) {
        if let Ok(rel) = parent.strip_prefix(root) {
            dest.push(rel);
        }
    }
    dest.push(archive_dir_name(pod)?);
    Ok(dest)
}

pub fn matches_filter(name: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|f| !f.is_empty() && name.contains(f.as_str()))
}
