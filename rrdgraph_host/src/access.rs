//! Filesystem access checks for matched sources

use rrdgraph_compiler::host::{AccessDecision, AccessPolicy};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file variables available to expressions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileScope {
    pub path: PathBuf,
    pub file_name: String,
    pub stem: String,
    pub parent: PathBuf,
    pub size: u64,
}

impl FileScope {
    pub fn new(path: &Path, size: u64) -> Self {
        let lossy = |s: Option<&std::ffi::OsStr>| {
            s.map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        Self {
            path: path.to_path_buf(),
            file_name: lossy(path.file_name()),
            stem: lossy(path.file_stem()),
            parent: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            size,
        }
    }

    /// Scope for the request target itself, which need not exist yet
    pub fn for_target(path: &Path) -> Self {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        Self::new(path, size)
    }

    /// Look up a variable by name
    pub fn variable(&self, name: &str) -> Option<String> {
        match name {
            "FILE" | "PATH" => Some(self.path.display().to_string()),
            "FILENAME" => Some(self.file_name.clone()),
            "STEM" => Some(self.stem.clone()),
            "DIR" => Some(self.parent.display().to_string()),
            "SIZE" => Some(self.size.to_string()),
            _ => None,
        }
    }
}

/// Allows regular files the process can open, optionally under one root
#[derive(Debug, Clone, Default)]
pub struct ReadableAccess {
    root: Option<PathBuf>,
}

impl ReadableAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confine matches to `root`; symbolic links are resolved before the check
    pub fn within(root: &Path) -> std::io::Result<Self> {
        Ok(Self {
            root: Some(root.canonicalize()?),
        })
    }
}

impl AccessPolicy<FileScope> for ReadableAccess {
    fn check_access(&self, candidate: &Path) -> AccessDecision<FileScope> {
        let denied = |reason: String| AccessDecision::Denied { reason };

        let canonical = match candidate.canonicalize() {
            Ok(path) => path,
            Err(e) => return denied(format!("cannot resolve path: {}", e)),
        };

        if let Some(root) = &self.root {
            if !canonical.starts_with(root) {
                return denied(format!("outside of {}", root.display()));
            }
        }

        let metadata = match fs::metadata(&canonical) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return denied(format!("permission denied: {}", e))
            }
            Err(e) => return denied(format!("failed to get metadata: {}", e)),
        };

        if !metadata.is_file() {
            return denied("not a regular file".to_string());
        }

        if let Err(e) = fs::File::open(&canonical) {
            return denied(format!("not readable: {}", e));
        }

        AccessDecision::Allowed(FileScope::new(candidate, metadata.len()))
    }
}
