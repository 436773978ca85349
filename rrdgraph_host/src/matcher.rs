//! Filesystem source matching
//!
//! A pattern is a `/`-separated path whose segments may hold `*`, `?` and
//! `[...]` / `[!...]` classes. Leading literal segments are
//! joined onto the base directory; the remaining segments are matched one
//! directory level each while walking.

use glob::{MatchOptions, Pattern};
use rrdgraph_compiler::host::{PathMatcher, PatternError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Glob matcher over the local filesystem
#[derive(Debug, Clone)]
pub struct FsPathMatcher {
    follow_links: bool,
}

impl Default for FsPathMatcher {
    fn default() -> Self {
        Self { follow_links: true }
    }
}

impl FsPathMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not descend through symbolic links
    pub fn without_links(mut self) -> Self {
        self.follow_links = false;
        self
    }
}

impl PathMatcher for FsPathMatcher {
    fn match_files(&self, base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
        let mut root = base_dir.to_path_buf();
        if pattern.starts_with('/') {
            root = PathBuf::from("/");
        }

        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let literal = segments
            .iter()
            .take_while(|segment| !has_wildcard(segment))
            .count();
        for segment in &segments[..literal] {
            root.push(segment);
        }

        let matchers = segments[literal..]
            .iter()
            .map(|segment| {
                segment_pattern(segment).map_err(|e| PatternError::new(pattern, e.to_string()))
            })
            .collect::<Result<Vec<Pattern>, PatternError>>()?;

        if matchers.is_empty() {
            return Ok(if root.is_file() { vec![root] } else { Vec::new() });
        }

        let depth = matchers.len();
        let found = WalkDir::new(&root)
            .follow_links(self.follow_links)
            .max_depth(depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let level = entry.depth();
                level == 0
                    || matchers[level - 1]
                        .matches_with(&entry.file_name().to_string_lossy(), SEGMENT_OPTIONS)
            })
            .filter_map(Result::ok)
            .filter(|entry| entry.depth() == depth && entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        Ok(found)
    }
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

const SEGMENT_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compile one glob segment
pub fn segment_pattern(segment: &str) -> Result<Pattern, glob::PatternError> {
    Pattern::new(segment)
}
