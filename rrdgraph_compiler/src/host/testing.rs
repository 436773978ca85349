//! In-memory collaborators for unit tests

use super::*;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Scope handed out by [`ListedAccess`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestScope {
    pub path: PathBuf,
    pub name: String,
}

impl TestScope {
    pub fn for_path(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Matcher answering from a fixed pattern table
#[derive(Default)]
pub struct StaticMatcher {
    results: HashMap<String, Vec<PathBuf>>,
    broken: HashSet<String>,
}

impl StaticMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, pattern: &str, files: &[&str]) -> Self {
        self.results
            .insert(pattern.to_string(), files.iter().map(PathBuf::from).collect());
        self
    }

    pub fn broken(mut self, pattern: &str) -> Self {
        self.broken.insert(pattern.to_string());
        self
    }
}

impl PathMatcher for StaticMatcher {
    fn match_files(&self, base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
        if self.broken.contains(pattern) {
            return Err(PatternError::new(pattern, "unbalanced bracket"));
        }
        Ok(self
            .results
            .get(pattern)
            .map(|files| files.iter().map(|f| base_dir.join(f)).collect())
            .unwrap_or_default())
    }
}

/// Allows everything except the listed file names
#[derive(Default)]
pub struct ListedAccess {
    denied: HashSet<String>,
}

impl ListedAccess {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn deny(mut self, file_name: &str) -> Self {
        self.denied.insert(file_name.to_string());
        self
    }
}

impl AccessPolicy<TestScope> for ListedAccess {
    fn check_access(&self, candidate: &Path) -> AccessDecision<TestScope> {
        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.denied.contains(&name) {
            AccessDecision::Denied {
                reason: "forbidden".to_string(),
            }
        } else {
            AccessDecision::Allowed(TestScope::for_path(candidate))
        }
    }
}

/// Replaces `{name}` with the scope name and `{env.KEY}` with environment
/// values; any expression containing `!fail` is an error
pub struct BraceEvaluator;

impl ExpressionEvaluator<TestScope> for BraceEvaluator {
    fn evaluate(
        &self,
        expression: &Expression,
        scope: &TestScope,
        environment: &Environment,
    ) -> Result<String, EvaluationError> {
        if expression.as_str().contains("!fail") {
            return Err(EvaluationError::new(expression, "forced failure"));
        }
        let mut value = expression.as_str().replace("{name}", &scope.name);
        for (key, env_value) in environment.iter() {
            value = value.replace(&format!("{{env.{}}}", key), env_value);
        }
        Ok(value)
    }
}

/// Renderer recording each invocation
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Mutex<Vec<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl Renderer for RecordingRenderer {
    fn render(&self, args: &[String]) -> Result<Vec<u8>, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        match &self.fail_with {
            Some(message) => Err(message.clone()),
            None => Ok(b"\x89PNG".to_vec()),
        }
    }
}

pub fn request(target: &str) -> RequestContext<TestScope> {
    RequestContext::new(target, TestScope::for_path(Path::new(target)))
}
