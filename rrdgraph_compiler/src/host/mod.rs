//! Collaborator seams between the compiler and its host
//!
//! The compiler never touches the filesystem, evaluates expressions or runs
//! the renderer itself. Hosts supply these behaviours through the traits in
//! this module; `rrdgraph_host` ships the filesystem-backed defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// VALUE TYPES
// ============================================================================

/// Host-defined string expression, evaluated against a scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Expression(String);

impl Expression {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of a rendering option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Literal(String),
    Dynamic(Expression),
}

/// Variables visible to expression evaluation for one compile
///
/// Seeded from the request and extended by environment mappings while
/// sources are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    values: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One request being compiled
#[derive(Debug, Clone)]
pub struct RequestContext<S> {
    /// Identifier attached to every log event of this compile
    pub id: String,
    /// Resolved filesystem target of the request, e.g. `/srv/graphs/load.png`
    pub target: PathBuf,
    /// Scope used for request-level expression evaluation
    pub scope: S,
    pub environment: Environment,
}

impl<S> RequestContext<S> {
    pub fn new(target: impl Into<PathBuf>, scope: S) -> Self {
        let target = target.into();
        Self {
            id: target.display().to_string(),
            target,
            scope,
            environment: Environment::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Directory source patterns are matched against when no directory
    /// expression is configured
    pub fn base_directory(&self) -> &Path {
        self.target.parent().unwrap_or_else(|| Path::new(""))
    }
}

// ============================================================================
// COLLABORATOR ERRORS
// ============================================================================

/// Malformed file pattern
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pattern '{pattern}': {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

impl PatternError {
    pub fn new(pattern: &str, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
}

/// Expression evaluation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not evaluate '{expression}': {message}")]
pub struct EvaluationError {
    pub expression: String,
    pub message: String,
}

impl EvaluationError {
    pub fn new(expression: &Expression, message: impl Into<String>) -> Self {
        Self {
            expression: expression.as_str().to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of an access check on one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision<S> {
    Allowed(S),
    Denied { reason: String },
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Recursive glob-style file enumeration
pub trait PathMatcher: Send + Sync {
    fn match_files(&self, base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, PatternError>;
}

/// Per-file access check producing an evaluation scope
pub trait AccessPolicy<S>: Send + Sync {
    fn check_access(&self, candidate: &Path) -> AccessDecision<S>;
}

/// String expression engine
pub trait ExpressionEvaluator<S>: Send + Sync {
    fn evaluate(
        &self,
        expression: &Expression,
        scope: &S,
        environment: &Environment,
    ) -> Result<String, EvaluationError>;
}

/// External graph renderer; not reentrant, always called through `RenderGate`
pub trait Renderer {
    fn render(&self, args: &[String]) -> Result<Vec<u8>, String>;
}

/// Bundle of collaborators borrowed for one compile
pub struct Collaborators<'a, S> {
    pub matcher: &'a dyn PathMatcher,
    pub access: &'a dyn AccessPolicy<S>,
    pub evaluator: &'a dyn ExpressionEvaluator<S>,
}

impl<'a, S> Collaborators<'a, S> {
    pub fn new(
        matcher: &'a dyn PathMatcher,
        access: &'a dyn AccessPolicy<S>,
        evaluator: &'a dyn ExpressionEvaluator<S>,
    ) -> Self {
        Self {
            matcher,
            access,
            evaluator,
        }
    }
}

impl<S> Clone for Collaborators<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Collaborators<'_, S> {}
