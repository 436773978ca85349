//! `%{NAME}` template expressions
//!
//! A name is looked up in the file scope first (`FILE`, `FILENAME`, `STEM`,
//! `DIR`, `SIZE`), then in the compile's environment. `%%` is a literal `%`.

use crate::access::FileScope;
use rrdgraph_compiler::host::{Environment, EvaluationError, Expression, ExpressionEvaluator};

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEvaluator;

impl TemplateEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator<FileScope> for TemplateEvaluator {
    fn evaluate(
        &self,
        expression: &Expression,
        scope: &FileScope,
        environment: &Environment,
    ) -> Result<String, EvaluationError> {
        let source = expression.as_str();
        let mut out = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(idx) = rest.find('%') {
            out.push_str(&rest[..idx]);
            let tail = &rest[idx + 1..];

            if let Some(after) = tail.strip_prefix('%') {
                out.push('%');
                rest = after;
            } else if let Some(body) = tail.strip_prefix('{') {
                let end = body.find('}').ok_or_else(|| {
                    EvaluationError::new(expression, "unterminated '%{' in expression")
                })?;
                let name = &body[..end];
                let value = scope
                    .variable(name)
                    .or_else(|| environment.get(name).map(str::to_string))
                    .ok_or_else(|| {
                        EvaluationError::new(expression, format!("unknown variable '{}'", name))
                    })?;
                out.push_str(&value);
                rest = &body[end + 1..];
            } else {
                out.push('%');
                rest = tail;
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scope() -> FileScope {
        FileScope::new(Path::new("/srv/rrd/web1/load.rrd"), 42)
    }

    fn eval(source: &str, environment: &Environment) -> Result<String, EvaluationError> {
        TemplateEvaluator.evaluate(&Expression::new(source), &scope(), environment)
    }

    #[test]
    fn test_scope_and_environment_variables() {
        let environment: Environment = [("HOST".to_string(), "web1".to_string())]
            .into_iter()
            .collect();

        assert_eq!(
            eval("%{HOST}: %{STEM} (%{SIZE} bytes)", &environment).unwrap(),
            "web1: load (42 bytes)"
        );
        assert_eq!(eval("%{DIR}/*.rrd", &environment).unwrap(), "/srv/rrd/web1/*.rrd");
        assert_eq!(eval("100%% of %d", &environment).unwrap(), "100% of %d");
    }

    #[test]
    fn test_errors() {
        let environment = Environment::new();
        let err = eval("%{MISSING}", &environment).unwrap_err();
        assert!(err.message.contains("MISSING"));
        assert_eq!(err.expression, "%{MISSING}");

        assert!(eval("%{STEM", &environment).is_err());
    }
}
