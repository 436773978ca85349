//! Rendering option whitelist
//!
//! Only the options listed here reach the renderer. `daemon` is left out so
//! a request can never redirect the renderer to a caching daemon.

use crate::host::{Expression, OptionValue};

/// Whether an option is written `--key value` or just `--key`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionArity {
    RequiresValue,
    NoValue,
}

const OPTION_TABLE: &[(&str, OptionArity)] = &[
    ("alt-autoscale", OptionArity::NoValue),
    ("alt-autoscale-max", OptionArity::NoValue),
    ("alt-autoscale-min", OptionArity::NoValue),
    ("alt-y-grid", OptionArity::NoValue),
    ("base", OptionArity::RequiresValue),
    ("border", OptionArity::RequiresValue),
    ("color", OptionArity::RequiresValue),
    ("disable-rrdtool-tag", OptionArity::NoValue),
    ("dynamic-labels", OptionArity::NoValue),
    ("end", OptionArity::RequiresValue),
    ("font", OptionArity::RequiresValue),
    ("font-render-mode", OptionArity::RequiresValue),
    ("font-smoothing-threshold", OptionArity::RequiresValue),
    ("force-rules-legend", OptionArity::NoValue),
    ("full-size-mode", OptionArity::NoValue),
    ("graph-render-mode", OptionArity::RequiresValue),
    ("height", OptionArity::RequiresValue),
    ("interlaced", OptionArity::NoValue),
    ("lazy", OptionArity::NoValue),
    ("left-axis-format", OptionArity::RequiresValue),
    ("logarithmic", OptionArity::NoValue),
    ("lower-limit", OptionArity::RequiresValue),
    ("no-gridfit", OptionArity::NoValue),
    ("no-legend", OptionArity::NoValue),
    ("only-graph", OptionArity::NoValue),
    ("pango-markup", OptionArity::NoValue),
    ("right-axis", OptionArity::RequiresValue),
    ("right-axis-format", OptionArity::RequiresValue),
    ("right-axis-label", OptionArity::RequiresValue),
    ("rigid", OptionArity::NoValue),
    ("slope-mode", OptionArity::NoValue),
    ("start", OptionArity::RequiresValue),
    ("step", OptionArity::RequiresValue),
    ("tabwidth", OptionArity::RequiresValue),
    ("title", OptionArity::RequiresValue),
    ("units", OptionArity::RequiresValue),
    ("units-exponent", OptionArity::RequiresValue),
    ("units-length", OptionArity::RequiresValue),
    ("upper-limit", OptionArity::RequiresValue),
    ("use-nan-for-all-missing-data", OptionArity::NoValue),
    ("vertical-label", OptionArity::RequiresValue),
    ("watermark", OptionArity::RequiresValue),
    ("width", OptionArity::RequiresValue),
    ("x-grid", OptionArity::RequiresValue),
    ("y-grid", OptionArity::RequiresValue),
    ("zoom", OptionArity::RequiresValue),
];

/// A whitelisted option with its value, if it takes one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOption {
    pub key: &'static str,
    pub value: Option<OptionValue>,
}

impl GraphOption {
    /// Renderer flag, e.g. `--title`
    pub fn flag(&self) -> String {
        format!("--{}", self.key)
    }
}

/// Look a key up in the whitelist, returning its canonical name and arity
pub fn lookup_option(key: &str) -> Option<(&'static str, OptionArity)> {
    OPTION_TABLE
        .binary_search_by(|(name, _)| (*name).cmp(key))
        .ok()
        .map(|idx| OPTION_TABLE[idx])
}

/// Every recognised option name
pub fn known_options() -> impl Iterator<Item = &'static str> {
    OPTION_TABLE.iter().map(|(name, _)| *name)
}

/// Validate `key` / `value` against the whitelist
///
/// A dynamic expression counts as a value and replaces any literal one.
/// Unknown keys and arity mismatches both return `None`.
pub fn parse_option(key: &str, value: Option<&str>, expr: Option<Expression>) -> Option<GraphOption> {
    let (name, arity) = lookup_option(key)?;
    let has_value = value.is_some() || expr.is_some();

    match (arity, has_value) {
        (OptionArity::RequiresValue, true) => {
            let value = match expr {
                Some(expression) => OptionValue::Dynamic(expression),
                None => OptionValue::Literal(value.unwrap_or_default().to_string()),
            };
            Some(GraphOption {
                key: name,
                value: Some(value),
            })
        }
        (OptionArity::NoValue, false) => Some(GraphOption {
            key: name,
            value: None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_for_lookup() {
        let names: Vec<_> = known_options().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 46);
    }

    #[test]
    fn test_value_option() {
        let option = parse_option("title", Some("Hello"), None).unwrap();
        assert_eq!(option.key, "title");
        assert_eq!(option.flag(), "--title");
        assert_eq!(option.value, Some(OptionValue::Literal("Hello".to_string())));
    }

    #[test]
    fn test_flag_option() {
        let option = parse_option("rigid", None, None).unwrap();
        assert_eq!(option.value, None);
    }

    #[test]
    fn test_arity_mismatches_miss() {
        assert!(parse_option("rigid", Some("yes"), None).is_none());
        assert!(parse_option("title", None, None).is_none());
        assert!(parse_option("upper-limit", None, None).is_none());
    }

    #[test]
    fn test_expression_takes_precedence() {
        let option = parse_option("title", Some("literal"), Some(Expression::new("%{HOST}"))).unwrap();
        assert_eq!(
            option.value,
            Some(OptionValue::Dynamic(Expression::new("%{HOST}")))
        );

        let option = parse_option("width", None, Some(Expression::new("%{WIDTH}"))).unwrap();
        assert!(matches!(option.value, Some(OptionValue::Dynamic(_))));
    }

    #[test]
    fn test_daemon_and_unknown_keys_are_rejected() {
        assert!(parse_option("daemon", Some("unix:/tmp/rrdcached.sock"), None).is_none());
        assert!(parse_option("Title", Some("x"), None).is_none());
        assert!(parse_option("", None, None).is_none());
    }
}
