//! Command set construction
//!
//! Merges the configured graph description with request-supplied elements
//! and options. Configuration always comes first, in configured order; the
//! request follows in query order.

pub mod error;

use crate::config::compile_time::limits::{MAX_ELEMENTS_PER_REQUEST, MAX_QUERY_LENGTH};
use crate::elements::{parse_element, Command};
use crate::formats::ImageFormat;
use crate::host::Expression;
use crate::logging::codes;
use crate::options::{parse_option, GraphOption};
use percent_encoding::percent_decode_str;

pub use error::{ConfigurationError, QueryError};

/// Named expression whose distinct per-match values are exported into the
/// compile environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentMapping {
    pub key: String,
    pub expression: Expression,
}

/// Statically configured graph description, shared by every request
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    format: Option<ImageFormat>,
    options: Vec<GraphOption>,
    commands: Vec<Command>,
    environment: Vec<EnvironmentMapping>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the output format by renderer name (`PNG`, `jsontime`, ...)
    pub fn set_format_name(&mut self, name: &str) -> Result<(), ConfigurationError> {
        let format =
            ImageFormat::from_name(name).ok_or_else(|| ConfigurationError::unknown_format(name))?;
        self.format = Some(format);
        Ok(())
    }

    /// Add a configured element with optional expressions
    pub fn add_element(
        &mut self,
        raw: &str,
        expr1: Option<Expression>,
        expr2: Option<Expression>,
    ) -> Result<(), ConfigurationError> {
        let command = parse_element(raw, expr1, expr2).ok_or_else(|| {
            crate::log_error!(codes::configuration::INVALID_ELEMENT,
                "Configured element was not recognised",
                element = raw
            );
            ConfigurationError::invalid_element(raw)
        })?;
        self.commands.push(command);
        Ok(())
    }

    /// Add a configured option; an expression makes the value dynamic
    pub fn add_option(
        &mut self,
        key: &str,
        value: Option<&str>,
        expression: Option<Expression>,
    ) -> Result<(), ConfigurationError> {
        let option = parse_option(key, value, expression).ok_or_else(|| {
            crate::log_error!(codes::configuration::INVALID_OPTION,
                "Configured option was not recognised",
                element = key
            );
            ConfigurationError::invalid_option(key)
        })?;
        self.options.push(option);
        Ok(())
    }

    /// Add or replace an environment mapping
    pub fn add_environment(&mut self, key: &str, expression: Expression) {
        match self.environment.iter_mut().find(|m| m.key == key) {
            Some(existing) => existing.expression = expression,
            None => self.environment.push(EnvironmentMapping {
                key: key.to_string(),
                expression,
            }),
        }
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn options(&self) -> &[GraphOption] {
        &self.options
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn environment(&self) -> &[EnvironmentMapping] {
        &self.environment
    }
}

/// Everything one request compiles
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    pub options: Vec<GraphOption>,
    pub commands: Vec<Command>,
    pub environment: Vec<EnvironmentMapping>,
}

impl CommandSet {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Build the command set for one request
pub fn build_command_set(
    configuration: &Configuration,
    query: &str,
) -> Result<CommandSet, QueryError> {
    if query.len() > MAX_QUERY_LENGTH {
        let err = QueryError::query_too_large(query.len(), MAX_QUERY_LENGTH);
        crate::log_error!(err.error_code(), "Query string too large",
            "length" => query.len(),
            "limit" => MAX_QUERY_LENGTH
        );
        return Err(err);
    }

    let pieces: Vec<&str> = query.split('&').filter(|piece| !piece.is_empty()).collect();
    if pieces.len() > MAX_ELEMENTS_PER_REQUEST {
        let err = QueryError::too_many_elements(pieces.len(), MAX_ELEMENTS_PER_REQUEST);
        crate::log_error!(err.error_code(), "Too many query elements",
            "count" => pieces.len(),
            "limit" => MAX_ELEMENTS_PER_REQUEST
        );
        return Err(err);
    }

    let mut command_set = CommandSet {
        options: configuration.options().to_vec(),
        commands: configuration.commands().to_vec(),
        environment: configuration.environment().to_vec(),
    };

    for piece in pieces {
        let element = decode_element(piece)?;

        if let Some(command) = parse_element(&element, None, None) {
            command_set.commands.push(command);
            continue;
        }

        let (key, value) = match element.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (element.as_str(), None),
        };

        if let Some(option) = parse_option(key, value, None) {
            command_set.options.push(option);
            continue;
        }

        crate::log_error!(codes::query::UNRECOGNIZED_ELEMENT, "Query was not recognised",
            element = piece
        );
        return Err(QueryError::unrecognized_element(piece));
    }

    crate::log_success!(codes::success::COMMAND_SET_BUILT, "Command set built",
        "commands" => command_set.commands.len(),
        "options" => command_set.options.len(),
        "configured_commands" => configuration.commands().len()
    );

    Ok(command_set)
}

/// URL-decode one query piece, rejecting malformed escapes and NUL bytes
pub fn decode_element(piece: &str) -> Result<String, QueryError> {
    let bytes = piece.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let well_formed = bytes
                .get(idx + 1..idx + 3)
                .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !well_formed {
                return Err(malformed(piece));
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }

    let decoded = percent_decode_str(piece)
        .decode_utf8()
        .map_err(|_| malformed(piece))?;

    if decoded.contains('\0') {
        return Err(malformed(piece));
    }

    Ok(decoded.into_owned())
}

fn malformed(piece: &str) -> QueryError {
    crate::log_error!(codes::query::MALFORMED_ENCODING,
        "The following element could not be unescaped",
        element = piece
    );
    QueryError::malformed_encoding(piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OptionValue;
    use assert_matches::assert_matches;

    fn configured() -> Configuration {
        let mut configuration = Configuration::new().with_format(ImageFormat::Png);
        configuration
            .add_element("DEF:x=*.rrd:util:AVERAGE", None, None)
            .unwrap();
        configuration.add_option("rigid", None, None).unwrap();
        configuration
    }

    #[test]
    fn test_configuration_precedes_request() {
        let set = build_command_set(&configured(), "LINE1:x#00ff00:load&title=Hello").unwrap();

        assert_eq!(set.commands.len(), 2);
        assert_matches!(set.commands[0], Command::Def(_));
        assert_matches!(set.commands[1], Command::Line(_));
        assert_eq!(set.options[0].key, "rigid");
        assert_eq!(set.options[1].key, "title");
        assert_eq!(
            set.options[1].value,
            Some(OptionValue::Literal("Hello".to_string()))
        );
    }

    #[test]
    fn test_empty_pieces_are_skipped() {
        let set = build_command_set(&Configuration::new(), "&&rigid&").unwrap();
        assert_eq!(set.options.len(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_pieces_are_url_decoded() {
        let set = build_command_set(&Configuration::new(), "title=Load%20%26%20CPU&COMMENT:a%3Ab")
            .unwrap();
        assert_eq!(
            set.options[0].value,
            Some(OptionValue::Literal("Load & CPU".to_string()))
        );
        assert_matches!(&set.commands[0], Command::Comment(c) => assert_eq!(c.text, "a"));
    }

    #[test]
    fn test_unrecognised_piece_is_named() {
        let err = build_command_set(&Configuration::new(), "rigid&FOO:bar").unwrap_err();
        assert_eq!(err, QueryError::unrecognized_element("FOO:bar"));
    }

    #[test]
    fn test_daemon_option_is_rejected() {
        let err = build_command_set(&Configuration::new(), "daemon=unix:/tmp/sock").unwrap_err();
        assert_matches!(err, QueryError::UnrecognizedElement { .. });
    }

    #[test]
    fn test_malformed_escapes() {
        assert_matches!(decode_element("title=%zz"), Err(QueryError::MalformedEncoding { .. }));
        assert_matches!(decode_element("title=50%"), Err(QueryError::MalformedEncoding { .. }));
        assert_matches!(decode_element("title=%00"), Err(QueryError::MalformedEncoding { .. }));
        assert_matches!(decode_element("title=%ff"), Err(QueryError::MalformedEncoding { .. }));
        assert_eq!(decode_element("title=a+b").unwrap(), "title=a+b");
    }

    #[test]
    fn test_query_limits() {
        let huge = "a".repeat(MAX_QUERY_LENGTH + 1);
        assert_matches!(
            build_command_set(&Configuration::new(), &huge),
            Err(QueryError::QueryTooLarge { .. })
        );

        let many = vec!["rigid"; MAX_ELEMENTS_PER_REQUEST + 1].join("&");
        if many.len() <= MAX_QUERY_LENGTH {
            assert_matches!(
                build_command_set(&Configuration::new(), &many),
                Err(QueryError::TooManyElements { .. })
            );
        }
    }

    #[test]
    fn test_configuration_rejects_bad_input() {
        let mut configuration = Configuration::new();
        assert_matches!(
            configuration.add_element("BOGUS:x", None, None),
            Err(ConfigurationError::InvalidElement { .. })
        );
        assert_matches!(
            configuration.add_option("title", None, None),
            Err(ConfigurationError::InvalidOption { .. })
        );
        assert_matches!(
            configuration.set_format_name("gif"),
            Err(ConfigurationError::UnknownFormat { .. })
        );
        configuration.set_format_name("svg").unwrap();
        assert_eq!(configuration.format(), Some(ImageFormat::Svg));
    }

    #[test]
    fn test_environment_mapping_replaces_by_key() {
        let mut configuration = Configuration::new();
        configuration.add_environment("HOSTS", Expression::new("{name}"));
        configuration.add_environment("HOSTS", Expression::new("{env.SITE}"));
        assert_eq!(configuration.environment().len(), 1);
        assert_eq!(configuration.environment()[0].expression.as_str(), "{env.SITE}");
    }
}
