//! Renderer argument generation
//!
//! Walks resolved commands in declaration order. A source with several
//! matches fans out into per-instance names (`{vname}w{j}`), gets an
//! aggregate `CDEF` under its own name, and every dependent command is
//! repeated per instance. `PRINT`/`GPRINT` commands directly following a
//! fanned-out series are inlined after each instance.

pub mod cursor;
pub mod error;

use crate::config::runtime::CompilerPreferences;
use crate::elements::{Annotation, Command, CommandKind, PrintDef, Rule, SourceDef};
use crate::escape::{escape_colons, escape_path};
use crate::formats::ImageFormat;
use crate::host::{Collaborators, Expression, ExpressionEvaluator, OptionValue, RequestContext};
use crate::logging::codes;
use crate::resolution::{Link, Resolved, SourceHandle};

pub use cursor::CommandCursor;
pub use error::GenerationError;

/// Program name and output target that open every argument list
pub const PRELUDE: [&str; 2] = ["rrdgraph", "-"];

/// Per-instance variable name
pub fn instance_name(vname: &str, instance: usize) -> String {
    format!("{}w{}", vname, instance)
}

/// Generate the complete renderer argument list
pub fn generate<S>(
    resolved: &Resolved<S>,
    format: ImageFormat,
    request: &RequestContext<S>,
    collaborators: &Collaborators<'_, S>,
    preferences: &CompilerPreferences,
) -> Result<Vec<String>, GenerationError> {
    let mut generator = Generator {
        resolved,
        request,
        evaluator: collaborators.evaluator,
        args: Vec::new(),
    };

    generator.emit_prelude(format);
    generator.emit_options()?;
    generator.emit_commands()?;

    let args = generator.args;

    if preferences.log_generated_arguments {
        for (index, argument) in args.iter().enumerate() {
            crate::log_debug!("Generated argument", "index" => index, "argument" => argument);
        }
    }

    crate::log_success!(codes::success::GENERATION_COMPLETE, "Renderer arguments generated",
        "arguments" => args.len(),
        "format" => format
    );

    Ok(args)
}

struct Generator<'a, S> {
    resolved: &'a Resolved<S>,
    request: &'a RequestContext<S>,
    evaluator: &'a dyn ExpressionEvaluator<S>,
    args: Vec<String>,
}

/// Fields shared by `LINE`, `AREA` and `TICK`
struct SeriesFields<'c> {
    vname: &'c str,
    legend: &'c str,
    legend_expression: Option<&'c Expression>,
}

impl<'a, S> Generator<'a, S> {
    fn push(&mut self, argument: String) {
        self.args.push(argument);
    }

    fn emit_prelude(&mut self, format: ImageFormat) {
        for word in PRELUDE {
            self.push(word.to_string());
        }
        self.push("--imgformat".to_string());
        self.push(format.as_str().to_string());
    }

    fn emit_options(&mut self) -> Result<(), GenerationError> {
        let resolved = self.resolved;
        for option in resolved.options() {
            self.push(option.flag());
            match &option.value {
                Some(OptionValue::Dynamic(expression)) => {
                    let value = self.evaluate(expression, &self.request.scope, option.key)?;
                    self.push(value);
                }
                Some(OptionValue::Literal(value)) => self.push(value.clone()),
                None => {}
            }
        }
        Ok(())
    }

    fn emit_commands(&mut self) -> Result<(), GenerationError> {
        let resolved = self.resolved;
        let mut cursor = CommandCursor::new(resolved.commands());

        while let Some((position, command)) = cursor.next() {
            let link = resolved.link(position).cloned().unwrap_or_default();

            match command {
                Command::Def(def) => self.emit_def(def, &link)?,
                Command::Vdef(vdef) => {
                    self.require_source(command, &link)?;
                    self.emit_per_instance(&link, |j| match j {
                        None => format!("VDEF:{}={},{}", vdef.vname, vdef.dsname, vdef.rpn),
                        Some(j) => format!(
                            "VDEF:{}={},{}",
                            instance_name(&vdef.vname, j),
                            instance_name(&vdef.dsname, j),
                            vdef.rpn
                        ),
                    });
                }
                Command::Cdef(cdef) => {
                    let operands = &cdef.operands;
                    let sources = &link.operand_sources;
                    self.emit_per_instance(&link, |j| match j {
                        None => format!("CDEF:{}={}", cdef.vname, cdef.rpn),
                        Some(j) => {
                            let expanded: Vec<String> = operands
                                .iter()
                                .enumerate()
                                .map(|(k, operand)| {
                                    let fanned_out = sources
                                        .get(k)
                                        .copied()
                                        .flatten()
                                        .map_or(false, |h| resolved_multiplicity(resolved, h) > 1);
                                    if fanned_out {
                                        instance_name(operand, j)
                                    } else {
                                        operand.clone()
                                    }
                                })
                                .collect();
                            format!("CDEF:{}={}", instance_name(&cdef.vname, j), expanded.join(","))
                        }
                    });
                }
                Command::Line(series) | Command::Area(series) => {
                    let fields = SeriesFields {
                        vname: &series.vname,
                        legend: &series.legend,
                        legend_expression: series.legend_expression.as_ref(),
                    };
                    self.emit_series(&mut cursor, command, &link, fields, |name, legend| {
                        format!(
                            "{}:{}{}:{}{}",
                            series.keyword,
                            name,
                            colour_suffix(series.colour.as_deref()),
                            legend,
                            args_suffix(&series.args)
                        )
                    })?;
                }
                Command::Tick(tick) => {
                    let fields = SeriesFields {
                        vname: &tick.vname,
                        legend: &tick.legend,
                        legend_expression: tick.legend_expression.as_ref(),
                    };
                    self.emit_series(&mut cursor, command, &link, fields, |name, legend| {
                        format!(
                            "TICK:{}{}:{}:{}{}",
                            name,
                            colour_suffix(tick.colour.as_deref()),
                            tick.fraction,
                            legend,
                            args_suffix(&tick.args)
                        )
                    })?;
                }
                Command::HRule(rule) | Command::VRule(rule) => {
                    self.emit_rule(command.kind(), rule)?;
                }
                Command::Shift(shift) => {
                    self.require_source(command, &link)?;
                    self.emit_per_instance(&link, |j| match j {
                        None => format!("SHIFT:{}:{}", shift.vname, shift.offset),
                        Some(j) => format!("SHIFT:{}:{}", instance_name(&shift.vname, j), shift.offset),
                    });
                }
                Command::Print(print) | Command::GPrint(print) => {
                    self.require_source(command, &link)?;
                    let kind = command.kind();
                    self.emit_per_instance(&link, |j| print_line(kind, print, j));
                }
                Command::Comment(annotation) | Command::TextAlign(annotation) => {
                    self.emit_annotation(command.kind(), annotation)?;
                }
            }
        }

        Ok(())
    }

    fn emit_def(&mut self, def: &SourceDef, link: &Link) -> Result<(), GenerationError> {
        let daemon_field = std::iter::once(def.dsname.as_str())
            .chain(def.cf.split(':'))
            .any(|field| field.trim_start().starts_with("daemon="));
        if daemon_field || def.path.contains(":daemon=") {
            let err = GenerationError::forbidden_daemon(&def.vname);
            crate::log_error!(err.error_code(), "DEF elements must not contain a 'daemon' parameter",
                element = def.vname.as_str()
            );
            return Err(err);
        }

        let resolved = self.resolved;
        let matches = link.source.map_or(&[][..], |handle| resolved.matches(handle));

        match matches {
            [] => {}
            [single] => self.push(format!(
                "DEF:{}={}:{}:{}",
                def.vname,
                escape_path(&single.path),
                def.dsname,
                def.cf
            )),
            many => {
                let mut aggregate = format!("CDEF:{}=", def.vname);
                for (j, matched) in many.iter().enumerate() {
                    self.push(format!(
                        "DEF:{}={}:{}:{}",
                        instance_name(&def.vname, j),
                        escape_path(&matched.path),
                        def.dsname,
                        def.cf
                    ));
                    if j == 0 {
                        aggregate.push_str(&instance_name(&def.vname, j));
                    } else {
                        aggregate.push(',');
                        aggregate.push_str(&instance_name(&def.vname, j));
                        aggregate.push_str(",+");
                    }
                }
                self.push(aggregate);
            }
        }

        Ok(())
    }

    /// Emit nothing, one plain line, or one line per instance
    fn emit_per_instance<F>(&mut self, link: &Link, line: F)
    where
        F: Fn(Option<usize>) -> String,
    {
        match link.multiplicity {
            0 => {}
            1 => self.push(line(None)),
            n => {
                for j in 0..n {
                    self.push(line(Some(j)));
                }
            }
        }
    }

    fn emit_series<F>(
        &mut self,
        cursor: &mut CommandCursor<'a>,
        command: &Command,
        link: &Link,
        fields: SeriesFields<'_>,
        layout: F,
    ) -> Result<(), GenerationError>
    where
        F: Fn(&str, &str) -> String,
    {
        let handle = self.require_source(command, link)?;
        let resolved = self.resolved;
        let request = self.request;
        let matches = resolved.matches(handle);

        match link.multiplicity {
            0 => {}
            1 => {
                let scope = matches.first().map(|m| &m.scope).unwrap_or(&request.scope);
                let legend = self.legend(fields.legend, fields.legend_expression, scope, fields.vname)?;
                self.push(layout(fields.vname, &legend));
            }
            _ => {
                let run = cursor.consume_run(|position, next| {
                    next.is_print()
                        && resolved.link(position).and_then(|l| l.source) == Some(handle)
                });

                for (j, matched) in matches.iter().enumerate() {
                    let legend = self.legend(
                        fields.legend,
                        fields.legend_expression,
                        &matched.scope,
                        fields.vname,
                    )?;
                    self.push(layout(&instance_name(fields.vname, j), &legend));

                    for position in run.clone() {
                        match resolved.commands().get(position) {
                            Some(Command::Print(print)) => {
                                self.push(print_line(CommandKind::Print, print, Some(j)));
                            }
                            Some(Command::GPrint(print)) => {
                                self.push(print_line(CommandKind::GPrint, print, Some(j)));
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn emit_rule(&mut self, kind: CommandKind, rule: &Rule) -> Result<(), GenerationError> {
        let legend = self.legend(
            &rule.legend,
            rule.legend_expression.as_ref(),
            &self.request.scope,
            &rule.value,
        )?;
        self.push(format!(
            "{}:{}{}:{}{}",
            kind,
            rule.value,
            colour_suffix(rule.colour.as_deref()),
            legend,
            args_suffix(&rule.args)
        ));
        Ok(())
    }

    fn emit_annotation(
        &mut self,
        kind: CommandKind,
        annotation: &Annotation,
    ) -> Result<(), GenerationError> {
        let text = self.legend(
            &annotation.text,
            annotation.legend_expression.as_ref(),
            &self.request.scope,
            kind.as_str(),
        )?;
        self.push(format!("{}:{}", kind, text));
        Ok(())
    }

    /// Source handle of a reference-bearing command, or the error for a
    /// reference that resolved to nothing
    fn require_source(&self, command: &Command, link: &Link) -> Result<SourceHandle, GenerationError> {
        link.source.ok_or_else(|| {
            let name = command.reference().unwrap_or_default();
            let err = GenerationError::empty_reference(command.kind(), name);
            crate::log_error!(err.error_code(), "Element refers to a name with no source",
                element = name,
                "kind" => command.kind()
            );
            err
        })
    }

    /// Evaluated and colon-escaped legend, or the literal one
    fn legend(
        &self,
        literal: &str,
        expression: Option<&Expression>,
        scope: &S,
        subject: &str,
    ) -> Result<String, GenerationError> {
        match expression {
            Some(expression) => {
                let value = self.evaluate(expression, scope, subject)?;
                Ok(escape_colons(&value).into_owned())
            }
            None => Ok(literal.to_string()),
        }
    }

    fn evaluate(
        &self,
        expression: &Expression,
        scope: &S,
        subject: &str,
    ) -> Result<String, GenerationError> {
        self.evaluator
            .evaluate(expression, scope, self.resolved.environment())
            .map_err(|e| {
                crate::log_error!(codes::generation::EXPRESSION_FAILED,
                    "While evaluating an element expression",
                    element = subject,
                    "expression" => expression,
                    "reason" => e.message
                );
                GenerationError::expression_failed(subject, &e.message)
            })
    }
}

fn resolved_multiplicity<S>(resolved: &Resolved<S>, handle: SourceHandle) -> usize {
    resolved
        .link(handle.position())
        .map_or(0, |link| link.multiplicity)
}

fn print_line(kind: CommandKind, print: &PrintDef, instance: Option<usize>) -> String {
    match instance {
        None => format!("{}:{}:{}", kind, print.vname, print.format),
        Some(j) => format!("{}:{}:{}", kind, instance_name(&print.vname, j), print.format),
    }
}

fn colour_suffix(colour: Option<&str>) -> String {
    colour.map(|c| format!("#{}", c)).unwrap_or_default()
}

fn args_suffix(args: &str) -> String {
    if args.is_empty() {
        String::new()
    } else {
        format!(":{}", args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_set::{build_command_set, Configuration};
    use crate::host::testing::{request, BraceEvaluator, ListedAccess, StaticMatcher, TestScope};
    use crate::resolution::resolve;
    use assert_matches::assert_matches;

    fn preferences() -> CompilerPreferences {
        CompilerPreferences {
            strict_duplicate_names: false,
            sort_environment_values: true,
            log_generated_arguments: true,
        }
    }

    fn compile_with(
        configuration: &Configuration,
        query: &str,
        matcher: &StaticMatcher,
    ) -> Result<Vec<String>, GenerationError> {
        let set = build_command_set(configuration, query).unwrap();
        let access = ListedAccess::allow_all();
        let collaborators = Collaborators::new(matcher, &access, &BraceEvaluator);
        let req = request("/g/load.png");
        let resolved: Resolved<TestScope> =
            resolve(set, &req, &collaborators, &preferences()).unwrap();
        let result = generate(&resolved, ImageFormat::Png, &req, &collaborators, &preferences());
        resolved.release();
        result
    }

    /// Arguments after the four-word prelude
    fn body(query: &str, matcher: &StaticMatcher) -> Vec<String> {
        compile_with(&Configuration::new(), query, matcher).unwrap()[4..].to_vec()
    }

    fn two_files() -> StaticMatcher {
        StaticMatcher::new().with("*.rrd", &["a.rrd", "b.rrd"])
    }

    #[test]
    fn test_prelude_and_options() {
        let args = compile_with(
            &Configuration::new(),
            "title=Hello&rigid",
            &StaticMatcher::new(),
        )
        .unwrap();
        assert_eq!(
            args,
            vec!["rrdgraph", "-", "--imgformat", "PNG", "--title", "Hello", "--rigid"]
        );
    }

    #[test]
    fn test_fan_out_with_inlined_prints() {
        let args = body(
            "DEF:x=*.rrd:util:AVERAGE&LINE1:x#00ff00:legend&PRINT:x:%25lf",
            &two_files(),
        );
        assert_eq!(
            args,
            vec![
                "DEF:xw0=/g/a.rrd:util:AVERAGE",
                "DEF:xw1=/g/b.rrd:util:AVERAGE",
                "CDEF:x=xw0,xw1,+",
                "LINE1:xw0#00ff00:legend",
                "PRINT:xw0:%lf",
                "LINE1:xw1#00ff00:legend",
                "PRINT:xw1:%lf",
            ]
        );
    }

    #[test]
    fn test_aggregate_references_every_instance() {
        let matcher = StaticMatcher::new().with("*.rrd", &["a.rrd", "b.rrd", "c.rrd", "d.rrd"]);
        let args = body("DEF:x=*.rrd:ds:MAX", &matcher);
        assert_eq!(args.iter().filter(|a| a.starts_with("DEF:xw")).count(), 4);
        assert_eq!(args.last().unwrap(), "CDEF:x=xw0,xw1,+,xw2,+,xw3,+");
    }

    #[test]
    fn test_single_match_round_trips_verbatim() {
        let matcher = StaticMatcher::new().with("one.rrd", &["one.rrd"]);
        let args = body(
            "DEF:x=one.rrd:ds:AVERAGE:step=60&VDEF:m=x,MAXIMUM&CDEF:y=x,8,*\
             &AREA:y#ff0000:Traffic:STACK&TICK:x#00ff0080:0.2:Ticks\
             &SHIFT:x:3600&GPRINT:m:%256.2lf",
            &matcher,
        );
        assert_eq!(
            args,
            vec![
                "DEF:x=/g/one.rrd:ds:AVERAGE:step=60",
                "VDEF:m=x,MAXIMUM",
                "CDEF:y=x,8,*",
                "AREA:y#ff0000:Traffic:STACK",
                "TICK:x#00ff0080:0.2:Ticks",
                "SHIFT:x:3600",
                "GPRINT:m:%6.2lf",
            ]
        );
    }

    #[test]
    fn test_zero_matches_emit_nothing() {
        let args = body(
            "DEF:x=none/*.rrd:ds:AVERAGE&LINE1:x&PRINT:x:%25lf&COMMENT:always",
            &StaticMatcher::new(),
        );
        assert_eq!(args, vec!["COMMENT:always"]);
    }

    #[test]
    fn test_fanned_out_dependents() {
        let args = body(
            "DEF:x=*.rrd:ds:AVERAGE&VDEF:m=x,LAST&CDEF:y=x,2,*,x,+&SHIFT:y:60",
            &two_files(),
        );
        assert_eq!(
            &args[3..],
            &[
                "VDEF:mw0=xw0,LAST",
                "VDEF:mw1=xw1,LAST",
                "CDEF:yw0=xw0,2,*,x,+",
                "CDEF:yw1=xw1,2,*,x,+",
                "SHIFT:yw0:60",
                "SHIFT:yw1:60",
            ]
        );
    }

    #[test]
    fn test_cdef_operand_from_single_source_is_not_suffixed() {
        let matcher = two_files().with("one.rrd", &["one.rrd"]);
        let args = body(
            "DEF:x=*.rrd:ds:AVERAGE&DEF:base=one.rrd:ds:AVERAGE&CDEF:c=x,base,+,2,*",
            &matcher,
        );
        assert_eq!(
            &args[4..],
            &["CDEF:cw0=xw0,base,+,2,*", "CDEF:cw1=xw1,base,+,2,*"]
        );
    }

    #[test]
    fn test_single_source_cdef_is_emitted_verbatim() {
        let matcher = two_files().with("one.rrd", &["one.rrd"]);
        let args = body("DEF:base=one.rrd:ds:AVERAGE&CDEF:c=base,1,+", &matcher);
        assert_eq!(args.last().unwrap(), "CDEF:c=base,1,+");
    }

    #[test]
    fn test_inlining_stops_at_other_source() {
        let matcher = two_files().with("one.rrd", &["one.rrd"]);
        let args = body(
            "DEF:x=*.rrd:ds:AVERAGE&DEF:o=one.rrd:ds:AVERAGE\
             &LINE1:x&GPRINT:x:%25lf&PRINT:o:%25lf&PRINT:x:%25lf",
            &matcher,
        );
        assert_eq!(
            &args[4..],
            &[
                "LINE1:xw0:",
                "GPRINT:xw0:%lf",
                "LINE1:xw1:",
                "GPRINT:xw1:%lf",
                "PRINT:o:%lf",
                "PRINT:xw0:%lf",
                "PRINT:xw1:%lf",
            ]
        );
    }

    #[test]
    fn test_legend_expression_per_instance_is_escaped() {
        let mut configuration = Configuration::new();
        configuration
            .add_element("DEF:x=*.rrd:ds:AVERAGE", None, None)
            .unwrap();
        configuration
            .add_element(
                "LINE2:x#0000ff:fallback",
                Some(Expression::new("host:{name}")),
                None,
            )
            .unwrap();
        configuration
            .add_element("HRULE:5#ff0000:limit", Some(Expression::new("at 10:00")), None)
            .unwrap();

        let args = compile_with(&configuration, "", &two_files()).unwrap();
        assert_eq!(
            &args[7..],
            &[
                "LINE2:xw0#0000ff:host\\:a",
                "LINE2:xw1#0000ff:host\\:b",
                "HRULE:5#ff0000:at 10\\:00",
            ]
        );
    }

    #[test]
    fn test_literal_legend_is_emitted_as_written() {
        let args = body("VRULE:1700000000#ff0000:'Deploy: v2':dashes&TEXTALIGN:left", &StaticMatcher::new());
        assert_eq!(
            args,
            vec!["VRULE:1700000000#ff0000:Deploy: v2:dashes", "TEXTALIGN:left"]
        );
    }

    #[test]
    fn test_daemon_override_is_rejected() {
        for query in [
            "DEF:x=a.rrd:ds:AVERAGE:daemon=unix:/var/run/rrdcached.sock",
            "DEF:x=a.rrd:daemon=host:AVERAGE",
        ] {
            let err = compile_with(&Configuration::new(), query, &StaticMatcher::new()).unwrap_err();
            assert_matches!(err, GenerationError::ForbiddenDaemon { .. });
        }
    }

    #[test]
    fn test_reference_to_sourceless_cdef_is_client_error() {
        for (query, kind) in [
            ("CDEF:c=1,2,+&LINE1:c", CommandKind::Line),
            ("CDEF:c=1,2,+&VDEF:v=c,LAST", CommandKind::Vdef),
            ("CDEF:c=1,2,+&PRINT:c:%25lf", CommandKind::Print),
        ] {
            let err = compile_with(&Configuration::new(), query, &StaticMatcher::new()).unwrap_err();
            assert_eq!(err, GenerationError::empty_reference(kind, "c"));
            assert_eq!(err.class(), crate::pipeline::ErrorClass::Client);
        }

        let args = body("CDEF:c=1,2,+", &StaticMatcher::new());
        assert!(args.is_empty());
    }

    #[test]
    fn test_dynamic_option_failure_is_server_error() {
        let mut configuration = Configuration::new();
        configuration
            .add_option("title", None, Some(Expression::new("!fail")))
            .unwrap();
        let err = compile_with(&configuration, "", &StaticMatcher::new()).unwrap_err();
        assert_matches!(err, GenerationError::ExpressionFailed { ref subject, .. } if subject == "title");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let query = "DEF:x=*.rrd:ds:AVERAGE&LINE1:x&GPRINT:x:%25lf";
        assert_eq!(body(query, &two_files()), body(query, &two_files()));
    }
}
