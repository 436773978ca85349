//! Source and reference resolution
//!
//! Pass A expands every `DEF` into its access-checked file matches and
//! evaluates environment mappings. Pass B walks the commands in declaration
//! order and gives each one a [`Link`] to the `DEF` it ultimately draws from,
//! copying that source's multiplicity. Unset links on reference-bearing
//! commands are rejected when arguments are generated.

pub mod error;
pub mod matches;
pub mod names;

use crate::command_set::{CommandSet, EnvironmentMapping};
use crate::config::compile_time::limits::{MAX_MATCHES_PER_SOURCE, MAX_OPERANDS_PER_CDEF};
use crate::config::runtime::CompilerPreferences;
use crate::elements::{Command, DerivedDef, SourceDef};
use crate::host::{
    AccessDecision, Collaborators, Environment, Expression, ExpressionEvaluator, RequestContext,
};
use crate::logging::codes;
use crate::options::GraphOption;
use std::collections::HashSet;
use std::path::PathBuf;

pub use error::ResolutionError;
pub use matches::{Match, MatchTable};
pub use names::NameIndex;

/// Position of the `DEF` a command ultimately draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceHandle(usize);

impl SourceHandle {
    pub fn position(&self) -> usize {
        self.0
    }
}

/// Resolution result for one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub source: Option<SourceHandle>,
    /// Kept match count of `source`; zero when unset
    pub multiplicity: usize,
    /// `CDEF` only: source of each operand, recorded for the first operand
    /// that resolved
    pub operand_sources: Vec<Option<SourceHandle>>,
}

impl Link {
    pub fn unset() -> Self {
        Self::default()
    }

    fn to_source(handle: SourceHandle, multiplicity: usize) -> Self {
        Self {
            source: Some(handle),
            multiplicity,
            operand_sources: Vec::new(),
        }
    }

    /// Copy of this link as seen by a dependent command
    fn inherited(&self) -> Self {
        Self {
            source: self.source,
            multiplicity: self.multiplicity,
            operand_sources: Vec::new(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.source.is_some()
    }
}

/// Commands of one request with their links and matches
#[derive(Debug)]
pub struct Resolved<S> {
    command_set: CommandSet,
    links: Vec<Link>,
    matches: MatchTable<S>,
    environment: Environment,
}

impl<S> Resolved<S> {
    pub fn commands(&self) -> &[Command] {
        &self.command_set.commands
    }

    pub fn options(&self) -> &[GraphOption] {
        &self.command_set.options
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, position: usize) -> Option<&Link> {
        self.links.get(position)
    }

    pub fn matches(&self, handle: SourceHandle) -> &[Match<S>] {
        self.matches.get(handle.position())
    }

    pub fn total_matches(&self) -> usize {
        self.matches.total()
    }

    /// Environment after every mapping has been applied
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Release every match, returning how many were held
    pub fn release(self) -> usize {
        self.matches.release()
    }
}

/// Run passes A and B over a command set
pub fn resolve<S>(
    command_set: CommandSet,
    request: &RequestContext<S>,
    collaborators: &Collaborators<'_, S>,
    preferences: &CompilerPreferences,
) -> Result<Resolved<S>, ResolutionError> {
    let mut environment = request.environment.clone();

    // Pass A
    let mut entries = Vec::with_capacity(command_set.commands.len());
    for command in &command_set.commands {
        let matched = match command {
            Command::Def(def) => resolve_source(
                def,
                &command_set.environment,
                request,
                collaborators,
                preferences,
                &mut environment,
            )?,
            _ => Vec::new(),
        };
        entries.push(matched);
    }
    let matches = MatchTable::new(entries);

    let index = NameIndex::build(&command_set.commands, preferences.strict_duplicate_names)?;

    // Pass B
    let mut links: Vec<Link> = Vec::with_capacity(command_set.commands.len());
    for (position, command) in command_set.commands.iter().enumerate() {
        let link = match command {
            Command::Def(_) => {
                Link::to_source(SourceHandle(position), matches.get(position).len())
            }
            Command::Cdef(cdef) => link_operands(cdef, position, &index, &links)?,
            Command::HRule(_) | Command::VRule(_) | Command::Comment(_) | Command::TextAlign(_) => {
                Link::unset()
            }
            other => {
                let name = other.reference().unwrap_or_default();
                match index.lookup(name, position) {
                    Some(target) => links[target].inherited(),
                    None => {
                        let err = ResolutionError::unresolved_reference(other.kind(), name);
                        crate::log_error!(err.error_code(), "Reference was not found",
                            element = name,
                            "kind" => other.kind(),
                            "position" => position
                        );
                        return Err(err);
                    }
                }
            }
        };
        links.push(link);
    }

    crate::log_success!(codes::success::RESOLUTION_COMPLETE, "References resolved",
        "commands" => links.len(),
        "names" => index.len(),
        "matches" => matches.total()
    );

    Ok(Resolved {
        command_set,
        links,
        matches,
        environment,
    })
}

fn resolve_source<S>(
    def: &SourceDef,
    mappings: &[EnvironmentMapping],
    request: &RequestContext<S>,
    collaborators: &Collaborators<'_, S>,
    preferences: &CompilerPreferences,
    environment: &mut Environment,
) -> Result<Vec<Match<S>>, ResolutionError> {
    let evaluator = collaborators.evaluator;

    let pattern = match &def.path_expression {
        Some(expression) => evaluate(evaluator, expression, &request.scope, environment)?,
        None => def.path.clone(),
    };
    let base_dir = match &def.directory_expression {
        Some(expression) => {
            PathBuf::from(evaluate(evaluator, expression, &request.scope, environment)?)
        }
        None => request.base_directory().to_path_buf(),
    };

    crate::log_debug!("Matching source pattern",
        "vname" => def.vname,
        "pattern" => pattern,
        "base" => base_dir.display()
    );

    let candidates = collaborators
        .matcher
        .match_files(&base_dir, &pattern)
        .map_err(|e| {
            crate::log_error!(codes::resolution::PATTERN_ERROR, "Source pattern is invalid",
                element = pattern.as_str(),
                "reason" => e.message
            );
            ResolutionError::pattern_error(&pattern, &e.message)
        })?;

    let mut kept = Vec::new();
    for candidate in candidates {
        match collaborators.access.check_access(&candidate) {
            AccessDecision::Allowed(scope) => {
                if kept.len() >= MAX_MATCHES_PER_SOURCE {
                    let err = ResolutionError::too_many_matches(
                        &def.vname,
                        kept.len() + 1,
                        MAX_MATCHES_PER_SOURCE,
                    );
                    crate::log_error!(err.error_code(), "Source matched too many files",
                        element = def.vname.as_str(),
                        "limit" => MAX_MATCHES_PER_SOURCE
                    );
                    return Err(err);
                }
                kept.push(Match::new(candidate, scope));
            }
            AccessDecision::Denied { reason } => {
                crate::log_debug!("Access to path denied, ignoring",
                    "path" => candidate.display(),
                    "reason" => reason
                );
            }
        }
    }

    for mapping in mappings {
        let mut values = HashSet::new();
        for matched in &kept {
            let value = evaluate(evaluator, &mapping.expression, &matched.scope, environment)?;
            if !value.is_empty() {
                values.insert(value);
            }
        }

        if !values.is_empty() {
            let mut values: Vec<String> = values.into_iter().collect();
            if preferences.sort_environment_values {
                values.sort();
            }
            environment.set(mapping.key.as_str(), values.join(","));
        }
    }

    Ok(kept)
}

/// The first operand that names an earlier declaration decides the link
fn link_operands(
    cdef: &DerivedDef,
    position: usize,
    index: &NameIndex,
    links: &[Link],
) -> Result<Link, ResolutionError> {
    if cdef.operands.len() > MAX_OPERANDS_PER_CDEF {
        let err =
            ResolutionError::too_many_operands(&cdef.vname, cdef.operands.len(), MAX_OPERANDS_PER_CDEF);
        crate::log_error!(err.error_code(), "CDEF has too many operands",
            element = cdef.vname.as_str(),
            "count" => cdef.operands.len()
        );
        return Err(err);
    }

    let mut operand_sources = vec![None; cdef.operands.len()];
    let mut link = Link::unset();

    for (slot, operand) in cdef.operands.iter().enumerate() {
        if let Some(target) = index.lookup(operand, position) {
            link = links[target].inherited();
            operand_sources[slot] = link.source;
            break;
        }
    }

    if !link.is_set() {
        crate::log_debug!("CDEF draws from no source and will produce no output",
            "vname" => cdef.vname
        );
    }

    link.operand_sources = operand_sources;
    Ok(link)
}

fn evaluate<S>(
    evaluator: &dyn ExpressionEvaluator<S>,
    expression: &Expression,
    scope: &S,
    environment: &Environment,
) -> Result<String, ResolutionError> {
    evaluator
        .evaluate(expression, scope, environment)
        .map_err(|e| {
            crate::log_error!(codes::resolution::EXPRESSION_FAILED,
                "While evaluating an element expression",
                element = expression.as_str(),
                "reason" => e.message
            );
            ResolutionError::expression_failed(&e.expression, &e.message)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_set::{build_command_set, Configuration};
    use crate::elements::CommandKind;
    use crate::host::testing::{request, BraceEvaluator, ListedAccess, StaticMatcher, TestScope};
    use assert_matches::assert_matches;

    fn preferences() -> CompilerPreferences {
        CompilerPreferences {
            strict_duplicate_names: false,
            sort_environment_values: true,
            log_generated_arguments: false,
        }
    }

    fn run(
        configuration: &Configuration,
        query: &str,
        matcher: &StaticMatcher,
        access: &ListedAccess,
    ) -> Result<Resolved<TestScope>, ResolutionError> {
        let set = build_command_set(configuration, query).unwrap();
        let collaborators = Collaborators::new(matcher, access, &BraceEvaluator);
        resolve(set, &request("/srv/graphs/load.png"), &collaborators, &preferences())
    }

    #[test]
    fn test_source_multiplicity_propagates() {
        let matcher = StaticMatcher::new().with("*.rrd", &["a.rrd", "b.rrd", "c.rrd"]);
        let resolved = run(
            &Configuration::new(),
            "DEF:x=*.rrd:ds:AVERAGE&VDEF:m=x,MAXIMUM&CDEF:y=x,8,*&LINE1:y&PRINT:m:%25lf",
            &matcher,
            &ListedAccess::allow_all(),
        )
        .unwrap();

        let handle = resolved.link(0).unwrap().source.unwrap();
        assert_eq!(handle.position(), 0);
        for link in resolved.links() {
            assert_eq!(link.source, Some(handle));
            assert_eq!(link.multiplicity, 3);
        }
        assert_eq!(resolved.link(2).unwrap().operand_sources, vec![Some(handle), None, None]);
        assert_eq!(resolved.matches(handle).len(), 3);
        assert_eq!(
            resolved.matches(handle)[0].path,
            PathBuf::from("/srv/graphs/a.rrd")
        );
        assert_eq!(resolved.release(), 3);
    }

    #[test]
    fn test_denied_candidates_are_dropped_in_order() {
        let matcher = StaticMatcher::new().with("*.rrd", &["a.rrd", "secret.rrd", "c.rrd"]);
        let access = ListedAccess::allow_all().deny("secret.rrd");
        let resolved = run(&Configuration::new(), "DEF:x=*.rrd:ds:AVERAGE", &matcher, &access)
            .unwrap();

        let handle = resolved.link(0).unwrap().source.unwrap();
        let names: Vec<_> = resolved
            .matches(handle)
            .iter()
            .map(|m| m.scope.name.clone())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(resolved.link(0).unwrap().multiplicity, 2);
    }

    #[test]
    fn test_unresolved_reference_for_every_kind() {
        let matcher = StaticMatcher::new();
        for (element, kind) in [
            ("VDEF:v=ghost,LAST", CommandKind::Vdef),
            ("LINE1:ghost#ff0000", CommandKind::Line),
            ("AREA:ghost", CommandKind::Area),
            ("TICK:ghost:0.5", CommandKind::Tick),
            ("SHIFT:ghost:3600", CommandKind::Shift),
            ("PRINT:ghost:%25lf", CommandKind::Print),
            ("GPRINT:ghost:%25lf", CommandKind::GPrint),
        ] {
            let err = run(&Configuration::new(), element, &matcher, &ListedAccess::allow_all())
                .unwrap_err();
            assert_eq!(err, ResolutionError::unresolved_reference(kind, "ghost"));
            assert!(err.to_string().contains("'ghost'"));
        }
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        let matcher = StaticMatcher::new().with("a.rrd", &["a.rrd"]);
        let err = run(
            &Configuration::new(),
            "LINE1:x&DEF:x=a.rrd:ds:AVERAGE",
            &matcher,
            &ListedAccess::allow_all(),
        )
        .unwrap_err();
        assert_matches!(err, ResolutionError::UnresolvedReference { .. });
    }

    #[test]
    fn test_cdef_without_sources_is_unset() {
        let resolved = run(
            &Configuration::new(),
            "CDEF:c=1,2,+&LINE1:c",
            &StaticMatcher::new(),
            &ListedAccess::allow_all(),
        )
        .unwrap();

        assert!(!resolved.link(0).unwrap().is_set());
        assert!(!resolved.link(1).unwrap().is_set());
        assert_eq!(resolved.link(0).unwrap().operand_sources, vec![None, None, None]);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let matcher = StaticMatcher::new()
            .with("one.rrd", &["one.rrd"])
            .with("many/*.rrd", &["many/a.rrd", "many/b.rrd"]);
        let resolved = run(
            &Configuration::new(),
            "DEF:x=one.rrd:ds:AVERAGE&LINE1:x&DEF:x=many/*.rrd:ds:AVERAGE&LINE2:x",
            &matcher,
            &ListedAccess::allow_all(),
        )
        .unwrap();

        assert_eq!(resolved.link(1).unwrap().multiplicity, 1);
        assert_eq!(resolved.link(3).unwrap().multiplicity, 2);
    }

    #[test]
    fn test_pattern_error_is_client_error() {
        let matcher = StaticMatcher::new().broken("[a");
        let err = run(
            &Configuration::new(),
            "DEF:x=[a:ds:AVERAGE",
            &matcher,
            &ListedAccess::allow_all(),
        )
        .unwrap_err();
        assert_matches!(err, ResolutionError::PatternError { ref pattern, .. } if pattern == "[a");
        assert_eq!(err.class(), crate::pipeline::ErrorClass::Client);
    }

    #[test]
    fn test_environment_mapping_and_path_expression() {
        let matcher = StaticMatcher::new()
            .with("hosts/*.rrd", &["hosts/web1.rrd", "hosts/web2.rrd", "hosts/web1.rrd"]);
        let mut configuration = Configuration::new();
        configuration
            .add_element(
                "DEF:x=unused:ds:AVERAGE",
                Some(Expression::new("hosts/*.rrd")),
                Some(Expression::new("/data")),
            )
            .unwrap();
        configuration.add_environment("HOSTS", Expression::new("{name}"));

        let resolved = run(&configuration, "", &matcher, &ListedAccess::allow_all()).unwrap();
        assert_eq!(resolved.environment().get("HOSTS"), Some("web1,web2"));

        let handle = resolved.link(0).unwrap().source.unwrap();
        assert_eq!(
            resolved.matches(handle)[1].path,
            PathBuf::from("/data/hosts/web2.rrd")
        );
    }

    #[test]
    fn test_failed_expression_is_server_error() {
        let mut configuration = Configuration::new();
        configuration
            .add_element("DEF:x=a.rrd:ds:AVERAGE", Some(Expression::new("!fail")), None)
            .unwrap();
        let err = run(
            &configuration,
            "",
            &StaticMatcher::new(),
            &ListedAccess::allow_all(),
        )
        .unwrap_err();
        assert_eq!(err.class(), crate::pipeline::ErrorClass::Server);
    }

    #[test]
    fn test_strict_duplicates() {
        let set = build_command_set(
            &Configuration::new(),
            "DEF:x=a.rrd:ds:AVERAGE&CDEF:x=x,2,*",
        )
        .unwrap();
        let matcher = StaticMatcher::new();
        let access = ListedAccess::allow_all();
        let collaborators = Collaborators::new(&matcher, &access, &BraceEvaluator);
        let strict = CompilerPreferences {
            strict_duplicate_names: true,
            ..preferences()
        };
        let err = resolve(set, &request("/g/x.png"), &collaborators, &strict).unwrap_err();
        assert_matches!(err, ResolutionError::DuplicateName { .. });
    }
}
