//! Positional name index
//!
//! Maps every declared variable to the ascending positions that declare it.
//! A lookup answers with the latest declaration strictly before the asking
//! position, so the later of two duplicates wins from then on and forward
//! references never resolve.

use super::error::ResolutionError;
use crate::elements::Command;
use crate::logging::codes;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    declarations: HashMap<String, Vec<usize>>,
}

impl NameIndex {
    /// Index every `DEF`, `VDEF` and `CDEF` declaration
    ///
    /// Duplicates are logged as warnings, or rejected when `strict` is set.
    pub fn build(commands: &[Command], strict: bool) -> Result<Self, ResolutionError> {
        let mut declarations: HashMap<String, Vec<usize>> = HashMap::new();

        for (position, command) in commands.iter().enumerate() {
            let Some(name) = command.declared_name() else {
                continue;
            };

            let positions = declarations.entry(name.to_string()).or_default();
            if !positions.is_empty() {
                if strict {
                    let err = ResolutionError::duplicate_name(name);
                    crate::log_error!(err.error_code(), "Variable declared more than once",
                        element = name,
                        "position" => position
                    );
                    return Err(err);
                }
                crate::log_warning!(code = codes::warnings::DUPLICATE_DECLARATION,
                    "Variable declared more than once, later declaration wins",
                    "name" => name,
                    "position" => position
                );
            }
            positions.push(position);
        }

        Ok(Self { declarations })
    }

    /// Latest declaration of `name` strictly before `position`
    pub fn lookup(&self, name: &str, position: usize) -> Option<usize> {
        let positions = self.declarations.get(name)?;
        let earlier = positions.partition_point(|&declared| declared < position);
        earlier.checked_sub(1).map(|idx| positions[idx])
    }

    #[cfg(test)]
    pub fn declarations(&self, name: &str) -> &[usize] {
        self.declarations
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::parse_element;
    use assert_matches::assert_matches;

    fn commands(raw: &[&str]) -> Vec<Command> {
        raw.iter()
            .map(|r| parse_element(r, None, None).unwrap())
            .collect()
    }

    #[test]
    fn test_lookup_is_positional() {
        let cmds = commands(&[
            "DEF:x=a.rrd:ds:AVERAGE",
            "LINE1:x",
            "CDEF:x=x,2,*",
            "LINE1:x",
        ]);
        let index = NameIndex::build(&cmds, false).unwrap();

        assert_eq!(index.lookup("x", 0), None);
        assert_eq!(index.lookup("x", 1), Some(0));
        assert_eq!(index.lookup("x", 2), Some(0));
        assert_eq!(index.lookup("x", 3), Some(2));
        assert_eq!(index.declarations("x"), &[0, 2]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_forward_reference_does_not_resolve() {
        let cmds = commands(&["LINE1:y", "DEF:y=a.rrd:ds:AVERAGE"]);
        let index = NameIndex::build(&cmds, false).unwrap();
        assert_eq!(index.lookup("y", 0), None);
        assert_eq!(index.lookup("missing", 5), None);
        assert!(index.declarations("missing").is_empty());
    }

    #[test]
    fn test_strict_mode_rejects_duplicates() {
        let cmds = commands(&["DEF:x=a.rrd:ds:AVERAGE", "VDEF:x=x,LAST"]);
        assert_matches!(
            NameIndex::build(&cmds, true),
            Err(ResolutionError::DuplicateName { name }) if name == "x"
        );
        assert!(NameIndex::build(&cmds, false).is_ok());
    }
}
