//! Typed graph commands
//!
//! One variant per element kind, each holding only the fields that kind
//! carries. Resolution state lives outside the command (see `resolution`).

use crate::host::Expression;
use serde::Serialize;

/// `DEF:vname=path:dsname:cf[:...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDef {
    pub vname: String,
    /// File pattern, matched recursively below the base directory
    pub path: String,
    pub dsname: String,
    /// Consolidation function plus any trailing `:step=`/`:start=` fields
    pub cf: String,
    pub path_expression: Option<Expression>,
    pub directory_expression: Option<Expression>,
}

/// `VDEF:vname=dsname,rpn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDef {
    pub vname: String,
    pub dsname: String,
    pub rpn: String,
}

/// `CDEF:vname=rpn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedDef {
    pub vname: String,
    pub rpn: String,
    pub operands: Vec<String>,
}

/// `LINEw:vname[#colour]:legend[:args]` and `AREA:...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    /// `LINE1`, `LINE2.5`, `AREA`
    pub keyword: String,
    pub vname: String,
    pub colour: Option<String>,
    pub legend: String,
    pub legend_expression: Option<Expression>,
    pub args: String,
}

/// `TICK:vname[#colour]:fraction:legend[:args]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMark {
    pub vname: String,
    pub colour: Option<String>,
    pub fraction: String,
    pub legend: String,
    pub legend_expression: Option<Expression>,
    pub args: String,
}

/// `HRULE:value[#colour]:legend[:args]` and `VRULE:...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub value: String,
    pub colour: Option<String>,
    pub legend: String,
    pub legend_expression: Option<Expression>,
    pub args: String,
}

/// `SHIFT:vname:offset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftDef {
    pub vname: String,
    pub offset: String,
}

/// `PRINT:vname:format` and `GPRINT:...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintDef {
    pub vname: String,
    pub format: String,
}

/// `COMMENT:text` and `TEXTALIGN:alignment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub text: String,
    pub legend_expression: Option<Expression>,
}

/// Parsed graph element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Def(SourceDef),
    Vdef(VirtualDef),
    Cdef(DerivedDef),
    Line(Series),
    Area(Series),
    Tick(TickMark),
    HRule(Rule),
    VRule(Rule),
    Shift(ShiftDef),
    Print(PrintDef),
    GPrint(PrintDef),
    Comment(Annotation),
    TextAlign(Annotation),
}

/// Element kind tag, used in diagnostics and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CommandKind {
    Def,
    Vdef,
    Cdef,
    Line,
    Area,
    Tick,
    HRule,
    VRule,
    Shift,
    Print,
    GPrint,
    Comment,
    TextAlign,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Def => "DEF",
            CommandKind::Vdef => "VDEF",
            CommandKind::Cdef => "CDEF",
            CommandKind::Line => "LINE",
            CommandKind::Area => "AREA",
            CommandKind::Tick => "TICK",
            CommandKind::HRule => "HRULE",
            CommandKind::VRule => "VRULE",
            CommandKind::Shift => "SHIFT",
            CommandKind::Print => "PRINT",
            CommandKind::GPrint => "GPRINT",
            CommandKind::Comment => "COMMENT",
            CommandKind::TextAlign => "TEXTALIGN",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Def(_) => CommandKind::Def,
            Command::Vdef(_) => CommandKind::Vdef,
            Command::Cdef(_) => CommandKind::Cdef,
            Command::Line(_) => CommandKind::Line,
            Command::Area(_) => CommandKind::Area,
            Command::Tick(_) => CommandKind::Tick,
            Command::HRule(_) => CommandKind::HRule,
            Command::VRule(_) => CommandKind::VRule,
            Command::Shift(_) => CommandKind::Shift,
            Command::Print(_) => CommandKind::Print,
            Command::GPrint(_) => CommandKind::GPrint,
            Command::Comment(_) => CommandKind::Comment,
            Command::TextAlign(_) => CommandKind::TextAlign,
        }
    }

    /// Variable name this command introduces, if any
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Command::Def(def) => Some(&def.vname),
            Command::Vdef(vdef) => Some(&vdef.vname),
            Command::Cdef(cdef) => Some(&cdef.vname),
            _ => None,
        }
    }

    /// Single variable name this command refers to
    ///
    /// `Cdef` references are per operand and are not reported here.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Command::Vdef(vdef) => Some(&vdef.dsname),
            Command::Line(series) | Command::Area(series) => Some(&series.vname),
            Command::Tick(tick) => Some(&tick.vname),
            Command::Shift(shift) => Some(&shift.vname),
            Command::Print(print) | Command::GPrint(print) => Some(&print.vname),
            _ => None,
        }
    }

    /// Whether an unset link on this command is an error
    pub fn requires_reference(&self) -> bool {
        self.reference().is_some()
    }

    pub fn is_print(&self) -> bool {
        matches!(self, Command::Print(_) | Command::GPrint(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn print(vname: &str) -> Command {
        Command::Print(PrintDef {
            vname: vname.to_string(),
            format: "%lf".to_string(),
        })
    }

    #[test]
    fn test_names_and_references() {
        let vdef = Command::Vdef(VirtualDef {
            vname: "peak".to_string(),
            dsname: "load".to_string(),
            rpn: "MAXIMUM".to_string(),
        });
        assert_eq!(vdef.declared_name(), Some("peak"));
        assert_eq!(vdef.reference(), Some("load"));
        assert!(vdef.requires_reference());

        let comment = Command::Comment(Annotation {
            text: "hello".to_string(),
            legend_expression: None,
        });
        assert_eq!(comment.declared_name(), None);
        assert!(!comment.requires_reference());
    }

    #[test]
    fn test_kind_and_print_detection() {
        let p = print("x");
        assert_eq!(p.kind(), CommandKind::Print);
        assert_eq!(p.kind().to_string(), "PRINT");
        assert!(p.is_print());
        assert_eq!(p.reference(), Some("x"));
    }
}
