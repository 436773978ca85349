//! Element parsing: one raw element string in, one typed command out

pub mod types;

use crate::host::Expression;
use crate::scanner::WordCursor;

pub use types::{
    Annotation, Command, CommandKind, DerivedDef, PrintDef, Rule, Series, ShiftDef, SourceDef,
    TickMark, VirtualDef,
};

/// Parse one element string
///
/// `expr1` and `expr2` are only present for configured elements: for `DEF`
/// they are the path and directory expressions, for legend-bearing kinds
/// `expr1` is the legend expression. Returns `None` when no keyword matches
/// or a required name is empty.
pub fn parse_element(
    raw: &str,
    expr1: Option<Expression>,
    expr2: Option<Expression>,
) -> Option<Command> {
    let command = if let Some(rest) = raw.strip_prefix("DEF:") {
        parse_def(rest, expr1, expr2)
    } else if let Some(rest) = raw.strip_prefix("VDEF:") {
        parse_vdef(rest)
    } else if let Some(rest) = raw.strip_prefix("CDEF:") {
        parse_cdef(rest)
    } else if let Some(rest) = raw.strip_prefix("PRINT:") {
        parse_print(rest).map(Command::Print)
    } else if let Some(rest) = raw.strip_prefix("GPRINT:") {
        parse_print(rest).map(Command::GPrint)
    } else if raw.starts_with("COMMENT:") {
        Some(Command::Comment(parse_annotation(raw, expr1)))
    } else if raw.starts_with("TEXTALIGN:") {
        Some(Command::TextAlign(parse_annotation(raw, expr1)))
    } else if let Some(rest) = raw.strip_prefix("HRULE:") {
        Some(Command::HRule(parse_rule(rest, expr1)))
    } else if let Some(rest) = raw.strip_prefix("VRULE:") {
        Some(Command::VRule(parse_rule(rest, expr1)))
    } else if raw.starts_with("LINE") {
        let mut cursor = WordCursor::new(raw);
        let keyword = cursor.next_word(':');
        parse_series(keyword, cursor, expr1).map(Command::Line)
    } else if let Some(rest) = raw.strip_prefix("AREA:") {
        parse_series("AREA".to_string(), WordCursor::new(rest), expr1).map(Command::Area)
    } else if let Some(rest) = raw.strip_prefix("TICK:") {
        parse_tick(rest, expr1)
    } else if let Some(rest) = raw.strip_prefix("SHIFT:") {
        parse_shift(rest)
    } else {
        None
    };

    if command.is_none() {
        crate::log_debug!("Element not recognised", "element" => raw);
    }
    command
}

/// Split `vname#colour` into its parts
fn split_colour(field: &str) -> (String, Option<String>) {
    match field.split_once('#') {
        Some((name, colour)) => (name.to_string(), Some(colour.to_string())),
        None => (field.to_string(), None),
    }
}

fn non_empty(name: String) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn parse_def(
    rest: &str,
    path_expression: Option<Expression>,
    directory_expression: Option<Expression>,
) -> Option<Command> {
    let mut cursor = WordCursor::new(rest);
    let vname = non_empty(cursor.next_word('='))?;
    let path = cursor.next_word(':');
    let dsname = cursor.next_word(':');
    let cf = cursor.rest().to_string();

    Some(Command::Def(SourceDef {
        vname,
        path,
        dsname,
        cf,
        path_expression,
        directory_expression,
    }))
}

fn parse_vdef(rest: &str) -> Option<Command> {
    let mut cursor = WordCursor::new(rest);
    let vname = non_empty(cursor.next_word('='))?;
    let dsname = cursor.next_word(',');
    let rpn = cursor.rest().to_string();

    Some(Command::Vdef(VirtualDef { vname, dsname, rpn }))
}

fn parse_cdef(rest: &str) -> Option<Command> {
    let mut cursor = WordCursor::new(rest);
    let vname = non_empty(cursor.next_word('='))?;
    let rpn = cursor.rest().to_string();
    let operands = rpn
        .split(',')
        .filter(|operand| !operand.is_empty())
        .map(str::to_string)
        .collect();

    Some(Command::Cdef(DerivedDef {
        vname,
        rpn,
        operands,
    }))
}

fn parse_print(rest: &str) -> Option<PrintDef> {
    let mut cursor = WordCursor::new(rest);
    let vname = non_empty(cursor.next_word(':'))?;
    let format = cursor.rest().to_string();

    Some(PrintDef { vname, format })
}

fn parse_annotation(raw: &str, legend_expression: Option<Expression>) -> Annotation {
    let mut cursor = WordCursor::new(raw);
    let _keyword = cursor.next_word(':');
    let text = cursor.next_quoted_word(':');

    Annotation {
        text,
        legend_expression,
    }
}

fn parse_rule(rest: &str, legend_expression: Option<Expression>) -> Rule {
    let mut cursor = WordCursor::new(rest);
    let (value, colour) = split_colour(&cursor.next_word(':'));
    let legend = cursor.next_quoted_word(':');
    let args = cursor.rest().to_string();

    Rule {
        value,
        colour,
        legend,
        legend_expression,
        args,
    }
}

fn parse_series(
    keyword: String,
    mut cursor: WordCursor<'_>,
    legend_expression: Option<Expression>,
) -> Option<Series> {
    let (vname, colour) = split_colour(&cursor.next_word(':'));
    let vname = non_empty(vname)?;
    let legend = cursor.next_quoted_word(':');
    let args = cursor.rest().to_string();

    Some(Series {
        keyword,
        vname,
        colour,
        legend,
        legend_expression,
        args,
    })
}

fn parse_tick(rest: &str, legend_expression: Option<Expression>) -> Option<Command> {
    let mut cursor = WordCursor::new(rest);
    let (vname, colour) = split_colour(&cursor.next_word(':'));
    let vname = non_empty(vname)?;
    let fraction = cursor.next_word(':');
    let legend = cursor.next_quoted_word(':');
    let args = cursor.rest().to_string();

    Some(Command::Tick(TickMark {
        vname,
        colour,
        fraction,
        legend,
        legend_expression,
        args,
    }))
}

fn parse_shift(rest: &str) -> Option<Command> {
    let mut cursor = WordCursor::new(rest);
    let vname = non_empty(cursor.next_word(':'))?;
    let offset = cursor.rest().to_string();

    Some(Command::Shift(ShiftDef { vname, offset }))
}
