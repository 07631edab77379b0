#![cfg(test)]

use css_syntax::{
    ParseResult, ParserContext, ParserExt as _, Severity, parse_entirely, parse_stylesheet,
};
use cssparser::Parser;

/// `pair(<ident>, <int>)`, or a bare identifier with a count of one.
fn pair<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, (String, i32)> {
    if let Some(result) = input.try_function_block("pair", |nested| {
        let name = nested
            .try_ident()
            .ok_or_else(|| nested.invalid("Expected a name"))?;
        if !nested.try_comma() {
            return Err(nested.invalid("Expected ','"));
        }
        let count = nested
            .try_int()
            .ok_or_else(|| nested.invalid("Expected a count"))?;
        Ok((name, count))
    }) {
        return result;
    }
    input
        .try_ident()
        .map(|name| (name, 1))
        .ok_or_else(|| input.invalid("Expected a pair"))
}

/// A grammar built from the cursor helpers accepts both spellings and reports its own
/// messages.
///
/// # Panics
/// Panics if the grammar parses or reports wrongly.
#[test]
fn grammar_from_cursor_helpers() {
    let _logger = env_logger::builder().is_test(true).try_init();
    assert_eq!(parse_entirely("pair(left, 3)", pair), Ok(("left".to_owned(), 3)));
    assert_eq!(parse_entirely("PAIR (left,3)", pair), Ok(("left".to_owned(), 3)));
    assert_eq!(parse_entirely("right", pair), Ok(("right".to_owned(), 1)));

    let missing = parse_entirely("pair(left 3)", pair).err();
    assert_eq!(
        missing.as_ref().map(|diagnostic| diagnostic.message.as_str()),
        Some("Expected ','")
    );
    assert_eq!(missing.map(|diagnostic| diagnostic.severity), Some(Severity::Error));

    let trailing = parse_entirely("right left", pair).err();
    assert!(trailing.is_some());
}

/// Declarations keep their positions through comments and line breaks.
///
/// # Panics
/// Panics if a position or the rule order is wrong.
#[test]
fn positions_survive_comments() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let context = ParserContext::new();
    let sheet = parse_stylesheet(
        "/* header */\n\
         button {\n\
         \x20 /* spacing */ min-width: 4px;\n\
         \x20 color: @fg !important;\n\
         }\n\
         label { min-height: 1px }\n",
        &context,
    );
    let names: Vec<_> = sheet
        .rules
        .iter()
        .map(|rule| rule.prelude.as_str())
        .collect();
    assert_eq!(names, ["button", "label"]);
    let button = sheet.rules.first().unwrap_or_else(|| panic!("button rule"));
    let lines: Vec<_> = button
        .declarations
        .iter()
        .map(|declaration| (declaration.name.as_str(), declaration.line))
        .collect();
    assert_eq!(lines, [("min-width", 2), ("color", 3)]);
    assert!(button.declarations.iter().any(|declaration| declaration.important));
    assert_eq!(sheet.rules.last().map(|rule| rule.source_order), Some(1));
}
