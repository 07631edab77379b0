//! CSS Syntax Module Level 3: Parsing and tokenization.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! The parser front end shared by every value grammar: cursor helpers over `cssparser`, the
//! engine's parse error type, the diagnostics sink, number serialization and the stylesheet
//! tokenizer.

#![forbid(unsafe_code)]

use cssparser::{Parser, ParserInput};

pub mod cursor;
pub mod error;
pub mod serialize;
pub mod stylesheet;

pub use cursor::ParserExt;
pub use error::{
    Diagnostic, ParseError, ParseResult, ParserContext, Severity, StyleParseErrorKind,
    describe_error,
};
pub use serialize::{number_to_string, write_number};
pub use stylesheet::{ColorDefinition, Declaration, StyleRule, Stylesheet, parse_stylesheet};

/// Parse `text` entirely with `parse`, returning the value or the first error.
///
/// # Errors
/// Returns the production's error, or an error if input remains after it.
pub fn parse_entirely<T, F>(text: &str, parse: F) -> Result<T, Diagnostic>
where
    F: for<'input, 'tokens> FnOnce(
        &mut Parser<'input, 'tokens>,
    ) -> ParseResult<'input, T>,
{
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parser
        .parse_entirely(parse)
        .map_err(|error| Diagnostic::from_error(&error))
}
