//! Cursor helpers over `cssparser::Parser`.
//!
//! Every `try_*` helper is a checkpoint: on mismatch the cursor is rewound to where it was, so
//! grammar productions can probe alternatives without committing.

use cssparser::{Parser, Token};

use crate::error::{ParseError, ParseResult, StyleParseErrorKind};

/// Backtracking helpers used by every value grammar in the engine.
pub trait ParserExt<'input> {
    /// Consume the identifier `name` (ASCII case-insensitive) if it comes next.
    fn try_ident_matching(&mut self, name: &str) -> bool;

    /// Consume the delimiter `delim` if it comes next.
    fn try_delim(&mut self, delim: char) -> bool;

    /// Consume a comma if it comes next.
    fn try_comma(&mut self) -> bool;

    /// Consume any identifier and return it.
    fn try_ident(&mut self) -> Option<String>;

    /// Consume an integer literal and return it.
    fn try_int(&mut self) -> Option<i32>;

    /// Consume a plain number literal (integer or real) and return it.
    fn try_double(&mut self) -> Option<f64>;

    /// Whether the next token is the identifier `name`, without consuming anything.
    fn peek_ident_matching(&mut self, name: &str) -> bool;

    /// Whether the next token opens a function whose name starts with `prefix`, without
    /// consuming anything.
    fn has_function_prefix(&mut self, prefix: &str) -> bool;

    /// If the next tokens open the function `name` (spelled `name(` or `name (`), parse its
    /// arguments with `parse` and return the result. Returns `None`, consuming nothing, when the
    /// function does not come next. The arguments must be consumed entirely.
    fn try_function_block<T, F>(&mut self, name: &str, parse: F) -> Option<ParseResult<'input, T>>
    where
        F: for<'nested> FnOnce(&mut Parser<'input, 'nested>) -> ParseResult<'input, T>;

    /// Build an error at the current location carrying `message`.
    fn invalid(&self, message: &str) -> ParseError<'input>;
}

impl<'input> ParserExt<'input> for Parser<'input, '_> {
    fn try_ident_matching(&mut self, name: &str) -> bool {
        self.try_parse(|input| input.expect_ident_matching(name))
            .is_ok()
    }

    fn try_delim(&mut self, delim: char) -> bool {
        self.try_parse(|input| input.expect_delim(delim)).is_ok()
    }

    fn try_comma(&mut self) -> bool {
        self.try_parse(Parser::expect_comma).is_ok()
    }

    fn try_ident(&mut self) -> Option<String> {
        self.try_parse(|input| {
            input
                .expect_ident()
                .map(|ident| ident.as_ref().to_owned())
        })
        .ok()
    }

    fn try_int(&mut self) -> Option<i32> {
        self.try_parse(Parser::expect_integer).ok()
    }

    fn try_double(&mut self) -> Option<f64> {
        self.try_parse(Parser::expect_number)
            .ok()
            .map(f64::from)
    }

    fn peek_ident_matching(&mut self, name: &str) -> bool {
        let start = self.state();
        let found = matches!(self.next(), Ok(Token::Ident(ident)) if ident.eq_ignore_ascii_case(name));
        self.reset(&start);
        found
    }

    fn has_function_prefix(&mut self, prefix: &str) -> bool {
        let start = self.state();
        let found = match self.next() {
            Ok(Token::Function(name)) => name
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            _ => false,
        };
        self.reset(&start);
        found
    }

    fn try_function_block<T, F>(&mut self, name: &str, parse: F) -> Option<ParseResult<'input, T>>
    where
        F: for<'nested> FnOnce(&mut Parser<'input, 'nested>) -> ParseResult<'input, T>,
    {
        let start = self.state();
        let Ok(token) = self.next().cloned() else {
            self.reset(&start);
            return None;
        };
        let opened = match token {
            Token::Function(ref function) => function.eq_ignore_ascii_case(name),
            Token::Ident(ref ident) if ident.eq_ignore_ascii_case(name) => {
                matches!(self.next(), Ok(Token::ParenthesisBlock))
            }
            _ => false,
        };
        if !opened {
            self.reset(&start);
            return None;
        }
        Some(self.parse_nested_block(parse))
    }

    fn invalid(&self, message: &str) -> ParseError<'input> {
        self.new_custom_error(StyleParseErrorKind::Invalid(message.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssparser::ParserInput;

    /// Failed probes leave the cursor where it was.
    ///
    /// # Panics
    /// Panics if a probe consumes input on mismatch.
    #[test]
    fn probes_rewind() {
        let mut input = ParserInput::new("over 3, 2.5");
        let mut parser = Parser::new(&mut input);
        assert!(!parser.try_ident_matching("margins"));
        assert!(parser.peek_ident_matching("OVER"));
        assert_eq!(parser.try_int(), None);
        assert!(parser.try_ident_matching("over"));
        assert_eq!(parser.try_double(), Some(3.0));
        assert!(parser.try_comma());
        assert_eq!(parser.try_int(), None);
        assert_eq!(parser.try_double(), Some(2.5));
        assert!(parser.is_exhausted());
    }

    /// Function blocks open with or without a space before the parenthesis.
    ///
    /// # Panics
    /// Panics if either spelling is rejected.
    #[test]
    fn function_block_spellings() {
        for text in ["from(red)", "from (red)"] {
            let mut input = ParserInput::new(text);
            let mut parser = Parser::new(&mut input);
            assert!(!parser.has_function_prefix("to"));
            let parsed = parser.try_function_block("from", |nested| {
                nested
                    .expect_ident()
                    .map(|ident| ident.as_ref().to_owned())
                    .map_err(Into::into)
            });
            assert_eq!(parsed.map(Result::ok), Some(Some("red".to_owned())));
        }

        let mut input = ParserInput::new("-ctk-win32-size(button, 3)");
        let mut parser = Parser::new(&mut input);
        assert!(parser.has_function_prefix("-ctk-win32-"));
        assert!(parser.try_function_block("to", |_| Ok(())).is_none());
        assert!(parser.has_function_prefix("-CTK-WIN32-SIZE"));
    }
}
