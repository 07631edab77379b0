//! CSS Syntax Module Level 3: §9 Parsing stylesheets into rules and declarations.
//! Spec: <https://www.w3.org/TR/css-syntax-3/#parsing>
//!
//! Values are kept as raw text here; property-specific grammars parse them later so that a
//! single bad value only drops its own declaration.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};
use log::trace;

use crate::error::{ParseError, ParserContext, StyleParseErrorKind};

/// A single declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
    /// Zero-based line the declaration starts on.
    pub line: u32,
    /// One-based column the value starts at.
    pub column: u32,
}

/// A style rule with a raw prelude and its declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Raw prelude text (the selector list).
    pub prelude: String,
    /// Declarations within the rule block, in source order.
    pub declarations: Vec<Declaration>,
    /// Position of the rule among all rules of its sheet.
    pub source_order: u32,
    /// Zero-based line the prelude starts on.
    pub line: u32,
}

/// An `@define-color name value;` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorDefinition {
    /// Name the color is referenced by (`@name`).
    pub name: String,
    /// Raw color text.
    pub value: String,
    /// Zero-based line of the value.
    pub line: u32,
    /// One-based column of the value.
    pub column: u32,
}

/// A tokenized stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Style rules in source order.
    pub rules: Vec<StyleRule>,
    /// Named color definitions in source order.
    pub colors: Vec<ColorDefinition>,
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && let Some(prefix) = trimmed.get(..pos)
        && trimmed.get(pos..).is_some_and(|tail| tail == "!important")
    {
        let head = prefix.trim_end();
        return (head.to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// Consume everything left in `input` and return it as trimmed text.
fn rest_as_text(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    input.slice_from(start).trim().to_owned()
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl<'input> DeclarationParser<'input> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = StyleParseErrorKind;

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input>> {
        let location = input.current_source_location();
        let raw = rest_as_text(input);
        let (value, important) = split_important_tail(&raw);
        if value.is_empty() {
            return Err(input.new_custom_error(StyleParseErrorKind::Invalid(format!(
                "Empty value for property '{name}'"
            ))));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value,
            important,
            line: declaration_start.source_location().line,
            column: location.column,
        })
    }
}

impl<'input> AtRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = StyleParseErrorKind;

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input>> {
        Err(input.new_custom_error(StyleParseErrorKind::Invalid(format!(
            "Unknown @ rule @{name} inside a rule block"
        ))))
    }
}

impl<'input> QualifiedRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = StyleParseErrorKind;
}

impl<'input> RuleBodyItemParser<'input, Declaration, StyleParseErrorKind> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Items produced at the top level of a sheet.
enum TopLevelItem {
    Rule(StyleRule),
    DefineColor(ColorDefinition),
}

/// Top-level parser that builds rules and color definitions.
struct TopLevelParser<'context> {
    context: &'context ParserContext,
    next_source_order: u32,
}

impl<'input> AtRuleParser<'input> for TopLevelParser<'_> {
    type Prelude = ColorDefinition;
    type AtRule = TopLevelItem;
    type Error = StyleParseErrorKind;

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input>> {
        if !name.eq_ignore_ascii_case("define-color") {
            return Err(input.new_custom_error(StyleParseErrorKind::Invalid(format!(
                "Unknown @ rule @{name}"
            ))));
        }
        let color_name = input.expect_ident()?.as_ref().to_owned();
        let location = input.current_source_location();
        let value = rest_as_text(input);
        if value.is_empty() {
            return Err(input.new_custom_error(StyleParseErrorKind::Invalid(
                "Expected a color definition".to_owned(),
            )));
        }
        Ok(ColorDefinition {
            name: color_name,
            value,
            line: location.line,
            column: location.column,
        })
    }

    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input>> {
        Err(input.new_custom_error(StyleParseErrorKind::Invalid(
            "Missing semicolon at end of color definition".to_owned(),
        )))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        trace!("@define-color {} {}", prelude.name, prelude.value);
        Ok(TopLevelItem::DefineColor(prelude))
    }
}

impl<'input> QualifiedRuleParser<'input> for TopLevelParser<'_> {
    type Prelude = String;
    type QualifiedRule = TopLevelItem;
    type Error = StyleParseErrorKind;

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input>> {
        let prelude = rest_as_text(input);
        if prelude.is_empty() {
            return Err(input.new_custom_error(StyleParseErrorKind::Invalid(
                "Expected a selector".to_owned(),
            )));
        }
        Ok(prelude)
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input>> {
        let declarations = parse_declarations_from_block(input, self.context);
        let source_order = self.next_source_order;
        self.next_source_order = self.next_source_order.saturating_add(1);
        Ok(TopLevelItem::Rule(StyleRule {
            prelude,
            declarations,
            source_order,
            line: start.source_location().line,
        }))
    }
}

/// Parse declarations from a rule block, reporting the ones that fail.
fn parse_declarations_from_block(
    block: &mut Parser<'_, '_>,
    context: &ParserContext,
) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    let mut body = BodyDeclParser;
    for item in RuleBodyParser::new(block, &mut body) {
        match item {
            Ok(declaration) => out.push(declaration),
            Err((error, slice)) => {
                trace!("skipping declaration '{slice}'");
                context.report_error(&error);
            }
        }
    }
    out
}

/// Parse a full stylesheet. Invalid rules and declarations are skipped and reported to
/// `context`; parsing never aborts the sheet.
pub fn parse_stylesheet(css: &str, context: &ParserContext) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevelParser {
        context,
        next_source_order: 0,
    };
    let mut sheet = Stylesheet::default();
    for item in StyleSheetParser::new(&mut parser, &mut top) {
        match item {
            Ok(TopLevelItem::Rule(rule)) => sheet.rules.push(rule),
            Ok(TopLevelItem::DefineColor(definition)) => sheet.colors.push(definition),
            Err((error, slice)) => {
                trace!("skipping rule '{slice}'");
                context.report_error(&error);
            }
        }
    }
    sheet
}
