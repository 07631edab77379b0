//! CSS Color Module Level 4: color values, plus the symbolic extensions the engine supports:
//! named references (`@name`), `shade()`, `alpha()`, `mix()`, `lighter()`, `darker()` and
//! win32 system colors.
//! Spec: <https://www.w3.org/TR/css-color-4/>
//!
//! Symbolic colors stay symbolic until computed; computing resolves them against the provider's
//! `@define-color` table.

use core::fmt::{self, Write};
use std::sync::Arc;

use css_color::Rgba;
use css_syntax::{ParseError, ParseResult, ParserExt as _, write_number};
use cssparser::{Parser, ToCss, Token};
use log::warn;

use crate::context::{ComputeContext, PropertyId, StyleProvider};
use crate::value::CssValue;
use crate::win32::{Win32Theme, color_id, color_name, parse_name_or_id, parse_theme};

/// Initial value of the `color` property, and what a root element's `currentColor` means.
pub const INITIAL_COLOR: Rgba = Rgba::WHITE;

/// Factor `lighter()` shades by.
fn lighter_factor() -> f64 {
    f64::from(1.3_f32)
}

/// Factor `darker()` shades by.
fn darker_factor() -> f64 {
    f64::from(0.7_f32)
}

/// The concrete kinds of color value.
#[derive(Debug, PartialEq)]
pub enum ColorKind {
    Literal(Rgba),
    /// `@name`: a color defined with `@define-color`.
    Name(String),
    Shade {
        color: ColorValue,
        factor: f64,
    },
    Alpha {
        color: ColorValue,
        factor: f64,
    },
    Mix {
        first: ColorValue,
        second: ColorValue,
        factor: f64,
    },
    Win32 {
        theme: Win32Theme,
        id: i32,
    },
    CurrentColor,
}

/// Shared, immutable color value.
#[derive(Clone, Debug)]
pub struct ColorValue(Arc<ColorKind>);

impl PartialEq for ColorValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl ColorValue {
    #[inline]
    pub fn from_kind(kind: ColorKind) -> Self {
        Self(Arc::new(kind))
    }

    #[inline]
    pub fn literal(rgba: Rgba) -> Self {
        Self::from_kind(ColorKind::Literal(rgba))
    }

    #[inline]
    pub fn transparent() -> Self {
        Self::literal(Rgba::TRANSPARENT)
    }

    #[inline]
    pub fn name(name: &str) -> Self {
        Self::from_kind(ColorKind::Name(name.to_owned()))
    }

    #[inline]
    pub fn shade(color: Self, factor: f64) -> Self {
        Self::from_kind(ColorKind::Shade { color, factor })
    }

    #[inline]
    pub fn alpha(color: Self, factor: f64) -> Self {
        Self::from_kind(ColorKind::Alpha { color, factor })
    }

    #[inline]
    pub fn mix(first: Self, second: Self, factor: f64) -> Self {
        Self::from_kind(ColorKind::Mix {
            first,
            second,
            factor,
        })
    }

    #[inline]
    pub fn current_color() -> Self {
        Self::from_kind(ColorKind::CurrentColor)
    }

    #[inline]
    pub fn kind(&self) -> &ColorKind {
        &self.0
    }

    /// The literal color, when this is one.
    pub fn as_literal(&self) -> Option<Rgba> {
        match self.kind() {
            ColorKind::Literal(rgba) => Some(*rgba),
            _ => None,
        }
    }

    /// Resolve to a concrete color. `current` is what `currentColor` stands for; `None` means
    /// [`INITIAL_COLOR`]. Returns `None` for undefined or cyclic names.
    pub fn resolve(&self, provider: &dyn StyleProvider, current: Option<Rgba>) -> Option<Rgba> {
        self.resolve_with(provider, current, &mut Vec::new())
    }

    fn resolve_with(
        &self,
        provider: &dyn StyleProvider,
        current: Option<Rgba>,
        resolving: &mut Vec<String>,
    ) -> Option<Rgba> {
        match self.kind() {
            ColorKind::Literal(rgba) => Some(*rgba),
            ColorKind::Name(name) => {
                if resolving.iter().any(|seen| seen == name) {
                    warn!("color @{name} refers to itself");
                    return None;
                }
                resolving.push(name.clone());
                let resolved = provider
                    .named_color(name)
                    .and_then(|color| color.resolve_with(provider, current, resolving));
                resolving.pop();
                resolved
            }
            ColorKind::Shade { color, factor } => color
                .resolve_with(provider, current, resolving)
                .map(|rgba| rgba.shade(*factor)),
            ColorKind::Alpha { color, factor } => color
                .resolve_with(provider, current, resolving)
                .map(|rgba| rgba.multiply_alpha(*factor)),
            ColorKind::Mix {
                first,
                second,
                factor,
            } => {
                let start = first.resolve_with(provider, current, resolving)?;
                let end = second.resolve_with(provider, current, resolving)?;
                Some(start.mix(end, *factor))
            }
            ColorKind::Win32 { theme, id } => Some(provider.theme_engine().color(theme, *id)),
            ColorKind::CurrentColor => Some(current.unwrap_or(INITIAL_COLOR)),
        }
    }
}

/// What an unresolvable color computes to for `property`.
fn fallback(property: PropertyId) -> Rgba {
    match property {
        PropertyId::Color => INITIAL_COLOR,
        _ => Rgba::TRANSPARENT,
    }
}

impl CssValue for ColorValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        if matches!(self.kind(), ColorKind::Literal(_)) {
            return self.clone();
        }
        self.resolve(context.provider, context.current_color())
            .map_or_else(
                || {
                    warn!(
                        "cannot resolve {} for {}, using fallback",
                        self.to_css_string(),
                        context.property
                    );
                    Self::literal(fallback(context.property))
                },
                Self::literal,
            )
    }

    fn transition(&self, end: &Self, _property: PropertyId, progress: f64) -> Option<Self> {
        match (self.kind(), end.kind()) {
            (ColorKind::Literal(start), ColorKind::Literal(finish)) => {
                Some(Self::literal(start.interpolate(*finish, progress)))
            }
            _ => Some(Self::mix(self.clone(), end.clone(), progress)),
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl ToCss for ColorValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        match self.kind() {
            ColorKind::Literal(rgba) => {
                let (red, green, blue, alpha) = rgba.to_rgba8();
                if alpha == u8::MAX {
                    write!(dest, "rgb({red},{green},{blue})")
                } else {
                    write!(dest, "rgba({red},{green},{blue},")?;
                    write_number(f64::from(alpha) / 255.0, dest)?;
                    dest.write_str(")")
                }
            }
            ColorKind::Name(name) => write!(dest, "@{name}"),
            ColorKind::Shade { color, factor } => {
                dest.write_str("shade(")?;
                color.to_css(dest)?;
                dest.write_str(", ")?;
                write_number(*factor, dest)?;
                dest.write_str(")")
            }
            ColorKind::Alpha { color, factor } => {
                dest.write_str("alpha(")?;
                color.to_css(dest)?;
                dest.write_str(", ")?;
                write_number(*factor, dest)?;
                dest.write_str(")")
            }
            ColorKind::Mix {
                first,
                second,
                factor,
            } => {
                dest.write_str("mix(")?;
                first.to_css(dest)?;
                dest.write_str(", ")?;
                second.to_css(dest)?;
                dest.write_str(", ")?;
                write_number(*factor, dest)?;
                dest.write_str(")")
            }
            ColorKind::Win32 { theme, id } => {
                dest.write_str("-ctk-win32-color(")?;
                theme.to_css(dest)?;
                match color_name(*id) {
                    Some(name) => write!(dest, ", {name})"),
                    None => write!(dest, ", {id})"),
                }
            }
            ColorKind::CurrentColor => dest.write_str("currentColor"),
        }
    }
}

fn expect_comma<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, ()> {
    if input.try_comma() {
        Ok(())
    } else {
        Err(input.invalid("Expected ',' in color definition"))
    }
}

fn expect_factor<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, f64> {
    input
        .try_double()
        .ok_or_else(|| input.invalid("Expected number in color definition"))
}

/// A literal color: a hash, a color keyword or a color function `csscolorparser` knows.
fn parse_literal<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, ColorValue> {
    let start = input.state();
    let start_position = input.position();
    let ident = match input.next()?.clone() {
        Token::Ident(name) => Some(name.as_ref().to_owned()),
        Token::Hash(_) | Token::IDHash(_) => None,
        Token::Function(_) => {
            input.parse_nested_block(|nested| {
                while nested.next().is_ok() {}
                Ok::<(), ParseError<'input>>(())
            })?;
            None
        }
        _ => {
            input.reset(&start);
            return Err(input.invalid("Not a color definition"));
        }
    };
    let text = input.slice_from(start_position);
    Rgba::parse(text).map(ColorValue::literal).ok_or_else(|| {
        ident.map_or_else(
            || input.invalid("Not a color definition"),
            |name| input.invalid(&format!("'{name}' is not a valid color name")),
        )
    })
}

/// Parse a color.
///
/// # Errors
/// Returns an error naming the malformed part of the color.
pub fn parse_color<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, ColorValue> {
    if input.try_ident_matching("currentColor") {
        return Ok(ColorValue::current_color());
    }
    if input.try_ident_matching("transparent") {
        return Ok(ColorValue::transparent());
    }
    if let Ok(name) = input.try_parse(|inner| -> ParseResult<'input, String> {
        match inner.next()? {
            Token::AtKeyword(name) => Ok(name.as_ref().to_owned()),
            token => {
                let token = token.clone();
                Err(inner.new_unexpected_token_error(token))
            }
        }
    }) {
        return Ok(ColorValue::from_kind(ColorKind::Name(name)));
    }
    if let Some(result) = input.try_function_block("lighter", |nested| {
        parse_color(nested).map(|color| ColorValue::shade(color, lighter_factor()))
    }) {
        return result;
    }
    if let Some(result) = input.try_function_block("darker", |nested| {
        parse_color(nested).map(|color| ColorValue::shade(color, darker_factor()))
    }) {
        return result;
    }
    if let Some(result) = input.try_function_block("shade", |nested| {
        let color = parse_color(nested)?;
        expect_comma(nested)?;
        Ok(ColorValue::shade(color, expect_factor(nested)?))
    }) {
        return result;
    }
    if let Some(result) = input.try_function_block("alpha", |nested| {
        let color = parse_color(nested)?;
        expect_comma(nested)?;
        Ok(ColorValue::alpha(color, expect_factor(nested)?))
    }) {
        return result;
    }
    if let Some(result) = input.try_function_block("mix", |nested| {
        let first = parse_color(nested)?;
        expect_comma(nested)?;
        let second = parse_color(nested)?;
        expect_comma(nested)?;
        Ok(ColorValue::mix(first, second, expect_factor(nested)?))
    }) {
        return result;
    }
    if let Some(result) = input.try_function_block("-ctk-win32-color", |nested| {
        let theme = parse_theme(nested)?;
        expect_comma(nested)?;
        let id = parse_name_or_id(nested, color_id, "win32 color name")?;
        Ok(ColorValue::from_kind(ColorKind::Win32 { theme, id }))
    }) {
        return result;
    }
    parse_literal(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BasicProvider, StyleSnapshot};
    use crate::win32::{FallbackThemeEngine, Win32ThemeEngine};
    use css_syntax::parse_entirely;
    use std::collections::HashMap;

    struct NamedColors {
        colors: HashMap<String, ColorValue>,
        engine: FallbackThemeEngine,
    }

    impl NamedColors {
        fn new(definitions: &[(&str, &str)]) -> Self {
            let colors = definitions
                .iter()
                .map(|(name, text)| ((*name).to_owned(), parse(text)))
                .collect();
            Self {
                colors,
                engine: FallbackThemeEngine,
            }
        }
    }

    impl StyleProvider for NamedColors {
        fn named_color(&self, name: &str) -> Option<ColorValue> {
            self.colors.get(name).cloned()
        }

        fn default_font_size(&self) -> f64 {
            16.0
        }

        fn theme_engine(&self) -> &dyn Win32ThemeEngine {
            &self.engine
        }
    }

    fn try_parse(text: &str) -> Result<ColorValue, String> {
        parse_entirely(text, parse_color).map_err(|diagnostic| diagnostic.message)
    }

    fn parse(text: &str) -> ColorValue {
        try_parse(text).unwrap_or_else(|message| panic!("{text}: {message}"))
    }

    /// Every color form prints in a form that parses back to an equal value.
    ///
    /// # Panics
    /// Panics if a color prints unexpectedly or does not reparse.
    #[test]
    fn print_forms() {
        let cases = [
            ("red", "rgb(255,0,0)"),
            ("#00ff0080", "rgba(0,255,0,0.5019607843137255)"),
            ("transparent", "rgba(0,0,0,0)"),
            ("@accent", "@accent"),
            ("lighter(@accent)", "shade(@accent, 1.3)"),
            ("darker(red)", "shade(rgb(255,0,0), 0.7)"),
            ("alpha(currentColor, 0.5)", "alpha(currentColor, 0.5)"),
            ("mix(red, blue, 0.25)", "mix(rgb(255,0,0), rgb(0,0,255), 0.25)"),
            ("-ctk-win32-color(button, 3dlight)", "-ctk-win32-color(button, 3dlight)"),
            ("-ctk-win32-color(button, 15)", "-ctk-win32-color(button, btnface)"),
        ];
        for (text, printed) in cases {
            let color = parse(text);
            assert_eq!(color.to_css_string(), printed, "{text}");
            assert_eq!(parse(printed), color, "{text}");
        }
    }

    /// Malformed colors report what went wrong.
    ///
    /// # Panics
    /// Panics if a malformed color parses or reports the wrong message.
    #[test]
    fn parse_errors() {
        assert_eq!(
            try_parse("nocolor"),
            Err("'nocolor' is not a valid color name".to_owned())
        );
        assert_eq!(
            try_parse("shade(red 0.5)"),
            Err("Expected ',' in color definition".to_owned())
        );
        assert_eq!(
            try_parse("alpha(red, blue)"),
            Err("Expected number in color definition".to_owned())
        );
        assert_eq!(
            try_parse("-ctk-win32-color(button, nothing)"),
            Err("'nothing' is not a win32 color name.".to_owned())
        );
        assert_eq!(try_parse("12px").ok(), None);
    }

    /// An at-keyword is a reference to a defined color; other tokens are not.
    ///
    /// # Panics
    /// Panics if `@name` does not parse to a named reference.
    #[test]
    fn parses_named_references() {
        assert_eq!(
            parse("@fg_color").kind(),
            &ColorKind::Name("fg_color".to_owned())
        );
        let shaded = parse("shade(@theme_bg, 0.5)");
        let ColorKind::Shade { color, .. } = shaded.kind() else {
            panic!("expected a shade: {shaded:?}");
        };
        assert_eq!(color.kind(), &ColorKind::Name("theme_bg".to_owned()));
        assert_eq!(try_parse("@").ok(), None);
        assert_eq!(try_parse("@fg_color extra").ok(), None);
    }

    /// Names resolve through the provider; cycles and undefined names fall back.
    ///
    /// # Panics
    /// Panics if resolution or fallback is wrong.
    #[test]
    fn resolves_names() {
        let provider = NamedColors::new(&[
            ("base", "#000000"),
            ("accent", "mix(@base, white, 0.5)"),
            ("loop", "@other"),
            ("other", "shade(@loop, 1.2)"),
        ]);
        let style = StyleSnapshot::default();
        let context = ComputeContext::new(PropertyId::BackgroundColor, &provider, &style, None);

        let accent = parse("@accent").compute(&context);
        assert_eq!(accent.as_literal().map(Rgba::to_rgba8), Some((128, 128, 128, 255)));
        assert_eq!(parse("@loop").compute(&context), ColorValue::transparent());
        assert_eq!(parse("@missing").compute(&context), ColorValue::transparent());

        let text = context.for_property(PropertyId::Color);
        assert_eq!(parse("@missing").compute(&text), ColorValue::literal(INITIAL_COLOR));

        let literal = parse("red");
        assert!(literal.compute(&context).ptr_eq(&literal));
    }

    /// `currentColor` means the parent's color on `color` and the element's own elsewhere.
    ///
    /// # Panics
    /// Panics if `currentColor` resolves against the wrong style.
    #[test]
    fn current_color() {
        let provider = BasicProvider::default();
        let parent = StyleSnapshot {
            font_size: 16.0,
            color: Rgba::new(0.0, 0.0, 1.0, 1.0),
        };
        let own = StyleSnapshot {
            font_size: 16.0,
            color: Rgba::new(1.0, 0.0, 0.0, 1.0),
        };
        let current = parse("currentColor");

        let color = ComputeContext::new(PropertyId::Color, &provider, &own, Some(&parent));
        assert_eq!(current.compute(&color).as_literal(), Some(parent.color));
        let background = color.for_property(PropertyId::BackgroundColor);
        assert_eq!(current.compute(&background).as_literal(), Some(own.color));
        let root = ComputeContext::new(PropertyId::Color, &provider, &own, None);
        assert_eq!(current.compute(&root).as_literal(), Some(INITIAL_COLOR));

        let system = parse("-ctk-win32-color(button, btnface)").compute(&background);
        assert_eq!(system.as_literal().map(Rgba::to_rgba8), Some((212, 208, 200, 255)));
    }

    /// Literal colors interpolate; symbolic ones become a `mix()`.
    ///
    /// # Panics
    /// Panics if a transition yields the wrong color.
    #[test]
    fn transitions() {
        let black = parse("black");
        let white = parse("white");
        let halfway = black.transition(&white, PropertyId::Color, 0.5);
        assert_eq!(
            halfway.and_then(|color| color.as_literal()).map(Rgba::to_rgba8),
            Some((128, 128, 128, 255))
        );
        let named = parse("@accent");
        assert_eq!(
            named.transition(&white, PropertyId::Color, 0.25),
            Some(ColorValue::mix(named.clone(), white, 0.25))
        );
    }
}
