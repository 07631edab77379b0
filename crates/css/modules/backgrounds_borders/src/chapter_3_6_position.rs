//! CSS Backgrounds and Borders Module Level 3: §3.6 `background-position`
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#background-position>
//!
//! Also the `at <position>` of radial gradients.

use core::fmt::{self, Write};
use std::sync::Arc;

use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use css_values_units::{
    ComputeContext, CssValue, NumberValue, ParseFlags, PropertyId, can_parse, parse_number_value,
};
use cssparser::{Parser, ToCss};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
    Either,
}

const KEYWORDS: [(&str, Axis, f64); 5] = [
    ("left", Axis::Horizontal, 0.0),
    ("right", Axis::Horizontal, 100.0),
    ("center", Axis::Either, 50.0),
    ("top", Axis::Vertical, 0.0),
    ("bottom", Axis::Vertical, 100.0),
];

/// One component of a position as written.
enum Component {
    Keyword(Axis, f64),
    Number(NumberValue),
}

impl Component {
    fn into_number(self) -> NumberValue {
        match self {
            Self::Keyword(_, percent) => NumberValue::percent(percent),
            Self::Number(number) => number,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct PositionData {
    pub x: NumberValue,
    pub y: NumberValue,
}

/// A point inside a box, each coordinate a length or a percentage of the box.
#[derive(Clone, Debug)]
pub struct PositionValue(Arc<PositionData>);

impl PartialEq for PositionValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl PositionValue {
    #[inline]
    pub fn new(x: NumberValue, y: NumberValue) -> Self {
        Self(Arc::new(PositionData { x, y }))
    }

    /// `center`; both coordinates share one handle.
    pub fn center() -> Self {
        let half = NumberValue::percent(50.0);
        Self::new(half.clone(), half)
    }

    #[inline]
    pub fn x(&self) -> &NumberValue {
        &self.0.x
    }

    #[inline]
    pub fn y(&self) -> &NumberValue {
        &self.0.y
    }

    /// Resolve against a box of `width` × `height`.
    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x().get(width), self.y().get(height))
    }
}

impl CssValue for PositionValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        let x = self.x().compute(context);
        let y = self.y().compute(context);
        if x.ptr_eq(self.x()) && y.ptr_eq(self.y()) {
            return self.clone();
        }
        Self::new(x, y)
    }

    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self> {
        let x = self.x().transition(end.x(), property, progress)?;
        let y = self.y().transition(end.y(), property, progress)?;
        Some(Self::new(x, y))
    }

    #[inline]
    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Keyword spelling of a coordinate, when it is one of the edge percentages.
fn edge_name(value: &NumberValue, low: &'static str, high: &'static str) -> Option<&'static str> {
    if *value == NumberValue::percent(0.0) {
        Some(low)
    } else if *value == NumberValue::percent(100.0) {
        Some(high)
    } else {
        None
    }
}

impl ToCss for PositionValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        let center = NumberValue::percent(50.0);
        let x_centered = *self.x() == center;
        let y_centered = *self.y() == center;
        match (x_centered, y_centered) {
            (true, true) => dest.write_str("center"),
            (true, false) => match edge_name(self.y(), "top", "bottom") {
                Some(name) => dest.write_str(name),
                None => {
                    dest.write_str("center ")?;
                    self.y().to_css(dest)
                }
            },
            (false, _) => {
                match edge_name(self.x(), "left", "right") {
                    Some(name) => dest.write_str(name)?,
                    None => self.x().to_css(dest)?,
                }
                if y_centered {
                    return Ok(());
                }
                dest.write_str(" ")?;
                match edge_name(self.y(), "top", "bottom") {
                    Some(name) => dest.write_str(name),
                    None => self.y().to_css(dest),
                }
            }
        }
    }
}

fn parse_component<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, Option<Component>> {
    if let Some((_, axis, percent)) = KEYWORDS
        .iter()
        .find(|(name, _, _)| input.try_ident_matching(name))
    {
        return Ok(Some(Component::Keyword(*axis, *percent)));
    }
    if can_parse(input) {
        let number = parse_number_value(input, context, ParseFlags::PERCENT | ParseFlags::LENGTH)?;
        return Ok(Some(Component::Number(number)));
    }
    Ok(None)
}

/// Parse a position: one or two keywords or lengths; a missing coordinate is `center`.
///
/// # Errors
/// Returns an error when nothing position-like comes next, or when both components address
/// the same axis.
pub fn parse_position<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, PositionValue> {
    let Some(first) = parse_component(input, context)? else {
        return Err(input.invalid("Unrecognized position value"));
    };
    let second = parse_component(input, context)?;
    let center = || NumberValue::percent(50.0);
    let percent = NumberValue::percent;
    let (x, y) = match (first, second) {
        (Component::Number(x), None) => (x, center()),
        (Component::Keyword(Axis::Vertical, y), None) => (center(), percent(y)),
        (Component::Keyword(_, x), None) => (percent(x), center()),
        (Component::Keyword(Axis::Vertical, y), Some(Component::Keyword(axis, x)))
            if axis != Axis::Vertical =>
        {
            (percent(x), percent(y))
        }
        (Component::Keyword(Axis::Either, _), Some(Component::Keyword(Axis::Horizontal, x))) => {
            (percent(x), center())
        }
        (Component::Keyword(Axis::Vertical, _), Some(_))
        | (_, Some(Component::Keyword(Axis::Horizontal, _))) => {
            return Err(input.invalid("Invalid combination of values"));
        }
        (Component::Keyword(_, x), Some(second)) => (percent(x), second.into_number()),
        (Component::Number(x), Some(second)) => (x, second.into_number()),
    };
    Ok(PositionValue::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_entirely;
    use css_values_units::{BasicProvider, StyleSnapshot};

    fn parse(text: &str) -> Result<PositionValue, String> {
        let context = ParserContext::new();
        parse_entirely(text, |input| parse_position(input, &context))
            .map_err(|diagnostic| diagnostic.message)
    }

    fn position(x: NumberValue, y: NumberValue) -> Result<PositionValue, String> {
        Ok(PositionValue::new(x, y))
    }

    /// Keywords map to edge percentages in either order; a single keyword centers the other
    /// axis.
    ///
    /// # Panics
    /// Panics if a keyword combination parses to the wrong point.
    #[test]
    fn keyword_combinations() {
        let percent = NumberValue::percent;
        assert_eq!(parse("left top"), position(percent(0.0), percent(0.0)));
        assert_eq!(parse("top left"), position(percent(0.0), percent(0.0)));
        assert_eq!(parse("bottom"), position(percent(50.0), percent(100.0)));
        assert_eq!(parse("right"), position(percent(100.0), percent(50.0)));
        assert_eq!(parse("center left"), position(percent(0.0), percent(50.0)));
        assert_eq!(parse("center bottom"), position(percent(50.0), percent(100.0)));
        assert_eq!(parse("center"), Ok(PositionValue::center()));
        assert_eq!(parse("10px 20%"), position(NumberValue::px(10.0), percent(20.0)));
        assert_eq!(parse("left 5px"), position(percent(0.0), NumberValue::px(5.0)));
    }

    /// Both components on one axis are rejected.
    ///
    /// # Panics
    /// Panics if a contradictory position parses.
    #[test]
    fn rejects_same_axis() {
        let invalid = Err("Invalid combination of values".to_owned());
        assert_eq!(parse("left right"), invalid);
        assert_eq!(parse("top bottom"), invalid);
        assert_eq!(parse("top 5px"), invalid);
        assert_eq!(parse("5px left"), invalid);
        assert_eq!(parse("auto"), Err("Unrecognized position value".to_owned()));
    }

    /// Printing prefers keywords and reparses to an equal position.
    ///
    /// # Panics
    /// Panics if a position prints unexpectedly or does not reparse.
    #[test]
    fn prints_keywords() {
        let cases = [
            ("left top", "left top"),
            ("center", "center"),
            ("bottom", "bottom"),
            ("right center", "right"),
            ("10px 100%", "10px bottom"),
            ("center 10px", "center 10px"),
            ("calc(10px + 50%) 3px", "calc(10px + 50%) 3px"),
        ];
        for (text, printed) in cases {
            let value = parse(text).unwrap_or_else(|message| panic!("{text}: {message}"));
            assert_eq!(value.to_css_string(), printed);
            assert_eq!(parse(printed), Ok(value));
        }
    }

    /// Compute keeps the handle when both coordinates are already computed.
    ///
    /// # Panics
    /// Panics if compute reallocates needlessly or leaves units unresolved.
    #[test]
    fn compute_identity() {
        let provider = BasicProvider::default();
        let style = StyleSnapshot::new(10.0);
        let context =
            ComputeContext::new(PropertyId::BackgroundPosition, &provider, &style, None);
        let computed = parse("10px 20%").unwrap_or_else(|message| panic!("{message}"));
        assert!(computed.compute(&context).ptr_eq(&computed));
        let relative = parse("2em 1em").unwrap_or_else(|message| panic!("{message}"));
        assert_eq!(
            relative.compute(&context),
            PositionValue::new(NumberValue::px(20.0), NumberValue::px(10.0))
        );
        assert_eq!(computed.resolve(200.0, 50.0), (10.0, 10.0));
    }
}
