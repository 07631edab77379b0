//! CSS Backgrounds and Borders Module Level 3: §5 Rounded Corners
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#border-radius>

use core::fmt::{self, Write};
use std::sync::Arc;

use css_syntax::{ParseResult, ParserContext};
use css_values_units::{
    ComputeContext, CssValue, NumberValue, ParseFlags, PropertyId, can_parse, parse_number_value,
};
use cssparser::{Parser, ToCss};

#[derive(Debug, PartialEq)]
pub struct CornerData {
    pub x: NumberValue,
    pub y: NumberValue,
}

/// The horizontal and vertical radii of one rounded corner.
#[derive(Clone, Debug)]
pub struct CornerValue(Arc<CornerData>);

impl PartialEq for CornerValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl CornerValue {
    #[inline]
    pub fn new(x: NumberValue, y: NumberValue) -> Self {
        Self(Arc::new(CornerData { x, y }))
    }

    /// A circular corner: both radii share `radius`.
    pub fn circular(radius: NumberValue) -> Self {
        Self::new(radius.clone(), radius)
    }

    #[inline]
    pub fn x(&self) -> &NumberValue {
        &self.0.x
    }

    #[inline]
    pub fn y(&self) -> &NumberValue {
        &self.0.y
    }

    /// Radii in pixels for a box of `width` × `height`.
    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x().get(width), self.y().get(height))
    }
}

impl CssValue for CornerValue {
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

impl ToCss for CornerValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        self.x().to_css(dest)?;
        if self.x() != self.y() {
            dest.write_str(" ")?;
            self.y().to_css(dest)?;
        }
        Ok(())
    }
}

/// Parse one or two non-negative radii; a single radius is used for both axes.
///
/// # Errors
/// Returns an error when the radii are malformed or negative.
pub fn parse_corner<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, CornerValue> {
    let flags = ParseFlags::POSITIVE_ONLY
        | ParseFlags::PERCENT
        | ParseFlags::LENGTH
        | ParseFlags::NUMBER_AS_PIXELS;
    let x = parse_number_value(input, context, flags)?;
    if can_parse(input) {
        let y = parse_number_value(input, context, flags)?;
        return Ok(CornerValue::new(x, y));
    }
    Ok(CornerValue::circular(x))
}
