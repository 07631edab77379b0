//! CSS Images Module Level 3: §3.1 Linear Gradients, §3.4 repeating linear gradients
//! Spec: <https://www.w3.org/TR/css-images-3/#linear-gradients>

use core::f64::consts::PI;
use core::fmt::{self, Write};
use core::ops::BitOr;
use std::sync::Arc;

use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use css_values_units::{
    ComputeContext, CssValue, NumberValue, ParseFlags, PropertyId, can_parse, parse_number_value,
};
use cssparser::{Parser, ToCss};
use tiny_skia::{Pixmap, Transform};

use crate::chapter_3_5_color_stops::{
    ColorStop, compute_color_stops, parse_color_stops, resolve_color_stops,
    transition_color_stops, write_color_stops,
};
use crate::pattern::{Extend, Geometry, Pattern, PatternCache};

/// The box sides a `to ...` clause names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Side(u8);

impl Side {
    pub const TOP: Self = Self(1 << 0);
    pub const RIGHT: Self = Self(1 << 1);
    pub const BOTTOM: Self = Self(1 << 2);
    pub const LEFT: Self = Self(1 << 3);

    const HORIZONTAL: Self = Self(Self::LEFT.0 | Self::RIGHT.0);
    const VERTICAL: Self = Self(Self::TOP.0 | Self::BOTTOM.0);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Direction of the gradient line in degrees, clockwise from `to top`, for a box of
    /// `width` × `height`. Corners aim so the line is perpendicular to the other diagonal.
    fn angle(self, width: f64, height: f64) -> f64 {
        match self {
            Self::TOP => 0.0,
            Self::RIGHT => 90.0,
            Self::BOTTOM => 180.0,
            Self::LEFT => 270.0,
            corner => {
                let x = if corner.contains(Self::TOP) { -width } else { width };
                let y = if corner.contains(Self::LEFT) { -height } else { height };
                x.atan2(y) * 180.0 / PI + 90.0
            }
        }
    }
}

impl BitOr for Side {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Where a linear gradient points.
#[derive(Clone, Debug, PartialEq)]
pub enum Direction {
    /// `to <side-or-corner>`.
    Side(Side),
    /// An explicit angle.
    Angle(NumberValue),
}

#[derive(Debug, PartialEq)]
pub struct LinearGradientData {
    pub repeating: bool,
    pub direction: Direction,
    pub stops: Vec<ColorStop>,
    cache: PatternCache,
}

/// `linear-gradient()` and `repeating-linear-gradient()`.
#[derive(Clone, Debug)]
pub struct LinearGradientValue(Arc<LinearGradientData>);

impl PartialEq for LinearGradientValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl LinearGradientValue {
    pub fn new(repeating: bool, direction: Direction, stops: Vec<ColorStop>) -> Self {
        Self(Arc::new(LinearGradientData {
            repeating,
            direction,
            stops,
            cache: PatternCache::default(),
        }))
    }

    #[inline]
    pub fn repeating(&self) -> bool {
        self.0.repeating
    }

    #[inline]
    pub fn direction(&self) -> &Direction {
        &self.0.direction
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.0.stops
    }

    fn function_name(&self) -> &'static str {
        if self.repeating() {
            "repeating-linear-gradient"
        } else {
            "linear-gradient"
        }
    }

    /// Build the pattern for a `width` × `height` box.
    pub fn pattern(&self, width: f64, height: f64) -> Pattern {
        let angle = match self.direction() {
            Direction::Side(side) => side.angle(width, height),
            Direction::Angle(angle) => angle.get(100.0),
        };
        let (x, y) = start_point(angle, width, height);
        let length = x.hypot(y);
        let resolved = resolve_color_stops(self.stops(), length, self.repeating());
        let (center_x, center_y) = (width / 2.0, height / 2.0);
        Pattern {
            geometry: Geometry::Linear {
                start: (
                    center_x + x * (resolved.start - 0.5),
                    center_y + y * (resolved.start - 0.5),
                ),
                end: (
                    center_x + x * (resolved.end - 0.5),
                    center_y + y * (resolved.end - 0.5),
                ),
            },
            extend: if self.repeating() {
                Extend::Repeat
            } else {
                Extend::Pad
            },
            stops: resolved.stops,
        }
    }

    /// Draw into the rectangle `(0, 0, width, height)` of `pixmap`.
    pub fn draw(&self, pixmap: &mut Pixmap, width: f64, height: f64) {
        let pattern = self
            .0
            .cache
            .get_or_build(width, height, || self.pattern(width, height));
        pattern.fill(pixmap, width, height, Transform::identity());
    }

    /// Whether a pattern for `width` × `height` is cached.
    pub fn has_cached_pattern(&self, width: f64, height: f64) -> bool {
        self.0.cache.holds(width, height)
    }
}

/// The end of the gradient line relative to the box center, for a line at `angle` degrees
/// clockwise from `to top`. The line passes through the center and the start is the mirror
/// image of the end.
fn start_point(angle: f64, width: f64, height: f64) -> (f64, f64) {
    let angle = angle.rem_euclid(360.0);
    // Axis-aligned angles would divide by zero below.
    match angle {
        0.0 => return (0.0, -height),
        90.0 => return (width, 0.0),
        180.0 => return (0.0, height),
        270.0 => return (-width, 0.0),
        _ => {}
    }
    let perpendicular = (angle * PI / 180.0).tan();
    let slope = -1.0 / perpendicular;
    let width = if angle > 180.0 { -width } else { width };
    let height = if angle < 90.0 || angle > 270.0 {
        -height
    } else {
        height
    };
    let intercept = height - perpendicular * width;
    let x = intercept / (slope - perpendicular);
    (x, perpendicular * x + intercept)
}

impl CssValue for LinearGradientValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        let direction = match self.direction() {
            Direction::Angle(angle) => {
                let computed = angle.compute(context);
                (!computed.ptr_eq(angle)).then_some(Direction::Angle(computed))
            }
            Direction::Side(_) => None,
        };
        let stops = compute_color_stops(self.stops(), context);
        if direction.is_none() && stops.is_none() {
            return self.clone();
        }
        Self::new(
            self.repeating(),
            direction.unwrap_or_else(|| self.direction().clone()),
            stops.unwrap_or_else(|| self.stops().to_vec()),
        )
    }

    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self> {
        if self.repeating() != end.repeating() {
            return None;
        }
        let direction = match (self.direction(), end.direction()) {
            (Direction::Side(start_side), Direction::Side(end_side)) if start_side == end_side => {
                Direction::Side(*start_side)
            }
            (Direction::Angle(start_angle), Direction::Angle(end_angle)) => {
                Direction::Angle(start_angle.transition(end_angle, property, progress)?)
            }
            _ => return None,
        };
        let stops = transition_color_stops(self.stops(), end.stops(), property, progress)?;
        Some(Self::new(self.repeating(), direction, stops))
    }

    #[inline]
    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl ToCss for LinearGradientValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(self.function_name())?;
        dest.write_str("(")?;
        match self.direction() {
            Direction::Side(side) if *side == Side::BOTTOM => {}
            Direction::Side(side) => {
                dest.write_str("to")?;
                if side.contains(Side::TOP) {
                    dest.write_str(" top")?;
                } else if side.contains(Side::BOTTOM) {
                    dest.write_str(" bottom")?;
                }
                if side.contains(Side::LEFT) {
                    dest.write_str(" left")?;
                } else if side.contains(Side::RIGHT) {
                    dest.write_str(" right")?;
                }
                dest.write_str(", ")?;
            }
            Direction::Angle(angle) => {
                angle.to_css(dest)?;
                dest.write_str(", ")?;
            }
        }
        write_color_stops(self.stops(), dest)?;
        dest.write_str(")")
    }
}

const SIDE_KEYWORDS: [(&str, Side); 4] = [
    ("left", Side::LEFT),
    ("right", Side::RIGHT),
    ("top", Side::TOP),
    ("bottom", Side::BOTTOM),
];

fn parse_sides<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, Side> {
    let mut sides = Side::default();
    for _ in 0..2 {
        let Some((_, side)) = SIDE_KEYWORDS
            .iter()
            .find(|(name, _)| input.try_ident_matching(name))
        else {
            break;
        };
        if side.intersects(Side::HORIZONTAL) && sides.intersects(Side::HORIZONTAL) {
            return Err(input.invalid("Expected 'top', 'bottom' or comma"));
        }
        if side.intersects(Side::VERTICAL) && sides.intersects(Side::VERTICAL) {
            return Err(input.invalid("Expected 'left', 'right' or comma"));
        }
        sides = sides | *side;
    }
    if sides.is_empty() {
        return Err(input.invalid("Expected side that gradient should go to"));
    }
    Ok(sides)
}

fn parse_arguments<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    repeating: bool,
    function: &str,
) -> ParseResult<'input, LinearGradientValue> {
    let direction = if input.try_ident_matching("to") {
        Some(Direction::Side(parse_sides(input)?))
    } else if can_parse(input) {
        Some(Direction::Angle(parse_number_value(
            input,
            context,
            ParseFlags::ANGLE,
        )?))
    } else {
        None
    };
    if direction.is_some() && !input.try_comma() {
        return Err(input.invalid("Expected a comma"));
    }
    let direction = direction.unwrap_or(Direction::Side(Side::BOTTOM));
    let stops = parse_color_stops(input, context, function)?;
    if !input.is_exhausted() {
        return Err(input.invalid("Missing closing bracket at end of linear gradient"));
    }
    Ok(LinearGradientValue::new(repeating, direction, stops))
}

/// Parse `linear-gradient(...)` or `repeating-linear-gradient(...)`.
///
/// # Errors
/// Returns an error when neither function comes next or its arguments are malformed.
pub fn parse_linear_gradient<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, LinearGradientValue> {
    for (function, repeating) in [
        ("repeating-linear-gradient", true),
        ("linear-gradient", false),
    ] {
        if let Some(result) = input.try_function_block(function, |nested| {
            parse_arguments(nested, context, repeating, function)
        }) {
            return result;
        }
    }
    Err(input.invalid("Not a linear gradient"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_entirely;
    use css_values_units::{BasicProvider, StyleSnapshot, Unit};

    fn parse(text: &str) -> Result<LinearGradientValue, String> {
        let context = ParserContext::new();
        parse_entirely(text, |input| parse_linear_gradient(input, &context))
            .map_err(|diagnostic| diagnostic.message)
    }

    fn gradient(text: &str) -> LinearGradientValue {
        parse(text).unwrap_or_else(|message| panic!("{text}: {message}"))
    }

    /// `to right` with two unpositioned stops resolves them to both ends of the line.
    ///
    /// # Panics
    /// Panics if the side or the stop offsets are wrong.
    #[test]
    fn to_right_two_stops() {
        let value = gradient("linear-gradient(to right, red, blue)");
        assert_eq!(value.direction(), &Direction::Side(Side::RIGHT));
        assert!(!value.repeating());
        let pattern = value.pattern(200.0, 100.0);
        let offsets: Vec<f64> = pattern.stops.iter().map(|stop| stop.offset).collect();
        assert_eq!(offsets, vec![0.0, 1.0]);
        assert_eq!(
            pattern.geometry,
            Geometry::Linear {
                start: (0.0, 50.0),
                end: (200.0, 50.0)
            }
        );
    }

    /// Contradictory or missing sides are rejected with a message naming what was expected.
    ///
    /// # Panics
    /// Panics if a malformed direction parses or reports the wrong message.
    #[test]
    fn rejects_bad_directions() {
        let cases = [
            ("linear-gradient(to left right, red, blue)", "Expected 'top', 'bottom' or comma"),
            ("linear-gradient(to top bottom, red, blue)", "Expected 'left', 'right' or comma"),
            ("linear-gradient(to, red, blue)", "Expected side that gradient should go to"),
            ("linear-gradient(to top red, blue)", "Expected a comma"),
            ("linear-gradient(45deg red, blue)", "Expected a comma"),
            ("radial-gradient(red, blue)", "Not a linear gradient"),
        ];
        for (text, message) in cases {
            assert_eq!(parse(text).err().as_deref(), Some(message), "{text}");
        }
    }

    /// Printing omits the default direction and reparses to an equal gradient.
    ///
    /// # Panics
    /// Panics if a gradient prints unexpectedly or does not reparse.
    #[test]
    fn prints_and_reparses() {
        let cases = [
            (
                "linear-gradient(to bottom, red, blue)",
                "linear-gradient(rgb(255,0,0), rgb(0,0,255))",
            ),
            (
                "repeating-linear-gradient(to left top, red 10%, blue 20px)",
                "repeating-linear-gradient(to top left, rgb(255,0,0) 10%, rgb(0,0,255) 20px)",
            ),
            (
                "linear-gradient(45deg, red, @accent)",
                "linear-gradient(45deg, rgb(255,0,0), @accent)",
            ),
        ];
        for (text, printed) in cases {
            let value = gradient(text);
            assert_eq!(value.to_css_string(), printed);
            assert_eq!(parse(printed), Ok(value));
        }
    }

    /// A 45 degree line in a square runs corner to corner.
    ///
    /// # Panics
    /// Panics if the start point is off the corner.
    #[test]
    fn diagonal_start_point() {
        let (x, y) = start_point(45.0, 100.0, 100.0);
        assert!((x - 100.0).abs() < 1e-9 && (y + 100.0).abs() < 1e-9);
        assert_eq!(start_point(-90.0, 30.0, 20.0), (-30.0, 0.0));
        let corner = Side::TOP | Side::RIGHT;
        assert!((corner.angle(100.0, 100.0) - 45.0).abs() < 1e-9);
    }

    /// Angles and stops interpolate; differing sides do not.
    ///
    /// # Panics
    /// Panics if a compatible pair fails to interpolate or an incompatible one succeeds.
    #[test]
    fn transitions() {
        let property = PropertyId::BackgroundImage;
        let start = gradient("linear-gradient(0deg, red, blue)");
        let end = gradient("linear-gradient(90deg, blue, red)");
        let mid = start.transition(&end, property, 0.5);
        assert_eq!(
            mid.as_ref().map(|value| value.direction().clone()),
            Some(Direction::Angle(NumberValue::new(45.0, Unit::Deg)))
        );
        let right = gradient("linear-gradient(to right, red, blue)");
        let left = gradient("linear-gradient(to left, red, blue)");
        assert!(right.transition(&left, property, 0.5).is_none());
        assert!(right.transition(&right, property, 0.5).is_some());
        let repeating = gradient("repeating-linear-gradient(to right, red, blue)");
        assert!(right.transition(&repeating, property, 0.5).is_none());
    }

    /// Compute normalizes the angle unit and keeps already computed gradients.
    ///
    /// # Panics
    /// Panics if compute reallocates needlessly or leaves the angle unnormalized.
    #[test]
    fn compute_identity() {
        let provider = BasicProvider::default();
        let style = StyleSnapshot::default();
        let context = ComputeContext::new(PropertyId::BackgroundImage, &provider, &style, None);
        let computed = gradient("linear-gradient(90deg, red, blue 50%)");
        assert!(computed.compute(&context).ptr_eq(&computed));
        let turned = gradient("linear-gradient(0.25turn, red, blue 50%)").compute(&context);
        assert_eq!(turned, computed);
    }

    /// Drawing fills the box and keeps the pattern for the drawn size.
    ///
    /// # Panics
    /// Panics if the edges carry the wrong colors or the pattern is not cached.
    #[test]
    fn draws_and_caches() {
        let value = gradient("linear-gradient(to right, red, blue)");
        let mut pixmap = Pixmap::new(64, 8).unwrap_or_else(|| panic!("pixmap"));
        value.draw(&mut pixmap, 64.0, 8.0);
        assert!(value.has_cached_pattern(64.0, 8.0));
        let left = pixmap.pixel(0, 4).unwrap_or_else(|| panic!("pixel"));
        let right = pixmap.pixel(63, 4).unwrap_or_else(|| panic!("pixel"));
        assert!(left.red() > 230 && right.blue() > 230);
    }
}
