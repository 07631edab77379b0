//! The deprecated `-ctk-gradient()` image.
//!
//! Coordinates live in the unit square of the box being drawn: `0` is the left or top edge and
//! `1` the right or bottom one. Stops carry colors that may be symbolic; the drawing pattern
//! exists once every stop color is literal, which `compute()` arranges.

use core::fmt::{self, Write};
use std::sync::Arc;

use css_color::Rgba;
use css_syntax::{ParseResult, ParserExt as _, write_number};
use css_values_units::{ColorValue, ComputeContext, CssValue, PropertyId, parse_color};
use cssparser::{Parser, ToCss};
use log::trace;
use tiny_skia::{Pixmap, Transform};

use crate::pattern::{Extend, Geometry, Pattern, PatternStop};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LegacyKind {
    Linear,
    Radial,
}

/// A point of the gradient, with its circle radius for radial gradients.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LegacyPoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl LegacyPoint {
    fn lerp(self, end: Self, progress: f64) -> Self {
        let lerp = |from: f64, to: f64| from + (to - from) * progress;
        Self {
            x: lerp(self.x, end.x),
            y: lerp(self.y, end.y),
            radius: lerp(self.radius, end.radius),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegacyStop {
    pub offset: f64,
    pub color: ColorValue,
}

#[derive(Debug, PartialEq)]
pub struct LegacyGradientData {
    pub kind: LegacyKind,
    pub start: LegacyPoint,
    pub end: LegacyPoint,
    pub stops: Vec<LegacyStop>,
    /// Unit square pattern; present once all stop colors are resolved.
    pattern: Option<Pattern>,
}

/// `-ctk-gradient(linear|radial, ...)`.
#[derive(Clone, Debug)]
pub struct LegacyGradientValue(Arc<LegacyGradientData>);

impl PartialEq for LegacyGradientValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

fn build_pattern(
    kind: LegacyKind,
    start: LegacyPoint,
    end: LegacyPoint,
    colors: impl Iterator<Item = (f64, Rgba)>,
) -> Pattern {
    let geometry = match kind {
        LegacyKind::Linear => Geometry::Linear {
            start: (start.x, start.y),
            end: (end.x, end.y),
        },
        LegacyKind::Radial => Geometry::TwoCircle {
            start: (start.x, start.y),
            start_radius: start.radius,
            end: (end.x, end.y),
            end_radius: end.radius,
        },
    };
    Pattern {
        geometry,
        extend: Extend::Pad,
        stops: colors
            .map(|(offset, color)| PatternStop { offset, color })
            .collect(),
    }
}

impl LegacyGradientValue {
    /// A gradient whose pattern is built right away when every stop color is literal.
    pub fn new(
        kind: LegacyKind,
        start: LegacyPoint,
        end: LegacyPoint,
        stops: Vec<LegacyStop>,
    ) -> Self {
        let literal: Option<Vec<(f64, Rgba)>> = stops
            .iter()
            .map(|stop| stop.color.as_literal().map(|color| (stop.offset, color)))
            .collect();
        let pattern = literal.map(|colors| build_pattern(kind, start, end, colors.into_iter()));
        Self(Arc::new(LegacyGradientData {
            kind,
            start,
            end,
            stops,
            pattern,
        }))
    }

    #[inline]
    pub fn kind(&self) -> LegacyKind {
        self.0.kind
    }

    #[inline]
    pub fn start(&self) -> LegacyPoint {
        self.0.start
    }

    #[inline]
    pub fn end(&self) -> LegacyPoint {
        self.0.end
    }

    #[inline]
    pub fn stops(&self) -> &[LegacyStop] {
        &self.0.stops
    }

    /// The unit square pattern, once resolved.
    #[inline]
    pub fn pattern(&self) -> Option<&Pattern> {
        self.0.pattern.as_ref()
    }

    /// Draw into the rectangle `(0, 0, width, height)` of `pixmap`. Unresolved gradients draw
    /// nothing.
    pub fn draw(&self, pixmap: &mut Pixmap, width: f64, height: f64) {
        let Some(pattern) = self.pattern() else {
            trace!("not drawing an unresolved -ctk-gradient");
            return;
        };
        pattern.fill(
            pixmap,
            width,
            height,
            Transform::from_scale(width as f32, height as f32),
        );
    }
}

impl CssValue for LegacyGradientValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        if self.pattern().is_some() {
            return self.clone();
        }
        let colors = self.stops().iter().map(|stop| {
            let color = stop.color.compute(context);
            (stop.offset, color.as_literal().unwrap_or(Rgba::TRANSPARENT))
        });
        let pattern = build_pattern(self.kind(), self.start(), self.end(), colors);
        Self(Arc::new(LegacyGradientData {
            kind: self.kind(),
            start: self.start(),
            end: self.end(),
            stops: self.stops().to_vec(),
            pattern: Some(pattern),
        }))
    }

    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self> {
        if self.kind() != end.kind() || self.stops().len() != end.stops().len() {
            return None;
        }
        let stops = self
            .stops()
            .iter()
            .zip(end.stops())
            .map(|(from, to)| {
                Some(LegacyStop {
                    offset: from.offset + (to.offset - from.offset) * progress,
                    color: from.color.transition(&to.color, property, progress)?,
                })
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(
            self.kind(),
            self.start().lerp(end.start(), progress),
            self.end().lerp(end.end(), progress),
            stops,
        ))
    }

    #[inline]
    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn write_coordinate<W: Write>(
    value: f64,
    names: [&str; 3],
    dest: &mut W,
) -> fmt::Result {
    let [low, middle, high] = names;
    match value {
        0.0 => dest.write_str(low),
        0.5 => dest.write_str(middle),
        1.0 => dest.write_str(high),
        _ => write_number(value, dest),
    }
}

impl ToCss for LegacyGradientValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(match self.kind() {
            LegacyKind::Linear => "-ctk-gradient(linear",
            LegacyKind::Radial => "-ctk-gradient(radial",
        })?;
        for point in [self.start(), self.end()] {
            dest.write_str(", ")?;
            write_coordinate(point.x, ["left", "center", "right"], dest)?;
            dest.write_str(" ")?;
            write_coordinate(point.y, ["top", "center", "bottom"], dest)?;
            if self.kind() == LegacyKind::Radial {
                dest.write_str(", ")?;
                write_number(point.radius, dest)?;
            }
        }
        for stop in self.stops() {
            match stop.offset {
                0.0 => dest.write_str(", from(")?,
                1.0 => dest.write_str(", to(")?,
                offset => {
                    dest.write_str(", color-stop(")?;
                    write_number(offset, dest)?;
                    dest.write_str(", ")?;
                }
            }
            stop.color.to_css(dest)?;
            dest.write_str(")")?;
        }
        dest.write_str(")")
    }
}

fn parse_coordinate<'input>(
    input: &mut Parser<'input, '_>,
    names: [&str; 3],
    message: &str,
) -> ParseResult<'input, f64> {
    let [low, middle, high] = names;
    if input.try_ident_matching(low) {
        Ok(0.0)
    } else if input.try_ident_matching(high) {
        Ok(1.0)
    } else if input.try_ident_matching(middle) {
        Ok(0.5)
    } else {
        input.try_double().ok_or_else(|| input.invalid(message))
    }
}

fn parse_point<'input>(
    input: &mut Parser<'input, '_>,
    kind: LegacyKind,
) -> ParseResult<'input, LegacyPoint> {
    if !input.try_comma() {
        return Err(input.invalid("Expected ','"));
    }
    let x = parse_coordinate(input, ["left", "center", "right"], "Expected a valid X coordinate")?;
    let y = parse_coordinate(input, ["top", "center", "bottom"], "Expected a valid Y coordinate")?;
    let radius = match kind {
        LegacyKind::Linear => 0.0,
        LegacyKind::Radial => {
            if !input.try_comma() {
                return Err(input.invalid("Expected ','"));
            }
            input
                .try_double()
                .ok_or_else(|| input.invalid("Expected a number for the radius"))?
        }
    };
    Ok(LegacyPoint { x, y, radius })
}

/// The color and closing parenthesis of a stop clause.
fn finish_stop<'input>(
    input: &mut Parser<'input, '_>,
    offset: f64,
) -> ParseResult<'input, LegacyStop> {
    let color = parse_color(input)?;
    if !input.is_exhausted() {
        return Err(input.invalid("Expected ')'"));
    }
    Ok(LegacyStop { offset, color })
}

fn parse_stop<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, LegacyStop> {
    if let Some(stop) = input.try_function_block("from", |nested| finish_stop(nested, 0.0)) {
        return stop;
    }
    if let Some(stop) = input.try_function_block("to", |nested| finish_stop(nested, 1.0)) {
        return stop;
    }
    if let Some(stop) = input.try_function_block("color-stop", |nested| {
        let Some(offset) = nested.try_double() else {
            return Err(nested.invalid("Expected a valid number"));
        };
        if !nested.try_comma() {
            return Err(nested.invalid("Expected a comma"));
        }
        finish_stop(nested, offset)
    }) {
        return stop;
    }
    Err(input.invalid("Not a valid color-stop definition"))
}

fn parse_arguments<'input>(
    input: &mut Parser<'input, '_>,
) -> ParseResult<'input, LegacyGradientValue> {
    let kind = if input.try_ident_matching("linear") {
        LegacyKind::Linear
    } else if input.try_ident_matching("radial") {
        LegacyKind::Radial
    } else {
        return Err(input.invalid("Gradient type must be 'radial' or 'linear'"));
    };
    let start = parse_point(input, kind)?;
    let end = parse_point(input, kind)?;
    let mut stops = Vec::new();
    while input.try_comma() {
        stops.push(parse_stop(input)?);
    }
    if !input.is_exhausted() {
        return Err(input.invalid("Expected ')'"));
    }
    Ok(LegacyGradientValue::new(kind, start, end, stops))
}

/// Parse `-ctk-gradient(...)`.
///
/// # Errors
/// Returns an error when the function does not come next or its arguments are malformed.
pub fn parse_legacy_gradient<'input>(
    input: &mut Parser<'input, '_>,
) -> ParseResult<'input, LegacyGradientValue> {
    input
        .try_function_block("-ctk-gradient", parse_arguments)
        .unwrap_or_else(|| Err(input.invalid("Expected '-ctk-gradient'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_entirely;
    use css_values_units::{BasicProvider, StyleSnapshot};

    fn parse(text: &str) -> Result<LegacyGradientValue, String> {
        parse_entirely(text, parse_legacy_gradient).map_err(|diagnostic| diagnostic.message)
    }

    fn gradient(text: &str) -> LegacyGradientValue {
        parse(text).unwrap_or_else(|message| panic!("{text}: {message}"))
    }

    /// Keyword coordinates map onto the unit square and stops keep their offsets.
    ///
    /// # Panics
    /// Panics if coordinates or stops are parsed wrongly.
    #[test]
    fn parses_linear() {
        let value = gradient(
            "-ctk-gradient (linear, left top, right bottom, from(red), color-stop(0.25, lime), to (blue))",
        );
        assert_eq!(value.kind(), LegacyKind::Linear);
        assert_eq!(value.start(), LegacyPoint::default());
        assert_eq!(
            value.end(),
            LegacyPoint {
                x: 1.0,
                y: 1.0,
                radius: 0.0
            }
        );
        let offsets: Vec<f64> = value.stops().iter().map(|stop| stop.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.25, 1.0]);
        assert!(value.pattern().is_some());
    }

    /// Each malformed piece reports its own message.
    ///
    /// # Panics
    /// Panics if a malformed gradient parses or reports the wrong message.
    #[test]
    fn reports_errors() {
        let cases = [
            ("-ctk-gradient(conic, left top, right top)", "Gradient type must be 'radial' or 'linear'"),
            ("-ctk-gradient(linear left top, right top)", "Expected ','"),
            ("-ctk-gradient(linear, top top, right top)", "Expected a valid X coordinate"),
            ("-ctk-gradient(linear, left left, right top)", "Expected a valid Y coordinate"),
            ("-ctk-gradient(radial, center center 1, right top, 1)", "Expected ','"),
            ("-ctk-gradient(radial, center center, big, center center, 1)", "Expected a number for the radius"),
            ("-ctk-gradient(linear, 0 0, 1 0, stop(red))", "Not a valid color-stop definition"),
            ("-ctk-gradient(linear, 0 0, 1 0, color-stop(half, red))", "Expected a valid number"),
            ("-ctk-gradient(linear, 0 0, 1 0, color-stop(0.5 red))", "Expected a comma"),
            ("-ctk-gradient(linear, 0 0, 1 0, from(red blue))", "Expected ')'"),
            ("-ctk-gradient(linear, 0 0, 1 0 from(red))", "Expected ')'"),
            ("linear-gradient(red, blue)", "Expected '-ctk-gradient'"),
        ];
        for (text, message) in cases {
            assert_eq!(parse(text).err().as_deref(), Some(message), "{text}");
        }
    }

    /// Printing uses keywords for edge coordinates and reparses to an equal gradient.
    ///
    /// # Panics
    /// Panics if a gradient prints unexpectedly or does not reparse.
    #[test]
    fn prints_and_reparses() {
        let cases = [
            (
                "-ctk-gradient(linear, left top, 0.3 bottom, from(red), to(@accent))",
                "-ctk-gradient(linear, left top, 0.3 bottom, from(rgb(255,0,0)), to(@accent))",
            ),
            (
                "-ctk-gradient(radial, center center, 0, center center, 0.5, color-stop(0.5, blue))",
                "-ctk-gradient(radial, center center, 0, center center, 0.5, color-stop(0.5, rgb(0,0,255)))",
            ),
        ];
        for (text, printed) in cases {
            let value = gradient(text);
            assert_eq!(value.to_css_string(), printed);
            assert_eq!(parse(printed), Ok(value));
        }
    }

    /// Compute resolves symbolic colors once; resolved gradients compute to themselves.
    ///
    /// # Panics
    /// Panics if compute leaves the pattern unresolved or reallocates a resolved gradient.
    #[test]
    fn compute_resolves_colors() {
        let provider = BasicProvider::default();
        let style = StyleSnapshot::default();
        let context = ComputeContext::new(PropertyId::BackgroundImage, &provider, &style, None);

        let symbolic = gradient("-ctk-gradient(linear, 0 0, 1 0, from(@missing), to(blue))");
        assert!(symbolic.pattern().is_none());
        let computed = symbolic.compute(&context);
        let pattern = computed
            .pattern()
            .unwrap_or_else(|| panic!("computed gradient should be resolved"));
        assert_eq!(
            pattern.stops.first().map(|stop| stop.color),
            Some(Rgba::TRANSPARENT)
        );
        assert!(computed.compute(&context).ptr_eq(&computed));
        assert_ne!(computed, symbolic);
    }

    /// Gradients of one kind with as many stops interpolate geometry and colors.
    ///
    /// # Panics
    /// Panics if compatible gradients do not interpolate or incompatible ones do.
    #[test]
    fn transitions() {
        let property = PropertyId::BackgroundImage;
        let start = gradient("-ctk-gradient(linear, left top, left bottom, from(black), to(black))");
        let end = gradient("-ctk-gradient(linear, right top, right bottom, from(white), to(white))");
        let mid = start
            .transition(&end, property, 0.5)
            .unwrap_or_else(|| panic!("should interpolate"));
        assert!((mid.start().x - 0.5).abs() < 1e-9);
        let color = mid.stops().first().and_then(|stop| stop.color.as_literal());
        assert!(color.is_some_and(|rgba| (rgba.red - 0.5).abs() < 1e-9));

        let radial = gradient("-ctk-gradient(radial, 0 0, 0, 0 0, 1, from(black), to(black))");
        assert!(start.transition(&radial, property, 0.5).is_none());
        let longer = gradient(
            "-ctk-gradient(linear, 0 0, 0 1, from(black), color-stop(0.5, red), to(black))",
        );
        assert!(start.transition(&longer, property, 0.5).is_none());
    }

    /// Drawing scales the unit square to the box.
    ///
    /// # Panics
    /// Panics if the edges do not carry the end colors.
    #[test]
    fn draws_scaled() {
        let value = gradient("-ctk-gradient(linear, left top, right top, from(red), to(blue))");
        let mut pixmap = Pixmap::new(50, 10).unwrap_or_else(|| panic!("pixmap"));
        value.draw(&mut pixmap, 50.0, 10.0);
        let left = pixmap.pixel(0, 5).unwrap_or_else(|| panic!("pixel"));
        let right = pixmap.pixel(49, 5).unwrap_or_else(|| panic!("pixel"));
        assert!(left.red() > 230);
        assert!(right.blue() > 230);
    }

    /// Concentric circles fade from the start circle to the end circle; a zero start radius
    /// off the end center fades from that focal point.
    ///
    /// # Panics
    /// Panics if a radial gradient puts its colors in the wrong places.
    #[test]
    fn draws_radial() {
        let pixel = |pixmap: &Pixmap, x: u32, y: u32| {
            pixmap.pixel(x, y).unwrap_or_else(|| panic!("pixel {x},{y}"))
        };
        let ring = gradient(
            "-ctk-gradient(radial, center center, 0.2, center center, 0.5, from(red), to(blue))",
        );
        let mut pixmap = Pixmap::new(100, 100).unwrap_or_else(|| panic!("pixmap"));
        ring.draw(&mut pixmap, 100.0, 100.0);
        assert!(pixel(&pixmap, 50, 60).red() > 230);
        let middle = pixel(&pixmap, 50, 85);
        assert!((100..160).contains(&middle.red()) && (100..160).contains(&middle.blue()));
        assert!(pixel(&pixmap, 0, 0).blue() > 230);

        let focal = gradient(
            "-ctk-gradient(radial, 0.25 center, 0, center center, 0.5, from(red), to(blue))",
        );
        let mut focal_pixmap = Pixmap::new(100, 100).unwrap_or_else(|| panic!("pixmap"));
        focal.draw(&mut focal_pixmap, 100.0, 100.0);
        assert!(pixel(&focal_pixmap, 25, 50).red() > 230);
        assert!(pixel(&focal_pixmap, 98, 50).blue() > 200);
    }
}
