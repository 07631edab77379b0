//! CSS Images Module Level 3: §3.5 Gradient Color-Stops
//! Spec: <https://www.w3.org/TR/css-images-3/#color-stop-syntax>
//!
//! Shared by linear and radial gradients: the stop list grammar, computing and interpolating
//! stops, and resolving their offsets along a gradient line of known length.

use core::fmt::{self, Write};

use css_color::Rgba;
use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use css_values_units::{
    ColorValue, ComputeContext, CssValue as _, NumberValue, ParseFlags, PropertyId, can_parse,
    parse_color, parse_number_value,
};
use cssparser::{Parser, ToCss};

use crate::pattern::PatternStop;

/// A color with an optional position along the gradient line.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorStop {
    pub color: ColorValue,
    pub offset: Option<NumberValue>,
}

impl ColorStop {
    #[inline]
    pub fn new(color: ColorValue, offset: Option<NumberValue>) -> Self {
        Self { color, offset }
    }

    fn position(&self, length: f64) -> Option<f64> {
        self.offset
            .as_ref()
            .map(|offset| offset.get(length) / length)
    }
}

/// Parse a comma separated list of `<color> [<length-percentage>]` stops for `function`.
///
/// A single stop is accepted with a deprecation warning.
///
/// # Errors
/// Returns an error when a color or an offset is malformed.
pub fn parse_color_stops<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    function: &str,
) -> ParseResult<'input, Vec<ColorStop>> {
    let mut stops = Vec::new();
    loop {
        let color = parse_color(input)?;
        let offset = if can_parse(input) {
            Some(parse_number_value(
                input,
                context,
                ParseFlags::PERCENT | ParseFlags::LENGTH,
            )?)
        } else {
            None
        };
        stops.push(ColorStop::new(color, offset));
        if !input.try_comma() {
            break;
        }
    }
    if stops.len() < 2 {
        context.deprecated(
            input.current_source_location(),
            format!("Using one color stop with {function}() is deprecated."),
        );
    }
    Ok(stops)
}

/// Print stops as `color [offset]`, separated by `", "`.
///
/// # Errors
/// Propagates errors from `dest`.
pub fn write_color_stops<W: Write>(stops: &[ColorStop], dest: &mut W) -> fmt::Result {
    for (index, stop) in stops.iter().enumerate() {
        if index > 0 {
            dest.write_str(", ")?;
        }
        stop.color.to_css(dest)?;
        if let Some(offset) = &stop.offset {
            dest.write_str(" ")?;
            offset.to_css(dest)?;
        }
    }
    Ok(())
}

/// Compute every stop. `None` when no stop changed.
pub fn compute_color_stops(stops: &[ColorStop], context: &ComputeContext<'_>) -> Option<Vec<ColorStop>> {
    let mut changed = false;
    let computed = stops
        .iter()
        .map(|stop| {
            let color = stop.color.compute(context);
            let offset = stop.offset.as_ref().map(|offset| {
                let computed = offset.compute(context);
                changed |= !computed.ptr_eq(offset);
                computed
            });
            changed |= !color.ptr_eq(&stop.color);
            ColorStop::new(color, offset)
        })
        .collect();
    changed.then_some(computed)
}

/// Interpolate two stop lists pairwise.
///
/// `None` when the lists differ in length, a pair disagrees on having an offset, or a pair
/// cannot be interpolated.
pub fn transition_color_stops(
    start: &[ColorStop],
    end: &[ColorStop],
    property: PropertyId,
    progress: f64,
) -> Option<Vec<ColorStop>> {
    if start.len() != end.len() {
        return None;
    }
    start
        .iter()
        .zip(end)
        .map(|(from, to)| {
            let offset = match (&from.offset, &to.offset) {
                (None, None) => None,
                (Some(from_offset), Some(to_offset)) => {
                    Some(from_offset.transition(to_offset, property, progress)?)
                }
                _ => return None,
            };
            let color = from.color.transition(&to.color, property, progress)?;
            Some(ColorStop::new(color, offset))
        })
        .collect()
}

/// Stops placed along a gradient line, normalized to the part of the line the pattern covers.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStops {
    /// Where the pattern starts, as a fraction of the gradient line.
    pub start: f64,
    /// Where the pattern ends, as a fraction of the gradient line.
    pub end: f64,
    /// Stops with offsets in `[0, 1]` relative to `start..end`, non-decreasing.
    pub stops: Vec<PatternStop>,
}

/// The part of the gradient line a pattern covers: the whole line, or for repeating
/// gradients the span from the first stop to the farthest one.
fn span(stops: &[ColorStop], length: f64, repeating: bool) -> (f64, f64) {
    if !repeating {
        return (0.0, 1.0);
    }
    let start = stops
        .first()
        .and_then(|stop| stop.position(length))
        .unwrap_or(0.0);
    let mut end = stops
        .iter()
        .filter_map(|stop| stop.position(length))
        .fold(start, f64::max);
    if stops.last().is_some_and(|stop| stop.offset.is_none()) {
        end = end.max(1.0);
    }
    (start, end)
}

/// Resolve stop offsets along a gradient line `length` pixels long.
///
/// A first or last stop without offset sits at the start or end of the line. Other stops
/// without offset are spread evenly between their positioned neighbours, and no stop is placed
/// before the stop preceding it.
pub fn resolve_color_stops(stops: &[ColorStop], length: f64, repeating: bool) -> ResolvedStops {
    let length = if length > 0.0 { length } else { 1.0 };
    let (start, end) = span(stops, length, repeating);
    let color = |stop: &ColorStop| stop.color.as_literal().unwrap_or(Rgba::TRANSPARENT);
    if end - start <= f64::EPSILON {
        // A zero length repeating span shows only its last color.
        let stops = stops
            .last()
            .map(|stop| PatternStop {
                offset: 0.0,
                color: color(stop),
            })
            .into_iter()
            .collect();
        return ResolvedStops { start, end, stops };
    }

    let mut resolved = Vec::with_capacity(stops.len());
    let mut offset = start;
    let mut pending = 0;
    for (index, stop) in stops.iter().enumerate() {
        let position = match stop.position(length) {
            Some(position) => position,
            None if index == 0 => 0.0,
            None if index + 1 == stops.len() => 1.0,
            None => continue,
        };
        let position = position.max(offset);
        let step = (position - offset) / (index + 1 - pending) as f64;
        for placed in stops.get(pending..=index).unwrap_or_default() {
            offset += step;
            resolved.push(PatternStop {
                offset: (offset - start) / (end - start),
                color: color(placed),
            });
        }
        offset = position;
        pending = index + 1;
    }
    ResolvedStops {
        start,
        end,
        stops: resolved,
    }
}
