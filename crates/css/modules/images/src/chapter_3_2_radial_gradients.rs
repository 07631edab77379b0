//! CSS Images Module Level 3: §3.2 Radial Gradients, §3.4 repeating radial gradients
//! Spec: <https://www.w3.org/TR/css-images-3/#radial-gradients>

use core::f64::consts::SQRT_2;
use core::fmt::{self, Write};
use std::sync::Arc;

use css_backgrounds_borders::{PositionValue, parse_position};
use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use css_values_units::{
    ComputeContext, CssValue, NumberValue, ParseFlags, PropertyId, can_parse,
    keyword_name, parse_number_value, try_parse_keyword,
};
use cssparser::{Parser, ToCss};
use tiny_skia::{Pixmap, Transform};

use crate::chapter_3_5_color_stops::{
    ColorStop, compute_color_stops, parse_color_stops, resolve_color_stops,
    transition_color_stops, write_color_stops,
};
use crate::pattern::{Extend, Geometry, Pattern, PatternCache};

/// How far the ending shape reaches when no explicit size is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeKeyword {
    ClosestSide,
    FarthestSide,
    ClosestCorner,
    FarthestCorner,
}

const SIZE_KEYWORDS: [(&str, SizeKeyword); 4] = [
    ("closest-side", SizeKeyword::ClosestSide),
    ("farthest-side", SizeKeyword::FarthestSide),
    ("closest-corner", SizeKeyword::ClosestCorner),
    ("farthest-corner", SizeKeyword::FarthestCorner),
];

/// The size of the ending shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RadialSize {
    Keyword(SizeKeyword),
    /// Explicit radii. Circles carry one, ellipses two.
    Explicit {
        horizontal: NumberValue,
        vertical: Option<NumberValue>,
    },
}

#[derive(Debug, PartialEq)]
pub struct RadialGradientData {
    pub repeating: bool,
    pub circle: bool,
    pub size: RadialSize,
    pub position: PositionValue,
    pub stops: Vec<ColorStop>,
    cache: PatternCache,
}

/// `radial-gradient()` and `repeating-radial-gradient()`.
#[derive(Clone, Debug)]
pub struct RadialGradientValue(Arc<RadialGradientData>);

impl PartialEq for RadialGradientValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl RadialGradientValue {
    pub fn new(
        repeating: bool,
        circle: bool,
        size: RadialSize,
        position: PositionValue,
        stops: Vec<ColorStop>,
    ) -> Self {
        Self(Arc::new(RadialGradientData {
            repeating,
            circle,
            size,
            position,
            stops,
            cache: PatternCache::default(),
        }))
    }

    #[inline]
    pub fn repeating(&self) -> bool {
        self.0.repeating
    }

    #[inline]
    pub fn circle(&self) -> bool {
        self.0.circle
    }

    #[inline]
    pub fn size(&self) -> &RadialSize {
        &self.0.size
    }

    #[inline]
    pub fn position(&self) -> &PositionValue {
        &self.0.position
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.0.stops
    }

    /// Horizontal and vertical radius of the ending shape centered at `(x, y)` in a
    /// `width` × `height` box. Never below one pixel.
    fn radii(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let (near_x, far_x) = (x.min(width - x), x.max(width - x));
        let (near_y, far_y) = (y.min(height - y), y.max(height - y));
        let (horizontal, vertical) = match (self.size(), self.circle()) {
            (RadialSize::Explicit { horizontal, .. }, true) => {
                let radius = horizontal.get(width);
                (radius, radius)
            }
            (
                RadialSize::Explicit {
                    horizontal,
                    vertical,
                },
                false,
            ) => (
                horizontal.get(width),
                vertical.as_ref().unwrap_or(horizontal).get(height),
            ),
            (RadialSize::Keyword(SizeKeyword::ClosestSide), true) => {
                let radius = near_x.min(near_y);
                (radius, radius)
            }
            (RadialSize::Keyword(SizeKeyword::FarthestSide), true) => {
                let radius = far_x.max(far_y);
                (radius, radius)
            }
            (RadialSize::Keyword(SizeKeyword::ClosestCorner), true) => {
                let radius = near_x.hypot(near_y);
                (radius, radius)
            }
            (RadialSize::Keyword(SizeKeyword::FarthestCorner), true) => {
                let radius = far_x.hypot(far_y);
                (radius, radius)
            }
            (RadialSize::Keyword(SizeKeyword::ClosestSide), false) => (near_x, near_y),
            (RadialSize::Keyword(SizeKeyword::FarthestSide), false) => (far_x, far_y),
            (RadialSize::Keyword(SizeKeyword::ClosestCorner), false) => {
                (SQRT_2 * near_x, SQRT_2 * near_y)
            }
            (RadialSize::Keyword(SizeKeyword::FarthestCorner), false) => {
                (SQRT_2 * far_x, SQRT_2 * far_y)
            }
        };
        (horizontal.max(1.0), vertical.max(1.0))
    }

    /// Build the pattern for a `width` × `height` box.
    pub fn pattern(&self, width: f64, height: f64) -> Pattern {
        let (x, y) = self.position().resolve(width, height);
        let (horizontal, vertical) = self.radii(x, y, width, height);
        let resolved = resolve_color_stops(self.stops(), horizontal, self.repeating());
        // The pattern spans `start..end` of the radius; stops are relative to that span.
        let geometry = Geometry::Radial {
            center: (x, y),
            start_radius: horizontal * resolved.start,
            end_radius: horizontal * resolved.end,
            y_scale: vertical / horizontal,
        };
        Pattern {
            geometry,
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
}

impl CssValue for RadialGradientValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        let mut changed = false;
        let mut compute_number = |number: &NumberValue| {
            let computed = number.compute(context);
            changed |= !computed.ptr_eq(number);
            computed
        };
        let size = match self.size() {
            RadialSize::Keyword(keyword) => RadialSize::Keyword(*keyword),
            RadialSize::Explicit {
                horizontal,
                vertical,
            } => RadialSize::Explicit {
                horizontal: compute_number(horizontal),
                vertical: vertical.as_ref().map(&mut compute_number),
            },
        };
        let position = self.position().compute(context);
        changed |= !position.ptr_eq(self.position());
        let stops = compute_color_stops(self.stops(), context);
        if !changed && stops.is_none() {
            return self.clone();
        }
        Self::new(
            self.repeating(),
            self.circle(),
            size,
            position,
            stops.unwrap_or_else(|| self.stops().to_vec()),
        )
    }

    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self> {
        if self.repeating() != end.repeating() || self.circle() != end.circle() {
            return None;
        }
        let size = match (self.size(), end.size()) {
            (RadialSize::Keyword(start_keyword), RadialSize::Keyword(end_keyword))
                if start_keyword == end_keyword =>
            {
                RadialSize::Keyword(*start_keyword)
            }
            (
                RadialSize::Explicit {
                    horizontal: start_horizontal,
                    vertical: start_vertical,
                },
                RadialSize::Explicit {
                    horizontal: end_horizontal,
                    vertical: end_vertical,
                },
            ) => RadialSize::Explicit {
                horizontal: start_horizontal.transition(end_horizontal, property, progress)?,
                vertical: match (start_vertical, end_vertical) {
                    (Some(from), Some(to)) => Some(from.transition(to, property, progress)?),
                    _ => None,
                },
            },
            _ => return None,
        };
        let position = self
            .position()
            .transition(end.position(), property, progress)?;
        let stops = transition_color_stops(self.stops(), end.stops(), property, progress)?;
        Some(Self::new(
            self.repeating(),
            self.circle(),
            size,
            position,
            stops,
        ))
    }

    #[inline]
    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl ToCss for RadialGradientValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(if self.repeating() {
            "repeating-radial-gradient("
        } else {
            "radial-gradient("
        })?;
        match self.size() {
            RadialSize::Keyword(keyword) => {
                dest.write_str(if self.circle() { "circle " } else { "ellipse " })?;
                dest.write_str(keyword_name(&SIZE_KEYWORDS, keyword).unwrap_or_default())?;
            }
            RadialSize::Explicit {
                horizontal,
                vertical,
            } => {
                // A circle sized by a percentage only exists with an implied shape.
                if !self.circle() {
                    dest.write_str("ellipse ")?;
                } else if !horizontal.has_percent() {
                    dest.write_str("circle ")?;
                }
                horizontal.to_css(dest)?;
                if let Some(vertical) = vertical {
                    dest.write_str(" ")?;
                    vertical.to_css(dest)?;
                }
            }
        }
        dest.write_str(" at ")?;
        self.position().to_css(dest)?;
        dest.write_str(", ")?;
        write_color_stops(self.stops(), dest)?;
        dest.write_str(")")
    }
}

/// Shape and size as written, before defaults apply.
#[derive(Default)]
struct EndingShape {
    circle: Option<bool>,
    keyword: Option<SizeKeyword>,
    sizes: Vec<NumberValue>,
}

impl EndingShape {
    fn has_size(&self) -> bool {
        self.keyword.is_some() || !self.sizes.is_empty()
    }
}

fn parse_ending_shape<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, EndingShape> {
    let mut shape = EndingShape::default();
    loop {
        if shape.circle.is_none() && input.try_ident_matching("circle") {
            shape.circle = Some(true);
        } else if shape.circle.is_none() && input.try_ident_matching("ellipse") {
            shape.circle = Some(false);
        } else if !shape.has_size() {
            if let Some(keyword) = try_parse_keyword(input, &SIZE_KEYWORDS) {
                shape.keyword = Some(keyword);
            } else {
                let flags = ParseFlags::LENGTH | ParseFlags::PERCENT;
                while shape.sizes.len() < 2 && can_parse(input) {
                    shape.sizes.push(parse_number_value(input, context, flags)?);
                }
                if shape.sizes.is_empty() {
                    break;
                }
            }
        } else {
            break;
        }
        if shape.circle.is_some() && shape.has_size() {
            break;
        }
    }
    Ok(shape)
}

fn parse_arguments<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    repeating: bool,
    function: &str,
) -> ParseResult<'input, RadialGradientValue> {
    let shape = parse_ending_shape(input, context)?;
    let position = if input.try_ident_matching("at") {
        let position = parse_position(input, context)?;
        if !input.try_comma() {
            return Err(input.invalid("Expected a comma here"));
        }
        position
    } else {
        if (shape.circle.is_some() || shape.has_size()) && !input.try_comma() {
            return Err(input.invalid("Expected a comma here"));
        }
        PositionValue::center()
    };

    let circle = shape.circle.unwrap_or(shape.sizes.len() < 2);
    if shape.circle == Some(true) {
        if shape.sizes.len() > 1 {
            return Err(input.invalid("Circular gradient can only have one size"));
        }
        if shape.sizes.first().is_some_and(NumberValue::has_percent) {
            return Err(input.invalid("Circular gradient cannot have percentage as size"));
        }
    }
    let mut sizes = shape.sizes.into_iter();
    let size = match (shape.keyword, sizes.next()) {
        (Some(keyword), _) => RadialSize::Keyword(keyword),
        (None, Some(horizontal)) => {
            let vertical = if circle {
                None
            } else {
                Some(sizes.next().unwrap_or_else(|| horizontal.clone()))
            };
            RadialSize::Explicit {
                horizontal,
                vertical,
            }
        }
        (None, None) => RadialSize::Keyword(SizeKeyword::FarthestCorner),
    };

    let stops = parse_color_stops(input, context, function)?;
    if !input.is_exhausted() {
        return Err(input.invalid("Missing closing bracket at end of radial gradient"));
    }
    Ok(RadialGradientValue::new(
        repeating, circle, size, position, stops,
    ))
}

/// Parse `radial-gradient(...)` or `repeating-radial-gradient(...)`.
///
/// # Errors
/// Returns an error when neither function comes next or its arguments are malformed.
pub fn parse_radial_gradient<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, RadialGradientValue> {
    for (function, repeating) in [
        ("repeating-radial-gradient", true),
        ("radial-gradient", false),
    ] {
        if let Some(result) = input.try_function_block(function, |nested| {
            parse_arguments(nested, context, repeating, function)
        }) {
            return result;
        }
    }
    Err(input.invalid("Not a radial gradient"))
}
