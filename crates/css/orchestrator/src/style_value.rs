//! The closed set of value kinds a property can hold.

use core::fmt::{self, Write};

use css_backgrounds_borders::{BorderValue, CornerValue, PositionValue, RepeatValue};
use css_images::ImageValue;
use css_values_units::{ColorValue, ComputeContext, CssValue, NumberValue, PropertyId};
use cssparser::ToCss;

/// Any specified or computed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleValue {
    Number(NumberValue),
    Color(ColorValue),
    Corner(CornerValue),
    Position(PositionValue),
    Border(BorderValue),
    Repeat(RepeatValue),
    Image(ImageValue),
}

impl StyleValue {
    /// Short name of the variant, for log messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Color(_) => "color",
            Self::Corner(_) => "corner",
            Self::Position(_) => "position",
            Self::Border(_) => "border",
            Self::Repeat(_) => "repeat",
            Self::Image(_) => "image",
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<&NumberValue> {
        match self {
            Self::Number(number) => Some(number),
            _ => None,
        }
    }

    #[inline]
    pub fn as_color(&self) -> Option<&ColorValue> {
        match self {
            Self::Color(color) => Some(color),
            _ => None,
        }
    }

    #[inline]
    pub fn as_image(&self) -> Option<&ImageValue> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    #[inline]
    pub fn as_corner(&self) -> Option<&CornerValue> {
        match self {
            Self::Corner(corner) => Some(corner),
            _ => None,
        }
    }

    #[inline]
    pub fn as_position(&self) -> Option<&PositionValue> {
        match self {
            Self::Position(position) => Some(position),
            _ => None,
        }
    }

    #[inline]
    pub fn as_border(&self) -> Option<&BorderValue> {
        match self {
            Self::Border(border) => Some(border),
            _ => None,
        }
    }

    #[inline]
    pub fn as_repeat(&self) -> Option<&RepeatValue> {
        match self {
            Self::Repeat(repeat) => Some(repeat),
            _ => None,
        }
    }
}

impl CssValue for StyleValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        match self {
            Self::Number(value) => Self::Number(value.compute(context)),
            Self::Color(value) => Self::Color(value.compute(context)),
            Self::Corner(value) => Self::Corner(value.compute(context)),
            Self::Position(value) => Self::Position(value.compute(context)),
            Self::Border(value) => Self::Border(value.compute(context)),
            Self::Repeat(value) => Self::Repeat(value.compute(context)),
            Self::Image(value) => Self::Image(value.compute(context)),
        }
    }

    /// Values of different kinds never interpolate.
    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self> {
        match (self, end) {
            (Self::Number(start), Self::Number(end)) => {
                start.transition(end, property, progress).map(Self::Number)
            }
            (Self::Color(start), Self::Color(end)) => {
                start.transition(end, property, progress).map(Self::Color)
            }
            (Self::Corner(start), Self::Corner(end)) => {
                start.transition(end, property, progress).map(Self::Corner)
            }
            (Self::Position(start), Self::Position(end)) => {
                start.transition(end, property, progress).map(Self::Position)
            }
            (Self::Border(start), Self::Border(end)) => {
                start.transition(end, property, progress).map(Self::Border)
            }
            (Self::Repeat(start), Self::Repeat(end)) => {
                start.transition(end, property, progress).map(Self::Repeat)
            }
            (Self::Image(start), Self::Image(end)) => {
                start.transition(end, property, progress).map(Self::Image)
            }
            _ => None,
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.ptr_eq(right),
            (Self::Color(left), Self::Color(right)) => left.ptr_eq(right),
            (Self::Corner(left), Self::Corner(right)) => left.ptr_eq(right),
            (Self::Position(left), Self::Position(right)) => left.ptr_eq(right),
            (Self::Border(left), Self::Border(right)) => left.ptr_eq(right),
            (Self::Repeat(left), Self::Repeat(right)) => left.ptr_eq(right),
            (Self::Image(left), Self::Image(right)) => left.ptr_eq(right),
            _ => false,
        }
    }
}

impl ToCss for StyleValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::Number(value) => value.to_css(dest),
            Self::Color(value) => value.to_css(dest),
            Self::Corner(value) => value.to_css(dest),
            Self::Position(value) => value.to_css(dest),
            Self::Border(value) => value.to_css(dest),
            Self::Repeat(value) => value.to_css(dest),
            Self::Image(value) => value.to_css(dest),
        }
    }
}
