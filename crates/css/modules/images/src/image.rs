//! The `<image>` value: `none` or one of the image functions.

use core::fmt::{self, Write};

use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use css_values_units::{ComputeContext, CssValue, PropertyId, Win32ThemeEngine};
use cssparser::{Parser, ToCss, Token};
use tiny_skia::Pixmap;

use crate::chapter_3_1_linear_gradients::{LinearGradientValue, parse_linear_gradient};
use crate::chapter_3_2_radial_gradients::{RadialGradientValue, parse_radial_gradient};
use crate::legacy_gradient::{LegacyGradientValue, parse_legacy_gradient};
use crate::win32_theme_part::{Win32PartValue, parse_win32_part};

#[derive(Clone, Debug, PartialEq)]
pub enum ImageValue {
    None,
    Linear(LinearGradientValue),
    Radial(RadialGradientValue),
    Legacy(LegacyGradientValue),
    Win32Part(Win32PartValue),
}

impl ImageValue {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Draw into the rectangle `(0, 0, width, height)` of `pixmap`.
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        width: f64,
        height: f64,
        engine: &dyn Win32ThemeEngine,
    ) {
        match self {
            Self::None => {}
            Self::Linear(gradient) => gradient.draw(pixmap, width, height),
            Self::Radial(gradient) => gradient.draw(pixmap, width, height),
            Self::Legacy(gradient) => gradient.draw(pixmap, width, height),
            Self::Win32Part(part) => part.draw(pixmap, width, height, engine),
        }
    }
}

impl CssValue for ImageValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        match self {
            Self::None => Self::None,
            Self::Linear(gradient) => Self::Linear(gradient.compute(context)),
            Self::Radial(gradient) => Self::Radial(gradient.compute(context)),
            Self::Legacy(gradient) => Self::Legacy(gradient.compute(context)),
            Self::Win32Part(part) => Self::Win32Part(part.compute(context)),
        }
    }

    /// Images of different kinds never interpolate.
    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self> {
        match (self, end) {
            (Self::None, Self::None) => Some(Self::None),
            (Self::Linear(start), Self::Linear(end)) => {
                start.transition(end, property, progress).map(Self::Linear)
            }
            (Self::Radial(start), Self::Radial(end)) => {
                start.transition(end, property, progress).map(Self::Radial)
            }
            (Self::Legacy(start), Self::Legacy(end)) => {
                start.transition(end, property, progress).map(Self::Legacy)
            }
            (Self::Win32Part(start), Self::Win32Part(end)) => {
                start.transition(end, property, progress).map(Self::Win32Part)
            }
            _ => None,
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Linear(left), Self::Linear(right)) => left.ptr_eq(right),
            (Self::Radial(left), Self::Radial(right)) => left.ptr_eq(right),
            (Self::Legacy(left), Self::Legacy(right)) => left.ptr_eq(right),
            (Self::Win32Part(left), Self::Win32Part(right)) => left.ptr_eq(right),
            _ => false,
        }
    }
}

impl ToCss for ImageValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        match self {
            Self::None => dest.write_str("none"),
            Self::Linear(gradient) => gradient.to_css(dest),
            Self::Radial(gradient) => gradient.to_css(dest),
            Self::Legacy(gradient) => gradient.to_css(dest),
            Self::Win32Part(part) => part.to_css(dest),
        }
    }
}

#[derive(Clone, Copy)]
enum ImageFunction {
    Linear,
    Radial,
    Legacy,
    Win32Part,
}

const IMAGE_FUNCTIONS: [(&str, ImageFunction); 6] = [
    ("linear-gradient", ImageFunction::Linear),
    ("repeating-linear-gradient", ImageFunction::Linear),
    ("radial-gradient", ImageFunction::Radial),
    ("repeating-radial-gradient", ImageFunction::Radial),
    ("-ctk-gradient", ImageFunction::Legacy),
    ("-ctk-win32-theme-part", ImageFunction::Win32Part),
];

/// Whether the function `name` comes next, spelled `name(` or `name (`.
fn opens(input: &mut Parser<'_, '_>, name: &str) -> bool {
    let start = input.state();
    let found = match input.next() {
        Ok(Token::Function(function)) => function.eq_ignore_ascii_case(name),
        _ => false,
    };
    input.reset(&start);
    found || input.peek_ident_matching(name)
}

/// Parse `none` or an image function.
///
/// # Errors
/// Returns an error when no image comes next or the image function is malformed.
pub fn parse_image<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, ImageValue> {
    if input.try_ident_matching("none") {
        return Ok(ImageValue::None);
    }
    let function = IMAGE_FUNCTIONS
        .iter()
        .find(|(name, _)| opens(input, name))
        .map(|(_, function)| *function);
    match function {
        Some(ImageFunction::Linear) => parse_linear_gradient(input, context).map(ImageValue::Linear),
        Some(ImageFunction::Radial) => parse_radial_gradient(input, context).map(ImageValue::Radial),
        Some(ImageFunction::Legacy) => parse_legacy_gradient(input).map(ImageValue::Legacy),
        Some(ImageFunction::Win32Part) => parse_win32_part(input).map(ImageValue::Win32Part),
        None => Err(input.invalid("Not a valid image")),
    }
}
