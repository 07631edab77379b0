//! Property registry: name, inheritance, animation, initial value and grammar per property.

use core::fmt;

use css_backgrounds_borders::{
    BorderOptions, BorderValue, CornerValue, PositionValue, RepeatStyle, RepeatValue,
    parse_background_repeat, parse_border, parse_border_image_repeat, parse_corner,
    parse_position,
};
use css_images::{ImageValue, parse_image};
use css_syntax::{ParseResult, ParserContext};
use css_values_units::{
    ColorValue, INITIAL_COLOR, NumberValue, ParseFlags, PropertyId, Unit, parse_color,
    parse_number_value,
};
use cssparser::Parser;
use once_cell::sync::Lazy;

use crate::style_value::StyleValue;

/// Grammar of one property's value.
pub type ParseFn = for<'input, 'tokens> fn(
    &mut Parser<'input, 'tokens>,
    &ParserContext,
) -> ParseResult<'input, StyleValue>;

/// Static description of a property.
#[derive(Clone, Copy)]
pub struct PropertyInfo {
    pub id: PropertyId,
    /// Takes the parent's computed value when nothing is declared.
    pub inherited: bool,
    /// Interpolated by transitions rather than switched.
    pub animated: bool,
    parse: ParseFn,
}

impl PropertyInfo {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// The specified value used when nothing is declared and the property does not inherit.
    pub fn initial(&self) -> &'static StyleValue {
        &INITIAL_VALUES[self.id as usize]
    }

    /// Parse a declared value.
    ///
    /// # Errors
    /// Returns the grammar's error when the value does not match.
    #[inline]
    pub fn parse<'input>(
        &self,
        input: &mut Parser<'input, '_>,
        context: &ParserContext,
    ) -> ParseResult<'input, StyleValue> {
        (self.parse)(input, context)
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PropertyInfo")
            .field("id", &self.id)
            .field("inherited", &self.inherited)
            .field("animated", &self.animated)
            .finish_non_exhaustive()
    }
}

const fn info(id: PropertyId, inherited: bool, animated: bool, parse: ParseFn) -> PropertyInfo {
    PropertyInfo {
        id,
        inherited,
        animated,
        parse,
    }
}

/// Every property in `PropertyId::ALL` order.
static PROPERTIES: [PropertyInfo; 17] = [
    info(PropertyId::Color, true, true, parse_color_property),
    info(PropertyId::FontSize, true, true, parse_font_size),
    info(PropertyId::BackgroundColor, false, true, parse_color_property),
    info(PropertyId::BackgroundImage, false, true, parse_image_property),
    info(PropertyId::BackgroundRepeat, false, false, parse_background_repeat_property),
    info(PropertyId::BackgroundPosition, false, true, parse_position_property),
    info(PropertyId::BorderImageSource, false, true, parse_image_property),
    info(PropertyId::BorderImageSlice, false, false, parse_border_image_slice),
    info(PropertyId::BorderImageWidth, false, false, parse_border_image_width),
    info(PropertyId::BorderImageRepeat, false, false, parse_border_image_repeat_property),
    info(PropertyId::BorderTopLeftRadius, false, true, parse_corner_property),
    info(PropertyId::BorderTopRightRadius, false, true, parse_corner_property),
    info(PropertyId::BorderBottomRightRadius, false, true, parse_corner_property),
    info(PropertyId::BorderBottomLeftRadius, false, true, parse_corner_property),
    info(PropertyId::MinWidth, false, true, parse_min_size),
    info(PropertyId::MinHeight, false, true, parse_min_size),
    info(PropertyId::TransitionDuration, false, false, parse_transition_duration),
];

static INITIAL_VALUES: Lazy<[StyleValue; 17]> = Lazy::new(|| PropertyId::ALL.map(initial_value));

fn initial_value(property: PropertyId) -> StyleValue {
    let zero_px = || NumberValue::px(0.0);
    match property {
        PropertyId::Color => StyleValue::Color(ColorValue::literal(INITIAL_COLOR)),
        PropertyId::FontSize => StyleValue::Number(NumberValue::new(1.0, Unit::Rem)),
        PropertyId::BackgroundColor => StyleValue::Color(ColorValue::transparent()),
        PropertyId::BackgroundImage | PropertyId::BorderImageSource => {
            StyleValue::Image(ImageValue::None)
        }
        PropertyId::BackgroundRepeat => StyleValue::Repeat(RepeatValue::background(
            RepeatStyle::Repeat,
            RepeatStyle::Repeat,
        )),
        PropertyId::BackgroundPosition => StyleValue::Position(PositionValue::new(
            NumberValue::percent(0.0),
            NumberValue::percent(0.0),
        )),
        PropertyId::BorderImageSlice => {
            StyleValue::Border(BorderValue::uniform(&NumberValue::percent(100.0), false))
        }
        PropertyId::BorderImageWidth => {
            StyleValue::Border(BorderValue::uniform(&NumberValue::number(1.0), false))
        }
        PropertyId::BorderImageRepeat => StyleValue::Repeat(RepeatValue::border_image(
            RepeatStyle::NoRepeat,
            RepeatStyle::NoRepeat,
        )),
        PropertyId::BorderTopLeftRadius
        | PropertyId::BorderTopRightRadius
        | PropertyId::BorderBottomRightRadius
        | PropertyId::BorderBottomLeftRadius => {
            StyleValue::Corner(CornerValue::circular(zero_px()))
        }
        PropertyId::MinWidth | PropertyId::MinHeight => StyleValue::Number(zero_px()),
        PropertyId::TransitionDuration => StyleValue::Number(NumberValue::new(0.0, Unit::S)),
    }
}

/// The registry entry for `property`.
#[inline]
pub fn property_info(property: PropertyId) -> &'static PropertyInfo {
    &PROPERTIES[property as usize]
}

/// Look a property up by its stylesheet name.
pub fn lookup(name: &str) -> Option<&'static PropertyInfo> {
    PropertyId::from_name(name).map(property_info)
}

/// Every registered property, in compute order.
pub fn all_properties() -> &'static [PropertyInfo] {
    &PROPERTIES
}

fn parse_color_property<'input>(
    input: &mut Parser<'input, '_>,
    _context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_color(input).map(StyleValue::Color)
}

fn parse_font_size<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    let flags = ParseFlags::LENGTH | ParseFlags::PERCENT | ParseFlags::POSITIVE_ONLY;
    parse_number_value(input, context, flags).map(StyleValue::Number)
}

fn parse_image_property<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_image(input, context).map(StyleValue::Image)
}

fn parse_background_repeat_property<'input>(
    input: &mut Parser<'input, '_>,
    _context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_background_repeat(input).map(StyleValue::Repeat)
}

fn parse_border_image_repeat_property<'input>(
    input: &mut Parser<'input, '_>,
    _context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_border_image_repeat(input).map(StyleValue::Repeat)
}

fn parse_position_property<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_position(input, context).map(StyleValue::Position)
}

fn parse_border_image_slice<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    let options = BorderOptions {
        flags: ParseFlags::PERCENT | ParseFlags::NUMBER | ParseFlags::POSITIVE_ONLY,
        allow_auto: false,
        allow_fill: true,
    };
    parse_border(input, context, options).map(StyleValue::Border)
}

fn parse_border_image_width<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    let options = BorderOptions {
        flags: ParseFlags::PERCENT
            | ParseFlags::LENGTH
            | ParseFlags::NUMBER
            | ParseFlags::POSITIVE_ONLY,
        allow_auto: true,
        allow_fill: false,
    };
    parse_border(input, context, options).map(StyleValue::Border)
}

fn parse_corner_property<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_corner(input, context).map(StyleValue::Corner)
}

fn parse_min_size<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    let flags = ParseFlags::LENGTH | ParseFlags::POSITIVE_ONLY;
    parse_number_value(input, context, flags).map(StyleValue::Number)
}

fn parse_transition_duration<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
) -> ParseResult<'input, StyleValue> {
    parse_number_value(input, context, ParseFlags::TIME).map(StyleValue::Number)
}
