//! CSS Values & Units Level 3: §6 Distance Units, §7 Other Quantities
//! Spec: <https://www.w3.org/TR/css-values-3/#lengths>
//!
//! Fixed conversion table (reference pixel is 1/96in):
//!
//! | unit | `compute()` result | `get()` result |
//! |---|---|---|
//! | `pt` | ×96/72 px | same |
//! | `pc` | ×96/6 px | same |
//! | `in` | ×96 px | same |
//! | `cm` | ×96/2.54 px | same |
//! | `mm` | ×96/25.4 px | same |
//! | `em` | × base font size px | ×16 |
//! | `ex` | × half the base font size px | ×8 |
//! | `rem` | × default font size px | ×16 |
//! | `rad` | ×180/π deg | same |
//! | `grad` | ×360/400 deg | same |
//! | `turn` | ×360 deg | same |
//! | `s` | unchanged | ×1000 ms |
//! | `ms` | ÷1000 s | unchanged |

use core::f64::consts::PI;
use core::fmt::{self, Write};

use cssparser::{Parser, Token};
use css_syntax::{ParseResult, ParserContext, ParserExt as _, write_number};

use crate::chapter_4_numbers::ParseFlags;
use crate::context::{ComputeContext, PropertyId};

/// Font size assumed by `get()` for font-relative units, which has no style to consult.
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// The unit tag of a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Number,
    Percent,
    Px,
    Pt,
    Em,
    Ex,
    Rem,
    Pc,
    In,
    Cm,
    Mm,
    Rad,
    Deg,
    Grad,
    Turn,
    S,
    Ms,
}

/// The category a unit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Number,
    Percentage,
    Length,
    Angle,
    Time,
}

/// Unit names accepted after a number, with the flag that enables each.
const UNIT_NAMES: [(&str, Unit, ParseFlags); 15] = [
    ("px", Unit::Px, ParseFlags::LENGTH),
    ("pt", Unit::Pt, ParseFlags::LENGTH),
    ("em", Unit::Em, ParseFlags::LENGTH),
    ("ex", Unit::Ex, ParseFlags::LENGTH),
    ("rem", Unit::Rem, ParseFlags::LENGTH),
    ("pc", Unit::Pc, ParseFlags::LENGTH),
    ("in", Unit::In, ParseFlags::LENGTH),
    ("cm", Unit::Cm, ParseFlags::LENGTH),
    ("mm", Unit::Mm, ParseFlags::LENGTH),
    ("rad", Unit::Rad, ParseFlags::ANGLE),
    ("deg", Unit::Deg, ParseFlags::ANGLE),
    ("grad", Unit::Grad, ParseFlags::ANGLE),
    ("turn", Unit::Turn, ParseFlags::ANGLE),
    ("s", Unit::S, ParseFlags::TIME),
    ("ms", Unit::Ms, ParseFlags::TIME),
];

impl Unit {
    /// The category of this unit. Total over every unit.
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::Number => Dimension::Number,
            Self::Percent => Dimension::Percentage,
            Self::Px
            | Self::Pt
            | Self::Em
            | Self::Ex
            | Self::Rem
            | Self::Pc
            | Self::In
            | Self::Cm
            | Self::Mm => Dimension::Length,
            Self::Rad | Self::Deg | Self::Grad | Self::Turn => Dimension::Angle,
            Self::S | Self::Ms => Dimension::Time,
        }
    }

    /// Serialized suffix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Number => "",
            Self::Percent => "%",
            Self::Px => "px",
            Self::Pt => "pt",
            Self::Em => "em",
            Self::Ex => "ex",
            Self::Rem => "rem",
            Self::Pc => "pc",
            Self::In => "in",
            Self::Cm => "cm",
            Self::Mm => "mm",
            Self::Rad => "rad",
            Self::Deg => "deg",
            Self::Grad => "grad",
            Self::Turn => "turn",
            Self::S => "s",
            Self::Ms => "ms",
        }
    }

    /// Canonical position of a term with this unit inside a `calc()` sum: units sort by name,
    /// plain numbers first and percentages last.
    pub const fn calc_term_order(self) -> u32 {
        let rank = match self {
            Self::Number => 0,
            Self::Cm => 1,
            Self::Deg => 2,
            Self::Em => 3,
            Self::Ex => 4,
            Self::Grad => 5,
            Self::In => 6,
            Self::Mm => 7,
            Self::Ms => 8,
            Self::Pc => 9,
            Self::Pt => 10,
            Self::Px => 11,
            Self::Rad => 12,
            Self::Rem => 13,
            Self::S => 14,
            Self::Turn => 15,
            Self::Percent => 16,
        };
        1000 + rank
    }
}

/// Pixels per unit for absolute lengths, degrees per unit for angles.
fn absolute_factor(unit: Unit, magnitude: f64) -> Option<f64> {
    match unit {
        Unit::Pt => Some(magnitude / 72.0 * 96.0),
        Unit::Pc => Some(magnitude / 6.0 * 96.0),
        Unit::In => Some(magnitude * 96.0),
        Unit::Cm => Some(magnitude / 2.54 * 96.0),
        Unit::Mm => Some(magnitude / 25.4 * 96.0),
        Unit::Rad => Some(magnitude * 180.0 / PI),
        Unit::Grad => Some(magnitude * 360.0 / 400.0),
        Unit::Turn => Some(magnitude * 360.0),
        Unit::Number
        | Unit::Percent
        | Unit::Px
        | Unit::Em
        | Unit::Ex
        | Unit::Rem
        | Unit::Deg
        | Unit::S
        | Unit::Ms => None,
    }
}

/// A literal number with a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimensionValue {
    pub magnitude: f64,
    pub unit: Unit,
}

impl DimensionValue {
    #[inline]
    pub const fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Resolve to an absolute magnitude: percentages against `one_hundred_percent`, lengths to
    /// px, angles to degrees, times to milliseconds.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        match self.unit {
            Unit::Percent => self.magnitude * one_hundred_percent / 100.0,
            Unit::Em | Unit::Rem => self.magnitude * DEFAULT_FONT_SIZE_PX,
            Unit::Ex => self.magnitude * DEFAULT_FONT_SIZE_PX * 0.5,
            Unit::S => self.magnitude * 1000.0,
            Unit::Number | Unit::Px | Unit::Deg | Unit::Ms => self.magnitude,
            Unit::Pt
            | Unit::Pc
            | Unit::In
            | Unit::Cm
            | Unit::Mm
            | Unit::Rad
            | Unit::Grad
            | Unit::Turn => absolute_factor(self.unit, self.magnitude).unwrap_or(self.magnitude),
        }
    }

    /// Compute against the cascade. Returns `None` when the value is already computed.
    pub fn compute(&self, context: &ComputeContext<'_>) -> Option<Self> {
        let magnitude = self.magnitude;
        match self.unit {
            Unit::Percent if context.property == PropertyId::FontSize => Some(Self::new(
                magnitude / 100.0 * context.base_font_size(),
                Unit::Px,
            )),
            Unit::Number | Unit::Percent | Unit::Px | Unit::Deg | Unit::S => None,
            Unit::Pt | Unit::Pc | Unit::In | Unit::Cm | Unit::Mm => {
                absolute_factor(self.unit, magnitude).map(|pixels| Self::new(pixels, Unit::Px))
            }
            Unit::Em => Some(Self::new(magnitude * context.base_font_size(), Unit::Px)),
            Unit::Ex => Some(Self::new(
                magnitude * context.base_font_size() * 0.5,
                Unit::Px,
            )),
            Unit::Rem => Some(Self::new(
                magnitude * context.provider.default_font_size(),
                Unit::Px,
            )),
            Unit::Rad | Unit::Grad | Unit::Turn => {
                absolute_factor(self.unit, magnitude).map(|degrees| Self::new(degrees, Unit::Deg))
            }
            Unit::Ms => Some(Self::new(magnitude / 1000.0, Unit::S)),
        }
    }

    /// Serialize as `<number><unit>`.
    ///
    /// # Errors
    /// Propagates errors from `dest`.
    pub fn write_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        // Numbers are read back as `f32`; infinities print as the largest finite one.
        let magnitude = if self.magnitude.is_infinite() {
            f64::from(f32::MAX).copysign(self.magnitude)
        } else {
            self.magnitude
        };
        write_number(magnitude, dest)?;
        dest.write_str(self.unit.name())
    }
}

/// Pick the unit for a number written without one.
fn unitless_unit<'input>(
    input: &Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
    magnitude: f64,
) -> ParseResult<'input, Unit> {
    if magnitude == 0.0 {
        return Ok(if flags.contains(ParseFlags::NUMBER) {
            Unit::Number
        } else if flags.contains(ParseFlags::LENGTH) {
            Unit::Px
        } else if flags.contains(ParseFlags::ANGLE) {
            Unit::Deg
        } else if flags.contains(ParseFlags::TIME) {
            Unit::S
        } else {
            Unit::Percent
        });
    }
    if flags.contains(ParseFlags::NUMBER_AS_PIXELS) {
        context.deprecated(
            input.current_source_location(),
            "Not using units is deprecated. Assuming 'px'.",
        );
        return Ok(Unit::Px);
    }
    if flags.contains(ParseFlags::NUMBER) {
        return Ok(Unit::Number);
    }
    Err(input.invalid("Unit is missing."))
}

/// Parse a literal number, percentage or dimension allowed by `flags`.
///
/// # Errors
/// Returns an error when the next token is not a number, is negative under
/// [`ParseFlags::POSITIVE_ONLY`], or carries a unit `flags` does not allow.
pub fn parse_dimension<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
) -> ParseResult<'input, DimensionValue> {
    let start = input.state();
    let token = input.next()?.clone();
    let (magnitude, unit_name) = match token {
        Token::Number { value, .. } => (f64::from(value), None),
        Token::Percentage { unit_value, .. } => (f64::from(unit_value * 100.0), Some("%".into())),
        Token::Dimension { value, unit, .. } => (f64::from(value), Some(unit)),
        _ => {
            input.reset(&start);
            return Err(input.invalid("Not a number"));
        }
    };
    if !magnitude.is_finite() {
        return Err(input.invalid("Number is out of range"));
    }
    if flags.contains(ParseFlags::POSITIVE_ONLY) && magnitude < 0.0 {
        return Err(input.invalid("negative values are not allowed."));
    }
    let unit = match unit_name {
        None => unitless_unit(input, context, flags, magnitude)?,
        Some(name) if name.as_ref() == "%" => {
            if !flags.contains(ParseFlags::PERCENT) {
                return Err(input.invalid("Percentages are not allowed here."));
            }
            Unit::Percent
        }
        Some(name) => UNIT_NAMES
            .iter()
            .find(|(candidate, _, required)| {
                flags.intersects(*required) && candidate.eq_ignore_ascii_case(&name)
            })
            .map(|(_, unit, _)| *unit)
            .ok_or_else(|| input.invalid(&format!("'{name}' is not a valid unit.")))?,
    };
    Ok(DimensionValue::new(magnitude, unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_syntax::parse_entirely;

    /// Every unit maps to exactly one category.
    ///
    /// # Panics
    /// Panics if a unit reports the wrong category.
    #[test]
    fn unit_categories() {
        assert_eq!(Unit::Number.dimension(), Dimension::Number);
        assert_eq!(Unit::Percent.dimension(), Dimension::Percentage);
        assert_eq!(Unit::Rem.dimension(), Dimension::Length);
        assert_eq!(Unit::Turn.dimension(), Dimension::Angle);
        assert_eq!(Unit::Ms.dimension(), Dimension::Time);
    }

    /// Absolute lengths agree with each other regardless of the percentage reference.
    ///
    /// # Panics
    /// Panics if two equal physical lengths resolve differently.
    #[test]
    fn absolute_units_agree() {
        for reference in [0.0, 100.0, 37.5] {
            let inch = DimensionValue::new(1.0, Unit::In).get(reference);
            assert_eq!(inch, DimensionValue::new(2.54, Unit::Cm).get(reference));
            assert_eq!(inch, DimensionValue::new(25.4, Unit::Mm).get(reference));
            assert_eq!(inch, DimensionValue::new(72.0, Unit::Pt).get(reference));
            assert_eq!(inch, DimensionValue::new(6.0, Unit::Pc).get(reference));
        }
        assert_eq!(DimensionValue::new(50.0, Unit::Percent).get(30.0), 15.0);
        assert_eq!(DimensionValue::new(0.5, Unit::Turn).get(0.0), 180.0);
        assert_eq!(DimensionValue::new(1.5, Unit::S).get(0.0), 1500.0);
    }

    /// Calc term ranks sort units by name.
    ///
    /// # Panics
    /// Panics if the canonical order changes.
    #[test]
    fn term_order_is_alphabetical() {
        assert!(Unit::Number.calc_term_order() < Unit::Cm.calc_term_order());
        assert!(Unit::Em.calc_term_order() < Unit::Px.calc_term_order());
        assert!(Unit::Px.calc_term_order() < Unit::Percent.calc_term_order());
    }

    /// Out of range numbers are rejected, and infinite results print as a number that reads
    /// back.
    ///
    /// # Panics
    /// Panics if an infinity prints in a form the parser does not accept.
    #[test]
    fn infinities_stay_readable() {
        let context = ParserContext::new();
        let parse = |text: &str| {
            parse_entirely(text, |input| parse_dimension(input, &context, ParseFlags::LENGTH))
                .map_err(|diagnostic| diagnostic.message)
        };
        assert_eq!(parse("1e39px"), Err("Number is out of range".to_owned()));

        for (magnitude, printed) in [
            (f64::INFINITY, "340282350000000000000000000000000000000px"),
            (f64::NEG_INFINITY, "-340282350000000000000000000000000000000px"),
        ] {
            let mut out = String::new();
            DimensionValue::new(magnitude, Unit::Px)
                .write_css(&mut out)
                .unwrap_or_else(|error| panic!("{error}"));
            assert_eq!(out, printed);
            assert_eq!(
                parse(&out),
                Ok(DimensionValue::new(
                    f64::from(f32::MAX).copysign(magnitude),
                    Unit::Px
                ))
            );
        }
    }
}
