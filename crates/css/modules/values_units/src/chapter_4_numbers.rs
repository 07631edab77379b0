//! CSS Values & Units Level 3: §4 Numbers
//! Spec: <https://www.w3.org/TR/css-values-3/#numeric-types>
//!
//! [`NumberValue`] is the shared handle for every numeric value: literal dimensions, `calc()`
//! sums and win32 theme metrics.

use core::fmt::{self, Write};
use core::ops::BitOr;
use std::sync::Arc;

use cssparser::{Parser, ToCss, Token};
use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use log::trace;

use crate::chapter_6_dimensions::{Dimension, DimensionValue, Unit, parse_dimension};
use crate::chapter_8_calc::{self, CalcValue, parse_calc};
use crate::context::{ComputeContext, PropertyId};
use crate::value::CssValue;
use crate::win32::{Win32SizeValue, parse_win32_size};

/// Which kinds of numbers a grammar position accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParseFlags(u8);

impl ParseFlags {
    /// Accept percentages.
    pub const PERCENT: Self = Self(1 << 0);
    /// Accept plain numbers.
    pub const NUMBER: Self = Self(1 << 1);
    /// Treat plain non-zero numbers as pixels, with a deprecation diagnostic.
    pub const NUMBER_AS_PIXELS: Self = Self(1 << 2);
    /// Accept lengths.
    pub const LENGTH: Self = Self(1 << 3);
    /// Accept angles.
    pub const ANGLE: Self = Self(1 << 4);
    /// Accept times.
    pub const TIME: Self = Self(1 << 5);
    /// Reject negative literals.
    pub const POSITIVE_ONLY: Self = Self(1 << 6);

    /// Whether every flag of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag of `other` is set.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// These flags with every flag of `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for ParseFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The concrete kinds of numeric value.
#[derive(Debug, PartialEq)]
pub enum NumberKind {
    Dimension(DimensionValue),
    Calc(CalcValue),
    Win32Size(Win32SizeValue),
}

/// Shared, immutable numeric value.
///
/// Cloning shares the underlying value; [`CssValue::ptr_eq`] tells whether two handles are the
/// same instance.
#[derive(Clone, Debug)]
pub struct NumberValue(Arc<NumberKind>);

impl PartialEq for NumberValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl NumberValue {
    /// Wrap a concrete kind in a new handle.
    #[inline]
    pub fn from_kind(kind: NumberKind) -> Self {
        Self(Arc::new(kind))
    }

    /// A literal number with `unit`.
    #[inline]
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self::from_kind(NumberKind::Dimension(DimensionValue::new(magnitude, unit)))
    }

    /// A unitless number.
    #[inline]
    pub fn number(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::Number)
    }

    /// A length in pixels.
    #[inline]
    pub fn px(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::Px)
    }

    /// A percentage.
    #[inline]
    pub fn percent(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::Percent)
    }

    /// The concrete kind behind this handle.
    #[inline]
    pub fn kind(&self) -> &NumberKind {
        &self.0
    }

    /// The literal dimension, when this is one.
    pub fn as_dimension(&self) -> Option<&DimensionValue> {
        match self.kind() {
            NumberKind::Dimension(dimension) => Some(dimension),
            NumberKind::Calc(_) | NumberKind::Win32Size(_) => None,
        }
    }

    /// Resolve to an absolute magnitude; percentages resolve against `one_hundred_percent`.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        match self.kind() {
            NumberKind::Dimension(dimension) => dimension.get(one_hundred_percent),
            NumberKind::Calc(calc) => calc.get(one_hundred_percent),
            NumberKind::Win32Size(size) => size.get(),
        }
    }

    /// The category of this value.
    pub fn dimension(&self) -> Dimension {
        match self.kind() {
            NumberKind::Dimension(dimension) => dimension.unit.dimension(),
            NumberKind::Calc(calc) => calc.dimension(),
            NumberKind::Win32Size(_) => Dimension::Length,
        }
    }

    /// Whether any part of this value is a percentage.
    pub fn has_percent(&self) -> bool {
        match self.kind() {
            NumberKind::Dimension(dimension) => dimension.unit == Unit::Percent,
            NumberKind::Calc(calc) => calc.terms().iter().any(Self::has_percent),
            NumberKind::Win32Size(_) => false,
        }
    }

    /// Whether this is a plain unitless number.
    pub fn is_number(&self) -> bool {
        self.dimension() == Dimension::Number && !self.has_percent()
    }

    /// Scale by `factor`, keeping units.
    #[must_use]
    pub fn multiply(&self, factor: f64) -> Self {
        if factor.to_bits() == 1.0_f64.to_bits() {
            return self.clone();
        }
        match self.kind() {
            NumberKind::Dimension(dimension) => {
                Self::new(dimension.magnitude * factor, dimension.unit)
            }
            NumberKind::Calc(calc) => calc.multiply(factor),
            NumberKind::Win32Size(size) => {
                Self::from_kind(NumberKind::Win32Size(size.multiply(factor)))
            }
        }
    }

    /// Merge `other` into this value if both have the same shape, without building a sum.
    pub fn try_add(&self, other: &Self) -> Option<Self> {
        match (self.kind(), other.kind()) {
            (NumberKind::Dimension(left), NumberKind::Dimension(right)) => {
                if left.unit != right.unit {
                    return None;
                }
                if left.magnitude == 0.0 {
                    return Some(other.clone());
                }
                if right.magnitude == 0.0 {
                    return Some(self.clone());
                }
                Some(Self::new(left.magnitude + right.magnitude, left.unit))
            }
            (NumberKind::Win32Size(left), NumberKind::Win32Size(right)) => left
                .try_add(right)
                .map(|sum| Self::from_kind(NumberKind::Win32Size(sum))),
            _ => None,
        }
    }

    /// Add two values, building a normalized `calc()` sum when they cannot merge.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        self.try_add(other)
            .unwrap_or_else(|| chapter_8_calc::new_sum(self, other))
    }

    /// Rank used to order terms inside a `calc()` sum; lower sorts first.
    pub fn calc_term_order(&self) -> u32 {
        match self.kind() {
            NumberKind::Dimension(dimension) => dimension.unit.calc_term_order(),
            NumberKind::Calc(calc) => calc.terms().first().map_or(0, Self::calc_term_order),
            NumberKind::Win32Size(size) => size.calc_term_order(),
        }
    }
}

impl ToCss for NumberValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        match self.kind() {
            NumberKind::Dimension(dimension) => dimension.write_css(dest),
            NumberKind::Calc(calc) => calc.to_css(dest),
            NumberKind::Win32Size(size) => size.to_css(dest),
        }
    }
}

impl CssValue for NumberValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        match self.kind() {
            NumberKind::Dimension(dimension) => dimension
                .compute(context)
                .map_or_else(|| self.clone(), |computed| {
                    Self::from_kind(NumberKind::Dimension(computed))
                }),
            NumberKind::Calc(calc) => calc.compute(self, context),
            NumberKind::Win32Size(size) => {
                let pixels = size.compute_px(context.provider.theme_engine());
                trace!("{} computed to {pixels}px", self.to_css_string());
                Self::px(pixels)
            }
        }
    }

    fn transition(&self, end: &Self, _property: PropertyId, progress: f64) -> Option<Self> {
        if self.ptr_eq(end) || self == end {
            return Some(self.clone());
        }
        match (self.kind(), end.kind()) {
            (NumberKind::Dimension(_), NumberKind::Dimension(_))
            | (NumberKind::Win32Size(_), NumberKind::Win32Size(_)) => {}
            (NumberKind::Calc(start_calc), NumberKind::Calc(end_calc))
                if start_calc.terms().len() == end_calc.terms().len() => {}
            _ => return None,
        }
        Some(
            self.multiply(1.0 - progress)
                .add(&end.multiply(progress)),
        )
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Whether the next token can start a numeric value.
pub fn can_parse(input: &mut Parser<'_, '_>) -> bool {
    if input.has_function_prefix("calc") || input.has_function_prefix("-ctk-win32-") {
        return true;
    }
    let start = input.state();
    let numeric = matches!(
        input.next(),
        Ok(Token::Number { .. } | Token::Percentage { .. } | Token::Dimension { .. })
    );
    input.reset(&start);
    numeric
}

/// Parse a numeric value: `calc()`, a win32 metric function or a literal dimension.
///
/// # Errors
/// Returns the error of whichever production the input selects.
pub fn parse_number_value<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
) -> ParseResult<'input, NumberValue> {
    if input.has_function_prefix("calc") {
        return parse_calc(input, context, flags);
    }
    if input.has_function_prefix("-ctk-win32-") {
        return parse_win32_size(input, flags);
    }
    parse_dimension(input, context, flags).map(|dimension| {
        NumberValue::from_kind(NumberKind::Dimension(dimension))
    })
}
