//! CSS Backgrounds and Borders Module Level 3: §6 Border Images: the four-sided
//! `border-image-slice` and `border-image-width` values
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#border-images>

use core::fmt::{self, Write};
use std::sync::Arc;

use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use css_values_units::{
    ComputeContext, CssValue, NumberValue, ParseFlags, PropertyId, can_parse, parse_number_value,
};
use cssparser::{Parser, ToCss};

/// Index of each side in [`BorderValue::sides`].
pub const TOP: usize = 0;
pub const RIGHT: usize = 1;
pub const BOTTOM: usize = 2;
pub const LEFT: usize = 3;

#[derive(Debug, PartialEq)]
pub struct BorderData {
    /// Top, right, bottom, left; `None` is `auto`.
    pub sides: [Option<NumberValue>; 4],
    pub fill: bool,
}

/// Four per-side numbers, any of which may be `auto`, plus the `fill` flag.
#[derive(Clone, Debug)]
pub struct BorderValue(Arc<BorderData>);

impl PartialEq for BorderValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

/// Which grammar extensions a border value accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BorderOptions {
    pub flags: ParseFlags,
    pub allow_auto: bool,
    pub allow_fill: bool,
}

impl BorderValue {
    #[inline]
    pub fn new(sides: [Option<NumberValue>; 4], fill: bool) -> Self {
        Self(Arc::new(BorderData { sides, fill }))
    }

    /// Every side set to `value`, sharing one handle.
    pub fn uniform(value: &NumberValue, fill: bool) -> Self {
        Self::new(
            [
                Some(value.clone()),
                Some(value.clone()),
                Some(value.clone()),
                Some(value.clone()),
            ],
            fill,
        )
    }

    #[inline]
    pub fn sides(&self) -> &[Option<NumberValue>; 4] {
        &self.0.sides
    }

    #[inline]
    pub fn top(&self) -> Option<&NumberValue> {
        self.0.sides[TOP].as_ref()
    }

    #[inline]
    pub fn right(&self) -> Option<&NumberValue> {
        self.0.sides[RIGHT].as_ref()
    }

    #[inline]
    pub fn bottom(&self) -> Option<&NumberValue> {
        self.0.sides[BOTTOM].as_ref()
    }

    #[inline]
    pub fn left(&self) -> Option<&NumberValue> {
        self.0.sides[LEFT].as_ref()
    }

    #[inline]
    pub fn fill(&self) -> bool {
        self.0.fill
    }
}

impl CssValue for BorderValue {
    fn compute(&self, context: &ComputeContext<'_>) -> Self {
        let mut changed = false;
        let sides = self.sides().clone().map(|side| {
            side.map(|value| {
                let computed = value.compute(context);
                changed |= !computed.ptr_eq(&value);
                computed
            })
        });
        if changed {
            Self::new(sides, self.fill())
        } else {
            self.clone()
        }
    }

    #[inline]
    fn transition(&self, _end: &Self, _property: PropertyId, _progress: f64) -> Option<Self> {
        None
    }

    #[inline]
    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl ToCss for BorderValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        let sides = self.sides();
        let count = if sides[RIGHT] != sides[LEFT] {
            4
        } else if sides[TOP] != sides[BOTTOM] {
            3
        } else if sides[TOP] != sides[RIGHT] {
            2
        } else {
            1
        };
        for (index, side) in sides.iter().take(count).enumerate() {
            if index > 0 {
                dest.write_str(" ")?;
            }
            match side {
                Some(value) => value.to_css(dest)?,
                None => dest.write_str("auto")?,
            }
        }
        if self.fill() {
            dest.write_str(" fill")?;
        }
        Ok(())
    }
}

/// Parse one to four sides, expanding the missing ones the shorthand way: right copies top,
/// bottom copies top, left copies right.
///
/// # Errors
/// Returns an error when no side is given or a side is malformed.
pub fn parse_border<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    options: BorderOptions,
) -> ParseResult<'input, BorderValue> {
    let mut fill = options.allow_fill && input.try_ident_matching("fill");
    let mut sides: [Option<NumberValue>; 4] = [None, None, None, None];
    let mut given = 0;
    while given < sides.len() {
        if options.allow_auto && input.try_ident_matching("auto") {
            given += 1;
            continue;
        }
        if !can_parse(input) {
            break;
        }
        sides[given] = Some(parse_number_value(input, context, options.flags)?);
        given += 1;
    }
    if given == 0 {
        return Err(input.invalid("Expected a number"));
    }
    if options.allow_fill && !fill {
        fill = input.try_ident_matching("fill");
    }
    for index in given..sides.len() {
        let source = sides[(index - 1) / 2].clone();
        if let Some(slot) = sides.get_mut(index) {
            *slot = source;
        }
    }
    Ok(BorderValue::new(sides, fill))
}
