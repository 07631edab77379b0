//! CSS Backgrounds and Borders Module Level 3: §3.4 `background-repeat`, §6.5
//! `border-image-repeat`
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/#background-repeat>
//!
//! There are only sixteen repeat pairs per property, so every pair is a process-wide singleton:
//! constructing a repeat value never allocates and equal pairs are the same instance.

use core::fmt::{self, Write};
use std::sync::Arc;

use css_syntax::{ParseResult, ParserExt as _};
use css_values_units::{
    ComputeContext, CssValue, KeywordTable, PropertyId, keyword_name, try_parse_keyword,
};
use cssparser::{Parser, ToCss};
use once_cell::sync::Lazy;

/// How an image tiles along one axis.
///
/// `NoRepeat` spells `no-repeat` for backgrounds and `stretch` for border images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepeatStyle {
    NoRepeat,
    Repeat,
    Round,
    Space,
}

impl RepeatStyle {
    const ALL: [Self; 4] = [Self::NoRepeat, Self::Repeat, Self::Round, Self::Space];

    const fn index(self) -> usize {
        match self {
            Self::NoRepeat => 0,
            Self::Repeat => 1,
            Self::Round => 2,
            Self::Space => 3,
        }
    }
}

/// Which property's keyword set a repeat value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepeatKind {
    Background,
    BorderImage,
}

const BACKGROUND_KEYWORDS: [(&str, RepeatStyle); 4] = [
    ("no-repeat", RepeatStyle::NoRepeat),
    ("repeat", RepeatStyle::Repeat),
    ("round", RepeatStyle::Round),
    ("space", RepeatStyle::Space),
];

const BORDER_IMAGE_KEYWORDS: [(&str, RepeatStyle); 4] = [
    ("stretch", RepeatStyle::NoRepeat),
    ("repeat", RepeatStyle::Repeat),
    ("round", RepeatStyle::Round),
    ("space", RepeatStyle::Space),
];

impl RepeatKind {
    fn keywords(self) -> &'static KeywordTable<RepeatStyle> {
        match self {
            Self::Background => &BACKGROUND_KEYWORDS,
            Self::BorderImage => &BORDER_IMAGE_KEYWORDS,
        }
    }

    fn table(self) -> &'static [[RepeatValue; 4]; 4] {
        match self {
            Self::Background => &BACKGROUND_REPEATS,
            Self::BorderImage => &BORDER_IMAGE_REPEATS,
        }
    }
}

#[derive(Debug)]
pub struct RepeatData {
    pub kind: RepeatKind,
    pub x: RepeatStyle,
    pub y: RepeatStyle,
}

/// An interned `(x, y)` repeat pair. Equality is identity.
#[derive(Clone, Debug)]
pub struct RepeatValue(Arc<RepeatData>);

fn build_table(kind: RepeatKind) -> [[RepeatValue; 4]; 4] {
    RepeatStyle::ALL.map(|x| RepeatStyle::ALL.map(|y| RepeatValue(Arc::new(RepeatData { kind, x, y }))))
}

static BACKGROUND_REPEATS: Lazy<[[RepeatValue; 4]; 4]> =
    Lazy::new(|| build_table(RepeatKind::Background));

static BORDER_IMAGE_REPEATS: Lazy<[[RepeatValue; 4]; 4]> =
    Lazy::new(|| build_table(RepeatKind::BorderImage));

impl PartialEq for RepeatValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RepeatValue {}

impl RepeatValue {
    /// The interned pair for `kind`.
    pub fn new(kind: RepeatKind, x: RepeatStyle, y: RepeatStyle) -> Self {
        let row = &kind.table()[x.index()];
        row[y.index()].clone()
    }

    #[inline]
    pub fn background(x: RepeatStyle, y: RepeatStyle) -> Self {
        Self::new(RepeatKind::Background, x, y)
    }

    #[inline]
    pub fn border_image(x: RepeatStyle, y: RepeatStyle) -> Self {
        Self::new(RepeatKind::BorderImage, x, y)
    }

    #[inline]
    pub fn kind(&self) -> RepeatKind {
        self.0.kind
    }

    #[inline]
    pub fn x(&self) -> RepeatStyle {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> RepeatStyle {
        self.0.y
    }
}

impl CssValue for RepeatValue {
    #[inline]
    fn compute(&self, _context: &ComputeContext<'_>) -> Self {
        self.clone()
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

impl ToCss for RepeatValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        let keywords = self.kind().keywords();
        let (x, y) = (self.x(), self.y());
        if self.kind() == RepeatKind::Background {
            match (x, y) {
                (RepeatStyle::Repeat, RepeatStyle::NoRepeat) => return dest.write_str("repeat-x"),
                (RepeatStyle::NoRepeat, RepeatStyle::Repeat) => return dest.write_str("repeat-y"),
                _ => {}
            }
        }
        dest.write_str(keyword_name(keywords, &x).unwrap_or_default())?;
        if x != y {
            dest.write_str(" ")?;
            dest.write_str(keyword_name(keywords, &y).unwrap_or_default())?;
        }
        Ok(())
    }
}

fn parse_pair<'input>(
    input: &mut Parser<'input, '_>,
    kind: RepeatKind,
) -> ParseResult<'input, RepeatValue> {
    let keywords = kind.keywords();
    let x = try_parse_keyword(input, keywords).ok_or_else(|| input.invalid("Not a valid value"))?;
    let y = try_parse_keyword(input, keywords).unwrap_or(x);
    Ok(RepeatValue::new(kind, x, y))
}

/// Parse a `background-repeat` value: `repeat-x`, `repeat-y` or one or two keywords.
///
/// # Errors
/// Returns an error when no repeat keyword comes next.
pub fn parse_background_repeat<'input>(
    input: &mut Parser<'input, '_>,
) -> ParseResult<'input, RepeatValue> {
    if input.try_ident_matching("repeat-x") {
        return Ok(RepeatValue::background(RepeatStyle::Repeat, RepeatStyle::NoRepeat));
    }
    if input.try_ident_matching("repeat-y") {
        return Ok(RepeatValue::background(RepeatStyle::NoRepeat, RepeatStyle::Repeat));
    }
    parse_pair(input, RepeatKind::Background)
}

/// Parse a `border-image-repeat` value: one or two keywords.
///
/// # Errors
/// Returns an error when no repeat keyword comes next.
pub fn parse_border_image_repeat<'input>(
    input: &mut Parser<'input, '_>,
) -> ParseResult<'input, RepeatValue> {
    parse_pair(input, RepeatKind::BorderImage)
}
