//! Win32 theme metrics: the theme handle, the engine that answers queries about it, and the
//! numeric value whose magnitude is a theme metric.
//!
//! Metric magnitudes are not stored; they are asked from the [`Win32ThemeEngine`] every time the
//! value is computed, so a caller must recompute after the theme changes.

use core::fmt::{self, Write};
use std::sync::Arc;

use css_color::Rgba;
use css_syntax::{ParseResult, ParserExt as _, write_number};
use cssparser::{Parser, ToCss, Token};

use crate::chapter_4_numbers::{NumberKind, NumberValue, ParseFlags};

/// A theme class such as `button` or `scrollbar`. Themes compare by class name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Win32Theme(Arc<str>);

impl Win32Theme {
    #[inline]
    pub fn new(class_name: &str) -> Self {
        Self(Arc::from(class_name))
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.0
    }
}

impl ToCss for Win32Theme {
    #[inline]
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str(&self.0)
    }
}

/// Parse the theme class argument of a win32 function.
///
/// # Errors
/// Returns an error when the next token is not an identifier.
pub fn parse_theme<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, Win32Theme> {
    input
        .try_ident()
        .map(|name| Win32Theme::new(&name))
        .ok_or_else(|| input.invalid("Expected valid win32 theme name"))
}

/// Border widths of a theme part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartBorder {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

/// A rendered theme part: premultiplied RGBA8 rows, `width * height * 4` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartSurface {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Answers theme queries for a platform.
pub trait Win32ThemeEngine: Send + Sync {
    /// A system metric (`GetSystemMetrics` index).
    fn size(&self, theme: &Win32Theme, metric: i32) -> i32;
    /// Natural width and height of a part in a state.
    fn part_size(&self, theme: &Win32Theme, part: i32, state: i32) -> Option<(i32, i32)>;
    /// Border widths of a part in a state.
    fn part_border(&self, theme: &Win32Theme, part: i32, state: i32) -> Option<PartBorder>;
    /// A system color (`GetSysColor` index).
    fn color(&self, theme: &Win32Theme, id: i32) -> Rgba;
    /// Render a part into a `width` × `height` surface, `margins` (top, right, bottom, left)
    /// inset from its edges.
    fn draw_part(
        &self,
        theme: &Win32Theme,
        part: i32,
        state: i32,
        margins: [i32; 4],
        width: u32,
        height: u32,
    ) -> Option<PartSurface>;
}

/// Classic metric defaults, indexed by metric id.
const SYSTEM_METRICS: [(&str, i32); 44] = [
    ("cxscreen", 0),
    ("cyscreen", 0),
    ("cxvscroll", 16),
    ("cyhscroll", 16),
    ("cycaption", 16),
    ("cxborder", 1),
    ("cyborder", 1),
    ("cxdlgframe", 3),
    ("cydlgframe", 3),
    ("cyvthumb", 16),
    ("cxhthumb", 16),
    ("cxicon", 32),
    ("cyicon", 32),
    ("cxcursor", 32),
    ("cycursor", 32),
    ("cymenu", 19),
    ("cxfullscreen", 0),
    ("cyfullscreen", 0),
    ("cykanjiwindow", 0),
    ("cymousepresent", 1),
    ("cyvscroll", 16),
    ("cxhscroll", 16),
    ("cydebug", 0),
    ("cyswapbutton", 0),
    ("creserved1", 0),
    ("creserved2", 0),
    ("creserved3", 0),
    ("creserved4", 0),
    ("cxmin", 112),
    ("cymin", 24),
    ("cxsize", 18),
    ("cysize", 15),
    ("cxframe", 4),
    ("cyframe", 4),
    ("cxmintrack", 112),
    ("cymintrack", 24),
    ("cxdoubleclk", 4),
    ("cydoubleclk", 4),
    ("cxiconspacing", 75),
    ("cyiconspacing", 75),
    ("cmenudropalignment", 0),
    ("cpenwindows", 0),
    ("cdbcsenabled", 0),
    ("cmousebuttons", 3),
];

/// Classic system palette, indexed by color id.
const SYSTEM_COLORS: [(&str, (u8, u8, u8)); 31] = [
    ("scrollbar", (212, 208, 200)),
    ("background", (58, 110, 165)),
    ("activecaption", (10, 36, 106)),
    ("inactivecaption", (128, 128, 128)),
    ("menu", (212, 208, 200)),
    ("window", (255, 255, 255)),
    ("windowframe", (0, 0, 0)),
    ("menutext", (0, 0, 0)),
    ("windowtext", (0, 0, 0)),
    ("captiontext", (255, 255, 255)),
    ("activeborder", (212, 208, 200)),
    ("inactiveborder", (212, 208, 200)),
    ("appworkspace", (128, 128, 128)),
    ("highlight", (10, 36, 106)),
    ("highlighttext", (255, 255, 255)),
    ("btnface", (212, 208, 200)),
    ("btnshadow", (128, 128, 128)),
    ("graytext", (128, 128, 128)),
    ("btntext", (0, 0, 0)),
    ("inactivecaptiontext", (212, 208, 200)),
    ("btnhighlight", (255, 255, 255)),
    ("3ddkshadow", (64, 64, 64)),
    ("3dlight", (212, 208, 200)),
    ("infotext", (0, 0, 0)),
    ("infobk", (255, 255, 225)),
    ("alternatebtnface", (181, 181, 181)),
    ("hotlight", (0, 0, 200)),
    ("gradientactivecaption", (166, 202, 240)),
    ("gradientinactivecaption", (192, 192, 192)),
    ("menuhilight", (10, 36, 106)),
    ("menubar", (212, 208, 200)),
];

fn id_for_name<T>(table: &[(&str, T)], name: &str) -> Option<i32> {
    table
        .iter()
        .position(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .and_then(|index| i32::try_from(index).ok())
}

fn name_for_id<T>(table: &[(&'static str, T)], id: i32) -> Option<&'static str> {
    usize::try_from(id)
        .ok()
        .and_then(|index| table.get(index))
        .map(|(name, _)| *name)
}

/// Metric id for a metric name such as `cxborder`.
pub fn metric_id(name: &str) -> Option<i32> {
    id_for_name(&SYSTEM_METRICS, name)
}

/// Metric name for a metric id.
pub fn metric_name(id: i32) -> Option<&'static str> {
    name_for_id(&SYSTEM_METRICS, id)
}

/// System color id for a color name such as `btnface`.
pub fn color_id(name: &str) -> Option<i32> {
    id_for_name(&SYSTEM_COLORS, name)
}

/// System color name for a color id.
pub fn color_name(id: i32) -> Option<&'static str> {
    name_for_id(&SYSTEM_COLORS, id)
}

/// Engine used where no platform theme is available: answers metrics and colors from the
/// classic defaults, knows no part geometry and renders nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FallbackThemeEngine;

impl Win32ThemeEngine for FallbackThemeEngine {
    fn size(&self, _theme: &Win32Theme, metric: i32) -> i32 {
        usize::try_from(metric)
            .ok()
            .and_then(|index| SYSTEM_METRICS.get(index))
            .map_or(0, |(_, value)| *value)
    }

    fn part_size(&self, _theme: &Win32Theme, _part: i32, _state: i32) -> Option<(i32, i32)> {
        None
    }

    fn part_border(&self, _theme: &Win32Theme, _part: i32, _state: i32) -> Option<PartBorder> {
        None
    }

    fn color(&self, _theme: &Win32Theme, id: i32) -> Rgba {
        usize::try_from(id)
            .ok()
            .and_then(|index| SYSTEM_COLORS.get(index))
            .map_or(Rgba::BLACK, |(_, (red, green, blue))| {
                Rgba::from_rgba8((*red, *green, *blue, u8::MAX))
            })
    }

    fn draw_part(
        &self,
        _theme: &Win32Theme,
        _part: i32,
        _state: i32,
        _margins: [i32; 4],
        _width: u32,
        _height: u32,
    ) -> Option<PartSurface> {
        None
    }
}

/// Parse a table entry written by name or by numeric id.
///
/// Names such as `3dlight` tokenize as dimensions and are accepted in that form too.
///
/// # Errors
/// Returns an error for an unknown name or a token that is neither a name nor an integer.
pub fn parse_name_or_id<'input>(
    input: &mut Parser<'input, '_>,
    lookup: fn(&str) -> Option<i32>,
    what: &str,
) -> ParseResult<'input, i32> {
    let start = input.state();
    let name = match input.next()?.clone() {
        Token::Number {
            int_value: Some(id),
            ..
        } => return Ok(id),
        Token::Ident(name) => name.as_ref().to_owned(),
        Token::Dimension {
            int_value: Some(lead),
            unit,
            ..
        } => format!("{lead}{unit}"),
        _ => {
            input.reset(&start);
            return Err(input.invalid("Expected a valid integer value"));
        }
    };
    lookup(&name).ok_or_else(|| input.invalid(&format!("'{name}' is not a {what}.")))
}

/// Which theme query a size value stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Win32SizeKind {
    Size { metric: i32 },
    PartWidth { part: i32, state: i32 },
    PartHeight { part: i32, state: i32 },
    PartBorderTop { part: i32, state: i32 },
    PartBorderRight { part: i32, state: i32 },
    PartBorderBottom { part: i32, state: i32 },
    PartBorderLeft { part: i32, state: i32 },
}

/// Function names in the order of [`Win32SizeKind::index`].
const FUNCTION_NAMES: [&str; 7] = [
    "-ctk-win32-size",
    "-ctk-win32-part-width",
    "-ctk-win32-part-height",
    "-ctk-win32-part-border-top",
    "-ctk-win32-part-border-right",
    "-ctk-win32-part-border-bottom",
    "-ctk-win32-part-border-left",
];

impl Win32SizeKind {
    /// Position of this query kind among the size functions.
    pub const fn index(self) -> u32 {
        match self {
            Self::Size { .. } => 0,
            Self::PartWidth { .. } => 1,
            Self::PartHeight { .. } => 2,
            Self::PartBorderTop { .. } => 3,
            Self::PartBorderRight { .. } => 4,
            Self::PartBorderBottom { .. } => 5,
            Self::PartBorderLeft { .. } => 6,
        }
    }

    fn function_name(self) -> &'static str {
        FUNCTION_NAMES
            .get(self.index() as usize)
            .copied()
            .unwrap_or("-ctk-win32-size")
    }

    fn from_index(index: usize, part: i32, state: i32) -> Self {
        match index {
            1 => Self::PartWidth { part, state },
            2 => Self::PartHeight { part, state },
            3 => Self::PartBorderTop { part, state },
            4 => Self::PartBorderRight { part, state },
            5 => Self::PartBorderBottom { part, state },
            _ => Self::PartBorderLeft { part, state },
        }
    }
}

/// A length whose magnitude is `scale` times a theme metric.
#[derive(Clone, Debug, PartialEq)]
pub struct Win32SizeValue {
    pub scale: f64,
    pub theme: Win32Theme,
    pub kind: Win32SizeKind,
}

impl Win32SizeValue {
    #[inline]
    pub const fn new(theme: Win32Theme, kind: Win32SizeKind) -> Self {
        Self {
            scale: 1.0,
            theme,
            kind,
        }
    }

    /// Scale the deferred magnitude.
    #[must_use]
    pub fn multiply(&self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            ..self.clone()
        }
    }

    /// Merge with a value asking the same query of the same theme.
    pub fn try_add(&self, other: &Self) -> Option<Self> {
        (self.theme == other.theme && self.kind == other.kind).then(|| Self {
            scale: self.scale + other.scale,
            ..self.clone()
        })
    }

    /// Query `engine` and scale the answer.
    pub fn compute_px(&self, engine: &dyn Win32ThemeEngine) -> f64 {
        let theme = &self.theme;
        let size = match self.kind {
            Win32SizeKind::Size { metric } => engine.size(theme, metric),
            Win32SizeKind::PartWidth { part, state } => {
                engine.part_size(theme, part, state).map_or(0, |(width, _)| width)
            }
            Win32SizeKind::PartHeight { part, state } => {
                engine.part_size(theme, part, state).map_or(0, |(_, height)| height)
            }
            Win32SizeKind::PartBorderTop { part, state } => engine
                .part_border(theme, part, state)
                .map_or(0, |border| border.top),
            Win32SizeKind::PartBorderRight { part, state } => engine
                .part_border(theme, part, state)
                .map_or(0, |border| border.right),
            Win32SizeKind::PartBorderBottom { part, state } => engine
                .part_border(theme, part, state)
                .map_or(0, |border| border.bottom),
            Win32SizeKind::PartBorderLeft { part, state } => engine
                .part_border(theme, part, state)
                .map_or(0, |border| border.left),
        };
        f64::from(size) * self.scale
    }

    /// Resolve without a provider, against the fallback engine.
    pub fn get(&self) -> f64 {
        self.compute_px(&FallbackThemeEngine)
    }

    /// Sorts after every literal dimension, grouped by query kind.
    pub const fn calc_term_order(&self) -> u32 {
        2000 + 100 * self.kind.index()
    }
}

impl ToCss for Win32SizeValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        let scaled = self.scale.to_bits() != 1.0_f64.to_bits();
        if scaled {
            dest.write_str("calc(")?;
            write_number(self.scale, dest)?;
            dest.write_str(" * ")?;
        }
        dest.write_str(self.kind.function_name())?;
        dest.write_str("(")?;
        self.theme.to_css(dest)?;
        dest.write_str(", ")?;
        match self.kind {
            Win32SizeKind::Size { metric } => match metric_name(metric) {
                Some(name) => dest.write_str(name)?,
                None => write!(dest, "{metric}")?,
            },
            Win32SizeKind::PartWidth { part, state }
            | Win32SizeKind::PartHeight { part, state }
            | Win32SizeKind::PartBorderTop { part, state }
            | Win32SizeKind::PartBorderRight { part, state }
            | Win32SizeKind::PartBorderBottom { part, state }
            | Win32SizeKind::PartBorderLeft { part, state } => write!(dest, "{part}, {state}")?,
        }
        dest.write_str(")")?;
        if scaled {
            dest.write_str(")")?;
        }
        Ok(())
    }
}

fn parse_arguments<'input>(
    input: &mut Parser<'input, '_>,
    function: usize,
) -> ParseResult<'input, NumberValue> {
    let theme = parse_theme(input)?;
    if !input.try_comma() {
        return Err(input.invalid("Expected ','"));
    }
    let kind = if function == 0 {
        let metric = parse_name_or_id(input, metric_id, "name for a win32 metric")?;
        Win32SizeKind::Size { metric }
    } else {
        let part = input
            .try_int()
            .ok_or_else(|| input.invalid("Expected an integer part ID"))?;
        if !input.try_comma() {
            return Err(input.invalid("Expected ','"));
        }
        let state = input
            .try_int()
            .ok_or_else(|| input.invalid("Expected an integer state ID"))?;
        Win32SizeKind::from_index(function, part, state)
    };
    Ok(NumberValue::from_kind(NumberKind::Win32Size(
        Win32SizeValue::new(theme, kind),
    )))
}

/// Parse one of the `-ctk-win32-size(...)`, `-ctk-win32-part-width(...)`, ... functions.
///
/// # Errors
/// Returns an error when lengths are not accepted here, no size function comes next, or its
/// arguments are malformed.
pub fn parse_win32_size<'input>(
    input: &mut Parser<'input, '_>,
    flags: ParseFlags,
) -> ParseResult<'input, NumberValue> {
    if !flags.contains(ParseFlags::LENGTH) {
        return Err(input.invalid("Win32 sizes are lengths, which are not allowed here."));
    }
    for (function, name) in FUNCTION_NAMES.iter().enumerate() {
        if let Some(result) =
            input.try_function_block(name, |nested| parse_arguments(nested, function))
        {
            return result;
        }
    }
    Err(input.invalid("Expected a win32 size function"))
}
