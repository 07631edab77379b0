//! `-ctk-win32-theme-part()`: an image rendered by the platform theme engine.

use core::fmt::{self, Write};
use std::sync::Arc;

use css_syntax::{ParseResult, ParserExt as _, write_number};
use css_values_units::{
    ComputeContext, CssValue, PartSurface, PropertyId, Win32Theme, Win32ThemeEngine, parse_theme,
};
use cssparser::{Parser, ToCss};
use log::debug;
use tiny_skia::{Pixmap, PixmapPaint, PixmapRef, Transform};

/// A second part drawn over the first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartOverlay {
    pub part: i32,
    pub state: i32,
    /// Opacity of the overlay, `1` when not given.
    pub alpha: f64,
}

#[derive(Debug, PartialEq)]
pub struct Win32PartData {
    pub theme: Win32Theme,
    pub part: i32,
    pub state: i32,
    pub over: Option<PartOverlay>,
    /// Top, right, bottom, left.
    pub margins: [i32; 4],
}

#[derive(Clone, Debug)]
pub struct Win32PartValue(Arc<Win32PartData>);

impl PartialEq for Win32PartValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

fn composite(pixmap: &mut Pixmap, surface: &PartSurface, opacity: f64) {
    let Some(source) = PixmapRef::from_bytes(&surface.data, surface.width, surface.height) else {
        debug!(
            "theme engine returned a malformed {}x{} surface",
            surface.width, surface.height
        );
        return;
    };
    let paint = PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0) as f32,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, source, &paint, Transform::identity(), None);
}

impl Win32PartValue {
    pub fn new(
        theme: Win32Theme,
        part: i32,
        state: i32,
        over: Option<PartOverlay>,
        margins: [i32; 4],
    ) -> Self {
        Self(Arc::new(Win32PartData {
            theme,
            part,
            state,
            over,
            margins,
        }))
    }

    #[inline]
    pub fn theme(&self) -> &Win32Theme {
        &self.0.theme
    }

    #[inline]
    pub fn part(&self) -> i32 {
        self.0.part
    }

    #[inline]
    pub fn state(&self) -> i32 {
        self.0.state
    }

    #[inline]
    pub fn over(&self) -> Option<PartOverlay> {
        self.0.over
    }

    #[inline]
    pub fn margins(&self) -> [i32; 4] {
        self.0.margins
    }

    /// Render the part, then its overlay, into `(0, 0, width, height)` of `pixmap`.
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        width: f64,
        height: f64,
        engine: &dyn Win32ThemeEngine,
    ) {
        let (width, height) = (width.max(0.0) as u32, height.max(0.0) as u32);
        let mut render = |part: i32, state: i32, opacity: f64| {
            match engine.draw_part(self.theme(), part, state, self.margins(), width, height) {
                Some(surface) => composite(pixmap, &surface, opacity),
                None => debug!(
                    "theme {} has no rendering for part {part} state {state}",
                    self.theme().class_name()
                ),
            }
        };
        render(self.part(), self.state(), 1.0);
        if let Some(over) = self.over() {
            render(over.part, over.state, over.alpha);
        }
    }
}

impl CssValue for Win32PartValue {
    /// Parts render at draw time; there is nothing to resolve.
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

impl ToCss for Win32PartValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str("-ctk-win32-theme-part(")?;
        self.theme().to_css(dest)?;
        write!(dest, ", {}, {}", self.part(), self.state())?;
        if let Some(over) = self.over() {
            write!(dest, ", over({}, {}", over.part, over.state)?;
            if (over.alpha - 1.0).abs() > f64::EPSILON {
                dest.write_str(", ")?;
                write_number(over.alpha, dest)?;
            }
            dest.write_str(")")?;
        }
        let margins = self.margins();
        if margins != [0; 4] {
            let [top, right, bottom, left] = margins;
            let count = if right != left {
                4
            } else if top != bottom {
                3
            } else if top != right {
                2
            } else {
                1
            };
            dest.write_str(", margins(")?;
            for (index, margin) in margins.iter().take(count).enumerate() {
                if index > 0 {
                    dest.write_str(" ")?;
                }
                write!(dest, "{margin}")?;
            }
            dest.write_str(")")?;
        }
        dest.write_str(")")
    }
}

fn parse_integer<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, i32> {
    input
        .try_int()
        .ok_or_else(|| input.invalid("Expected a valid integer value"))
}

fn parse_over<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, PartOverlay> {
    let part = parse_integer(input)?;
    if !input.try_comma() {
        return Err(input.invalid("Expected ','"));
    }
    let state = parse_integer(input)?;
    let alpha = if input.try_comma() {
        input
            .try_double()
            .ok_or_else(|| input.invalid("Expected a number"))?
    } else {
        1.0
    };
    if !input.is_exhausted() {
        return Err(input.invalid("Expected ')' at end of 'over'"));
    }
    Ok(PartOverlay { part, state, alpha })
}

fn parse_margins<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, [i32; 4]> {
    let mut margins = [0; 4];
    let mut given = 0;
    while given < margins.len() {
        let Some(margin) = input.try_int() else {
            break;
        };
        margins[given] = margin;
        given += 1;
    }
    if given == 0 {
        return Err(input.invalid("Expected valid margins"));
    }
    for index in given..margins.len() {
        margins[index] = margins[(index - 1) / 2];
    }
    if !input.is_exhausted() {
        return Err(input.invalid("Expected ')' at end of 'margins'"));
    }
    Ok(margins)
}

fn parse_arguments<'input>(input: &mut Parser<'input, '_>) -> ParseResult<'input, Win32PartValue> {
    let theme = parse_theme(input)?;
    if !input.try_comma() {
        return Err(input.invalid("Expected ','"));
    }
    let part = parse_integer(input)?;
    if !input.try_comma() {
        return Err(input.invalid("Expected ','"));
    }
    let state = parse_integer(input)?;

    let mut over = None;
    let mut margins = [0; 4];
    if input.try_comma() {
        if let Some(overlay) = input.try_function_block("over", parse_over) {
            over = Some(overlay?);
            if input.try_comma() {
                margins = input
                    .try_function_block("margins", parse_margins)
                    .unwrap_or_else(|| Err(input.invalid("Expected 'margins'")))?;
            }
        } else if let Some(parsed) = input.try_function_block("margins", parse_margins) {
            margins = parsed?;
        } else {
            return Err(input.invalid("Expected 'over' or 'margins'"));
        }
    }
    if !input.is_exhausted() {
        return Err(input.invalid("Expected ')'"));
    }
    Ok(Win32PartValue::new(theme, part, state, over, margins))
}

/// Parse `-ctk-win32-theme-part(theme, part, state [, over(part, state [, alpha])]
/// [, margins(int{1,4})])`.
///
/// # Errors
/// Returns an error when the function does not come next or its arguments are malformed.
pub fn parse_win32_part<'input>(
    input: &mut Parser<'input, '_>,
) -> ParseResult<'input, Win32PartValue> {
    input
        .try_function_block("-ctk-win32-theme-part", parse_arguments)
        .unwrap_or_else(|| Err(input.invalid("Expected '-ctk-win32-theme-part'")))
}
