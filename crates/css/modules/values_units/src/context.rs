//! The cascade context values are computed in.
//!
//! Styles and providers are owned by the host; values only see them through the traits here.

use core::fmt;

use css_color::Rgba;

use crate::chapter_6_dimensions::DEFAULT_FONT_SIZE_PX;
use crate::chapter_9_colors::ColorValue;
use crate::win32::{FallbackThemeEngine, Win32ThemeEngine};

/// Properties the engine styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyId {
    Color,
    FontSize,
    BackgroundColor,
    BackgroundImage,
    BackgroundRepeat,
    BackgroundPosition,
    BorderImageSource,
    BorderImageSlice,
    BorderImageWidth,
    BorderImageRepeat,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomRightRadius,
    BorderBottomLeftRadius,
    MinWidth,
    MinHeight,
    TransitionDuration,
}

impl PropertyId {
    /// Every property, in compute order: `color` and `font-size` come first so that
    /// `currentColor` and font-relative units see their element's values.
    pub const ALL: [Self; 17] = [
        Self::Color,
        Self::FontSize,
        Self::BackgroundColor,
        Self::BackgroundImage,
        Self::BackgroundRepeat,
        Self::BackgroundPosition,
        Self::BorderImageSource,
        Self::BorderImageSlice,
        Self::BorderImageWidth,
        Self::BorderImageRepeat,
        Self::BorderTopLeftRadius,
        Self::BorderTopRightRadius,
        Self::BorderBottomRightRadius,
        Self::BorderBottomLeftRadius,
        Self::MinWidth,
        Self::MinHeight,
        Self::TransitionDuration,
    ];

    /// The property name as written in stylesheets.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::FontSize => "font-size",
            Self::BackgroundColor => "background-color",
            Self::BackgroundImage => "background-image",
            Self::BackgroundRepeat => "background-repeat",
            Self::BackgroundPosition => "background-position",
            Self::BorderImageSource => "border-image-source",
            Self::BorderImageSlice => "border-image-slice",
            Self::BorderImageWidth => "border-image-width",
            Self::BorderImageRepeat => "border-image-repeat",
            Self::BorderTopLeftRadius => "border-top-left-radius",
            Self::BorderTopRightRadius => "border-top-right-radius",
            Self::BorderBottomRightRadius => "border-bottom-right-radius",
            Self::BorderBottomLeftRadius => "border-bottom-left-radius",
            Self::MinWidth => "min-width",
            Self::MinHeight => "min-height",
            Self::TransitionDuration => "transition-duration",
        }
    }

    /// Look a property up by name, ASCII case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|property| property.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PropertyId {
    #[inline]
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Already-computed facts about a style that other values depend on.
pub trait StyleLookup {
    /// Computed `font-size` in pixels.
    fn font_size(&self) -> f64;
    /// Computed `color`.
    fn color(&self) -> Rgba;
}

/// Host services consulted while computing: named colors, font defaults and the theme engine.
pub trait StyleProvider {
    /// The color defined as `@define-color name ...`, if any.
    fn named_color(&self, name: &str) -> Option<ColorValue>;
    /// Font size in pixels that `rem` and root elements resolve against.
    fn default_font_size(&self) -> f64;
    /// Engine answering win32 theme queries.
    fn theme_engine(&self) -> &dyn Win32ThemeEngine;
}

/// The cascade context: which property is computed, for which style, under which parent.
#[derive(Clone, Copy)]
pub struct ComputeContext<'context> {
    pub property: PropertyId,
    pub provider: &'context dyn StyleProvider,
    pub style: &'context dyn StyleLookup,
    pub parent_style: Option<&'context dyn StyleLookup>,
}

impl<'context> ComputeContext<'context> {
    #[inline]
    pub fn new(
        property: PropertyId,
        provider: &'context dyn StyleProvider,
        style: &'context dyn StyleLookup,
        parent_style: Option<&'context dyn StyleLookup>,
    ) -> Self {
        Self {
            property,
            provider,
            style,
            parent_style,
        }
    }

    /// The same context computing a different property.
    #[inline]
    #[must_use]
    pub fn for_property(self, property: PropertyId) -> Self {
        Self { property, ..self }
    }

    /// Font size `em` resolves against: the parent's for `font-size` itself, the element's own
    /// otherwise.
    pub fn base_font_size(&self) -> f64 {
        if self.property == PropertyId::FontSize {
            self.parent_style.map_or_else(
                || self.provider.default_font_size(),
                |parent| parent.font_size(),
            )
        } else {
            self.style.font_size()
        }
    }

    /// The color `currentColor` stands for: the parent's for `color` itself, the element's own
    /// otherwise. `None` for a root element's `color`.
    pub fn current_color(&self) -> Option<Rgba> {
        if self.property == PropertyId::Color {
            self.parent_style.map(StyleLookup::color)
        } else {
            Some(self.style.color())
        }
    }
}

impl fmt::Debug for ComputeContext<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ComputeContext")
            .field("property", &self.property)
            .field("font_size", &self.style.font_size())
            .field("has_parent", &self.parent_style.is_some())
            .finish_non_exhaustive()
    }
}

/// A plain [`StyleLookup`] holding the two facts directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleSnapshot {
    pub font_size: f64,
    pub color: Rgba,
}

impl StyleSnapshot {
    /// A snapshot with `font_size` and black text.
    #[inline]
    pub const fn new(font_size: f64) -> Self {
        Self {
            font_size,
            color: Rgba::BLACK,
        }
    }
}

impl Default for StyleSnapshot {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE_PX)
    }
}

impl StyleLookup for StyleSnapshot {
    #[inline]
    fn font_size(&self) -> f64 {
        self.font_size
    }

    #[inline]
    fn color(&self) -> Rgba {
        self.color
    }
}

/// A provider with no named colors, a fixed default font size and the fallback theme engine.
#[derive(Clone, Debug)]
pub struct BasicProvider {
    pub default_font_size: f64,
    pub theme_engine: FallbackThemeEngine,
}

impl Default for BasicProvider {
    #[inline]
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE_PX,
            theme_engine: FallbackThemeEngine,
        }
    }
}

impl StyleProvider for BasicProvider {
    #[inline]
    fn named_color(&self, _name: &str) -> Option<ColorValue> {
        None
    }

    #[inline]
    fn default_font_size(&self) -> f64 {
        self.default_font_size
    }

    #[inline]
    fn theme_engine(&self) -> &dyn Win32ThemeEngine {
        &self.theme_engine
    }
}
