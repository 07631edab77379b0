//! CSS Values and Units Module Level 3: the numeric and color values every property shares.
//! Spec: <https://www.w3.org/TR/css-values-3/>
//!
//! Besides the value types, this crate owns the context they compute in: property ids, the
//! provider and style lookups, and the win32 theme engine seam.

#![forbid(unsafe_code)]

// Per-chapter modules mirroring the W3C table of contents.
pub mod chapter_3_identifiers;
pub mod chapter_4_numbers;
pub mod chapter_6_dimensions;
pub mod chapter_8_calc;
pub mod chapter_9_colors;
pub mod context;
pub mod value;
pub mod win32;

// Re-exports for ergonomic access from other crates.
pub use chapter_3_identifiers::{KeywordTable, keyword_name, try_parse_keyword};
pub use chapter_4_numbers::{NumberKind, NumberValue, ParseFlags, can_parse, parse_number_value};
pub use chapter_6_dimensions::{DEFAULT_FONT_SIZE_PX, Dimension, DimensionValue, Unit};
pub use chapter_8_calc::CalcValue;
pub use chapter_9_colors::{ColorKind, ColorValue, INITIAL_COLOR, parse_color};
pub use context::{
    BasicProvider, ComputeContext, PropertyId, StyleLookup, StyleProvider, StyleSnapshot,
};
pub use value::CssValue;
pub use win32::{
    FallbackThemeEngine, PartBorder, PartSurface, Win32SizeValue, Win32Theme, Win32ThemeEngine,
    parse_theme,
};
