//! CSS Images Module Level 3: gradients and theme rendered images.
//! Spec: <https://www.w3.org/TR/css-images-3/>
//!
//! Image values parse, compute, interpolate and print like every other value; once a box size
//! is known they resolve into a [`Pattern`] and draw into a `tiny-skia` pixmap.

#![forbid(unsafe_code)]

pub mod chapter_3_1_linear_gradients;
pub mod chapter_3_2_radial_gradients;
pub mod chapter_3_5_color_stops;
pub mod image;
pub mod legacy_gradient;
pub mod pattern;
pub mod win32_theme_part;

pub use chapter_3_1_linear_gradients::{Direction, LinearGradientValue, Side, parse_linear_gradient};
pub use chapter_3_2_radial_gradients::{
    RadialGradientValue, RadialSize, SizeKeyword, parse_radial_gradient,
};
pub use chapter_3_5_color_stops::{ColorStop, ResolvedStops, resolve_color_stops};
pub use image::{ImageValue, parse_image};
pub use legacy_gradient::{LegacyGradientValue, LegacyKind, LegacyPoint, LegacyStop, parse_legacy_gradient};
pub use pattern::{Extend, Geometry, Pattern, PatternCache, PatternStop};
pub use win32_theme_part::{PartOverlay, Win32PartValue, parse_win32_part};
