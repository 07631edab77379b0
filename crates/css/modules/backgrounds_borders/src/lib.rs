//! CSS Backgrounds and Borders Module Level 3: compound geometric values.
//! Spec: <https://www.w3.org/TR/css-backgrounds-3/>
//!
//! Corners, positions, four-sided border image values and interned repeat pairs.

#![forbid(unsafe_code)]

pub mod chapter_3_4_repeat;
pub mod chapter_3_6_position;
pub mod chapter_5_corners;
pub mod chapter_6_border_image;

pub use chapter_3_4_repeat::{
    RepeatKind, RepeatStyle, RepeatValue, parse_background_repeat, parse_border_image_repeat,
};
pub use chapter_3_6_position::{PositionValue, parse_position};
pub use chapter_5_corners::{CornerValue, parse_corner};
pub use chapter_6_border_image::{BorderOptions, BorderValue, parse_border};
