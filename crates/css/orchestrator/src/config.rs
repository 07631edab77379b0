//! Engine configuration.

use css_values_units::DEFAULT_FONT_SIZE_PX;

use crate::types::Origin;

/// Knobs the host sets before loading stylesheets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Root font size in pixels; `rem` and root `em` resolve against it.
    pub default_font_size: f64,
    /// Origin assigned to sheets loaded without an explicit one.
    pub origin: Origin,
    /// Refuse sheets that use deprecated syntax instead of only reporting it.
    pub deprecations_as_errors: bool,
}

impl Default for EngineConfig {
    #[inline]
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE_PX,
            origin: Origin::Author,
            deprecations_as_errors: false,
        }
    }
}

impl EngineConfig {
    #[inline]
    #[must_use]
    pub const fn with_default_font_size(mut self, pixels: f64) -> Self {
        self.default_font_size = pixels;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    #[must_use]
    pub const fn with_deprecations_as_errors(mut self, enabled: bool) -> Self {
        self.deprecations_as_errors = enabled;
        self
    }
}
