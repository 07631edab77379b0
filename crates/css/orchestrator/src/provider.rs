//! The provider stylesheets compute against: their `@define-color` table plus engine defaults.

use std::collections::HashMap;

use css_values_units::{ColorValue, FallbackThemeEngine, StyleProvider, Win32ThemeEngine};

use crate::config::EngineConfig;

/// Named colors collected from loaded sheets, the configured root font size and the fallback
/// theme engine.
#[derive(Clone, Debug)]
pub struct SheetProvider {
    colors: HashMap<String, ColorValue>,
    default_font_size: f64,
    theme_engine: FallbackThemeEngine,
}

impl SheetProvider {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            colors: HashMap::new(),
            default_font_size: config.default_font_size,
            theme_engine: FallbackThemeEngine,
        }
    }

    /// Define or redefine `@name`.
    pub fn define_color(&mut self, name: &str, color: ColorValue) {
        self.colors.insert(name.to_owned(), color);
    }

    #[inline]
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }
}

impl Default for SheetProvider {
    #[inline]
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl StyleProvider for SheetProvider {
    #[inline]
    fn named_color(&self, name: &str) -> Option<ColorValue> {
        self.colors.get(name).cloned()
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
