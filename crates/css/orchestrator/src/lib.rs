//! Orchestrator of the styling engine: property registry, stylesheet loading, the cascade,
//! computed styles and transitions.
//!
//! Value grammars and value types live in the per-module crates; this crate ties them to
//! properties and to the host's element tree.

#![forbid(unsafe_code)]

use core::mem;
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use css_syntax::{Diagnostic, ParserContext, Severity};
use log::{debug, info};

pub mod cascade;
pub mod computed;
pub mod config;
pub mod properties;
pub mod provider;
pub mod selectors;
pub mod style_value;
pub mod stylesheet;
pub mod transition;
pub mod types;

pub use cascade::{SpecifiedStyle, cascade};
pub use computed::ComputedStyle;
pub use config::EngineConfig;
pub use properties::{PropertyInfo, all_properties, lookup, property_info};
pub use provider::SheetProvider;
pub use selectors::{Element, ElementData, Selector, Specificity, parse_selector_list};
pub use style_value::StyleValue;
pub use stylesheet::{Declaration, Rule, Stylesheet};
pub use transition::{StyleTransition, transition_value};
pub use types::Origin;

/// Loaded stylesheets plus everything needed to style elements with them.
#[derive(Debug)]
pub struct StyleEngine {
    config: EngineConfig,
    sheets: Vec<Stylesheet>,
    provider: SheetProvider,
    diagnostics: Vec<Diagnostic>,
}

impl Default for StyleEngine {
    #[inline]
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl StyleEngine {
    #[inline]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sheets: Vec::new(),
            provider: SheetProvider::new(&config),
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn stylesheets(&self) -> &[Stylesheet] {
        &self.sheets
    }

    #[inline]
    pub const fn provider(&self) -> &SheetProvider {
        &self.provider
    }

    /// Parse `css` with the configured origin and add it after the loaded sheets. Returns the
    /// number of diagnostics the sheet produced.
    pub fn add_stylesheet(&mut self, css: &str) -> usize {
        self.add_stylesheet_with_origin(css, self.config.origin)
    }

    /// Parse `css` as a sheet of `origin` and add it after the loaded sheets.
    pub fn add_stylesheet_with_origin(&mut self, css: &str, origin: Origin) -> usize {
        let context = ParserContext::new();
        let sheet = Stylesheet::parse(css, &self.config.with_origin(origin), &context);
        for (name, color) in &sheet.colors {
            self.provider.define_color(name, color.clone());
        }
        let diagnostics = context.take_diagnostics();
        let count = diagnostics.len();
        debug!(
            "added {origin:?} sheet with {} rules, {count} diagnostics",
            sheet.rules.len()
        );
        self.diagnostics.extend(diagnostics);
        self.sheets.push(sheet);
        count
    }

    /// Read and add the stylesheet at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, or if it reports errors while deprecations
    /// are configured as errors.
    pub fn load_stylesheet(&mut self, path: &Path) -> Result<()> {
        let css = fs::read_to_string(path)
            .with_context(|| format!("failed to read stylesheet {}", path.display()))?;
        let first_new = self.diagnostics.len();
        self.add_stylesheet(&css);
        info!("loaded stylesheet {}", path.display());
        if self.config.deprecations_as_errors
            && let Some(error) = self
                .diagnostics
                .get(first_new..)
                .and_then(|fresh| {
                    fresh
                        .iter()
                        .find(|diagnostic| diagnostic.severity == Severity::Error)
                })
        {
            anyhow::bail!("{}:{error}", path.display());
        }
        Ok(())
    }

    /// Drain the diagnostics reported since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    /// The cascaded declarations for `element`.
    pub fn specified_style(&self, element: &dyn Element) -> SpecifiedStyle {
        cascade(&self.sheets, element)
    }

    /// Style `element` under its parent's computed style.
    pub fn compute_style(
        &self,
        element: &dyn Element,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        ComputedStyle::compute(&self.specified_style(element), parent, &self.provider)
    }

    /// Style `element` again, keeping the handles of `previous` where nothing changed.
    pub fn recompute_style(
        &self,
        previous: &ComputedStyle,
        element: &dyn Element,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        ComputedStyle::recompute(previous, &self.specified_style(element), parent, &self.provider)
    }

    /// Regenerate every loaded sheet, in load order.
    pub fn to_css_string(&self) -> String {
        self.sheets
            .iter()
            .map(Stylesheet::to_css_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
