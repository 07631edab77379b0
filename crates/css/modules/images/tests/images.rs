#![cfg(test)]

use std::thread;

use css_color::Rgba;
use css_images::{ImageValue, parse_image};
use css_syntax::{ParserContext, parse_entirely};
use css_values_units::{
    ColorValue, ComputeContext, CssValue as _, FallbackThemeEngine, PropertyId, StyleProvider,
    StyleSnapshot, Win32ThemeEngine,
};
use cssparser::ToCss as _;
use tiny_skia::Pixmap;

/// Defines `@accent` as pure green.
struct AccentProvider;

impl StyleProvider for AccentProvider {
    fn named_color(&self, name: &str) -> Option<ColorValue> {
        (name == "accent").then(|| ColorValue::literal(Rgba::new(0.0, 1.0, 0.0, 1.0)))
    }

    fn default_font_size(&self) -> f64 {
        16.0
    }

    fn theme_engine(&self) -> &dyn Win32ThemeEngine {
        &FallbackThemeEngine
    }
}

fn image(text: &str) -> ImageValue {
    let context = ParserContext::new();
    parse_entirely(text, |input| parse_image(input, &context))
        .unwrap_or_else(|diagnostic| panic!("{text}: {}", diagnostic.message))
}

fn compute(value: &ImageValue) -> ImageValue {
    let style = StyleSnapshot::default();
    let context = ComputeContext::new(PropertyId::BackgroundImage, &AccentProvider, &style, None);
    value.compute(&context)
}

/// Named colors in gradient stops resolve through the provider and show up when drawn.
///
/// # Panics
/// Panics if the named color is not resolved or not drawn.
#[test]
fn named_stop_colors_draw() {
    let _logger = env_logger::builder().is_test(true).try_init();
    for text in [
        "linear-gradient(to right, @accent, @accent)",
        "radial-gradient(circle farthest-corner, @accent, @accent)",
        "-ctk-gradient(linear, left top, right top, from(@accent), to(@accent))",
    ] {
        let computed = compute(&image(text));
        let mut pixmap = Pixmap::new(16, 16).unwrap_or_else(|| panic!("pixmap"));
        computed.draw(&mut pixmap, 16.0, 16.0, &FallbackThemeEngine);
        let pixel = pixmap.pixel(8, 8).unwrap_or_else(|| panic!("pixel"));
        assert_eq!((pixel.red(), pixel.green(), pixel.blue()), (0, 255, 0), "{text}");
    }
}

/// Computing twice yields the same handle; printing survives computing.
///
/// # Panics
/// Panics if compute is not idempotent on handles or loses the printed form.
#[test]
fn compute_is_stable() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let specified = image("repeating-linear-gradient(45deg, red 1em, blue 2em)");
    let computed = compute(&specified);
    assert!(compute(&computed).ptr_eq(&computed));
    assert_eq!(
        computed.to_css_string(),
        "repeating-linear-gradient(45deg, rgb(255,0,0) 16px, rgb(0,0,255) 32px)"
    );
}

/// Image values are shared across threads and draw there.
///
/// # Panics
/// Panics if the worker thread cannot draw the shared image.
#[test]
fn images_cross_threads() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let shared = compute(&image("linear-gradient(red, red)"));
    let worker = shared.clone();
    let drawn = thread::spawn(move || {
        let mut pixmap = Pixmap::new(4, 4)?;
        worker.draw(&mut pixmap, 4.0, 4.0, &FallbackThemeEngine);
        pixmap.pixel(2, 2).map(|pixel| pixel.red())
    })
    .join()
    .ok()
    .flatten();
    assert_eq!(drawn, Some(255));
    assert!(shared.ptr_eq(&shared.clone()));
}
