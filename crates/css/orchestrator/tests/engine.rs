#![cfg(test)]

use std::fs;

use css_orchestrator::{ComputedStyle, ElementData, EngineConfig, Origin, StyleEngine};
use css_syntax::Severity;
use css_values_units::PropertyId;
use cssparser::ToCss as _;
use tempfile::tempdir;

fn printed(style: &ComputedStyle, property: PropertyId) -> String {
    style.get(property).to_css_string()
}

/// Build the `window > .toolbar > button` chain used by several tests.
fn toolbar_button() -> (ElementData, ElementData, ElementData) {
    let window = ElementData::new("window").with_id("main");
    let toolbar = ElementData::new("box")
        .with_class("toolbar")
        .with_parent(window.clone());
    let button = ElementData::new("button")
        .with_attribute("class", "flat suggested")
        .with_parent(toolbar.clone());
    (window, toolbar, button)
}

/// Styles cascade through descendant and child combinators and inherit down the chain.
///
/// # Panics
/// Panics if a computed value is wrong.
#[test]
fn cascade_down_a_widget_chain() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut engine = StyleEngine::default();
    let diagnostics = engine.add_stylesheet(
        "#main { font-size: 20px; color: blue; }\n\
         window .flat { min-width: 2em; }\n\
         window > button { min-width: 1px; }\n\
         .toolbar > button.suggested { color: red; }\n",
    );
    assert_eq!(diagnostics, 0);

    let (window, toolbar, button) = toolbar_button();
    let window_style = engine.compute_style(&window, None);
    let toolbar_style = engine.compute_style(&toolbar, Some(&window_style));
    let button_style = engine.compute_style(&button, Some(&toolbar_style));

    assert_eq!(printed(&toolbar_style, PropertyId::Color), "rgb(0,0,255)");
    assert_eq!(printed(&button_style, PropertyId::FontSize), "20px");
    assert_eq!(printed(&button_style, PropertyId::Color), "rgb(255,0,0)");
    assert_eq!(printed(&button_style, PropertyId::MinWidth), "40px");
}

/// Later sheets win ties, user agent sheets lose to author sheets.
///
/// # Panics
/// Panics if the wrong sheet wins.
#[test]
fn sheets_cascade_by_origin_and_order() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut engine = StyleEngine::default();
    engine.add_stylesheet("button { min-height: 1px; }");
    engine.add_stylesheet_with_origin("#ok { min-height: 2px; }", Origin::UserAgent);
    engine.add_stylesheet("button { min-width: 3px; }");
    engine.add_stylesheet("button { min-width: 4px; }");

    let style = engine.compute_style(&ElementData::new("button").with_id("ok"), None);
    assert_eq!(printed(&style, PropertyId::MinHeight), "1px");
    assert_eq!(printed(&style, PropertyId::MinWidth), "4px");
}

/// Colors defined in one sheet resolve in values of another.
///
/// # Panics
/// Panics if a named color does not resolve.
#[test]
fn named_colors_resolve_across_sheets() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut engine = StyleEngine::default();
    engine.add_stylesheet("@define-color accent #00ff00;");
    engine.add_stylesheet("button { background-color: @accent; color: shade(@accent, 1); }");
    assert_eq!(engine.provider().color_count(), 1);

    let style = engine.compute_style(&ElementData::new("button"), None);
    assert_eq!(printed(&style, PropertyId::BackgroundColor), "rgb(0,255,0)");
    assert_eq!(printed(&style, PropertyId::Color), "rgb(0,255,0)");
}

/// Recomputing after an unrelated sheet is added keeps every handle.
///
/// # Panics
/// Panics if recompute reports spurious changes.
#[test]
fn recompute_reports_only_changes() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut engine = StyleEngine::default();
    engine.add_stylesheet("button { min-width: 1em; background-image: linear-gradient(red, blue); }");
    let button = ElementData::new("button");
    let first = engine.compute_style(&button, None);

    engine.add_stylesheet("label { min-width: 5px; }");
    let same = engine.recompute_style(&first, &button, None);
    assert!(same.changed_properties(&first).is_empty());

    engine.add_stylesheet("button { min-height: 5px; }");
    let changed = engine.recompute_style(&first, &button, None);
    assert_eq!(changed.changed_properties(&first), [PropertyId::MinHeight]);
}

/// Loading from disk parses the file; a missing file is a contextual error.
///
/// # Panics
/// Panics if loading behaves unexpectedly.
#[test]
fn loads_from_disk() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap_or_else(|error| panic!("tempdir: {error}"));
    let path = dir.path().join("theme.css");
    fs::write(&path, "button { min-width: 3px; bogus: 1; }\n")
        .unwrap_or_else(|error| panic!("write: {error}"));

    let mut engine = StyleEngine::default();
    engine
        .load_stylesheet(&path)
        .unwrap_or_else(|error| panic!("load: {error:#}"));
    let diagnostics = engine.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.iter().all(|diagnostic| diagnostic.severity == Severity::Error));
    assert!(engine.take_diagnostics().is_empty());
    let style = engine.compute_style(&ElementData::new("button"), None);
    assert_eq!(printed(&style, PropertyId::MinWidth), "3px");

    let missing = engine.load_stylesheet(&dir.path().join("missing.css"));
    let message = missing.map_or_else(|error| format!("{error:#}"), |()| String::new());
    assert!(message.contains("failed to read stylesheet"), "{message}");
    assert_eq!(engine.stylesheets().len(), 1);
}

/// With deprecations promoted to errors, a deprecated value fails the load.
///
/// # Panics
/// Panics if the load succeeds.
#[test]
fn strict_load_rejects_deprecations() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap_or_else(|error| panic!("tempdir: {error}"));
    let path = dir.path().join("legacy.css");
    fs::write(&path, "button {\n  border-top-left-radius: 3;\n}\n")
        .unwrap_or_else(|error| panic!("write: {error}"));

    let mut lenient = StyleEngine::default();
    lenient
        .load_stylesheet(&path)
        .unwrap_or_else(|error| panic!("lenient load: {error:#}"));
    assert!(
        lenient
            .take_diagnostics()
            .iter()
            .all(|diagnostic| diagnostic.severity == Severity::Deprecated)
    );

    let mut strict = StyleEngine::new(EngineConfig::default().with_deprecations_as_errors(true));
    let message = strict
        .load_stylesheet(&path)
        .map_or_else(|error| error.to_string(), |()| String::new());
    assert!(message.contains("legacy.css:2:"), "{message}");
}

/// The engine regenerates its sheets so that they parse back to the same styles.
///
/// # Panics
/// Panics if regeneration changes a computed value.
#[test]
fn regenerated_sheets_style_the_same() {
    let _logger = env_logger::builder().is_test(true).try_init();
    let mut engine = StyleEngine::new(EngineConfig::default().with_default_font_size(10.0));
    engine.add_stylesheet(
        "@define-color fg rgba(255, 0, 0, 0.5);\n\
         box.toolbar > button { color: @fg; min-width: 2rem; }\n\
         button:hover { min-width: 9px; }\n\
         * { background-repeat: no-repeat; border-image-slice: 10 fill; }",
    );
    let printed_sheets = engine.to_css_string();
    assert!(!printed_sheets.contains("hover"));

    let mut regenerated = StyleEngine::new(*engine.config());
    assert_eq!(regenerated.add_stylesheet(&printed_sheets), 0);

    let (_, _, button) = toolbar_button();
    let original = engine.compute_style(&button, None);
    let reparsed = regenerated.compute_style(&button, None);
    assert_eq!(original, reparsed);
    assert_eq!(printed(&reparsed, PropertyId::MinWidth), "20px");
}
