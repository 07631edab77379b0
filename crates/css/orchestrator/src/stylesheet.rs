//! Stylesheets with selectors and values parsed against the property registry.

use std::collections::BTreeMap;

use css_syntax::{
    Diagnostic, ParserContext, Severity, parse_entirely, parse_stylesheet, stylesheet,
};
use css_values_units::{ColorValue, PropertyId, parse_color};
use cssparser::ToCss as _;
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::properties::lookup;
use crate::selectors::{Selector, parse_selector_list};
use crate::style_value::StyleValue;
use crate::types::Origin;

/// A declaration whose value parsed successfully.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub property: PropertyId,
    pub value: StyleValue,
    pub important: bool,
}

/// A rule with at least one supported selector.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    /// Position among the rules of its sheet.
    pub source_order: u32,
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    pub origin: Origin,
    /// `@define-color` definitions; a later definition of a name replaces an earlier one.
    pub colors: BTreeMap<String, ColorValue>,
    pub rules: Vec<Rule>,
}

/// Move a diagnostic reported inside a value to the value's position in the sheet.
fn relocate(diagnostic: Diagnostic, line: u32, column: u32) -> Diagnostic {
    let relocated_column = if diagnostic.line == 0 {
        column.saturating_add(diagnostic.column.saturating_sub(1))
    } else {
        diagnostic.column
    };
    Diagnostic {
        line: line.saturating_add(diagnostic.line),
        column: relocated_column,
        ..diagnostic
    }
}

/// Parse one declaration, reporting what goes wrong to `context`.
fn parse_declaration(
    declaration: &stylesheet::Declaration,
    config: &EngineConfig,
    context: &ParserContext,
) -> Option<Declaration> {
    let position = (declaration.line, declaration.column);
    let Some(info) = lookup(&declaration.name) else {
        warn!("dropping unknown property '{}'", declaration.name);
        context.push(Diagnostic {
            severity: Severity::Error,
            message: format!("No property named \"{}\"", declaration.name),
            line: position.0,
            column: position.1,
        });
        return None;
    };
    let value_context = ParserContext::new();
    let parsed = parse_entirely(&declaration.value, |input| info.parse(input, &value_context));
    let mut deprecated = false;
    for diagnostic in value_context.take_diagnostics() {
        deprecated |= diagnostic.severity == Severity::Deprecated;
        let mut diagnostic = relocate(diagnostic, position.0, position.1);
        if config.deprecations_as_errors {
            diagnostic.severity = Severity::Error;
        }
        context.push(diagnostic);
    }
    match parsed {
        Ok(_) if deprecated && config.deprecations_as_errors => {
            warn!("dropping deprecated value for '{}'", info.name());
            None
        }
        Ok(value) => Some(Declaration {
            property: info.id,
            value,
            important: declaration.important,
        }),
        Err(diagnostic) => {
            let diagnostic = relocate(diagnostic, position.0, position.1);
            warn!("dropping declaration '{}': {diagnostic}", info.name());
            context.push(diagnostic);
            None
        }
    }
}

impl Stylesheet {
    /// Parse `css` as a sheet of `config.origin`. Nothing aborts the sheet: unsupported
    /// selectors, unknown properties and invalid values are dropped and reported to `context`.
    pub fn parse(css: &str, config: &EngineConfig, context: &ParserContext) -> Self {
        let tokenized = parse_stylesheet(css, context);
        let mut sheet = Self {
            origin: config.origin,
            ..Self::default()
        };
        for definition in &tokenized.colors {
            match parse_entirely(&definition.value, parse_color) {
                Ok(color) => {
                    sheet.colors.insert(definition.name.clone(), color);
                }
                Err(diagnostic) => {
                    let diagnostic = relocate(diagnostic, definition.line, definition.column);
                    warn!("dropping color definition '{}': {diagnostic}", definition.name);
                    context.push(diagnostic);
                }
            }
        }
        for rule in &tokenized.rules {
            let selectors = parse_selector_list(&rule.prelude);
            if selectors.is_empty() {
                debug!("skipping rule with unsupported selector '{}'", rule.prelude);
                continue;
            }
            let declarations = rule
                .declarations
                .iter()
                .filter_map(|declaration| parse_declaration(declaration, config, context))
                .collect();
            sheet.rules.push(Rule {
                selectors,
                declarations,
                source_order: rule.source_order,
            });
        }
        debug!(
            "parsed {} rules and {} colors from {:?} sheet",
            sheet.rules.len(),
            sheet.colors.len(),
            sheet.origin
        );
        sheet
    }

    /// Regenerate the sheet: color definitions by name, then the rules in source order.
    pub fn to_css_string(&self) -> String {
        let mut out = String::new();
        for (name, color) in &self.colors {
            out.push_str(&format!("@define-color {name} {};\n", color.to_css_string()));
        }
        for rule in &self.rules {
            if !out.is_empty() {
                out.push('\n');
            }
            let selectors: Vec<String> = rule.selectors.iter().map(Selector::to_css_string).collect();
            out.push_str(&selectors.join(", "));
            out.push_str(" {\n");
            for declaration in &rule.declarations {
                let important = if declaration.important { " !important" } else { "" };
                out.push_str(&format!(
                    "  {}: {}{important};\n",
                    declaration.property,
                    declaration.value.to_css_string()
                ));
            }
            out.push_str("}\n");
        }
        out
    }
}
