//! CSS cascade resolution.
//!
//! Picks, per property, the declaration that applies to an element considering importance,
//! origin, specificity and source order.

use std::collections::BTreeMap;

use css_values_units::PropertyId;
use log::trace;

use crate::selectors::{Element, Specificity};
use crate::style_value::StyleValue;
use crate::stylesheet::{Rule, Stylesheet};
use crate::types::Origin;

/// Declared values for one element after the cascade; `None` where nothing applies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpecifiedStyle {
    values: [Option<StyleValue>; 17],
}

impl SpecifiedStyle {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, property: PropertyId) -> Option<&StyleValue> {
        self.values[property as usize].as_ref()
    }

    #[inline]
    pub fn set(&mut self, property: PropertyId, value: StyleValue) {
        self.values[property as usize] = Some(value);
    }

    /// Builder form of [`SpecifiedStyle::set`].
    #[inline]
    #[must_use]
    pub fn with(mut self, property: PropertyId, value: StyleValue) -> Self {
        self.set(property, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// A declaration tracked during cascading with the metadata that resolves conflicts.
#[derive(Clone, Debug)]
struct CascadedDecl<'sheet> {
    value: &'sheet StyleValue,
    important: bool,
    origin: Origin,
    specificity: Specificity,
    /// Sheet index, then rule position; later wins ties.
    source_order: (usize, u32),
}

/// Return true if `candidate` wins over `previous` according to the cascade.
fn wins_over(candidate: &CascadedDecl<'_>, previous: &CascadedDecl<'_>) -> bool {
    if candidate.important != previous.important {
        return candidate.important;
    }
    let (candidate_weight, previous_weight) = (candidate.origin.weight(), previous.origin.weight());
    if candidate_weight != previous_weight {
        return candidate_weight > previous_weight;
    }
    if candidate.specificity != previous.specificity {
        return candidate.specificity > previous.specificity;
    }
    candidate.source_order > previous.source_order
}

/// Insert a cascaded declaration if it wins over the one already recorded.
fn cascade_put<'sheet>(
    props: &mut BTreeMap<PropertyId, CascadedDecl<'sheet>>,
    property: PropertyId,
    entry: CascadedDecl<'sheet>,
) {
    let should_insert = props
        .get(&property)
        .is_none_or(|previous| wins_over(&entry, previous));
    if should_insert {
        props.insert(property, entry);
    }
}

/// Record the declarations of `rule` for every selector of it that matches `element`.
fn apply_rule_to_props<'sheet>(
    rule: &'sheet Rule,
    origin: Origin,
    sheet_index: usize,
    element: &dyn Element,
    props: &mut BTreeMap<PropertyId, CascadedDecl<'sheet>>,
) {
    for selector in rule.selectors.iter().filter(|selector| selector.matches(element)) {
        let specificity = selector.specificity();
        trace!("rule {} matches via '{}'", rule.source_order, selector.to_css_string());
        for declaration in &rule.declarations {
            let entry = CascadedDecl {
                value: &declaration.value,
                important: declaration.important,
                origin,
                specificity,
                source_order: (sheet_index, rule.source_order),
            };
            cascade_put(props, declaration.property, entry);
        }
    }
}

/// Cascade `sheets` (in load order) for `element`.
pub fn cascade(sheets: &[Stylesheet], element: &dyn Element) -> SpecifiedStyle {
    let mut props = BTreeMap::new();
    for (sheet_index, sheet) in sheets.iter().enumerate() {
        for rule in &sheet.rules {
            apply_rule_to_props(rule, sheet.origin, sheet_index, element, &mut props);
        }
    }
    let mut specified = SpecifiedStyle::new();
    for (property, entry) in props {
        specified.set(property, entry.value.clone());
    }
    specified
}
