//! Selector parsing, specificity and matching against host elements.
//!
//! Supported: type, `#id`, `.class`, `[attr=value]`, `*`, and the descendant and child
//! combinators. Selectors using pseudo-classes or pseudo-elements are dropped.
use core::iter::Peekable;
use core::mem::take;
use std::collections::HashMap;

/// An element of the host's widget tree, as seen by selector matching.
pub trait Element {
    /// Lower-case type name.
    fn tag(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn parent(&self) -> Option<&dyn Element>;
}

/// An owned [`Element`] for hosts without a tree of their own, and for tests.
#[derive(Clone, Debug, Default)]
pub struct ElementData {
    tag: String,
    element_id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    parent: Option<Box<ElementData>>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set an attribute; `id` and `class` also feed the id and class lists.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        if name.eq_ignore_ascii_case("id") {
            self.element_id = Some(value.to_owned());
        } else if name.eq_ignore_ascii_case("class") {
            self.classes = value
                .split(|character: char| character.is_ascii_whitespace())
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect();
        }
        self.attributes
            .insert(name.to_ascii_lowercase(), value.to_owned());
        self
    }

    #[must_use]
    pub fn with_id(self, element_id: &str) -> Self {
        self.with_attribute("id", element_id)
    }

    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_owned());
        let joined = self.classes.join(" ");
        self.attributes.insert("class".to_owned(), joined);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: Self) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl Element for ElementData {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|value| value == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn parent(&self) -> Option<&dyn Element> {
        self.parent.as_deref().map(|parent| parent as &dyn Element)
    }
}

/// Combinator between two selector parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A compound selector: tag, id, classes, attribute equalities or `*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleSelector {
    /// Lower-cased type name.
    tag: Option<String>,
    element_id: Option<String>,
    classes: Vec<String>,
    /// `[attr=value]` pairs; `[attr]` is stored with no value.
    attributes: Vec<(String, Option<String>)>,
    universal: bool,
}

impl SimpleSelector {
    fn has_content(&self) -> bool {
        self.universal
            || self.tag.is_some()
            || self.element_id.is_some()
            || !self.classes.is_empty()
            || !self.attributes.is_empty()
    }

    /// Whether `element` satisfies every component.
    pub fn matches(&self, element: &dyn Element) -> bool {
        if let Some(tag) = &self.tag
            && !element.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(element_id) = &self.element_id
            && element.id() != Some(element_id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|(name, expected)| match (element.attribute(name), expected) {
                (Some(value), Some(expected)) => value == expected,
                (Some(_), None) => true,
                (None, _) => false,
            })
    }

    fn write(&self, out: &mut String) {
        if let Some(tag) = &self.tag {
            out.push_str(tag);
        } else if self.universal {
            out.push('*');
        }
        if let Some(element_id) = &self.element_id {
            out.push('#');
            out.push_str(element_id);
        }
        for class in &self.classes {
            out.push('.');
            out.push_str(class);
        }
        for (name, value) in &self.attributes {
            out.push('[');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
            out.push(']');
        }
    }
}

/// One compound selector and the combinator linking it to the next part.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SelectorPart {
    sel: SimpleSelector,
    combinator_to_next: Option<Combinator>,
}

/// A complex selector, leftmost part first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector(Vec<SelectorPart>);

/// Specificity as (ids, classes and attributes, types), compared lexicographically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Selector {
    /// Specificity of this selector.
    pub fn specificity(&self) -> Specificity {
        let count = |len: usize| u32::try_from(len).unwrap_or(u32::MAX);
        self.0.iter().fold(Specificity::default(), |total, part| {
            let sel = &part.sel;
            Specificity(
                total.0.saturating_add(u32::from(sel.element_id.is_some())),
                total
                    .1
                    .saturating_add(count(sel.classes.len()))
                    .saturating_add(count(sel.attributes.len())),
                total.2.saturating_add(u32::from(sel.tag.is_some())),
            )
        })
    }

    /// Whether `element` is matched by this selector.
    pub fn matches(&self, element: &dyn Element) -> bool {
        let Some((last, rest)) = self.0.split_last() else {
            return false;
        };
        last.sel.matches(element) && matches_ancestors(rest, element)
    }

    /// Serialize back to selector text.
    pub fn to_css_string(&self) -> String {
        let mut out = String::new();
        for part in &self.0 {
            part.sel.write(&mut out);
            match part.combinator_to_next {
                Some(Combinator::Child) => out.push_str(" > "),
                Some(Combinator::Descendant) => out.push(' '),
                None => {}
            }
        }
        out
    }
}

/// Match `parts` (leftmost first) against the ancestors of `element`, backtracking over
/// descendant combinators.
fn matches_ancestors(parts: &[SelectorPart], element: &dyn Element) -> bool {
    let Some((last, rest)) = parts.split_last() else {
        return true;
    };
    match last.combinator_to_next.unwrap_or(Combinator::Descendant) {
        Combinator::Child => element
            .parent()
            .is_some_and(|parent| last.sel.matches(parent) && matches_ancestors(rest, parent)),
        Combinator::Descendant => {
            let mut climb = element.parent();
            while let Some(ancestor) = climb {
                if last.sel.matches(ancestor) && matches_ancestors(rest, ancestor) {
                    return true;
                }
                climb = ancestor.parent();
            }
            false
        }
    }
}

/// Consume an identifier from a character iterator.
fn consume_ident<I>(chars: &mut Peekable<I>) -> String
where
    I: Iterator<Item = char>,
{
    let mut out = String::new();
    while let Some(&character) = chars.peek() {
        if !(character.is_alphanumeric() || character == '-' || character == '_') {
            break;
        }
        out.push(character);
        chars.next();
    }
    out
}

fn skip_whitespace<I>(chars: &mut Peekable<I>)
where
    I: Iterator<Item = char>,
{
    while chars.peek().is_some_and(char::is_ascii_whitespace) {
        chars.next();
    }
}

/// Push the current simple selector into `parts`, attaching `combinator`.
fn commit_current_part(
    parts: &mut Vec<SelectorPart>,
    current: &mut SimpleSelector,
    combinator: Combinator,
) {
    parts.push(SelectorPart {
        sel: take(current),
        combinator_to_next: Some(combinator),
    });
}

/// Parse a quoted or unquoted attribute value.
fn parse_attr_value<I>(chars: &mut Peekable<I>) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let quote = chars.peek().copied()?;
    if quote != '"' && quote != '\'' {
        let value = consume_ident(chars);
        return (!value.is_empty()).then_some(value);
    }
    chars.next();
    let mut value = String::new();
    for character in chars.by_ref() {
        if character == quote {
            return Some(value);
        }
        value.push(character);
    }
    None
}

/// Parse the inside of `[...]`; the opening bracket is already consumed.
fn parse_attribute_selector<I>(chars: &mut Peekable<I>) -> Option<(String, Option<String>)>
where
    I: Iterator<Item = char>,
{
    skip_whitespace(chars);
    let name = consume_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    skip_whitespace(chars);
    let value = if chars.next_if_eq(&'=').is_some() {
        skip_whitespace(chars);
        Some(parse_attr_value(chars)?)
    } else {
        None
    };
    skip_whitespace(chars);
    chars.next_if_eq(&']')?;
    Some((name, value))
}

/// Handle one character of a selector. Returns `None` when the selector must be dropped.
fn process_selector_char<I>(
    character: char,
    chars: &mut Peekable<I>,
    current: &mut SimpleSelector,
    parts: &mut Vec<SelectorPart>,
) -> Option<()>
where
    I: Iterator<Item = char>,
{
    chars.next();
    match character {
        '>' => {
            if current.has_content() {
                commit_current_part(parts, current, Combinator::Child);
            } else if let Some(last) = parts.last_mut() {
                last.combinator_to_next = Some(Combinator::Child);
            } else {
                return None;
            }
        }
        '*' => current.universal = true,
        '#' => {
            let element_id = consume_ident(chars);
            if element_id.is_empty() {
                return None;
            }
            current.element_id = Some(element_id);
        }
        '.' => {
            let class = consume_ident(chars);
            if class.is_empty() {
                return None;
            }
            current.classes.push(class);
        }
        '[' => current.attributes.push(parse_attribute_selector(chars)?),
        character if character.is_alphabetic() && current.tag.is_none() => {
            let mut tag = String::from(character);
            tag.push_str(&consume_ident(chars));
            current.tag = Some(tag.to_ascii_lowercase());
        }
        // Pseudo-classes, pseudo-elements and anything unknown drop the selector.
        _ => return None,
    }
    Some(())
}

/// Parse a single complex selector.
fn parse_single_selector(selector_str: &str) -> Option<Selector> {
    let mut chars = selector_str.trim().chars().peekable();
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut current = SimpleSelector::default();
    loop {
        let mut saw_whitespace = false;
        while chars.next_if(char::is_ascii_whitespace).is_some() {
            saw_whitespace = true;
        }
        if saw_whitespace && current.has_content() {
            commit_current_part(&mut parts, &mut current, Combinator::Descendant);
        }
        let Some(character) = chars.peek().copied() else {
            break;
        };
        process_selector_char(character, &mut chars, &mut current, &mut parts)?;
    }
    if !current.has_content() {
        // A trailing combinator has nothing to its right.
        return None;
    }
    parts.push(SelectorPart {
        sel: current,
        combinator_to_next: None,
    });
    Some(Selector(parts))
}

/// Parse a comma separated selector list, dropping selectors that cannot be supported.
pub fn parse_selector_list(input: &str) -> Vec<Selector> {
    input.split(',').filter_map(parse_single_selector).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(text: &str) -> Selector {
        parse_selector_list(text)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("selector {text} was dropped"))
    }

    fn tree() -> ElementData {
        let window = ElementData::new("window").with_id("main");
        let box_element = ElementData::new("box")
            .with_class("toolbar")
            .with_parent(window);
        ElementData::new("button")
            .with_attribute("class", "flat suggested")
            .with_attribute("role", "push")
            .with_parent(box_element)
    }

    /// Specificity counts ids, then classes with attributes, then types.
    ///
    /// # Panics
    /// Panics if a specificity is miscounted.
    #[test]
    fn specificity() {
        assert_eq!(selector("*").specificity(), Specificity(0, 0, 0));
        assert_eq!(selector("button").specificity(), Specificity(0, 0, 1));
        assert_eq!(
            selector("#main box.toolbar > button[role=push]").specificity(),
            Specificity(1, 2, 2)
        );
        assert!(selector("#a").specificity() > selector(".a.b.c button").specificity());
    }

    /// Pseudo-classes and malformed selectors are dropped from the list; the rest stays.
    ///
    /// # Panics
    /// Panics if an unsupported selector survives.
    #[test]
    fn drops_unsupported() {
        let list = parse_selector_list("button:hover, label, .x::before, box >, #");
        assert_eq!(list.len(), 1);
        assert_eq!(list.first().map(Selector::to_css_string).as_deref(), Some("label"));
    }

    /// Descendant matching backtracks past ancestors; child matching only looks one level up.
    ///
    /// # Panics
    /// Panics if a selector matches the wrong elements.
    #[test]
    fn matching() {
        let button = tree();
        for text in [
            "button",
            "*",
            ".flat.suggested",
            "[role]",
            "[role=\"push\"]",
            "window button",
            "#main .toolbar > button",
            "window > box > button",
            "box button.flat",
        ] {
            assert!(selector(text).matches(&button), "{text} should match");
        }
        for text in [
            "label",
            "[role=pull]",
            "window > button",
            "#other button",
            "button box",
            ".toolbar > #main button",
        ] {
            assert!(!selector(text).matches(&button), "{text} should not match");
        }
    }

    /// Selectors print in a form that parses back to the same selector.
    ///
    /// # Panics
    /// Panics if printing loses information.
    #[test]
    fn prints() {
        for text in ["window > box.toolbar button", "*[role=\"push\"]", "#main"] {
            let parsed = selector(text);
            assert_eq!(selector(&parsed.to_css_string()), parsed);
        }
        assert_eq!(selector("A  >  .b").to_css_string(), "a > .b");
    }
}
