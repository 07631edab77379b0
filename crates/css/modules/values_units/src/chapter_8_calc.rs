//! CSS Values & Units Level 3: §8.1 Mathematical Expressions: `calc()`
//! Spec: <https://www.w3.org/TR/css-values-3/#calc-notation>
//!
//! A sum is kept as a list of terms in canonical order with same-shape terms merged, so equal
//! sums compare equal term by term.

use core::fmt::{self, Write};

use cssparser::{Parser, ToCss, Token};
use css_syntax::{ParseResult, ParserContext, ParserExt as _};
use smallvec::SmallVec;

use crate::chapter_4_numbers::{NumberKind, NumberValue, ParseFlags, parse_number_value};
use crate::chapter_6_dimensions::Dimension;
use crate::context::ComputeContext;
use crate::value::CssValue as _;

/// Terms of a sum; most sums have two.
pub type Terms = SmallVec<NumberValue, 2>;

/// An n-ary sum of numeric terms.
#[derive(Debug, PartialEq)]
pub struct CalcValue {
    terms: Terms,
}

/// Insert `value` into `terms`, merging it into an existing term when possible and otherwise
/// keeping the terms sorted by [`NumberValue::calc_term_order`].
pub fn array_add(terms: &mut Terms, value: NumberValue) {
    if let NumberKind::Calc(calc) = value.kind() {
        for term in &calc.terms {
            array_add(terms, term.clone());
        }
        return;
    }
    for slot in terms.iter_mut() {
        if let Some(sum) = slot.try_add(&value) {
            *slot = sum;
            return;
        }
    }
    let order = value.calc_term_order();
    let position = terms
        .iter()
        .position(|term| term.calc_term_order() > order)
        .unwrap_or(terms.len());
    terms.insert(position, value);
}

/// Turn a term list into a value, collapsing a single term to itself.
pub fn from_terms(mut terms: Terms) -> NumberValue {
    if terms.len() == 1
        && let Some(single) = terms.pop()
    {
        return single;
    }
    NumberValue::from_kind(NumberKind::Calc(CalcValue { terms }))
}

/// Build the normalized sum of two values.
pub fn new_sum(left: &NumberValue, right: &NumberValue) -> NumberValue {
    let mut terms = Terms::new();
    array_add(&mut terms, left.clone());
    array_add(&mut terms, right.clone());
    from_terms(terms)
}

impl CalcValue {
    /// Terms in canonical order.
    #[inline]
    pub fn terms(&self) -> &[NumberValue] {
        &self.terms
    }

    /// Sum of every term resolved against the same percentage reference.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        self.terms
            .iter()
            .map(|term| term.get(one_hundred_percent))
            .sum()
    }

    /// The first non-percentage dimension among the terms; percentage only if every term is one.
    pub fn dimension(&self) -> Dimension {
        self.terms
            .iter()
            .map(NumberValue::dimension)
            .find(|dimension| *dimension != Dimension::Percentage)
            .unwrap_or(Dimension::Percentage)
    }

    /// Scale every term.
    pub fn multiply(&self, factor: f64) -> NumberValue {
        let mut terms = Terms::new();
        for term in &self.terms {
            array_add(&mut terms, term.multiply(factor));
        }
        from_terms(terms)
    }

    /// Compute every term and renormalize; returns `this` when no term changed.
    pub fn compute(&self, this: &NumberValue, context: &ComputeContext<'_>) -> NumberValue {
        let mut changed = false;
        let mut terms = Terms::new();
        for term in &self.terms {
            let computed = term.compute(context);
            changed |= !computed.ptr_eq(term);
            array_add(&mut terms, computed);
        }
        if changed {
            from_terms(terms)
        } else {
            this.clone()
        }
    }
}

impl ToCss for CalcValue {
    fn to_css<W: Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_str("calc(")?;
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                dest.write_str(" + ")?;
            }
            term.to_css(dest)?;
        }
        dest.write_str(")")
    }
}

/// `value := '(' sum ')' | number-value`
fn parse_value<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
) -> ParseResult<'input, NumberValue> {
    let start = input.state();
    if matches!(input.next(), Ok(Token::ParenthesisBlock)) {
        return input.parse_nested_block(|nested| {
            let sum = parse_sum(nested, context, flags)?;
            if !nested.is_exhausted() {
                return Err(nested.invalid("Missing closing ')' in calc() subterm"));
            }
            Ok(sum)
        });
    }
    input.reset(&start);
    parse_number_value(input, context, flags)
}

/// `product := value (('*' | '/') product)*`; at most one factor of a product may carry units.
fn parse_product<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
) -> ParseResult<'input, NumberValue> {
    let mut actual_flags = flags | ParseFlags::NUMBER;
    let mut result = parse_value(input, context, actual_flags)?;
    loop {
        if actual_flags != ParseFlags::NUMBER && !result.is_number() {
            actual_flags = ParseFlags::NUMBER;
        }
        if input.try_delim('*') {
            let factor = parse_product(input, context, actual_flags)?;
            result = if factor.is_number() {
                result.multiply(factor.get(100.0))
            } else {
                factor.multiply(result.get(100.0))
            };
        } else if input.try_delim('/') {
            let divisor = parse_product(input, context, ParseFlags::NUMBER)?.get(100.0);
            if divisor == 0.0 {
                return Err(input.invalid("Division by zero in calc()"));
            }
            result = result.multiply(1.0 / divisor);
        } else {
            break;
        }
    }
    if result.is_number() && !flags.contains(ParseFlags::NUMBER) {
        return Err(input.invalid("calc() product term has no units"));
    }
    Ok(result)
}

/// `sum := product (('+' | '-') product)*`
fn parse_sum<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
) -> ParseResult<'input, NumberValue> {
    let mut result = parse_product(input, context, flags)?;
    loop {
        let next = if input.try_delim('+') {
            parse_product(input, context, flags)?
        } else if input.try_delim('-') {
            parse_product(input, context, flags)?.multiply(-1.0)
        } else {
            break;
        };
        result = new_sum(&result, &next);
    }
    Ok(result)
}

/// Parse `calc( sum )`.
///
/// Negative results are allowed inside `calc()` even where literals must be positive; they can
/// only be judged once computed.
///
/// # Errors
/// Returns an error when the input is not a well-formed `calc()` expression.
pub fn parse_calc<'input>(
    input: &mut Parser<'input, '_>,
    context: &ParserContext,
    flags: ParseFlags,
) -> ParseResult<'input, NumberValue> {
    let flags = flags.without(ParseFlags::POSITIVE_ONLY);
    input
        .try_function_block("calc", |nested| {
            let sum = parse_sum(nested, context, flags)?;
            if !nested.is_exhausted() {
                return Err(nested.invalid("Expected ')' after calc() statement"));
            }
            Ok(sum)
        })
        .unwrap_or_else(|| Err(input.invalid("Expected 'calc('")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapter_6_dimensions::Unit;
    use crate::context::{BasicProvider, PropertyId, StyleSnapshot};
    use css_syntax::parse_entirely;

    fn parse(text: &str) -> Result<NumberValue, String> {
        let context = ParserContext::new();
        parse_entirely(text, |input| {
            parse_number_value(
                input,
                &context,
                ParseFlags::LENGTH | ParseFlags::PERCENT | ParseFlags::POSITIVE_ONLY,
            )
        })
        .map_err(|diagnostic| diagnostic.message)
    }

    /// Mixed absolute and percentage sums resolve by linear combination.
    ///
    /// # Panics
    /// Panics if the sum resolves incorrectly.
    #[test]
    fn mixed_sum_resolves() {
        let value = parse("calc(10px + 5%)").unwrap_or_else(|message| panic!("{message}"));
        assert_eq!(value.get(100.0), 15.0);
        assert_eq!(value.dimension(), Dimension::Length);
        assert!(value.has_percent());
        assert_eq!(value.to_css_string(), "calc(10px + 5%)");
    }

    /// Products commute around the unitless factor.
    ///
    /// # Panics
    /// Panics if either product order yields something other than `6px`.
    #[test]
    fn products_commute() {
        assert_eq!(parse("calc(2 * 3px)"), Ok(NumberValue::px(6.0)));
        assert_eq!(parse("calc(3px * 2)"), Ok(NumberValue::px(6.0)));
        assert_eq!(parse("calc(12px / 4)"), Ok(NumberValue::px(3.0)));
        assert_eq!(parse("calc((1px + 2px) * 2)"), Ok(NumberValue::px(6.0)));
    }

    /// Errors name the malformed part of the expression.
    ///
    /// # Panics
    /// Panics if a malformed expression parses or reports the wrong message.
    #[test]
    fn product_errors() {
        assert_eq!(
            parse("calc(2 * 3)"),
            Err("calc() product term has no units".to_owned())
        );
        assert_eq!(parse("calc(2px * 3px)").ok(), None);
        assert_eq!(parse("calc(6px / 2px)").ok(), None);
        assert_eq!(
            parse("calc(1px 2px)"),
            Err("Expected ')' after calc() statement".to_owned())
        );
        assert_eq!(parse("calc(-1px)").err(), None);
        assert_eq!(
            parse("calc(10px / 0)"),
            Err("Division by zero in calc()".to_owned())
        );
        assert_eq!(
            parse("calc(10px / (2 - 2))"),
            Err("Division by zero in calc()".to_owned())
        );
    }

    /// Merging collapses equal-unit terms, so different spellings normalize alike.
    ///
    /// # Panics
    /// Panics if two equivalent sums end up structurally different.
    #[test]
    fn normalization_is_order_independent() {
        assert_eq!(parse("calc(1px + 1px)"), parse("calc(2px)"));
        assert_eq!(parse("calc(2px)"), Ok(NumberValue::px(2.0)));
        let orders = [
            "calc(1em + 2px + 3%)",
            "calc(3% + 1em + 2px)",
            "calc(2px + 3% + 1em)",
        ];
        let first = parse(orders[0]);
        for text in orders {
            assert_eq!(parse(text), first);
        }
        assert_eq!(
            first.map(|value| value.to_css_string()),
            Ok("calc(1em + 2px + 3%)".to_owned())
        );
        assert_eq!(
            parse("calc(5px - 5px + 1%)").map(|value| value.to_css_string()),
            Ok("calc(0px + 1%)".to_owned())
        );
    }

    /// Compute merges terms that became the same shape and keeps identity otherwise.
    ///
    /// # Panics
    /// Panics if compute fails to merge or needlessly reallocates.
    #[test]
    fn compute_renormalizes() {
        let provider = BasicProvider::default();
        let style = StyleSnapshot::new(10.0);
        let context = ComputeContext::new(PropertyId::MinWidth, &provider, &style, None);

        let value = parse("calc(1em + 2px + 1in)").unwrap_or_else(|message| panic!("{message}"));
        assert_eq!(value.compute(&context), NumberValue::px(108.0));

        let computed = parse("calc(2px + 10%)").unwrap_or_else(|message| panic!("{message}"));
        assert!(computed.compute(&context).ptr_eq(&computed));

        let scaled = computed.multiply(2.0);
        assert_eq!(scaled.to_css_string(), "calc(4px + 20%)");
        let mixed = NumberValue::new(1.0, Unit::Em).add(&NumberValue::px(1.0));
        assert_eq!(mixed.calc_term_order(), Unit::Em.calc_term_order());
    }
}
