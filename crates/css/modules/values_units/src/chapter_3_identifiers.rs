//! CSS Identifiers used as keyword values.
//! Spec: <https://www.w3.org/TR/css-values-3/#keywords>
//!
//! Keyword grammars are small fixed tables of `(name, value)` pairs; these helpers parse and
//! print against such a table.

use css_syntax::ParserExt as _;
use cssparser::Parser;

/// A keyword table: each spelling and the value it stands for.
pub type KeywordTable<T> = [(&'static str, T)];

/// Consume the next identifier if it is one of the table's keywords (ASCII case-insensitive).
/// Consumes nothing otherwise.
pub fn try_parse_keyword<T: Copy>(input: &mut Parser<'_, '_>, table: &KeywordTable<T>) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| input.try_ident_matching(name))
        .map(|(_, value)| *value)
}

/// The spelling of `value` in the table.
pub fn keyword_name<T: PartialEq>(table: &KeywordTable<T>, value: &T) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, candidate)| candidate == value)
        .map(|(name, _)| *name)
}
