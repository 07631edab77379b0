//! Number serialization shared by every `ToCss` implementation.

use core::fmt::{self, Write};

/// Write `value` in its shortest form that parses back to the same number.
///
/// Numbers come out of the tokenizer as `f32`; when `value` is exactly representable as one, the
/// `f32` spelling is used so `0.1` prints as `0.1` rather than its widened `f64` expansion.
///
/// # Errors
/// Propagates errors from `dest`.
pub fn write_number<W: Write>(value: f64, dest: &mut W) -> fmt::Result {
    // Adding zero turns negative zero into positive zero.
    let value = value + 0.0;
    let narrow = value as f32;
    if f64::from(narrow).to_bits() == value.to_bits() {
        write!(dest, "{narrow}")
    } else {
        write!(dest, "{value}")
    }
}

/// Convenience wrapper returning the serialized number as a `String`.
pub fn number_to_string(value: f64) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    if write_number(value, &mut out).is_err() {
        out.clear();
    }
    out
}
