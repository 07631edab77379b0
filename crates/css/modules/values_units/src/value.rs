//! The contract every style value implements.

use cssparser::ToCss;

use crate::context::{ComputeContext, PropertyId};

/// Shared behaviour of immutable style values.
///
/// Values are cheap handles over shared data. Equality is structural ([`PartialEq`]) and
/// printing goes through [`ToCss`]; printed text parses back to an equal value.
pub trait CssValue: Clone + PartialEq + ToCss + Send + Sync {
    /// Resolve context-dependent parts of the value.
    ///
    /// Returns a handle to the same instance (see [`CssValue::ptr_eq`]) when nothing changed, so
    /// callers can detect "no change" by identity.
    #[must_use]
    fn compute(&self, context: &ComputeContext<'_>) -> Self;

    /// Interpolate towards `end`. `None` means the two values cannot be interpolated and the
    /// caller should switch discretely.
    fn transition(&self, end: &Self, property: PropertyId, progress: f64) -> Option<Self>;

    /// Whether both handles point at the same instance.
    fn ptr_eq(&self, other: &Self) -> bool;
}
