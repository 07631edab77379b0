//! Transitions between computed styles.

use css_values_units::{CssValue as _, PropertyId};
use log::trace;

use crate::computed::ComputedStyle;
use crate::properties::property_info;
use crate::style_value::StyleValue;

/// Interpolate `start` towards `end`. Values that cannot interpolate switch to `end` halfway.
pub fn transition_value(
    start: &StyleValue,
    end: &StyleValue,
    property: PropertyId,
    progress: f64,
) -> StyleValue {
    let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    if start.ptr_eq(end) || progress >= 1.0 {
        return end.clone();
    }
    if progress <= 0.0 {
        return start.clone();
    }
    start.transition(end, property, progress).unwrap_or_else(|| {
        trace!("{property}: {} does not interpolate, switching", start.kind_name());
        if progress < 0.5 { start.clone() } else { end.clone() }
    })
}

/// A running transition from one computed style to another.
#[derive(Clone, Debug)]
pub struct StyleTransition {
    start: ComputedStyle,
    end: ComputedStyle,
    /// Length in seconds, taken from the end style's `transition-duration`.
    duration: f64,
}

impl StyleTransition {
    pub fn new(start: ComputedStyle, end: ComputedStyle) -> Self {
        let duration = end
            .get(PropertyId::TransitionDuration)
            .as_number()
            .map_or(0.0, |number| number.get(0.0) / 1000.0);
        Self {
            start,
            end,
            duration,
        }
    }

    /// Length in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The style at `progress` in `[0, 1]`. Animated properties interpolate; the others take
    /// their end value right away.
    pub fn sample(&self, progress: f64) -> ComputedStyle {
        let values = PropertyId::ALL.map(|property| {
            let end = self.end.get(property);
            if property_info(property).animated {
                transition_value(self.start.get(property), end, property, progress)
            } else {
                end.clone()
            }
        });
        ComputedStyle::from_values(values)
    }

    /// The style `elapsed` seconds after the transition started.
    pub fn at(&self, elapsed: f64) -> ComputedStyle {
        if self.duration <= 0.0 {
            return self.end.clone();
        }
        self.sample(elapsed / self.duration)
    }

    /// Whether the transition has reached its end after `elapsed` seconds.
    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }
}
