//! Resolved drawing patterns and their rasterization.
//!
//! A pattern is what an image value turns into once its box size is known: concrete geometry,
//! an extend mode and color stops normalized to `[0, 1]`. Patterns rasterize through
//! `tiny-skia` shaders.

use core::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use css_color::Rgba;
use log::{debug, trace};
use tiny_skia::{
    Color, GradientStop, LinearGradient, Paint, Pixmap, Point, RadialGradient, Rect, Shader,
    SpreadMode, Transform,
};

/// What happens past the last stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extend {
    /// The edge colors continue.
    Pad,
    /// The stop sequence repeats.
    Repeat,
}

/// A stop with its offset normalized to the pattern.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternStop {
    pub offset: f64,
    pub color: Rgba,
}

/// Where the colors of a pattern run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Along the line from `start` to `end`.
    Linear { start: (f64, f64), end: (f64, f64) },
    /// Outwards from the circle of `start_radius` around `center` to the one of `end_radius`,
    /// stretched vertically by `y_scale`. Repeating patterns repeat every
    /// `end_radius - start_radius`, in phase with the start circle.
    Radial {
        center: (f64, f64),
        start_radius: f64,
        end_radius: f64,
        y_scale: f64,
    },
    /// From the start circle to the end circle of a different center.
    TwoCircle {
        start: (f64, f64),
        start_radius: f64,
        end: (f64, f64),
        end_radius: f64,
    },
}

/// A fully resolved gradient, ready to rasterize.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub geometry: Geometry,
    pub extend: Extend,
    pub stops: Vec<PatternStop>,
}

fn to_skia_color(color: Rgba) -> Color {
    let clamped = color.clamped();
    Color::from_rgba(
        clamped.red as f32,
        clamped.green as f32,
        clamped.blue as f32,
        clamped.alpha as f32,
    )
    .unwrap_or(Color::TRANSPARENT)
}

fn point((x, y): (f64, f64)) -> Point {
    Point::from_xy(x as f32, y as f32)
}

/// The color of sorted `stops` at `offset`, approached from below or from above. The two
/// differ only at hard stops.
fn color_at(stops: &[PatternStop], offset: f64, from_below: bool) -> Rgba {
    let index = if from_below {
        stops.partition_point(|stop| stop.offset < offset)
    } else {
        stops.partition_point(|stop| stop.offset <= offset)
    };
    let below = index.checked_sub(1).and_then(|previous| stops.get(previous));
    match (below, stops.get(index)) {
        (Some(below), Some(above)) => below.color.mix(
            above.color,
            (offset - below.offset) / (above.offset - below.offset),
        ),
        (Some(only), None) | (None, Some(only)) => only.color,
        (None, None) => Rgba::TRANSPARENT,
    }
}

impl Pattern {
    fn spread_mode(&self) -> SpreadMode {
        match self.extend {
            Extend::Pad => SpreadMode::Pad,
            Extend::Repeat => SpreadMode::Repeat,
        }
    }

    /// Stops with offsets mapped through `remap`, in ascending order.
    fn gradient_stops(&self, remap: impl Fn(f64) -> f64) -> Vec<GradientStop> {
        let mut stops: Vec<(f64, Color)> = self
            .stops
            .iter()
            .map(|stop| (remap(stop.offset).clamp(0.0, 1.0), to_skia_color(stop.color)))
            .collect();
        stops.sort_by(|left, right| left.0.total_cmp(&right.0));
        stops
            .into_iter()
            .map(|(offset, color)| GradientStop::new(offset as f32, color))
            .collect()
    }

    /// Stops of a repeating pattern whose period starts `phase` of the way into the shader's
    /// own period.
    fn phased_stops(&self, phase: f64) -> Vec<GradientStop> {
        if phase <= 0.0 || phase >= 1.0 {
            return self.gradient_stops(|offset| offset);
        }
        let mut sorted: Vec<PatternStop> = self
            .stops
            .iter()
            .map(|stop| PatternStop {
                offset: stop.offset.clamp(0.0, 1.0),
                color: stop.color,
            })
            .collect();
        sorted.sort_by(|left, right| left.offset.total_cmp(&right.offset));
        // The shader period starts where the pattern is at `cut`.
        let cut = 1.0 - phase;
        let stop = |offset: f64, color: Rgba| GradientStop::new(offset as f32, to_skia_color(color));
        let mut stops = Vec::with_capacity(sorted.len() + 2);
        stops.push(stop(0.0, color_at(&sorted, cut, false)));
        stops.extend(
            sorted
                .iter()
                .filter(|pattern_stop| pattern_stop.offset > cut)
                .map(|pattern_stop| stop(pattern_stop.offset - cut, pattern_stop.color)),
        );
        stops.extend(
            sorted
                .iter()
                .filter(|pattern_stop| pattern_stop.offset < cut)
                .map(|pattern_stop| stop(pattern_stop.offset + phase, pattern_stop.color)),
        );
        stops.push(stop(1.0, color_at(&sorted, cut, true)));
        stops
    }

    /// A shader for concentric circles around the origin of `transform`.
    fn concentric_shader(
        &self,
        start_radius: f64,
        end_radius: f64,
        transform: Transform,
    ) -> Option<Shader<'static>> {
        let origin = Point::from_xy(0.0, 0.0);
        match self.extend {
            Extend::Pad => {
                let inner = if end_radius > start_radius && start_radius > 0.0 {
                    start_radius / end_radius
                } else {
                    0.0
                };
                RadialGradient::new(
                    origin,
                    origin,
                    end_radius.max(f64::EPSILON) as f32,
                    self.gradient_stops(|offset| inner + offset * (1.0 - inner)),
                    SpreadMode::Pad,
                    transform,
                )
            }
            Extend::Repeat => {
                let period = (end_radius - start_radius).max(f64::EPSILON);
                RadialGradient::new(
                    origin,
                    origin,
                    period as f32,
                    self.phased_stops((start_radius / period).rem_euclid(1.0)),
                    SpreadMode::Repeat,
                    transform,
                )
            }
        }
    }

    /// A shader painting this pattern, its coordinates mapped through `transform`.
    pub fn shader(&self, transform: Transform) -> Option<Shader<'static>> {
        match self.stops.as_slice() {
            [] => return None,
            [only] => return Some(Shader::SolidColor(to_skia_color(only.color))),
            _ => {}
        }
        match self.geometry {
            Geometry::Linear { start, end } => LinearGradient::new(
                point(start),
                point(end),
                self.gradient_stops(|offset| offset),
                self.spread_mode(),
                transform,
            ),
            Geometry::Radial {
                center,
                start_radius,
                end_radius,
                y_scale,
            } => self.concentric_shader(
                start_radius,
                end_radius,
                transform
                    .pre_translate(center.0 as f32, center.1 as f32)
                    .pre_scale(1.0, y_scale as f32),
            ),
            Geometry::TwoCircle {
                start,
                start_radius,
                end,
                end_radius,
            } => {
                if start == end {
                    return self.concentric_shader(
                        start_radius,
                        end_radius,
                        transform.pre_translate(start.0 as f32, start.1 as f32),
                    );
                }
                // The shader's start circle is a point; an inner radius moves the stops outwards.
                let inner = if end_radius > start_radius && start_radius > 0.0 {
                    start_radius / end_radius
                } else {
                    0.0
                };
                RadialGradient::new(
                    point(start),
                    point(end),
                    end_radius.max(f64::EPSILON) as f32,
                    self.gradient_stops(|offset| inner + offset * (1.0 - inner)),
                    self.spread_mode(),
                    transform,
                )
            }
        }
    }

    /// Fill the rectangle `(0, 0, width, height)` of `pixmap`.
    pub fn fill(&self, pixmap: &mut Pixmap, width: f64, height: f64, transform: Transform) {
        let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) else {
            debug!("not drawing a pattern into an empty {width}x{height} box");
            return;
        };
        let Some(shader) = self.shader(transform) else {
            debug!("pattern with {} stops has no shader", self.stops.len());
            return;
        };
        let mut paint = Paint::default();
        paint.shader = shader;
        paint.anti_alias = true;
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

struct CachedPattern {
    size: (u64, u64),
    pattern: Arc<Pattern>,
}

/// The pattern an image built for the last size it was drawn at.
///
/// Owned by exactly one image value and dropped with it.
#[derive(Default)]
pub struct PatternCache {
    slot: Mutex<Option<CachedPattern>>,
}

impl PatternCache {
    /// The cached pattern for `width` × `height`, building and storing it on a miss.
    pub fn get_or_build(
        &self,
        width: f64,
        height: f64,
        build: impl FnOnce() -> Pattern,
    ) -> Arc<Pattern> {
        let size = (width.to_bits(), height.to_bits());
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref().filter(|cached| cached.size == size) {
            return Arc::clone(&cached.pattern);
        }
        trace!("building pattern for {width}x{height}");
        let pattern = Arc::new(build());
        *slot = Some(CachedPattern {
            size,
            pattern: Arc::clone(&pattern),
        });
        pattern
    }

    /// Whether a pattern for `width` × `height` is cached.
    pub fn holds(&self, width: f64, height: f64) -> bool {
        let size = (width.to_bits(), height.to_bits());
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|cached| cached.size == size)
    }
}

impl fmt::Debug for PatternCache {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("PatternCache").finish_non_exhaustive()
    }
}

/// Caches are derived state and never make two values differ.
impl PartialEq for PatternCache {
    #[inline]
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
