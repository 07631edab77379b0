//! CSS Color Module Level 4: Color spaces, color values, and opacity.
//! Spec: <https://www.w3.org/TR/css-color-4/>
use csscolorparser::Color;

/// `(red, green, blue, alpha)` in 8-bit channels.
pub type Rgba8Tuple = (u8, u8, u8, u8);

/// Parse a CSS <color> into 8-bit RGBA channels.
///
/// Supports named colors, hex forms (`#rgb`/`#rgba`/`#rrggbb`/`#rrggbbaa`),
/// and functional notations like `rgb()/rgba()`.
///
/// Spec: <https://www.w3.org/TR/css-color-4/#typedef-color>
/// Spec: <https://www.w3.org/TR/css-color-4/#legacy-color-values>
#[inline]
pub fn parse_css_color(input: &str) -> Option<Rgba8Tuple> {
    let parsed: Color = input.parse().ok()?;
    let channels = parsed.to_rgba8();
    let red = channels[0];
    let green = channels[1];
    let blue = channels[2];
    let alpha = channels[3];
    Some((red, green, blue, alpha))
}

/// Largest 8-bit channel value as a float.
const CHANNEL_MAX: f64 = 255.0;

/// An sRGB color with straight (non-premultiplied) alpha, every channel in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

/// An sRGB color in hue/saturation/lightness form. Hue is in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsla {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
    pub alpha: f64,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Build a color from float channels.
    #[inline]
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Build a color from 8-bit channels.
    #[inline]
    pub fn from_rgba8((red, green, blue, alpha): Rgba8Tuple) -> Self {
        Self::new(
            f64::from(red) / CHANNEL_MAX,
            f64::from(green) / CHANNEL_MAX,
            f64::from(blue) / CHANNEL_MAX,
            f64::from(alpha) / CHANNEL_MAX,
        )
    }

    /// Parse any color literal `csscolorparser` understands.
    #[inline]
    pub fn parse(input: &str) -> Option<Self> {
        parse_css_color(input).map(Self::from_rgba8)
    }

    /// Quantize to 8-bit channels, rounding to nearest.
    pub fn to_rgba8(self) -> Rgba8Tuple {
        let quantize = |channel: f64| (channel.clamp(0.0, 1.0) * CHANNEL_MAX).round() as u8;
        (
            quantize(self.red),
            quantize(self.green),
            quantize(self.blue),
            quantize(self.alpha),
        )
    }

    /// Clamp every channel into `0.0..=1.0`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(
            self.red.clamp(0.0, 1.0),
            self.green.clamp(0.0, 1.0),
            self.blue.clamp(0.0, 1.0),
            self.alpha.clamp(0.0, 1.0),
        )
    }

    /// Scale lightness and saturation by `factor` in HSL space (`shade()`).
    #[must_use]
    pub fn shade(self, factor: f64) -> Self {
        let mut hsla = Hsla::from_rgba(self);
        hsla.lightness = (hsla.lightness * factor).clamp(0.0, 1.0);
        hsla.saturation = (hsla.saturation * factor).clamp(0.0, 1.0);
        hsla.to_rgba()
    }

    /// Scale alpha by `factor` (`alpha()`).
    #[must_use]
    pub fn multiply_alpha(self, factor: f64) -> Self {
        Self {
            alpha: (self.alpha * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear per-channel mix towards `other` (`mix()`); `factor` 0 is `self`, 1 is `other`.
    #[must_use]
    pub fn mix(self, other: Self, factor: f64) -> Self {
        let lerp = |from: f64, to: f64| (from + (to - from) * factor).clamp(0.0, 1.0);
        Self::new(
            lerp(self.red, other.red),
            lerp(self.green, other.green),
            lerp(self.blue, other.blue),
            lerp(self.alpha, other.alpha),
        )
    }

    /// Interpolate in premultiplied space, as animations do.
    #[must_use]
    pub fn interpolate(self, end: Self, progress: f64) -> Self {
        let start_weight = 1.0 - progress;
        let alpha = self.alpha * start_weight + end.alpha * progress;
        if alpha <= 0.0 {
            return Self::TRANSPARENT;
        }
        let channel = |from: f64, to: f64| {
            ((from * self.alpha * start_weight + to * end.alpha * progress) / alpha)
                .clamp(0.0, 1.0)
        };
        Self::new(
            channel(self.red, end.red),
            channel(self.green, end.green),
            channel(self.blue, end.blue),
            alpha.clamp(0.0, 1.0),
        )
    }
}

impl Hsla {
    /// Convert from RGB.
    pub fn from_rgba(rgba: Rgba) -> Self {
        let max = rgba.red.max(rgba.green).max(rgba.blue);
        let min = rgba.red.min(rgba.green).min(rgba.blue);
        let lightness = f64::midpoint(max, min);
        let delta = max - min;
        if delta <= 0.0 {
            return Self {
                hue: 0.0,
                saturation: 0.0,
                lightness,
                alpha: rgba.alpha,
            };
        }
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let mut hue = if (rgba.red - max).abs() <= f64::EPSILON {
            (rgba.green - rgba.blue) / delta
        } else if (rgba.green - max).abs() <= f64::EPSILON {
            2.0 + (rgba.blue - rgba.red) / delta
        } else {
            4.0 + (rgba.red - rgba.green) / delta
        };
        hue *= 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
        Self {
            hue,
            saturation,
            lightness,
            alpha: rgba.alpha,
        }
    }

    /// Convert back to RGB.
    pub fn to_rgba(self) -> Rgba {
        if self.saturation <= 0.0 {
            return Rgba::new(self.lightness, self.lightness, self.lightness, self.alpha);
        }
        let upper = if self.lightness <= 0.5 {
            self.lightness * (1.0 + self.saturation)
        } else {
            self.lightness + self.saturation - self.lightness * self.saturation
        };
        let lower = 2.0 * self.lightness - upper;
        let channel = |offset: f64| {
            let hue = (self.hue + offset).rem_euclid(360.0);
            if hue < 60.0 {
                lower + (upper - lower) * hue / 60.0
            } else if hue < 180.0 {
                upper
            } else if hue < 240.0 {
                lower + (upper - lower) * (240.0 - hue) / 60.0
            } else {
                lower
            }
        };
        Rgba::new(channel(120.0), channel(0.0), channel(-120.0), self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    /// Literal parsing accepts names, hex and functional notation.
    ///
    /// # Panics
    /// Panics if a valid literal is rejected or decoded wrongly.
    #[test]
    fn parses_literals() {
        assert_eq!(parse_css_color("red"), Some((255, 0, 0, 255)));
        assert_eq!(parse_css_color("#00ff0080"), Some((0, 255, 0, 128)));
        assert_eq!(Rgba::parse("transparent").map(Rgba::to_rgba8), Some((0, 0, 0, 0)));
        assert_eq!(Rgba::parse("rgb(0, 0, 255)"), Some(Rgba::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(parse_css_color("not-a-color"), None);
    }

    /// HSL conversion round-trips and shade darkens.
    ///
    /// # Panics
    /// Panics if a conversion drifts.
    #[test]
    fn hsl_round_trip_and_shade() {
        let color = Rgba::new(0.2, 0.4, 0.6, 1.0);
        let back = Hsla::from_rgba(color).to_rgba();
        assert!(close(back.red, 0.2) && close(back.green, 0.4) && close(back.blue, 0.6));

        let darker = Rgba::WHITE.shade(0.7);
        assert!(close(darker.red, 0.7) && close(darker.blue, 0.7));
        assert_eq!(Rgba::WHITE.shade(1.3), Rgba::WHITE);
    }

    /// Premultiplied interpolation ignores the color of a transparent endpoint.
    ///
    /// # Panics
    /// Panics if the transparent endpoint tints the result.
    #[test]
    fn interpolates_premultiplied() {
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        let halfway = red.interpolate(Rgba::TRANSPARENT, 0.5);
        assert!(close(halfway.red, 1.0) && close(halfway.alpha, 0.5));
        let mixed = red.mix(Rgba::new(0.0, 0.0, 1.0, 1.0), 0.25);
        assert!(close(mixed.red, 0.75) && close(mixed.blue, 0.25));
        assert_eq!(red.multiply_alpha(2.0).alpha, 1.0);
    }
}
