//! Computed styles: every property resolved against the parent style and the provider.

use css_color::Rgba;
use css_values_units::{
    ColorValue, ComputeContext, CssValue as _, DEFAULT_FONT_SIZE_PX, INITIAL_COLOR, PropertyId, StyleLookup,
    StyleProvider, StyleSnapshot,
};
use log::{debug, trace};
use tiny_skia::{Paint, Pixmap, Rect, Transform};

use crate::cascade::SpecifiedStyle;
use crate::properties::property_info;
use crate::style_value::StyleValue;

/// The computed value of every property for one element.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedStyle {
    values: [StyleValue; 17],
}

/// Compute one property, inheriting or falling back to the initial value when undeclared.
fn compute_property(
    property: PropertyId,
    specified: &SpecifiedStyle,
    parent: Option<&ComputedStyle>,
    provider: &dyn StyleProvider,
    style: &StyleSnapshot,
) -> StyleValue {
    let info = property_info(property);
    let declared = specified.get(property);
    if declared.is_none()
        && info.inherited
        && let Some(parent) = parent
    {
        return parent.get(property).clone();
    }
    let value = declared.unwrap_or_else(|| info.initial());
    let parent_style = parent.map(|parent| parent as &dyn StyleLookup);
    let context = ComputeContext::new(property, provider, style, parent_style);
    let computed = value.compute(&context);
    trace!("{property}: {} computed", computed.kind_name());
    computed
}

impl ComputedStyle {
    /// Compute `specified` under `parent`. `font-size` is computed first and `color` second so
    /// font-relative units and `currentColor` see this element's values.
    pub fn compute(
        specified: &SpecifiedStyle,
        parent: Option<&Self>,
        provider: &dyn StyleProvider,
    ) -> Self {
        let mut style = parent.map_or_else(
            || StyleSnapshot {
                font_size: provider.default_font_size(),
                color: INITIAL_COLOR,
            },
            |parent| StyleSnapshot {
                font_size: parent.font_size(),
                color: parent.color(),
            },
        );
        let font_size =
            compute_property(PropertyId::FontSize, specified, parent, provider, &style);
        style.font_size = font_size
            .as_number()
            .map_or(style.font_size, |number| number.get(style.font_size));
        let color = compute_property(PropertyId::Color, specified, parent, provider, &style);
        style.color = color
            .as_color()
            .and_then(ColorValue::as_literal)
            .unwrap_or(INITIAL_COLOR);
        let values = PropertyId::ALL.map(|property| match property {
            PropertyId::FontSize => font_size.clone(),
            PropertyId::Color => color.clone(),
            other => compute_property(other, specified, parent, provider, &style),
        });
        Self { values }
    }

    /// Compute again, keeping `previous`'s handle for every property whose value did not
    /// change, so that [`ComputedStyle::changed_properties`] reports only real changes.
    pub fn recompute(
        previous: &Self,
        specified: &SpecifiedStyle,
        parent: Option<&Self>,
        provider: &dyn StyleProvider,
    ) -> Self {
        let mut fresh = Self::compute(specified, parent, provider);
        for (value, old) in fresh.values.iter_mut().zip(&previous.values) {
            if value == old {
                value.clone_from(old);
            }
        }
        debug!(
            "recomputed style, {} properties changed",
            fresh.changed_properties(previous).len()
        );
        fresh
    }

    pub(crate) fn from_values(values: [StyleValue; 17]) -> Self {
        Self { values }
    }

    #[inline]
    pub fn get(&self, property: PropertyId) -> &StyleValue {
        &self.values[property as usize]
    }

    /// Properties whose value is not the same handle as in `other`.
    pub fn changed_properties(&self, other: &Self) -> Vec<PropertyId> {
        PropertyId::ALL
            .into_iter()
            .filter(|property| !self.get(*property).ptr_eq(other.get(*property)))
            .collect()
    }

    /// Fill `(0, 0, width, height)` with `background-color`, then draw `background-image` over
    /// it.
    pub fn draw_background(
        &self,
        pixmap: &mut Pixmap,
        width: f64,
        height: f64,
        provider: &dyn StyleProvider,
    ) {
        let background = self
            .get(PropertyId::BackgroundColor)
            .as_color()
            .and_then(ColorValue::as_literal)
            .unwrap_or(Rgba::TRANSPARENT);
        if let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32)
            && background.alpha > 0.0
        {
            let (red, green, blue, alpha) = background.to_rgba8();
            let mut paint = Paint::default();
            paint.set_color_rgba8(red, green, blue, alpha);
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
        if let Some(image) = self.get(PropertyId::BackgroundImage).as_image() {
            image.draw(pixmap, width, height, provider.theme_engine());
        }
    }
}

impl StyleLookup for ComputedStyle {
    fn font_size(&self) -> f64 {
        self.get(PropertyId::FontSize)
            .as_number()
            .map_or(DEFAULT_FONT_SIZE_PX, |number| number.get(DEFAULT_FONT_SIZE_PX))
    }

    fn color(&self) -> Rgba {
        self.get(PropertyId::Color)
            .as_color()
            .and_then(ColorValue::as_literal)
            .unwrap_or(INITIAL_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SheetProvider;
    use css_syntax::{ParserContext, parse_entirely};
    use css_values_units::{NumberValue, Unit};
    use cssparser::ToCss as _;

    fn value(property: PropertyId, text: &str) -> StyleValue {
        let context = ParserContext::new();
        parse_entirely(text, |input| property_info(property).parse(input, &context))
            .unwrap_or_else(|diagnostic| panic!("{text}: {}", diagnostic.message))
    }

    fn printed(style: &ComputedStyle, property: PropertyId) -> String {
        style.get(property).to_css_string()
    }

    /// Root styles compute their initial values against the provider's font size.
    ///
    /// # Panics
    /// Panics if an initial value computes wrongly.
    #[test]
    fn root_initial_values() {
        let provider = SheetProvider::default();
        let style = ComputedStyle::compute(&SpecifiedStyle::new(), None, &provider);
        assert_eq!(printed(&style, PropertyId::FontSize), "16px");
        assert_eq!(printed(&style, PropertyId::Color), "rgb(255,255,255)");
        assert_eq!(printed(&style, PropertyId::BackgroundColor), "rgba(0,0,0,0)");
        assert!(matches!(style.font_size(), 16.0));
    }

    /// `em` resolves against the element's own font size, which resolves against the parent's.
    ///
    /// # Panics
    /// Panics if font-relative units resolve against the wrong size.
    #[test]
    fn font_relative_units() {
        let provider = SheetProvider::default();
        let parent = ComputedStyle::compute(
            &SpecifiedStyle::new().with(PropertyId::FontSize, value(PropertyId::FontSize, "20px")),
            None,
            &provider,
        );
        let specified = SpecifiedStyle::new()
            .with(PropertyId::FontSize, value(PropertyId::FontSize, "150%"))
            .with(PropertyId::MinWidth, value(PropertyId::MinWidth, "2em"))
            .with(PropertyId::MinHeight, value(PropertyId::MinHeight, "1rem"));
        let child = ComputedStyle::compute(&specified, Some(&parent), &provider);
        assert_eq!(printed(&child, PropertyId::FontSize), "30px");
        assert_eq!(printed(&child, PropertyId::MinWidth), "60px");
        assert_eq!(printed(&child, PropertyId::MinHeight), "16px");
    }

    /// Inherited properties share the parent's handle; others restart from their initial value.
    ///
    /// # Panics
    /// Panics if inheritance copies or skips a value.
    #[test]
    fn inheritance() {
        let provider = SheetProvider::default();
        let parent = ComputedStyle::compute(
            &SpecifiedStyle::new()
                .with(PropertyId::Color, value(PropertyId::Color, "red"))
                .with(PropertyId::MinWidth, value(PropertyId::MinWidth, "5px")),
            None,
            &provider,
        );
        let child = ComputedStyle::compute(&SpecifiedStyle::new(), Some(&parent), &provider);
        assert!(child.get(PropertyId::Color).ptr_eq(parent.get(PropertyId::Color)));
        assert!(child.get(PropertyId::FontSize).ptr_eq(parent.get(PropertyId::FontSize)));
        assert_eq!(printed(&child, PropertyId::MinWidth), "0px");
    }

    /// `currentColor` sees the element's own color; for `color` itself it sees the parent's.
    ///
    /// # Panics
    /// Panics if `currentColor` resolves against the wrong style.
    #[test]
    fn current_color() {
        let provider = SheetProvider::default();
        let parent = ComputedStyle::compute(
            &SpecifiedStyle::new().with(PropertyId::Color, value(PropertyId::Color, "blue")),
            None,
            &provider,
        );
        let specified = SpecifiedStyle::new()
            .with(PropertyId::Color, value(PropertyId::Color, "mix(currentColor, red, 1)"))
            .with(PropertyId::BackgroundColor, value(PropertyId::BackgroundColor, "currentColor"));
        let child = ComputedStyle::compute(&specified, Some(&parent), &provider);
        assert_eq!(printed(&child, PropertyId::Color), "rgb(255,0,0)");
        assert_eq!(printed(&child, PropertyId::BackgroundColor), "rgb(255,0,0)");
    }

    /// Recomputing an unchanged style keeps every handle; a changed declaration changes only
    /// its property.
    ///
    /// # Panics
    /// Panics if recompute reallocates unchanged values.
    #[test]
    fn recompute_keeps_handles() {
        let provider = SheetProvider::default();
        let specified = SpecifiedStyle::new()
            .with(PropertyId::MinWidth, value(PropertyId::MinWidth, "1em"))
            .with(
                PropertyId::BackgroundImage,
                value(PropertyId::BackgroundImage, "linear-gradient(red, blue)"),
            );
        let first = ComputedStyle::compute(&specified, None, &provider);
        let same = ComputedStyle::recompute(&first, &specified, None, &provider);
        assert!(same.changed_properties(&first).is_empty());

        let changed = specified.with(
            PropertyId::MinWidth,
            StyleValue::Number(NumberValue::new(2.0, Unit::Em)),
        );
        let second = ComputedStyle::recompute(&first, &changed, None, &provider);
        assert_eq!(second.changed_properties(&first), [PropertyId::MinWidth]);
    }

    /// The background color is painted under the background image.
    ///
    /// # Panics
    /// Panics if the background is not drawn.
    #[test]
    fn draws_background() {
        let provider = SheetProvider::default();
        let specified = SpecifiedStyle::new().with(
            PropertyId::BackgroundColor,
            StyleValue::Color(ColorValue::literal(Rgba::new(0.0, 0.0, 1.0, 1.0))),
        );
        let style = ComputedStyle::compute(&specified, None, &provider);
        let mut pixmap = Pixmap::new(4, 4).unwrap_or_else(|| panic!("pixmap"));
        style.draw_background(&mut pixmap, 4.0, 4.0, &provider);
        let pixel = pixmap.pixel(1, 1).unwrap_or_else(|| panic!("pixel"));
        assert_eq!((pixel.red(), pixel.blue(), pixel.alpha()), (0, 255, 255));
    }
}
