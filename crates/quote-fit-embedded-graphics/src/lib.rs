//! embedded-graphics backend for `quote-fit-render` pages.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use core::convert::Infallible;
use std::borrow::Cow;
use std::sync::Arc;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{
        ascii::{
            FONT_10X20, FONT_7X13, FONT_7X13_BOLD, FONT_8X13, FONT_8X13_BOLD, FONT_9X18,
            FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use log::debug;
use quote_fit_render::{FontWeight, QuotePage, TextMeasurer};

/// Backend-local font identifier used for metrics and draw dispatch.
pub type FontId = u8;

/// Why size/weight mapping had to fall back to a base face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontFallbackReason {
    /// Requested weight has no face at this size; the base weight is used.
    UnsupportedWeight,
    /// Font id did not decode to a known face.
    UnknownFontId,
}

/// Resolved font selection for a size/weight request.
///
/// The fallback outcome is decided once here, at mapping time; callers and
/// draw paths never re-probe per invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSelection {
    pub font_id: FontId,
    pub fallback_reason: Option<FontFallbackReason>,
}

/// Backend metrics for a specific font id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    pub char_width: i32,
    pub line_height: i32,
}

/// Font abstraction used by the renderer's text paths.
pub trait FontBackend {
    fn resolve_font(&self, size_px: u32, weight: FontWeight) -> FontSelection;
    fn metrics(&self, font_id: FontId) -> FontMetrics;
    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        origin: Point,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>;
}

/// Mono-font backend over the embedded-graphics ASCII faces.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    const SIZE_SMALL: FontId = 0;
    const SIZE_MEDIUM: FontId = 1;
    const SIZE_LARGE: FontId = 2;
    const SIZE_XL: FontId = 3;

    fn encode_font_id(size_bucket: FontId, bold: bool) -> FontId {
        (size_bucket << 1) | (bold as FontId)
    }

    fn decode_font_id(font_id: FontId) -> (FontId, bool) {
        ((font_id >> 1) & 0x03, font_id & 0x01 == 1)
    }

    fn size_bucket_for(size_px: u32) -> FontId {
        if size_px >= 28 {
            Self::SIZE_XL
        } else if size_px >= 22 {
            Self::SIZE_LARGE
        } else if size_px >= 18 {
            Self::SIZE_MEDIUM
        } else {
            Self::SIZE_SMALL
        }
    }

    fn font_for(font_id: FontId) -> (&'static MonoFont<'static>, Option<FontFallbackReason>) {
        let (size_bucket, bold) = Self::decode_font_id(font_id);
        match (size_bucket, bold) {
            (Self::SIZE_SMALL, false) => (&FONT_7X13, None),
            (Self::SIZE_SMALL, true) => (&FONT_7X13_BOLD, None),
            (Self::SIZE_MEDIUM, false) => (&FONT_8X13, None),
            (Self::SIZE_MEDIUM, true) => (&FONT_8X13_BOLD, None),
            (Self::SIZE_LARGE, false) => (&FONT_9X18, None),
            (Self::SIZE_LARGE, true) => (&FONT_9X18_BOLD, None),
            (Self::SIZE_XL, false) => (&FONT_10X20, None),
            // No bold face at this size; base weight stands in.
            (Self::SIZE_XL, true) => (&FONT_10X20, Some(FontFallbackReason::UnsupportedWeight)),
            _ => (&FONT_8X13, Some(FontFallbackReason::UnknownFontId)),
        }
    }

    fn style_for(font_id: FontId) -> MonoTextStyle<'static, BinaryColor> {
        let (font, _) = Self::font_for(font_id);
        MonoTextStyle::new(font, BinaryColor::On)
    }
}

impl FontBackend for MonoFontBackend {
    fn resolve_font(&self, size_px: u32, weight: FontWeight) -> FontSelection {
        let bold = weight == FontWeight::Bold;
        let font_id = Self::encode_font_id(Self::size_bucket_for(size_px), bold);
        let (_, fallback_reason) = Self::font_for(font_id);
        FontSelection {
            font_id,
            fallback_reason,
        }
    }

    fn metrics(&self, font_id: FontId) -> FontMetrics {
        let style = Self::style_for(font_id);
        FontMetrics {
            char_width: style.font.character_size.width as i32,
            line_height: style.font.character_size.height as i32,
        }
    }

    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        origin: Point,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = Self::style_for(font_id);
        let normalized = normalize_text_for_mono(text);
        Text::with_baseline(normalized.as_ref(), origin, style, Baseline::Top).draw(display)?;
        Ok((normalized.chars().count() as i32) * (style.font.character_size.width as i32))
    }
}

/// Measurer backed by the mono font metrics, so wrap decisions use the same
/// width model as drawing.
pub struct EgTextMeasurer<B = MonoFontBackend> {
    backend: B,
}

impl EgTextMeasurer<MonoFontBackend> {
    /// Create a default measurer using the mono backend.
    pub fn new() -> Self {
        Self {
            backend: MonoFontBackend,
        }
    }

    /// Create a shared measurer trait object for engine wiring.
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new())
    }
}

impl Default for EgTextMeasurer<MonoFontBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> EgTextMeasurer<B>
where
    B: FontBackend,
{
    /// Create a measurer using an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }
}

impl<B> TextMeasurer for EgTextMeasurer<B>
where
    B: FontBackend + Send + Sync,
{
    fn measure_px(&self, text: &str, size_px: u32, weight: FontWeight) -> f32 {
        let selection = self.backend.resolve_font(size_px, weight);
        let metrics = self.backend.metrics(selection.font_id);
        normalize_text_for_mono(text).chars().count() as f32 * metrics.char_width as f32
    }

    fn line_height_px(&self, size_px: u32) -> i32 {
        let selection = self.backend.resolve_font(size_px, FontWeight::Regular);
        self.backend.metrics(selection.font_id).line_height
    }
}

/// Renderer executing composed pages onto a binary draw target.
pub struct EgRenderer<B = MonoFontBackend> {
    backend: B,
}

impl Default for EgRenderer<MonoFontBackend> {
    fn default() -> Self {
        Self {
            backend: MonoFontBackend,
        }
    }
}

impl EgRenderer<MonoFontBackend> {
    /// Renderer over the default mono backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B> EgRenderer<B>
where
    B: FontBackend,
{
    /// Renderer over an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Clear the target and draw every content and chrome command.
    pub fn render_page<D>(&self, page: &QuotePage, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        display.clear(BinaryColor::Off)?;
        for cmd in page.commands_iter() {
            let selection = self.backend.resolve_font(cmd.size_px, cmd.weight);
            if let Some(reason) = selection.fallback_reason {
                debug!("font fallback for size={}: {:?}", cmd.size_px, reason);
            }
            self.backend
                .draw_text_run(display, selection.font_id, &cmd.text, Point::new(cmd.x, cmd.y))?;
        }
        Ok(())
    }
}

/// Replace glyphs outside the 7-bit mono repertoire with ASCII stand-ins.
fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    let needs_mapping = |ch: char| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
                | '\u{2026}' // ellipsis
        )
    };
    if !text.chars().any(needs_mapping) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{2013}' => out.push('-'),
            '\u{2014}' => out.push_str("--"),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Heap-backed monochrome canvas for previews and tests.
///
/// Out-of-bounds pixels are dropped, matching panel-driver clipping.
pub struct MonoCanvas {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl MonoCanvas {
    /// All-off canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; (width * height) as usize],
        }
    }

    /// Whether the pixel at `(x, y)` is on.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[(y * self.width + x) as usize]
    }

    /// Count of on pixels.
    pub fn on_pixels(&self) -> usize {
        self.pixels.iter().filter(|on| **on).count()
    }

    /// Serialize as ASCII PBM (P1).
    pub fn to_pbm(&self) -> String {
        let mut out = String::with_capacity(self.pixels.len() * 2 + 32);
        out.push_str(&format!("P1\n{} {}\n", self.width, self.height));
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(if self.is_set(x, y) { '1' } else { '0' });
                if x + 1 < self.width {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}

impl OriginDimensions for MonoCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for MonoCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.width && y < self.height {
                self.pixels[(y * self.width + x) as usize] = color.is_on();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_id_round_trips_bucket_and_weight() {
        for bucket in 0..=MonoFontBackend::SIZE_XL {
            for bold in [false, true] {
                let id = MonoFontBackend::encode_font_id(bucket, bold);
                assert_eq!(MonoFontBackend::decode_font_id(id), (bucket, bold));
            }
        }
    }

    #[test]
    fn bold_falls_back_to_base_weight_at_largest_bucket() {
        let backend = MonoFontBackend;
        let bold = backend.resolve_font(30, FontWeight::Bold);
        assert_eq!(
            bold.fallback_reason,
            Some(FontFallbackReason::UnsupportedWeight)
        );
        let regular = backend.resolve_font(30, FontWeight::Regular);
        assert_eq!(
            backend.metrics(bold.font_id).char_width,
            backend.metrics(regular.font_id).char_width
        );
    }

    #[test]
    fn bold_is_distinct_where_supported() {
        let backend = MonoFontBackend;
        let bold = backend.resolve_font(22, FontWeight::Bold);
        let regular = backend.resolve_font(22, FontWeight::Regular);
        assert!(bold.fallback_reason.is_none());
        assert_ne!(bold.font_id, regular.font_id);
    }

    #[test]
    fn measurer_width_matches_backend_metrics() {
        let measurer = EgTextMeasurer::new();
        let backend = MonoFontBackend;
        let selection = backend.resolve_font(24, FontWeight::Regular);
        let char_width = backend.metrics(selection.font_id).char_width as f32;
        assert_eq!(
            measurer.measure_px("abcd", 24, FontWeight::Regular),
            4.0 * char_width
        );
    }

    #[test]
    fn mono_normalization_maps_typographic_chars() {
        assert_eq!(normalize_text_for_mono("plain"), "plain");
        assert_eq!(
            normalize_text_for_mono("it\u{2019}s \u{2014} fine\u{2026}"),
            "it's -- fine..."
        );
    }

    #[test]
    fn canvas_drops_out_of_bounds_pixels() {
        let mut canvas = MonoCanvas::new(4, 4);
        canvas
            .draw_iter([
                Pixel(Point::new(1, 1), BinaryColor::On),
                Pixel(Point::new(-1, 2), BinaryColor::On),
                Pixel(Point::new(9, 9), BinaryColor::On),
            ])
            .unwrap();
        assert_eq!(canvas.on_pixels(), 1);
        assert!(canvas.is_set(1, 1));
    }

    #[test]
    fn pbm_serialization_has_header_and_rows() {
        let canvas = MonoCanvas::new(2, 2);
        let pbm = canvas.to_pbm();
        assert!(pbm.starts_with("P1\n2 2\n"));
        assert_eq!(pbm.lines().count(), 4);
    }
}
