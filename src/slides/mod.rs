//! Slide synthesizer: one still 1080x1920 PNG per storyboard beat

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::model::Segment;
use crate::engine::commands::{VIDEO_HEIGHT, VIDEO_WIDTH};
use crate::ports::SlidePort;

pub mod canvas;
pub mod typeface;
pub mod wrap;

pub use canvas::{hsl_to_rgb, rgba, Canvas};
pub use typeface::{load_typeface, BlockFace, FontFace, TextStyle, Typeface, Weight};
pub use wrap::{wrap_lines, wrap_text, WrappedLine};

/// Errors raised while drawing or encoding a slide
#[derive(Error, Debug)]
pub enum SlideRenderError {
    /// Drawing surface could not be acquired
    #[error("Unable to acquire drawing surface: {message}")]
    Surface { message: String },

    /// Font file could not be read or parsed
    #[error("Unable to load font {path}: {message}")]
    Font { path: String, message: String },

    /// Image encoder failed or produced no data
    #[error("Failed to encode slide image: {message}")]
    Encode { message: String },
}

// Layout, in output pixels.
const PANEL_INSET: i32 = 72;
const DIVIDER_X: i32 = 100;
const DIVIDER_Y: i32 = 200;
const DIVIDER_HEIGHT: u32 = 4;
const TEXT_X: f32 = 112.0;
const HEADLINE_Y: f32 = 150.0;
const CAPTION_Y: f32 = 320.0;
const CONTENT_WIDTH: f32 = 856.0;
const CAPTION_LINE_HEIGHT: f32 = 110.0;
const NARRATION_GAP: f32 = 80.0;
const NARRATION_LINE_HEIGHT: f32 = 60.0;
const VISUAL_CUE_FROM_BOTTOM: f32 = 220.0;
const BADGE_RIGHT_MARGIN: f32 = 120.0;

/// Gradient stops for beat `index` of `total`: a hue sweep over 300 degrees
pub fn gradient_stops(index: usize, total: usize) -> ([u8; 3], [u8; 3]) {
    let span = total.saturating_sub(1).max(1) as f32;
    let hue = (index as f32 / span) * 300.0;
    let top = hsl_to_rgb(((hue + 10.0) % 360.0).round(), 82.0, 60.0);
    let bottom = hsl_to_rgb(((hue + 90.0) % 360.0).round(), 92.0, 28.0);
    (top, bottom)
}

/// Draws storyboard beats onto fixed-size slides
#[derive(Clone)]
pub struct SlideSynthesizer {
    face: Arc<dyn Typeface>,
    width: u32,
    height: u32,
}

impl SlideSynthesizer {
    pub fn new(face: Arc<dyn Typeface>) -> Self {
        Self {
            face,
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
        }
    }

    /// Synthesizer drawing onto a surface of a different size
    pub fn with_size(face: Arc<dyn Typeface>, width: u32, height: u32) -> Self {
        Self {
            face,
            width,
            height,
        }
    }

    pub fn typeface(&self) -> &dyn Typeface {
        self.face.as_ref()
    }

    fn headline_style() -> TextStyle {
        TextStyle::new(40.0, Weight::Bold, rgba(255, 255, 255, 0.72))
    }

    fn caption_style() -> TextStyle {
        TextStyle::new(92.0, Weight::Regular, rgba(255, 255, 255, 1.0))
    }

    fn narration_style() -> TextStyle {
        TextStyle::new(42.0, Weight::Regular, rgba(226, 232, 255, 0.8))
    }

    fn visual_cue_style() -> TextStyle {
        TextStyle::new(32.0, Weight::Regular, rgba(15, 15, 25, 0.26))
    }

    fn badge_style() -> TextStyle {
        TextStyle::new(48.0, Weight::Bold, rgba(255, 255, 255, 0.86))
    }

    /// Left edge of the `index+1/total` badge so it ends at the right margin
    pub fn badge_x(&self, badge: &str) -> f32 {
        self.width as f32 - self.face.measure(badge, &Self::badge_style()) - BADGE_RIGHT_MARGIN
    }

    /// Compose every layer of the slide for beat `index` of `total`
    pub fn compose(
        &self,
        segment: &Segment,
        index: usize,
        total: usize,
        headline: &str,
    ) -> Result<Canvas, SlideRenderError> {
        let mut canvas = Canvas::new(self.width, self.height)?;
        let face = self.face.as_ref();
        let (w, h) = (self.width, self.height);

        let (top, bottom) = gradient_stops(index, total);
        canvas.fill_vertical_gradient(top, bottom);

        canvas.fill_rect(0, 0, w, h, rgba(6, 10, 28, 0.45));
        canvas.fill_rect(
            PANEL_INSET,
            PANEL_INSET,
            w.saturating_sub(2 * PANEL_INSET as u32),
            h.saturating_sub(2 * PANEL_INSET as u32),
            rgba(255, 255, 255, 0.2),
        );
        canvas.fill_rect(
            DIVIDER_X,
            DIVIDER_Y,
            w.saturating_sub(2 * DIVIDER_X as u32),
            DIVIDER_HEIGHT,
            rgba(10, 10, 15, 0.08),
        );

        face.draw(&mut canvas, headline, TEXT_X, HEADLINE_Y, &Self::headline_style());

        let caption_bottom = wrap_text(
            &mut canvas,
            face,
            &segment.caption,
            TEXT_X,
            CAPTION_Y,
            CONTENT_WIDTH,
            CAPTION_LINE_HEIGHT,
            &Self::caption_style(),
        );
        wrap_text(
            &mut canvas,
            face,
            &segment.narration,
            TEXT_X,
            caption_bottom + NARRATION_GAP,
            CONTENT_WIDTH,
            NARRATION_LINE_HEIGHT,
            &Self::narration_style(),
        );

        face.draw(
            &mut canvas,
            &segment.visual_cue,
            TEXT_X,
            h as f32 - VISUAL_CUE_FROM_BOTTOM,
            &Self::visual_cue_style(),
        );

        let badge = format!("{}/{}", index + 1, total);
        let badge_x = self.badge_x(&badge);
        face.draw(&mut canvas, &badge, badge_x, HEADLINE_Y, &Self::badge_style());

        Ok(canvas)
    }

    /// Compose and PNG-encode a slide on the calling thread
    pub fn render_blocking(
        &self,
        segment: &Segment,
        index: usize,
        total: usize,
        headline: &str,
    ) -> Result<Vec<u8>, SlideRenderError> {
        let canvas = self.compose(segment, index, total, headline)?;
        let png = canvas.encode_png()?;
        debug!(
            "Rendered slide {}/{} ({} bytes, face {})",
            index + 1,
            total,
            png.len(),
            self.face.name()
        );
        Ok(png)
    }
}

#[async_trait]
impl SlidePort for SlideSynthesizer {
    async fn render(
        &self,
        segment: &Segment,
        index: usize,
        total: usize,
        headline: &str,
    ) -> Result<Vec<u8>, SlideRenderError> {
        let synthesizer = self.clone();
        let segment = segment.clone();
        let headline = headline.to_string();
        tokio::task::spawn_blocking(move || {
            synthesizer.render_blocking(&segment, index, total, &headline)
        })
        .await
        .map_err(|e| SlideRenderError::Surface {
            message: format!("slide worker stopped: {}", e),
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Segment {
        Segment {
            id: "hook".to_string(),
            label: "Hook".to_string(),
            caption: "Three habits that quietly double your output".to_string(),
            narration: "Most people work harder. The top one percent work in loops.".to_string(),
            visual_cue: "Split screen, timer overlay".to_string(),
            duration: 3.0,
        }
    }

    fn synthesizer() -> SlideSynthesizer {
        SlideSynthesizer::new(Arc::new(BlockFace))
    }

    #[test]
    fn test_gradient_hue_sweep_is_distinct_and_reproducible() {
        let first = gradient_stops(0, 5);
        let last = gradient_stops(4, 5);
        assert_ne!(first, last);
        assert_eq!(first, gradient_stops(0, 5));
        // hue 0 -> top at hsl(10, 82%, 60%)
        assert_eq!(first.0, hsl_to_rgb(10.0, 82.0, 60.0));
        // a single beat never divides by zero
        assert_eq!(gradient_stops(0, 1), first);
    }

    #[test]
    fn test_badge_stays_inside_right_margin() {
        let synth = synthesizer();
        for badge in ["1/5", "10/12", "120/120"] {
            let x = synth.badge_x(badge);
            let width = BlockFace.measure(badge, &SlideSynthesizer::badge_style());
            assert!((x + width - (VIDEO_WIDTH as f32 - BADGE_RIGHT_MARGIN)).abs() < 1e-3);
            assert!(x > TEXT_X);
        }
    }

    #[test]
    fn test_compose_produces_full_frame_opaque_slide() {
        let canvas = synthesizer().compose(&segment(), 1, 3, "Deep Work").unwrap();
        assert_eq!((canvas.width(), canvas.height()), (VIDEO_WIDTH, VIDEO_HEIGHT));
        assert_eq!(canvas.pixel(0, 0)[3], 255);
        assert_eq!(canvas.pixel(VIDEO_WIDTH - 1, VIDEO_HEIGHT - 1)[3], 255);
        // panel lightens the inset area relative to the bare scrim
        let outside = canvas.pixel(10, 1000);
        let inside = canvas.pixel(80, 1000);
        assert!(inside[0] > outside[0]);
    }

    #[test]
    fn test_caption_text_is_drawn_in_content_area() {
        let canvas = synthesizer().compose(&segment(), 0, 3, "Deep Work").unwrap();
        let blank = SlideSynthesizer::new(Arc::new(BlockFace))
            .compose(
                &Segment {
                    caption: String::new(),
                    ..segment()
                },
                0,
                3,
                "Deep Work",
            )
            .unwrap();
        // first caption glyph sits just right of the text origin, above the first baseline
        assert_ne!(canvas.pixel(125, 300), blank.pixel(125, 300));
    }

    #[test]
    fn test_render_blocking_emits_png() {
        let png = synthesizer().render_blocking(&segment(), 0, 1, "Title").unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_zero_sized_synthesizer_fails_with_surface_error() {
        let synth = SlideSynthesizer::with_size(Arc::new(BlockFace), 0, 0);
        let err = synth.render_blocking(&segment(), 0, 1, "Title").unwrap_err();
        assert!(matches!(err, SlideRenderError::Surface { .. }));
    }

    #[tokio::test]
    async fn test_async_render_matches_blocking_render() {
        let synth = SlideSynthesizer::with_size(Arc::new(BlockFace), 108, 192);
        let blocking = synth.render_blocking(&segment(), 0, 2, "Title").unwrap();
        let rendered = SlidePort::render(&synth, &segment(), 0, 2, "Title").await.unwrap();
        assert_eq!(blocking, rendered);
    }
}
