//! Text measurement and glyph drawing

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use image::Rgba;
use tracing::{info, warn};

use super::canvas::Canvas;
use super::SlideRenderError;

/// Font weight of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// Size, weight and color of a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Pixel size of the em square
    pub size: f32,
    pub weight: Weight,
    pub color: Rgba<u8>,
}

impl TextStyle {
    pub fn new(size: f32, weight: Weight, color: Rgba<u8>) -> Self {
        Self {
            size,
            weight,
            color,
        }
    }
}

/// Something that can measure and draw single lines of text
pub trait Typeface: Send + Sync {
    /// Advance width of `text` in pixels
    fn measure(&self, text: &str, style: &TextStyle) -> f32;

    /// Draw `text` with its baseline starting at (`x`, `baseline`)
    fn draw(&self, canvas: &mut Canvas, text: &str, x: f32, baseline: f32, style: &TextStyle);

    fn name(&self) -> &str;
}

/// Fixed-advance face drawing each visible character as a solid block.
///
/// Deterministic and asset-free; used when no font file is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFace;

impl BlockFace {
    fn advance(style: &TextStyle) -> f32 {
        match style.weight {
            Weight::Regular => style.size * 0.5,
            Weight::Bold => style.size * 0.56,
        }
    }
}

impl Typeface for BlockFace {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().count() as f32 * Self::advance(style)
    }

    fn draw(&self, canvas: &mut Canvas, text: &str, x: f32, baseline: f32, style: &TextStyle) {
        let advance = Self::advance(style);
        let glyph_height = (style.size * 0.7).round().max(1.0);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = x + i as f32 * advance + advance * 0.1;
            canvas.fill_rect(
                left.round() as i32,
                (baseline - glyph_height).round() as i32,
                (advance * 0.8).round().max(1.0) as u32,
                glyph_height as u32,
                style.color,
            );
        }
    }

    fn name(&self) -> &str {
        "block"
    }
}

/// TrueType/OpenType face rasterized with fontdue
pub struct FontFace {
    regular: Font,
    bold: Option<Font>,
    name: String,
}

impl FontFace {
    /// Load a regular font and an optional bold companion
    pub fn load(regular: &Path, bold: Option<&Path>) -> Result<Self, SlideRenderError> {
        let regular_font = Self::read_font(regular)?;
        let bold_font = match bold {
            Some(path) => Some(Self::read_font(path)?),
            None => None,
        };
        let name = regular
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "font".to_string());
        Ok(Self {
            regular: regular_font,
            bold: bold_font,
            name,
        })
    }

    fn read_font(path: &Path) -> Result<Font, SlideRenderError> {
        let bytes = fs::read(path).map_err(|e| SlideRenderError::Font {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Font::from_bytes(bytes, FontSettings::default()).map_err(|e| SlideRenderError::Font {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn font(&self, weight: Weight) -> &Font {
        match (weight, &self.bold) {
            (Weight::Bold, Some(bold)) => bold,
            _ => &self.regular,
        }
    }
}

impl Typeface for FontFace {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        let font = self.font(style.weight);
        let mut width = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            if let Some(prev) = previous {
                width += font.horizontal_kern(prev, ch, style.size).unwrap_or(0.0);
            }
            width += font.metrics(ch, style.size).advance_width;
            previous = Some(ch);
        }
        width
    }

    fn draw(&self, canvas: &mut Canvas, text: &str, x: f32, baseline: f32, style: &TextStyle) {
        let font = self.font(style.weight);
        let mut pen_x = x;
        let mut previous = None;
        for ch in text.chars() {
            if let Some(prev) = previous {
                pen_x += font.horizontal_kern(prev, ch, style.size).unwrap_or(0.0);
            }
            let (metrics, bitmap) = font.rasterize(ch, style.size);
            let left = (pen_x + metrics.xmin as f32).round() as i32;
            let top = (baseline - (metrics.ymin + metrics.height as i32) as f32).round() as i32;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = bitmap[row * metrics.width + col];
                    if coverage == 0 {
                        continue;
                    }
                    canvas.blend_pixel(
                        left + col as i32,
                        top + row as i32,
                        style.color,
                        coverage as f32 / 255.0,
                    );
                }
            }
            pen_x += metrics.advance_width;
            previous = Some(ch);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Well-known (regular, bold) font locations probed when none is configured
const SYSTEM_FONTS: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
    (
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    ),
    ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
];

/// Pick the typeface for slide text.
///
/// A configured font that fails to load is an error; with nothing configured the
/// first installed system font wins, and the block face is the last resort.
pub fn load_typeface(
    regular: Option<&Path>,
    bold: Option<&Path>,
) -> Result<Arc<dyn Typeface>, SlideRenderError> {
    if let Some(regular) = regular {
        let face = FontFace::load(regular, bold)?;
        info!("Using configured font {}", regular.display());
        return Ok(Arc::new(face));
    }

    for (regular, bold) in SYSTEM_FONTS {
        let regular = PathBuf::from(regular);
        if !regular.exists() {
            continue;
        }
        let bold = PathBuf::from(bold);
        let bold = bold.exists().then_some(bold);
        match FontFace::load(&regular, bold.as_deref()) {
            Ok(face) => {
                info!("Using system font {}", regular.display());
                return Ok(Arc::new(face));
            }
            Err(e) => warn!("Skipping unusable system font: {}", e),
        }
    }

    warn!("No font found; slide text will be drawn with block glyphs");
    Ok(Arc::new(BlockFace))
}
