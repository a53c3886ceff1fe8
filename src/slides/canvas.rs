//! RGBA drawing surface with source-over blending and PNG export

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use super::SlideRenderError;

/// Build a color from CSS-style `rgba()` components
pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Rgba<u8> {
    Rgba([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
}

/// Convert CSS `hsl()` (hue in degrees, saturation and lightness in percent) to RGB
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let h = hue.rem_euclid(360.0) / 360.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

/// Raster surface a slide is composed on
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Acquire a transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self, SlideRenderError> {
        if width == 0 || height == 0 {
            return Err(SlideRenderError::Surface {
                message: format!("cannot allocate a {}x{} surface", width, height),
            });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Opaque top-to-bottom linear gradient over the whole surface
    pub fn fill_vertical_gradient(&mut self, top: [u8; 3], bottom: [u8; 3]) {
        let height = self.image.height();
        let span = height.saturating_sub(1).max(1) as f32;
        for y in 0..height {
            let t = y as f32 / span;
            let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
            let color = Rgba([
                mix(top[0], bottom[0]),
                mix(top[1], bottom[1]),
                mix(top[2], bottom[2]),
                255,
            ]);
            for x in 0..self.image.width() {
                self.image.put_pixel(x, y, color);
            }
        }
    }

    /// Blend a rectangle over the surface; parts outside the surface are clipped
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x as i64 + width as i64).clamp(0, self.image.width() as i64) as u32;
        let y1 = (y as i64 + height as i64).clamp(0, self.image.height() as i64) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px as i32, py as i32, color, 1.0);
            }
        }
    }

    /// Source-over blend of `color` scaled by `coverage` (0..=1)
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.image.width() || y as u32 >= self.image.height() {
            return;
        }
        let src_a = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for c in 0..3 {
            let blended = (color[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Lossless PNG encoding of the surface
    pub fn encode_png(&self) -> Result<Vec<u8>, SlideRenderError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| SlideRenderError::Encode {
                message: e.to_string(),
            })?;
        if bytes.is_empty() {
            return Err(SlideRenderError::Encode {
                message: "PNG encoder produced no data".to_string(),
            });
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(360.0, 100.0, 50.0), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(90.0, 0.0, 50.0), [128, 128, 128]);
    }

    #[test]
    fn test_zero_sized_surface_is_rejected() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(SlideRenderError::Surface { .. })
        ));
    }

    #[test]
    fn test_gradient_endpoints() {
        let mut canvas = Canvas::new(2, 11).unwrap();
        canvas.fill_vertical_gradient([200, 0, 0], [0, 0, 100]);
        assert_eq!(canvas.pixel(0, 0), Rgba([200, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 10), Rgba([0, 0, 100, 255]));
        assert_eq!(canvas.pixel(0, 5), Rgba([100, 0, 50, 255]));
    }

    #[test]
    fn test_translucent_rect_blends_over_opaque_background() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.fill_vertical_gradient([0, 0, 0], [0, 0, 0]);
        canvas.fill_rect(1, 1, 2, 2, rgba(255, 255, 255, 0.5));

        assert_eq!(canvas.pixel(0, 0), Rgba([0, 0, 0, 255]));
        let inside = canvas.pixel(1, 1);
        assert!((127..=129).contains(&inside[0]));
        assert_eq!(inside[3], 255);
    }

    #[test]
    fn test_fill_rect_clips_to_surface() {
        let mut canvas = Canvas::new(3, 3).unwrap();
        canvas.fill_rect(-5, -5, 100, 100, rgba(10, 20, 30, 1.0));
        assert_eq!(canvas.pixel(2, 2), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_png_export_has_signature() {
        let canvas = Canvas::new(8, 8).unwrap();
        let png = canvas.encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
