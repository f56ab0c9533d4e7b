use ab_glyph::FontVec;
use image::{Pixel, Rgba, RgbaImage};

use crate::{
    config::LayoutConfig,
    error::Result,
    glyph::GlyphBox,
    svg::BOLD_FREQUENCY,
    text::{self, Coverage},
    theme,
};

/// Draws placed words onto a pixel surface with a loaded font.
pub struct RasterRenderer<'a> {
    font: &'a FontVec,
}

impl<'a> RasterRenderer<'a> {
    pub fn new(font: &'a FontVec) -> Self {
        RasterRenderer { font }
    }

    /// Renders at `width·scale × height·scale`; every coordinate is scaled
    /// once up front.
    pub fn render(&self, items: &[GlyphBox], config: &LayoutConfig) -> Result<RgbaImage> {
        let scale = config.scale.max(1);
        let mut buffer = surface(config)?;

        for item in items {
            let Some(stroke) = Stroke::new(item, scale) else {
                continue;
            };
            let color = theme::parse_color(&item.color)?;
            self.draw_word(&mut buffer, &item.text, &stroke, color);
        }

        Ok(buffer)
    }

    fn draw_word(&self, buffer: &mut RgbaImage, text: &str, stroke: &Stroke, color: Rgba<u8>) {
        let glyphs = text::text_to_glyphs(text, self.font, text::em_scale(self.font, stroke.size));
        let mut coverage = Coverage::rasterize(&glyphs, self.font);
        if let Some(radius) = stroke.bold {
            coverage.embolden(radius);
        }

        draw_coverage(buffer, &coverage, stroke.center, stroke.angle, color);
    }
}

/// Background-filled surface at `width·scale × height·scale`.
pub fn surface(config: &LayoutConfig) -> Result<RgbaImage> {
    let scale = config.scale.max(1);
    Ok(RgbaImage::from_pixel(
        config.width * scale,
        config.height * scale,
        config.background_rgba()?,
    ))
}

/// A placed word in surface pixels.
#[derive(Clone, Debug, PartialEq)]
struct Stroke {
    center: (f64, f64),
    size: f32,
    angle: f64,
    /// Dilation radius for synthetic bold.
    bold: Option<u32>,
}

impl Stroke {
    fn new(item: &GlyphBox, scale: u32) -> Option<Self> {
        let (cx, cy) = item.center()?;
        let factor = scale as f64;
        let size = (item.font_size * factor) as f32;

        Some(Stroke {
            center: (cx * factor, cy * factor),
            size,
            angle: item.angle,
            bold: (item.frequency > BOLD_FREQUENCY).then(|| (size / 24.0).round().max(1.0) as u32),
        })
    }
}

/// Composites `coverage` centred on `center`, rotated clockwise by `angle`
/// degrees. The rotation lives only in this call.
pub fn draw_coverage(
    buffer: &mut RgbaImage,
    coverage: &Coverage,
    center: (f64, f64),
    angle: f64,
    color: Rgba<u8>,
) {
    let (sin, cos) = (angle.to_radians() as f32).sin_cos();
    let (cx, cy) = (center.0 as f32, center.1 as f32);
    let half_w = coverage.width as f32 / 2.0;
    let half_h = coverage.height as f32 / 2.0;

    // Rotated bounds around the centre.
    let extent_x = (half_w * cos).abs() + (half_h * sin).abs();
    let extent_y = (half_w * sin).abs() + (half_h * cos).abs();

    let min_x = (cx - extent_x).floor().max(0.0) as u32;
    let min_y = (cy - extent_y).floor().max(0.0) as u32;
    let max_x = ((cx + extent_x).ceil().max(0.0) as u32).min(buffer.width());
    let max_y = ((cy + extent_y).ceil().max(0.0) as u32).min(buffer.height());

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;

            // Inverse rotation back into the unrotated text.
            let lx = dx * cos + dy * sin + half_w;
            let ly = -dx * sin + dy * cos + half_h;

            let v = coverage.sample(lx, ly);
            if v <= 0.0 {
                continue;
            }

            let px = buffer.get_pixel_mut(x, y);
            px.apply2(&color, |old, new| {
                ((v * new as f32) + (1.0 - v) * old as f32).round() as u8
            });
            px.0[3] = px.0[3].max((v * 255.0) as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Position;

    fn solid(width: u32, height: u32) -> Coverage {
        Coverage::filled(width, height)
    }

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn placed(frequency: u32, x: f64, y: f64) -> GlyphBox {
        GlyphBox {
            text: "word".to_string(),
            frequency,
            font_size: 48.0,
            color: "#FF0000".to_string(),
            angle: 45.0,
            width: 100.0,
            height: 40.0,
            position: Some(Position { x, y }),
        }
    }

    #[test]
    fn surface_is_scaled_and_filled() {
        let config = LayoutConfig {
            width: 300,
            height: 200,
            scale: 3,
            background_color: "#102030".to_string(),
            ..LayoutConfig::default()
        };

        let buffer = surface(&config).unwrap();
        assert_eq!(buffer.dimensions(), (900, 600));
        assert!(buffer.pixels().all(|px| *px == Rgba([0x10, 0x20, 0x30, 255])));
    }

    #[test]
    fn strokes_scale_once() {
        let stroke = Stroke::new(&placed(2, 10.0, 20.0), 2).unwrap();
        assert_eq!(stroke.center, (120.0, 80.0));
        assert_eq!(stroke.size, 96.0);
        assert_eq!(stroke.angle, 45.0);
        assert_eq!(stroke.bold, None);

        let unplaced = GlyphBox {
            position: None,
            ..placed(2, 0.0, 0.0)
        };
        assert!(Stroke::new(&unplaced, 2).is_none());
    }

    #[test]
    fn bold_starts_above_three_occurrences() {
        assert_eq!(Stroke::new(&placed(3, 0.0, 0.0), 1).unwrap().bold, None);
        assert_eq!(Stroke::new(&placed(4, 0.0, 0.0), 1).unwrap().bold, Some(2));
        assert_eq!(Stroke::new(&placed(4, 0.0, 0.0), 2).unwrap().bold, Some(4));
    }

    #[test]
    fn draws_centered_block() {
        let mut buffer = RgbaImage::from_pixel(40, 40, WHITE);
        draw_coverage(&mut buffer, &solid(10, 4), (20.0, 20.0), 0.0, RED);

        assert_eq!(*buffer.get_pixel(20, 20), RED);
        assert_eq!(*buffer.get_pixel(16, 19), RED);
        assert_eq!(*buffer.get_pixel(20, 25), WHITE);
        assert_eq!(*buffer.get_pixel(2, 2), WHITE);
    }

    #[test]
    fn quarter_turn_stands_the_block_up() {
        let mut buffer = RgbaImage::from_pixel(40, 40, WHITE);
        draw_coverage(&mut buffer, &solid(10, 4), (20.0, 20.0), 90.0, RED);

        // Now 4 wide and 10 tall.
        assert_eq!(*buffer.get_pixel(20, 16), RED);
        assert_eq!(*buffer.get_pixel(20, 23), RED);
        assert_eq!(*buffer.get_pixel(24, 20), WHITE);
        assert_eq!(*buffer.get_pixel(15, 20), WHITE);
    }

    #[test]
    fn drawing_is_clipped_to_the_surface() {
        let mut buffer = RgbaImage::from_pixel(10, 10, WHITE);
        draw_coverage(&mut buffer, &solid(30, 6), (2.0, 2.0), 30.0, RED);
        draw_coverage(&mut buffer, &solid(30, 6), (-50.0, -50.0), 0.0, RED);
        assert_eq!(*buffer.get_pixel(2, 2), RED);
    }
}
