use std::{fs, path::Path};

use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, Point, PxScale, ScaleFont};

use crate::{
    error::{Error, Result},
    glyph::TextMeasurer,
};

pub fn load_font(path: impl AsRef<Path>) -> Result<FontVec> {
    let path = path.as_ref();
    let font_file = fs::read(path)
        .map_err(|e| Error::Font(format!("unable to read font file {}: {e}", path.display())))?;

    font_from_bytes(font_file)
}

pub fn font_from_bytes(data: Vec<u8>) -> Result<FontVec> {
    FontVec::try_from_vec(data).map_err(|e| Error::Font(format!("font file may be invalid: {e}")))
}

/// Pixel scale at which the font's em square is `size` pixels tall.
pub fn em_scale(font: &FontVec, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

#[derive(Clone, Debug)]
pub struct GlyphData {
    pub glyphs: Vec<Glyph>,
    pub width: f32,
    pub height: f32,
}

//把文本转换为字形，方便测量与画图
pub fn text_to_glyphs(text: &str, font: &FontVec, scale: PxScale) -> GlyphData {
    let scaled_font = font.as_scaled(scale);

    let mut glyphs: Vec<Glyph> = vec![];
    layout_paragraph(&scaled_font, point(0.0, 0.0), text, &mut glyphs);

    let width = glyphs
        .iter()
        .map(|glyph| glyph.position.x + scaled_font.h_advance(glyph.id))
        .fold(0.0f32, f32::max);

    GlyphData {
        glyphs,
        width,
        height: scaled_font.height(),
    }
}

pub fn layout_paragraph<F, SF>(font: &SF, position: Point, text: &str, target: &mut Vec<Glyph>)
where
    F: Font,
    SF: ScaleFont<F>,
{
    let v_advance = font.height() + font.line_gap();
    let mut caret = position + point(0.0, font.ascent());
    let mut last_glyph: Option<GlyphId> = None;
    for c in text.chars() {
        if c.is_control() {
            if c == '\n' {
                //进行换行
                caret = point(position.x, caret.y + v_advance);
                last_glyph = None;
            }
            continue;
        }

        let mut glyph = font.scaled_glyph(c);
        if let Some(previous) = last_glyph.take() {
            caret.x += font.kern(previous, glyph.id);
        }
        glyph.position = caret;
        last_glyph = Some(glyph.id);
        caret.x += font.h_advance(glyph.id);

        target.push(glyph);
    }
}

/// Anti-aliased coverage of one unrotated line of text, values in `0.0..=1.0`.
#[derive(Clone, Debug)]
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    data: Vec<f32>,
}

impl Coverage {
    pub fn rasterize(glyph_data: &GlyphData, font: &FontVec) -> Self {
        let width = glyph_data.width.ceil().max(1.0) as u32;
        let height = glyph_data.height.ceil().max(1.0) as u32;
        let mut data = vec![0.0f32; (width * height) as usize];

        for glyph in &glyph_data.glyphs {
            if let Some(outlined) = font.outline_glyph(glyph.clone()) {
                let bounds = outlined.px_bounds();

                outlined.draw(|x, y, v| {
                    let px = bounds.min.x as i64 + x as i64;
                    let py = bounds.min.y as i64 + y as i64;
                    if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                        return;
                    }
                    let cell = &mut data[py as usize * width as usize + px as usize];
                    *cell = cell.max(v.clamp(0.0, 1.0));
                })
            }
        }

        Coverage {
            width,
            height,
            data,
        }
    }

    #[cfg(test)]
    pub(crate) fn filled(width: u32, height: u32) -> Self {
        Coverage {
            width,
            height,
            data: vec![1.0; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[(y * self.width + x) as usize]
    }

    /// Thickens strokes horizontally by `radius` pixels on each side.
    pub fn embolden(&mut self, radius: u32) {
        if radius == 0 {
            return;
        }

        let mut thick = self.data.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let lo = x.saturating_sub(radius);
                let hi = (x + radius).min(self.width - 1);
                let strongest = (lo..=hi).map(|sx| self.get(sx, y)).fold(0.0f32, f32::max);
                thick[(y * self.width + x) as usize] = strongest;
            }
        }
        self.data = thick;
    }

    /// Bilinear lookup at a continuous position, pixel centres at `n + 0.5`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let fx = x - 0.5;
        let fy = y - 0.5;
        if fx <= -1.0 || fy <= -1.0 || fx >= self.width as f32 || fy >= self.height as f32 {
            return 0.0;
        }

        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;

        let at = |cx: f32, cy: f32| -> f32 {
            if cx < 0.0 || cy < 0.0 {
                0.0
            } else {
                self.get(cx as u32, cy as u32)
            }
        };

        let top = at(x0, y0) * (1.0 - tx) + at(x0 + 1.0, y0) * tx;
        let bottom = at(x0, y0 + 1.0) * (1.0 - tx) + at(x0 + 1.0, y0 + 1.0) * tx;
        top * (1.0 - ty) + bottom * ty
    }
}

/// Measures text with real advances and kerning from a loaded font.
pub struct FontMeasurer<'a> {
    font: &'a FontVec,
}

impl<'a> FontMeasurer<'a> {
    pub fn new(font: &'a FontVec) -> Self {
        FontMeasurer { font }
    }
}

impl TextMeasurer for FontMeasurer<'_> {
    fn advance_width(&self, text: &str, font_size: f64) -> f64 {
        let scale = em_scale(self.font, font_size as f32);
        text_to_glyphs(text, self.font, scale).width as f64
    }

    fn line_height(&self, font_size: f64) -> f64 {
        let scale = em_scale(self.font, font_size as f32);
        self.font.as_scaled(scale).height() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_inside_and_outside() {
        let coverage = Coverage::filled(4, 4);
        assert_eq!(coverage.sample(2.0, 2.0), 1.0);
        assert_eq!(coverage.sample(-3.0, 2.0), 0.0);
        assert_eq!(coverage.sample(2.0, 10.0), 0.0);
        // Half way across the left edge blends with empty space.
        assert!((coverage.sample(0.0, 2.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn embolden_spreads_horizontally() {
        let mut coverage = Coverage {
            width: 5,
            height: 1,
            data: vec![0.0, 0.0, 1.0, 0.0, 0.0],
        };
        coverage.embolden(1);
        assert_eq!(coverage.data, vec![0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn missing_font_file_is_a_font_error() {
        let err = load_font("/nonexistent/font.ttf").unwrap_err();
        assert!(matches!(err, Error::Font(_)));
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        assert!(matches!(
            font_from_bytes(vec![0u8; 16]),
            Err(Error::Font(_))
        ));
    }
}
