use std::io::Cursor;

use image::{
    codecs::{
        jpeg::JpegEncoder,
        png::PngEncoder,
        webp::{WebPEncoder, WebPQuality},
    },
    ColorType, DynamicImage, ImageEncoder, RgbaImage,
};

use crate::{config::RasterFormat, error::Result};

/// Turns an uncompressed surface into file bytes.
pub trait RasterEncoder {
    /// `quality` is in `1..=100`; lossless formats ignore it.
    fn encode(&self, image: &RgbaImage, format: RasterFormat, quality: u8) -> Result<Vec<u8>>;
}

/// Encoder backed by the `image` codecs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec;

impl RasterEncoder for ImageCodec {
    fn encode(&self, image: &RgbaImage, format: RasterFormat, quality: u8) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        let quality = quality.clamp(1, 100);
        let mut buf = Cursor::new(Vec::new());

        match format {
            RasterFormat::Png => {
                PngEncoder::new(&mut buf).write_image(image.as_raw(), width, height, ColorType::Rgba8)?;
            }
            RasterFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut buf, quality).encode(
                    rgb.as_raw(),
                    width,
                    height,
                    ColorType::Rgb8,
                )?;
            }
            RasterFormat::WebP => {
                WebPEncoder::new_with_quality(&mut buf, WebPQuality::lossy(quality)).encode(
                    image.as_raw(),
                    width,
                    height,
                    ColorType::Rgba8,
                )?;
            }
        }

        Ok(buf.into_inner())
    }
}
