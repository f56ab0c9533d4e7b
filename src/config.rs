use std::{fmt, str::FromStr, sync::OnceLock};

use image::Rgba;
use regex::Regex;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    theme::{self, Theme},
};

pub const CANVAS_LIMITS: (u32, u32) = (100, 5000);
pub const FONT_SIZE_LIMITS: (f64, f64) = (8.0, 200.0);
pub const QUALITY_LIMITS: (u8, u8) = (1, 100);
pub const MAX_WORDS_LIMITS: (usize, usize) = (1, 1000);
pub const SCALE_LIMITS: (u32, u32) = (1, 4);
/// Finest angle grid; keeps the grid at a few thousand entries at most.
pub const MIN_ANGLE_STEP: f64 = 0.1;
/// Longest side of a raster surface after supersampling.
pub const MAX_SURFACE_SIDE: u32 = 8192;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct FontSizeRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
}

/// Requested outline of the cloud. Recorded with the layout but the radial
/// packer does not use it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Rectangle,
    Circle,
    Ellipse,
}

impl FromStr for Shape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rectangle" => Ok(Shape::Rectangle),
            "circle" => Ok(Shape::Circle),
            "ellipse" => Ok(Shape::Ellipse),
            _ => Err(Error::InvalidConfig(format!(
                "unknown shape '{s}', expected rectangle, circle or ellipse"
            ))),
        }
    }
}

/// Raster formats handed to the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    WebP,
}

impl RasterFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
            RasterFormat::WebP => "webp",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Raster(RasterFormat),
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Raster(format) => format.extension(),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Raster(RasterFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Raster(RasterFormat::Png)),
            "jpg" | "jpeg" => Ok(OutputFormat::Raster(RasterFormat::Jpeg)),
            "webp" => Ok(OutputFormat::Raster(RasterFormat::WebP)),
            _ => Err(Error::InvalidConfig(format!(
                "unknown format '{s}', expected svg, png, jpg, jpeg or webp"
            ))),
        }
    }
}

/// Validated settings for one generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub font_size: FontSizeRange,
    pub angle_range: AngleRange,
    pub angle_step: f64,
    pub word_gap: f64,
    pub theme: Theme,
    pub shape: Shape,
    pub background_color: String,
    pub format: OutputFormat,
    pub quality: u8,
    pub max_words: usize,
    /// Integer supersampling factor of the raster surface.
    pub scale: u32,
    pub font_family: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            width: 800,
            height: 600,
            font_size: FontSizeRange { min: 12.0, max: 80.0 },
            angle_range: AngleRange { min: -90.0, max: 90.0 },
            angle_step: 45.0,
            word_gap: 4.0,
            theme: Theme::Default,
            shape: Shape::Rectangle,
            background_color: "#FFFFFF".to_string(),
            format: OutputFormat::default(),
            quality: 90,
            max_words: 100,
            scale: 1,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Merges `overrides` over the defaults and validates the result.
    pub fn from_overrides(overrides: &LayoutOverrides) -> Result<Self> {
        let mut config = LayoutConfig::default();
        overrides.apply(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: LayoutOverrides = serde_json::from_str(json)?;
        Self::from_overrides(&overrides)
    }

    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = CANVAS_LIMITS;
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(lo..=hi).contains(&value) {
                return Err(invalid(format!("{name} {value} outside [{lo}, {hi}]")));
            }
        }

        let (lo, hi) = FONT_SIZE_LIMITS;
        let FontSizeRange { min, max } = self.font_size;
        if !(lo..=hi).contains(&min) || !(lo..=hi).contains(&max) {
            return Err(invalid(format!(
                "fontSize {min}..{max} outside [{lo}, {hi}]"
            )));
        }
        if min >= max {
            return Err(invalid(format!("fontSize.min {min} must be below fontSize.max {max}")));
        }

        let AngleRange { min, max } = self.angle_range;
        if !(-180.0..=180.0).contains(&min) || !(-180.0..=180.0).contains(&max) || min > max {
            return Err(invalid(format!("angleRange {min}..{max} is not an ordered range within [-180, 180]")));
        }
        if self.angle_step.is_nan() || self.angle_step < MIN_ANGLE_STEP {
            return Err(invalid(format!(
                "angleStep {} must be at least {MIN_ANGLE_STEP}",
                self.angle_step
            )));
        }

        if !(0.0..=100.0).contains(&self.word_gap) {
            return Err(invalid(format!("wordGap {} outside [0, 100]", self.word_gap)));
        }

        let (lo, hi) = QUALITY_LIMITS;
        if !(lo..=hi).contains(&self.quality) {
            return Err(invalid(format!("quality {} outside [{lo}, {hi}]", self.quality)));
        }

        let (lo, hi) = MAX_WORDS_LIMITS;
        if !(lo..=hi).contains(&self.max_words) {
            return Err(invalid(format!("maxWords {} outside [{lo}, {hi}]", self.max_words)));
        }

        let (lo, hi) = SCALE_LIMITS;
        if !(lo..=hi).contains(&self.scale) {
            return Err(invalid(format!("scale {} outside [{lo}, {hi}]", self.scale)));
        }
        if let OutputFormat::Raster(_) = self.format {
            let side = self.width.max(self.height) * self.scale;
            if side > MAX_SURFACE_SIDE {
                return Err(invalid(format!(
                    "scale {} makes a {side}px raster side, above {MAX_SURFACE_SIDE}",
                    self.scale
                )));
            }
        }

        if !hex_color_regex().is_match(&self.background_color) {
            return Err(invalid(format!(
                "backgroundColor '{}' is not a #RRGGBB color",
                self.background_color
            )));
        }

        Ok(())
    }

    pub fn background_rgba(&self) -> Result<Rgba<u8>> {
        theme::parse_color(&self.background_color)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Every angle on the `angle_range` grid, ascending.
    pub fn angle_grid(&self) -> Vec<f64> {
        let AngleRange { min, max } = self.angle_range;
        if self.angle_step.is_nan() || self.angle_step < MIN_ANGLE_STEP || max < min {
            return vec![min];
        }

        let steps = ((max - min) / self.angle_step + 1e-9).floor() as usize;
        (0..=steps).map(|k| min + k as f64 * self.angle_step).collect()
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig(message)
}

fn hex_color_regex() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new("^#[0-9A-Fa-f]{6}$").expect("Unable to compile color regex"))
}

/// Caller-supplied partial configuration, in the JSON shape callers send.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayoutOverrides {
    pub theme: Option<String>,
    pub shape: Option<String>,
    pub word_gap: Option<f64>,
    pub font_size: Option<FontSizeRange>,
    pub angle_range: Option<AngleRange>,
    pub angle_step: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub background_color: Option<String>,
    pub format: Option<String>,
    pub quality: Option<u8>,
    pub max_words: Option<usize>,
    pub scale: Option<u32>,
    pub font_family: Option<String>,
}

impl LayoutOverrides {
    pub fn apply(&self, config: &mut LayoutConfig) -> Result<()> {
        if let Some(theme) = &self.theme {
            config.theme = theme.parse()?;
        }
        if let Some(shape) = &self.shape {
            config.shape = shape.parse()?;
        }
        if let Some(format) = &self.format {
            config.format = format.parse()?;
        }
        if let Some(color) = &self.background_color {
            config.background_color = color.clone();
        }
        if let Some(family) = &self.font_family {
            config.font_family = family.clone();
        }

        config.word_gap = self.word_gap.unwrap_or(config.word_gap);
        config.font_size = self.font_size.unwrap_or(config.font_size);
        config.angle_range = self.angle_range.unwrap_or(config.angle_range);
        config.angle_step = self.angle_step.unwrap_or(config.angle_step);
        config.width = self.width.unwrap_or(config.width);
        config.height = self.height.unwrap_or(config.height);
        config.quality = self.quality.unwrap_or(config.quality);
        config.max_words = self.max_words.unwrap_or(config.max_words);
        config.scale = self.scale.unwrap_or(config.scale);

        Ok(())
    }
}
