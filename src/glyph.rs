use nanorand::{Rng, WyRand};

use crate::{
    config::{FontSizeRange, LayoutConfig},
    frequency::RankedWord,
};

/// Share of the font range the largest word may use.
pub const MAX_FONT_RANGE_SHARE: f64 = 0.8;
/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// Advance of a Basic Latin character as a multiple of the font size.
pub const NARROW_ADVANCE: f64 = 0.6;
/// Advance of any other character (CJK and friends).
pub const WIDE_ADVANCE: f64 = 1.0;

/// Ranks below this are always horizontal and use the leading colors.
pub const HEADLINE_RANKS: usize = 5;
/// Ranks below this (or words above half the top count) form the middle tier.
pub const SECONDARY_RANKS: usize = 15;
/// Middle-tier words stay within this many degrees of horizontal.
pub const SECONDARY_MAX_ANGLE: f64 = 30.0;

const SECONDARY_PALETTE: usize = 10;
const SECONDARY_FREQUENCY_RATIO: f64 = 0.5;

/// Top-left corner of a placed box, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One word sized, colored and rotated, with the bounds of its rotated text.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphBox {
    pub text: String,
    pub frequency: u32,
    pub font_size: f64,
    pub color: String,
    /// Rotation in degrees, clockwise on screen.
    pub angle: f64,
    pub width: f64,
    pub height: f64,
    /// `None` until the packer finds room for the word.
    pub position: Option<Position>,
}

impl GlyphBox {
    pub fn center(&self) -> Option<(f64, f64)> {
        self.position
            .map(|p| (p.x + self.width / 2.0, p.y + self.height / 2.0))
    }
}

/// Width and line height of unrotated text.
pub trait TextMeasurer {
    fn advance_width(&self, text: &str, font_size: f64) -> f64;

    fn line_height(&self, font_size: f64) -> f64 {
        font_size * LINE_HEIGHT_FACTOR
    }
}

/// Font-free estimate: narrow Latin, full-width everything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn advance_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars()
            .map(|c| {
                if c.is_ascii() {
                    NARROW_ADVANCE * font_size
                } else {
                    WIDE_ADVANCE * font_size
                }
            })
            .sum()
    }
}

/// Turns ranked words into unplaced glyph boxes.
///
/// Angles for lower-ranked words are drawn from `rng`; everything else is a
/// pure function of rank and frequency.
pub fn prepare(
    ranked: &[RankedWord],
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
    rng: &mut WyRand,
) -> Vec<GlyphBox> {
    let (Some(max_freq), Some(min_freq)) = (
        ranked.iter().map(|r| r.frequency).max(),
        ranked.iter().map(|r| r.frequency).min(),
    ) else {
        return vec![];
    };

    let palette = config.theme.colors();
    let grid = config.angle_grid();
    let secondary_grid: Vec<f64> = grid
        .iter()
        .copied()
        .filter(|a| a.abs() <= SECONDARY_MAX_ANGLE)
        .collect();

    ranked
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            let font_size = font_size(entry.frequency, min_freq, max_freq, config.font_size);
            let tier = Tier::of(rank, entry.frequency, max_freq);

            let angle = match tier {
                Tier::Headline => 0.0,
                Tier::Secondary => pick(&secondary_grid, rng),
                Tier::Rest => pick(&grid, rng),
            };
            let (width, height) = estimate_box(&entry.word, font_size, angle, measurer);

            GlyphBox {
                text: entry.word.clone(),
                frequency: entry.frequency,
                font_size,
                color: pick_color(palette, rank, tier),
                angle,
                width,
                height,
                position: None,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Headline,
    Secondary,
    Rest,
}

impl Tier {
    fn of(rank: usize, frequency: u32, max_freq: u32) -> Self {
        if rank < HEADLINE_RANKS {
            Tier::Headline
        } else if rank < SECONDARY_RANKS
            || frequency as f64 / max_freq as f64 > SECONDARY_FREQUENCY_RATIO
        {
            Tier::Secondary
        } else {
            Tier::Rest
        }
    }
}

/// Square-root scaled font size, capped so no word takes the whole range.
pub fn font_size(frequency: u32, min_freq: u32, max_freq: u32, range: FontSizeRange) -> f64 {
    let span = range.max - range.min;
    let size = if max_freq == min_freq {
        range.min + span / 2.0
    } else {
        let t = (frequency.saturating_sub(min_freq)) as f64 / (max_freq - min_freq) as f64;
        range.min + t.clamp(0.0, 1.0).sqrt() * span
    };

    size.min(range.min + MAX_FONT_RANGE_SHARE * span)
        .max(range.min)
}

fn pick_color(palette: &[String], rank: usize, tier: Tier) -> String {
    if palette.is_empty() {
        return "#000000".to_string();
    }

    let bucket = match tier {
        Tier::Headline => HEADLINE_RANKS,
        Tier::Secondary => SECONDARY_PALETTE,
        Tier::Rest => palette.len(),
    }
    .min(palette.len());

    palette[rank % bucket].clone()
}

fn pick(angles: &[f64], rng: &mut WyRand) -> f64 {
    match angles.len() {
        0 => 0.0,
        1 => angles[0],
        n => angles[rng.generate_range(0..n)],
    }
}

/// Axis-aligned bounds of `text` rotated by `angle` degrees.
pub fn estimate_box(
    text: &str,
    font_size: f64,
    angle: f64,
    measurer: &dyn TextMeasurer,
) -> (f64, f64) {
    let width = measurer.advance_width(text, font_size);
    let height = measurer.line_height(font_size);

    if angle == 0.0 {
        return (width, height);
    }

    let (sin, cos) = angle.abs().to_radians().sin_cos();
    (
        (width * cos).abs() + (height * sin).abs(),
        (width * sin).abs() + (height * cos).abs(),
    )
}
