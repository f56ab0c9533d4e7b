use std::{collections::HashMap, fmt, str::FromStr, sync::OnceLock};

use image::Rgba;
use palette::{Hsl, IntoColor, Pixel, Srgb};

use crate::error::{Error, Result};

/// Named color themes. Each resolves to a fixed, ordered palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    #[default]
    Default,
    Ocean,
    Sunset,
    Forest,
    Berry,
    Monochrome,
    Spectrum,
}

impl Theme {
    pub const ALL: [Theme; 7] = [
        Theme::Default,
        Theme::Ocean,
        Theme::Sunset,
        Theme::Forest,
        Theme::Berry,
        Theme::Monochrome,
        Theme::Spectrum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Ocean => "ocean",
            Theme::Sunset => "sunset",
            Theme::Forest => "forest",
            Theme::Berry => "berry",
            Theme::Monochrome => "monochrome",
            Theme::Spectrum => "spectrum",
        }
    }

    /// The theme's palette, most prominent colors first.
    pub fn colors(&self) -> &'static [String] {
        palette_table()
            .get(self)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Theme::ALL.iter().map(Theme::name).collect();
                Error::InvalidConfig(format!(
                    "unknown theme '{s}', expected one of {}",
                    known.join(", ")
                ))
            })
    }
}

const DEFAULT: [&str; 12] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf", "#393b79", "#637939",
];
const OCEAN: [&str; 12] = [
    "#03045e", "#023e8a", "#0077b6", "#0096c7", "#00b4d8", "#264653", "#287271", "#2a9d8f",
    "#48cae4", "#8ab17d", "#90e0ef", "#e9c46a",
];
const SUNSET: [&str; 12] = [
    "#9d0208", "#d00000", "#dc2f02", "#e85d04", "#f48c06", "#f94144", "#f3722c", "#f8961e",
    "#f9844a", "#faa307", "#f9c74f", "#ffba08",
];
const FOREST: [&str; 12] = [
    "#081c15", "#1b4332", "#2d6a4f", "#40916c", "#52b788", "#386641", "#6a994e", "#74c69d",
    "#a7c957", "#95d5b2", "#606c38", "#283618",
];
const BERRY: [&str; 12] = [
    "#3c096c", "#5a189a", "#7b2cbf", "#9d4edd", "#c77dff", "#7209b7", "#b5179e", "#f72585",
    "#e0aaff", "#ff6d00", "#480ca8", "#560bad",
];
const MONOCHROME: [&str; 12] = [
    "#0b090a", "#161a1d", "#212529", "#343a40", "#495057", "#6c757d", "#5c677d", "#7d8597",
    "#979dac", "#adb5bd", "#33415c", "#ced4da",
];

const SPECTRUM_SIZE: usize = 12;

fn palette_table() -> &'static HashMap<Theme, Vec<String>> {
    static TABLE: OnceLock<HashMap<Theme, Vec<String>>> = OnceLock::new();

    TABLE.get_or_init(|| {
        let fixed = |colors: &[&str]| colors.iter().map(|c| c.to_string()).collect::<Vec<_>>();

        HashMap::from([
            (Theme::Default, fixed(&DEFAULT)),
            (Theme::Ocean, fixed(&OCEAN)),
            (Theme::Sunset, fixed(&SUNSET)),
            (Theme::Forest, fixed(&FOREST)),
            (Theme::Berry, fixed(&BERRY)),
            (Theme::Monochrome, fixed(&MONOCHROME)),
            (Theme::Spectrum, spectrum()),
        ])
    })
}

/// Evenly spaced hues; the golden-angle stride keeps neighbouring ranks apart.
fn spectrum() -> Vec<String> {
    (0..SPECTRUM_SIZE)
        .map(|i| {
            let hue = (i as f32 * 137.5) % 360.0;
            let col = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = col.into_color();

            let raw: [u8; 3] = rgb.into_format().into_raw();
            format!("#{:02x}{:02x}{:02x}", raw[0], raw[1], raw[2])
        })
        .collect()
}

/// Parses a CSS hex color into an opaque pixel.
pub fn parse_color(hex: &str) -> Result<Rgba<u8>> {
    let color = csscolorparser::parse(hex)
        .map_err(|e| Error::InvalidConfig(format!("invalid color '{hex}': {e}")))?;

    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Ok(Rgba([
        channel(color.r),
        channel(color.g),
        channel(color.b),
        channel(color.a),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_theme_has_a_full_palette() {
        for theme in Theme::ALL {
            let colors = theme.colors();
            assert!(colors.len() >= 10, "{theme} has {} colors", colors.len());
            for color in colors {
                assert!(parse_color(color).is_ok(), "{theme}: {color}");
            }
        }
    }

    #[test]
    fn theme_names_round_trip() {
        for theme in Theme::ALL {
            assert_eq!(theme.name().parse::<Theme>().unwrap(), theme);
        }
        assert_eq!("OCEAN".parse::<Theme>().unwrap(), Theme::Ocean);
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let err = "neon".parse::<Theme>().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("neon"));
    }

    #[test]
    fn spectrum_is_stable() {
        assert_eq!(Theme::Spectrum.colors(), Theme::Spectrum.colors());
        assert_eq!(Theme::Spectrum.colors().len(), SPECTRUM_SIZE);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#FF8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert!(parse_color("not a color").is_err());
    }
}
