//! Word clouds from plain text.
//!
//! Text is tokenized, counted, turned into sized and rotated glyph boxes,
//! packed onto a fixed canvas without overlap and rendered as SVG or as a
//! PNG/JPEG/WebP image.

use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use nanorand::WyRand;
use tracing::{debug, info, warn};

pub use config::{LayoutConfig, LayoutOverrides, OutputFormat, RasterFormat, Shape};
pub use encode::{ImageCodec, RasterEncoder};
pub use error::{Error, Result};
pub use frequency::{analyze, RankedWord};
pub use glyph::{GlyphBox, HeuristicMeasurer, Position, TextMeasurer};
pub use layout::{pack, PackOutcome};
pub use theme::Theme;
pub use tokenizer::Tokenizer;

pub mod config;
pub mod encode;
pub mod error;
pub mod frequency;
pub mod glyph;
pub mod layout;
pub mod output;
pub mod raster;
pub mod svg;
pub mod text;
pub mod theme;
mod tokenizer;

/// A rendered word cloud, ready to be written out.
#[derive(Clone, Debug, PartialEq)]
pub enum Artifact {
    Svg(String),
    Raster { format: RasterFormat, bytes: Vec<u8> },
}

impl Artifact {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Artifact::Svg(svg) => svg.as_bytes(),
            Artifact::Raster { bytes, .. } => bytes,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Artifact::Svg(_) => OutputFormat::Svg.extension(),
            Artifact::Raster { format, .. } => format.extension(),
        }
    }

    /// Writes the artifact next to `path`, picking a free name on collision.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        output::save(self.bytes(), path.as_ref())
    }
}

/// Output of one generation call.
#[derive(Clone, Debug)]
pub struct Generation {
    pub layout: PackOutcome,
    pub artifact: Artifact,
}

impl Generation {
    pub fn placed_count(&self) -> usize {
        self.layout.placed.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.layout.dropped.len()
    }
}

/// The whole pipeline behind one configuration.
///
/// Holds no per-call state: every call builds its own boxes, occupied
/// regions and random source, so one `WordCloud` can serve many callers.
pub struct WordCloud {
    tokenizer: Tokenizer,
    config: LayoutConfig,
    font: Option<FontVec>,
    encoder: Box<dyn RasterEncoder + Send + Sync>,
    rng_seed: Option<u64>,
}

impl Default for WordCloud {
    fn default() -> Self {
        WordCloud {
            tokenizer: Tokenizer::default(),
            config: LayoutConfig::default(),
            font: None,
            encoder: Box::new(ImageCodec),
            rng_seed: None,
        }
    }
}

impl WordCloud {
    pub fn with_tokenizer(mut self, value: Tokenizer) -> Self {
        self.tokenizer = value;
        self
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Uses `font` for measuring and for raster output.
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_font_from_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let font = text::load_font(path)?;
        Ok(self.with_font(font))
    }

    pub fn with_encoder(mut self, encoder: impl RasterEncoder + Send + Sync + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Fixes the random angle choices; unseeded runs differ every time.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn generate_from_text(&self, text: &str) -> Result<Generation> {
        let tokens = self.tokenizer.tokenize(text);
        self.generate_from_tokens(&tokens)
    }

    pub fn generate_from_tokens<I, S>(&self, tokens: I) -> Result<Generation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let layout = self.layout_tokens(tokens)?;
        let artifact = self.render(&layout.placed)?;

        info!(
            placed = layout.placed.len(),
            dropped = layout.dropped.len(),
            format = %self.config.format,
            "word cloud generated"
        );

        Ok(Generation { layout, artifact })
    }

    /// Runs analysis, preparation and packing without rendering.
    pub fn layout_tokens<I, S>(&self, tokens: I) -> Result<PackOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ranked = analyze(tokens, self.config.max_words);
        if ranked.is_empty() {
            return Err(Error::EmptyInput);
        }
        debug!(words = ranked.len(), "frequency analysis finished");

        let mut rng = match self.rng_seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        let boxes = match &self.font {
            Some(font) => glyph::prepare(&ranked, &self.config, &text::FontMeasurer::new(font), &mut rng),
            None => glyph::prepare(&ranked, &self.config, &HeuristicMeasurer, &mut rng),
        };

        let total = boxes.len();
        let outcome = pack(boxes, &self.config);
        if outcome.dropped.len() * 2 > total {
            warn!(
                placed = outcome.placed.len(),
                total,
                "most words did not fit on the canvas"
            );
        }

        Ok(outcome)
    }

    pub fn render(&self, placed: &[GlyphBox]) -> Result<Artifact> {
        match self.config.format {
            OutputFormat::Svg => Ok(Artifact::Svg(svg::render_svg(placed, &self.config))),
            OutputFormat::Raster(format) => {
                let font = self.font.as_ref().ok_or_else(|| {
                    Error::Font(format!("{} output needs a font, none was loaded", format.extension()))
                })?;

                let surface = raster::RasterRenderer::new(font).render(placed, &self.config)?;
                let bytes = self.encoder.encode(&surface, format, self.config.quality)?;
                Ok(Artifact::Raster { format, bytes })
            }
        }
    }
}
