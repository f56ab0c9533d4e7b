use std::f64::consts::TAU;

use tracing::debug;

use crate::{
    config::LayoutConfig,
    glyph::{GlyphBox, Position},
};

/// Radius of the first ring, as a multiple of the word's font size.
const START_RADIUS_FACTOR: f64 = 0.5;
/// Distance between consecutive rings.
const RADIUS_STEP: f64 = 4.0;
/// Fewest candidates sampled on any ring.
const MIN_RING_SAMPLES: usize = 16;
/// Arc length between neighbouring candidates on large rings.
const SAMPLE_SPACING: f64 = 10.0;
/// Per-angle radius wobble that breaks up circular banding.
const ELLIPSE_DISTORTION: f64 = 0.1;
/// Padding per side as a share of the font size, on top of half the word gap.
const GAP_FONT_RATIO: f64 = 0.05;

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn inflate(&self, by: f64) -> Rect {
        Rect {
            x: self.x - by,
            y: self.y - by,
            width: self.width + 2.0 * by,
            height: self.height + 2.0 * by,
        }
    }

    /// Separating-axis test; rectangles that touch count as overlapping.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() < other.x
            || other.right() < self.x
            || self.bottom() < other.y
            || other.bottom() < self.y)
    }
}

/// Result of one packing run. Words that found no room are kept in `dropped`
/// so callers can report them.
#[derive(Clone, Debug, Default)]
pub struct PackOutcome {
    pub placed: Vec<GlyphBox>,
    pub dropped: Vec<GlyphBox>,
}

/// Padding added on every side of a word before collision tests.
pub fn gap_padding(font_size: f64, word_gap: f64) -> f64 {
    word_gap / 2.0 + font_size * GAP_FONT_RATIO
}

/// The padded rectangle a placed word reserves.
pub fn occupied_region(item: &GlyphBox, word_gap: f64) -> Option<Rect> {
    let position = item.position?;
    let rect = Rect {
        x: position.x,
        y: position.y,
        width: item.width,
        height: item.height,
    };
    Some(rect.inflate(gap_padding(item.font_size, word_gap)))
}

/// Places words largest first, centre outwards, without overlap.
pub fn pack(mut items: Vec<GlyphBox>, config: &LayoutConfig) -> PackOutcome {
    items.sort_by(|a, b| b.font_size.total_cmp(&a.font_size));

    let mut packer = Packer::new(config);
    let mut outcome = PackOutcome::default();

    for mut item in items {
        let found = packer
            .occupied
            .is_empty()
            .then(|| packer.centered(&item))
            .flatten()
            .or_else(|| packer.search(&item));

        match found {
            Some(position) => {
                item.position = Some(packer.clamp(&item, position));
                packer.occupy(&item);
                outcome.placed.push(item);
            }
            None => {
                debug!(word = %item.text, font_size = item.font_size, "no room for word");
                outcome.dropped.push(item);
            }
        }
    }

    debug!(
        placed = outcome.placed.len(),
        dropped = outcome.dropped.len(),
        "packing finished"
    );

    outcome
}

struct Packer {
    width: f64,
    height: f64,
    margin: f64,
    word_gap: f64,
    max_radius: f64,
    occupied: Vec<Rect>,
}

impl Packer {
    fn new(config: &LayoutConfig) -> Self {
        let width = config.width as f64;
        let height = config.height as f64;

        Packer {
            width,
            height,
            margin: config.word_gap,
            word_gap: config.word_gap,
            max_radius: width.min(height) / 2.0,
            occupied: vec![],
        }
    }

    /// The exact canvas centre, if the padded box fits there.
    fn centered(&self, item: &GlyphBox) -> Option<Position> {
        let candidate = Rect {
            x: self.width / 2.0 - item.width / 2.0,
            y: self.height / 2.0 - item.height / 2.0,
            width: item.width,
            height: item.height,
        };
        let padded = candidate.inflate(gap_padding(item.font_size, self.word_gap));

        self.inside(&padded).then_some(Position {
            x: candidate.x,
            y: candidate.y,
        })
    }

    /// First free spot on the rings around the centre, by increasing radius
    /// then increasing angle.
    fn search(&self, item: &GlyphBox) -> Option<Position> {
        let pad = gap_padding(item.font_size, self.word_gap);
        let (cx, cy) = (self.width / 2.0, self.height / 2.0);

        let mut radius = item.font_size * START_RADIUS_FACTOR;
        while radius <= self.max_radius {
            let samples = ring_samples(radius);

            for i in 0..samples {
                let phi = TAU * i as f64 / samples as f64;
                let r = radius * (1.0 + ELLIPSE_DISTORTION * (2.0 * phi).cos());

                let candidate = Rect {
                    x: cx + r * phi.cos() - item.width / 2.0,
                    y: cy + r * phi.sin() - item.height / 2.0,
                    width: item.width,
                    height: item.height,
                };
                let padded = candidate.inflate(pad);

                if !self.inside(&padded) {
                    continue;
                }
                if self.occupied.iter().any(|region| region.overlaps(&padded)) {
                    continue;
                }

                return Some(Position {
                    x: candidate.x,
                    y: candidate.y,
                });
            }

            radius += RADIUS_STEP;
        }

        None
    }

    fn inside(&self, rect: &Rect) -> bool {
        rect.x >= self.margin
            && rect.y >= self.margin
            && rect.right() <= self.width - self.margin
            && rect.bottom() <= self.height - self.margin
    }

    fn clamp(&self, item: &GlyphBox, position: Position) -> Position {
        let limit = |value: f64, canvas: f64, extent: f64| {
            value
                .min(canvas - extent - self.word_gap)
                .max(self.word_gap)
        };

        Position {
            x: limit(position.x, self.width, item.width),
            y: limit(position.y, self.height, item.height),
        }
    }

    fn occupy(&mut self, item: &GlyphBox) {
        if let Some(region) = occupied_region(item, self.word_gap) {
            self.occupied.push(region);
        }
    }
}

fn ring_samples(radius: f64) -> usize {
    let by_arc = (TAU * radius / SAMPLE_SPACING).ceil() as usize;
    by_arc.max(MIN_RING_SAMPLES)
}

#[cfg(test)]
mod tests {
    use nanorand::{Rng, WyRand};

    use super::*;
    use crate::{
        config::FontSizeRange,
        frequency::RankedWord,
        glyph::{prepare, HeuristicMeasurer},
    };

    fn word(text: &str, font_size: f64, width: f64, height: f64) -> GlyphBox {
        GlyphBox {
            text: text.to_string(),
            frequency: 1,
            font_size,
            color: "#000000".to_string(),
            angle: 0.0,
            width,
            height,
            position: None,
        }
    }

    fn random_words(rng: &mut WyRand, count: usize) -> Vec<RankedWord> {
        (0..count)
            .map(|i| {
                let len = rng.generate_range(2..7usize);
                let text: String = (0..len)
                    .map(|_| char::from(b'a' + rng.generate_range(0..26u8)))
                    .collect();
                RankedWord::new(format!("{text}{i}"), rng.generate_range(1..200u32))
            })
            .collect()
    }

    fn assert_no_overlap(outcome: &PackOutcome, config: &LayoutConfig) {
        let regions: Vec<Rect> = outcome
            .placed
            .iter()
            .map(|item| occupied_region(item, config.word_gap).unwrap())
            .collect();

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    fn assert_in_bounds(outcome: &PackOutcome, config: &LayoutConfig) {
        let margin = config.word_gap;
        for item in &outcome.placed {
            let p = item.position.unwrap();
            assert!(p.x >= margin && p.y >= margin, "{item:?}");
            assert!(p.x + item.width <= config.width as f64 - margin + 1e-9, "{item:?}");
            assert!(p.y + item.height <= config.height as f64 - margin + 1e-9, "{item:?}");
        }
    }

    #[test]
    fn overlap_test() {
        let a = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = Rect { x: 10.0, y: 0.0, width: 10.0, height: 10.0 };
        let c = Rect { x: 10.5, y: 0.0, width: 10.0, height: 10.0 };
        let d = Rect { x: 2.0, y: 2.0, width: 2.0, height: 2.0 };

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.overlaps(&d) && d.overlaps(&a));
    }

    #[test]
    fn first_item_is_centered() {
        let config = LayoutConfig::default();
        let items = vec![
            word("small", 14.0, 40.0, 16.0),
            word("biggest", 60.0, 250.0, 72.0),
            word("medium", 30.0, 90.0, 36.0),
        ];

        let outcome = pack(items, &config);
        let first = &outcome.placed[0];
        assert_eq!(first.text, "biggest");
        assert_eq!(
            first.position,
            Some(Position { x: 400.0 - 125.0, y: 300.0 - 36.0 })
        );
    }

    #[test]
    fn oversized_first_word_is_dropped() {
        let config = LayoutConfig::default();
        let items = vec![
            word("supercalifragilisticexpialidocious", 46.0, 938.4, 55.2),
            word("fits", 20.0, 48.0, 24.0),
        ];

        let outcome = pack(items, &config);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].text, "supercalifragilisticexpialidocious");
        assert!(outcome.dropped[0].position.is_none());

        // The next word takes the centre instead.
        let first = &outcome.placed[0];
        assert_eq!(first.text, "fits");
        assert_eq!(first.position, Some(Position { x: 400.0 - 24.0, y: 300.0 - 12.0 }));
        assert_in_bounds(&outcome, &config);
    }

    #[test]
    fn packs_in_font_size_order() {
        let config = LayoutConfig::default();
        let items = vec![
            word("c", 10.0, 10.0, 12.0),
            word("a", 30.0, 30.0, 36.0),
            word("b", 20.0, 20.0, 24.0),
        ];
        let outcome = pack(items, &config);
        let order: Vec<_> = outcome.placed.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn search_order_is_deterministic() {
        let config = LayoutConfig::default();
        let items = || {
            (0..30)
                .map(|i| word(&format!("w{i}"), 40.0 - i as f64, 80.0, 30.0))
                .collect::<Vec<_>>()
        };
        let a = pack(items(), &config);
        let b = pack(items(), &config);
        assert_eq!(a.placed, b.placed);
    }

    #[test]
    fn crowded_canvas_drops_words() {
        let config = LayoutConfig {
            width: 100,
            height: 100,
            ..LayoutConfig::default()
        };
        let items = (0..20)
            .map(|i| word(&format!("w{i}"), 20.0, 40.0, 24.0))
            .collect::<Vec<_>>();

        let outcome = pack(items, &config);
        assert!(!outcome.dropped.is_empty());
        assert_eq!(outcome.placed.len() + outcome.dropped.len(), 20);
        assert!(outcome.dropped.iter().all(|w| w.position.is_none()));
        assert_no_overlap(&outcome, &config);
    }

    #[test]
    fn no_overlap_and_in_bounds_across_seeds() {
        for seed in 0..12u64 {
            let mut rng = WyRand::new_seed(seed);
            let config = LayoutConfig {
                width: rng.generate_range(400..900u32),
                height: rng.generate_range(300..900u32),
                word_gap: rng.generate_range(0..8u32) as f64,
                font_size: FontSizeRange { min: 10.0, max: 70.0 },
                ..LayoutConfig::default()
            };
            let mut ranked = random_words(&mut rng, 80);
            ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));

            let boxes = prepare(&ranked, &config, &HeuristicMeasurer, &mut rng);
            let outcome = pack(boxes, &config);

            assert!(!outcome.placed.is_empty());
            assert_eq!(outcome.placed.len() + outcome.dropped.len(), 80);
            assert_no_overlap(&outcome, &config);
            assert_in_bounds(&outcome, &config);
        }
    }

    #[test]
    fn ring_density_grows_with_radius() {
        assert_eq!(ring_samples(1.0), MIN_RING_SAMPLES);
        assert!(ring_samples(200.0) > ring_samples(50.0));
    }
}
