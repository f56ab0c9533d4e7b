use std::fmt::Write;

use crate::{config::LayoutConfig, glyph::GlyphBox};

/// Words above this count are drawn bold.
pub const BOLD_FREQUENCY: u32 = 3;

/// Serializes placed words as a standalone SVG document.
///
/// Each word is a `<text>` anchored at the centre of its box and rotated
/// about that centre. Unplaced boxes are skipped.
pub fn render_svg(items: &[GlyphBox], config: &LayoutConfig) -> String {
    let mut svg = String::with_capacity(256 + items.len() * 160);
    let (width, height) = (config.width, config.height);

    // Writing into a String cannot fail.
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{}"/>"#,
        escape_xml(&config.background_color)
    );
    let _ = write!(
        svg,
        r#"<g font-family="{}" text-anchor="middle" dominant-baseline="central">"#,
        escape_xml(&config.font_family)
    );

    for item in items {
        let Some((cx, cy)) = item.center() else {
            continue;
        };
        let weight = if item.frequency > BOLD_FREQUENCY {
            r#" font-weight="bold""#
        } else {
            ""
        };

        let _ = write!(
            svg,
            r#"<text x="{cx:.2}" y="{cy:.2}" font-size="{:.2}" fill="{}"{weight} transform="rotate({} {cx:.2} {cy:.2})">{}</text>"#,
            item.font_size,
            escape_xml(&item.color),
            item.angle,
            escape_xml(&item.text)
        );
    }

    svg.push_str("</g></svg>");
    svg
}

pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
