//! SVG markup for the two faces of a card.
//!
//! Faces are laid out in a 400×680 unit box, a 1:5 rendering of an 80 mm ×
//! 136 mm card. The markup is what the rasterizer captures; nothing here knows
//! about pages or millimetres.

use crate::card::CardConfig;
use crate::colour::Colour;
use crate::records::Record;
use crate::symbol::{SymbolEncoder, SymbolRenderer};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

pub const CARD_WIDTH: u32 = 400;
pub const CARD_HEIGHT: u32 = 680;
/// Display size of the QR symbol on the back face.
pub const QR_SIZE: f32 = 220.0;

const PAIR_PADDING: u32 = 16;
const PAIR_GAP: u32 = 40;
const QR_PANEL_PADDING: f32 = 24.0;

const SLATE_900: &str = "#0F172A";
const SLATE_800: &str = "#1E293B";
const SLATE_700: &str = "#334155";
const SANS: &str = "Inter, Helvetica, Arial, sans-serif";
const MONO: &str = "DejaVu Sans Mono, Menlo, monospace";

/// Which side of the card.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CardFace {
    Front,
    Back,
}

impl CardFace {
    pub fn name(&self) -> &'static str {
        match self {
            CardFace::Front => "front",
            CardFace::Back => "back",
        }
    }
}

/// A self-contained SVG document and its size in display units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    pub width: u32,
    pub height: u32,
    pub svg: String,
}

impl Markup {
    fn document(width: u32, height: u32, body: &str) -> Markup {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}">{body}</svg>"#
        );
        Markup { width, height, svg }
    }
}

pub fn front(record: &Record, config: &CardConfig) -> Markup {
    Markup::document(CARD_WIDTH, CARD_HEIGHT, &front_body(record, config))
}

pub fn back<E: SymbolEncoder>(
    record: &Record,
    config: &CardConfig,
    renderer: &SymbolRenderer<E>,
) -> Markup {
    Markup::document(CARD_WIDTH, CARD_HEIGHT, &back_body(record, config, renderer))
}

/// Both faces side by side, as a single capture for the simple export.
pub fn pair<E: SymbolEncoder>(
    record: &Record,
    config: &CardConfig,
    renderer: &SymbolRenderer<E>,
) -> Markup {
    let width = 2 * PAIR_PADDING + 2 * CARD_WIDTH + PAIR_GAP;
    let height = 2 * PAIR_PADDING + CARD_HEIGHT;
    let body = format!(
        r#"<g transform="translate({p},{p})">{front}</g><g transform="translate({bx},{p})">{back}</g>"#,
        p = PAIR_PADDING,
        bx = PAIR_PADDING + CARD_WIDTH + PAIR_GAP,
        front = front_body(record, config),
        back = back_body(record, config, renderer),
    );
    Markup::document(width, height, &body)
}

struct Text<'a> {
    x: f32,
    y: f32,
    size: f32,
    weight: u16,
    fill: String,
    opacity: f32,
    anchor: &'a str,
    spacing: f32,
    family: &'a str,
}

impl<'a> Text<'a> {
    fn new(x: f32, y: f32, size: f32, fill: Colour) -> Text<'a> {
        Text {
            x,
            y,
            size,
            weight: 700,
            fill: fill.to_string(),
            opacity: 1.0,
            anchor: "start",
            spacing: 0.0,
            family: SANS,
        }
    }

    fn centred(mut self) -> Self {
        self.anchor = "middle";
        self
    }

    fn end(mut self) -> Self {
        self.anchor = "end";
        self
    }

    fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Letter spacing as a fraction of the font size (`em`).
    fn tracking(mut self, em: f32) -> Self {
        self.spacing = em * self.size;
        self
    }

    fn mono(mut self) -> Self {
        self.family = MONO;
        self
    }

    fn write(&self, svg: &mut String, content: &str) {
        if content.is_empty() {
            return;
        }
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" fill="{}" fill-opacity="{}" text-anchor="{}" letter-spacing="{}">{}</text>"#,
            self.x,
            self.y,
            self.family,
            self.size,
            self.weight,
            self.fill,
            self.opacity,
            self.anchor,
            self.spacing,
            encode_text(content)
        );
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(max_chars.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Greedy word wrap on character count.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Background, pattern, and border shared by both faces. `content` is drawn clipped.
fn frame(svg: &mut String, id: &str, config: &CardConfig, pattern_pitch: f32, content: &str) {
    let w = CARD_WIDTH;
    let h = CARD_HEIGHT;
    let _ = write!(
        svg,
        r#"<defs><clipPath id="{id}-clip"><rect x="0" y="0" width="{w}" height="{h}" rx="16"/></clipPath>"#
    );
    let _ = write!(
        svg,
        r##"<pattern id="{id}-dots" width="{pattern_pitch}" height="{pattern_pitch}" patternUnits="userSpaceOnUse"><circle cx="3" cy="3" r="3" fill="#FFFFFF"/><circle cx="{c}" cy="{c}" r="3" fill="#FFFFFF"/></pattern>"##,
        c = pattern_pitch / 2.0 + 3.0
    );
    let _ = write!(
        svg,
        r#"<linearGradient id="{id}-shade" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="{SLATE_800}" stop-opacity="0.5"/><stop offset="1" stop-color="{SLATE_800}" stop-opacity="0"/></linearGradient></defs>"#
    );
    let _ = write!(
        svg,
        r#"<g clip-path="url(#{id}-clip)"><rect x="0" y="0" width="{w}" height="{h}" fill="{}"/>"#,
        config.card_bg_colour
    );
    if config.show_pattern {
        let _ = write!(
            svg,
            r#"<rect x="0" y="0" width="{w}" height="{h}" fill="url(#{id}-dots)" opacity="0.04"/>"#
        );
    }
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{w}" height="192" fill="url(#{id}-shade)"/>"#
    );
    svg.push_str(content);
    svg.push_str("</g>");
    let _ = write!(
        svg,
        r#"<rect x="2" y="2" width="{}" height="{}" rx="14" fill="none" stroke="{SLATE_800}" stroke-width="4"/>"#,
        w - 4,
        h - 4
    );
}

fn detail(
    svg: &mut String,
    x: f32,
    y: f32,
    label: &str,
    value: &str,
    config: &CardConfig,
    highlight: bool,
) {
    Text::new(x, y, 10.0, config.text_colour)
        .weight(900)
        .opacity(0.7)
        .tracking(0.1)
        .write(svg, &label.to_uppercase());
    let (colour, opacity) = if highlight {
        (config.accent_colour, 1.0)
    } else {
        (config.text_colour, 0.95)
    };
    Text::new(x, y + 20.0, 15.0, colour)
        .opacity(opacity)
        .write(svg, &truncate(value, 18));
}

fn front_body(record: &Record, config: &CardConfig) -> String {
    let centre = CARD_WIDTH as f32 / 2.0;
    let mut content = String::new();

    // header
    Text::new(centre, 72.0, 18.0, config.text_colour)
        .centred()
        .weight(900)
        .tracking(0.1)
        .write(&mut content, &config.school_name.to_uppercase());
    let _ = write!(
        content,
        r#"<rect x="{}" y="84" width="64" height="2" rx="1" fill="{}" fill-opacity="0.5"/>"#,
        centre - 32.0,
        config.accent_colour
    );
    Text::new(centre, 106.0, 11.0, config.text_colour)
        .centred()
        .opacity(0.7)
        .tracking(0.2)
        .write(&mut content, &config.school_address.to_uppercase());

    // photo placeholder
    let _ = write!(
        content,
        r#"<rect x="96" y="140" width="208" height="208" rx="40" fill="{SLATE_900}" stroke="{SLATE_700}" stroke-width="4"/>"#
    );
    let _ = write!(
        content,
        r#"<path transform="translate(152,196) scale(4)" fill="{SLATE_700}" d="M12 12c2.21 0 4-1.79 4-4s-1.79-4-4-4-4 1.79-4 4 1.79 4 4 4zm0 2c-2.67 0-8 1.34-8 4v2h16v-2c0-2.66-5.33-4-8-4z"/>"#
    );

    // name
    Text::new(centre, 404.0, 36.0, config.text_colour)
        .centred()
        .weight(900)
        .write(&mut content, &truncate(&record.first_name().to_uppercase(), 16));
    Text::new(centre, 438.0, 24.0, config.accent_colour)
        .centred()
        .write(&mut content, &truncate(&record.last_name().to_uppercase(), 24));

    // details panel
    let _ = write!(
        content,
        r#"<rect x="24" y="468" width="352" height="180" rx="16" fill="{SLATE_900}" fill-opacity="0.8" stroke="{SLATE_700}" stroke-opacity="0.5"/>"#
    );
    let (left, right) = (48.0, 212.0);
    detail(&mut content, left, 498.0, &config.label_class, &record.class, config, false);
    detail(&mut content, right, 498.0, &config.label_section, &record.section, config, false);
    detail(&mut content, left, 544.0, &config.label_id, &record.id, config, true);
    if config.show_contact {
        let contact = if record.contact.is_empty() {
            "N/A"
        } else {
            record.contact.as_str()
        };
        detail(&mut content, right, 544.0, &config.label_contact, contact, config, false);
    }

    // validity bar
    let _ = write!(
        content,
        r#"<line x1="48" y1="586" x2="352" y2="586" stroke="{SLATE_700}" stroke-opacity="0.5"/>"#
    );
    Text::new(left, 606.0, 9.0, config.text_colour)
        .weight(900)
        .opacity(0.7)
        .tracking(0.1)
        .write(&mut content, &config.label_issued.to_uppercase());
    Text::new(left, 624.0, 12.0, config.text_colour)
        .opacity(0.9)
        .write(&mut content, &config.issued_year);
    Text::new(352.0, 606.0, 9.0, config.text_colour)
        .end()
        .weight(900)
        .opacity(0.7)
        .tracking(0.1)
        .write(&mut content, &config.label_valid.to_uppercase());
    Text::new(352.0, 624.0, 12.0, config.accent_colour)
        .end()
        .write(&mut content, &config.valid_until);

    let mut svg = String::new();
    frame(&mut svg, CardFace::Front.name(), config, 20.0, &content);
    svg
}

fn back_body<E: SymbolEncoder>(
    record: &Record,
    config: &CardConfig,
    renderer: &SymbolRenderer<E>,
) -> String {
    let centre = CARD_WIDTH as f32 / 2.0;
    let mut content = String::new();

    // logo and wordmark
    let _ = write!(
        content,
        r##"<rect x="152" y="64" width="96" height="96" rx="16" fill="#FFFFFF" fill-opacity="0.05" stroke="#FFFFFF" stroke-opacity="0.05"/>"##
    );
    if let Some(logo) = &config.logo {
        let _ = write!(
            content,
            r#"<image x="160" y="72" width="80" height="80" preserveAspectRatio="xMidYMid meet" xlink:href="{}"/>"#,
            encode_double_quoted_attribute(&logo.to_string_lossy())
        );
    }
    Text::new(centre, 194.0, 18.0, config.text_colour)
        .centred()
        .weight(900)
        .tracking(0.3)
        .write(&mut content, &config.brand_text);
    let _ = write!(
        content,
        r#"<rect x="{}" y="210" width="48" height="4" rx="2" fill="{}"/>"#,
        centre - 24.0,
        config.accent_colour
    );

    // qr panel
    let panel = QR_SIZE + 2.0 * QR_PANEL_PADDING;
    let panel_x = centre - panel / 2.0;
    let panel_y = 238.0;
    let _ = write!(
        content,
        r#"<rect x="{panel_x}" y="{panel_y}" width="{panel}" height="{panel}" rx="24" fill="{}"/>"#,
        config.qr_bg_colour
    );
    let symbol = renderer.render(&record.id, QR_SIZE, config.qr_colour, config.qr_bg_colour);
    if !symbol.is_empty() {
        let _ = write!(
            content,
            r#"<g transform="translate({},{})">{}</g>"#,
            panel_x + QR_PANEL_PADDING,
            panel_y + QR_PANEL_PADDING,
            symbol.to_svg()
        );
    }

    // id pill and disclaimer
    let _ = write!(
        content,
        r#"<rect x="90" y="546" width="220" height="36" rx="18" fill="{SLATE_800}" stroke="{SLATE_700}"/>"#
    );
    Text::new(centre, 569.0, 14.0, config.accent_colour)
        .centred()
        .mono()
        .tracking(0.2)
        .write(&mut content, &truncate(&format!("ID: {}", record.id), 20));
    for (i, line) in wrap(&config.disclaimer_text, 52).iter().take(4).enumerate() {
        Text::new(centre, 610.0 + 15.0 * i as f32, 10.0, config.text_colour)
            .centred()
            .weight(500)
            .opacity(0.8)
            .write(&mut content, line);
    }

    let mut svg = String::new();
    frame(&mut svg, CardFace::Back.name(), config, 24.0, &content);
    svg
}
