use crate::colour::Colour;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything that styles a card, shared by every record in a job.
///
/// The value is never mutated in place; [`CardConfig::updated`] returns a new
/// configuration with the requested changes applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub school_name: String,
    pub school_address: String,
    pub issued_year: String,
    pub valid_until: String,
    /// Colour of the QR modules and finder glyphs
    pub qr_colour: Colour,
    /// Colour of the panel behind the QR symbol
    pub qr_bg_colour: Colour,
    /// Institution logo shown on the back (PNG, JPEG, or SVG)
    pub logo: Option<PathBuf>,
    pub card_bg_colour: Colour,
    pub accent_colour: Colour,
    pub text_colour: Colour,
    /// Draw the faint dotted background pattern
    pub show_pattern: bool,
    pub label_class: String,
    pub label_section: String,
    pub label_id: String,
    pub label_contact: String,
    pub label_issued: String,
    pub label_valid: String,
    pub disclaimer_text: String,
    pub show_contact: bool,
    /// Wordmark above the QR symbol on the back
    pub brand_text: String,
}

impl Default for CardConfig {
    fn default() -> Self {
        CardConfig {
            school_name: "SARC EDUCATION FOUNDATION".to_string(),
            school_address: "BHIMDATTA-06, AITHPUR, KANCHANPUR".to_string(),
            issued_year: "2082".to_string(),
            valid_until: "CHAITRA 2082".to_string(),
            qr_colour: Colour::BLACK,
            qr_bg_colour: Colour::WHITE,
            logo: None,
            card_bg_colour: Colour::rgb(0x0f, 0x17, 0x2a),
            accent_colour: Colour::rgb(0x3b, 0x82, 0xf6),
            text_colour: Colour::WHITE,
            show_pattern: true,
            label_class: "CLASS".to_string(),
            label_section: "SECTION".to_string(),
            label_id: "STUDENT ID".to_string(),
            label_contact: "CONTACT".to_string(),
            label_issued: "ISSUED".to_string(),
            label_valid: "VALID UNTIL".to_string(),
            disclaimer_text: "This card is the property of the institution. If found, please return it to the school office.".to_string(),
            show_contact: true,
            brand_text: "QWICKATTEND".to_string(),
        }
    }
}

impl CardConfig {
    /// Produce a new configuration with `change` applied; `self` is left as is.
    pub fn updated<F>(&self, change: F) -> CardConfig
    where
        F: FnOnce(&mut CardConfig),
    {
        let mut next = self.clone();
        change(&mut next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_serialize_card_config() {
        let config = CardConfig::default();
        let text = toml::to_string(&config).expect("can serialize CardConfig to TOML");
        let back: CardConfig = toml::from_str(&text).expect("can parse CardConfig");
        assert_eq!(back, config);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: CardConfig = toml::from_str(
            r##"
            school_name = "Hillside Academy"
            qr_colour = "#1E293B"
            "##,
        )
        .expect("can parse partial CardConfig");
        assert_eq!(config.school_name, "Hillside Academy");
        assert_eq!(config.qr_colour, Colour::rgb(0x1e, 0x29, 0x3b));
        assert_eq!(config.label_id, CardConfig::default().label_id);
    }

    #[test]
    fn rejects_invalid_colours() {
        let parsed: Result<CardConfig, _> = toml::from_str(r#"accent_colour = "blue""#);
        assert!(parsed.is_err());
    }

    #[test]
    fn updated_leaves_original_untouched() {
        let original = CardConfig::default();
        let next = original.updated(|c| c.school_name = "Riverside".to_string());
        assert_eq!(next.school_name, "Riverside");
        assert_eq!(original.school_name, CardConfig::default().school_name);
    }
}
