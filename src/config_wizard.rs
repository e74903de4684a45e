//! Interactive configuration wizard for creating `card-press.toml`.
//!
//! The wizard collects the institution details printed on every card, the
//! card colours, and the print layout through a series of prompts, starting
//! from the defaults for anything the user skips.

use anyhow::{anyhow, Context, Result};
use card_press::card::CardConfig;
use card_press::colour::Colour;
use card_press::print::{ExportMode, PrintConfig};
use card_press::symbol::{ErrorLevel, ModuleStyle};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration for a card-press project.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub card: CardConfig,
    #[serde(default)]
    pub print: PrintConfig,
}

impl Configuration {
    /// Load the configuration at `path`, or the defaults if there is no such file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!(
                "{} not found, using the default configuration",
                path.display()
            );
            return Ok(Configuration::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse TOML")
    }
}

fn colour_prompt(theme: &ColorfulTheme, prompt: &str, default: Colour) -> Result<Colour> {
    let colour: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|input: &String| input.parse::<Colour>().map(|_| ()))
        .interact()?;
    colour
        .parse()
        .with_context(|| format!("Failed to parse colour '{colour}'"))
}

/// Run the interactive configuration wizard.
///
/// Prompts for the card text, colours, and print settings, then writes the
/// result to `config_path`.
pub fn run(config_path: &Path) -> Result<()> {
    let theme = ColorfulTheme {
        ..ColorfulTheme::default()
    };
    let defaults = CardConfig::default();

    let school_name: String = Input::with_theme(&theme)
        .with_prompt("Institution name")
        .default(defaults.school_name.clone())
        .allow_empty(false)
        .interact()
        .with_context(|| "Failed to obtain institution name")?;
    let school_address: String = Input::with_theme(&theme)
        .with_prompt("Institution address")
        .default(defaults.school_address.clone())
        .allow_empty(true)
        .interact()?;
    let issued_year: String = Input::with_theme(&theme)
        .with_prompt("Year of issue")
        .default(defaults.issued_year.clone())
        .interact()?;
    let valid_until: String = Input::with_theme(&theme)
        .with_prompt("Valid until")
        .default(defaults.valid_until.clone())
        .interact()?;

    let logo = if Confirm::with_theme(&theme)
        .with_prompt("Do you want to print a logo on the back of the cards?")
        .default(false)
        .interact()?
    {
        let logo: String = Input::with_theme(&theme)
            .with_prompt("Logo file (PNG, JPEG, or SVG)")
            .allow_empty(false)
            .interact()?;
        let logo = PathBuf::from(logo);
        if !logo.is_file() {
            return Err(anyhow!("Path '{}' isn't a file!", logo.display()));
        }
        Some(logo)
    } else {
        None
    };

    let card_bg_colour = colour_prompt(&theme, "Card background colour", defaults.card_bg_colour)?;
    let accent_colour = colour_prompt(&theme, "Accent colour", defaults.accent_colour)?;
    let qr_colour = colour_prompt(&theme, "QR symbol colour", defaults.qr_colour)?;
    let show_contact = Confirm::with_theme(&theme)
        .with_prompt("Show the contact number on the front?")
        .default(defaults.show_contact)
        .interact()?;

    let card = defaults.updated(|c| {
        c.school_name = school_name;
        c.school_address = school_address;
        c.issued_year = issued_year;
        c.valid_until = valid_until;
        c.logo = logo;
        c.card_bg_colour = card_bg_colour;
        c.accent_colour = accent_colour;
        c.qr_colour = qr_colour;
        c.show_contact = show_contact;
    });

    let mode = FuzzySelect::with_theme(&theme)
        .with_prompt("Print layout")
        .items(ExportMode::all())
        .default(0)
        .interact()?;
    let mode = ExportMode::all()[mode];

    let outdir: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default(".".to_string())
        .interact()?;

    let mut print = PrintConfig {
        mode,
        outdir: PathBuf::from(outdir),
        ..PrintConfig::default()
    };

    if mode == ExportMode::Precision {
        print.geometry.card_width = Input::with_theme(&theme)
            .with_prompt("Card width in mm")
            .default(print.geometry.card_width)
            .interact()?;
        print.geometry.card_height = Input::with_theme(&theme)
            .with_prompt("Card height in mm")
            .default(print.geometry.card_height)
            .interact()?;
        print
            .geometry
            .validate(mode)
            .with_context(|| "Cards of that size don't fit on the page")?;
    }

    let style = FuzzySelect::with_theme(&theme)
        .with_prompt("QR module style")
        .items(ModuleStyle::all())
        .default(0)
        .interact()?;
    print.module_style = ModuleStyle::all()[style];

    let level = FuzzySelect::with_theme(&theme)
        .with_prompt("QR error correction level")
        .items(ErrorLevel::all())
        .default(0)
        .interact()?;
    print.error_level = ErrorLevel::all()[level];

    let config = Configuration { card, print };

    let config =
        toml::to_string_pretty(&config).with_context(|| "Failed to convert configuration to TOML")?;

    if config_path.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!(
                "{} already exists, do you want to override it?",
                config_path.display()
            ))
            .interact()?
    {
        println!("Configuration:");
        println!("{}", config);
    } else {
        std::fs::write(config_path, config)
            .with_context(|| "Failed to write configuration file")?;
        println!("{} written!", config_path.display());
    }

    Ok(())
}
