use card_press::print::ExportMode;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum Mode {
    /// Front and back captured together and flowed down the page
    Simple,
    /// Exact card size with crop marks and fold guides, two per page
    Precision,
}

impl From<Mode> for ExportMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Simple => ExportMode::Simple,
            Mode::Precision => ExportMode::Precision,
        }
    }
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// CSV file of records (name, class, section, studentId, contact)
    pub csv: PathBuf,
    /// Layout to print; defaults to the configured mode
    #[clap(short, long, value_enum)]
    pub mode: Option<Mode>,
    /// Output PDF path; defaults to the configured directory and a mode-specific name
    #[clap(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct QrArgs {
    /// Text to encode
    pub payload: String,
    /// Edge length of the symbol in pixels
    #[clap(short, long, default_value_t = 220.0)]
    pub size: f32,
    /// Output SVG path; printed to stdout if omitted
    #[clap(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// CSV file of records
    pub csv: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates a card-press.toml config file
    Config,
    /// Renders ID cards for every record in a CSV file to a printable PDF
    Render(RenderArgs),
    /// Renders a single QR symbol as SVG
    Qr(QrArgs),
    /// Prints where each record would land in the precision layout, as JSON
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Configuration file
    #[clap(short, long, env = "CARD_PRESS_CONFIG", default_value = "card-press.toml")]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}
