use crate::print::{ExportMode, PageGeometry};
use crate::symbol::{ErrorLevel, ModuleStyle, QrEncoder, SymbolRenderer, DEFAULT_MAX_VERSION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Print job configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintConfig {
    #[serde(default)]
    pub mode: ExportMode,
    /// Directory the PDF is written to; the file name follows from the mode
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
    #[serde(default)]
    pub geometry: PageGeometry,
    /// Capture pixels per markup unit
    #[serde(default = "default_pixel_density")]
    pub pixel_density: f32,
    #[serde(default)]
    pub error_level: ErrorLevel,
    #[serde(default)]
    pub module_style: ModuleStyle,
    /// Largest symbol version tried before a payload is rejected as too long
    #[serde(default = "default_max_version")]
    pub max_version: u8,
    /// Pause after each record, in milliseconds
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

fn default_outdir() -> PathBuf {
    PathBuf::from(".")
}
fn default_pixel_density() -> f32 {
    2.0
}
fn default_max_version() -> u8 {
    DEFAULT_MAX_VERSION
}
fn default_pause_ms() -> u64 {
    10
}

impl Default for PrintConfig {
    fn default() -> Self {
        PrintConfig {
            mode: ExportMode::default(),
            outdir: default_outdir(),
            geometry: PageGeometry::default(),
            pixel_density: default_pixel_density(),
            error_level: ErrorLevel::default(),
            module_style: ModuleStyle::default(),
            max_version: default_max_version(),
            pause_ms: default_pause_ms(),
        }
    }
}

impl PrintConfig {
    pub fn encoder(&self) -> QrEncoder {
        QrEncoder::new(self.max_version)
    }

    pub fn symbol_renderer(&self) -> SymbolRenderer {
        SymbolRenderer::new(self.encoder(), self.error_level, self.module_style)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Where the PDF for `mode` is written.
    pub fn outfile(&self, mode: ExportMode) -> PathBuf {
        self.outdir.join(self.geometry.file_name(mode))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_serialize_print_config() {
        let config = PrintConfig::default();
        let text = toml::to_string(&config).expect("can serialize print config to TOML");
        let back: PrintConfig = toml::from_str(&text).expect("can parse print config");
        assert_eq!(back, config);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: PrintConfig = toml::from_str(
            r#"
mode = "simple"
outdir = "out"

[geometry]
card_width = 54.0
"#,
        )
        .expect("can parse partial print config");
        assert_eq!(config.mode, ExportMode::Simple);
        assert_eq!(config.pixel_density, 2.0);
        assert_eq!(config.geometry.card_width, 54.0);
        assert_eq!(config.geometry.card_height, 136.0);
        assert_eq!(
            config.outfile(ExportMode::Precision),
            PathBuf::from("out/ID_Cards_54x136mm.pdf")
        );
    }

    #[test]
    fn empty_table_is_default() {
        let config: PrintConfig = toml::from_str("").expect("can parse empty print config");
        assert_eq!(config, PrintConfig::default());
    }
}
