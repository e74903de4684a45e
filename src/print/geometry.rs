use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("a row of {row_width} mm does not fit on a {page_width} mm wide page")]
    RowTooWide { row_width: f32, page_width: f32 },
    #[error("two rows of {content_height} mm do not fit on a {page_height} mm tall page")]
    ContentTooTall {
        content_height: f32,
        page_height: f32,
    },
    #[error("dimension '{0}' must be positive")]
    NonPositive(&'static str),
}

/// How cards are arranged on the sheet.
#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// One front+back capture per row, scaled to a fixed width, flowed down the page.
    Simple,
    /// Exact physical card size, two records per page, with crop marks and fold guides.
    #[default]
    Precision,
}

impl ExportMode {
    pub fn name(&self) -> &'static str {
        match self {
            ExportMode::Simple => "simple",
            ExportMode::Precision => "precision",
        }
    }

    pub fn all() -> &'static [ExportMode] {
        &[ExportMode::Precision, ExportMode::Simple]
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Physical layout constants, all in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Exact card size used by the precision layout
    pub card_width: f32,
    pub card_height: f32,
    /// Gap between the front and back of a pair
    pub gap_x: f32,
    /// Gap between rows
    pub gap_y: f32,
    /// Top and bottom margin of the simple layout
    pub margin: f32,
    /// Width of a front+back capture in the simple layout
    pub target_width: f32,
    /// Distance from a card corner to the start of its crop ticks
    pub crop_offset: f32,
    pub crop_length: f32,
    /// Size of the per-row caption, in points
    pub label_size_pt: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry {
            page_width: 210.0,
            page_height: 297.0,
            card_width: 80.0,
            card_height: 136.0,
            gap_x: 10.0,
            gap_y: 10.0,
            margin: 10.0,
            target_width: 160.0,
            crop_offset: 2.0,
            crop_length: 4.0,
            label_size_pt: 6.0,
        }
    }
}

impl PageGeometry {
    pub fn row_width(&self) -> f32 {
        2.0 * self.card_width + self.gap_x
    }

    pub fn content_height(&self) -> f32 {
        2.0 * self.card_height + self.gap_y
    }

    /// Check that the layout for `mode` fits on the page.
    pub fn validate(&self, mode: ExportMode) -> Result<(), GeometryError> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("card_width", self.card_width),
            ("card_height", self.card_height),
            ("target_width", self.target_width),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(GeometryError::NonPositive(*name));
        }

        match mode {
            ExportMode::Precision => {
                if self.row_width() > self.page_width {
                    return Err(GeometryError::RowTooWide {
                        row_width: self.row_width(),
                        page_width: self.page_width,
                    });
                }
                if self.content_height() > self.page_height {
                    return Err(GeometryError::ContentTooTall {
                        content_height: self.content_height(),
                        page_height: self.page_height,
                    });
                }
            }
            ExportMode::Simple => {
                if self.target_width > self.page_width {
                    return Err(GeometryError::RowTooWide {
                        row_width: self.target_width,
                        page_width: self.page_width,
                    });
                }
            }
        }
        Ok(())
    }

    /// Output file name for `mode`, e.g. `ID_Cards_80x136mm.pdf`.
    pub fn file_name(&self, mode: ExportMode) -> String {
        match mode {
            ExportMode::Simple => "ID_Cards.pdf".to_string(),
            ExportMode::Precision => format!(
                "ID_Cards_{}x{}mm.pdf",
                self.card_width.round() as i64,
                self.card_height.round() as i64
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_fits_both_modes() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.validate(ExportMode::Precision), Ok(()));
        assert_eq!(geometry.validate(ExportMode::Simple), Ok(()));
        assert_eq!(geometry.row_width(), 170.0);
        assert_eq!(geometry.content_height(), 282.0);
    }

    #[test]
    fn rejects_oversized_cards() {
        let geometry = PageGeometry {
            card_width: 110.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geometry.validate(ExportMode::Precision),
            Err(GeometryError::RowTooWide { .. })
        ));

        let geometry = PageGeometry {
            card_height: 150.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geometry.validate(ExportMode::Precision),
            Err(GeometryError::ContentTooTall { .. })
        ));
        // the simple layout does not use the card size
        assert_eq!(geometry.validate(ExportMode::Simple), Ok(()));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let geometry = PageGeometry {
            page_height: 0.0,
            ..PageGeometry::default()
        };
        assert_eq!(
            geometry.validate(ExportMode::Simple),
            Err(GeometryError::NonPositive("page_height"))
        );
    }

    #[test]
    fn file_name_reflects_mode() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.file_name(ExportMode::Simple), "ID_Cards.pdf");
        assert_eq!(
            geometry.file_name(ExportMode::Precision),
            "ID_Cards_80x136mm.pdf"
        );
    }
}
