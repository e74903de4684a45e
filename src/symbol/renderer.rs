//! Matrix to vector drawing.
//!
//! Finder zones are never drawn module by module. Each one is replaced by a
//! self-contained glyph (outer 7×7 ring, light 5×5 cut-out, solid 3×3 centre)
//! so the finder can be styled without touching the data modules. Both styles
//! share the same ring/cut-out/centre geometry, which is what keeps the
//! stylised symbol scan-equivalent to the matrix it came from.

use crate::colour::Colour;
use crate::symbol::{
    EncodingError, ErrorLevel, ModuleMatrix, QrEncoder, SymbolEncoder, FINDER_SIZE,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Inset of the light cut-out inside the finder ring, in modules.
const FINDER_HOLE_INSET: usize = 1;
/// Offset and side of the solid finder centre, in modules.
const FINDER_CORE_OFFSET: usize = 2;
const FINDER_CORE_SIZE: usize = 3;
/// Radius of a dot-style data module, in modules.
const DOT_RADIUS: f32 = 0.4;

#[derive(Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStyle {
    /// Crisp filled squares and hard-cornered finders.
    #[default]
    Square,
    /// Inscribed circles and rounded finders.
    Dot,
}

impl ModuleStyle {
    pub fn name(&self) -> &'static str {
        match self {
            ModuleStyle::Square => "square",
            ModuleStyle::Dot => "dot",
        }
    }

    pub fn all() -> &'static [ModuleStyle] {
        &[ModuleStyle::Square, ModuleStyle::Dot]
    }
}

impl fmt::Display for ModuleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One drawable element of a rendered symbol, in grid units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Primitive {
    /// A dark data module at `(col, row)`.
    Module { col: usize, row: usize },
    /// A finder glyph whose 7×7 box starts at `(x, y)`.
    Finder { x: usize, y: usize },
}

/// Whether the finder glyph paints the cell at `(dx, dy)` inside its 7×7 box.
pub fn finder_glyph_is_dark(dx: usize, dy: usize) -> bool {
    let hole = FINDER_HOLE_INSET..FINDER_SIZE - FINDER_HOLE_INSET;
    let core = FINDER_CORE_OFFSET..FINDER_CORE_OFFSET + FINDER_CORE_SIZE;
    let in_ring = !(hole.contains(&dx) && hole.contains(&dy));
    let in_core = core.contains(&dx) && core.contains(&dy);
    in_ring || in_core
}

/// A scalable drawing of a symbol. Immutable; re-render to change payload or colours.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedSymbol {
    count: usize,
    size: f32,
    style: ModuleStyle,
    module_colour: Colour,
    bg_colour: Colour,
    primitives: Vec<Primitive>,
}

impl RenderedSymbol {
    /// The symbol drawn when encoding fails: nothing at all.
    pub fn empty() -> RenderedSymbol {
        RenderedSymbol {
            count: 0,
            size: 0.0,
            style: ModuleStyle::default(),
            module_colour: Colour::BLACK,
            bg_colour: Colour::WHITE,
            primitives: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Expand the primitives back into a per-cell dark/light grid.
    pub fn dark_cells(&self) -> Vec<Vec<bool>> {
        let mut cells = vec![vec![false; self.count]; self.count];
        for primitive in self.primitives.iter() {
            match *primitive {
                Primitive::Module { col, row } => cells[row][col] = true,
                Primitive::Finder { x, y } => {
                    for dy in 0..FINDER_SIZE {
                        for dx in 0..FINDER_SIZE {
                            cells[y + dy][x + dx] = finder_glyph_is_dark(dx, dy);
                        }
                    }
                }
            }
        }
        cells
    }

    /// Standalone `<svg>` element, `size × size` display units, viewbox in modules.
    pub fn to_svg(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut svg = String::new();
        let n = self.count;
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {n} {n}">"#,
            size = self.size
        );
        let _ = write!(
            svg,
            r#"<rect x="0" y="0" width="{n}" height="{n}" fill="{}"/>"#,
            self.bg_colour
        );

        let _ = write!(svg, r#"<g fill="{}""#, self.module_colour);
        if self.style == ModuleStyle::Square {
            svg.push_str(r#" shape-rendering="crispEdges""#);
        }
        svg.push('>');
        for primitive in self.primitives.iter() {
            match *primitive {
                Primitive::Module { col, row } => self.write_module(&mut svg, col, row),
                Primitive::Finder { x, y } => self.write_finder(&mut svg, x, y),
            }
        }
        svg.push_str("</g></svg>");
        svg
    }

    fn write_module(&self, svg: &mut String, col: usize, row: usize) {
        let _ = match self.style {
            ModuleStyle::Square => write!(
                svg,
                r#"<rect x="{col}" y="{row}" width="1" height="1"/>"#
            ),
            ModuleStyle::Dot => write!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{DOT_RADIUS}"/>"#,
                col as f32 + 0.5,
                row as f32 + 0.5
            ),
        };
    }

    fn write_finder(&self, svg: &mut String, x: usize, y: usize) {
        let outer = FINDER_SIZE;
        let inset = FINDER_HOLE_INSET;
        let hole = FINDER_SIZE - 2 * FINDER_HOLE_INSET;
        let core = FINDER_CORE_OFFSET;
        let core_size = FINDER_CORE_SIZE;
        let _ = write!(svg, r#"<g transform="translate({x},{y})">"#);
        let _ = match self.style {
            ModuleStyle::Square => write!(
                svg,
                r#"<path d="M0,0h{outer}v{outer}h-{outer}z M{inset},{inset}v{hole}h{hole}v-{hole}z" fill-rule="evenodd"/><rect x="{core}" y="{core}" width="{core_size}" height="{core_size}"/>"#
            ),
            ModuleStyle::Dot => {
                // a stroke of width `inset` centred on the ring midline covers exactly the ring
                let half = inset as f32 / 2.0;
                let ring = outer as f32 - inset as f32;
                write!(
                    svg,
                    r#"<rect x="{half}" y="{half}" width="{ring}" height="{ring}" rx="{}" fill="none" stroke="{}" stroke-width="{inset}"/><rect x="{core}" y="{core}" width="{core_size}" height="{core_size}" rx="{}"/>"#,
                    ring / 4.0,
                    self.module_colour,
                    core_size as f32 / 4.0
                )
            }
        };
        svg.push_str("</g>");
    }
}

/// Renders payloads to stylised vector symbols with a fixed error level and style.
pub struct SymbolRenderer<E = QrEncoder> {
    encoder: E,
    level: ErrorLevel,
    style: ModuleStyle,
}

impl<E: SymbolEncoder> SymbolRenderer<E> {
    pub fn new(encoder: E, level: ErrorLevel, style: ModuleStyle) -> SymbolRenderer<E> {
        SymbolRenderer {
            encoder,
            level,
            style,
        }
    }

    /// Encode and draw `payload`. Encoding failures are logged and yield an empty symbol.
    pub fn render(
        &self,
        payload: &str,
        size: f32,
        module_colour: Colour,
        bg_colour: Colour,
    ) -> RenderedSymbol {
        self.try_render(payload, size, module_colour, bg_colour)
            .unwrap_or_else(|e| {
                log::error!("QR generation failed for '{payload}': {e}");
                RenderedSymbol::empty()
            })
    }

    pub fn try_render(
        &self,
        payload: &str,
        size: f32,
        module_colour: Colour,
        bg_colour: Colour,
    ) -> Result<RenderedSymbol, EncodingError> {
        let matrix = self.encoder.encode(payload, self.level)?;
        Ok(self.draw(&matrix, size, module_colour, bg_colour))
    }

    /// Draw an already encoded matrix.
    pub fn draw(
        &self,
        matrix: &ModuleMatrix,
        size: f32,
        module_colour: Colour,
        bg_colour: Colour,
    ) -> RenderedSymbol {
        let count = matrix.count();
        let mut primitives = Vec::new();
        for row in 0..count {
            for col in 0..count {
                if matrix.is_finder_zone(row, col) {
                    continue;
                }
                if matrix.is_dark(row, col) {
                    primitives.push(Primitive::Module { col, row });
                }
            }
        }
        primitives.extend(
            matrix
                .finder_origins()
                .iter()
                .map(|&(x, y)| Primitive::Finder { x, y }),
        );

        RenderedSymbol {
            count,
            size,
            style: self.style,
            module_colour,
            bg_colour,
            primitives,
        }
    }
}

impl Default for SymbolRenderer<QrEncoder> {
    fn default() -> Self {
        SymbolRenderer::new(
            QrEncoder::default(),
            ErrorLevel::default(),
            ModuleStyle::default(),
        )
    }
}
