//! QR symbol generation for the back of each card.
//!
//! Encoding is delegated to a [`SymbolEncoder`]; this module only decides what
//! to draw for each module of the resulting [`ModuleMatrix`]. See
//! [`renderer`] for the finder-glyph substitution.

mod encoder;
pub use encoder::*;

mod matrix;
pub use matrix::*;

pub mod renderer;
pub use renderer::{ModuleStyle, Primitive, RenderedSymbol, SymbolRenderer};
