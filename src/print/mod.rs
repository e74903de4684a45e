//! Laying captured cards out on paper.

mod capture;
pub use capture::*;

mod compositor;
pub use compositor::*;

mod config;
pub use config::*;

mod geometry;
pub use geometry::*;

pub mod layout;

mod page;
pub use page::*;

mod pdf;
pub use pdf::PdfError;

pub mod progress;
pub use progress::ProgressReporter;
