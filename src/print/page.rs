use crate::print::{ExportMode, RasterImage};
use serde::Serialize;

/// A point in millimetres from the top-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }
}

/// An axis-aligned box in millimetres; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A straight line segment; dashed lines are fold guides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Image { raster: RasterImage, rect: Rect },
    Stroke(Stroke),
    Label { text: String, at: Point, size_pt: f32 },
}

/// Everything placed on one sheet, in placement order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn add_image(&mut self, raster: RasterImage, rect: Rect) {
        self.items.push(PageItem::Image { raster, rect });
    }

    pub fn add_stroke(&mut self, stroke: Stroke) {
        self.items.push(PageItem::Stroke(stroke));
    }

    pub fn add_label<S: ToString>(&mut self, text: S, at: Point, size_pt: f32) {
        self.items.push(PageItem::Label {
            text: text.to_string(),
            at,
            size_pt,
        });
    }

    pub fn images(&self) -> impl Iterator<Item = &Rect> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Image { rect, .. } => Some(rect),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Stroke(stroke) => Some(stroke),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A finished job: every page, ready to be written out once.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    pub mode: ExportMode,
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
    /// Indices of records left out because they failed to capture
    pub skipped: Vec<usize>,
}
