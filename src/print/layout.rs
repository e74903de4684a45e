//! Page layout calculations.
//!
//! Two layouts are supported:
//!
//! - **Duplex** (precision export): two records per page, one per row. Each row
//!   holds the front at the left and the back at the right, both at the exact
//!   physical card size, with the row block centred on the page. A record's
//!   slot depends only on its index, so a record that fails to capture leaves a
//!   gap rather than shifting the records after it.
//! - **Flow** (simple export): front+back captures scaled to a fixed width and
//!   stacked down the page, starting a new page when the next capture would
//!   cross the bottom margin.
//!
//! Everything here is pure arithmetic in millimetres; nothing touches a PDF.

use crate::print::{PageGeometry, Point, Rect, Stroke};
use serde::Serialize;

pub const RECORDS_PER_PAGE: usize = 2;

/// Where a record lands: zero-based page and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub page: usize,
    pub row: usize,
}

/// Physical placement of one record in the duplex layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardPlacement {
    pub slot: Slot,
    pub front: Rect,
    pub back: Rect,
    /// x of the dashed fold guide between front and back
    pub fold_x: f32,
    /// Baseline origin of the row caption
    pub label: Point,
}

#[derive(Debug, Clone, Copy)]
pub struct DuplexLayout {
    geometry: PageGeometry,
}

impl DuplexLayout {
    pub fn new(geometry: PageGeometry) -> DuplexLayout {
        DuplexLayout { geometry }
    }

    pub fn slot(index: usize) -> Slot {
        Slot {
            page: index / RECORDS_PER_PAGE,
            row: index % RECORDS_PER_PAGE,
        }
    }

    /// Whether record `index` is the first on a new page (other than the first page).
    pub fn starts_page(index: usize) -> bool {
        index > 0 && index % RECORDS_PER_PAGE == 0
    }

    pub fn page_count(records: usize) -> usize {
        records.div_ceil(RECORDS_PER_PAGE)
    }

    pub fn margin_left(&self) -> f32 {
        (self.geometry.page_width - self.geometry.row_width()) / 2.0
    }

    pub fn margin_top(&self) -> f32 {
        (self.geometry.page_height - self.geometry.content_height()) / 2.0
    }

    pub fn placement(&self, index: usize) -> CardPlacement {
        let g = &self.geometry;
        let slot = Self::slot(index);
        let x = self.margin_left();
        let y = self.margin_top() + slot.row as f32 * (g.card_height + g.gap_y);

        let front = Rect::new(x, y, g.card_width, g.card_height);
        let back = Rect::new(x + g.card_width + g.gap_x, y, g.card_width, g.card_height);
        CardPlacement {
            slot,
            front,
            back,
            fold_x: back.x - g.gap_x / 2.0,
            label: Point::new(x + 1.0, y - g.crop_offset - 0.5),
        }
    }

    /// Eight corner ticks around `card`, starting `crop_offset` outside each corner.
    pub fn crop_marks(&self, card: &Rect) -> [Stroke; 8] {
        let off = self.geometry.crop_offset;
        let len = self.geometry.crop_length;
        let tick = |x1: f32, y1: f32, x2: f32, y2: f32| Stroke {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
            dashed: false,
        };
        let (l, r, t, b) = (card.x, card.right(), card.y, card.bottom());

        [
            // top-left
            tick(l - off - len, t, l - off, t),
            tick(l, t - off - len, l, t - off),
            // top-right
            tick(r + off, t, r + off + len, t),
            tick(r, t - off - len, r, t - off),
            // bottom-left
            tick(l - off - len, b, l - off, b),
            tick(l, b + off, l, b + off + len),
            // bottom-right
            tick(r + off, b, r + off + len, b),
            tick(r, b + off, r, b + off + len),
        ]
    }

    pub fn fold_guide(&self, placement: &CardPlacement) -> Stroke {
        Stroke {
            from: Point::new(placement.fold_x, placement.front.y),
            to: Point::new(placement.fold_x, placement.front.bottom()),
            dashed: true,
        }
    }
}

/// Cursor for the simple layout.
#[derive(Debug, Clone)]
pub struct FlowLayout {
    geometry: PageGeometry,
    page: usize,
    y: f32,
}

impl FlowLayout {
    pub fn new(geometry: PageGeometry) -> FlowLayout {
        FlowLayout {
            geometry,
            page: 0,
            y: geometry.margin,
        }
    }

    /// Place a `width × height` pixel capture; returns its page and rectangle.
    pub fn place(&mut self, width: u32, height: u32) -> (usize, Rect) {
        let g = &self.geometry;
        let target_height = height as f32 * g.target_width / width as f32;

        if self.y + target_height > g.page_height - g.margin && self.y > g.margin {
            self.page += 1;
            self.y = g.margin;
        }

        let rect = Rect::new(
            (g.page_width - g.target_width) / 2.0,
            self.y,
            g.target_width,
            target_height,
        );
        self.y += target_height + g.gap_y;
        (self.page, rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn slot_is_index_div_and_mod_two() {
        for i in 0..50 {
            let slot = DuplexLayout::slot(i);
            assert_eq!(slot.page, i / 2);
            assert_eq!(slot.row, i % 2);
            assert_eq!(DuplexLayout::starts_page(i), i > 0 && i % 2 == 0);
        }
        assert_eq!(DuplexLayout::page_count(3), 2);
        assert_eq!(DuplexLayout::page_count(4), 2);
        assert_eq!(DuplexLayout::page_count(0), 0);
    }

    #[test]
    fn rows_are_centred() {
        for (card_width, gap_x) in [(80.0, 10.0), (54.0, 4.0), (100.0, 0.0), (60.0, 30.5)] {
            let geometry = PageGeometry {
                card_width,
                gap_x,
                ..PageGeometry::default()
            };
            let layout = DuplexLayout::new(geometry);
            let m = layout.margin_left();
            assert!(approx(m + 2.0 * card_width + gap_x + m, geometry.page_width));
        }

        let layout = DuplexLayout::new(PageGeometry::default());
        assert!(approx(layout.margin_left(), 20.0));
        assert!(approx(layout.margin_top(), 7.5));
    }

    #[test]
    fn placement_puts_back_beside_front() {
        let layout = DuplexLayout::new(PageGeometry::default());

        let upper = layout.placement(0);
        assert_eq!(upper.front, Rect::new(20.0, 7.5, 80.0, 136.0));
        assert_eq!(upper.back, Rect::new(110.0, 7.5, 80.0, 136.0));
        assert!(approx(upper.fold_x, 105.0));

        let lower = layout.placement(3);
        assert_eq!(lower.slot, Slot { page: 1, row: 1 });
        assert!(approx(lower.front.y, 7.5 + 136.0 + 10.0));
        assert_eq!(lower.back.x, upper.back.x);
    }

    #[test]
    fn crop_marks_stay_outside_the_card() {
        let layout = DuplexLayout::new(PageGeometry::default());
        let card = Rect::new(20.0, 7.5, 80.0, 136.0);
        let marks = layout.crop_marks(&card);
        assert_eq!(marks.len(), 8);

        for mark in marks.iter() {
            let horizontal = approx(mark.from.y, mark.to.y);
            let vertical = approx(mark.from.x, mark.to.x);
            assert!(horizontal ^ vertical);
            assert!(!mark.dashed);

            let length = (mark.to.x - mark.from.x).abs() + (mark.to.y - mark.from.y).abs();
            assert!(approx(length, 4.0));

            // every tick lies entirely outside the card on the axis it runs along
            let (lo, hi, start, end) = if horizontal {
                (card.x, card.right(), mark.from.x, mark.to.x)
            } else {
                (card.y, card.bottom(), mark.from.y, mark.to.y)
            };
            let (a, b) = (start.min(end), start.max(end));
            assert!(b <= lo - 2.0 + 1e-3 || a >= hi + 2.0 - 1e-3);
        }
    }

    #[test]
    fn fold_guide_spans_card_height() {
        let layout = DuplexLayout::new(PageGeometry::default());
        let placement = layout.placement(1);
        let fold = layout.fold_guide(&placement);
        assert!(fold.dashed);
        assert!(approx(fold.from.x, placement.back.x - 5.0));
        assert!(approx(fold.to.y - fold.from.y, 136.0));
    }

    #[test]
    fn flow_breaks_before_bottom_margin() {
        let mut flow = FlowLayout::new(PageGeometry::default());
        // 872x712 capture at 160mm wide is ~130.6mm tall: two per page
        let (p0, r0) = flow.place(872, 712);
        let (p1, r1) = flow.place(872, 712);
        let (p2, r2) = flow.place(872, 712);

        assert_eq!((p0, p1, p2), (0, 0, 1));
        assert!(approx(r0.y, 10.0));
        assert!(approx(r0.height, 712.0 * 160.0 / 872.0));
        assert!(approx(r1.y, 10.0 + r0.height + 10.0));
        assert!(approx(r2.y, 10.0));
        assert!(approx(r0.x, 25.0));
    }

    #[test]
    fn flow_places_oversized_capture_on_fresh_page() {
        let mut flow = FlowLayout::new(PageGeometry::default());
        // taller than the printable area; placed anyway, then the next one breaks
        let (p0, _) = flow.place(100, 1000);
        let (p1, r1) = flow.place(872, 712);
        assert_eq!((p0, p1), (0, 1));
        assert!(approx(r1.y, 10.0));
    }
}
