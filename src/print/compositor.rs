//! Print job composition.
//!
//! A job walks the records strictly in order: capture, place, report
//! progress, pause briefly, next. Captures never overlap. Nothing is written
//! until every record has been processed; the caller receives a
//! [`ComposedDocument`] only when the whole job succeeded.
//!
//! A record whose capture fails is logged and left out, but it still consumes
//! its slot: in the duplex layout the records after it keep the page and row
//! they would have had.

use crate::card::{CardFace, Markup};
use crate::print::layout::{DuplexLayout, FlowLayout};
use crate::print::progress::{percent_complete, ProgressReporter};
use crate::print::{
    CaptureError, CaptureOptions, ComposedDocument, ExportMode, FaceRasterizer, GeometryError,
    Page, PageGeometry, RasterImage,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PIXEL_DENSITY: f32 = 2.0;
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(10);
/// Largest accepted capture density.
pub const MAX_PIXEL_DENSITY: f32 = 16.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("there are no records to print")]
    NoRecords,
    #[error("invalid page layout: {0}")]
    Geometry(#[from] GeometryError),
    #[error("pixel density {0} must be greater than 0 and at most {max}", max = MAX_PIXEL_DENSITY)]
    PixelDensity(f32),
    #[error("cancelled before record {index}")]
    Cancelled { index: usize },
}

/// What to capture for a record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CardView {
    Face(CardFace),
    /// Front and back together, as one capture
    Pair,
}

impl CardView {
    pub fn name(&self) -> &'static str {
        match self {
            CardView::Face(face) => face.name(),
            CardView::Pair => "pair",
        }
    }
}

/// The records of a job, as markup the compositor can capture.
pub trait CardSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Caption printed beside the record's cards.
    fn label(&self, index: usize) -> String;

    fn markup(&self, index: usize, view: CardView) -> Markup;
}

pub struct Compositor<'r, R: FaceRasterizer> {
    rasterizer: &'r R,
    geometry: PageGeometry,
    pixel_density: f32,
    pause: Duration,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'r, R: FaceRasterizer> Compositor<'r, R> {
    pub fn new(rasterizer: &'r R, geometry: PageGeometry) -> Compositor<'r, R> {
        Compositor {
            rasterizer,
            geometry,
            pixel_density: DEFAULT_PIXEL_DENSITY,
            pause: DEFAULT_PAUSE,
            cancel: None,
        }
    }

    pub fn pixel_density(mut self, pixel_density: f32) -> Self {
        self.pixel_density = pixel_density;
        self
    }

    /// Yield between records so a progress display can repaint.
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Abort the job at the next record boundary once `flag` is set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn compose<S: CardSource + ?Sized>(
        &self,
        source: &S,
        mode: ExportMode,
        progress: &dyn ProgressReporter,
    ) -> Result<ComposedDocument, ComposeError> {
        self.geometry.validate(mode)?;
        if !(self.pixel_density > 0.0 && self.pixel_density <= MAX_PIXEL_DENSITY) {
            return Err(ComposeError::PixelDensity(self.pixel_density));
        }
        if source.is_empty() {
            return Err(ComposeError::NoRecords);
        }

        log::info!("Composing {} card(s) in {mode} mode", source.len());
        let mut skipped = Vec::new();
        let pages = match mode {
            ExportMode::Precision => self.compose_duplex(source, progress, &mut skipped)?,
            ExportMode::Simple => self.compose_flow(source, progress, &mut skipped)?,
        };
        log::info!(
            "Composed {} page(s), {} card(s) skipped",
            pages.len(),
            skipped.len()
        );

        Ok(ComposedDocument {
            mode,
            page_width: self.geometry.page_width,
            page_height: self.geometry.page_height,
            pages,
            skipped,
        })
    }

    fn compose_duplex<S: CardSource + ?Sized>(
        &self,
        source: &S,
        progress: &dyn ProgressReporter,
        skipped: &mut Vec<usize>,
    ) -> Result<Vec<Page>, ComposeError> {
        let layout = DuplexLayout::new(self.geometry);
        let total = source.len();
        let mut pages: Vec<Page> = Vec::with_capacity(DuplexLayout::page_count(total));

        for index in 0..total {
            self.check_cancelled(index)?;
            if index == 0 || DuplexLayout::starts_page(index) {
                pages.push(Page::default());
            }

            let label = source.label(index);
            let placement = layout.placement(index);
            let captured = self
                .capture(source, index, CardView::Face(CardFace::Front))
                .and_then(|front| {
                    let back = self.capture(source, index, CardView::Face(CardFace::Back))?;
                    Ok((front, back))
                });

            match captured {
                Ok((front, back)) => {
                    let page = &mut pages[placement.slot.page];
                    page.add_image(front, placement.front);
                    page.add_image(back, placement.back);
                    for card in [placement.front, placement.back] {
                        for mark in layout.crop_marks(&card) {
                            page.add_stroke(mark);
                        }
                    }
                    page.add_stroke(layout.fold_guide(&placement));
                    page.add_label(&label, placement.label, self.geometry.label_size_pt);
                }
                Err(e) => {
                    log::warn!("Skipping card {index} ({label}): {e}");
                    skipped.push(index);
                }
            }

            self.finish_record(index, total, &label, progress);
        }

        Ok(pages)
    }

    fn compose_flow<S: CardSource + ?Sized>(
        &self,
        source: &S,
        progress: &dyn ProgressReporter,
        skipped: &mut Vec<usize>,
    ) -> Result<Vec<Page>, ComposeError> {
        let mut flow = FlowLayout::new(self.geometry);
        let total = source.len();
        let mut pages = vec![Page::default()];

        for index in 0..total {
            self.check_cancelled(index)?;
            let label = source.label(index);

            match self.capture(source, index, CardView::Pair) {
                Ok(raster) => {
                    let (page, rect) = flow.place(raster.width(), raster.height());
                    while pages.len() <= page {
                        pages.push(Page::default());
                    }
                    pages[page].add_image(raster, rect);
                }
                Err(e) => {
                    log::warn!("Skipping card {index} ({label}): {e}");
                    skipped.push(index);
                }
            }

            self.finish_record(index, total, &label, progress);
        }

        Ok(pages)
    }

    fn check_cancelled(&self, index: usize) -> Result<(), ComposeError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                log::warn!("Job cancelled at record {index}; discarding output");
                Err(ComposeError::Cancelled { index })
            }
            _ => Ok(()),
        }
    }

    fn capture<S: CardSource + ?Sized>(
        &self,
        source: &S,
        index: usize,
        view: CardView,
    ) -> Result<RasterImage, CaptureError> {
        let markup = source.markup(index, view);
        let options = CaptureOptions::for_markup(&markup, self.pixel_density);
        log::debug!("capturing {} of card {index}", view.name());
        self.rasterizer.capture(&markup, &options)
    }

    fn finish_record(
        &self,
        index: usize,
        total: usize,
        label: &str,
        progress: &dyn ProgressReporter,
    ) {
        progress.report(percent_complete(index, total), label);
        if !self.pause.is_zero() {
            std::thread::sleep(self.pause);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::markup::{CARD_HEIGHT, CARD_WIDTH};
    use crate::print::progress::Silent;
    use crate::print::{PageItem, Rect};
    use std::cell::RefCell;
    use std::collections::HashSet;

    struct Roster(usize);

    impl CardSource for Roster {
        fn len(&self) -> usize {
            self.0
        }

        fn label(&self, index: usize) -> String {
            format!("record {index}")
        }

        fn markup(&self, index: usize, view: CardView) -> Markup {
            let (width, height) = match view {
                CardView::Pair => (872, 712),
                CardView::Face(_) => (CARD_WIDTH, CARD_HEIGHT),
            };
            Markup {
                width,
                height,
                svg: format!("{index}/{}", view.name()),
            }
        }
    }

    /// Produces a tiny raster per capture and fails the listed captures.
    #[derive(Default)]
    struct FakeRasterizer {
        failing: HashSet<String>,
        log: RefCell<Vec<String>>,
    }

    impl FakeRasterizer {
        fn failing(captures: &[&str]) -> FakeRasterizer {
            FakeRasterizer {
                failing: captures.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl FaceRasterizer for FakeRasterizer {
        fn capture(
            &self,
            markup: &Markup,
            options: &CaptureOptions,
        ) -> Result<RasterImage, CaptureError> {
            self.log.borrow_mut().push(markup.svg.clone());
            if self.failing.contains(&markup.svg) {
                return Err(CaptureError::EmptyRaster {
                    width: 0,
                    height: 0,
                });
            }
            let (w, h) = options.pixel_size();
            RasterImage::new(w, h, vec![255; (w * h * 4) as usize])
        }
    }

    #[derive(Default)]
    struct Recorder(RefCell<Vec<u8>>);

    impl ProgressReporter for Recorder {
        fn report(&self, percent: u8, _: &str) {
            self.0.borrow_mut().push(percent);
        }
    }

    fn compositor(rasterizer: &FakeRasterizer) -> Compositor<'_, FakeRasterizer> {
        Compositor::new(rasterizer, PageGeometry::default())
            .pixel_density(0.05)
            .pause(Duration::ZERO)
    }

    fn image_rects(page: &Page) -> Vec<Rect> {
        page.images().copied().collect()
    }

    #[test]
    fn three_records_make_two_pages() {
        let rasterizer = FakeRasterizer::default();
        let doc = compositor(&rasterizer)
            .compose(&Roster(3), ExportMode::Precision, &Silent)
            .expect("can compose");

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(
            doc.pages[0].labels().collect::<Vec<_>>(),
            vec!["record 0", "record 1"]
        );
        assert_eq!(doc.pages[1].labels().collect::<Vec<_>>(), vec!["record 2"]);

        let first = image_rects(&doc.pages[0]);
        assert_eq!(first[0], Rect::new(20.0, 7.5, 80.0, 136.0));
        assert_eq!(first[1], Rect::new(110.0, 7.5, 80.0, 136.0));
        assert_eq!(first[2].y, 7.5 + 136.0 + 10.0);
        assert_eq!(image_rects(&doc.pages[1])[0].y, 7.5);
    }

    #[test]
    fn each_card_gets_crop_marks_and_each_pair_a_fold() {
        let rasterizer = FakeRasterizer::default();
        let doc = compositor(&rasterizer)
            .compose(&Roster(2), ExportMode::Precision, &Silent)
            .expect("can compose");
        let strokes: Vec<_> = doc.pages[0].strokes().collect();
        assert_eq!(strokes.len(), 2 * (2 * 8 + 1));
        assert_eq!(strokes.iter().filter(|s| s.dashed).count(), 2);
    }

    #[test]
    fn failed_capture_keeps_later_slots() {
        let ok = FakeRasterizer::default();
        let baseline = compositor(&ok)
            .compose(&Roster(3), ExportMode::Precision, &Silent)
            .expect("can compose");

        let broken = FakeRasterizer::failing(&["1/back"]);
        let doc = compositor(&broken)
            .compose(&Roster(3), ExportMode::Precision, &Silent)
            .expect("can compose despite failure");

        assert_eq!(doc.pages.len(), 2);
        // record 1 left an empty row: only record 0 is on page one
        assert_eq!(image_rects(&doc.pages[0]).len(), 2);
        assert_eq!(doc.pages[0].labels().collect::<Vec<_>>(), vec!["record 0"]);
        // record 2 is exactly where it would have been
        assert_eq!(doc.pages[1], baseline.pages[1]);
        assert_eq!(doc.skipped, vec![1]);
        assert!(baseline.skipped.is_empty());
    }

    #[test]
    fn failed_first_record_on_a_page_still_opens_it() {
        let broken = FakeRasterizer::failing(&["2/front"]);
        let doc = compositor(&broken)
            .compose(&Roster(4), ExportMode::Precision, &Silent)
            .expect("can compose");
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].labels().collect::<Vec<_>>(), vec!["record 3"]);
        assert_eq!(image_rects(&doc.pages[1])[0].y, 7.5 + 136.0 + 10.0);
        // the back of a record whose front failed is never captured
        assert!(!broken.log.borrow().contains(&"2/back".to_string()));
    }

    #[test]
    fn all_failed_records_leave_only_empty_pages() {
        let broken = FakeRasterizer::failing(&["0/front", "1/front", "2/front"]);
        let doc = compositor(&broken)
            .compose(&Roster(3), ExportMode::Precision, &Silent)
            .expect("can compose");
        assert_eq!(doc.pages.len(), 2);
        assert!(doc.pages.iter().all(Page::is_empty));
        assert_eq!(doc.skipped, vec![0, 1, 2]);
    }

    #[test]
    fn captures_are_sequential_and_in_order() {
        let rasterizer = FakeRasterizer::default();
        compositor(&rasterizer)
            .compose(&Roster(2), ExportMode::Precision, &Silent)
            .expect("can compose");
        assert_eq!(
            *rasterizer.log.borrow(),
            vec!["0/front", "0/back", "1/front", "1/back"]
        );
    }

    #[test]
    fn progress_reaches_100_once_at_the_end() {
        let rasterizer = FakeRasterizer::failing(&["1/front"]);
        let recorder = Recorder::default();
        compositor(&rasterizer)
            .compose(&Roster(3), ExportMode::Precision, &recorder)
            .expect("can compose");
        assert_eq!(*recorder.0.borrow(), vec![33, 67, 100]);
    }

    #[test]
    fn cancelled_job_returns_no_document() {
        let rasterizer = FakeRasterizer::default();
        let flag = Arc::new(AtomicBool::new(true));
        let result = compositor(&rasterizer)
            .cancel_flag(flag)
            .compose(&Roster(3), ExportMode::Precision, &Silent);
        assert_eq!(result, Err(ComposeError::Cancelled { index: 0 }));
        assert!(rasterizer.log.borrow().is_empty());
    }

    #[test]
    fn cancellation_is_checked_between_records() {
        struct CancelAfterFirst(Arc<AtomicBool>);
        impl ProgressReporter for CancelAfterFirst {
            fn report(&self, _: u8, _: &str) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let rasterizer = FakeRasterizer::default();
        let flag = Arc::new(AtomicBool::new(false));
        let result = compositor(&rasterizer)
            .cancel_flag(flag.clone())
            .compose(&Roster(3), ExportMode::Simple, &CancelAfterFirst(flag));
        assert_eq!(result, Err(ComposeError::Cancelled { index: 1 }));
        assert_eq!(*rasterizer.log.borrow(), vec!["0/pair"]);
    }

    #[test]
    fn empty_job_is_an_error() {
        let rasterizer = FakeRasterizer::default();
        let result = compositor(&rasterizer).compose(&Roster(0), ExportMode::Simple, &Silent);
        assert_eq!(result, Err(ComposeError::NoRecords));
    }

    #[test]
    fn invalid_geometry_is_an_error() {
        let rasterizer = FakeRasterizer::default();
        let geometry = PageGeometry {
            card_width: 120.0,
            ..PageGeometry::default()
        };
        let result = Compositor::new(&rasterizer, geometry)
            .pause(Duration::ZERO)
            .compose(&Roster(1), ExportMode::Precision, &Silent);
        assert!(matches!(result, Err(ComposeError::Geometry(_))));
    }

    #[test]
    fn out_of_range_pixel_density_is_an_error() {
        let rasterizer = FakeRasterizer::default();
        for density in [0.0, -1.0, f32::NAN, f32::INFINITY, 1000.0] {
            let result = compositor(&rasterizer)
                .pixel_density(density)
                .compose(&Roster(3), ExportMode::Precision, &Silent);
            assert!(
                matches!(result, Err(ComposeError::PixelDensity(_))),
                "density {density}"
            );
        }
        assert!(rasterizer.log.borrow().is_empty());
    }

    #[test]
    fn simple_mode_flows_pairs_down_the_page() {
        let rasterizer = FakeRasterizer::failing(&["1/pair"]);
        let doc = compositor(&rasterizer)
            .compose(&Roster(4), ExportMode::Simple, &Silent)
            .expect("can compose");

        // record 1 failed, so records 0 and 2 share page one and 3 starts page two
        assert_eq!(doc.pages.len(), 2);
        let first = image_rects(&doc.pages[0]);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].width, 160.0);
        let expected_height = 36.0 * 160.0 / 44.0; // 712x872 at density 0.05 is 36x44 px
        assert!((first[0].height - expected_height).abs() < 1e-3);
        assert!(doc.pages[0]
            .items
            .iter()
            .all(|item| matches!(item, PageItem::Image { .. })));
    }
}
