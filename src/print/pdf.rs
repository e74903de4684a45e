//! Writing a composed job out as a PDF.

use crate::print::{ComposedDocument, Page, PageItem, Point, RasterImage, Rect, Stroke};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::Write;
use std::path::Path;

const PT_PER_MM: f32 = 72.0 / 25.4;
const STROKE_WIDTH_PT: f32 = 0.2;
const STROKE_GREY: f32 = 0.5;
const DASH_PT: f32 = 2.0;

#[derive(thiserror::Error, Debug)]
pub enum PdfError {
    #[error("failed to encode PDF content: {0}")]
    Encode(#[from] lopdf::Error),
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

fn pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c as u32 {
            // C1 controls have no WinAnsi glyph
            0x00..=0x7f | 0xa0..=0xff => c as u8,
            _ => b'?',
        })
        .collect()
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

impl ComposedDocument {
    /// Build the PDF object graph for every page.
    pub fn to_pdf(&self) -> Result<Document, PdfError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut writer = PageWriter {
            doc: &mut doc,
            page_height_pt: pt(self.page_height),
        };
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            pt(self.page_width).into(),
            pt(self.page_height).into(),
        ];
        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages.iter() {
            let (content, xobjects) = writer.page_content(page)?;
            let content = Stream::new(dictionary! {"Filter" => "FlateDecode"}, deflate(&content)?);
            let content_id = writer.doc.add_object(content);
            let page_id = writer.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        let created = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let producer = format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(producer),
            "Title" => Object::string_literal(format!("ID cards ({} export)", self.mode)),
            "CreationDate" => Object::string_literal(created),
        });
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }

    pub fn write_pdf<W: Write>(&self, out: &mut W) -> Result<(), PdfError> {
        let mut doc = self.to_pdf()?;
        doc.save_to(out)?;
        Ok(())
    }

    /// Write the whole document to `path` in one go.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PdfError> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut file = std::io::BufWriter::new(file);
        self.write_pdf(&mut file)?;
        file.flush()?;
        Ok(())
    }
}

struct PageWriter<'d> {
    doc: &'d mut Document,
    page_height_pt: f32,
}

impl PageWriter<'_> {
    /// Returns the encoded content stream and the page's image resources.
    fn page_content(&mut self, page: &Page) -> Result<(Vec<u8>, Dictionary), PdfError> {
        let mut ops: Vec<Operation> = Vec::new();
        let mut xobjects = Dictionary::new();

        for item in page.items.iter() {
            match item {
                PageItem::Image { raster, rect } => {
                    let name = format!("Im{}", xobjects.len());
                    let id = self.add_image(raster)?;
                    xobjects.set(name.as_bytes().to_vec(), id);
                    self.draw_image(&mut ops, &name, rect);
                }
                PageItem::Stroke(stroke) => self.draw_stroke(&mut ops, stroke),
                PageItem::Label { text, at, size_pt } => {
                    self.draw_label(&mut ops, text, at, *size_pt)
                }
            }
        }

        let content = Content { operations: ops };
        Ok((content.encode()?, xobjects))
    }

    fn add_image(&mut self, raster: &RasterImage) -> Result<ObjectId, PdfError> {
        let (rgb, alpha) = raster.split_alpha();
        let width = i64::from(raster.width());
        let height = i64::from(raster.height());

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        if !raster.is_opaque() {
            let smask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                deflate(&alpha)?,
            );
            let smask_id = self.doc.add_object(smask);
            dict.set("SMask", smask_id);
        }
        Ok(self.doc.add_object(Stream::new(dict, deflate(&rgb)?)))
    }

    fn draw_image(&self, ops: &mut Vec<Operation>, name: &str, rect: &Rect) {
        let x = pt(rect.x);
        let y = self.page_height_pt - pt(rect.bottom());
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                pt(rect.width).into(),
                0.into(),
                0.into(),
                pt(rect.height).into(),
                x.into(),
                y.into(),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn draw_stroke(&self, ops: &mut Vec<Operation>, stroke: &Stroke) {
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![STROKE_WIDTH_PT.into()]));
        ops.push(Operation::new(
            "RG",
            vec![STROKE_GREY.into(), STROKE_GREY.into(), STROKE_GREY.into()],
        ));
        if stroke.dashed {
            ops.push(Operation::new(
                "d",
                vec![Object::Array(vec![DASH_PT.into(), DASH_PT.into()]), 0.into()],
            ));
        }
        ops.push(Operation::new(
            "m",
            vec![pt(stroke.from.x).into(), (self.page_height_pt - pt(stroke.from.y)).into()],
        ));
        ops.push(Operation::new(
            "l",
            vec![pt(stroke.to.x).into(), (self.page_height_pt - pt(stroke.to.y)).into()],
        ));
        ops.push(Operation::new("S", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn draw_label(&self, ops: &mut Vec<Operation>, text: &str, at: &Point, size_pt: f32) {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", vec![0.into(), 0.into(), 0.into()]));
        ops.push(Operation::new("Tf", vec!["F1".into(), size_pt.into()]));
        ops.push(Operation::new(
            "Td",
            vec![pt(at.x).into(), (self.page_height_pt - pt(at.y)).into()],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::ExportMode;

    fn raster(alpha: u8) -> RasterImage {
        RasterImage::new(2, 2, [10, 20, 30, alpha].repeat(4)).expect("valid raster")
    }

    fn document() -> ComposedDocument {
        let mut first = Page::default();
        first.add_image(raster(255), Rect::new(20.0, 7.5, 80.0, 136.0));
        first.add_image(raster(128), Rect::new(110.0, 7.5, 80.0, 136.0));
        first.add_stroke(Stroke {
            from: Point::new(105.0, 7.5),
            to: Point::new(105.0, 143.5),
            dashed: true,
        });
        first.add_label("1001 - Ada Lovelace", Point::new(21.0, 5.0), 6.0);

        ComposedDocument {
            mode: ExportMode::Precision,
            page_width: 210.0,
            page_height: 297.0,
            pages: vec![first, Page::default()],
            skipped: vec![],
        }
    }

    fn images(doc: &Document) -> Vec<&Stream> {
        doc.objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| {
                s.dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map(|n| n == b"Image")
                    .unwrap_or(false)
            })
            .collect()
    }

    #[test]
    fn one_pdf_page_per_composed_page() {
        let doc = document().to_pdf().expect("can build pdf");
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn transparent_images_get_a_soft_mask() {
        let doc = document().to_pdf().expect("can build pdf");
        // two images plus one soft mask for the translucent one
        assert_eq!(images(&doc).len(), 3);
        let masked = images(&doc)
            .into_iter()
            .filter(|s| s.dict.get(b"SMask").is_ok())
            .count();
        assert_eq!(masked, 1);
    }

    #[test]
    fn page_size_is_converted_to_points() {
        let doc = document().to_pdf().expect("can build pdf");
        let (_, page_id) = doc.get_pages().into_iter().next().expect("has a page");
        let page = doc.get_dictionary(page_id).expect("page dictionary");
        let media_box = page
            .get(b"MediaBox")
            .and_then(Object::as_array)
            .expect("has media box");
        let height = media_box[3].as_float().expect("numeric height");
        assert!((height - 841.89).abs() < 0.01);
    }

    #[test]
    fn saves_to_disk() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("ID_Cards_80x136mm.pdf");
        document().save(&path).expect("can save pdf");

        let bytes = std::fs::read(&path).expect("can read pdf");
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn labels_fall_back_for_unencodable_text() {
        assert_eq!(to_win_ansi("Zoë 李"), b"Zo\xeb ?".to_vec());
    }

    #[test]
    fn c1_controls_are_not_passed_through() {
        assert_eq!(to_win_ansi("a\u{80}\u{9f}\u{a0}b"), b"a??\xa0b".to_vec());
    }
}
