//! PDF object graph and the `PdfDocument` facade that turns an
//! interpreted page list into PDF bytes.
//!
//! Content streams are built as a flat byte buffer, one operator at a
//! time, with each path batch or text placement carrying its own
//! recorded color/line-width so state stays correct across
//! `gsave`/`grestore` boundaries without a cross-batch diffing cache.

pub(crate) mod object;
pub(crate) mod syntax;

use crate::page::{Page, PageItem};
use crate::path::PathElement;
use object::{array, dictionary, write_literal_string, Dictionary, Object};
use std::io::{self, Write};
use syntax::{IndirectObjectId, PdfFile, PAGE_TREE_ID};

/// Builds and serializes the PDF object graph for a finished document.
pub(crate) struct PdfDocument {
    file: PdfFile,
    page_ids: Vec<IndirectObjectId>,
    font_id: Option<IndirectObjectId>,
}

impl PdfDocument {
    pub fn new() -> Self {
        PdfDocument {
            file: PdfFile::new(),
            page_ids: Vec::new(),
            font_id: None,
        }
    }

    fn font_resource_id(&mut self) -> IndirectObjectId {
        // A single shared Helvetica Type1 font resource, referenced by
        // every page; font embedding is out of scope.
        if self.font_id.is_none() {
            self.font_id = Some(self.file.add_dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            }));
        }
        self.font_id.unwrap()
    }

    /// Adds one page's content stream and page object, in that order.
    pub fn add_page(&mut self, page: &Page) {
        let content = content_stream_for_page(page);
        let content_id = self.file.add_stream(dictionary! {}, &content);
        let font_id = self.font_resource_id();
        let page_id = self.file.add_dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => PAGE_TREE_ID,
            "Contents" => content_id,
            "MediaBox" => array![0_i64, 0_i64, page.width_pts, page.height_pts],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        self.page_ids.push(page_id);
    }

    /// Finalizes the Catalog and Pages tree, then writes the complete
    /// file.
    pub fn write<W: Write>(mut self, w: &mut W, pdf_minor_version: u8) -> io::Result<()> {
        let page_refs: Vec<Object> = self.page_ids.iter().map(|&id| Object::from(id)).collect();
        self.file.finish(
            dictionary! {
                "Type" => "Catalog",
                "Pages" => PAGE_TREE_ID,
            },
            dictionary! {
                "Type" => "Pages",
                "Count" => self.page_ids.len(),
                "Kids" => &*page_refs,
            },
        );
        self.file.write(w, pdf_minor_version)?;
        Ok(())
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Composes one page's content-stream bytes from its `PathBatch`/
/// `TextElement` items.
fn content_stream_for_page(page: &Page) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"q\n1 w\n1 J\n1 j\n");
    for item in &page.items {
        match item {
            PageItem::Path { batch, color_rgb, line_width } => {
                write_number(&mut out, *line_width);
                out.extend_from_slice(b" w\n");
                write_color(&mut out, *color_rgb, b"rg");
                write_color(&mut out, *color_rgb, b"RG");
                write_path_batch(&mut out, batch);
            }
            PageItem::Text(text) => {
                out.extend_from_slice(b"BT\n/F1 ");
                write_number(&mut out, text.font_size);
                out.extend_from_slice(b" Tf\n");
                write_color(&mut out, text.color, b"rg");
                out.extend_from_slice(b"1 0 0 1 ");
                write_number(&mut out, text.x);
                out.push(b' ');
                write_number(&mut out, text.y);
                out.extend_from_slice(b" Tm\n");
                write_literal_string(&text.text, &mut out).unwrap();
                out.extend_from_slice(b" Tj\nET\n");
            }
        }
    }
    out.extend_from_slice(b"Q");
    out
}

fn write_path_batch(out: &mut Vec<u8>, batch: &[PathElement]) {
    for element in batch {
        match *element {
            PathElement::MoveTo { x, y } => {
                write_number(out, x);
                out.push(b' ');
                write_number(out, y);
                out.extend_from_slice(b" m\n");
            }
            PathElement::LineTo { x, y } => {
                write_number(out, x);
                out.push(b' ');
                write_number(out, y);
                out.extend_from_slice(b" l\n");
            }
            PathElement::CurveTo { c1x, c1y, c2x, c2y, x, y } => {
                for v in [c1x, c1y, c2x, c2y, x, y] {
                    write_number(out, v);
                    out.push(b' ');
                }
                out.extend_from_slice(b"c\n");
            }
            PathElement::ClosePath => out.extend_from_slice(b"h\n"),
            PathElement::PaintStroke => out.extend_from_slice(b"S\n"),
            PathElement::PaintFill => out.extend_from_slice(b"f\n"),
        }
    }
}

fn write_color(out: &mut Vec<u8>, rgb: [f64; 3], op: &[u8]) {
    for c in rgb {
        write_number(out, c);
        out.push(b' ');
    }
    out.extend_from_slice(op);
    out.push(b'\n');
}

fn write_number(out: &mut Vec<u8>, value: f64) {
    dtoa::write(out, value).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::TextElement;

    fn page_with(items: Vec<PageItem>) -> Page {
        Page { width_pts: 595.276, height_pts: 841.890, items }
    }

    #[test]
    fn empty_page_has_just_the_wrapper() {
        let page = page_with(vec![]);
        let stream = content_stream_for_page(&page);
        let text = String::from_utf8(stream).unwrap();
        assert!(text.starts_with("q\n1 w\n1 J\n1 j\n"));
        assert!(text.ends_with("Q"));
    }

    #[test]
    fn path_batch_preserves_operator_order() {
        let page = page_with(vec![PageItem::Path {
            batch: vec![
                PathElement::MoveTo { x: 1.0, y: 2.0 },
                PathElement::LineTo { x: 3.0, y: 4.0 },
                PathElement::LineTo { x: 5.0, y: 6.0 },
                PathElement::ClosePath,
                PathElement::PaintFill,
            ],
            color_rgb: [0.0, 0.0, 0.0],
            line_width: 1.0,
        }]);
        let text = String::from_utf8(content_stream_for_page(&page)).unwrap();
        let m = text.find(" m\n").unwrap();
        let l1 = text.find(" l\n").unwrap();
        let l2 = text.rfind(" l\n").unwrap();
        let h = text.find("h\n").unwrap();
        let f = text.find("f\n").unwrap();
        assert!(m < l1 && l1 < l2 && l2 < h && h < f);
        assert!(!text.contains(" c\n"));
        assert!(!text.contains("BT"));
    }

    #[test]
    fn text_item_produces_bt_tj_et() {
        let page = page_with(vec![PageItem::Text(TextElement {
            x: 10.0,
            y: 20.0,
            text: b"Hello".to_vec(),
            font_name: "Helvetica".to_string(),
            font_size: 12.0,
            color: [0.0, 0.0, 0.0],
        })]);
        let text = String::from_utf8(content_stream_for_page(&page)).unwrap();
        assert!(text.contains("BT\n"));
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("ET\n"));
    }

    #[test]
    fn full_document_has_five_objects_for_one_empty_page() {
        let mut doc = PdfDocument::new();
        doc.add_page(&page_with(vec![]));
        let mut out = Vec::new();
        doc.write(&mut out, 7).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches(" 0 obj\n").count(), 5); // Catalog, Pages, Page, Contents, Font
        assert!(text.starts_with("%PDF-1.7\n"));
    }
}
