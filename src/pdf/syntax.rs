//! File structure: header, indirect objects, cross-reference table,
//! trailer. A single linear pass over a byte sink, offsets recorded as
//! objects are emitted.
//!
//! A `CountingWrite` wrapper, a zero-padded 20-byte xref entry writer,
//! and object IDs assigned in a fixed prefix (Catalog = 1, Pages
//! tree = 2).

use super::object::{Dictionary, Object};
use itoa::write as itoa;
use std::io::{self, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct IndirectObjectId(pub u32);

pub(crate) const CATALOG_ID: IndirectObjectId = IndirectObjectId(1);
pub(crate) const PAGE_TREE_ID: IndirectObjectId = IndirectObjectId(2);
const FIRST_AVAILABLE_ID: IndirectObjectId = IndirectObjectId(3);

/// Accumulates indirect object bodies and assigns their IDs; `write`
/// then emits the whole file in one linear pass.
pub(crate) struct PdfFile {
    // Index 0 and 1 are reserved for the Catalog and Pages tree, whose
    // bodies aren't known until every page has been added; they're
    // patched in by `finish` just before `write`.
    objects: Vec<Vec<u8>>,
    next_id: IndirectObjectId,
}

impl PdfFile {
    pub fn new() -> Self {
        PdfFile {
            objects: vec![Vec::new(), Vec::new()],
            next_id: FIRST_AVAILABLE_ID,
        }
    }

    pub fn add_dictionary(&mut self, dict: Dictionary) -> IndirectObjectId {
        let mut obj = Vec::new();
        dict.write(&mut obj).unwrap();
        self.add_indirect_object(obj)
    }

    pub fn add_stream(&mut self, meta: Dictionary, contents: &[u8]) -> IndirectObjectId {
        let length_pair: [(&[u8], Object); 1] =
            [(b"Length".as_ref(), Object::from(contents.len()))];
        let linked = Dictionary { prev: Some(&meta), pairs: &length_pair };
        let mut obj = Vec::new();
        linked.write(&mut obj).unwrap();
        obj.extend_from_slice(b"\nstream\n");
        obj.extend_from_slice(contents);
        obj.extend_from_slice(b"\nendstream");
        self.add_indirect_object(obj)
    }

    fn add_indirect_object(&mut self, serialized_contents: Vec<u8>) -> IndirectObjectId {
        self.objects.push(serialized_contents);
        let id = self.next_id;
        self.next_id.0 += 1;
        id
    }

    /// Fills in the Catalog (object 1) and Pages tree (object 2) bodies,
    /// now that every page and the font resource have been added.
    pub fn finish(&mut self, catalog: Dictionary, page_tree: Dictionary) {
        let mut catalog_bytes = Vec::new();
        catalog.write(&mut catalog_bytes).unwrap();
        self.objects[0] = catalog_bytes;

        let mut page_tree_bytes = Vec::new();
        page_tree.write(&mut page_tree_bytes).unwrap();
        self.objects[1] = page_tree_bytes;
    }

    /// Writes header, objects, xref table, and trailer.
    /// `pdf_minor_version` drives the header (`%PDF-1.<minor>`).
    pub fn write<W: Write>(&self, w: &mut W, pdf_minor_version: u8) -> io::Result<u64> {
        let total_objects = self.objects.len();
        let mut offsets = Vec::with_capacity(total_objects);
        let startxref;
        {
            let mut w = CountingWrite { inner: w, bytes_written: 0 };
            write!(w, "%PDF-1.{}\n", pdf_minor_version)?;
            // Binary comment marking the file as binary.
            w.write_all(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n'])?;

            for (index, contents) in self.objects.iter().enumerate() {
                let object_id = index as u32 + 1;
                offsets.push(w.bytes_written as u32);
                itoa(&mut w, object_id)?;
                w.write_all(b" 0 obj\n")?;
                w.write_all(contents)?;
                w.write_all(b"\nendobj\n\n")?;
            }

            startxref = w.bytes_written as u64;
        }

        // Cross-reference table: exactly one 20-byte line per object,
        // plus the mandatory free head entry.
        let xref_table_size = total_objects + 1;
        w.write_all(b"xref\n0 ")?;
        itoa(&mut *w, xref_table_size)?;
        w.write_all(b"\n0000000000 65535 f \n")?;
        for &offset in &offsets {
            let mut buffer: [u8; 20] = *b"0000000000 00000 n \n";
            write_zero_padded_10(offset, &mut buffer);
            w.write_all(&buffer)?;
        }

        w.write_all(b"trailer\n")?;
        let trailer = Dictionary {
            prev: None,
            pairs: &[
                (b"Size".as_ref(), Object::from(xref_table_size)),
                (b"Root".as_ref(), Object::from(CATALOG_ID)),
            ],
        };
        trailer.write(w)?;
        w.write_all(b"\nstartxref\n")?;
        itoa(&mut *w, startxref)?;
        w.write_all(b"\n%%EOF\n")?;
        Ok(startxref)
    }
}

impl Default for PdfFile {
    fn default() -> Self {
        Self::new()
    }
}

fn write_zero_padded_10(mut value: u32, buffer: &mut [u8; 20]) {
    for byte in buffer[..10].iter_mut().rev() {
        *byte = b"0123456789"[(value % 10) as usize];
        value /= 10;
    }
}

/// Wraps a `Write` and tracks the number of bytes written so far, so
/// indirect-object offsets can be recorded as they're emitted rather
/// than computed after the fact.
pub(crate) struct CountingWrite<'a, W: Write + 'a> {
    inner: &'a mut W,
    bytes_written: usize,
}

impl<'a, W: Write> Write for CountingWrite<'a, W> {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buffer);
        if let Ok(bytes) = result {
            self.bytes_written += bytes;
        }
        result
    }

    fn write_all(&mut self, buffer: &[u8]) -> io::Result<()> {
        self.bytes_written += buffer.len();
        self.inner.write_all(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::object::dictionary;

    #[test]
    fn xref_entries_are_20_bytes() {
        let mut file = PdfFile::new();
        let id = file.add_dictionary(dictionary! { "Type" => "Page" });
        assert_eq!(id, FIRST_AVAILABLE_ID);
        file.finish(
            dictionary! { "Type" => "Catalog", "Pages" => PAGE_TREE_ID },
            dictionary! { "Type" => "Pages", "Count" => 0_i64 },
        );
        let mut out = Vec::new();
        file.write(&mut out, 7).unwrap();
        let text = String::from_utf8_lossy(&out);
        let xref_start = text.find("xref\n").unwrap();
        let trailer_start = text.find("trailer\n").unwrap();
        // The subsection header line (`0 <N+1>`) isn't a fixed-width
        // entry; only the free-head line and the per-object lines after
        // it are required to be exactly 20 bytes.
        for line in text[xref_start + 5..trailer_start].lines().skip(1) {
            if line.is_empty() {
                continue;
            }
            assert_eq!(line.len() + 1, 20, "line {:?} is not 20 bytes incl. newline", line);
        }
    }

    #[test]
    fn header_and_trailer_shape() {
        let mut file = PdfFile::new();
        file.finish(
            dictionary! { "Type" => "Catalog", "Pages" => PAGE_TREE_ID },
            dictionary! { "Type" => "Pages", "Count" => 0_i64 },
        );
        let mut out = Vec::new();
        file.write(&mut out, 4).unwrap();
        assert!(out.starts_with(b"%PDF-1.4\n"));
        assert!(out.ends_with(b"%%EOF\n"));
    }
}
