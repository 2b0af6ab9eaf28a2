//! Coordinate mapper: PS user space → PDF user space.

/// Bounding box parsed from `%%BoundingBox:`, or a default A4-sized box if
/// absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub valid: bool,
}

impl Default for BoundingBox {
    fn default() -> Self {
        // Default A4-sized box.
        BoundingBox { x1: 0.0, y1: 0.0, x2: 595.276, y2: 841.890, valid: false }
    }
}

/// Uniform scale + centering offsets + Y-flip, derived once per document
/// after the DSC header is parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub pdf_page_height: f64,
}

impl CoordinateTransform {
    /// Computes the transform for a given PS bounding box and target
    /// paper size. A degenerate (zero-area) bbox falls back to identity
    /// scale, zero offsets, and paper dimensions set to the bbox itself.
    pub fn new(bbox: BoundingBox, paper_w: f64, paper_h: f64) -> Self {
        let ps_w = bbox.x2 - bbox.x1;
        let ps_h = bbox.y2 - bbox.y1;
        if ps_w <= 0.0 || ps_h <= 0.0 {
            return CoordinateTransform {
                scale: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
                pdf_page_height: bbox.y2 - bbox.y1,
            };
        }
        let scale = (paper_w / ps_w).min(paper_h / ps_h);
        let sw = ps_w * scale;
        let sh = ps_h * scale;
        let offset_x = (paper_w - sw) / 2.0 - bbox.x1 * scale;
        let offset_y = (paper_h - sh) / 2.0 - bbox.y1 * scale;
        CoordinateTransform {
            scale,
            offset_x,
            offset_y,
            pdf_page_height: paper_h,
        }
    }

    /// Maps a PS-space point to PDF user space.
    ///
    /// The Y-flip here (`H - (ys*scale + oy)`) matches PDF's top-down
    /// page convention; see DESIGN.md for the open question about edge
    /// cases around it.
    pub fn map(&self, xs: f64, ys: f64) -> (f64, f64) {
        let xp = xs * self.scale + self.offset_x;
        let yp = self.pdf_page_height - (ys * self.scale + self.offset_y);
        (xp, yp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_like_transform_on_matching_sizes() {
        let bbox = BoundingBox { x1: 0.0, y1: 0.0, x2: 100.0, y2: 100.0, valid: true };
        let t = CoordinateTransform::new(bbox, 100.0, 100.0);
        let (x, y) = t.map(0.0, 0.0);
        assert!((x - 0.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_bbox_falls_back_to_identity() {
        let bbox = BoundingBox { x1: 5.0, y1: 5.0, x2: 5.0, y2: 5.0, valid: true };
        let t = CoordinateTransform::new(bbox, 595.276, 841.890);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.offset_x, 0.0);
        assert_eq!(t.offset_y, 0.0);
    }

    #[test]
    fn scale_uses_min_of_both_axes() {
        let bbox = BoundingBox { x1: 0.0, y1: 0.0, x2: 200.0, y2: 50.0, valid: true };
        let t = CoordinateTransform::new(bbox, 100.0, 100.0);
        assert!((t.scale - 0.5).abs() < 1e-9);
    }
}
