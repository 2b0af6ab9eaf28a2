//! Path accumulator.

/// One element of an in-progress path, in PDF user-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CurveTo { c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64 },
    ClosePath,
    PaintStroke,
    PaintFill,
}

/// A single buffer of `PathElement`s representing the path set currently
/// under construction. `flush` moves the buffer (terminated by a paint
/// marker) out to the caller; `discard` clears it without emitting
/// anything (used by `newpath`).
#[derive(Debug, Default)]
pub struct PathAccumulator {
    elements: Vec<PathElement>,
    has_current_point: bool,
}

impl PathAccumulator {
    pub fn new() -> Self {
        PathAccumulator::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.elements.push(PathElement::MoveTo { x, y });
        self.has_current_point = true;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if !self.has_current_point {
            // No prior MoveTo: treat as a MoveTo.
            self.move_to(x, y);
            return;
        }
        self.elements.push(PathElement::LineTo { x, y });
    }

    pub fn curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        if !self.has_current_point {
            self.move_to(x, y);
            return;
        }
        self.elements.push(PathElement::CurveTo { c1x, c1y, c2x, c2y, x, y });
    }

    pub fn close_path(&mut self) {
        if !matches!(self.elements.last(), Some(PathElement::ClosePath)) {
            self.elements.push(PathElement::ClosePath);
        }
    }

    /// Appends the terminator and returns the batch, leaving the
    /// accumulator empty. Returns `None` if nothing was drawn.
    pub fn flush(&mut self, stroke: bool) -> Option<Vec<PathElement>> {
        if self.elements.is_empty() {
            return None;
        }
        self.elements.push(if stroke { PathElement::PaintStroke } else { PathElement::PaintFill });
        self.has_current_point = false;
        Some(std::mem::take(&mut self.elements))
    }

    pub fn discard(&mut self) {
        self.elements.clear();
        self.has_current_point = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_to_without_moveto_becomes_moveto() {
        let mut acc = PathAccumulator::new();
        acc.line_to(1.0, 2.0);
        let batch = acc.flush(true).unwrap();
        assert_eq!(batch[0], PathElement::MoveTo { x: 1.0, y: 2.0 });
    }

    #[test]
    fn close_path_at_most_once() {
        let mut acc = PathAccumulator::new();
        acc.move_to(0.0, 0.0);
        acc.close_path();
        acc.close_path();
        let batch = acc.flush(true).unwrap();
        let closes = batch.iter().filter(|e| matches!(e, PathElement::ClosePath)).count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn discard_clears_without_emitting() {
        let mut acc = PathAccumulator::new();
        acc.move_to(0.0, 0.0);
        acc.discard();
        assert!(acc.flush(true).is_none());
    }

    #[test]
    fn flush_on_empty_is_none() {
        let mut acc = PathAccumulator::new();
        assert!(acc.flush(false).is_none());
    }
}
