//! PS interpreter: drives the tokenizer and graphics state, parses the
//! DSC prelude, and reacts to paint operators, `showpage`, and
//! coordinate-transform setup.

use crate::coords::{BoundingBox, CoordinateTransform};
use crate::errors::Result;
use crate::gstate::GraphicsStateStack;
use crate::page::{Page, PageItem, TextElement};
use crate::path::PathAccumulator;
use crate::token::{Token, Tokenizer};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Every operator this interpreter recognizes, long and short forms
/// alike. Anything else is an unknown operator: logged and skipped.
pub const RECOGNIZED_OPERATORS: &[&str] = &[
    "gsave", "q",
    "grestore", "Q",
    "setlinewidth", "w",
    "setrgbcolor", "rg",
    "setgray",
    "moveto", "m",
    "lineto", "l",
    "curveto", "c",
    "closepath", "h",
    "newpath",
    "stroke", "s", "S",
    "fill", "f", "F",
    "findfont",
    "scalefont",
    "setfont",
    "show", "Tj",
    "translate", "scale", "rotate", "concat",
    "showpage",
    "setpagedevice",
];

/// A value on the PS operand stack.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    String(Vec<u8>),
    Name(String),
}

/// Parsed DSC prelude fields.
#[derive(Debug, Clone, Default)]
pub struct DscInfo {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub bbox: Option<BoundingBox>,
}

/// Result of interpreting one PS/EPS input: the finished pages plus the
/// DSC metadata gathered from its prelude.
#[derive(Debug, Clone, Default)]
pub struct InterpretedDocument {
    pub pages: Vec<Page>,
    pub dsc: DscInfo,
    pub warnings: Vec<String>,
}

pub struct Interpreter {
    path: PathBuf,
    operand_stack: Vec<Operand>,
    gstate: GraphicsStateStack,
    path_acc: PathAccumulator,
    pages: Vec<Page>,
    current_page: Page,
    transform: Option<CoordinateTransform>,
    dsc: DscInfo,
    paper_w: f64,
    paper_h: f64,
    warnings: Vec<String>,
    seen_first_operator: bool,
}

impl Interpreter {
    pub fn new(path: impl AsRef<Path>, paper_w: f64, paper_h: f64) -> Self {
        Interpreter {
            path: path.as_ref().to_path_buf(),
            operand_stack: Vec::new(),
            gstate: GraphicsStateStack::new(),
            path_acc: PathAccumulator::new(),
            pages: Vec::new(),
            current_page: Page::new(paper_w, paper_h),
            transform: None,
            dsc: DscInfo::default(),
            paper_w,
            paper_h,
            warnings: Vec::new(),
            seen_first_operator: false,
        }
    }

    fn warn(&mut self, line: usize, msg: impl Into<String>) {
        let msg = msg.into();
        warn!(file = %self.path.display(), line, "{}", msg);
        self.warnings.push(format!("{}:{}: {}", self.path.display(), line, msg));
    }

    fn transform(&self) -> CoordinateTransform {
        self.transform.unwrap_or_else(|| {
            CoordinateTransform::new(self.dsc.bbox.unwrap_or_default(), self.paper_w, self.paper_h)
        })
    }

    fn finalize_transform_if_needed(&mut self) {
        if self.transform.is_none() {
            self.transform = Some(CoordinateTransform::new(
                self.dsc.bbox.unwrap_or_default(),
                self.paper_w,
                self.paper_h,
            ));
        }
    }

    fn apply_dsc_comment(&mut self, text: &str) {
        if let Some(rest) = text.strip_prefix("Title:") {
            self.dsc.title = Some(rest.trim().to_string());
        } else if let Some(rest) = text.strip_prefix("Creator:") {
            self.dsc.creator = Some(rest.trim().to_string());
        } else if let Some(rest) = text.strip_prefix("BoundingBox:") {
            let nums: Vec<f64> = rest
                .split_whitespace()
                .filter_map(|tok| tok.parse::<f64>().ok())
                .collect();
            if nums.len() == 4 {
                self.dsc.bbox = Some(BoundingBox {
                    x1: nums[0],
                    y1: nums[1],
                    x2: nums[2],
                    y2: nums[3],
                    valid: true,
                });
            }
        }
        // %%PageSize: is accepted and otherwise ignored.
    }

    fn pop_number(&mut self, line: usize, op: &str) -> Option<f64> {
        match self.operand_stack.pop() {
            Some(Operand::Number(n)) => Some(n),
            Some(_) | None => {
                self.warn(line, format!("operand stack underflow for `{op}`"));
                None
            }
        }
    }

    fn pop_numbers(&mut self, line: usize, op: &str, n: usize) -> Option<Vec<f64>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.pop_number(line, op)?);
        }
        out.reverse();
        Some(out)
    }

    fn pop_string(&mut self, line: usize, op: &str) -> Option<Vec<u8>> {
        match self.operand_stack.pop() {
            Some(Operand::String(s)) => Some(s),
            Some(_) | None => {
                self.warn(line, format!("operand stack underflow for `{op}`"));
                None
            }
        }
    }

    fn pop_name(&mut self, line: usize, op: &str) -> Option<String> {
        match self.operand_stack.pop() {
            Some(Operand::Name(n)) => Some(n),
            Some(_) | None => {
                self.warn(line, format!("operand stack underflow for `{op}`"));
                None
            }
        }
    }

    fn commit_path(&mut self, stroke: bool) {
        if let Some(batch) = self.path_acc.flush(stroke) {
            let state = self.gstate.current().state;
            self.current_page.items.push(PageItem::Path {
                batch,
                color_rgb: state.color_rgb,
                line_width: state.line_width,
            });
        }
    }

    fn do_showpage(&mut self) {
        // An in-progress path that was never explicitly painted is
        // dropped, matching real `showpage` behavior (no implicit paint).
        self.path_acc.discard();
        let finished = std::mem::replace(
            &mut self.current_page,
            Page::new(self.paper_w, self.paper_h),
        );
        self.pages.push(finished);
    }

    fn dispatch(&mut self, op: &str, line: usize) {
        match op {
            "gsave" | "q" => {
                if self.gstate.push().is_err() {
                    self.warn(line, "graphics state stack overflow, ignoring gsave");
                }
            }
            "grestore" | "Q" => self.gstate.pop(),
            "setlinewidth" | "w" => {
                if let Some(v) = self.pop_number(line, op) {
                    self.gstate.current_mut().state.line_width = v;
                }
            }
            "setrgbcolor" | "rg" => {
                if let Some(v) = self.pop_numbers(line, op, 3) {
                    self.gstate.current_mut().state.color_rgb = [v[0], v[1], v[2]];
                }
            }
            "setgray" => {
                if let Some(g) = self.pop_number(line, op) {
                    self.gstate.current_mut().state.color_rgb = [g, g, g];
                }
            }
            "moveto" | "m" => {
                if let Some(v) = self.pop_numbers(line, op, 2) {
                    let (x, y) = (v[0], v[1]);
                    self.gstate.current_mut().state.current_x = x;
                    self.gstate.current_mut().state.current_y = y;
                    let (xp, yp) = self.transform().map(x, y);
                    self.path_acc.move_to(xp, yp);
                }
            }
            "lineto" | "l" => {
                if let Some(v) = self.pop_numbers(line, op, 2) {
                    let (x, y) = (v[0], v[1]);
                    self.gstate.current_mut().state.current_x = x;
                    self.gstate.current_mut().state.current_y = y;
                    let (xp, yp) = self.transform().map(x, y);
                    self.path_acc.line_to(xp, yp);
                }
            }
            "curveto" | "c" => {
                if let Some(v) = self.pop_numbers(line, op, 6) {
                    let t = self.transform();
                    let (c1x, c1y) = t.map(v[0], v[1]);
                    let (c2x, c2y) = t.map(v[2], v[3]);
                    let (x, y) = t.map(v[4], v[5]);
                    self.gstate.current_mut().state.current_x = v[4];
                    self.gstate.current_mut().state.current_y = v[5];
                    self.path_acc.curve_to(c1x, c1y, c2x, c2y, x, y);
                }
            }
            "closepath" | "h" => self.path_acc.close_path(),
            "newpath" => self.path_acc.discard(),
            "stroke" | "s" | "S" => self.commit_path(true),
            "fill" | "f" | "F" => self.commit_path(false),
            "findfont" => {
                if let Some(name) = self.pop_name(line, op) {
                    self.operand_stack.push(Operand::Name(name));
                }
            }
            "scalefont" => {
                if let Some(size) = self.pop_number(line, op) {
                    if let Some(name) = self.pop_name(line, op) {
                        self.gstate.current_mut().state.font_size = size;
                        self.operand_stack.push(Operand::Name(name));
                    }
                }
            }
            "setfont" => {
                if let Some(name) = self.pop_name(line, op) {
                    self.gstate.current_mut().font_name = name;
                }
            }
            "show" | "Tj" => {
                if let Some(text) = self.pop_string(line, op) {
                    let state = self.gstate.current();
                    let (x, y) = self.transform().map(state.state.current_x, state.state.current_y);
                    self.current_page.items.push(PageItem::Text(TextElement {
                        x,
                        y,
                        text,
                        font_name: state.font_name.clone(),
                        font_size: state.state.font_size,
                        color: state.state.color_rgb,
                    }));
                }
            }
            "translate" | "scale" => {
                let _ = self.pop_numbers(line, op, 2);
            }
            "rotate" => {
                let _ = self.pop_number(line, op);
            }
            "concat" => {
                let _ = self.pop_numbers(line, op, 6);
            }
            "showpage" => self.do_showpage(),
            "setpagedevice" => {
                // Dictionary literal operands aren't parsed; the
                // operator is accepted and its effect ignored.
            }
            other => {
                self.warn(line, format!("unknown operator `{other}`"));
            }
        }
    }

    /// Consumes the tokenizer and returns the interpreted document.
    pub fn run(mut self, input: &[u8]) -> Result<InterpretedDocument> {
        let mut tokenizer = Tokenizer::new(input, self.path.clone(), RECOGNIZED_OPERATORS);
        loop {
            let spanned = match tokenizer.next_token()? {
                Some(t) => t,
                None => break,
            };
            let line = spanned.line;
            match spanned.token {
                Token::DscComment(text) => {
                    if !self.seen_first_operator {
                        self.apply_dsc_comment(&text);
                    }
                }
                Token::LineComment => {}
                Token::Number(n) => self.operand_stack.push(Operand::Number(n)),
                Token::LiteralString(s) => self.operand_stack.push(Operand::String(s)),
                Token::Name { name, literal } => {
                    if literal {
                        self.operand_stack.push(Operand::Name(name));
                    } else {
                        // A bare executable name the tokenizer didn't
                        // recognize as an operator: unknown operator,
                        // per §4.4 ("log a warning, continue").
                        self.warn(line, format!("unknown operator `{name}`"));
                    }
                }
                Token::Operator(op) => {
                    if !self.seen_first_operator {
                        self.seen_first_operator = true;
                        self.finalize_transform_if_needed();
                    }
                    self.dispatch(&op, line);
                }
            }
        }
        self.finalize_transform_if_needed();
        // Trailing page: kept only if it received content.
        if !self.current_page.is_empty() {
            let (w, h) = (self.paper_w, self.paper_h);
            self.pages.push(std::mem::replace(&mut self.current_page, Page::new(w, h)));
        }
        Ok(InterpretedDocument {
            pages: self.pages,
            dsc: self.dsc,
            warnings: self.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathElement;
    use pretty_assertions::assert_eq;

    fn interp(src: &str) -> InterpretedDocument {
        Interpreter::new("test.ps", 595.276, 841.890).run(src.as_bytes()).unwrap()
    }

    #[test]
    fn s1_empty_document() {
        let doc = interp("%!PS-Adobe-3.0\n%%BoundingBox: 0 0 100 100\nshowpage\n");
        assert_eq!(doc.pages.len(), 1);
        assert!(doc.pages[0].is_empty());
    }

    #[test]
    fn s2_single_stroked_line() {
        let doc = interp(
            "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 100 100\n10 10 moveto 90 90 lineto stroke showpage\n",
        );
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].items.len(), 1);
        match &doc.pages[0].items[0] {
            PageItem::Path { batch, .. } => {
                assert!(matches!(batch[0], PathElement::MoveTo { .. }));
                assert!(matches!(batch[1], PathElement::LineTo { .. }));
                assert!(matches!(batch[2], PathElement::PaintStroke));
            }
            other => panic!("expected Path, got {other:?}"),
        }
    }

    #[test]
    fn s3_two_page_document_with_text() {
        let doc = interp(
            "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 612 792\n\
             /Helvetica findfont 12 scalefont setfont 100 100 moveto (Hello) show showpage \
             100 100 moveto (World) show showpage\n",
        );
        assert_eq!(doc.pages.len(), 2);
        match &doc.pages[0].items[0] {
            PageItem::Text(t) => assert_eq!(t.text, b"Hello"),
            other => panic!("expected Text, got {other:?}"),
        }
        match &doc.pages[1].items[0] {
            PageItem::Text(t) => assert_eq!(t.text, b"World"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn s4_closed_triangle_fill() {
        let doc = interp(
            "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 100 100\n\
             0 0 moveto 100 0 lineto 50 86 lineto closepath fill showpage\n",
        );
        match &doc.pages[0].items[0] {
            PageItem::Path { batch, .. } => {
                assert!(matches!(batch[0], PathElement::MoveTo { .. }));
                assert!(matches!(batch[1], PathElement::LineTo { .. }));
                assert!(matches!(batch[2], PathElement::LineTo { .. }));
                assert!(matches!(batch[3], PathElement::ClosePath));
                assert!(matches!(batch[4], PathElement::PaintFill));
            }
            other => panic!("expected Path, got {other:?}"),
        }
    }

    #[test]
    fn s5_gsave_grestore_isolation() {
        let doc = interp(
            "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 100 100\n\
             0.5 0.5 0.5 setrgbcolor \
             gsave 1 0 0 setrgbcolor 0 0 moveto 10 0 lineto stroke grestore \
             0 0 moveto 20 0 lineto stroke showpage\n",
        );
        assert_eq!(doc.pages[0].items.len(), 2);
        let colors: Vec<[f64; 3]> = doc.pages[0]
            .items
            .iter()
            .map(|item| match item {
                PageItem::Path { color_rgb, .. } => *color_rgb,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(colors[0], [1.0, 0.0, 0.0]);
        assert_eq!(colors[1], [0.5, 0.5, 0.5]);
    }

    #[test]
    fn s6_malformed_operator_recovers() {
        let doc = interp(
            "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 100 100\n\
             10 10 moveto BOGUS 90 90 lineto stroke showpage\n",
        );
        assert_eq!(doc.pages[0].items.len(), 1);
        assert!(doc.warnings.iter().any(|w| w.contains("BOGUS")));
    }

    #[test]
    fn no_showpage_trailing_content_kept() {
        let doc = interp("0 0 moveto 10 10 lineto stroke\n");
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn no_showpage_and_no_content_drops_trailing_page() {
        let doc = interp("%!PS-Adobe-3.0\n");
        assert_eq!(doc.pages.len(), 0);
    }
}
