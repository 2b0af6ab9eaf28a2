//! PostScript tokenizer.
//!
//! Produces a lazy sequence of [`Token`]s from a byte input. Malformed
//! numbers degrade to `Name` tokens; an unterminated literal string at EOF
//! is the one condition this layer cannot locally recover from.

use crate::errors::{PsToPdfError, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    /// `name` has the leading `/` stripped; `literal` is true for `/foo`
    /// forms and false for bare executable names (`foo`).
    Name { name: String, literal: bool },
    Operator(String),
    LiteralString(Vec<u8>),
    DscComment(String),
    LineComment,
}

/// One token plus the 1-based source line it started on, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    path: PathBuf,
    operators: &'a [&'a str],
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8], path: impl AsRef<Path>, operators: &'a [&'a str]) -> Self {
        Tokenizer {
            input,
            pos: 0,
            line: 1,
            path: path.as_ref().to_path_buf(),
            operators,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_line_comment(&mut self) -> (usize, String) {
        let start_line = self.line;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.bump();
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        (start_line, text)
    }

    fn read_literal_string(&mut self) -> Result<Vec<u8>> {
        let start_line = self.line;
        self.bump(); // consume '('
        let mut depth = 1usize;
        let mut out = Vec::new();
        loop {
            let b = match self.bump() {
                Some(b) => b,
                None => {
                    return Err(PsToPdfError::TokenizeError {
                        path: self.path.clone(),
                        line: start_line,
                        msg: "unterminated literal string at EOF".to_string(),
                    })
                }
            };
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push(b);
                }
                b'\\' => {
                    let esc = match self.bump() {
                        Some(e) => e,
                        None => {
                            return Err(PsToPdfError::TokenizeError {
                                path: self.path.clone(),
                                line: start_line,
                                msg: "unterminated escape at EOF".to_string(),
                            })
                        }
                    };
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0C),
                        b'\\' => out.push(b'\\'),
                        b'(' => out.push(b'('),
                        b')' => out.push(b')'),
                        b'\n' => {} // line continuation, emits nothing
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.bump();
                            }
                        }
                        d @ b'0'..=b'7' => {
                            let mut value = (d - b'0') as u32;
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d2 @ b'0'..=b'7') => {
                                        value = value * 8 + (d2 - b'0') as u32;
                                        self.bump();
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xFF) as u8);
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }

    fn read_name_or_operator(&mut self, literal: bool) -> (Token, usize) {
        let start_line = self.line;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.bump();
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]).into_owned();
        if !literal && self.operators.contains(&text.as_str()) {
            (Token::Operator(text), start_line)
        } else {
            (Token::Name { name: text, literal }, start_line)
        }
    }

    fn try_read_number(&mut self) -> Option<(f64, usize)> {
        let start_line = self.line;
        let start = self.pos;
        let mut cursor = self.pos;
        if matches!(self.input.get(cursor), Some(b'+') | Some(b'-')) {
            cursor += 1;
        }
        let mut saw_digit = false;
        while matches!(self.input.get(cursor), Some(b'0'..=b'9')) {
            cursor += 1;
            saw_digit = true;
        }
        if matches!(self.input.get(cursor), Some(b'.')) {
            cursor += 1;
            while matches!(self.input.get(cursor), Some(b'0'..=b'9')) {
                cursor += 1;
                saw_digit = true;
            }
        }
        if !saw_digit {
            return None;
        }
        if matches!(self.input.get(cursor), Some(b'e') | Some(b'E')) {
            let mut exp_cursor = cursor + 1;
            if matches!(self.input.get(exp_cursor), Some(b'+') | Some(b'-')) {
                exp_cursor += 1;
            }
            if matches!(self.input.get(exp_cursor), Some(b'0'..=b'9')) {
                while matches!(self.input.get(exp_cursor), Some(b'0'..=b'9')) {
                    exp_cursor += 1;
                }
                cursor = exp_cursor;
            }
        }
        // A trailing delimiter/whitespace boundary is required; otherwise
        // this isn't purely numeric (e.g. `1foo`) and degrades to a name.
        if !matches!(self.input.get(cursor), None) && !is_whitespace(self.input[cursor]) && !is_delimiter(self.input[cursor]) {
            return None;
        }
        let text = std::str::from_utf8(&self.input[start..cursor]).ok()?;
        let value: f64 = text.parse().ok()?;
        self.pos = cursor;
        Some((value, start_line))
    }

    /// Reads the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>> {
        self.skip_whitespace();
        let b = match self.peek() {
            Some(b) => b,
            None => return Ok(None),
        };
        match b {
            b'%' => {
                let dsc_start = self.pos;
                self.bump();
                if self.peek() == Some(b'%') {
                    self.bump();
                    let (line, rest) = self.read_line_comment();
                    let _ = dsc_start;
                    Ok(Some(SpannedToken {
                        token: Token::DscComment(rest.trim().to_string()),
                        line,
                    }))
                } else {
                    let (line, _) = self.read_line_comment();
                    Ok(Some(SpannedToken { token: Token::LineComment, line }))
                }
            }
            b'(' => {
                let line = self.line;
                let s = self.read_literal_string()?;
                Ok(Some(SpannedToken { token: Token::LiteralString(s), line }))
            }
            b'/' => {
                let line = self.line;
                self.bump();
                let (tok, _) = self.read_name_or_operator(true);
                Ok(Some(SpannedToken { token: tok, line }))
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => {
                if let Some((value, line)) = self.try_read_number() {
                    Ok(Some(SpannedToken { token: Token::Number(value), line }))
                } else {
                    let (tok, line) = self.read_name_or_operator(false);
                    Ok(Some(SpannedToken { token: tok, line }))
                }
            }
            _ => {
                let (tok, line) = self.read_name_or_operator(false);
                Ok(Some(SpannedToken { token: tok, line }))
            }
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Some(t)) => Some(Ok(t)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::RECOGNIZED_OPERATORS;

    fn tokens(src: &str) -> Vec<Token> {
        Tokenizer::new(src.as_bytes(), "test.ps", RECOGNIZED_OPERATORS)
            .map(|r| r.unwrap().token)
            .collect()
    }

    #[test]
    fn numbers() {
        assert_eq!(tokens("1 -3.5 2.5e-3"), vec![
            Token::Number(1.0),
            Token::Number(-3.5),
            Token::Number(2.5e-3),
        ]);
    }

    #[test]
    fn operator_vs_name() {
        assert_eq!(
            tokens("moveto /Helvetica findfont"),
            vec![
                Token::Operator("moveto".to_string()),
                Token::Name { name: "Helvetica".to_string(), literal: true },
                Token::Operator("findfont".to_string()),
            ]
        );
    }

    #[test]
    fn dsc_and_line_comments() {
        let toks = tokens("%%BoundingBox: 0 0 100 100\n% just a comment\nshowpage");
        assert_eq!(toks[0], Token::DscComment("BoundingBox: 0 0 100 100".to_string()));
        assert_eq!(toks[1], Token::LineComment);
        assert_eq!(toks[2], Token::Operator("showpage".to_string()));
    }

    #[test]
    fn literal_string_escapes() {
        let toks = tokens(r"(Hello\nWorld\)\()");
        match &toks[0] {
            Token::LiteralString(bytes) => assert_eq!(bytes, b"Hello\nWorld)("),
            other => panic!("expected LiteralString, got {other:?}"),
        }
    }

    #[test]
    fn nested_parens() {
        let toks = tokens("(a (b) c)");
        match &toks[0] {
            Token::LiteralString(bytes) => assert_eq!(bytes, b"a (b) c"),
            other => panic!("expected LiteralString, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_tokenize_error() {
        let mut t = Tokenizer::new(b"(unterminated", "test.ps", RECOGNIZED_OPERATORS);
        assert!(t.next_token().is_err());
    }

    #[test]
    fn malformed_number_degrades_to_name() {
        let toks = tokens("1foo");
        assert_eq!(toks, vec![Token::Name { name: "1foo".to_string(), literal: false }]);
    }
}
