//! A small AST for PDF objects plus the low-level byte escaping rules
//! the serializer depends on.
//!
//! A tagged `Object` enum, a linked `Dictionary` (so a base dictionary
//! can be extended without copying its pairs), and `dictionary!`/
//! `array!` macro front-ends.

use super::syntax::IndirectObjectId;
use std::io::{self, Write};

#[derive(Debug)]
pub(crate) enum Object<'a> {
    Usize(usize),
    I64(i64),
    Float(f64),
    Name(&'a [u8]),
    LiteralString(&'a [u8]),
    Array(&'a [Object<'a>]),
    Dictionary(Dictionary<'a>),
    Reference(IndirectObjectId),
}

pub(crate) type KeyValuePairs<'a> = &'a [(&'a [u8], Object<'a>)];

#[derive(Debug)]
pub(crate) struct Dictionary<'a> {
    pub prev: Option<&'a Dictionary<'a>>,
    pub pairs: KeyValuePairs<'a>,
}

macro_rules! array {
    ($( $value: expr ),* ,) => {
        array![ $( $value ),* ]
    };
    ($( $value: expr ),*) => {
        &[ $( crate::pdf::object::Object::from($value) ),* ][..]
    }
}

macro_rules! key_value_pairs {
    ($( $key: expr => $value: expr ),+ ,) => {
        key_value_pairs!( $($key => $value),+ )
    };
    ($( $key: expr => $value: expr ),*) => {
        &[
            $(
                (AsRef::<[u8]>::as_ref($key), crate::pdf::object::Object::from($value)),
            )*
        ]
    };
}

macro_rules! dictionary {
    ($($pairs: tt)*) => {
        crate::pdf::object::Dictionary {
            prev: None,
            pairs: key_value_pairs!($($pairs)*),
        }
    }
}

pub(crate) use {array, dictionary, key_value_pairs};

impl<'a> From<i64> for Object<'a> {
    fn from(value: i64) -> Self {
        Object::I64(value)
    }
}

impl<'a> From<i32> for Object<'a> {
    fn from(value: i32) -> Self {
        Object::I64(value as i64)
    }
}

impl<'a> From<usize> for Object<'a> {
    fn from(value: usize) -> Self {
        Object::Usize(value)
    }
}

impl<'a> From<f64> for Object<'a> {
    fn from(value: f64) -> Self {
        Object::Float(value)
    }
}

impl<'a> From<&'a str> for Object<'a> {
    fn from(name: &'a str) -> Self {
        Object::Name(name.as_bytes())
    }
}

impl<'a> From<&'a [Object<'a>]> for Object<'a> {
    fn from(value: &'a [Object]) -> Self {
        Object::Array(value)
    }
}

impl<'a> From<Dictionary<'a>> for Object<'a> {
    fn from(value: Dictionary<'a>) -> Self {
        Object::Dictionary(value)
    }
}

impl<'a> From<IndirectObjectId> for Object<'a> {
    fn from(value: IndirectObjectId) -> Self {
        Object::Reference(value)
    }
}

impl<'a> Object<'a> {
    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match *self {
            Object::I64(value) => itoa::write(w, value).map(|_| ()),
            Object::Usize(value) => itoa::write(w, value).map(|_| ()),
            Object::Float(value) => dtoa::write(w, value).map(|_| ()),
            Object::Name(value) => write_name(value, w),
            Object::Dictionary(ref value) => value.write(w),
            Object::LiteralString(value) => write_literal_string(value, w),
            Object::Array(value) => {
                w.write_all(b"[")?;
                let mut iter = value.iter();
                if let Some(item) = iter.next() {
                    item.write(w)?;
                    for item in iter {
                        w.write_all(b" ")?;
                        item.write(w)?
                    }
                }
                w.write_all(b"]")
            }
            Object::Reference(IndirectObjectId(id)) => {
                itoa::write(&mut *w, id)?;
                w.write_all(b" 0 R")
            }
        }
    }
}

impl<'a> Dictionary<'a> {
    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(b"<<")?;
        self.write_pairs(w)?;
        w.write_all(b" >>")
    }

    pub fn write_pairs<W: Write>(&self, w: &mut W) -> io::Result<()> {
        if let Some(prev) = self.prev {
            prev.write_pairs(w)?
        }
        for &(key, ref value) in self.pairs {
            w.write_all(b" ")?;
            write_name(key, w)?;
            w.write_all(b" ")?;
            value.write(w)?
        }
        Ok(())
    }
}

/// Escapes a content-stream/PDF literal string: `\`, `(`, `)` are
/// backslash-escaped; bytes outside printable ASCII are emitted as
/// `\ddd` octal so control characters round-trip exactly.
pub(crate) fn write_literal_string<W: Write>(value: &[u8], w: &mut W) -> io::Result<()> {
    w.write_all(b"(")?;
    for &byte in value {
        match byte {
            b'\\' | b'(' | b')' => w.write_all(&[b'\\', byte])?,
            0x20..=0x7E => w.write_all(&[byte])?,
            other => {
                let octal = format!("\\{:03o}", other);
                w.write_all(octal.as_bytes())?
            }
        }
    }
    w.write_all(b")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(bytes: &[u8]) -> String {
        let mut out = Vec::new();
        write_literal_string(bytes, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn backslash_and_parens_are_escaped() {
        assert_eq!(escaped(b"a(b)c\\d"), r"(a\(b\)c\\d)");
    }

    #[test]
    fn printable_ascii_passes_through() {
        assert_eq!(escaped(b"Hello, World!"), "(Hello, World!)");
    }

    #[test]
    fn control_bytes_use_octal_escapes() {
        // Property 10: a byte < 0x20 round-trips through `\ddd` octal.
        assert_eq!(escaped(b"a\nb"), r"(a\012b)");
        assert_eq!(escaped(&[0x01]), r"(\001)");
        assert_eq!(escaped(&[0x7F]), r"(\177)");
    }

    #[test]
    fn name_writer_hash_escapes_delimiters_and_whitespace() {
        let mut out = Vec::new();
        write_name(b"F1 Name", &mut out).unwrap();
        assert_eq!(out, b"/F1#20Name");
    }
}

fn write_name<W: Write>(name: &[u8], w: &mut W) -> io::Result<()> {
    w.write_all(b"/")?;
    for &byte in name {
        match KIND[byte as usize] {
            CharKind::Regular => w.write_all(&[byte])?,
            CharKind::Whitespace | CharKind::Delimiter => {
                write!(w, "#{:02X}", byte)?
            }
        }
    }
    Ok(())
}

// https://www.adobe.com/content/dam/acom/en/devnet/pdf/PDF32000_2008.pdf#G6.1839343
#[repr(u8)]
enum CharKind {
    Whitespace,
    Delimiter,
    Regular,
}

static KIND: [CharKind; 256] = {
    use self::CharKind::{Delimiter as D, Regular as r, Whitespace as W};
    [
        W, r, r, r, r, r, r, r, // \x00 …
        r, W, W, r, W, W, r, r, // \x08 \t \n \x0b \x0c \r \x0e \x0f
        r, r, r, r, r, r, r, r, // \x10 …
        r, r, r, r, r, r, r, r, // \x18 …
        W, r, r, r, r, D, r, r, //   ! " # $ % & '
        D, D, r, r, r, r, r, D, // ( ) * + , - . /
        r, r, r, r, r, r, r, r, // 0 1 2 3 4 5 6 7
        r, r, r, r, D, r, D, r, // 8 9 : ; < = > ?
        r, r, r, r, r, r, r, r, // @ A B C D E F G
        r, r, r, r, r, r, r, r, // H I J K L M N O
        r, r, r, r, r, r, r, r, // P Q R S T U V W
        r, r, r, D, r, D, r, r, // X Y Z [ \ ] ^ _
        r, r, r, r, r, r, r, r, // ` a b c d e f g
        r, r, r, r, r, r, r, r, // h i j k l m n o
        r, r, r, r, r, r, r, r, // p q r s t u v w
        r, r, r, D, r, D, r, r, // x y z { | } ~ \x7f
        r, r, r, r, r, r, r, r, // \x80 …
        r, r, r, r, r, r, r, r, // \x88 …
        r, r, r, r, r, r, r, r, // \x90 …
        r, r, r, r, r, r, r, r, // \x98 …
        r, r, r, r, r, r, r, r, // \xa0 …
        r, r, r, r, r, r, r, r, // \xa8 …
        r, r, r, r, r, r, r, r, // \xb0 …
        r, r, r, r, r, r, r, r, // \xb8 …
        r, r, r, r, r, r, r, r, // \xc0 …
        r, r, r, r, r, r, r, r, // \xc8 …
        r, r, r, r, r, r, r, r, // \xd0 …
        r, r, r, r, r, r, r, r, // \xd8 …
        r, r, r, r, r, r, r, r, // \xe0 …
        r, r, r, r, r, r, r, r, // \xe8 …
        r, r, r, r, r, r, r, r, // \xf0 …
        r, r, r, r, r, r, r, r, // \xf8 … \xff
    ]
};
