//! Decoder for the Python-literal encodings collectors write into CSV
//! cells (`{'RAM': '8 GB'}`, `[{'color': 'Đen', 'price': 1990000}]`,
//! `['a', 'b']`), plus conversions into record fields.

use std::iter::Peekable;
use std::str::Chars;

use crate::model::{PriceEntry, SpecMap, SpecValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Lists, tuples and sets.
    List(Vec<Literal>),
    /// Key/value pairs in source order.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Text of a scalar literal, as Python's `str()` renders it.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(format_float(*f)),
            Self::Bool(true) => Some("True".to_string()),
            Self::Bool(false) => Some("False".to_string()),
            Self::None | Self::List(_) | Self::Dict(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Literal> {
        let Self::Dict(pairs) = self else {
            return None;
        };
        pairs
            .iter()
            .find(|(k, _)| matches!(k, Self::Str(s) if s == key))
            .map(|(_, v)| v)
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Parse one literal. The whole input must be consumed (surrounding
/// whitespace aside).
pub fn parse_literal(input: &str) -> Result<Literal, String> {
    let mut parser = Parser { chars: input.chars().peekable(), pos: 0, depth: 0 };
    let value = parser.value()?;
    parser.skip_ws();
    match parser.peek() {
        None => Ok(value),
        Some(c) => Err(format!("unexpected '{c}' after value at {}", parser.pos)),
    }
}

/// Deepest container nesting accepted; collector cells never come close.
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), String> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(format!("expected '{want}', found '{c}' at {}", self.pos)),
            None => Err(format!("expected '{want}', found end of input")),
        }
    }

    fn value(&mut self) -> Result<Literal, String> {
        self.skip_ws();
        match self.peek() {
            Some('{' | '[' | '(') => self.container(),
            Some(q @ ('\'' | '"')) => {
                self.bump();
                Ok(Literal::Str(self.string(q)?))
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            Some(c) => Err(format!("unexpected '{c}' at {}", self.pos)),
            None => Err("unexpected end of input".to_string()),
        }
    }

    fn container(&mut self) -> Result<Literal, String> {
        if self.depth >= MAX_DEPTH {
            return Err(format!("nesting too deep at {}", self.pos));
        }
        self.depth += 1;
        let out = match self.peek() {
            Some('{') => self.dict(),
            Some(close @ ('[' | '(')) => {
                self.bump();
                let close = if close == '[' { ']' } else { ')' };
                self.items(close).map(Literal::List)
            }
            _ => Err(format!("expected container at {}", self.pos)),
        };
        self.depth -= 1;
        out
    }

    /// Comma-separated values up to `close`; a trailing comma is allowed.
    fn items(&mut self, close: char) -> Result<Vec<Literal>, String> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(c) if c == close => return Ok(items),
                Some(c) => return Err(format!("expected ',' or '{close}', found '{c}' at {}", self.pos)),
                None => return Err(format!("unterminated sequence, expected '{close}'")),
            }
        }
    }

    /// `{k: v, ...}`, or a set `{a, b}` which decodes as a list.
    fn dict(&mut self) -> Result<Literal, String> {
        self.expect('{')?;
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Literal::Dict(Vec::new()));
        }

        let first = self.value()?;
        self.skip_ws();
        if self.peek() != Some(':') {
            let mut items = vec![first];
            match self.bump() {
                Some('}') => return Ok(Literal::List(items)),
                Some(',') => {
                    items.extend(self.items('}')?);
                    return Ok(Literal::List(items));
                }
                Some(c) => return Err(format!("expected ':' or ',', found '{c}' at {}", self.pos)),
                None => return Err("unterminated dict".to_string()),
            }
        }

        let mut pairs = Vec::new();
        let mut key = first;
        loop {
            self.expect(':')?;
            let value = self.value()?;
            pairs.push((key, value));
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Literal::Dict(pairs)),
                Some(c) => return Err(format!("expected ',' or '}}', found '{c}' at {}", self.pos)),
                None => return Err("unterminated dict".to_string()),
            }
            self.skip_ws();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Literal::Dict(pairs));
            }
            key = self.value()?;
            self.skip_ws();
        }
    }

    /// Body of a quoted string; the opening quote is already consumed.
    fn string(&mut self, quote: char) -> Result<String, String> {
        let mut s = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(s),
                Some('\\') => self.escape(&mut s)?,
                Some(c) => s.push(c),
                None => return Err("unterminated string".to_string()),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), String> {
        match self.bump() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('x') => out.push(self.hex_char(2)?),
            Some('u') => out.push(self.hex_char(4)?),
            Some('U') => out.push(self.hex_char(8)?),
            Some('\n') => {}
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            // Unknown escapes are kept verbatim.
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => return Err("unterminated escape".to_string()),
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize) -> Result<char, String> {
        let mut code = 0u32;
        for _ in 0..digits {
            let d = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| format!("bad hex escape at {}", self.pos))?;
            code = code * 16 + d;
        }
        char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}"))
    }

    fn number(&mut self) -> Result<Literal, String> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_') {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let text = text.replace('_', "");
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Literal::Int(n));
        }
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| format!("invalid number '{text}'"))
    }

    fn word(&mut self) -> Result<Literal, String> {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match word.as_str() {
            "None" => Ok(Literal::None),
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            // String prefixes: u'..', r'..' (raw handled as ordinary), b'..'
            "u" | "U" | "r" | "R" | "b" | "B" => match self.peek() {
                Some(q @ ('\'' | '"')) => {
                    self.bump();
                    Ok(Literal::Str(self.string(q)?))
                }
                _ => Err(format!("unknown name '{word}'")),
            },
            _ => Err(format!("unknown name '{word}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// A decoded spec cell. Non-dict input yields `None`; `None` values and
/// nested dicts are dropped.
pub fn to_spec_map(literal: &Literal) -> Option<SpecMap> {
    let Literal::Dict(pairs) = literal else {
        return None;
    };
    let mut specs = SpecMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        let Some(label) = key.scalar_text() else {
            continue;
        };
        if let Some(value) = to_spec_value(value) {
            specs.insert(label, value);
        }
    }
    Some(specs)
}

fn to_spec_value(literal: &Literal) -> Option<SpecValue> {
    match literal {
        Literal::Str(s) => Some(decode_listish(s).unwrap_or_else(|| SpecValue::Scalar(s.clone()))),
        Literal::List(items) => Some(SpecValue::Multi(
            items.iter().filter_map(Literal::scalar_text).collect(),
        )),
        Literal::None | Literal::Dict(_) => None,
        scalar => scalar.scalar_text().map(SpecValue::Scalar),
    }
}

/// `"['a', 'b']"` stored as a string is a list in disguise.
fn decode_listish(s: &str) -> Option<SpecValue> {
    let trimmed = s.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return None;
    }
    match parse_literal(trimmed) {
        Ok(Literal::List(items)) => Some(SpecValue::Multi(
            items.iter().filter_map(Literal::scalar_text).collect(),
        )),
        _ => None,
    }
}

/// A decoded price cell: a list of `{color, price}` dicts. Entries with no
/// usable price are dropped; a missing color becomes empty.
pub fn to_prices(literal: &Literal) -> Option<Vec<PriceEntry>> {
    let Literal::List(items) = literal else {
        return None;
    };
    let prices = items
        .iter()
        .filter_map(|item| {
            let price = item.get("price").and_then(price_value)?;
            let color = item
                .get("color")
                .and_then(Literal::scalar_text)
                .unwrap_or_default();
            Some(PriceEntry { color, price })
        })
        .collect();
    Some(prices)
}

fn price_value(literal: &Literal) -> Option<u64> {
    match literal {
        Literal::Int(n) => u64::try_from(*n).ok(),
        Literal::Float(f) if f.is_finite() && *f >= 0.0 && *f < u64::MAX as f64 => {
            Some(f.round() as u64)
        }
        // "12.990.000₫" style text: keep the digits.
        Literal::Str(s) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// A decoded list cell of strings. Non-scalar items are skipped.
pub fn to_string_list(literal: &Literal) -> Option<Vec<String>> {
    let Literal::List(items) = literal else {
        return None;
    };
    Some(items.iter().filter_map(Literal::scalar_text).collect())
}
