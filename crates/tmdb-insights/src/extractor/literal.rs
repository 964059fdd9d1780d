//! Parser for the serialized list columns (`genres`, `production_companies`,
//! `keywords`).
//!
//! The TMDB export stores these as JSON, but other dumps of the same dataset
//! use Python literal syntax (`[{'id': 28, 'name': 'Action'}]`). Both are
//! accepted and parsed into a [`serde_json::Value`]:
//!
//! - lists `[..]` and tuples `(..)` become arrays
//! - dicts `{..}` become objects; non-string keys use their textual form
//! - single- or double-quoted strings with backslash escapes
//! - integers, floats, exponents, leading sign
//! - `True`/`False`/`None` and `true`/`false`/`null`
//! - trailing commas
//!
//! Containers nest at most [`MAX_DEPTH`] levels deep.

use serde_json::{Map, Number, Value};
use std::fmt;

/// Deepest container nesting accepted by [`parse_literal`].
pub const MAX_DEPTH: usize = 64;

/// Position and reason of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Parse a complete literal. Anything after the value other than whitespace
/// is an error.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser::new(input);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

#[derive(Clone, Copy)]
enum Closing {
    Bracket,
    Paren,
}

impl fmt::Display for Closing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closing::Bracket => write!(f, "']'"),
            Closing::Paren => write!(f, "')'"),
        }
    }
}

impl Closing {
    fn char(self) -> char {
        match self {
            Closing::Bracket => ']',
            Closing::Paren => ')',
        }
    }
}

impl LiteralParser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    /// Parse a container opened at the current character.
    fn parse_nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting deeper than {} levels", MAX_DEPTH)));
        }
        self.pos += 1;
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('[') => self.parse_nested(|p| p.parse_sequence(Closing::Bracket)),
            Some('(') => self.parse_nested(|p| p.parse_sequence(Closing::Paren)),
            Some('{') => self.parse_nested(Self::parse_dict),
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_string(q).map(Value::String)
            }
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() => self.parse_keyword(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_sequence(&mut self, closing: Closing) -> Result<Value, LiteralError> {
        let mut elements = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(closing.char()) {
                self.pos += 1;
                return Ok(Value::Array(elements));
            }

            elements.push(self.parse_value()?);
            self.skip_whitespace();

            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == closing.char() => {}
                Some(c) => {
                    return Err(self.error(format!("expected ',' or {}, found '{}'", closing, c)));
                }
                None => return Err(self.error(format!("unterminated sequence, expected {}", closing))),
            }
        }
    }

    fn parse_dict(&mut self) -> Result<Value, LiteralError> {
        let mut object = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(object));
            }

            let key = match self.parse_value()? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            object.insert(key, value);
            self.skip_whitespace();

            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{}'", c))),
                None => return Err(self.error("unterminated dict, expected '}'")),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            let c = self
                .advance()
                .ok_or_else(|| self.error("unterminated string"))?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }

            let escaped = self
                .advance()
                .ok_or_else(|| self.error("unterminated escape sequence"))?;
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'b' => out.push('\u{0008}'),
                'f' => out.push('\u{000C}'),
                '0' => out.push('\0'),
                '\\' | '\'' | '"' | '/' => out.push(escaped),
                'u' => out.push(self.parse_unicode_escape()?),
                // Python keeps unknown escapes verbatim
                other => {
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn parse_hex4(&mut self) -> Result<u32, LiteralError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let c = self
                .advance()
                .ok_or_else(|| self.error("truncated unicode escape"))?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex digit '{}'", c)))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn parse_unicode_escape(&mut self) -> Result<char, LiteralError> {
        let high = self.parse_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            // JSON encodes astral characters as surrogate pairs
            if self.peek() == Some('\\') && self.chars.get(self.pos + 1) == Some(&'u') {
                self.pos += 2;
                let low = self.parse_hex4()?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code)
                        .ok_or_else(|| self.error("invalid surrogate pair"));
                }
            }
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_'))
        {
            let c = self.chars[self.pos];
            self.pos += 1;
            if matches!(c, 'e' | 'E') && matches!(self.peek(), Some('-' | '+')) {
                self.pos += 1;
            }
        }

        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        let text = text.strip_prefix('+').unwrap_or(&text);

        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(int)));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| LiteralError {
                offset: start,
                message: format!("invalid number '{}'", text),
            })
    }

    fn parse_keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => Err(LiteralError {
                offset: start,
                message: format!("unknown name '{}'", word),
            }),
        }
    }
}
