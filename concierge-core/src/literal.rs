// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Structural literal parser
//!
//! The recommendation engine prints its diagnostics as native container
//! literals rather than JSON: single-quoted strings, `True`/`False`/`None`,
//! tuples and trailing commas all occur. This module parses that text into a
//! [`Literal`] tree without evaluating anything.
//!
//! Supported grammar:
//!
//! ```text
//! value   := string | number | "True" | "False" | "None"
//!          | "[" items "]" | "(" items ")" | "{" entries "}" | "{" items "}"
//! items   := (value ("," value)* ","?)?
//! entries := (value ":" value ("," value ":" value)* ","?)?
//! string  := ('...' | "...") with backslash escapes, optional r/u/b prefix
//! ```

use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

/// Parsed structural literal
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    /// Mapping entries in source order. A repeated key keeps the position of
    /// its first occurrence and the value of its last.
    Dict(Vec<(Literal, Literal)>),
}

/// Syntax error with the byte offset where parsing stopped
#[derive(Debug, Clone, PartialEq, Error)]
#[error("literal syntax error at byte {position}: {message}")]
pub struct LiteralError {
    pub position: usize,
    pub message: String,
}

impl Literal {
    /// Parse a complete literal; trailing non-whitespace input is an error.
    pub fn parse(input: &str) -> Result<Self, LiteralError> {
        let mut parser = LiteralParser::new(input);
        parser.skip_whitespace();
        let value = parser.parse_value()?;
        parser.skip_whitespace();
        if parser.pos < parser.input.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(value)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of any sequence-shaped literal (list, tuple or set)
    pub fn as_sequence(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) | Literal::Tuple(items) | Literal::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Literal, Literal)]> {
        match self {
            Literal::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// Numeric value of an int, float, or a string holding a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            Literal::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Look up a string key in a mapping; the last entry wins
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.as_dict()?
            .iter()
            .rev()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    /// Convert into JSON. Non-string mapping keys use their literal rendering;
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Literal::None => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Number((*i).into()),
            Literal::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Literal::Str(s) => Value::String(s.clone()),
            Literal::List(items) | Literal::Tuple(items) | Literal::Set(items) => {
                Value::Array(items.iter().map(Literal::to_json).collect())
            }
            Literal::Dict(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = match key {
                        Literal::Str(s) => s.clone(),
                        other => other.to_string(),
                    };
                    map.insert(key, value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::List(items) => {
                write!(f, "[")?;
                join(f, items)?;
                write!(f, "]")
            }
            Literal::Tuple(items) => {
                write!(f, "(")?;
                join(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Literal::Set(items) => {
                write!(f, "{{")?;
                join(f, items)?;
                write!(f, "}}")
            }
            Literal::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Recursive descent parser over a byte cursor
struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

/// Nesting guard so hostile payloads cannot overflow the stack
const MAX_DEPTH: usize = 128;

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn parse_value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => self.nested(|p| p.parse_sequence(']').map(Literal::List)),
            Some('(') => self.nested(|p| p.parse_tuple()),
            Some('{') => self.nested(|p| p.parse_braces()),
            Some('\'') | Some('"') => self.parse_string().map(Literal::Str),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_word(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
        }
    }

    fn nested<F>(&mut self, parse: F) -> Result<Literal, LiteralError>
    where
        F: FnOnce(&mut Self) -> Result<Literal, LiteralError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Comma separated values up to `close`; the opening bracket is consumed here.
    fn parse_sequence(&mut self, close: char) -> Result<Vec<Literal>, LiteralError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(items),
                Some(c) => {
                    return Err(self.error(format!("expected ',' or '{}', found '{}'", close, c)))
                }
                None => return Err(self.error(format!("unterminated sequence, expected '{}'", close))),
            }
        }
    }

    /// `(x)` is a parenthesised value, `(x,)` and `(x, y)` are tuples
    fn parse_tuple(&mut self) -> Result<Literal, LiteralError> {
        self.bump();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Literal::Tuple(Vec::new()));
        }
        let first = self.parse_value()?;
        self.skip_whitespace();
        match self.bump() {
            Some(')') => Ok(first),
            Some(',') => {
                let mut items = vec![first];
                loop {
                    self.skip_whitespace();
                    if self.peek() == Some(')') {
                        self.bump();
                        return Ok(Literal::Tuple(items));
                    }
                    items.push(self.parse_value()?);
                    self.skip_whitespace();
                    match self.bump() {
                        Some(',') => continue,
                        Some(')') => return Ok(Literal::Tuple(items)),
                        _ => return Err(self.error("expected ',' or ')' in tuple")),
                    }
                }
            }
            _ => Err(self.error("expected ',' or ')' in tuple")),
        }
    }

    /// `{}` is an empty mapping; the first element decides mapping vs set.
    fn parse_braces(&mut self) -> Result<Literal, LiteralError> {
        self.bump();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(Literal::Dict(Vec::new()));
        }

        let first = self.parse_value()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            let mut items = vec![first];
            match self.bump() {
                Some('}') => return Ok(Literal::Set(items)),
                Some(',') => {}
                _ => return Err(self.error("expected ',', ':' or '}'")),
            }
            loop {
                self.skip_whitespace();
                if self.peek() == Some('}') {
                    self.bump();
                    return Ok(Literal::Set(items));
                }
                items.push(self.parse_value()?);
                self.skip_whitespace();
                match self.bump() {
                    Some(',') => continue,
                    Some('}') => return Ok(Literal::Set(items)),
                    _ => return Err(self.error("expected ',' or '}' in set")),
                }
            }
        }

        let mut entries = Vec::new();
        let mut key = first;
        loop {
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            insert_entry(&mut entries, key, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Literal::Dict(entries)),
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{}'", c))),
                None => return Err(self.error("unterminated mapping, expected '}'")),
            }
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Literal::Dict(entries));
            }
            key = self.parse_value()?;
            self.skip_whitespace();
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        self.parse_string_body(quote, false)
    }

    fn parse_string_body(&mut self, quote: char, raw: bool) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.error("unterminated string literal"))?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escaped = self
                .bump()
                .ok_or_else(|| self.error("unterminated escape sequence"))?;
            if raw {
                out.push('\\');
                out.push(escaped);
                continue;
            }
            match escaped {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                '\\' => out.push('\\'),
                '\'' => out.push('\''),
                '"' => out.push('"'),
                '\n' => {}
                'x' => out.push(self.parse_hex_escape(2)?),
                'u' => out.push(self.parse_hex_escape(4)?),
                'U' => out.push(self.parse_hex_escape(8)?),
                other => {
                    // Unknown escapes are kept verbatim
                    out.push('\\');
                    out.push(other);
                }
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        let hex = self
            .input
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated hex escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid hex escape"))?;
        let c = char::from_u32(code).ok_or_else(|| self.error("invalid unicode code point"))?;
        self.pos = end;
        Ok(c)
    }

    fn parse_number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('-') | Some('+')) {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let text: String = self.input[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Literal::Int(i));
            }
        }
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| LiteralError {
                position: start,
                message: format!("invalid number '{}'", text),
            })
    }

    /// Keywords, or a prefixed string such as `u'...'` / `r"..."`
    fn parse_word(&mut self) -> Result<Literal, LiteralError> {
        let input = self.input;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        let word = &input[start..self.pos];

        if let Some(quote @ ('\'' | '"')) = self.peek() {
            let lower = word.to_ascii_lowercase();
            if matches!(lower.as_str(), "u" | "r" | "b" | "br" | "rb") {
                self.bump();
                let raw = lower.contains('r');
                return self.parse_string_body(quote, raw).map(Literal::Str);
            }
        }

        match word {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            "inf" => Ok(Literal::Float(f64::INFINITY)),
            _ => Err(LiteralError {
                position: start,
                message: format!("unknown identifier '{}'", word),
            }),
        }
    }
}

fn insert_entry(entries: &mut Vec<(Literal, Literal)>, key: Literal, value: Literal) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_list() {
        let lit = Literal::parse("['Cuisine -> Italian', \"Mood -> Romantic\"]").unwrap();
        assert_eq!(
            lit,
            Literal::List(vec![
                Literal::Str("Cuisine -> Italian".to_string()),
                Literal::Str("Mood -> Romantic".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_nested_mapping() {
        let lit = Literal::parse(
            "{'results': {'Cuisine': ['0.91 -> Osteria', '0.5 -> Bella']}, 'ok': True, 'n': None}",
        )
        .unwrap();
        let results = lit.get("results").unwrap();
        let cuisine = results.get("Cuisine").unwrap().as_sequence().unwrap();
        assert_eq!(cuisine.len(), 2);
        assert_eq!(lit.get("ok"), Some(&Literal::Bool(true)));
        assert_eq!(lit.get("n"), Some(&Literal::None));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Literal::parse("42").unwrap(), Literal::Int(42));
        assert_eq!(Literal::parse("-3").unwrap(), Literal::Int(-3));
        assert_eq!(Literal::parse("0.75").unwrap(), Literal::Float(0.75));
        assert_eq!(Literal::parse("1e3").unwrap(), Literal::Float(1000.0));
        assert_eq!(Literal::parse("1_000").unwrap(), Literal::Int(1000));
    }

    #[test]
    fn test_parse_tuple_and_set() {
        assert_eq!(
            Literal::parse("('a', 1)").unwrap(),
            Literal::Tuple(vec![Literal::Str("a".into()), Literal::Int(1)])
        );
        assert_eq!(Literal::parse("(5)").unwrap(), Literal::Int(5));
        assert_eq!(
            Literal::parse("(5,)").unwrap(),
            Literal::Tuple(vec![Literal::Int(5)])
        );
        assert_eq!(
            Literal::parse("{'x', 'y'}").unwrap(),
            Literal::Set(vec![Literal::Str("x".into()), Literal::Str("y".into())])
        );
        assert_eq!(Literal::parse("{}").unwrap(), Literal::Dict(Vec::new()));
    }

    #[test]
    fn test_trailing_commas_and_whitespace() {
        let lit = Literal::parse("  [ 'a' ,\n 'b', ]  ").unwrap();
        assert_eq!(lit.as_sequence().unwrap().len(), 2);
        let lit = Literal::parse("{'a': 1,}").unwrap();
        assert_eq!(lit.as_dict().unwrap().len(), 1);
    }

    #[test]
    fn test_string_escapes() {
        let lit = Literal::parse(r"'it\'s ét\xe9\n'").unwrap();
        assert_eq!(lit.as_str(), Some("it's été\n"));
        let raw = Literal::parse(r"r'a\d'").unwrap();
        assert_eq!(raw.as_str(), Some(r"a\d"));
        let unicode = Literal::parse("u'Café'").unwrap();
        assert_eq!(unicode.as_str(), Some("Café"));
    }

    #[test]
    fn test_errors_report_position() {
        let err = Literal::parse("['a', 'b'").unwrap_err();
        assert!(err.message.contains("unterminated"));

        let err = Literal::parse("['a'] extra").unwrap_err();
        assert_eq!(err.position, 6);

        assert!(Literal::parse("").is_err());
        assert!(Literal::parse("{'a' 1}").is_err());
        assert!(Literal::parse("[os.system('x')]").is_err());
        assert!(Literal::parse("'unterminated").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        let err = Literal::parse(&deep).unwrap_err();
        assert!(err.message.contains("nesting"));
    }

    #[test]
    fn test_to_json() {
        let lit = Literal::parse("{'a': [1, 2.5, 'x'], 3: None, 'b': (True,)}").unwrap();
        let json = lit.to_json();
        assert_eq!(json["a"][1], serde_json::json!(2.5));
        assert_eq!(json["3"], Value::Null);
        assert_eq!(json["b"], serde_json::json!([true]));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Literal::Int(2).as_f64(), Some(2.0));
        assert_eq!(Literal::Str(" 0.8 ".into()).as_f64(), Some(0.8));
        assert_eq!(Literal::None.as_f64(), None);
    }

    #[test]
    fn test_repeated_key_last_value_wins() {
        let lit = Literal::parse("{'b': 1, 'a': 2, 'b': 3}").unwrap();
        let entries = lit.as_dict().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Literal::Str("b".into()), Literal::Int(3)));
        assert_eq!(lit.get("b"), Some(&Literal::Int(3)));

        let json = lit.to_json();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(json["b"], serde_json::json!(3));
    }
}
