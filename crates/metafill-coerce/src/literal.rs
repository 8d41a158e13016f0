//! Bounded parser for list/dict literals returned as text
//!
//! The AI service sometimes answers with Python-style literals such as
//! `['A', 'B']` or `{'tags': ['A']}` instead of JSON. This module recognizes
//! exactly that shape and nothing more:
//!
//! ```text
//! value  := list | tuple | map | quoted | bare
//! list   := '[' [ value (',' value)* [','] ] ']'
//! tuple  := '(' [ value (',' value)* [','] ] ')'
//! map    := '{' [ value ':' value (',' value ':' value)* [','] ] '}'
//! quoted := '\'' chars '\'' | '"' chars '"'      (backslash escapes)
//! bare   := chars up to the next delimiter       (None / null → Null)
//! ```
//!
//! Depth and length are capped by configuration.

use crate::error::LiteralError;

/// A parsed literal
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `None` / `null`
    Null,
    /// A quoted or bare token
    Text(String),
    /// A list or tuple
    List(Vec<Literal>),
    /// A dict, in source order
    Map(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Flatten into text elements
    ///
    /// Lists contribute their elements, maps their values; nulls are dropped.
    pub fn into_texts(self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts(self, out: &mut Vec<String>) {
        match self {
            Literal::Null => {}
            Literal::Text(s) => out.push(s),
            Literal::List(items) => {
                for item in items {
                    item.collect_texts(out);
                }
            }
            Literal::Map(entries) => {
                for (_, value) in entries {
                    value.collect_texts(out);
                }
            }
        }
    }
}

/// Whether text starts like a list, tuple or dict literal
pub(crate) fn looks_like_literal(s: &str) -> bool {
    matches!(s.trim_start().chars().next(), Some('[' | '(' | '{'))
}

/// Parser for the literal grammar
#[derive(Debug, Clone, Copy)]
pub struct LiteralParser {
    max_depth: usize,
    max_len: usize,
}

impl LiteralParser {
    /// Create a parser with nesting and length limits
    pub fn new(max_depth: usize, max_len: usize) -> Self {
        Self { max_depth, max_len }
    }

    /// Parse one complete literal
    ///
    /// # Examples
    ///
    /// ```
    /// use metafill_coerce::{Literal, LiteralParser};
    ///
    /// let parser = LiteralParser::new(8, 1024);
    /// let lit = parser.parse("['A', \"B\", C]").unwrap();
    /// assert_eq!(lit.into_texts(), vec!["A", "B", "C"]);
    /// ```
    pub fn parse(&self, input: &str) -> Result<Literal, LiteralError> {
        if input.len() > self.max_len {
            return Err(LiteralError::TooLong(input.len(), self.max_len));
        }

        let mut cursor = Cursor {
            chars: input.chars().collect(),
            pos: 0,
            max_depth: self.max_depth,
        };

        let value = cursor.value(0, false)?;
        cursor.skip_ws();
        if cursor.pos < cursor.chars.len() {
            return Err(LiteralError::TrailingInput(cursor.pos));
        }
        Ok(value)
    }
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    max_depth: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self, depth: usize, map_key: bool) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('[') => self.sequence(depth, ']'),
            Some('(') => self.sequence(depth, ')'),
            Some('{') => self.map(depth),
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.quoted(q).map(Literal::Text)
            }
            // Python string prefixes: u'..', b'..', r'..'
            Some('u' | 'b' | 'r' | 'U' | 'B' | 'R')
                if matches!(self.peek_at(1), Some('\'' | '"')) =>
            {
                self.pos += 1;
                let q = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
                self.quoted(q).map(Literal::Text)
            }
            Some(_) => self.bare(map_key),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, LiteralError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(LiteralError::TooDeep(self.max_depth));
        }
        Ok(depth)
    }

    fn sequence(&mut self, depth: usize, close: char) -> Result<Literal, LiteralError> {
        let depth = self.enter(depth)?;
        self.pos += 1;

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                break;
            }
            items.push(self.value(depth, false)?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => break,
                Some(c) => return Err(LiteralError::Unexpected(c, self.pos - 1)),
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
        Ok(Literal::List(items))
    }

    fn map(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        let depth = self.enter(depth)?;
        self.pos += 1;

        let mut entries = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            let key = self.value(depth, true)?;
            self.skip_ws();
            match self.bump() {
                Some(':') => {}
                Some(c) => return Err(LiteralError::Unexpected(c, self.pos - 1)),
                None => return Err(LiteralError::UnexpectedEnd),
            }
            let value = self.value(depth, false)?;
            entries.push((key, value));
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => break,
                Some(c) => return Err(LiteralError::Unexpected(c, self.pos - 1)),
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
        Ok(Literal::Map(entries))
    }

    fn quoted(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(LiteralError::UnexpectedEnd),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('u') => out.push(self.unicode_escape()?),
                    Some(c @ ('\\' | '\'' | '"' | '/')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let start = self.pos;
        let mut code = 0u32;
        for _ in 0..4 {
            let c = self.bump().ok_or(LiteralError::UnexpectedEnd)?;
            let digit = c.to_digit(16).ok_or(LiteralError::Unexpected(c, self.pos - 1))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiteralError::Unexpected('u', start))
    }

    fn bare(&mut self, map_key: bool) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let delimiter = matches!(c, ',' | ']' | ')' | '}' | '[' | '(' | '{')
                || (map_key && c == ':');
            if delimiter {
                break;
            }
            self.pos += 1;
        }

        let token: String = self.chars[start..self.pos].iter().collect();
        let token = token.trim();
        if token.is_empty() {
            return match self.peek() {
                Some(c) => Err(LiteralError::Unexpected(c, self.pos)),
                None => Err(LiteralError::UnexpectedEnd),
            };
        }

        Ok(match token {
            "None" | "null" | "NULL" => Literal::Null,
            _ => Literal::Text(token.to_string()),
        })
    }
}
