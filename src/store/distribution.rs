//! Text encoding of `id -> count` mappings.
//!
//! Written as compact JSON objects. Reading tries strict JSON first and falls
//! back to a lenient literal reader that also accepts single-quoted strings,
//! bare numeric keys, trailing commas and a `Counter(...)` wrapper, which is how
//! older result files encoded the same mapping.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::StoreError;
use crate::types::identifiers::CandidateId;

pub type Counts = BTreeMap<CandidateId, u64>;

pub fn encode<T: Serialize>(distribution: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(distribution)?)
}

pub fn decode(raw: &str) -> Result<Counts, StoreError> {
    match serde_json::from_str::<Counts>(raw) {
        Ok(counts) => Ok(counts),
        Err(json_err) => {
            tracing::debug!(
                "Strict JSON distribution parse failed ({json_err}), trying literal form"
            );
            LiteralReader::new(raw).read().map_err(|reason| StoreError::Distribution {
                reason: format!("{reason} (json: {json_err})"),
                raw: preview(raw),
            })
        }
    }
}

fn preview(raw: &str) -> String {
    const MAX: usize = 80;
    match raw.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

struct LiteralReader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> LiteralReader<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn read(mut self) -> Result<Counts, String> {
        self.skip_ws();
        let wrapped = self.eat_word("Counter(");
        self.skip_ws();
        let counts = self.read_map()?;
        self.skip_ws();
        if wrapped && !self.eat(')') {
            return Err("unterminated Counter(".to_string());
        }
        self.skip_ws();
        if self.pos != self.src.len() {
            return Err(format!("trailing input at byte {}", self.pos));
        }
        Ok(counts)
    }

    fn read_map(&mut self) -> Result<Counts, String> {
        if !self.eat('{') {
            return Err(format!("expected '{{' at byte {}", self.pos));
        }
        let mut counts = Counts::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(counts);
            }
            let key = self.read_key()?;
            self.skip_ws();
            if !self.eat(':') {
                return Err(format!("expected ':' at byte {}", self.pos));
            }
            self.skip_ws();
            let value = self.read_count()?;
            *counts.entry(CandidateId::new(key)).or_insert(0) += value;
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(counts);
            }
            return Err(format!("expected ',' or '}}' at byte {}", self.pos));
        }
    }

    fn read_key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                let mut key = String::new();
                while let Some(c) = self.peek() {
                    self.pos += c.len_utf8();
                    if c == q {
                        return Ok(key);
                    }
                    if c != '\\' {
                        key.push(c);
                        continue;
                    }
                    let escaped = self.peek().ok_or("unterminated escape in string key")?;
                    self.pos += escaped.len_utf8();
                    match escaped {
                        '\\' | '\'' | '"' => key.push(escaped),
                        'n' => key.push('\n'),
                        't' => key.push('\t'),
                        'r' => key.push('\r'),
                        // Unknown escapes keep the backslash.
                        other => {
                            key.push('\\');
                            key.push(other);
                        }
                    }
                }
                Err("unterminated string key".to_string())
            }
            Some(c) if is_bare_key_char(c) => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if is_bare_key_char(c) || c == '.') {
                    self.pos += 1;
                }
                Ok(self.src[start..self.pos].to_string())
            }
            _ => Err(format!("expected key at byte {}", self.pos)),
        }
    }

    fn read_count(&mut self) -> Result<u64, String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.src[start..self.pos]
            .parse::<u64>()
            .map_err(|_| format!("expected non-negative integer count at byte {start}"))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.src[self.pos..].starts_with(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
