//! Restricted reader for the object literals embedded in the hourly scripts.
//!
//! Each hour is emitted as `new HourlyForecastElement({ ... })` with one
//! `key: value,` pair per line. Only that shape is accepted: identifier or
//! quoted key, a colon, then a string, number, `true`, `false` or `null`.
//! Nothing is ever evaluated.

use crate::types::{ScriptValue, StructuralError};

/// The text between the first `({` and the last `})`, trimmed.
pub fn extract_payload(script: &str) -> Result<&str, StructuralError> {
    let start = script
        .find("({")
        .ok_or_else(|| StructuralError::MalformedScript("no `({` opener".into()))?
        + 2;
    let end = script
        .rfind("})")
        .ok_or_else(|| StructuralError::MalformedScript("no `})` closer".into()))?;
    if end < start {
        return Err(StructuralError::MalformedScript(
            "`})` closer precedes `({` opener".into(),
        ));
    }
    Ok(script[start..end].trim())
}

/// Parse every non-blank line of a payload, in order.
pub fn parse_object(payload: &str) -> Result<Vec<(String, ScriptValue)>, StructuralError> {
    let mut pairs = Vec::new();
    for (idx, raw) in payload.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let pair = parse_line(line).map_err(|reason| StructuralError::ScriptLine {
            line_no: idx + 1,
            line: line.to_string(),
            reason,
        })?;
        pairs.push(pair);
    }
    Ok(pairs)
}

/// `key: value` with an optional trailing comma.
pub fn parse_line(line: &str) -> Result<(String, ScriptValue), String> {
    let mut cur = Cursor::new(line);
    cur.skip_ws();
    let key = cur.key()?;
    cur.skip_ws();
    cur.expect(':')?;
    cur.skip_ws();
    let value = cur.value()?;
    cur.skip_ws();
    if cur.peek() == Some(',') {
        cur.bump();
        cur.skip_ws();
    }
    match cur.peek() {
        None => Ok((key, value)),
        Some(c) => Err(format!("unexpected `{c}` after value")),
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
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
            Some(c) => Err(format!("expected `{want}`, found `{c}`")),
            None => Err(format!("expected `{want}`, found end of line")),
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.string(q),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
                Ok(self.take_while(is_ident_char).to_string())
            }
            Some(c) => Err(format!("invalid key start `{c}`")),
            None => Err("missing key".into()),
        }
    }

    fn value(&mut self) -> Result<ScriptValue, String> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.string(q).map(ScriptValue::Text),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() => match self.take_while(is_ident_char) {
                "true" => Ok(ScriptValue::Bool(true)),
                "false" => Ok(ScriptValue::Bool(false)),
                "null" => Ok(ScriptValue::Null),
                word => Err(format!("unsupported value `{word}`")),
            },
            Some(c) => Err(format!("unsupported value starting with `{c}`")),
            None => Err("missing value".into()),
        }
    }

    fn number(&mut self) -> Result<ScriptValue, String> {
        let text = self.take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
        let unsigned = text.strip_prefix('+').unwrap_or(text);
        if unsigned.contains(['.', 'e', 'E']) {
            unsigned
                .parse::<f64>()
                .map(ScriptValue::Float)
                .map_err(|_| format!("invalid number `{text}`"))
        } else {
            unsigned
                .parse::<i64>()
                .map(ScriptValue::Int)
                .map_err(|_| format!("invalid number `{text}`"))
        }
    }

    fn string(&mut self, quote: char) -> Result<String, String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err("unterminated string".into()),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, String> {
        match self.bump() {
            Some(c @ ('"' | '\'' | '\\' | '/')) => Ok(c),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => {
                let start = self.pos;
                for _ in 0..4 {
                    if !self.bump().is_some_and(|c| c.is_ascii_hexdigit()) {
                        return Err("invalid \\u escape".into());
                    }
                }
                u32::from_str_radix(&self.src[start..self.pos], 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| "invalid \\u escape".to_string())
            }
            Some(c) => Err(format!("unsupported escape `\\{c}`")),
            None => Err("unterminated string".into()),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
