//! Permissive literal evaluator for model output that is almost JSON.
//!
//! Accepts everything strict JSON accepts plus single-quoted strings,
//! `True` / `False` / `None`, parenthesised tuples (read as arrays) and
//! trailing commas. Produces a `serde_json::Value` so callers validate a
//! single representation.

use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Same nesting limit `serde_json` enforces.
const MAX_DEPTH: usize = 128;

pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        src: input,
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos != input.len() {
        return Err(parser.error("trailing characters after literal"));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: &str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('{') => self.nested(Self::object),
            Some('[') => self.nested(|p| p.sequence(']')),
            Some('(') => self.nested(|p| p.sequence(')')),
            Some(quote @ ('"' | '\'')) => self.string(quote).map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some(quote @ ('"' | '\'')) => self.string(quote)?,
                _ => return Err(self.error("expected a quoted key")),
            };

            self.skip_ws();
            if self.bump() != Some(':') {
                return Err(self.error("expected ':' after key"));
            }
            self.skip_ws();
            let value = self.value()?;
            map.insert(key, value);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn sequence(&mut self, close: char) -> Result<Value, LiteralError> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(c) if c == close => return Ok(Value::Array(items)),
                _ => return Err(self.error("expected ',' or closing bracket")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(self.error("unterminated escape")),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('0') => out.push('\0'),
                    Some('u') => out.push(self.unicode_escape()?),
                    Some(other) => out.push(other),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let src = self.src;
        let hex = src
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("short unicode escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos += 4;
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | '_'))
        {
            self.bump();
        }

        let digits: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();
        let digits = digits.strip_prefix('+').unwrap_or(&digits);

        if let Ok(int) = digits.parse::<i64>() {
            return Ok(Value::Number(int.into()));
        }
        digits
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| LiteralError {
                offset: start,
                message: format!("invalid number '{digits}'"),
            })
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            other => Err(LiteralError {
                offset: start,
                message: format!("unknown identifier '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_single_quoted_python_dict() {
        let value = parse_literal(
            "{'title': 'Two Sum', 'difficulty': 'Easy', 'test_cases': [{'input': '[2,7], 9', 'output': '[0,1]'}]}",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Two Sum",
                "difficulty": "Easy",
                "test_cases": [{"input": "[2,7], 9", "output": "[0,1]"}]
            })
        );
    }

    #[test]
    fn test_python_keywords_and_tuples() {
        let value = parse_literal("{'ok': True, 'skip': False, 'extra': None, 'pair': (1, 2.5)}").unwrap();
        assert_eq!(
            value,
            json!({"ok": true, "skip": false, "extra": null, "pair": [1, 2.5]})
        );
    }

    #[test]
    fn test_trailing_commas_are_tolerated() {
        let value = parse_literal("[{'a': 1,}, {'b': -2,},]").unwrap();
        assert_eq!(value, json!([{"a": 1}, {"b": -2}]));
    }

    #[test]
    fn test_escapes_inside_strings() {
        let value = parse_literal(r#"['it\'s', "line\nbreak", 'é']"#).unwrap();
        assert_eq!(value, json!(["it's", "line\nbreak", "é"]));
    }

    #[test]
    fn test_mixed_quotes_do_not_terminate_each_other() {
        let value = parse_literal(r#"{'summary': "don't panic", "q": 'say "hi"'}"#).unwrap();
        assert_eq!(value, json!({"summary": "don't panic", "q": "say \"hi\""}));
    }

    #[test]
    fn test_unknown_identifier_is_rejected() {
        let err = parse_literal("{'a': undefined}").unwrap_err();
        assert!(err.message.contains("undefined"));
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn test_unterminated_structure_is_rejected() {
        assert!(parse_literal("[1, 2").is_err());
        assert!(parse_literal("{'a': 'open").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected_without_recursing_further() {
        let deep = format!("{}{}", "[".repeat(5_000), "]".repeat(5_000));
        let err = parse_literal(&deep).unwrap_err();
        assert_eq!(err.message, "nesting too deep");
        assert_eq!(err.offset, MAX_DEPTH);

        let mixed = format!("{}{}", "{'a': (".repeat(3_000), ")}".repeat(3_000));
        assert!(parse_literal(&mixed).is_err());
    }

    #[test]
    fn test_nesting_at_the_limit_is_accepted() {
        let edge = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&edge).is_ok());
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        assert!(parse_literal("[1] and more").is_err());
    }
}
