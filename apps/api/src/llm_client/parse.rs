//! Resilient parser: strict JSON first, then the permissive literal evaluator.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::literal::{parse_literal, LiteralError};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response contained no payload")]
    Empty,

    #[error("payload is neither JSON ({strict}) nor a permissive literal ({permissive})")]
    Unparsable {
        strict: serde_json::Error,
        permissive: LiteralError,
    },
}

/// Parses normalized model output into a JSON value.
pub fn parse(candidate: &str) -> Result<Value, ParseError> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Err(ParseError::Empty);
    }

    match serde_json::from_str(candidate) {
        Ok(value) => Ok(value),
        Err(strict) => {
            debug!("Strict JSON parse failed ({strict}), trying permissive literal syntax");
            parse_literal(candidate).map_err(|permissive| ParseError::Unparsable { strict, permissive })
        }
    }
}
