//! Response normalizer: best-effort recovery of a JSON payload embedded in model text.
//!
//! Order: trim, unwrap markdown fences, then slice the outermost bracketed payload
//! according to the shape the task expects. This is a heuristic, not a parser:
//! it assumes the payload is contiguous. Unrelated brackets in prose around an
//! array payload can still mis-slice it.

/// The container shape a task expects back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// First `[` to last `]`.
    Array,
    /// Whichever of `{` / `[` opens first, up to its matching closer.
    ObjectOrArray,
}

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Returns the candidate JSON text extracted from `raw`.
pub fn normalize(raw: &str, shape: Shape) -> String {
    let text = strip_fences(raw.trim());
    let sliced = match shape {
        Shape::Array => slice_first_to_last(text, '[', ']'),
        Shape::ObjectOrArray => slice_balanced(text),
    };
    sliced.unwrap_or(text).trim().to_string()
}

/// Interior of the first ```` ```json ```` fence, else of the first fence of any kind.
fn strip_fences(text: &str) -> &str {
    if let Some(start) = text.find(JSON_FENCE) {
        let body = &text[start + JSON_FENCE.len()..];
        return until_fence(body);
    }

    if let Some(start) = text.find(FENCE) {
        let after = &text[start + FENCE.len()..];
        let body = match after.find('\n') {
            Some(nl) if is_info_string(&after[..nl]) => &after[nl + 1..],
            _ => after,
        };
        return until_fence(body);
    }

    text
}

fn until_fence(body: &str) -> &str {
    body.find(FENCE).map_or(body, |end| &body[..end]).trim()
}

/// The language tag after an opening fence, e.g. `python` or `JSON`.
fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '.'))
}

fn slice_first_to_last(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}

fn slice_balanced(text: &str) -> Option<&str> {
    let (start, open) = text.char_indices().find(|(_, c)| matches!(c, '{' | '['))?;
    let close = if open == '{' { '}' } else { ']' };

    match matching_close(&text[start..], open, close) {
        Some(len) => Some(&text[start..start + len]),
        None => text
            .rfind(close)
            .filter(|&end| end > start)
            .map(|end| &text[start..=end]),
    }
}

/// Byte length of the balanced span that begins with `open`. Brackets inside
/// quoted strings (single or double) do not count.
fn matching_close(span: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in span.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        if c == '"' || c == '\'' {
            quote = Some(c);
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + c.len_utf8());
            }
        }
    }

    None
}
