// Shared prompt fragments.
// Each module that calls the LLM keeps its own prompts.rs alongside it;
// only cross-cutting fragments live here.

/// Closing instruction appended to every structured-output prompt.
pub const RAW_JSON_INSTRUCTION: &str = "IMPORTANT:\n\
    - NO Markdown formatting (no ```json).\n\
    - NO introductory text.\n\
    - Valid JSON only.";

/// Fills `{key}` placeholders in a single scan of `template`.
///
/// Inserted values are never scanned again, so caller text containing
/// `{code}` or `{transcript}` lands in the prompt verbatim. Braces that do
/// not name a known key are copied through unchanged.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match known {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
