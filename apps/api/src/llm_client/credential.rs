//! Credential gate. Runs before any provider call; fails closed.

/// Substrings that mark a key copied from a template rather than issued by a provider.
pub const PLACEHOLDER_MARKERS: &[&str] = &["INSERT_YOUR", "sk-proj-your", "CHANGE_THIS", "YOUR_API_KEY"];

/// Returns true only for a present, non-blank key that carries no placeholder marker.
pub fn is_valid(credential: Option<&str>) -> bool {
    let Some(key) = credential.map(str::trim) else {
        return false;
    };
    if key.is_empty() {
        return false;
    }
    !PLACEHOLDER_MARKERS.iter().any(|marker| key.contains(marker))
}
