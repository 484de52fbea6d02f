//! Cache key derivation for preview thumbnails

/// Characters dropped from cache keys
const STRIPPED: &[char] = &['[', ']', '(', ')', '\'', '"', ':', ','];

/// Map a file stem to a filesystem-safe cache key.
///
/// Runs of whitespace collapse into a single `-` and the characters
/// `[ ] ( ) ' " : ,` are removed. Distinct stems can share a key
/// (`"Vol (1)"` and `"Vol 1"` both become `"Vol-1"`); they then share a
/// cached thumbnail.
pub fn sanitize(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                key.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if !STRIPPED.contains(&c) {
            key.push(c);
        }
    }

    key
}
