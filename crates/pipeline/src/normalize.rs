//! Chat text canonicalization for trigger matching.

/// Characters dropped outright: punctuation, double quotes (straight and
/// curly) and carriage returns.
const STRIPPED: &[char] = &[
    '\\', '.', ',', '@', '#', '!', '?', '$', '%', '&', ';', ':', '{', '}', '=', '_', '`', '~',
    '[', ']', '"', '\u{201C}', '\u{201D}', '\r',
];

/// Lowercase, strip punctuation and quotes, collapse whitespace, trim.
///
/// Stripping happens before whitespace collapsing, so `"a . b"` becomes
/// `"a b"`. The output never contains a stripped character, a whitespace
/// character other than a single ASCII space, or leading/trailing spaces,
/// which makes the function idempotent.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for ch in lowered.chars() {
        if STRIPPED.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() || ch == '\u{FEFF}' {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }

    out
}
