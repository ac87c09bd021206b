//! `Cookie` header parsing and formatting.

use crate::Pairs;

/// Punctuation allowed in cookie keys and values, next to ASCII alphanumerics.
const ALLOWED: &str = "!#$%&'()*+-./:<=>?@[]^_`{|}~";

/// Parse a `Cookie` header value.
///
/// Splits on `;`, then every segment on its first `=`, and sanitizes both sides.
///
/// This is more lenient than sanitizing every segment as-is: whitespace after a `;` is skipped
/// rather than turned into `~` (`" b=1"` gives key `b`, not `~b`), and segments without a `=` are
/// dropped rather than merged into the next key (`"a;b=1"` gives key `b`, not `a~b`).
pub fn parse(text: &str) -> Pairs {
    let mut pairs = Pairs::new();

    for segment in text.split(';') {
        let segment = segment.trim_start_matches([' ', '\t']);
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };

        pairs.append(sanitize(key), sanitize(value));
    }

    pairs
}

/// Replace every character not allowed in a cookie with `~`.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || ALLOWED.contains(c) {
                c
            } else {
                '~'
            }
        })
        .collect()
}

/// Format pairs as a cookie string, `key=value` joined by `;`.
pub fn format(pairs: &Pairs) -> String {
    let mut text = String::new();

    for (i, pair) in pairs.iter().enumerate() {
        if i != 0 {
            text.push(';');
        }

        text.push_str(&pair.key);
        text.push('=');
        text.push_str(&pair.value);
    }

    text
}
