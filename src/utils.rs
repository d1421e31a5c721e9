//! Small string helpers shared by the network layer and the renderers.
//!
//! - Log-friendly truncation of upstream bodies
//! - JSON error classification for cut-off responses
//! - Width-bounded clipping for fixed-width terminal layouts

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended. Truncation always lands on a character
/// boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A body cut off mid-transfer fails with an EOF error rather than a
/// syntax error; the distinction makes the failure message clearer.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Clip `s` to at most `width` characters, marking the cut with `…`.
pub fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Clip and right-pad `s` to exactly `width` characters.
pub fn fit(s: &str, width: usize) -> String {
    let clipped = clip(s, width);
    let pad = width - clipped.chars().count();
    format!("{}{}", clipped, " ".repeat(pad))
}
