use super::types::CanonicalToken;

/// Glyphs OCR tends to produce in place of a plain hyphen.
const DASH_LIKE: &[char] = &['•', '·', '\u{2013}', '\u{2014}', '_'];

/// Join all lines of raw OCR text by deleting `\n` (no space is inserted).
pub fn collapse_lines(text: &str) -> String {
    text.chars().filter(|&c| c != '\n').collect()
}

/// Reduce text to its canonical token.
///
/// Order matters: upper-case, drop whitespace, drop `.` and `,`, then map
/// dash-like glyphs to `-`. Letters, digits and other punctuation pass
/// through untouched.
pub fn normalize_text(text: &str) -> CanonicalToken {
    let upper = text.to_uppercase();
    let normalized = upper
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| !matches!(c, '.' | ','))
        .map(|c| if DASH_LIKE.contains(&c) { '-' } else { c })
        .collect();
    CanonicalToken::from_normalized(normalized)
}
