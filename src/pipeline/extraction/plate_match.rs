use std::sync::LazyLock;

use regex::Regex;

use super::types::{CanonicalToken, PlateCandidate};

/// 2 digits, optional `-`, 1-2 letters, optional `-`, 3-5 digits.
static PLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{2}-?[A-Z]{1,2}-?[0-9]{3,5}").unwrap());

/// Leftmost plate-shaped substring of a canonical token.
///
/// Shape heuristic only: no issuing-authority rules, no ranking of
/// alternatives. `None` when nothing matches.
pub fn extract_plate_candidate(canonical: &CanonicalToken) -> Option<PlateCandidate> {
    PLATE_PATTERN.find(canonical.as_str()).map(|m| PlateCandidate {
        text: m.as_str().to_string(),
        span: m.range(),
    })
}

/// Exact, case-sensitive membership of `candidate` in `known_plates`.
pub fn is_known_plate<S: AsRef<str>>(candidate: &str, known_plates: &[S]) -> bool {
    known_plates.iter().any(|k| k.as_ref() == candidate)
}
