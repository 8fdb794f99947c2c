use super::normalize::{collapse_lines, normalize_text};
use super::plate_match::{extract_plate_candidate, is_known_plate};
use super::types::PlateCandidate;
use super::ExtractionError;

/// Raw OCR text to plate candidate: collapse lines, normalize, extract.
///
/// Never fails. Empty or garbage input simply yields `None`.
pub fn process(raw_ocr_text: &str) -> Option<PlateCandidate> {
    let single_line = collapse_lines(raw_ocr_text);
    let token = normalize_text(&single_line);
    let candidate = extract_plate_candidate(&token);

    tracing::debug!(
        raw_len = raw_ocr_text.len(),
        token_len = token.len(),
        found = candidate.is_some(),
        "Plate extraction"
    );

    candidate
}

/// Same as [`process`], but reports absence as `ExtractionError::NoCandidateFound`
/// for callers that surface "recognition failed" to the user.
pub fn recognize(raw_ocr_text: &str) -> Result<PlateCandidate, ExtractionError> {
    process(raw_ocr_text).ok_or(ExtractionError::NoCandidateFound)
}

/// Whether a canonical plate is already in the known list.
pub fn check<S: AsRef<str>>(candidate: &str, known: &[S]) -> bool {
    is_known_plate(candidate, known)
}
