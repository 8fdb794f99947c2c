use std::fmt;
use std::ops::{Deref, Range};

use serde::{Deserialize, Deserializer, Serialize};

use super::ExtractionError;

/// Upper-case, whitespace-free form of recognized text.
///
/// Only `normalize_text` builds one, so holders can rely on: no whitespace,
/// no `.`/`,`, and `-` as the only dash-like separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalToken(String);

impl CanonicalToken {
    pub(super) fn from_normalized(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for CanonicalToken {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plate-shaped substring found inside a canonical token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlateCandidate {
    pub text: String,
    /// Byte span of `text` within the token it was taken from.
    pub span: Range<usize>,
}

impl PlateCandidate {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for PlateCandidate {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for PlateCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// ──────────────────────────────────────────────
// OCR provider boundary
// ──────────────────────────────────────────────

/// Parsed response of the OCR provider (OCR.space JSON shape).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrResponse {
    #[serde(rename = "ParsedResults", default)]
    pub parsed_results: Vec<ParsedResult>,
    #[serde(rename = "IsErroredOnProcessing", default)]
    pub is_errored_on_processing: bool,
    #[serde(
        rename = "ErrorMessage",
        default,
        deserialize_with = "string_or_list"
    )]
    pub error_message: Vec<String>,
}

/// One text block of an OCR response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    pub parsed_text: Option<String>,
}

impl OcrResponse {
    /// Response carrying a single text block (used by test doubles).
    pub fn from_text(text: &str) -> Self {
        Self {
            parsed_results: vec![ParsedResult {
                parsed_text: Some(text.to_string()),
            }],
            ..Self::default()
        }
    }

    /// Raw text of the first block, or `""` when the provider returned none.
    pub fn first_text(&self) -> &str {
        self.parsed_results
            .first()
            .and_then(|r| r.parsed_text.as_deref())
            .unwrap_or("")
    }
}

/// The provider sends `ErrorMessage` as a string, a list of strings, or null.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine: Send + Sync {
    fn recognize_image(
        &self,
        image_bytes: &[u8],
        file_name: &str,
    ) -> Result<OcrResponse, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_text_of_full_response() {
        let json = r#"{
            "ParsedResults": [
                {"ParsedText": "30F 25658\r\n", "FileParseExitCode": 1},
                {"ParsedText": "second"}
            ],
            "OCRExitCode": 1,
            "IsErroredOnProcessing": false,
            "ProcessingTimeInMilliseconds": "421"
        }"#;
        let resp: OcrResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_text(), "30F 25658\r\n");
        assert!(!resp.is_errored_on_processing);
        assert!(resp.error_message.is_empty());
    }

    #[test]
    fn first_text_empty_when_no_blocks() {
        let resp: OcrResponse = serde_json::from_str(r#"{"OCRExitCode": 3}"#).unwrap();
        assert_eq!(resp.first_text(), "");
    }

    #[test]
    fn first_text_empty_when_block_has_no_text() {
        let resp: OcrResponse =
            serde_json::from_str(r#"{"ParsedResults": [{"ParsedText": null}]}"#).unwrap();
        assert_eq!(resp.first_text(), "");
    }

    #[test]
    fn error_message_accepts_string_or_list() {
        let one: OcrResponse = serde_json::from_str(
            r#"{"IsErroredOnProcessing": true, "ErrorMessage": "Invalid API key"}"#,
        )
        .unwrap();
        assert_eq!(one.error_message, vec!["Invalid API key"]);

        let many: OcrResponse = serde_json::from_str(
            r#"{"IsErroredOnProcessing": true, "ErrorMessage": ["E101", "Timed out"]}"#,
        )
        .unwrap();
        assert_eq!(many.error_message.len(), 2);

        let null: OcrResponse = serde_json::from_str(r#"{"ErrorMessage": null}"#).unwrap();
        assert!(null.error_message.is_empty());
    }

    #[test]
    fn canonical_token_derefs_to_str() {
        let token = CanonicalToken::from_normalized("30F25658".into());
        assert_eq!(&*token, "30F25658");
        assert_eq!(token.len(), 8);
        assert_eq!(token.to_string(), "30F25658");
    }
}
