use reqwest::blocking::multipart;

use super::types::{OcrEngine, OcrResponse};
use super::ExtractionError;
use crate::config::OcrConfig;

/// OCR.space HTTP client.
pub struct OcrSpaceClient {
    endpoint: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OcrSpaceClient {
    pub fn new(config: &OcrConfig) -> Result<Self, ExtractionError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ExtractionError::NotConfigured("missing OCR API key".into()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key,
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl OcrEngine for OcrSpaceClient {
    fn recognize_image(
        &self,
        image_bytes: &[u8],
        file_name: &str,
    ) -> Result<OcrResponse, ExtractionError> {
        let _span = tracing::info_span!(
            "ocr_space_recognize",
            image_size = image_bytes.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let part = multipart::Part::bytes(image_bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| ExtractionError::HttpClient(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ExtractionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::OcrProvider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OcrResponse = response
            .json()
            .map_err(|e| ExtractionError::ResponseParsing(e.to_string()))?;

        if parsed.is_errored_on_processing {
            return Err(ExtractionError::OcrProcessing(parsed.error_message.join("; ")));
        }

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            blocks = parsed.parsed_results.len(),
            "OCR request complete"
        );

        Ok(parsed)
    }
}

/// Mock OCR engine for testing — returns a configurable text block.
pub struct MockOcrEngine {
    text: Option<String>,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    /// Engine whose responses carry no text block at all.
    pub fn empty() -> Self {
        Self { text: None }
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize_image(
        &self,
        _image_bytes: &[u8],
        _file_name: &str,
    ) -> Result<OcrResponse, ExtractionError> {
        Ok(match &self.text {
            Some(text) => OcrResponse::from_text(text),
            None => OcrResponse::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Duration;

    /// Serve exactly one HTTP response on a local port; returns the endpoint URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_millis(500)))
                .unwrap();
            drain_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        });
        format!("http://{addr}/parse/image")
    }

    /// Read headers and the declared body so the client sees a clean exchange.
    fn drain_request(stream: &mut impl Read) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());
            match content_length {
                Some(len) if buf.len() >= header_end + 4 + len => return,
                Some(_) => continue,
                // Chunked upload: stop at the terminating chunk.
                None if buf.ends_with(b"0\r\n\r\n") => return,
                None => continue,
            }
        }
    }

    fn client_for(endpoint: String) -> OcrSpaceClient {
        OcrSpaceClient::new(&OcrConfig {
            endpoint,
            api_key: Some("key".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn config(api_key: Option<&str>) -> OcrConfig {
        OcrConfig {
            endpoint: "http://127.0.0.1:9/parse/image".into(),
            api_key: api_key.map(String::from),
            timeout_secs: 1,
        }
    }

    #[test]
    fn client_requires_api_key() {
        assert!(matches!(
            OcrSpaceClient::new(&config(None)),
            Err(ExtractionError::NotConfigured(_))
        ));
        assert!(matches!(
            OcrSpaceClient::new(&config(Some("  "))),
            Err(ExtractionError::NotConfigured(_))
        ));
    }

    #[test]
    fn client_keeps_endpoint() {
        let client = OcrSpaceClient::new(&config(Some("key"))).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/parse/image");
    }

    #[test]
    fn unreachable_provider_is_http_error() {
        let client = OcrSpaceClient::new(&config(Some("key"))).unwrap();
        let result = client.recognize_image(b"not really a jpeg", "plate.jpg");
        assert!(matches!(result, Err(ExtractionError::HttpClient(_))));
    }

    #[test]
    fn non_success_status_is_provider_error() {
        let client = client_for(serve_once("500 Internal Server Error", "boom"));
        match client.recognize_image(b"jpeg", "plate.jpg") {
            Err(ExtractionError::OcrProvider { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected OcrProvider, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_parse_error() {
        let client = client_for(serve_once("200 OK", "<html>not json</html>"));
        assert!(matches!(
            client.recognize_image(b"jpeg", "plate.jpg"),
            Err(ExtractionError::ResponseParsing(_))
        ));
    }

    #[test]
    fn provider_processing_error_is_reported() {
        let client = client_for(serve_once(
            "200 OK",
            r#"{"IsErroredOnProcessing":true,"ErrorMessage":["E101","Timed out"]}"#,
        ));
        match client.recognize_image(b"jpeg", "plate.jpg") {
            Err(ExtractionError::OcrProcessing(msg)) => assert_eq!(msg, "E101; Timed out"),
            other => panic!("expected OcrProcessing, got {other:?}"),
        }
    }

    #[test]
    fn successful_response_yields_first_text() {
        let client = client_for(serve_once(
            "200 OK",
            r#"{"ParsedResults":[{"ParsedText":"30F 25658\r\n"}],"IsErroredOnProcessing":false}"#,
        ));
        let resp = client.recognize_image(b"jpeg", "plate.jpg").unwrap();
        assert_eq!(resp.first_text(), "30F 25658\r\n");
    }

    #[test]
    fn mock_engine_returns_text() {
        let engine = MockOcrEngine::new("30F 25658");
        let resp = engine.recognize_image(&[], "plate.jpg").unwrap();
        assert_eq!(resp.first_text(), "30F 25658");
    }

    #[test]
    fn mock_engine_empty() {
        let resp = MockOcrEngine::empty().recognize_image(&[], "plate.jpg").unwrap();
        assert_eq!(resp.first_text(), "");
    }
}
