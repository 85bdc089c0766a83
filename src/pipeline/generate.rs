//! Generation: ask the model to turn the uploaded PDF into Markdown.
//!
//! ## Request Layout
//!
//! One `contents` entry whose parts are, in this order:
//! 1. the system prompt text
//! 2. the user prompt text
//! 3. a `file_data` reference to the uploaded PDF
//!
//! No `generationConfig` is sent, so the configured temperature never
//! reaches the model. Only the first candidate of the response is used.

use crate::client::{error_body, GeminiClient};
use crate::error::Pdf2MdError;
use crate::pipeline::upload::RemoteFileReference;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Ordered text fragments of the first candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub fragments: Vec<String>,
}

impl GenerationResult {
    /// All fragments concatenated in order.
    pub fn text(&self) -> String {
        self.fragments.concat()
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 3],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    File { file_data: FileData<'a> },
}

#[derive(Debug, Serialize)]
struct FileData<'a> {
    file_uri: &'a str,
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_request<'a>(
    file: &'a RemoteFileReference,
    system_prompt: &'a str,
    user_prompt: &'a str,
) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: [Content {
            parts: [
                Part::Text {
                    text: system_prompt,
                },
                Part::Text { text: user_prompt },
                Part::File {
                    file_data: FileData {
                        file_uri: &file.uri,
                        mime_type: &file.mime_type,
                    },
                },
            ],
        }],
    }
}

/// `/v1beta/models/{model}:generateContent`, tolerating a `models/` prefix.
fn generate_path(model_name: &str) -> String {
    let model = model_name.trim();
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("/v1beta/models/{model}:generateContent")
}

/// Request Markdown for the uploaded file.
///
/// # Errors
/// - [`Pdf2MdError::GenerationHttp`] on a non-success status
/// - [`Pdf2MdError::Unexpected`] if the body is not JSON
/// - [`Pdf2MdError::NoCandidates`] if the response has zero candidates
/// - [`Pdf2MdError::EmptyCandidate`] if the first candidate has no text part
pub async fn generate(
    client: &GeminiClient,
    file: &RemoteFileReference,
    system_prompt: &str,
    user_prompt: &str,
    model_name: &str,
    api_key: &str,
) -> Result<GenerationResult, Pdf2MdError> {
    info!("Requesting generation from {}", model_name);

    let response = client
        .http()
        .post(client.endpoint(&generate_path(model_name)))
        .query(&[("key", api_key)])
        .json(&build_request(file, system_prompt, user_prompt))
        .send()
        .await
        .map_err(|e| Pdf2MdError::Unexpected(format!("generation request failed: {e}")))?;

    let status = response.status();
    debug!("Generation response: HTTP {}", status);
    let body = error_body(response).await;
    if !status.is_success() {
        debug!("Generation error body: {}", body);
        return Err(Pdf2MdError::GenerationHttp {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: GenerateResponse = serde_json::from_str(&body)
        .map_err(|e| Pdf2MdError::Unexpected(format!("malformed generation response: {e}")))?;
    debug!("Generation returned {} candidate(s)", parsed.candidates.len());

    let first = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or(Pdf2MdError::NoCandidates)?;

    let fragments: Vec<String> = first
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if fragments.is_empty() {
        let finish_reason = first
            .finish_reason
            .unwrap_or_else(|| "UNSPECIFIED".to_string());
        warn!("First candidate has no text, finish reason {}", finish_reason);
        return Err(Pdf2MdError::EmptyCandidate { finish_reason });
    }

    Ok(GenerationResult { fragments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn file_ref() -> RemoteFileReference {
        RemoteFileReference {
            uri: "files/abc".into(),
            mime_type: "application/pdf".into(),
        }
    }

    #[test]
    fn request_parts_are_in_fixed_order_without_temperature() {
        let file = file_ref();
        let body = serde_json::to_value(build_request(&file, "SYS", "USER")).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"text": "SYS"},
                        {"text": "USER"},
                        {"file_data": {"file_uri": "files/abc", "mime_type": "application/pdf"}}
                    ]
                }]
            })
        );
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn generate_path_strips_models_prefix() {
        assert_eq!(
            generate_path("gemini-2.0-flash"),
            "/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            generate_path("models/gemini-1.5-pro"),
            "/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn text_concatenates_fragments() {
        let r = GenerationResult {
            fragments: vec!["# A".into(), "\nbody".into()],
        };
        assert_eq!(r.text(), "# A\nbody");
    }

    #[tokio::test]
    async fn returns_first_candidate_fragments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "k"))
            .and(body_json(json!({
                "contents": [{"parts": [
                    {"text": "S"},
                    {"text": "U"},
                    {"file_data": {"file_uri": "files/abc", "mime_type": "application/pdf"}}
                ]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "one"}, {"inlineData": {}}, {"text": "two"}]}},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri()).unwrap();
        let result = generate(&client, &file_ref(), "S", "U", "gemini-2.0-flash", "k")
            .await
            .unwrap();
        assert_eq!(result.fragments, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn empty_candidates_is_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri()).unwrap();
        let err = generate(&client, &file_ref(), "S", "U", "m", "k")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::NoCandidates));
    }

    #[tokio::test]
    async fn blocked_candidate_is_empty_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri()).unwrap();
        let err = generate(&client, &file_ref(), "S", "U", "m", "k")
            .await
            .unwrap_err();
        match err {
            Pdf2MdError::EmptyCandidate { finish_reason } => assert_eq!(finish_reason, "SAFETY"),
            other => panic!("expected EmptyCandidate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn candidate_without_text_parts_is_empty_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"inlineData": {}}]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri()).unwrap();
        let err = generate(&client, &file_ref(), "S", "U", "m", "k")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::EmptyCandidate { .. }));
    }

    #[tokio::test]
    async fn http_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = GeminiClient::with_base_url(server.uri()).unwrap();
        let err = generate(&client, &file_ref(), "S", "U", "m", "k")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
