//! Resumable upload of the PDF to the Gemini file API.
//!
//! The protocol has two phases:
//!
//! 1. `start`: declare byte length and MIME type; the server answers with a
//!    single-use session URL in the `x-goog-upload-url` header.
//! 2. `upload, finalize`: send bytes at an offset and close the session.
//!
//! The protocol allows many chunks and resuming after a dropped connection.
//! We always send one chunk at offset 0 covering the whole file, so a very
//! large file or a flaky link has no recovery path other than starting over.
//! Abandoned sessions are left to expire on the server.

use crate::client::{error_body, GeminiClient};
use crate::error::Pdf2MdError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const UPLOAD_PATH: &str = "/upload/v1beta/files";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// A started upload session. Consumed by [`finalize_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    pub upload_url: String,
    pub byte_len: usize,
    pub mime_type: String,
}

/// Server-side handle for the uploaded bytes.
///
/// Short-lived; only valid for a single generation call in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileReference {
    pub uri: String,
    pub mime_type: String,
}

#[derive(Serialize)]
struct StartRequest<'a> {
    file: StartFile<'a>,
}

#[derive(Serialize)]
struct StartFile<'a> {
    display_name: &'a str,
}

#[derive(Deserialize)]
struct FinalizeResponse {
    file: Option<UploadedFile>,
}

#[derive(Deserialize)]
struct UploadedFile {
    uri: Option<String>,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

/// Open an upload session for `bytes`.
///
/// # Errors
/// - [`Pdf2MdError::UploadStart`] on a non-success status
/// - [`Pdf2MdError::MissingUploadUrl`] if the session header is absent
pub async fn start_upload(
    client: &GeminiClient,
    bytes: &[u8],
    display_name: &str,
    mime_type: &str,
    api_key: &str,
) -> Result<UploadSession, Pdf2MdError> {
    let byte_len = bytes.len();
    info!("Starting upload session for '{}' ({} bytes)", display_name, byte_len);

    let response = client
        .http()
        .post(client.endpoint(UPLOAD_PATH))
        .query(&[("key", api_key)])
        .header("X-Goog-Upload-Protocol", "resumable")
        .header("X-Goog-Upload-Command", "start")
        .header("X-Goog-Upload-Header-Content-Length", byte_len.to_string())
        .header("X-Goog-Upload-Header-Content-Type", mime_type)
        .header("Content-Type", "application/json")
        .json(&StartRequest {
            file: StartFile { display_name },
        })
        .send()
        .await
        .map_err(|e| Pdf2MdError::Unexpected(format!("upload session request failed: {e}")))?;

    let status = response.status();
    debug!("Upload start response: HTTP {}", status);
    if !status.is_success() {
        let body = error_body(response).await;
        debug!("Upload start error body: {}", body);
        return Err(Pdf2MdError::UploadStart {
            status: status.as_u16(),
            body,
        });
    }

    let upload_url = response
        .headers()
        .get(UPLOAD_URL_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(Pdf2MdError::MissingUploadUrl)?
        .to_string();
    debug!("Upload URL: {}", upload_url);

    Ok(UploadSession {
        upload_url,
        byte_len,
        mime_type: mime_type.to_string(),
    })
}

/// Send all bytes to the session URL and close the session.
///
/// # Errors
/// - [`Pdf2MdError::UploadContent`] on a non-success status
/// - [`Pdf2MdError::Unexpected`] if the body is not JSON
/// - [`Pdf2MdError::MissingFileUri`] if the JSON has no `file.uri`
pub async fn finalize_upload(
    client: &GeminiClient,
    session: &UploadSession,
    bytes: &[u8],
) -> Result<RemoteFileReference, Pdf2MdError> {
    if bytes.len() != session.byte_len {
        return Err(Pdf2MdError::Unexpected(format!(
            "upload session declared {} bytes but {} were supplied",
            session.byte_len,
            bytes.len()
        )));
    }

    let response = client
        .http()
        .post(&session.upload_url)
        .header("Content-Type", session.mime_type.as_str())
        .header("X-Goog-Upload-Offset", "0")
        .header("X-Goog-Upload-Command", "upload, finalize")
        .body(bytes.to_vec())
        .send()
        .await
        .map_err(|e| Pdf2MdError::Unexpected(format!("file upload request failed: {e}")))?;

    let status = response.status();
    debug!("Upload finalize response: HTTP {}", status);
    let body = error_body(response).await;
    if !status.is_success() {
        debug!("Upload finalize error body: {}", body);
        return Err(Pdf2MdError::UploadContent {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: FinalizeResponse = serde_json::from_str(&body)
        .map_err(|e| Pdf2MdError::Unexpected(format!("malformed upload response: {e}")))?;

    let file = parsed.file;
    let uri = file
        .as_ref()
        .and_then(|f| f.uri.clone())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Pdf2MdError::MissingFileUri { body: body.clone() })?;
    let mime_type = file
        .and_then(|f| f.mime_type)
        .unwrap_or_else(|| session.mime_type.clone());

    info!("Uploaded {} bytes", session.byte_len);
    debug!("Remote file URI: {}", uri);

    Ok(RemoteFileReference { uri, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::with_base_url(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn start_sends_resumable_headers_and_reads_session_url() {
        let server = MockServer::start().await;
        let session_url = format!("{}/upload-session/123", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(query_param("key", "test-key"))
            .and(header("X-Goog-Upload-Protocol", "resumable"))
            .and(header("X-Goog-Upload-Command", "start"))
            .and(header("X-Goog-Upload-Header-Content-Length", "10"))
            .and(header("X-Goog-Upload-Header-Content-Type", "application/pdf"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"file": {"display_name": "report.pdf"}})))
            .respond_with(
                ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = start_upload(
            &client_for(&server),
            b"%PDF-1.4\n\n",
            "report.pdf",
            "application/pdf",
            "test-key",
        )
        .await
        .unwrap();

        assert_eq!(session.upload_url, session_url);
        assert_eq!(session.byte_len, 10);
        assert_eq!(session.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn start_non_success_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = start_upload(&client_for(&server), b"x", "a.pdf", "application/pdf", "bad")
            .await
            .unwrap_err();
        match err {
            Pdf2MdError::UploadStart { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("expected UploadStart, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_without_session_header_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = start_upload(&client_for(&server), b"x", "a.pdf", "application/pdf", "k")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::MissingUploadUrl));
    }

    fn session_for(server: &MockServer, len: usize) -> UploadSession {
        UploadSession {
            upload_url: format!("{}/upload-session/123", server.uri()),
            byte_len: len,
            mime_type: "application/pdf".into(),
        }
    }

    #[tokio::test]
    async fn finalize_sends_single_chunk_and_parses_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-session/123"))
            .and(header("X-Goog-Upload-Offset", "0"))
            .and(header("Content-Type", "application/pdf"))
            .and(header("Content-Length", "10"))
            .and(|req: &Request| {
                req.headers
                    .get("x-goog-upload-command")
                    .and_then(|v| v.to_str().ok())
                    == Some("upload, finalize")
            })
            .and(body_bytes(b"%PDF-bytes".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {"uri": "files/abc", "mimeType": "application/pdf"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = finalize_upload(&client_for(&server), &session_for(&server, 10), b"%PDF-bytes")
            .await
            .unwrap();
        assert_eq!(file.uri, "files/abc");
        assert_eq!(file.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn finalize_non_success_is_upload_content_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(413).set_body_string("too large"))
            .mount(&server)
            .await;

        let err = finalize_upload(&client_for(&server), &session_for(&server, 1), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::UploadContent { status: 413, .. }));
    }

    #[tokio::test]
    async fn finalize_without_uri_is_missing_file_uri() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"file": {}})))
            .mount(&server)
            .await;

        let err = finalize_upload(&client_for(&server), &session_for(&server, 1), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::MissingFileUri { .. }));
    }

    #[tokio::test]
    async fn finalize_malformed_json_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = finalize_upload(&client_for(&server), &session_for(&server, 1), b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::Unexpected(_)));
    }

    #[tokio::test]
    async fn finalize_rejects_length_mismatch_without_request() {
        let server = MockServer::start().await;
        let err = finalize_upload(&client_for(&server), &session_for(&server, 5), b"xy")
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::Unexpected(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
