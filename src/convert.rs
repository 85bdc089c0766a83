//! Conversion entry points: the orchestrator.
//!
//! A conversion is a fixed sequence of awaited steps:
//!
//! ```text
//! Idle → AwaitingApiKey → SessionStarted → Uploaded → Generated → PostProcessed → Written → Idle
//! ```
//!
//! Each state is entered only when the previous step succeeded. The first
//! failure returns to `Idle` and is reported exactly once through
//! [`ConversionProgress::on_failure`]. Nothing is rolled back: a started
//! upload session is abandoned and expires on the server, and the file store
//! is only touched by the final write.

use crate::client::GeminiClient;
use crate::config::Settings;
use crate::error::Pdf2MdError;
use crate::host::FileStore;
use crate::output::ConversionOutput;
use crate::pipeline::input::{self, PDF_MIME_TYPE};
use crate::pipeline::{generate, postprocess, upload, write};
use crate::progress::{ConversionProgress, ConversionState, NoopProgress};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert the PDF at `source_path` in `store` and write the sibling `.md` file.
///
/// This is the primary entry point for the library. Progress notices and the
/// single failure notice go to `progress`.
///
/// # Example
/// ```rust,no_run
/// use gemini_pdf2md::{convert_file, FsFileStore, GeminiClient, LogProgress, Settings};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = Settings::builder().api_key("AIza...").build()?;
/// let client = GeminiClient::new()?;
/// let store = FsFileStore::new(".");
/// let output = convert_file("report.pdf", &settings, &client, &store, &LogProgress).await?;
/// println!("wrote {}", output.output_path);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// Any [`Pdf2MdError`]; see the variant docs for the stage that raises it.
pub async fn convert_file<S, P>(
    source_path: &str,
    settings: &Settings,
    client: &GeminiClient,
    store: &S,
    progress: &P,
) -> Result<ConversionOutput, Pdf2MdError>
where
    S: FileStore + ?Sized,
    P: ConversionProgress + ?Sized,
{
    let start = Instant::now();
    info!("Starting conversion: {}", source_path);

    let result = run_conversion(source_path, settings, client, store, progress, start).await;

    match &result {
        Ok(output) => info!(
            "Conversion complete: {} → {} in {}ms",
            output.source_path, output.output_path, output.duration_ms
        ),
        Err(e) => {
            warn!("Conversion of {} failed: {}", source_path, e);
            progress.on_failure(e);
        }
    }
    progress.on_state(ConversionState::Idle);
    result
}

/// Upload in-memory PDF bytes and return the post-processed Markdown.
///
/// Runs the network and post-processing steps of [`convert_file`] without
/// touching any file store and without progress notices.
pub async fn convert_bytes(
    bytes: &[u8],
    display_name: &str,
    settings: &Settings,
    client: &GeminiClient,
) -> Result<String, Pdf2MdError> {
    let api_key = settings.require_api_key()?;
    generate_markdown(bytes, display_name, settings, api_key, client, &NoopProgress).await
}

async fn run_conversion<S, P>(
    source_path: &str,
    settings: &Settings,
    client: &GeminiClient,
    store: &S,
    progress: &P,
    start: Instant,
) -> Result<ConversionOutput, Pdf2MdError>
where
    S: FileStore + ?Sized,
    P: ConversionProgress + ?Sized,
{
    if !input::is_convertible(source_path) {
        return Err(Pdf2MdError::UnsupportedFile {
            path: source_path.to_string(),
        });
    }

    // ── Step 1: API key ──────────────────────────────────────────────────
    progress.on_state(ConversionState::AwaitingApiKey);
    let api_key = settings.require_api_key()?;

    // ── Step 2: Read source ──────────────────────────────────────────────
    let source = input::read_source(store, source_path).await?;
    progress.notify(&format!("Converting {} to Markdown...", source.name));

    // ── Steps 3–5: Upload, generate, strip ───────────────────────────────
    let markdown =
        generate_markdown(&source.bytes, &source.name, settings, api_key, client, progress).await?;

    // ── Step 6: Write sibling file ───────────────────────────────────────
    let target = write::output_path(&source.path);
    let outcome = write::write_output(store, &target, &markdown).await?;
    progress.on_state(ConversionState::Written);
    progress.notify(&format!("Markdown saved to {target}"));

    let uploaded_bytes = source.len();
    Ok(ConversionOutput {
        source_path: source.path,
        output_path: target,
        markdown,
        outcome,
        uploaded_bytes,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Upload → generate → strip, emitting a notice on entry to each network step.
async fn generate_markdown<P>(
    bytes: &[u8],
    display_name: &str,
    settings: &Settings,
    api_key: &str,
    client: &GeminiClient,
    progress: &P,
) -> Result<String, Pdf2MdError>
where
    P: ConversionProgress + ?Sized,
{
    let session =
        upload::start_upload(client, bytes, display_name, PDF_MIME_TYPE, api_key).await?;
    progress.on_state(ConversionState::SessionStarted);
    progress.notify("Upload session started");

    progress.notify("Uploading file...");
    let file = upload::finalize_upload(client, &session, bytes).await?;
    progress.on_state(ConversionState::Uploaded);

    progress.notify("Waiting for API response...");
    debug!(
        "Temperature {} is not sent with generateContent",
        settings.temperature
    );
    let result = generate::generate(
        client,
        &file,
        &settings.system_prompt,
        &settings.user_prompt,
        &settings.model_name,
        api_key,
    )
    .await?;
    progress.on_state(ConversionState::Generated);
    progress.notify("API response received, generating markdown...");

    let markdown = postprocess::strip(&result.text());
    progress.on_state(ConversionState::PostProcessed);
    debug!("Post-processed markdown: {} bytes", markdown.len());

    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FsFileStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<String>>,
        states: Mutex<Vec<ConversionState>>,
    }

    impl ConversionProgress for Recorder {
        fn notify(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }

        fn on_state(&self, state: ConversionState) {
            self.states.lock().unwrap().push(state);
        }
    }

    #[tokio::test]
    async fn non_pdf_is_rejected_before_api_key_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(dir.path());
        let client = GeminiClient::with_base_url("http://127.0.0.1:9").unwrap();
        let progress = Recorder::default();

        let err = convert_file("notes.txt", &Settings::default(), &client, &store, &progress)
            .await
            .unwrap_err();

        assert!(matches!(err, Pdf2MdError::UnsupportedFile { .. }));
        assert_eq!(*progress.states.lock().unwrap(), vec![ConversionState::Idle]);
        assert_eq!(progress.notices.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn convert_bytes_requires_api_key() {
        let client = GeminiClient::with_base_url("http://127.0.0.1:9").unwrap();
        let err = convert_bytes(b"%PDF", "a.pdf", &Settings::default(), &client)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::MissingApiKey));
    }
}
