//! CLI binary for gemini-pdf2md.
//!
//! A thin host adapter over the library crate: flags stand in for the
//! settings tab, the current directory is the file store, and an indicatif
//! spinner is the notice channel.

use anyhow::{Context, Result};
use clap::Parser;
use gemini_pdf2md::{
    convert_file, is_convertible, ConversionProgress, FsFileStore, GeminiClient, LogProgress,
    Pdf2MdError, Settings, SettingsStore,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI notice channel using indicatif ───────────────────────────────────────

/// Terminal notice channel: a spinner whose message tracks the current
/// step, with each notice also logged above it.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("pdf2md");
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl ConversionProgress for CliProgress {
    fn notify(&self, message: &str) {
        self.bar.println(format!("  {} {}", dim("·"), message));
        self.bar.set_message(message.to_string());
    }

    fn on_failure(&self, error: &Pdf2MdError) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", red("✘"), red(&error.to_string()));
    }
}

/// Quiet mode: only the failure notice reaches the terminal.
struct QuietProgress;

impl ConversionProgress for QuietProgress {
    fn notify(&self, _message: &str) {}

    fn on_failure(&self, error: &Pdf2MdError) {
        eprintln!("{error}");
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert (writes report.md next to report.pdf)
  pdf2md report.pdf

  # Store the API key once
  pdf2md --api-key AIza... --save

  # Use another model for this run only
  pdf2md --model gemini-1.5-pro papers/attention.PDF

  # Replace the prompts and keep them
  pdf2md --system-prompt sys.txt --user-prompt user.txt --save

  # Show the stored settings (API key masked)
  pdf2md --show-settings

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        Gemini API key (overrides the stored one)
  PDF2MD_MODEL          Model name override
  PDF2MD_TEMPERATURE    Temperature override (0.0–2.0, stored but not sent)
  PDF2MD_SETTINGS       Settings file location
  PDF2MD_API_BASE       API host, e.g. a proxy
  RUST_LOG              Log filter, e.g. gemini_pdf2md=debug
"#;

/// Convert a PDF file to Markdown with the Gemini API.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert a PDF file to Markdown with the Gemini API",
    long_about = "Uploads a PDF to the Gemini file API, asks the configured model to transcribe \
it as Markdown, and writes the result next to the source with a .md extension. An existing \
.md file is overwritten.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert. The output is the same path with `.md`.
    input: Option<String>,

    /// Settings file (JSON). Defaults to the platform config directory.
    #[arg(long, env = "PDF2MD_SETTINGS")]
    settings: Option<PathBuf>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini model name (e.g. gemini-2.0-flash, gemini-1.5-pro).
    #[arg(long, env = "PDF2MD_MODEL")]
    model: Option<String>,

    /// Path to a text file containing the system prompt.
    #[arg(long)]
    system_prompt: Option<PathBuf>,

    /// Path to a text file containing the user prompt.
    #[arg(long)]
    user_prompt: Option<PathBuf>,

    /// Temperature (0.0–2.0). Stored in the settings; not sent to the API.
    #[arg(long, env = "PDF2MD_TEMPERATURE", value_parser = parse_temperature)]
    temperature: Option<f32>,

    /// Persist the overrides above into the settings file.
    #[arg(long)]
    save: bool,

    /// Print the effective settings and exit.
    #[arg(long)]
    show_settings: bool,

    /// API host (for proxies).
    #[arg(long, env = "PDF2MD_API_BASE", hide = true)]
    api_base: Option<String>,

    /// Print the conversion result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,
}

fn parse_temperature(s: &str) -> Result<f32, String> {
    let t: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=2.0).contains(&t) {
        Ok(t)
    } else {
        Err(format!("temperature must be between 0.0 and 2.0, got {t}"))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the user-facing notices, so library INFO logs are
    // suppressed while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Settings ─────────────────────────────────────────────────────────
    let store = settings_store(&cli)?;
    let mut settings = store
        .load()
        .await
        .with_context(|| format!("Failed to load settings from {}", store.path().display()))?;
    apply_overrides(&cli, &mut settings).await?;

    if cli.save {
        store.save(&settings).await.context("Failed to save settings")?;
        if !cli.quiet {
            eprintln!("{} Settings saved to {}", green("✔"), store.path().display());
        }
    }

    if cli.show_settings {
        print_settings(&store, &settings);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(input) = cli.input.as_deref() else {
        if cli.save {
            return Ok(ExitCode::SUCCESS);
        }
        anyhow::bail!("No input file given. Run `pdf2md --help` for usage.");
    };

    if !is_convertible(input) {
        anyhow::bail!("'{input}' is not a PDF file (expected a .pdf extension)");
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let client = match cli.api_base.as_deref() {
        Some(base) => GeminiClient::with_base_url(base),
        None => GeminiClient::new(),
    }
    .context("Failed to create HTTP client")?;
    let files = FsFileStore::new(".");

    let result = if cli.quiet {
        convert_file(input, &settings, &client, &files, &QuietProgress).await
    } else if show_progress {
        let progress = CliProgress::new();
        let result = convert_file(input, &settings, &client, &files, &progress).await;
        progress.bar.finish_and_clear();
        result
    } else {
        convert_file(input, &settings, &client, &files, &LogProgress).await
    };

    // The failure notice has already been shown by the progress channel.
    let Ok(output) = result else {
        return Ok(ExitCode::FAILURE);
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {}  →  {}  {}",
            green("✔"),
            output.source_path,
            bold(&output.output_path),
            dim(&format!(
                "{:?}, {} bytes, {}ms",
                output.outcome,
                output.markdown.len(),
                output.duration_ms
            )),
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn settings_store(cli: &Cli) -> Result<SettingsStore> {
    let path = match cli.settings.clone() {
        Some(path) => path,
        None => SettingsStore::default_location()
            .context("No config directory on this platform; pass --settings <PATH>")?,
    };
    Ok(SettingsStore::new(path))
}

/// Apply the flag values on top of the loaded settings.
async fn apply_overrides(cli: &Cli, settings: &mut Settings) -> Result<()> {
    if let Some(ref key) = cli.api_key {
        settings.api_key = key.clone();
    }
    if let Some(ref model) = cli.model {
        if model.trim().is_empty() {
            anyhow::bail!("--model must not be empty");
        }
        settings.model_name = model.clone();
    }
    if let Some(ref path) = cli.system_prompt {
        settings.system_prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
    }
    if let Some(ref path) = cli.user_prompt {
        settings.user_prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read user prompt from {:?}", path))?;
    }
    if let Some(t) = cli.temperature {
        settings.temperature = t;
    }
    Ok(())
}

fn print_settings(store: &SettingsStore, settings: &Settings) {
    println!("File:           {}", store.path().display());
    println!("API key:        {}", settings.masked_api_key());
    println!("Model:          {}", settings.model_name);
    println!("Temperature:    {}", settings.temperature);
    println!("System prompt:  {} chars", settings.system_prompt.chars().count());
    println!("User prompt:    {}", settings.user_prompt);
}
