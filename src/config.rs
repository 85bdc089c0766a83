//! User settings and their persistence.
//!
//! All conversion behaviour is controlled through [`Settings`]. The value is
//! owned by the caller and passed into the pipeline at invocation time; there
//! is no global settings object. Persistence is an explicit side effect:
//! change a field, then call [`SettingsStore::save`].
//!
//! Persisted files are merged over the defaults: keys present in the file
//! win, missing keys fall back to [`Settings::default`], unknown keys are
//! ignored. An empty API key is accepted here and only rejected when a
//! conversion actually needs it ([`Settings::require_api_key`]).

use crate::error::Pdf2MdError;
use crate::prompts::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lowest temperature the settings accept.
pub const MIN_TEMPERATURE: f32 = 0.0;
/// Highest temperature the settings accept.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// User-editable configuration for a conversion.
///
/// Serialised with camelCase keys (`apiKey`, `modelName`, `systemPrompt`,
/// `userPrompt`, `temperature`).
///
/// # Example
/// ```rust
/// use gemini_pdf2md::Settings;
///
/// let settings = Settings::builder()
///     .api_key("AIza...")
///     .model_name("gemini-2.0-flash")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(settings.model_name, "gemini-2.0-flash");
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Gemini API key. May be empty until the first conversion.
    pub api_key: String,

    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model_name: String,

    /// First text part of the generation request.
    pub system_prompt: String,

    /// Second text part of the generation request.
    pub user_prompt: String,

    /// Sampling temperature, `0.0..=2.0`. Default: 0.1.
    ///
    /// Kept for compatibility with existing settings files but not sent to
    /// the generateContent call.
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_name: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt: DEFAULT_USER_PROMPT.to_string(),
            temperature: 0.1,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &mask_key(&self.api_key))
            .field("model_name", &self.model_name)
            .field("system_prompt_len", &self.system_prompt.len())
            .field("user_prompt_len", &self.user_prompt.len())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Settings {
    /// Create a new builder starting from the defaults.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder {
            settings: Self::default(),
        }
    }

    /// Parse persisted settings, filling missing keys from the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.temperature = clamp_temperature(settings.temperature);
        Ok(settings)
    }

    /// Serialise the full settings object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Return the trimmed API key, or [`Pdf2MdError::MissingApiKey`] if blank.
    pub fn require_api_key(&self) -> Result<&str, Pdf2MdError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            Err(Pdf2MdError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    /// The API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

/// Builder for [`Settings`].
#[derive(Debug)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.settings.api_key = key.into();
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.settings.model_name = model.into();
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.settings.system_prompt = prompt.into();
        self
    }

    pub fn user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.settings.user_prompt = prompt.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.settings.temperature = clamp_temperature(t);
        self
    }

    /// Build the settings, validating constraints.
    pub fn build(self) -> Result<Settings, Pdf2MdError> {
        if self.settings.model_name.trim().is_empty() {
            return Err(Pdf2MdError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        Ok(self.settings)
    }
}

fn clamp_temperature(t: f32) -> f32 {
    if t.is_nan() {
        Settings::default().temperature
    } else {
        t.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    match chars.len() {
        0 => "<unset>".to_string(),
        n if n <= 4 => "*".repeat(n),
        n => {
            let tail: String = chars[n - 4..].iter().collect();
            format!("{}{}", "*".repeat(n - 4), tail)
        }
    }
}

// ── Persistence ──────────────────────────────────────────────────────────

/// Loads and saves [`Settings`] as a JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/gemini-pdf2md/settings.json`, if the platform has a config dir.
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gemini-pdf2md").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, merging the persisted values over the defaults.
    ///
    /// A missing file yields [`Settings::default`].
    pub async fn load(&self) -> Result<Settings, Pdf2MdError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(Pdf2MdError::SettingsLoadFailed {
                    path: self.path.clone(),
                    detail: e.to_string(),
                })
            }
        };

        Settings::from_json(&content).map_err(|e| Pdf2MdError::SettingsLoadFailed {
            path: self.path.clone(),
            detail: e.to_string(),
        })
    }

    /// Persist the full settings object, creating parent directories.
    pub async fn save(&self, settings: &Settings) -> Result<(), Pdf2MdError> {
        let json = settings
            .to_json()
            .map_err(|e| Pdf2MdError::Unexpected(format!("settings serialisation: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Pdf2MdError::SettingsSaveFailed {
                        path: self.path.clone(),
                        source: e,
                    }
                })?;
            }
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| Pdf2MdError::SettingsSaveFailed {
                path: self.path.clone(),
                source: e,
            })?;

        info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
