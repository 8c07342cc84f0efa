// Firmware bundle generation
// Asks a generative text API for a PlatformIO project (firmware source,
// platformio.ini, CI workflow) targeting the real handheld.

use crate::config::GeneratorConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Field names the generator must return, in export order
pub const BUNDLE_FIELDS: [&str; 3] = ["ino", "platformio", "workflow"];

/// Bundle generation errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API key not set (export {0})")]
    MissingApiKey(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Server error {0}: {1}")]
    Server(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Response does not match bundle schema: {0}")]
    Schema(String),

    #[error("Generation task failed: {0}")]
    TaskFailed(String),
}

/// Generated project: three source texts, produced together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBundle {
    /// Firmware source (Arduino/PlatformIO C++)
    pub ino: String,
    /// platformio.ini contents
    pub platformio: String,
    /// GitHub Actions workflow YAML
    pub workflow: String,
}

/// One file of a [`ProjectBundle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleFile {
    Firmware,
    BuildConfig,
    Workflow,
}

impl BundleFile {
    pub const ALL: &'static [BundleFile] =
        &[BundleFile::Firmware, BundleFile::BuildConfig, BundleFile::Workflow];

    /// Path inside the exported project
    pub fn path(&self) -> &'static str {
        match self {
            BundleFile::Firmware => "src/main.cpp",
            BundleFile::BuildConfig => "platformio.ini",
            BundleFile::Workflow => ".github/workflows/build.yml",
        }
    }

    /// Exporter tab title
    pub fn label(&self) -> &'static str {
        match self {
            BundleFile::Firmware => "Code (C++)",
            BundleFile::BuildConfig => "Config (INI)",
            BundleFile::Workflow => "GitHub (YAML)",
        }
    }

    /// Following tab, wrapping
    pub fn next(&self) -> BundleFile {
        match self {
            BundleFile::Firmware => BundleFile::BuildConfig,
            BundleFile::BuildConfig => BundleFile::Workflow,
            BundleFile::Workflow => BundleFile::Firmware,
        }
    }
}

impl ProjectBundle {
    /// Contents of one file
    pub fn text(&self, file: BundleFile) -> &str {
        match file {
            BundleFile::Firmware => &self.ino,
            BundleFile::BuildConfig => &self.platformio,
            BundleFile::Workflow => &self.workflow,
        }
    }

    /// Write all three files under `dir`, returning the paths written
    pub fn write_to(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(BundleFile::ALL.len());
        for file in BundleFile::ALL {
            let path = dir.join(file.path());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, self.text(*file))?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Natural-language instruction sent to the generator
pub fn build_prompt(target: &str) -> String {
    format!(
        "Generate a complete project bundle for {target} that builds automatically \
         with GitHub Actions.\n\
         \n\
         Return a JSON object with exactly three string properties:\n\
         1. \"ino\": main C++ source (Arduino/PlatformIO) including a BLE ELM327 \
         service, SD card profile storage and keyboard handling.\n\
         2. \"platformio\": a platformio.ini configured for M5Cardputer with the \
         required libraries (NimBLE-Arduino, M5Cardputer, ArduinoJson).\n\
         3. \"workflow\": a GitHub Actions YAML file (.github/workflows/build.yml) \
         that uses platformio/platformio-action to build the project and uploads \
         firmware.bin as an artifact.\n\
         \n\
         Hardware: {target}.\n\
         Make sure the workflow installs dependencies and exports firmware.bin."
    )
}

/// Request body constraining the response to the bundle schema
pub fn generation_request(prompt: &str) -> Value {
    let properties: serde_json::Map<String, Value> = BUNDLE_FIELDS
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "STRING" })))
        .collect();

    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": properties,
                "required": BUNDLE_FIELDS,
            }
        }
    })
}

/// Extract the bundle from a `generateContent` response
pub fn parse_generation_response(json: &Value) -> Result<ProjectBundle, ApiError> {
    if let Some(err) = json.get("error") {
        let code = err.get("code").and_then(|v| v.as_u64()).unwrap_or(0) as u16;
        let message = err
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("API error")
            .to_string();
        return Err(ApiError::Server(code, message));
    }

    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ApiError::Parse("No candidate content in response".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(ApiError::Parse("Empty candidate text".to_string()));
    }

    parse_bundle_text(&text)
}

/// Parse the model's JSON text into a bundle, requiring all three string fields
pub fn parse_bundle_text(text: &str) -> Result<ProjectBundle, ApiError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| ApiError::Parse(e.to_string()))?;

    let field = |name: &str| -> Result<String, ApiError> {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Schema(format!("missing string field `{name}`")))
    };

    Ok(ProjectBundle {
        ino: field("ino")?,
        platformio: field("platformio")?,
        workflow: field("workflow")?,
    })
}

/// Models occasionally wrap JSON mode output in a markdown fence
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Something that can produce a [`ProjectBundle`]
#[async_trait]
pub trait BundleGenerator: Send + Sync {
    /// Single-shot generation for `target`; no retries
    async fn generate(&self, target: &str) -> Result<ProjectBundle, ApiError>;
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Build a client; the API key is read from `config.api_key_env` now
    /// and only required when a request is made.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key: std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.is_empty()),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl BundleGenerator for GeminiClient {
    async fn generate(&self, target: &str) -> Result<ProjectBundle, ApiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::MissingApiKey(self.api_key_env.clone()))?;

        let body = generation_request(&build_prompt(target));
        debug!(model = %self.model, "Requesting project bundle");

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let json = serde_json::from_str::<Value>(&body);

        if !status.is_success() {
            // Prefer the API's own error message when it sent one
            return match json.as_ref().map(parse_generation_response) {
                Ok(Err(ApiError::Server(_, message))) => {
                    Err(ApiError::Server(status.as_u16(), message))
                }
                _ => Err(ApiError::Server(status.as_u16(), status.to_string())),
            };
        }

        parse_generation_response(&json.map_err(|e| ApiError::Parse(e.to_string()))?)
    }
}

/// Outcome delivered back to the session when a generation settles
pub type GenerationResult = Result<ProjectBundle, ApiError>;

/// Held bundle plus the single in-flight guard
#[derive(Debug, Default)]
pub struct GenerationSlot {
    bundle: Option<ProjectBundle>,
    in_flight: bool,
}

impl GenerationSlot {
    /// Most recent successful bundle
    pub fn bundle(&self) -> Option<&ProjectBundle> {
        self.bundle.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Claim the slot. Returns false (and changes nothing) while a request
    /// is already pending.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record a finished request. Always releases the slot; only a success
    /// replaces the held bundle.
    pub fn settle(&mut self, result: GenerationResult) -> Result<&ProjectBundle, ApiError> {
        self.in_flight = false;
        match result {
            Ok(bundle) => Ok(&*self.bundle.insert(bundle)),
            Err(e) => Err(e),
        }
    }
}

/// Run one generation on the runtime and report exactly one result on
/// `results`, including when the generator task panics.
pub fn spawn_generation(
    generator: Arc<dyn BundleGenerator>,
    target: String,
    results: mpsc::UnboundedSender<GenerationResult>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let task = tokio::spawn(async move { generator.generate(&target).await });
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(ApiError::TaskFailed(e.to_string())),
        };
        match &result {
            Ok(_) => info!("Project bundle generated"),
            Err(e) => warn!("Project bundle generation failed: {}", e),
        }
        if results.send(result).is_err() {
            debug!("Generation result dropped: receiver closed");
        }
    })
}
