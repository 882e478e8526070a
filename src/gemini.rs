use serde::Deserialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::{credentials::KeyStore, media::InlineMedia, schema::ResponseSchema};

pub const CONTENT_MODEL: &str = "gemini-3-pro-preview";
pub const ANALYSIS_MODEL: &str = "gemini-2.5-flash";
pub const IMAGE_EDIT_MODEL: &str = "gemini-2.5-flash-image";
pub const IMAGE_GENERATION_MODEL: &str = "gemini-3-pro-image-preview";
pub const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Message carried when no key has been selected; the classifier keys on it.
pub const MISSING_KEY: &str = "API_KEY environment variable is not set.";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("{}", MISSING_KEY)]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Empty(&'static str),
    #[error("Veo operation failed with error: {message} (Code: {code})")]
    Operation { message: String, code: i64 },
    #[error("Other: {0}")]
    Other(String),
}

/// Fixed sampling constants; never taken from user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

pub const CREATIVE_SAMPLING: Sampling = Sampling { temperature: 0.9, top_p: 0.95, top_k: 64 };

/// One schema-constrained `generateContent` call.
pub struct StructuredCall<'a> {
    pub model: &'a str,
    pub system_instruction: &'a str,
    pub user_turn: &'a str,
    pub schema: &'a ResponseSchema,
    pub sampling: Sampling,
}

impl StructuredCall<'_> {
    pub fn body(&self) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": self.system_instruction }] },
            "contents": [{ "role": "user", "parts": [{ "text": self.user_turn }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": self.schema.to_json(),
                "temperature": self.sampling.temperature,
                "topP": self.sampling.top_p,
                "topK": self.sampling.top_k,
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub prompt: Option<String>,
    pub image: Option<InlineMedia>,
    pub aspect_ratio: String,
}

// Shortens base64 payloads in JSON before it is logged
fn truncate_base64_in_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if matches!(key.as_str(), "data" | "bytesBase64Encoded") {
                    if let Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')) {
                            *val = Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(truncate_base64_in_json),
        _ => {}
    }
}

fn loggable(value: &Value) -> String {
    let mut copy = value.clone();
    truncate_base64_in_json(&mut copy);
    serde_json::to_string(&copy).unwrap_or_default()
}

pub struct GeminiClient {
    client: Client,
    keys: Arc<KeyStore>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, keys: Arc<KeyStore>) -> Self {
        Self { client: Client::new(), keys, base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    // Read on every call so a key selected after startup is used right away.
    fn api_key(&self) -> Result<String, GeminiError> {
        self.keys.api_key().ok_or_else(|| {
            error!("{}", MISSING_KEY);
            GeminiError::MissingApiKey
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder, api_key: &str, url: &str) -> Result<String, GeminiError> {
        info!("🔗 Making request to: {}", url.replace(api_key, "***"));

        let response = request.send().await.map_err(|e| GeminiError::Http(e.to_string()))?;
        let status = response.status();
        info!("📥 Response status: {}", status);

        let body = response.text().await.map_err(|e| GeminiError::Http(e.to_string()))?;
        if !status.is_success() {
            error!("❌ API Error response: {}", body);
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn post(&self, model: &str, method: &str, body: &Value) -> Result<String, GeminiError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{}:{}?key={}", self.base_url, model, method, api_key);
        debug!("📤 Request body: {}", loggable(body));
        self.send(self.client.post(&url).json(body), &api_key, &url).await
    }

    pub async fn generate_content(&self, model: &str, body: &Value) -> Result<GenerateContentResponse, GeminiError> {
        let text = self.post(model, "generateContent", body).await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GeminiError::Other(format!("parse error: {}: {}", e, text)))?;
        if let Some(reason) = parsed.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
            warn!("🚫 Prompt blocked: {}", reason);
        }
        Ok(parsed)
    }

    /// Returns the model's raw reply text, expected to be JSON matching the schema.
    pub async fn generate_structured(&self, call: &StructuredCall<'_>) -> Result<String, GeminiError> {
        info!("Generating structured content with {} ({:?} schema)...", call.model, call.schema.revision);
        let response = self.generate_content(call.model, &call.body()).await?;
        let text = response.text();
        let text = text.trim();
        if text.is_empty() {
            return Err(GeminiError::Empty("No JSON response received from the API."));
        }
        info!("✅ Structured reply received ({} chars)", text.len());
        Ok(text.to_string())
    }

    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, GeminiError> {
        info!("Generating text with {}...", model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let text = self.generate_content(model, &body).await?.text();
        if text.is_empty() {
            return Err(GeminiError::Empty("No text response received from the API."));
        }
        Ok(text)
    }

    /// Image or video understanding: one inline media part followed by the prompt.
    pub async fn analyze_media(&self, media: &InlineMedia, prompt: &str) -> Result<String, GeminiError> {
        info!("🔍 Analyzing {} with {}...", media.mime_type, ANALYSIS_MODEL);
        let body = json!({ "contents": [{ "parts": [inline_part(media), { "text": prompt }] }] });
        let text = self.generate_content(ANALYSIS_MODEL, &body).await?.text();
        if text.is_empty() {
            return Err(GeminiError::Empty("No text response received from the API after media analysis."));
        }
        Ok(text)
    }

    pub async fn edit_image(&self, media: &InlineMedia, prompt: &str) -> Result<InlineMedia, GeminiError> {
        info!("🖌️ Editing {} image...", media.mime_type);
        let body = json!({ "contents": [{ "parts": [inline_part(media), { "text": prompt }] }] });
        let response = self.generate_content(IMAGE_EDIT_MODEL, &body).await?;
        response.first_image().ok_or(GeminiError::Empty("No image part found in the Gemini response."))
    }

    pub async fn generate_image(&self, prompt: &str, aspect_ratio: &str, image_size: &str) -> Result<InlineMedia, GeminiError> {
        info!("🖼️ Generating image ({}, {})...", aspect_ratio, image_size);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "imageConfig": { "aspectRatio": aspect_ratio, "imageSize": image_size }
            }
        });
        let response = self.generate_content(IMAGE_GENERATION_MODEL, &body).await?;
        let image = response.first_image().ok_or(GeminiError::Empty("No image part found in the Gemini response."))?;
        info!("✅ Generated {} image ({} chars)", image.mime_type, image.data.len());
        Ok(image)
    }

    /// Starts a video generation and polls it at `poll_interval` until it is
    /// done or reports an error. There is no attempt limit.
    pub async fn generate_video(&self, request: &VideoRequest, poll_interval: Duration) -> Result<String, GeminiError> {
        let mut instance = serde_json::Map::new();
        if let Some(prompt) = &request.prompt {
            instance.insert("prompt".into(), json!(prompt));
        }
        if let Some(image) = &request.image {
            instance.insert("image".into(), json!({ "bytesBase64Encoded": image.data, "mimeType": image.mime_type }));
        }
        let body = json!({
            "instances": [instance],
            "parameters": { "aspectRatio": request.aspect_ratio, "resolution": "720p", "sampleCount": 1 }
        });

        info!("🎬 Submitting video generation to {}", VIDEO_MODEL);
        let text = self.post(VIDEO_MODEL, "predictLongRunning", &body).await?;
        let mut operation = parse_operation(&text)?;
        let mut polls = 0u64;

        while !operation.done {
            tokio::time::sleep(poll_interval).await;
            polls += 1;
            operation = self.fetch_operation(&operation.name).await?;
            if let Some(err) = &operation.error {
                error!("❌ Video operation {} failed after {} polls", operation.name, polls);
                return Err(GeminiError::Operation { message: err.message.clone(), code: err.code.unwrap_or_default() });
            }
            info!("⏳ Video operation {} poll #{}: done={}", operation.name, polls, operation.done);
        }

        if let Some(err) = &operation.error {
            return Err(GeminiError::Operation { message: err.message.clone(), code: err.code.unwrap_or_default() });
        }

        operation
            .video_uri()
            .ok_or(GeminiError::Empty("No video URI found in the Veo response."))
    }

    async fn fetch_operation(&self, name: &str) -> Result<Operation, GeminiError> {
        let api_key = self.api_key()?;
        let url = format!("{}/{}?key={}", self.base_url, name, api_key);
        let text = self.send(self.client.get(&url), &api_key, &url).await?;
        parse_operation(&text)
    }
}

fn inline_part(media: &InlineMedia) -> Value {
    json!({ "inlineData": { "mimeType": media.mime_type, "data": media.data } })
}

fn api_error(status: u16, body: &str) -> GeminiError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    GeminiError::Api { status, message }
}

fn parse_operation(text: &str) -> Result<Operation, GeminiError> {
    serde_json::from_str(text).map_err(|e| GeminiError::Other(format!("parse error: {}: {}", e, text)))
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text { text: String },
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| match p {
                        Part::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub fn first_image(&self) -> Option<InlineMedia> {
        for c in &self.candidates {
            for p in &c.content.parts {
                if let Part::Inline { inline_data } = p {
                    info!("🎯 Found image data with mime type: {}", inline_data.mime_type);
                    return Some(InlineMedia { mime_type: inline_data.mime_type.clone(), data: inline_data.data.clone() });
                }
            }
        }
        info!("⚠️ No inline image data found in response structure");
        None
    }
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
    #[serde(default)]
    response: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

impl Operation {
    fn video_uri(&self) -> Option<String> {
        self.response.as_ref()?["generateVideoResponse"]["generatedSamples"][0]["video"]["uri"]
            .as_str()
            .map(str::to_string)
    }
}
