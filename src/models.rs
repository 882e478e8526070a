use serde::{Serialize, Deserialize};

use crate::{brief::DesignBrief, content::Section, media::InlineMedia, schema::SchemaRevision};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    #[serde(default)]
    pub revision: SchemaRevision,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub revision: SchemaRevision,
    #[serde(flatten)]
    pub brief: DesignBrief,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub revision: SchemaRevision,
    pub content: serde_json::Value,
    pub sections: Vec<Section>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SelectKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    #[default]
    Fast,
    FastLite,
    Complex,
}

impl ModelType {
    pub fn model_name(self) -> &'static str {
        match self {
            ModelType::Fast => "gemini-2.5-flash",
            ModelType::FastLite => "gemini-2.5-flash-lite",
            // complex tasks run on Flash as well
            ModelType::Complex => "gemini-2.5-flash",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub prompt: String,
    #[serde(default)]
    pub model_type: ModelType,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    pub response_text: String,
}

/// Media payload as sent by a client: a data URI, or raw base64 with `mimeType`.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaInput {
    pub data: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaPromptRequest {
    pub media: MediaInput,
    pub prompt: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(default = "default_image_aspect")]
    pub aspect_ratio: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
}

fn default_image_aspect() -> String { "1:1".into() }
fn default_image_size() -> String { "1K".into() }

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub mime_type: String,
    pub data: String,
    pub data_uri: String,
}

impl From<InlineMedia> for ImageResponse {
    fn from(media: InlineMedia) -> Self {
        Self { data_uri: media.data_uri(), mime_type: media.mime_type, data: media.data }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub image: Option<MediaInput>,
    #[serde(default = "default_video_aspect")]
    pub aspect_ratio: String,
}

fn default_video_aspect() -> String { "16:9".into() }

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub video_uri: String,
}
