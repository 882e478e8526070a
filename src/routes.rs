use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    credentials::{CredentialStatus, KeyStore},
    error::AppError,
    gemini::VideoRequest,
    media::InlineMedia,
    models::{
        CreateFormRequest, GenerateRequest, GenerateResponse, ImageGenerationRequest, ImageResponse, MediaInput,
        MediaPromptRequest, SelectKeyRequest, TaskRequest, TextResponse, VideoGenerationRequest, VideoResponse,
    },
    brief::DesignBrief,
    service::{ContentService, ServiceError},
    session::{FormSession, FormStore, SessionError},
};

#[derive(Clone)]
pub struct AppState {
    pub forms: Arc<FormStore>,
    pub service: Arc<ContentService>,
    pub keys: Arc<KeyStore>,
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Busy(_) => AppError::Conflict(e.to_string()),
        }
    }
}

async fn fail(state: &AppState, err: ServiceError, attempted: &str) -> AppError {
    AppError::Generation(state.service.remediate(&err, attempted).await)
}

fn media(input: &MediaInput) -> Result<InlineMedia, AppError> {
    Ok(InlineMedia::parse(&input.data, input.mime_type.as_deref())?)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn credential_status(State(state): State<AppState>) -> Json<CredentialStatus> {
    Json(state.keys.status())
}

pub async fn select_credential(
    State(state): State<AppState>,
    Json(body): Json<SelectKeyRequest>,
) -> Result<Json<CredentialStatus>, AppError> {
    let key = body.api_key.trim();
    if key.is_empty() {
        return Err(AppError::Validation("apiKey must not be empty".into()));
    }
    state.keys.select(key.to_string());
    Ok(Json(state.keys.status()))
}

pub async fn create_form(State(state): State<AppState>, body: Option<Json<CreateFormRequest>>) -> Json<FormSession> {
    let revision = body.map(|Json(b)| b.revision).unwrap_or_default();
    Json(state.forms.create(revision))
}

pub async fn get_form(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<FormSession>, AppError> {
    state.forms.get(id).map(Json).ok_or_else(|| AppError::NotFound(format!("form {id} not found")))
}

pub async fn delete_form(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.forms.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_form(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(brief): Json<DesignBrief>,
) -> Result<Json<FormSession>, AppError> {
    Ok(Json(state.forms.submit(&state.service, id, brief).await?))
}

pub async fn generate(State(state): State<AppState>, Json(body): Json<GenerateRequest>) -> Result<Json<GenerateResponse>, AppError> {
    match state.service.generate(&body.brief, body.revision).await {
        Ok(g) => Ok(Json(GenerateResponse { revision: g.revision, content: g.raw, sections: g.sections })),
        Err(e) => Err(fail(&state, e, "Failed to generate content").await),
    }
}

pub async fn run_task(State(state): State<AppState>, Json(body): Json<TaskRequest>) -> Result<Json<TextResponse>, AppError> {
    match state.service.run_task(&body.prompt, body.model_type).await {
        Ok(response_text) => Ok(Json(TextResponse { response_text })),
        Err(e) => Err(fail(&state, e, "Failed to get Gemini response").await),
    }
}

pub async fn analyze_image(State(state): State<AppState>, Json(body): Json<MediaPromptRequest>) -> Result<Json<TextResponse>, AppError> {
    let image = media(&body.media)?;
    match state.service.analyze(&image, &body.prompt).await {
        Ok(response_text) => Ok(Json(TextResponse { response_text })),
        Err(e) => Err(fail(&state, e, "Failed to analyze image").await),
    }
}

pub async fn analyze_video(State(state): State<AppState>, Json(body): Json<MediaPromptRequest>) -> Result<Json<TextResponse>, AppError> {
    let video = media(&body.media)?;
    match state.service.analyze(&video, &body.prompt).await {
        Ok(response_text) => Ok(Json(TextResponse { response_text })),
        Err(e) => Err(fail(&state, e, "Failed to analyze video").await),
    }
}

pub async fn edit_image(State(state): State<AppState>, Json(body): Json<MediaPromptRequest>) -> Result<Json<ImageResponse>, AppError> {
    let image = media(&body.media)?;
    match state.service.edit_image(&image, &body.prompt).await {
        Ok(edited) => Ok(Json(edited.into())),
        Err(e) => Err(fail(&state, e, "Failed to edit image").await),
    }
}

pub async fn generate_image(
    State(state): State<AppState>,
    Json(body): Json<ImageGenerationRequest>,
) -> Result<Json<ImageResponse>, AppError> {
    match state.service.generate_image(&body.prompt, &body.aspect_ratio, &body.image_size).await {
        Ok(image) => Ok(Json(image.into())),
        Err(e) => Err(fail(&state, e, "Failed to generate image").await),
    }
}

pub async fn generate_video(
    State(state): State<AppState>,
    Json(body): Json<VideoGenerationRequest>,
) -> Result<Json<VideoResponse>, AppError> {
    let image = body.image.as_ref().map(media).transpose()?;
    let request = VideoRequest { prompt: body.prompt, image, aspect_ratio: body.aspect_ratio };
    match state.service.generate_video(&request).await {
        Ok(video_uri) => Ok(Json(VideoResponse { video_uri })),
        Err(e) => Err(fail(&state, e, "Failed to generate video").await),
    }
}
