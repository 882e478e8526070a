use serde_json::Value;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    brief::DesignBrief,
    classifier::{ErrorKind, Remediation, GENERIC_FAILURE_MESSAGE},
    content::{GeneratedContent, Section},
    credentials::{ensure_selected, CredentialSelector, SelectionPolicy},
    gemini::{GeminiClient, GeminiError, StructuredCall, VideoRequest, CONTENT_MODEL, CREATIVE_SAMPLING},
    media::InlineMedia,
    models::ModelType,
    prompts::system_instruction,
    schema::SchemaRevision,
    validator::{self, ValidationError},
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Gemini(#[from] GeminiError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ServiceError {
    /// `attempted` prefixes raw messages of generic failures, e.g. "Failed to generate image".
    pub fn remediation(&self, attempted: &str) -> Remediation {
        match self {
            ServiceError::InvalidInput(msg) => Remediation::new(ErrorKind::InputValidation, msg.clone()),
            ServiceError::Validation(_) => Remediation::new(ErrorKind::MalformedResponse, GENERIC_FAILURE_MESSAGE),
            ServiceError::Gemini(e) => Remediation::from_service_message(&e.to_string(), attempted),
        }
    }
}

/// A validated generation: the parsed reply as returned, plus its rendering.
#[derive(Debug, Clone)]
pub struct Generation {
    pub revision: SchemaRevision,
    pub raw: Value,
    pub sections: Vec<Section>,
}

pub struct ContentService {
    gemini: Arc<GeminiClient>,
    selector: Arc<dyn CredentialSelector>,
    policy: SelectionPolicy,
    video_poll_interval: Duration,
}

impl ContentService {
    pub fn new(
        gemini: Arc<GeminiClient>,
        selector: Arc<dyn CredentialSelector>,
        policy: SelectionPolicy,
        video_poll_interval: Duration,
    ) -> Self {
        Self { gemini, selector, policy, video_poll_interval }
    }

    async fn ensure_credentials(&self) {
        ensure_selected(self.selector.as_ref(), self.policy).await;
    }

    /// Brief → instruction → schema-constrained call → shallow validation → typed content.
    pub async fn generate(&self, brief: &DesignBrief, revision: SchemaRevision) -> Result<Generation, ServiceError> {
        brief.validate().map_err(ServiceError::InvalidInput)?;
        self.ensure_credentials().await;

        let schema = revision.schema();
        let user_turn = brief.user_turn();
        info!("🚀 Generating {:?} content for: {}", revision, brief.base_idea.as_deref().unwrap_or_default());

        let call = StructuredCall {
            model: CONTENT_MODEL,
            system_instruction: system_instruction(revision),
            user_turn: &user_turn,
            schema: &schema,
            sampling: CREATIVE_SAMPLING,
        };
        let text = self.gemini.generate_structured(&call).await?;
        let raw = validator::validate(&text, &schema)?;
        let content = GeneratedContent::decode(revision, raw.clone())
            .map_err(|e| ValidationError::Shape(e.to_string()))?;
        let sections = content.sections();

        info!("✅ Generated {} sections", sections.len());
        Ok(Generation { revision, raw, sections })
    }

    /// Builds the user-facing remediation and opens key selection when it calls for it.
    pub async fn remediate(&self, err: &ServiceError, attempted: &str) -> Remediation {
        error!("❌ {}: {}", attempted, err);
        let remediation = err.remediation(attempted);
        if remediation.prompt_credential_selection {
            self.selector.open_select_key().await;
        }
        remediation
    }

    pub async fn run_task(&self, prompt: &str, model: ModelType) -> Result<String, ServiceError> {
        require(prompt, "Por favor, escribe una instrucción para Gemini.")?;
        self.ensure_credentials().await;
        Ok(self.gemini.generate_text(model.model_name(), prompt).await?)
    }

    pub async fn analyze(&self, media: &InlineMedia, prompt: &str) -> Result<String, ServiceError> {
        require(prompt, "Por favor, describe qué quieres analizar.")?;
        self.ensure_credentials().await;
        Ok(self.gemini.analyze_media(media, prompt).await?)
    }

    pub async fn edit_image(&self, media: &InlineMedia, prompt: &str) -> Result<InlineMedia, ServiceError> {
        require(prompt, "Por favor, describe la edición que quieres aplicar.")?;
        self.ensure_credentials().await;
        Ok(self.gemini.edit_image(media, prompt).await?)
    }

    pub async fn generate_image(&self, prompt: &str, aspect_ratio: &str, image_size: &str) -> Result<InlineMedia, ServiceError> {
        require(prompt, "Por favor, describe la imagen que quieres generar.")?;
        self.ensure_credentials().await;
        Ok(self.gemini.generate_image(prompt, aspect_ratio, image_size).await?)
    }

    pub async fn generate_video(&self, request: &VideoRequest) -> Result<String, ServiceError> {
        let has_prompt = request.prompt.as_deref().is_some_and(|p| !p.trim().is_empty());
        if !has_prompt && request.image.is_none() {
            return Err(ServiceError::InvalidInput(
                "Either an image or a text prompt must be provided for video generation.".into(),
            ));
        }
        self.ensure_credentials().await;
        Ok(self.gemini.generate_video(request, self.video_poll_interval).await?)
    }
}

fn require(value: &str, message: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{INVALID_KEY_MESSAGE, MISSING_KEY_MESSAGE};
    use crate::credentials::KeyStore;
    use crate::fixtures::{full_product_content, gemini_error, gemini_text_reply};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer, keys: Arc<KeyStore>) -> ContentService {
        let gemini = Arc::new(GeminiClient::new(server.uri(), keys.clone()));
        ContentService::new(gemini, keys, SelectionPolicy::Optimistic, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn generates_typed_content_from_valid_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-3-pro-preview:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply(&full_product_content().to_string())))
            .expect(1)
            .mount(&server)
            .await;

        let keys = Arc::new(KeyStore::new(Some("k".into())));
        let generation = service(&server, keys)
            .generate(&DesignBrief::from_base_idea("loro cubano"), SchemaRevision::ProductContent)
            .await
            .unwrap();

        assert_eq!(generation.raw, full_product_content());
        assert_eq!(generation.sections.len(), 10);
        assert_eq!(generation.sections[1].copy_text, "Marca: Cotorra\nSlogan: Habla claro");
    }

    #[tokio::test]
    async fn loosely_shaped_reply_is_returned_unchanged() {
        let mut reply = full_product_content();
        reply["hashtagsCTA"]["cta"] = Value::Null;
        reply["nicheTarget"] = serde_json::json!(7);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply(&reply.to_string())))
            .mount(&server)
            .await;

        let keys = Arc::new(KeyStore::new(Some("k".into())));
        let generation = service(&server, keys)
            .generate(&DesignBrief::from_base_idea("loro cubano"), SchemaRevision::ProductContent)
            .await
            .unwrap();

        assert_eq!(generation.raw, reply);
        assert_eq!(generation.sections.len(), 10);
        assert_eq!(generation.sections[2].body, "");
    }

    #[tokio::test]
    async fn empty_base_idea_never_reaches_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let keys = Arc::new(KeyStore::new(Some("k".into())));
        let err = service(&server, keys)
            .generate(&DesignBrief::from_base_idea(""), SchemaRevision::ProductContent)
            .await
            .unwrap_err();
        assert_eq!(err.remediation("x").kind, ErrorKind::InputValidation);
    }

    #[tokio::test]
    async fn malformed_json_gets_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("{not valid json")))
            .mount(&server)
            .await;

        let keys = Arc::new(KeyStore::new(Some("k".into())));
        let err = service(&server, keys)
            .generate(&DesignBrief::from_base_idea("taza"), SchemaRevision::ProductContent)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::Parse { .. })));
        assert_eq!(err.remediation("x"), Remediation::new(ErrorKind::MalformedResponse, GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn missing_key_requests_selection_and_hides_raw_error() {
        let server = MockServer::start().await;
        let keys = Arc::new(KeyStore::new(None));
        let svc = service(&server, keys.clone());

        let err = svc
            .generate(&DesignBrief::from_base_idea("taza"), SchemaRevision::ProductContent)
            .await
            .unwrap_err();
        let remediation = svc.remediate(&err, "Failed to generate content").await;

        assert_eq!(remediation.kind, ErrorKind::MissingCredential);
        assert_eq!(remediation.message, MISSING_KEY_MESSAGE);
        assert!(keys.status().selection_requested);
    }

    #[tokio::test]
    async fn stale_key_maps_to_invalid_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(gemini_error(404, "Requested entity was not found.", "NOT_FOUND")))
            .mount(&server)
            .await;

        let keys = Arc::new(KeyStore::new(Some("stale".into())));
        let svc = service(&server, keys);
        let err = svc.run_task("hola", ModelType::Fast).await.unwrap_err();
        let remediation = svc.remediate(&err, "Failed to get Gemini response").await;
        assert_eq!(remediation.message, INVALID_KEY_MESSAGE);
        assert!(remediation.billing_url.is_some());
    }

    #[tokio::test]
    async fn video_needs_prompt_or_image() {
        let server = MockServer::start().await;
        let keys = Arc::new(KeyStore::new(Some("k".into())));
        let request = VideoRequest { prompt: Some("  ".into()), image: None, aspect_ratio: "16:9".into() };
        let err = service(&server, keys).generate_video(&request).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn task_uses_mapped_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-lite:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("hola")))
            .expect(1)
            .mount(&server)
            .await;

        let keys = Arc::new(KeyStore::new(Some("k".into())));
        let reply = service(&server, keys).run_task("saluda", ModelType::FastLite).await.unwrap();
        assert_eq!(reply, "hola");
    }
}
