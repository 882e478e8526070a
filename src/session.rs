//! Form instances: one brief-to-content exchange at a time per form.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    brief::DesignBrief,
    classifier::{ErrorKind, Remediation},
    content::Section,
    schema::SchemaRevision,
    service::{ContentService, Generation},
};

/// `Failed` is an idle form showing an error; it accepts a new submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormStatus {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub status: FormStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("form {0} not found")]
    NotFound(Uuid),
    #[error("form {0} already has a generation in flight")]
    Busy(Uuid),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSession {
    pub id: Uuid,
    pub revision: SchemaRevision,
    pub status: FormStatus,
    pub content: Option<Value>,
    pub sections: Vec<Section>,
    pub error: Option<Remediation>,
    pub history: Vec<Transition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSession {
    pub fn new(revision: SchemaRevision) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            revision,
            status: FormStatus::Idle,
            content: None,
            sections: Vec::new(),
            error: None,
            history: vec![Transition { status: FormStatus::Idle, at: now }],
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, status: FormStatus) {
        let now = Utc::now();
        self.status = status;
        self.updated_at = now;
        self.history.push(Transition { status, at: now });
    }

    /// Clears the previous outcome and marks the form in flight.
    fn begin(&mut self) -> Result<(), SessionError> {
        if self.status == FormStatus::InFlight {
            return Err(SessionError::Busy(self.id));
        }
        self.content = None;
        self.sections.clear();
        self.error = None;
        self.transition(FormStatus::InFlight);
        Ok(())
    }

    fn succeed(&mut self, generation: Generation) {
        self.content = Some(generation.raw);
        self.sections = generation.sections;
        self.error = None;
        self.transition(FormStatus::Succeeded);
    }

    fn fail(&mut self, remediation: Remediation) {
        self.content = None;
        self.sections.clear();
        self.error = Some(remediation);
        self.transition(FormStatus::Failed);
    }

    #[cfg(test)]
    pub fn statuses(&self) -> Vec<FormStatus> {
        self.history.iter().map(|t| t.status).collect()
    }
}

pub const CANCELLED_MESSAGE: &str = "La generación se interrumpió antes de terminar. Inténtalo de nuevo.";

/// Fails the form if the submit is dropped mid-flight (e.g. the client went
/// away), so it never stays stuck in `InFlight`.
struct InFlightGuard<'a> {
    store: &'a FormStore,
    id: Uuid,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(form) = self.store.forms.write().get_mut(&self.id) {
            if form.status == FormStatus::InFlight {
                warn!("🛑 Submit on form {} dropped before finishing", self.id);
                form.fail(Remediation::new(ErrorKind::Generic, CANCELLED_MESSAGE));
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct FormStore {
    forms: RwLock<HashMap<Uuid, FormSession>>,
}

impl FormStore {
    pub fn create(&self, revision: SchemaRevision) -> FormSession {
        let form = FormSession::new(revision);
        self.forms.write().insert(form.id, form.clone());
        info!("📝 Created form {} ({:?})", form.id, revision);
        form
    }

    pub fn get(&self, id: Uuid) -> Option<FormSession> {
        self.forms.read().get(&id).cloned()
    }

    /// Forgets a form. One with a generation in flight cannot be removed.
    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        let mut forms = self.forms.write();
        match forms.get(&id) {
            None => Err(SessionError::NotFound(id)),
            Some(form) if form.status == FormStatus::InFlight => Err(SessionError::Busy(id)),
            Some(_) => {
                forms.remove(&id);
                info!("🗑️ Removed form {}", id);
                Ok(())
            }
        }
    }

    /// Runs one submit on form `id`. Failures end up in the returned view;
    /// only an unknown or busy form is an `Err`.
    pub async fn submit(&self, service: &ContentService, id: Uuid, brief: DesignBrief) -> Result<FormSession, SessionError> {
        let revision = {
            let mut guard = self.forms.write();
            let form = guard.get_mut(&id).ok_or(SessionError::NotFound(id))?;
            if form.status == FormStatus::InFlight {
                warn!("⛔ Form {} is busy, rejecting submit", id);
                return Err(SessionError::Busy(id));
            }
            if let Err(msg) = brief.validate() {
                form.fail(Remediation::new(ErrorKind::InputValidation, msg));
                return Ok(form.clone());
            }
            form.begin()?;
            form.revision
        };

        // lock released while the call is outstanding
        let in_flight = InFlightGuard { store: self, id, armed: true };
        let outcome = match service.generate(&brief, revision).await {
            Ok(generation) => Ok(generation),
            Err(err) => Err(service.remediate(&err, "Failed to generate content").await),
        };
        in_flight.disarm();

        let mut guard = self.forms.write();
        let form = guard.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        match outcome {
            Ok(generation) => form.succeed(generation),
            Err(remediation) => form.fail(remediation),
        }
        info!("🏁 Form {} finished as {:?}", id, form.status);
        Ok(form.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{GENERIC_FAILURE_MESSAGE, MISSING_KEY_MESSAGE};
    use crate::credentials::{KeyStore, SelectionPolicy};
    use crate::fixtures::{full_product_content, gemini_error, gemini_text_reply};
    use crate::gemini::GeminiClient;
    use pretty_assertions::assert_eq;
    use std::{sync::Arc, time::Duration};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer, key: Option<&str>) -> ContentService {
        let keys = Arc::new(KeyStore::new(key.map(str::to_string)));
        let gemini = Arc::new(GeminiClient::new(server.uri(), keys.clone()));
        ContentService::new(gemini, keys, SelectionPolicy::Optimistic, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn successful_submit_walks_idle_in_flight_succeeded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply(&full_product_content().to_string())))
            .mount(&server)
            .await;

        let store = FormStore::default();
        let form = store.create(SchemaRevision::ProductContent);
        let view = store
            .submit(&service(&server, Some("k")), form.id, DesignBrief::from_base_idea("loro cubano"))
            .await
            .unwrap();

        assert_eq!(view.statuses(), vec![FormStatus::Idle, FormStatus::InFlight, FormStatus::Succeeded]);
        assert_eq!(view.content, Some(full_product_content()));
        let titles: Vec<_> = view.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles.len(), 10);
        assert!(titles.iter().all(|t| !t.is_empty()));
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn empty_idea_fails_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let store = FormStore::default();
        let form = store.create(SchemaRevision::ProductContent);
        let view = store.submit(&service(&server, Some("k")), form.id, DesignBrief::from_base_idea("")).await.unwrap();

        assert_eq!(view.statuses(), vec![FormStatus::Idle, FormStatus::Failed]);
        assert_eq!(view.error.unwrap().kind, ErrorKind::InputValidation);
    }

    #[tokio::test]
    async fn missing_key_shows_selection_prompt_not_raw_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(gemini_error(500, "API_KEY environment variable is not set.", "INTERNAL")))
            .mount(&server)
            .await;

        let store = FormStore::default();
        let form = store.create(SchemaRevision::ProductContent);
        let view = store.submit(&service(&server, Some("k")), form.id, DesignBrief::from_base_idea("taza")).await.unwrap();

        let error = view.error.unwrap();
        assert_eq!(error.kind, ErrorKind::MissingCredential);
        assert_eq!(error.message, MISSING_KEY_MESSAGE);
        assert!(error.prompt_credential_selection);
        assert_eq!(view.status, FormStatus::Failed);
    }

    #[tokio::test]
    async fn invalid_json_shows_generic_failure_and_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply("{not valid json")))
            .mount(&server)
            .await;

        let store = FormStore::default();
        let form = store.create(SchemaRevision::ProductContent);
        let view = store.submit(&service(&server, Some("k")), form.id, DesignBrief::from_base_idea("taza")).await.unwrap();

        assert_eq!(view.error.unwrap().message, GENERIC_FAILURE_MESSAGE);
        assert!(view.content.is_none());
        assert!(view.sections.is_empty());
    }

    #[tokio::test]
    async fn failed_form_accepts_a_new_submit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text_reply(&full_product_content().to_string())))
            .mount(&server)
            .await;

        let store = FormStore::default();
        let svc = service(&server, Some("k"));
        let form = store.create(SchemaRevision::ProductContent);
        store.submit(&svc, form.id, DesignBrief::default()).await.unwrap();
        let view = store.submit(&svc, form.id, DesignBrief::from_base_idea("taza")).await.unwrap();

        assert_eq!(view.status, FormStatus::Succeeded);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn in_flight_form_rejects_second_submit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_text_reply(&full_product_content().to_string()))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(FormStore::default());
        let svc = Arc::new(service(&server, Some("k")));
        let id = store.create(SchemaRevision::ProductContent).id;

        let first = {
            let (store, svc) = (store.clone(), svc.clone());
            tokio::spawn(async move { store.submit(&svc, id, DesignBrief::from_base_idea("uno")).await })
        };
        while store.get(id).unwrap().status != FormStatus::InFlight {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let second = store.submit(&svc, id, DesignBrief::from_base_idea("dos")).await;
        assert_eq!(second.unwrap_err(), SessionError::Busy(id));
        assert_eq!(first.await.unwrap().unwrap().status, FormStatus::Succeeded);
    }

    #[tokio::test]
    async fn dropped_submit_frees_the_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_text_reply(&full_product_content().to_string()))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let store = Arc::new(FormStore::default());
        let svc = Arc::new(service(&server, Some("k")));
        let id = store.create(SchemaRevision::ProductContent).id;

        let pending = {
            let (store, svc) = (store.clone(), svc.clone());
            tokio::spawn(async move { store.submit(&svc, id, DesignBrief::from_base_idea("uno")).await })
        };
        while store.get(id).unwrap().status != FormStatus::InFlight {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        let form = store.get(id).unwrap();
        assert_eq!(form.statuses(), vec![FormStatus::Idle, FormStatus::InFlight, FormStatus::Failed]);
        assert_eq!(form.error.unwrap().message, CANCELLED_MESSAGE);

        let view = store.submit(&svc, id, DesignBrief::from_base_idea("dos")).await.unwrap();
        assert_eq!(view.status, FormStatus::Succeeded);
    }

    #[tokio::test]
    async fn removed_form_is_gone() {
        let store = FormStore::default();
        let id = store.create(SchemaRevision::PodCampaign).id;

        store.remove(id).unwrap();
        assert!(store.get(id).is_none());
        assert_eq!(store.remove(id), Err(SessionError::NotFound(id)));
    }

    #[tokio::test]
    async fn in_flight_form_cannot_be_removed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_text_reply(&full_product_content().to_string()))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let store = Arc::new(FormStore::default());
        let svc = Arc::new(service(&server, Some("k")));
        let id = store.create(SchemaRevision::ProductContent).id;

        let pending = {
            let (store, svc) = (store.clone(), svc.clone());
            tokio::spawn(async move { store.submit(&svc, id, DesignBrief::from_base_idea("uno")).await })
        };
        while store.get(id).unwrap().status != FormStatus::InFlight {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(store.remove(id), Err(SessionError::Busy(id)));
        pending.await.unwrap().unwrap();
        store.remove(id).unwrap();
    }

    #[tokio::test]
    async fn unknown_form_is_not_found() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        let err = FormStore::default().submit(&service(&server, Some("k")), id, DesignBrief::default()).await;
        assert_eq!(err.unwrap_err(), SessionError::NotFound(id));
    }
}
