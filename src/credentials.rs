use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Host-side capability for choosing which API key backs generative calls.
#[async_trait]
pub trait CredentialSelector: Send + Sync {
    async fn has_selected_key(&self) -> bool;

    /// Asks the user to pick a key. Completion is not observable by the caller.
    async fn open_select_key(&self);
}

/// What to do after requesting a selection when no key is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Proceed immediately and let the call fail if the user has not finished.
    Optimistic,
    /// Poll the selector until a key shows up or the timeout elapses.
    AwaitConfirmation { timeout: Duration },
}

const CONFIRMATION_POLL: Duration = Duration::from_millis(250);

/// Runs the pre-call credential check. Returns whether a key was selected
/// when the call is about to be made (always `true` if it already was).
pub async fn ensure_selected(selector: &dyn CredentialSelector, policy: SelectionPolicy) -> bool {
    if selector.has_selected_key().await {
        return true;
    }

    warn!("🔑 No API key selected, requesting selection");
    selector.open_select_key().await;

    match policy {
        SelectionPolicy::Optimistic => {
            info!("Proceeding without confirmation of key selection");
            false
        }
        SelectionPolicy::AwaitConfirmation { timeout } => {
            let deadline = tokio::time::Instant::now() + timeout;
            while tokio::time::Instant::now() < deadline {
                tokio::time::sleep(CONFIRMATION_POLL).await;
                if selector.has_selected_key().await {
                    info!("✅ API key selection confirmed");
                    return true;
                }
            }
            warn!("⏱️ Gave up waiting for API key selection after {:?}", timeout);
            false
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub selected: bool,
    pub selection_requested: bool,
}

#[derive(Default)]
struct KeyState {
    key: Option<String>,
    selection_requested: bool,
}

/// In-process key store. The Gemini client reads the key from here right
/// before each call, so a key selected mid-flight is picked up by the next one.
#[derive(Default)]
pub struct KeyStore {
    state: RwLock<KeyState>,
}

impl KeyStore {
    pub fn new(initial: Option<String>) -> Self {
        Self { state: RwLock::new(KeyState { key: initial, selection_requested: false }) }
    }

    pub fn api_key(&self) -> Option<String> {
        self.state.read().key.clone()
    }

    pub fn select(&self, key: String) {
        let mut state = self.state.write();
        state.key = Some(key);
        state.selection_requested = false;
        info!("🔑 API key selected");
    }

    pub fn status(&self) -> CredentialStatus {
        let state = self.state.read();
        CredentialStatus { selected: state.key.is_some(), selection_requested: state.selection_requested }
    }
}

#[async_trait]
impl CredentialSelector for KeyStore {
    async fn has_selected_key(&self) -> bool {
        self.state.read().key.is_some()
    }

    async fn open_select_key(&self) {
        self.state.write().selection_requested = true;
        info!("🪟 API key selection requested; waiting on POST /api/credentials");
    }
}
