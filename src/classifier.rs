use serde::Serialize;

pub const BILLING_URL: &str = "https://ai.google.dev/gemini-api/docs/billing";

pub const INVALID_KEY_MESSAGE: &str = "Error con la clave API. Por favor, selecciona tu clave API de nuevo. \
Asegúrate de usar una clave de un proyecto de GCP con facturación activada.";

pub const MISSING_KEY_MESSAGE: &str = "API Key no encontrada. Asegúrate de que tu entorno de ejecución la proporciona. \
Si estás en AI Studio, por favor, selecciona una clave API.";

pub const GENERIC_FAILURE_MESSAGE: &str = "Ocurrió un error al generar el contenido. Inténtalo de nuevo.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    InputValidation,
    InvalidCredential,
    MissingCredential,
    MalformedResponse,
    Generic,
}

pub struct Rule {
    pub needle: &'static str,
    pub kind: ErrorKind,
}

/// Evaluated in order; the first rule whose needle occurs in the message wins.
pub const RULES: &[Rule] = &[
    Rule { needle: "Requested entity was not found.", kind: ErrorKind::InvalidCredential },
    Rule { needle: "API_KEY environment variable is not set.", kind: ErrorKind::MissingCredential },
];

pub fn classify_message(message: &str) -> ErrorKind {
    RULES
        .iter()
        .find(|rule| message.contains(rule.needle))
        .map_or(ErrorKind::Generic, |rule| rule.kind)
}

/// What the user is shown, and whether the key picker should be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    pub kind: ErrorKind,
    pub message: String,
    pub prompt_credential_selection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_url: Option<&'static str>,
}

impl Remediation {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), prompt_credential_selection: false, billing_url: None }
    }

    /// Classifies a service/transport error message. Generic failures keep
    /// the raw message, prefixed with what was being attempted.
    pub fn from_service_message(message: &str, attempted: &str) -> Self {
        match classify_message(message) {
            ErrorKind::InvalidCredential => Self {
                kind: ErrorKind::InvalidCredential,
                message: INVALID_KEY_MESSAGE.to_string(),
                prompt_credential_selection: true,
                billing_url: Some(BILLING_URL),
            },
            ErrorKind::MissingCredential => Self {
                kind: ErrorKind::MissingCredential,
                message: MISSING_KEY_MESSAGE.to_string(),
                prompt_credential_selection: true,
                billing_url: None,
            },
            kind => Self::new(kind, format!("{attempted}: {message}")),
        }
    }
}
