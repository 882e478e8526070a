use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MediaError {
    #[error("media payload is empty")]
    Empty,
    #[error("malformed data URI")]
    MalformedDataUri,
    #[error("missing MIME type for raw base64 payload")]
    MissingMimeType,
    #[error("payload is not valid base64")]
    InvalidBase64,
}

/// Base64 payload plus MIME type, as sent in an `inlineData` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineMedia {
    pub mime_type: String,
    pub data: String,
}

impl InlineMedia {
    /// Accepts `data:<mime>;base64,<payload>` or a raw payload with a MIME type.
    pub fn parse(input: &str, mime_type: Option<&str>) -> Result<Self, MediaError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MediaError::Empty);
        }

        let (mime, data) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or(MediaError::MalformedDataUri)?;
                let mime = header.strip_suffix(";base64").ok_or(MediaError::MalformedDataUri)?;
                if mime.is_empty() {
                    return Err(MediaError::MalformedDataUri);
                }
                (mime.to_string(), payload.to_string())
            }
            None => {
                let mime = mime_type.filter(|m| !m.trim().is_empty()).ok_or(MediaError::MissingMimeType)?;
                (mime.trim().to_string(), input.to_string())
            }
        };

        if data.is_empty() {
            return Err(MediaError::Empty);
        }
        base64::engine::general_purpose::STANDARD
            .decode(data.as_bytes())
            .map_err(|_| MediaError::InvalidBase64)?;

        Ok(Self { mime_type: mime, data })
    }

    #[cfg(test)]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self { mime_type: mime_type.into(), data: base64::engine::general_purpose::STANDARD.encode(bytes) }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
