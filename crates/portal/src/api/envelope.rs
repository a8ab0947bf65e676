//! The JSON envelope every API response is wrapped in.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::ApiError;

/// `{ statusCode, isSuccess, serviceMessage, payload }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope {
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub service_message: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ApiEnvelope {
    /// The API reports success either through `isSuccess` or a 200 status
    /// code; endpoints are not consistent about which.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.is_success || self.status_code == 200
    }

    /// Non-empty `serviceMessage`.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.service_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Server message, else `fallback`.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message().unwrap_or(fallback).to_owned()
    }

    /// Decode the payload as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the payload has the wrong shape.
    pub fn payload<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.payload)?)
    }

    /// Decode a list payload.
    ///
    /// Empty lists arrive as `null`, `true` or a missing field depending on
    /// the endpoint; anything that is not an array is an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if an element has the wrong shape.
    pub fn payload_list<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        match self.payload {
            serde_json::Value::Array(_) => self.payload(),
            _ => Ok(Vec::new()),
        }
    }
}
