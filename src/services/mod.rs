pub mod email;
pub mod enhancement;
pub mod notifier;
pub mod templates;
pub mod whatsapp;

use serde::Serialize;

/// Uniform result shape for every notification dispatcher. Provider errors
/// are folded into this value at the call site and never propagated as
/// errors past the dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub success: bool,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn sent(method: &str, message_id: Option<String>, status: Option<String>) -> Self {
        Self {
            success: true,
            method: method.to_string(),
            message_id,
            status,
            error: None,
        }
    }

    pub fn failed(method: &str, error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            method: method.to_string(),
            message_id: None,
            status: None,
            error: Some(error.to_string()),
        }
    }
}
