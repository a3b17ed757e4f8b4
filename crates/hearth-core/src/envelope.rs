//! Response envelope — the uniform JSON shape returned for every request

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Outcome of a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The selected specialist produced a response.
    Success,
    /// Execution failed; a canned fallback response was substituted.
    PartialSuccess,
    /// The dispatcher itself is not operational (e.g. missing credentials).
    Unavailable,
}

/// A chat-style message in the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeMessage {
    pub role: String,
    pub content: String,
}

/// Per-agent result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent: String,
    pub output: String,
}

/// The uniform output shape. Constructed fresh per request; the HTTP
/// boundary returns it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    pub messages: Vec<EnvelopeMessage>,
    pub results: Vec<AgentResult>,
}

impl ResponseEnvelope {
    /// Envelope for a completed remote execution.
    pub fn success(category: Category, output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            status: ResponseStatus::Success,
            messages: vec![EnvelopeMessage {
                role: "assistant".to_string(),
                content: output.clone(),
            }],
            results: vec![AgentResult {
                agent: category.as_str().to_string(),
                output,
            }],
        }
    }

    /// Degraded envelope for a failed remote execution. The raw error text
    /// is embedded in the result payload for diagnostics; the user-facing
    /// message is a generic fallback acknowledging the request.
    pub fn degraded(request: &str, error: impl std::fmt::Display) -> Self {
        Self {
            status: ResponseStatus::PartialSuccess,
            messages: vec![EnvelopeMessage {
                role: "assistant".to_string(),
                content: format!(
                    "I understood you want to {request}. However, I encountered an \
                     issue accessing my full processing capabilities. Here is a basic \
                     response: Getting started with something new is always exciting! \
                     I recommend breaking it down into small steps."
                ),
            }],
            results: vec![AgentResult {
                agent: "ManagerAgent".to_string(),
                output: format!("Error: {error}"),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ResponseStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&ResponseStatus::PartialSuccess).unwrap(),
            "\"partial_success\""
        );
        assert_eq!(
            serde_json::to_string(&ResponseStatus::Unavailable).unwrap(),
            "\"unavailable\""
        );
    }

    #[test]
    fn test_success_envelope_shape() {
        let envelope = ResponseEnvelope::success(Category::House, "restocked");
        assert_eq!(envelope.status, ResponseStatus::Success);
        assert_eq!(envelope.messages.len(), 1);
        assert_eq!(envelope.messages[0].role, "assistant");
        assert_eq!(envelope.messages[0].content, "restocked");
        assert_eq!(envelope.results.len(), 1);
        assert_eq!(envelope.results[0].agent, "house");
        assert_eq!(envelope.results[0].output, "restocked");
    }

    #[test]
    fn test_degraded_envelope_shape() {
        let envelope = ResponseEnvelope::degraded("buy milk", "connection refused");
        assert_eq!(envelope.status, ResponseStatus::PartialSuccess);
        assert!(envelope.messages[0].content.contains("buy milk"));
        assert_eq!(envelope.results[0].agent, "ManagerAgent");
        assert_eq!(envelope.results[0].output, "Error: connection refused");
    }

    #[test]
    fn test_envelope_serializes_snake_case_status() {
        let envelope = ResponseEnvelope::degraded("x", "boom");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "partial_success");
        assert!(json["messages"].is_array());
        assert!(json["results"].is_array());
    }
}
