//! Remote execution collaborator
//!
//! A [`CrewRunner`] takes one work unit, sends it to a language model with
//! the assigned specialist as prompt framing, and returns generated text
//! or fails. The trait is the seam the dispatcher is tested through.

use anyhow::Result;
use async_trait::async_trait;

use crate::api::AnthropicClient;
use crate::crew::Specialist;
use crate::dispatch::WorkUnit;
use crate::error::DispatchError;
use crate::local::LocalClient;

#[async_trait]
pub trait CrewRunner: Send + Sync {
    /// Run one work unit against the remote model and return its text.
    async fn run(&self, unit: &WorkUnit) -> Result<String>;
}

/// Build the system prompt framing a specialist for the model.
pub(crate) fn specialist_prompt(specialist: &Specialist, expected_output: &str) -> String {
    format!(
        "You are the {role}.\n\nGoal: {goal}\n\n{backstory}\n\nExpected output: {expected}",
        role = specialist.role,
        goal = specialist.goal,
        backstory = specialist.backstory,
        expected = expected_output,
    )
}

/// Unified LLM runner over the configured backends. The dispatcher never
/// sees which one answers.
#[derive(Debug, Clone)]
pub enum LlmRunner {
    Anthropic(AnthropicClient),
    Local(LocalClient),
}

impl LlmRunner {
    /// Pick a backend from what configuration provides: the cloud client
    /// when an API key is present, the local endpoint otherwise. With
    /// neither, construction fails and the gateway reports `unavailable`.
    pub fn from_backends(
        anthropic: Option<AnthropicClient>,
        local: Option<LocalClient>,
    ) -> Result<Self, DispatchError> {
        if let Some(client) = anthropic {
            return Ok(Self::Anthropic(client));
        }
        if let Some(client) = local {
            return Ok(Self::Local(client));
        }
        Err(DispatchError::Misconfigured(
            "no Anthropic API key and no local endpoint configured".to_string(),
        ))
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Anthropic(client) => client.model(),
            Self::Local(client) => client.model(),
        }
    }
}

#[async_trait]
impl CrewRunner for LlmRunner {
    async fn run(&self, unit: &WorkUnit) -> Result<String> {
        let system = specialist_prompt(unit.specialist, &unit.expected_output);
        match self {
            Self::Anthropic(client) => client.complete(&system, &unit.description).await,
            Self::Local(client) => client.complete(&system, &unit.description).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::crew::CrewRegistry;

    #[test]
    fn test_from_backends_prefers_anthropic() {
        let runner = LlmRunner::from_backends(
            Some(AnthropicClient::new("sk-ant-test".to_string(), None)),
            Some(LocalClient::new(
                "http://localhost:11434".to_string(),
                "llama3.2".to_string(),
            )),
        )
        .unwrap();
        assert!(matches!(runner, LlmRunner::Anthropic(_)));
    }

    #[test]
    fn test_from_backends_falls_back_to_local() {
        let runner = LlmRunner::from_backends(
            None,
            Some(LocalClient::new(
                "http://localhost:11434".to_string(),
                "llama3.2".to_string(),
            )),
        )
        .unwrap();
        assert!(matches!(runner, LlmRunner::Local(_)));
        assert_eq!(runner.model(), "llama3.2");
    }

    #[test]
    fn test_from_backends_neither_is_misconfigured() {
        let err = LlmRunner::from_backends(None, None).unwrap_err();
        assert!(matches!(err, DispatchError::Misconfigured(_)));
    }

    #[test]
    fn test_specialist_prompt_framing() {
        let registry = CrewRegistry::new();
        let specialist = registry.crew_for(Category::House).select_first();
        let prompt = specialist_prompt(specialist, "A helpful response.");
        assert!(prompt.contains("Inventory Agent"));
        assert!(prompt.contains("Goal: "));
        assert!(prompt.contains("Expected output: A helpful response."));
    }
}
