//! The household manager — classify, select, execute, normalize
//!
//! `process_request` is the single entry point the HTTP boundary calls.
//! It is infallible by design: every execution failure is absorbed here
//! and converted into a degraded envelope, never a raised fault.

use tracing::{info, warn};

use crate::category::classify;
use crate::crew::{CrewRegistry, Specialist};
use crate::envelope::ResponseEnvelope;
use crate::executor::CrewExecutor;

const EXPECTED_OUTPUT: &str = "A helpful and informative response to the user's request.";

/// Ephemeral unit of work built per request and discarded after it.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    /// The user's original text.
    pub request: String,
    /// Task description sent to the model.
    pub description: String,
    /// What a good answer looks like, as prompt framing.
    pub expected_output: String,
    /// The specialist assigned to this unit.
    pub specialist: &'static Specialist,
}

impl WorkUnit {
    pub fn for_request(text: &str, specialist: &'static Specialist) -> Self {
        Self {
            request: text.to_string(),
            description: format!(
                "Process the user request: {text}. Provide a helpful, detailed response."
            ),
            expected_output: EXPECTED_OUTPUT.to_string(),
            specialist,
        }
    }
}

/// Routes free-text prompts to specialist crews and normalizes outcomes.
pub struct HouseholdManager {
    crews: CrewRegistry,
    executor: CrewExecutor,
}

impl HouseholdManager {
    pub fn new(executor: CrewExecutor) -> Self {
        info!("HouseholdManager initialized with three specialist crews");
        Self {
            crews: CrewRegistry::new(),
            executor,
        }
    }

    /// Process one prompt end to end. Always returns a well-formed
    /// envelope; failures surface as `partial_success`, never as errors.
    pub async fn process_request(&self, text: &str) -> ResponseEnvelope {
        let category = classify(text);
        let crew = self.crews.crew_for(category);
        let specialist = crew.select_first();

        info!(
            "Dispatching {} request via {} (specialist: {})",
            category,
            category.agent_label(),
            specialist.role,
        );

        let unit = WorkUnit::for_request(text, specialist);

        match self.executor.execute(&unit).await {
            Ok(output) => ResponseEnvelope::success(category, output),
            Err(e) => {
                warn!("Crew execution failed, degrading response: {}", e);
                ResponseEnvelope::degraded(text, e)
            }
        }
    }
}
