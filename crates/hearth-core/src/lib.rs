//! hearth-core - request routing for the hearth household manager
//!
//! This crate provides:
//! - Keyword classifier that maps free-text prompts to a crew category
//! - Fixed registry of specialist crews (personal, knowledge, house)
//! - Dispatcher that builds a work unit and runs it against an LLM backend
//! - Bounded executor that keeps slow remote calls off the request path
//! - Uniform response envelope consumed by the HTTP boundary

pub mod api;
pub mod category;
pub mod crew;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod local;
pub mod runner;

// Re-export main types for convenience
pub use api::AnthropicClient;
pub use category::{Category, classify};
pub use crew::{Crew, CrewRegistry, Specialist};
pub use dispatch::{HouseholdManager, WorkUnit};
pub use envelope::{AgentResult, EnvelopeMessage, ResponseEnvelope, ResponseStatus};
pub use error::DispatchError;
pub use executor::CrewExecutor;
pub use local::LocalClient;
pub use runner::{CrewRunner, LlmRunner};
