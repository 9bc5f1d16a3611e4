//! The objects passed between the session, the orchestrator and the
//! provider: role-tagged chat messages in the shape the OpenAI-compatible
//! chat completions payload expects.

pub mod message;
pub mod role;
