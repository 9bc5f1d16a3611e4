use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::ProviderError;
use crate::models::message::Message;

/// Incremental text fragments from one streaming completion. The stream
/// ending is the end-of-stream signal; fragments arrive in order.
pub type CompletionStream = BoxStream<'static, Result<String, ProviderError>>;

/// A streaming completion provider (Groq, or a scripted mock in tests).
///
/// One call is one independent generation over the given history; the
/// orchestrator issues two of these per user turn.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn stream(&self, messages: &[Message]) -> Result<CompletionStream, ProviderError>;
}
