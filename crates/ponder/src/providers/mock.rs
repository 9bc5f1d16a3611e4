use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use super::base::{CompletionStream, Provider};
use crate::errors::ProviderError;
use crate::models::message::Message;

/// A mock provider that replays pre-scripted fragment sequences, one
/// sequence per `stream` call, for testing the orchestrator and the CLI
/// without a network.
pub struct MockProvider {
    scripts: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockProvider {
    /// Create a mock provider; each inner vec is the fragment sequence for
    /// one streaming call, consumed in order.
    pub fn new(scripts: Vec<Vec<&str>>) -> Self {
        let scripts = scripts
            .into_iter()
            .map(|fragments| fragments.into_iter().map(String::from).collect())
            .collect();
        Self {
            scripts: Arc::new(Mutex::new(scripts)),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn stream(&self, _messages: &[Message]) -> Result<CompletionStream, ProviderError> {
        let mut scripts = self.scripts.lock().unwrap();
        // Yield an empty stream once the scripts run out.
        let fragments: Vec<String> = if scripts.is_empty() {
            Vec::new()
        } else {
            scripts.remove(0)
        };
        Ok(Box::pin(stream::iter(fragments.into_iter().map(Ok))))
    }
}
