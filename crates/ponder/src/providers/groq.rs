use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{CompletionStream, Provider};
use super::configs::GroqProviderConfig;
use crate::errors::ProviderError;
use crate::models::message::Message;

/// Streaming client for the Groq OpenAI-compatible chat completions
/// endpoint.
pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self { client, config })
    }

    fn build_payload(&self, messages: &[Message]) -> Value {
        if self.config.web_search {
            // Web search requires the browser tool and pinned sampling
            // parameters.
            json!({
                "model": self.config.model,
                "messages": messages,
                "stream": true,
                "temperature": 1,
                "max_completion_tokens": 2048,
                "top_p": 1,
                "stop": null,
                "tool_choice": "required",
                "tools": [{"type": "browser_search"}],
            })
        } else {
            json!({
                "model": self.config.model,
                "messages": messages,
                "stream": true,
            })
        }
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn stream(&self, messages: &[Message]) -> Result<CompletionStream, ProviderError> {
        let url = format!(
            "{}/openai/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&self.build_payload(messages))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(sse_fragments(response.bytes_stream()))
    }
}

/// Decode an SSE byte stream into content deltas.
///
/// Events are `data:` lines carrying chat completion chunks; the text lives
/// at `choices[0].delta.content` and `data: [DONE]` terminates the stream.
/// Lines may be split across network chunks, so they are reassembled in a
/// buffer first.
fn sse_fragments(
    bytes: impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
) -> CompletionStream {
    Box::pin(try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer = String::new();

        'recv: while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(ProviderError::Request)?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=pos).collect();
                let line = line.trim_end();

                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim_start();
                if data == "[DONE]" {
                    break 'recv;
                }

                let event: Value = serde_json::from_str(data)
                    .map_err(|e| ProviderError::Malformed(e.to_string()))?;
                if let Some(delta) = event
                    .pointer("/choices/0/delta/content")
                    .and_then(Value::as_str)
                {
                    if !delta.is_empty() {
                        yield delta.to_string();
                    }
                }
            }
        }
    })
}
