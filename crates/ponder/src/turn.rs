//! The two-phase turn orchestrator.
//!
//! One user turn issues two sequential completions over the same history.
//! Request #1 is consumed only until the reasoning segment closes, with the
//! reasoning streamed to a collapsible region; request #2 is a fresh,
//! independent generation whose fragments become the visible answer. The
//! second request is not a continuation of the first stream, so the answer
//! is conditioned on the shared history but not on the particular reasoning
//! trace that was just displayed. That tradeoff is deliberate: the
//! reasoning phase is for display only.

use futures::StreamExt;
use tracing::{debug, warn};

use crate::errors::TurnError;
use crate::models::message::Message;
use crate::providers::base::Provider;
use crate::session::ChatSession;
use crate::splitter::{collapse_empty_reasoning, strip_reasoning_markers, TagSplitter};

pub const THINKING_LABEL: &str = "Thinking...";
pub const THINKING_COMPLETE_LABEL: &str = "Thinking complete";
pub const THINKING_INTERRUPTED_LABEL: &str = "Thinking cut short";

/// Presentation port. The orchestrator emits display events in a fixed
/// order per turn: `begin_collapsible`, repeated `append_collapsible`,
/// `collapse`, repeated `append_inline`. The concrete rendering (terminal,
/// UI, test recorder) lives outside the core.
pub trait Renderer: Send {
    fn begin_collapsible(&mut self, label: &str);
    fn append_collapsible(&mut self, text: &str);
    fn collapse(&mut self, label: &str);
    fn append_inline(&mut self, text: &str);
}

/// Accumulated text for one phase and whether the phase ended naturally
/// (for the reasoning phase: the closing marker was seen, or no reasoning
/// segment existed at all).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseResult {
    pub text: String,
    pub terminated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Empty input: nothing was sent and nothing was appended.
    Skipped,
    Completed {
        /// The stored assistant content: reasoning (markers stripped,
        /// whitespace-only collapsed to empty) followed by the answer.
        content: String,
        /// False when the reasoning segment ended without its closing
        /// marker.
        reasoning_terminated: bool,
    },
}

/// Run one complete user turn against the provider.
///
/// Appends the user message, observes the reasoning phase and then the
/// answer phase, and commits exactly one composite assistant message. A
/// failure of either request aborts the turn with no assistant message
/// appended. The commit is epoch-guarded, so a session reset that lands
/// while the turn is in flight wins over the stale completion.
pub async fn run_turn(
    provider: &dyn Provider,
    session: &mut ChatSession,
    renderer: &mut dyn Renderer,
    input: &str,
) -> Result<TurnOutcome, TurnError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(TurnOutcome::Skipped);
    }

    session.push_user(input);
    let epoch = session.epoch();
    let request = session.request_messages().to_vec();

    debug!("observing reasoning phase");
    let reasoning = observe_reasoning(provider, &request, renderer).await?;

    debug!("observing answer phase");
    let answer = observe_answer(provider, &request, renderer).await?;

    let content = format!("{}{}", reasoning.text, answer.text);
    session.append_assistant(epoch, content.clone());

    Ok(TurnOutcome::Completed {
        content,
        reasoning_terminated: reasoning.terminated,
    })
}

/// Request #1: stream through the splitter and surface the reasoning
/// channel. Consumption stops at the closing marker; whatever the provider
/// sends after it is left on the wire, since request #2 regenerates the
/// answer. Answer-channel text seen here (the normally-empty pre-marker
/// prefix) is discarded for the same reason.
async fn observe_reasoning(
    provider: &dyn Provider,
    messages: &[Message],
    renderer: &mut dyn Renderer,
) -> Result<PhaseResult, TurnError> {
    let mut splitter = TagSplitter::default();
    let mut stream = provider.stream(messages).await?;

    renderer.begin_collapsible(THINKING_LABEL);

    let mut reasoning = String::new();
    let mut closed = false;
    while let Some(fragment) = stream.next().await {
        let out = splitter.push(&fragment?);
        if !out.reasoning.is_empty() {
            reasoning.push_str(&out.reasoning);
            renderer.append_collapsible(&out.reasoning);
        }
        if out.reasoning_closed {
            closed = true;
            break;
        }
    }

    if !closed {
        // End-of-stream: flush the holdback. In Scanning this tail is
        // answer text and no reasoning segment existed.
        reasoning.push_str(&splitter.finish().reasoning);
    }

    let terminated = closed || !splitter.entered_reasoning();
    if !terminated {
        warn!("reasoning segment ended without a closing marker");
    }
    renderer.collapse(if terminated {
        THINKING_COMPLETE_LABEL
    } else {
        THINKING_INTERRUPTED_LABEL
    });

    Ok(PhaseResult {
        text: collapse_empty_reasoning(reasoning),
        terminated,
    })
}

/// Request #2: a fresh generation accumulated verbatim as the answer.
/// Stray markers are stripped from the stored text only; the live render
/// shows the fragments as they arrive.
async fn observe_answer(
    provider: &dyn Provider,
    messages: &[Message],
    renderer: &mut dyn Renderer,
) -> Result<PhaseResult, TurnError> {
    let mut stream = provider.stream(messages).await?;

    let mut answer = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        renderer.append_inline(&fragment);
        answer.push_str(&fragment);
    }

    Ok(PhaseResult {
        text: strip_reasoning_markers(&answer),
        terminated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::models::role::Role;
    use crate::providers::base::CompletionStream;
    use crate::providers::mock::MockProvider;
    use async_trait::async_trait;
    use futures::stream;

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Begin(String),
        Thinking(String),
        Collapse(String),
        Answer(String),
    }

    #[derive(Default)]
    struct RecordingRenderer {
        events: Vec<Event>,
    }

    impl Renderer for RecordingRenderer {
        fn begin_collapsible(&mut self, label: &str) {
            self.events.push(Event::Begin(label.to_string()));
        }
        fn append_collapsible(&mut self, text: &str) {
            self.events.push(Event::Thinking(text.to_string()));
        }
        fn collapse(&mut self, label: &str) {
            self.events.push(Event::Collapse(label.to_string()));
        }
        fn append_inline(&mut self, text: &str) {
            self.events.push(Event::Answer(text.to_string()));
        }
    }

    /// Fails on the first `stream` call.
    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        async fn stream(&self, _: &[Message]) -> Result<CompletionStream, ProviderError> {
            Err(ProviderError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    /// Yields one fragment, then errors mid-stream.
    struct MidStreamFailProvider;

    #[async_trait]
    impl Provider for MidStreamFailProvider {
        async fn stream(&self, _: &[Message]) -> Result<CompletionStream, ProviderError> {
            Ok(Box::pin(stream::iter(vec![
                Ok("<think>part".to_string()),
                Err(ProviderError::Malformed("truncated".to_string())),
            ])))
        }
    }

    #[tokio::test]
    async fn test_turn_end_to_end() {
        let provider = MockProvider::new(vec![vec!["<think>step1</think>"], vec!["Final."]]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "What?")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                content: "step1Final.".to_string(),
                reasoning_terminated: true,
            }
        );
        // System + user + exactly one assistant message.
        assert_eq!(session.request_messages().len(), 3);
        let last = session.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "step1Final.");

        assert_eq!(
            renderer.events,
            vec![
                Event::Begin(THINKING_LABEL.to_string()),
                Event::Thinking("step1".to_string()),
                Event::Collapse(THINKING_COMPLETE_LABEL.to_string()),
                Event::Answer("Final.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_reasoning_streams_across_fragments() {
        let provider = MockProvider::new(vec![
            vec!["<thi", "nk>step ", "one</th", "ink> leftover"],
            vec!["Answer ", "text"],
        ]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "Why?")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                content: "step oneAnswer text".to_string(),
                reasoning_terminated: true,
            }
        );
        assert_eq!(
            renderer.events,
            vec![
                Event::Begin(THINKING_LABEL.to_string()),
                Event::Thinking("step ".to_string()),
                Event::Thinking("one".to_string()),
                Event::Collapse(THINKING_COMPLETE_LABEL.to_string()),
                Event::Answer("Answer ".to_string()),
                Event::Answer("text".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_input_is_a_noop() {
        let provider = MockProvider::new(vec![vec!["should never be requested"]]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "   ")
            .await
            .unwrap();

        assert_eq!(outcome, TurnOutcome::Skipped);
        assert_eq!(session.request_messages().len(), 1);
        assert!(renderer.events.is_empty());
    }

    #[tokio::test]
    async fn test_no_reasoning_segment() {
        let provider = MockProvider::new(vec![vec!["plain answer, no markers"], vec!["Final."]]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "Hi")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                content: "Final.".to_string(),
                reasoning_terminated: true,
            }
        );
    }

    #[tokio::test]
    async fn test_empty_reasoning_placeholder_collapses() {
        let provider = MockProvider::new(vec![vec!["<think>\n\n</think>ignored"], vec!["Hello"]]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "Hi")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                content: "Hello".to_string(),
                reasoning_terminated: true,
            }
        );
    }

    #[tokio::test]
    async fn test_unterminated_reasoning_proceeds_to_answer() {
        let provider = MockProvider::new(vec![vec!["<think>never closed"], vec!["Answer"]]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "Hi")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                content: "never closedAnswer".to_string(),
                reasoning_terminated: false,
            }
        );
        assert!(renderer
            .events
            .contains(&Event::Collapse(THINKING_INTERRUPTED_LABEL.to_string())));
    }

    #[tokio::test]
    async fn test_stray_markers_stripped_from_stored_answer() {
        let provider = MockProvider::new(vec![
            vec!["<think>r</think>"],
            vec!["<think>\n\n</think>Hi there"],
        ]);
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let outcome = run_turn(&provider, &mut session, &mut renderer, "Hi")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::Completed {
                content: "rHi there".to_string(),
                reasoning_terminated: true,
            }
        );
    }

    #[tokio::test]
    async fn test_request_failure_appends_nothing() {
        let provider = FailingProvider;
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let err = run_turn(&provider, &mut session, &mut renderer, "Hi")
            .await
            .unwrap_err();

        assert!(matches!(err, TurnError::Provider(_)));
        // The user message stays; no assistant message was appended.
        assert_eq!(session.request_messages().len(), 2);
        assert_eq!(session.last().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_appends_nothing() {
        let provider = MidStreamFailProvider;
        let mut session = ChatSession::default();
        let mut renderer = RecordingRenderer::default();

        let err = run_turn(&provider, &mut session, &mut renderer, "Hi")
            .await
            .unwrap_err();

        assert!(matches!(err, TurnError::Provider(_)));
        assert_eq!(session.request_messages().len(), 2);
    }
}
