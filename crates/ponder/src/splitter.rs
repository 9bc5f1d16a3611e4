//! Incremental splitter for reasoning-model output.
//!
//! Reasoning models interleave a thinking segment, bracketed by literal
//! marker tags (`<think>` / `</think>`), with the final answer in a single
//! completion stream. The stream arrives in arbitrarily sized fragments and
//! a marker may straddle any number of fragment boundaries, so detection
//! has to be an explicit state machine with a bounded holdback buffer
//! rather than a regex pass over the accumulated text.

pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

/// The placeholder some models emit when they decide not to think.
const EMPTY_THINK: &str = "<think>\n\n</think>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitterState {
    /// No opening marker seen yet.
    Scanning,
    /// Between the opening and closing markers.
    InReasoning,
    /// Closing marker seen; everything from here on is answer text.
    Done,
}

/// Text classified by a single `push` or `finish` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    pub reasoning: String,
    pub answer: String,
    /// True on the call that observed the closing marker.
    pub reasoning_closed: bool,
}

/// Splits a fragment stream into reasoning and answer channels.
///
/// First-pair-only semantics: once the closing marker has been seen, later
/// literal occurrences of either marker are ordinary answer text. A closing
/// marker with no preceding opening marker is also ordinary text.
#[derive(Debug, Clone)]
pub struct TagSplitter {
    open_tag: String,
    close_tag: String,
    state: SplitterState,
    // Unclassified tail, at most len(tag) - 1 bytes between pushes.
    buffer: String,
}

impl Default for TagSplitter {
    fn default() -> Self {
        TagSplitter::new(THINK_OPEN, THINK_CLOSE)
    }
}

impl TagSplitter {
    pub fn new(open_tag: impl Into<String>, close_tag: impl Into<String>) -> Self {
        TagSplitter {
            open_tag: open_tag.into(),
            close_tag: close_tag.into(),
            state: SplitterState::Scanning,
            buffer: String::new(),
        }
    }

    pub fn state(&self) -> SplitterState {
        self.state
    }

    /// Whether the closing marker has been observed.
    pub fn reasoning_closed(&self) -> bool {
        self.state == SplitterState::Done
    }

    /// Whether an opening marker was ever observed.
    pub fn entered_reasoning(&self) -> bool {
        self.state != SplitterState::Scanning
    }

    /// Consume one fragment and classify as much of it as possible.
    ///
    /// Text that could still turn out to be the start of a marker is held
    /// back until a later fragment (or `finish`) disambiguates it.
    pub fn push(&mut self, fragment: &str) -> SplitOutput {
        let mut out = SplitOutput::default();
        self.buffer.push_str(fragment);

        loop {
            match self.state {
                SplitterState::Scanning => {
                    if let Some(idx) = self.buffer.find(&self.open_tag) {
                        // Text before the opening marker is answer content.
                        out.answer.push_str(&self.buffer[..idx]);
                        self.buffer.drain(..idx + self.open_tag.len());
                        self.state = SplitterState::InReasoning;
                        continue;
                    }
                    let emit = self.buffer.len() - holdback(&self.buffer, &self.open_tag);
                    out.answer.push_str(&self.buffer[..emit]);
                    self.buffer.drain(..emit);
                    break;
                }
                SplitterState::InReasoning => {
                    if let Some(idx) = self.buffer.find(&self.close_tag) {
                        out.reasoning.push_str(&self.buffer[..idx]);
                        self.buffer.drain(..idx + self.close_tag.len());
                        out.reasoning_closed = true;
                        self.state = SplitterState::Done;
                        continue;
                    }
                    let emit = self.buffer.len() - holdback(&self.buffer, &self.close_tag);
                    out.reasoning.push_str(&self.buffer[..emit]);
                    self.buffer.drain(..emit);
                    break;
                }
                SplitterState::Done => {
                    out.answer.push_str(&self.buffer);
                    self.buffer.clear();
                    break;
                }
            }
        }

        out
    }

    /// Flush the holdback at end-of-stream.
    ///
    /// A tail still pending in `Scanning` or `Done` was never a marker, so
    /// it is answer text. A tail pending in `InReasoning` is reasoning that
    /// was cut off before its closing marker; the caller can tell from
    /// `reasoning_closed()` that the segment did not terminate naturally.
    pub fn finish(&mut self) -> SplitOutput {
        let mut out = SplitOutput::default();
        match self.state {
            SplitterState::Scanning | SplitterState::Done => {
                out.answer.push_str(&self.buffer);
            }
            SplitterState::InReasoning => {
                out.reasoning.push_str(&self.buffer);
            }
        }
        self.buffer.clear();
        out
    }

    pub fn reset(&mut self) {
        self.state = SplitterState::Scanning;
        self.buffer.clear();
    }
}

/// Length of the longest proper suffix of `buffer` that is a prefix of
/// `tag`, i.e. the bytes that must be withheld because the next fragment
/// could complete the marker. Bounded by `tag.len() - 1`.
fn holdback(buffer: &str, tag: &str) -> usize {
    let max = tag.len().saturating_sub(1).min(buffer.len());
    for keep in (1..=max).rev() {
        // Tags are ASCII; a tail that does not start on a char boundary
        // cannot match one.
        if let Some(tail) = buffer.get(buffer.len() - keep..) {
            if tag.starts_with(tail) {
                return keep;
            }
        }
    }
    0
}

/// Remove the marker pair (and the empty-thinking placeholder) from a
/// composite string. Idempotent: already-stripped text passes through
/// unchanged.
pub fn strip_reasoning_markers(text: &str) -> String {
    text.replace(EMPTY_THINK, "")
        .replace(THINK_OPEN, "")
        .replace(THINK_CLOSE, "")
}

/// Collapse whitespace-only reasoning to empty, so an empty thinking
/// segment renders as if no segment existed.
pub fn collapse_empty_reasoning(reasoning: String) -> String {
    if reasoning.trim().is_empty() {
        String::new()
    } else {
        reasoning
    }
}
