use serde::Deserialize;
use tracing::debug;

use crate::store::{ChunkApplied, MessageStore, Role};

/// How the bridge delivers an assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Repeated partial fragments, closed by an end-of-response event.
    Chunked,
    /// One complete text event, closed by an end-of-response event.
    WholeText,
}

/// Whether a reply is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    AwaitingResponse,
}

/// One inbound reply event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamInput<'a> {
    Chunk(&'a str),
    Complete(&'a str),
    End,
}

/// What the caller has to do after an event was applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// History text changed; the layout must be rebuilt.
    pub rebuild: bool,
    /// A new assistant turn appeared; jump to the bottom.
    pub scroll_to_bottom: bool,
    /// The reply is complete.
    pub finished: bool,
}

/// Turns inbound reply events into history mutations.
#[derive(Debug, Clone)]
pub struct StreamAssembler {
    mode: DeliveryMode,
    state: StreamState,
}

impl StreamAssembler {
    pub fn new(mode: DeliveryMode) -> Self {
        Self {
            mode,
            state: StreamState::Idle,
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_awaiting(&self) -> bool {
        self.state == StreamState::AwaitingResponse
    }

    /// The request went out; a reply is now expected.
    pub fn mark_sent(&mut self) {
        self.state = StreamState::AwaitingResponse;
    }

    pub fn reset(&mut self) {
        self.state = StreamState::Idle;
    }

    /// Apply one event to `store`.
    ///
    /// Whether a fragment opens a new turn depends only on the last turn's
    /// role, not on the current state, so late fragments after an end event
    /// still land in the history.
    pub fn apply(&mut self, store: &mut MessageStore, input: StreamInput<'_>) -> Outcome {
        match input {
            StreamInput::Chunk(text) => {
                if self.mode != DeliveryMode::Chunked {
                    debug!("chunk received in whole-text mode");
                }
                let applied = store.append_chunk(text);
                Outcome {
                    rebuild: true,
                    scroll_to_bottom: applied == ChunkApplied::Created,
                    finished: false,
                }
            }
            StreamInput::Complete(text) => {
                if self.mode != DeliveryMode::WholeText {
                    debug!("complete text received in chunked mode");
                }
                store.append(Role::Assistant, text);
                Outcome {
                    rebuild: true,
                    scroll_to_bottom: true,
                    finished: false,
                }
            }
            StreamInput::End => {
                if self.state == StreamState::Idle {
                    debug!("end of response while idle");
                }
                self.state = StreamState::Idle;
                Outcome {
                    finished: true,
                    ..Outcome::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_then_end_cycles_state() {
        let mut assembler = StreamAssembler::new(DeliveryMode::Chunked);
        let mut store = MessageStore::new();
        assert_eq!(assembler.state(), StreamState::Idle);
        assembler.mark_sent();
        assert!(assembler.is_awaiting());
        let outcome = assembler.apply(&mut store, StreamInput::End);
        assert!(outcome.finished);
        assert!(!outcome.rebuild);
        assert_eq!(assembler.state(), StreamState::Idle);
    }

    #[test]
    fn test_first_chunk_scrolls_later_chunks_do_not() {
        let mut assembler = StreamAssembler::new(DeliveryMode::Chunked);
        let mut store = MessageStore::new();
        store.append(Role::User, "hi");
        assembler.mark_sent();

        let first = assembler.apply(&mut store, StreamInput::Chunk("Hel"));
        assert!(first.rebuild && first.scroll_to_bottom);

        let second = assembler.apply(&mut store, StreamInput::Chunk("lo"));
        assert!(second.rebuild);
        assert!(!second.scroll_to_bottom);

        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().text(), "Hello");
        assert!(assembler.is_awaiting());
    }

    #[test]
    fn test_whole_text_always_creates_a_turn() {
        let mut assembler = StreamAssembler::new(DeliveryMode::WholeText);
        let mut store = MessageStore::new();
        store.append(Role::User, "hi");
        let outcome = assembler.apply(&mut store, StreamInput::Complete("Hello there"));
        assert!(outcome.scroll_to_bottom);
        assembler.apply(&mut store, StreamInput::Complete("Second"));
        assert_eq!(store.len(), 3);
        assert_eq!(store.last().unwrap().role(), Role::Assistant);
    }

    #[test]
    fn test_chunk_decision_ignores_state() {
        let mut assembler = StreamAssembler::new(DeliveryMode::Chunked);
        let mut store = MessageStore::new();
        store.append(Role::Assistant, "done");
        // Idle, but the last turn is an assistant turn: append.
        let outcome = assembler.apply(&mut store, StreamInput::Chunk("!"));
        assert!(!outcome.scroll_to_bottom);
        assert_eq!(store.last().unwrap().text(), "done!");
    }
}
