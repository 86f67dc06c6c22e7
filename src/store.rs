//! Bounded conversation history.
//!
//! The store keeps at most [`HISTORY_CAPACITY`] turns. Appending past that
//! silently drops the oldest turn, so the earliest context disappears from
//! both the display and every later request.

use std::collections::VecDeque;

use tracing::debug;

/// Number of turns the history holds.
pub const HISTORY_CAPACITY: usize = 10;

/// Size of a turn's text buffer, terminator included.
pub const TURN_BUFFER_SIZE: usize = 512;

/// Longest text a single turn can carry, in bytes.
pub const MAX_TURN_BYTES: usize = TURN_BUFFER_SIZE - 1;

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    /// Build a turn, clamping `text` to [`MAX_TURN_BYTES`].
    pub fn new(role: Role, text: &str) -> Self {
        let mut turn = Self {
            role,
            text: String::with_capacity(MAX_TURN_BYTES),
        };
        turn.push_str(text);
        turn
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Append as much of `text` as fits. Returns the number of bytes taken.
    pub fn push_str(&mut self, text: &str) -> usize {
        let room = MAX_TURN_BYTES.saturating_sub(self.text.len());
        let taken = clamp_str(text, room);
        self.text.push_str(taken);
        taken.len()
    }
}

/// What `append_chunk` did with a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkApplied {
    /// A new assistant turn was started with the fragment.
    Created,
    /// The fragment was concatenated onto the last assistant turn.
    Appended,
}

/// Fixed-capacity, ordered conversation history with FIFO eviction.
#[derive(Debug, Clone)]
pub struct MessageStore {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Insert a turn at the tail, evicting the oldest one when full.
    /// Returns the evicted turn, if any.
    pub fn append(&mut self, role: Role, text: &str) -> Option<Turn> {
        let evicted = if self.turns.len() >= self.capacity {
            self.turns.pop_front()
        } else {
            None
        };
        if let Some(ref old) = evicted {
            debug!(role = ?old.role, bytes = old.text.len(), "history full, evicted oldest turn");
        }
        self.turns.push_back(Turn::new(role, text));
        evicted
    }

    /// Feed a streamed fragment into the history.
    ///
    /// Starts a new assistant turn when the history is empty or ends with a
    /// user turn; otherwise extends the last turn, dropping whatever does not
    /// fit.
    pub fn append_chunk(&mut self, text: &str) -> ChunkApplied {
        match self.turns.back_mut() {
            Some(last) if !last.is_user() => {
                let taken = last.push_str(text);
                if taken < text.len() {
                    debug!(dropped = text.len() - taken, "turn buffer full, chunk truncated");
                }
                ChunkApplied::Appended
            }
            _ => {
                self.append(Role::Assistant, text);
                ChunkApplied::Created
            }
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub(crate) fn clamp_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(store: &MessageStore) -> Vec<String> {
        store.iter().map(|t| t.text().to_string()).collect()
    }

    #[test]
    fn test_append_keeps_order() {
        let mut store = MessageStore::new();
        store.append(Role::User, "hi");
        store.append(Role::Assistant, "yo");
        assert_eq!(store.len(), 2);
        assert_eq!(texts(&store), vec!["hi", "yo"]);
        assert_eq!(store.last().map(Turn::role), Some(Role::Assistant));
    }

    #[test]
    fn test_count_never_exceeds_capacity() {
        let mut store = MessageStore::new();
        for i in 0..37 {
            let role = if i % 3 == 0 { Role::Assistant } else { Role::User };
            store.append(role, &format!("t{i}"));
            assert!(store.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(store.len(), HISTORY_CAPACITY);
        let expected: Vec<String> = (27..37).map(|i| format!("t{i}")).collect();
        assert_eq!(texts(&store), expected);
    }

    #[test]
    fn test_eleventh_append_evicts_first() {
        let mut store = MessageStore::new();
        for i in 0..10 {
            assert!(store.append(Role::User, &format!("T{i}")).is_none());
        }
        let evicted = store.append(Role::Assistant, "T10");
        assert_eq!(evicted.map(|t| t.text().to_string()), Some("T0".to_string()));
        let expected: Vec<String> = (1..=10).map(|i| format!("T{i}")).collect();
        assert_eq!(texts(&store), expected);
    }

    #[test]
    fn test_chunk_on_empty_store_creates_assistant_turn() {
        let mut chunked = MessageStore::new();
        let mut direct = MessageStore::new();
        assert_eq!(chunked.append_chunk("Hel"), ChunkApplied::Created);
        direct.append(Role::Assistant, "Hel");
        assert_eq!(texts(&chunked), texts(&direct));
        assert_eq!(chunked.last().map(Turn::role), Some(Role::Assistant));
    }

    #[test]
    fn test_chunk_after_user_turn_creates_assistant_turn() {
        let mut store = MessageStore::new();
        store.append(Role::User, "question");
        assert_eq!(store.append_chunk("answer"), ChunkApplied::Created);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_chunk_concatenates_onto_assistant_turn() {
        let mut store = MessageStore::new();
        store.append(Role::Assistant, "Hel");
        assert_eq!(store.append_chunk("lo"), ChunkApplied::Appended);
        assert_eq!(store.len(), 1);
        assert_eq!(store.last().map(Turn::text), Some("Hello"));
    }

    #[test]
    fn test_chunk_truncates_silently_at_capacity() {
        let mut store = MessageStore::new();
        store.append(Role::Assistant, &"a".repeat(500));
        store.append_chunk(&"b".repeat(40));
        let last = store.last().unwrap();
        assert_eq!(last.text().len(), MAX_TURN_BYTES);
        assert!(last.text().ends_with(&"b".repeat(11)));

        // Already full: further chunks change nothing.
        assert_eq!(store.append_chunk("more"), ChunkApplied::Appended);
        assert_eq!(store.last().unwrap().text().len(), MAX_TURN_BYTES);
    }

    #[test]
    fn test_turn_text_clamped_on_char_boundary() {
        // 3-byte chars: 170 of them is 510 bytes, the 171st would cross 511.
        let text = "€".repeat(200);
        let turn = Turn::new(Role::User, &text);
        assert_eq!(turn.text().len(), 510);
        assert!(turn.text().chars().all(|c| c == '€'));
    }

    #[test]
    fn test_clear_empties_store() {
        let mut store = MessageStore::new();
        store.append(Role::User, "a");
        store.append(Role::Assistant, "b");
        store.clear();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[test]
    fn test_clamp_str() {
        assert_eq!(clamp_str("hello", 10), "hello");
        assert_eq!(clamp_str("hello", 3), "hel");
        assert_eq!(clamp_str("héllo", 2), "h");
        assert_eq!(clamp_str("abc", 0), "");
    }
}
