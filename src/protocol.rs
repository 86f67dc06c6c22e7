use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;
use crate::store::{clamp_str, MessageStore, Role};

/// Size of the outbound transmission buffer, terminator included.
pub const REQUEST_BUFFER_SIZE: usize = 4096;

/// Longest encoded request, in bytes.
pub const MAX_REQUEST_BYTES: usize = REQUEST_BUFFER_SIZE - 1;

pub const USER_TAG: &str = "[U]";
pub const ASSISTANT_TAG: &str = "[A]";

/// 3-byte wire tag for a role.
pub fn role_tag(role: Role) -> &'static str {
    match role {
        Role::User => USER_TAG,
        Role::Assistant => ASSISTANT_TAG,
    }
}

/// Serialize the history as `[U]text[A]text...`.
///
/// Every piece is clamped to the room left in the buffer, so an overlong
/// history is cut short (possibly in the middle of a tag) rather than
/// rejected. Tag substrings inside turn text are not escaped.
pub fn encode_request(store: &MessageStore) -> String {
    let mut out = String::with_capacity(MAX_REQUEST_BYTES);
    for turn in store.iter() {
        push_clamped(&mut out, role_tag(turn.role()));
        push_clamped(&mut out, turn.text());
    }
    out
}

fn push_clamped(out: &mut String, piece: &str) {
    let room = MAX_REQUEST_BYTES.saturating_sub(out.len());
    out.push_str(clamp_str(piece, room));
}

/// Parse an encoded request back into `(role, text)` pairs, the way the
/// phone-side bridge reads it. Empty segments and text with no preceding tag
/// are dropped.
pub fn decode_request(encoded: &str) -> Vec<(Role, String)> {
    let mut turns = Vec::new();
    let mut role: Option<Role> = None;
    let mut rest = encoded;

    loop {
        let next = next_tag(rest);
        let segment = match next {
            Some((idx, _)) => &rest[..idx],
            None => rest,
        };
        if !segment.is_empty() {
            if let Some(r) = role.take() {
                turns.push((r, segment.to_string()));
            }
        }
        match next {
            Some((idx, r)) => {
                role = Some(r);
                rest = &rest[idx + USER_TAG.len()..];
            }
            None => break,
        }
    }

    turns
}

fn next_tag(s: &str) -> Option<(usize, Role)> {
    let user = s.find(USER_TAG).map(|i| (i, Role::User));
    let assistant = s.find(ASSISTANT_TAG).map(|i| (i, Role::Assistant));
    match (user, assistant) {
        (Some(u), Some(a)) => Some(if u.0 < a.0 { u } else { a }),
        (u, a) => u.or(a),
    }
}

/// Outgoing chat request to the bridge.
#[derive(Debug, Serialize)]
pub struct OutboundRequest {
    #[serde(rename = "REQUEST_CHAT")]
    pub request_chat: String,
}

impl OutboundRequest {
    pub fn new(encoded: String) -> Self {
        Self {
            request_chat: encoded,
        }
    }

    pub fn to_json(&self) -> Result<String, ChatError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Incoming message from the bridge. One message may carry several keys.
#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "RESPONSE_CHUNK", default)]
    pub response_chunk: Option<String>,
    #[serde(rename = "RESPONSE_TEXT", default)]
    pub response_text: Option<String>,
    #[serde(rename = "RESPONSE_END", default)]
    pub response_end: Option<Value>,
    #[serde(rename = "READY_STATUS", default)]
    pub ready_status: Option<i64>,
}

/// Parsed bridge events for the app layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Chunk(String),
    Complete(String),
    End,
    /// Configuration status of the bridge; `true` once an API key is set.
    ReadyStatus(bool),
}

impl InboundMessage {
    pub fn parse(text: &str) -> Result<Self, ChatError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Flatten into events in processing order: text before end.
    /// A ready-status message is consumed on its own and nothing else in it
    /// is forwarded.
    pub fn into_events(self) -> Vec<InboundEvent> {
        if let Some(status) = self.ready_status {
            return vec![InboundEvent::ReadyStatus(status == 1)];
        }

        let mut events = Vec::new();
        if let Some(chunk) = self.response_chunk {
            events.push(InboundEvent::Chunk(chunk));
        }
        if let Some(text) = self.response_text {
            events.push(InboundEvent::Complete(text));
        }
        if self.response_end.is_some() {
            events.push(InboundEvent::End);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_two_turns() {
        let mut store = MessageStore::new();
        store.append(Role::User, "hi");
        store.append(Role::Assistant, "yo");
        assert_eq!(encode_request(&store), "[U]hi[A]yo");
    }

    #[test]
    fn test_encode_empty_store() {
        assert_eq!(encode_request(&MessageStore::new()), "");
    }

    #[test]
    fn test_encode_drops_evicted_turn() {
        let mut store = MessageStore::new();
        for i in 0..=10 {
            store.append(Role::User, &format!("T{i}|"));
        }
        let encoded = encode_request(&store);
        assert!(!encoded.contains("T0|"));
        assert!(encoded.starts_with("[U]T1|"));
        assert!(encoded.ends_with("[U]T10|"));
    }

    #[test]
    fn test_encode_truncates_at_buffer_bound() {
        let mut store = MessageStore::new();
        for _ in 0..10 {
            store.append(Role::User, &"x".repeat(511));
        }
        // 10 × (3 + 511) = 5140 bytes wanted, only 4095 fit.
        let encoded = encode_request(&store);
        assert_eq!(encoded.len(), MAX_REQUEST_BYTES);
        assert!(encoded.starts_with("[U]xxx"));
    }

    #[test]
    fn test_encode_can_cut_a_tag() {
        let mut store = MessageStore::new();
        // Seven full turns take 7 × 514 = 3598 bytes; a 495-byte turn brings it
        // to 4096 - 3 = 4093 so only two bytes of the next tag fit.
        for _ in 0..7 {
            store.append(Role::User, &"x".repeat(511));
        }
        store.append(Role::Assistant, &"y".repeat(492));
        store.append(Role::User, "tail");
        let encoded = encode_request(&store);
        assert_eq!(encoded.len(), MAX_REQUEST_BYTES);
        assert!(encoded.ends_with("y[U"));
    }

    #[test]
    fn test_decode_roundtrips_plain_history() {
        let turns = decode_request("[U]hi[A]yo[U]again");
        assert_eq!(
            turns,
            vec![
                (Role::User, "hi".to_string()),
                (Role::Assistant, "yo".to_string()),
                (Role::User, "again".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_splits_on_tag_inside_text() {
        // Tags are not escaped, so a literal tag in user text starts a new turn.
        let turns = decode_request("[U]say [A] please");
        assert_eq!(
            turns,
            vec![
                (Role::User, "say ".to_string()),
                (Role::Assistant, " please".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_ignores_untagged_and_empty_segments() {
        assert_eq!(decode_request("junk[U][A]ok"), vec![(Role::Assistant, "ok".to_string())]);
        assert!(decode_request("").is_empty());
    }

    #[test]
    fn test_outbound_request_json() {
        let json = OutboundRequest::new("[U]hi".into()).to_json().unwrap();
        assert_eq!(json, r#"{"REQUEST_CHAT":"[U]hi"}"#);
    }

    #[test]
    fn test_inbound_chunk_and_end_in_one_message() {
        let msg = InboundMessage::parse(r#"{"RESPONSE_CHUNK":"Hel","RESPONSE_END":1}"#).unwrap();
        assert_eq!(
            msg.into_events(),
            vec![InboundEvent::Chunk("Hel".into()), InboundEvent::End]
        );
    }

    #[test]
    fn test_inbound_whole_text() {
        let msg = InboundMessage::parse(r#"{"RESPONSE_TEXT":"Hello there"}"#).unwrap();
        assert_eq!(msg.into_events(), vec![InboundEvent::Complete("Hello there".into())]);
    }

    #[test]
    fn test_ready_status_swallows_other_keys() {
        let msg = InboundMessage::parse(r#"{"READY_STATUS":1,"RESPONSE_CHUNK":"x"}"#).unwrap();
        assert_eq!(msg.into_events(), vec![InboundEvent::ReadyStatus(true)]);
        let msg = InboundMessage::parse(r#"{"READY_STATUS":0}"#).unwrap();
        assert_eq!(msg.into_events(), vec![InboundEvent::ReadyStatus(false)]);
    }

    #[test]
    fn test_inbound_rejects_garbage() {
        assert!(matches!(InboundMessage::parse("not json"), Err(ChatError::Json(_))));
    }
}
