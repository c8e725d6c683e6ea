//! Wire message shapes for the chat relay (JSON text frames).
//!
//! Field names follow the browser client's camelCase convention. All frames
//! carry a `type` tag: server to client frames are `history`, `userCount`,
//! and `message`; the only accepted client to server frame is `message`.

use serde::{Deserialize, Serialize};

/// An accepted chat message as stored in history and broadcast to peers.
///
/// Immutable once created. Carries a copied identity snapshot rather than a
/// reference to the sending connection, so it outlives the sender. The
/// `timestamp` is the client-supplied value passed through verbatim; the
/// server assigns only the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub timestamp: String,
}

/// Server-to-client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Replay of the current history buffer; sent once, to the joiner only.
    History { messages: Vec<ChatMessage> },
    /// Current distinct-user count; broadcast whenever it may have changed.
    UserCount { count: usize },
    /// One accepted chat message; broadcast to all connections.
    Message(ChatMessage),
}

impl ServerEvent {
    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> String {
        // These shapes have no fallible serialization paths.
        serde_json::to_string(self).expect("server event serializes to JSON")
    }
}

/// Client-to-server frames. Anything that fails to parse into this shape is
/// dropped by the lifecycle handler without a reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    Message {
        user_id: String,
        user_name: String,
        content: String,
        timestamp: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_message() -> ChatMessage {
        ChatMessage {
            id: "1756464000000-1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Alice".to_string(),
            content: "hello".to_string(),
            timestamp: "2026-08-29T12:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_history_event_wire_shape() {
        // given:
        let event = ServerEvent::History {
            messages: vec![test_message()],
        };

        // when:
        let value: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();

        // then:
        assert_eq!(
            value,
            json!({
                "type": "history",
                "messages": [{
                    "id": "1756464000000-1",
                    "userId": "u1",
                    "userName": "Alice",
                    "content": "hello",
                    "timestamp": "2026-08-29T12:00:00.000Z",
                }],
            })
        );
    }

    #[test]
    fn test_user_count_event_wire_shape() {
        // given:
        let event = ServerEvent::UserCount { count: 3 };

        // when:
        let value: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();

        // then:
        assert_eq!(value, json!({"type": "userCount", "count": 3}));
    }

    #[test]
    fn test_message_event_wire_shape_is_flat() {
        // given:
        let event = ServerEvent::Message(test_message());

        // when:
        let value: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();

        // then: message fields sit next to the type tag, not nested
        assert_eq!(value["type"], "message");
        assert_eq!(value["id"], "1756464000000-1");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["userName"], "Alice");
        assert_eq!(value["content"], "hello");
        assert_eq!(value["timestamp"], "2026-08-29T12:00:00.000Z");
    }

    #[test]
    fn test_client_frame_parses_message() {
        // given:
        let raw = r#"{"type":"message","userId":"u1","userName":"Alice","content":"hi","timestamp":"2026-08-29T12:00:00.000Z"}"#;

        // when:
        let frame: ClientFrame = serde_json::from_str(raw).unwrap();

        // then: timestamp is passed through verbatim
        let ClientFrame::Message {
            user_id,
            user_name,
            content,
            timestamp,
        } = frame;
        assert_eq!(user_id, "u1");
        assert_eq!(user_name, "Alice");
        assert_eq!(content, "hi");
        assert_eq!(timestamp, "2026-08-29T12:00:00.000Z");
    }

    #[test]
    fn test_client_frame_rejects_unknown_type() {
        // given:
        let raw = r#"{"type":"typing","userId":"u1"}"#;

        // when / then:
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }

    #[test]
    fn test_client_frame_rejects_missing_content() {
        // given:
        let raw = r#"{"type":"message","userId":"u1","userName":"Alice","timestamp":"t"}"#;

        // when / then:
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }

    #[test]
    fn test_client_frame_rejects_invalid_json() {
        // given:
        let raw = "not json at all";

        // when / then:
        assert!(serde_json::from_str::<ClientFrame>(raw).is_err());
    }
}
