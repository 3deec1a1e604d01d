//! Chat history as the host hands it to the pipeline.

use serde::{Deserialize, Serialize};

/// One turn of the host's chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Sent by the end user
    #[serde(default)]
    pub is_user: bool,

    /// Host-generated narration or notice, never a search source
    #[serde(default)]
    pub is_system: bool,

    /// The raw message text (`mes` in host chat exports)
    #[serde(default, alias = "mes")]
    pub text: String,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            is_user: true,
            is_system: false,
            text: text.into(),
        }
    }

    /// Create a non-user, non-system turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            is_user: false,
            is_system: false,
            text: text.into(),
        }
    }

    /// Create a system turn.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            is_user: false,
            is_system: true,
            text: text.into(),
        }
    }
}

/// Scan `items` from the end and return the first one matching `predicate`.
pub fn rfind_turn<T, P>(items: &[T], mut predicate: P) -> Option<&T>
where
    P: FnMut(&T) -> bool,
{
    items.iter().rev().find(|item| predicate(item))
}

/// The most recent user turn, skipping system turns.
pub fn latest_user_turn(turns: &[ChatTurn]) -> Option<&ChatTurn> {
    rfind_turn(turns, |t| !t.is_system && t.is_user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_user_turn_scans_backwards() {
        let chat = vec![
            ChatTurn::user("first question"),
            ChatTurn::assistant("an answer"),
            ChatTurn::user("second question"),
            ChatTurn::assistant("another answer"),
        ];
        assert_eq!(latest_user_turn(&chat).unwrap().text, "second question");
    }

    #[test]
    fn system_turns_are_skipped_even_if_flagged_user() {
        let chat = vec![
            ChatTurn::user("real question"),
            ChatTurn {
                is_user: true,
                is_system: true,
                text: "narration".into(),
            },
        ];
        assert_eq!(latest_user_turn(&chat).unwrap().text, "real question");
    }

    #[test]
    fn no_user_turn_yields_none() {
        let chat = vec![ChatTurn::assistant("hello"), ChatTurn::system("notice")];
        assert!(latest_user_turn(&chat).is_none());
        assert!(latest_user_turn(&[]).is_none());
    }

    #[test]
    fn rfind_turn_is_generic() {
        let numbers = [1, 4, 6, 7];
        assert_eq!(rfind_turn(&numbers, |n| n % 2 == 0), Some(&6));
    }

    #[test]
    fn chat_turn_deserializes_with_defaults() {
        let turn: ChatTurn = serde_json::from_str(r#"{"is_user": true, "text": "hi"}"#).unwrap();
        assert!(turn.is_user);
        assert!(!turn.is_system);
        assert_eq!(turn.text, "hi");
    }

    #[test]
    fn chat_turn_accepts_host_export_fields() {
        let raw = r#"[
            {"name": "User", "is_user": true, "is_system": false, "send_date": "x", "mes": "What is rust?"},
            {"name": "Bot", "is_user": false, "is_system": false, "mes": "A language."}
        ]"#;
        let chat: Vec<ChatTurn> = serde_json::from_str(raw).unwrap();
        assert_eq!(chat.len(), 2);
        assert_eq!(latest_user_turn(&chat).unwrap().text, "What is rust?");
    }
}
