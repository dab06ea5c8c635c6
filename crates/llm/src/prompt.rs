//! Prompt building for the booking assistant

use std::fmt;

use serde::{Deserialize, Serialize};

use busgo_core::{conversation::render_transcript, Turn};

/// Marker the assistant emits once every booking field has been gathered
pub const BOOKING_READY_SENTINEL: &str = "BOOKING_READY";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// System instruction for the conversational booking flow
pub fn booking_system_prompt() -> String {
    format!(
        "You are a helpful bus ticket reservation assistant. Your goal is to help \
         customers book bus tickets.\n\
         You need to collect:\n\
         1. Customer's name\n\
         2. Phone number\n\
         3. Destination\n\
         4. Travel date\n\
         5. Seat preference (window/aisle/any number)\n\
         Be friendly and conversational. Say '{BOOKING_READY_SENTINEL}' when all \
         info is collected."
    )
}

/// Build the message list for one conversational turn: system instruction,
/// prior turns, then the latest utterance
pub fn booking_turn_messages(history: &[Turn], latest: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(booking_system_prompt()));
    for turn in history {
        messages.push(Message {
            role: match turn.role {
                busgo_core::TurnRole::User => Role::User,
                busgo_core::TurnRole::Assistant => Role::Assistant,
                busgo_core::TurnRole::System => Role::System,
            },
            content: turn.content.clone(),
        });
    }
    messages.push(Message::user(latest));
    messages
}

/// Build the one-shot extraction prompt over a full transcript
pub fn extraction_messages(history: &[Turn]) -> Vec<Message> {
    let transcript = render_transcript(history);
    let prompt = format!(
        "You are an expert information extractor. Given the following conversation \
         between a user and an assistant, extract the booking details into a JSON \
         object with these fields:\n\
         - name (customer's full name)\n\
         - phone (phone number)\n\
         - destination (travel destination)\n\
         - travel_date (date of travel)\n\
         - seat_preference (window, aisle, or specific number)\n\n\
         Return only the JSON object. If any field is missing or unclear, use null \
         for that field. Do not include any extra text outside the JSON.\n\n\
         Conversation:\n{transcript}"
    );
    vec![Message::user(prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_all_fields_and_sentinel() {
        let prompt = booking_system_prompt();
        for field in ["name", "Phone number", "Destination", "Travel date", "Seat preference"] {
            assert!(prompt.contains(field), "missing {field}");
        }
        assert!(prompt.contains(BOOKING_READY_SENTINEL));
    }

    #[test]
    fn test_turn_messages_order() {
        let history = vec![Turn::user("hi"), Turn::assistant("Hello! Your name?")];
        let messages = booking_turn_messages(&history, "Jane");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "Jane");
    }

    #[test]
    fn test_extraction_prompt_embeds_transcript() {
        let history = vec![Turn::user("I want to go to Boston")];
        let messages = extraction_messages(&history);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("user: I want to go to Boston"));
        assert!(messages[0].content.contains("seat_preference"));
    }
}
