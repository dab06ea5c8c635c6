//! Delegated dialogue driver
//!
//! The voice flow hands field collection entirely to an external
//! text-generation service: the full turn history goes out with a system
//! instruction naming the five fields and a completion sentinel, and the
//! sentinel's presence in the reply is the signal to resolve the booking.
//! A failed call substitutes a fixed apology and reports booking-not-ready;
//! nothing retries automatically.

use std::sync::Arc;

use busgo_core::{BookingInfo, SeatLayout, Turn};
use busgo_llm::{
    extraction::parse_booking_info,
    prompt::{booking_turn_messages, extraction_messages},
    LlmBackend, BOOKING_READY_SENTINEL,
};
use busgo_store::InventoryStore;

use crate::resolver::{resolve_booking, BookingOutcome};

/// Apology shown when the external call fails or returns garbage
const EXTRACTION_APOLOGY: &str = "Sorry, I had trouble understanding that. Could you try again?";

/// Result of one delegated turn
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Assistant reply with the sentinel stripped
    pub response: String,
    /// True when the sentinel appeared anywhere in the reply
    pub booking_ready: bool,
    /// History including this turn, to carry into the next call
    pub history: Vec<Turn>,
}

/// Dialogue driver that delegates extraction to a text-generation service
pub struct DelegatedDialogue {
    backend: Arc<dyn LlmBackend>,
    store: Arc<InventoryStore>,
    layout: SeatLayout,
}

impl DelegatedDialogue {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        store: Arc<InventoryStore>,
        layout: SeatLayout,
    ) -> Self {
        Self {
            backend,
            store,
            layout,
        }
    }

    /// Process one user utterance against the prior turn history
    pub async fn process_turn(&self, history: &[Turn], message: &str) -> TurnResult {
        let messages = booking_turn_messages(history, message);

        let mut updated: Vec<Turn> = history.to_vec();
        updated.push(Turn::user(message));

        match self.backend.generate(&messages).await {
            Ok(reply) => {
                let booking_ready = reply.contains(BOOKING_READY_SENTINEL);
                let response = reply.replace(BOOKING_READY_SENTINEL, "").trim().to_string();
                updated.push(Turn::assistant(&response));
                TurnResult {
                    response,
                    booking_ready,
                    history: updated,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Conversation call failed, substituting apology");
                updated.push(Turn::assistant(EXTRACTION_APOLOGY));
                TurnResult {
                    response: EXTRACTION_APOLOGY.to_string(),
                    booking_ready: false,
                    history: updated,
                }
            }
        }
    }

    /// Extract the booking fields from the transcript and resolve the
    /// booking. Extraction failure degrades to an all-empty extraction, so
    /// the resolver still runs and produces a user-facing outcome.
    pub async fn complete_booking(&self, history: &[Turn]) -> BookingOutcome {
        let info = match self.backend.generate(&extraction_messages(history)).await {
            Ok(reply) => parse_booking_info(&reply).unwrap_or_else(|| {
                tracing::warn!("Extraction reply had no parseable booking info");
                BookingInfo::default()
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Extraction call failed");
                BookingInfo::default()
            }
        };

        resolve_booking(&self.store, &self.layout, &info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use busgo_llm::{LlmError, Message};
    use parking_lot::Mutex;

    /// Scripted backend: pops canned replies in order
    struct MockBackend {
        replies: Mutex<Vec<Result<String, LlmError>>>,
    }

    impl MockBackend {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
            })
        }
    }

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn generate(&self, _messages: &[Message]) -> Result<String, LlmError> {
            self.replies
                .lock()
                .pop()
                .unwrap_or(Err(LlmError::Api("exhausted".to_string())))
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    fn dialogue(backend: Arc<MockBackend>) -> DelegatedDialogue {
        DelegatedDialogue::new(
            backend,
            Arc::new(InventoryStore::in_memory()),
            SeatLayout::default(),
        )
    }

    #[tokio::test]
    async fn test_sentinel_is_detected_and_stripped() {
        let backend = MockBackend::new(vec![Ok(
            "Great, I have everything I need! BOOKING_READY".to_string()
        )]);
        let dialogue = dialogue(backend);

        let result = dialogue.process_turn(&[], "window seat please").await;
        assert!(result.booking_ready);
        assert!(!result.response.contains("BOOKING_READY"));
        assert_eq!(result.response, "Great, I have everything I need!");
        // User turn plus assistant turn appended
        assert_eq!(result.history.len(), 2);
    }

    #[tokio::test]
    async fn test_ordinary_reply_is_not_ready() {
        let backend = MockBackend::new(vec![Ok("What date would you like?".to_string())]);
        let dialogue = dialogue(backend);

        let result = dialogue.process_turn(&[], "I want to go to Boston").await;
        assert!(!result.booking_ready);
        assert_eq!(result.response, "What date would you like?");
    }

    #[tokio::test]
    async fn test_failed_call_substitutes_apology() {
        let backend = MockBackend::new(vec![Err(LlmError::Network("connection refused".into()))]);
        let dialogue = dialogue(backend);

        let result = dialogue.process_turn(&[], "hello").await;
        assert!(!result.booking_ready);
        assert_eq!(result.response, EXTRACTION_APOLOGY);
        assert_eq!(result.history.len(), 2);
    }

    #[tokio::test]
    async fn test_complete_booking_resolves_extraction() {
        let backend = MockBackend::new(vec![Ok(r#"```json
{"name": "Jane Doe", "phone": "5551234567", "destination": "Boston",
 "travel_date": "2024-05-01", "seat_preference": "window"}
```"#
            .to_string())]);
        let store = Arc::new(InventoryStore::in_memory());
        let dialogue =
            DelegatedDialogue::new(backend, store.clone(), SeatLayout::default());

        let outcome = dialogue.complete_booking(&[Turn::user("book it")]).await;
        assert!(outcome.is_confirmed());
        assert_eq!(store.reservation_count(), 1);
        let text = outcome.to_string();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Boston"));
    }

    #[tokio::test]
    async fn test_complete_booking_degrades_on_extraction_failure() {
        // Unparseable reply -> all-None info -> empty destination matches
        // the first route, booked under "Unknown"
        let backend = MockBackend::new(vec![Ok("no json here, sorry".to_string())]);
        let store = Arc::new(InventoryStore::in_memory());
        let dialogue =
            DelegatedDialogue::new(backend, store.clone(), SeatLayout::default());

        let outcome = dialogue.complete_booking(&[]).await;
        assert!(outcome.is_confirmed());
        let BookingOutcome::Confirmed(c) = outcome else {
            unreachable!()
        };
        assert_eq!(c.passenger, "Unknown");
    }
}
