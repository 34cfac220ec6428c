//! Style-assistant slice: chat and outfit suggestions.

use atelier_core::{ChatMessage, StylePreferences, StyleSuggestion};

use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::Backend;

const CHAT_FAILED: &str = "Failed to get AI response";
const SUGGESTIONS_FAILED: &str = "Failed to generate suggestions";
const EMPTY_MESSAGE: &str = "Message cannot be empty";

/// Assistant state. `chat` only grows, two messages at a time, until
/// cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assistant {
    pub suggestions: Vec<StyleSuggestion>,
    pub chat: Vec<ChatMessage>,
}

#[derive(Debug)]
pub struct AiSlice {
    slice: Slice<Assistant>,
}

impl Default for AiSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("ai", Assistant::default()),
        }
    }
}

impl AiSlice {
    /// Send `message` with the conversation so far. On success the user
    /// message and the reply are appended together; on failure neither is.
    /// Whitespace-only input is refused, anything else goes out as typed.
    pub async fn send_message(&self, backend: &impl Backend, message: &str) -> Lifecycle {
        if message.trim().is_empty() {
            return self.slice.reject_locally("send_message", EMPTY_MESSAGE);
        }

        let user_message = ChatMessage::user(message);
        let outbound: Vec<ChatMessage> = self.slice.read(|r| {
            r.data()
                .chat
                .iter()
                .cloned()
                .chain(std::iter::once(user_message.clone()))
                .collect()
        });

        self.slice
            .run("send_message", CHAT_FAILED, backend.chat(&outbound), |assistant, reply| {
                assistant
                    .chat
                    .extend([user_message, ChatMessage::assistant(reply)]);
            })
            .await
    }

    /// Replace the suggestions with a fresh set.
    pub async fn generate_suggestions(
        &self,
        backend: &impl Backend,
        preferences: StylePreferences,
    ) -> Lifecycle {
        self.slice
            .run(
                "generate_suggestions",
                SUGGESTIONS_FAILED,
                backend.style_suggestions(&preferences),
                |assistant, suggestions| assistant.suggestions = suggestions,
            )
            .await
    }

    pub fn clear_chat(&self) {
        self.slice.update(|assistant| assistant.chat.clear());
    }

    pub fn clear_suggestions(&self) {
        self.slice.update(|assistant| assistant.suggestions.clear());
    }

    pub fn reset(&self) {
        self.slice.reset();
    }

    #[must_use]
    pub fn chat(&self) -> Vec<ChatMessage> {
        self.slice.read(|r| r.data().chat.clone())
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<Assistant> {
        self.slice.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<AsyncResource<Assistant>> {
        self.slice.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use atelier_core::ChatRole;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[tokio::test]
    async fn test_successful_turn_appends_pair() {
        let backend = ScriptedBackend::new();
        backend.respond("chat", json!({ "message": "Try a linen co-ord." }));
        backend.respond("chat", json!({ "message": "Pair it with tan sandals." }));

        let ai = AiSlice::default();
        ai.send_message(&backend, "Summer wedding?").await;
        ai.send_message(&backend, "Shoes?").await;

        let chat = ai.chat();
        assert_eq!(chat.len(), 4);
        assert_eq!(chat.get(2), Some(&ChatMessage::user("Shoes?")));
        assert_eq!(chat.get(3).map(|m| m.role), Some(ChatRole::Assistant));

        let calls = backend.calls_to("chat");
        let second = calls.get(1).unwrap();
        assert_eq!(second["messages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_message_is_sent_and_kept_as_typed() {
        let backend = ScriptedBackend::new();
        backend.respond("chat", json!({ "message": "Layer a kurta over it." }));
        let typed = "  What about\n  a shawl?  ";

        let ai = AiSlice::default();
        assert_eq!(ai.send_message(&backend, typed).await, Lifecycle::Fulfilled);

        assert_eq!(ai.chat().first(), Some(&ChatMessage::user(typed)));
        let calls = backend.calls_to("chat");
        assert_eq!(calls.first().unwrap()["messages"][0]["content"], typed);
    }

    #[tokio::test]
    async fn test_failed_turn_appends_nothing() {
        let backend = ScriptedBackend::new();
        backend.fail("chat", 429, Some("Too many requests, slow down"));

        let ai = AiSlice::default();
        assert_eq!(ai.send_message(&backend, "Hello").await, Lifecycle::Rejected);
        assert!(ai.chat().is_empty());
        assert_eq!(ai.snapshot().error(), Some("Too many requests, slow down"));
    }

    #[tokio::test]
    async fn test_blank_message_rejected_locally() {
        let backend = ScriptedBackend::new();
        let ai = AiSlice::default();
        assert_eq!(ai.send_message(&backend, "   ").await, Lifecycle::Rejected);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_and_clearing() {
        let backend = ScriptedBackend::new();
        backend.respond(
            "style_suggestions",
            json!([{"id": "s1", "title": "Festive", "products": []}]),
        );
        backend.respond("chat", json!({ "message": "Hi!" }));

        let ai = AiSlice::default();
        ai.send_message(&backend, "Hi").await;
        let outcome = ai
            .generate_suggestions(
                &backend,
                StylePreferences {
                    occasion: "diwali".to_string(),
                    style: "traditional".to_string(),
                    budget: Decimal::new(200, 0),
                },
            )
            .await;
        assert_eq!(outcome, Lifecycle::Fulfilled);
        assert_eq!(ai.snapshot().data().suggestions.len(), 1);

        ai.clear_chat();
        assert!(ai.chat().is_empty());
        assert_eq!(ai.snapshot().data().suggestions.len(), 1);

        ai.clear_suggestions();
        assert!(ai.snapshot().data().suggestions.is_empty());
    }
}
