//! Style-assistant types: chat turns and outfit suggestions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductId, SuggestionId};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message in the style-assistant conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// A message written by the shopper.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// A reply from the assistant.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Inputs for an outfit suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreferences {
    pub occasion: String,
    pub style: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
}

/// Product preview nested in a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
}

/// A suggested outfit bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSuggestion {
    pub id: SuggestionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub products: Vec<SuggestedProduct>,
}

impl StyleSuggestion {
    /// Sum of the previewed product prices.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.products.iter().map(|p| p.price).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_format() {
        let msg = ChatMessage::user("Suggest a look");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({"role": "user", "content": "Suggest a look"})
        );
    }

    #[test]
    fn test_suggestion_total() {
        let json = r#"{
            "id": "s1",
            "title": "Festive evening",
            "description": "Layered silk",
            "imageUrl": "https://cdn.test/s1.jpg",
            "products": [
                {"id": "p1", "name": "Kurta", "price": 40.5, "imageUrl": ""},
                {"id": "p2", "name": "Dupatta", "price": 12}
            ]
        }"#;
        let suggestion: StyleSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(suggestion.total_price(), Decimal::new(525, 1));
    }
}
