//! Request and response bodies that only exist on the wire.

use atelier_core::{CartItem, ChatMessage, Email, Order, User, UserRole, WishlistItem};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Account registration form.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub role: UserRole,
}

/// Google sign-in with an OAuth access token. `role` applies when the
/// account is created by this call.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleLoginRequest {
    #[serde(serialize_with = "expose")]
    pub token: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// What the auth endpoints return.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub user: User,
    #[serde(deserialize_with = "secret")]
    pub token: SecretString,
}

fn secret<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

/// An avatar image to upload.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuantityBody {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AvatarResponse {
    pub avatar_url: String,
}

/// `GET cart` answers either with the lines or with `{ items: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartResponse {
    Items(Vec<CartItem>),
    Wrapped { items: Vec<CartItem> },
}

impl From<CartResponse> for Vec<CartItem> {
    fn from(response: CartResponse) -> Self {
        match response {
            CartResponse::Items(items) | CartResponse::Wrapped { items } => items,
        }
    }
}

/// `GET wishlist` has the same two shapes as `GET cart`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WishlistResponse {
    Items(Vec<WishlistItem>),
    Wrapped { items: Vec<WishlistItem> },
}

impl From<WishlistResponse> for Vec<WishlistItem> {
    fn from(response: WishlistResponse) -> Self {
        match response {
            WishlistResponse::Items(items) | WishlistResponse::Wrapped { items } => items,
        }
    }
}

/// `GET orders` answers with the orders or with `{ orders: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OrdersResponse {
    Orders(Vec<Order>),
    Wrapped { orders: Vec<Order> },
}

impl From<OrdersResponse> for Vec<Order> {
    fn from(response: OrdersResponse) -> Self {
        match response {
            OrdersResponse::Orders(orders) | OrdersResponse::Wrapped { orders } => orders,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_response_shapes() {
        let line = r#"{"id":"l1","productId":"p1","quantity":2,"size":"M","color":"red","storeId":"s1","unitPrice":10}"#;

        let bare: CartResponse = serde_json::from_str(&format!("[{line}]")).unwrap();
        assert_eq!(Vec::<CartItem>::from(bare).len(), 1);

        let wrapped: CartResponse = serde_json::from_str(&format!(r#"{{"items":[{line}]}}"#)).unwrap();
        assert_eq!(Vec::<CartItem>::from(wrapped).len(), 1);
    }

    #[test]
    fn test_register_request_exposes_password_on_wire_only() {
        let request = RegisterRequest {
            name: "Nia".to_string(),
            email: Email::parse("nia@atelier.test").unwrap(),
            password: SecretString::from("hunter22"),
            role: UserRole::Consumer,
        };
        assert!(!format!("{request:?}").contains("hunter22"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "hunter22");
        assert_eq!(json["role"], "consumer");
    }

    #[test]
    fn test_google_request_omits_role() {
        let request = GoogleLoginRequest {
            token: SecretString::from("ya29"),
            role: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"token": "ya29"})
        );
    }
}
