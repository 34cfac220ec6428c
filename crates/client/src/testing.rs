//! Test doubles for code built on this crate.
//!
//! Enabled for this crate's own tests and, for downstream crates, through
//! the `testing` feature.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use atelier_core::{
    AvatarCustomization, CartItem, CartLineId, ChatMessage, Email, Measurements, NewCartItem,
    NewOrder, Order, OrderId, PaymentMethod, Product, ProductId, ProductPage, ProductQuery,
    ShippingAddress, StoreId, StylePreferences, StyleSuggestion, User, UserId, UserRole,
    WishlistItem,
};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::interceptor;
use crate::api::{
    AvatarResponse, AvatarUpload, Backend, CartResponse, ChatResponse, Credentials,
    GoogleLoginRequest, OrdersResponse, RegisterRequest, WishlistResponse,
};
use crate::error::ClientError;
use crate::gate::Navigator;
use crate::session::SessionStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// RecordingNavigator
// =============================================================================

/// Remembers every navigation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Paths navigated to, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        lock(&self.visited).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        lock(&self.visited).push(path.to_string());
    }
}

// =============================================================================
// ScriptedBackend
// =============================================================================

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status { status: u16, message: Option<String> },
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// [`Backend`] method name, e.g. `add_cart_item`.
    pub op: &'static str,
    /// The request payload as JSON (`null` for body-less calls).
    pub body: Value,
}

/// A [`Backend`] that answers from a script.
///
/// Scripted bodies use the same wire shapes as the HTTP API and are decoded
/// through the same response types: `{ "message" }` for `chat`,
/// `{ "avatarUrl" }` for `upload_avatar`, and either a bare array or
/// `{ "items": [...] }` for `fetch_cart` and `fetch_wishlist`, and either a
/// bare array or `{ "orders": [...] }` for `list_orders`.
///
/// Replies are queued per operation. The last reply for an operation is
/// reused once the queue is down to it. Operations with no script fail with
/// status 501. Failure statuses pass through the real 401 interceptor, so a
/// scripted 401 clears the attached session and navigates exactly as
/// [`crate::ApiClient`] would.
pub struct ScriptedBackend {
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedBackend")
            .field("calls", &lock(&self.calls).len())
            .finish_non_exhaustive()
    }
}

impl ScriptedBackend {
    /// A backend with its own throwaway session and navigator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(SessionStore::in_memory(), Arc::new(RecordingNavigator::default()))
    }

    /// A backend whose 401s act on `session` and `navigator`.
    #[must_use]
    pub fn with_session(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            session,
            navigator,
        }
    }

    /// Queue a successful JSON reply for `op`.
    pub fn respond(&self, op: &'static str, body: Value) {
        lock(&self.replies)
            .entry(op)
            .or_default()
            .push_back(Reply::Json(body));
    }

    /// Queue a failure status for `op`, with an optional `{ message }` body.
    pub fn fail(&self, op: &'static str, status: u16, message: Option<&str>) {
        lock(&self.replies)
            .entry(op)
            .or_default()
            .push_back(Reply::Status {
                status,
                message: message.map(String::from),
            });
    }

    /// Every call made, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Payloads sent to `op`, oldest first.
    #[must_use]
    pub fn calls_to(&self, op: &str) -> Vec<Value> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.body.clone())
            .collect()
    }

    fn next_reply(&self, op: &'static str) -> Option<Reply> {
        let mut replies = lock(&self.replies);
        let queue = replies.get_mut(op)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    async fn dispatch<R: DeserializeOwned>(
        &self,
        op: &'static str,
        body: Value,
    ) -> Result<R, ClientError> {
        lock(&self.calls).push(Call { op, body });
        tokio::task::yield_now().await;

        match self.next_reply(op) {
            Some(Reply::Json(value)) => {
                serde_json::from_value(value).map_err(|e| ClientError::Parse(e.to_string()))
            }
            Some(Reply::Status { status, message }) => {
                let code = StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                interceptor::intercept(code, &self.session, self.navigator.as_ref())?;
                Err(ClientError::Api { status, message })
            }
            None => Err(ClientError::Api {
                status: 501,
                message: Some(format!("no scripted reply for {op}")),
            }),
        }
    }
}

fn to_json(value: &impl serde::Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Backend for ScriptedBackend {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ClientError> {
        let pairs: serde_json::Map<String, Value> = query
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v)))
            .collect();
        self.dispatch("list_products", Value::Object(pairs)).await
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, ClientError> {
        self.dispatch("get_product", json!({ "id": id })).await
    }

    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let response: CartResponse = self.dispatch("fetch_cart", Value::Null).await?;
        Ok(response.into())
    }

    async fn add_cart_item(&self, item: &NewCartItem) -> Result<CartItem, ClientError> {
        self.dispatch("add_cart_item", to_json(item)).await
    }

    async fn update_cart_item(&self, id: &CartLineId, quantity: u32) -> Result<CartItem, ClientError> {
        self.dispatch("update_cart_item", json!({ "id": id, "quantity": quantity }))
            .await
    }

    async fn remove_cart_item(&self, id: &CartLineId) -> Result<(), ClientError> {
        self.dispatch("remove_cart_item", json!({ "id": id })).await
    }

    async fn clear_cart(&self) -> Result<(), ClientError> {
        self.dispatch("clear_cart", Value::Null).await
    }

    async fn submit_measurements(&self, measurements: &Measurements) -> Result<Measurements, ClientError> {
        self.dispatch("submit_measurements", to_json(measurements)).await
    }

    async fn upload_avatar(&self, upload: AvatarUpload) -> Result<String, ClientError> {
        let body = json!({
            "fileName": upload.file_name,
            "contentType": upload.content_type,
            "size": upload.bytes.len(),
        });
        let response: AvatarResponse = self.dispatch("upload_avatar", body).await?;
        Ok(response.avatar_url)
    }

    async fn save_avatar_customization(
        &self,
        customization: &AvatarCustomization,
    ) -> Result<AvatarCustomization, ClientError> {
        self.dispatch("save_avatar_customization", to_json(customization))
            .await
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let response: ChatResponse = self.dispatch("chat", json!({ "messages": messages })).await?;
        Ok(response.message)
    }

    async fn style_suggestions(
        &self,
        preferences: &StylePreferences,
    ) -> Result<Vec<StyleSuggestion>, ClientError> {
        self.dispatch("style_suggestions", to_json(preferences)).await
    }

    async fn fetch_wishlist(&self) -> Result<Vec<WishlistItem>, ClientError> {
        let response: WishlistResponse = self.dispatch("fetch_wishlist", Value::Null).await?;
        Ok(response.into())
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
        self.dispatch("create_order", to_json(order)).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        let response: OrdersResponse = self.dispatch("list_orders", Value::Null).await?;
        Ok(response.into())
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, ClientError> {
        self.dispatch("get_order", json!({ "id": id })).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Credentials, ClientError> {
        self.dispatch("register", to_json(request)).await
    }

    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<Credentials, ClientError> {
        self.dispatch("google_login", to_json(request)).await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.dispatch("logout", Value::Null).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A consumer with an incomplete profile.
#[must_use]
pub fn sample_user() -> User {
    user_with_role(UserRole::Consumer, false)
}

/// A user with the given role and profile state.
#[must_use]
pub fn user_with_role(role: UserRole, profile_complete: bool) -> User {
    User {
        id: UserId::new(format!("{role}-1")),
        email: Email::parse(&format!("{role}@atelier.test"))
            .unwrap_or_else(|_| unreachable!("fixture email is valid")),
        name: format!("Test {role}"),
        role,
        profile_complete,
        measurements: None,
        avatar: None,
    }
}

/// Wire JSON for a cart line priced at 10.
#[must_use]
pub fn cart_line(id: &str, product_id: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "productId": product_id,
        "name": format!("Product {product_id}"),
        "quantity": quantity,
        "size": "M",
        "color": "black",
        "storeId": "store-1",
        "unitPrice": 10,
    })
}

/// An add-to-cart request matching [`cart_line`]'s size and colour.
#[must_use]
pub fn new_cart_item(product_id: &str, quantity: u32) -> NewCartItem {
    NewCartItem {
        product_id: ProductId::new(product_id),
        quantity,
        size: "M".to_string(),
        color: "black".to_string(),
        store_id: StoreId::new("store-1"),
        unit_price: Decimal::TEN,
    }
}

/// Wire JSON for a pending cash-on-delivery order of one line.
#[must_use]
pub fn order_json(id: &str, product_id: &str, quantity: u32) -> Value {
    json!({
        "_id": id,
        "items": [{
            "productId": product_id,
            "quantity": quantity,
            "price": 10,
            "size": "M",
            "color": "black",
        }],
        "totalAmount": 10 * quantity,
        "status": "pending",
        "shippingAddress": {
            "street": "Durbar Marg 1",
            "city": "Kathmandu",
            "state": "Bagmati",
            "zipCode": "44600",
        },
        "paymentMethod": "cod",
        "paymentStatus": "pending",
    })
}

/// A cash-on-delivery checkout to the address in [`order_json`].
#[must_use]
pub fn new_order() -> NewOrder {
    NewOrder {
        shipping_address: ShippingAddress {
            street: "Durbar Marg 1".to_string(),
            city: "Kathmandu".to_string(),
            state: "Bagmati".to_string(),
            zip_code: "44600".to_string(),
            phone: None,
        },
        payment_method: PaymentMethod::Cod,
    }
}

/// Wire JSON for an auth response.
#[must_use]
pub fn credentials_json(user: &User, token: &str) -> Value {
    json!({ "user": user, "token": token })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_decode_like_the_http_api() {
        let backend = ScriptedBackend::new();
        backend.respond("fetch_cart", json!({ "items": [cart_line("l1", "p1", 1)] }));
        backend.respond("fetch_wishlist", json!([{ "productId": "p1" }]));
        backend.respond("chat", json!({ "message": "Try olive." }));
        backend.respond("upload_avatar", json!({ "avatarUrl": "https://cdn.test/a.png" }));

        assert_eq!(backend.fetch_cart().await.unwrap().len(), 1);
        assert_eq!(backend.fetch_wishlist().await.unwrap().len(), 1);
        assert_eq!(backend.chat(&[]).await.unwrap(), "Try olive.");
        let upload = AvatarUpload {
            file_name: "a.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0; 4],
        };
        assert_eq!(backend.upload_avatar(upload).await.unwrap(), "https://cdn.test/a.png");
    }

    #[tokio::test]
    async fn test_reply_in_wrong_shape_is_a_parse_error() {
        let backend = ScriptedBackend::new();
        backend.respond("chat", json!("bare string"));

        let err = backend.chat(&[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
