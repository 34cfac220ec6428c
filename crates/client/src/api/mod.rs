//! Remote access client for the storefront backend.
//!
//! [`Backend`] is the contract the slices depend on. [`ApiClient`] is its
//! HTTP implementation: one configured `reqwest` client that attaches the
//! session's bearer token, routes every response through
//! [`interceptor::intercept`], and normalizes failures into [`ClientError`].
//! Product listings and details are cached with `moka`.

mod cache;
pub mod interceptor;
mod types;

pub use types::{AvatarUpload, Credentials, GoogleLoginRequest, RegisterRequest};

use std::future::Future;
use std::sync::Arc;

use atelier_core::{
    AvatarCustomization, CartItem, CartLineId, ChatMessage, Measurements, NewCartItem, NewOrder,
    Order, OrderId, Product, ProductId, ProductPage, ProductQuery, StylePreferences,
    StyleSuggestion, WishlistItem,
};
use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, server_message};
use crate::gate::Navigator;
use crate::session::SessionStore;
use cache::{CacheKey, CacheValue};
pub(crate) use types::{
    AvatarResponse, CartResponse, ChatResponse, OrdersResponse, WishlistResponse,
};
use types::{ChatRequest, QuantityBody};

/// Operations the storefront backend offers.
///
/// Every failure arrives as a [`ClientError`]. A 401 has already cleared the
/// session and redirected to login by the time the caller sees
/// [`ClientError::Unauthorized`].
pub trait Backend: Send + Sync {
    /// One page of the product listing.
    fn list_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<ProductPage, ClientError>> + Send;

    /// A single product.
    fn get_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, ClientError>> + Send;

    /// The shopper's cart lines.
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, ClientError>> + Send;

    /// Add a line. The backend merges it with an existing line of the same
    /// product, size and colour and returns the resulting line.
    fn add_cart_item(
        &self,
        item: &NewCartItem,
    ) -> impl Future<Output = Result<CartItem, ClientError>> + Send;

    /// Set a line's quantity.
    fn update_cart_item(
        &self,
        id: &CartLineId,
        quantity: u32,
    ) -> impl Future<Output = Result<CartItem, ClientError>> + Send;

    /// Remove a line.
    fn remove_cart_item(
        &self,
        id: &CartLineId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Empty the cart.
    fn clear_cart(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Record body measurements; returns what was stored.
    fn submit_measurements(
        &self,
        measurements: &Measurements,
    ) -> impl Future<Output = Result<Measurements, ClientError>> + Send;

    /// Upload an avatar image; returns its URL.
    fn upload_avatar(
        &self,
        upload: AvatarUpload,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Save avatar appearance settings; returns what was stored.
    fn save_avatar_customization(
        &self,
        customization: &AvatarCustomization,
    ) -> impl Future<Output = Result<AvatarCustomization, ClientError>> + Send;

    /// Send the conversation so far; returns the assistant's reply.
    fn chat(
        &self,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, ClientError>> + Send;

    /// Outfit suggestions for the given preferences.
    fn style_suggestions(
        &self,
        preferences: &StylePreferences,
    ) -> impl Future<Output = Result<Vec<StyleSuggestion>, ClientError>> + Send;

    /// The shopper's saved products.
    fn fetch_wishlist(
        &self,
    ) -> impl Future<Output = Result<Vec<WishlistItem>, ClientError>> + Send;

    /// Place an order for the current cart.
    fn create_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ClientError>> + Send;

    /// The shopper's orders.
    fn list_orders(&self) -> impl Future<Output = Result<Vec<Order>, ClientError>> + Send;

    /// A single order.
    fn get_order(&self, id: &OrderId) -> impl Future<Output = Result<Order, ClientError>> + Send;

    /// Create an account and sign in.
    fn register(
        &self,
        request: &RegisterRequest,
    ) -> impl Future<Output = Result<Credentials, ClientError>> + Send;

    /// Sign in (or sign up) with a Google access token.
    fn google_login(
        &self,
        request: &GoogleLoginRequest,
    ) -> impl Future<Output = Result<Credentials, ClientError>> + Send;

    /// End the server-side session.
    fn logout(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

// =============================================================================
// ApiClient
// =============================================================================

/// HTTP client for the storefront backend.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.clone(),
                session,
                navigator,
                cache,
            }),
        })
    }

    /// The session whose token this client sends.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Drop every cached product listing and detail.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Resolve an endpoint below the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match self.inner.session.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request. Every response passes through the interceptor here,
    /// once.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();

        interceptor::intercept(status, &self.inner.session, self.inner.navigator.as_ref())?;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = self.send(builder).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ClientError::Parse(e.to_string())
        })
    }

    async fn empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.send(builder).await.map(drop)
    }
}

impl Backend for ApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ClientError> {
        let cacheable = query.search_term().is_none();
        let cache_key = CacheKey::Products(query.clone());

        if cacheable
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut url = self.endpoint(&["products"])?;
        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in &pairs {
                serializer.append_pair(key, value);
            }
        }

        let page: ProductPage = self.json(self.request(Method::GET, url)).await?;

        if cacheable {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, ClientError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let product: Product = self.json(self.request(Method::GET, url)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, ClientError> {
        let url = self.endpoint(&["cart"])?;
        let response: CartResponse = self.json(self.request(Method::GET, url)).await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(product_id = %item.product_id))]
    async fn add_cart_item(&self, item: &NewCartItem) -> Result<CartItem, ClientError> {
        let url = self.endpoint(&["cart"])?;
        self.json(self.request(Method::POST, url).json(item)).await
    }

    #[instrument(skip(self), fields(line_id = %id))]
    async fn update_cart_item(&self, id: &CartLineId, quantity: u32) -> Result<CartItem, ClientError> {
        let url = self.endpoint(&["cart", id.as_str()])?;
        self.json(self.request(Method::PUT, url).json(&QuantityBody { quantity }))
            .await
    }

    #[instrument(skip(self), fields(line_id = %id))]
    async fn remove_cart_item(&self, id: &CartLineId) -> Result<(), ClientError> {
        let url = self.endpoint(&["cart", id.as_str()])?;
        self.empty(self.request(Method::DELETE, url)).await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ClientError> {
        let url = self.endpoint(&["cart"])?;
        self.empty(self.request(Method::DELETE, url)).await
    }

    #[instrument(skip_all)]
    async fn submit_measurements(&self, measurements: &Measurements) -> Result<Measurements, ClientError> {
        let url = self.endpoint(&["profile", "measurements"])?;
        self.json(self.request(Method::POST, url).json(measurements))
            .await
    }

    #[instrument(skip_all, fields(file_name = %upload.file_name, bytes = upload.bytes.len()))]
    async fn upload_avatar(&self, upload: AvatarUpload) -> Result<String, ClientError> {
        let url = self.endpoint(&["profile", "avatar"])?;
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = reqwest::multipart::Form::new().part("avatar", part);

        let response: AvatarResponse = self
            .json(self.request(Method::POST, url).multipart(form))
            .await?;
        Ok(response.avatar_url)
    }

    #[instrument(skip_all)]
    async fn save_avatar_customization(
        &self,
        customization: &AvatarCustomization,
    ) -> Result<AvatarCustomization, ClientError> {
        let url = self.endpoint(&["profile", "avatar", "customization"])?;
        self.json(self.request(Method::POST, url).json(customization))
            .await
    }

    #[instrument(skip_all, fields(turns = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ClientError> {
        let url = self.endpoint(&["ai", "chat"])?;
        let response: ChatResponse = self
            .json(self.request(Method::POST, url).json(&ChatRequest { messages }))
            .await?;
        Ok(response.message)
    }

    #[instrument(skip(self))]
    async fn style_suggestions(
        &self,
        preferences: &StylePreferences,
    ) -> Result<Vec<StyleSuggestion>, ClientError> {
        let url = self.endpoint(&["ai", "style-suggestions"])?;
        self.json(self.request(Method::POST, url).json(preferences))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistItem>, ClientError> {
        let url = self.endpoint(&["wishlist"])?;
        let response: WishlistResponse = self.json(self.request(Method::GET, url)).await?;
        Ok(response.into())
    }

    #[instrument(skip_all, fields(payment_method = %order.payment_method))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
        let url = self.endpoint(&["orders"])?;
        self.json(self.request(Method::POST, url).json(order)).await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        let url = self.endpoint(&["orders"])?;
        let response: OrdersResponse = self.json(self.request(Method::GET, url)).await?;
        Ok(response.into())
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> Result<Order, ClientError> {
        let url = self.endpoint(&["orders", id.as_str()])?;
        self.json(self.request(Method::GET, url)).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn register(&self, request: &RegisterRequest) -> Result<Credentials, ClientError> {
        let url = self.endpoint(&["auth", "register"])?;
        self.json(self.request(Method::POST, url).json(request))
            .await
    }

    #[instrument(skip_all)]
    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<Credentials, ClientError> {
        let url = self.endpoint(&["auth", "google"])?;
        self.json(self.request(Method::POST, url).json(request))
            .await
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ClientError> {
        let url = self.endpoint(&["auth", "logout"])?;
        self.empty(self.request(Method::POST, url)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gate::LoggingNavigator;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::new(Url::parse(base).unwrap());
        ApiClient::new(&config, SessionStore::in_memory(), Arc::new(LoggingNavigator)).unwrap()
    }

    #[test]
    fn test_endpoint_extends_base_path() {
        let api = client("http://localhost:3000/api");
        assert_eq!(
            api.endpoint(&["cart", "l1"]).unwrap().as_str(),
            "http://localhost:3000/api/cart/l1"
        );
        assert_eq!(
            api.endpoint(&["profile", "avatar", "customization"]).unwrap().as_str(),
            "http://localhost:3000/api/profile/avatar/customization"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("https://shop.test/");
        assert_eq!(
            api.endpoint(&["products", "a/b c"]).unwrap().as_str(),
            "https://shop.test/products/a%2Fb%20c"
        );
    }

    // Port 9 on loopback refuses connections, so anything not served from
    // the cache fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9/api";

    fn kurta() -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "p-1",
            "name": "Linen kurta",
            "price": { "regular": 40 },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cached_product_served_until_invalidated() {
        let api = client(UNREACHABLE);
        api.inner
            .cache
            .insert(CacheKey::Product(kurta().id), CacheValue::Product(Box::new(kurta())))
            .await;

        assert_eq!(api.get_product(&ProductId::new("p-1")).await.unwrap(), kurta());

        api.invalidate_catalog();
        api.inner.cache.run_pending_tasks().await;
        assert!(api.get_product(&ProductId::new("p-1")).await.is_err());
    }

    #[tokio::test]
    async fn test_search_listing_bypasses_cache() {
        let api = client(UNREACHABLE);
        let page = ProductPage {
            products: vec![kurta()],
            total: 1,
            page: 1,
            total_pages: 1,
        };
        let browse = ProductQuery::default();
        let search = ProductQuery {
            search: Some("linen".to_string()),
            ..ProductQuery::default()
        };
        for query in [&browse, &search] {
            api.inner
                .cache
                .insert(CacheKey::Products(query.clone()), CacheValue::Products(page.clone()))
                .await;
        }

        assert_eq!(api.list_products(&browse).await.unwrap(), page);
        assert!(api.list_products(&search).await.is_err());
    }
}
