//! Cache types for catalog responses.

use atelier_core::{Product, ProductId, ProductPage, ProductQuery};

/// Cache key for product listings and details.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products(ProductQuery),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
}
