//! Catalog types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductId, StoreId};

/// Product pricing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPrice {
    /// List price.
    #[serde(with = "rust_decimal::serde::float")]
    pub regular: Decimal,
    /// Discounted price, when on sale.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sale: Option<Decimal>,
    /// B2B price for store accounts.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub wholesale: Option<Decimal>,
}

impl ProductPrice {
    /// The price a shopper pays: the sale price when it undercuts the list
    /// price, otherwise the list price.
    #[must_use]
    pub fn effective(&self) -> Decimal {
        match self.sale {
            Some(sale) if sale > Decimal::ZERO && sale < self.regular => sale,
            _ => self.regular,
        }
    }

    /// Whether a sale price is in effect.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.effective() != self.regular
    }
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID (the backend sends `_id`).
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category slug, e.g. `womens_clothing`, `traditional`.
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    pub price: ProductPrice,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock_quantity: u32,
    /// Store selling the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
}

impl Product {
    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// First image, used as the thumbnail.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Sort orders supported by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    Newest,
    PriceLow,
    PriceHigh,
}

impl ProductSort {
    /// Query-string value for this sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price_low",
            Self::PriceHigh => "price_high",
        }
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price_low" => Ok(Self::PriceLow),
            "price_high" => Ok(Self::PriceHigh),
            _ => Err(format!("invalid sort: {s}")),
        }
    }
}

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub sort: Option<ProductSort>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query-string pairs for the set filters, in a stable order.
    ///
    /// Blank search terms are dropped.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(search) = self.search_term() {
            pairs.push(("search", search.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// The trimmed search term, if one is set and non-blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl ProductPage {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_underscore_id() {
        let json = r#"{
            "_id": "p1",
            "name": "Linen Kurta",
            "price": { "regular": 49.5, "sale": 39.5 },
            "sizes": ["S", "M"],
            "colors": ["white"],
            "images": ["https://cdn.test/p1.jpg"],
            "stockQuantity": 3
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price.effective(), Decimal::new(395, 1));
        assert!(product.price.is_on_sale());
        assert!(product.in_stock());
        assert_eq!(product.thumbnail(), Some("https://cdn.test/p1.jpg"));
    }

    #[test]
    fn test_sale_above_regular_is_ignored() {
        let price = ProductPrice {
            regular: Decimal::new(20, 0),
            sale: Some(Decimal::new(25, 0)),
            wholesale: None,
        };
        assert_eq!(price.effective(), Decimal::new(20, 0));
        assert!(!price.is_on_sale());
    }

    #[test]
    fn test_query_pairs() {
        let query = ProductQuery {
            sort: Some(ProductSort::PriceLow),
            search: Some("  saree ".to_string()),
            page: Some(2),
            limit: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("sort", "price_low".to_string()),
                ("search", "saree".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_search_dropped() {
        let query = ProductQuery {
            search: Some("   ".to_string()),
            ..ProductQuery::default()
        };
        assert!(query.search_term().is_none());
        assert!(query.to_pairs().is_empty());
    }

    #[test]
    fn test_page_has_next() {
        let page: ProductPage =
            serde_json::from_str(r#"{"products":[],"total":40,"page":1,"totalPages":2}"#).unwrap();
        assert!(page.has_next());
    }
}
