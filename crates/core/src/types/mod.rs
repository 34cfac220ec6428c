//! Core types for Atelier.
//!
//! This module provides type-safe wrappers and records for the storefront
//! domain. Field names follow the backend's camelCase JSON.

pub mod ai;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod product;
pub mod role;
pub mod user;
pub mod wishlist;

pub use ai::{ChatMessage, ChatRole, StylePreferences, StyleSuggestion, SuggestedProduct};
pub use cart::{CartItem, CartLineKey, NewCartItem};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{
    NewOrder, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress,
};
pub use product::{Product, ProductPage, ProductPrice, ProductQuery, ProductSort};
pub use role::UserRole;
pub use user::{AvatarCustomization, MeasurementError, Measurements, User};
pub use wishlist::WishlistItem;
