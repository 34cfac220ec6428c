//! Atelier Core - Shared types library.
//!
//! This crate provides the domain types used across all Atelier components:
//! - `client` - Session store, remote access client, state slices, access gate
//! - `cli` - Headless driver over the client core
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no persistence. Every type serializes to the JSON wire format the
//! storefront backend speaks (camelCase field names).
//!
//! # Modules
//!
//! - [`types`] - Identifiers, users and roles, products, cart lines, chat and wishlist types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
