//! ElectroMart Core - Shared types library.
//!
//! This crate provides the domain types used across ElectroMart components:
//! - `storefront` - Local storefront UI and API client
//! - `cli` - Command-line session and account tools
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Every
//! entity here is an immutable snapshot of what the remote API returned.
//!
//! # Modules
//!
//! - [`types`] - Catalog, order, loyalty and profile snapshots, plus
//!   newtypes for IDs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
