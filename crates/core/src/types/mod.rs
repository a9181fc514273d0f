//! Core types for ElectroMart.
//!
//! This module provides the domain snapshots the API returns plus
//! type-safe wrappers for IDs, prices, emails, and statuses.

pub mod catalog;
pub mod email;
pub mod id;
pub mod loyalty;
pub mod order;
pub mod price;
pub mod status;
pub mod timestamp;
pub mod user;

pub use catalog::{Category, Product, Review};
pub use email::{Email, EmailError};
pub use id::*;
pub use loyalty::{LoyaltyStatus, LoyaltyTier, TierBenefits};
pub use order::{Order, OrderItem};
pub use price::{Price, RUPEES_PER_POINT};
pub use status::*;
pub use timestamp::Timestamp;
pub use user::UserProfile;
