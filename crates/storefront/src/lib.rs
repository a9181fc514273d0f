//! ElectroMart Storefront library.
//!
//! Server-rendered storefront over the ElectroMart API: catalog browsing,
//! login and registration, and the loyalty program. The library holds
//! everything the binary and the CLI share, so both can be tested and reused.
//!
//! - [`api`]: typed client for the remote API
//! - [`session`]: persisted session, shared context, auth manager
//! - [`pages`]: per-page load tasks
//! - [`views`] and [`routes`]: templates and handlers
//! - [`middleware`]: request IDs, span context, security headers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;
