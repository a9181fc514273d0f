//! Session handling: persistence, the shared read-only context, and the
//! manager that is allowed to change them.

pub mod auth;
pub mod context;
pub mod store;

pub use auth::{AuthFailure, AuthManager, Registration};
pub use context::{Session, SessionContext};
pub use store::{FileStore, KeyValueStore, MemoryStore, SessionStore, StoreError};
