//! HTTP boundary for the Pasteor API: typed client and auth session.

/// Typed API client, one method per server operation.
pub mod api;
/// Auth session and on-disk token store.
pub mod auth;

pub use api::ApiClient;
pub use auth::{AuthSession, TokenStore};
