//! Core domain library for the Pasteor client (query state, sync, models).

/// Composer form state machine and client-side validation.
pub mod composer;
/// Configuration loading and env helpers.
pub mod config;
/// Error taxonomy for API operations.
pub mod error;
/// Wire models for the paste API.
pub mod models;
/// Canonical filter/sort/pagination state.
pub mod query;
/// Refetch planning after mutations.
pub mod refresh;
/// Sequence-gated fetch bookkeeping.
pub mod sync;

pub use config::Config;
pub use error::ApiError;
pub use query::{Query, QueryController, SortKey};
