//! Session worker bridging a frontend thread to the Pasteor API.
//!
//! The frontend sends [`SessionCmd`] values and polls [`SessionEvent`]s; the
//! worker owns the canonical query, executes fetches concurrently, and only
//! ever emits results that survived the stale-response gate.

mod protocol;
mod worker;

pub use protocol::{SessionCmd, SessionEvent};
pub use worker::{spawn_session, SessionHandle};
