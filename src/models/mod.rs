//! Domain models for taskdeck.
//!
//! # Core Concepts
//!
//! - [`Task`]: The sole domain entity — a user-owned unit of work with a
//!   title, optional description, and a two-valued [`TaskStatus`]. The
//!   remote store is authoritative; ids and timestamps are server-assigned.
//! - [`Session`]: An authenticated identity's active login context, owned
//!   by the session gateway and observed by everything else.
//! - [`SessionEvent`]: Session-change notifications broadcast to
//!   subscribed components.

mod session;
mod task;

pub use session::*;
pub use task::*;
