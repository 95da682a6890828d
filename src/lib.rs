//! taskdeck: a terminal client for a hosted task list.
//!
//! Users authenticate against an external auth provider, and tasks are
//! persisted in a remote authoritative store reached over HTTP. The crate
//! is organized around the client-side synchronization model:
//!
//! - [`auth`]: session gateway over the auth provider, plus the
//!   session-change event channel.
//! - [`store`]: HTTP client for the task store.
//! - [`controller`]: the task list controller (single source of truth for
//!   local task state) and the task form.
//! - [`shell`]: the interactive terminal shell composing it all.

pub mod auth;
pub mod config;
pub mod controller;
pub mod models;
pub mod shell;
pub mod store;
