//! Durable backing store for the conversation engine: an append-only event
//! log, the agent registry, the mailbox, and the session manager, all behind
//! one `Store` handle over a local SQLite connection. A relational schema
//! with the same columns and foreign-key semantics a networked database
//! would use is satisfied structurally, without hard-wiring one.

pub mod agents;
mod error;
mod events;
mod mail;
mod schema;
mod sessions;
mod store;

pub use error::map_rusqlite;
pub use forktrace_types::{Error, Result};
pub use store::Store;
