//! Core data model for the forktrace conversation engine.
//!
//! This crate has no I/O of its own: it defines the entities of the event
//! log (`Session`, `Agent`, `Event`, `Mail`, `Mark`) and the error taxonomy
//! shared by every other `forktrace-*` crate. Storage, replay, and runtime
//! behavior live in their own crates.

mod error;
mod event;
mod agent;
mod session;
mod mail;
mod mark;
mod model;

pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use agent::{Agent, AgentStatus};
pub use session::Session;
pub use mail::{Mail, MAIL_BODY_MAX_LEN};
pub use mark::Mark;
pub use model::{ModelCatalog, ThinkingLevel};
