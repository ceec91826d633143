//! Command Handler Module
//!
//! This module implements the command layer for kvdb. It receives a parsed
//! [`Command`](crate::config::Command), executes it against the store, persists
//! after mutations and returns a printable reply.
//!
//! ## Architecture
//!
//! ```text
//! argv
//!   │
//!   ▼
//! ┌─────────────────┐
//! │  clap Config    │  (config module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Execute      │
//! │  - Persist      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Store       │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `set`, `get`, `del`, `ts`

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandHandler, Reply};
