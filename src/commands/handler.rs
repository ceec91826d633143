//! Command Handler Module
//!
//! Executes a parsed [`Command`] against the [`Store`] and turns the outcome
//! into a [`Reply`] for the terminal.
//!
//! ## Supported Commands
//!
//! - `set key value` - Set a key, then persist
//! - `get key` - Get a key's value
//! - `del key` - Delete a key, then persist
//! - `ts key` - Get a key's creation and last-update times
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  dispatch() │───>│   Store op  │───>│  persist()  │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                         (set / del only)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain errors (`key not found`) are part of the reply and are printed like
//! any other result. Only a failed persist is returned as an `Err`.

use crate::config::Command;
use crate::error::{Error, Result};
use crate::storage::{Store, Timestamps};
use chrono::SecondsFormat;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a command prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Success with nothing to print
    Done,
    /// A value
    Value(String),
    /// A timestamp pair, printed as two lines
    Timestamps(Timestamps),
    /// A domain error message
    Error(String),
}

impl Reply {
    fn from_error(err: Error) -> Self {
        Reply::Error(err.to_string())
    }

    /// Returns `true` if this reply carries a domain error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Done => Ok(()),
            Reply::Value(value) => writeln!(f, "{}", value),
            Reply::Timestamps(ts) => {
                writeln!(f, "{}", ts.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))?;
                writeln!(f, "{}", ts.updated_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
            }
            Reply::Error(msg) => writeln!(f, "{}", msg),
        }
    }
}

/// Runs commands against a shared store.
#[derive(Clone)]
pub struct CommandHandler {
    /// The store
    store: Arc<Store>,
}

impl CommandHandler {
    /// Creates a new command handler with the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The store this handler runs against.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Executes a command and returns what to print.
    ///
    /// `set` and `del` persist the store afterwards, even when `del` found
    /// nothing to delete. A persist failure is returned as an error; the
    /// in-memory change is kept.
    pub fn execute(&self, command: &Command) -> Result<Reply> {
        let reply = self.dispatch(command);
        debug!(?command, ?reply, "executed");

        if command.is_mutation() {
            self.store.persist()?;
        }
        Ok(reply)
    }

    /// Dispatches a command to its store operation.
    fn dispatch(&self, command: &Command) -> Reply {
        let outcome = match command {
            Command::Set { key, value } => self
                .store
                .set(key.as_str(), value.as_str())
                .map(|()| Reply::Done),
            Command::Get { key } => self.store.get(key).map(Reply::Value),
            Command::Del { key } => self.store.delete(key).map(|()| Reply::Done),
            Command::Ts { key } => self.store.timestamps(key).map(Reply::Timestamps),
        };
        outcome.unwrap_or_else(Reply::from_error)
    }
}
