//! The contract between the commands and whatever keeps the tickets.

use crate::query::{QuerySpec, SavedQuery};
use crate::types::{Activity, NewTicket, TagOptions, TicketDetail, TicketSummary};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No repo found")]
    NoRepoFound,

    #[error("Ticket '{0}' not found")]
    TicketNotFound(String),

    #[error("Ambiguous ticket id '{partial}': matches {count} tickets. Use more characters.")]
    AmbiguousId { partial: String, count: usize },

    #[error("No ticket checked out. Run `ti checkout <ticket-id>` first.")]
    NoCurrentTicket,

    #[error("Saved query '{0}' not found")]
    SavedQueryNotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Ticket storage as seen by the commands.
///
/// Every `ticket_id: Option<&str>` falls back to the checked-out ticket when
/// `None`.
pub trait TicketStore {
    /// Latest activity, newest first, optionally for a single ticket.
    fn recent_activity(&self, ticket_id: Option<&str>) -> Result<Vec<Activity>>;

    /// Tickets matching `query`, or `None` when the query yields no list
    /// (e.g. it only asked for the saved queries).
    fn list_tickets(&self, query: &QuerySpec) -> Result<Option<Vec<TicketSummary>>>;

    /// `None` when the ticket does not exist or nothing is checked out.
    fn get_ticket(&self, ticket_id: Option<&str>) -> Result<Option<TicketDetail>>;

    fn create_ticket(&self, title: &str, extra: NewTicket) -> Result<TicketDetail>;

    fn add_comment(&self, text: &str, ticket_id: Option<&str>) -> Result<()>;

    fn set_ticket_state(&self, state: &str, ticket_id: Option<&str>) -> Result<()>;

    fn checkout_ticket(&self, ticket_id: &str) -> Result<()>;

    /// Assign to `user`, or to the current user when `None`.
    fn assign_ticket(&self, user: Option<&str>, ticket_id: Option<&str>) -> Result<()>;

    fn tag_ticket(&self, tags: &[String], ticket_id: Option<&str>, opts: TagOptions)
        -> Result<()>;

    /// Id of the checked-out ticket.
    fn current_ticket(&self) -> Result<Option<String>>;

    fn valid_states(&self) -> Vec<String>;

    fn saved_queries(&self) -> Result<Vec<SavedQuery>>;
}
