use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ticket state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    #[default]
    Open,
    Resolved,
    Invalid,
    Hold,
}

impl TicketState {
    pub const ALL: [TicketState; 4] = [
        TicketState::Open,
        TicketState::Resolved,
        TicketState::Invalid,
        TicketState::Hold,
    ];
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketState::Open => write!(f, "open"),
            TicketState::Resolved => write!(f, "resolved"),
            TicketState::Invalid => write!(f, "invalid"),
            TicketState::Hold => write!(f, "hold"),
        }
    }
}

impl std::str::FromStr for TicketState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketState::Open),
            "resolved" => Ok(TicketState::Resolved),
            "invalid" => Ok(TicketState::Invalid),
            "hold" => Ok(TicketState::Hold),
            _ => Err(s.to_string()),
        }
    }
}

/// The list-level view of a ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSummary {
    pub ticket_id: String,
    pub title: String,
    pub state: String,
    pub opened: DateTime<Utc>,
    pub assigned: Option<String>,
    pub tags: Vec<String>,
}

impl TicketSummary {
    /// Assignee without the mail domain, e.g. "bob" for "bob@example.com".
    pub fn assigned_name(&self) -> &str {
        self.assigned
            .as_deref()
            .and_then(|a| a.split('@').next())
            .unwrap_or("")
    }
}

/// A ticket with its full comment history (oldest first)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDetail {
    pub summary: TicketSummary,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub added: DateTime<Utc>,
    pub user: String,
    pub comment: String,
}

impl Comment {
    pub fn new(user: &str, comment: String) -> Self {
        Self {
            added: Utc::now(),
            user: user.to_string(),
            comment,
        }
    }
}

/// One entry of the recent-activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub sha: String,
    pub ticket_id: String,
    pub date: DateTime<Utc>,
    pub message: String,
}

/// Optional parts of a freshly created ticket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    pub comment: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOptions {
    pub remove: bool,
}
