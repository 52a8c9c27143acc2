use crate::id;
use crate::query::{QuerySpec, SavedFilter, SavedQuery, SortField};
use crate::store::{Result, StoreError, TicketStore};
use crate::types::{
    Activity, Comment, NewTicket, TagOptions, TicketDetail, TicketState, TicketSummary,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TICKETS_DIR: &str = ".tickets";
const STATE_FILE: &str = "state.yaml";
const ACTIVITY_FILE: &str = "activity.jsonl";
const RECENT_LIMIT: usize = 10;
const UNTITLED: &str = "Untitled";

/// YAML frontmatter of a ticket file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Frontmatter {
    id: String,
    #[serde(default)]
    state: TicketState,
    opened: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assigned: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    comments: Vec<Comment>,
}

/// A ticket as it lives on disk (frontmatter + title heading)
#[derive(Debug, Clone)]
struct StoredTicket {
    meta: Frontmatter,
    title: String,
}

impl StoredTicket {
    fn id(&self) -> &str {
        &self.meta.id
    }

    fn summary(&self) -> TicketSummary {
        TicketSummary {
            ticket_id: self.meta.id.clone(),
            title: self.title.clone(),
            state: self.meta.state.to_string(),
            opened: self.meta.opened,
            assigned: self.meta.assigned.clone(),
            tags: self.meta.tags.clone(),
        }
    }

    fn detail(&self) -> TicketDetail {
        TicketDetail {
            summary: self.summary(),
            comments: self.meta.comments.clone(),
        }
    }
}

/// Local, per-checkout bookkeeping
#[derive(Debug, Default, Serialize, Deserialize)]
struct RepoState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current: Option<String>,
    /// Ticket ids in the order of the last `list`, so `ti show 2` works
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    last_list: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    saved: BTreeMap<String, SavedFilter>,
}

/// Tickets kept as Markdown files with YAML frontmatter in `.tickets/`.
pub struct FileStore {
    tickets_dir: PathBuf,
    user: String,
}

impl FileStore {
    /// Find the .tickets directory by searching current and parent directories.
    /// Falls back to ./.tickets if not found (for init).
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }

        if let Ok(mut current) = std::env::current_dir() {
            loop {
                let candidate = current.join(TICKETS_DIR);
                if candidate.is_dir() {
                    return candidate;
                }
                if !current.pop() {
                    break;
                }
            }
        }

        PathBuf::from(TICKETS_DIR)
    }

    /// Create the store directory. Returns false when it already existed.
    pub fn init(dir: &Path) -> Result<bool> {
        if dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(dir)?;
        info!(dir = %dir.display(), "initialized ticket store");
        Ok(true)
    }

    pub fn open(tickets_dir: PathBuf, user: impl Into<String>) -> Result<Self> {
        if !tickets_dir.is_dir() {
            return Err(StoreError::NoRepoFound);
        }
        debug!(dir = %tickets_dir.display(), "opened ticket store");
        Ok(Self {
            tickets_dir,
            user: user.into(),
        })
    }

    fn ticket_path(&self, id: &str) -> PathBuf {
        self.tickets_dir.join(format!("{}.md", id))
    }

    /// Parse a markdown file with YAML frontmatter into a ticket
    fn parse_ticket(path: &Path, content: &str) -> Result<StoredTicket> {
        let bad = |reason: &str| StoreError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let content = content.trim();
        let rest = content
            .strip_prefix("---")
            .ok_or_else(|| bad("missing YAML frontmatter"))?;
        let end = rest
            .find("\n---")
            .ok_or_else(|| bad("unclosed frontmatter"))?;

        let meta: Frontmatter = serde_yaml::from_str(rest[..end].trim())?;
        let body = &rest[end + 4..];
        let title = body
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("# "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        Ok(StoredTicket { meta, title })
    }

    fn serialize_ticket(ticket: &StoredTicket) -> Result<String> {
        let yaml = serde_yaml::to_string(&ticket.meta)?;
        Ok(format!("---\n{}---\n\n# {}\n", yaml, ticket.title))
    }

    fn load_all(&self) -> Result<Vec<StoredTicket>> {
        let mut tickets = Vec::new();

        for entry in fs::read_dir(&self.tickets_dir)? {
            let path = entry?.path();

            if path.extension().is_some_and(|e| e == "md") {
                let content = fs::read_to_string(&path)?;
                match Self::parse_ticket(&path, &content) {
                    Ok(ticket) => tickets.push(ticket),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping ticket file"),
                }
            }
        }

        tickets.sort_by(|a, b| a.meta.opened.cmp(&b.meta.opened));
        Ok(tickets)
    }

    fn save(&self, ticket: &StoredTicket) -> Result<()> {
        fs::write(
            self.ticket_path(ticket.id()),
            Self::serialize_ticket(ticket)?,
        )?;
        Ok(())
    }

    fn load_state(&self) -> Result<RepoState> {
        let path = self.tickets_dir.join(STATE_FILE);
        if !path.exists() {
            return Ok(RepoState::default());
        }
        Ok(serde_yaml::from_str(&fs::read_to_string(path)?)?)
    }

    fn save_state(&self, state: &RepoState) -> Result<()> {
        fs::write(
            self.tickets_dir.join(STATE_FILE),
            serde_yaml::to_string(state)?,
        )?;
        Ok(())
    }

    /// Append one entry to the activity log
    fn record(&self, ticket_id: &str, message: &str) -> Result<()> {
        let date = Utc::now();
        let activity = Activity {
            sha: id::activity_sha(ticket_id, &date.to_rfc3339(), message),
            ticket_id: ticket_id.to_string(),
            date,
            message: message.to_string(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.tickets_dir.join(ACTIVITY_FILE))?;
        writeln!(file, "{}", serde_json::to_string(&activity)?)?;
        Ok(())
    }

    fn load_activity(&self) -> Result<Vec<Activity>> {
        let path = self.tickets_dir.join(ACTIVITY_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for line in fs::read_to_string(&path)?.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "skipping activity entry"),
            }
        }
        Ok(entries)
    }

    /// Find a ticket by exact id, position in the last list, or id prefix
    fn find(tickets: &[StoredTicket], reference: &str, state: &RepoState) -> Result<Option<usize>> {
        if let Some(idx) = tickets.iter().position(|t| t.id() == reference) {
            return Ok(Some(idx));
        }

        if let Ok(n) = reference.parse::<usize>() {
            if let Some(id) = n.checked_sub(1).and_then(|i| state.last_list.get(i)) {
                if let Some(idx) = tickets.iter().position(|t| t.id() == id) {
                    return Ok(Some(idx));
                }
            }
        }

        let matches: Vec<usize> = tickets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id().starts_with(reference))
            .map(|(i, _)| i)
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches[0])),
            count => Err(StoreError::AmbiguousId {
                partial: reference.to_string(),
                count,
            }),
        }
    }

    /// Resolve the ticket a mutation applies to
    fn target(tickets: &[StoredTicket], reference: Option<&str>, state: &RepoState) -> Result<usize> {
        let reference = match reference {
            Some(r) => r.to_string(),
            None => state.current.clone().ok_or(StoreError::NoCurrentTicket)?,
        };
        Self::find(tickets, &reference, state)?.ok_or(StoreError::TicketNotFound(reference))
    }

    /// Apply `change` to one ticket, save it and log the returned message
    fn modify<F>(&self, ticket_id: Option<&str>, change: F) -> Result<()>
    where
        F: FnOnce(&mut StoredTicket) -> Result<String>,
    {
        let mut tickets = self.load_all()?;
        let state = self.load_state()?;
        let idx = Self::target(&tickets, ticket_id, &state)?;

        let ticket = &mut tickets[idx];
        let message = change(ticket)?;
        self.save(ticket)?;
        self.record(ticket.id(), &message)?;

        info!(ticket = ticket.id(), "{}", message);
        Ok(())
    }
}

impl TicketStore for FileStore {
    fn recent_activity(&self, ticket_id: Option<&str>) -> Result<Vec<Activity>> {
        let only = match ticket_id {
            Some(reference) => {
                let tickets = self.load_all()?;
                let state = self.load_state()?;
                let idx = Self::target(&tickets, Some(reference), &state)?;
                Some(tickets[idx].id().to_string())
            }
            None => None,
        };

        Ok(self
            .load_activity()?
            .into_iter()
            .rev()
            .filter(|a| only.as_deref().map_or(true, |id| a.ticket_id == id))
            .take(RECENT_LIMIT)
            .collect())
    }

    fn list_tickets(&self, query: &QuerySpec) -> Result<Option<Vec<TicketSummary>>> {
        if query.list_saved {
            return Ok(None);
        }

        let mut state = self.load_state()?;
        let query = match &query.saved_name {
            Some(name) => {
                let saved = state
                    .saved
                    .get(name)
                    .ok_or_else(|| StoreError::SavedQueryNotFound(name.clone()))?;
                query.merged_with(saved)
            }
            None => query.clone(),
        };
        debug!(?query, "listing tickets");

        let mut tickets: Vec<TicketSummary> = self
            .load_all()?
            .iter()
            .map(StoredTicket::summary)
            .filter(|t| query.tag.as_ref().map_or(true, |tag| t.tags.contains(tag)))
            .filter(|t| query.state.as_ref().map_or(true, |s| &t.state == s))
            .filter(|t| {
                query.assigned.as_ref().map_or(true, |who| {
                    t.assigned.as_deref().is_some_and(|a| a.contains(who.as_str()))
                })
            })
            .collect();

        if let Some(order) = query.order {
            tickets.sort_by(|a, b| {
                let primary = match order.field {
                    SortField::Assigned => a.assigned_name().cmp(b.assigned_name()),
                    SortField::State => a.state.cmp(&b.state),
                    SortField::Date => a.opened.cmp(&b.opened),
                    SortField::Title => a.title.cmp(&b.title),
                };
                primary.then_with(|| a.opened.cmp(&b.opened))
            });
            if order.descending {
                tickets.reverse();
            }
        }

        if let Some(name) = &query.save_as {
            state.saved.insert(name.clone(), query.filter());
            info!(name = %name, "saved query");
        }
        state.last_list = tickets.iter().map(|t| t.ticket_id.clone()).collect();
        self.save_state(&state)?;

        Ok(Some(tickets))
    }

    fn get_ticket(&self, ticket_id: Option<&str>) -> Result<Option<TicketDetail>> {
        let state = self.load_state()?;
        let reference = match ticket_id.map(str::to_string).or_else(|| state.current.clone()) {
            Some(r) => r,
            None => return Ok(None),
        };

        let tickets = self.load_all()?;
        Ok(Self::find(&tickets, &reference, &state)?.map(|idx| tickets[idx].detail()))
    }

    fn create_ticket(&self, title: &str, extra: NewTicket) -> Result<TicketDetail> {
        // the title is a single heading line
        let title = match title.lines().next().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => UNTITLED,
        };
        let existing: Vec<String> = self
            .load_all()?
            .iter()
            .map(|t| t.id().to_string())
            .collect();

        let ticket = StoredTicket {
            meta: Frontmatter {
                id: id::generate(title, &existing),
                state: TicketState::Open,
                opened: Utc::now(),
                assigned: None,
                tags: extra.tags,
                comments: extra
                    .comment
                    .map(|c| Comment::new(&self.user, c))
                    .into_iter()
                    .collect(),
            },
            title: title.to_string(),
        };

        self.save(&ticket)?;
        self.record(ticket.id(), &format!("opened ticket: {}", title))?;
        info!(ticket = ticket.id(), "created ticket");
        Ok(ticket.detail())
    }

    fn add_comment(&self, text: &str, ticket_id: Option<&str>) -> Result<()> {
        self.modify(ticket_id, |ticket| {
            ticket
                .meta
                .comments
                .push(Comment::new(&self.user, text.to_string()));
            Ok("added comment".to_string())
        })
    }

    fn set_ticket_state(&self, state: &str, ticket_id: Option<&str>) -> Result<()> {
        let new_state: TicketState = state.parse().map_err(StoreError::InvalidState)?;
        self.modify(ticket_id, |ticket| {
            ticket.meta.state = new_state;
            Ok(format!("changed state to {}", new_state))
        })
    }

    fn checkout_ticket(&self, ticket_id: &str) -> Result<()> {
        let tickets = self.load_all()?;
        let mut state = self.load_state()?;
        let idx = Self::target(&tickets, Some(ticket_id), &state)?;

        state.current = Some(tickets[idx].id().to_string());
        self.save_state(&state)?;
        info!(ticket = tickets[idx].id(), "checked out ticket");
        Ok(())
    }

    fn assign_ticket(&self, user: Option<&str>, ticket_id: Option<&str>) -> Result<()> {
        let user = user.unwrap_or(self.user.as_str()).to_string();
        self.modify(ticket_id, |ticket| {
            let message = format!("assigned to {}", user);
            ticket.meta.assigned = Some(user);
            Ok(message)
        })
    }

    fn tag_ticket(
        &self,
        tags: &[String],
        ticket_id: Option<&str>,
        opts: TagOptions,
    ) -> Result<()> {
        self.modify(ticket_id, |ticket| {
            if opts.remove {
                ticket.meta.tags.retain(|t| !tags.contains(t));
                Ok(format!("removed tags {}", tags.join(",")))
            } else {
                for tag in tags {
                    if !ticket.meta.tags.contains(tag) {
                        ticket.meta.tags.push(tag.clone());
                    }
                }
                Ok(format!("added tags {}", tags.join(",")))
            }
        })
    }

    fn current_ticket(&self) -> Result<Option<String>> {
        Ok(self.load_state()?.current)
    }

    fn valid_states(&self) -> Vec<String> {
        TicketState::ALL.iter().map(ToString::to_string).collect()
    }

    fn saved_queries(&self) -> Result<Vec<SavedQuery>> {
        Ok(self
            .load_state()?
            .saved
            .into_iter()
            .map(|(name, filter)| SavedQuery { name, filter })
            .collect())
    }
}
