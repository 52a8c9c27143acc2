//! Terminal views of tickets, built as lines so callers decide where they go.

use crate::format::{justify, wrap, Side, DEFAULT_WRAP};
use crate::query::SavedQuery;
use crate::types::{Activity, TicketDetail, TicketSummary};
use chrono::{DateTime, Utc};
use std::fmt::Display;

const LABEL_WIDTH: usize = 10;
const MAX_COMMENT_LINES: usize = 6;
const MORE_MARKER: &str = "\t** more... **";
const RULE_WIDTH: usize = 80;
const SHORT_ID: usize = 6;
const SHORT_SHA: usize = 7;
const SECONDS_PER_DAY: f64 = 86_400.0;

fn label(name: &str, value: impl Display) -> String {
    format!("{}: {}", justify(name, LABEL_WIDTH, Side::Left), value)
}

/// Full view of one ticket, newest comment first.
///
/// `now` is used for the "(n days)" age next to the open date.
pub fn ticket_detail(ticket: &TicketDetail, now: DateTime<Utc>) -> Vec<String> {
    let t = &ticket.summary;
    let days = ((now - t.opened).num_seconds() as f64 / SECONDS_PER_DAY).round() as i64;

    let mut out = vec![
        String::new(),
        label("Title", &t.title),
        label("TicId", &t.ticket_id),
        String::new(),
        label("Assigned", t.assigned.as_deref().unwrap_or("")),
        label(
            "Opened",
            format!("{} ({} days)", t.opened.format("%Y-%m-%d %H:%M:%S %z"), days),
        ),
        label("State", t.state.to_uppercase()),
    ];
    if !t.tags.is_empty() {
        out.push(label("Tags", t.tags.join(", ")));
    }
    out.push(String::new());

    if !ticket.comments.is_empty() {
        out.push(format!("Comments ({}):", ticket.comments.len()));
        for c in ticket.comments.iter().rev() {
            out.push(format!(
                "  * Added {} by {}",
                c.added.format("%m/%d %H:%M"),
                c.user
            ));

            let wrapped = wrap(&c.comment, DEFAULT_WRAP);
            if wrapped.len() > MAX_COMMENT_LINES {
                out.extend(wrapped.into_iter().take(MAX_COMMENT_LINES));
                out.push(MORE_MARKER.to_string());
            } else {
                out.extend(wrapped);
            }
            out.push(String::new());
        }
    }
    out
}

/// Numbered table of tickets; `*` marks the checked-out one.
pub fn ticket_list(tickets: &[TicketSummary], current: Option<&str>) -> Vec<String> {
    let header = [
        " ".to_string(),
        justify("#", 4, Side::Right),
        justify("TicId", 6, Side::Left),
        justify("Title", 25, Side::Left),
        justify("State", 5, Side::Left),
        justify("Date", 5, Side::Left),
        justify("Assgn", 8, Side::Left),
        justify("Tags", 20, Side::Left),
    ];

    let mut out = vec![String::new(), header.join(" "), "-".repeat(RULE_WIDTH)];
    for (n, t) in tickets.iter().enumerate() {
        let marker = if current == Some(t.ticket_id.as_str()) {
            "*"
        } else {
            " "
        };
        let row = [
            marker.to_string(),
            justify(n + 1, 4, Side::Right),
            t.ticket_id.chars().take(SHORT_ID).collect(),
            justify(&t.title, 25, Side::Left),
            justify(&t.state, 5, Side::Left),
            t.opened.format("%m/%d").to_string(),
            justify(t.assigned_name(), 8, Side::Left),
            justify(t.tags.join(","), 20, Side::Left),
        ];
        out.push(row.join(" "));
    }
    out
}

pub fn activity_line(entry: &Activity) -> String {
    let sha: String = entry.sha.chars().take(SHORT_SHA).collect();
    format!(
        "{}  {}\t{}",
        sha,
        entry.date.format("%m/%d %H:%M"),
        entry.message
    )
}

pub fn saved_query_line(query: &SavedQuery) -> String {
    format!("{:<15} {}", query.name, query.filter)
}
