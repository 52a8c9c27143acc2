//! One function per `ti` subcommand.
//!
//! Each command checks its own arguments before touching the store. Problems
//! the user can fix are returned as [`Usage`] so `main` can print them as a
//! plain message; store errors pass through untouched.

use crate::editor::{EditorResult, TextEditor};
use crate::query::{ListArgs, QuerySpec};
use crate::render;
use crate::storage::FileStore;
use crate::store::TicketStore;
use crate::types::{NewTicket, TagOptions};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const MAX_COMMENT_FILE_BYTES: u64 = 2048;

const TAGS_PREFIX: &str = "tags:";

const NEW_TICKET_TEMPLATE: &str = "\n# ---\ntags:\n\
# first line will be the title of the tic, the rest will be the first comment\n\
# if you would like to add initial tags, put them on the 'tags:' line, comma delim\n";

/// Input problems reported back to the user without changing anything
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Usage {
    #[error("Only 1 of -f/--file and -m/--message can be specified")]
    ConflictingCommentSource,

    #[error("File {0} doesn't exist")]
    MissingCommentFile(String),

    #[error("File {0} must be <= 2048 bytes")]
    CommentFileTooLarge(String),

    #[error("Invalid State - please choose from : {valid}")]
    InvalidState { valid: String },

    #[error("Invalid order - please choose from : {valid}")]
    InvalidOrder { valid: String },

    #[error("You need to at least specify one tag to add")]
    NoTags,

    #[error("You need to at least enter a title")]
    NoTitle,

    #[error("It seems you wrote nothing")]
    NothingWritten,
}

fn write_lines(out: &mut impl Write, lines: Vec<String>) -> Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Split a comma separated tag list, dropping blanks
pub fn parse_tag_list(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn cmd_init(dir: &Path, out: &mut impl Write) -> Result<()> {
    if FileStore::init(dir)? {
        writeln!(out, "Initialized {}", dir.display())?;
    } else {
        writeln!(out, "Already initialized.")?;
    }
    Ok(())
}

pub fn cmd_recent(
    store: &impl TicketStore,
    out: &mut impl Write,
    ticket_id: Option<&str>,
) -> Result<()> {
    for entry in store.recent_activity(ticket_id)? {
        writeln!(out, "{}", render::activity_line(&entry))?;
    }
    Ok(())
}

/// `[ticket-id] tag-list`: with several arguments the first is the ticket and
/// the rest are tags; a lone argument is the tag list for the checked-out
/// ticket.
pub fn resolve_tag_args(args: &[String]) -> (Option<&str>, Option<String>) {
    match args {
        [] => (None, None),
        [tags] => (None, Some(tags.clone())),
        [id, rest @ ..] => (Some(id.as_str()), Some(rest.join(","))),
    }
}

pub fn cmd_tag(store: &impl TicketStore, args: &[String], remove: bool) -> Result<()> {
    let (ticket_id, tags) = resolve_tag_args(args);
    let tags = tags.map(|t| parse_tag_list(&t)).unwrap_or_default();
    if tags.is_empty() {
        return Err(Usage::NoTags.into());
    }

    debug!(?ticket_id, ?tags, remove, "tagging");
    store.tag_ticket(&tags, ticket_id, TagOptions { remove })?;
    Ok(())
}

fn read_comment_file(path: &Path) -> Result<String> {
    let name = path.display().to_string();
    if !path.is_file() {
        return Err(Usage::MissingCommentFile(name).into());
    }
    let size = fs::metadata(path)?.len();
    if size > MAX_COMMENT_FILE_BYTES {
        return Err(Usage::CommentFileTooLarge(name).into());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", name))
}

pub fn cmd_comment(
    store: &impl TicketStore,
    editor: &impl TextEditor,
    ticket_id: Option<&str>,
    message: Option<&str>,
    file: Option<&Path>,
) -> Result<()> {
    let text = match (message, file) {
        (Some(_), Some(_)) => return Err(Usage::ConflictingCommentSource.into()),
        (Some(message), None) => message.to_string(),
        (None, Some(path)) => read_comment_file(path)?,
        (None, None) => editor.capture(None)?.ok_or(Usage::NothingWritten)?.concat(),
    };

    store.add_comment(&text, ticket_id)?;
    info!(?ticket_id, "added comment");
    Ok(())
}

pub fn cmd_checkout(store: &impl TicketStore, ticket_id: &str) -> Result<()> {
    store.checkout_ticket(ticket_id)?;
    Ok(())
}

/// `[ticket-id] state`: a single argument is the state of the checked-out
/// ticket.
pub fn resolve_state_args<'a>(
    id_or_state: &'a str,
    state: Option<&'a str>,
) -> (Option<&'a str>, &'a str) {
    match state {
        Some(state) => (Some(id_or_state), state),
        None => (None, id_or_state),
    }
}

pub fn cmd_state(store: &impl TicketStore, id_or_state: &str, state: Option<&str>) -> Result<()> {
    let (ticket_id, state) = resolve_state_args(id_or_state, state);

    let valid = store.valid_states();
    if !valid.iter().any(|s| s == state) {
        return Err(Usage::InvalidState {
            valid: valid.join(", "),
        }
        .into());
    }

    store.set_ticket_state(state, ticket_id)?;
    Ok(())
}

pub fn cmd_assign(
    store: &impl TicketStore,
    ticket_id: Option<&str>,
    user: Option<&str>,
    checkout: Option<&str>,
) -> Result<()> {
    if let Some(checkout) = checkout {
        store.checkout_ticket(checkout)?;
    }
    store.assign_ticket(user, ticket_id)?;
    Ok(())
}

pub fn cmd_list(
    store: &impl TicketStore,
    out: &mut impl Write,
    args: ListArgs,
    saved_query: Option<String>,
) -> Result<()> {
    let query = QuerySpec::resolve(args, saved_query)?;
    debug!(?query, "resolved list query");

    if query.list_saved {
        for saved in store.saved_queries()? {
            writeln!(out, "{}", render::saved_query_line(&saved))?;
        }
        return Ok(());
    }

    if let Some(tickets) = store.list_tickets(&query)? {
        let current = store.current_ticket()?;
        write_lines(out, render::ticket_list(&tickets, current.as_deref()))?;
    }
    Ok(())
}

pub fn cmd_show(store: &impl TicketStore, out: &mut impl Write, ticket_id: Option<&str>) -> Result<()> {
    if let Some(ticket) = store.get_ticket(ticket_id)? {
        write_lines(out, render::ticket_detail(&ticket, Utc::now()))?;
    }
    Ok(())
}

/// Split what came back from the new-ticket template into title, tags and
/// first comment.
pub fn parse_new_ticket(edited: EditorResult) -> Result<(String, NewTicket), Usage> {
    let mut lines = edited.ok_or(Usage::NothingWritten)?;
    if lines.is_empty() {
        return Err(Usage::NothingWritten);
    }

    let title = lines.remove(0).trim().to_string();
    if title.is_empty() {
        return Err(Usage::NoTitle);
    }

    let mut tags = Vec::new();
    if lines.last().is_some_and(|l| l.starts_with(TAGS_PREFIX)) {
        if let Some(line) = lines.pop() {
            tags = parse_tag_list(&line[TAGS_PREFIX.len()..]);
        }
    }

    let comment = Some(lines.concat()).filter(|c| !c.trim().is_empty());
    Ok((title, NewTicket { comment, tags }))
}

pub fn cmd_new(
    store: &impl TicketStore,
    editor: &impl TextEditor,
    out: &mut impl Write,
    title: Option<&str>,
) -> Result<()> {
    let ticket = match title {
        Some(title) => {
            let title = title.lines().next().unwrap_or_default().trim();
            if title.is_empty() {
                return Err(Usage::NoTitle.into());
            }
            store.create_ticket(title, NewTicket::default())?
        }
        None => {
            let (title, extra) = parse_new_ticket(editor.capture(Some(NEW_TICKET_TEMPLATE))?)?;
            store.create_ticket(&title, extra)?
        }
    };

    write_lines(out, render::ticket_detail(&ticket, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SavedQuery;
    use crate::store::{self, StoreError};
    use crate::types::{Activity, TicketDetail, TicketSummary};
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Recent(Option<String>),
        List(QuerySpec),
        Create(String, NewTicket),
        Comment(String, Option<String>),
        State(String, Option<String>),
        Checkout(String),
        Assign(Option<String>, Option<String>),
        Tag(Vec<String>, Option<String>, bool),
    }

    /// Records every call and answers with canned data
    #[derive(Default)]
    struct FakeStore {
        calls: RefCell<Vec<Call>>,
        current: Option<String>,
        tickets: Option<Vec<TicketSummary>>,
        detail: Option<TicketDetail>,
        saved: Vec<SavedQuery>,
        activity: Vec<Activity>,
    }

    impl FakeStore {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn push(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    fn owned(s: Option<&str>) -> Option<String> {
        s.map(str::to_string)
    }

    fn summary(id: &str, title: &str) -> TicketSummary {
        TicketSummary {
            ticket_id: id.to_string(),
            title: title.to_string(),
            state: "open".to_string(),
            opened: Utc::now(),
            assigned: None,
            tags: vec![],
        }
    }

    impl TicketStore for FakeStore {
        fn recent_activity(&self, ticket_id: Option<&str>) -> store::Result<Vec<Activity>> {
            self.push(Call::Recent(owned(ticket_id)));
            Ok(self.activity.clone())
        }

        fn list_tickets(&self, query: &QuerySpec) -> store::Result<Option<Vec<TicketSummary>>> {
            self.push(Call::List(query.clone()));
            Ok(self.tickets.clone())
        }

        fn get_ticket(&self, _ticket_id: Option<&str>) -> store::Result<Option<TicketDetail>> {
            Ok(self.detail.clone())
        }

        fn create_ticket(&self, title: &str, extra: NewTicket) -> store::Result<TicketDetail> {
            self.push(Call::Create(title.to_string(), extra.clone()));
            let mut summary = summary("abcdef0123", title);
            summary.tags = extra.tags;
            Ok(TicketDetail {
                summary,
                comments: vec![],
            })
        }

        fn add_comment(&self, text: &str, ticket_id: Option<&str>) -> store::Result<()> {
            self.push(Call::Comment(text.to_string(), owned(ticket_id)));
            Ok(())
        }

        fn set_ticket_state(&self, state: &str, ticket_id: Option<&str>) -> store::Result<()> {
            self.push(Call::State(state.to_string(), owned(ticket_id)));
            Ok(())
        }

        fn checkout_ticket(&self, ticket_id: &str) -> store::Result<()> {
            self.push(Call::Checkout(ticket_id.to_string()));
            Ok(())
        }

        fn assign_ticket(&self, user: Option<&str>, ticket_id: Option<&str>) -> store::Result<()> {
            self.push(Call::Assign(owned(user), owned(ticket_id)));
            Ok(())
        }

        fn tag_ticket(
            &self,
            tags: &[String],
            ticket_id: Option<&str>,
            opts: TagOptions,
        ) -> store::Result<()> {
            self.push(Call::Tag(tags.to_vec(), owned(ticket_id), opts.remove));
            Ok(())
        }

        fn current_ticket(&self) -> store::Result<Option<String>> {
            Ok(self.current.clone())
        }

        fn valid_states(&self) -> Vec<String> {
            vec!["open".to_string(), "invalid".to_string()]
        }

        fn saved_queries(&self) -> store::Result<Vec<SavedQuery>> {
            Ok(self.saved.clone())
        }
    }

    /// Returns canned lines and remembers the seed it was given
    struct FakeEditor {
        result: EditorResult,
        seeds: RefCell<Vec<Option<String>>>,
    }

    impl FakeEditor {
        fn returning(lines: &[&str]) -> Self {
            Self {
                result: Some(lines.iter().map(|l| l.to_string()).collect()),
                seeds: RefCell::new(vec![]),
            }
        }

        fn empty() -> Self {
            Self {
                result: None,
                seeds: RefCell::new(vec![]),
            }
        }
    }

    impl TextEditor for FakeEditor {
        fn capture(&self, seed: Option<&str>) -> Result<EditorResult> {
            self.seeds.borrow_mut().push(owned(seed));
            Ok(self.result.clone())
        }
    }

    fn usage(result: Result<()>) -> Usage {
        result
            .unwrap_err()
            .downcast::<Usage>()
            .expect("expected a usage error")
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_tag_args_with_ticket_id() {
        let a = args(&["T1", "a,b"]);
        assert_eq!(resolve_tag_args(&a), (Some("T1"), Some("a,b".to_string())));

        let store = FakeStore::default();
        cmd_tag(&store, &a, false).unwrap();
        assert_eq!(
            store.calls(),
            vec![Call::Tag(args(&["a", "b"]), Some("T1".to_string()), false)]
        );
    }

    #[test]
    fn test_tag_single_arg_implies_current_ticket() {
        let a = args(&["a,b"]);
        assert_eq!(resolve_tag_args(&a), (None, Some("a,b".to_string())));

        let store = FakeStore::default();
        cmd_tag(&store, &a, true).unwrap();
        assert_eq!(store.calls(), vec![Call::Tag(args(&["a", "b"]), None, true)]);
    }

    #[test]
    fn test_tag_extra_args_join_into_list() {
        let a = args(&["T1", "a", "b"]);
        assert_eq!(resolve_tag_args(&a), (Some("T1"), Some("a,b".to_string())));
    }

    #[test]
    fn test_tag_without_tags_is_usage_error() {
        let store = FakeStore::default();
        assert_eq!(usage(cmd_tag(&store, &[], false)), Usage::NoTags);
        assert_eq!(usage(cmd_tag(&store, &args(&[" , "]), false)), Usage::NoTags);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_comment_with_message_and_file_is_rejected() {
        let store = FakeStore::default();
        let editor = FakeEditor::empty();
        let err = usage(cmd_comment(
            &store,
            &editor,
            None,
            Some("hi"),
            Some(Path::new("notes.txt")),
        ));
        assert_eq!(err, Usage::ConflictingCommentSource);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_comment_message() {
        let store = FakeStore::default();
        let editor = FakeEditor::empty();
        cmd_comment(&store, &editor, Some("T1"), Some("looks good"), None).unwrap();
        assert_eq!(
            store.calls(),
            vec![Call::Comment("looks good".to_string(), Some("T1".to_string()))]
        );
        assert!(editor.seeds.borrow().is_empty());
    }

    #[test]
    fn test_comment_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "from a file\n").unwrap();

        let store = FakeStore::default();
        cmd_comment(&store, &FakeEditor::empty(), None, None, Some(&path)).unwrap();
        assert_eq!(
            store.calls(),
            vec![Call::Comment("from a file\n".to_string(), None)]
        );
    }

    #[test]
    fn test_comment_file_missing_or_too_large() {
        let dir = TempDir::new().unwrap();
        let store = FakeStore::default();
        let editor = FakeEditor::empty();

        let missing = dir.path().join("missing.txt");
        let err = usage(cmd_comment(&store, &editor, None, None, Some(&missing)));
        assert!(matches!(err, Usage::MissingCommentFile(_)));

        let err = usage(cmd_comment(&store, &editor, None, None, Some(dir.path())));
        assert!(matches!(err, Usage::MissingCommentFile(_)));

        let big = dir.path().join("big.txt");
        fs::write(&big, "x".repeat(2049)).unwrap();
        let err = usage(cmd_comment(&store, &editor, None, None, Some(&big)));
        assert!(matches!(err, Usage::CommentFileTooLarge(_)));

        let exact = dir.path().join("exact.txt");
        fs::write(&exact, "x".repeat(2048)).unwrap();
        cmd_comment(&store, &editor, None, None, Some(&exact)).unwrap();
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn test_comment_from_editor() {
        let store = FakeStore::default();
        let editor = FakeEditor::returning(&["first\n", "second\n"]);
        cmd_comment(&store, &editor, None, None, None).unwrap();
        assert_eq!(
            store.calls(),
            vec![Call::Comment("first\nsecond\n".to_string(), None)]
        );
        assert_eq!(*editor.seeds.borrow(), vec![None]);
    }

    #[test]
    fn test_comment_empty_editor_adds_nothing() {
        let store = FakeStore::default();
        let err = usage(cmd_comment(&store, &FakeEditor::empty(), None, None, None));
        assert_eq!(err, Usage::NothingWritten);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_state_arity() {
        assert_eq!(resolve_state_args("open", None), (None, "open"));
        assert_eq!(resolve_state_args("T1", Some("open")), (Some("T1"), "open"));

        let store = FakeStore::default();
        cmd_state(&store, "T1", Some("invalid")).unwrap();
        cmd_state(&store, "open", None).unwrap();
        assert_eq!(
            store.calls(),
            vec![
                Call::State("invalid".to_string(), Some("T1".to_string())),
                Call::State("open".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_invalid_state_lists_valid_ones() {
        let store = FakeStore::default();
        let err = usage(cmd_state(&store, "resolved", None));
        assert_eq!(err.to_string(), "Invalid State - please choose from : open, invalid");
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_assign_checks_out_first() {
        let store = FakeStore::default();
        cmd_assign(&store, None, Some("bob"), Some("T9")).unwrap();
        assert_eq!(
            store.calls(),
            vec![
                Call::Checkout("T9".to_string()),
                Call::Assign(Some("bob".to_string()), None),
            ]
        );
    }

    #[test]
    fn test_assign_defaults() {
        let store = FakeStore::default();
        cmd_assign(&store, Some("T1"), None, None).unwrap();
        assert_eq!(
            store.calls(),
            vec![Call::Assign(None, Some("T1".to_string()))]
        );
    }

    #[test]
    fn test_list_passes_saved_name_and_marks_current() {
        let store = FakeStore {
            current: Some("bbbbbb222".to_string()),
            tickets: Some(vec![summary("aaaaaa111", "one"), summary("bbbbbb222", "two")]),
            ..Default::default()
        };
        let list_args = ListArgs {
            tag: Some("ui".to_string()),
            ..Default::default()
        };
        let text = output(|out| cmd_list(&store, out, list_args, Some("mine".to_string())));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("     1 aaaaaa one"));
        assert!(lines[4].starts_with("*    2 bbbbbb two"));

        match &store.calls()[0] {
            Call::List(query) => {
                assert_eq!(query.saved_name.as_deref(), Some("mine"));
                assert_eq!(query.tag.as_deref(), Some("ui"));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn test_list_without_result_prints_nothing() {
        let store = FakeStore::default();
        let text = output(|out| cmd_list(&store, out, ListArgs::default(), None));
        assert!(text.is_empty());
    }

    #[test]
    fn test_list_empty_prints_header_and_rule() {
        let store = FakeStore {
            tickets: Some(vec![]),
            ..Default::default()
        };
        let text = output(|out| cmd_list(&store, out, ListArgs::default(), None));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "-".repeat(80));
    }

    #[test]
    fn test_list_saved_queries_mode() {
        let store = FakeStore::default();
        let list_args = ListArgs {
            list: true,
            ..Default::default()
        };
        let text = output(|out| cmd_list(&store, out, list_args, None));
        assert!(text.is_empty());
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_show_missing_ticket_prints_nothing() {
        let store = FakeStore::default();
        let text = output(|out| cmd_show(&store, out, Some("nope")));
        assert!(text.is_empty());
    }

    #[test]
    fn test_show_renders_detail() {
        let store = FakeStore {
            detail: Some(TicketDetail {
                summary: summary("abc123", "Broken build"),
                comments: vec![],
            }),
            ..Default::default()
        };
        let text = output(|out| cmd_show(&store, out, None));
        assert!(text.contains("Title     : Broken build"));
        assert!(text.contains("State     : OPEN"));
    }

    #[test]
    fn test_recent_lines() {
        let store = FakeStore {
            activity: vec![Activity {
                sha: "abcdef0123456".to_string(),
                ticket_id: "T1".to_string(),
                date: Utc::now(),
                message: "added comment".to_string(),
            }],
            ..Default::default()
        };
        let text = output(|out| cmd_recent(&store, out, Some("T1")));
        assert!(text.starts_with("abcdef0  "));
        assert!(text.trim_end().ends_with("\tadded comment"));
        assert_eq!(store.calls(), vec![Call::Recent(Some("T1".to_string()))]);
    }

    #[test]
    fn test_new_with_title_skips_editor() {
        let store = FakeStore::default();
        let editor = FakeEditor::empty();
        let text = output(|out| cmd_new(&store, &editor, out, Some("Quick one")));
        assert!(text.contains("Title     : Quick one"));
        assert_eq!(
            store.calls(),
            vec![Call::Create("Quick one".to_string(), NewTicket::default())]
        );
        assert!(editor.seeds.borrow().is_empty());
    }

    #[test]
    fn test_new_interactive_title_and_tags() {
        let store = FakeStore::default();
        let editor = FakeEditor::returning(&["My Title\n", "tags: a, b\n"]);
        let text = output(|out| cmd_new(&store, &editor, out, None));

        assert_eq!(
            store.calls(),
            vec![Call::Create(
                "My Title".to_string(),
                NewTicket {
                    comment: None,
                    tags: args(&["a", "b"]),
                }
            )]
        );
        assert!(text.contains("Tags      : a, b"));

        let seed = editor.seeds.borrow()[0].clone().unwrap();
        assert!(seed.starts_with("\n# ---\ntags:\n# "));
    }

    #[test]
    fn test_new_interactive_with_comment() {
        let parsed = parse_new_ticket(Some(args(&[
            "Title\n",
            "some detail\n",
            "more detail\n",
            "tags:\n",
        ])))
        .unwrap();
        assert_eq!(parsed.0, "Title");
        assert_eq!(
            parsed.1,
            NewTicket {
                comment: Some("some detail\nmore detail\n".to_string()),
                tags: vec![],
            }
        );
    }

    #[test]
    fn test_new_tags_line_only_counts_when_last() {
        let parsed = parse_new_ticket(Some(args(&["Title\n", "tags: a\n", "body\n"]))).unwrap();
        assert!(parsed.1.tags.is_empty());
        assert_eq!(parsed.1.comment.as_deref(), Some("tags: a\nbody\n"));
    }

    #[test]
    fn test_new_nothing_written() {
        let store = FakeStore::default();
        let err = usage(output_result(|out| {
            cmd_new(&store, &FakeEditor::empty(), out, None)
        }));
        assert_eq!(err, Usage::NothingWritten);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_new_title_flag_keeps_first_line_only() {
        let store = FakeStore::default();
        let editor = FakeEditor::empty();
        let text = output(|out| cmd_new(&store, &editor, out, Some("  a \nb")));
        assert!(text.contains("Title     : a\n"));
        assert_eq!(
            store.calls(),
            vec![Call::Create("a".to_string(), NewTicket::default())]
        );
    }

    #[test]
    fn test_new_blank_title_flag() {
        let store = FakeStore::default();
        for title in ["", "   ", "\nsecond"] {
            let err = usage(output_result(|out| {
                cmd_new(&store, &FakeEditor::empty(), out, Some(title))
            }));
            assert_eq!(err, Usage::NoTitle);
        }
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_new_blank_title() {
        let store = FakeStore::default();
        let editor = FakeEditor::returning(&["   \n", "body\n"]);
        let err = usage(output_result(|out| cmd_new(&store, &editor, out, None)));
        assert_eq!(err, Usage::NoTitle);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_store_errors_are_not_usage() {
        struct Broken;
        impl TicketStore for Broken {
            fn recent_activity(&self, _: Option<&str>) -> store::Result<Vec<Activity>> {
                Err(StoreError::NoCurrentTicket)
            }
            fn list_tickets(&self, _: &QuerySpec) -> store::Result<Option<Vec<TicketSummary>>> {
                Err(StoreError::NoCurrentTicket)
            }
            fn get_ticket(&self, _: Option<&str>) -> store::Result<Option<TicketDetail>> {
                Err(StoreError::NoCurrentTicket)
            }
            fn create_ticket(&self, _: &str, _: NewTicket) -> store::Result<TicketDetail> {
                Err(StoreError::NoCurrentTicket)
            }
            fn add_comment(&self, _: &str, _: Option<&str>) -> store::Result<()> {
                Err(StoreError::NoCurrentTicket)
            }
            fn set_ticket_state(&self, _: &str, _: Option<&str>) -> store::Result<()> {
                Err(StoreError::NoCurrentTicket)
            }
            fn checkout_ticket(&self, _: &str) -> store::Result<()> {
                Err(StoreError::NoCurrentTicket)
            }
            fn assign_ticket(&self, _: Option<&str>, _: Option<&str>) -> store::Result<()> {
                Err(StoreError::NoCurrentTicket)
            }
            fn tag_ticket(&self, _: &[String], _: Option<&str>, _: TagOptions) -> store::Result<()> {
                Err(StoreError::NoCurrentTicket)
            }
            fn current_ticket(&self) -> store::Result<Option<String>> {
                Ok(None)
            }
            fn valid_states(&self) -> Vec<String> {
                vec!["open".to_string()]
            }
            fn saved_queries(&self) -> store::Result<Vec<SavedQuery>> {
                Ok(vec![])
            }
        }

        let err = cmd_state(&Broken, "open", None).unwrap_err();
        assert!(err.downcast_ref::<Usage>().is_none());
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NoCurrentTicket)
        ));
    }

    fn output_result(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> Result<()> {
        let mut out = Vec::new();
        f(&mut out)
    }
}
