//! Free-form text capture through the user's `$EDITOR`.

use anyhow::{Context, Result};
use std::io::{ErrorKind, Write};
use std::process::Command;
use tracing::{debug, warn};

const BUFFER_PREFIX: &str = "ticgit_message";
const COMMENT_MARKER: char = '#';

/// Lines the user kept (each with its newline), or `None` if nothing
/// meaningful was written.
pub type EditorResult = Option<Vec<String>>;

pub trait TextEditor {
    /// Let the user edit `seed` (or an empty buffer) and read the result back.
    fn capture(&self, seed: Option<&str>) -> Result<EditorResult>;
}

/// Runs an external editor on a scratch file and blocks until it exits.
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// `command` may carry arguments, e.g. `code --wait`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl TextEditor for ExternalEditor {
    fn capture(&self, seed: Option<&str>) -> Result<EditorResult> {
        let mut buffer = tempfile::Builder::new()
            .prefix(BUFFER_PREFIX)
            .suffix(".txt")
            .tempfile()
            .context("Failed to create message buffer")?;
        buffer.write_all(seed.unwrap_or_default().as_bytes())?;
        buffer.flush()?;
        // removed again when `path` drops
        let path = buffer.into_temp_path();

        let mut words = self.command.split_whitespace();
        let program = words.next().context("No editor configured")?;
        debug!(editor = %self.command, buffer = %path.display(), "launching editor");

        let status = Command::new(program)
            .args(words)
            .arg(&*path)
            .status()
            .with_context(|| format!("Failed to run editor '{}'", self.command))?;
        if !status.success() {
            warn!(%status, "editor exited unsuccessfully, reading what was saved");
        }

        let content = match std::fs::read_to_string(&*path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e).context("Failed to read message buffer"),
        };
        Ok(strip_comments(&content))
    }
}

/// Drop `#` lines; report `None` if only blank lines are left.
pub fn strip_comments(content: &str) -> EditorResult {
    let lines: Vec<String> = content
        .split_inclusive('\n')
        .filter(|line| !line.starts_with(COMMENT_MARKER))
        .map(str::to_string)
        .collect();

    if lines.iter().all(|line| line.trim().is_empty()) {
        None
    } else {
        Some(lines)
    }
}
