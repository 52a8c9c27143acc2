//! Fixed-width text helpers shared by the ticket views.

use std::fmt::Display;

/// Width comment bodies are wrapped to.
pub const DEFAULT_WRAP: usize = 80;

/// Which side of the column the value sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Fit `value` into exactly `width` characters.
///
/// Longer values are cut (no ellipsis), shorter ones are padded with spaces
/// on the side opposite to `side`.
pub fn justify(value: impl Display, width: usize, side: Side) -> String {
    let truncated: String = value.to_string().chars().take(width).collect();
    match side {
        Side::Left => format!("{truncated:<width$}"),
        Side::Right => format!("{truncated:>width$}"),
    }
}

/// Wrap every line of `text` to `width` characters and indent it with a tab.
///
/// Breaks happen at the last whitespace inside the limit; a run without any
/// whitespace is cut hard at `width`. Trailing empty lines are dropped.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let width = width.max(1);
    lines
        .into_iter()
        .flat_map(|line| break_line(line, width))
        .map(|line| format!("\t{line}"))
        .collect()
}

fn break_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut rest = line;
    while rest.chars().count() > width {
        // byte offset of the first char past the limit
        let limit = rest
            .char_indices()
            .nth(width)
            .map_or(rest.len(), |(i, _)| i);
        // a whitespace sitting right at the limit is still a valid break
        let window_end = rest[limit..]
            .chars()
            .next()
            .map_or(limit, |c| limit + c.len_utf8());

        let split = rest[..window_end]
            .rfind(char::is_whitespace)
            .filter(|&i| !rest[..i].trim().is_empty());
        let (head, tail) = match split {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (&rest[..limit], &rest[limit..]),
        };

        out.push(head.trim_end().to_string());
        rest = tail.trim_start();
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}
