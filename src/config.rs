use std::path::PathBuf;

/// Editor used when `$EDITOR` is not set
pub const DEFAULT_EDITOR: &str = "vi";

/// Identity used when neither `$TICKETS_USER` nor `$USER` is set
pub const DEFAULT_USER: &str = "anonymous";

/// Settings resolved from the environment once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit store location (`$TICKETS_DIR`); searched for when unset
    pub tickets_dir: Option<PathBuf>,
    /// Editor command line (`$EDITOR`)
    pub editor: String,
    /// Name recorded on comments and used as the default assignee
    pub user: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            tickets_dir: non_empty("TICKETS_DIR").map(PathBuf::from),
            editor: non_empty("EDITOR").unwrap_or_else(|| DEFAULT_EDITOR.to_string()),
            user: non_empty("TICKETS_USER")
                .or_else(|| non_empty("USER"))
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
        }
    }
}
