//! Turns `list` options into the query handed to the store.

use crate::commands::Usage;
use clap::Args;
use serde::{Deserialize, Serialize};

/// Raw `list` options as typed on the command line
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Field to order by: assigned, state, date or title (append .desc to reverse)
    #[arg(short, long)]
    pub order: Option<String>,
    /// List only tickets with this tag
    #[arg(short, long)]
    pub tag: Option<String>,
    /// List only tickets in this state
    #[arg(short, long)]
    pub state: Option<String>,
    /// List only tickets assigned to someone matching this
    #[arg(short, long)]
    pub assigned: Option<String>,
    /// Show the saved queries
    #[arg(short, long)]
    pub list: bool,
    /// Save this list under a name
    #[arg(short = 'S', long = "save-as", value_name = "NAME")]
    pub save_as: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Assigned,
    State,
    Date,
    Title,
}

impl SortField {
    pub const NAMES: [&'static str; 4] = ["assigned", "state", "date", "title"];
}

/// `field` or `field.desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.field {
            SortField::Assigned => "assigned",
            SortField::State => "state",
            SortField::Date => "date",
            SortField::Title => "title",
        };
        if self.descending {
            write!(f, "{name}.desc")
        } else {
            write!(f, "{name}")
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, descending) = match s.strip_suffix(".desc") {
            Some(name) => (name, true),
            None => (s, false),
        };
        let field = match name {
            "assigned" => SortField::Assigned,
            "state" => SortField::State,
            "date" => SortField::Date,
            "title" => SortField::Title,
            _ => return Err(s.to_string()),
        };
        Ok(Self { field, descending })
    }
}

impl TryFrom<String> for SortOrder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.to_string()
    }
}

/// The persistable part of a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned: Option<String>,
}

impl std::fmt::Display for SavedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(order) = &self.order {
            parts.push(format!("order={order}"));
        }
        if let Some(tag) = &self.tag {
            parts.push(format!("tag={tag}"));
        }
        if let Some(state) = &self.state {
            parts.push(format!("state={state}"));
        }
        if let Some(assigned) = &self.assigned {
            parts.push(format!("assigned={assigned}"));
        }
        write!(f, "{}", parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedQuery {
    pub name: String,
    pub filter: SavedFilter,
}

/// Everything the store needs to answer a `list`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub order: Option<SortOrder>,
    pub tag: Option<String>,
    pub state: Option<String>,
    pub assigned: Option<String>,
    /// Saved query to load
    pub saved_name: Option<String>,
    /// Name to persist this query under
    pub save_as: Option<String>,
    pub list_saved: bool,
}

impl QuerySpec {
    /// Build a query from the `list` options and its optional positional.
    ///
    /// Filter values are passed through untouched; only `--order` is checked
    /// since it has a closed set of fields.
    pub fn resolve(args: ListArgs, saved_query: Option<String>) -> Result<Self, Usage> {
        let order = args
            .order
            .map(|o| o.parse::<SortOrder>())
            .transpose()
            .map_err(|_| Usage::InvalidOrder {
                valid: SortField::NAMES.join(", "),
            })?;

        Ok(Self {
            order,
            tag: args.tag,
            state: args.state,
            assigned: args.assigned,
            saved_name: saved_query,
            save_as: args.save_as,
            list_saved: args.list,
        })
    }

    pub fn filter(&self) -> SavedFilter {
        SavedFilter {
            order: self.order,
            tag: self.tag.clone(),
            state: self.state.clone(),
            assigned: self.assigned.clone(),
        }
    }

    /// Fill unset filters from a saved query. Explicit options win and the
    /// result is never saved again.
    pub fn merged_with(&self, saved: &SavedFilter) -> Self {
        Self {
            order: self.order.or(saved.order),
            tag: self.tag.clone().or_else(|| saved.tag.clone()),
            state: self.state.clone().or_else(|| saved.state.clone()),
            assigned: self.assigned.clone().or_else(|| saved.assigned.clone()),
            saved_name: self.saved_name.clone(),
            save_as: None,
            list_saved: self.list_saved,
        }
    }
}
