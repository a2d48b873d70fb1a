use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Todo;

/// Which todos a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterStatus {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterStatus {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            FilterStatus::All => true,
            FilterStatus::Active => !todo.completed,
            FilterStatus::Completed => todo.completed,
        }
    }

    /// The matching subsequence of `todos`, in the original order.
    pub fn apply(self, todos: &[Todo]) -> Vec<Todo> {
        todos.iter().filter(|todo| self.matches(todo)).cloned().collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterStatus::All => "all",
            FilterStatus::Active => "active",
            FilterStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter status: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterStatus {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterStatus::All),
            "active" => Ok(FilterStatus::Active),
            "completed" => Ok(FilterStatus::Completed),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}
