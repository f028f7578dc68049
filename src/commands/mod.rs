//! Command handlers for the budget CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod delete;
mod init;
mod insert;
mod list;
mod monthly;
mod payroll;
mod update;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use delete::delete_deduction;
pub use init::init;
pub use insert::{
    insert_deduction, insert_expense, insert_goal, insert_income_source, insert_user,
};
pub use list::{
    list_categories, list_deductions, list_expenses, list_goals, list_income_sources, list_users,
};
pub use monthly::{copy_expenses, dashboard};
pub use payroll::{generate, periods, settle, Generated};
pub use update::{update_deduction, update_goal, update_income_source};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// "1 pay period", "3 pay periods".
fn count_of(count: impl Into<u64>, singular: &str, plural: &str) -> String {
    let count = count.into();
    format!("{count} {}", if count == 1 { singular } else { plural })
}

/// Joins a heading and one line per item, or says `empty` when there are no items.
fn listing<I>(heading: &str, lines: I, empty: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    let lines: Vec<String> = lines.into_iter().collect();
    if lines.is_empty() {
        return empty.to_string();
    }
    format!("{heading}\n{}", lines.join("\n"))
}
