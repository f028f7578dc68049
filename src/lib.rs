//! A household budget tracker.
//!
//! Income sources are turned into pay periods by [`schedule::generate_pay_periods`], and the net
//! pay of each period is computed from its income source's deductions by
//! [`settle::calculate_net_pay`]. Both work against any [`store::PayrollStore`]; [`Db`] is the
//! SQLite implementation opened through [`Config`].
//!
//! ```
//! use household_budget::model::Amount;
//! use std::str::FromStr;
//!
//! let salary = Amount::from_str("$52,000").unwrap();
//! assert_eq!(salary.to_string(), "$52,000.00");
//! ```

pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod schedule;
pub mod settle;
pub mod store;
mod utils;

pub use config::Config;
pub use db::Db;
pub use error::{Error, ErrorType, Result};
