//! These structs provide the CLI interface for the budget CLI.

use crate::model::{Amount, CalculationKind, PayFrequency};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// budget: A household budget tracker.
///
/// Keep track of who earns what, generate the pay periods of each income source, compute net pay
/// from paycheck deductions, plan monthly expenses and follow savings goals. Everything is stored
/// in a local SQLite database inside the budget home directory.
#[derive(Debug, Parser, Clone)]
#[command(name = "budget")]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the budget home directory, its config file and the SQLite database.
    ///
    /// This is the first command you should run. By default the home directory is $HOME/budget,
    /// pass --budget-home or set BUDGET_HOME to put it somewhere else.
    Init,
    #[command(flatten)]
    Home(HomeCommand),
}

/// Subcommands that work on an existing budget home.
#[derive(Subcommand, Debug, Clone)]
pub enum HomeCommand {
    /// Generate the pay periods of an income source within a date window, then compute net pay
    /// for every pay period that does not have it yet.
    Generate(GenerateArgs),
    /// Compute net pay for one pay period, or for all pay periods that do not have it yet.
    Settle(SettleArgs),
    /// Show the pay periods of an income source for a year, with totals.
    Periods(PeriodsArgs),
    /// Create users, income sources, deductions, expense plans and savings goals.
    Insert(InsertArgs),
    /// Activate or deactivate records and record savings goal progress.
    Update(UpdateArgs),
    /// Delete records.
    Delete(DeleteArgs),
    /// List records.
    List(ListArgs),
    /// Copy last month's expense plan into a month without overwriting what is already planned.
    CopyExpenses(CopyExpensesArgs),
    /// Show income, planned expenses, what is left for savings and savings goal progress for a
    /// month.
    Dashboard(DashboardArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the budget database and configuration are held. Defaults to ~/budget
    #[arg(long, env = "BUDGET_HOME", default_value_t = default_budget_home())]
    budget_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, budget_home: PathBuf) -> Self {
        Self {
            log_level,
            budget_home: budget_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn budget_home(&self) -> &DisplayPath {
        &self.budget_home
    }
}

/// Args for the `budget generate` command.
#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// The ID of the income source.
    #[arg(long)]
    pub income_source: i64,

    /// The first day of the window, YYYY-MM-DD.
    #[arg(long)]
    pub start: NaiveDate,

    /// The last day of the window (inclusive), YYYY-MM-DD.
    #[arg(long)]
    pub end: NaiveDate,
}

/// Args for the `budget settle` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SettleArgs {
    /// Recompute this pay period even if it already has a net amount. When omitted, every pay
    /// period without a net amount is computed.
    #[arg(long)]
    pub pay_period: Option<i64>,
}

/// Args for the `budget periods` command.
#[derive(Debug, Parser, Clone)]
pub struct PeriodsArgs {
    /// The ID of the income source.
    #[arg(long)]
    pub income_source: i64,

    /// The calendar year of the pay dates.
    #[arg(long)]
    pub year: i32,
}

#[derive(Debug, Parser, Clone)]
pub struct InsertArgs {
    #[command(subcommand)]
    entity: InsertSubcommand,
}

impl InsertArgs {
    pub fn entity(&self) -> &InsertSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum InsertSubcommand {
    /// Add a person to the household.
    User(InsertUserArgs),
    /// Add a salaried income source to a user.
    IncomeSource(InsertIncomeSourceArgs),
    /// Add a paycheck deduction to an income source.
    Deduction(InsertDeductionArgs),
    /// Plan the spend for a category in a month. Replaces an existing plan.
    Expense(InsertExpenseArgs),
    /// Add a savings goal.
    Goal(InsertGoalArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct InsertUserArgs {
    /// The user's name.
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Parser, Clone)]
pub struct InsertIncomeSourceArgs {
    /// The ID of the user who earns this income.
    #[arg(long)]
    pub user: i64,

    /// A name for the income source, e.g. the employer.
    #[arg(long)]
    pub name: String,

    /// Annual gross salary, e.g. 52000 or $52,000.00
    #[arg(long)]
    pub salary: Amount,

    /// One of: weekly, bi-weekly, semi-monthly, monthly
    #[arg(long)]
    pub frequency: PayFrequency,

    /// The first (or next) pay date, YYYY-MM-DD. Pay dates are counted forward from here.
    #[arg(long)]
    pub first_pay_date: NaiveDate,
}

#[derive(Debug, Parser, Clone)]
pub struct InsertDeductionArgs {
    /// The ID of the income source the deduction applies to.
    #[arg(long)]
    pub income_source: i64,

    /// A name for the deduction, e.g. "Federal Tax" or "401k".
    #[arg(long)]
    pub name: String,

    /// One of: percentage, fixed_per_paycheck, fixed_annual
    #[arg(long)]
    pub kind: CalculationKind,

    /// A percent of gross pay (15 means 15%), or a currency amount for the fixed kinds.
    #[arg(long)]
    pub amount: Decimal,

    /// The deduction is taken before taxes.
    #[arg(long)]
    pub pre_tax: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct InsertExpenseArgs {
    /// The expense category name, see `budget list categories`.
    #[arg(long)]
    pub category: String,

    #[arg(long)]
    pub year: i32,

    /// 1 through 12.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    /// The planned amount.
    #[arg(long)]
    pub amount: Amount,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct InsertGoalArgs {
    #[arg(long)]
    pub name: String,

    /// The amount to save.
    #[arg(long)]
    pub target: Amount,

    /// The amount saved so far. Defaults to zero.
    #[arg(long)]
    pub current: Option<Amount>,

    /// When the goal should be reached, YYYY-MM-DD.
    #[arg(long)]
    pub target_date: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Activate or deactivate an income source. Inactive sources do not generate pay periods.
    IncomeSource(UpdateActiveArgs),
    /// Activate or deactivate a deduction. Inactive deductions do not affect net pay.
    Deduction(UpdateActiveArgs),
    /// Record progress on a savings goal, or activate or deactivate it.
    Goal(UpdateGoalArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct UpdateActiveArgs {
    /// The ID of the record.
    pub id: i64,

    /// true or false
    #[arg(long, action = clap::ArgAction::Set)]
    pub active: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct UpdateGoalArgs {
    /// The ID of the savings goal.
    pub id: i64,

    /// The amount saved so far.
    #[arg(long)]
    pub current: Option<Amount>,

    /// true or false
    #[arg(long, action = clap::ArgAction::Set)]
    pub active: Option<bool>,
}

#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: DeleteSubcommand,
}

impl DeleteArgs {
    pub fn entity(&self) -> &DeleteSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete a paycheck deduction. Net amounts already computed are not changed.
    Deduction(DeleteDeductionArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct DeleteDeductionArgs {
    /// The ID of the deduction.
    pub id: i64,
}

#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// Active users.
    Users,
    /// All income sources, active ones first.
    IncomeSources,
    /// The deductions of an income source.
    Deductions(ListDeductionsArgs),
    /// Expense categories.
    Categories,
    /// The expense plan of a month, largest first.
    Expenses(MonthArgs),
    /// Savings goals.
    Goals(ListGoalsArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ListDeductionsArgs {
    #[arg(long)]
    pub income_source: i64,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct ListGoalsArgs {
    /// Include inactive goals.
    #[arg(long)]
    pub all: bool,
}

/// A calendar month.
#[derive(Debug, Parser, Clone)]
pub struct MonthArgs {
    #[arg(long)]
    pub year: i32,

    /// 1 through 12.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,
}

/// Args for the `budget copy-expenses` command. The plan is copied from the month before.
pub type CopyExpensesArgs = MonthArgs;

/// Args for the `budget dashboard` command. Defaults to the current month.
#[derive(Debug, Parser, Clone, Default)]
pub struct DashboardArgs {
    #[arg(long)]
    pub year: Option<i32>,

    /// 1 through 12.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
}

fn default_budget_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("budget"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --budget-home or BUDGET_HOME instead of relying on the default \
                budget home directory.",
            );
            PathBuf::from("budget")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["budget", "--budget-home", "/tmp/budget-test"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_generate_args() {
        let args = parse(&[
            "generate",
            "--income-source",
            "3",
            "--start",
            "2024-01-01",
            "--end",
            "2024-12-31",
        ]);
        let Command::Home(HomeCommand::Generate(generate)) = args.command() else {
            panic!("expected generate, got {:?}", args.command());
        };
        assert_eq!(generate.income_source, 3);
        assert_eq!(generate.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(args.common().budget_home().path(), Path::new("/tmp/budget-test"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_insert_income_source_args() {
        let args = parse(&[
            "insert",
            "income-source",
            "--user",
            "1",
            "--name",
            "Day Job",
            "--salary",
            "$52,000",
            "--frequency",
            "bi-weekly",
            "--first-pay-date",
            "2024-01-05",
        ]);
        let Command::Home(HomeCommand::Insert(insert)) = args.command() else {
            panic!("expected insert");
        };
        let InsertSubcommand::IncomeSource(source) = insert.entity() else {
            panic!("expected income-source");
        };
        assert_eq!(source.frequency, PayFrequency::BiWeekly);
        assert_eq!(source.salary.to_db(), "52000.00");
    }

    #[test]
    fn test_insert_deduction_args() {
        let args = parse(&[
            "insert",
            "deduction",
            "--income-source",
            "1",
            "--name",
            "401k",
            "--kind",
            "percentage",
            "--amount",
            "6",
            "--pre-tax",
        ]);
        let Command::Home(HomeCommand::Insert(insert)) = args.command() else {
            panic!("expected insert");
        };
        let InsertSubcommand::Deduction(deduction) = insert.entity() else {
            panic!("expected deduction");
        };
        assert_eq!(deduction.kind, CalculationKind::Percentage);
        assert!(deduction.pre_tax);
    }

    #[test]
    fn test_bad_enum_values_are_rejected() {
        let result = Args::try_parse_from([
            "budget",
            "insert",
            "deduction",
            "--income-source",
            "1",
            "--name",
            "x",
            "--kind",
            "progressive",
            "--amount",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_month_range_is_checked() {
        let result = Args::try_parse_from([
            "budget",
            "copy-expenses",
            "--year",
            "2024",
            "--month",
            "13",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_active_requires_value() {
        let args = parse(&["update", "deduction", "7", "--active", "false"]);
        let Command::Home(HomeCommand::Update(update)) = args.command() else {
            panic!("expected update");
        };
        let UpdateSubcommand::Deduction(deduction) = update.entity() else {
            panic!("expected deduction");
        };
        assert_eq!(deduction.id, 7);
        assert!(!deduction.active);
    }

    #[test]
    fn test_init_is_separate_from_home_commands() {
        assert!(matches!(parse(&["init"]).command(), Command::Init));
        assert!(matches!(
            parse(&["dashboard"]).command(),
            Command::Home(HomeCommand::Dashboard(_))
        ));
    }

    #[test]
    fn test_settle_defaults_to_unresolved() {
        let args = parse(&["settle"]);
        let Command::Home(HomeCommand::Settle(settle)) = args.command() else {
            panic!("expected settle");
        };
        assert!(settle.pay_period.is_none());
    }
}
