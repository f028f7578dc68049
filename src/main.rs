use clap::Parser;
use household_budget::args::{
    Args, Command, DeleteSubcommand, HomeCommand, InsertSubcommand, ListSubcommand,
    UpdateSubcommand,
};
use household_budget::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().budget_home().path();

    match args.command() {
        Command::Init => commands::init(home).await?.print(),
        Command::Home(command) => run(Config::load(home).await?, command).await?,
    }
    Ok(())
}

/// Routes every command that needs an existing budget home.
async fn run(config: Config, command: &HomeCommand) -> Result<()> {
    let _: () = match command {
        HomeCommand::Generate(a) => commands::generate(config, a.clone()).await?.print(),

        HomeCommand::Settle(a) => commands::settle(config, a.clone()).await?.print(),

        HomeCommand::Periods(a) => commands::periods(config, a.clone()).await?.print(),

        HomeCommand::Insert(insert_args) => match insert_args.entity() {
            InsertSubcommand::User(a) => commands::insert_user(config, a.clone()).await?.print(),
            InsertSubcommand::IncomeSource(a) => {
                commands::insert_income_source(config, a.clone())
                    .await?
                    .print()
            }
            InsertSubcommand::Deduction(a) => {
                commands::insert_deduction(config, a.clone()).await?.print()
            }
            InsertSubcommand::Expense(a) => {
                commands::insert_expense(config, a.clone()).await?.print()
            }
            InsertSubcommand::Goal(a) => commands::insert_goal(config, a.clone()).await?.print(),
        },

        HomeCommand::Update(update_args) => match update_args.entity() {
            UpdateSubcommand::IncomeSource(a) => {
                commands::update_income_source(config, a.clone())
                    .await?
                    .print()
            }
            UpdateSubcommand::Deduction(a) => {
                commands::update_deduction(config, a.clone()).await?.print()
            }
            UpdateSubcommand::Goal(a) => commands::update_goal(config, a.clone()).await?.print(),
        },

        HomeCommand::Delete(delete_args) => match delete_args.entity() {
            DeleteSubcommand::Deduction(a) => {
                commands::delete_deduction(config, a.clone()).await?.print()
            }
        },

        HomeCommand::List(list_args) => match list_args.entity() {
            ListSubcommand::Users => commands::list_users(config).await?.print(),
            ListSubcommand::IncomeSources => commands::list_income_sources(config).await?.print(),
            ListSubcommand::Deductions(a) => {
                commands::list_deductions(config, a.clone()).await?.print()
            }
            ListSubcommand::Categories => commands::list_categories(config).await?.print(),
            ListSubcommand::Expenses(a) => {
                commands::list_expenses(config, a.clone()).await?.print()
            }
            ListSubcommand::Goals(a) => commands::list_goals(config, a.clone()).await?.print(),
        },

        HomeCommand::CopyExpenses(a) => commands::copy_expenses(config, a.clone()).await?.print(),

        HomeCommand::Dashboard(a) => commands::dashboard(config, a.clone()).await?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
