//! Month-level commands: copying an expense plan forward and the dashboard.

use crate::args::{CopyExpensesArgs, DashboardArgs};
use crate::commands::list::{expense_line, goal_line};
use crate::commands::{count_of, listing, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Dashboard;
use crate::{Config, Result};
use chrono::{Datelike, Local};

/// Copies the previous month's expense plan into `args.year`/`args.month`. Categories that are
/// already planned in the target month keep their amounts. Returns the number of rows copied.
pub async fn copy_expenses(config: Config, args: CopyExpensesArgs) -> Result<Out<u64>> {
    let copied = config
        .db()
        .copy_expenses_from_previous_month(args.year, args.month)
        .await
        .pub_result(ErrorType::Database)?;
    let message = format!(
        "Copied {} into {}-{:02}",
        count_of(copied, "expense", "expenses"),
        args.year,
        args.month
    );
    Ok(Out::new(message, copied))
}

/// Summarizes a month, the current one unless `args` say otherwise: net income from settled pay
/// periods, planned expenses, what is left for savings and active savings goal progress.
pub async fn dashboard(config: Config, args: DashboardArgs) -> Result<Out<Dashboard>> {
    let today = Local::now().date_naive();
    let year = args.year.unwrap_or_else(|| today.year());
    let month = args.month.unwrap_or_else(|| today.month());

    let dashboard = config
        .db()
        .dashboard(year, month)
        .await
        .pub_result(ErrorType::Database)?;
    let message = render(&dashboard);
    Ok(Out::new(message, dashboard))
}

fn render(d: &Dashboard) -> String {
    let expenses = listing(
        "Expense breakdown:",
        d.expenses.iter().map(expense_line),
        "No expenses planned for this month",
    );
    let goals = listing(
        "Active savings goals:",
        d.goals.iter().map(goal_line),
        "No active savings goals",
    );
    format!(
        "Budget for {}-{:02}\n  \
         Net income:            {:>14}\n  \
         Planned expenses:      {:>14}\n  \
         Available for savings: {:>14}\n{expenses}\n{goals}",
        d.year,
        d.month,
        d.net_income.to_string(),
        d.planned_expenses.to_string(),
        d.available_for_savings.to_string(),
    )
}
