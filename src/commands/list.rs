//! List command handlers.

use crate::args::{ListDeductionsArgs, ListGoalsArgs, MonthArgs};
use crate::commands::{listing, Out};
use crate::error::{not_found, ErrorType, IntoResult};
use crate::model::{Deduction, ExpenseCategory, IncomeSource, MonthlyExpense, SavingsGoal, User};
use crate::store::PayrollStore;
use crate::{Config, Result};

pub async fn list_users(config: Config) -> Result<Out<Vec<User>>> {
    let users = config.db().users().await.pub_result(ErrorType::Database)?;
    let message = listing(
        "Users:",
        users.iter().map(|u| format!("  #{:<4} {}", u.id(), u.name())),
        "No users, add one with 'budget insert user'",
    );
    Ok(Out::new(message, users))
}

pub async fn list_income_sources(config: Config) -> Result<Out<Vec<IncomeSource>>> {
    let sources = config
        .db()
        .income_sources()
        .await
        .pub_result(ErrorType::Database)?;
    let message = listing(
        "Income sources:",
        sources.iter().map(income_source_line),
        "No income sources, add one with 'budget insert income-source'",
    );
    Ok(Out::new(message, sources))
}

/// Lists every deduction of an income source, including inactive ones.
///
/// # Errors
/// - `ErrorType::NotFound` if the income source does not exist.
pub async fn list_deductions(
    config: Config,
    args: ListDeductionsArgs,
) -> Result<Out<Vec<Deduction>>> {
    let id = args.income_source;
    if config
        .db()
        .income_source(id)
        .await
        .pub_result(ErrorType::Database)?
        .is_none()
    {
        return Err(not_found(format!("Income source {id} not found")))
            .pub_result(ErrorType::NotFound);
    }
    let deductions = config
        .db()
        .deductions(id)
        .await
        .pub_result(ErrorType::Database)?;
    let message = listing(
        &format!("Deductions of income source {id}:"),
        deductions
            .iter()
            .map(|d| format!("  #{:<4} {}: {}", d.id(), d.name(), d.describe())),
        &format!("Income source {id} has no deductions"),
    );
    Ok(Out::new(message, deductions))
}

pub async fn list_categories(config: Config) -> Result<Out<Vec<ExpenseCategory>>> {
    let categories = config
        .db()
        .categories()
        .await
        .pub_result(ErrorType::Database)?;
    let message = listing(
        "Expense categories:",
        categories.iter().map(category_line),
        "No expense categories",
    );
    Ok(Out::new(message, categories))
}

/// Lists the expense plan of a month, largest first.
pub async fn list_expenses(config: Config, args: MonthArgs) -> Result<Out<Vec<MonthlyExpense>>> {
    let expenses = config
        .db()
        .monthly_expenses(args.year, args.month)
        .await
        .pub_result(ErrorType::Database)?;
    let message = listing(
        &format!("Planned expenses for {}-{:02}:", args.year, args.month),
        expenses.iter().map(expense_line),
        &format!("No expenses planned for {}-{:02}", args.year, args.month),
    );
    Ok(Out::new(message, expenses))
}

/// Lists active savings goals, or all of them with `--all`.
pub async fn list_goals(config: Config, args: ListGoalsArgs) -> Result<Out<Vec<SavingsGoal>>> {
    let goals = config
        .db()
        .goals(args.all)
        .await
        .pub_result(ErrorType::Database)?;
    let message = listing(
        "Savings goals:",
        goals.iter().map(goal_line),
        "No savings goals, add one with 'budget insert goal'",
    );
    Ok(Out::new(message, goals))
}

fn income_source_line(s: &IncomeSource) -> String {
    format!(
        "  #{:<4} {} (user {}): {} {}, first paid {}, {} per paycheck{}",
        s.id(),
        s.name(),
        s.user_id(),
        s.annual_salary(),
        s.frequency(),
        s.anchor(),
        s.gross_per_paycheck(),
        if s.is_active() { "" } else { " (inactive)" }
    )
}

fn category_line(c: &ExpenseCategory) -> String {
    let mut line = format!("  #{:<4} {}", c.id(), c.name());
    if c.is_fixed() {
        line.push_str(" [fixed]");
    }
    if let Some(description) = c.description() {
        line.push_str(&format!(": {description}"));
    }
    line
}

pub(super) fn expense_line(e: &MonthlyExpense) -> String {
    let mut line = format!("  {:<28} {:>12}", e.category(), e.planned().to_string());
    if let Some(notes) = e.notes() {
        line.push_str(&format!("  {notes}"));
    }
    line
}

pub(super) fn goal_line(g: &SavingsGoal) -> String {
    let progress = g
        .progress_pct()
        .map(|pct| format!(" ({pct:.2}%)"))
        .unwrap_or_default();
    let due = g
        .target_date()
        .map(|date| format!(", target {date}"))
        .unwrap_or_default();
    format!(
        "  #{:<4} {}: {} of {}{progress}{due}{}",
        g.id(),
        g.name(),
        g.current(),
        g.target(),
        if g.is_active() { "" } else { " (inactive)" }
    )
}
