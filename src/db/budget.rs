//! Expense categories, monthly expense plans, savings goals and the monthly dashboard.

use super::{amount, optional_amount, Db};
use crate::error::{input, logic, not_found, Res};
use crate::model::{
    Amount, Dashboard, ExpenseCategory, MonthlyExpense, NewMonthlyExpense, NewSavingsGoal,
    SavingsGoal,
};
use anyhow::Context;
use chrono::{Datelike, Months, NaiveDate};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::cmp::Reverse;
use tracing::debug;

const EXPENSE_SELECT: &str = "SELECT me.id, me.category_id, ec.name AS category, me.year, \
     me.month, me.planned_amount, me.notes \
     FROM monthly_expenses me JOIN expense_categories ec ON me.category_id = ec.id";

const GOAL_COLUMNS: &str =
    "id, name, target_amount, current_amount, target_date, is_active, notes";

impl Db {
    pub(crate) async fn categories(&self) -> Res<Vec<ExpenseCategory>> {
        let rows = sqlx::query(
            "SELECT id, name, is_fixed, description FROM expense_categories ORDER BY name",
        )
        .fetch_all(self.pool())
        .await
        .context("Failed to query expense categories")?;
        rows.iter()
            .map(|row| {
                Ok(ExpenseCategory {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    fixed: row.try_get("is_fixed")?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    /// Sets the plan for a category in a month, replacing any existing plan. Returns the row id.
    pub(crate) async fn upsert_monthly_expense(&self, expense: &NewMonthlyExpense) -> Res<i64> {
        month_start(expense.year, expense.month)?;
        sqlx::query(
            "INSERT INTO monthly_expenses (category_id, year, month, planned_amount, notes) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (category_id, year, month) \
             DO UPDATE SET planned_amount = excluded.planned_amount, notes = excluded.notes",
        )
        .bind(expense.category_id)
        .bind(expense.year)
        .bind(expense.month)
        .bind(expense.planned.to_db())
        .bind(&expense.notes)
        .execute(self.pool())
        .await
        .context("Failed to save monthly expense")?;

        // last_insert_rowid is not updated by the conflict branch
        let (id,): (i64,) = sqlx::query_as(
            "SELECT id FROM monthly_expenses WHERE category_id = ? AND year = ? AND month = ?",
        )
        .bind(expense.category_id)
        .bind(expense.year)
        .bind(expense.month)
        .fetch_one(self.pool())
        .await
        .context("Failed to read back monthly expense")?;
        Ok(id)
    }

    /// Returns the planned expenses of a month, largest first.
    pub(crate) async fn monthly_expenses(&self, year: i32, month: u32) -> Res<Vec<MonthlyExpense>> {
        let sql = format!("{EXPENSE_SELECT} WHERE me.year = ? AND me.month = ? ORDER BY ec.name");
        let rows = sqlx::query(&sql)
            .bind(year)
            .bind(month)
            .fetch_all(self.pool())
            .await
            .context("Failed to query monthly expenses")?;
        let mut expenses = rows
            .iter()
            .map(expense_from_row)
            .collect::<Res<Vec<_>>>()?;
        // amounts are stored as text so SQL ordering would be lexical
        expenses.sort_by_key(|e| Reverse(e.planned));
        Ok(expenses)
    }

    /// Copies the previous month's plan into `year`/`month`. Categories already planned in the
    /// target month are left alone. Returns the number of rows copied.
    pub(crate) async fn copy_expenses_from_previous_month(
        &self,
        year: i32,
        month: u32,
    ) -> Res<u64> {
        let target = month_start(year, month)?;
        let previous = target
            .checked_sub_months(Months::new(1))
            .with_context(|| format!("No month before {year}-{month:02}"))?;
        let (prev_year, prev_month) = (previous.year(), previous.month());

        let result = sqlx::query(
            "INSERT OR IGNORE INTO monthly_expenses \
             (category_id, year, month, planned_amount, notes) \
             SELECT category_id, ?, ?, planned_amount, notes FROM monthly_expenses \
             WHERE year = ? AND month = ?",
        )
        .bind(year)
        .bind(month)
        .bind(prev_year)
        .bind(prev_month)
        .execute(self.pool())
        .await
        .context("Failed to copy monthly expenses")?;
        debug!(
            "Copied {} expenses from {prev_year}-{prev_month:02} to {year}-{month:02}",
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }

    pub(crate) async fn insert_goal(&self, goal: &NewSavingsGoal) -> Res<i64> {
        let result = sqlx::query(
            "INSERT INTO savings_goals (name, target_amount, current_amount, target_date, notes) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&goal.name)
        .bind(goal.target.to_db())
        .bind(goal.current.to_db())
        .bind(goal.target_date)
        .bind(&goal.notes)
        .execute(self.pool())
        .await
        .context("Failed to insert savings goal")?;
        Ok(result.last_insert_rowid())
    }

    /// Returns savings goals ordered by target date, undated goals last.
    pub(crate) async fn goals(&self, include_inactive: bool) -> Res<Vec<SavingsGoal>> {
        let filter = if include_inactive {
            ""
        } else {
            "WHERE is_active = 1"
        };
        let sql = format!(
            "SELECT {GOAL_COLUMNS} FROM savings_goals {filter} \
             ORDER BY target_date IS NULL, target_date, id"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .context("Failed to query savings goals")?;
        rows.iter().map(goal_from_row).collect()
    }

    pub(crate) async fn set_goal_current(&self, id: i64, current: Amount) -> Res<()> {
        let result = sqlx::query("UPDATE savings_goals SET current_amount = ? WHERE id = ?")
            .bind(current.to_db())
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to update savings goal")?;
        if result.rows_affected() == 0 {
            return Err(not_found(format!("Savings goal {id} not found")));
        }
        Ok(())
    }

    pub(crate) async fn set_goal_active(&self, id: i64, active: bool) -> Res<()> {
        let result = sqlx::query("UPDATE savings_goals SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to update savings goal")?;
        if result.rows_affected() == 0 {
            return Err(not_found(format!("Savings goal {id} not found")));
        }
        Ok(())
    }

    /// Builds the dashboard for a month. Net income counts every settled pay period dated in
    /// the month; unsettled periods contribute nothing.
    pub(crate) async fn dashboard(&self, year: i32, month: u32) -> Res<Dashboard> {
        let start = month_start(year, month)?;
        let end = start
            .checked_add_months(Months::new(1))
            .with_context(|| format!("No month after {year}-{month:02}"))?;

        let rows = sqlx::query(
            "SELECT net_amount FROM pay_periods \
             WHERE pay_date >= ? AND pay_date < ? AND net_amount IS NOT NULL",
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await
        .context("Failed to query net income")?;
        let net_amounts = rows
            .iter()
            .map(|row| optional_amount(row, "net_amount"))
            .collect::<Res<Vec<_>>>()?;
        let overflow = || logic(format!("Budget totals for {year}-{month:02} overflow"));
        let net_income = Amount::checked_sum(net_amounts.into_iter().flatten())
            .ok_or_else(overflow)?;

        let expenses = self.monthly_expenses(year, month).await?;
        let planned_expenses = Amount::checked_sum(expenses.iter().map(MonthlyExpense::planned))
            .ok_or_else(overflow)?;
        let available_for_savings = net_income
            .checked_sub(planned_expenses)
            .ok_or_else(overflow)?;
        let goals = self.goals(false).await?;

        Ok(Dashboard {
            year,
            month,
            net_income,
            planned_expenses,
            available_for_savings,
            expenses,
            goals,
        })
    }
}

/// The first day of a month, or an input error for an impossible year/month.
fn month_start(year: i32, month: u32) -> Res<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| input(format!("Invalid month {year}-{month:02}")))
}

fn expense_from_row(row: &SqliteRow) -> Res<MonthlyExpense> {
    Ok(MonthlyExpense {
        id: row.try_get("id")?,
        category_id: row.try_get("category_id")?,
        category: row.try_get("category")?,
        year: row.try_get("year")?,
        month: row.try_get("month")?,
        planned: amount(row, "planned_amount")?,
        notes: row.try_get("notes")?,
    })
}

fn goal_from_row(row: &SqliteRow) -> Res<SavingsGoal> {
    Ok(SavingsGoal {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        target: amount(row, "target_amount")?,
        current: amount(row, "current_amount")?,
        target_date: row.try_get("target_date")?,
        active: row.try_get("is_active")?,
        notes: row.try_get("notes")?,
    })
}
