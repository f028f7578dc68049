//! Users, income sources, deductions and pay periods.

use super::{amount, optional_amount, Db};
use crate::error::{logic, not_found, Res};
use crate::model::{
    Amount, CalculationKind, Deduction, IncomeSource, NewDeduction, NewIncomeSource, NewPayPeriod,
    PayFrequency, PayPeriod, PeriodReport, User,
};
use crate::store::PayrollStore;
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::debug;

const INCOME_SOURCE_COLUMNS: &str =
    "id, user_id, name, annual_salary, pay_frequency, first_pay_date, is_active";

const DEDUCTION_COLUMNS: &str =
    "id, income_source_id, name, calculation_type, amount, is_pre_tax, is_active";

const PAY_PERIOD_COLUMNS: &str = "id, income_source_id, pay_date, gross_amount, net_amount, notes";

impl Db {
    /// Inserts a user and returns its id.
    pub(crate) async fn insert_user(&self, name: &str) -> Res<i64> {
        let result = sqlx::query("INSERT INTO users (name) VALUES (?)")
            .bind(name)
            .execute(self.pool())
            .await
            .context("Failed to insert user")?;
        Ok(result.last_insert_rowid())
    }

    /// Returns the active users.
    pub(crate) async fn users(&self) -> Res<Vec<User>> {
        let rows =
            sqlx::query("SELECT id, name, is_active FROM users WHERE is_active = 1 ORDER BY id")
                .fetch_all(self.pool())
                .await
                .context("Failed to query users")?;
        rows.iter()
            .map(|row| {
                Ok(User {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    active: row.try_get("is_active")?,
                })
            })
            .collect()
    }

    /// Inserts an income source and returns its id.
    pub(crate) async fn insert_income_source(&self, source: &NewIncomeSource) -> Res<i64> {
        let result = sqlx::query(
            "INSERT INTO income_sources \
             (user_id, name, annual_salary, pay_frequency, first_pay_date) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(source.user_id)
        .bind(&source.name)
        .bind(source.annual_salary.to_db())
        .bind(source.frequency.to_string())
        .bind(source.anchor)
        .execute(self.pool())
        .await
        .context("Failed to insert income source")?;
        Ok(result.last_insert_rowid())
    }

    /// Returns all income sources, active ones first.
    pub(crate) async fn income_sources(&self) -> Res<Vec<IncomeSource>> {
        let sql = format!(
            "SELECT {INCOME_SOURCE_COLUMNS} FROM income_sources ORDER BY is_active DESC, id"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .context("Failed to query income sources")?;
        rows.iter().map(income_source_from_row).collect()
    }

    pub(crate) async fn set_income_source_active(&self, id: i64, active: bool) -> Res<()> {
        let result = sqlx::query("UPDATE income_sources SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to update income source")?;
        if result.rows_affected() == 0 {
            return Err(not_found(format!("Income source {id} not found")));
        }
        Ok(())
    }

    /// Inserts a deduction and returns its id.
    pub(crate) async fn insert_deduction(&self, deduction: &NewDeduction) -> Res<i64> {
        let result = sqlx::query(
            "INSERT INTO paycheck_deductions \
             (income_source_id, name, calculation_type, amount, is_pre_tax) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(deduction.income_source_id)
        .bind(&deduction.name)
        .bind(deduction.kind.to_string())
        .bind(deduction.amount.to_string())
        .bind(deduction.pre_tax)
        .execute(self.pool())
        .await
        .context("Failed to insert deduction")?;
        Ok(result.last_insert_rowid())
    }

    /// Returns every deduction of an income source, active or not.
    pub(crate) async fn deductions(&self, income_source_id: i64) -> Res<Vec<Deduction>> {
        let sql = format!(
            "SELECT {DEDUCTION_COLUMNS} FROM paycheck_deductions \
             WHERE income_source_id = ? ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(income_source_id)
            .fetch_all(self.pool())
            .await
            .context("Failed to query deductions")?;
        rows.iter().map(deduction_from_row).collect()
    }

    pub(crate) async fn set_deduction_active(&self, id: i64, active: bool) -> Res<()> {
        let result = sqlx::query("UPDATE paycheck_deductions SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to update deduction")?;
        if result.rows_affected() == 0 {
            return Err(not_found(format!("Deduction {id} not found")));
        }
        Ok(())
    }

    pub(crate) async fn delete_deduction(&self, id: i64) -> Res<()> {
        let result = sqlx::query("DELETE FROM paycheck_deductions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .context("Failed to delete deduction")?;
        if result.rows_affected() == 0 {
            return Err(not_found(format!("Deduction {id} not found")));
        }
        Ok(())
    }

    /// Returns the pay periods of an income source in `year`, ordered by pay date, with totals.
    pub(crate) async fn pay_periods_for_year(
        &self,
        income_source_id: i64,
        year: i32,
    ) -> Res<PeriodReport> {
        let sql = format!(
            "SELECT {PAY_PERIOD_COLUMNS} FROM pay_periods \
             WHERE income_source_id = ? AND year = ? ORDER BY pay_date"
        );
        let rows = sqlx::query(&sql)
            .bind(income_source_id)
            .bind(year)
            .fetch_all(self.pool())
            .await
            .context("Failed to query pay periods")?;
        let periods = rows.iter().map(pay_period_from_row).collect::<Res<Vec<_>>>()?;
        PeriodReport::new(income_source_id, year, periods).ok_or_else(|| {
            logic(format!(
                "Pay period totals of income source {income_source_id} in {year} overflow"
            ))
        })
    }
}

#[async_trait::async_trait]
impl PayrollStore for Db {
    async fn income_source(&self, id: i64) -> anyhow::Result<Option<IncomeSource>> {
        let sql = format!("SELECT {INCOME_SOURCE_COLUMNS} FROM income_sources WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("Failed to query income source")?;
        row.as_ref().map(income_source_from_row).transpose()
    }

    async fn insert_pay_periods(&self, periods: &[NewPayPeriod]) -> anyhow::Result<u64> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .context("Failed to begin pay period transaction")?;

        let mut inserted = 0;
        for period in periods {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO pay_periods \
                 (income_source_id, pay_date, gross_amount, year) VALUES (?, ?, ?, ?)",
            )
            .bind(period.income_source_id)
            .bind(period.pay_date)
            .bind(period.gross.to_db())
            .bind(period.year())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert pay period on {}", period.pay_date))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .context("Failed to commit pay period transaction")?;
        debug!(
            "Inserted {inserted} of {} pay periods, the rest already existed",
            periods.len()
        );
        Ok(inserted)
    }

    async fn pay_period(&self, id: i64) -> anyhow::Result<Option<PayPeriod>> {
        let sql = format!("SELECT {PAY_PERIOD_COLUMNS} FROM pay_periods WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .context("Failed to query pay period")?;
        row.as_ref().map(pay_period_from_row).transpose()
    }

    async fn unresolved_pay_periods(&self) -> anyhow::Result<Vec<PayPeriod>> {
        let sql = format!(
            "SELECT {PAY_PERIOD_COLUMNS} FROM pay_periods WHERE net_amount IS NULL ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .context("Failed to query unresolved pay periods")?;
        rows.iter().map(pay_period_from_row).collect()
    }

    async fn active_deductions(&self, income_source_id: i64) -> anyhow::Result<Vec<Deduction>> {
        let sql = format!(
            "SELECT {DEDUCTION_COLUMNS} FROM paycheck_deductions \
             WHERE income_source_id = ? AND is_active = 1"
        );
        let rows = sqlx::query(&sql)
            .bind(income_source_id)
            .fetch_all(self.pool())
            .await
            .context("Failed to query active deductions")?;
        rows.iter().map(deduction_from_row).collect()
    }

    async fn set_net_amount(&self, pay_period_id: i64, net: Amount) -> anyhow::Result<()> {
        let result = sqlx::query("UPDATE pay_periods SET net_amount = ? WHERE id = ?")
            .bind(net.to_db())
            .bind(pay_period_id)
            .execute(self.pool())
            .await
            .context("Failed to update net amount")?;
        if result.rows_affected() == 0 {
            return Err(not_found(format!("Pay period {pay_period_id} not found")));
        }
        Ok(())
    }
}

fn income_source_from_row(row: &SqliteRow) -> Res<IncomeSource> {
    let id: i64 = row.try_get("id")?;
    let frequency: String = row.try_get("pay_frequency")?;
    let frequency = PayFrequency::from_str(&frequency).map_err(|_| {
        logic(format!(
            "Unrecognized pay frequency '{frequency}' for income source {id}"
        ))
    })?;
    let anchor: NaiveDate = row
        .try_get("first_pay_date")
        .with_context(|| format!("Invalid first pay date for income source {id}"))?;
    Ok(IncomeSource {
        id,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        annual_salary: amount(row, "annual_salary")?,
        frequency,
        anchor,
        active: row.try_get("is_active")?,
    })
}

fn deduction_from_row(row: &SqliteRow) -> Res<Deduction> {
    let id: i64 = row.try_get("id")?;
    let kind: String = row.try_get("calculation_type")?;
    let kind = CalculationKind::from_str(&kind).map_err(|_| {
        logic(format!(
            "Unrecognized calculation kind '{kind}' for deduction {id}"
        ))
    })?;
    let value: String = row.try_get("amount")?;
    let value = Decimal::from_str(value.trim())
        .with_context(|| format!("Invalid amount '{value}' for deduction {id}"))?;
    Ok(Deduction {
        id,
        income_source_id: row.try_get("income_source_id")?,
        name: row.try_get("name")?,
        kind,
        amount: value,
        pre_tax: row.try_get("is_pre_tax")?,
        active: row.try_get("is_active")?,
    })
}

fn pay_period_from_row(row: &SqliteRow) -> Res<PayPeriod> {
    Ok(PayPeriod {
        id: row.try_get("id")?,
        income_source_id: row.try_get("income_source_id")?,
        pay_date: row.try_get("pay_date")?,
        gross: amount(row, "gross_amount")?,
        net: optional_amount(row, "net_amount")?,
        notes: row.try_get("notes")?,
    })
}
