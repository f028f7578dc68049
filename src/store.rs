//! The storage seam between the payroll calculations and the database.
//!
//! `schedule` and `settle` only talk to a `PayrollStore`. `Db` is the SQLite implementation; tests
//! may provide their own.

use crate::model::{Amount, Deduction, IncomeSource, NewPayPeriod, PayPeriod};

/// The reads and writes needed to generate pay periods and settle their net pay.
#[async_trait::async_trait]
pub trait PayrollStore: Send + Sync {
    /// Returns the income source with `id`, active or not.
    async fn income_source(&self, id: i64) -> anyhow::Result<Option<IncomeSource>>;

    /// Inserts each period unless one already exists for the same income source and pay date.
    /// Existing rows are left untouched. Returns the number of rows actually inserted.
    async fn insert_pay_periods(&self, periods: &[NewPayPeriod]) -> anyhow::Result<u64>;

    /// Returns the pay period with `id`.
    async fn pay_period(&self, id: i64) -> anyhow::Result<Option<PayPeriod>>;

    /// Returns every pay period whose net amount has not been computed.
    async fn unresolved_pay_periods(&self) -> anyhow::Result<Vec<PayPeriod>>;

    /// Returns the active deductions of an income source, in no particular order.
    async fn active_deductions(&self, income_source_id: i64) -> anyhow::Result<Vec<Deduction>>;

    /// Sets (or overwrites) the net amount of a pay period.
    async fn set_net_amount(&self, pay_period_id: i64, net: Amount) -> anyhow::Result<()>;
}
