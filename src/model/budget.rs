use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A spending category such as "Groceries". Fixed categories are recurring bills.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) fixed: bool,
    pub(crate) description: Option<String>,
}

impl ExpenseCategory {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// The planned spend for one category in one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub(crate) id: i64,
    pub(crate) category_id: i64,
    pub(crate) category: String,
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) planned: Amount,
    pub(crate) notes: Option<String>,
}

impl MonthlyExpense {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn planned(&self) -> Amount {
        self.planned
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// The fields needed to set a monthly expense plan.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewMonthlyExpense {
    pub category_id: i64,
    pub year: i32,
    pub month: u32,
    pub planned: Amount,
    pub notes: Option<String>,
}

/// Something the household is saving up for.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) target: Amount,
    pub(crate) current: Amount,
    pub(crate) target_date: Option<NaiveDate>,
    pub(crate) active: bool,
    pub(crate) notes: Option<String>,
}

impl SavingsGoal {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Amount {
        self.target
    }

    pub fn current(&self) -> Amount {
        self.current
    }

    pub fn target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Percent of the target reached, to two places. `None` when the target is zero or the
    /// percentage is too large to represent.
    pub fn progress_pct(&self) -> Option<Decimal> {
        if self.target.is_zero() {
            return None;
        }
        let pct = self
            .current
            .value()
            .checked_mul(Decimal::ONE_HUNDRED)?
            .checked_div(self.target.value())?;
        Some(pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

/// The fields needed to insert a savings goal.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target: Amount,
    pub current: Amount,
    pub target_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Aggregates for one month: what comes in, what is planned to go out, and the goals.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub year: i32,
    pub month: u32,
    /// Sum of settled net pay with a pay date in the month.
    pub net_income: Amount,
    /// Sum of planned expenses for the month.
    pub planned_expenses: Amount,
    /// `net_income - planned_expenses`. May be negative.
    pub available_for_savings: Amount,
    /// Planned expenses, largest first.
    pub expenses: Vec<MonthlyExpense>,
    /// Active goals, earliest target date first.
    pub goals: Vec<SavingsGoal>,
}
