//! Types that represent the core data model, such as `IncomeSource`, `Deduction` and `PayPeriod`.
mod amount;
mod budget;
mod deduction;
mod frequency;
mod income;
mod pay_period;

pub use amount::{Amount, AmountError};
pub use budget::{
    Dashboard, ExpenseCategory, MonthlyExpense, NewMonthlyExpense, NewSavingsGoal, SavingsGoal,
};
pub use deduction::{CalculationKind, Deduction, NewDeduction};
pub use frequency::PayFrequency;
pub use income::{IncomeSource, NewIncomeSource, User};
pub use pay_period::{NewPayPeriod, PayPeriod, PeriodReport};
