//! Insert command handlers.

use crate::args::{
    InsertDeductionArgs, InsertExpenseArgs, InsertGoalArgs, InsertIncomeSourceArgs, InsertUserArgs,
};
use crate::commands::Out;
use crate::db::Db;
use crate::error::{input, not_found, ErrorType, IntoResult, Res};
use crate::model::{
    Amount, NewDeduction, NewIncomeSource, NewMonthlyExpense, NewSavingsGoal,
};
use crate::{Config, Result};

/// Adds a user to the household and returns the new user's ID.
pub async fn insert_user(config: Config, args: InsertUserArgs) -> Result<Out<i64>> {
    let name = required(&args.name, "User name").pub_result(ErrorType::Input)?;
    let id = config
        .db()
        .insert_user(name)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(format!("Inserted user '{name}' with ID {id}"), id))
}

/// Adds an income source to a user and returns its ID.
///
/// # Errors
/// - `ErrorType::Input` if the salary is negative or the name is blank.
/// - `ErrorType::Constraint` if the user does not exist.
pub async fn insert_income_source(
    config: Config,
    args: InsertIncomeSourceArgs,
) -> Result<Out<i64>> {
    let name = required(&args.name, "Income source name").pub_result(ErrorType::Input)?;
    if args.salary.is_negative() {
        return Err(input(format!("Salary cannot be negative: {}", args.salary)))
            .pub_result(ErrorType::Input);
    }
    let source = NewIncomeSource {
        user_id: args.user,
        name: name.to_string(),
        annual_salary: args.salary,
        frequency: args.frequency,
        anchor: args.first_pay_date,
    };
    let id = config
        .db()
        .insert_income_source(&source)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!(
            "Inserted income source '{name}' with ID {id}: {} paid {} from {}",
            args.salary, args.frequency, args.first_pay_date
        ),
        id,
    ))
}

/// Adds a deduction to an income source and returns its ID. Net amounts that were already
/// computed are not changed; run `budget settle --pay-period ID` to recompute one.
///
/// # Errors
/// - `ErrorType::Input` if the amount is negative or the name is blank.
/// - `ErrorType::Constraint` if the income source does not exist.
pub async fn insert_deduction(config: Config, args: InsertDeductionArgs) -> Result<Out<i64>> {
    let name = required(&args.name, "Deduction name").pub_result(ErrorType::Input)?;
    if args.amount.is_sign_negative() {
        return Err(input(format!(
            "Deduction amount cannot be negative: {}",
            args.amount
        )))
        .pub_result(ErrorType::Input);
    }
    let deduction = NewDeduction {
        income_source_id: args.income_source,
        name: name.to_string(),
        kind: args.kind,
        amount: args.amount,
        pre_tax: args.pre_tax,
    };
    let id = config
        .db()
        .insert_deduction(&deduction)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!(
            "Inserted deduction '{name}' with ID {id} for income source {}",
            args.income_source
        ),
        id,
    ))
}

/// Plans the spend for a category in a month, replacing an existing plan for the same category
/// and month. Returns the ID of the plan.
///
/// # Errors
/// - `ErrorType::NotFound` if no expense category has the given name.
pub async fn insert_expense(config: Config, args: InsertExpenseArgs) -> Result<Out<i64>> {
    let category_id = category_id(config.db(), &args.category)
        .await
        .pub_result(ErrorType::Database)?;
    let expense = NewMonthlyExpense {
        category_id,
        year: args.year,
        month: args.month,
        planned: args.amount,
        notes: args.notes,
    };
    let id = config
        .db()
        .upsert_monthly_expense(&expense)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!(
            "Planned {} for {} in {}-{:02}",
            expense.planned, args.category, expense.year, expense.month
        ),
        id,
    ))
}

/// Adds a savings goal and returns its ID.
pub async fn insert_goal(config: Config, args: InsertGoalArgs) -> Result<Out<i64>> {
    let name = required(&args.name, "Goal name").pub_result(ErrorType::Input)?;
    let goal = NewSavingsGoal {
        name: name.to_string(),
        target: args.target,
        current: args.current.unwrap_or(Amount::ZERO),
        target_date: args.target_date,
        notes: args.notes,
    };
    let id = config
        .db()
        .insert_goal(&goal)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!("Inserted savings goal '{name}' with ID {id}"),
        id,
    ))
}

fn required<'a>(value: &'a str, what: &str) -> Res<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(input(format!("{what} cannot be blank")));
    }
    Ok(value)
}

/// Finds an expense category by name, ignoring case.
async fn category_id(db: &Db, name: &str) -> Res<i64> {
    let wanted = name.trim();
    db.categories()
        .await?
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(wanted))
        .map(|c| c.id())
        .ok_or_else(|| not_found(format!("Expense category '{wanted}' not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalculationKind, PayFrequency};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn money(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn income_source_args(user: i64) -> InsertIncomeSourceArgs {
        InsertIncomeSourceArgs {
            user,
            name: "Day Job".into(),
            salary: money("52000"),
            frequency: PayFrequency::BiWeekly,
            first_pay_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_user_and_income_source() {
        let env = TestEnv::new().await;
        let user = insert_user(
            env.config(),
            InsertUserArgs {
                name: " Alex ".into(),
            },
        )
        .await
        .unwrap();
        let user_id = *user.structure().unwrap();
        assert!(user.message().contains("'Alex'"));

        let out = insert_income_source(env.config(), income_source_args(user_id))
            .await
            .unwrap();
        assert!(out.message().contains("$52,000.00 paid bi-weekly"));
        let sources = env.db().income_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].user_id(), user_id);
    }

    #[tokio::test]
    async fn test_insert_income_source_unknown_user() {
        let env = TestEnv::new().await;
        let err = insert_income_source(env.config(), income_source_args(99))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Constraint);
    }

    #[tokio::test]
    async fn test_insert_blank_user_name() {
        let env = TestEnv::new().await;
        let err = insert_user(env.config(), InsertUserArgs { name: "  ".into() })
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Input);
    }

    #[tokio::test]
    async fn test_insert_deduction() {
        let env = TestEnv::new().await;
        let id = env
            .insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05")
            .await;
        let args = InsertDeductionArgs {
            income_source: id,
            name: "Health Insurance".into(),
            kind: CalculationKind::FixedPerPaycheck,
            amount: Decimal::from_str("125.50").unwrap(),
            pre_tax: true,
        };
        insert_deduction(env.config(), args.clone()).await.unwrap();
        let deductions = env.db().deductions(id).await.unwrap();
        assert_eq!(deductions.len(), 1);
        assert!(deductions[0].is_pre_tax());
        assert_eq!(deductions[0].amount(), Decimal::from_str("125.50").unwrap());

        let negative = InsertDeductionArgs {
            amount: Decimal::from(-5),
            ..args.clone()
        };
        let err = insert_deduction(env.config(), negative).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Input);

        let orphan = InsertDeductionArgs {
            income_source: id + 10,
            ..args
        };
        let err = insert_deduction(env.config(), orphan).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Constraint);
    }

    #[tokio::test]
    async fn test_insert_expense_by_category_name() {
        let env = TestEnv::new().await;
        let args = InsertExpenseArgs {
            category: "groceries".into(),
            year: 2024,
            month: 5,
            amount: money("640"),
            notes: Some("two stores".into()),
        };
        insert_expense(env.config(), args).await.unwrap();

        let expenses = env.db().monthly_expenses(2024, 5).await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].category(), "Groceries");
        assert_eq!(expenses[0].notes(), Some("two stores"));
    }

    #[tokio::test]
    async fn test_insert_expense_unknown_category() {
        let env = TestEnv::new().await;
        let args = InsertExpenseArgs {
            category: "Yachts".into(),
            year: 2024,
            month: 5,
            amount: money("1"),
            notes: None,
        };
        let err = insert_expense(env.config(), args).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Yachts"));
    }

    #[tokio::test]
    async fn test_insert_goal_defaults_current_to_zero() {
        let env = TestEnv::new().await;
        let args = InsertGoalArgs {
            name: "Emergency Fund".into(),
            target: money("10000"),
            current: None,
            target_date: None,
            notes: None,
        };
        insert_goal(env.config(), args).await.unwrap();
        let goals = env.db().goals(false).await.unwrap();
        assert_eq!(goals.len(), 1);
        assert!(goals[0].current().is_zero());
    }
}
