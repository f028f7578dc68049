use crate::model::{Amount, PayFrequency};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A person in the household. Income sources belong to users.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) active: bool,
}

impl User {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A job or other salaried income belonging to a user.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) name: String,
    pub(crate) annual_salary: Amount,
    pub(crate) frequency: PayFrequency,
    /// The first (or next) pay date. Schedules are walked forward from here.
    pub(crate) anchor: NaiveDate,
    pub(crate) active: bool,
}

impl IncomeSource {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annual_salary(&self) -> Amount {
        self.annual_salary
    }

    pub fn frequency(&self) -> PayFrequency {
        self.frequency
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Annual salary divided by the paychecks per year of the frequency, rounded to cents.
    pub fn gross_per_paycheck(&self) -> Amount {
        let per_year = Decimal::from(self.frequency.paychecks_per_year());
        Amount::new(self.annual_salary.value() / per_year).round_cents()
    }
}

/// The fields needed to insert an income source.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewIncomeSource {
    pub user_id: i64,
    pub name: String,
    pub annual_salary: Amount,
    pub frequency: PayFrequency,
    pub anchor: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn source(salary: &str, frequency: PayFrequency) -> IncomeSource {
        IncomeSource {
            id: 1,
            user_id: 1,
            name: "Main Job".into(),
            annual_salary: Amount::from_str(salary).unwrap(),
            frequency,
            anchor: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            active: true,
        }
    }

    #[test]
    fn test_gross_per_paycheck() {
        let gross = source("52000", PayFrequency::BiWeekly).gross_per_paycheck();
        assert_eq!(gross.to_db(), "2000.00");
        let gross = source("60000", PayFrequency::Monthly).gross_per_paycheck();
        assert_eq!(gross.to_db(), "5000.00");
        let gross = source("50000", PayFrequency::Weekly).gross_per_paycheck();
        assert_eq!(gross.to_db(), "961.54");
    }
}
