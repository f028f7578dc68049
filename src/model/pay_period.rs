use crate::model::Amount;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One paycheck of an income source.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PayPeriod {
    pub(crate) id: i64,
    pub(crate) income_source_id: i64,
    pub(crate) pay_date: NaiveDate,
    /// Fixed when the period is generated.
    pub(crate) gross: Amount,
    /// `None` until the period has been settled.
    pub(crate) net: Option<Amount>,
    pub(crate) notes: Option<String>,
}

impl PayPeriod {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn income_source_id(&self) -> i64 {
        self.income_source_id
    }

    pub fn pay_date(&self) -> NaiveDate {
        self.pay_date
    }

    pub fn gross(&self) -> Amount {
        self.gross
    }

    pub fn net(&self) -> Option<Amount> {
        self.net
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn year(&self) -> i32 {
        self.pay_date.year()
    }
}

/// A period produced by the schedule generator that has not been stored yet.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewPayPeriod {
    pub income_source_id: i64,
    pub pay_date: NaiveDate,
    pub gross: Amount,
}

impl NewPayPeriod {
    /// The year column is denormalized from the pay date.
    pub fn year(&self) -> i32 {
        self.pay_date.year()
    }
}

/// Pay periods of one income source within a year, with their totals.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub income_source_id: i64,
    pub year: i32,
    pub periods: Vec<PayPeriod>,
    pub total_gross: Amount,
    /// Sum of the settled net amounts; unsettled periods are skipped.
    pub total_net: Amount,
}

impl PeriodReport {
    /// Returns `None` if either total overflows.
    pub fn new(income_source_id: i64, year: i32, periods: Vec<PayPeriod>) -> Option<Self> {
        let total_gross = Amount::checked_sum(periods.iter().map(PayPeriod::gross))?;
        let total_net = Amount::checked_sum(periods.iter().filter_map(PayPeriod::net))?;
        Some(Self {
            income_source_id,
            year,
            periods,
            total_gross,
            total_net,
        })
    }
}
