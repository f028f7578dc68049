use crate::model::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the `amount` of a deduction is interpreted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// `amount` is a percentage of the gross pay of each paycheck.
    Percentage,
    /// `amount` is taken from every paycheck as-is.
    FixedPerPaycheck,
    /// `amount` is a yearly total spread evenly over the paychecks of a year.
    FixedAnnual,
}

serde_plain::derive_display_from_serialize!(CalculationKind);
serde_plain::derive_fromstr_from_deserialize!(CalculationKind);

/// A paycheck deduction belonging to one income source.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Deduction {
    pub(crate) id: i64,
    pub(crate) income_source_id: i64,
    pub(crate) name: String,
    pub(crate) kind: CalculationKind,
    /// A percentage for `Percentage`, otherwise a currency amount.
    pub(crate) amount: Decimal,
    pub(crate) pre_tax: bool,
    pub(crate) active: bool,
}

impl Deduction {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn income_source_id(&self) -> i64 {
        self.income_source_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CalculationKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_pre_tax(&self) -> bool {
        self.pre_tax
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// A short human readable description such as `10% pre-tax` or `$200.00/paycheck`.
    pub fn describe(&self) -> String {
        let value = match self.kind {
            CalculationKind::Percentage => format!("{}%", self.amount.normalize()),
            CalculationKind::FixedPerPaycheck => format!("{}/paycheck", Amount::new(self.amount)),
            CalculationKind::FixedAnnual => format!("{}/year", Amount::new(self.amount)),
        };
        let tax = if self.pre_tax { "pre-tax" } else { "post-tax" };
        let active = if self.active { "" } else { " (inactive)" };
        format!("{value} {tax}{active}")
    }
}

/// The fields needed to insert a deduction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewDeduction {
    pub income_source_id: i64,
    pub name: String,
    pub kind: CalculationKind,
    pub amount: Decimal,
    pub pre_tax: bool,
}
