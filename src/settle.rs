//! Net pay calculation.
//!
//! Every active deduction of an income source is turned into a per-paycheck amount and added to
//! either the pre-tax or the post-tax total. Net pay is gross minus both totals.
//!
//! Known simplifications:
//! - Percentage deductions always apply to the gross amount. A post-tax percentage does not see
//!   the reduction made by pre-tax deductions, unlike real payroll taxes which are computed on
//!   taxable income.
//! - Net pay is not floored at zero. Deductions larger than gross produce a negative net amount.

use crate::error::{logic, not_found, ErrorType, IntoResult, Res};
use crate::model::{Amount, CalculationKind, Deduction, PayFrequency, PayPeriod};
use crate::store::PayrollStore;
use crate::Result;
use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Which pay periods to settle.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// A single pay period, whether or not it already has a net amount.
    Period(i64),
    /// Every pay period without a net amount.
    Unresolved,
}

impl From<Option<i64>> for Selector {
    fn from(value: Option<i64>) -> Self {
        value.map(Selector::Period).unwrap_or(Selector::Unresolved)
    }
}

/// The result of applying deductions to one paycheck.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetPay {
    pub gross: Amount,
    pub pre_tax: Amount,
    pub post_tax: Amount,
    /// Rounded to cents.
    pub net: Amount,
}

/// The amount a single deduction takes from one paycheck with the given gross pay.
///
/// # Errors
/// `ErrorType::Logic` if the amount does not fit in a `Decimal`.
pub fn deduction_amount(
    deduction: &Deduction,
    gross: Amount,
    frequency: PayFrequency,
) -> Res<Amount> {
    let amount = deduction.amount();
    let value = match deduction.kind() {
        CalculationKind::Percentage => gross
            .value()
            .checked_mul(amount)
            .map(|v| v / Decimal::ONE_HUNDRED),
        CalculationKind::FixedPerPaycheck => Some(amount),
        CalculationKind::FixedAnnual => {
            amount.checked_div(Decimal::from(frequency.paychecks_per_year()))
        }
    };
    value.map(Amount::new).ok_or_else(|| {
        logic(format!(
            "Deduction '{}' of {} overflows on a gross of {gross}",
            deduction.name(),
            deduction.describe()
        ))
    })
}

/// Applies the active deductions to `gross`. Inactive deductions are ignored and the order of
/// `deductions` does not matter.
///
/// # Errors
/// `ErrorType::Logic` if a deduction or one of the totals does not fit in a `Decimal`.
pub fn net_pay(gross: Amount, frequency: PayFrequency, deductions: &[Deduction]) -> Res<NetPay> {
    let overflow = || logic(format!("Deductions on a gross of {gross} overflow"));
    let mut pre_tax = Amount::ZERO;
    let mut post_tax = Amount::ZERO;
    for d in deductions.iter().filter(|d| d.is_active()) {
        let amount = deduction_amount(d, gross, frequency)?;
        let total = if d.is_pre_tax() {
            &mut pre_tax
        } else {
            &mut post_tax
        };
        *total = total.checked_add(amount).ok_or_else(overflow)?;
    }
    let net = gross
        .checked_sub(pre_tax)
        .and_then(|n| n.checked_sub(post_tax))
        .ok_or_else(overflow)?;
    Ok(NetPay {
        gross,
        pre_tax,
        post_tax,
        net: net.round_cents(),
    })
}

/// Computes and stores the net amount of the pay periods chosen by `selector`.
///
/// # Returns
/// The number of periods processed.
///
/// # Errors
/// - `ErrorType::NotFound` if `Selector::Period` names a period that does not exist, or a period's
///   income source is missing.
/// - `ErrorType::Logic` if the store holds a deduction kind or pay frequency that is not known,
///   or if the deductions of a period overflow.
/// - `ErrorType::Database` if the store fails.
pub async fn settle<S>(store: &S, selector: Selector) -> Result<u64>
where
    S: PayrollStore + ?Sized,
{
    settle_periods(store, selector)
        .await
        .pub_result(ErrorType::Database)
}

/// Computes net pay for one pay period, or for all unresolved periods when `pay_period_id` is
/// `None`.
pub async fn calculate_net_pay<S>(store: &S, pay_period_id: Option<i64>) -> Result<u64>
where
    S: PayrollStore + ?Sized,
{
    settle(store, pay_period_id.into()).await
}

async fn settle_periods<S>(store: &S, selector: Selector) -> Res<u64>
where
    S: PayrollStore + ?Sized,
{
    let periods = match selector {
        Selector::Period(id) => {
            let period = store
                .pay_period(id)
                .await
                .with_context(|| format!("Unable to load pay period {id}"))?
                .ok_or_else(|| not_found(format!("Pay period {id} not found")))?;
            vec![period]
        }
        Selector::Unresolved => store
            .unresolved_pay_periods()
            .await
            .context("Unable to load unresolved pay periods")?,
    };

    for period in &periods {
        settle_one(store, period).await?;
    }

    let count = periods.len() as u64;
    info!("Calculated net pay for {count} pay periods");
    Ok(count)
}

async fn settle_one<S>(store: &S, period: &PayPeriod) -> Res<()>
where
    S: PayrollStore + ?Sized,
{
    let source_id = period.income_source_id();
    let source = store
        .income_source(source_id)
        .await
        .with_context(|| format!("Unable to load income source {source_id}"))?
        .ok_or_else(|| {
            not_found(format!(
                "Income source {source_id} of pay period {} not found",
                period.id()
            ))
        })?;
    let deductions = store
        .active_deductions(source_id)
        .await
        .with_context(|| format!("Unable to load deductions of income source {source_id}"))?;

    let pay = net_pay(period.gross(), source.frequency(), &deductions)
        .with_context(|| format!("Unable to calculate net pay for pay period {}", period.id()))?;
    debug!(
        "Pay period {} on {}: gross {}, pre-tax {}, post-tax {}, net {}",
        period.id(),
        period.pay_date(),
        pay.gross,
        pay.pre_tax,
        pay.post_tax,
        pay.net
    );
    if pay.net.is_negative() {
        warn!(
            "Deductions exceed gross pay for pay period {} on {}; net is {}",
            period.id(),
            period.pay_date(),
            pay.net
        );
    }

    store
        .set_net_amount(period.id(), pay.net)
        .await
        .with_context(|| format!("Unable to store net pay for pay period {}", period.id()))
}
