//! Pay period generation, net pay settlement and the yearly pay period report.

use crate::args::{GenerateArgs, PeriodsArgs, SettleArgs};
use crate::commands::{count_of, listing, Out};
use crate::error::{not_found, ErrorType, IntoResult};
use crate::model::{PayPeriod, PeriodReport};
use crate::schedule::generate_pay_periods;
use crate::settle::{self, Selector};
use crate::store::PayrollStore;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};

/// The outcome of `budget generate`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Generated {
    /// Pay periods that did not exist before.
    pub inserted: u64,
    /// Pay periods whose net amount was computed afterwards.
    pub settled: u64,
}

/// Generates the pay periods of an income source between `args.start` and `args.end` (inclusive)
/// and then computes net pay for every pay period that does not have it yet.
///
/// Pay periods that already exist are left alone, so the command can be re-run safely.
///
/// Settling is not limited to `args.income_source`: unresolved periods of every income source are
/// settled. The new periods are committed before settling starts, so an error while settling
/// leaves them in place without a net amount and a later `budget settle` picks them up.
///
/// # Errors
/// - `ErrorType::NotFound` if the income source does not exist or is inactive.
/// - Any error from settling, including one caused by another income source's deductions.
pub async fn generate(config: Config, args: GenerateArgs) -> Result<Out<Generated>> {
    let inserted =
        generate_pay_periods(config.db(), args.income_source, args.start, args.end).await?;
    let settled = settle::settle(config.db(), Selector::Unresolved).await?;
    let message = format!(
        "Generated {} for income source {} and calculated net pay for {}",
        count_of(inserted, "new pay period", "new pay periods"),
        args.income_source,
        count_of(settled, "pay period", "pay periods"),
    );
    Ok(Out::new(message, Generated { inserted, settled }))
}

/// Computes net pay for `args.pay_period`, or for all pay periods without a net amount.
pub async fn settle(config: Config, args: SettleArgs) -> Result<Out<u64>> {
    let selector = Selector::from(args.pay_period);
    let count = settle::settle(config.db(), selector).await?;
    let message = match selector {
        Selector::Period(id) => format!("Calculated net pay for pay period {id}"),
        Selector::Unresolved => format!(
            "Calculated net pay for {}",
            count_of(count, "unresolved pay period", "unresolved pay periods")
        ),
    };
    Ok(Out::new(message, count))
}

/// Lists the pay periods of an income source with pay dates in `args.year`, with totals.
///
/// # Errors
/// - `ErrorType::NotFound` if the income source does not exist.
pub async fn periods(config: Config, args: PeriodsArgs) -> Result<Out<PeriodReport>> {
    let id = args.income_source;
    let source = config
        .db()
        .income_source(id)
        .await
        .pub_result(ErrorType::Database)?;
    if source.is_none() {
        return Err(not_found(format!("Income source {id} not found")))
            .pub_result(ErrorType::NotFound);
    }

    let report = config
        .db()
        .pay_periods_for_year(id, args.year)
        .await
        .pub_result(ErrorType::Database)?;

    let body = listing(
        &format!("Pay periods of income source {id} in {}:", args.year),
        report.periods.iter().map(period_line),
        &format!("No pay periods for income source {id} in {}", args.year),
    );
    let message = format!(
        "{body}\n{}, total gross {}, total net {}",
        count_of(report.periods.len() as u64, "pay period", "pay periods"),
        report.total_gross,
        report.total_net
    );
    Ok(Out::new(message, report))
}

fn period_line(period: &PayPeriod) -> String {
    let net = period
        .net()
        .map(|net| net.to_string())
        .unwrap_or_else(|| "not calculated".to_string());
    format!(
        "  #{:<5} {}  gross {:>12}  net {:>14}",
        period.id(),
        period.pay_date(),
        period.gross().to_string(),
        net
    )
}
