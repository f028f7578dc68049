//! Pay period generation.
//!
//! A `PaySchedule` walks forward from an income source's anchor date producing pay dates according
//! to its `PayFrequency`. `generate_pay_periods` turns the dates inside a window into pay periods
//! and stores the ones that do not exist yet.
//!
//! Semi-monthly schedules only look at whether the current day is the 1st: the 1st is followed by
//! the 15th of the same month, and any other day is followed by the 1st of the next month. An
//! anchor on the 10th therefore produces the 10th, then the 1st and 15th of the following months.

use crate::error::{not_found, ErrorType, IntoResult, Res};
use crate::model::{NewPayPeriod, PayFrequency};
use crate::store::PayrollStore;
use crate::Result;
use anyhow::Context;
use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::{debug, info};

/// The infinite, ordered sequence of pay dates for a frequency and anchor date.
///
/// The sequence ends early only if the calendar overflows.
#[derive(Debug, Clone)]
pub struct PaySchedule {
    frequency: PayFrequency,
    anchor: NaiveDate,
    /// Number of dates produced so far.
    index: u32,
    next: Option<NaiveDate>,
}

impl PaySchedule {
    pub fn new(frequency: PayFrequency, anchor: NaiveDate) -> Self {
        Self {
            frequency,
            anchor,
            index: 0,
            next: Some(anchor),
        }
    }

    /// Pay dates in the closed window `[start, end]`. An inverted window yields nothing.
    pub fn between(self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        self.take_while(move |date| *date <= end)
            .filter(move |date| *date >= start)
    }

    fn advance(&self, current: NaiveDate) -> Option<NaiveDate> {
        match self.frequency {
            PayFrequency::Weekly => current.checked_add_days(Days::new(7)),
            PayFrequency::BiWeekly => current.checked_add_days(Days::new(14)),
            // Months are counted from the anchor so that a short month (the 31st clamped to the
            // 30th or 28th) does not shift every later date.
            PayFrequency::Monthly => self.anchor.checked_add_months(Months::new(self.index)),
            PayFrequency::SemiMonthly => {
                if current.day() == 1 {
                    current.with_day(15)
                } else {
                    first_of_next_month(current)
                }
            }
        }
    }
}

impl Iterator for PaySchedule {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.index += 1;
        self.next = self.advance(current);
        Some(current)
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.checked_add_months(Months::new(1))
}

/// Generates the pay periods of an income source that fall within `[start, end]` and stores the
/// ones that do not already exist.
///
/// Each period's gross amount is the annual salary divided by the paychecks per year of the
/// income source's frequency. Periods that already exist for the same pay date are left as they
/// are, so running this repeatedly with the same or an overlapping window is safe.
///
/// # Returns
/// The number of newly inserted periods.
///
/// # Errors
/// - `ErrorType::NotFound` if the income source does not exist or is inactive.
/// - `ErrorType::Database` if the store fails.
pub async fn generate_pay_periods<S>(
    store: &S,
    income_source_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u64>
where
    S: PayrollStore + ?Sized,
{
    generate(store, income_source_id, start, end)
        .await
        .pub_result(ErrorType::Database)
}

async fn generate<S>(store: &S, income_source_id: i64, start: NaiveDate, end: NaiveDate) -> Res<u64>
where
    S: PayrollStore + ?Sized,
{
    let source = store
        .income_source(income_source_id)
        .await
        .with_context(|| format!("Unable to load income source {income_source_id}"))?
        .filter(|source| source.is_active())
        .ok_or_else(|| not_found(format!("Income source {income_source_id} not found")))?;

    let gross = source.gross_per_paycheck();
    let periods: Vec<NewPayPeriod> = PaySchedule::new(source.frequency(), source.anchor())
        .between(start, end)
        .map(|pay_date| NewPayPeriod {
            income_source_id,
            pay_date,
            gross,
        })
        .collect();
    debug!(
        "{} {} pay dates for income source {income_source_id} between {start} and {end}",
        periods.len(),
        source.frequency()
    );

    let inserted = store
        .insert_pay_periods(&periods)
        .await
        .context("Unable to store pay periods")?;
    info!("Generated {inserted} pay periods for income source {income_source_id}");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PayFrequency;
    use crate::test::TestEnv;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn dates(frequency: PayFrequency, anchor: &str, count: usize) -> Vec<String> {
        PaySchedule::new(frequency, date(anchor))
            .take(count)
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn test_weekly_and_bi_weekly_are_fixed_intervals() {
        assert_eq!(
            dates(PayFrequency::Weekly, "2024-12-20", 3),
            vec!["2024-12-20", "2024-12-27", "2025-01-03"]
        );
        assert_eq!(
            dates(PayFrequency::BiWeekly, "2024-01-05", 3),
            vec!["2024-01-05", "2024-01-19", "2024-02-02"]
        );
    }

    #[test]
    fn test_monthly_rolls_over_the_year() {
        assert_eq!(
            dates(PayFrequency::Monthly, "2024-11-15", 3),
            vec!["2024-11-15", "2024-12-15", "2025-01-15"]
        );
    }

    #[test]
    fn test_monthly_clamps_short_months_without_drifting() {
        assert_eq!(
            dates(PayFrequency::Monthly, "2024-01-31", 4),
            vec!["2024-01-31", "2024-02-29", "2024-03-31", "2024-04-30"]
        );
    }

    #[test]
    fn test_semi_monthly_alternates_first_and_fifteenth() {
        assert_eq!(
            dates(PayFrequency::SemiMonthly, "2024-12-01", 4),
            vec!["2024-12-01", "2024-12-15", "2025-01-01", "2025-01-15"]
        );
    }

    #[test]
    fn test_semi_monthly_only_checks_for_the_first() {
        // Any anchor day other than the 1st is followed by the 1st of the next month.
        assert_eq!(
            dates(PayFrequency::SemiMonthly, "2024-03-10", 4),
            vec!["2024-03-10", "2024-04-01", "2024-04-15", "2024-05-01"]
        );
    }

    #[test]
    fn test_between_is_inclusive_and_skips_dates_before_start() {
        let got: Vec<NaiveDate> = PaySchedule::new(PayFrequency::Weekly, date("2024-01-05"))
            .between(date("2024-01-12"), date("2024-01-26"))
            .collect();
        assert_eq!(
            got,
            vec![date("2024-01-12"), date("2024-01-19"), date("2024-01-26")]
        );
    }

    #[test]
    fn test_between_inverted_window_is_empty() {
        let got = PaySchedule::new(PayFrequency::Weekly, date("2024-01-05"))
            .between(date("2024-06-01"), date("2024-01-01"))
            .count();
        assert_eq!(got, 0);
    }

    #[test]
    fn test_bi_weekly_full_year_has_26_or_27_dates() {
        for day in 1..=14 {
            let anchor = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            let count = PaySchedule::new(PayFrequency::BiWeekly, anchor)
                .between(date("2024-01-01"), date("2024-12-31"))
                .count();
            assert!((26..=27).contains(&count), "anchor {anchor} gave {count}");
        }
    }

    #[tokio::test]
    async fn test_generate_bi_weekly_year() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;

        let count = generate_pay_periods(env.db(), id, date("2024-01-05"), date("2024-12-31"))
            .await
            .unwrap();
        assert_eq!(count, 26);

        let report = env.db().pay_periods_for_year(id, 2024).await.unwrap();
        assert_eq!(report.periods.len() as u64, count);
        for period in &report.periods {
            assert_eq!(period.gross().to_db(), "2000.00");
            assert!(period.net().is_none());
        }
    }

    #[tokio::test]
    async fn test_generate_monthly_year() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("60000", PayFrequency::Monthly, "2024-01-01").await;

        let count = generate_pay_periods(env.db(), id, date("2024-01-01"), date("2024-12-31"))
            .await
            .unwrap();
        assert_eq!(count, 12);

        let report = env.db().pay_periods_for_year(id, 2024).await.unwrap();
        assert!(report.periods.iter().all(|p| p.gross().to_db() == "5000.00"));
        assert_eq!(report.total_gross.to_db(), "60000.00");
    }

    #[tokio::test]
    async fn test_generate_weekly_january() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::Weekly, "2024-01-05").await;

        let count = generate_pay_periods(env.db(), id, date("2024-01-01"), date("2024-01-31"))
            .await
            .unwrap();
        // 5th, 12th, 19th and 26th
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_generate_single_day_window() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;

        let count = generate_pay_periods(env.db(), id, date("2024-01-05"), date("2024-01-05"))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;
        let (start, end) = (date("2024-01-05"), date("2024-03-31"));

        let first = generate_pay_periods(env.db(), id, start, end).await.unwrap();
        let second = generate_pay_periods(env.db(), id, start, end).await.unwrap();
        assert!(first > 0);
        assert_eq!(second, 0);

        let report = env.db().pay_periods_for_year(id, 2024).await.unwrap();
        assert_eq!(report.periods.len() as u64, first);
    }

    #[tokio::test]
    async fn test_generate_overlapping_window_only_adds_new_dates() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;

        let first = generate_pay_periods(env.db(), id, date("2024-01-01"), date("2024-02-29"))
            .await
            .unwrap();
        let second = generate_pay_periods(env.db(), id, date("2024-02-01"), date("2024-03-31"))
            .await
            .unwrap();
        // Jan 5, 19, Feb 2, 16 then Mar 1, 15, 29
        assert_eq!(first, 4);
        assert_eq!(second, 3);
    }

    #[tokio::test]
    async fn test_generate_does_not_overwrite_existing_periods() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;
        generate_pay_periods(env.db(), id, date("2024-01-05"), date("2024-01-05"))
            .await
            .unwrap();
        let period = env.db().pay_periods_for_year(id, 2024).await.unwrap().periods[0].clone();

        env.db()
            .set_net_amount(period.id(), "1234.56".parse().unwrap())
            .await
            .unwrap();
        generate_pay_periods(env.db(), id, date("2024-01-01"), date("2024-01-31"))
            .await
            .unwrap();

        let again = env.db().pay_period(period.id()).await.unwrap().unwrap();
        assert_eq!(again.net().unwrap().to_db(), "1234.56");
    }

    #[tokio::test]
    async fn test_generate_inverted_window_is_zero() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;

        let count = generate_pay_periods(env.db(), id, date("2024-12-31"), date("2024-01-01"))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_generate_missing_income_source() {
        let env = TestEnv::new().await;
        let err = generate_pay_periods(env.db(), 999, date("2024-01-01"), date("2024-12-31"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Income source 999 not found"));
    }

    #[tokio::test]
    async fn test_generate_inactive_income_source_is_not_found() {
        let env = TestEnv::new().await;
        let id = env.insert_income_source("52000", PayFrequency::BiWeekly, "2024-01-05").await;
        env.db().set_income_source_active(id, false).await.unwrap();

        let err = generate_pay_periods(env.db(), id, date("2024-01-01"), date("2024-12-31"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
