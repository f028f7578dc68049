use serde::{Deserialize, Serialize};

/// The cadence at which an income source issues paychecks.
///
/// The text forms (`weekly`, `bi-weekly`, `semi-monthly`, `monthly`) are the values stored in the
/// `income_sources.pay_frequency` column and accepted on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayFrequency {
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    BiWeekly,
    /// On the 1st and 15th of each month.
    SemiMonthly,
    /// Once per month on the anchor's day of month.
    Monthly,
}

serde_plain::derive_display_from_serialize!(PayFrequency);
serde_plain::derive_fromstr_from_deserialize!(PayFrequency);

impl PayFrequency {
    pub const ALL: [PayFrequency; 4] = [
        PayFrequency::Weekly,
        PayFrequency::BiWeekly,
        PayFrequency::SemiMonthly,
        PayFrequency::Monthly,
    ];

    /// The divisor used to turn annual figures (salary, annual deductions) into per-paycheck ones.
    pub const fn paychecks_per_year(self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::BiWeekly => 26,
            PayFrequency::SemiMonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }
}
