// 🧹 Zero-filter - drop periods with nothing to bill and nothing to read

use crate::fees::period::FeePeriod;

/// Keep rows where either side carries an amount or a description
pub fn retain_billable(mut periods: Vec<FeePeriod>) -> Vec<FeePeriod> {
    periods.retain(|period| !period.is_empty_charge());
    periods
}
