// 💰 Fee schedule extraction - the three fee tabs share one pipeline
//
// Line items → FeeGroups → periods → zero-filter. Degree and non-degree expand
// over one location, partnerships over home and foreign legs.

use crate::fees::{aggregate, expand_all, retain_billable, ExpansionMode, FeePeriod};
use crate::source::{CourseSource, FeeLineItem, FeeScope};
use anyhow::Result;
use tracing::debug;

pub fn expansion_mode(scope: FeeScope) -> ExpansionMode {
    match scope {
        FeeScope::Degree | FeeScope::NonDegree => ExpansionMode::SingleLocation,
        FeeScope::Partnership => ExpansionMode::Partnership,
    }
}

/// Run the fee pipeline over already-fetched line items
pub fn fee_schedule(items: &[FeeLineItem], mode: ExpansionMode) -> Vec<FeePeriod> {
    let groups = aggregate(items);
    let periods = expand_all(&groups, mode);
    let expanded = periods.len();
    let kept = retain_billable(periods);

    debug!(
        line_items = items.len(),
        groups = groups.len(),
        expanded,
        kept = kept.len(),
        "Fee schedule built"
    );
    kept
}

pub fn fee_rows(
    source: &dyn CourseSource,
    university_id: &str,
    scope: FeeScope,
) -> Result<Vec<Vec<String>>> {
    let items = source.fee_line_items(university_id, scope)?;
    let periods = fee_schedule(&items, expansion_mode(scope));
    Ok(periods.iter().map(FeePeriod::to_row).collect())
}
