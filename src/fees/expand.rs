// ⏱️ Period Expander - turns one FeeGroup into its billing periods
//
// Single-location schedules (degree, non-degree) walk BEGIN → ... → FINAL over
// the course duration. Partnership schedules add a TRANSFER to a foreign leg
// covering the partner duration. One-off fee kinds never get split.

use crate::fees::aggregate::{FeeGroup, FeeGroups};
use crate::fees::kind::FeeKind;
use crate::fees::period::{FeeColumns, FeePeriod, Location, NodeMarker, PeriodMarker};
use crate::source::PartnerTerms;
use crate::text::html_to_text;
use tracing::warn;

// ============================================================================
// DURATION SHAPE
// ============================================================================

/// Longest course or partner stay that still gets period slots
pub const MAX_DURATION_YEARS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationShape {
    /// Whole number of years, at least one
    Whole(u32),

    /// e.g. 3.5 years → whole_years 3, fraction 0.5
    Fractional { whole_years: u32, fraction: f64 },

    /// Missing, non-numeric, non-positive or above `MAX_DURATION_YEARS`
    Unknown,
}

impl DurationShape {
    pub fn classify(years: Option<f64>) -> Self {
        match years {
            Some(y) if y.is_finite() && y > 0.0 && y <= MAX_DURATION_YEARS => {
                if y.fract() == 0.0 {
                    DurationShape::Whole(y as u32)
                } else {
                    DurationShape::Fractional {
                        whole_years: y.floor() as u32,
                        fraction: y.fract(),
                    }
                }
            }
            _ => DurationShape::Unknown,
        }
    }

    pub fn years(&self) -> f64 {
        match *self {
            DurationShape::Whole(n) => n as f64,
            DurationShape::Fractional { whole_years, fraction } => whole_years as f64 + fraction,
            DurationShape::Unknown => 0.0,
        }
    }

    /// `(duration mod 1) + 1`: the last whole year billed together with the remainder
    pub fn remainder_fraction(&self) -> f64 {
        match *self {
            DurationShape::Fractional { fraction, .. } => fraction + 1.0,
            _ => 0.0,
        }
    }

    /// Length of the trailing period. Under one year there is no whole year to absorb.
    fn trailing_span(&self) -> f64 {
        match *self {
            DurationShape::Fractional { whole_years: 0, fraction } => fraction,
            DurationShape::Fractional { fraction, .. } => fraction + 1.0,
            _ => 0.0,
        }
    }
}

// ============================================================================
// EXPANSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionMode {
    SingleLocation,
    Partnership,
}

/// Expand every group in order; rows of one group stay contiguous
pub fn expand_all(groups: &FeeGroups, mode: ExpansionMode) -> Vec<FeePeriod> {
    groups.iter().flat_map(|group| expand(group, mode)).collect()
}

pub fn expand(group: &FeeGroup, mode: ExpansionMode) -> Vec<FeePeriod> {
    match mode {
        ExpansionMode::SingleLocation => expand_single(group),
        ExpansionMode::Partnership => expand_partnership(group),
    }
}

/// Degree / non-degree: one location, course duration only
pub fn expand_single(group: &FeeGroup) -> Vec<FeePeriod> {
    if !group.fee_kind.is_periodic() {
        return vec![one_off(group)];
    }

    let shape = DurationShape::classify(group.course_duration_years);

    match shape {
        DurationShape::Whole(n) => {
            let years = n as f64;
            vec![FeePeriod {
                period_start: PeriodMarker::Period(1),
                period_end: PeriodMarker::Period(n),
                period_duration: 1.0,
                previous_node: NodeMarker::Begin,
                next_node: NodeMarker::Final,
                local: local_columns(group, group.local_amount / years),
                international: intl_columns(group, group.intl_amount / years),
                ..base_row(group)
            }]
        }
        DurationShape::Fractional { whole_years, .. } => {
            let years = shape.years();
            let local_rate = group.local_amount / years;
            let intl_rate = group.intl_amount / years;
            let span = shape.trailing_span();

            let mut rows = Vec::with_capacity(2);

            if whole_years >= 2 {
                rows.push(FeePeriod {
                    period_start: PeriodMarker::Period(1),
                    period_end: PeriodMarker::Period(whole_years - 1),
                    period_duration: 1.0,
                    previous_node: NodeMarker::Begin,
                    next_node: NodeMarker::Continue,
                    local: local_columns(group, local_rate),
                    international: intl_columns(group, intl_rate),
                    ..base_row(group)
                });
            }

            let slot = whole_years.max(1);
            let previous = if whole_years >= 2 {
                NodeMarker::Period(whole_years - 1)
            } else {
                NodeMarker::Begin
            };

            rows.push(FeePeriod {
                period_start: PeriodMarker::Period(slot),
                period_end: PeriodMarker::Period(slot),
                period_duration: span,
                previous_node: previous,
                next_node: NodeMarker::Final,
                local: local_columns(group, local_rate * span),
                international: intl_columns(group, intl_rate * span),
                ..base_row(group)
            });

            rows
        }
        DurationShape::Unknown => vec![FeePeriod {
            period_start: PeriodMarker::Period(1),
            period_end: PeriodMarker::Period(1),
            period_duration: 0.0,
            previous_node: NodeMarker::Begin,
            next_node: NodeMarker::Final,
            local: local_columns(group, 0.0),
            international: intl_columns(group, 0.0),
            ..base_row(group)
        }],
    }
}

/// Partnership: local years at home, then partner years abroad
pub fn expand_partnership(group: &FeeGroup) -> Vec<FeePeriod> {
    let Some(partner) = group.partner.as_ref() else {
        return expand_single(group);
    };

    let local = DurationShape::classify(group.course_duration_years);
    let remote = DurationShape::classify(partner.duration_years);

    match (local, remote) {
        (DurationShape::Whole(n), DurationShape::Whole(m)) => {
            if !group.fee_kind.is_periodic() {
                return vec![one_off(group)];
            }

            let partner_fee = partner_fee(partner);
            vec![
                home_leg(group, n),
                foreign_leg(
                    group,
                    partner,
                    n,
                    LegSpan {
                        start: n + 1,
                        end: n + m,
                        duration: 1.0,
                        previous: NodeMarker::Period(n),
                        next: NodeMarker::Final,
                    },
                    partner_fee / m as f64,
                ),
            ]
        }
        (DurationShape::Whole(n), DurationShape::Fractional { whole_years, .. }) => {
            match group.fee_kind {
                FeeKind::TuitionFee => {}
                // Only tuition is split across a fractional partner stay
                FeeKind::OtherFee => return Vec::new(),
                _ => return vec![one_off(group)],
            }

            let partner_fee = partner_fee(partner);
            let total = n + whole_years;
            let mut rows = vec![home_leg(group, n)];

            if whole_years >= 2 {
                rows.push(foreign_leg(
                    group,
                    partner,
                    n,
                    LegSpan {
                        start: n + 1,
                        end: total - 1,
                        duration: 1.0,
                        previous: NodeMarker::Period(n),
                        next: NodeMarker::Continue,
                    },
                    partner_fee / whole_years as f64,
                ));
            }

            let slot = total.max(n + 1);
            let previous = if whole_years >= 2 {
                NodeMarker::Period(total - 1)
            } else {
                NodeMarker::Period(n)
            };

            rows.push(foreign_leg(
                group,
                partner,
                n,
                LegSpan {
                    start: slot,
                    end: slot,
                    duration: remote.trailing_span(),
                    previous,
                    next: NodeMarker::Final,
                },
                partner_fee / remote.remainder_fraction(),
            ));

            rows
        }
        _ => {
            warn!(
                course_id = %group.course_id,
                fee_type = %group.fee_kind,
                local_years = ?group.course_duration_years,
                partner_years = ?partner.duration_years,
                "No partnership split for this duration pair, expanding as a single location"
            );
            expand_single(group)
        }
    }
}

// ============================================================================
// ROW BUILDERS
// ============================================================================

struct LegSpan {
    start: u32,
    end: u32,
    duration: f64,
    previous: NodeMarker,
    next: NodeMarker,
}

fn base_row(group: &FeeGroup) -> FeePeriod {
    FeePeriod {
        course_id: group.course_id.clone(),
        university_name: group.university_name.clone(),
        course_name: group.course_name.clone(),
        fee_kind_label: group.fee_kind.label().to_string(),
        fee_name: group.fee_name.clone(),
        period_start: PeriodMarker::NotApplicable,
        period_end: PeriodMarker::NotApplicable,
        period_duration: 0.0,
        previous_node: NodeMarker::NotApplicable,
        next_node: NodeMarker::NotApplicable,
        location: Location::Unspecified,
        foreign_campus: String::new(),
        local: local_columns(group, group.local_amount),
        international: intl_columns(group, group.intl_amount),
    }
}

/// Registration fees, other costs and unmapped kinds: raw amounts, no periods
fn one_off(group: &FeeGroup) -> FeePeriod {
    base_row(group)
}

fn home_leg(group: &FeeGroup, local_years: u32) -> FeePeriod {
    let years = local_years as f64;
    FeePeriod {
        period_start: PeriodMarker::Period(1),
        period_end: PeriodMarker::Period(local_years),
        period_duration: 1.0,
        previous_node: NodeMarker::Begin,
        next_node: NodeMarker::Transfer,
        location: Location::Home,
        local: local_columns(group, group.local_amount / years),
        international: intl_columns(group, group.intl_amount / years),
        ..base_row(group)
    }
}

/// Foreign legs bill the partner fee; international columns keep the home rate
fn foreign_leg(
    group: &FeeGroup,
    partner: &PartnerTerms,
    local_years: u32,
    span: LegSpan,
    amount: f64,
) -> FeePeriod {
    // Courses without a partner description reuse the home one
    let description = partner
        .fee_description
        .as_deref()
        .map(html_to_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| group.local_description());

    FeePeriod {
        period_start: PeriodMarker::Period(span.start),
        period_end: PeriodMarker::Period(span.end),
        period_duration: span.duration,
        previous_node: span.previous,
        next_node: span.next,
        location: Location::Foreign,
        foreign_campus: partner.campus.clone(),
        local: FeeColumns::new(&partner.currency, amount, description),
        international: intl_columns(group, group.intl_amount / local_years as f64),
        ..base_row(group)
    }
}

fn local_columns(group: &FeeGroup, amount: f64) -> FeeColumns {
    FeeColumns::new(&group.local_currency, amount, group.local_description())
}

fn intl_columns(group: &FeeGroup, amount: f64) -> FeeColumns {
    FeeColumns::new(&group.intl_currency, amount, group.intl_description())
}

fn partner_fee(partner: &PartnerTerms) -> f64 {
    partner.fee_amount.filter(|a| a.is_finite()).unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================
