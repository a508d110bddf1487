// 📅 Fee Period - one normalized billing span, the output row of fee schedules

use serde::{Serialize, Serializer};
use std::fmt;

/// Fixed header of every fee-schedule tab
pub const FEE_HEADER: [&str; 18] = [
    "Course ID",
    "University Name",
    "Course Name",
    "Fee Type",
    "Fee Name",
    "Period Start",
    "Period End",
    "Period Duration",
    "Previous Node",
    "Next Node",
    "Period Location",
    "Foreign Campus",
    "Local Fee Currency",
    "Local Fee Amount",
    "Local Fee Description",
    "International Fee Currency",
    "International Fee Amount",
    "International Fee Description",
];

// ============================================================================
// MARKERS
// ============================================================================

/// A year slot in the course timeline, or N/A for one-off fees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodMarker {
    Period(u32),
    NotApplicable,
}

impl fmt::Display for PeriodMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodMarker::Period(n) => write!(f, "P{}", n),
            PeriodMarker::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Predecessor / successor of a fee period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMarker {
    Begin,
    Period(u32),
    Transfer,
    Continue,
    Final,
    NotApplicable,
}

impl fmt::Display for NodeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeMarker::Begin => f.write_str("BEGIN"),
            NodeMarker::Period(n) => write!(f, "P{}", n),
            NodeMarker::Transfer => f.write_str("TRANSFER"),
            NodeMarker::Continue => f.write_str("CONTINUE"),
            NodeMarker::Final => f.write_str("FINAL"),
            NodeMarker::NotApplicable => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    Home,
    Foreign,
    /// Single-location schedules leave the column blank
    #[default]
    Unspecified,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Home => "Home",
            Location::Foreign => "Foreign",
            Location::Unspecified => "",
        }
    }
}

macro_rules! serialize_as_display {
    ($($ty:ty),*) => {
        $(impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        })*
    };
}

serialize_as_display!(PeriodMarker, NodeMarker);

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// FEE PERIOD
// ============================================================================

/// Currency, amount and description for one side of a period
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeeColumns {
    pub currency: String,
    pub amount: f64,
    pub description: String,
}

impl FeeColumns {
    pub fn new(currency: &str, amount: f64, description: String) -> Self {
        FeeColumns {
            currency: currency.to_string(),
            amount,
            description,
        }
    }

    /// Empty := zero or non-finite amount and blank (or "0") description
    pub fn is_empty(&self) -> bool {
        let amount_empty = self.amount == 0.0 || !self.amount.is_finite();
        let description = self.description.trim();
        amount_empty && (description.is_empty() || description == "0")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeePeriod {
    pub course_id: String,
    pub university_name: String,
    pub course_name: String,
    pub fee_kind_label: String,
    pub fee_name: String,

    pub period_start: PeriodMarker,
    pub period_end: PeriodMarker,
    pub period_duration: f64,
    pub previous_node: NodeMarker,
    pub next_node: NodeMarker,

    pub location: Location,
    pub foreign_campus: String,

    pub local: FeeColumns,
    pub international: FeeColumns,
}

impl FeePeriod {
    /// Nothing billable and nothing to read on either side
    pub fn is_empty_charge(&self) -> bool {
        self.local.is_empty() && self.international.is_empty()
    }

    /// Render in `FEE_HEADER` column order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.course_id.clone(),
            self.university_name.clone(),
            self.course_name.clone(),
            self.fee_kind_label.clone(),
            self.fee_name.clone(),
            self.period_start.to_string(),
            self.period_end.to_string(),
            format_number(self.period_duration),
            self.previous_node.to_string(),
            self.next_node.to_string(),
            self.location.as_str().to_string(),
            self.foreign_campus.clone(),
            self.local.currency.clone(),
            format_number(self.local.amount),
            self.local.description.clone(),
            self.international.currency.clone(),
            format_number(self.international.amount),
            self.international.description.clone(),
        ]
    }
}

/// Shortest round-trip form: 100.0 → "100", 1.5 → "1.5"
pub fn format_number(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value)
    } else {
        String::new()
    }
}
