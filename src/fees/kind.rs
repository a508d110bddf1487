// 🏷️ Fee Category Classifier - fixed code table
// Maps the store's opaque fee-category codes onto the fee kinds that drive
// period splitting downstream.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// FEE KIND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeKind {
    TuitionFee,
    OtherFee,
    RegistrationFee,
    OtherCost,
    /// Unmapped code, carried through verbatim as its own label
    Other(String),
}

impl FeeKind {
    /// Label written to the "Fee Type" column
    pub fn label(&self) -> &str {
        match self {
            FeeKind::TuitionFee => "Tuition Fee",
            FeeKind::OtherFee => "Other Fee",
            FeeKind::RegistrationFee => "Registration Fee",
            FeeKind::OtherCost => "Other Cost",
            FeeKind::Other(code) => code,
        }
    }

    /// Tuition and other fees are billed per year and get split into periods
    pub fn is_periodic(&self) -> bool {
        matches!(self, FeeKind::TuitionFee | FeeKind::OtherFee)
    }
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Classify a raw fee-category code. Total: unknown codes become `Other(code)`.
pub fn classify(code: &str) -> FeeKind {
    let code = code.trim();

    match code {
        "1" => FeeKind::TuitionFee,
        "9" => FeeKind::OtherFee,
        "10" => FeeKind::RegistrationFee,
        "5" | "11" | "12" => FeeKind::OtherCost,
        _ => FeeKind::Other(code.to_string()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_codes() {
        assert_eq!(classify("1"), FeeKind::TuitionFee);
        assert_eq!(classify("9"), FeeKind::OtherFee);
        assert_eq!(classify("10"), FeeKind::RegistrationFee);
        assert_eq!(classify("5"), FeeKind::OtherCost);
        assert_eq!(classify("11"), FeeKind::OtherCost);
        assert_eq!(classify("12"), FeeKind::OtherCost);
    }

    #[test]
    fn test_unknown_code_passes_through() {
        assert_eq!(classify("7"), FeeKind::Other("7".to_string()));
        assert_eq!(classify("7").label(), "7");
        assert_eq!(classify(" 10 "), FeeKind::RegistrationFee);
    }

    #[test]
    fn test_labels_and_periodic() {
        assert_eq!(FeeKind::TuitionFee.label(), "Tuition Fee");
        assert_eq!(FeeKind::OtherCost.to_string(), "Other Cost");

        assert!(FeeKind::TuitionFee.is_periodic());
        assert!(FeeKind::OtherFee.is_periodic());
        assert!(!FeeKind::RegistrationFee.is_periodic());
        assert!(!FeeKind::OtherCost.is_periodic());
        assert!(!FeeKind::Other("3".to_string()).is_periodic());
    }
}
