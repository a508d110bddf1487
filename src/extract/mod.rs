// 📦 Extraction modules
//
// Six modules run in a fixed order. Each one reads joined records from a
// CourseSource and produces the rows of one tab.

pub mod details;
pub mod disc_spec;
pub mod entry_requirements;
pub mod fee_schedule;

use crate::config::TabNames;
use crate::error::ExtractError;
use crate::fees::FEE_HEADER;
use crate::source::{CourseSource, FeeScope};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExtractionModule {
    Details,
    EntryRequirement,
    DiscSpec,
    FeeNonDegree,
    FeeDegree,
    FeePartnerships,
}

impl ExtractionModule {
    /// Run order
    pub const ALL: [ExtractionModule; 6] = [
        ExtractionModule::Details,
        ExtractionModule::EntryRequirement,
        ExtractionModule::DiscSpec,
        ExtractionModule::FeeNonDegree,
        ExtractionModule::FeeDegree,
        ExtractionModule::FeePartnerships,
    ];

    /// Name recorded in the Status tab
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionModule::Details => "Details",
            ExtractionModule::EntryRequirement => "Entry-Requirement",
            ExtractionModule::DiscSpec => "Disc-Spec",
            ExtractionModule::FeeNonDegree => "Course-Fee-Non-Degree",
            ExtractionModule::FeeDegree => "Course-Fee-Degree",
            ExtractionModule::FeePartnerships => "Course-Fee-Partnerships",
        }
    }

    pub fn tab<'a>(&self, tabs: &'a TabNames) -> &'a str {
        match self {
            ExtractionModule::Details => tabs.details.as_str(),
            ExtractionModule::EntryRequirement => tabs.entry_requirements.as_str(),
            ExtractionModule::DiscSpec => tabs.disc_spec.as_str(),
            ExtractionModule::FeeNonDegree => tabs.fee_non_degree.as_str(),
            ExtractionModule::FeeDegree => tabs.fee_degree.as_str(),
            ExtractionModule::FeePartnerships => tabs.fee_partnerships.as_str(),
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            ExtractionModule::Details => &details::DETAILS_HEADER,
            ExtractionModule::EntryRequirement => &entry_requirements::ENTRY_REQUIREMENT_HEADER,
            ExtractionModule::DiscSpec => &disc_spec::DISC_SPEC_HEADER,
            _ => &FEE_HEADER,
        }
    }

    pub fn fee_scope(&self) -> Option<FeeScope> {
        match self {
            ExtractionModule::FeeNonDegree => Some(FeeScope::NonDegree),
            ExtractionModule::FeeDegree => Some(FeeScope::Degree),
            ExtractionModule::FeePartnerships => Some(FeeScope::Partnership),
            _ => None,
        }
    }

    /// Query and reshape; any failure is reported as an aggregation error
    pub fn build_rows(
        &self,
        source: &dyn CourseSource,
        university_id: &str,
    ) -> Result<Vec<Vec<String>>, ExtractError> {
        let rows = match self {
            ExtractionModule::Details => source
                .course_details(university_id)
                .map(|d| details::detail_rows(&d)),
            ExtractionModule::EntryRequirement => source
                .entry_requirements(university_id)
                .map(|r| entry_requirements::entry_requirement_rows(&r)),
            ExtractionModule::DiscSpec => source
                .disciplines(university_id)
                .map(|r| disc_spec::discipline_rows(&r)),
            ExtractionModule::FeeNonDegree
            | ExtractionModule::FeeDegree
            | ExtractionModule::FeePartnerships => {
                let scope = self.fee_scope().unwrap_or(FeeScope::Degree);
                fee_schedule::fee_rows(source, university_id, scope)
            }
        };

        rows.map_err(|e| ExtractError::aggregation(self.name(), e))
    }
}

impl fmt::Display for ExtractionModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::seeded_store;

    #[test]
    fn test_module_order_and_tabs() {
        let tabs = TabNames::default();
        let names: Vec<&str> = ExtractionModule::ALL.iter().map(|m| m.name()).collect();

        assert_eq!(
            names,
            vec![
                "Details",
                "Entry-Requirement",
                "Disc-Spec",
                "Course-Fee-Non-Degree",
                "Course-Fee-Degree",
                "Course-Fee-Partnerships",
            ]
        );
        assert_eq!(ExtractionModule::FeeNonDegree.tab(&tabs), "Fee-Extraction-Non-Degree-CWB");
        assert_eq!(ExtractionModule::DiscSpec.header().len(), 4);
        assert_eq!(ExtractionModule::FeePartnerships.header().len(), 18);
    }

    #[test]
    fn test_build_rows_from_store() {
        let store = seeded_store();

        let details = ExtractionModule::Details.build_rows(&store, "uni1").unwrap();
        assert_eq!(details.len(), 3);
        assert_eq!(details[0][3], "Great **labs**");

        let disc_spec = ExtractionModule::DiscSpec.build_rows(&store, "uni1").unwrap();
        // c-deg: discipline + 2 specialisations, c-dip and c-tnp: discipline only
        assert_eq!(disc_spec.len(), 5);

        let degree = ExtractionModule::FeeDegree.build_rows(&store, "uni1").unwrap();
        // c-deg: tuition 30000 over 3 years + registration 500; c-tnp: tuition over 2 years
        assert_eq!(degree.len(), 3);
        assert_eq!(degree[0][13], "10000");
        assert_eq!(degree[0][16], "15000");
        assert_eq!(degree[1][3], "Registration Fee");
        assert_eq!(degree[2][13], "20000");

        let partnership = ExtractionModule::FeePartnerships.build_rows(&store, "uni1").unwrap();
        assert_eq!(partnership.len(), 2);
        assert_eq!(partnership[1][10], "Foreign");
        assert_eq!(partnership[1][13], "10000");
    }

    #[test]
    fn test_unknown_university_yields_no_rows() {
        let store = seeded_store();
        for module in ExtractionModule::ALL {
            assert!(module.build_rows(&store, "nobody").unwrap().is_empty());
        }
    }
}
