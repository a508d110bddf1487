// 🗂️ Course Record Source - the seam between the document store and the modules
//
// Every record here is already joined: reference ids are resolved to names and
// only published courses of the requested university are returned.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEE RECORDS
// ============================================================================

/// Which fee schedule a query is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeScope {
    /// Courses at the degree level of study
    Degree,
    /// Everything that is not a degree
    NonDegree,
    /// Degree courses carrying a partner duration
    Partnership,
}

impl FeeScope {
    pub fn name(&self) -> &str {
        match self {
            FeeScope::Degree => "Degree",
            FeeScope::NonDegree => "Non Degree",
            FeeScope::Partnership => "Partnerships",
        }
    }
}

/// One side (local or international) of a raw fee line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeAmount {
    pub currency: String,
    pub amount: Option<f64>,
    pub detail_richtext: Option<String>,
}

/// The foreign leg of a partnership course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerTerms {
    pub duration_years: Option<f64>,
    pub fee_amount: Option<f64>,
    pub currency: String,
    pub campus: String,
    pub fee_description: Option<String>,
}

/// FeeLineItem - one raw fee entry for a course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeLineItem {
    pub course_id: String,
    pub course_name: String,
    pub university_name: String,

    /// Level-of-study name, written to the "Fee Name" column
    pub fee_name: String,

    pub fee_category_code: String,
    pub local: FeeAmount,

    /// International fee under the same category key, if the course has one
    pub international: Option<FeeAmount>,

    pub course_duration_years: Option<f64>,
    pub partner: Option<PartnerTerms>,
}

impl FeeLineItem {
    /// Builder pattern: attach the international counterpart
    pub fn with_international(mut self, international: FeeAmount) -> Self {
        self.international = Some(international);
        self
    }

    /// Builder pattern: attach partner terms
    pub fn with_partner(mut self, partner: PartnerTerms) -> Self {
        self.partner = Some(partner);
        self
    }
}

// ============================================================================
// ROW-SHAPE RECORDS (simpler modules)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnglishRequirement {
    pub exam_type: String,
    pub requirement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseDetail {
    pub course_id: String,
    pub course_name: String,
    pub reference_url: String,
    pub why_apply_richtext: Option<String>,
    pub course_level: String,
    pub campus: String,
    /// Local plus partner years
    pub duration_years: f64,
    pub intakes: Vec<String>,
    pub ptptn_type: String,
    pub english_requirements: Vec<EnglishRequirement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryRequirement {
    pub qualification: String,
    pub requirement_summary: String,
    pub score: String,
    pub remarks: String,
    pub additional_requirement_richtext: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryRequirementRecord {
    pub course_id: String,
    pub course_name: String,
    pub requirements: Vec<EntryRequirement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisciplineRecord {
    pub course_id: String,
    pub course_name: String,
    pub discipline: Option<String>,
    pub specialisations: Vec<String>,
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// CourseSource - everything the extraction modules read
///
/// Implementations return records for published courses of one university,
/// in store order. Identifiers are expected to be normalized already.
pub trait CourseSource {
    /// Cheap reachability check, run before each module
    fn check_connection(&self) -> Result<(), ExtractError>;

    fn fee_line_items(
        &self,
        university_id: &str,
        scope: FeeScope,
    ) -> anyhow::Result<Vec<FeeLineItem>>;

    fn course_details(&self, university_id: &str) -> anyhow::Result<Vec<CourseDetail>>;

    fn entry_requirements(
        &self,
        university_id: &str,
    ) -> anyhow::Result<Vec<EntryRequirementRecord>>;

    fn disciplines(&self, university_id: &str) -> anyhow::Result<Vec<DisciplineRecord>>;
}
