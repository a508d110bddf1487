// 🎓 Entry requirements - one row per requirement

use crate::source::EntryRequirementRecord;
use crate::text::html_to_text;

pub const ENTRY_REQUIREMENT_HEADER: [&str; 7] = [
    "Course ID",
    "Course Name",
    "Qualification Type",
    "Requirement Summary",
    "Score-to-qualify",
    "Remarks",
    "Additional Requirement",
];

/// Courses without requirements still get one row with the fields left empty
pub fn requirement_rows(record: &EntryRequirementRecord) -> Vec<Vec<String>> {
    if record.requirements.is_empty() {
        let mut row = vec![record.course_id.clone(), record.course_name.clone()];
        row.resize(ENTRY_REQUIREMENT_HEADER.len(), String::new());
        return vec![row];
    }

    record
        .requirements
        .iter()
        .map(|req| {
            vec![
                record.course_id.clone(),
                record.course_name.clone(),
                req.qualification.clone(),
                req.requirement_summary.clone(),
                req.score.clone(),
                req.remarks.clone(),
                req.additional_requirement_richtext
                    .as_deref()
                    .map(html_to_text)
                    .unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn entry_requirement_rows(records: &[EntryRequirementRecord]) -> Vec<Vec<String>> {
    records.iter().flat_map(requirement_rows).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EntryRequirement;

    #[test]
    fn test_one_row_per_requirement() {
        let record = EntryRequirementRecord {
            course_id: "c1".to_string(),
            course_name: "BSc".to_string(),
            requirements: vec![
                EntryRequirement {
                    qualification: "SPM".to_string(),
                    score: "5".to_string(),
                    additional_requirement_richtext: Some("<ul><li>Interview</li></ul>".to_string()),
                    ..Default::default()
                },
                EntryRequirement {
                    qualification: "STPM".to_string(),
                    requirement_summary: "CGPA 2.0".to_string(),
                    ..Default::default()
                },
            ],
        };

        let rows = requirement_rows(&record);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], "SPM");
        assert_eq!(rows[0][4], "5");
        assert_eq!(rows[0][6], "- Interview");
        assert_eq!(rows[1][3], "CGPA 2.0");
        assert!(rows.iter().all(|r| r.len() == ENTRY_REQUIREMENT_HEADER.len()));
    }

    #[test]
    fn test_course_without_requirements() {
        let record = EntryRequirementRecord {
            course_id: "c2".to_string(),
            course_name: "Diploma".to_string(),
            requirements: Vec::new(),
        };

        let rows = requirement_rows(&record);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "c2");
        assert!(rows[0][2..].iter().all(String::is_empty));
        assert_eq!(rows[0].len(), ENTRY_REQUIREMENT_HEADER.len());
    }
}
