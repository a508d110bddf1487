// 📋 Course details - one row per published course

use crate::fees::period::format_number;
use crate::source::CourseDetail;
use crate::text::html_to_text;

/// English exam columns per row; further requirements are not exported
pub const EXAM_SLOTS: usize = 9;

pub const DETAILS_HEADER: [&str; 9 + 2 * EXAM_SLOTS] = [
    "Course ID",
    "Course Name",
    "Reference URL",
    "Why Apply",
    "Course Level",
    "Campus",
    "Duration",
    "Intakes",
    "PTPTN Type",
    "Exam 1 Type",
    "Exam 1 Requirement",
    "Exam 2 Type",
    "Exam 2 Requirement",
    "Exam 3 Type",
    "Exam 3 Requirement",
    "Exam 4 Type",
    "Exam 4 Requirement",
    "Exam 5 Type",
    "Exam 5 Requirement",
    "Exam 6 Type",
    "Exam 6 Requirement",
    "Exam 7 Type",
    "Exam 7 Requirement",
    "Exam 8 Type",
    "Exam 8 Requirement",
    "Exam 9 Type",
    "Exam 9 Requirement",
];

pub fn detail_row(detail: &CourseDetail) -> Vec<String> {
    let mut row = Vec::with_capacity(DETAILS_HEADER.len());

    row.push(detail.course_id.clone());
    row.push(detail.course_name.clone());
    row.push(detail.reference_url.clone());
    row.push(
        detail
            .why_apply_richtext
            .as_deref()
            .map(html_to_text)
            .unwrap_or_default(),
    );
    row.push(detail.course_level.clone());
    row.push(detail.campus.clone());
    row.push(format_number(detail.duration_years));
    row.push(detail.intakes.join(", "));
    row.push(detail.ptptn_type.clone());

    for slot in 0..EXAM_SLOTS {
        match detail.english_requirements.get(slot) {
            Some(exam) => {
                row.push(exam.exam_type.clone());
                row.push(exam.requirement.clone());
            }
            None => {
                row.push(String::new());
                row.push(String::new());
            }
        }
    }

    row
}

pub fn detail_rows(details: &[CourseDetail]) -> Vec<Vec<String>> {
    details.iter().map(detail_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EnglishRequirement;

    #[test]
    fn test_detail_row_layout() {
        let detail = CourseDetail {
            course_id: "c1".to_string(),
            course_name: "BSc".to_string(),
            why_apply_richtext: Some("<p>Small <em>classes</em></p>".to_string()),
            duration_years: 3.5,
            intakes: vec!["March".to_string(), "August".to_string()],
            english_requirements: vec![EnglishRequirement {
                exam_type: "MUET".to_string(),
                requirement: "Band 3".to_string(),
            }],
            ..Default::default()
        };

        let row = detail_row(&detail);

        assert_eq!(row.len(), DETAILS_HEADER.len());
        assert_eq!(row[3], "Small _classes_");
        assert_eq!(row[6], "3.5");
        assert_eq!(row[7], "March, August");
        assert_eq!(row[9], "MUET");
        assert_eq!(row[10], "Band 3");
        assert!(row[11..].iter().all(String::is_empty));
    }

    #[test]
    fn test_extra_exams_are_cut() {
        let detail = CourseDetail {
            english_requirements: (1..=12)
                .map(|n| EnglishRequirement {
                    exam_type: format!("Exam{}", n),
                    requirement: n.to_string(),
                })
                .collect(),
            ..Default::default()
        };

        let row = detail_row(&detail);
        assert_eq!(row.len(), DETAILS_HEADER.len());
        assert_eq!(row.last().unwrap(), "9");
    }
}
