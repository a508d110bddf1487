// 🧭 Discipline / specialisation mapping

use crate::source::DisciplineRecord;

pub const DISC_SPEC_HEADER: [&str; 4] = ["Course ID", "Course Name", "Major Name", "Major Type"];

pub const DISCIPLINE: &str = "Discipline";
pub const SPECIALISATION: &str = "Specialisation";

/// One Discipline row, then one Specialisation row per specialisation
pub fn disc_spec_rows(record: &DisciplineRecord) -> Vec<Vec<String>> {
    let row = |name: &str, kind: &str| {
        vec![
            record.course_id.clone(),
            record.course_name.clone(),
            name.to_string(),
            kind.to_string(),
        ]
    };

    std::iter::once(row(record.discipline.as_deref().unwrap_or_default(), DISCIPLINE))
        .chain(
            record
                .specialisations
                .iter()
                .map(|name| row(name, SPECIALISATION)),
        )
        .collect()
}

pub fn discipline_rows(records: &[DisciplineRecord]) -> Vec<Vec<String>> {
    records.iter().flat_map(disc_spec_rows).collect()
}
