// 🗄️ Course Document Store - JSON documents in SQLite
//
// Each collection of the course database export (courses, universities,
// currencies, ...) lands in one `documents` table keyed by (collection, id).
// The store resolves references by id and applies the per-module filters, so
// the extraction modules only ever see joined records.

use crate::error::ExtractError;
use crate::fees::period::format_number;
use crate::source::{
    CourseDetail, CourseSource, DisciplineRecord, EnglishRequirement, EntryRequirement,
    EntryRequirementRecord, FeeAmount, FeeLineItem, FeeScope, PartnerTerms,
};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Level-of-study id that marks a degree course
pub const DEFAULT_DEGREE_LEVEL_ID: &str = "5a1bbab02a2e3c29ecb9233b";

/// Fee category key never exported to fee schedules
pub const EXCLUDED_FEE_KEY: &str = "13";

pub mod collections {
    pub const COURSES: &str = "courses";
    pub const UNIVERSITIES: &str = "universities";
    pub const LEVELS_OF_STUDY: &str = "levelofstudies";
    pub const CAMPUSES: &str = "campuses";
    pub const CURRENCIES: &str = "currencies";
    pub const QUALIFICATIONS: &str = "subject_qualifications";
    pub const DISCIPLINES: &str = "disciplines";
    pub const SPECIALISATIONS: &str = "specialisations";
}

// ============================================================================
// SCHEMA & IMPORT
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            imported_at TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
        [],
    )?;

    Ok(())
}

/// Outcome of one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

impl ImportStats {
    fn merge(self, other: ImportStats) -> Self {
        ImportStats {
            inserted: self.inserted + other.inserted,
            updated: self.updated + other.updated,
            unchanged: self.unchanged + other.unchanged,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Document id: a plain string or an export-style `{"$oid": "..."}`
pub fn document_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Upsert documents into a collection. Re-importing the same export is a no-op.
pub fn insert_documents(conn: &Connection, collection: &str, docs: &[Value]) -> Result<ImportStats> {
    let imported_at = Utc::now().to_rfc3339();
    let mut stats = ImportStats::default();

    for doc in docs {
        let Some(id) = doc.get("_id").and_then(document_id) else {
            warn!(collection, "Skipping document without an _id");
            stats.skipped += 1;
            continue;
        };

        let body = serde_json::to_string(doc)?;

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO documents (collection, id, body, imported_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, body, imported_at],
        )?;

        if inserted > 0 {
            stats.inserted += 1;
            continue;
        }

        let updated = conn.execute(
            "UPDATE documents SET body = ?3, imported_at = ?4
             WHERE collection = ?1 AND id = ?2 AND body <> ?3",
            params![collection, id, body, imported_at],
        )?;

        if updated > 0 {
            stats.updated += 1;
        } else {
            stats.unchanged += 1;
        }
    }

    Ok(stats)
}

/// Read a database export: one JSON object mapping collection name → documents
pub fn load_export(path: &Path) -> Result<Map<String, Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read export {}", path.display()))?;

    let value: Value = serde_json::from_str(&raw).context("Failed to parse export JSON")?;

    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Export must be a JSON object of collection → documents"),
    }
}

pub fn import_export(conn: &Connection, export: &Map<String, Value>) -> Result<ImportStats> {
    let mut total = ImportStats::default();

    for (collection, docs) in export {
        let Some(docs) = docs.as_array() else {
            warn!(collection = %collection, "Collection is not an array, skipped");
            continue;
        };

        let stats = insert_documents(conn, collection, docs)
            .with_context(|| format!("Failed to import collection {}", collection))?;

        info!(
            collection = %collection,
            inserted = stats.inserted,
            updated = stats.updated,
            unchanged = stats.unchanged,
            "Imported collection"
        );
        total = total.merge(stats);
    }

    Ok(total)
}

pub fn count_documents(conn: &Connection, collection: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE collection = ?1",
        params![collection],
        |row| row.get(0),
    )?;

    Ok(count)
}

// ============================================================================
// NORMALIZATION (schema cleanup)
// ============================================================================

const NUMERIC_COURSE_FIELDS: [&str; 4] = [
    "local_year_fulltime",
    "duration",
    "partner_duration",
    "total_partner_fees",
];

const FEE_MAPS: [&str; 2] = ["domesticstd_course_fees", "internationalstd_course_fees"];

/// Coerce references and numbers to their canonical form.
/// Safe to run any number of times; returns how many documents changed.
pub fn normalize_documents(conn: &Connection) -> Result<usize> {
    let rows: Vec<(String, String, String)> = {
        let mut stmt = conn.prepare("SELECT collection, id, body FROM documents ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut updated = 0;

    for (collection, id, body) in rows {
        let mut doc: Value = serde_json::from_str(&body)
            .with_context(|| format!("Corrupt document {}/{}", collection, id))?;

        let mut changed = flatten_object_ids(&mut doc);
        if collection == collections::COURSES {
            changed |= coerce_course_numbers(&mut doc);
        }

        if changed {
            conn.execute(
                "UPDATE documents SET body = ?3 WHERE collection = ?1 AND id = ?2",
                params![collection, id, serde_json::to_string(&doc)?],
            )?;
            updated += 1;
        }
    }

    info!(updated, "Normalization complete");
    Ok(updated)
}

/// `{"$oid": "abc"}` → `"abc"`, anywhere in the document
fn flatten_object_ids(value: &mut Value) -> bool {
    let oid = match value {
        Value::Object(map) if map.len() == 1 => {
            map.get("$oid").and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    };

    if let Some(id) = oid {
        *value = Value::String(id);
        return true;
    }

    match value {
        Value::Object(map) => map
            .values_mut()
            .fold(false, |changed, v| flatten_object_ids(v) | changed),
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |changed, v| flatten_object_ids(v) | changed),
        _ => false,
    }
}

fn coerce_course_numbers(doc: &mut Value) -> bool {
    let Some(data) = doc.get_mut("data").and_then(Value::as_object_mut) else {
        return false;
    };

    let mut changed = false;

    for field in NUMERIC_COURSE_FIELDS {
        if let Some(slot) = data.get_mut(field) {
            changed |= coerce_number(slot);
        }
    }

    for fee_map in FEE_MAPS {
        if let Some(fees) = data.get_mut(fee_map).and_then(Value::as_object_mut) {
            for fee in fees.values_mut() {
                if let Some(slot) = fee.get_mut("fees_amount") {
                    changed |= coerce_number(slot);
                }
            }
        }
    }

    changed
}

/// Numeric strings become numbers; anything else is left alone
fn coerce_number(slot: &mut Value) -> bool {
    let Value::String(s) = slot else {
        return false;
    };

    let Some(n) = s.trim().parse::<f64>().ok().filter(|n| n.is_finite()) else {
        return false;
    };

    *slot = if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    };
    true
}

// ============================================================================
// LENIENT FIELD READERS
// ============================================================================

fn number_field(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.as_f64().map(format_number).unwrap_or_default(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    Some(text_field(value)).filter(|s| !s.trim().is_empty())
}

/// One reference or an array of references
fn ref_ids(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(document_id).collect(),
        Some(other) => document_id(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn resolve(names: &HashMap<String, String>, value: Option<&Value>) -> String {
    ref_ids(value)
        .first()
        .and_then(|id| names.get(id))
        .cloned()
        .unwrap_or_default()
}

fn is_present(value: Option<&Value>) -> bool {
    matches!(value, Some(v) if !v.is_null())
}

// ============================================================================
// SQLITE COURSE STORE
// ============================================================================

pub struct SqliteCourseStore {
    conn: Connection,
    degree_level_id: String,
}

impl SqliteCourseStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open course store {}", path.display()))?;
        setup_database(&conn)?;

        Ok(SqliteCourseStore {
            conn,
            degree_level_id: DEFAULT_DEGREE_LEVEL_ID.to_string(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;

        Ok(SqliteCourseStore {
            conn,
            degree_level_id: DEFAULT_DEGREE_LEVEL_ID.to_string(),
        })
    }

    /// Builder pattern: override which level of study counts as a degree
    pub fn with_degree_level(mut self, level_id: impl Into<String>) -> Self {
        self.degree_level_id = level_id.into();
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn import(&self, export: &Map<String, Value>) -> Result<ImportStats> {
        import_export(&self.conn, export)
    }

    pub fn normalize(&self) -> Result<usize> {
        normalize_documents(&self.conn)
    }

    fn documents(&self, collection: &str) -> Result<Vec<Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY rowid")?;

        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, body)| {
                serde_json::from_str(&body)
                    .with_context(|| format!("Corrupt document {}/{}", collection, id))
            })
            .collect()
    }

    /// id → name for a lookup collection
    fn names(&self, collection: &str) -> Result<HashMap<String, String>> {
        let names = self
            .documents(collection)?
            .iter()
            .filter_map(|doc| {
                let id = doc.get("_id").and_then(document_id)?;
                Some((id, text_field(doc.get("name"))))
            })
            .collect();

        Ok(names)
    }

    fn published_courses(&self, university_id: &str) -> Result<Vec<Value>> {
        let courses: Vec<Value> = self
            .documents(collections::COURSES)
            .context("Failed to query courses")?
            .into_iter()
            .filter(|course| {
                ref_ids(course.get("university_id")).iter().any(|id| id == university_id)
                    && course.pointer("/data/publish").and_then(Value::as_str) == Some("on")
            })
            .collect();

        debug!(university_id, count = courses.len(), "Published courses");
        Ok(courses)
    }

    fn is_degree(&self, course: &Value) -> bool {
        ref_ids(course.pointer("/data/level_of_studies"))
            .iter()
            .any(|id| *id == self.degree_level_id)
    }

    fn in_scope(&self, course: &Value, scope: FeeScope) -> bool {
        match scope {
            FeeScope::Degree => self.is_degree(course),
            FeeScope::NonDegree => !self.is_degree(course),
            FeeScope::Partnership => {
                self.is_degree(course)
                    && is_present(course.pointer("/data/partner_duration"))
                    && (is_present(course.pointer("/data/duration"))
                        || is_present(course.pointer("/data/local_year_fulltime")))
            }
        }
    }
}

fn fee_amount(fee: &Value, currency: &str) -> FeeAmount {
    FeeAmount {
        currency: currency.to_string(),
        amount: number_field(fee.get("fees_amount")),
        detail_richtext: optional_text(fee.get("fees_detail")),
    }
}

impl CourseSource for SqliteCourseStore {
    fn check_connection(&self) -> Result<(), ExtractError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|e| ExtractError::SourceConnection(e.to_string()))
    }

    fn fee_line_items(&self, university_id: &str, scope: FeeScope) -> Result<Vec<FeeLineItem>> {
        let courses = self.published_courses(university_id)?;
        let levels = self.names(collections::LEVELS_OF_STUDY)?;
        let currencies = self.names(collections::CURRENCIES)?;
        let universities = self.names(collections::UNIVERSITIES)?;

        let university_name = universities.get(university_id).cloned().unwrap_or_default();
        let empty = Value::Null;
        let mut items = Vec::new();

        for course in courses.iter().filter(|c| self.in_scope(c, scope)) {
            let data = course.get("data").unwrap_or(&empty);
            let course_id = course.get("_id").and_then(document_id).unwrap_or_default();

            let local_currency = resolve(&currencies, data.get("domesticstd_fee_currency"));
            let intl_currency = resolve(&currencies, data.get("internationalstd_fee_currency"));

            let duration = match scope {
                FeeScope::Partnership => number_field(data.get("local_year_fulltime"))
                    .or_else(|| number_field(data.get("duration"))),
                _ => number_field(data.get("local_year_fulltime")),
            };

            let partner = (scope == FeeScope::Partnership).then(|| PartnerTerms {
                duration_years: number_field(data.get("partner_duration")),
                fee_amount: number_field(data.get("total_partner_fees")),
                currency: resolve(&currencies, data.get("total_partner_fees_currency")),
                campus: text_field(data.get("partner_university")),
                fee_description: optional_text(data.get("total_partner_fees_detail")),
            });

            let Some(domestic) = data.get("domesticstd_course_fees").and_then(Value::as_object)
            else {
                continue;
            };
            let international = data
                .get("internationalstd_course_fees")
                .and_then(Value::as_object);

            for (key, fee) in domestic {
                if key == EXCLUDED_FEE_KEY {
                    continue;
                }

                let mut item = FeeLineItem {
                    course_id: course_id.clone(),
                    course_name: text_field(course.get("name")),
                    university_name: university_name.clone(),
                    fee_name: resolve(&levels, data.get("level_of_studies")),
                    fee_category_code: text_field(fee.get("fees_category")),
                    local: fee_amount(fee, &local_currency),
                    international: None,
                    course_duration_years: duration,
                    partner: partner.clone(),
                };

                if let Some(intl) = international.and_then(|fees| fees.get(key)) {
                    item = item.with_international(fee_amount(intl, &intl_currency));
                }

                items.push(item);
            }
        }

        debug!(university_id, scope = scope.name(), items = items.len(), "Fee line items");
        Ok(items)
    }

    fn course_details(&self, university_id: &str) -> Result<Vec<CourseDetail>> {
        let courses = self.published_courses(university_id)?;
        let levels = self.names(collections::LEVELS_OF_STUDY)?;
        let campuses = self.names(collections::CAMPUSES)?;
        let empty = Value::Null;

        let details = courses
            .iter()
            .map(|course| {
                let data = course.get("data").unwrap_or(&empty);

                let intakes = match data.get("intakes") {
                    Some(Value::Array(values)) => values
                        .iter()
                        .map(|v| text_field(Some(v)))
                        .filter(|s| !s.is_empty())
                        .collect(),
                    other => optional_text(other).into_iter().collect(),
                };

                let english_requirements = data
                    .get("english_requirement")
                    .and_then(Value::as_array)
                    .map(|reqs| {
                        reqs.iter()
                            .map(|req| EnglishRequirement {
                                exam_type: text_field(req.get("type")),
                                requirement: text_field(req.get("requirement")),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                CourseDetail {
                    course_id: course.get("_id").and_then(document_id).unwrap_or_default(),
                    course_name: text_field(course.get("name")),
                    reference_url: text_field(course.get("reference_url")),
                    why_apply_richtext: optional_text(data.get("why_apply")),
                    course_level: resolve(&levels, data.get("level_of_studies")),
                    campus: resolve(&campuses, course.get("campus_id")),
                    duration_years: number_field(data.get("partner_duration")).unwrap_or(0.0)
                        + number_field(data.get("local_year_fulltime")).unwrap_or(0.0),
                    intakes,
                    ptptn_type: text_field(data.get("ptptn_type")),
                    english_requirements,
                }
            })
            .collect();

        Ok(details)
    }

    fn entry_requirements(&self, university_id: &str) -> Result<Vec<EntryRequirementRecord>> {
        let courses = self.published_courses(university_id)?;
        let qualifications = self.names(collections::QUALIFICATIONS)?;

        let records = courses
            .iter()
            .map(|course| {
                let requirements = course
                    .pointer("/data/entry_requirement")
                    .and_then(Value::as_array)
                    .map(|reqs| {
                        reqs.iter()
                            .map(|req| EntryRequirement {
                                qualification: resolve(&qualifications, req.get("qualification")),
                                requirement_summary: text_field(req.get("requirement_summary")),
                                score: text_field(req.get("score")),
                                remarks: text_field(req.get("remarks")),
                                additional_requirement_richtext: optional_text(
                                    req.get("additional_requirement"),
                                ),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                EntryRequirementRecord {
                    course_id: course.get("_id").and_then(document_id).unwrap_or_default(),
                    course_name: text_field(course.get("name")),
                    requirements,
                }
            })
            .collect();

        Ok(records)
    }

    fn disciplines(&self, university_id: &str) -> Result<Vec<DisciplineRecord>> {
        let courses = self.published_courses(university_id)?;
        let disciplines = self.names(collections::DISCIPLINES)?;
        let specialisations = self.names(collections::SPECIALISATIONS)?;

        let records = courses
            .iter()
            .map(|course| DisciplineRecord {
                course_id: course.get("_id").and_then(document_id).unwrap_or_default(),
                course_name: text_field(course.get("name")),
                discipline: Some(resolve(&disciplines, course.get("discipline")))
                    .filter(|name| !name.is_empty()),
                specialisations: ref_ids(course.get("specialisations"))
                    .iter()
                    .filter_map(|id| specialisations.get(id).cloned())
                    .collect(),
            })
            .collect();

        Ok(records)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::fixtures::{sample_export, seeded_store};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_is_idempotent() {
        let store = SqliteCourseStore::open_in_memory().unwrap();

        let first = store.import(&sample_export()).unwrap();
        let courses = count_documents(store.connection(), collections::COURSES).unwrap();

        let second = store.import(&sample_export()).unwrap();
        let courses_again = count_documents(store.connection(), collections::COURSES).unwrap();

        assert_eq!(first.inserted, 17);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 0);
        assert_eq!(second.unchanged, 17);
        assert_eq!(courses, 5);
        assert_eq!(courses, courses_again);

        println!("✅ Import idempotency test PASSED");
    }

    #[test]
    fn test_import_updates_changed_documents() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        insert_documents(&conn, "campuses", &[json!({"_id": "k1", "name": "Old"})]).unwrap();
        let stats =
            insert_documents(&conn, "campuses", &[json!({"_id": "k1", "name": "New"})]).unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(count_documents(&conn, "campuses").unwrap(), 1);
    }

    #[test]
    fn test_documents_without_id_are_skipped() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let stats = insert_documents(&conn, "campuses", &[json!({"name": "No id"})]).unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(count_documents(&conn, "campuses").unwrap(), 0);
    }

    #[test]
    fn test_load_export_from_file() {
        let path = std::env::temp_dir().join(format!("course-export-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, serde_json::to_string(&sample_export()).unwrap()).unwrap();

        let export = load_export(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(export["courses"].as_array().unwrap().len(), 5);
        assert!(load_export(Path::new("/nonexistent/export.json")).is_err());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let store = seeded_store();

        let first = store.normalize().unwrap();
        let second = store.normalize().unwrap();

        assert!(first > 0);
        assert_eq!(second, 0);

        let courses = store.documents(collections::COURSES).unwrap();
        let degree = &courses[0];
        assert_eq!(degree["university_id"], json!("uni1"));
        assert_eq!(degree["specialisations"], json!(["s-ai", "s-net"]));
        assert_eq!(degree["data"]["local_year_fulltime"], json!(3));
        assert_eq!(
            degree["data"]["domesticstd_course_fees"]["1"]["fees_amount"],
            json!(30000)
        );

        let partnership = &courses[2];
        assert_eq!(partnership["data"]["partner_duration"], json!(2));

        println!("✅ Normalization idempotency test PASSED");
    }

    #[test]
    fn test_coerce_number_leaves_text_alone() {
        let mut value = json!("about three years");
        assert!(!coerce_number(&mut value));
        assert_eq!(value, json!("about three years"));

        let mut value = json!(" 3.5 ");
        assert!(coerce_number(&mut value));
        assert_eq!(value, json!(3.5));
    }

    #[test]
    fn test_check_connection() {
        let store = seeded_store();
        assert!(store.check_connection().is_ok());

        let bare = SqliteCourseStore {
            conn: Connection::open_in_memory().unwrap(),
            degree_level_id: DEFAULT_DEGREE_LEVEL_ID.to_string(),
        };
        let err = bare.check_connection().unwrap_err();
        assert_eq!(err.kind(), "source_connection");
    }

    #[test]
    fn test_fee_scopes() {
        let store = seeded_store();

        let degree = store.fee_line_items("uni1", FeeScope::Degree).unwrap();
        let ids: Vec<&str> = degree.iter().map(|i| i.course_id.as_str()).collect();
        assert_eq!(ids, vec!["c-deg", "c-deg", "c-tnp"]);

        let non_degree = store.fee_line_items("uni1", FeeScope::NonDegree).unwrap();
        assert_eq!(non_degree.len(), 3);
        assert!(non_degree.iter().all(|i| i.course_id == "c-dip"));
        assert_eq!(non_degree[0].fee_name, "Diploma");

        let partnership = store.fee_line_items("uni1", FeeScope::Partnership).unwrap();
        assert_eq!(partnership.len(), 1);
        let partner = partnership[0].partner.as_ref().unwrap();
        assert_eq!(partner.duration_years, Some(2.0));
        assert_eq!(partner.fee_amount, Some(20000.0));
        assert_eq!(partner.currency, "GBP");
        assert_eq!(partner.campus, "Partner University UK");
    }

    #[test]
    fn test_fee_line_item_fields() {
        let store = seeded_store();
        let items = store.fee_line_items("uni1", FeeScope::Degree).unwrap();

        let tuition = &items[0];
        assert_eq!(tuition.university_name, "Test University");
        assert_eq!(tuition.course_name, "Bachelor of Computer Science");
        assert_eq!(tuition.fee_name, "Degree");
        assert_eq!(tuition.fee_category_code, "1");
        assert_eq!(tuition.local.currency, "MYR");
        assert_eq!(tuition.local.amount, Some(30000.0));
        assert_eq!(tuition.course_duration_years, Some(3.0));
        assert!(tuition.partner.is_none());

        let intl = tuition.international.as_ref().unwrap();
        assert_eq!(intl.currency, "USD");
        assert_eq!(intl.amount, Some(45000.0));

        // Numeric category codes read the same as text ones; key 13 never shows up
        assert_eq!(items[1].fee_category_code, "10");
        assert!(items[1].international.is_none());
        assert!(items.iter().all(|i| i.fee_category_code != "13"));
    }

    #[test]
    fn test_degree_level_is_configurable() {
        let store = seeded_store().with_degree_level("lvl-dip");
        let degree = store.fee_line_items("uni1", FeeScope::Degree).unwrap();
        assert!(degree.iter().all(|i| i.course_id == "c-dip"));
    }

    #[test]
    fn test_course_details() {
        let store = seeded_store();
        let details = store.course_details("uni1").unwrap();

        assert_eq!(details.len(), 3);

        let bcs = &details[0];
        assert_eq!(bcs.course_id, "c-deg");
        assert_eq!(bcs.campus, "Main Campus");
        assert_eq!(bcs.course_level, "Degree");
        assert_eq!(bcs.duration_years, 3.0);
        assert_eq!(bcs.intakes, vec!["January", "September"]);
        assert_eq!(bcs.english_requirements[0].exam_type, "IELTS");

        // Partnership duration counts both legs
        assert_eq!(details[2].duration_years, 4.0);
    }

    #[test]
    fn test_entry_requirements_and_disciplines() {
        let store = seeded_store();

        let records = store.entry_requirements("uni1").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].requirements[0].qualification, "SPM");
        assert_eq!(records[0].requirements[0].score, "5");
        assert!(records[1].requirements.is_empty());

        let disciplines = store.disciplines("uni1").unwrap();
        assert_eq!(disciplines[0].discipline.as_deref(), Some("Information Technology"));
        assert_eq!(
            disciplines[0].specialisations,
            vec!["Artificial Intelligence", "Networking"]
        );
        assert_eq!(disciplines[1].discipline, None);
    }
}
