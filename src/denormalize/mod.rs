//! Tenant payload denormalization.
//!
//! The backend delivers one deeply nested record per school: principals,
//! teachers and students embedded at the top level, with per-student content
//! collections nested under each student row. This module parses the
//! already-camelCased payload into the typed [`Tenant`] view and performs the
//! two required groupings:
//!
//! - principals grouped by their stage discriminator (stage-less rows are
//!   dropped with a warning, never fatally);
//! - per-student grade rows grouped by subject, with the subject discriminator
//!   removed after grouping.
//!
//! Both transforms are lossless in count minus the explicitly-dropped rows.
//! Flattened tenant-wide collections are not materialized here; they are
//! computed views on [`Tenant`].

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::features::FlagState;
use crate::model::{
    CollectionKind, ContentItem, Grade, Principal, Semester, Stage, Student, Teacher, Tenant,
};

#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {0} to be an object")]
    NotAnObject(&'static str),

    #[error("{record} is missing required field '{field}'")]
    MissingField { record: &'static str, field: &'static str },

    #[error("{record} field '{field}' is invalid: {detail}")]
    InvalidField {
        record: &'static str,
        field: &'static str,
        detail: String,
    },
}

/// Intermediate principal row, stage still optional. The wire does not
/// guarantee the discriminator; grouping decides what to do about that.
#[derive(Debug, Clone)]
pub struct PrincipalRow {
    pub id: String,
    pub name: String,
    pub login_code: String,
    pub stage: Option<Stage>,
}

/// Intermediate grade row carrying the subject discriminator that grouping
/// consumes.
#[derive(Debug, Clone)]
pub struct GradeRow {
    pub subject: String,
    pub grade: Grade,
}

/// Parse a camelCased school payload into the denormalized tenant view.
pub fn denormalize(raw: &Value) -> Result<Tenant, ShapeError> {
    let obj = raw.as_object().ok_or(ShapeError::NotAnObject("school"))?;

    let id = require_id(obj, "school")?;
    let name = require_str(obj, "school", "name")?;

    let mut tenant = Tenant::empty(id, name);
    tenant.logo_url = optional_str(obj, "logoUrl");
    tenant.is_active = obj.get("isActive").and_then(Value::as_bool).unwrap_or(true);
    tenant.stages = parse_stages(obj.get("stages"));
    tenant.feature_flags = parse_feature_flags(obj.get("featureFlags"));

    let principal_rows = parse_array(obj.get("principals"), |item| parse_principal_row(item))?;
    tenant.principals_by_stage = group_principals_by_stage(principal_rows);

    tenant.teachers = parse_array(obj.get("teachers"), |item| parse_teacher(item))?;

    for item in obj.get("students").and_then(Value::as_array).into_iter().flatten() {
        let student = parse_student(item)?;
        tenant.students.insert(student.id.clone(), student);
    }

    Ok(tenant)
}

/// Group principal rows by stage. Rows without a stage cannot be addressed by
/// any screen and are dropped - logged, not fatal.
pub fn group_principals_by_stage(rows: Vec<PrincipalRow>) -> BTreeMap<Stage, Vec<Principal>> {
    let mut grouped: BTreeMap<Stage, Vec<Principal>> = BTreeMap::new();
    for row in rows {
        match row.stage {
            Some(stage) => grouped.entry(stage).or_default().push(Principal {
                id: row.id,
                name: row.name,
                login_code: row.login_code,
                stage,
            }),
            None => {
                tracing::warn!(principal_id = %row.id, "dropping principal row without a stage");
            }
        }
    }
    grouped
}

/// Group a student's flat grade rows by subject, consuming the discriminator.
pub fn group_grades_by_subject(rows: Vec<GradeRow>) -> BTreeMap<String, Vec<Grade>> {
    let mut grouped: BTreeMap<String, Vec<Grade>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.subject).or_default().push(row.grade);
    }
    grouped
}

fn parse_principal_row(item: &Value) -> Result<PrincipalRow, ShapeError> {
    let obj = item.as_object().ok_or(ShapeError::NotAnObject("principal"))?;
    Ok(PrincipalRow {
        id: require_id(obj, "principal")?,
        name: require_str(obj, "principal", "name")?,
        login_code: require_str(obj, "principal", "loginCode")?,
        stage: parse_stage(obj.get("stage"), "principal"),
    })
}

fn parse_teacher(item: &Value) -> Result<Teacher, ShapeError> {
    let obj = item.as_object().ok_or(ShapeError::NotAnObject("teacher"))?;

    let subjects = obj
        .get("subjects")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(string_like).collect())
        .unwrap_or_default();

    let mut assignments: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(map) = obj.get("assignments").and_then(Value::as_object) {
        for (level, classes) in map {
            let classes = classes
                .as_array()
                .map(|items| items.iter().filter_map(string_like).collect())
                .unwrap_or_default();
            assignments.insert(level.clone(), classes);
        }
    }

    Ok(Teacher {
        id: require_id(obj, "teacher")?,
        name: require_str(obj, "teacher", "name")?,
        login_code: require_str(obj, "teacher", "loginCode")?,
        subjects,
        assignments,
        salary: obj.get("salary").and_then(Value::as_f64),
    })
}

fn parse_student(item: &Value) -> Result<Student, ShapeError> {
    let obj = item.as_object().ok_or(ShapeError::NotAnObject("student"))?;

    let id = require_id(obj, "student")?;
    let stage = parse_stage(obj.get("stage"), "student");
    let level = optional_str(obj, "level");
    let class = optional_str(obj, "class");

    let grade_rows = parse_array(obj.get("grades"), |row| parse_grade_row(row))?;
    let grades = group_grades_by_subject(grade_rows);

    let mut content: BTreeMap<CollectionKind, Vec<ContentItem>> = BTreeMap::new();
    for &kind in CollectionKind::ALL {
        let Some(items) = obj.get(kind.key()).and_then(Value::as_array) else {
            continue;
        };
        let parsed = items
            .iter()
            .map(|item| parse_content_item(item, kind, &id, stage, level.as_deref(), class.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;
        if !parsed.is_empty() {
            content.insert(kind, parsed);
        }
    }

    Ok(Student {
        id,
        name: require_str(obj, "student", "name")?,
        guardian_code: require_str(obj, "student", "guardianCode")?,
        stage,
        level,
        class,
        grades,
        content,
    })
}

fn parse_grade_row(item: &Value) -> Result<GradeRow, ShapeError> {
    let obj = item.as_object().ok_or(ShapeError::NotAnObject("grade"))?;

    let subject = require_str(obj, "grade", "subject")?;
    let semester = obj
        .get("semester")
        .and_then(Value::as_u64)
        .ok_or(ShapeError::MissingField { record: "grade", field: "semester" })?;
    let semester = Semester::try_from(semester as u8).map_err(|detail| ShapeError::InvalidField {
        record: "grade",
        field: "semester",
        detail,
    })?;

    let assignment = obj
        .get("assignment")
        .and_then(Value::as_u64)
        .ok_or(ShapeError::MissingField { record: "grade", field: "assignment" })?;
    if !(1..=2).contains(&assignment) {
        return Err(ShapeError::InvalidField {
            record: "grade",
            field: "assignment",
            detail: format!("assignment must be 1 or 2, got {}", assignment),
        });
    }

    let score = match obj.get("score") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let score = value.as_f64().ok_or_else(|| ShapeError::InvalidField {
                record: "grade",
                field: "score",
                detail: format!("expected a number, got {}", value),
            })?;
            if !(0.0..=10.0).contains(&score) {
                return Err(ShapeError::InvalidField {
                    record: "grade",
                    field: "score",
                    detail: format!("score must be in [0, 10], got {}", score),
                });
            }
            Some(score)
        }
    };

    Ok(GradeRow {
        subject,
        grade: Grade {
            sub_subject: require_str(obj, "grade", "subSubject")?,
            semester,
            assignment: assignment as u8,
            score,
        },
    })
}

/// Parse one content record, injecting the owner's filter context wherever the
/// item does not carry its own. Original fields are preserved verbatim.
fn parse_content_item(
    item: &Value,
    kind: CollectionKind,
    student_id: &str,
    stage: Option<Stage>,
    level: Option<&str>,
    class: Option<&str>,
) -> Result<ContentItem, ShapeError> {
    let obj = match item.as_object() {
        Some(obj) => obj,
        None => {
            return Err(ShapeError::InvalidField {
                record: "content",
                field: kind.key(),
                detail: "expected an object".to_string(),
            })
        }
    };

    Ok(ContentItem {
        id: obj.get("id").and_then(string_like),
        student_id: student_id.to_string(),
        level: optional_str(obj, "level").or_else(|| level.map(str::to_string)),
        class: optional_str(obj, "class").or_else(|| class.map(str::to_string)),
        stage: parse_stage(obj.get("stage"), "content").or(stage),
        subject: optional_str(obj, "subject"),
        fields: obj.clone(),
    })
}

fn parse_stages(value: Option<&Value>) -> BTreeSet<Stage> {
    let mut stages = BTreeSet::new();
    for item in value.and_then(Value::as_array).into_iter().flatten() {
        if let Some(stage) = parse_stage(Some(item), "school") {
            stages.insert(stage);
        }
    }
    stages
}

fn parse_stage(value: Option<&Value>, record: &'static str) -> Option<Stage> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value::<Stage>(value.clone()) {
        Ok(stage) => Some(stage),
        Err(_) => {
            tracing::warn!(%record, stage = %value, "unrecognized stage value");
            None
        }
    }
}

fn parse_feature_flags(value: Option<&Value>) -> BTreeMap<String, FlagState> {
    let mut flags = BTreeMap::new();
    if let Some(map) = value.and_then(Value::as_object) {
        for (key, state) in map {
            flags.insert(key.clone(), FlagState::from_wire(state));
        }
    }
    flags
}

fn parse_array<T>(
    value: Option<&Value>,
    parse: impl Fn(&Value) -> Result<T, ShapeError>,
) -> Result<Vec<T>, ShapeError> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|item| parse(item))
        .collect()
}

/// Backend ids arrive as strings or numbers depending on the table.
fn string_like(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn require_id(obj: &Map<String, Value>, record: &'static str) -> Result<String, ShapeError> {
    obj.get("id")
        .and_then(string_like)
        .ok_or(ShapeError::MissingField { record, field: "id" })
}

fn require_str(
    obj: &Map<String, Value>,
    record: &'static str,
    field: &'static str,
) -> Result<String, ShapeError> {
    obj.get(field)
        .and_then(string_like)
        .ok_or(ShapeError::MissingField { record, field })
}

fn optional_str(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(string_like)
}
