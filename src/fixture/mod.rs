//! Offline/demo backend.
//!
//! A hand-authored tenant set behind the same [`TenantDirectory`] trait as the
//! live backend, so `resolve`/`resume` behave identically with no network I/O.
//! Fixtures are authored in wire shape (snake_case) and go through the same
//! casing + denormalization pipeline as live payloads.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::casing;
use crate::directory::{DirectoryError, ProbeTable, TenantDirectory};
use crate::model::Grade;

pub struct FixtureDirectory {
    tenants: Mutex<BTreeMap<String, Value>>,
}

impl FixtureDirectory {
    /// Build from wire-shape school payloads. Each must carry an `id`.
    pub fn with_tenants(payloads: Vec<Value>) -> Self {
        let mut tenants = BTreeMap::new();
        for payload in payloads {
            let id = payload
                .get("id")
                .map(value_to_id)
                .unwrap_or_else(|| "unidentified".to_string());
            tenants.insert(id, payload);
        }
        Self { tenants: Mutex::new(tenants) }
    }

    /// The shipped demo set: one active school with content across the
    /// collection families, plus a deactivated school whose codes resolve but
    /// cannot produce a session.
    pub fn demo() -> Self {
        Self::with_tenants(vec![demo_school(), deactivated_school()])
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>, DirectoryError> {
        self.tenants
            .lock()
            .map_err(|_| DirectoryError::Io("fixture store poisoned".to_string()))
    }
}

#[async_trait]
impl TenantDirectory for FixtureDirectory {
    async fn probe(&self, table: ProbeTable, code: &str) -> Result<Vec<Value>, DirectoryError> {
        let tenants = self.lock()?;
        let mut rows = Vec::new();

        for (school_id, school) in tenants.iter() {
            let table_rows = school.get(table.table_name()).and_then(Value::as_array);
            for row in table_rows.into_iter().flatten() {
                let matches = row
                    .get(table.code_field())
                    .and_then(Value::as_str)
                    .map(|c| c == code)
                    .unwrap_or(false);
                if matches {
                    let mut row = row.clone();
                    if let Some(obj) = row.as_object_mut() {
                        obj.entry("school_id").or_insert_with(|| json!(school_id));
                    }
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    async fn fetch_tenant(&self, school_id: &str) -> Result<Value, DirectoryError> {
        let tenants = self.lock()?;
        tenants
            .get(school_id)
            .cloned()
            .ok_or_else(|| DirectoryError::TenantNotFound(school_id.to_string()))
    }

    async fn replace_grades(
        &self,
        school_id: &str,
        student_id: &str,
        subject: &str,
        grades: Vec<Grade>,
    ) -> Result<(), DirectoryError> {
        let mut tenants = self.lock()?;
        let school = tenants
            .get_mut(school_id)
            .ok_or_else(|| DirectoryError::TenantNotFound(school_id.to_string()))?;

        let students = school
            .get_mut("students")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DirectoryError::Io("fixture school has no students array".to_string()))?;
        let student = students
            .iter_mut()
            .find(|s| s.get("id").map(value_to_id).as_deref() == Some(student_id))
            .ok_or_else(|| DirectoryError::Io(format!("student {} not in fixture", student_id)))?;

        if student.get("grades").and_then(Value::as_array).is_none() {
            student["grades"] = json!([]);
        }
        let rows = student["grades"]
            .as_array_mut()
            .ok_or_else(|| DirectoryError::Io("fixture grades is not an array".to_string()))?;

        // One replace-set under one lock: the delete and the insert cannot be
        // observed separately. An empty new set still clears the subject.
        rows.retain(|row| row.get("subject").and_then(Value::as_str) != Some(subject));
        for grade in grades {
            rows.push(casing::to_wire(&json!({
                "subject": subject,
                "subSubject": grade.sub_subject,
                "semester": u8::from(grade.semester),
                "assignment": grade.assignment,
                "score": grade.score,
            })));
        }

        Ok(())
    }
}

fn value_to_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn demo_school() -> Value {
    json!({
        "id": "demo-alpha",
        "name": "Académie Al Amal",
        "logo_url": "https://demo.invalid/al-amal.png",
        "is_active": true,
        "stages": ["PRIMARY", "MIDDLE"],
        "feature_flags": {
            "talkingCards": false
        },
        "principals": [
            { "id": "p1", "name": "Director X", "login_code": "dir-primary", "stage": "PRIMARY" },
            { "id": "p2", "name": "Director X", "login_code": "dir-middle", "stage": "MIDDLE" }
        ],
        "teachers": [
            {
                "id": "t1",
                "name": "Mme. Kada",
                "login_code": "teach-kada",
                "subjects": ["Math"],
                "assignments": { "3": ["A", "B"] },
                "salary": 52000
            },
            {
                "id": "t2",
                "name": "M. Brahim",
                "login_code": "teach-brahim",
                "subjects": ["Arabic"],
                "assignments": { "5": ["A"] }
            }
        ],
        "students": [
            {
                "id": "s1",
                "name": "Yasmine B.",
                "guardian_code": "g-yasmine",
                "stage": "PRIMARY",
                "level": "3",
                "class": "A",
                "grades": [
                    { "subject": "Math", "sub_subject": "Géométrie", "semester": 1, "assignment": 1, "score": 7 },
                    { "subject": "Math", "sub_subject": "Calcul", "semester": 1, "assignment": 2, "score": 8.5 },
                    { "subject": "Arabic", "sub_subject": "Dictée", "semester": 1, "assignment": 1, "score": null }
                ],
                "summaries": [
                    { "id": 9001, "subject": "Math", "title": "Fractions, chapitre 2" }
                ],
                "absences": [
                    { "id": 9101, "date": "2026-03-02", "justified": false }
                ],
                "fee_payments": [
                    { "id": 9201, "amount": 1500, "paid_at": "2026-02-01" }
                ]
            },
            {
                "id": "s2",
                "name": "Omar Z.",
                "guardian_code": "g-omar",
                "stage": "MIDDLE",
                "level": "5",
                "class": "A",
                "grades": [
                    { "subject": "Arabic", "sub_subject": "Expression", "semester": 2, "assignment": 1, "score": 6 }
                ],
                "summaries": [
                    { "id": 9002, "subject": "Arabic", "title": "La poésie antéislamique" }
                ],
                "quizzes": [
                    { "id": 9301, "subject": "Arabic", "title": "Quiz grammaire" }
                ]
            }
        ]
    })
}

fn deactivated_school() -> Value {
    json!({
        "id": "demo-omega",
        "name": "École Fermée",
        "is_active": false,
        "stages": ["PRIMARY"],
        "principals": [
            { "id": "p9", "name": "Director Closed", "login_code": "dir-closed", "stage": "PRIMARY" }
        ],
        "teachers": [],
        "students": []
    })
}
