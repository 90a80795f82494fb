//! Typed domain model for a denormalized tenant (school) view.
//!
//! The wire payload arrives as one deeply nested record per school; after
//! key-casing and denormalization it becomes this model. Students form an
//! arena keyed by id; flattened tenant-wide collections are computed views
//! over that arena rather than duplicated arrays.

mod content;

pub use content::{CollectionKind, ContentItem};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::features::FlagState;

/// Grade-band grouping. Scopes principals and the available levels/subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    PreSchool,
    Primary,
    Middle,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    First,
    Second,
}

impl TryFrom<u8> for Semester {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::First),
            2 => Ok(Semester::Second),
            other => Err(format!("semester must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Semester> for u8 {
    fn from(value: Semester) -> u8 {
        match value {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

/// One scored (or not-yet-scored) assessment cell.
///
/// The subject discriminator lives only on the wire row; after grouping it is
/// the key of the student's grade map. At most one grade exists per
/// `(student, subject, sub_subject, semester, assignment)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub sub_subject: String,
    pub semester: Semester,
    /// First or second assignment of the semester (1 or 2).
    pub assignment: u8,
    /// In [0, 10]. `None` means not yet scored.
    pub score: Option<f64>,
}

/// One principal row. A principal record is scoped to exactly one stage; a
/// person managing several stages has several rows sharing a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub login_code: String,
    pub stage: Stage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub login_code: String,
    pub subjects: Vec<String>,
    /// Level -> class names this teacher covers.
    pub assignments: BTreeMap<String, Vec<String>>,
    pub salary: Option<f64>,
}

impl Teacher {
    /// Whether the teacher covers the given level/class pair.
    pub fn covers(&self, level: &str, class: &str) -> bool {
        self.assignments
            .get(level)
            .map(|classes| classes.iter().any(|c| c == class))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub guardian_code: String,
    pub stage: Option<Stage>,
    pub level: Option<String>,
    pub class: Option<String>,
    /// Subject -> grades, grouped from the flat wire rows.
    pub grades: BTreeMap<String, Vec<Grade>>,
    /// Per-kind content owned by this student.
    pub content: BTreeMap<CollectionKind, Vec<ContentItem>>,
}

/// The denormalized per-school view the UI binds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub stages: BTreeSet<Stage>,
    /// Flag key -> explicit state. Absent keys are `Unset`, which the gate
    /// coerces to enabled.
    pub feature_flags: BTreeMap<String, FlagState>,
    pub principals_by_stage: BTreeMap<Stage, Vec<Principal>>,
    pub teachers: Vec<Teacher>,
    /// Student arena, addressable by id.
    pub students: BTreeMap<String, Student>,
}

impl Tenant {
    pub fn empty(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logo_url: None,
            is_active: true,
            stages: BTreeSet::new(),
            feature_flags: BTreeMap::new(),
            principals_by_stage: BTreeMap::new(),
            teachers: Vec::new(),
            students: BTreeMap::new(),
        }
    }

    /// Tenant-wide view of one content family, concatenated across the student
    /// arena. Ordering within is per-student payload order; presentation-level
    /// ordering (most-recent-first) is the UI's concern.
    pub fn collection(&self, kind: CollectionKind) -> impl Iterator<Item = &ContentItem> + '_ {
        self.students
            .values()
            .flat_map(move |s| s.content.get(&kind).map(Vec::as_slice).unwrap_or(&[]).iter())
    }

    pub fn collection_len(&self, kind: CollectionKind) -> usize {
        self.students
            .values()
            .map(|s| s.content.get(&kind).map(Vec::len).unwrap_or(0))
            .sum()
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.get(id)
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn principal(&self, id: &str) -> Option<&Principal> {
        self.principals_by_stage
            .values()
            .flat_map(|list| list.iter())
            .find(|p| p.id == id)
    }

    /// Grades grouped by subject for one student.
    pub fn grades_by_subject_for(&self, student_id: &str) -> Option<&BTreeMap<String, Vec<Grade>>> {
        self.students.get(student_id).map(|s| &s.grades)
    }

    /// Role-scoped view: the students a teacher covers, per their
    /// level -> classes assignments.
    pub fn students_for_teacher<'a>(&'a self, teacher: &'a Teacher) -> impl Iterator<Item = &'a Student> {
        self.students.values().filter(move |s| match (&s.level, &s.class) {
            (Some(level), Some(class)) => teacher.covers(level, class),
            _ => false,
        })
    }

    /// Role-scoped view: one content family filtered to a teacher's
    /// assignments and subjects. Items without a subject pass the subject
    /// filter (they are class-scoped, not subject-scoped).
    pub fn collection_for_teacher<'a>(
        &'a self,
        kind: CollectionKind,
        teacher: &'a Teacher,
    ) -> impl Iterator<Item = &'a ContentItem> {
        self.collection(kind).filter(move |item| {
            let in_assignments = match (&item.level, &item.class) {
                (Some(level), Some(class)) => teacher.covers(level, class),
                _ => false,
            };
            let in_subjects = match &item.subject {
                Some(subject) => teacher.subjects.iter().any(|s| s == subject),
                None => true,
            };
            in_assignments && in_subjects
        })
    }

    /// Role-scoped view: one content family filtered to a guardian's student.
    pub fn collection_for_student<'a>(
        &'a self,
        kind: CollectionKind,
        student_id: &'a str,
    ) -> impl Iterator<Item = &'a ContentItem> {
        self.collection(kind).filter(move |item| item.student_id == student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, level: &str, class: &str) -> Student {
        Student {
            id: id.to_string(),
            name: format!("Student {}", id),
            guardian_code: format!("g-{}", id),
            stage: Some(Stage::Primary),
            level: Some(level.to_string()),
            class: Some(class.to_string()),
            grades: BTreeMap::new(),
            content: BTreeMap::new(),
        }
    }

    #[test]
    fn collection_view_concatenates_across_arena() {
        let mut tenant = Tenant::empty("T1", "Demo");
        let mut s1 = student("s1", "3", "A");
        let mut s2 = student("s2", "3", "B");
        s1.content.insert(
            CollectionKind::Summaries,
            vec![ContentItem {
                id: Some("m1".into()),
                student_id: "s1".into(),
                level: Some("3".into()),
                class: Some("A".into()),
                stage: Some(Stage::Primary),
                subject: Some("Math".into()),
                fields: serde_json::Map::new(),
            }],
        );
        s2.content.insert(
            CollectionKind::Summaries,
            vec![ContentItem {
                id: Some("m2".into()),
                student_id: "s2".into(),
                level: Some("3".into()),
                class: Some("B".into()),
                stage: Some(Stage::Primary),
                subject: Some("Math".into()),
                fields: serde_json::Map::new(),
            }],
        );
        tenant.students.insert(s1.id.clone(), s1);
        tenant.students.insert(s2.id.clone(), s2);

        assert_eq!(tenant.collection_len(CollectionKind::Summaries), 2);
        assert_eq!(tenant.collection(CollectionKind::Summaries).count(), 2);
        assert_eq!(tenant.collection_len(CollectionKind::Quizzes), 0);
    }

    #[test]
    fn teacher_scoped_views_filter_by_assignment_and_subject() {
        let mut tenant = Tenant::empty("T1", "Demo");
        tenant.students.insert("s1".into(), student("s1", "3", "A"));
        tenant.students.insert("s2".into(), student("s2", "4", "A"));

        let teacher = Teacher {
            id: "t1".into(),
            name: "Teacher".into(),
            login_code: "t-1".into(),
            subjects: vec!["Math".into()],
            assignments: BTreeMap::from([("3".to_string(), vec!["A".to_string()])]),
            salary: None,
        };

        let scoped: Vec<_> = tenant.students_for_teacher(&teacher).map(|s| s.id.clone()).collect();
        assert_eq!(scoped, vec!["s1".to_string()]);
    }

    #[test]
    fn semester_rejects_out_of_range() {
        assert!(Semester::try_from(1).is_ok());
        assert!(Semester::try_from(3).is_err());
        let parsed: Result<Semester, _> = serde_json::from_str("2");
        assert_eq!(parsed.unwrap(), Semester::Second);
    }
}
