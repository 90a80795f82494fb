//! Student-owned content collections.
//!
//! The wire payload nests each of these under its owning student row; the
//! domain model keeps them there (the student map is the arena) and exposes
//! tenant-wide collections as computed views, so the nested and flattened
//! shapes can never diverge after a partial update.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Stage;

/// One variant per per-student content family the product ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionKind {
    Announcements,
    Summaries,
    Exercises,
    Notes,
    Absences,
    ExamPrograms,
    Notifications,
    Complaints,
    Tips,
    FeePayments,
    InterviewRequests,
    PersonalizedExercises,
    SupplementaryLessons,
    Timetables,
    Quizzes,
    Projects,
    LibraryItems,
    AlbumPhotos,
    UnifiedAssessments,
    TalkingCards,
    MemorizationItems,
    Feedback,
    Expenses,
}

impl CollectionKind {
    pub const ALL: &'static [CollectionKind] = &[
        CollectionKind::Announcements,
        CollectionKind::Summaries,
        CollectionKind::Exercises,
        CollectionKind::Notes,
        CollectionKind::Absences,
        CollectionKind::ExamPrograms,
        CollectionKind::Notifications,
        CollectionKind::Complaints,
        CollectionKind::Tips,
        CollectionKind::FeePayments,
        CollectionKind::InterviewRequests,
        CollectionKind::PersonalizedExercises,
        CollectionKind::SupplementaryLessons,
        CollectionKind::Timetables,
        CollectionKind::Quizzes,
        CollectionKind::Projects,
        CollectionKind::LibraryItems,
        CollectionKind::AlbumPhotos,
        CollectionKind::UnifiedAssessments,
        CollectionKind::TalkingCards,
        CollectionKind::MemorizationItems,
        CollectionKind::Feedback,
        CollectionKind::Expenses,
    ];

    /// Field name on the camelCased student payload.
    pub fn key(self) -> &'static str {
        match self {
            CollectionKind::Announcements => "announcements",
            CollectionKind::Summaries => "summaries",
            CollectionKind::Exercises => "exercises",
            CollectionKind::Notes => "notes",
            CollectionKind::Absences => "absences",
            CollectionKind::ExamPrograms => "examPrograms",
            CollectionKind::Notifications => "notifications",
            CollectionKind::Complaints => "complaints",
            CollectionKind::Tips => "tips",
            CollectionKind::FeePayments => "feePayments",
            CollectionKind::InterviewRequests => "interviewRequests",
            CollectionKind::PersonalizedExercises => "personalizedExercises",
            CollectionKind::SupplementaryLessons => "supplementaryLessons",
            CollectionKind::Timetables => "timetables",
            CollectionKind::Quizzes => "quizzes",
            CollectionKind::Projects => "projects",
            CollectionKind::LibraryItems => "libraryItems",
            CollectionKind::AlbumPhotos => "albumPhotos",
            CollectionKind::UnifiedAssessments => "unifiedAssessments",
            CollectionKind::TalkingCards => "talkingCards",
            CollectionKind::MemorizationItems => "memorizationItems",
            CollectionKind::Feedback => "feedback",
            CollectionKind::Expenses => "expenses",
        }
    }
}

/// A single content record with its denormalized filter context.
///
/// The context fields are injected from the owning student at parse time, so a
/// flattened tenant-wide view can be filtered by level/class/subject/stage
/// without re-joining to the student arena. Original payload fields live in
/// `fields` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Option<String>,
    pub student_id: String,
    pub level: Option<String>,
    pub class: Option<String>,
    pub stage: Option<Stage>,
    pub subject: Option<String>,
    /// Remaining item fields, camelCased, as delivered.
    pub fields: Map<String, Value>,
}

impl ContentItem {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}
