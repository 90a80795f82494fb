//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::Arc;

use madaris_core::credentials::DerivedCredentialBroker;
use madaris_core::fixture::FixtureDirectory;
use madaris_core::session::SessionBootstrapper;

/// Quiet by default; RUST_LOG surfaces the pipeline's tracing output.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Bootstrapper over a custom wire-shape tenant set, plus a handle to the
/// backing directory for direct mutation (grade replacement).
pub fn bootstrapper_with(payloads: Vec<Value>) -> (SessionBootstrapper, Arc<FixtureDirectory>) {
    init_tracing();
    let directory = Arc::new(FixtureDirectory::with_tenants(payloads));
    let bootstrapper = SessionBootstrapper::new(directory.clone(), Arc::new(DerivedCredentialBroker::new()));
    (bootstrapper, directory)
}

/// Bootstrapper over the shipped demo tenant set.
pub fn demo_bootstrapper() -> (SessionBootstrapper, Arc<FixtureDirectory>) {
    init_tracing();
    let directory = Arc::new(FixtureDirectory::demo());
    let bootstrapper = SessionBootstrapper::new(directory.clone(), Arc::new(DerivedCredentialBroker::new()));
    (bootstrapper, directory)
}

/// Minimal single-student school, wire shape.
pub fn school_t1() -> Value {
    json!({
        "id": "T1",
        "name": "Test School",
        "is_active": true,
        "stages": ["PRIMARY"],
        "principals": [
            { "id": "p1", "name": "Director", "login_code": "prin-1", "stage": "PRIMARY" }
        ],
        "teachers": [
            {
                "id": "t1",
                "name": "Teacher One",
                "login_code": "teach-1",
                "subjects": ["Math"],
                "assignments": { "3": ["A"] }
            }
        ],
        "students": [
            {
                "id": "s1",
                "name": "Student One",
                "guardian_code": "g1",
                "stage": "PRIMARY",
                "level": "3",
                "class": "A",
                "grades": [
                    { "subject": "Math", "sub_subject": "Géométrie", "semester": 1, "assignment": 1, "score": 7 }
                ],
                "summaries": [
                    { "id": 1, "subject": "Math", "title": "Chapitre 1" }
                ]
            }
        ]
    })
}

/// A school where one code string exists as both a guardian code and a
/// teacher login code.
pub fn school_with_code_collision(code: &str) -> Value {
    json!({
        "id": "T2",
        "name": "Collision School",
        "is_active": true,
        "students": [
            {
                "id": "s-dup",
                "name": "Collision Student",
                "guardian_code": code,
                "stage": "PRIMARY",
                "level": "1",
                "class": "A"
            }
        ],
        "teachers": [
            {
                "id": "t-dup",
                "name": "Collision Teacher",
                "login_code": code,
                "subjects": ["Math"],
                "assignments": {}
            }
        ],
        "principals": []
    })
}
