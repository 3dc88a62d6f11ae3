//! Test fixtures and data generators
//!
//! Provides reusable documents and identifiers for integration tests.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use study_core::{AcademicLevel, Document, DocumentId, UserId, UserProfile};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A fresh document id, e.g. `question-7`
pub fn unique_id(prefix: &str) -> DocumentId {
    DocumentId::parse(format!("{prefix}-{}", unique_suffix())).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

/// `count` distinct users named `student-0`, `student-1`, ...
pub fn students(count: usize) -> Vec<UserId> {
    (0..count).map(|i| user(&format!("student-{i}"))).collect()
}

pub fn to_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}

/// A freshly submitted question with zeroed counters
pub fn question_document(title: &str) -> Document {
    to_document(json!({
        "title": title,
        "body": "Looking for a clear explanation.",
        "authorId": "author",
        "upvotes": 0,
        "downvotes": 0,
        "score": 0
    }))
}

/// An answer written before counters were added to answers
pub fn legacy_answer_document(text: &str) -> Document {
    to_document(json!({
        "text": text,
        "authorId": "helper"
    }))
}

/// Profile pair from the reference scoring example (score 23)
pub fn reference_profiles() -> (UserProfile, UserProfile) {
    let me = UserProfile::new(user("me"))
        .with_subjects(["Math", "Biology"])
        .with_methods(["Group"])
        .with_academic_level(AcademicLevel::ALevel);
    let other = UserProfile::new(user("other"))
        .with_subjects(["Math", "Chemistry"])
        .with_methods(["Group"])
        .with_academic_level(AcademicLevel::ALevel);
    (me, other)
}

/// Stored user documents as the profile screens write them
pub fn user_documents() -> Vec<(&'static str, Document)> {
    vec![
        (
            "tariro",
            to_document(json!({
                "uid": "tariro",
                "displayName": "Tariro",
                "subjects": ["Math", "Physics", "Chemistry"],
                "methods": ["Group", "Flashcards"],
                "preferences": ["Evening"],
                "academicLevel": "A-Level"
            })),
        ),
        (
            "farai",
            to_document(json!({
                "displayName": "Farai",
                "subjects": ["Math", "Physics"],
                "methods": ["Group"],
                "preferences": ["Evening", "Weekend"],
                "academicLevel": "A-Level"
            })),
        ),
        (
            "chipo",
            to_document(json!({
                "displayName": "Chipo",
                "subjects": ["Biology"],
                "methods": ["Flashcards"],
                "academicLevel": "O-Level"
            })),
        ),
        (
            "nyasha",
            to_document(json!({
                "displayName": "Nyasha",
                "subjects": ["Math"],
                "preferences": ["Evening"]
            })),
        ),
        (
            "rudo",
            to_document(json!({
                "displayName": "Rudo",
                "subjects": null,
                "academicLevel": "Masters"
            })),
        ),
    ]
}
