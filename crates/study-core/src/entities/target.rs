//! Votable targets - community questions and their answers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{DocumentId, DocumentPath, UserId};

/// Root collection holding community questions
pub const DEFAULT_QUESTIONS_COLLECTION: &str = "communityQuestions";

/// Sub-collection holding answers below a question
pub const ANSWERS_COLLECTION: &str = "answers";

/// Sub-collection holding one reaction document per user below a target
pub const REACTIONS_COLLECTION: &str = "reactions";

/// Kind of votable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Question,
    Answer,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a question or an answer that can receive votes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetRef {
    Question {
        question_id: DocumentId,
    },
    Answer {
        question_id: DocumentId,
        answer_id: DocumentId,
    },
}

impl TargetRef {
    /// Reference a question
    pub fn question(question_id: DocumentId) -> Self {
        Self::Question { question_id }
    }

    /// Reference an answer posted under a question
    pub fn answer(question_id: DocumentId, answer_id: DocumentId) -> Self {
        Self::Answer {
            question_id,
            answer_id,
        }
    }

    /// Kind of the target
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Question { .. } => TargetKind::Question,
            Self::Answer { .. } => TargetKind::Answer,
        }
    }

    /// Id of the target document itself
    pub fn target_id(&self) -> &DocumentId {
        match self {
            Self::Question { question_id } => question_id,
            Self::Answer { answer_id, .. } => answer_id,
        }
    }

    /// Path of the target document below the given questions collection
    pub fn document_path(&self, questions_collection: &str) -> DocumentPath {
        match self {
            Self::Question { question_id } => {
                DocumentPath::new(questions_collection, question_id.clone())
            }
            Self::Answer {
                question_id,
                answer_id,
            } => DocumentPath::new(questions_collection, question_id.clone())
                .child(ANSWERS_COLLECTION, answer_id.clone()),
        }
    }

    /// Collection holding every reaction on this target
    pub fn reactions_collection(&self, questions_collection: &str) -> String {
        self.document_path(questions_collection)
            .sub_collection(REACTIONS_COLLECTION)
    }

    /// Path of one user's reaction on this target
    ///
    /// Keying the document by user id is what keeps reactions unique per
    /// `(target, user)`.
    pub fn reaction_path(&self, questions_collection: &str, user_id: &UserId) -> DocumentPath {
        DocumentPath::new(
            self.reactions_collection(questions_collection),
            DocumentId::from(user_id.clone()),
        )
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question { question_id } => write!(f, "question {question_id}"),
            Self::Answer {
                question_id,
                answer_id,
            } => write!(f, "answer {answer_id} (question {question_id})"),
        }
    }
}
