//! Reaction entity - one user's vote on a question or answer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DomainError;
use crate::traits::Document;
use crate::value_objects::{DocumentId, UserId};

use super::{TargetKind, TargetRef, VoteType};

/// Reaction entity
///
/// Stored at `<target>/reactions/{userId}`; at most one exists per
/// `(target, user)` and it is the source of truth for the target's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: UserId,
    pub target_id: DocumentId,
    pub target_type: TargetKind,
    #[serde(rename = "type")]
    pub vote: VoteType,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Field holding the vote direction
    pub const TYPE_FIELD: &'static str = "type";

    /// Create a new Reaction
    pub fn new(target: &TargetRef, user_id: UserId, vote: VoteType) -> Self {
        Self {
            user_id,
            target_id: target.target_id().clone(),
            target_type: target.kind(),
            vote,
            created_at: Utc::now(),
        }
    }

    /// Switch direction, refreshing the timestamp
    pub fn switch_to(&mut self, vote: VoteType) {
        self.vote = vote;
        self.created_at = Utc::now();
    }

    /// Vote direction stored in a raw reaction document
    ///
    /// `None` when the document holds some other reaction type.
    pub fn stored_vote(doc: &Document) -> Option<VoteType> {
        doc.get(Self::TYPE_FIELD)
            .and_then(Value::as_str)
            .and_then(VoteType::from_stored)
    }

    /// Decode a reaction document
    pub fn from_document(doc: &Document) -> Result<Self, DomainError> {
        serde_json::from_value(Value::Object(doc.clone()))
            .map_err(|e| DomainError::InvalidDocument(format!("reaction: {e}")))
    }

    /// Encode as a document
    pub fn to_document(&self) -> Result<Document, DomainError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(DomainError::InternalError(
                "reaction did not encode as an object".to_string(),
            )),
            Err(e) => Err(DomainError::InternalError(e.to_string())),
        }
    }

    /// Check if reaction has a specific direction
    #[inline]
    pub fn is_vote(&self, vote: VoteType) -> bool {
        self.vote == vote
    }
}
