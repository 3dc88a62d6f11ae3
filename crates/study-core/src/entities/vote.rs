//! Vote direction and the denormalized counters kept on a target

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::traits::Document;

/// Direction of a user's vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }

    /// Parse the stored representation, `None` for anything else
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "upvote" => Some(Self::Upvote),
            "downvote" => Some(Self::Downvote),
            _ => None,
        }
    }

    /// The other direction
    #[inline]
    pub fn opposite(&self) -> Self {
        match self {
            Self::Upvote => Self::Downvote,
            Self::Downvote => Self::Upvote,
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate vote counters stored on a question or answer
///
/// `score` is always `upvotes - downvotes`; every mutator recomputes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounters {
    pub upvotes: u64,
    pub downvotes: u64,
    pub score: i64,
}

impl VoteCounters {
    pub const UPVOTES_FIELD: &'static str = "upvotes";
    pub const DOWNVOTES_FIELD: &'static str = "downvotes";
    pub const SCORE_FIELD: &'static str = "score";

    /// Build counters from raw tallies
    pub fn new(upvotes: u64, downvotes: u64) -> Self {
        let mut counters = Self {
            upvotes,
            downvotes,
            score: 0,
        };
        counters.recompute_score();
        counters
    }

    /// Read counters from a target document
    ///
    /// Missing, negative or non-numeric fields count as zero. The stored
    /// `score` is ignored and recomputed from the two tallies.
    pub fn from_document(doc: &Document) -> Self {
        Self::new(
            read_tally(doc, Self::UPVOTES_FIELD),
            read_tally(doc, Self::DOWNVOTES_FIELD),
        )
    }

    /// Rebuild counters by replaying individual votes
    pub fn replay<I>(votes: I) -> Self
    where
        I: IntoIterator<Item = VoteType>,
    {
        let mut counters = Self::default();
        for vote in votes {
            counters.increment(vote);
        }
        counters
    }

    /// Add one vote of the given direction
    pub fn increment(&mut self, vote: VoteType) {
        match vote {
            VoteType::Upvote => self.upvotes += 1,
            VoteType::Downvote => self.downvotes += 1,
        }
        self.recompute_score();
    }

    /// Remove one vote of the given direction
    ///
    /// Returns `false` when the tally was already zero (the counter drifted
    /// from the reactions); the tally stays at zero in that case.
    pub fn decrement(&mut self, vote: VoteType) -> bool {
        let tally = match vote {
            VoteType::Upvote => &mut self.upvotes,
            VoteType::Downvote => &mut self.downvotes,
        };
        let consistent = *tally > 0;
        *tally = tally.saturating_sub(1);
        self.recompute_score();
        consistent
    }

    /// Tally for one direction
    pub fn count(&self, vote: VoteType) -> u64 {
        match vote {
            VoteType::Upvote => self.upvotes,
            VoteType::Downvote => self.downvotes,
        }
    }

    /// Check the `score == upvotes - downvotes` invariant
    pub fn is_consistent(&self) -> bool {
        i128::from(self.score) == i128::from(self.upvotes) - i128::from(self.downvotes)
    }

    /// Fields to merge into the target document
    pub fn to_patch(&self) -> Document {
        let mut patch = Document::new();
        patch.insert(Self::UPVOTES_FIELD.to_string(), Value::from(self.upvotes));
        patch.insert(Self::DOWNVOTES_FIELD.to_string(), Value::from(self.downvotes));
        patch.insert(Self::SCORE_FIELD.to_string(), Value::from(self.score));
        patch
    }

    fn recompute_score(&mut self) {
        self.score = self.upvotes as i64 - self.downvotes as i64;
    }
}

fn read_tally(doc: &Document, field: &str) -> u64 {
    match doc.get(field) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}
