//! Study partner matching
//!
//! [`MatchScorer`] is a pure weighted-overlap heuristic over two profiles.
//! [`PartnerService`] loads profiles from the store and ranks candidates.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use study_core::{DocumentId, DomainError, UserId, UserProfile};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Per-attribute overlap between two profiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBreakdown {
    pub shared_subjects: usize,
    pub shared_methods: usize,
    pub shared_preferences: usize,
    pub level_match: bool,
}

impl MatchBreakdown {
    pub fn subject_points(&self) -> u32 {
        points(self.shared_subjects, MatchScorer::SUBJECT_POINTS)
    }

    pub fn method_points(&self) -> u32 {
        points(self.shared_methods, MatchScorer::METHOD_POINTS)
    }

    pub fn preference_points(&self) -> u32 {
        points(self.shared_preferences, MatchScorer::PREFERENCE_POINTS)
    }

    pub fn level_points(&self) -> u32 {
        if self.level_match {
            MatchScorer::LEVEL_POINTS
        } else {
            0
        }
    }

    /// Sum of all contributions
    pub fn total(&self) -> u32 {
        self.subject_points()
            .saturating_add(self.method_points())
            .saturating_add(self.preference_points())
            .saturating_add(self.level_points())
    }
}

fn points(overlap: usize, weight: u32) -> u32 {
    u32::try_from(overlap)
        .unwrap_or(u32::MAX)
        .saturating_mul(weight)
}

/// A scored partner candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub score: u32,
}

/// Compatibility score between two student profiles
///
/// `10 * shared subjects + 5 * shared methods + 3 * shared preferences`,
/// plus 8 when both academic levels are set and equal. Deterministic and
/// symmetric; has no error path.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer;

impl MatchScorer {
    pub const SUBJECT_POINTS: u32 = 10;
    pub const METHOD_POINTS: u32 = 5;
    pub const PREFERENCE_POINTS: u32 = 3;
    pub const LEVEL_POINTS: u32 = 8;

    /// Score `other` as a partner for `me`
    pub fn score(me: &UserProfile, other: &UserProfile) -> u32 {
        Self::breakdown(me, other).total()
    }

    /// Overlap counts behind a score
    pub fn breakdown(me: &UserProfile, other: &UserProfile) -> MatchBreakdown {
        MatchBreakdown {
            shared_subjects: me.subjects.intersection(&other.subjects).count(),
            shared_methods: me.methods.intersection(&other.methods).count(),
            shared_preferences: me.preferences.intersection(&other.preferences).count(),
            level_match: matches!(
                (me.academic_level, other.academic_level),
                (Some(mine), Some(theirs)) if mine == theirs
            ),
        }
    }

    /// Rank candidates for `me`, best first
    ///
    /// Skips `me` itself, keeps input order among equal scores and returns at
    /// most `limit` entries.
    pub fn rank<'p, I>(me: &UserProfile, candidates: I, limit: usize) -> Vec<RankedCandidate>
    where
        I: IntoIterator<Item = &'p UserProfile>,
    {
        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .filter(|candidate| candidate.uid != me.uid)
            .map(|candidate| RankedCandidate {
                user_id: candidate.uid.clone(),
                display_name: candidate.display_name.clone(),
                score: Self::score(me, candidate),
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }
}

/// Partner search over the stored user profiles
pub struct PartnerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PartnerService<'a> {
    /// Create a new PartnerService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Best study partners for a user
    ///
    /// Profiles that fail to decode are skipped.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn find_partners(&self, user_id: &UserId) -> ServiceResult<Vec<RankedCandidate>> {
        let profiles = self.load_profiles().await?;

        let me = profiles
            .iter()
            .find(|profile| &profile.uid == user_id)
            .ok_or_else(|| DomainError::ProfileNotFound(user_id.to_string()))?;

        let ranked = MatchScorer::rank(me, &profiles, self.ctx.matching().top_n);
        debug!(candidates = profiles.len() - 1, returned = ranked.len(), "Partners ranked");
        Ok(ranked)
    }

    async fn load_profiles(&self) -> ServiceResult<Vec<UserProfile>> {
        let collection = &self.ctx.matching().users_collection;
        let docs = self.ctx.store().list(collection).await?;

        Ok(docs
            .into_iter()
            .filter_map(|(id, doc)| match decode_profile(&id, doc) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(user_id = %id, error = %e, "Skipping unreadable profile");
                    None
                }
            })
            .collect())
    }
}

/// Profiles are keyed by uid; older documents do not repeat it in the body.
fn decode_profile(id: &DocumentId, mut doc: study_core::Document) -> serde_json::Result<UserProfile> {
    doc.entry("uid")
        .or_insert_with(|| Value::String(id.as_str().to_string()));
    serde_json::from_value(Value::Object(doc))
}
