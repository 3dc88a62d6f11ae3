//! Business logic services
//!
//! Services borrow a [`ServiceContext`] for their dependencies and run all
//! reads and writes through the document store port.

pub mod context;
pub mod error;
pub mod ledger;
pub mod matching;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use ledger::{require_signed_in, ReactionLedger, RecountReport, VoteAction, VoteOutcome};
pub use matching::{MatchBreakdown, MatchScorer, PartnerService, RankedCandidate};
