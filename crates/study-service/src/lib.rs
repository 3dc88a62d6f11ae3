//! # study-service
//!
//! Application layer: the vote ledger for community questions and answers,
//! and the study-partner match scorer.

pub mod services;

pub use services::{
    require_signed_in, MatchBreakdown, MatchScorer, PartnerService, RankedCandidate,
    ReactionLedger, RecountReport, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, VoteAction, VoteOutcome,
};
