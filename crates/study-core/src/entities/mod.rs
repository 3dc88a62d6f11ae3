//! Domain entities - core business objects

mod profile;
mod reaction;
mod target;
mod vote;

pub use profile::{AcademicLevel, UserProfile};
pub use reaction::Reaction;
pub use target::{
    TargetKind, TargetRef, ANSWERS_COLLECTION, DEFAULT_QUESTIONS_COLLECTION, REACTIONS_COLLECTION,
};
pub use vote::{VoteCounters, VoteType};
