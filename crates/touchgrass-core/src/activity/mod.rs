//! Activity recommendation: context, candidate pools and the rule engine.

mod catalog;
mod context;
mod engine;
mod history;
mod hydration;

pub use catalog::{candidate_pool, ActivityKind, Candidate, SuggestedActivity};
pub use context::{
    ActivityCategory, ActivityContext, CompletedActivity, MeetingDensity, TimeOfDay, TimeWindow,
    SAT_TOO_LONG_SECS,
};
pub use engine::{recommend, Recommendation, SelectionRule};
pub use history::{ActivityHistory, ActivityLog};
pub use hydration::{hydration_advice, HydrationAdvice};
