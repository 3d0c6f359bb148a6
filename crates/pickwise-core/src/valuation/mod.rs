// Valuation engine: positional scarcity, composite scoring, recommendations.

pub mod recommend;
pub mod scarcity;
pub mod scoring;

pub use recommend::{recommend, Recommendation};
pub use scarcity::{
    compute_scarcity, ScarcityEntry, ScarcityProfile, ScarcitySettings, ScarcityUrgency,
};
pub use scoring::{score, score_breakdown, NeedMode, ScoreBreakdown, ScoringWeights};
