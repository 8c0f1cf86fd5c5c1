//! Scoring and text heuristics applied to gathered records.

pub mod rules;
pub mod scoring;

pub use rules::{LabelRule, LabelRules};
pub use scoring::{KeywordWeight, ScoreBreakdown, Scorer, ScoringConfig};
