//! Keyword scoring for candidate records.
//!
//! A score starts at `base`, gains the signed weight of every keyword found
//! (case-insensitive substring, counted once), and is clamped to `[0, 100]`.
//! Every keyword contributes independently, so table order never matters.
//!
//! Records additionally pick up discrete-field weights:
//! - `sector_weights`: matched against each sector tag (exact, case-insensitive)
//! - `stage_weights`:  substring of the stage label
//! - `location_bonus`: once, if any comma-separated part of the location equals
//!   one of `locations`

use serde::{Deserialize, Serialize};

use crate::record::CandidateRecord;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordWeight {
    pub keyword: String,
    pub weight: i32,
}

impl KeywordWeight {
    pub fn new(keyword: &str, weight: i32) -> Self {
        Self {
            keyword: keyword.to_string(),
            weight,
        }
    }
}

/// Missing fields take their values from `ScoringConfig::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base: i32,
    pub keywords: Vec<KeywordWeight>,
    pub sector_weights: Vec<KeywordWeight>,
    pub stage_weights: Vec<KeywordWeight>,
    pub locations: Vec<String>,
    pub location_bonus: i32,
    /// Qualification threshold (inclusive).
    pub min_score: i32,
}

fn default_keywords() -> Vec<KeywordWeight> {
    vec![
        KeywordWeight::new("saas", 20),
        KeywordWeight::new("b2b", 15),
        KeywordWeight::new("software", 10),
        KeywordWeight::new("pre-seed", 15),
        KeywordWeight::new("early stage", 10),
        KeywordWeight::new("portfolio", 15),
        KeywordWeight::new("ticket size", 10),
        KeywordWeight::new("venture", 5),
        KeywordWeight::new("capital", 5),
        KeywordWeight::new("consulting", -25),
        KeywordWeight::new("agency", -25),
        KeywordWeight::new("real estate", -30),
        KeywordWeight::new("crypto", -20),
        KeywordWeight::new("course", -20),
        KeywordWeight::new("private equity", -25),
        KeywordWeight::new("hiring", -15),
    ]
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base: 50,
            keywords: default_keywords(),
            sector_weights: vec![
                KeywordWeight::new("saas", 10),
                KeywordWeight::new("b2b", 10),
                KeywordWeight::new("fintech", 5),
            ],
            stage_weights: vec![
                KeywordWeight::new("pre-seed", 10),
                KeywordWeight::new("seed", 5),
            ],
            locations: [
                "US",
                "San Francisco",
                "New York",
                "Boston",
                "California",
                "Silicon Valley",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            location_bonus: 5,
            min_score: 50,
        }
    }
}

/// Result of scoring, with the keywords that fired (for record notes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub score: i32,
    pub matched: Vec<String>,
    pub penalties: Vec<String>,
}

impl ScoreBreakdown {
    /// Short human-readable summary, `None` when nothing fired.
    pub fn note(&self) -> Option<String> {
        let mut parts = Vec::new();
        if !self.matched.is_empty() {
            parts.push(format!("Matched: {}", self.matched.join(", ")));
        }
        if !self.penalties.is_empty() {
            parts.push(format!("Penalties: {}", self.penalties.join(", ")));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scorer {
    cfg: ScoringConfig,
}

impl Scorer {
    pub fn new(cfg: ScoringConfig) -> Self {
        Self { cfg }
    }

    /// Score free text only.
    pub fn score_text(&self, text: &str) -> i32 {
        self.breakdown_text(text).score
    }

    pub fn breakdown_text(&self, text: &str) -> ScoreBreakdown {
        let mut acc = Accumulator::new(self.cfg.base);
        acc.add_text(text, &self.cfg.keywords);
        acc.finish()
    }

    /// Score a record from its title and snippet plus stage/location/sector fields.
    pub fn breakdown_record(&self, rec: &CandidateRecord) -> ScoreBreakdown {
        let mut acc = Accumulator::new(self.cfg.base);
        let free_text = [rec.title.as_deref(), rec.snippet.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !free_text.is_empty() {
            acc.add_text(&free_text, &self.cfg.keywords);
        }

        for kw in &self.cfg.sector_weights {
            if rec
                .sectors
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(kw.keyword.trim()))
            {
                acc.hit(&kw.keyword, kw.weight);
            }
        }

        if let Some(stage) = rec.stage.as_deref() {
            acc.add_text(stage, &self.cfg.stage_weights);
        }

        // a fallback label says nothing about where the investor is
        let in_location = !rec.location_is_default
            && rec.location.split(',').map(str::trim).any(|part| {
            self.cfg
                .locations
                .iter()
                .any(|l| l.trim().eq_ignore_ascii_case(part))
        });
        if in_location && self.cfg.location_bonus != 0 {
            acc.hit("location", self.cfg.location_bonus);
        }

        acc.finish()
    }

    /// Write score and derived notes onto the record.
    pub fn apply(&self, rec: &mut CandidateRecord) {
        let b = self.breakdown_record(rec);
        rec.score = b.score;
        if let Some(note) = b.note() {
            rec.notes = Some(note);
        }
    }

    pub fn is_qualified(&self, rec: &CandidateRecord) -> bool {
        rec.score >= self.cfg.min_score
    }
}

struct Accumulator {
    total: i64,
    matched: Vec<String>,
    penalties: Vec<String>,
}

impl Accumulator {
    fn new(base: i32) -> Self {
        Self {
            total: i64::from(base),
            matched: Vec::new(),
            penalties: Vec::new(),
        }
    }

    fn add_text(&mut self, text: &str, table: &[KeywordWeight]) {
        let lower = text.to_lowercase();
        for kw in table {
            let needle = kw.keyword.trim().to_lowercase();
            if !needle.is_empty() && lower.contains(&needle) {
                self.hit(&kw.keyword, kw.weight);
            }
        }
    }

    fn hit(&mut self, label: &str, weight: i32) {
        self.total += i64::from(weight);
        match weight.signum() {
            1 => self.matched.push(label.to_string()),
            -1 => self.penalties.push(label.to_string()),
            _ => {}
        }
    }

    fn finish(self) -> ScoreBreakdown {
        ScoreBreakdown {
            score: clamp_score(self.total),
            matched: self.matched,
            penalties: self.penalties,
        }
    }
}

/// Clamp to `[0, 100]`. Negative totals are floored at 0.
pub fn clamp_score(total: i64) -> i32 {
    total.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer(base: i32, kws: &[(&str, i32)]) -> Scorer {
        Scorer::new(ScoringConfig {
            base,
            keywords: kws.iter().map(|(k, w)| KeywordWeight::new(k, *w)).collect(),
            sector_weights: vec![],
            stage_weights: vec![],
            locations: vec![],
            location_bonus: 0,
            min_score: 50,
        })
    }

    #[test]
    fn empty_text_is_clamped_base() {
        assert_eq!(scorer(50, &[]).score_text(""), 50);
        assert_eq!(scorer(150, &[]).score_text(""), 100);
        assert_eq!(scorer(-10, &[]).score_text(""), 0);
    }

    #[test]
    fn keyword_counts_once_and_is_case_insensitive() {
        let s = scorer(0, &[("saas", 20)]);
        assert_eq!(s.score_text("SaaS saas SAAS"), 20);
    }

    #[test]
    fn negative_total_floors_at_zero() {
        let s = scorer(10, &[("crypto", -20), ("agency", -25)]);
        assert_eq!(s.score_text("crypto agency"), 0);
    }

    #[test]
    fn blank_keyword_never_matches() {
        let s = scorer(10, &[("  ", 50)]);
        assert_eq!(s.score_text("anything"), 10);
    }

    #[test]
    fn breakdown_note_lists_hits() {
        let s = scorer(50, &[("saas", 20), ("crypto", -20)]);
        let b = s.breakdown_text("SaaS and crypto");
        assert_eq!(b.note().as_deref(), Some("Matched: saas | Penalties: crypto"));
        assert_eq!(s.breakdown_text("nothing").note(), None);
    }

    #[test]
    fn record_fields_contribute() {
        let s = Scorer::new(ScoringConfig {
            base: 40,
            keywords: vec![],
            ..ScoringConfig::default()
        });
        let mut rec = CandidateRecord::new("Susa Ventures", "static");
        rec.location = "San Francisco, US".into();
        rec.sectors = vec!["B2B".into(), "SaaS".into(), "Marketplaces".into()];
        rec.stage = Some("pre-seed, seed".into());
        // 40 + saas 10 + b2b 10 + pre-seed 10 + seed 5 + location 5
        s.apply(&mut rec);
        assert_eq!(rec.score, 80);
        let notes = rec.notes.unwrap_or_default();
        assert!(notes.contains("pre-seed"));
        assert!(!notes.contains("fintech"));
    }

    #[test]
    fn location_match_is_per_part() {
        let s = Scorer::new(ScoringConfig {
            base: 0,
            keywords: vec![],
            sector_weights: vec![],
            stage_weights: vec![],
            locations: vec!["US".into()],
            location_bonus: 5,
            min_score: 0,
        });
        let mut rec = CandidateRecord::new("A", "static");
        rec.location = "Houston".into();
        assert_eq!(s.breakdown_record(&rec).score, 0);
        rec.location = "Houston, US".into();
        assert_eq!(s.breakdown_record(&rec).score, 5);
    }

    #[test]
    fn fallback_location_earns_no_bonus() {
        let s = Scorer::new(ScoringConfig {
            base: 50,
            keywords: vec![],
            ..ScoringConfig::default()
        });
        let mut rec = CandidateRecord::new("A", "search");
        rec.location = "US".into();
        assert_eq!(s.breakdown_record(&rec).score, 55);
        rec.location_is_default = true;
        assert_eq!(s.breakdown_record(&rec).score, 50);
    }

    #[test]
    fn title_and_snippet_are_scored_together() {
        let s = scorer(50, &[("saas", 20), ("crypto", -20), ("agency", -25)]);
        let mut rec = CandidateRecord::new("Crypto Agency", "search");
        rec.title = Some("Crypto Agency - Growth for SaaS".into());
        assert_eq!(s.breakdown_record(&rec).score, 25);

        // a keyword in both title and snippet still counts once
        rec.snippet = Some("saas saas".into());
        assert_eq!(s.breakdown_record(&rec).score, 25);
    }
}
