//! Opportunity scoring and tier partition

use copysmith_core::{Competition, KeywordCandidate};
use serde::{Deserialize, Serialize};

/// Minimum score of a primary keyword
pub const PRIMARY_THRESHOLD: u8 = 80;
/// Minimum score of a secondary keyword
pub const SECONDARY_THRESHOLD: u8 = 50;

fn volume_points(volume: u64) -> u8 {
    match volume {
        v if v > 10_000 => 50,
        v if v > 5_000 => 40,
        v if v > 1_000 => 30,
        v if v > 500 => 20,
        _ => 10,
    }
}

fn competition_points(competition: Competition) -> u8 {
    match competition {
        Competition::Low => 30,
        Competition::Medium => 15,
        Competition::High | Competition::Unknown => 0,
    }
}

fn cpc_points(cpc: f64) -> u8 {
    if cpc > 2.0 {
        20
    } else if cpc > 1.0 {
        10
    } else {
        0
    }
}

/// Opportunity score in `0..=100`
pub fn score(candidate: &KeywordCandidate) -> u8 {
    volume_points(candidate.search_volume)
        + competition_points(candidate.competition)
        + cpc_points(candidate.cpc)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Primary,
    Secondary,
    LongTail,
}

impl Tier {
    pub fn for_score(score: u8) -> Self {
        if score >= PRIMARY_THRESHOLD {
            Tier::Primary
        } else if score >= SECONDARY_THRESHOLD {
            Tier::Secondary
        } else {
            Tier::LongTail
        }
    }
}

/// A candidate together with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredKeyword {
    #[serde(flatten)]
    pub keyword: KeywordCandidate,
    pub opportunity_score: u8,
}

impl ScoredKeyword {
    pub fn new(keyword: KeywordCandidate) -> Self {
        let opportunity_score = score(&keyword);
        Self {
            keyword,
            opportunity_score,
        }
    }

    pub fn tier(&self) -> Tier {
        Tier::for_score(self.opportunity_score)
    }
}

/// Candidates split into three disjoint tiers, input order kept in each
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpportunitySet {
    pub primary_keywords: Vec<ScoredKeyword>,
    pub secondary_keywords: Vec<ScoredKeyword>,
    pub long_tail_keywords: Vec<ScoredKeyword>,
}

impl OpportunitySet {
    pub fn len(&self) -> usize {
        self.primary_keywords.len() + self.secondary_keywords.len() + self.long_tail_keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredKeyword> {
        self.primary_keywords
            .iter()
            .chain(&self.secondary_keywords)
            .chain(&self.long_tail_keywords)
    }
}

/// Stable partition of `candidates` by score tier
pub fn partition<I>(candidates: I) -> OpportunitySet
where
    I: IntoIterator<Item = KeywordCandidate>,
{
    let mut set = OpportunitySet::default();
    for candidate in candidates {
        let scored = ScoredKeyword::new(candidate);
        match scored.tier() {
            Tier::Primary => set.primary_keywords.push(scored),
            Tier::Secondary => set.secondary_keywords.push(scored),
            Tier::LongTail => set.long_tail_keywords.push(scored),
        }
    }
    set
}
