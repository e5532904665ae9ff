//! Keyword intent router.
//!
//! Counts how many keywords of each target occur in the lower-cased
//! utterance and picks the target with the most hits. Ties go to the target
//! earliest in `RouteTarget` declaration order. No hits at all falls back to
//! health insights at a fixed low confidence.

pub mod keywords;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::RouteTarget;

pub use keywords::{KeywordSet, DEFAULT_TABLE};

/// Confidence reported when no keyword matched.
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Number of keyword hits that counts as full confidence.
const FULL_CONFIDENCE_HITS: f32 = 3.0;

/// Where one utterance should go. Produced and consumed within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    #[serde(rename = "target_domain")]
    pub target: RouteTarget,
    /// 0.0-1.0.
    pub confidence: f32,
    pub matched_keyword_count: usize,
    pub reasoning: String,
}

impl RoutingDecision {
    pub fn is_fallback(&self) -> bool {
        self.matched_keyword_count == 0
    }
}

#[derive(Debug, Clone)]
pub struct IntentRouter {
    /// Keyed by target, so iteration is priority order.
    table: BTreeMap<RouteTarget, Vec<String>>,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::with_table(
            DEFAULT_TABLE
                .iter()
                .map(|set| (set.target, set.keywords.iter().map(|k| k.to_string()))),
        )
    }
}

impl IntentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a router over a custom keyword table. Keywords are lower-cased;
    /// blank keywords are ignored. Repeated targets extend the same set.
    pub fn with_table<I, K>(table: I) -> Self
    where
        I: IntoIterator<Item = (RouteTarget, K)>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let mut map: BTreeMap<RouteTarget, Vec<String>> = BTreeMap::new();
        for (target, keywords) in table {
            let entry = map.entry(target).or_default();
            for kw in keywords {
                let kw = kw.as_ref().trim().to_lowercase();
                if !kw.is_empty() && !entry.contains(&kw) {
                    entry.push(kw);
                }
            }
        }
        Self { table: map }
    }

    /// Number of keywords of `target` found in the utterance.
    pub fn match_count(&self, target: RouteTarget, utterance: &str) -> usize {
        let lower = utterance.to_lowercase();
        self.count_in(target, &lower)
    }

    fn count_in(&self, target: RouteTarget, lower: &str) -> usize {
        self.table
            .get(&target)
            .map(|kws| kws.iter().filter(|kw| lower.contains(kw.as_str())).count())
            .unwrap_or(0)
    }

    pub fn route(&self, utterance: &str) -> RoutingDecision {
        let lower = utterance.to_lowercase();

        let mut best: Option<(RouteTarget, usize)> = None;
        for target in self.table.keys() {
            let count = self.count_in(*target, &lower);
            // Strictly greater: on a tie the earlier target stays.
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((*target, count));
            }
        }

        let decision = match best {
            Some((target, count)) => RoutingDecision {
                target,
                confidence: (count as f32 / FULL_CONFIDENCE_HITS).min(1.0),
                matched_keyword_count: count,
                reasoning: format!("matched {count} keyword(s) for {target}"),
            },
            None => RoutingDecision {
                target: RouteTarget::HealthInsights,
                confidence: FALLBACK_CONFIDENCE,
                matched_keyword_count: 0,
                reasoning: "no clear intent, defaulting to health insights".to_string(),
            },
        };

        tracing::debug!(
            target_domain = %decision.target,
            confidence = decision.confidence,
            matched = decision.matched_keyword_count,
            "Routed utterance"
        );
        decision
    }
}
