//! Cross-domain insight fusion.
//!
//! Combines one score per domain into an overall score with a configurable
//! weight table. Weights are renormalised over the domains that actually
//! have data, so a domain without data never drags the average toward its
//! neutral placeholder. Trend buckets and prioritised recommendations are
//! derived from per-domain thresholds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::{Domain, FusionRecommendation, OverallInsight, Priority, Trend};

/// Upper bound on the weight total. Mildly above 1.0 so one table can carry
/// all six domains at their legacy weights.
pub const MAX_WEIGHT_TOTAL: f64 = 1.2;

// ═══════════════════════════════════════════════════════════
// Weights
// ═══════════════════════════════════════════════════════════

/// Domain weight table. Domains missing from the table have weight zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FusionWeights(BTreeMap<Domain, f64>);

impl Default for FusionWeights {
    fn default() -> Self {
        Self::six_domain()
    }
}

impl FusionWeights {
    /// All six domains, summing to 1.2.
    pub fn six_domain() -> Self {
        Self(BTreeMap::from([
            (Domain::Cycle, 0.20),
            (Domain::SymptomMood, 0.20),
            (Domain::Fertility, 0.15),
            (Domain::Nutrition, 0.25),
            (Domain::Exercise, 0.20),
            (Domain::Lifestyle, 0.20),
        ]))
    }

    /// Five domains without lifestyle, summing to 1.0.
    pub fn five_domain() -> Self {
        Self(BTreeMap::from([
            (Domain::Cycle, 0.20),
            (Domain::SymptomMood, 0.20),
            (Domain::Fertility, 0.15),
            (Domain::Nutrition, 0.25),
            (Domain::Exercise, 0.20),
        ]))
    }

    pub fn from_map(weights: BTreeMap<Domain, f64>) -> Result<Self, ConfigError> {
        let weights = Self(weights);
        weights.validate()?;
        Ok(weights)
    }

    pub fn weight(&self, domain: Domain) -> f64 {
        self.0.get(&domain).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Every weight finite and non-negative, total at most `MAX_WEIGHT_TOTAL`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (domain, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    domain: *domain,
                    weight: *weight,
                });
            }
        }
        let total = self.total();
        // Tolerate float noise from summing decimal weights.
        if total > MAX_WEIGHT_TOTAL + 1e-9 {
            return Err(ConfigError::WeightTotal { total });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Thresholds
// ═══════════════════════════════════════════════════════════

/// Score cut-offs for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendThresholds {
    /// At or above: improving.
    pub improving: u8,
    /// Below: declining.
    pub declining: u8,
    /// Below: a recommendation is emitted.
    pub attention: u8,
}

impl TrendThresholds {
    pub const GENERAL: Self = Self {
        improving: 70,
        declining: 40,
        attention: 50,
    };

    pub const EXERCISE: Self = Self {
        improving: 60,
        declining: 30,
        attention: 40,
    };

    pub fn trend(&self, score: u8) -> Trend {
        if score >= self.improving {
            Trend::Improving
        } else if score < self.declining {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    /// Priority for a score below `attention`; `None` when no advice is due.
    pub fn priority(&self, score: u8) -> Option<Priority> {
        if score >= self.attention {
            return None;
        }
        let midpoint = (u16::from(self.declining) + u16::from(self.attention)) / 2;
        Some(if score < self.declining {
            Priority::High
        } else if u16::from(score) < midpoint {
            Priority::Medium
        } else {
            Priority::Low
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub weights: FusionWeights,
    /// Thresholds for every domain without an override.
    pub thresholds: TrendThresholds,
    pub overrides: BTreeMap<Domain, TrendThresholds>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: FusionWeights::default(),
            thresholds: TrendThresholds::GENERAL,
            overrides: BTreeMap::from([(Domain::Exercise, TrendThresholds::EXERCISE)]),
        }
    }
}

impl FusionConfig {
    pub fn thresholds_for(&self, domain: Domain) -> TrendThresholds {
        self.overrides
            .get(&domain)
            .copied()
            .unwrap_or(self.thresholds)
    }
}

// ═══════════════════════════════════════════════════════════
// Fusion
// ═══════════════════════════════════════════════════════════

fn advice(domain: Domain) -> &'static str {
    match domain {
        Domain::Cycle => "Keep logging period start dates so cycle regularity can be tracked",
        Domain::SymptomMood => {
            "Watch your symptom patterns and consider lifestyle changes that ease them"
        }
        Domain::Fertility => "Log basal body temperature every morning to confirm your pattern",
        Domain::Nutrition => "Prioritise nutrition: more vegetables, fruit and water",
        Domain::Exercise => "Build a regular exercise habit, starting with a daily 15-minute walk",
        Domain::Lifestyle => "Protect your sleep and set aside time to manage stress",
    }
}

/// Weighted average over the scored domains, renormalised by their weights.
/// Returns 0 when nothing is scored or every scored domain has weight zero.
pub fn overall_score(scores: &BTreeMap<Domain, u8>, weights: &FusionWeights) -> u8 {
    let (weighted, total) = scores
        .iter()
        .fold((0.0, 0.0), |(sum, total), (domain, score)| {
            let w = weights.weight(*domain);
            (sum + f64::from(*score) * w, total + w)
        });
    if total <= 0.0 {
        return 0;
    }
    (weighted / total).round().clamp(0.0, 100.0) as u8
}

/// Fuse per-domain scores into a fresh overall insight.
pub fn fuse(scores: &BTreeMap<Domain, u8>, config: &FusionConfig) -> OverallInsight {
    let mut insight = OverallInsight {
        overall_score: overall_score(scores, &config.weights),
        ..OverallInsight::default()
    };

    let mut pending: Vec<(u8, FusionRecommendation)> = Vec::new();
    for (domain, score) in scores {
        let thresholds = config.thresholds_for(*domain);
        match thresholds.trend(*score) {
            Trend::Improving => insight.improving.insert(*domain),
            Trend::Stable => insight.stable.insert(*domain),
            Trend::Declining => insight.declining.insert(*domain),
        };
        if let Some(priority) = thresholds.priority(*score) {
            pending.push((
                *score,
                FusionRecommendation {
                    domain: *domain,
                    text: advice(*domain).to_string(),
                    priority,
                    timeline: priority.timeline().to_string(),
                },
            ));
        }
    }

    // Lowest score first; domain order breaks ties (the map iterates in it
    // and the sort is stable).
    pending.sort_by_key(|(score, _)| *score);
    insight.recommendations = pending.into_iter().map(|(_, r)| r).collect();

    tracing::debug!(
        overall = insight.overall_score,
        domains = scores.len(),
        recommendations = insight.recommendations.len(),
        "Fused domain scores"
    );
    insight
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(Domain, u8)]) -> BTreeMap<Domain, u8> {
        entries.iter().copied().collect()
    }

    #[test]
    fn empty_scores_fuse_to_zero() {
        let insight = fuse(&BTreeMap::new(), &FusionConfig::default());
        assert_eq!(insight.overall_score, 0);
        assert!(insight.recommendations.is_empty());
        assert!(insight.stable.is_empty());
    }

    #[test]
    fn single_domain_ignores_its_weight() {
        for domain in Domain::all() {
            let insight = fuse(&scores(&[(*domain, 80)]), &FusionConfig::default());
            assert_eq!(insight.overall_score, 80, "{domain}");
        }
    }

    #[test]
    fn all_perfect_scores_fuse_to_hundred() {
        let all: BTreeMap<Domain, u8> = Domain::all().iter().map(|d| (*d, 100)).collect();
        assert_eq!(fuse(&all, &FusionConfig::default()).overall_score, 100);

        let five = FusionConfig {
            weights: FusionWeights::five_domain(),
            ..FusionConfig::default()
        };
        assert_eq!(fuse(&all, &five).overall_score, 100);
    }

    #[test]
    fn weights_are_renormalised() {
        // (90 * 0.25 + 40 * 0.20) / 0.45 = 67.78
        let insight = fuse(
            &scores(&[(Domain::Nutrition, 90), (Domain::Exercise, 40)]),
            &FusionConfig::default(),
        );
        assert_eq!(insight.overall_score, 68);
    }

    #[test]
    fn zero_weight_domain_is_excluded() {
        let five = FusionConfig {
            weights: FusionWeights::five_domain(),
            ..FusionConfig::default()
        };
        let only_lifestyle = scores(&[(Domain::Lifestyle, 90)]);
        assert_eq!(fuse(&only_lifestyle, &five).overall_score, 0);

        let mixed = scores(&[(Domain::Lifestyle, 90), (Domain::Cycle, 60)]);
        assert_eq!(fuse(&mixed, &five).overall_score, 60);
    }

    #[test]
    fn exercise_uses_its_own_thresholds() {
        let insight = fuse(
            &scores(&[(Domain::Exercise, 65), (Domain::Nutrition, 65)]),
            &FusionConfig::default(),
        );
        assert!(insight.improving.contains(&Domain::Exercise));
        assert!(insight.stable.contains(&Domain::Nutrition));
    }

    #[test]
    fn trend_buckets_partition_domains() {
        let input = scores(&[
            (Domain::Cycle, 75),
            (Domain::SymptomMood, 50),
            (Domain::Fertility, 20),
        ]);
        let insight = fuse(&input, &FusionConfig::default());
        assert_eq!(insight.improving.iter().copied().collect::<Vec<_>>(), vec![Domain::Cycle]);
        assert_eq!(insight.stable.iter().copied().collect::<Vec<_>>(), vec![Domain::SymptomMood]);
        assert_eq!(insight.declining.iter().copied().collect::<Vec<_>>(), vec![Domain::Fertility]);
    }

    #[test]
    fn recommendations_lowest_score_first() {
        let input = scores(&[
            (Domain::Cycle, 47),
            (Domain::Nutrition, 30),
            (Domain::Lifestyle, 42),
            (Domain::SymptomMood, 80),
        ]);
        let insight = fuse(&input, &FusionConfig::default());

        let order: Vec<(Domain, Priority)> = insight
            .recommendations
            .iter()
            .map(|r| (r.domain, r.priority))
            .collect();
        assert_eq!(
            order,
            vec![
                (Domain::Nutrition, Priority::High),
                (Domain::Lifestyle, Priority::Medium),
                (Domain::Cycle, Priority::Low),
            ]
        );
        assert_eq!(insight.recommendations[0].timeline, "1-2 weeks");
    }

    #[test]
    fn score_ties_keep_domain_order() {
        let input = scores(&[(Domain::Lifestyle, 20), (Domain::Cycle, 20)]);
        let insight = fuse(&input, &FusionConfig::default());
        let domains: Vec<Domain> = insight.recommendations.iter().map(|r| r.domain).collect();
        assert_eq!(domains, vec![Domain::Cycle, Domain::Lifestyle]);
    }

    #[test]
    fn weight_validation() {
        assert!(FusionWeights::six_domain().validate().is_ok());
        assert!((FusionWeights::six_domain().total() - 1.2).abs() < 1e-9);
        assert!(FusionWeights::five_domain().validate().is_ok());

        let negative = BTreeMap::from([(Domain::Cycle, -0.1)]);
        assert!(matches!(
            FusionWeights::from_map(negative),
            Err(ConfigError::InvalidWeight { domain: Domain::Cycle, .. })
        ));

        let heavy = BTreeMap::from([(Domain::Cycle, 0.9), (Domain::Nutrition, 0.9)]);
        assert!(matches!(
            FusionWeights::from_map(heavy),
            Err(ConfigError::WeightTotal { .. })
        ));

        let nan = BTreeMap::from([(Domain::Exercise, f64::NAN)]);
        assert!(FusionWeights::from_map(nan).is_err());
    }
}
