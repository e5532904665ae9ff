//! Fertility engagement score and basal body temperature analysis.
//!
//! The BBT check is a two-phase heuristic: the recent readings are split at
//! the midpoint index and the second half must average at least the rise
//! threshold above the first. It does not locate the actual shift day, and a
//! window straddling two cycles can hide or fake a rise.

use super::{clamp_score, mean, recent_by_date, round_to, status_for, BASE_SCORE};
use crate::config::BbtConfig;
use crate::models::{BasalTemperature, BbtAnalysis, BbtPattern, FertilityGoal, FertilityState, InsightBlock};

/// Slack for float noise when comparing the rise to the threshold.
const RISE_EPSILON: f64 = 1e-9;

pub fn bbt_analysis(readings: &[BasalTemperature], config: &BbtConfig) -> BbtAnalysis {
    if readings.len() < config.min_entries {
        return BbtAnalysis::default();
    }

    let recent = recent_by_date(readings, config.window);
    let (first, second) = recent.split_at(recent.len() / 2);
    let (Some(first_mean), Some(second_mean)) = (
        mean(first.iter().map(|r| r.temperature)),
        mean(second.iter().map(|r| r.temperature)),
    ) else {
        return BbtAnalysis::default();
    };

    let rise = second_mean - first_mean;
    let detected = rise >= config.rise_threshold - RISE_EPSILON;
    BbtAnalysis {
        pattern: if detected {
            BbtPattern::Biphasic
        } else {
            BbtPattern::Monophasic
        },
        ovulation_detected: detected,
        temperature_rise: Some(round_to(rise, 2)),
    }
}

fn tiered(count: usize, tiers: &[(usize, f64)]) -> f64 {
    tiers
        .iter()
        .find(|(min, _)| count >= *min)
        .map_or(0.0, |(_, points)| *points)
}

pub fn score(state: &FertilityState, config: &BbtConfig) -> InsightBlock {
    let bbt = state.basal_body_temperature.len();
    let mucus = state.cervical_mucus.len();
    let tests = state.ovulation_tests.len();

    let raw = BASE_SCORE
        + tiered(bbt, &[(20, 20.0), (10, 10.0), (5, 5.0)])
        + tiered(mucus, &[(15, 15.0), (8, 10.0), (3, 5.0)])
        + tiered(tests, &[(10, 15.0), (5, 10.0), (2, 5.0)]);
    let score = clamp_score(raw);

    let analysis = bbt_analysis(&state.basal_body_temperature, config);
    let mut recommendations = Vec::new();
    if bbt < 10 {
        recommendations.push(
            "Take your basal body temperature every morning before getting up".to_string(),
        );
    }
    if mucus < 5 {
        recommendations.push("Note cervical mucus changes daily".to_string());
    }
    if state.goal == FertilityGoal::TryingToConceive {
        recommendations.push(
            "Plan intercourse in the fertile window, the days leading up to ovulation".to_string(),
        );
    }
    if analysis.ovulation_detected {
        recommendations.push(
            "Your temperature shows a biphasic pattern; keep tracking to confirm ovulation timing"
                .to_string(),
        );
    }
    recommendations.truncate(3);
    if recommendations.is_empty() {
        recommendations.push("Great tracking consistency, keep it up".to_string());
    }

    InsightBlock {
        score,
        status_text: status_for(score, &[(80, "well tracked"), (60, "tracking")], "limited data"),
        recommendations,
    }
}
