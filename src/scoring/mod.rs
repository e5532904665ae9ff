//! Per-domain scoring.
//!
//! Every domain score starts from a neutral base of 50, applies bounded
//! additive adjustments and is clamped to 0-100. Recency-sensitive inputs
//! use the last `recency_window` entries by date; engagement counts use the
//! whole collection. A domain without data keeps the neutral insight block.
//!
//! `refresh` recomputes every derived field of one domain (insight block,
//! predictions, patterns, analyses) from its collections.

pub mod cycle;
pub mod exercise;
pub mod fertility;
pub mod lifestyle;
pub mod nutrition;
pub mod symptom_mood;

use crate::config::TrackerConfig;
use crate::models::{DatedRecord, Domain, InsightBlock, SessionState};

/// Neutral prior for a domain without evidence either way.
pub const BASE_SCORE: f64 = 50.0;

/// Round and clamp a raw score into 0-100. Non-finite input is neutral.
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return BASE_SCORE as u8;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Convert a reverse indicator (higher is worse, 0-100) to a positive one.
pub fn reverse(value: f64) -> f64 {
    100.0 - value
}

/// The last `window` records in date order. Equal dates keep arrival order.
pub fn recent_by_date<T: DatedRecord>(records: &[T], window: usize) -> Vec<&T> {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by_key(|r| r.date());
    let skip = sorted.len().saturating_sub(window);
    sorted.split_off(skip)
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Pick a status label: the first `(min, label)` the score reaches.
pub(crate) fn status_for(score: u8, bands: &[(u8, &str)], otherwise: &str) -> String {
    bands
        .iter()
        .find(|(min, _)| score >= *min)
        .map_or(otherwise, |(_, label)| *label)
        .to_string()
}

/// Insight block for one domain of the session.
pub fn score(domain: Domain, state: &SessionState, config: &TrackerConfig) -> InsightBlock {
    if !state.has_data(domain) {
        return InsightBlock::default();
    }
    match domain {
        Domain::Cycle => cycle::score(&state.cycle),
        Domain::SymptomMood => symptom_mood::score(&state.symptom_mood, config.recency_window),
        Domain::Fertility => fertility::score(&state.fertility, &config.bbt),
        Domain::Nutrition => nutrition::score(&state.nutrition, config.recency_window),
        Domain::Exercise => exercise::score(&state.exercise, config.recency_window),
        Domain::Lifestyle => lifestyle::score(&state.lifestyle, config.recency_window),
    }
}

/// Recompute all derived fields of `domain` in place.
pub fn refresh(domain: Domain, state: &mut SessionState, config: &TrackerConfig) {
    let insight = score(domain, state, config);
    match domain {
        Domain::Cycle => {
            cycle::refresh_predictions(&mut state.cycle);
            state.cycle.insight = insight;
        }
        Domain::SymptomMood => {
            state.symptom_mood.patterns = symptom_mood::patterns(&state.symptom_mood);
            state.symptom_mood.insight = insight;
        }
        Domain::Fertility => {
            state.fertility.bbt_analysis =
                fertility::bbt_analysis(&state.fertility.basal_body_temperature, &config.bbt);
            state.fertility.insight = insight;
        }
        Domain::Nutrition => {
            state.nutrition.hydration_status =
                nutrition::hydration_status(&state.nutrition, config.recency_window);
            state.nutrition.insight = insight;
        }
        Domain::Exercise => {
            state.exercise.recent_minutes =
                exercise::recent_minutes(&state.exercise, config.recency_window);
            state.exercise.insight = insight;
        }
        Domain::Lifestyle => {
            state.lifestyle.sleep_trend =
                lifestyle::sleep_trend(&state.lifestyle, config.recency_window);
            state.lifestyle.insight = insight;
        }
    }

    tracing::debug!(
        domain = %domain,
        score = state.insight(domain).score,
        "Refreshed domain insight"
    );
}
