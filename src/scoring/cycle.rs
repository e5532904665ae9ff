//! Cycle score and predictions.

use chrono::{Days, NaiveDate};

use super::{clamp_score, mean, reverse, status_for, BASE_SCORE};
use crate::models::{CycleRegularity, CycleState, FlowIntensity, InsightBlock};

/// Assumed cycle length when none has been recorded.
pub const DEFAULT_CYCLE_LENGTH: f64 = 28.0;

/// Ovulation is predicted this many days before the next period.
pub const LUTEAL_PHASE_DAYS: u64 = 14;

/// Cycle lengths considered typical.
const TYPICAL_LENGTH: std::ops::RangeInclusive<f64> = 21.0..=35.0;

pub fn average_cycle_length(state: &CycleState) -> f64 {
    mean(state.known_lengths().into_iter().map(f64::from)).unwrap_or(DEFAULT_CYCLE_LENGTH)
}

/// Spread of known lengths: ≤3 days regular, ≤7 somewhat regular.
pub fn regularity(lengths: &[u32]) -> CycleRegularity {
    let (Some(min), Some(max)) = (lengths.iter().min(), lengths.iter().max()) else {
        return CycleRegularity::NeedsMoreData;
    };
    if lengths.len() < 2 {
        return CycleRegularity::NeedsMoreData;
    }
    match max - min {
        0..=3 => CycleRegularity::Regular,
        4..=7 => CycleRegularity::SomewhatRegular,
        _ => CycleRegularity::Irregular,
    }
}

/// Next period and ovulation dates from a cycle start, `None` on overflow.
pub fn predict_dates(start: NaiveDate, average_length: f64) -> Option<(NaiveDate, NaiveDate)> {
    let next_period = start.checked_add_days(Days::new(average_length.round().max(1.0) as u64))?;
    let ovulation = next_period.checked_sub_days(Days::new(LUTEAL_PHASE_DAYS))?;
    Some((next_period, ovulation))
}

/// Overwrite predictions with computed values whenever a start date is known.
/// Without one, previously merged predictions are kept.
pub fn refresh_predictions(state: &mut CycleState) {
    let Some(start) = state.current_cycle.start_date else {
        return;
    };
    let average = average_cycle_length(state);
    if let Some((next_period, ovulation)) = predict_dates(start, average) {
        state.predictions.next_period_date = Some(next_period);
        state.predictions.next_ovulation_date = Some(ovulation);
    }
    state.predictions.cycle_regularity = regularity(&state.known_lengths());
}

/// Share of flow-tagged period days that were heavy, 0-100.
fn heavy_share(state: &CycleState) -> Option<f64> {
    let flows: Vec<FlowIntensity> = state
        .current_cycle
        .period_days
        .iter()
        .filter_map(|d| d.flow_intensity)
        .collect();
    if flows.is_empty() {
        return None;
    }
    let heavy = flows.iter().filter(|f| **f == FlowIntensity::Heavy).count();
    Some(heavy as f64 * 100.0 / flows.len() as f64)
}

pub fn score(state: &CycleState) -> InsightBlock {
    let lengths = state.known_lengths();
    let regularity = regularity(&lengths);
    let mut raw = BASE_SCORE;

    raw += match regularity {
        CycleRegularity::Regular => 20.0,
        CycleRegularity::SomewhatRegular => 10.0,
        CycleRegularity::Irregular => -10.0,
        CycleRegularity::NeedsMoreData => 0.0,
    };
    if !lengths.is_empty() {
        raw += if TYPICAL_LENGTH.contains(&average_cycle_length(state)) {
            10.0
        } else {
            -10.0
        };
    }
    if !state.current_cycle.period_days.is_empty() {
        raw += 5.0;
    }
    let heavy = heavy_share(state);
    if let Some(share) = heavy {
        // ±5
        raw += (reverse(share) - 50.0) / 10.0;
    }

    let score = clamp_score(raw);
    let mut recommendations = Vec::new();
    match regularity {
        CycleRegularity::NeedsMoreData => recommendations
            .push("Log at least two complete cycles so regularity can be assessed".to_string()),
        CycleRegularity::Irregular => recommendations.push(
            "Your cycle length varies a lot; consider discussing it with a clinician".to_string(),
        ),
        _ => {}
    }
    if heavy.is_some_and(|share| share > 50.0) {
        recommendations.push(
            "Heavy flow on most days: eat iron-rich foods and seek advice if it persists"
                .to_string(),
        );
    }
    if recommendations.is_empty() {
        recommendations.push("Cycle looks steady, keep logging your period days".to_string());
    }

    InsightBlock {
        score,
        status_text: status_for(score, &[(70, "healthy"), (45, "fair")], "needs attention"),
        recommendations,
    }
}
