//! Lifestyle score from recent sleep and stress, plus the sleep trend.
//!
//! Both parts add on top of the base score: sleep contributes 8-20 points
//! and stress 2-20, so the total stays within 60-90 once both are logged.

use super::{clamp_score, mean, recent_by_date, reverse, status_for, BASE_SCORE};
use crate::models::{InsightBlock, LifestyleState, SleepQuality, SleepTrend, StressLevel};

/// Sleep records needed before a trend is reported.
const MIN_TREND_RECORDS: usize = 3;

const DEFAULT_SLEEP_HOURS: f64 = 7.0;

/// 10 for 7-9 hours, 8 for 6-10 hours, 5 otherwise.
fn duration_points(hours: f64) -> f64 {
    if (7.0..=9.0).contains(&hours) {
        10.0
    } else if (6.0..=10.0).contains(&hours) {
        8.0
    } else {
        5.0
    }
}

/// Average nightly sleep points (4-10) over the recent window.
fn sleep_points(state: &LifestyleState, window: usize) -> Option<f64> {
    mean(
        recent_by_date(&state.sleep_records, window)
            .into_iter()
            .map(|r| {
                let duration = duration_points(r.sleep_duration_hours.unwrap_or(DEFAULT_SLEEP_HOURS));
                let quality = r.sleep_quality.unwrap_or(SleepQuality::Fair).points();
                (duration + quality) / 2.0
            }),
    )
}

/// Average stress points (1-10, higher is calmer) over the recent window.
fn stress_points(state: &LifestyleState, window: usize) -> Option<f64> {
    mean(
        recent_by_date(&state.stress_tracking, window)
            .into_iter()
            .map(|r| reverse(r.stress_level.unwrap_or(StressLevel::Moderate).burden()) / 10.0),
    )
}

pub fn sleep_trend(state: &LifestyleState, window: usize) -> SleepTrend {
    if state.sleep_records.len() < MIN_TREND_RECORDS {
        return SleepTrend::InsufficientData;
    }
    let ranks = recent_by_date(&state.sleep_records, window)
        .into_iter()
        .map(|r| r.sleep_quality.unwrap_or(SleepQuality::Fair).rank());
    match mean(ranks) {
        Some(avg) if avg >= 3.5 => SleepTrend::Good,
        Some(avg) if avg >= 2.5 => SleepTrend::Fair,
        Some(_) => SleepTrend::NeedsImprovement,
        None => SleepTrend::InsufficientData,
    }
}

pub fn score(state: &LifestyleState, window: usize) -> InsightBlock {
    let sleep = sleep_points(state, window);
    let stress = stress_points(state, window);
    let raw = BASE_SCORE + sleep.map_or(0.0, |p| p * 2.0) + stress.map_or(0.0, |p| p * 2.0);
    let score = clamp_score(raw);

    let mut recommendations = Vec::new();
    if score < 60 {
        recommendations
            .push("Improve your daily routine, focusing on sleep and stress management".to_string());
    }
    if sleep_trend(state, window) == SleepTrend::NeedsImprovement {
        recommendations
            .push("Keep a regular sleep schedule and a quiet, dark bedroom".to_string());
    }
    if stress.is_some_and(|p| p < 5.0) {
        recommendations
            .push("Stress has been high; try short breathing or mindfulness breaks".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Your sleep and stress habits look balanced".to_string());
    }

    InsightBlock {
        score,
        status_text: status_for(score, &[(75, "balanced"), (60, "fair")], "needs attention"),
        recommendations,
    }
}
