//! Exercise score: recent minutes and intensity variety.

use std::collections::BTreeSet;

use super::{clamp_score, recent_by_date, BASE_SCORE};
use crate::models::{ExerciseIntensity, ExerciseState, InsightBlock};

/// Weekly activity guideline in minutes.
pub const WEEKLY_TARGET_MINUTES: u32 = 150;

/// Total minutes over the recent window, rounded.
pub fn recent_minutes(state: &ExerciseState, window: usize) -> u32 {
    let total: f64 = recent_by_date(&state.daily_activities, window)
        .into_iter()
        .filter_map(|a| a.duration_minutes)
        .sum();
    total.round().min(f64::from(u32::MAX)) as u32
}

fn recent_intensities(state: &ExerciseState, window: usize) -> BTreeSet<ExerciseIntensity> {
    recent_by_date(&state.daily_activities, window)
        .into_iter()
        .filter_map(|a| a.intensity)
        .collect()
}

pub fn score(state: &ExerciseState, window: usize) -> InsightBlock {
    let minutes = recent_minutes(state, window);
    let variety = recent_intensities(state, window).len();

    let volume = match minutes {
        m if m >= WEEKLY_TARGET_MINUTES => 25.0,
        m if m >= 90 => 15.0,
        m if m >= 30 => 5.0,
        _ => 0.0,
    };
    // At most three intensities, so at most +15.
    let score = clamp_score(BASE_SCORE + volume + 5.0 * variety as f64);

    let mut recommendations = Vec::new();
    if minutes < WEEKLY_TARGET_MINUTES {
        recommendations.push(format!(
            "Work toward {WEEKLY_TARGET_MINUTES} minutes of moderate activity a week ({minutes} so far)"
        ));
    }
    if variety < 2 {
        recommendations
            .push("Mix different intensities, such as yoga alongside brisk walks".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Great activity level, keep it up".to_string());
    }

    let status = if minutes >= WEEKLY_TARGET_MINUTES {
        "active"
    } else if minutes >= 60 {
        "moderately active"
    } else {
        "inactive"
    };

    InsightBlock {
        score,
        status_text: status.to_string(),
        recommendations,
    }
}
