//! Nutrition score: recent hydration and supplement engagement.

use super::{clamp_score, mean, recent_by_date, BASE_SCORE};
use crate::models::{HydrationStatus, InsightBlock, NutritionState};

/// Daily water target in millilitres.
pub const WATER_TARGET_ML: f64 = 2000.0;

/// Average water intake over the recent window. Days without a recorded
/// amount count as zero.
pub fn average_water_ml(state: &NutritionState, window: usize) -> Option<f64> {
    mean(
        recent_by_date(&state.daily_nutrition, window)
            .into_iter()
            .map(|d| d.water_intake_ml.unwrap_or(0.0)),
    )
}

pub fn hydration_status(state: &NutritionState, window: usize) -> HydrationStatus {
    match average_water_ml(state, window) {
        None => HydrationStatus::NoData,
        Some(avg) if avg >= WATER_TARGET_ML => HydrationStatus::Good,
        Some(avg) if avg >= 1500.0 => HydrationStatus::Fair,
        Some(_) => HydrationStatus::Insufficient,
    }
}

pub fn score(state: &NutritionState, window: usize) -> InsightBlock {
    let average_water = average_water_ml(state, window);
    let hydration = match average_water {
        Some(avg) if avg >= WATER_TARGET_ML => 20.0,
        Some(avg) if avg >= 1500.0 => 15.0,
        Some(avg) if avg >= 1000.0 => 10.0,
        _ => 0.0,
    };
    let supplements = match state.supplements.len() {
        n if n >= 5 => 15.0,
        n if n >= 3 => 10.0,
        n if n >= 1 => 5.0,
        _ => 0.0,
    };
    let score = clamp_score(BASE_SCORE + hydration + supplements);

    let mut recommendations = Vec::new();
    if average_water.is_some_and(|avg| avg < WATER_TARGET_ML) {
        recommendations.push("Aim for about 2000 ml of water a day".to_string());
    }
    if state.supplements.len() < 3 {
        recommendations.push(
            "If your doctor recommends supplements, take them regularly and log them".to_string(),
        );
    }
    if recommendations.is_empty() {
        recommendations.push("Nutrition looks on track, keep it up".to_string());
    }

    InsightBlock {
        score,
        status_text: hydration_status(state, window).to_string(),
        recommendations,
    }
}
