//! Session state: one structurally complete state per domain plus the
//! fused overall insight.
//!
//! Every collection is always present (empty by default) and every derived
//! block always carries a neutral placeholder, so scoring never branches on
//! absence. States are values: a turn builds a new `SessionState` and the
//! session swaps it in whole.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{
    BbtPattern, CycleRegularity, Domain, FertilityGoal, HydrationStatus, Priority, RouteTarget,
    SleepTrend,
};
use super::records::{
    BasalTemperature, CervicalMucus, CycleHistoryEntry, DailyNutrition, ExerciseActivity,
    MoodRecord, NoteRecord, OvulationTest, PeriodDay, SleepRecord, StressRecord,
    SupplementRecord, SymptomRecord,
};

/// Score of a domain that has no data yet.
pub const NEUTRAL_SCORE: u8 = 50;

/// A domain's derived score, status and advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightBlock {
    /// 0-100.
    pub score: u8,
    pub status_text: String,
    pub recommendations: Vec<String>,
}

impl Default for InsightBlock {
    fn default() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            status_text: "no data".to_string(),
            recommendations: Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Cycle
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentCycle {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cycle_length_days: Option<u32>,
    pub period_days: Vec<PeriodDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclePredictions {
    pub next_period_date: Option<NaiveDate>,
    pub next_ovulation_date: Option<NaiveDate>,
    pub cycle_regularity: CycleRegularity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleState {
    pub current_cycle: CurrentCycle,
    pub cycle_history: Vec<CycleHistoryEntry>,
    pub predictions: CyclePredictions,
    pub insight: InsightBlock,
}

impl CycleState {
    pub fn has_data(&self) -> bool {
        self.current_cycle.start_date.is_some()
            || !self.current_cycle.period_days.is_empty()
            || !self.cycle_history.is_empty()
    }

    /// Known cycle lengths: history first, then the current cycle.
    pub fn known_lengths(&self) -> Vec<u32> {
        self.cycle_history
            .iter()
            .filter_map(|c| c.cycle_length)
            .chain(self.current_cycle.cycle_length_days)
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════
// Symptom & mood
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodTrend {
    pub dominant_mood: String,
    pub average_intensity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymptomPatterns {
    /// Up to three symptom types, most frequent first.
    pub common_symptoms: Vec<String>,
    /// Average severity per symptom type, one decimal.
    pub severity_analysis: BTreeMap<String, f64>,
    pub mood_trend: Option<MoodTrend>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymptomMoodState {
    pub symptoms: Vec<SymptomRecord>,
    pub moods: Vec<MoodRecord>,
    pub notes: Vec<NoteRecord>,
    pub patterns: SymptomPatterns,
    pub insight: InsightBlock,
}

impl SymptomMoodState {
    pub fn has_data(&self) -> bool {
        !self.symptoms.is_empty() || !self.moods.is_empty() || !self.notes.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Fertility
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BbtAnalysis {
    pub pattern: BbtPattern,
    pub ovulation_detected: bool,
    /// Second-half mean minus first-half mean, two decimals.
    pub temperature_rise: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertilityState {
    pub goal: FertilityGoal,
    pub basal_body_temperature: Vec<BasalTemperature>,
    pub cervical_mucus: Vec<CervicalMucus>,
    pub ovulation_tests: Vec<OvulationTest>,
    pub bbt_analysis: BbtAnalysis,
    pub insight: InsightBlock,
}

impl FertilityState {
    pub fn has_data(&self) -> bool {
        !self.basal_body_temperature.is_empty()
            || !self.cervical_mucus.is_empty()
            || !self.ovulation_tests.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Nutrition / exercise / lifestyle
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionState {
    pub daily_nutrition: Vec<DailyNutrition>,
    pub supplements: Vec<SupplementRecord>,
    pub hydration_status: HydrationStatus,
    pub insight: InsightBlock,
}

impl NutritionState {
    pub fn has_data(&self) -> bool {
        !self.daily_nutrition.is_empty() || !self.supplements.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseState {
    pub daily_activities: Vec<ExerciseActivity>,
    /// Total minutes over the recency window.
    pub recent_minutes: u32,
    pub insight: InsightBlock,
}

impl ExerciseState {
    pub fn has_data(&self) -> bool {
        !self.daily_activities.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleState {
    pub sleep_records: Vec<SleepRecord>,
    pub stress_tracking: Vec<StressRecord>,
    pub sleep_trend: SleepTrend,
    pub insight: InsightBlock,
}

impl LifestyleState {
    pub fn has_data(&self) -> bool {
        !self.sleep_records.is_empty() || !self.stress_tracking.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Overall insight
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionRecommendation {
    pub domain: Domain,
    pub text: String,
    pub priority: Priority,
    pub timeline: String,
}

/// Fused view across domains. Always recomputed whole, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallInsight {
    pub overall_score: u8,
    pub improving: BTreeSet<Domain>,
    pub declining: BTreeSet<Domain>,
    pub stable: BTreeSet<Domain>,
    /// Lowest-scoring domain first.
    pub recommendations: Vec<FusionRecommendation>,
}

// ═══════════════════════════════════════════════════════════
// SessionState
// ═══════════════════════════════════════════════════════════

/// Everything one user's conversation has accumulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    #[serde(rename = "cycle_data")]
    pub cycle: CycleState,
    #[serde(rename = "symptom_mood_data")]
    pub symptom_mood: SymptomMoodState,
    #[serde(rename = "fertility_data")]
    pub fertility: FertilityState,
    #[serde(rename = "nutrition_data")]
    pub nutrition: NutritionState,
    #[serde(rename = "exercise_data")]
    pub exercise: ExerciseState,
    #[serde(rename = "lifestyle_data")]
    pub lifestyle: LifestyleState,
    #[serde(rename = "health_insights_data")]
    pub overall: OverallInsight,
    pub current_route: Option<RouteTarget>,
}

impl SessionState {
    pub fn has_data(&self, domain: Domain) -> bool {
        match domain {
            Domain::Cycle => self.cycle.has_data(),
            Domain::SymptomMood => self.symptom_mood.has_data(),
            Domain::Fertility => self.fertility.has_data(),
            Domain::Nutrition => self.nutrition.has_data(),
            Domain::Exercise => self.exercise.has_data(),
            Domain::Lifestyle => self.lifestyle.has_data(),
        }
    }

    pub fn insight(&self, domain: Domain) -> &InsightBlock {
        match domain {
            Domain::Cycle => &self.cycle.insight,
            Domain::SymptomMood => &self.symptom_mood.insight,
            Domain::Fertility => &self.fertility.insight,
            Domain::Nutrition => &self.nutrition.insight,
            Domain::Exercise => &self.exercise.insight,
            Domain::Lifestyle => &self.lifestyle.insight,
        }
    }

    /// Scores of the domains that have data. Domains without data are left
    /// out so fusion does not average in their neutral placeholder.
    pub fn domain_scores(&self) -> BTreeMap<Domain, u8> {
        Domain::all()
            .iter()
            .filter(|d| self.has_data(**d))
            .map(|d| (*d, self.insight(*d).score))
            .collect()
    }

    /// Full state as plain JSON for the emission channel.
    pub fn to_emission(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn default_state_is_structurally_complete() {
        let emitted = SessionState::default().to_emission().unwrap();

        assert_eq!(emitted["cycle_data"]["current_cycle"]["period_days"], serde_json::json!([]));
        assert_eq!(emitted["symptom_mood_data"]["notes"], serde_json::json!([]));
        assert_eq!(emitted["fertility_data"]["goal"], "General Health Monitoring");
        assert_eq!(emitted["fertility_data"]["bbt_analysis"]["pattern"], "insufficient data");
        assert_eq!(emitted["nutrition_data"]["hydration_status"], "no data");
        assert_eq!(emitted["lifestyle_data"]["insight"]["score"], 50);
        assert_eq!(emitted["health_insights_data"]["overall_score"], 0);
    }

    #[test]
    fn domain_scores_skip_domains_without_data() {
        let mut state = SessionState::default();
        assert!(state.domain_scores().is_empty());

        state.exercise.daily_activities.push(ExerciseActivity {
            date: date("2025-06-01"),
            exercise_type: "Yoga".into(),
            duration_minutes: Some(30.0),
            intensity: None,
            notes: None,
        });
        state.exercise.insight.score = 60;

        let scores = state.domain_scores();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get(&Domain::Exercise), Some(&60));
    }

    #[test]
    fn cycle_lengths_include_current_cycle_last() {
        let mut cycle = CycleState::default();
        cycle.cycle_history.push(CycleHistoryEntry {
            start_date: date("2025-04-03"),
            end_date: None,
            cycle_length: Some(29),
            period_length: None,
            average_flow: None,
        });
        cycle.current_cycle.cycle_length_days = Some(27);
        assert_eq!(cycle.known_lengths(), vec![29, 27]);
    }

    #[test]
    fn emission_restores_losslessly() {
        let mut state = SessionState::default();
        state.current_route = Some(RouteTarget::Lifestyle);
        state.overall.declining.insert(Domain::Lifestyle);

        let emitted = state.to_emission().unwrap();
        let restored: SessionState = serde_json::from_value(emitted).unwrap();
        assert_eq!(restored, state);
    }
}
