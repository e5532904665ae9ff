//! Typed partial updates proposed by the extractor.
//!
//! One update shape per domain. Every field is optional: absent scalars keep
//! their prior value, absent collections append nothing. Collections arrive
//! as `Batch<T>` so malformed items are dropped individually.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::models::lenient;
use crate::models::{
    Batch, BasalTemperature, CervicalMucus, CycleHistoryEntry, CycleRegularity, DailyNutrition,
    Domain, ExerciseActivity, FertilityGoal, MoodRecord, NoteRecord, OvulationTest, PeriodDay,
    SleepRecord, StressRecord, SupplementRecord, SymptomRecord,
};

// ═══════════════════════════════════════════════════════════
// Per-domain update shapes
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CurrentCycleUpdate {
    #[serde(deserialize_with = "lenient::field")]
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    #[serde(deserialize_with = "lenient::nullable")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(alias = "cycle_length", deserialize_with = "lenient::nullable_days")]
    pub cycle_length_days: Option<Option<u32>>,
    pub period_days: Batch<PeriodDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PredictionsUpdate {
    #[serde(deserialize_with = "lenient::nullable")]
    pub next_period_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "lenient::nullable")]
    pub next_ovulation_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "lenient::field")]
    pub cycle_regularity: Option<CycleRegularity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CycleUpdate {
    #[serde(deserialize_with = "lenient::field")]
    pub current_cycle: Option<CurrentCycleUpdate>,
    pub cycle_history: Batch<CycleHistoryEntry>,
    #[serde(deserialize_with = "lenient::field")]
    pub predictions: Option<PredictionsUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SymptomMoodUpdate {
    pub symptoms: Batch<SymptomRecord>,
    pub moods: Batch<MoodRecord>,
    #[serde(alias = "daily_notes")]
    pub notes: Batch<NoteRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FertilityUpdate {
    #[serde(deserialize_with = "lenient::field")]
    pub goal: Option<FertilityGoal>,
    #[serde(alias = "bbt")]
    pub basal_body_temperature: Batch<BasalTemperature>,
    pub cervical_mucus: Batch<CervicalMucus>,
    pub ovulation_tests: Batch<OvulationTest>,
    /// Derived block supplied by the extractor. Accepted so it is not mistaken
    /// for data, then discarded: the fertility insight is always recomputed.
    #[serde(deserialize_with = "lenient::field")]
    pub fertility_insights: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NutritionUpdate {
    pub daily_nutrition: Batch<DailyNutrition>,
    pub supplements: Batch<SupplementRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExerciseUpdate {
    #[serde(alias = "exercises", alias = "activities")]
    pub daily_activities: Batch<ExerciseActivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LifestyleUpdate {
    pub sleep_records: Batch<SleepRecord>,
    pub stress_tracking: Batch<StressRecord>,
}

// ═══════════════════════════════════════════════════════════
// CandidateRecord
// ═══════════════════════════════════════════════════════════

/// A normalised extractor result for exactly one domain.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateRecord {
    Cycle(CycleUpdate),
    SymptomMood(SymptomMoodUpdate),
    Fertility(FertilityUpdate),
    Nutrition(NutritionUpdate),
    Exercise(ExerciseUpdate),
    Lifestyle(LifestyleUpdate),
}

/// Keys the extractor may wrap a domain's payload in (`{"cycle_data": {...}}`).
/// The first is the one advertised to the extractor; symptom/mood also
/// accepts the key the session state is emitted under.
pub fn envelope_keys(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Cycle => &["cycle_data"],
        Domain::SymptomMood => &["tracking_data", "symptom_mood_data"],
        Domain::Fertility => &["fertility_data"],
        Domain::Nutrition => &["nutrition_data"],
        Domain::Exercise => &["exercise_data"],
        Domain::Lifestyle => &["lifestyle_data"],
    }
}

/// Preferred envelope key for `domain`.
pub fn envelope_key(domain: Domain) -> &'static str {
    envelope_keys(domain)[0]
}

impl CandidateRecord {
    /// Parse a payload object for `domain`. The envelope key, if present,
    /// is unwrapped first. Unknown keys are ignored; a non-object payload is
    /// an error.
    pub fn from_payload(domain: Domain, payload: Value) -> Result<Self, serde_json::Error> {
        let payload = match payload {
            Value::Object(mut map) => match envelope_keys(domain)
                .iter()
                .find_map(|key| map.remove(*key))
            {
                Some(inner) => inner,
                None => Value::Object(map),
            },
            other => other,
        };
        let payload = match payload {
            Value::Null => Value::Object(Default::default()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "{domain} payload must be an object, got {other}"
                )))
            }
        };

        Ok(match domain {
            Domain::Cycle => Self::Cycle(serde_json::from_value(payload)?),
            Domain::SymptomMood => Self::SymptomMood(serde_json::from_value(payload)?),
            Domain::Fertility => Self::Fertility(serde_json::from_value(payload)?),
            Domain::Nutrition => Self::Nutrition(serde_json::from_value(payload)?),
            Domain::Exercise => Self::Exercise(serde_json::from_value(payload)?),
            Domain::Lifestyle => Self::Lifestyle(serde_json::from_value(payload)?),
        })
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Cycle(_) => Domain::Cycle,
            Self::SymptomMood(_) => Domain::SymptomMood,
            Self::Fertility(_) => Domain::Fertility,
            Self::Nutrition(_) => Domain::Nutrition,
            Self::Exercise(_) => Domain::Exercise,
            Self::Lifestyle(_) => Domain::Lifestyle,
        }
    }

    /// Valid collection items carried by this update.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Cycle(u) => {
                u.cycle_history.items.len()
                    + u.current_cycle.as_ref().map_or(0, |c| c.period_days.items.len())
            }
            Self::SymptomMood(u) => u.symptoms.items.len() + u.moods.items.len() + u.notes.items.len(),
            Self::Fertility(u) => {
                u.basal_body_temperature.items.len()
                    + u.cervical_mucus.items.len()
                    + u.ovulation_tests.items.len()
            }
            Self::Nutrition(u) => u.daily_nutrition.items.len() + u.supplements.items.len(),
            Self::Exercise(u) => u.daily_activities.items.len(),
            Self::Lifestyle(u) => u.sleep_records.items.len() + u.stress_tracking.items.len(),
        }
    }

    /// Items discarded as malformed during parsing.
    pub fn dropped_count(&self) -> usize {
        match self {
            Self::Cycle(u) => {
                u.cycle_history.dropped
                    + u.current_cycle.as_ref().map_or(0, |c| c.period_days.dropped)
            }
            Self::SymptomMood(u) => u.symptoms.dropped + u.moods.dropped + u.notes.dropped,
            Self::Fertility(u) => {
                u.basal_body_temperature.dropped + u.cervical_mucus.dropped + u.ovulation_tests.dropped
            }
            Self::Nutrition(u) => u.daily_nutrition.dropped + u.supplements.dropped,
            Self::Exercise(u) => u.daily_activities.dropped,
            Self::Lifestyle(u) => u.sleep_records.dropped + u.stress_tracking.dropped,
        }
    }

    fn has_scalar_update(&self) -> bool {
        match self {
            Self::Cycle(u) => {
                u.predictions.is_some()
                    || u.current_cycle.as_ref().is_some_and(|c| {
                        c.start_date.is_some() || c.end_date.is_some() || c.cycle_length_days.is_some()
                    })
            }
            Self::Fertility(u) => u.goal.is_some(),
            _ => false,
        }
    }

    /// Nothing to merge and nothing was dropped: the extractor found no data.
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0 && self.dropped_count() == 0 && !self.has_scalar_update()
    }
}
