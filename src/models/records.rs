//! Dated health records and their identity rules.
//!
//! Every collection entry carries a calendar date. Two entries in the same
//! collection are duplicates when they share the date and the collection's
//! discriminator (symptom type, supplement type, note text, ...). Collections
//! whose discriminator is `None` allow one entry per date.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::enums::{
    CervicalMucusType, ExerciseIntensity, FlowIntensity, OvulationTestResult, SleepQuality,
    StressLevel,
};
use super::lenient;

// ═══════════════════════════════════════════════════════════
// Identity rule
// ═══════════════════════════════════════════════════════════

/// A record stored in an insertion-ordered, deduplicated collection.
pub trait DatedRecord: Clone + Serialize + DeserializeOwned {
    /// Collection key in domain state and extractor payloads.
    const COLLECTION: &'static str;
    /// Discriminator field paired with the date; `None` means date-only.
    const IDENTITY_FIELD: Option<&'static str>;

    fn date(&self) -> NaiveDate;

    fn identity(&self) -> Option<&str> {
        None
    }

    fn is_duplicate_of(&self, other: &Self) -> bool {
        self.date() == other.date() && self.identity() == other.identity()
    }

    /// Post-parse cleanup. Returning `None` drops the record as malformed.
    fn sanitize(self) -> Option<Self> {
        Some(self)
    }
}

/// Trim a required text discriminator; empty text is malformed.
fn required_text(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == text.len() {
        Some(text)
    } else {
        Some(trimmed.to_string())
    }
}

// ═══════════════════════════════════════════════════════════
// Batch: incoming items with per-item acceptance
// ═══════════════════════════════════════════════════════════

/// Incoming collection items after per-item validation.
///
/// Deserializes from any JSON value: each array element that parses and
/// sanitizes is kept in order, the rest are counted in `dropped`. A
/// non-array value counts as one dropped item.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub dropped: usize,
}

impl<T> Default for Batch<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            dropped: 0,
        }
    }
}

impl<T: DatedRecord> Batch<T> {
    pub fn from_value(value: Value) -> Self {
        let raw = match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                tracing::debug!(
                    collection = T::COLLECTION,
                    kind = value_kind(&other),
                    "Collection payload is not a list, ignoring"
                );
                return Self {
                    items: Vec::new(),
                    dropped: 1,
                };
            }
        };

        let mut batch = Self::default();
        for item in raw {
            match serde_json::from_value::<T>(item).ok().and_then(T::sanitize) {
                Some(record) => batch.items.push(record),
                None => batch.dropped += 1,
            }
        }

        if batch.dropped > 0 {
            tracing::debug!(
                collection = T::COLLECTION,
                kept = batch.items.len(),
                dropped = batch.dropped,
                "Dropped malformed records"
            );
        }
        batch
    }
}

impl<'de, T: DatedRecord> Deserialize<'de> for Batch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ═══════════════════════════════════════════════════════════
// Cycle
// ═══════════════════════════════════════════════════════════

/// One bleeding day of the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodDay {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::field")]
    pub flow_intensity: Option<FlowIntensity>,
}

impl DatedRecord for PeriodDay {
    const COLLECTION: &'static str = "period_days";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// A completed cycle, keyed on its start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleHistoryEntry {
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::field")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::days")]
    pub cycle_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient::days")]
    pub period_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub average_flow: Option<FlowIntensity>,
}

impl DatedRecord for CycleHistoryEntry {
    const COLLECTION: &'static str = "cycle_history";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.start_date
    }

    fn sanitize(mut self) -> Option<Self> {
        if self.end_date.is_some_and(|end| end < self.start_date) {
            self.end_date = None;
        }
        Some(self)
    }
}

// ═══════════════════════════════════════════════════════════
// Symptom & mood
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRecord {
    pub date: NaiveDate,
    pub symptom_type: String,
    /// 1-10.
    #[serde(default, deserialize_with = "lenient::scale")]
    pub severity: Option<u8>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for SymptomRecord {
    const COLLECTION: &'static str = "symptoms";
    const IDENTITY_FIELD: Option<&'static str> = Some("symptom_type");

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn identity(&self) -> Option<&str> {
        Some(&self.symptom_type)
    }

    fn sanitize(mut self) -> Option<Self> {
        self.symptom_type = required_text(self.symptom_type)?;
        Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodRecord {
    pub date: NaiveDate,
    pub mood_type: String,
    /// 1-10.
    #[serde(default, deserialize_with = "lenient::scale")]
    pub intensity: Option<u8>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for MoodRecord {
    const COLLECTION: &'static str = "moods";
    const IDENTITY_FIELD: Option<&'static str> = Some("mood_type");

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn identity(&self) -> Option<&str> {
        Some(&self.mood_type)
    }

    fn sanitize(mut self) -> Option<Self> {
        self.mood_type = required_text(self.mood_type)?;
        Some(self)
    }
}

/// Free-text daily note. Duplicate only on exact text and date; whitespace
/// or punctuation differences produce a second note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub date: NaiveDate,
    pub note: String,
}

impl DatedRecord for NoteRecord {
    const COLLECTION: &'static str = "notes";
    const IDENTITY_FIELD: Option<&'static str> = Some("note");

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn identity(&self) -> Option<&str> {
        Some(&self.note)
    }

    fn sanitize(self) -> Option<Self> {
        (!self.note.trim().is_empty()).then_some(self)
    }
}

// ═══════════════════════════════════════════════════════════
// Fertility
// ═══════════════════════════════════════════════════════════

/// Basal body temperature reading in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasalTemperature {
    pub date: NaiveDate,
    pub temperature: f64,
    #[serde(default, deserialize_with = "lenient::field")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for BasalTemperature {
    const COLLECTION: &'static str = "basal_body_temperature";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn sanitize(self) -> Option<Self> {
        (self.temperature.is_finite() && self.temperature > 0.0).then_some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CervicalMucus {
    pub date: NaiveDate,
    #[serde(rename = "type", default, deserialize_with = "lenient::field")]
    pub mucus_type: Option<CervicalMucusType>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub amount: Option<String>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for CervicalMucus {
    const COLLECTION: &'static str = "cervical_mucus";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvulationTest {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::field")]
    pub result: Option<OvulationTestResult>,
    /// Positive-line strength, 1-10.
    #[serde(default, deserialize_with = "lenient::scale")]
    pub intensity: Option<u8>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub time: Option<String>,
}

impl DatedRecord for OvulationTest {
    const COLLECTION: &'static str = "ovulation_tests";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }
}

// ═══════════════════════════════════════════════════════════
// Nutrition
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub water_intake_ml: Option<f64>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub focus_areas: Vec<String>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub meal_notes: Option<String>,
}

impl DatedRecord for DailyNutrition {
    const COLLECTION: &'static str = "daily_nutrition";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplementRecord {
    pub date: NaiveDate,
    pub supplement_type: String,
    #[serde(default, deserialize_with = "lenient::field")]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for SupplementRecord {
    const COLLECTION: &'static str = "supplements";
    const IDENTITY_FIELD: Option<&'static str> = Some("supplement_type");

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn identity(&self) -> Option<&str> {
        Some(&self.supplement_type)
    }

    fn sanitize(mut self) -> Option<Self> {
        self.supplement_type = required_text(self.supplement_type)?;
        Some(self)
    }
}

// ═══════════════════════════════════════════════════════════
// Exercise
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseActivity {
    pub date: NaiveDate,
    pub exercise_type: String,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub duration_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub intensity: Option<ExerciseIntensity>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for ExerciseActivity {
    const COLLECTION: &'static str = "daily_activities";
    const IDENTITY_FIELD: Option<&'static str> = Some("exercise_type");

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn identity(&self) -> Option<&str> {
        Some(&self.exercise_type)
    }

    fn sanitize(mut self) -> Option<Self> {
        self.exercise_type = required_text(self.exercise_type)?;
        Some(self)
    }
}

// ═══════════════════════════════════════════════════════════
// Lifestyle
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub sleep_duration_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub sleep_quality: Option<SleepQuality>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub bedtime: Option<String>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub wake_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::field")]
    pub notes: Option<String>,
}

impl DatedRecord for SleepRecord {
    const COLLECTION: &'static str = "sleep_records";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn sanitize(mut self) -> Option<Self> {
        if self.sleep_duration_hours.is_some_and(|h| h > 24.0) {
            self.sleep_duration_hours = None;
        }
        Some(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressRecord {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::field")]
    pub stress_level: Option<StressLevel>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub stress_triggers: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub coping_methods: Vec<String>,
}

impl DatedRecord for StressRecord {
    const COLLECTION: &'static str = "stress_tracking";
    const IDENTITY_FIELD: Option<&'static str> = None;

    fn date(&self) -> NaiveDate {
        self.date
    }
}
