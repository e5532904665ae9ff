//! Per-domain shape description handed to the extractor.
//!
//! Built from the record types themselves, so the collection names and
//! identity fields an extractor is told about are the ones the merge uses.

use serde::Serialize;

use super::candidate::envelope_key;
use crate::models::{
    BasalTemperature, CervicalMucus, CycleHistoryEntry, DailyNutrition, DatedRecord, Domain,
    ExerciseActivity, MoodRecord, NoteRecord, OvulationTest, PeriodDay, SleepRecord,
    StressRecord, SupplementRecord, SymptomRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionSpec {
    pub name: &'static str,
    /// Discriminator paired with `date`; `None` allows one entry per date.
    pub identity_field: Option<&'static str>,
}

impl CollectionSpec {
    fn of<T: DatedRecord>() -> Self {
        Self {
            name: T::COLLECTION,
            identity_field: T::IDENTITY_FIELD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSchema {
    pub domain: Domain,
    pub envelope_key: &'static str,
    /// Overwritten fields (last write wins).
    pub scalars: &'static [&'static str],
    /// Appended collections (first write wins per identity).
    pub collections: Vec<CollectionSpec>,
}

impl DomainSchema {
    pub fn for_domain(domain: Domain) -> Self {
        let (scalars, collections): (&'static [&'static str], Vec<CollectionSpec>) = match domain {
            Domain::Cycle => (
                &[
                    "current_cycle.start_date",
                    "current_cycle.end_date",
                    "current_cycle.cycle_length_days",
                    "predictions",
                ],
                vec![CollectionSpec::of::<PeriodDay>(), CollectionSpec::of::<CycleHistoryEntry>()],
            ),
            Domain::SymptomMood => (
                &[],
                vec![
                    CollectionSpec::of::<SymptomRecord>(),
                    CollectionSpec::of::<MoodRecord>(),
                    CollectionSpec::of::<NoteRecord>(),
                ],
            ),
            Domain::Fertility => (
                &["goal"],
                vec![
                    CollectionSpec::of::<BasalTemperature>(),
                    CollectionSpec::of::<CervicalMucus>(),
                    CollectionSpec::of::<OvulationTest>(),
                ],
            ),
            Domain::Nutrition => (
                &[],
                vec![
                    CollectionSpec::of::<DailyNutrition>(),
                    CollectionSpec::of::<SupplementRecord>(),
                ],
            ),
            Domain::Exercise => (&[], vec![CollectionSpec::of::<ExerciseActivity>()]),
            Domain::Lifestyle => (
                &[],
                vec![CollectionSpec::of::<SleepRecord>(), CollectionSpec::of::<StressRecord>()],
            ),
        };
        Self {
            domain,
            envelope_key: envelope_key(domain),
            scalars,
            collections,
        }
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|c| c.name == name)
    }
}
