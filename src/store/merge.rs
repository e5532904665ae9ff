//! Append-with-dedup merge of a candidate into session state.
//!
//! Scalars present in the candidate overwrite (last write wins); collections
//! append each incoming item unless the identity rule finds an earlier entry
//! (first write wins). The caller's state is never touched: merging works on
//! a copy, recomputes that domain's derived fields and the overall insight,
//! and returns the new state for the caller to swap in.

use serde::Serialize;

use super::candidate::{
    CandidateRecord, CycleUpdate, ExerciseUpdate, FertilityUpdate, LifestyleUpdate,
    NutritionUpdate, SymptomMoodUpdate,
};
use crate::config::TrackerConfig;
use crate::insights;
use crate::models::{
    Batch, CycleState, DatedRecord, Domain, ExerciseState, FertilityState, LifestyleState,
    NutritionState, SessionState, SymptomMoodState,
};
use crate::scoring;

/// What one merge did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub domain: Domain,
    /// Items appended.
    pub accepted: usize,
    /// Items skipped because an equal-identity entry already existed.
    pub duplicates: usize,
    /// Items discarded as malformed before merging.
    pub dropped: usize,
}

impl MergeReport {
    fn new(domain: Domain) -> Self {
        Self {
            domain,
            accepted: 0,
            duplicates: 0,
            dropped: 0,
        }
    }

    fn absorb<T: DatedRecord>(&mut self, collection: &mut Vec<T>, batch: Batch<T>) {
        self.dropped += batch.dropped;
        let incoming = batch.items.len();
        let accepted = append_unique(collection, batch.items);
        self.accepted += accepted;
        self.duplicates += incoming - accepted;
    }
}

/// Append each incoming record unless an equal-identity record is already
/// present, including one appended earlier from the same batch. Returns the
/// number appended.
pub fn append_unique<T: DatedRecord>(collection: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let mut appended = 0;
    for record in incoming {
        if collection.iter().any(|existing| record.is_duplicate_of(existing)) {
            tracing::trace!(
                collection = T::COLLECTION,
                date = %record.date(),
                "Skipped duplicate record"
            );
            continue;
        }
        collection.push(record);
        appended += 1;
    }
    appended
}

// ═══════════════════════════════════════════════════════════
// Per-domain merges
// ═══════════════════════════════════════════════════════════

fn merge_cycle(state: &mut CycleState, update: CycleUpdate, report: &mut MergeReport) {
    if let Some(current) = update.current_cycle {
        if let Some(start) = current.start_date {
            state.current_cycle.start_date = Some(start);
        }
        if let Some(end) = current.end_date {
            state.current_cycle.end_date = end;
        }
        if let Some(length) = current.cycle_length_days {
            state.current_cycle.cycle_length_days = length;
        }
        report.absorb(&mut state.current_cycle.period_days, current.period_days);
    }
    report.absorb(&mut state.cycle_history, update.cycle_history);
    if let Some(predictions) = update.predictions {
        if let Some(next) = predictions.next_period_date {
            state.predictions.next_period_date = next;
        }
        if let Some(next) = predictions.next_ovulation_date {
            state.predictions.next_ovulation_date = next;
        }
        if let Some(regularity) = predictions.cycle_regularity {
            state.predictions.cycle_regularity = regularity;
        }
    }
}

fn merge_symptom_mood(
    state: &mut SymptomMoodState,
    update: SymptomMoodUpdate,
    report: &mut MergeReport,
) {
    report.absorb(&mut state.symptoms, update.symptoms);
    report.absorb(&mut state.moods, update.moods);
    report.absorb(&mut state.notes, update.notes);
}

fn merge_fertility(state: &mut FertilityState, update: FertilityUpdate, report: &mut MergeReport) {
    if let Some(goal) = update.goal {
        state.goal = goal;
    }
    if update.fertility_insights.is_some() {
        tracing::debug!("Ignoring extractor-supplied fertility insights, recomputed on refresh");
    }
    report.absorb(&mut state.basal_body_temperature, update.basal_body_temperature);
    report.absorb(&mut state.cervical_mucus, update.cervical_mucus);
    report.absorb(&mut state.ovulation_tests, update.ovulation_tests);
}

fn merge_nutrition(state: &mut NutritionState, update: NutritionUpdate, report: &mut MergeReport) {
    report.absorb(&mut state.daily_nutrition, update.daily_nutrition);
    report.absorb(&mut state.supplements, update.supplements);
}

fn merge_exercise(state: &mut ExerciseState, update: ExerciseUpdate, report: &mut MergeReport) {
    report.absorb(&mut state.daily_activities, update.daily_activities);
}

fn merge_lifestyle(state: &mut LifestyleState, update: LifestyleUpdate, report: &mut MergeReport) {
    report.absorb(&mut state.sleep_records, update.sleep_records);
    report.absorb(&mut state.stress_tracking, update.stress_tracking);
}

/// Merge `candidate` into a copy of `existing`, then recompute the domain's
/// derived fields and the overall insight.
pub fn merge(
    existing: &SessionState,
    candidate: CandidateRecord,
    config: &TrackerConfig,
) -> (SessionState, MergeReport) {
    let domain = candidate.domain();
    let mut next = existing.clone();
    let mut report = MergeReport::new(domain);

    match candidate {
        CandidateRecord::Cycle(u) => merge_cycle(&mut next.cycle, u, &mut report),
        CandidateRecord::SymptomMood(u) => merge_symptom_mood(&mut next.symptom_mood, u, &mut report),
        CandidateRecord::Fertility(u) => merge_fertility(&mut next.fertility, u, &mut report),
        CandidateRecord::Nutrition(u) => merge_nutrition(&mut next.nutrition, u, &mut report),
        CandidateRecord::Exercise(u) => merge_exercise(&mut next.exercise, u, &mut report),
        CandidateRecord::Lifestyle(u) => merge_lifestyle(&mut next.lifestyle, u, &mut report),
    }

    scoring::refresh(domain, &mut next, config);
    next.overall = insights::fuse(&next.domain_scores(), &config.fusion);

    tracing::debug!(
        domain = %domain,
        accepted = report.accepted,
        duplicates = report.duplicates,
        dropped = report.dropped,
        "Merged candidate"
    );
    (next, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BbtPattern, FertilityGoal, FlowIntensity, HydrationStatus, NoteRecord, SymptomRecord,
    };
    use chrono::NaiveDate;
    use serde_json::json;

    fn candidate(domain: Domain, payload: serde_json::Value) -> CandidateRecord {
        CandidateRecord::from_payload(domain, payload).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_symptom(day: &str, kind: &str) -> SymptomRecord {
        SymptomRecord {
            date: date(day),
            symptom_type: kind.into(),
            severity: Some(5),
            notes: None,
        }
    }

    #[test]
    fn cycle_scenario_is_idempotent() {
        let config = TrackerConfig::default();
        let payload = json!({"current_cycle": {
            "start_date": "2025-06-01",
            "period_days": [{"date": "2025-06-01", "flow_intensity": "Medium"}]
        }});

        let (once, report) = merge(&SessionState::default(), candidate(Domain::Cycle, payload.clone()), &config);
        assert_eq!(once.cycle.current_cycle.start_date, Some(date("2025-06-01")));
        assert_eq!(once.cycle.current_cycle.period_days.len(), 1);
        assert_eq!(
            once.cycle.current_cycle.period_days[0].flow_intensity,
            Some(FlowIntensity::Medium)
        );
        assert_eq!(report.accepted, 1);

        let (twice, report) = merge(&once, candidate(Domain::Cycle, payload), &config);
        assert_eq!(twice.cycle.current_cycle.period_days.len(), 1);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.duplicates, 1);
        assert_eq!(twice, once);
    }

    #[test]
    fn existing_state_is_not_mutated() {
        let config = TrackerConfig::default();
        let before = SessionState::default();
        let snapshot = before.clone();
        let (after, _) = merge(
            &before,
            candidate(Domain::Nutrition, json!({"supplements": [{"date": "2025-06-01", "supplement_type": "Iron"}]})),
            &config,
        );
        assert_eq!(before, snapshot);
        assert_eq!(after.nutrition.supplements.len(), 1);
    }

    #[test]
    fn arrival_order_is_preserved() {
        let mut collection = Vec::new();
        let arrivals = vec![
            make_symptom("2025-06-03", "Cramps"),
            make_symptom("2025-06-01", "Headache"),
            make_symptom("2025-06-02", "Fatigue"),
        ];
        for record in arrivals.clone() {
            append_unique(&mut collection, vec![record]);
        }
        assert_eq!(collection, arrivals);
    }

    #[test]
    fn duplicates_within_one_batch_are_dropped() {
        let mut collection = vec![make_symptom("2025-06-01", "Cramps")];
        let appended = append_unique(
            &mut collection,
            vec![
                make_symptom("2025-06-01", "Cramps"),
                make_symptom("2025-06-02", "Cramps"),
                make_symptom("2025-06-02", "Cramps"),
            ],
        );
        assert_eq!(appended, 1);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn first_write_wins_on_duplicate() {
        let mut collection = vec![make_symptom("2025-06-01", "Cramps")];
        let mut later = make_symptom("2025-06-01", "Cramps");
        later.severity = Some(9);
        append_unique(&mut collection, vec![later]);
        assert_eq!(collection[0].severity, Some(5));
    }

    #[test]
    fn notes_dedup_on_exact_text_only() {
        let note = |text: &str| NoteRecord {
            date: date("2025-06-01"),
            note: text.into(),
        };
        let mut notes = vec![note("Felt fine")];
        assert_eq!(append_unique(&mut notes, vec![note("Felt fine")]), 0);
        assert_eq!(append_unique(&mut notes, vec![note("Felt fine.")]), 1);
    }

    #[test]
    fn partial_cycle_update_keeps_other_fields() {
        let config = TrackerConfig::default();
        let (state, _) = merge(
            &SessionState::default(),
            candidate(Domain::Cycle, json!({"current_cycle": {"start_date": "2025-06-01", "end_date": "2025-06-05", "cycle_length_days": 28}})),
            &config,
        );
        let (state, _) = merge(
            &state,
            candidate(Domain::Cycle, json!({"current_cycle": {"cycle_length": 30}})),
            &config,
        );
        assert_eq!(state.cycle.current_cycle.start_date, Some(date("2025-06-01")));
        assert_eq!(state.cycle.current_cycle.end_date, Some(date("2025-06-05")));
        assert_eq!(state.cycle.current_cycle.cycle_length_days, Some(30));

        let (state, _) = merge(
            &state,
            candidate(Domain::Cycle, json!({"current_cycle": {"end_date": null}})),
            &config,
        );
        assert_eq!(state.cycle.current_cycle.end_date, None);
        assert_eq!(state.cycle.current_cycle.cycle_length_days, Some(30));
    }

    #[test]
    fn computed_predictions_override_merged_ones() {
        let config = TrackerConfig::default();
        let (state, _) = merge(
            &SessionState::default(),
            candidate(Domain::Cycle, json!({
                "current_cycle": {"start_date": "2025-06-01"},
                "predictions": {"next_period_date": "2025-12-25", "cycle_regularity": "irregular"}
            })),
            &config,
        );
        assert_eq!(state.cycle.predictions.next_period_date, Some(date("2025-06-29")));
        assert_eq!(state.cycle.predictions.next_ovulation_date, Some(date("2025-06-15")));
        assert_eq!(state.cycle.predictions.cycle_regularity.as_str(), "needs more data");
    }

    #[test]
    fn malformed_items_are_dropped_individually() {
        let config = TrackerConfig::default();
        let (state, report) = merge(
            &SessionState::default(),
            candidate(Domain::SymptomMood, json!({
                "symptoms": [
                    {"date": "2025-06-01", "symptom_type": "Cramps", "severity": 6},
                    {"symptom_type": "Headache", "severity": 4}
                ],
                "moods": "happy"
            })),
            &config,
        );
        assert_eq!(state.symptom_mood.symptoms.len(), 1);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.dropped, 2);
    }

    #[test]
    fn merge_recomputes_domain_and_overall() {
        let config = TrackerConfig::default();
        let days: Vec<_> = (1..=7)
            .map(|d| json!({"date": format!("2025-06-0{d}"), "water_intake_ml": 2500}))
            .collect();
        let (state, _) = merge(
            &SessionState::default(),
            candidate(Domain::Nutrition, json!({"nutrition_data": {"daily_nutrition": days}})),
            &config,
        );
        assert_eq!(state.nutrition.hydration_status, HydrationStatus::Good);
        assert_eq!(state.nutrition.insight.score, 70);
        assert_eq!(state.overall.overall_score, 70);
        assert!(state.overall.improving.contains(&Domain::Nutrition));
    }

    #[test]
    fn fertility_goal_and_bbt_analysis() {
        let config = TrackerConfig::default();
        let temps: Vec<_> = (1..=14)
            .map(|d| {
                let t = if d <= 7 { 36.4 } else { 36.7 };
                json!({"date": format!("2025-06-{d:02}"), "temperature": t})
            })
            .collect();
        let (state, report) = merge(
            &SessionState::default(),
            candidate(Domain::Fertility, json!({"goal": "Trying to Conceive", "basal_body_temperature": temps})),
            &config,
        );
        assert_eq!(report.accepted, 14);
        assert_eq!(state.fertility.goal, FertilityGoal::TryingToConceive);
        assert_eq!(state.fertility.bbt_analysis.pattern, BbtPattern::Biphasic);
        assert_eq!(state.fertility.bbt_analysis.temperature_rise, Some(0.3));
    }

    #[test]
    fn supplied_fertility_insights_do_not_override_derived_block() {
        let config = TrackerConfig::default();
        let (state, report) = merge(
            &SessionState::default(),
            candidate(
                Domain::Fertility,
                json!({
                    "cervical_mucus": [{"date": "2025-06-03", "type": "Egg White"}],
                    "fertility_insights": {"score": 99, "status_text": "perfect"}
                }),
            ),
            &config,
        );
        assert_eq!(report.accepted, 1);
        assert_eq!(state.fertility.insight.score, 50);
        assert_ne!(state.fertility.insight.status_text, "perfect");
    }

    #[test]
    fn fertility_insights_alone_is_no_data() {
        let only_insights = candidate(
            Domain::Fertility,
            json!({"fertility_data": {"fertility_insights": {"score": 80}}}),
        );
        assert!(only_insights.is_empty());
    }
}
