//! Symptom and mood score plus pattern analysis.

use std::collections::BTreeMap;

use super::{clamp_score, mean, recent_by_date, reverse, round_to, status_for, BASE_SCORE};
use crate::models::{is_positive_mood, InsightBlock, MoodTrend, SymptomMoodState, SymptomPatterns};

/// How many symptom types `common_symptoms` lists.
const COMMON_SYMPTOM_LIMIT: usize = 3;

/// Severity at or above which a doctor visit is suggested.
const SEVERE_AVERAGE: f64 = 7.0;

/// Labels ranked by frequency; ties keep first-seen order.
fn by_frequency<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn patterns(state: &SymptomMoodState) -> SymptomPatterns {
    let common_symptoms = by_frequency(state.symptoms.iter().map(|s| s.symptom_type.as_str()))
        .into_iter()
        .take(COMMON_SYMPTOM_LIMIT)
        .map(|(label, _)| label.to_string())
        .collect();

    let mut severities: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for symptom in &state.symptoms {
        if let Some(severity) = symptom.severity {
            severities
                .entry(symptom.symptom_type.clone())
                .or_default()
                .push(f64::from(severity));
        }
    }
    let severity_analysis = severities
        .into_iter()
        .filter_map(|(label, values)| mean(values).map(|avg| (label, round_to(avg, 1))))
        .collect();

    let mood_trend = by_frequency(state.moods.iter().map(|m| m.mood_type.as_str()))
        .first()
        .map(|(dominant, _)| MoodTrend {
            dominant_mood: dominant.to_string(),
            average_intensity: mean(state.moods.iter().filter_map(|m| m.intensity).map(f64::from))
                .map(|avg| round_to(avg, 1)),
        });

    SymptomPatterns {
        common_symptoms,
        severity_analysis,
        mood_trend,
    }
}

pub fn score(state: &SymptomMoodState, window: usize) -> InsightBlock {
    let mut raw = BASE_SCORE;

    let recent_severity = mean(
        recent_by_date(&state.symptoms, window)
            .into_iter()
            .filter_map(|s| s.severity)
            .map(f64::from),
    );
    if let Some(avg) = recent_severity {
        // Severity is a reverse indicator; ±20.
        raw += (reverse(avg * 10.0) - 50.0) * 0.4;
    }

    let recent_moods = recent_by_date(&state.moods, window);
    let positive_share = (!recent_moods.is_empty()).then(|| {
        let positive = recent_moods
            .iter()
            .filter(|m| is_positive_mood(&m.mood_type))
            .count();
        positive as f64 / recent_moods.len() as f64
    });
    if let Some(share) = positive_share {
        // ±20
        raw += (share - 0.5) * 40.0;
    }

    let score = clamp_score(raw);
    let mut recommendations = Vec::new();
    if recent_severity.is_some_and(|avg| avg >= SEVERE_AVERAGE) {
        recommendations
            .push("Recent symptoms are severe; consider consulting a doctor".to_string());
    }
    if positive_share.is_some_and(|share| share < 0.5) {
        recommendations.push(
            "Low mood has been common lately: try relaxation, light exercise and enough sleep"
                .to_string(),
        );
    }
    if recommendations.is_empty() {
        recommendations
            .push("Keep recording symptoms and moods to reveal your patterns".to_string());
    }

    InsightBlock {
        score,
        status_text: status_for(score, &[(70, "well managed"), (45, "moderate")], "needs attention"),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoodRecord, SymptomRecord};
    use chrono::NaiveDate;

    fn make_symptom(day: u32, kind: &str, severity: Option<u8>) -> SymptomRecord {
        SymptomRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            symptom_type: kind.into(),
            severity,
            notes: None,
        }
    }

    fn make_mood(day: u32, kind: &str, intensity: Option<u8>) -> MoodRecord {
        MoodRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            mood_type: kind.into(),
            intensity,
            notes: None,
        }
    }

    #[test]
    fn common_symptoms_by_frequency_then_first_seen() {
        let state = SymptomMoodState {
            symptoms: vec![
                make_symptom(1, "Headache", Some(4)),
                make_symptom(1, "Cramps", Some(8)),
                make_symptom(2, "Cramps", Some(6)),
                make_symptom(2, "Bloating", None),
                make_symptom(3, "Fatigue", Some(3)),
            ],
            ..Default::default()
        };
        let p = patterns(&state);
        assert_eq!(p.common_symptoms, vec!["Cramps", "Headache", "Bloating"]);
        assert_eq!(p.severity_analysis.get("Cramps"), Some(&7.0));
        assert!(!p.severity_analysis.contains_key("Bloating"));
        assert!(p.mood_trend.is_none());
    }

    #[test]
    fn mood_trend_reports_dominant_mood() {
        let state = SymptomMoodState {
            moods: vec![
                make_mood(1, "Anxious", Some(6)),
                make_mood(2, "Calm", Some(3)),
                make_mood(3, "Calm", Some(4)),
            ],
            ..Default::default()
        };
        let trend = patterns(&state).mood_trend.unwrap();
        assert_eq!(trend.dominant_mood, "Calm");
        assert_eq!(trend.average_intensity, Some(4.3));
    }

    #[test]
    fn worst_case_stays_in_bounds() {
        let state = SymptomMoodState {
            symptoms: (1..=7).map(|d| make_symptom(d, "Cramps", Some(10))).collect(),
            moods: (1..=7).map(|d| make_mood(d, "Sad", Some(10))).collect(),
            ..Default::default()
        };
        // 50 - 20 - 20
        let block = score(&state, 7);
        assert_eq!(block.score, 10);
        assert_eq!(block.status_text, "needs attention");
        assert_eq!(block.recommendations.len(), 2);
    }

    #[test]
    fn best_case_stays_in_bounds() {
        let state = SymptomMoodState {
            symptoms: vec![make_symptom(1, "Acne", Some(1))],
            moods: vec![make_mood(1, "Happy", None)],
            ..Default::default()
        };
        // 50 + 16 + 20
        let block = score(&state, 7);
        assert_eq!(block.score, 86);
        assert_eq!(block.status_text, "well managed");
    }

    #[test]
    fn severity_uses_recent_window_by_date() {
        let mut symptoms = vec![make_symptom(20, "Cramps", Some(2))];
        // Older, severe entries fall outside a window of one.
        symptoms.extend((1..=5).map(|d| make_symptom(d, "Cramps", Some(10))));
        let state = SymptomMoodState {
            symptoms,
            ..Default::default()
        };
        // 50 + (80 - 50) * 0.4
        assert_eq!(score(&state, 1).score, 62);
    }

    #[test]
    fn notes_alone_score_neutral() {
        let state = SymptomMoodState {
            notes: vec![crate::models::NoteRecord {
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                note: "Slept in".into(),
            }],
            ..Default::default()
        };
        assert_eq!(score(&state, 7).score, 50);
    }
}
