use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use super::error::ExtractionError;
use super::extractor::{normalize, CandidateExtractor, ExtractionContext};
use crate::config::TrackerConfig;
use crate::insights;
use crate::models::{Domain, RouteTarget, SessionState};
use crate::router::{IntentRouter, RoutingDecision};
use crate::scoring;
use crate::store::{self, CandidateRecord, DomainSchema, MergeReport};

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    /// A candidate was merged into the domain.
    Updated(MergeReport),
    /// The extractor found nothing to record.
    NoActionableData { domain: Domain },
    /// The extractor errored, timed out or produced garbage. State unchanged.
    ExtractionFailed { domain: Domain, reason: String },
    /// Routed to health insights: derived state recomputed.
    InsightsRefreshed,
    /// Routed to a target that owns no records (recipes).
    NotTracked { target: RouteTarget },
}

impl TurnStatus {
    /// Plain acknowledgement for the user.
    pub fn acknowledgement(&self, state: &SessionState) -> String {
        match self {
            Self::Updated(report) if report.accepted == 0 && report.duplicates > 0 => {
                format!("Thanks, those {} entries were already recorded.", report.domain)
            }
            Self::Updated(report) if report.accepted == 0 && report.dropped > 0 => format!(
                "Thanks, but I couldn't read those {} entries, so nothing new was logged.",
                report.domain
            ),
            Self::Updated(report) if report.accepted == 0 => {
                format!("Got it, I've updated your {} log.", report.domain)
            }
            Self::Updated(report) => format!(
                "Got it, I've updated your {} log with {} new entr{}.",
                report.domain,
                report.accepted,
                if report.accepted == 1 { "y" } else { "ies" }
            ),
            Self::NoActionableData { .. } => {
                "Thanks, I didn't find anything to log this time.".to_string()
            }
            Self::ExtractionFailed { .. } => {
                "Thanks for sharing. I couldn't record that right now.".to_string()
            }
            Self::InsightsRefreshed => format!(
                "Your overall health score is {}.",
                state.overall.overall_score
            ),
            Self::NotTracked { target } => {
                format!("Thanks! {target} requests aren't tracked in your health log.")
            }
        }
    }
}

/// Result of one turn. `state` is the state to publish: a new value when
/// anything changed, otherwise the same `Arc` the turn started from.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub decision: RoutingDecision,
    pub status: TurnStatus,
    pub state: Arc<SessionState>,
    pub reply: String,
}

/// Routes an utterance, extracts, merges and recomputes.
pub struct Coordinator<E> {
    router: IntentRouter,
    extractor: E,
    config: TrackerConfig,
}

impl<E: CandidateExtractor> Coordinator<E> {
    pub fn new(extractor: E, config: TrackerConfig) -> Self {
        Self {
            router: IntentRouter::default(),
            extractor,
            config,
        }
    }

    pub fn with_router(mut self, router: IntentRouter) -> Self {
        self.router = router;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    /// Run one turn against `current`. Never fails: extraction problems come
    /// back as `TurnStatus::ExtractionFailed` with `current` unchanged.
    pub async fn run_turn(
        &self,
        current: &Arc<SessionState>,
        utterance: &str,
        today: NaiveDate,
    ) -> TurnOutcome {
        let decision = self.router.route(utterance);

        let (status, state) = match decision.target.domain() {
            Some(domain) => self.track(current, domain, decision.target, utterance, today).await,
            None if decision.target == RouteTarget::HealthInsights => {
                let mut next = SessionState::clone(current);
                self.refresh_all(&mut next);
                next.current_route = Some(decision.target);
                (TurnStatus::InsightsRefreshed, Arc::new(next))
            }
            None => {
                let mut next = SessionState::clone(current);
                next.current_route = Some(decision.target);
                (
                    TurnStatus::NotTracked {
                        target: decision.target,
                    },
                    Arc::new(next),
                )
            }
        };

        let reply = status.acknowledgement(&state);
        TurnOutcome {
            decision,
            status,
            state,
            reply,
        }
    }

    async fn track(
        &self,
        current: &Arc<SessionState>,
        domain: Domain,
        target: RouteTarget,
        utterance: &str,
        today: NaiveDate,
    ) -> (TurnStatus, Arc<SessionState>) {
        let candidate = match self.extract(current, domain, utterance, today).await {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "Extraction failed, state unchanged");
                return (
                    TurnStatus::ExtractionFailed {
                        domain,
                        reason: e.to_string(),
                    },
                    Arc::clone(current),
                );
            }
        };

        let Some(candidate) = candidate else {
            tracing::info!(domain = %domain, "No actionable data in utterance");
            let mut next = SessionState::clone(current);
            next.current_route = Some(target);
            return (TurnStatus::NoActionableData { domain }, Arc::new(next));
        };

        let (mut next, report) = store::merge(current, candidate, &self.config);
        next.current_route = Some(target);
        tracing::info!(
            domain = %domain,
            accepted = report.accepted,
            duplicates = report.duplicates,
            dropped = report.dropped,
            overall = next.overall.overall_score,
            "Merged turn into session state"
        );
        (TurnStatus::Updated(report), Arc::new(next))
    }

    async fn extract(
        &self,
        current: &SessionState,
        domain: Domain,
        utterance: &str,
        today: NaiveDate,
    ) -> Result<Option<CandidateRecord>, ExtractionError> {
        let schema = DomainSchema::for_domain(domain);
        let context = ExtractionContext {
            utterance,
            domain,
            schema: &schema,
            today,
            current,
        };

        let limit = self.config.extraction_timeout_secs;
        let raw = tokio::time::timeout(Duration::from_secs(limit), self.extractor.extract(context))
            .await
            .map_err(|_| ExtractionError::Timeout(limit))??;

        match raw {
            Some(raw) => normalize(domain, raw),
            None => Ok(None),
        }
    }

    /// Recompute every domain's derived fields and the overall insight.
    fn refresh_all(&self, state: &mut SessionState) {
        for domain in Domain::all() {
            scoring::refresh(*domain, state, &self.config);
        }
        state.overall = insights::fuse(&state.domain_scores(), &self.config.fusion);
    }
}
