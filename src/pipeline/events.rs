use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a field value was demoted to unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemotionReason {
    /// Non-numeric content in a numeric column
    Malformed,
    /// Unit annotation with no conversion factor
    UnknownUnit,
    /// Outside the plausible range for the field
    OutOfRange,
    /// Discovery year with a fractional part
    NotIntegral,
}

impl fmt::Display for DemotionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DemotionReason::Malformed => "malformed",
            DemotionReason::UnknownUnit => "unknown unit",
            DemotionReason::OutOfRange => "out of range",
            DemotionReason::NotIntegral => "not integral",
        };
        f.write_str(s)
    }
}

/// A row-level occurrence recorded during a pipeline run. None of these abort
/// the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Row excluded for lacking a usable identity
    Rejected { row: usize, reason: String },
    /// A field value replaced by unknown
    FieldDemoted {
        row: usize,
        planet: String,
        field: String,
        reason: DemotionReason,
        raw: Option<String>,
    },
    /// An earlier row with the same planet name lost to a later one
    Superseded {
        planet: String,
        superseded_row: usize,
        winning_row: usize,
    },
    /// A derived metric left unknown because inputs were missing
    DerivationInsufficient {
        planet: String,
        metric: String,
        missing: Vec<String>,
    },
}

impl PipelineEvent {
    pub fn rejected(row: usize, reason: impl Into<String>) -> Self {
        PipelineEvent::Rejected {
            row,
            reason: reason.into(),
        }
    }

    pub fn demoted(
        row: usize,
        planet: &str,
        field: &str,
        reason: DemotionReason,
        raw: Option<String>,
    ) -> Self {
        PipelineEvent::FieldDemoted {
            row,
            planet: planet.to_string(),
            field: field.to_string(),
            reason,
            raw,
        }
    }

    pub fn insufficient(planet: &str, metric: &str, missing: &[&str]) -> Self {
        PipelineEvent::DerivationInsufficient {
            planet: planet.to_string(),
            metric: metric.to_string(),
            missing: missing.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Ordered log of everything that happened to the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineLog {
    pub events: Vec<PipelineEvent>,
}

impl PipelineLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PipelineEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = PipelineEvent>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn rejected(&self) -> impl Iterator<Item = &PipelineEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Rejected { .. }))
    }

    pub fn demotions(&self) -> impl Iterator<Item = &PipelineEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::FieldDemoted { .. }))
    }

    pub fn superseded(&self) -> impl Iterator<Item = &PipelineEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::Superseded { .. }))
    }

    pub fn insufficient(&self) -> impl Iterator<Item = &PipelineEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::DerivationInsufficient { .. }))
    }

    /// Demotions recorded for one planet, as (field, reason) pairs.
    pub fn demotions_for<'a>(
        &'a self,
        planet_name: &'a str,
    ) -> impl Iterator<Item = (&'a str, DemotionReason)> + 'a {
        self.events.iter().filter_map(move |e| match e {
            PipelineEvent::FieldDemoted {
                planet,
                field,
                reason,
                ..
            } if planet == planet_name => Some((field.as_str(), *reason)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_with_kind_tag() {
        let event = PipelineEvent::Superseded {
            planet: "b".to_string(),
            superseded_row: 0,
            winning_row: 4,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "superseded");
        assert_eq!(json["winning_row"], 4);
    }

    #[test]
    fn test_log_filters_by_kind() {
        let mut log = PipelineLog::new();
        log.push(PipelineEvent::rejected(0, "missing planet name"));
        log.push(PipelineEvent::demoted(
            1,
            "x",
            "distance_ly",
            DemotionReason::Malformed,
            Some("far".to_string()),
        ));
        log.push(PipelineEvent::insufficient("x", "esi", &["radius_earth"]));

        assert_eq!(log.rejected().count(), 1);
        assert_eq!(log.demotions().count(), 1);
        assert_eq!(log.insufficient().count(), 1);
        assert_eq!(log.superseded().count(), 0);
        assert_eq!(
            log.demotions_for("x").collect::<Vec<_>>(),
            vec![("distance_ly", DemotionReason::Malformed)]
        );
    }
}
