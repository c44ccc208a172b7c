//! Duplicate-name resolution over the merged batch.
//!
//! Tie-break: rows are visited in ascending source row order and a later row
//! replaces an earlier one with the same name. Names compare exactly after
//! the normalizer's trimming; case is significant.

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::NormalizedPlanet;
use crate::pipeline::events::PipelineEvent;

/// A planet tagged with the source row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlanet {
    pub row: usize,
    pub planet: NormalizedPlanet,
}

/// Resolve duplicates. Returns the survivors ordered by name and one
/// `Superseded` event per losing row.
pub fn resolve_duplicates(mut rows: Vec<RowPlanet>) -> (Vec<NormalizedPlanet>, Vec<PipelineEvent>) {
    rows.sort_by_key(|r| r.row);

    let mut survivors: BTreeMap<String, RowPlanet> = BTreeMap::new();
    let mut events = Vec::new();

    for entry in rows {
        let name = entry.planet.name.clone();
        let winning_row = entry.row;
        if let Some(previous) = survivors.insert(name.clone(), entry) {
            debug!(
                planet = %name,
                superseded_row = previous.row,
                winning_row,
                "Duplicate planet name superseded"
            );
            events.push(PipelineEvent::Superseded {
                planet: name,
                superseded_row: previous.row,
                winning_row,
            });
        }
    }

    let planets = survivors.into_values().map(|r| r.planet).collect();
    (planets, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measure;

    fn row(row: usize, name: &str, radius: f64) -> RowPlanet {
        let mut planet = NormalizedPlanet::new(name);
        planet.physical.radius_earth = Measure::Known(radius);
        RowPlanet { row, planet }
    }

    #[test]
    fn test_later_row_wins() {
        let (planets, events) = resolve_duplicates(vec![
            row(0, "A b", 1.0),
            row(1, "B b", 2.0),
            row(2, "A b", 3.0),
        ]);
        assert_eq!(planets.len(), 2);
        assert_eq!(planets[0].name, "A b");
        assert_eq!(planets[0].physical.radius_earth, Measure::Known(3.0));
        assert_eq!(
            events,
            vec![PipelineEvent::Superseded {
                planet: "A b".to_string(),
                superseded_row: 0,
                winning_row: 2,
            }]
        );
    }

    #[test]
    fn test_input_order_of_shards_does_not_matter() {
        let (planets, events) = resolve_duplicates(vec![row(5, "X", 9.0), row(1, "X", 1.0)]);
        assert_eq!(planets[0].physical.radius_earth, Measure::Known(9.0));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_triplicate_logs_each_loser() {
        let (planets, events) =
            resolve_duplicates(vec![row(0, "T", 1.0), row(1, "T", 2.0), row(2, "T", 3.0)]);
        assert_eq!(planets.len(), 1);
        assert_eq!(events.len(), 2);
    }
}
