//! Semantic entity aggregation: per-type counts and the confidence histogram.

use crate::correlation::TypeFilter;
use crate::records::SemanticEntityRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tolerance used when comparing the running average with the true mean.
const DIVERGENCE_EPSILON: f64 = 1e-9;

/// Per-type summary of fetched entities.
///
/// `avg_confidence` is the dashboard's running pairwise average: each new
/// confidence is averaged with the current value, so the result depends on
/// record order and is not the arithmetic mean once a type has more than
/// two scored members. The true mean is tracked next to it so both can be
/// shown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityTypeAggregate {
    pub count: usize,
    pub avg_confidence: Option<f64>,
    pub confidence_sum: f64,
    pub confidence_samples: usize,
}

impl EntityTypeAggregate {
    /// Fold one record into the aggregate. Records without a confidence
    /// only bump the count.
    pub fn observe(&mut self, confidence: Option<f64>) {
        self.count += 1;
        if let Some(value) = confidence {
            self.avg_confidence = Some(match self.avg_confidence {
                None => value,
                Some(current) => (current + value) / 2.0,
            });
            self.confidence_sum += value;
            self.confidence_samples += 1;
        }
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        if self.confidence_samples == 0 {
            None
        } else {
            Some(self.confidence_sum / self.confidence_samples as f64)
        }
    }

    /// Whether the running average has drifted from the true mean.
    pub fn diverges(&self) -> bool {
        match (self.avg_confidence, self.mean_confidence()) {
            (Some(avg), Some(mean)) => (avg - mean).abs() > DIVERGENCE_EPSILON,
            _ => false,
        }
    }
}

/// Aggregate entities by type. Recomputed in full on every change.
pub fn aggregate_by_type(
    entities: &[SemanticEntityRecord],
) -> BTreeMap<String, EntityTypeAggregate> {
    let mut aggregates: BTreeMap<String, EntityTypeAggregate> = BTreeMap::new();
    for entity in entities {
        aggregates
            .entry(entity.entity_type.clone())
            .or_default()
            .observe(entity.confidence);
    }
    aggregates
}

/// One 0.1-wide confidence bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBucket {
    /// Lower bound in tenths: bucket `k` spans `[k/10, (k+1)/10)`.
    pub index: i64,
    pub count: usize,
}

impl ConfidenceBucket {
    pub fn label(&self) -> String {
        bucket_label(self.index)
    }
}

/// Confidence distribution over all scored entities, buckets ascending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfidenceHistogram {
    pub buckets: Vec<ConfidenceBucket>,
}

impl ConfidenceHistogram {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn count_for(&self, label: &str) -> usize {
        self.buckets
            .iter()
            .find(|b| b.label() == label)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    /// `(label, count)` pairs for chart widgets.
    pub fn labelled(&self) -> Vec<(String, u64)> {
        self.buckets
            .iter()
            .map(|b| (b.label(), b.count as u64))
            .collect()
    }
}

/// Bucket index of a confidence value, or `None` when it cannot be bucketed.
///
/// Confidence is not range-checked upstream; values too large for an `i64`
/// index saturate into the outermost bucket.
pub fn bucket_index(confidence: f64) -> Option<i64> {
    if confidence.is_finite() {
        Some((confidence * 10.0).floor() as i64)
    } else {
        None
    }
}

fn bucket_label(index: i64) -> String {
    let lower = index as f64 / 10.0;
    format!("{:.1}-{:.1}", lower, lower + 0.1)
}

pub fn confidence_histogram(entities: &[SemanticEntityRecord]) -> ConfidenceHistogram {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for index in entities
        .iter()
        .filter_map(|e| e.confidence)
        .filter_map(bucket_index)
    {
        *counts.entry(index).or_insert(0) += 1;
    }
    ConfidenceHistogram {
        buckets: counts
            .into_iter()
            .map(|(index, count)| ConfidenceBucket { index, count })
            .collect(),
    }
}

/// Sorted distinct entity types.
pub fn entity_types(entities: &[SemanticEntityRecord]) -> Vec<String> {
    entities
        .iter()
        .map(|e| e.entity_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn filter_entities<'a>(
    entities: &'a [SemanticEntityRecord],
    filter: &TypeFilter,
) -> Vec<&'a SemanticEntityRecord> {
    entities
        .iter()
        .filter(|e| filter.matches(&e.entity_type))
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    pub fn entity(id: u128, entity_type: &str, confidence: Option<f64>) -> SemanticEntityRecord {
        SemanticEntityRecord {
            id: Uuid::from_u128(id),
            entity_type: entity_type.to_string(),
            entity_value: format!("value-{}", id),
            confidence,
            source_field: Some("body".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            data_id: Uuid::from_u128(1000 + id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::entity;
    use super::*;

    #[test]
    fn test_two_observations_average_to_mean() {
        let entities = vec![
            entity(1, "PERSON", Some(0.8)),
            entity(2, "PERSON", Some(0.4)),
        ];
        let aggregates = aggregate_by_type(&entities);
        let person = aggregates["PERSON"];
        assert_eq!(person.count, 2);
        assert!((person.avg_confidence.unwrap() - 0.6).abs() < 1e-12);
        assert!(!person.diverges());
    }

    #[test]
    fn test_third_observation_is_pairwise_not_mean() {
        let entities = vec![
            entity(1, "PERSON", Some(0.8)),
            entity(2, "PERSON", Some(0.4)),
            entity(3, "PERSON", Some(1.0)),
        ];
        let person = aggregate_by_type(&entities)["PERSON"];
        assert_eq!(person.count, 3);
        assert!((person.avg_confidence.unwrap() - 0.8).abs() < 1e-12);
        assert!((person.mean_confidence().unwrap() - 2.2 / 3.0).abs() < 1e-12);
        assert!(person.diverges());
    }

    #[test]
    fn test_missing_confidence_counts_but_does_not_average() {
        let entities = vec![
            entity(1, "ORG", None),
            entity(2, "ORG", Some(0.3)),
            entity(3, "ORG", None),
        ];
        let org = aggregate_by_type(&entities)["ORG"];
        assert_eq!(org.count, 3);
        assert_eq!(org.avg_confidence, Some(0.3));
        assert_eq!(org.confidence_samples, 1);
    }

    #[test]
    fn test_type_without_scores_has_no_average() {
        let org = aggregate_by_type(&[entity(1, "ORG", None)])["ORG"];
        assert_eq!(org.avg_confidence, None);
        assert_eq!(org.mean_confidence(), None);
        assert!(!org.diverges());
    }

    #[test]
    fn test_aggregates_keyed_per_type() {
        let entities = vec![
            entity(1, "PERSON", Some(0.8)),
            entity(2, "LOCATION", Some(0.4)),
            entity(3, "PERSON", Some(0.2)),
        ];
        let aggregates = aggregate_by_type(&entities);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates["PERSON"].count, 2);
        assert_eq!(aggregates["LOCATION"].count, 1);
    }

    #[test]
    fn test_histogram_bucket_boundaries() {
        let entities = vec![
            entity(1, "PERSON", Some(0.47)),
            entity(2, "PERSON", Some(0.5)),
            entity(3, "PERSON", Some(0.59)),
            entity(4, "PERSON", None),
        ];
        let histogram = confidence_histogram(&entities);
        assert_eq!(histogram.count_for("0.4-0.5"), 1);
        assert_eq!(histogram.count_for("0.5-0.6"), 2);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_histogram_tenths_land_in_own_bucket() {
        for k in 0..=10 {
            let value = k as f64 / 10.0;
            assert_eq!(bucket_index(value), Some(k), "value {}", value);
        }
    }

    #[test]
    fn test_histogram_buckets_ascending() {
        let entities = vec![
            entity(1, "A", Some(0.95)),
            entity(2, "A", Some(0.05)),
            entity(3, "A", Some(0.55)),
        ];
        let labels: Vec<String> = confidence_histogram(&entities)
            .labelled()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, vec!["0.0-0.1", "0.5-0.6", "0.9-1.0"]);
    }

    #[test]
    fn test_histogram_skips_non_finite() {
        let entities = vec![entity(1, "A", Some(f64::NAN)), entity(2, "A", Some(0.1))];
        assert_eq!(confidence_histogram(&entities).total(), 1);
    }

    #[test]
    fn test_histogram_out_of_range_confidence_saturates() {
        let entities = vec![
            entity(1, "A", Some(1e300)),
            entity(2, "A", Some(-1e300)),
            entity(3, "A", Some(1.5)),
        ];
        let histogram = confidence_histogram(&entities);
        assert_eq!(histogram.total(), 3);
        assert_eq!(histogram.buckets.first().map(|b| b.index), Some(i64::MIN));
        assert_eq!(histogram.buckets.last().map(|b| b.index), Some(i64::MAX));
        assert_eq!(histogram.count_for("1.5-1.6"), 1);
        let labels: Vec<String> = histogram.labelled().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels.len(), 3);
        assert!(labels.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn test_filter_entities_by_type() {
        let entities = vec![
            entity(1, "PERSON", Some(0.8)),
            entity(2, "LOCATION", Some(0.4)),
        ];
        let only = TypeFilter::Only("LOCATION".to_string());
        let filtered = filter_entities(&entities, &only);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].entity_type, "LOCATION");
        assert_eq!(filter_entities(&entities, &TypeFilter::All).len(), 2);
        assert_eq!(entity_types(&entities), vec!["LOCATION", "PERSON"]);
    }
}
