//! Correlation filtering, strength tiers and summary statistics.

use crate::error::{PrismError, PrismResult};
use crate::records::CorrelationRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Strength above which a correlation counts as strong.
pub const STRONG_THRESHOLD: f64 = 0.7;

/// Strength above which a correlation counts as medium.
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Category filter shared by the correlation and entity views.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    #[default]
    All,
    Only(String),
}

impl TypeFilter {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(expected) => expected == value,
        }
    }

    /// Step to the next option in `All, types[0], types[1], ..., All`.
    ///
    /// A filter naming a type that is no longer present resets to `All`.
    pub fn cycle(&self, types: &[String]) -> TypeFilter {
        match self {
            TypeFilter::All => types
                .first()
                .map(|t| TypeFilter::Only(t.clone()))
                .unwrap_or(TypeFilter::All),
            TypeFilter::Only(current) => types
                .iter()
                .position(|t| t == current)
                .and_then(|idx| types.get(idx + 1))
                .map(|t| TypeFilter::Only(t.clone()))
                .unwrap_or(TypeFilter::All),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TypeFilter::All => "all",
            TypeFilter::Only(value) => value.as_str(),
        }
    }
}

/// Filter parameters for the correlation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFilter {
    pub correlation_type: TypeFilter,
    pub min_strength: f64,
}

impl CorrelationFilter {
    pub fn new(correlation_type: TypeFilter, min_strength: f64) -> PrismResult<Self> {
        if !min_strength.is_finite() {
            return Err(PrismError::InvalidValue {
                field: "min_strength",
                value: min_strength,
                reason: "must be finite",
            });
        }
        Ok(Self {
            correlation_type,
            min_strength,
        })
    }

    pub fn matches(&self, record: &CorrelationRecord) -> bool {
        self.correlation_type.matches(&record.correlation_type)
            && record.strength >= self.min_strength
    }

    /// Shift the threshold by `delta`, clamped to 0.0..=1.0 and kept on the
    /// 0.1 grid the UI steps through.
    pub fn adjust_min_strength(&mut self, delta: f64) {
        let stepped = ((self.min_strength + delta) * 10.0).round() / 10.0;
        self.min_strength = stepped.clamp(0.0, 1.0);
    }
}

impl Default for CorrelationFilter {
    fn default() -> Self {
        Self {
            correlation_type: TypeFilter::All,
            min_strength: 0.0,
        }
    }
}

/// Subset of `records` matching `filter`, in input order.
pub fn filter_correlations<'a>(
    records: &'a [CorrelationRecord],
    filter: &CorrelationFilter,
) -> Vec<&'a CorrelationRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Sorted distinct correlation types present in `records`.
pub fn distinct_types(records: &[CorrelationRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.correlation_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Display tier of a correlation strength.
///
/// Boundaries are half-open: `> 0.7` strong, `(0.5, 0.7]` medium, `<= 0.5`
/// weak. Every value, NaN included, lands in exactly one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthTier {
    Strong,
    Medium,
    Weak,
}

impl StrengthTier {
    pub fn classify(strength: f64) -> Self {
        if strength > STRONG_THRESHOLD {
            StrengthTier::Strong
        } else if strength > MEDIUM_THRESHOLD {
            StrengthTier::Medium
        } else {
            StrengthTier::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthTier::Strong => "Strong",
            StrengthTier::Medium => "Medium",
            StrengthTier::Weak => "Weak",
        }
    }
}

/// Counts over the full, unfiltered correlation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorrelationStats {
    pub total: usize,
    pub strong: usize,
    pub medium: usize,
    pub weak: usize,
}

impl CorrelationStats {
    pub fn from_records(records: &[CorrelationRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match StrengthTier::classify(record.strength) {
                StrengthTier::Strong => stats.strong += 1,
                StrengthTier::Medium => stats.medium += 1,
                StrengthTier::Weak => stats.weak += 1,
            }
            stats
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    pub fn correlation(
        id: u128,
        source: u128,
        target: u128,
        correlation_type: &str,
        strength: f64,
    ) -> CorrelationRecord {
        CorrelationRecord {
            id: Uuid::from_u128(id),
            source_agent_id: Uuid::from_u128(source),
            target_agent_id: Uuid::from_u128(target),
            correlation_type: correlation_type.to_string(),
            strength,
            metadata: serde_json::Value::Null,
            discovered_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::correlation;
    use super::*;

    fn sample() -> Vec<CorrelationRecord> {
        vec![
            correlation(1, 10, 11, "temporal", 0.9),
            correlation(2, 11, 12, "temporal", 0.6),
            correlation(3, 12, 10, "spatial", 0.2),
        ]
    }

    #[test]
    fn test_stats_count_each_tier() {
        let stats = CorrelationStats::from_records(&sample());
        assert_eq!(
            stats,
            CorrelationStats {
                total: 3,
                strong: 1,
                medium: 1,
                weak: 1
            }
        );
    }

    #[test]
    fn test_stats_of_empty_set_are_zero() {
        assert_eq!(CorrelationStats::from_records(&[]), CorrelationStats::default());
    }

    #[test]
    fn test_filter_by_type_and_strength() {
        let records = sample();
        let filter = CorrelationFilter::new(TypeFilter::Only("temporal".to_string()), 0.5).unwrap();
        let ids: Vec<u128> = filter_correlations(&records, &filter)
            .iter()
            .map(|r| r.id.as_u128())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_filter_min_strength_is_inclusive() {
        let records = vec![correlation(1, 1, 2, "temporal", 0.5)];
        let filter = CorrelationFilter::new(TypeFilter::All, 0.5).unwrap();
        assert_eq!(filter_correlations(&records, &filter).len(), 1);
    }

    #[test]
    fn test_filter_rejects_nan_threshold() {
        assert!(CorrelationFilter::new(TypeFilter::All, f64::NAN).is_err());
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(StrengthTier::classify(0.71), StrengthTier::Strong);
        assert_eq!(StrengthTier::classify(0.7), StrengthTier::Medium);
        assert_eq!(StrengthTier::classify(0.51), StrengthTier::Medium);
        assert_eq!(StrengthTier::classify(0.5), StrengthTier::Weak);
        assert_eq!(StrengthTier::classify(-1.0), StrengthTier::Weak);
        assert_eq!(StrengthTier::classify(f64::NAN), StrengthTier::Weak);
    }

    #[test]
    fn test_distinct_types_sorted_and_deduplicated() {
        assert_eq!(distinct_types(&sample()), vec!["spatial", "temporal"]);
    }

    #[test]
    fn test_type_filter_cycle_wraps_to_all() {
        let types = vec!["spatial".to_string(), "temporal".to_string()];
        let first = TypeFilter::All.cycle(&types);
        assert_eq!(first, TypeFilter::Only("spatial".to_string()));
        let second = first.cycle(&types);
        assert_eq!(second, TypeFilter::Only("temporal".to_string()));
        assert_eq!(second.cycle(&types), TypeFilter::All);
    }

    #[test]
    fn test_type_filter_cycle_resets_unknown_type() {
        let types = vec!["spatial".to_string()];
        let stale = TypeFilter::Only("causal".to_string());
        assert_eq!(stale.cycle(&types), TypeFilter::All);
        assert_eq!(TypeFilter::All.cycle(&[]), TypeFilter::All);
    }

    #[test]
    fn test_adjust_min_strength_clamps_and_snaps() {
        let mut filter = CorrelationFilter::default();
        filter.adjust_min_strength(-0.1);
        assert_eq!(filter.min_strength, 0.0);
        for _ in 0..3 {
            filter.adjust_min_strength(0.1);
        }
        assert_eq!(filter.min_strength, 0.3);
        for _ in 0..20 {
            filter.adjust_min_strength(0.1);
        }
        assert_eq!(filter.min_strength, 1.0);
    }
}
