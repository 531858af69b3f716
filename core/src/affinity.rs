//! Segment affinity table: base category weights per user segment.

use crate::{
    error::{SandboxError, SandboxResult},
    sampler::Weights,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every feature a synthetic user can exercise.
pub const FEATURES: &[&str] = &[
    "login",
    "fund_transfer",
    "bill_payment",
    "airtime_purchase",
    "travel",
    "savings_goal",
    "loan_request",
    "zakat",
    "quran_daily",
];

/// Feature emitted if a weight mapping ever turns out empty.
pub const FALLBACK_FEATURE: &str = "login";

pub const DEFAULT_SEGMENT: &str = "young_professional";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAffinity {
    pub id: String,
    pub weights: Weights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityTableFile {
    pub default_segment: String,
    pub segments: Vec<SegmentAffinity>,
}

/// Read-only mapping from segment to its base weights.
#[derive(Debug, Clone)]
pub struct AffinityTable {
    /// Segments in declaration order (drives uniform segment draws).
    order: Vec<String>,
    by_segment: HashMap<String, Weights>,
    default_segment: String,
    default_weights: Weights,
}

impl AffinityTable {
    /// Build a table. The default segment must be present and every
    /// segment must declare at least one category.
    pub fn new(segments: Vec<SegmentAffinity>, default_segment: &str) -> SandboxResult<Self> {
        let mut order = Vec::with_capacity(segments.len());
        let mut by_segment = HashMap::with_capacity(segments.len());
        for seg in segments {
            if seg.weights.is_empty() {
                return Err(SandboxError::InvalidConfig(format!(
                    "segment '{}' declares no categories",
                    seg.id
                )));
            }
            if by_segment.contains_key(&seg.id) {
                return Err(SandboxError::InvalidConfig(format!(
                    "segment '{}' declared twice",
                    seg.id
                )));
            }
            order.push(seg.id.clone());
            by_segment.insert(seg.id, seg.weights);
        }
        let default_weights = by_segment.get(default_segment).cloned().ok_or_else(|| {
            SandboxError::InvalidConfig(format!(
                "default segment '{default_segment}' is not in the table"
            ))
        })?;
        Ok(Self {
            order,
            by_segment,
            default_segment: default_segment.to_string(),
            default_weights,
        })
    }

    /// The demo's five segments.
    pub fn builtin() -> Self {
        let seg = |id: &str, pairs: &[(&str, f64)]| SegmentAffinity {
            id: id.to_string(),
            weights: Weights::from_pairs(pairs.iter().copied()),
        };
        let segments = vec![
            seg(
                "student",
                &[
                    ("airtime_purchase", 30.0),
                    ("savings_goal", 20.0),
                    ("login", 30.0),
                    ("fund_transfer", 10.0),
                    ("bill_payment", 5.0),
                    ("travel", 2.0),
                    ("loan_request", 3.0),
                ],
            ),
            seg(
                "business",
                &[
                    ("fund_transfer", 40.0),
                    ("login", 25.0),
                    ("bill_payment", 15.0),
                    ("airtime_purchase", 5.0),
                    ("savings_goal", 5.0),
                    ("travel", 5.0),
                    ("loan_request", 5.0),
                ],
            ),
            seg(
                "elderly",
                &[
                    ("bill_payment", 30.0),
                    ("login", 30.0),
                    ("zakat", 10.0),
                    ("airtime_purchase", 10.0),
                    ("savings_goal", 10.0),
                    ("fund_transfer", 5.0),
                ],
            ),
            seg(
                "young_professional",
                &[
                    ("login", 30.0),
                    ("fund_transfer", 25.0),
                    ("airtime_purchase", 15.0),
                    ("savings_goal", 10.0),
                    ("travel", 10.0),
                    ("loan_request", 5.0),
                ],
            ),
            seg(
                "premium",
                &[
                    ("travel", 30.0),
                    ("savings_goal", 25.0),
                    ("fund_transfer", 15.0),
                    ("login", 10.0),
                    ("airtime_purchase", 5.0),
                    ("loan_request", 10.0),
                ],
            ),
        ];
        // The built-in table always satisfies the constructor's checks.
        match Self::new(segments, DEFAULT_SEGMENT) {
            Ok(table) => table,
            Err(e) => unreachable!("builtin affinity table is invalid: {e}"),
        }
    }

    pub fn from_file(file: AffinityTableFile) -> SandboxResult<Self> {
        Self::new(file.segments, &file.default_segment)
    }

    /// Base weights for `segment`, falling back to the default segment.
    pub fn base_weights(&self, segment: &str) -> &Weights {
        self.by_segment.get(segment).unwrap_or(&self.default_weights)
    }

    pub fn knows(&self, segment: &str) -> bool {
        self.by_segment.contains_key(segment)
    }

    pub fn segments(&self) -> &[String] {
        &self.order
    }

    pub fn default_segment(&self) -> &str {
        &self.default_segment
    }
}

impl Default for AffinityTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_segment_uses_default() {
        let table = AffinityTable::builtin();
        assert!(!table.knows("astronaut"));
        assert_eq!(
            table.base_weights("astronaut"),
            table.base_weights(DEFAULT_SEGMENT)
        );
    }

    #[test]
    fn builtin_segments_in_declaration_order() {
        let table = AffinityTable::builtin();
        assert_eq!(
            table.segments(),
            ["student", "business", "elderly", "young_professional", "premium"]
        );
        assert_eq!(table.base_weights("elderly").get("zakat"), 10.0);
        assert_eq!(table.base_weights("student").get("zakat"), 0.0);
    }

    #[test]
    fn missing_default_is_rejected() {
        let segments = vec![SegmentAffinity {
            id: "student".into(),
            weights: Weights::from_pairs([("login", 1.0)]),
        }];
        assert!(AffinityTable::new(segments, "elderly").is_err());
    }

    #[test]
    fn empty_segment_is_rejected() {
        let segments = vec![SegmentAffinity {
            id: "elderly".into(),
            weights: Weights::new(),
        }];
        assert!(AffinityTable::new(segments, "elderly").is_err());
    }
}
