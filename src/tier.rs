//! The sensitivity tier lattice and the routing function.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sensitivity tier: a total order `S1 ≺ S2 ≺ S3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    S1,
    S2,
    S3,
}

impl Tier {
    /// Supremum of an iterator of tiers; `S1` for an empty iterator.
    pub fn sup<I: IntoIterator<Item = Tier>>(tiers: I) -> Tier {
        tiers.into_iter().max().unwrap_or(Tier::S1)
    }

    pub fn is_private(self) -> bool {
        matches!(self, Tier::S2 | Tier::S3)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::S1 => write!(f, "S1"),
            Tier::S2 => write!(f, "S2"),
            Tier::S3 => write!(f, "S3"),
        }
    }
}

/// The action a tier routes to. `R(S1)=Passthrough`, `R(S2)=Desensitize`, `R(S3)=Redirect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Passthrough,
    Desensitize,
    Redirect,
}

/// Routing function `R`, total on `{S1, S2, S3}`.
pub fn route(tier: Tier) -> Action {
    match tier {
        Tier::S1 => Action::Passthrough,
        Tier::S2 => Action::Desensitize,
        Tier::S3 => Action::Redirect,
    }
}

/// Which kind of detector produced a `DetectionResult`. Used for the aggregator's tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectorKind {
    Rule,
    Semantic,
}

impl DetectorKind {
    /// Priority used when two detectors agree on the same tier: `Rule > Semantic`.
    fn priority(self) -> u8 {
        match self {
            DetectorKind::Rule => 1,
            DetectorKind::Semantic => 0,
        }
    }
}

impl PartialOrd for DetectorKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DetectorKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}

/// Output of a single detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub tier: Tier,
    pub reason: String,
    pub detector_kind: DetectorKind,
    pub confidence: f32,
}

impl DetectionResult {
    pub fn new(tier: Tier, reason: impl Into<String>, kind: DetectorKind, confidence: f32) -> Self {
        Self {
            tier,
            reason: reason.into(),
            detector_kind: kind,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn s1_default(kind: DetectorKind, reason: impl Into<String>) -> Self {
        Self::new(Tier::S1, reason, kind, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_ordering() {
        assert!(Tier::S1 < Tier::S2);
        assert!(Tier::S2 < Tier::S3);
    }

    #[test]
    fn supremum_of_mixed_tiers() {
        assert_eq!(Tier::sup([Tier::S1, Tier::S3, Tier::S2]), Tier::S3);
        assert_eq!(Tier::sup([Tier::S1, Tier::S1]), Tier::S1);
        assert_eq!(Tier::sup(std::iter::empty()), Tier::S1);
    }

    #[test]
    fn routing_is_total() {
        assert_eq!(route(Tier::S1), Action::Passthrough);
        assert_eq!(route(Tier::S2), Action::Desensitize);
        assert_eq!(route(Tier::S3), Action::Redirect);
    }

    #[test]
    fn rule_outranks_semantic_at_equal_priority() {
        assert!(DetectorKind::Rule > DetectorKind::Semantic);
    }
}
