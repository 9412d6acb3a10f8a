//! Detector Aggregator (C3): runs the checkpoint's enabled detector set
//! concurrently and reduces to the dominating tier.

use crate::config::Config;
use crate::context::{Checkpoint, DetectionContext};
use crate::detect::{rules, semantic};
use crate::llm::LocalModelClient;
use crate::tier::{DetectionResult, DetectorKind};

/// `detect(context, checkpoint, config) -> DetectionResult`.
///
/// Cancellation: the aggregator never fails as a whole — a detector that
/// errors simply contributes `S1` (see `semantic::detect_by_model`'s own
/// internal fallback).
pub async fn detect(
    ctx: &DetectionContext,
    checkpoint: Checkpoint,
    config: &Config,
    client: &LocalModelClient,
) -> DetectionResult {
    let enabled = config.detectors_for(checkpoint);
    if enabled.is_empty() {
        return DetectionResult::s1_default(DetectorKind::Rule, "no detectors enabled");
    }

    let mut results = Vec::new();

    let rule_fut = async {
        if enabled.contains(&DetectorKind::Rule) {
            Some(rules::detect_by_rules(ctx, config))
        } else {
            None
        }
    };
    let semantic_fut = async {
        if enabled.contains(&DetectorKind::Semantic) {
            Some(semantic::detect_by_model(ctx, config, client).await)
        } else {
            None
        }
    };

    let (rule_result, semantic_result) = futures::join!(rule_fut, semantic_fut);
    results.extend(rule_result);
    results.extend(semantic_result);

    reduce(results)
}

/// Reduce a set of detector outputs to the composite result: tier supremum,
/// tie-break by detector-kind priority (`Rule > Semantic`), reasons joined.
fn reduce(results: Vec<DetectionResult>) -> DetectionResult {
    if results.is_empty() {
        return DetectionResult::s1_default(DetectorKind::Rule, "no detector output");
    }

    let top_tier = results.iter().map(|r| r.tier).max().unwrap();
    let mut contributing: Vec<&DetectionResult> =
        results.iter().filter(|r| r.tier == top_tier).collect();
    contributing.sort_by(|a, b| b.detector_kind.cmp(&a.detector_kind));

    let winner = contributing[0];
    let reason = contributing
        .iter()
        .map(|r| r.reason.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let confidence = contributing
        .iter()
        .map(|r| r.confidence)
        .fold(0.0_f32, f32::max);

    DetectionResult::new(top_tier, reason, winner.detector_kind, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::Tier;

    #[test]
    fn reduce_picks_supremum_tier() {
        let results = vec![
            DetectionResult::new(Tier::S1, "a", DetectorKind::Rule, 1.0),
            DetectionResult::new(Tier::S2, "b", DetectorKind::Semantic, 0.7),
        ];
        let out = reduce(results);
        assert_eq!(out.tier, Tier::S2);
    }

    #[test]
    fn reduce_tie_breaks_rule_over_semantic_at_same_tier() {
        let results = vec![
            DetectionResult::new(Tier::S2, "semantic says s2", DetectorKind::Semantic, 0.9),
            DetectionResult::new(Tier::S2, "rule says s2", DetectorKind::Rule, 1.0),
        ];
        let out = reduce(results);
        assert_eq!(out.detector_kind, DetectorKind::Rule);
        assert!(out.reason.contains("semantic says s2"));
        assert!(out.reason.contains("rule says s2"));
    }

    #[test]
    fn empty_detector_set_defaults_to_s1() {
        let out = reduce(Vec::new());
        assert_eq!(out.tier, Tier::S1);
    }
}
