use aide_types::SessionTranscript;
use std::collections::BTreeSet;

use crate::cost::{CostWarning, PricingTable};
use crate::diagnostics::{DiagnosticsConfig, context_curve, detect_compactions};
use crate::work_blocks::{segment_work_blocks, total_active_seconds};

/// Fill in the derived fields of a freshly parsed session before it is stored.
///
/// Prices every message at its own model's rate, segments work blocks and
/// records peak context and compaction count. Returns the distinct pricing
/// warnings raised.
pub fn enrich_transcript(
    transcript: &mut SessionTranscript,
    pricing: &PricingTable,
    config: &DiagnosticsConfig,
) -> Vec<CostWarning> {
    let mut warnings = BTreeSet::new();
    let mut total = 0.0;

    for message in &mut transcript.messages {
        let estimate = pricing.estimate(&message.usage, message.model.as_deref());
        message.cost_usd = estimate.usd;
        total += estimate.usd;
        if let Some(warning) = estimate.warning {
            warnings.insert(warning);
        }
    }

    let session = &mut transcript.session;
    session.estimated_cost_usd = total;

    let timestamps: Vec<_> = transcript.messages.iter().map(|m| m.timestamp).collect();
    session.work_blocks = segment_work_blocks(&timestamps);
    session.active_duration_seconds = total_active_seconds(&session.work_blocks);

    let curve = context_curve(&transcript.messages);
    session.peak_context_tokens = curve.iter().map(|p| p.context_tokens).max().unwrap_or(0);
    session.compaction_count =
        detect_compactions(&curve, config.compaction_drop_fraction).len() as u64;

    warnings.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sample(name: &str) -> SessionTranscript {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../aide-providers/tests/samples")
            .join(name);
        let mut outcome = aide_providers::parse_file(&path).unwrap();
        outcome.transcripts.remove(0)
    }

    #[test]
    fn test_enrich_basic_session() {
        let mut t = sample("session_basic.jsonl");
        let warnings = enrich_transcript(
            &mut t,
            &PricingTable::default_claude(),
            &DiagnosticsConfig::default(),
        );

        assert!(warnings.is_empty());
        assert_eq!(t.session.work_blocks.len(), 2);
        assert_eq!(t.session.active_duration_seconds, 21 + 6);
        assert_eq!(t.session.peak_context_tokens, 13_180);
        assert_eq!(t.session.compaction_count, 0);

        let sum: f64 = t.messages.iter().map(|m| m.cost_usd).sum();
        assert_eq!(t.session.estimated_cost_usd, sum);
        assert!(t.session.estimated_cost_usd > 0.0);
    }

    #[test]
    fn test_enrich_detects_compaction() {
        let mut t = sample("compaction.jsonl");
        enrich_transcript(
            &mut t,
            &PricingTable::default_claude(),
            &DiagnosticsConfig::default(),
        );
        assert_eq!(t.session.peak_context_tokens, 12_000);
        assert_eq!(t.session.compaction_count, 1);
    }

    #[test]
    fn test_enrich_reports_unknown_model_once() {
        let mut t = sample("session_basic.jsonl");
        let warnings = enrich_transcript(
            &mut t,
            &PricingTable::flat(crate::ModelRates::new(3.0, 15.0, 3.75, 0.30)),
            &DiagnosticsConfig::default(),
        );
        assert_eq!(
            warnings,
            vec![CostWarning::UnknownModel {
                model: "claude-sonnet-4-5-20250929".to_string()
            }]
        );
    }
}
