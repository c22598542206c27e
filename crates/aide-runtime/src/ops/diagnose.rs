use aide_engine::{DiagnosticReport, LabeledCost, Recommendation, analyze, recommend};
use aide_index::Database;
use serde::Serialize;

use crate::{Config, Error, Result};

/// Analyzer output plus ranked suggestions for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub report: DiagnosticReport,
    pub recommendations: Vec<Recommendation>,
    /// Session total with the label implied by `subscription_user`
    pub cost: LabeledCost,
}

/// Load a session from the store and analyze it.
///
/// An unknown id is `NotFound`; nothing partial is returned.
pub fn diagnose(db: &Database, session_id: &str, config: &Config) -> Result<Diagnosis> {
    let transcript = db
        .get_transcript(session_id)?
        .ok_or_else(|| Error::NotFound {
            session_id: session_id.to_string(),
        })?;

    let report = analyze(&transcript, &config.pricing, &config.diagnostics);
    for model in &report.unknown_models {
        tracing::warn!(model = %model, "unknown model, priced at default rates");
    }
    let recommendations = recommend(&report, &config.thresholds);
    let cost = LabeledCost::new(report.total_cost_usd, config.subscription_user);

    tracing::debug!(
        session_id,
        messages = transcript.messages.len(),
        recommendations = recommendations.len(),
        "diagnosed session"
    );

    Ok(Diagnosis {
        report,
        recommendations,
        cost,
    })
}
