mod common;

use aide_engine::CostLabel;
use aide_runtime::{Error, IngestMode, diagnose};
use common::{Fixture, SESSION_ID};

#[test]
fn diagnose_ingested_session() {
    let fixture = Fixture::new(&["session_basic.jsonl"]);
    fixture.ingest(IngestMode::Incremental);

    let db = fixture.open();
    let diagnosis = diagnose(&db, SESSION_ID, &fixture.config).unwrap();

    assert_eq!(diagnosis.report.session.session_id, SESSION_ID);
    assert_eq!(diagnosis.report.context.peak_tokens, 13_180);
    assert_eq!(diagnosis.report.categories.len(), 5);
    assert!(diagnosis.recommendations.is_empty());
    assert_eq!(diagnosis.cost.label, CostLabel::Spend);
    assert_eq!(diagnosis.cost.usd, diagnosis.report.total_cost_usd);
    assert!(
        (diagnosis.report.total_cost_usd - diagnosis.report.session.estimated_cost_usd).abs()
            < 1e-9
    );
}

#[test]
fn subscription_user_only_changes_the_label() {
    let fixture = Fixture::new(&["session_basic.jsonl"]);
    fixture.ingest(IngestMode::Incremental);
    let db = fixture.open();

    let api = diagnose(&db, SESSION_ID, &fixture.config).unwrap();
    let mut config = fixture.config.clone();
    config.subscription_user = true;
    let subscription = diagnose(&db, SESSION_ID, &config).unwrap();

    assert_eq!(subscription.cost.label, CostLabel::ApiEquivalent);
    assert_eq!(subscription.cost.usd, api.cost.usd);
}

#[test]
fn unknown_session_is_not_found() {
    let fixture = Fixture::new(&["session_basic.jsonl"]);
    fixture.ingest(IngestMode::Incremental);

    let err = diagnose(&fixture.open(), "no-such-session", &fixture.config).unwrap_err();
    assert!(matches!(err, Error::NotFound { ref session_id } if session_id == "no-such-session"));
}
