use std::future::Future;

use didhub_core::{
    Registry,
    model::{LogLevel, ResolutionOutcome},
    store::Backend,
};
use serde_json::json;

use super::{TestResult, check, ensure};

pub(super) async fn run<B, F, Fut>(factory: &F) -> Vec<TestResult>
where
    B: Backend + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = B>,
{
    let mut results = Vec::new();

    check!(results, factory, "resolutions", successful_resolution_stored);
    check!(results, factory, "resolutions", failed_resolution_has_no_document);
    check!(results, factory, "resolutions", latest_resolution_wins);
    check!(results, factory, "resolutions", missing_resolution_is_none);
    check!(results, factory, "resolutions", resolutions_newest_first);

    results
}

async fn successful_resolution_stored(registry: Registry) -> Result<(), String> {
    let document = json!({ "id": "did:test:resolved", "service": [] });

    let record = registry
        .record_resolution(
            "did:test:resolved",
            ResolutionOutcome::Resolved(document.clone()),
        )
        .await
        .map_err(|e| format!("record: {e}"))?;

    ensure(record.success, || "record not successful".to_string())?;
    ensure(record.document.as_ref() == Some(&document), || {
        format!("wrong document {:?}", record.document)
    })?;
    ensure(record.error.is_none(), || {
        format!("unexpected error {:?}", record.error)
    })?;

    let latest = registry
        .latest_resolution("did:test:resolved")
        .await
        .map_err(|e| format!("latest: {e}"))?;
    ensure(latest.as_ref() == Some(&record), || {
        format!("latest returned {latest:?}")
    })?;

    let logs = registry
        .logs(Some(1))
        .await
        .map_err(|e| format!("logs: {e}"))?;
    let entry = logs.first().ok_or("no log entry")?;
    ensure(entry.level == LogLevel::Success, || {
        format!("wrong level {}", entry.level)
    })?;
    ensure(entry.message.contains("did:test:resolved"), || {
        format!("message lacks did: {}", entry.message)
    })
}

async fn failed_resolution_has_no_document(registry: Registry) -> Result<(), String> {
    let record = registry
        .record_resolution(
            "did:test:unknown",
            ResolutionOutcome::Failed("not found".to_string()),
        )
        .await
        .map_err(|e| format!("record: {e}"))?;

    ensure(!record.success, || "failed record marked successful".to_string())?;
    ensure(record.document.is_none(), || {
        format!("failed record has document {:?}", record.document)
    })?;
    ensure(record.error.as_deref() == Some("not found"), || {
        format!("wrong error {:?}", record.error)
    })?;

    let stored = registry
        .latest_resolution("did:test:unknown")
        .await
        .map_err(|e| format!("latest: {e}"))?
        .ok_or("record missing")?;
    ensure(stored == record, || format!("stored record differs: {stored:?}"))?;

    let logs = registry
        .logs(Some(1))
        .await
        .map_err(|e| format!("logs: {e}"))?;
    let entry = logs.first().ok_or("no log entry")?;
    ensure(entry.level == LogLevel::Error, || {
        format!("wrong level {}", entry.level)
    })
}

async fn latest_resolution_wins(registry: Registry) -> Result<(), String> {
    registry
        .record_resolution(
            "did:test:flaky",
            ResolutionOutcome::Failed("timeout".to_string()),
        )
        .await
        .map_err(|e| format!("first record: {e}"))?;

    let second = registry
        .record_resolution(
            "did:test:flaky",
            ResolutionOutcome::Resolved(json!({ "id": "did:test:flaky" })),
        )
        .await
        .map_err(|e| format!("second record: {e}"))?;

    registry
        .record_resolution(
            "did:test:other",
            ResolutionOutcome::Failed("not found".to_string()),
        )
        .await
        .map_err(|e| format!("other record: {e}"))?;

    let latest = registry
        .latest_resolution("did:test:flaky")
        .await
        .map_err(|e| format!("latest: {e}"))?;
    ensure(latest.as_ref() == Some(&second), || {
        format!("latest returned {latest:?}")
    })
}

async fn missing_resolution_is_none(registry: Registry) -> Result<(), String> {
    registry
        .record_resolution(
            "did:test:seen",
            ResolutionOutcome::Resolved(json!({})),
        )
        .await
        .map_err(|e| format!("record: {e}"))?;

    let latest = registry
        .latest_resolution("did:test:never")
        .await
        .map_err(|e| format!("latest: {e}"))?;
    ensure(latest.is_none(), || format!("unexpected record {latest:?}"))
}

async fn resolutions_newest_first(registry: Registry) -> Result<(), String> {
    let empty = registry
        .resolution_count()
        .await
        .map_err(|e| format!("count: {e}"))?;
    ensure(empty == 0, || format!("fresh store counts {empty} resolutions"))?;

    for i in 0..4 {
        let outcome = if i % 2 == 0 {
            ResolutionOutcome::Resolved(json!({ "n": i }))
        } else {
            ResolutionOutcome::Failed(format!("error {i}"))
        };

        registry
            .record_resolution(format!("did:test:{i}"), outcome)
            .await
            .map_err(|e| format!("record {i}: {e}"))?;
    }

    let all = registry
        .resolutions()
        .await
        .map_err(|e| format!("list: {e}"))?;

    let count = registry
        .resolution_count()
        .await
        .map_err(|e| format!("count: {e}"))?;
    ensure(count == 4, || format!("count is {count}, expected 4"))?;

    let dids = all.iter().map(|r| r.did.as_str()).collect::<Vec<_>>();
    ensure(
        dids == ["did:test:3", "did:test:2", "did:test:1", "did:test:0"],
        || format!("wrong order: {dids:?}"),
    )?;
    ensure(
        all.iter().all(|r| r.success == r.document.is_some()),
        || "document present on a failed record".to_string(),
    )
}
