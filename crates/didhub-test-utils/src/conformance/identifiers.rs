use std::future::Future;

use didhub_core::{
    Registry,
    model::{LogLevel, SyncInterval},
    store::{Backend, StoreError},
};
use serde_json::json;
use uuid::Uuid;

use super::{N, TestResult, check, ensure, new_identifier};

pub(super) async fn run<B, F, Fut>(factory: &F) -> Vec<TestResult>
where
    B: Backend + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = B>,
{
    let mut results = Vec::new();

    check!(results, factory, "identifiers", create_then_lookup);
    check!(results, factory, "identifiers", missing_lookups_are_none);
    check!(results, factory, "identifiers", document_stored_verbatim);
    check!(results, factory, "identifiers", duplicate_did_rejected);
    check!(results, factory, "identifiers", identifiers_newest_first);
    check!(results, factory, "identifiers", creation_appends_success_log);
    check!(results, factory, "identifiers", concurrent_creates_all_visible);
    check!(results, factory, "identifiers", concurrent_duplicates_one_wins);

    results
}

async fn create_then_lookup(registry: Registry) -> Result<(), String> {
    let created = registry
        .create_identifier(new_identifier("did:test:alice"))
        .await
        .map_err(|e| format!("create: {e}"))?;

    let by_id = registry
        .identifier(created.id)
        .await
        .map_err(|e| format!("get by id: {e}"))?;
    ensure(by_id.as_ref() == Some(&created), || {
        format!("lookup by id returned {by_id:?}")
    })?;

    let by_did = registry
        .identifier_by_did("did:test:alice")
        .await
        .map_err(|e| format!("get by did: {e}"))?;
    ensure(by_did.as_ref() == Some(&created), || {
        format!("lookup by did returned {by_did:?}")
    })
}

async fn missing_lookups_are_none(registry: Registry) -> Result<(), String> {
    registry
        .create_identifier(new_identifier("did:test:present"))
        .await
        .map_err(|e| format!("create: {e}"))?;

    let by_id = registry
        .identifier(Uuid::new_v4())
        .await
        .map_err(|e| format!("get by id: {e}"))?;
    ensure(by_id.is_none(), || format!("unknown id found {by_id:?}"))?;

    let by_did = registry
        .identifier_by_did("did:test:absent")
        .await
        .map_err(|e| format!("get by did: {e}"))?;
    ensure(by_did.is_none(), || format!("unknown did found {by_did:?}"))
}

async fn document_stored_verbatim(registry: Registry) -> Result<(), String> {
    let mut new = new_identifier("did:test:verbatim");
    new.document = json!({
        "@context": ["https://www.w3.org/ns/did/v1"],
        "id": "did:test:verbatim",
        "verificationMethod": [{ "id": "#0", "publicKeyJwk": { "kty": "OKP", "x": "ñ✓" } }],
        "nested": { "empty": {}, "list": [1, 2.5, null, true] },
    });
    new.key_stored = false;
    new.sync_interval = None;
    new.dwn_endpoints = Some(vec![
        "https://dwn.example.com".to_string(),
        "https://backup.example.com/".to_string(),
    ]);

    let created = registry
        .create_identifier(new.clone())
        .await
        .map_err(|e| format!("create: {e}"))?;

    let found = registry
        .identifier(created.id)
        .await
        .map_err(|e| format!("get: {e}"))?
        .ok_or("identifier missing")?;

    ensure(found.document == new.document, || {
        format!("document changed: {}", found.document)
    })?;
    ensure(!found.key_stored, || "key_stored changed".to_string())?;
    ensure(found.sync_interval.is_none(), || {
        format!("sync interval changed: {:?}", found.sync_interval)
    })?;
    ensure(found.dwn_endpoints == new.dwn_endpoints, || {
        format!("endpoints changed: {:?}", found.dwn_endpoints)
    })
}

async fn duplicate_did_rejected(registry: Registry) -> Result<(), String> {
    let first = registry
        .create_identifier(new_identifier("did:test:dup"))
        .await
        .map_err(|e| format!("first create: {e}"))?;

    let mut second = new_identifier("did:test:dup");
    second.document = json!({ "overwritten": true });
    second.sync_interval = Some(SyncInterval::Off);

    match registry.create_identifier(second).await {
        Err(StoreError::Duplicate(did)) => {
            ensure(did == "did:test:dup", || format!("wrong did in error: {did}"))?
        }
        Err(e) => return Err(format!("expected Duplicate, got {e:?}")),
        Ok(_) => return Err("duplicate create succeeded".to_string()),
    }

    let all = registry
        .identifiers()
        .await
        .map_err(|e| format!("list: {e}"))?;
    ensure(all == vec![first], || format!("store changed: {all:?}"))
}

async fn identifiers_newest_first(registry: Registry) -> Result<(), String> {
    for i in 0..5 {
        registry
            .create_identifier(new_identifier(&format!("did:test:{i}")))
            .await
            .map_err(|e| format!("create {i}: {e}"))?;
    }

    let all = registry
        .identifiers()
        .await
        .map_err(|e| format!("list: {e}"))?;

    let dids = all.iter().map(|i| i.did.as_str()).collect::<Vec<_>>();
    ensure(
        dids == ["did:test:4", "did:test:3", "did:test:2", "did:test:1", "did:test:0"],
        || format!("wrong order: {dids:?}"),
    )?;
    ensure(
        all.windows(2).all(|w| w[0].created_at >= w[1].created_at),
        || "created_at not descending".to_string(),
    )
}

async fn creation_appends_success_log(registry: Registry) -> Result<(), String> {
    let created = registry
        .create_identifier(new_identifier("did:test:logged"))
        .await
        .map_err(|e| format!("create: {e}"))?;

    let logs = registry
        .logs(Some(1))
        .await
        .map_err(|e| format!("logs: {e}"))?;
    let entry = logs.first().ok_or("no log entry")?;

    ensure(entry.level == LogLevel::Success, || {
        format!("wrong level {}", entry.level)
    })?;
    ensure(entry.message.contains("did:test:logged"), || {
        format!("message lacks did: {}", entry.message)
    })?;

    let did_id = entry
        .data
        .as_ref()
        .and_then(|d| d.get("didId"))
        .and_then(|v| v.as_str());
    ensure(did_id == Some(created.id.to_string().as_str()), || {
        format!("wrong didId in {:?}", entry.data)
    })
}

async fn concurrent_creates_all_visible(registry: Registry) -> Result<(), String> {
    let mut handles = Vec::new();

    for i in 0..N {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry
                .create_identifier(new_identifier(&format!("did:test:concurrent:{i}")))
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("join: {e}"))?
            .map_err(|e| format!("create: {e}"))?;
    }

    let all = registry
        .identifiers()
        .await
        .map_err(|e| format!("list: {e}"))?;
    ensure(all.len() == N, || format!("expected {N}, found {}", all.len()))?;

    let count = registry
        .identifier_count()
        .await
        .map_err(|e| format!("count: {e}"))?;
    ensure(count == N, || format!("count is {count}, expected {N}"))?;

    for i in 0..N {
        let did = format!("did:test:concurrent:{i}");
        ensure(all.iter().any(|x| x.did == did), || format!("{did} missing"))?;
    }

    ensure(
        all.windows(2).all(|w| w[0].created_at >= w[1].created_at),
        || "created_at not descending".to_string(),
    )
}

async fn concurrent_duplicates_one_wins(registry: Registry) -> Result<(), String> {
    let mut handles = Vec::new();

    for _ in 0..N {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            registry
                .create_identifier(new_identifier("did:test:race"))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.map_err(|e| format!("join: {e}"))? {
            Ok(_) => created += 1,
            Err(StoreError::Duplicate(_)) => {}
            Err(e) => return Err(format!("unexpected error: {e:?}")),
        }
    }
    ensure(created == 1, || format!("{created} creates succeeded"))?;

    let all = registry
        .identifiers()
        .await
        .map_err(|e| format!("list: {e}"))?;
    ensure(all.len() == 1, || format!("{} identifiers stored", all.len()))?;

    let count = registry
        .identifier_count()
        .await
        .map_err(|e| format!("count: {e}"))?;
    ensure(count == 1, || format!("count is {count} after duplicates"))
}
