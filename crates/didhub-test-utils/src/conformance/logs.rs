use std::future::Future;

use didhub_core::{DEFAULT_LOG_LIMIT, Registry, model::LogLevel, store::Backend};
use serde_json::json;

use super::{TestResult, check, ensure};

pub(super) async fn run<B, F, Fut>(factory: &F) -> Vec<TestResult>
where
    B: Backend + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = B>,
{
    let mut results = Vec::new();

    check!(results, factory, "logs", append_then_list);
    check!(results, factory, "logs", limit_returns_newest);
    check!(results, factory, "logs", default_limit);
    check!(results, factory, "logs", limit_zero_is_empty);
    check!(results, factory, "logs", clear_empties);
    check!(results, factory, "logs", data_round_trips);

    results
}

async fn append_then_list(registry: Registry) -> Result<(), String> {
    let entry = registry
        .log(LogLevel::Info, "Server started", None)
        .await
        .map_err(|e| format!("log: {e}"))?;

    let logs = registry
        .logs(None)
        .await
        .map_err(|e| format!("logs: {e}"))?;
    ensure(logs == vec![entry], || format!("unexpected logs {logs:?}"))
}

async fn limit_returns_newest(registry: Registry) -> Result<(), String> {
    for i in 0..50 {
        registry
            .log(LogLevel::Debug, format!("entry {i}"), None)
            .await
            .map_err(|e| format!("log {i}: {e}"))?;
    }

    let logs = registry
        .logs(Some(5))
        .await
        .map_err(|e| format!("logs: {e}"))?;

    let messages = logs.iter().map(|l| l.message.as_str()).collect::<Vec<_>>();
    ensure(
        messages == ["entry 49", "entry 48", "entry 47", "entry 46", "entry 45"],
        || format!("wrong entries: {messages:?}"),
    )
}

async fn default_limit(registry: Registry) -> Result<(), String> {
    let total = DEFAULT_LOG_LIMIT + 20;

    for i in 0..total {
        registry
            .log(LogLevel::Info, format!("entry {i}"), None)
            .await
            .map_err(|e| format!("log {i}: {e}"))?;
    }

    let logs = registry
        .logs(None)
        .await
        .map_err(|e| format!("logs: {e}"))?;
    ensure(logs.len() == DEFAULT_LOG_LIMIT, || {
        format!("expected {DEFAULT_LOG_LIMIT}, got {}", logs.len())
    })?;

    let newest = format!("entry {}", total - 1);
    ensure(logs[0].message == newest, || {
        format!("first entry is {}", logs[0].message)
    })
}

async fn limit_zero_is_empty(registry: Registry) -> Result<(), String> {
    registry
        .log(LogLevel::Info, "present", None)
        .await
        .map_err(|e| format!("log: {e}"))?;

    let logs = registry
        .logs(Some(0))
        .await
        .map_err(|e| format!("logs: {e}"))?;
    ensure(logs.is_empty(), || format!("expected none, got {logs:?}"))
}

async fn clear_empties(registry: Registry) -> Result<(), String> {
    for level in [
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Success,
        LogLevel::Error,
    ] {
        registry
            .log(level, format!("{level} entry"), None)
            .await
            .map_err(|e| format!("log: {e}"))?;
    }

    registry
        .clear_logs()
        .await
        .map_err(|e| format!("clear: {e}"))?;

    let logs = registry
        .logs(None)
        .await
        .map_err(|e| format!("logs: {e}"))?;
    ensure(logs.is_empty(), || format!("{} entries remain", logs.len()))?;

    let after = registry
        .log(LogLevel::Info, "after clear", None)
        .await
        .map_err(|e| format!("log after clear: {e}"))?;
    let logs = registry
        .logs(None)
        .await
        .map_err(|e| format!("logs after clear: {e}"))?;
    ensure(logs == vec![after], || format!("unexpected logs {logs:?}"))
}

async fn data_round_trips(registry: Registry) -> Result<(), String> {
    let data = json!({
        "error": "agent unreachable",
        "attempt": 3,
        "endpoints": ["https://dwn.example.com"],
        "nested": { "ok": false, "ratio": 0.5 },
    });

    let entry = registry
        .log(LogLevel::Error, "DID creation failed", Some(data.clone()))
        .await
        .map_err(|e| format!("log: {e}"))?;

    let logs = registry
        .logs(Some(1))
        .await
        .map_err(|e| format!("logs: {e}"))?;
    let stored = logs.first().ok_or("no log entry")?;

    ensure(stored.id == entry.id, || "different entry returned".to_string())?;
    ensure(stored.level == LogLevel::Error, || {
        format!("wrong level {}", stored.level)
    })?;
    ensure(stored.data.as_ref() == Some(&data), || {
        format!("data changed: {:?}", stored.data)
    })
}
