//! Conformance suite for didhub backends.
//!
//! Both backends must behave identically for everything observable through a
//! [Registry](didhub_core::Registry): uniqueness, ordering, lookups, and the log side effects of
//! writes. Log retention is the one documented divergence and is not covered.
//!
//! ```ignore
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async { MemoryStore::new() }).await;
//!     assert_eq!(report.failed, 0, "{report}");
//! }
//! ```

/// Pushes the result of one check, run against a fresh registry.
macro_rules! check {
    ($results:ident, $factory:ident, $category:literal, $name:ident) => {
        $results.push($crate::conformance::TestResult::from_result(
            $category,
            stringify!($name),
            $name(::didhub_core::Registry::from($factory().await)).await,
        ));
    };
}

pub(crate) use check;

mod identifiers;
mod logs;
mod resolutions;

use std::{fmt, future::Future};

use didhub_core::{
    model::{DidMethod, NewIdentifier, SyncInterval},
    store::Backend,
};
use serde_json::json;

/// Number of concurrent tasks spawned by the concurrency checks.
const N: usize = 10;

#[derive(Debug, Clone)]
pub struct TestResult {
    pub category: &'static str,
    pub name: &'static str,
    pub passed: bool,
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &'static str, name: &'static str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };

        Self {
            category,
            name,
            passed,
            message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed",
            self.passed,
            self.results.len()
        )?;

        for r in self.results.iter().filter(|r| !r.passed) {
            writeln!(
                f,
                "  FAIL [{}/{}]: {}",
                r.category,
                r.name,
                r.message.as_deref().unwrap_or("(no message)")
            )?;
        }

        Ok(())
    }
}

/// Runs every check, each against a fresh backend from `factory`.
pub async fn run_conformance_suite<B, F, Fut>(factory: F) -> ConformanceReport
where
    B: Backend + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = B>,
{
    let mut results = Vec::new();

    results.extend(identifiers::run(&factory).await);
    results.extend(resolutions::run(&factory).await);
    results.extend(logs::run(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();

    ConformanceReport {
        failed: results.len() - passed,
        passed,
        results,
    }
}

fn new_identifier(did: &str) -> NewIdentifier {
    NewIdentifier {
        did: did.to_string(),
        method: DidMethod::Dht,
        document: json!({ "id": did }),
        key_stored: true,
        sync_interval: Some(SyncInterval::TwoMinutes),
        dwn_endpoints: None,
    }
}

fn ensure(condition: bool, msg: impl FnOnce() -> String) -> Result<(), String> {
    if condition { Ok(()) } else { Err(msg()) }
}
