//! Operator smoke test against the configured store.
//!
//! Writes three sample rows: one appended directly, one through a simulated
//! JSON-body POST and one through a simulated discrete-parameter GET.

use serde::Serialize;

use crate::ingest::{InboundRequest, IngestOutcome, Ingestor};
use crate::record::{Record, Timestamper};

#[derive(Debug, Clone, Serialize)]
pub struct SelfTestStep {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelfTestReport {
    pub steps: Vec<SelfTestStep>,
}

impl SelfTestReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }
}

fn sample(label: &str, clock: &Timestamper) -> Record {
    Record {
        name: format!("Self-test {} {}", label, chrono::Utc::now().timestamp_millis()),
        phone: "081234567890".to_string(),
        email: "selftest@example.com".to_string(),
        company: "Self-test Company".to_string(),
        message: format!("Self-test row via {}", label),
        timestamp: clock.now(),
    }
}

fn step_from(name: &'static str, outcome: IngestOutcome) -> SelfTestStep {
    match outcome {
        IngestOutcome::Saved { row, .. } => SelfTestStep {
            name,
            passed: true,
            detail: format!("appended row {}", row),
        },
        IngestOutcome::Failed { error, .. } => SelfTestStep {
            name,
            passed: false,
            detail: error.to_string(),
        },
        other => SelfTestStep {
            name,
            passed: false,
            detail: format!("unexpected {} response", other.label()),
        },
    }
}

/// Run every step; a failing step does not stop the ones after it.
pub async fn run_self_test(ingestor: &Ingestor, clock: &Timestamper) -> SelfTestReport {
    let mut steps = Vec::with_capacity(3);

    let direct = sample("direct", clock);
    steps.push(match ingestor.append_record(&direct).await {
        Ok(row) => SelfTestStep {
            name: "direct_append",
            passed: true,
            detail: format!("appended row {}", row),
        },
        Err(e) => SelfTestStep {
            name: "direct_append",
            passed: false,
            detail: e.to_string(),
        },
    });

    let posted = sample("POST", clock);
    let body = match serde_json::to_string(&posted) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Could not encode sample record");
            String::new()
        }
    };
    let outcome = ingestor.handle_post(Some(&InboundRequest::with_body(body))).await;
    steps.push(step_from("simulated_post", outcome));

    let fetched = sample("GET", clock);
    let request = InboundRequest::with_parameters([
        ("name", fetched.name),
        ("phone", fetched.phone),
        ("email", fetched.email),
        ("company", fetched.company),
        ("message", fetched.message),
        ("timestamp", fetched.timestamp),
    ]);
    let outcome = ingestor.handle_get(Some(&request)).await;
    steps.push(step_from("simulated_get", outcome));

    for step in &steps {
        tracing::info!(step = step.name, passed = step.passed, detail = %step.detail, "Self-test step");
    }

    SelfTestReport { steps }
}
