use serde::Serialize;

use super::OutputFormatter;
use crate::error::Result;
use crate::scenario::{SignupOutcome, SignupResult};
use crate::services::Snapshot;

pub(crate) struct JsonFormatter;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Status {
    Completed,
    RolledBack,
    RollbackFailed,
}

#[derive(Serialize)]
struct StepView<'a> {
    name: &'a str,
    status: &'static str,
    compensation: Option<&'a str>,
}

#[derive(Serialize)]
struct CompensationFailureView<'a> {
    index: usize,
    step: &'a str,
    description: &'a str,
    error: String,
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    customer: &'a str,
    status: Status,
    reason: Option<String>,
    compensation_failures: Vec<CompensationFailureView<'a>>,
    steps: Vec<StepView<'a>>,
    at_failure: Option<&'a Snapshot>,
    final_state: &'a Snapshot,
}

impl<'a> OutcomeView<'a> {
    fn new(outcome: &'a SignupOutcome) -> Self {
        let steps = outcome
            .audit_log
            .records()
            .iter()
            .map(|record| StepView {
                name: &record.name,
                status: record.status.as_str(),
                compensation: record.compensation_description.as_deref(),
            })
            .collect();

        let (status, reason, compensation_failures, at_failure) = match &outcome.result {
            SignupResult::Completed => (Status::Completed, None, Vec::new(), None),
            SignupResult::RolledBack {
                reason,
                rollback_error,
                at_failure,
            } => {
                let failures: Vec<_> = rollback_error
                    .iter()
                    .flat_map(|error| error.failures())
                    .map(|failure| CompensationFailureView {
                        index: failure.index,
                        step: &failure.step,
                        description: &failure.description,
                        error: failure.error.to_string(),
                    })
                    .collect();
                let status = if failures.is_empty() {
                    Status::RolledBack
                } else {
                    Status::RollbackFailed
                };
                (status, Some(reason.to_string()), failures, Some(at_failure))
            }
        };

        Self {
            customer: &outcome.customer,
            status,
            reason,
            compensation_failures,
            steps,
            at_failure,
            final_state: &outcome.final_state,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, outcome: &SignupOutcome) -> Result<String> {
        let mut output = serde_json::to_string_pretty(&OutcomeView::new(outcome))?;
        output.push('\n');
        Ok(output)
    }
}
