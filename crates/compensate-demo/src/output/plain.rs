use super::OutputFormatter;
use crate::error::Result;
use crate::scenario::{SignupOutcome, SignupResult};
use crate::services::Snapshot;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn format_list<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
        let items: Vec<&str> = items.into_iter().map(String::as_str).collect();
        if items.is_empty() {
            "(none)".to_string()
        } else {
            items.join(", ")
        }
    }

    fn format_snapshot(output: &mut String, title: &str, snapshot: &Snapshot) {
        output.push_str(&format!("\n{title}:\n"));
        output.push_str(&format!("  records:  {}\n", Self::format_list(&snapshot.records)));
        output.push_str(&format!("  files:    {}\n", Self::format_list(snapshot.files.keys())));
        output.push_str(&format!("  accounts: {}\n", Self::format_list(&snapshot.accounts)));
    }

    fn format_steps(output: &mut String, outcome: &SignupOutcome) {
        output.push_str("Steps:\n");
        for line in outcome.audit_log.summary().lines() {
            output.push_str(&format!("  {line}\n"));
        }
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn format(&self, outcome: &SignupOutcome) -> Result<String> {
        let mut output = format!("Signup for '{}'\n\n", outcome.customer);
        Self::format_steps(&mut output, outcome);

        match &outcome.result {
            SignupResult::Completed => {
                Self::format_snapshot(&mut output, "Final state", &outcome.final_state);
                output.push_str("\nSignup completed\n");
            }
            SignupResult::RolledBack {
                reason,
                rollback_error,
                at_failure,
            } => {
                Self::format_snapshot(&mut output, "State at failure", at_failure);
                Self::format_snapshot(&mut output, "State after rollback", &outcome.final_state);
                output.push_str(&format!("\nSignup failed: {reason}\n"));
                match rollback_error {
                    None if outcome.final_state.is_pristine() => {
                        output.push_str("Rollback completed, all collaborators restored\n");
                    }
                    None => output.push_str("Rollback completed\n"),
                    Some(failures) => {
                        output.push_str(&format!("Rollback incomplete: {failures}\n"));
                    }
                }
            }
        }

        Ok(output)
    }
}
