use crate::error::Result;
use crate::scenario::SignupOutcome;

pub(crate) trait OutputFormatter {
    fn format(&self, outcome: &SignupOutcome) -> Result<String>;
}
