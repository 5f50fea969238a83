use std::time::Instant;

/// Status of a step in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Action succeeded and its compensation is recorded.
    Executed,
    /// Action failed; nothing was recorded for it.
    Failed,
    /// Compensation ran successfully during rollback.
    Compensated,
    /// Compensation failed during rollback.
    CompensationFailed,
}

impl StepStatus {
    /// Short machine-friendly name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Executed => "executed",
            Self::Failed => "failed",
            Self::Compensated => "compensated",
            Self::CompensationFailed => "compensation_failed",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::Executed => "✓",
            Self::Failed => "✗",
            Self::Compensated => "↩",
            Self::CompensationFailed => "⚠",
        }
    }
}

/// Record of one step attempted in a transaction.
#[derive(Debug)]
pub struct StepRecord {
    /// Label of the step.
    pub name: String,
    /// Registration index of the step's compensation; `None` when the action failed.
    pub index: Option<usize>,
    /// Current status.
    pub status: StepStatus,
    /// When the action started.
    pub started_at: Instant,
    /// When the action, or later its compensation, completed.
    pub completed_at: Option<Instant>,
    /// Description of the compensation, for steps whose action succeeded.
    pub compensation_description: Option<String>,
}

/// Ordered log of every step attempted in a transaction.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<StepRecord>,
}

impl AuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action starting; returns the position of its record.
    pub(crate) fn record_start(&mut self, name: String) -> usize {
        self.records.push(StepRecord {
            name,
            index: None,
            status: StepStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            compensation_description: None,
        });
        self.records.len() - 1
    }

    pub(crate) fn record_failure(&mut self, position: usize) {
        self.update(position, StepStatus::Failed);
    }

    pub(crate) fn record_success(
        &mut self,
        position: usize,
        index: usize,
        compensation_description: String,
    ) {
        if let Some(record) = self.records.get_mut(position) {
            record.index = Some(index);
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.compensation_description = Some(compensation_description);
        }
    }

    pub(crate) fn record_compensated(&mut self, position: usize) {
        self.update(position, StepStatus::Compensated);
    }

    pub(crate) fn record_compensation_failed(&mut self, position: usize) {
        self.update(position, StepStatus::CompensationFailed);
    }

    fn update(&mut self, position: usize, status: StepStatus) {
        if let Some(record) = self.records.get_mut(position) {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    /// Get all records in the order the steps were attempted.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Number of records with the given status.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// One line per step, prefixed with a status marker.
    #[must_use]
    pub fn summary(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{} {}", record.status.marker(), record.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
