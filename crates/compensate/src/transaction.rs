use tracing::{debug, warn};

use crate::audit::AuditLog;
use crate::capability::{Action, Compensation};
use crate::error::{CompensationError, RollbackError};

type BoxedCompensation<'a, E> = Box<dyn FnOnce() -> Result<(), E> + 'a>;

struct RecordedCompensation<'a, E> {
    position: usize,
    step: String,
    description: String,
    run: BoxedCompensation<'a, E>,
}

/// Ordered record of compensations for a unit of work.
///
/// Every successful action appends its compensation; a failed action appends
/// nothing. [`rollback`](Self::rollback) consumes the transaction and runs the
/// recorded compensations last-registered-first, so a rolled-back transaction
/// can neither record new steps nor be rolled back twice.
///
/// Compensations may borrow the resources they undo for `'a`. `E` is the error
/// type shared by all compensations; each action keeps its own error type.
///
/// The transaction has no internal locking. Share it across threads only
/// behind an external lock.
pub struct Transaction<'a, E> {
    compensations: Vec<RecordedCompensation<'a, E>>,
    audit_log: AuditLog,
}

impl<E> Default for Transaction<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E> Transaction<'a, E> {
    /// Create a transaction with no recorded compensations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compensations: Vec::new(),
            audit_log: AuditLog::new(),
        }
    }

    /// Run `action`; if it succeeds, record `compensation`.
    ///
    /// # Errors
    ///
    /// Returns the action's error unchanged. Nothing is recorded in that case.
    pub fn execute<A, C>(&mut self, action: A, compensation: C) -> Result<A::Output, A::Error>
    where
        A: Action,
        C: Compensation<Error = E> + 'a,
    {
        self.record(None, action, |_| boxed(compensation))
    }

    /// Like [`execute`](Self::execute), labelling the step with `name`.
    ///
    /// # Errors
    ///
    /// Returns the action's error unchanged. Nothing is recorded in that case.
    pub fn execute_named<A, C>(
        &mut self,
        name: impl Into<String>,
        action: A,
        compensation: C,
    ) -> Result<A::Output, A::Error>
    where
        A: Action,
        C: Compensation<Error = E> + 'a,
    {
        self.record(Some(name.into()), action, |_| boxed(compensation))
    }

    /// Run `action`; if it succeeds, record a compensation that receives a
    /// clone of the action's output.
    ///
    /// # Errors
    ///
    /// Returns the action's error unchanged. Nothing is recorded in that case.
    pub fn execute_with<A, C>(&mut self, action: A, compensation: C) -> Result<A::Output, A::Error>
    where
        A: Action,
        A::Output: Clone + 'a,
        C: FnOnce(A::Output) -> Result<(), E> + 'a,
    {
        self.record(None, action, |output| bind_output(output, compensation))
    }

    /// Like [`execute_with`](Self::execute_with), labelling the step with `name`.
    ///
    /// # Errors
    ///
    /// Returns the action's error unchanged. Nothing is recorded in that case.
    pub fn execute_named_with<A, C>(
        &mut self,
        name: impl Into<String>,
        action: A,
        compensation: C,
    ) -> Result<A::Output, A::Error>
    where
        A: Action,
        A::Output: Clone + 'a,
        C: FnOnce(A::Output) -> Result<(), E> + 'a,
    {
        self.record(Some(name.into()), action, |output| {
            bind_output(output, compensation)
        })
    }

    fn record<A, F>(
        &mut self,
        name: Option<String>,
        action: A,
        register: F,
    ) -> Result<A::Output, A::Error>
    where
        A: Action,
        F: FnOnce(&A::Output) -> (BoxedCompensation<'a, E>, Option<String>),
    {
        let index = self.compensations.len();
        let step = name.unwrap_or_else(|| format!("step #{index}"));
        let position = self.audit_log.record_start(step.clone());

        match action.execute() {
            Ok(output) => {
                let (run, description) = register(&output);
                let description = description.unwrap_or_else(|| format!("undo {step}"));
                self.audit_log
                    .record_success(position, index, description.clone());
                debug!(
                    step = %step,
                    index,
                    "step succeeded, compensation recorded"
                );
                self.compensations.push(RecordedCompensation {
                    position,
                    step,
                    description,
                    run,
                });
                Ok(output)
            }
            Err(error) => {
                self.audit_log.record_failure(position);
                debug!(step = %step, "step failed, nothing recorded");
                Err(error)
            }
        }
    }

    /// Number of recorded compensations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    /// Whether no compensation has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }

    /// Descriptions of the recorded compensations, oldest first.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.compensations.iter().map(|c| c.description.as_str())
    }

    /// Audit log of the steps attempted so far.
    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    /// End a successful unit of work, discarding the recorded compensations.
    #[must_use]
    pub fn commit(self) -> AuditLog {
        debug!(
            discarded = self.compensations.len(),
            "transaction committed"
        );
        self.audit_log
    }

    /// Undo every recorded step, most recent first.
    ///
    /// All compensations run even when some of them fail. Returns `reason`
    /// untouched together with the aggregate of compensation failures, which
    /// is `None` when every compensation succeeded. A `Some` aggregate means
    /// external state may be left inconsistent and should be escalated.
    #[must_use = "a failed rollback may leave external state inconsistent"]
    pub fn rollback<R>(self, reason: R) -> (R, Option<RollbackError<E>>) {
        let (reason, rollback_error, _audit_log) = self.rollback_with_audit(reason);
        (reason, rollback_error)
    }

    /// Like [`rollback`](Self::rollback), also returning the audit log.
    #[must_use = "a failed rollback may leave external state inconsistent"]
    pub fn rollback_with_audit<R>(self, reason: R) -> (R, Option<RollbackError<E>>, AuditLog) {
        let Self {
            compensations,
            mut audit_log,
        } = self;

        debug!(count = compensations.len(), "rolling back transaction");

        let mut failures = Vec::new();
        for (index, compensation) in compensations.into_iter().enumerate().rev() {
            let RecordedCompensation {
                position,
                step,
                description,
                run,
            } = compensation;

            match run() {
                Ok(()) => {
                    audit_log.record_compensated(position);
                    debug!(step = %step, "step compensated");
                }
                Err(error) => {
                    audit_log.record_compensation_failed(position);
                    warn!(step = %step, description = %description, "compensation failed");
                    failures.push(CompensationError {
                        index,
                        step,
                        description,
                        error,
                    });
                }
            }
        }

        let rollback_error = RollbackError::from_failures(failures);
        if let Some(error) = &rollback_error {
            warn!(failed = error.len(), "rollback finished with failures");
        } else {
            debug!("rollback finished cleanly");
        }
        (reason, rollback_error, audit_log)
    }
}

fn boxed<'a, C>(compensation: C) -> (BoxedCompensation<'a, C::Error>, Option<String>)
where
    C: Compensation + 'a,
{
    let description = compensation.description();
    (Box::new(move || compensation.compensate()), description)
}

fn bind_output<'a, T, E, C>(
    output: &T,
    compensation: C,
) -> (BoxedCompensation<'a, E>, Option<String>)
where
    T: Clone + 'a,
    C: FnOnce(T) -> Result<(), E> + 'a,
{
    let output = output.clone();
    (Box::new(move || compensation(output)), None)
}
