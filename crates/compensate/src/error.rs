use std::fmt::{self, Display};

/// Error from a single failed compensation.
#[derive(Debug, thiserror::Error)]
#[error("compensation failed for step '{step}' ({description})")]
pub struct CompensationError<E> {
    /// Registration index of the step, starting at zero.
    pub index: usize,
    /// Label of the step whose compensation failed.
    pub step: String,
    /// Description of what the compensation was trying to do.
    pub description: String,
    /// The underlying error.
    #[source]
    pub error: E,
}

/// Every compensation failure from one rollback pass.
///
/// Failures are kept in the order the compensations ran, which is the reverse
/// of the order the steps were recorded in. The aggregate is never empty: a
/// rollback without failures yields no `RollbackError` at all.
#[derive(Debug)]
pub struct RollbackError<E> {
    failures: Vec<CompensationError<E>>,
}

impl<E> RollbackError<E> {
    pub(crate) fn from_failures(failures: Vec<CompensationError<E>>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// The individual failures, in execution order.
    #[must_use]
    pub fn failures(&self) -> &[CompensationError<E>] {
        &self.failures
    }

    /// Number of compensations that failed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether no compensation failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Labels of the steps whose compensation failed, in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.step.as_str())
    }

    /// The underlying errors, in execution order.
    pub fn errors(&self) -> impl Iterator<Item = &E> {
        self.failures.iter().map(|failure| &failure.error)
    }

    /// Consume the aggregate, yielding the individual failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<CompensationError<E>> {
        self.failures
    }
}

impl<E: Display> Display for RollbackError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} compensation(s) failed during rollback", self.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}: {}", failure.error)?;
        }
        Ok(())
    }
}

impl<E> std::error::Error for RollbackError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}

impl<E> IntoIterator for RollbackError<E> {
    type Item = CompensationError<E>;
    type IntoIter = std::vec::IntoIter<CompensationError<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a RollbackError<E> {
    type Item = &'a CompensationError<E>;
    type IntoIter = std::slice::Iter<'a, CompensationError<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}
