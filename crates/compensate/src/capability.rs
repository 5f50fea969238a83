/// The forward-moving operation of one step.
///
/// Implemented for every `FnOnce() -> Result<T, E>`, so plain closures can be
/// handed to [`Transaction::execute`](crate::Transaction::execute). Named types
/// implement it directly when a step deserves its own type.
pub trait Action {
    /// Value produced on success.
    type Output;

    /// Failure reported to the caller unchanged.
    type Error;

    /// Perform the side effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the side effect could not be completed.
    fn execute(self) -> Result<Self::Output, Self::Error>;
}

impl<F, T, E> Action for F
where
    F: FnOnce() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn execute(self) -> Result<T, E> {
        self()
    }
}

/// Undoes exactly one previously successful [`Action`].
///
/// Implemented for every `FnOnce() -> Result<(), E>`.
pub trait Compensation {
    /// Failure collected into the rollback aggregate.
    type Error;

    /// Reverse the effect of the paired action.
    ///
    /// # Errors
    ///
    /// Returns an error if the effect could not be reversed. The error does not
    /// stop the remaining compensations from running.
    fn compensate(self) -> Result<(), Self::Error>;

    /// Human-readable description of what the compensation does.
    ///
    /// `None` lets the transaction derive one from the step label.
    fn description(&self) -> Option<String> {
        None
    }
}

impl<F, E> Compensation for F
where
    F: FnOnce() -> Result<(), E>,
{
    type Error = E;

    fn compensate(self) -> Result<(), E> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReleaseLock {
        held: bool,
    }

    impl Compensation for ReleaseLock {
        type Error = String;

        fn compensate(self) -> Result<(), Self::Error> {
            if self.held {
                Ok(())
            } else {
                Err("lock was never held".to_string())
            }
        }

        fn description(&self) -> Option<String> {
            Some("release the advisory lock".to_string())
        }
    }

    #[test]
    fn closure_action_yields_its_output() {
        let action = || Ok::<_, String>(7);

        assert_eq!(action.execute(), Ok(7));
    }

    #[test]
    fn closure_action_propagates_error() {
        let action = || Err::<i32, _>("disk full");

        assert_eq!(action.execute(), Err("disk full"));
    }

    #[test]
    fn closure_compensation_has_no_description() {
        let compensation = || Ok::<(), String>(());

        assert!(compensation.description().is_none());
        assert!(compensation.compensate().is_ok());
    }

    #[test]
    fn named_compensation_reports_description_and_failure() {
        let compensation = ReleaseLock { held: false };

        assert_eq!(
            compensation.description().as_deref(),
            Some("release the advisory lock")
        );
        assert_eq!(
            compensation.compensate(),
            Err("lock was never held".to_string())
        );
    }
}
