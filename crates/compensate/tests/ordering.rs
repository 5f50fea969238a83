//! Integration tests for compensation registration and rollback order.

use std::cell::RefCell;

use compensate::Transaction;

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

struct Ledger {
    compensations: RefCell<Vec<String>>,
}

impl Ledger {
    fn new() -> Self {
        Self {
            compensations: RefCell::new(Vec::new()),
        }
    }

    fn undo(&self, label: &str) -> Result<(), TestError> {
        self.compensations.borrow_mut().push(label.to_string());
        Ok(())
    }
}

#[test]
fn n_successes_then_failure_runs_exactly_n_compensations_reversed() {
    for n in 0..6 {
        let ledger = Ledger::new();
        let mut tx = Transaction::new();

        for i in 0..n {
            let ledger = &ledger;
            tx.execute(
                || Ok::<_, TestError>(()),
                move || ledger.undo(&format!("c{i}")),
            )
            .expect("action succeeds");
        }
        let failure = tx
            .execute(
                || Err::<(), _>(TestError("step failed".to_string())),
                || ledger.undo("never"),
            )
            .expect_err("last action fails");

        let (reason, rollback_error) = tx.rollback(failure);

        assert_eq!(reason, TestError("step failed".to_string()));
        assert!(rollback_error.is_none());
        let expected: Vec<String> = (0..n).rev().map(|i| format!("c{i}")).collect();
        assert_eq!(*ledger.compensations.borrow(), expected);
    }
}

#[test]
fn registration_count_tracks_successful_actions_only() {
    let ledger = Ledger::new();
    let mut tx = Transaction::new();
    let outcomes = [true, false, true, true, false, false, true];

    for (i, succeeds) in outcomes.iter().copied().enumerate() {
        let before = tx.len();
        let result = tx.execute(
            move || {
                if succeeds {
                    Ok(i)
                } else {
                    Err(TestError(format!("action {i} failed")))
                }
            },
            || ledger.undo("c"),
        );

        if succeeds {
            assert_eq!(result, Ok(i));
            assert_eq!(tx.len(), before + 1);
        } else {
            assert_eq!(result, Err(TestError(format!("action {i} failed"))));
            assert_eq!(tx.len(), before);
        }
    }

    assert_eq!(tx.len(), 4);
}

#[test]
fn three_steps_then_failure_undoes_c3_c2_c1() {
    let ledger = Ledger::new();
    let mut tx = Transaction::new();

    tx.execute(|| Ok::<_, TestError>(()), || ledger.undo("C1"))
        .expect("step 1");
    tx.execute(|| Ok::<_, TestError>(()), || ledger.undo("C2"))
        .expect("step 2");
    tx.execute(|| Ok::<_, TestError>(()), || ledger.undo("C3"))
        .expect("step 3");
    let failure = tx
        .execute(|| Err::<(), _>("fourth"), || ledger.undo("C4"))
        .expect_err("step 4 fails");

    let (_, rollback_error) = tx.rollback(failure);

    assert!(rollback_error.is_none());
    assert_eq!(*ledger.compensations.borrow(), ["C3", "C2", "C1"]);
}

#[test]
fn failure_before_any_step_rolls_back_nothing() {
    let ledger = Ledger::new();
    let mut tx = Transaction::new();

    let failure = tx
        .execute(|| Err::<(), _>("first step refused"), || ledger.undo("C1"))
        .expect_err("first step fails");
    let (reason, rollback_error) = tx.rollback(failure);

    assert_eq!(reason, "first step refused");
    assert!(rollback_error.is_none());
    assert!(ledger.compensations.borrow().is_empty());
}

#[test]
fn reason_is_returned_as_the_same_value() {
    let tx: Transaction<'_, TestError> = Transaction::new();
    let reason = Box::new(TestError("original".to_string()));
    let address = std::ptr::from_ref::<TestError>(&reason);

    let (returned, _) = tx.rollback(reason);

    assert_eq!(std::ptr::from_ref::<TestError>(&returned), address);
}

#[test]
fn compensations_undo_shared_state() {
    let counter = RefCell::new(0);
    let mut tx: Transaction<'_, TestError> = Transaction::new();

    for _ in 0..3 {
        tx.execute(
            || -> Result<(), TestError> {
                *counter.borrow_mut() += 1;
                Ok(())
            },
            || -> Result<(), TestError> {
                *counter.borrow_mut() -= 1;
                Ok(())
            },
        )
        .expect("increment succeeds");
    }
    assert_eq!(*counter.borrow(), 3);

    let failure = tx
        .execute(
            || Err::<(), _>(TestError("resource C failed".to_string())),
            || -> Result<(), TestError> {
                *counter.borrow_mut() -= 1;
                Ok(())
            },
        )
        .expect_err("fourth step fails");
    let (_, rollback_error) = tx.rollback(failure);

    assert!(rollback_error.is_none());
    assert_eq!(*counter.borrow(), 0);
}
