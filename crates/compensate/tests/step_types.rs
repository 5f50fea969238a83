//! Integration tests for named action and compensation types.

use std::cell::RefCell;
use std::collections::BTreeMap;

use compensate::{Action, Compensation, StepStatus, Transaction};

#[derive(Debug, PartialEq, thiserror::Error)]
enum StoreError {
    #[error("key '{0}' already exists")]
    Exists(String),
    #[error("key '{0}' not found")]
    Missing(String),
}

#[derive(Default)]
struct Store {
    entries: RefCell<BTreeMap<String, String>>,
}

struct Put<'s> {
    store: &'s Store,
    key: &'static str,
    value: &'static str,
}

impl Action for Put<'_> {
    type Output = ();
    type Error = StoreError;

    fn execute(self) -> Result<(), StoreError> {
        let mut entries = self.store.entries.borrow_mut();
        if entries.contains_key(self.key) {
            return Err(StoreError::Exists(self.key.to_string()));
        }
        entries.insert(self.key.to_string(), self.value.to_string());
        Ok(())
    }
}

struct Remove<'s> {
    store: &'s Store,
    key: &'static str,
}

impl Compensation for Remove<'_> {
    type Error = StoreError;

    fn compensate(self) -> Result<(), StoreError> {
        self.store
            .entries
            .borrow_mut()
            .remove(self.key)
            .map(|_| ())
            .ok_or_else(|| StoreError::Missing(self.key.to_string()))
    }

    fn description(&self) -> Option<String> {
        Some(format!("remove key '{}'", self.key))
    }
}

#[test]
fn named_types_and_closures_mix_in_one_transaction() {
    let store = Store::default();
    let mut tx = Transaction::new();

    tx.execute(
        Put {
            store: &store,
            key: "a",
            value: "1",
        },
        Remove {
            store: &store,
            key: "a",
        },
    )
    .expect("put a");
    tx.execute(
        || -> Result<(), StoreError> {
            store
                .entries
                .borrow_mut()
                .insert("b".to_string(), "2".to_string());
            Ok(())
        },
        Remove {
            store: &store,
            key: "b",
        },
    )
    .expect("put b");
    let failure = tx
        .execute(
            Put {
                store: &store,
                key: "a",
                value: "3",
            },
            Remove {
                store: &store,
                key: "a",
            },
        )
        .expect_err("duplicate key");

    assert_eq!(
        tx.descriptions().collect::<Vec<_>>(),
        ["remove key 'a'", "remove key 'b'"]
    );

    let (reason, rollback_error) = tx.rollback(failure);

    assert_eq!(reason, StoreError::Exists("a".to_string()));
    assert!(rollback_error.is_none());
    assert!(store.entries.borrow().is_empty());
}

#[test]
fn compensation_description_is_reported_on_failure() {
    let store = Store::default();
    let mut tx = Transaction::new();

    tx.execute_named(
        "phantom put",
        || Ok::<_, StoreError>(()),
        Remove {
            store: &store,
            key: "ghost",
        },
    )
    .expect("action succeeds without writing");

    let (_, rollback_error, audit_log) = tx.rollback_with_audit("abort");

    let rollback_error = rollback_error.expect("removal of missing key fails");
    let failure = &rollback_error.failures()[0];
    assert_eq!(failure.step, "phantom put");
    assert_eq!(failure.description, "remove key 'ghost'");
    assert_eq!(failure.error, StoreError::Missing("ghost".to_string()));
    assert_eq!(
        audit_log.records()[0].status,
        StepStatus::CompensationFailed
    );
}
