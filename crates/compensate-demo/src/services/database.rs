use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use super::{Collaborator, Faults, ServiceError};

#[derive(Default)]
struct Table {
    next_id: usize,
    rows: BTreeMap<usize, String>,
}

/// Row store keyed by generated ids.
pub(crate) struct DatabaseClient {
    table: RefCell<Table>,
    faults: Faults,
}

impl DatabaseClient {
    pub(crate) fn new(faults: Faults) -> Self {
        Self {
            table: RefCell::new(Table::default()),
            faults,
        }
    }

    /// Insert a row, returning its id.
    pub(crate) fn insert(&self, data: &str) -> Result<usize, ServiceError> {
        self.faults.check_action(Collaborator::Database)?;
        let mut table = self.table.borrow_mut();
        let id = table.next_id;
        table.next_id += 1;
        table.rows.insert(id, data.to_string());
        debug!(id, data, "inserted record");
        Ok(id)
    }

    pub(crate) fn delete(&self, id: usize) -> Result<(), ServiceError> {
        self.faults
            .check_compensation(Collaborator::Database, &format!("record #{id}"))?;
        self.table
            .borrow_mut()
            .rows
            .remove(&id)
            .ok_or(ServiceError::MissingRecord(id))?;
        debug!(id, "deleted record");
        Ok(())
    }

    pub(crate) fn records(&self) -> Vec<String> {
        self.table.borrow().rows.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_ids() {
        let db = DatabaseClient::new(Faults::default());

        assert_eq!(db.insert("alice").expect("insert"), 0);
        assert_eq!(db.insert("bob").expect("insert"), 1);
        assert_eq!(db.records(), ["alice", "bob"]);
    }

    #[test]
    fn delete_keeps_other_ids_stable() {
        let db = DatabaseClient::new(Faults::default());
        let alice = db.insert("alice").expect("insert");
        let bob = db.insert("bob").expect("insert");

        db.delete(alice).expect("delete alice");
        db.delete(bob).expect("delete bob");

        assert!(db.records().is_empty());
    }

    #[test]
    fn delete_of_unknown_id_fails() {
        let db = DatabaseClient::new(Faults::default());

        let err = db.delete(9).expect_err("no such record");

        assert!(matches!(err, ServiceError::MissingRecord(9)));
    }

    #[test]
    fn faulty_insert_leaves_table_untouched() {
        let db = DatabaseClient::new(Faults {
            fail_action: true,
            fail_compensation: false,
        });

        assert!(db.insert("alice").is_err());
        assert!(db.records().is_empty());
    }
}
