use std::cell::RefCell;
use std::collections::BTreeSet;

use tracing::debug;

use super::{Collaborator, Faults, ServiceError};

/// Payment gateway holding customer accounts.
pub(crate) struct PaymentsClient {
    accounts: RefCell<BTreeSet<String>>,
    faults: Faults,
}

impl PaymentsClient {
    pub(crate) fn new(faults: Faults) -> Self {
        Self {
            accounts: RefCell::new(BTreeSet::new()),
            faults,
        }
    }

    pub(crate) fn create_account(&self, account: &str) -> Result<(), ServiceError> {
        self.faults.check_action(Collaborator::Payments)?;
        self.accounts.borrow_mut().insert(account.to_string());
        debug!(account, "created payment account");
        Ok(())
    }

    pub(crate) fn remove_account(&self, account: &str) -> Result<(), ServiceError> {
        self.faults
            .check_compensation(Collaborator::Payments, account)?;
        if !self.accounts.borrow_mut().remove(account) {
            return Err(ServiceError::MissingAccount(account.to_string()));
        }
        debug!(account, "removed payment account");
        Ok(())
    }

    pub(crate) fn accounts(&self) -> Vec<String> {
        self.accounts.borrow().iter().cloned().collect()
    }
}
