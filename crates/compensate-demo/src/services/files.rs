use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::debug;

use super::{Collaborator, Faults, ServiceError};

/// Path-to-contents file store.
pub(crate) struct FilesClient {
    files: RefCell<BTreeMap<String, String>>,
    faults: Faults,
}

impl FilesClient {
    pub(crate) fn new(faults: Faults) -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            faults,
        }
    }

    pub(crate) fn create_file(&self, path: &str, contents: &str) -> Result<(), ServiceError> {
        self.faults.check_action(Collaborator::Files)?;
        let mut files = self.files.borrow_mut();
        if files.contains_key(path) {
            return Err(ServiceError::FileExists(path.to_string()));
        }
        files.insert(path.to_string(), contents.to_string());
        debug!(path, bytes = contents.len(), "created file");
        Ok(())
    }

    pub(crate) fn remove_file(&self, path: &str) -> Result<(), ServiceError> {
        self.faults.check_compensation(Collaborator::Files, path)?;
        self.files
            .borrow_mut()
            .remove(path)
            .ok_or_else(|| ServiceError::MissingFile(path.to_string()))?;
        debug!(path, "removed file");
        Ok(())
    }

    pub(crate) fn files(&self) -> BTreeMap<String, String> {
        self.files.borrow().clone()
    }
}
