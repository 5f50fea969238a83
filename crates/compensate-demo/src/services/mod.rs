//! In-memory collaborators for the signup scenario.
//!
//! Each client owns some state and can be told to fail either its forward
//! operation or its undo operation.

mod database;
mod files;
mod payments;

use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

pub(crate) use database::DatabaseClient;
pub(crate) use files::FilesClient;
pub(crate) use payments::PaymentsClient;

/// One of the external systems touched during signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Collaborator {
    Database,
    Files,
    Payments,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Database => "database",
            Self::Files => "files",
            Self::Payments => "payments",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ServiceError {
    #[error("{service} is unavailable")]
    Unavailable { service: Collaborator },

    #[error("{service} rejected the undo of '{target}'")]
    UndoRejected {
        service: Collaborator,
        target: String,
    },

    #[error("database has no record #{0}")]
    MissingRecord(usize),

    #[error("file '{0}' already exists")]
    FileExists(String),

    #[error("file '{0}' does not exist")]
    MissingFile(String),

    #[error("payment account '{0}' does not exist")]
    MissingAccount(String),
}

/// Which operations of a collaborator are made to fail.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Faults {
    pub(crate) fail_action: bool,
    pub(crate) fail_compensation: bool,
}

impl Faults {
    fn check_action(self, service: Collaborator) -> Result<(), ServiceError> {
        if self.fail_action {
            Err(ServiceError::Unavailable { service })
        } else {
            Ok(())
        }
    }

    fn check_compensation(self, service: Collaborator, target: &str) -> Result<(), ServiceError> {
        if self.fail_compensation {
            Err(ServiceError::UndoRejected {
                service,
                target: target.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Observable state of all collaborators at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Snapshot {
    pub(crate) records: Vec<String>,
    pub(crate) files: BTreeMap<String, String>,
    pub(crate) accounts: Vec<String>,
}

impl Snapshot {
    pub(crate) fn is_pristine(&self) -> bool {
        self.records.is_empty() && self.files.is_empty() && self.accounts.is_empty()
    }
}

pub(crate) struct Services {
    pub(crate) database: DatabaseClient,
    pub(crate) files: FilesClient,
    pub(crate) payments: PaymentsClient,
}

impl Services {
    pub(crate) fn new(fail_at: Option<Collaborator>, broken_undo: &[Collaborator]) -> Self {
        let faults = |service| Faults {
            fail_action: fail_at == Some(service),
            fail_compensation: broken_undo.contains(&service),
        };
        Self {
            database: DatabaseClient::new(faults(Collaborator::Database)),
            files: FilesClient::new(faults(Collaborator::Files)),
            payments: PaymentsClient::new(faults(Collaborator::Payments)),
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.database.records(),
            files: self.files.files(),
            accounts: self.payments.accounts(),
        }
    }
}
