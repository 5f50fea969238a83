//! Customer signup across three collaborators.
//!
//! 1. insert the customer record
//! 2. upload the welcome file
//! 3. open the payment account
//!
//! When a step fails, the steps before it are undone in reverse order.

use compensate::{AuditLog, RollbackError, Transaction};
use tracing::{error, info};

use crate::services::{ServiceError, Services, Snapshot};

pub(crate) struct SignupRequest {
    pub(crate) customer: String,
}

impl SignupRequest {
    fn welcome_path(&self) -> String {
        format!("/uploads/{}/welcome.txt", self.customer)
    }

    fn account(&self) -> String {
        format!("acct_{}", self.customer)
    }
}

pub(crate) enum SignupResult {
    Completed,
    RolledBack {
        reason: ServiceError,
        rollback_error: Option<RollbackError<ServiceError>>,
        at_failure: Snapshot,
    },
}

pub(crate) struct SignupOutcome {
    pub(crate) customer: String,
    pub(crate) result: SignupResult,
    pub(crate) final_state: Snapshot,
    pub(crate) audit_log: AuditLog,
}

pub(crate) fn run_signup(services: &Services, request: &SignupRequest) -> SignupOutcome {
    let mut tx = Transaction::new();

    let (result, audit_log) = match record_steps(&mut tx, services, request) {
        Ok(()) => {
            info!(customer = %request.customer, "signup completed");
            (SignupResult::Completed, tx.commit())
        }
        Err(reason) => {
            let at_failure = services.snapshot();
            let (reason, rollback_error, audit_log) = tx.rollback_with_audit(reason);
            match &rollback_error {
                None => info!(customer = %request.customer, %reason, "signup rolled back"),
                Some(failures) => error!(
                    customer = %request.customer,
                    %reason,
                    failed = failures.len(),
                    "signup rollback incomplete, external state is inconsistent"
                ),
            }
            (
                SignupResult::RolledBack {
                    reason,
                    rollback_error,
                    at_failure,
                },
                audit_log,
            )
        }
    };

    SignupOutcome {
        customer: request.customer.clone(),
        result,
        final_state: services.snapshot(),
        audit_log,
    }
}

fn record_steps<'a>(
    tx: &mut Transaction<'a, ServiceError>,
    services: &'a Services,
    request: &SignupRequest,
) -> Result<(), ServiceError> {
    tx.execute_named_with(
        "insert customer record",
        || services.database.insert(&request.customer),
        move |id| services.database.delete(id),
    )?;

    let path = request.welcome_path();
    let contents = format!("hello {}", request.customer);
    tx.execute_named(
        "upload welcome file",
        || services.files.create_file(&path, &contents),
        {
            let path = path.clone();
            move || services.files.remove_file(&path)
        },
    )?;

    let account = request.account();
    tx.execute_named(
        "open payment account",
        || services.payments.create_account(&account),
        {
            let account = account.clone();
            move || services.payments.remove_account(&account)
        },
    )?;

    Ok(())
}
