//! Compensating transactions for multi-step, side-effecting work.
//!
//! A [`Transaction`] runs actions one at a time. Whenever an action succeeds,
//! the compensation paired with it is recorded. When a later action fails, the
//! caller hands the failure to [`Transaction::rollback`], which runs every
//! recorded compensation in reverse order and reports the ones that failed.
//!
//! ```
//! use std::cell::RefCell;
//!
//! use compensate::Transaction;
//!
//! let files = RefCell::new(Vec::new());
//! let mut tx: Transaction<'_, String> = Transaction::new();
//!
//! tx.execute(
//!     || -> Result<(), String> {
//!         files.borrow_mut().push("report.txt");
//!         Ok(())
//!     },
//!     || -> Result<(), String> {
//!         files.borrow_mut().retain(|f| *f != "report.txt");
//!         Ok(())
//!     },
//! )
//! .expect("first step succeeds");
//!
//! let failure = tx
//!     .execute(|| Err::<(), _>("gateway unavailable"), || Ok::<(), String>(()))
//!     .expect_err("second step fails");
//!
//! let (reason, rollback_error) = tx.rollback(failure);
//! assert_eq!(reason, "gateway unavailable");
//! assert!(rollback_error.is_none());
//! assert!(files.borrow().is_empty());
//! ```

mod audit;
mod capability;
mod error;
mod transaction;

pub use audit::{AuditLog, StepRecord, StepStatus};
pub use capability::{Action, Compensation};
pub use error::{CompensationError, RollbackError};
pub use transaction::Transaction;
