//! Audit trail for the clinic back office.
//!
//! Every mutation of an audited aggregate produces one immutable,
//! attributable log entry: `INSERT` entries carry only the new state,
//! `UPDATE` entries carry a before/after snapshot pair. Capture is
//! best-effort by design — a failure to snapshot or to write the log
//! never fails the primary business mutation.

pub mod entry;
pub mod log;
pub mod principal;
pub mod service;

pub use entry::{AuditAction, AuditLogEntry};
pub use log::{AuditLogStore, AuditStoreError, InMemoryAuditLog};
pub use principal::{PrincipalResolver, StaticPrincipal, SystemPrincipal, SYSTEM_ACTOR};
pub use service::AuditTrail;
