//! Shared building blocks for the clinic back office.
//!
//! This crate provides:
//! - Typed surrogate identifiers for every aggregate
//! - The `Clock` abstraction that keeps time-dependent domain logic
//!   deterministic under test

pub mod clock;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use types::{
    AppointmentId, AuditLogId, MedicalRecordId, OwnerId, PatientId, VeterinarianId,
};
