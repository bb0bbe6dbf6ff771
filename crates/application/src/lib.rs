//! Orchestration services for the clinic back office.
//!
//! One service per aggregate family. Every operation follows the same
//! fixed sequence:
//!
//! 1. Load referenced aggregates through their repository ports — a
//!    missing reference is a not-found failure, distinct from validation.
//! 2. On the update path, capture a pre-mutation snapshot through the
//!    audit trail *before* invoking any mutator.
//! 3. Apply the domain mutation; invariant violations surface as
//!    validation or state-conflict failures.
//! 4. Persist the resulting aggregate.
//! 5. Record the audit entry — only after the persist succeeded, and
//!    always from the persisted state, so audit entries never reference
//!    an id that failed to commit.
//! 6. Return a read-only result projection.
//!
//! Each operation runs to completion within its call; nothing here spawns
//! tasks, retries, or arbitrates concurrent access to the same aggregate
//! id — that is the storage collaborator's job.

pub mod appointment;
pub mod error;
pub mod medical_record;
pub mod owner;
pub mod patient;
pub mod veterinarian;

pub use appointment::{
    AppointmentResult, AppointmentService, AssignVeterinarian, CancelAppointment, ChangePriority,
    CompleteAppointment, MarkNoShow, RescheduleAppointment, ScheduleAppointment,
    UnassignVeterinarian,
};
pub use error::AppError;
pub use medical_record::{
    AmendMedicalRecord, CreateMedicalRecord, MedicalRecordResult, MedicalRecordService,
};
pub use owner::{CreateOwner, OwnerResult, OwnerService, UpdateOwner};
pub use patient::{
    ActivatePatient, DeactivatePatient, PatientResult, PatientService, RegisterPatient,
    UpdatePatient,
};
pub use veterinarian::{VeterinarianResult, VeterinarianService};

use store::StoreError;

/// Extracts the id a repository must have assigned on save.
///
/// `save` contracts return the persisted representation; a missing id is a
/// broken storage adapter, reported as a store failure rather than a
/// panic.
pub(crate) fn persisted_id<T>(id: Option<T>, entity: &'static str) -> Result<T, AppError> {
    id.ok_or_else(|| {
        AppError::Store(StoreError::Backend(format!(
            "{entity} save returned no id"
        )))
    })
}
