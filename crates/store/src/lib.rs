//! Repository ports for the clinic back office.
//!
//! Each aggregate family gets a narrow async trait; `save` returns the
//! persisted representation with its assigned surrogate id. The actual
//! persistence technology lives behind these ports — this crate ships
//! in-memory implementations so the core is executable and testable
//! without one.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::{
    InMemoryAppointmentRepository, InMemoryMedicalRecordRepository, InMemoryOwnerRepository,
    InMemoryPatientRepository, InMemoryVeterinarianRepository,
};
pub use repository::{
    AppointmentRepository, MedicalRecordRepository, OwnerRepository, PatientRepository,
    VeterinarianRepository,
};
