use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AppointmentId, MedicalRecordId, OwnerId, PatientId, VeterinarianId};
use domain::{Appointment, MedicalRecord, Owner, Patient, Veterinarian};

use crate::Result;

/// Port for persisting and querying owners.
///
/// All ports must be thread-safe (Send + Sync); `save` assigns a surrogate
/// id on first persist and returns the stored representation.
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn save(&self, owner: Owner) -> Result<Owner>;
    async fn find_by_id(&self, id: OwnerId) -> Result<Option<Owner>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>>;
    async fn delete(&self, id: OwnerId) -> Result<()>;
}

/// Port for persisting and querying patients.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn save(&self, patient: Patient) -> Result<Patient>;
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>>;
    async fn find_all(&self) -> Result<Vec<Patient>>;
    async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Patient>>;
    async fn find_by_active(&self, active: bool) -> Result<Vec<Patient>>;
    async fn find_by_owner_and_active(
        &self,
        owner_id: OwnerId,
        active: bool,
    ) -> Result<Vec<Patient>>;
    async fn delete(&self, id: PatientId) -> Result<()>;
}

/// Port for persisting and querying appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn save(&self, appointment: Appointment) -> Result<Appointment>;
    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>>;
    async fn find_all(&self) -> Result<Vec<Appointment>>;
    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Appointment>>;
    async fn find_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;
    async fn delete(&self, id: AppointmentId) -> Result<()>;
}

/// Port for persisting and querying medical records.
#[async_trait]
pub trait MedicalRecordRepository: Send + Sync {
    async fn save(&self, record: MedicalRecord) -> Result<MedicalRecord>;
    async fn find_by_id(&self, id: MedicalRecordId) -> Result<Option<MedicalRecord>>;
    async fn find_all(&self) -> Result<Vec<MedicalRecord>>;
    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<MedicalRecord>>;
    async fn delete(&self, id: MedicalRecordId) -> Result<()>;
}

/// Read-only port over the externally managed veterinarian records.
#[async_trait]
pub trait VeterinarianRepository: Send + Sync {
    async fn find_by_id(&self, id: VeterinarianId) -> Result<Option<Veterinarian>>;
    async fn find_all(&self) -> Result<Vec<Veterinarian>>;
    async fn find_all_active(&self) -> Result<Vec<Veterinarian>>;
    async fn is_active(&self, id: VeterinarianId) -> Result<bool>;
}
