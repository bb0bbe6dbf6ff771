//! In-memory repository implementations.
//!
//! These back the test suites and any in-process deployment. They provide
//! the same contract as a real storage adapter: sequential surrogate ids
//! assigned on first save, last-write-wins per id, no cross-aggregate
//! transactions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use common::{AppointmentId, MedicalRecordId, OwnerId, PatientId, VeterinarianId};
use domain::{Appointment, MedicalRecord, Owner, Patient, Veterinarian};

use crate::repository::{
    AppointmentRepository, MedicalRecordRepository, OwnerRepository, PatientRepository,
    VeterinarianRepository,
};
use crate::Result;

/// In-memory owner repository.
#[derive(Clone, Default)]
pub struct InMemoryOwnerRepository {
    rows: Arc<RwLock<HashMap<i64, Owner>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryOwnerRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored owners.
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl OwnerRepository for InMemoryOwnerRepository {
    async fn save(&self, mut owner: Owner) -> Result<Owner> {
        let id = match owner.id() {
            Some(id) => id,
            None => {
                let id = OwnerId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                owner.assign_id(id);
                id
            }
        };
        self.rows.write().await.insert(id.as_i64(), owner.clone());
        Ok(owner)
    }

    async fn find_by_id(&self, id: OwnerId) -> Result<Option<Owner>> {
        Ok(self.rows.read().await.get(&id.as_i64()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|o| o.email().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn delete(&self, id: OwnerId) -> Result<()> {
        self.rows.write().await.remove(&id.as_i64());
        Ok(())
    }
}

/// In-memory patient repository.
#[derive(Clone, Default)]
pub struct InMemoryPatientRepository {
    rows: Arc<RwLock<HashMap<i64, Patient>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryPatientRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored patients.
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn save(&self, mut patient: Patient) -> Result<Patient> {
        let id = match patient.id() {
            Some(id) => id,
            None => {
                let id = PatientId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                patient.assign_id(id);
                id
            }
        };
        self.rows.write().await.insert(id.as_i64(), patient.clone());
        Ok(patient)
    }

    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>> {
        Ok(self.rows.read().await.get(&id.as_i64()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Patient>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Patient>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|p| p.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_active(&self, active: bool) -> Result<Vec<Patient>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|p| p.is_active() == active)
            .cloned()
            .collect())
    }

    async fn find_by_owner_and_active(
        &self,
        owner_id: OwnerId,
        active: bool,
    ) -> Result<Vec<Patient>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|p| p.owner_id() == owner_id && p.is_active() == active)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: PatientId) -> Result<()> {
        self.rows.write().await.remove(&id.as_i64());
        Ok(())
    }
}

/// In-memory appointment repository.
#[derive(Clone, Default)]
pub struct InMemoryAppointmentRepository {
    rows: Arc<RwLock<HashMap<i64, Appointment>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryAppointmentRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored appointments.
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn save(&self, mut appointment: Appointment) -> Result<Appointment> {
        let id = match appointment.id() {
            Some(id) => id,
            None => {
                let id = AppointmentId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                appointment.assign_id(id);
                id
            }
        };
        self.rows
            .write()
            .await
            .insert(id.as_i64(), appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.rows.read().await.get(&id.as_i64()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Appointment>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Appointment>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.patient_id() == patient_id)
            .cloned()
            .collect())
    }

    async fn find_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|a| a.appointment_date() >= from && a.appointment_date() <= to)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: AppointmentId) -> Result<()> {
        self.rows.write().await.remove(&id.as_i64());
        Ok(())
    }
}

/// In-memory medical record repository.
#[derive(Clone, Default)]
pub struct InMemoryMedicalRecordRepository {
    rows: Arc<RwLock<HashMap<i64, MedicalRecord>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryMedicalRecordRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl MedicalRecordRepository for InMemoryMedicalRecordRepository {
    async fn save(&self, mut record: MedicalRecord) -> Result<MedicalRecord> {
        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = MedicalRecordId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                record.assign_id(id);
                id
            }
        };
        self.rows.write().await.insert(id.as_i64(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: MedicalRecordId) -> Result<Option<MedicalRecord>> {
        Ok(self.rows.read().await.get(&id.as_i64()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<MedicalRecord>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<MedicalRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.patient_id() == patient_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: MedicalRecordId) -> Result<()> {
        self.rows.write().await.remove(&id.as_i64());
        Ok(())
    }
}

/// In-memory veterinarian directory.
///
/// Veterinarians are managed by the credential system; this implementation
/// is seeded through [`InMemoryVeterinarianRepository::insert`].
#[derive(Clone, Default)]
pub struct InMemoryVeterinarianRepository {
    rows: Arc<RwLock<HashMap<i64, Veterinarian>>>,
}

impl InMemoryVeterinarianRepository {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a veterinarian record.
    pub async fn insert(&self, veterinarian: Veterinarian) {
        self.rows
            .write()
            .await
            .insert(veterinarian.id().as_i64(), veterinarian);
    }
}

#[async_trait]
impl VeterinarianRepository for InMemoryVeterinarianRepository {
    async fn find_by_id(&self, id: VeterinarianId) -> Result<Option<Veterinarian>> {
        Ok(self.rows.read().await.get(&id.as_i64()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Veterinarian>> {
        let mut vets: Vec<_> = self.rows.read().await.values().cloned().collect();
        vets.sort_by_key(|v| v.id());
        Ok(vets)
    }

    async fn find_all_active(&self) -> Result<Vec<Veterinarian>> {
        let mut vets: Vec<_> = self
            .rows
            .read()
            .await
            .values()
            .filter(|v| v.is_active())
            .cloned()
            .collect();
        vets.sort_by_key(|v| v.id());
        Ok(vets)
    }

    async fn is_active(&self, id: VeterinarianId) -> Result<bool> {
        Ok(self
            .rows
            .read()
            .await
            .get(&id.as_i64())
            .is_some_and(|v| v.is_active()))
    }
}
