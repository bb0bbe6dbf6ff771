//! Patient use cases.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use common::{Clock, OwnerId, PatientId};
use domain::{Patient, Species};
use rust_decimal::Decimal;
use serde::Serialize;
use store::{OwnerRepository, PatientRepository};

use audit::AuditTrail;

use crate::error::AppError;
use crate::persisted_id;

const PATIENTS_TABLE: &str = "patients";

/// Command to register a patient.
#[derive(Debug, Clone)]
pub struct RegisterPatient {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub birth_date: NaiveDate,
    pub weight: Option<Decimal>,
    pub owner_id: OwnerId,
}

/// Command to update a patient. Absent fields keep their current value.
#[derive(Debug, Clone)]
pub struct UpdatePatient {
    pub patient_id: PatientId,
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight: Option<Decimal>,
    pub owner_id: Option<OwnerId>,
}

/// Command to soft-delete a patient.
#[derive(Debug, Clone)]
pub struct DeactivatePatient {
    pub patient_id: PatientId,
}

/// Command to restore a soft-deleted patient.
#[derive(Debug, Clone)]
pub struct ActivatePatient {
    pub patient_id: PatientId,
}

/// Read-only projection of a persisted patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientResult {
    pub id: PatientId,
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub birth_date: NaiveDate,
    pub weight: Option<Decimal>,
    pub active: bool,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientResult {
    fn from_patient(patient: &Patient) -> Result<Self, AppError> {
        Ok(Self {
            id: persisted_id(patient.id(), "patient")?,
            name: patient.name().to_string(),
            species: patient.species(),
            breed: patient.breed().map(str::to_string),
            birth_date: patient.birth_date(),
            weight: patient.weight(),
            active: patient.is_active(),
            owner_id: patient.owner_id(),
            created_at: patient.created_at(),
            updated_at: patient.updated_at(),
        })
    }
}

/// Orchestrates patient aggregate operations.
pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
    owners: Arc<dyn OwnerRepository>,
    audit: Arc<AuditTrail>,
    clock: Arc<dyn Clock>,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        owners: Arc<dyn OwnerRepository>,
        audit: Arc<AuditTrail>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            owners,
            audit,
            clock,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn register_patient(
        &self,
        command: RegisterPatient,
    ) -> Result<PatientResult, AppError> {
        self.ensure_owner(command.owner_id).await?;

        let patient = Patient::create(
            &command.name,
            &command.species,
            command.breed.as_deref(),
            command.birth_date,
            command.weight,
            command.owner_id,
            self.clock.as_ref(),
        )?;

        let saved = self.patients.save(patient).await?;
        let id = persisted_id(saved.id(), "patient")?;
        self.audit
            .record_creation(PATIENTS_TABLE, id.as_i64(), &saved)
            .await;
        PatientResult::from_patient(&saved)
    }

    /// Applies a partial update: supplied fields mutate, absent ones carry
    /// over, and the profile is re-validated as a whole.
    #[tracing::instrument(skip(self))]
    pub async fn update_patient(&self, command: UpdatePatient) -> Result<PatientResult, AppError> {
        let mut patient = self.load_patient(command.patient_id).await?;
        let before = self.audit.snapshot(&patient);

        let species = command
            .species
            .clone()
            .unwrap_or_else(|| patient.species().as_str().to_string());
        let breed = command
            .breed
            .clone()
            .or_else(|| patient.breed().map(str::to_string));
        let birth_date = command.birth_date.unwrap_or_else(|| patient.birth_date());
        let owner_id = match command.owner_id {
            Some(id) => {
                self.ensure_owner(id).await?;
                id
            }
            None => patient.owner_id(),
        };

        if let Some(name) = &command.name {
            patient.rename(name, self.clock.as_ref())?;
        }
        if let Some(weight) = command.weight {
            patient.update_weight(weight, self.clock.as_ref())?;
        }
        patient.update_profile(
            &species,
            breed.as_deref(),
            birth_date,
            owner_id,
            self.clock.as_ref(),
        )?;

        let saved = self.patients.save(patient).await?;
        let id = persisted_id(saved.id(), "patient")?;
        self.audit
            .record_update(PATIENTS_TABLE, id.as_i64(), before, &saved)
            .await;
        PatientResult::from_patient(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn deactivate_patient(
        &self,
        command: DeactivatePatient,
    ) -> Result<PatientResult, AppError> {
        let mut patient = self.load_patient(command.patient_id).await?;
        let before = self.audit.snapshot(&patient);

        patient.deactivate(self.clock.as_ref())?;

        let saved = self.patients.save(patient).await?;
        let id = persisted_id(saved.id(), "patient")?;
        self.audit
            .record_update(PATIENTS_TABLE, id.as_i64(), before, &saved)
            .await;
        PatientResult::from_patient(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn activate_patient(
        &self,
        command: ActivatePatient,
    ) -> Result<PatientResult, AppError> {
        let mut patient = self.load_patient(command.patient_id).await?;
        let before = self.audit.snapshot(&patient);

        patient.activate(self.clock.as_ref())?;

        let saved = self.patients.save(patient).await?;
        let id = persisted_id(saved.id(), "patient")?;
        self.audit
            .record_update(PATIENTS_TABLE, id.as_i64(), before, &saved)
            .await;
        PatientResult::from_patient(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_patient(&self, patient_id: PatientId) -> Result<PatientResult, AppError> {
        let patient = self.load_patient(patient_id).await?;
        PatientResult::from_patient(&patient)
    }

    /// Lists patients, active-only by default, in registration order.
    #[tracing::instrument(skip(self))]
    pub async fn list_patients(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<PatientResult>, AppError> {
        let patients = if include_inactive {
            self.patients.find_all().await?
        } else {
            self.patients.find_by_active(true).await?
        };
        to_results(patients)
    }

    /// Lists one owner's patients, active-only by default, in registration
    /// order.
    #[tracing::instrument(skip(self))]
    pub async fn list_patients_by_owner(
        &self,
        owner_id: OwnerId,
        include_inactive: bool,
    ) -> Result<Vec<PatientResult>, AppError> {
        self.ensure_owner(owner_id).await?;
        let patients = if include_inactive {
            self.patients.find_by_owner(owner_id).await?
        } else {
            self.patients
                .find_by_owner_and_active(owner_id, true)
                .await?
        };
        to_results(patients)
    }

    async fn load_patient(&self, id: PatientId) -> Result<Patient, AppError> {
        self.patients
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Patient", id.as_i64()))
    }

    async fn ensure_owner(&self, id: OwnerId) -> Result<(), AppError> {
        if self.owners.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("Owner", id.as_i64()));
        }
        Ok(())
    }
}

fn to_results(mut patients: Vec<Patient>) -> Result<Vec<PatientResult>, AppError> {
    patients.sort_by_key(|p| p.id());
    patients.iter().map(PatientResult::from_patient).collect()
}
