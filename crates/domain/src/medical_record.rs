//! Medical record aggregate.

use chrono::{DateTime, Utc};
use common::{Clock, MedicalRecordId, PatientId, VeterinarianId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Parameters for creating a medical record.
///
/// A flat parameter record instead of a long argument list: patient,
/// veterinarian and diagnosis are required; everything else is optional.
#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub patient_id: PatientId,
    pub veterinarian_id: VeterinarianId,
    /// Defaults to the clock's current instant when absent.
    pub visit_date: Option<DateTime<Utc>>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
}

/// A medical record entry for one patient visit.
///
/// Identity fields (patient, veterinarian, visit date) are fixed at
/// creation. Diagnosis, treatment and medications can each be updated
/// independently; notes only ever accumulate, newline-separated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    id: Option<MedicalRecordId>,
    patient_id: PatientId,
    veterinarian_id: VeterinarianId,
    visit_date: DateTime<Utc>,
    diagnosis: String,
    treatment: Option<String>,
    medications: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl MedicalRecord {
    /// Creates a new medical record.
    pub fn create(params: NewMedicalRecord, clock: &dyn Clock) -> Result<Self, DomainError> {
        if params.veterinarian_id.as_i64() <= 0 {
            return Err(DomainError::validation(
                "Medical record veterinarian id must be positive",
            ));
        }
        let diagnosis = validate_diagnosis(&params.diagnosis)?;
        let now = clock.now();

        Ok(Self {
            id: None,
            patient_id: params.patient_id,
            veterinarian_id: params.veterinarian_id,
            visit_date: params.visit_date.unwrap_or(now),
            diagnosis,
            treatment: normalize(params.treatment.as_deref()),
            medications: normalize(params.medications.as_deref()),
            notes: normalize(params.notes.as_deref()),
            created_at: now,
        })
    }

    /// Replaces the diagnosis after re-validating it.
    pub fn update_diagnosis(&mut self, new_diagnosis: &str) -> Result<(), DomainError> {
        self.diagnosis = validate_diagnosis(new_diagnosis)?;
        Ok(())
    }

    /// Replaces the treatment; blank input clears it.
    pub fn update_treatment(&mut self, new_treatment: Option<&str>) {
        self.treatment = normalize(new_treatment);
    }

    /// Replaces the medications; blank input clears them.
    pub fn update_medications(&mut self, new_medications: Option<&str>) {
        self.medications = normalize(new_medications);
    }

    /// Appends a line to the notes. Blank or absent input is a no-op.
    pub fn append_notes(&mut self, extra_notes: Option<&str>) {
        let Some(n) = normalize(extra_notes) else {
            return;
        };
        match &mut self.notes {
            Some(notes) => {
                notes.push('\n');
                notes.push_str(&n);
            }
            None => self.notes = Some(n),
        }
    }

    /// Sets the surrogate id. Called by the repository when the aggregate
    /// is first persisted.
    pub fn assign_id(&mut self, id: MedicalRecordId) {
        self.id = Some(id);
    }
}

// Accessors
impl MedicalRecord {
    pub fn id(&self) -> Option<MedicalRecordId> {
        self.id
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn veterinarian_id(&self) -> VeterinarianId {
        self.veterinarian_id
    }

    pub fn visit_date(&self) -> DateTime<Utc> {
        self.visit_date
    }

    pub fn diagnosis(&self) -> &str {
        &self.diagnosis
    }

    pub fn treatment(&self) -> Option<&str> {
        self.treatment.as_deref()
    }

    pub fn medications(&self) -> Option<&str> {
        self.medications.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn validate_diagnosis(diagnosis: &str) -> Result<String, DomainError> {
    let d = diagnosis.trim();
    if d.is_empty() {
        return Err(DomainError::validation("Diagnosis cannot be empty"));
    }
    Ok(d.to_string())
}

fn normalize(s: Option<&str>) -> Option<String> {
    let t = s?.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}
