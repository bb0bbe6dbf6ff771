//! Medical record use cases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{Clock, MedicalRecordId, PatientId, VeterinarianId};
use domain::{MedicalRecord, NewMedicalRecord};
use serde::Serialize;
use store::{MedicalRecordRepository, PatientRepository};

use audit::AuditTrail;

use crate::error::AppError;
use crate::persisted_id;

const MEDICAL_RECORDS_TABLE: &str = "medical_records";

/// Command to create a medical record for a visit.
#[derive(Debug, Clone)]
pub struct CreateMedicalRecord {
    pub patient_id: PatientId,
    pub veterinarian_id: VeterinarianId,
    /// Defaults to the current instant when absent.
    pub visit_date: Option<DateTime<Utc>>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
}

/// Command to amend a record after the visit.
///
/// Absent fields are left unchanged; a supplied blank clears the field.
/// Notes never get overwritten — `extra_notes` is appended.
#[derive(Debug, Clone)]
pub struct AmendMedicalRecord {
    pub record_id: MedicalRecordId,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub medications: Option<String>,
    pub extra_notes: Option<String>,
}

/// Read-only projection of a persisted medical record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicalRecordResult {
    pub id: MedicalRecordId,
    pub patient_id: PatientId,
    pub veterinarian_id: VeterinarianId,
    pub visit_date: DateTime<Utc>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MedicalRecordResult {
    fn from_record(record: &MedicalRecord) -> Result<Self, AppError> {
        Ok(Self {
            id: persisted_id(record.id(), "medical record")?,
            patient_id: record.patient_id(),
            veterinarian_id: record.veterinarian_id(),
            visit_date: record.visit_date(),
            diagnosis: record.diagnosis().to_string(),
            treatment: record.treatment().map(str::to_string),
            medications: record.medications().map(str::to_string),
            notes: record.notes().map(str::to_string),
            created_at: record.created_at(),
        })
    }
}

/// Coordinates medical record operations.
pub struct MedicalRecordService {
    records: Arc<dyn MedicalRecordRepository>,
    patients: Arc<dyn PatientRepository>,
    audit: Arc<AuditTrail>,
    clock: Arc<dyn Clock>,
}

impl MedicalRecordService {
    pub fn new(
        records: Arc<dyn MedicalRecordRepository>,
        patients: Arc<dyn PatientRepository>,
        audit: Arc<AuditTrail>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            patients,
            audit,
            clock,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_record(
        &self,
        command: CreateMedicalRecord,
    ) -> Result<MedicalRecordResult, AppError> {
        self.ensure_patient(command.patient_id).await?;

        let record = MedicalRecord::create(
            NewMedicalRecord {
                patient_id: command.patient_id,
                veterinarian_id: command.veterinarian_id,
                visit_date: command.visit_date,
                diagnosis: command.diagnosis,
                treatment: command.treatment,
                medications: command.medications,
                notes: command.notes,
            },
            self.clock.as_ref(),
        )?;

        let saved = self.records.save(record).await?;
        let id = persisted_id(saved.id(), "medical record")?;
        self.audit
            .record_creation(MEDICAL_RECORDS_TABLE, id.as_i64(), &saved)
            .await;
        MedicalRecordResult::from_record(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn amend_record(
        &self,
        command: AmendMedicalRecord,
    ) -> Result<MedicalRecordResult, AppError> {
        let mut record = self.load_record(command.record_id).await?;
        let before = self.audit.snapshot(&record);

        if let Some(diagnosis) = &command.diagnosis {
            record.update_diagnosis(diagnosis)?;
        }
        if let Some(treatment) = &command.treatment {
            record.update_treatment(Some(treatment));
        }
        if let Some(medications) = &command.medications {
            record.update_medications(Some(medications));
        }
        record.append_notes(command.extra_notes.as_deref());

        let saved = self.records.save(record).await?;
        let id = persisted_id(saved.id(), "medical record")?;
        self.audit
            .record_update(MEDICAL_RECORDS_TABLE, id.as_i64(), before, &saved)
            .await;
        MedicalRecordResult::from_record(&saved)
    }

    /// Lists one patient's records, newest first by visit date.
    #[tracing::instrument(skip(self))]
    pub async fn list_records_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<MedicalRecordResult>, AppError> {
        self.ensure_patient(patient_id).await?;
        to_results(self.records.find_by_patient(patient_id).await?)
    }

    /// Lists every record, newest first by visit date.
    #[tracing::instrument(skip(self))]
    pub async fn list_records(&self) -> Result<Vec<MedicalRecordResult>, AppError> {
        to_results(self.records.find_all().await?)
    }

    async fn load_record(&self, id: MedicalRecordId) -> Result<MedicalRecord, AppError> {
        self.records
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Medical record", id.as_i64()))
    }

    async fn ensure_patient(&self, id: PatientId) -> Result<(), AppError> {
        if self.patients.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("Patient", id.as_i64()));
        }
        Ok(())
    }
}

fn to_results(mut records: Vec<MedicalRecord>) -> Result<Vec<MedicalRecordResult>, AppError> {
    records.sort_by(|a, b| b.visit_date().cmp(&a.visit_date()));
    records.iter().map(MedicalRecordResult::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit::{AuditAction, AuditLogStore, InMemoryAuditLog, SystemPrincipal};
    use chrono::{NaiveDate, TimeZone};
    use common::FixedClock;
    use domain::{Owner, Patient};
    use store::{
        InMemoryMedicalRecordRepository, InMemoryOwnerRepository, InMemoryPatientRepository,
        OwnerRepository,
    };

    struct Fixture {
        service: MedicalRecordService,
        log: Arc<InMemoryAuditLog>,
        patient_id: PatientId,
    }

    async fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ));

        let owners = Arc::new(InMemoryOwnerRepository::new());
        let owner = Owner::create(
            "Jane Doe",
            "+1 (555) 123-4567",
            "jane@example.com",
            "1 Main St",
            clock.as_ref(),
        )
        .unwrap();
        let owner_id = owners.save(owner).await.unwrap().id().unwrap();

        let patients = Arc::new(InMemoryPatientRepository::new());
        let patient = Patient::create(
            "Rex",
            "dog",
            None,
            NaiveDate::from_ymd_opt(2020, 3, 15).unwrap(),
            None,
            owner_id,
            clock.as_ref(),
        )
        .unwrap();
        let patient_id = patients.save(patient).await.unwrap().id().unwrap();

        let log = Arc::new(InMemoryAuditLog::new());
        let audit = Arc::new(AuditTrail::new(
            log.clone(),
            Arc::new(SystemPrincipal),
            clock.clone(),
        ));
        let service = MedicalRecordService::new(
            Arc::new(InMemoryMedicalRecordRepository::new()),
            patients,
            audit,
            clock,
        );
        Fixture {
            service,
            log,
            patient_id,
        }
    }

    fn create_command(patient_id: PatientId) -> CreateMedicalRecord {
        CreateMedicalRecord {
            patient_id,
            veterinarian_id: VeterinarianId::new(5),
            visit_date: None,
            diagnosis: "Otitis externa".to_string(),
            treatment: Some("Ear drops".to_string()),
            medications: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_record_persists_and_audits() {
        let f = fixture().await;

        let result = f
            .service
            .create_record(create_command(f.patient_id))
            .await
            .unwrap();
        assert_eq!(result.diagnosis, "Otitis externa");

        let entries = f
            .log
            .find_by_record(MEDICAL_RECORDS_TABLE, result.id.as_i64())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Insert);
    }

    #[tokio::test]
    async fn create_record_rejects_blank_diagnosis() {
        let f = fixture().await;

        let mut command = create_command(f.patient_id);
        command.diagnosis = "  ".to_string();

        let result = f.service.create_record(command).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(f.log.entry_count().await, 0);
    }

    #[tokio::test]
    async fn create_record_rejects_nonpositive_veterinarian() {
        let f = fixture().await;

        let mut command = create_command(f.patient_id);
        command.veterinarian_id = VeterinarianId::new(0);

        let result = f.service.create_record(command).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_record_for_unknown_patient_is_not_found() {
        let f = fixture().await;

        let result = f
            .service
            .create_record(create_command(PatientId::new(99)))
            .await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn amend_record_updates_fields_and_appends_notes() {
        let f = fixture().await;
        let created = f
            .service
            .create_record(create_command(f.patient_id))
            .await
            .unwrap();

        let amended = f
            .service
            .amend_record(AmendMedicalRecord {
                record_id: created.id,
                diagnosis: None,
                treatment: None,
                medications: Some("Amoxicillin".to_string()),
                extra_notes: Some("Responding well".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(amended.diagnosis, "Otitis externa");
        assert_eq!(amended.treatment.as_deref(), Some("Ear drops"));
        assert_eq!(amended.medications.as_deref(), Some("Amoxicillin"));
        assert_eq!(amended.notes.as_deref(), Some("Responding well"));

        let again = f
            .service
            .amend_record(AmendMedicalRecord {
                record_id: created.id,
                diagnosis: Some("Resolved".to_string()),
                treatment: None,
                medications: None,
                extra_notes: Some("Discharged".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(again.diagnosis, "Resolved");
        assert_eq!(
            again.notes.as_deref(),
            Some("Responding well\nDischarged")
        );

        let entries = f
            .log
            .find_by_record(MEDICAL_RECORDS_TABLE, created.id.as_i64())
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].action, AuditAction::Update);
        assert_eq!(entries[2].action, AuditAction::Update);
    }

    #[tokio::test]
    async fn listings_are_newest_first_by_visit_date() {
        let f = fixture().await;
        let base = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();

        for offset in [2i64, 5, 3] {
            let mut command = create_command(f.patient_id);
            command.visit_date = Some(base + chrono::Duration::days(offset));
            f.service.create_record(command).await.unwrap();
        }

        let listed = f
            .service
            .list_records_by_patient(f.patient_id)
            .await
            .unwrap();
        let dates: Vec<_> = listed.iter().map(|r| r.visit_date).collect();
        assert_eq!(
            dates,
            vec![
                base + chrono::Duration::days(5),
                base + chrono::Duration::days(3),
                base + chrono::Duration::days(2),
            ]
        );

        assert_eq!(f.service.list_records().await.unwrap().len(), 3);
    }
}
