//! Appointment use cases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{AppointmentId, Clock, PatientId, VeterinarianId};
use domain::{Appointment, AppointmentPriority, AppointmentStatus, AppointmentType, Patient};
use serde::Serialize;
use store::{AppointmentRepository, PatientRepository, VeterinarianRepository};

use audit::AuditTrail;

use crate::error::AppError;
use crate::persisted_id;

const APPOINTMENTS_TABLE: &str = "appointments";

/// Command to schedule an appointment.
#[derive(Debug, Clone)]
pub struct ScheduleAppointment {
    pub patient_id: PatientId,
    pub veterinarian_id: Option<VeterinarianId>,
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    /// Defaults to `Normal` when absent.
    pub priority: Option<AppointmentPriority>,
    pub notes: Option<String>,
}

/// Command to move an appointment to a new date.
#[derive(Debug, Clone)]
pub struct RescheduleAppointment {
    pub appointment_id: AppointmentId,
    pub new_date: DateTime<Utc>,
}

/// Command to cancel an appointment.
#[derive(Debug, Clone)]
pub struct CancelAppointment {
    pub appointment_id: AppointmentId,
    /// Appended to the notes when present.
    pub reason: Option<String>,
}

/// Command to mark an appointment as completed.
#[derive(Debug, Clone)]
pub struct CompleteAppointment {
    pub appointment_id: AppointmentId,
}

/// Command to record that the patient did not show up.
#[derive(Debug, Clone)]
pub struct MarkNoShow {
    pub appointment_id: AppointmentId,
    pub note: Option<String>,
}

/// Command to assign a veterinarian to an appointment.
#[derive(Debug, Clone)]
pub struct AssignVeterinarian {
    pub appointment_id: AppointmentId,
    pub veterinarian_id: VeterinarianId,
}

/// Command to remove an appointment's veterinarian assignment.
#[derive(Debug, Clone)]
pub struct UnassignVeterinarian {
    pub appointment_id: AppointmentId,
}

/// Command to change an appointment's priority.
#[derive(Debug, Clone)]
pub struct ChangePriority {
    pub appointment_id: AppointmentId,
    pub new_priority: AppointmentPriority,
}

/// Read-only projection of a persisted appointment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentResult {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub veterinarian_id: Option<VeterinarianId>,
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub priority: AppointmentPriority,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AppointmentResult {
    fn from_appointment(appointment: &Appointment) -> Result<Self, AppError> {
        Ok(Self {
            id: persisted_id(appointment.id(), "appointment")?,
            patient_id: appointment.patient_id(),
            veterinarian_id: appointment.veterinarian_id(),
            appointment_date: appointment.appointment_date(),
            appointment_type: appointment.appointment_type(),
            status: appointment.status(),
            priority: appointment.priority(),
            notes: appointment.notes().map(str::to_string),
            created_at: appointment.created_at(),
        })
    }
}

/// Orchestrates appointment-related use cases.
pub struct AppointmentService {
    appointments: Arc<dyn AppointmentRepository>,
    patients: Arc<dyn PatientRepository>,
    veterinarians: Arc<dyn VeterinarianRepository>,
    audit: Arc<AuditTrail>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        patients: Arc<dyn PatientRepository>,
        veterinarians: Arc<dyn VeterinarianRepository>,
        audit: Arc<AuditTrail>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            patients,
            veterinarians,
            audit,
            clock,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn schedule_appointment(
        &self,
        command: ScheduleAppointment,
    ) -> Result<AppointmentResult, AppError> {
        let patient = self.load_patient(command.patient_id).await?;
        if !patient.is_active() {
            return Err(AppError::validation(
                "Cannot schedule appointments for inactive patients",
            ));
        }

        let appointment = Appointment::schedule(
            command.patient_id,
            command.veterinarian_id,
            command.appointment_date,
            command.appointment_type,
            command.priority,
            command.notes.as_deref(),
            self.clock.as_ref(),
        );

        let saved = self.appointments.save(appointment).await?;
        let id = persisted_id(saved.id(), "appointment")?;
        self.audit
            .record_creation(APPOINTMENTS_TABLE, id.as_i64(), &saved)
            .await;
        AppointmentResult::from_appointment(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reschedule_appointment(
        &self,
        command: RescheduleAppointment,
    ) -> Result<AppointmentResult, AppError> {
        self.mutate(command.appointment_id, |appointment| {
            appointment.reschedule(command.new_date)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_appointment(
        &self,
        command: CancelAppointment,
    ) -> Result<AppointmentResult, AppError> {
        self.mutate(command.appointment_id, |appointment| {
            appointment.cancel(command.reason.as_deref())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn complete_appointment(
        &self,
        command: CompleteAppointment,
    ) -> Result<AppointmentResult, AppError> {
        self.mutate(command.appointment_id, |appointment| appointment.complete())
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_no_show(&self, command: MarkNoShow) -> Result<AppointmentResult, AppError> {
        self.mutate(command.appointment_id, |appointment| {
            appointment.mark_no_show(command.note.as_deref())
        })
        .await
    }

    /// Assigns a veterinarian after checking that the reference resolves
    /// and the veterinarian is active.
    #[tracing::instrument(skip(self))]
    pub async fn assign_veterinarian(
        &self,
        command: AssignVeterinarian,
    ) -> Result<AppointmentResult, AppError> {
        let veterinarian = self
            .veterinarians
            .find_by_id(command.veterinarian_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Veterinarian", command.veterinarian_id.as_i64())
            })?;
        if !veterinarian.can_be_assigned() {
            return Err(AppError::validation(
                "Inactive veterinarians cannot be assigned to appointments",
            ));
        }

        self.mutate(command.appointment_id, |appointment| {
            appointment.assign_veterinarian(command.veterinarian_id)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn unassign_veterinarian(
        &self,
        command: UnassignVeterinarian,
    ) -> Result<AppointmentResult, AppError> {
        self.mutate(command.appointment_id, |appointment| {
            appointment.unassign_veterinarian()
        })
        .await
    }

    /// Changes the priority; unlike the workflow transitions this is
    /// allowed in any state.
    #[tracing::instrument(skip(self))]
    pub async fn change_priority(
        &self,
        command: ChangePriority,
    ) -> Result<AppointmentResult, AppError> {
        self.mutate(command.appointment_id, |appointment| {
            appointment.change_priority(command.new_priority);
            Ok(())
        })
        .await
    }

    /// Lists every appointment, newest first by appointment date.
    #[tracing::instrument(skip(self))]
    pub async fn list_appointments(&self) -> Result<Vec<AppointmentResult>, AppError> {
        to_results(self.appointments.find_all().await?)
    }

    /// Lists one patient's appointments, newest first by appointment date.
    #[tracing::instrument(skip(self))]
    pub async fn list_appointments_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AppointmentResult>, AppError> {
        self.load_patient(patient_id).await?;
        to_results(self.appointments.find_by_patient(patient_id).await?)
    }

    /// Lists appointments within an inclusive date range, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_appointments_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AppointmentResult>, AppError> {
        if from > to {
            return Err(AppError::validation("Date range start is after its end"));
        }
        to_results(self.appointments.find_by_date_range(from, to).await?)
    }

    /// Shared update path: load, snapshot, mutate, persist, audit.
    async fn mutate<F>(
        &self,
        appointment_id: AppointmentId,
        mutation: F,
    ) -> Result<AppointmentResult, AppError>
    where
        F: FnOnce(&mut Appointment) -> Result<(), domain::DomainError>,
    {
        let mut appointment = self.load_appointment(appointment_id).await?;
        let before = self.audit.snapshot(&appointment);

        mutation(&mut appointment)?;

        let saved = self.appointments.save(appointment).await?;
        let id = persisted_id(saved.id(), "appointment")?;
        self.audit
            .record_update(APPOINTMENTS_TABLE, id.as_i64(), before, &saved)
            .await;
        AppointmentResult::from_appointment(&saved)
    }

    async fn load_appointment(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment", id.as_i64()))
    }

    async fn load_patient(&self, id: PatientId) -> Result<Patient, AppError> {
        self.patients
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Patient", id.as_i64()))
    }
}

fn to_results(mut appointments: Vec<Appointment>) -> Result<Vec<AppointmentResult>, AppError> {
    appointments.sort_by(|a, b| b.appointment_date().cmp(&a.appointment_date()));
    appointments
        .iter()
        .map(AppointmentResult::from_appointment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit::{AuditAction, AuditLogStore, InMemoryAuditLog, SystemPrincipal};
    use chrono::{NaiveDate, TimeZone};
    use common::FixedClock;
    use domain::{Owner, Veterinarian};
    use store::{
        InMemoryAppointmentRepository, InMemoryOwnerRepository, InMemoryPatientRepository,
        InMemoryVeterinarianRepository, OwnerRepository,
    };

    struct Fixture {
        service: AppointmentService,
        patients: Arc<InMemoryPatientRepository>,
        log: Arc<InMemoryAuditLog>,
        patient_id: PatientId,
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    async fn fixture() -> Fixture {
        let clock = clock();

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

        let veterinarians = Arc::new(InMemoryVeterinarianRepository::new());
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        veterinarians
            .insert(Veterinarian::new(
                VeterinarianId::new(1),
                "dr.smith",
                "smith@clinic.example",
                true,
                created,
                None,
            ))
            .await;
        veterinarians
            .insert(Veterinarian::new(
                VeterinarianId::new(2),
                "dr.gone",
                "gone@clinic.example",
                false,
                created,
                None,
            ))
            .await;

        let log = Arc::new(InMemoryAuditLog::new());
        let audit = Arc::new(AuditTrail::new(
            log.clone(),
            Arc::new(SystemPrincipal),
            clock.clone(),
        ));
        let service = AppointmentService::new(
            Arc::new(InMemoryAppointmentRepository::new()),
            patients.clone(),
            veterinarians,
            audit,
            clock,
        );
        Fixture {
            service,
            patients,
            log,
            patient_id,
        }
    }

    fn schedule_command(patient_id: PatientId) -> ScheduleAppointment {
        ScheduleAppointment {
            patient_id,
            veterinarian_id: None,
            appointment_date: Utc.with_ymd_and_hms(2025, 6, 10, 9, 30, 0).unwrap(),
            appointment_type: AppointmentType::Checkup,
            priority: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn schedule_defaults_priority_and_writes_one_insert_entry() {
        let f = fixture().await;

        let result = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await
            .unwrap();

        assert_eq!(result.status, AppointmentStatus::Scheduled);
        assert_eq!(result.priority, AppointmentPriority::Normal);

        let entries = f
            .log
            .find_by_record(APPOINTMENTS_TABLE, result.id.as_i64())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Insert);
        assert_eq!(entries[0].old_values, None);
    }

    #[tokio::test]
    async fn schedule_rejects_inactive_patient() {
        let f = fixture().await;

        let mut patient = f.patients.find_by_id(f.patient_id).await.unwrap().unwrap();
        patient.deactivate(clock().as_ref()).unwrap();
        f.patients.save(patient).await.unwrap();

        let result = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn schedule_for_unknown_patient_is_not_found() {
        let f = fixture().await;

        let result = f
            .service
            .schedule_appointment(schedule_command(PatientId::new(99)))
            .await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cancel_appends_reason_and_rejects_a_second_cancel() {
        let f = fixture().await;
        let scheduled = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await
            .unwrap();

        let cancelled = f
            .service
            .cancel_appointment(CancelAppointment {
                appointment_id: scheduled.id,
                reason: Some("Busy".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        assert!(cancelled.notes.as_deref().unwrap().ends_with("Busy"));

        let again = f
            .service
            .cancel_appointment(CancelAppointment {
                appointment_id: scheduled.id,
                reason: None,
            })
            .await;
        assert!(matches!(again, Err(AppError::StateConflict(_))));

        // one INSERT + one UPDATE; the rejected cancel left no trace
        let entries = f
            .log
            .find_by_record(APPOINTMENTS_TABLE, scheduled.id.as_i64())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].old_values.as_ref().unwrap()["status"],
            "SCHEDULED"
        );
        assert_eq!(
            entries[1].new_values.as_ref().unwrap()["status"],
            "CANCELLED"
        );
    }

    #[tokio::test]
    async fn reschedule_moves_the_date() {
        let f = fixture().await;
        let scheduled = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await
            .unwrap();

        let new_date = Utc.with_ymd_and_hms(2025, 6, 12, 14, 0, 0).unwrap();
        let result = f
            .service
            .reschedule_appointment(RescheduleAppointment {
                appointment_id: scheduled.id,
                new_date,
            })
            .await
            .unwrap();

        assert_eq!(result.appointment_date, new_date);
        assert_eq!(result.status, AppointmentStatus::Scheduled);
    }

    #[tokio::test]
    async fn complete_then_mark_no_show_conflicts() {
        let f = fixture().await;
        let scheduled = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await
            .unwrap();

        f.service
            .complete_appointment(CompleteAppointment {
                appointment_id: scheduled.id,
            })
            .await
            .unwrap();

        let result = f
            .service
            .mark_no_show(MarkNoShow {
                appointment_id: scheduled.id,
                note: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[tokio::test]
    async fn assign_veterinarian_validates_the_reference() {
        let f = fixture().await;
        let scheduled = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await
            .unwrap();

        let result = f
            .service
            .assign_veterinarian(AssignVeterinarian {
                appointment_id: scheduled.id,
                veterinarian_id: VeterinarianId::new(1),
            })
            .await
            .unwrap();
        assert_eq!(result.veterinarian_id, Some(VeterinarianId::new(1)));

        let missing = f
            .service
            .assign_veterinarian(AssignVeterinarian {
                appointment_id: scheduled.id,
                veterinarian_id: VeterinarianId::new(99),
            })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound { .. })));

        let inactive = f
            .service
            .assign_veterinarian(AssignVeterinarian {
                appointment_id: scheduled.id,
                veterinarian_id: VeterinarianId::new(2),
            })
            .await;
        assert!(matches!(inactive, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn change_priority_works_on_completed_appointments() {
        let f = fixture().await;
        let scheduled = f
            .service
            .schedule_appointment(schedule_command(f.patient_id))
            .await
            .unwrap();

        f.service
            .complete_appointment(CompleteAppointment {
                appointment_id: scheduled.id,
            })
            .await
            .unwrap();

        let result = f
            .service
            .change_priority(ChangePriority {
                appointment_id: scheduled.id,
                new_priority: AppointmentPriority::Critical,
            })
            .await
            .unwrap();
        assert_eq!(result.priority, AppointmentPriority::Critical);
        assert_eq!(result.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn listings_are_newest_first_regardless_of_insertion_order() {
        let f = fixture().await;
        let base = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();

        for offset in [1i64, 3, 2] {
            let mut command = schedule_command(f.patient_id);
            command.appointment_date = base + chrono::Duration::days(offset);
            f.service.schedule_appointment(command).await.unwrap();
        }

        let listed = f
            .service
            .list_appointments_by_patient(f.patient_id)
            .await
            .unwrap();
        let dates: Vec<_> = listed.iter().map(|a| a.appointment_date).collect();
        assert_eq!(
            dates,
            vec![
                base + chrono::Duration::days(3),
                base + chrono::Duration::days(2),
                base + chrono::Duration::days(1),
            ]
        );

        let all = f.service.list_appointments().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].appointment_date, base + chrono::Duration::days(3));
    }

    #[tokio::test]
    async fn date_range_listing_validates_bounds() {
        let f = fixture().await;
        let base = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();

        let result = f
            .service
            .list_appointments_by_date_range(base, base - chrono::Duration::days(1))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let mut command = schedule_command(f.patient_id);
        command.appointment_date = base;
        f.service.schedule_appointment(command).await.unwrap();

        let hits = f
            .service
            .list_appointments_by_date_range(base, base)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
