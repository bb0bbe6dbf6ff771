//! Appointment aggregate and its state machine.

use chrono::{DateTime, Utc};
use common::{AppointmentId, Clock, PatientId, VeterinarianId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    Checkup,
    Vaccination,
    Surgery,
    Grooming,
    Emergency,
}

impl AppointmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Checkup => "CHECKUP",
            AppointmentType::Vaccination => "VACCINATION",
            AppointmentType::Surgery => "SURGERY",
            AppointmentType::Grooming => "GROOMING",
            AppointmentType::Emergency => "EMERGENCY",
        }
    }
}

impl std::fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow state of an appointment.
///
/// State transitions:
/// ```text
/// Scheduled ──┬──► Completed
///             ├──► Cancelled
///             └──► NoShow
/// ```
///
/// The three target states are terminal; nothing leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Returns true if no further workflow transitions are possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Triage priority. Orthogonal to the workflow state: it can change in any
/// status, including terminal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl AppointmentPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentPriority::Low => "LOW",
            AppointmentPriority::Normal => "NORMAL",
            AppointmentPriority::High => "HIGH",
            AppointmentPriority::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for AppointmentPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A veterinary appointment.
///
/// Every workflow mutation is guarded on [`AppointmentStatus::Scheduled`];
/// attempting one from a terminal state yields a state conflict with a
/// human-readable reason and leaves the aggregate unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    id: Option<AppointmentId>,
    patient_id: PatientId,
    veterinarian_id: Option<VeterinarianId>,
    appointment_date: DateTime<Utc>,
    appointment_type: AppointmentType,
    status: AppointmentStatus,
    priority: AppointmentPriority,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl Appointment {
    /// Schedules a new appointment.
    ///
    /// Status starts at `Scheduled`; priority defaults to `Normal` when
    /// unspecified; notes are trimmed with blank input treated as absent.
    pub fn schedule(
        patient_id: PatientId,
        veterinarian_id: Option<VeterinarianId>,
        appointment_date: DateTime<Utc>,
        appointment_type: AppointmentType,
        priority: Option<AppointmentPriority>,
        notes: Option<&str>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            id: None,
            patient_id,
            veterinarian_id,
            appointment_date,
            appointment_type,
            status: AppointmentStatus::Scheduled,
            priority: priority.unwrap_or_default(),
            notes: normalize_notes(notes),
            created_at: clock.now(),
        }
    }

    /// Moves the appointment to a new date. Allowed only while scheduled.
    pub fn reschedule(&mut self, new_date: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_scheduled("Only scheduled appointments can be rescheduled")?;
        self.appointment_date = new_date;
        Ok(())
    }

    /// Marks the appointment as completed. Allowed only while scheduled.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.ensure_scheduled("Only scheduled appointments can be completed")?;
        self.status = AppointmentStatus::Completed;
        Ok(())
    }

    /// Cancels the appointment, appending the reason (if any) to the notes.
    /// Allowed only while scheduled.
    pub fn cancel(&mut self, reason: Option<&str>) -> Result<(), DomainError> {
        self.ensure_scheduled("Only scheduled appointments can be cancelled")?;
        self.status = AppointmentStatus::Cancelled;
        self.append_notes(reason);
        Ok(())
    }

    /// Records that the patient did not show up, appending the note (if
    /// any). Allowed only while scheduled.
    pub fn mark_no_show(&mut self, note: Option<&str>) -> Result<(), DomainError> {
        self.ensure_scheduled("Only scheduled appointments can be marked as no-show")?;
        self.status = AppointmentStatus::NoShow;
        self.append_notes(note);
        Ok(())
    }

    /// Assigns a veterinarian. Allowed only while scheduled; does not
    /// change the workflow state.
    pub fn assign_veterinarian(&mut self, veterinarian_id: VeterinarianId) -> Result<(), DomainError> {
        self.ensure_scheduled("Can only assign veterinarian to scheduled appointments")?;
        self.veterinarian_id = Some(veterinarian_id);
        Ok(())
    }

    /// Removes the veterinarian assignment. Allowed only while scheduled.
    pub fn unassign_veterinarian(&mut self) -> Result<(), DomainError> {
        self.ensure_scheduled("Can only unassign veterinarian from scheduled appointments")?;
        self.veterinarian_id = None;
        Ok(())
    }

    /// Changes the priority. Allowed in any state — priority is a
    /// classification, not part of the workflow.
    pub fn change_priority(&mut self, new_priority: AppointmentPriority) {
        self.priority = new_priority;
    }

    /// Appends a line to the notes. Blank or absent input is a no-op.
    pub fn append_notes(&mut self, extra_notes: Option<&str>) {
        let Some(n) = normalize_notes(extra_notes) else {
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
    pub fn assign_id(&mut self, id: AppointmentId) {
        self.id = Some(id);
    }

    fn ensure_scheduled(&self, reason: &'static str) -> Result<(), DomainError> {
        if self.status != AppointmentStatus::Scheduled {
            return Err(DomainError::state_conflict(reason));
        }
        Ok(())
    }
}

// Accessors
impl Appointment {
    pub fn id(&self) -> Option<AppointmentId> {
        self.id
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn veterinarian_id(&self) -> Option<VeterinarianId> {
        self.veterinarian_id
    }

    pub fn appointment_date(&self) -> DateTime<Utc> {
        self.appointment_date
    }

    pub fn appointment_type(&self) -> AppointmentType {
        self.appointment_type
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn priority(&self) -> AppointmentPriority {
        self.priority
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn normalize_notes(text: Option<&str>) -> Option<String> {
    let t = text?.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}
