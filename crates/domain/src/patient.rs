//! Patient (pet) aggregate.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use common::{Clock, OwnerId, PatientId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MAX_WEIGHT_KG: i64 = 500;

/// Species accepted by the clinic. Closed set: anything else is rejected
/// at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    /// Parses a species from free-form input, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dog" => Ok(Species::Dog),
            "cat" => Ok(Species::Cat),
            _ => Err(DomainError::validation(format!(
                "Invalid species: {value}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "DOG",
            Species::Cat => "CAT",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A veterinary patient.
///
/// Invariants:
/// - `name`: required, 1..=100 chars
/// - `species`: required, one of [`Species`]
/// - `breed`: optional, <=50 chars, blank normalized to absent
/// - `birth_date`: required, not in the future
/// - `weight`: optional, positive, <=500 kg
/// - `owner_id`: always present (type-enforced)
///
/// `active` is a soft-delete flag; `deactivate`/`activate` reject no-op
/// transitions rather than silently accepting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: Option<PatientId>,
    name: String,
    species: Species,
    breed: Option<String>,
    birth_date: NaiveDate,
    weight: Option<Decimal>,
    active: bool,
    owner_id: OwnerId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Patient {
    /// Registers a new patient, active by default.
    pub fn create(
        name: &str,
        species: &str,
        breed: Option<&str>,
        birth_date: NaiveDate,
        weight: Option<Decimal>,
        owner_id: OwnerId,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let now = clock.now();
        Ok(Self {
            id: None,
            name: validate_name(name)?,
            species: Species::parse(species)?,
            breed: validate_breed(breed)?,
            birth_date: validate_birth_date(birth_date, clock)?,
            weight: weight.map(validate_weight).transpose()?,
            active: true,
            owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Renames the patient.
    pub fn rename(&mut self, new_name: &str, clock: &dyn Clock) -> Result<(), DomainError> {
        self.name = validate_name(new_name)?;
        self.touch(clock);
        Ok(())
    }

    /// Re-validates species, breed, birth date and owner together.
    ///
    /// All four are checked before any field is written, so a failed update
    /// leaves the profile untouched.
    pub fn update_profile(
        &mut self,
        species: &str,
        breed: Option<&str>,
        birth_date: NaiveDate,
        owner_id: OwnerId,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let species = Species::parse(species)?;
        let breed = validate_breed(breed)?;
        let birth_date = validate_birth_date(birth_date, clock)?;

        self.species = species;
        self.breed = breed;
        self.birth_date = birth_date;
        self.owner_id = owner_id;
        self.touch(clock);
        Ok(())
    }

    /// Records a new weight measurement.
    pub fn update_weight(&mut self, weight: Decimal, clock: &dyn Clock) -> Result<(), DomainError> {
        self.weight = Some(validate_weight(weight)?);
        self.touch(clock);
        Ok(())
    }

    /// Soft-deletes the patient. Fails if already inactive.
    pub fn deactivate(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.active {
            return Err(DomainError::state_conflict("Patient is already deactivated"));
        }
        self.active = false;
        self.touch(clock);
        Ok(())
    }

    /// Restores a soft-deleted patient. Fails if already active.
    pub fn activate(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.active {
            return Err(DomainError::state_conflict("Patient is already active"));
        }
        self.active = true;
        self.touch(clock);
        Ok(())
    }

    /// Age in whole years as of the clock's current date.
    pub fn age_in_years(&self, clock: &dyn Clock) -> i32 {
        let today = clock.today();
        let mut years = today.year() - self.birth_date.year();
        if today.ordinal() < self.birth_date.ordinal() {
            years -= 1;
        }
        years
    }

    /// Sets the surrogate id. Called by the repository when the aggregate
    /// is first persisted.
    pub fn assign_id(&mut self, id: PatientId) {
        self.id = Some(id);
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now();
    }
}

// Accessors
impl Patient {
    pub fn id(&self) -> Option<PatientId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn breed(&self) -> Option<&str> {
        self.breed.as_deref()
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let n = name.trim();
    if n.is_empty() {
        return Err(DomainError::validation("Patient name cannot be empty"));
    }
    if n.chars().count() > 100 {
        return Err(DomainError::validation(
            "Patient name cannot exceed 100 characters",
        ));
    }
    Ok(n.to_string())
}

fn validate_breed(breed: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(b) = breed.map(str::trim).filter(|b| !b.is_empty()) else {
        return Ok(None);
    };
    if b.chars().count() > 50 {
        return Err(DomainError::validation("Breed cannot exceed 50 characters"));
    }
    Ok(Some(b.to_string()))
}

fn validate_birth_date(birth_date: NaiveDate, clock: &dyn Clock) -> Result<NaiveDate, DomainError> {
    if birth_date > clock.today() {
        return Err(DomainError::validation(
            "Patient birth date cannot be in the future",
        ));
    }
    Ok(birth_date)
}

fn validate_weight(weight: Decimal) -> Result<Decimal, DomainError> {
    if weight <= Decimal::ZERO {
        return Err(DomainError::validation("Patient weight must be positive"));
    }
    if weight > Decimal::from(MAX_WEIGHT_KG) {
        return Err(DomainError::validation(
            "Patient weight cannot exceed 500 kg",
        ));
    }
    Ok(weight)
}
