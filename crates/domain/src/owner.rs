//! Pet owner aggregate.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use common::{Clock, OwnerId};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern")
});
static PHONE_ALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+0-9()\s-]+$").expect("phone pattern"));

/// A pet owner.
///
/// Invariants:
/// - `name`: required, 1..=100 chars (fixed at creation)
/// - `phone`: required, only `+`, digits, spaces, parentheses and hyphens;
///   10..=20 digits once separators are stripped
/// - `email`: required, simple address format
/// - `address`: required, 1..=500 chars
///
/// All fields are validated by the factory and re-validated by the
/// corresponding mutator, which also refreshes `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    id: Option<OwnerId>,
    name: String,
    phone: String,
    email: String,
    address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Owner {
    /// Creates a new owner, validating every business field.
    ///
    /// Stamps `created_at` and `updated_at` with the same instant from the
    /// injected clock.
    pub fn create(
        name: &str,
        phone: &str,
        email: &str,
        address: &str,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let now = clock.now();
        Ok(Self {
            id: None,
            name: validate_name(name)?,
            phone: validate_phone(phone)?,
            email: validate_email(email)?,
            address: validate_address(address)?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces the email after re-validating it.
    pub fn change_email(&mut self, new_email: &str, clock: &dyn Clock) -> Result<(), DomainError> {
        self.email = validate_email(new_email)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the phone number after re-validating it.
    pub fn change_phone(&mut self, new_phone: &str, clock: &dyn Clock) -> Result<(), DomainError> {
        self.phone = validate_phone(new_phone)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the address after re-validating it.
    pub fn update_address(
        &mut self,
        new_address: &str,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.address = validate_address(new_address)?;
        self.touch(clock);
        Ok(())
    }

    /// Sets the surrogate id. Called by the repository when the aggregate
    /// is first persisted.
    pub fn assign_id(&mut self, id: OwnerId) {
        self.id = Some(id);
    }

    fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = clock.now();
    }
}

// Accessors
impl Owner {
    pub fn id(&self) -> Option<OwnerId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn address(&self) -> &str {
        &self.address
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
        return Err(DomainError::validation("Owner name cannot be empty"));
    }
    if n.chars().count() > 100 {
        return Err(DomainError::validation(
            "Owner name cannot exceed 100 characters",
        ));
    }
    Ok(n.to_string())
}

fn validate_email(email: &str) -> Result<String, DomainError> {
    let e = email.trim();
    if e.is_empty() {
        return Err(DomainError::validation("Owner email cannot be empty"));
    }
    if !EMAIL_PATTERN.is_match(e) {
        return Err(DomainError::validation("Invalid owner email format"));
    }
    Ok(e.to_string())
}

fn validate_phone(phone: &str) -> Result<String, DomainError> {
    let p = phone.trim();
    if p.is_empty() {
        return Err(DomainError::validation("Owner phone cannot be empty"));
    }
    if !PHONE_ALLOWED_CHARS.is_match(p) {
        return Err(DomainError::validation("Invalid owner phone characters"));
    }
    let digits = p.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=20).contains(&digits) {
        return Err(DomainError::validation(
            "Owner phone must contain between 10 and 20 digits",
        ));
    }
    Ok(p.to_string())
}

fn validate_address(address: &str) -> Result<String, DomainError> {
    let a = address.trim();
    if a.is_empty() {
        return Err(DomainError::validation("Owner address cannot be empty"));
    }
    if a.chars().count() > 500 {
        return Err(DomainError::validation(
            "Owner address cannot exceed 500 characters",
        ));
    }
    Ok(a.to_string())
}
