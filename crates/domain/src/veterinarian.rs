//! Veterinarian read projection.

use chrono::{DateTime, Utc};
use common::VeterinarianId;
use serde::{Deserialize, Serialize};

/// A veterinarian, projected from an externally managed user record.
///
/// This core never mutates veterinarians — the credential system owns
/// them. The projection is consumed when assigning appointments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Veterinarian {
    id: VeterinarianId,
    username: String,
    email: String,
    active: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl Veterinarian {
    /// Builds a projection from externally stored fields.
    pub fn new(
        id: VeterinarianId,
        username: impl Into<String>,
        email: impl Into<String>,
        active: bool,
        created_at: DateTime<Utc>,
        last_login: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            active,
            created_at,
            last_login,
        }
    }

    /// Whether this veterinarian may be assigned to appointments.
    pub fn can_be_assigned(&self) -> bool {
        self.active
    }

    /// Name shown in listings.
    pub fn display_name(&self) -> &str {
        &self.username
    }

    pub fn id(&self) -> VeterinarianId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }
}
