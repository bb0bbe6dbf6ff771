//! Veterinarian read-only use cases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::VeterinarianId;
use domain::Veterinarian;
use serde::Serialize;
use store::VeterinarianRepository;

use crate::error::AppError;

/// Read-only projection of a veterinarian.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VeterinarianResult {
    pub id: VeterinarianId,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl VeterinarianResult {
    fn from_veterinarian(veterinarian: &Veterinarian) -> Self {
        Self {
            id: veterinarian.id(),
            username: veterinarian.username().to_string(),
            email: veterinarian.email().to_string(),
            active: veterinarian.is_active(),
            created_at: veterinarian.created_at(),
            last_login: veterinarian.last_login(),
        }
    }
}

/// Read-only service over the externally managed veterinarian records.
///
/// Nothing here mutates or audits — veterinarians are owned by the
/// credential system.
pub struct VeterinarianService {
    veterinarians: Arc<dyn VeterinarianRepository>,
}

impl VeterinarianService {
    pub fn new(veterinarians: Arc<dyn VeterinarianRepository>) -> Self {
        Self { veterinarians }
    }

    /// Lists veterinarians, active-only by default.
    #[tracing::instrument(skip(self))]
    pub async fn list_veterinarians(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<VeterinarianResult>, AppError> {
        let veterinarians = if include_inactive {
            self.veterinarians.find_all().await?
        } else {
            self.veterinarians.find_all_active().await?
        };
        Ok(veterinarians
            .iter()
            .map(VeterinarianResult::from_veterinarian)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_veterinarian(
        &self,
        id: VeterinarianId,
    ) -> Result<VeterinarianResult, AppError> {
        let veterinarian = self
            .veterinarians
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Veterinarian", id.as_i64()))?;
        Ok(VeterinarianResult::from_veterinarian(&veterinarian))
    }

    /// Whether the id resolves to an active veterinarian.
    #[tracing::instrument(skip(self))]
    pub async fn is_active_veterinarian(&self, id: VeterinarianId) -> Result<bool, AppError> {
        Ok(self.veterinarians.is_active(id).await?)
    }
}
