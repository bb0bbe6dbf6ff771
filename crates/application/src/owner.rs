//! Owner use cases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{Clock, OwnerId};
use domain::Owner;
use serde::Serialize;
use store::OwnerRepository;

use audit::AuditTrail;

use crate::error::AppError;
use crate::persisted_id;

const OWNERS_TABLE: &str = "owners";

/// Command to create an owner.
#[derive(Debug, Clone)]
pub struct CreateOwner {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// Command to update an owner. Absent fields are left unchanged.
#[derive(Debug, Clone)]
pub struct UpdateOwner {
    pub owner_id: OwnerId,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Read-only projection of a persisted owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerResult {
    pub id: OwnerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnerResult {
    fn from_owner(owner: &Owner) -> Result<Self, AppError> {
        Ok(Self {
            id: persisted_id(owner.id(), "owner")?,
            name: owner.name().to_string(),
            phone: owner.phone().to_string(),
            email: owner.email().to_string(),
            address: owner.address().to_string(),
            created_at: owner.created_at(),
            updated_at: owner.updated_at(),
        })
    }
}

/// Orchestrates owner aggregate operations.
pub struct OwnerService {
    owners: Arc<dyn OwnerRepository>,
    audit: Arc<AuditTrail>,
    clock: Arc<dyn Clock>,
}

impl OwnerService {
    pub fn new(
        owners: Arc<dyn OwnerRepository>,
        audit: Arc<AuditTrail>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            owners,
            audit,
            clock,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_owner(&self, command: CreateOwner) -> Result<OwnerResult, AppError> {
        let owner = Owner::create(
            &command.name,
            &command.phone,
            &command.email,
            &command.address,
            self.clock.as_ref(),
        )?;

        let saved = self.owners.save(owner).await?;
        let id = persisted_id(saved.id(), "owner")?;
        self.audit
            .record_creation(OWNERS_TABLE, id.as_i64(), &saved)
            .await;
        OwnerResult::from_owner(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_owner(&self, command: UpdateOwner) -> Result<OwnerResult, AppError> {
        let mut owner = self.load_owner(command.owner_id).await?;
        let before = self.audit.snapshot(&owner);

        if let Some(email) = &command.email {
            owner.change_email(email, self.clock.as_ref())?;
        }
        if let Some(phone) = &command.phone {
            owner.change_phone(phone, self.clock.as_ref())?;
        }
        if let Some(address) = &command.address {
            owner.update_address(address, self.clock.as_ref())?;
        }

        let saved = self.owners.save(owner).await?;
        let id = persisted_id(saved.id(), "owner")?;
        self.audit
            .record_update(OWNERS_TABLE, id.as_i64(), before, &saved)
            .await;
        OwnerResult::from_owner(&saved)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_owner(&self, owner_id: OwnerId) -> Result<OwnerResult, AppError> {
        let owner = self.load_owner(owner_id).await?;
        OwnerResult::from_owner(&owner)
    }

    async fn load_owner(&self, id: OwnerId) -> Result<Owner, AppError> {
        self.owners
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Owner", id.as_i64()))
    }
}
