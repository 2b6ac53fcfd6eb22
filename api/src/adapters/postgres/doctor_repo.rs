//! PostgreSQL adapter for DoctorRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::domain::entities::{ApprovalStatus, Doctor, DoctorId, DoctorSearch, NewDoctor};
use crate::domain::ports::DoctorRepository;
use crate::entity::doctors;
use crate::error::DomainError;

use super::like_pattern;

/// PostgreSQL implementation of DoctorRepository
pub struct PostgresDoctorRepository {
    db: DatabaseConnection,
}

impl PostgresDoctorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DoctorRepository for PostgresDoctorRepository {
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DomainError> {
        let result = doctors::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DomainError> {
        let result = doctors::Entity::find()
            .filter(doctors::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_ids(&self, ids: &[DoctorId]) -> Result<Vec<Doctor>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = doctors::Entity::find()
            .filter(doctors::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .order_by_asc(doctors::Column::LastName)
            .order_by_asc(doctors::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, doctor: &NewDoctor) -> Result<Doctor, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = doctors::ActiveModel {
            id: Set(doctor.id.0),
            email: Set(doctor.email.trim().to_lowercase()),
            first_name: Set(doctor.first_name.clone()),
            last_name: Set(doctor.last_name.clone()),
            specialization: Set(doctor.specialization.clone()),
            license_number: Set(doctor.license_number.clone()),
            phone: Set(doctor.phone.clone()),
            status: Set(ApprovalStatus::Pending.to_string()),
            rejection_reason: Set(None),
            created_at: Set(Some(now)),
            reviewed_at: Set(None),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn list_by_status(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Doctor>, DomainError> {
        let mut query = doctors::Entity::find();
        if let Some(status) = status {
            query = query.filter(doctors::Column::Status.eq(status.to_string()));
        }

        let results = query
            .order_by_desc(doctors::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn search_approved(&self, search: &DoctorSearch) -> Result<Vec<Doctor>, DomainError> {
        let mut query = doctors::Entity::find()
            .filter(doctors::Column::Status.eq(ApprovalStatus::Approved.to_string()));

        if let Some(term) = search.search.as_deref().map(like_pattern) {
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(doctors::Column::FirstName)))
                            .like(term.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(doctors::Column::LastName))).like(term),
                    ),
            );
        }

        if let Some(specialization) = search
            .specialization
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(doctors::Column::Specialization)))
                    .eq(specialization.to_lowercase()),
            );
        }

        let results = query
            .order_by_asc(doctors::Column::LastName)
            .order_by_asc(doctors::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn set_status(
        &self,
        id: &DoctorId,
        status: ApprovalStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Doctor, DomainError> {
        if self.find_by_id(id).await?.is_none() {
            return Err(DomainError::NotFound("Medico non trovato".to_string()));
        }

        let now = Utc::now().fixed_offset();

        let result = doctors::ActiveModel {
            id: Set(id.0),
            status: Set(status.to_string()),
            rejection_reason: Set(rejection_reason.map(str::to_string)),
            reviewed_at: Set(Some(now)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn count_by_status(&self, status: ApprovalStatus) -> Result<u64, DomainError> {
        doctors::Entity::find()
            .filter(doctors::Column::Status.eq(status.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Convert SeaORM model to domain entity
impl From<doctors::Model> for Doctor {
    fn from(model: doctors::Model) -> Self {
        Doctor {
            id: DoctorId(model.id),
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            specialization: model.specialization,
            license_number: model.license_number,
            phone: model.phone,
            status: model.status.parse().unwrap_or(ApprovalStatus::Pending),
            rejection_reason: model.rejection_reason,
            created_at: model
                .created_at
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
            reviewed_at: model.reviewed_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
