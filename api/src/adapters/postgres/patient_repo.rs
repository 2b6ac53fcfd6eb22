//! PostgreSQL adapter for PatientRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::entities::{NewPatient, Patient, PatientId};
use crate::domain::ports::PatientRepository;
use crate::entity::patients;
use crate::error::DomainError;

/// PostgreSQL implementation of PatientRepository
pub struct PostgresPatientRepository {
    db: DatabaseConnection,
}

impl PostgresPatientRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PatientRepository for PostgresPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, DomainError> {
        let result = patients::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DomainError> {
        let result = patients::Entity::find()
            .filter(patients::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_ids(&self, ids: &[PatientId]) -> Result<Vec<Patient>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = patients::Entity::find()
            .filter(patients::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .order_by_asc(patients::Column::LastName)
            .order_by_asc(patients::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, patient: &NewPatient) -> Result<Patient, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = patients::ActiveModel {
            id: Set(patient.id.0),
            email: Set(patient.email.trim().to_lowercase()),
            first_name: Set(patient.first_name.clone()),
            last_name: Set(patient.last_name.clone()),
            fiscal_code: Set(patient.fiscal_code.as_ref().map(|c| c.to_uppercase())),
            date_of_birth: Set(patient.date_of_birth),
            phone: Set(patient.phone.clone()),
            created_at: Set(Some(now)),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.into())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        patients::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Convert SeaORM model to domain entity
impl From<patients::Model> for Patient {
    fn from(model: patients::Model) -> Self {
        Patient {
            id: PatientId(model.id),
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            fiscal_code: model.fiscal_code,
            date_of_birth: model.date_of_birth,
            phone: model.phone,
            created_at: model
                .created_at
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}
