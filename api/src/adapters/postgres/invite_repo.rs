//! PostgreSQL adapter for InviteRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::domain::entities::{
    DoctorId, Invite, InviteId, InviteSide, InviteStatus, NewInvite, PatientId, DUPLICATE_INVITE,
};
use crate::domain::ports::InviteRepository;
use crate::entity::invites;
use crate::error::DomainError;

/// PostgreSQL implementation of InviteRepository
pub struct PostgresInviteRepository {
    db: DatabaseConnection,
}

impl PostgresInviteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn open_statuses() -> Vec<String> {
    vec![
        InviteStatus::Pending.to_string(),
        InviteStatus::Accepted.to_string(),
    ]
}

/// The open-pair unique index rejects a second open invite that slipped
/// past the service's check
fn insert_error(err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict(DUPLICATE_INVITE.to_string())
        }
        _ => DomainError::Database(err.to_string()),
    }
}

#[async_trait]
impl InviteRepository for PostgresInviteRepository {
    async fn create(&self, invite: &NewInvite) -> Result<Invite, DomainError> {
        let now = Utc::now().fixed_offset();

        let model = invites::ActiveModel {
            id: Set(Uuid::new_v4()),
            doctor_id: Set(invite.doctor_id.0),
            patient_id: Set(invite.patient_id.0),
            initiated_by: Set(invite.initiated_by.to_string()),
            status: Set(InviteStatus::Pending.to_string()),
            message: Set(invite.message.clone()),
            created_at: Set(Some(now)),
            responded_at: Set(None),
        };

        let result = model.insert(&self.db).await.map_err(insert_error)?;

        Ok(result.into())
    }

    async fn find_by_id(&self, id: &InviteId) -> Result<Option<Invite>, DomainError> {
        let result = invites::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_open(
        &self,
        doctor_id: &DoctorId,
        patient_id: &PatientId,
    ) -> Result<Option<Invite>, DomainError> {
        let result = invites::Entity::find()
            .filter(invites::Column::DoctorId.eq(doctor_id.0))
            .filter(invites::Column::PatientId.eq(patient_id.0))
            .filter(invites::Column::Status.is_in(open_statuses()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>, DomainError> {
        let mut query = invites::Entity::find().filter(invites::Column::DoctorId.eq(doctor_id.0));
        if let Some(status) = status {
            query = query.filter(invites::Column::Status.eq(status.to_string()));
        }

        let results = query
            .order_by_desc(invites::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>, DomainError> {
        let mut query =
            invites::Entity::find().filter(invites::Column::PatientId.eq(patient_id.0));
        if let Some(status) = status {
            query = query.filter(invites::Column::Status.eq(status.to_string()));
        }

        let results = query
            .order_by_desc(invites::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn resolve(&self, id: &InviteId, status: InviteStatus) -> Result<Invite, DomainError> {
        let now = Utc::now().fixed_offset();

        // Conditional update: only a pending row changes
        let result = invites::Entity::update_many()
            .col_expr(invites::Column::Status, Expr::value(status.to_string()))
            .col_expr(invites::Column::RespondedAt, Expr::value(now))
            .filter(invites::Column::Id.eq(id.0))
            .filter(invites::Column::Status.eq(InviteStatus::Pending.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let invite = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Invito non trovato".to_string()))?;

        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!(
                "L'invito è già stato gestito (stato: {})",
                invite.status
            )));
        }

        Ok(invite)
    }

    async fn count_by_status(&self, status: InviteStatus) -> Result<u64, DomainError> {
        invites::Entity::find()
            .filter(invites::Column::Status.eq(status.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Convert SeaORM model to domain entity
impl From<invites::Model> for Invite {
    fn from(model: invites::Model) -> Self {
        Invite {
            id: InviteId(model.id),
            doctor_id: DoctorId(model.doctor_id),
            patient_id: PatientId(model.patient_id),
            initiated_by: model.initiated_by.parse().unwrap_or(InviteSide::Patient),
            status: model.status.parse().unwrap_or(InviteStatus::Pending),
            message: model.message,
            created_at: model
                .created_at
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
            responded_at: model.responded_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
