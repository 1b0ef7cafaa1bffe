use crate::audit::{AuditField, AuditLogEntry};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the append-only audit_logs table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub field: AuditField,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AuditLogEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            actor_id: model.actor_id,
            target_id: model.target_id,
            field: model.field,
            old_value: model.old_value,
            new_value: model.new_value,
            created_at: model.created_at.into(),
        }
    }
}

impl From<AuditLogEntry> for ActiveModel {
    fn from(entry: AuditLogEntry) -> Self {
        ActiveModel {
            id: Set(entry.id),
            actor_id: Set(entry.actor_id),
            target_id: Set(entry.target_id),
            field: Set(entry.field),
            old_value: Set(entry.old_value),
            new_value: Set(entry.new_value),
            created_at: Set(entry.created_at.into()),
        }
    }
}
