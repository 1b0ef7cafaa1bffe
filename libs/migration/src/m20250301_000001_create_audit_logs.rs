use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250301_000000_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only. actor_id has no FK: the bootstrap actor is the nil UUID.
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(pk_uuid(AuditLogs::Id))
                    .col(uuid(AuditLogs::ActorId))
                    .col(uuid(AuditLogs::TargetId))
                    .col(string_len(AuditLogs::Field, 32))
                    .col(string(AuditLogs::OldValue))
                    .col(string(AuditLogs::NewValue))
                    .col(
                        timestamp_with_time_zone(AuditLogs::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audit_logs_target")
                            .from(AuditLogs::Table, AuditLogs::TargetId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .check(Expr::col(AuditLogs::Field).is_in(["role", "professional_status"]))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_target_created")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::TargetId)
                    .col(AuditLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    ActorId,
    TargetId,
    Field,
    OldValue,
    NewValue,
    CreatedAt,
}
