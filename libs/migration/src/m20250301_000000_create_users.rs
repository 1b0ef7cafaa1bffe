use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_uuid(Users::Id))
                    .col(string_len_uniq(Users::Nickname, 50))
                    // stored lowercased by the service
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::Role, 20).default("anonymous"))
                    .col(string_len_null(Users::FirstName, 50))
                    .col(string_len_null(Users::LastName, 50))
                    .col(text_null(Users::Bio))
                    .col(string_null(Users::ProfilePictureUrl))
                    .col(string_null(Users::LinkedinProfileUrl))
                    .col(string_null(Users::GithubProfileUrl))
                    .col(boolean(Users::IsProfessional).default(false))
                    .col(timestamp_with_time_zone_null(
                        Users::ProfessionalStatusUpdatedAt,
                    ))
                    .col(boolean(Users::EmailVerified).default(false))
                    .col(string_null(Users::VerificationToken))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Users::Role).is_in([
                        "admin",
                        "manager",
                        "authenticated",
                        "anonymous",
                    ]))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_created_at")
                    .table(Users::Table)
                    .col(Users::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Nickname,
    Email,
    PasswordHash,
    Role,
    FirstName,
    LastName,
    Bio,
    ProfilePictureUrl,
    LinkedinProfileUrl,
    GithubProfileUrl,
    IsProfessional,
    ProfessionalStatusUpdatedAt,
    EmailVerified,
    VerificationToken,
    CreatedAt,
    UpdatedAt,
}
