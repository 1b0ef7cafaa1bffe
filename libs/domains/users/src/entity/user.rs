use crate::models::Role;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

/// Sea-ORM Entity for the users table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub nickname: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub is_professional: bool,
    pub professional_status_updated_at: Option<DateTimeWithTimeZone>,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            nickname: model.nickname,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            profile_picture_url: model.profile_picture_url,
            linkedin_profile_url: model.linkedin_profile_url,
            github_profile_url: model.github_profile_url,
            is_professional: model.is_professional,
            professional_status_updated_at: model.professional_status_updated_at.map(Into::into),
            email_verified: model.email_verified,
            verification_token: model.verification_token,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Every column set; used for inserts only
impl From<crate::models::User> for ActiveModel {
    fn from(user: crate::models::User) -> Self {
        ActiveModel {
            id: Set(user.id),
            nickname: Set(user.nickname),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            bio: Set(user.bio),
            profile_picture_url: Set(user.profile_picture_url),
            linkedin_profile_url: Set(user.linkedin_profile_url),
            github_profile_url: Set(user.github_profile_url),
            is_professional: Set(user.is_professional),
            professional_status_updated_at: Set(user.professional_status_updated_at.map(Into::into)),
            email_verified: Set(user.email_verified),
            verification_token: Set(user.verification_token),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
    }
}
