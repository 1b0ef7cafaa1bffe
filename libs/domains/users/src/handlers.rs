use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, header::HOST, request::Parts},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    JwtAuth, JwtClaims, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::access::Principal;
use crate::audit::{AuditField, AuditLogEntry};
use crate::entity::TAG;
use crate::error::{ErrorBody, ErrorDetail, UserError, UserResult};
use crate::models::{
    ChangeRole, CreateUser, Link, RegisterUser, Role, UpdateProfile, UserFilter, UserList,
    UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        verify_email,
        current_user,
        list_users,
        create_user,
        get_user,
        update_profile,
        upgrade_professional_status,
        change_role,
        audit_log,
    ),
    components(
        schemas(
            UserResponse,
            Link,
            UserList,
            RegisterUser,
            CreateUser,
            UpdateProfile,
            ChangeRole,
            Role,
            UserFilter,
            AuditLogEntry,
            AuditField,
            ErrorBody,
            ErrorDetail
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Accounts, roles and professional status")
    )
)]
pub struct ApiDoc;

/// The caller, from the claims placed by [`jwt_auth_middleware`]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or(UserError::Unauthorized)?;
        Principal::try_from(claims)
    }
}

/// Where the application mounts [`router`]
pub const BASE_PATH: &str = "/api/users";

/// Root of the users API as the client addressed it, e.g.
/// `https://users.example.com/api/users`. Relative without a `Host` header.
struct UsersBase(String);

impl<S> FromRequestParts<S> for UsersBase
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()));

        let base = match host {
            Some(host) => {
                let scheme = parts
                    .headers
                    .get("x-forwarded-proto")
                    .and_then(|v| v.to_str().ok())
                    .or(parts.uri.scheme_str())
                    .unwrap_or("http");
                format!("{scheme}://{host}{BASE_PATH}")
            }
            None => BASE_PATH.to_string(),
        };

        Ok(Self(base))
    }
}

/// Create the users router with all HTTP endpoints.
///
/// `register` and `verify-email` are public; everything else requires a
/// bearer token verified by `auth`.
pub fn router<R: UserRepository + 'static>(service: UserService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let public = Router::new()
        .route("/register", post(register))
        .route("/{user_id}/verify-email/{token}", get(verify_email))
        .with_state(shared_service.clone());

    let protected = Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(current_user))
        .route("/{user_id}", get(get_user))
        .route("/{user_id}/profile", put(update_profile))
        .route(
            "/{user_id}/professional-status",
            post(upgrade_professional_status),
        )
        .route("/{user_id}/role", put(change_role))
        .route("/{user_id}/audit-log", get(audit_log))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware))
        .with_state(shared_service);

    public.merge(protected)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created; verification email sent", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, description = "Email or nickname taken", body = ErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    ValidatedJson(input): ValidatedJson<RegisterUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(user.with_links(&base))))
}

/// Confirm an email address
#[utoipa::path(
    get,
    path = "/{user_id}/verify-email/{token}",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("token" = String, Path, description = "Token from the verification email")
    ),
    responses(
        (status = 200, description = "Email verified", body = UserResponse),
        (status = 400, description = "Invalid token or already verified", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn verify_email<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    Path((user_id, token)): Path<(Uuid, String)>,
) -> UserResult<Json<UserResponse>> {
    let user = service.verify_email(user_id, &token).await?;
    Ok(Json(user.with_links(&base)))
}

/// The caller's own account
#[utoipa::path(
    get,
    path = "/me",
    tag = TAG,
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn current_user<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
) -> UserResult<Json<UserResponse>> {
    let user = service.current_user(&actor).await?;
    Ok(Json(user.with_links(&base)))
}

/// List users with optional filters (staff only)
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users", body = UserList),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not staff", body = ErrorBody)
    )
)]
async fn list_users<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<UserList>> {
    let filter = filter.normalized();
    let limit = filter.limit;
    let offset = filter.offset;
    let (users, total) = service.list_users(&actor, filter).await?;

    Ok(Json(UserList {
        data: users.into_iter().map(|u| u.with_links(&base)).collect(),
        total,
        limit,
        offset,
    }))
}

/// Create a verified account (staff only)
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not staff, or staff role requested by a non-admin", body = ErrorBody),
        (status = 409, description = "Email or nickname taken", body = ErrorBody)
    )
)]
async fn create_user<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(user.with_links(&base))))
}

/// Get a user by ID (self or staff)
#[utoipa::path(
    get,
    path = "/{user_id}",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not self and not staff", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn get_user<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_user(&actor, id).await?;
    Ok(Json(user.with_links(&base)))
}

/// Update one's own profile
#[utoipa::path(
    put,
    path = "/{user_id}/profile",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not the profile owner", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn update_profile<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_profile(&actor, id, input).await?;
    Ok(Json(user.with_links(&base)))
}

/// Grant professional status (staff only)
///
/// Idempotent: granting it again returns the unchanged record.
#[utoipa::path(
    post,
    path = "/{user_id}/professional-status",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User is professional", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 503, description = "Audit storage unavailable; nothing changed", body = ErrorBody)
    )
)]
async fn upgrade_professional_status<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = service.upgrade_professional_status(&actor, id).await?;
    Ok(Json(user.with_links(&base)))
}

/// Assign a role (admin only, not on oneself)
#[utoipa::path(
    put,
    path = "/{user_id}/role",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = ChangeRole,
    responses(
        (status = 200, description = "Role assigned", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not admin, or own account", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn change_role<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    UsersBase(base): UsersBase,
    actor: Principal,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ChangeRole>,
) -> UserResult<Json<UserResponse>> {
    let user = service.change_role(&actor, id, input.role).await?;
    Ok(Json(user.with_links(&base)))
}

/// Role and professional-status history of a user (staff only)
#[utoipa::path(
    get,
    path = "/{user_id}/audit-log",
    tag = TAG,
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Entries, oldest first", body = Vec<AuditLogEntry>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, description = "Not staff", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
async fn audit_log<R: UserRepository + 'static>(
    State(service): State<Arc<UserService<R>>>,
    actor: Principal,
    UuidPath(id): UuidPath,
) -> UserResult<Json<Vec<AuditLogEntry>>> {
    let entries = service.audit_log(&actor, id).await?;
    Ok(Json(entries))
}
