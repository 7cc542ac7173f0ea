//! Administrator user management.
//!
//! ```text
//! GET    /api/users
//! POST   /api/users {"name":"Igor","email":"igor@example.com","role":"master"}
//! PUT    /api/users/{id} {"name":"Igor P."}
//! DELETE /api/users/{id}
//! PATCH  /api/users/{id}/block
//! PATCH  /api/users/{id}/role {"role":"verified_master"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::CreateUserRequest;
use crate::domain::{Email, Error, Password, Role, UserDraft, UserId, UserName, UserPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::require_admin;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_user_id, password_policy_error, require, user_validation_error,
};

/// Body of `POST /api/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    #[schema(example = "client")]
    pub role: Option<String>,
    /// Omit to create an account that cannot log in yet.
    pub password: Option<String>,
}

/// Body of `PUT /api/users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Body of `PATCH /api/users/{id}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleBody {
    pub role: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse().map_err(|err| user_validation_error(&err))
}

fn path_id(raw: &str) -> Result<UserId, Error> {
    parse_user_id(raw, FieldName::new("id"))
}

impl TryFrom<CreateUserBody> for CreateUserRequest {
    type Error = Error;

    fn try_from(body: CreateUserBody) -> Result<Self, Self::Error> {
        let name = require(body.name, FieldName::new("name"))?;
        let email = require(body.email, FieldName::new("email"))?;
        let role = require(body.role, FieldName::new("role"))?;
        let draft = UserDraft {
            name: UserName::new(name).map_err(|err| user_validation_error(&err))?,
            email: Email::new(email).map_err(|err| user_validation_error(&err))?,
            role: parse_role(&role)?,
        };
        let password = body
            .password
            .map(|raw| Password::new(&raw).map_err(|err| password_policy_error(&err)))
            .transpose()?;
        Ok(Self { draft, password })
    }
}

impl TryFrom<UpdateUserBody> for UserPatch {
    type Error = Error;

    fn try_from(body: UpdateUserBody) -> Result<Self, Self::Error> {
        Ok(Self {
            name: body
                .name
                .map(UserName::new)
                .transpose()
                .map_err(|err| user_validation_error(&err))?,
            email: body
                .email
                .map(Email::new)
                .transpose()
                .map_err(|err| user_validation_error(&err))?,
            role: body.role.as_deref().map(parse_role).transpose()?,
        })
    }
}

/// List every user, oldest first.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    require_admin(&state, &session).await?;
    let users = state.users.list_users().await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Create an active user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserBody,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let request = CreateUserRequest::try_from(payload.into_inner())?;
    let user = state.users_command.create_user(request).await?;
    info!(admin_id = %admin.id(), user_id = %user.id(), "user created");
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Update name, email or role.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<UserResponse>> {
    require_admin(&state, &session).await?;
    let id = path_id(&path)?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let user = state.users_command.update_user(&id, patch).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Delete a user and return the removed record.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted", body = UserResponse),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    let admin = require_admin(&state, &session).await?;
    let id = path_id(&path)?;
    let user = state.users_command.delete_user(&id).await?;
    info!(admin_id = %admin.id(), user_id = %user.id(), "user deleted");
    Ok(web::Json(UserResponse::from(&user)))
}

/// Flip the active flag.
#[utoipa::path(
    patch,
    path = "/api/users/{id}/block",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Toggled", body = UserResponse),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "toggleUserBlock"
)]
#[patch("/users/{id}/block")]
pub async fn toggle_block(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    require_admin(&state, &session).await?;
    let id = path_id(&path)?;
    let user = state.users_command.toggle_active(&id).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Change the role; master roles get a default profile.
#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangeRoleBody,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "changeUserRole"
)]
#[patch("/users/{id}/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ChangeRoleBody>,
) -> ApiResult<web::Json<UserResponse>> {
    require_admin(&state, &session).await?;
    let id = path_id(&path)?;
    let role = require(payload.into_inner().role, FieldName::new("role"))?;
    let user = state
        .users_command
        .change_role(&id, parse_role(&role)?)
        .await?;
    Ok(web::Json(UserResponse::from(&user)))
}
