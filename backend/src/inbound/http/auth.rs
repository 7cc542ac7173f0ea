//! Authentication handlers.
//!
//! ```text
//! POST /api/auth/login {"email":"anna@example.com","password":"secret1"}
//! POST /api/auth/register {"name":"Anna","email":"anna@example.com","password":"secret1","acceptTerms":true}
//! POST /api/auth/logout
//! GET  /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    AuthSession, Error, LoginCredentials, Registration, RegistrationInput, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access::current_user;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{login_validation_error, registration_validation_error};

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "anna@example.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Self-registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// `client` (default) or `master`.
    pub role: Option<String>,
    #[serde(default)]
    pub accept_terms: bool,
}

/// Authenticated user, landing page and session deadline.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    #[schema(example = "/dashboard")]
    pub redirect_to: String,
    pub expires_at: DateTime<Utc>,
}

fn auth_response(state: &HttpState, user: &User, auth: &AuthSession) -> AuthResponse {
    AuthResponse {
        user: UserResponse::from(user),
        redirect_to: state
            .session
            .destinations
            .destination_for(user.role())
            .to_owned(),
        expires_at: auth.expires_at(),
    }
}

fn start_session(
    state: &HttpState,
    session: &SessionContext,
    user: &User,
) -> ApiResult<AuthResponse> {
    let auth = AuthSession::issue(user, state.session.clock.utc(), state.session.ttl);
    session.persist(&auth)?;
    info!(user_id = %user.id(), role = %user.role(), "session started");
    Ok(auth_response(state, user, &auth))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account blocked", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(|err| login_validation_error(&err))?;
    let user = state.login.authenticate(&credentials).await?;
    start_session(&state, &session, &user).map(web::Json)
}

/// Create a client or master account and log it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let registration = Registration::try_from_input(RegistrationInput {
        name: &request.name,
        email: &request.email,
        password: &request.password,
        role: request.role.as_deref(),
        accept_terms: request.accept_terms,
    })
    .map_err(|err| registration_validation_error(&err))?;
    let user = state.registration.register(registration).await?;
    let body = start_session(&state, &session, &user)?;
    Ok(HttpResponse::Created().json(body))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Current user and session deadline.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session", body = AuthResponse),
        (status = 401, description = "No live session", body = Error),
        (status = 403, description = "Account blocked", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentSession"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AuthResponse>> {
    let auth = session.require(state.session.clock.utc())?;
    let user = current_user(&state, &session).await?;
    Ok(web::Json(auth_response(&state, &user, &auth)))
}

#[cfg(test)]
mod tests;
