//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"username":"alice","password":"pw"}
//! GET  /api/v1/users/exists?username=alice
//! POST /api/v1/login {"username":"alice","password":"pw"}
//! GET  /api/v1/users/me
//! POST /api/v1/users/me/confirmation
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::commands::{ConfirmUserCommand, RegisterCommand};
use crate::domain::queries::{
    CheckUsernameExistenceQuery, CurrentUser, GetCurrentUserQuery, LoginQuery,
};
use crate::domain::{
    Credentials, CredentialsValidationError, Error, UserValidationError, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::rejections::invalid_field;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{Caller, LoginSession};
use crate::inbound::http::state::HttpState;

/// Body shared by `POST /users` and `POST /login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "correct horse battery staple")]
    pub password: String,
}

impl TryFrom<CredentialsRequest> for Credentials {
    type Error = CredentialsValidationError;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_credentials_error(err: CredentialsValidationError) -> Error {
    match err {
        CredentialsValidationError::Username(inner) => map_username_error(inner),
        CredentialsValidationError::EmptyPassword => {
            invalid_field("password", "empty_password", err)
        }
    }
}

fn map_username_error(err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyUsername => "empty_username",
        UserValidationError::UsernameTooLong { .. } => "username_too_long",
        UserValidationError::UsernameWhitespace => "username_whitespace",
        UserValidationError::InvalidId => "invalid_user_id",
    };
    invalid_field("username", code, err)
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedResponse {
    #[schema(value_type = String, format = Uuid)]
    pub user_id: String,
}

/// Register a new account. The account starts unconfirmed.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered", body = UserCreatedResponse),
        (status = 400, description = "Invalid username or password", body = ErrorSchema),
        (status = 409, description = "Username already taken", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let (username, password) = Credentials::try_from(payload.into_inner())
        .map_err(map_credentials_error)?
        .into_parts();
    let user_id = state
        .interactor
        .register(RegisterCommand { username, password })
        .await?;
    Ok(HttpResponse::Created().json(UserCreatedResponse {
        user_id: user_id.to_string(),
    }))
}

#[derive(Deserialize, IntoParams)]
pub struct UsernameParams {
    /// Username to look up.
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct UsernameExistsResponse {
    pub exists: bool,
}

/// Report whether a username is taken.
#[utoipa::path(
    get,
    path = "/api/v1/users/exists",
    params(UsernameParams),
    responses(
        (status = 200, description = "Lookup result", body = UsernameExistsResponse),
        (status = 400, description = "Invalid username", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "usernameExists",
    security([])
)]
#[get("/users/exists")]
pub async fn username_exists(
    state: web::Data<HttpState>,
    params: web::Query<UsernameParams>,
) -> ApiResult<web::Json<UsernameExistsResponse>> {
    let username = Username::new(&params.username).map_err(map_username_error)?;
    let exists = state
        .interactor
        .check_username_existence(CheckUsernameExistenceQuery { username })
        .await?;
    Ok(web::Json(UsernameExistsResponse { exists }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: LoginSession,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let (username, password) = Credentials::try_from(payload.into_inner())
        .map_err(map_credentials_error)?
        .into_parts();
    let user_id = state
        .interactor
        .login(LoginQuery { username, password })
        .await?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    #[schema(value_type = String, format = Uuid)]
    pub id: String,
    #[schema(example = "alice")]
    pub username: String,
    pub is_confirmed: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CurrentUser> for CurrentUserResponse {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            is_confirmed: user.is_confirmed,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Profile of the logged-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = CurrentUserResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<CurrentUserResponse>> {
    let user_id = caller.into_user_id();
    let user = state
        .interactor
        .get_current_user(GetCurrentUserQuery { user_id })
        .await?;
    Ok(web::Json(user.into()))
}

/// Confirm the logged-in user. Confirmation is one-way.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/confirmation",
    responses(
        (status = 204, description = "User confirmed"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema),
        (status = 409, description = "Already confirmed", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "confirmUser"
)]
#[post("/users/me/confirmation")]
pub async fn confirm_user(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let user_id = caller.into_user_id();
    state
        .interactor
        .confirm_user(ConfirmUserCommand { user_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
