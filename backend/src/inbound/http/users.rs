//! Users API handlers.
//!
//! ```text
//! POST   /api/v1/users
//! GET    /api/v1/users?limit=50&offset=0
//! GET    /api/v1/users/{id}
//! GET    /api/v1/users/search/by-email/{email}
//! PUT    /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Handlers only convert wire payloads to domain values, call the
//! repository port, and map failures onto the shared error schema.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::UserStoreError;
use crate::domain::{
    Age, EmailAddress, Error, NewUser, Page, User, UserId, UserName, UserPatch,
    UserValidationError, pagination::PageError,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    /// Display name.
    pub name: String,
    /// Contact email; unique across users.
    pub email: String,
    /// Age in whole years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = UserValidationError;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self::new(
            UserName::new(value.name)?,
            EmailAddress::new(value.email)?,
            value.age.map(Age::new).transpose()?,
        ))
    }
}

/// Request body for `PUT /api/v1/users/{id}`; at least one field required.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    /// Replacement display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Replacement age.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = UserValidationError;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Self::new(
            value.name.map(UserName::new).transpose()?,
            value.email.map(EmailAddress::new).transpose()?,
            value.age.map(Age::new).transpose()?,
        )
    }
}

/// Pagination query for `GET /api/v1/users`.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListUsersQuery {
    /// Maximum number of users to return (default 50, capped at 200).
    pub limit: Option<i64>,
    /// Number of users to skip.
    pub offset: Option<u64>,
}

fn validation_field(err: &UserValidationError) -> Option<&'static str> {
    match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => Some("id"),
        UserValidationError::EmptyName | UserValidationError::NameTooLong { .. } => Some("name"),
        UserValidationError::InvalidEmail | UserValidationError::EmailTooLong { .. } => {
            Some("email")
        }
        UserValidationError::AgeOutOfRange { .. } => Some("age"),
        UserValidationError::EmptyPatch => None,
    }
}

fn map_validation_error(err: &UserValidationError) -> Error {
    let error = Error::invalid_request(err.to_string());
    match validation_field(err) {
        Some(field) => error.with_details(json!({ "field": field })),
        None => error,
    }
}

fn map_page_error(err: &PageError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": "limit" }))
}

fn map_store_error(err: UserStoreError) -> Error {
    match err {
        UserStoreError::Connection { message } => Error::service_unavailable(message),
        UserStoreError::NotFound { id } => Error::not_found(format!("user {id} does not exist")),
        UserStoreError::Conflict { message } => Error::conflict(message),
        UserStoreError::Query { .. } | UserStoreError::Corrupt { .. } => {
            // Redacted by the response mapping; the log keeps the detail.
            Error::internal(err.to_string())
        }
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| map_validation_error(&err))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let new_user =
        NewUser::try_from(payload.into_inner()).map_err(|err| map_validation_error(&err))?;
    let user = state.users.create(new_user).await.map_err(map_store_error)?;
    Ok(HttpResponse::Created().json(user))
}

/// List users, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 400, description = "Invalid pagination", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    let page = Page::new(query.limit, query.offset).map_err(|err| map_page_error(&err))?;
    let users = state.users.list(page).await.map_err(map_store_error)?;
    Ok(web::Json(users))
}

/// Fetch a user by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users.get_by_id(&id).await.map_err(map_store_error)?;
    Ok(web::Json(user))
}

/// Fetch a user by email address.
#[utoipa::path(
    get,
    path = "/api/v1/users/search/by-email/{email}",
    params(("email" = String, Path, description = "Email address to look up")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed email", body = Error),
        (status = 404, description = "No user with that email", body = Error)
    ),
    tags = ["users"],
    operation_id = "findUserByEmail"
)]
#[get("/users/search/by-email/{email}")]
pub async fn find_user_by_email(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let email =
        EmailAddress::new(path.into_inner()).map_err(|err| map_validation_error(&err))?;
    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::not_found(format!("no user with email {email}")))?;
    Ok(web::Json(user))
}

/// Update a user and return the stored result.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Email already in use", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let patch =
        UserPatch::try_from(payload.into_inner()).map_err(|err| map_validation_error(&err))?;

    // Existence first so an unknown id is 404 even when the patch would
    // modify nothing.
    state.users.get_by_id(&id).await.map_err(map_store_error)?;
    state
        .users
        .update(&id, patch)
        .await
        .map_err(map_store_error)?;
    let user = state.users.get_by_id(&id).await.map_err(map_store_error)?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let deleted = state.users.delete(&id).await.map_err(map_store_error)?;
    if deleted == 0 {
        return Err(Error::not_found(format!("user {id} does not exist")));
    }
    Ok(HttpResponse::NoContent().finish())
}
