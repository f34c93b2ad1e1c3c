//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification covering the users CRUD
//! surface and the health probes. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, User};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User service API",
        description = "CRUD access to user records backed by a document store."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::find_user_by_email,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(User, Error, ErrorCode, CreateUserRequest, UpdateUserRequest)),
    tags(
        (name = "users", description = "Operations on user records"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Structural checks on the generated specification.
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn every_endpoint_is_documented() {
        let spec = ApiDoc::openapi();
        let paths = &spec.paths.paths;
        for expected in [
            "/api/v1/users",
            "/api/v1/users/{id}",
            "/api/v1/users/search/by-email/{email}",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains_key(expected), "missing path {expected}");
        }
    }

    #[test]
    fn schemas_are_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        for expected in ["User", "Error", "CreateUserRequest", "UpdateUserRequest"] {
            assert!(
                components.schemas.contains_key(expected),
                "missing schema {expected}"
            );
        }
    }
}
