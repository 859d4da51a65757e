//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST path, the external schemas for domain
//! error types and the session cookie security scheme. Swagger UI serves it
//! in debug builds; `cargo run --bin openapi-dump` prints it for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cinerate API",
        description = "Movie catalogue, ratings and user accounts.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::username_exists,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::confirm_user,
        crate::inbound::http::movies::create_movie,
        crate::inbound::http::movies::get_movie,
        crate::inbound::http::movies::rate_movie,
        crate::inbound::http::movies::reevaluate_movie,
        crate::inbound::http::movies::remove_movie_rating,
        crate::inbound::http::adding_tasks::create_adding_task,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "Registration, login and confirmation"),
        (name = "movies", description = "Movie catalogue"),
        (name = "ratings", description = "Per-user movie ratings"),
        (name = "adding-tasks", description = "Requests to import titles from Kinopoisk"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
