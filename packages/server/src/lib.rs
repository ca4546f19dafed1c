pub mod cache;
pub mod config;
pub mod dao;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FunOJ API",
        version = "1.0.0",
        description = "API for the FunOJ online judge and practice platform"
    ),
    tags(
        (name = "Auth", description = "Verification codes, login and registration"),
        (name = "Account", description = "Self-service profile, password and avatar"),
        (name = "Permissions", description = "Permission tree management"),
        (name = "Roles", description = "Roles and their permission grants"),
        (name = "Users", description = "User administration"),
        (name = "Problems", description = "Problem CRUD and practice listing"),
        (name = "Problem Cases", description = "Test cases of a problem"),
        (name = "Problem Menus", description = "Problem sets"),
        (name = "Submissions", description = "Judge results and activity"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// CORS policy from config. `*` or an empty list allows any origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() || config.allow_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_area() {
        let (_, api) = OpenApiRouter::<AppState>::with_openapi(ApiDoc::openapi())
            .nest("/api", routes::api_routes())
            .split_for_parts();

        for path in [
            "/api/v1/auth/login/password",
            "/api/v1/account/avatar/{name}",
            "/api/v1/permissions/tree",
            "/api/v1/roles/{id}/permission-ids",
            "/api/v1/users/{id}/roles",
            "/api/v1/problems/{id}/cases/new-name",
            "/api/v1/problem-menus/icon",
            "/api/v1/submissions/activity/years",
        ] {
            assert!(api.paths.paths.contains_key(path), "missing {path}");
        }
        assert!(
            api.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("jwt"))
        );
    }

    #[test]
    fn wildcard_origin_builds() {
        let _ = cors_layer(&CorsConfig {
            allow_origins: vec!["*".into()],
            max_age: 60,
        });
        let _ = cors_layer(&CorsConfig {
            allow_origins: vec!["https://oj.example.com".into(), "bad\norigin".into()],
            max_age: 60,
        });
    }
}
