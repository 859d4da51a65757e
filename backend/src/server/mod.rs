//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub use metrics::prometheus_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::{build_http_state, build_interactor, build_ws_state};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use cinerate::Trace;
#[cfg(debug_assertions)]
use cinerate::doc::ApiDoc;
use cinerate::inbound::http::adding_tasks::create_adding_task;
use cinerate::inbound::http::error::{json_config, query_config};
use cinerate::inbound::http::health::{HealthState, live, ready};
use cinerate::inbound::http::movies::{
    create_movie, get_movie, rate_movie, reevaluate_movie, remove_movie_rating,
};
use cinerate::inbound::http::state::HttpState;
use cinerate::inbound::http::users::{
    confirm_user, current_user, login, register, username_exists,
};
use cinerate::inbound::ws;
use cinerate::inbound::ws::state::WsState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(username_exists)
        .service(current_user)
        .service(confirm_user)
        .service(register)
        .service(login)
        .service(create_movie)
        .service(get_movie)
        .service(rate_movie)
        .service(reevaluate_movie)
        .service(remove_movie_rating)
        .service(create_adding_task);

    let app = App::new()
        .app_data(health_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(Trace)
        .service(api)
        .service(ws::bot_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let interactor = build_interactor(&config);
    let http_state = build_http_state(&interactor);
    let ws_state = build_ws_state(&interactor);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
