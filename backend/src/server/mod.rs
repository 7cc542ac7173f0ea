//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};
pub use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use chrono::TimeDelta;
use mockable::DefaultEnv;

use masters_backend::Trace;
#[cfg(debug_assertions)]
use masters_backend::doc::ApiDoc;
use masters_backend::inbound::http::configure_api;
use masters_backend::inbound::http::error::json_config;
use masters_backend::inbound::http::health::{HealthState, live, ready};
use masters_backend::inbound::http::session_config::{
    BuildMode, CookieSettings, SessionConfigError, cookie_settings_from_env,
};
use masters_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    cookies: CookieSettings,
    session_ttl: TimeDelta,
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
        cookies,
        session_ttl,
    } = deps;

    let api = web::scope("/api")
        .wrap(cookies.middleware(session_ttl))
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Session cookie settings from the process environment.
///
/// # Errors
/// Returns [`SessionConfigError`] when a toggle or the key file is invalid
/// for the current build mode.
pub fn load_cookie_settings() -> Result<CookieSettings, SessionConfigError> {
    cookie_settings_from_env(&DefaultEnv::new(), BuildMode::current())
}

/// Construct an Actix HTTP server over prepared handler state.
///
/// Readiness flips once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        cookies,
        bind_addr,
        session_ttl,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            cookies: cookies.clone(),
            session_ttl,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
