//! Server construction and middleware wiring.

mod config;

pub use config::{ServerConfig, ServerSettings};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use social_backend::Trace;
#[cfg(debug_assertions)]
use social_backend::doc::ApiDoc;
use social_backend::domain::UserService;
use social_backend::domain::ports::UserRepository;
use social_backend::inbound::http::api_scope;
use social_backend::inbound::http::health::{HealthState, live, ready};
use social_backend::inbound::http::session_config::SessionSettings;
use social_backend::inbound::http::state::{HttpState, HttpStatePorts};
use social_backend::outbound::memory::InMemoryUserRepository;
use social_backend::outbound::persistence::DieselUserRepository;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire the user service over `repo`.
fn service_ports<R>(repo: R) -> HttpStatePorts
where
    R: UserRepository + 'static,
{
    HttpStatePorts::from_service(Arc::new(UserService::new(
        Arc::new(repo),
        Arc::new(DefaultClock),
    )))
}

fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL user store");
            service_ports(DieselUserRepository::new(pool.clone()))
        }
        None => {
            info!("no database configured; using in-memory user store");
            service_ports(InMemoryUserRepository::default())
        }
    };
    web::Data::new(HttpState::with_photo_url(
        ports,
        config.default_photo_url.clone(),
    ))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
    photo_limit_bytes: usize,
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
        session,
        photo_limit_bytes,
    } = deps;

    let api = api_scope(photo_limit_bytes).wrap(session.middleware());

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        session,
        bind_addr,
        photo_limit_bytes,
        ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
            photo_limit_bytes,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
