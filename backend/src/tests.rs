//! Tests for the application bootstrap, covering readiness signalling.

use super::{HealthState, ServerConfig, create_server};
use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use rstest::{fixture, rstest};
use social_backend::inbound::http::session_config::SessionSettings;
use std::net::SocketAddr;

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn session() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

#[fixture]
fn bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

#[rstest]
#[actix_web::test]
async fn create_server_marks_ready_with_memory_store(
    health_state: web::Data<HealthState>,
    session: SessionSettings,
    bind_address: SocketAddr,
) {
    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), ServerConfig::new(session, bind_address))
        .expect("server should build");

    assert!(
        health_state.is_ready(),
        "server creation should mark readiness"
    );
}
