pub mod access;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod obfuscate_errors;
pub mod panic_handler;
pub mod routes;
pub mod shared_state;
pub mod tracing_config;

use axum::{middleware::from_fn_with_state, routing::IntoMakeService, Router};
use hyper::server::conn::AddrIncoming;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::{event, Level};

pub use crate::error::Error;
use crate::{
    audit::DbAuditSink,
    auth::{auth_layer, session_manager},
    obfuscate_errors::obfuscate_errors,
    shared_state::InnerState,
};

pub struct Server {
    pub host: String,
    pub port: u16,
    pub server: axum::Server<AddrIncoming, IntoMakeService<Router>>,
}

impl Server {
    pub async fn run(self) -> Result<(), Error> {
        self.server.await?;
        Ok(())
    }
}

pub async fn create_server(config: config::Config) -> Result<Server, anyhow::Error> {
    let db = planner_db::connect(config.database_url.as_str(), config.database_connections)?;
    planner_db::run_migrations(&db).await?;

    let production = config.env != "development" && !cfg!(debug_assertions);

    let sessions = session_manager(db.clone(), &config)?;
    let state = Arc::new(InnerState {
        production,
        db: db.clone(),
        sessions: sessions.clone(),
        audit: Arc::new(DbAuditSink { db }),
    });

    let app = routes::configure_routes().with_state(state).layer(
        // Global middlewares
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(move |err| {
                panic_handler::handle_panic(production, err)
            }))
            .layer(from_fn_with_state(production, obfuscate_errors))
            .compression()
            .layer(CookieManagerLayer::new())
            .set_x_request_id(MakeRequestUuid)
            .propagate_x_request_id()
            .layer(auth_layer(sessions))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO)),
            )
            .into_inner(),
    );

    let bind_ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((bind_ip, config.port));
    let builder = axum::Server::try_bind(&addr)?;
    let server = builder.serve(app.into_make_service());
    let port = server.local_addr().port();
    event!(Level::INFO, "Listening on {}:{}", config.host, port);

    Ok(Server {
        host: config.host,
        port,
        server,
    })
}
