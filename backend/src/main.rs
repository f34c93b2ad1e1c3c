//! Service entry-point: wires the store factory, repository, REST
//! endpoints, and OpenAPI docs.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::domain::ports::{ReadinessProbe, UserRepository};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::users::{
    create_user, delete_user, find_user_by_email, get_user, list_users, update_user,
};
use backend::inbound::http::HttpState;
use backend::outbound::persistence::{
    ClientFactory, MongoUserRepository, StoreReadiness, StoreSettings,
};

/// Logical target name for the primary document store.
const DEFAULT_TARGET: &str = "default";

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = StoreSettings::from_env()
        .map_err(|err| std::io::Error::other(format!("store configuration invalid: {err}")))?;

    let mut factory = ClientFactory::new();
    factory.register_target(DEFAULT_TARGET, settings);
    let factory = Arc::new(factory);

    // Connect up front so the process fails fast on a bad target and the
    // readiness probe starts from a live session.
    let client = factory
        .get_client(DEFAULT_TARGET)
        .await
        .map_err(|err| std::io::Error::other(format!("store connection failed: {err}")))?;

    let repository = MongoUserRepository::new(client);
    repository
        .ensure_indexes()
        .await
        .map_err(|err| std::io::Error::other(format!("index creation failed: {err}")))?;

    let users: Arc<dyn UserRepository> = Arc::new(repository);
    let probe: Arc<dyn ReadinessProbe> =
        Arc::new(StoreReadiness::new(Arc::clone(&factory), DEFAULT_TARGET));
    let health_state = web::Data::new(HealthState::new(probe));
    let http_state = web::Data::new(HttpState::new(users));

    info!("starting HTTP server on 0.0.0.0:8080");
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(http_state.clone(), server_health_state.clone())
    })
    .bind(("0.0.0.0", 8080))?;

    let outcome = server.run().await;

    health_state.begin_drain();
    factory.release_all().await;
    info!("store clients released, shutting down");
    outcome
}

fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .app_data(http_state)
        .service(create_user)
        .service(list_users)
        .service(find_user_by_email)
        .service(get_user)
        .service(update_user)
        .service(delete_user);

    let mut app = App::new()
        .app_data(health_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    {
        app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    app
}
