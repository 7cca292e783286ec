use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::net::TcpListener;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::routes::{
    handle_create_subscription, handle_delete_subscription, handle_get_subscription,
    handle_list_subscriptions, handle_total_price, handle_update_subscription, health_check,
    json_error_handler, query_error_handler,
};
use crate::subscription_store::SubscriptionStore;
use crate::telemetry::TelemetryError;

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(thiserror::Error)]
pub enum StartupError {
    #[error("Failed to load the configuration.")]
    Configuration(#[from] config::ConfigError),
    #[error("Failed to initialise telemetry.")]
    Telemetry(#[from] TelemetryError),
    #[error("Failed to connect to the database.")]
    Database(#[from] sqlx::Error),
    #[error("Failed to start the HTTP server.")]
    Server(#[from] std::io::Error),
}

impl std::fmt::Debug for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match std::error::Error::source(self) {
            Some(cause) => write!(f, "{}\nCaused by:\n\t{}", self, cause),
            None => write!(f, "{}", self),
        }
    }
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Connects to the database eagerly so an unreachable datastore fails the
    /// build instead of the first request.
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        let db_pool = PgPoolOptions::new()
            .acquire_timeout(DB_ACQUIRE_TIMEOUT)
            .connect_with(config.get_db_options()?)
            .await?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, db_pool)?;

        tracing::info!("Server listening on {}:{}", config.application.get_host(), port);

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(listener: TcpListener, db_pool: PgPool) -> Result<Server, std::io::Error> {
    let store = web::Data::new(SubscriptionStore::new(db_pool));

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/subscriptions")
                    .route(web::post().to(handle_create_subscription))
                    .route(web::get().to(handle_list_subscriptions)),
            )
            .route(
                "/subscriptions/total_price",
                web::get().to(handle_total_price),
            )
            .service(
                web::resource("/subscriptions/{user_id}/{service_name}/{start_date}")
                    .route(web::get().to(handle_get_subscription))
                    .route(web::put().to(handle_update_subscription))
                    .route(web::delete().to(handle_delete_subscription)),
            )
            .app_data(store.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Lazily connected pool, nothing is opened until the first query.
pub fn get_connection_db_pool(config: &DatabaseSettings) -> Result<Pool<Postgres>, sqlx::Error> {
    Ok(PgPoolOptions::new()
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect_lazy_with(config.get_db_options()?))
}
