mod api;
mod config;
mod datastore;
mod feed;
mod identity;
mod media;
mod metrics;
mod posts;
mod relationships;
mod twoface;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;

use crate::config::Config;
use crate::datastore::postgres::PostgresStore;
use actix_web::{
    dev::{Service, ServiceResponse},
    middleware, web, App, HttpServer,
};
use anyhow::Context;
use datastore::postgres;
use futures::future::FutureExt;
use std::time::Duration;
use tracing::{info, warn, Level};

#[actix_rt::main]
async fn main() -> Result<(), anyhow::Error> {
    let args: Vec<_> = std::env::args().collect();
    let config_file_path = config_path(&args)?;

    let config = Config::from_file(config_file_path)
        .with_context(|| format!("couldn't read config from {}", config_file_path))?;

    // Set up logger output
    let subscriber_builder = tracing_subscriber::fmt().with_max_level(Level::DEBUG);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!("starting microfeed");

    // Build the postgres client
    let db = PostgresStore::new(
        postgres::Dsn::new(&config),
        config.db_pool_size,
        Duration::from_secs(config.db_connection_timeout),
    )
    .context("couldn't connect to Postgres")?;
    prometheus::register(Box::new(db.clone())).context("couldn't register DB metrics")?;
    db.apply_schema().context("couldn't apply the database schema")?;

    std::fs::create_dir_all(&config.media.upload_dir)
        .context("couldn't create the upload directory")?;

    let enable_admin = config.enable_admin;
    if enable_admin {
        warn!("Admin routes are enabled and unauthenticated. This should only happen in trusted environments.");
    }
    let state = api::State {
        ds: db,
        media: config.media.clone(),
        static_dir: config.static_dir.clone(),
    };

    // Start the public API server
    info!(addr = &config.listen_address[..], "starting API server");
    let max_body_size = config.max_body_size;
    let api_server = HttpServer::new(move || {
        App::new()
            // Middleware for Prometheus
            .wrap_fn(|request, srv| srv.call(request).map(increment_response_metrics))
            .app_data(web::Data::new(state.clone()))
            // enable logger
            .wrap(middleware::Logger::default())
            // limit size of the payload (global configuration)
            .app_data(web::JsonConfig::default().limit(max_body_size))
            .configure(|cfg| api::configure::<PostgresStore>(cfg, enable_admin))
    })
    .bind(config.listen_address.clone())
    .context("couldn't start API server")?
    .run();

    // Start the metrics server
    info!(addr = &config.metrics_address[..], "starting metrics server");
    let metrics_server = HttpServer::new(|| {
        App::new().service(
            web::scope("/metrics")
                .service(web::resource("/").route(web::get().to(metrics::endpoint::gather)))
                .service(web::resource("").route(web::get().to(metrics::endpoint::gather))),
        )
    })
    .bind(config.metrics_address.clone())
    .context("couldn't start metrics server")?
    .run();

    futures::try_join!(api_server, metrics_server)?;
    Ok(())
}

/// The config file is the first CLI argument.
fn config_path(args: &[String]) -> Result<&str, anyhow::Error> {
    let [_, config_file_path, ..] = args else {
        anyhow::bail!("First argument should be path to config file");
    };
    Ok(config_file_path.as_str())
}

/// If response is OK, increment the metrics for HTTP statuses.
fn increment_response_metrics<E, B>(
    response: Result<ServiceResponse<B>, E>,
) -> Result<ServiceResponse<B>, E> {
    match response {
        Ok(response) => {
            metrics::HTTP_RESPONSES
                .with_label_values(&[response.status().as_str()])
                .inc();
            Ok(response)
        }
        other => other,
    }
}
