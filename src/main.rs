use crate::auth::FirebaseTokenVerifier;
use crate::configuration::Configuration;
use crate::configuration_handler::ConfigurationHandler;
use crate::database_interface::DatabaseInterface;
use crate::http::create_app;
use crate::local_store::LocalStore;
use crate::payments::StripeGateway;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod auth;
mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod http;
mod local_store;
mod payments;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let client = reqwest::Client::builder()
        .timeout(configuration.request_timeout())
        .build()
        .unwrap();
    let verifier = FirebaseTokenVerifier::new(configuration.firebase_project_id(), client.clone());
    let payments = StripeGateway::new(configuration.stripe_secret_key(), client);

    let address = format!("0.0.0.0:{}", configuration.port());
    info!("Doctors Portal API accessible at {address}");
    let listener = tokio::net::TcpListener::bind(address).await.unwrap();

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection. Retry in 1 sec. You may want to restart without DATABASE_URL (impersistent storage).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        create_app(backend, verifier, payments, configuration)
    } else {
        let backend = LocalStore::default();
        backend.seed_default_slots();
        create_app(backend, verifier, payments, configuration)
    };

    axum::serve(listener, app).await.unwrap();
}
